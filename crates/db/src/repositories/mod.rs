use async_trait::async_trait;
use thiserror::Error;

use intake_core::domain::order::{CompletedOrder, OrderId, PersistedOrder};

pub mod memory;
pub mod order;

pub use memory::InMemoryOrderRepository;
pub use order::SqlOrderRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Append-only store for finished orders.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persists the order and returns the newly assigned positive identifier.
    async fn append(&self, order: &CompletedOrder) -> Result<OrderId, RepositoryError>;
    async fn find_by_id(&self, id: OrderId) -> Result<Option<PersistedOrder>, RepositoryError>;
    async fn count(&self) -> Result<u64, RepositoryError>;
}
