use chrono::Utc;
use tokio::sync::RwLock;

use intake_core::domain::order::{CompletedOrder, OrderId, PersistedOrder};

use super::{OrderRepository, RepositoryError};

#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<Vec<PersistedOrder>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn orders(&self) -> Vec<PersistedOrder> {
        self.orders.read().await.clone()
    }
}

#[async_trait::async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn append(&self, order: &CompletedOrder) -> Result<OrderId, RepositoryError> {
        let mut orders = self.orders.write().await;
        let next = i64::try_from(orders.len() + 1)
            .map_err(|e| RepositoryError::Decode(e.to_string()))?;
        let id = OrderId(next);
        orders.push(PersistedOrder { id, order: order.clone(), created_at: Utc::now() });
        Ok(id)
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<PersistedOrder>, RepositoryError> {
        let orders = self.orders.read().await;
        Ok(orders.iter().find(|stored| stored.id == id).cloned())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.orders.read().await.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use intake_core::domain::order::{CompletedOrder, OrderId};

    use crate::repositories::{InMemoryOrderRepository, OrderRepository};

    #[tokio::test]
    async fn in_memory_repository_assigns_sequential_ids() {
        let repo = InMemoryOrderRepository::new();
        let order = CompletedOrder {
            customer_name: "Luis".to_string(),
            phone: "5551234".to_string(),
            dish_name: "Gazpacho".to_string(),
            comments: "no garlic".to_string(),
        };

        assert_eq!(repo.append(&order).await.expect("append"), OrderId(1));
        assert_eq!(repo.append(&order).await.expect("append"), OrderId(2));

        let stored = repo.find_by_id(OrderId(2)).await.expect("find").expect("exists");
        assert_eq!(stored.order.comments, "no garlic");
        assert_eq!(repo.count().await.expect("count"), 2);
        assert_eq!(repo.orders().await.len(), 2);
    }
}
