use std::sync::Arc;

use intake_core::domain::order::{CompletedOrder, OrderId};
use intake_db::OrderRepository;
use tokio::sync::watch;
use tracing::{error, info};

use crate::errors::SessionError;
use crate::phraser::ResponsePhraser;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FinalizedOrder {
    pub order_id: OrderId,
    pub confirmation: String,
}

/// An order that is already in the store, published before the
/// confirmation is phrased.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavedOrder {
    pub order_id: OrderId,
    pub order: CompletedOrder,
}

pub struct RecordFinalizer {
    repository: Arc<dyn OrderRepository>,
    phraser: ResponsePhraser,
    saved: watch::Sender<Option<SavedOrder>>,
}

impl RecordFinalizer {
    pub fn new(repository: Arc<dyn OrderRepository>, phraser: ResponsePhraser) -> Self {
        let (saved, _) = watch::channel(None);
        Self { repository, phraser, saved }
    }

    /// Latest order written by this finalizer. Stays `None` until a write
    /// has succeeded.
    pub fn subscribe(&self) -> watch::Receiver<Option<SavedOrder>> {
        self.saved.subscribe()
    }

    /// Writes the order once. A failed write is returned as-is and no
    /// confirmation is produced.
    pub async fn finalize(&self, order: &CompletedOrder) -> Result<FinalizedOrder, SessionError> {
        let order_id = self.repository.append(order).await.map_err(|source| {
            error!(
                event_name = "agent.finalizer.persist_failed",
                error = %source,
                "order write failed"
            );
            SessionError::Persistence(source)
        })?;
        info!(event_name = "agent.finalizer.persisted", order_id = order_id.0, "order saved");
        self.saved.send_replace(Some(SavedOrder { order_id, order: order.clone() }));

        let confirmation = self.phraser.phrase_confirmation(order, order_id).await;
        Ok(FinalizedOrder { order_id, confirmation })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use intake_core::config::AppConfig;
    use intake_core::domain::order::{CompletedOrder, OrderId, PersistedOrder};
    use intake_db::{InMemoryOrderRepository, OrderRepository, RepositoryError};

    use super::{RecordFinalizer, SavedOrder};
    use crate::errors::SessionError;
    use crate::llm::{CompletionRequest, LlmClient, LlmError};
    use crate::phraser::ResponsePhraser;

    struct OfflineLlm;

    #[async_trait]
    impl LlmClient for OfflineLlm {
        async fn complete(&self, _request: &CompletionRequest) -> Result<String, LlmError> {
            Err(LlmError::Transport("offline".to_string()))
        }
    }

    struct ReadOnlyRepository;

    #[async_trait]
    impl OrderRepository for ReadOnlyRepository {
        async fn append(&self, _order: &CompletedOrder) -> Result<OrderId, RepositoryError> {
            Err(RepositoryError::Decode("attempt to write a readonly database".to_string()))
        }

        async fn find_by_id(
            &self,
            _id: OrderId,
        ) -> Result<Option<PersistedOrder>, RepositoryError> {
            Ok(None)
        }

        async fn count(&self) -> Result<u64, RepositoryError> {
            Ok(0)
        }
    }

    fn phraser() -> ResponsePhraser {
        ResponsePhraser::new(Arc::new(OfflineLlm), &AppConfig::default().llm)
    }

    fn order() -> CompletedOrder {
        CompletedOrder {
            customer_name: "Ana".to_string(),
            phone: "5551234".to_string(),
            dish_name: "Paella".to_string(),
            comments: "extra lemon".to_string(),
        }
    }

    #[tokio::test]
    async fn finalize_persists_then_confirms() {
        let repository = Arc::new(InMemoryOrderRepository::new());
        let finalizer = RecordFinalizer::new(repository.clone(), phraser());
        let saved = finalizer.subscribe();
        assert!(saved.borrow().is_none());

        let finalized = finalizer.finalize(&order()).await.expect("finalize");
        assert_eq!(
            saved.borrow().clone(),
            Some(SavedOrder { order_id: OrderId(1), order: order() })
        );

        assert_eq!(finalized.order_id, OrderId(1));
        assert!(finalized.confirmation.contains("Comments: extra lemon"));
        assert!(finalized.confirmation.contains("Order ID: 1"));
        assert_eq!(repository.count().await.expect("count"), 1);
    }

    #[tokio::test]
    async fn write_failure_is_fatal_and_yields_no_confirmation() {
        let finalizer = RecordFinalizer::new(Arc::new(ReadOnlyRepository), phraser());
        let saved = finalizer.subscribe();

        let error = finalizer.finalize(&order()).await.expect_err("write must fail");
        assert!(matches!(error, SessionError::Persistence(RepositoryError::Decode(_))));
        assert!(saved.borrow().is_none());
    }
}
