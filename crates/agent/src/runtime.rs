use std::sync::Arc;

use intake_core::domain::order::{CollectedRecord, OrderId};
use intake_core::errors::DomainError;
use intake_core::flows::{DialogueEngine, DialogueTurnContext, TurnOutcome};
use intake_db::OrderRepository;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::SessionError;
use crate::finalizer::{RecordFinalizer, SavedOrder};
use crate::phraser::{ResponsePhraser, GREETING, SAVING_MESSAGE};
use crate::terminal::Terminal;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionReport {
    pub session_id: Uuid,
    pub order_id: OrderId,
    pub confirmation: String,
    pub turns: u32,
    pub rejections: u32,
}

/// Runs one order-intake session against a terminal.
pub struct SessionRuntime {
    engine: DialogueEngine,
    phraser: ResponsePhraser,
    finalizer: RecordFinalizer,
}

impl SessionRuntime {
    pub fn new(phraser: ResponsePhraser, repository: Arc<dyn OrderRepository>) -> Self {
        let finalizer = RecordFinalizer::new(repository, phraser.clone());
        Self { engine: DialogueEngine::default(), phraser, finalizer }
    }

    /// Set as soon as the order is in the store, before the confirmation is
    /// shown. Callers that cancel `run` use it to tell the user what happened.
    pub fn saved_order(&self) -> watch::Receiver<Option<SavedOrder>> {
        self.finalizer.subscribe()
    }

    /// Collects every field, persists the order and shows the confirmation.
    ///
    /// Exactly one bot message precedes each read. Nothing is written to the
    /// store unless the record is complete.
    pub async fn run<T>(&self, terminal: &mut T) -> Result<SessionReport, SessionError>
    where
        T: Terminal + ?Sized,
    {
        let session_id = Uuid::new_v4();
        info!(event_name = "agent.session.started", %session_id, "order intake session started");

        let mut record = CollectedRecord::new();
        let mut turns = 0u32;
        let mut rejections = 0u32;

        terminal.display(GREETING).await?;
        let mut prompt = match self.engine.state(&record).current_field() {
            Some(field) => {
                self.phraser.phrase_next_question(DialogueTurnContext::new(&record, field)).await
            }
            None => String::new(),
        };

        while !self.engine.state(&record).is_complete() {
            terminal.display(&prompt).await?;
            let raw = terminal.read_line().await?;
            turns += 1;

            match self.engine.submit(&mut record, &raw).map_err(DomainError::from)? {
                TurnOutcome::Accepted { field, value, next } => {
                    debug!(
                        event_name = "agent.session.field_accepted",
                        %session_id,
                        field = field.as_str(),
                        "answer accepted"
                    );
                    if value.is_empty() {
                        info!(
                            event_name = "agent.session.optional_skipped",
                            %session_id,
                            field = field.as_str(),
                            "optional field left empty"
                        );
                    }
                    if let Some(next_field) = next.current_field() {
                        prompt = self
                            .phraser
                            .phrase_next_question(DialogueTurnContext::new(&record, next_field))
                            .await;
                    }
                }
                TurnOutcome::Rejected { field, reason } => {
                    rejections += 1;
                    debug!(
                        event_name = "agent.session.field_rejected",
                        %session_id,
                        field = field.as_str(),
                        reason = ?reason,
                        "answer rejected"
                    );
                    prompt = self
                        .phraser
                        .phrase_retry(DialogueTurnContext::new(&record, field), &raw)
                        .await;
                }
            }
        }

        let order = record.to_completed()?;
        terminal.display(SAVING_MESSAGE).await?;
        let finalized = match self.finalizer.finalize(&order).await {
            Ok(finalized) => finalized,
            Err(error) => {
                warn!(
                    event_name = "agent.session.aborted",
                    %session_id,
                    error_class = error.error_class(),
                    "session aborted before confirmation"
                );
                return Err(error);
            }
        };
        terminal.display(&finalized.confirmation).await?;

        info!(
            event_name = "agent.session.completed",
            %session_id,
            order_id = finalized.order_id.0,
            turns,
            rejections,
            "order intake session completed"
        );

        Ok(SessionReport {
            session_id,
            order_id: finalized.order_id,
            confirmation: finalized.confirmation,
            turns,
            rejections,
        })
    }
}
