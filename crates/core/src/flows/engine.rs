use thiserror::Error;

use crate::domain::order::CollectedRecord;
use crate::flows::schema::SlotSchema;
use crate::flows::states::{DialogueState, TurnOutcome};
use crate::flows::validation::{process_answer, AnswerOutcome};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DialogueError {
    #[error("dialogue is already complete; no field is awaiting an answer")]
    AlreadyComplete,
}

/// Turn-taking state machine over a `CollectedRecord`.
///
/// The position is never stored: it is always the first schema field the
/// record does not contain, so fields can only be filled in schema order.
#[derive(Clone, Copy, Debug, Default)]
pub struct DialogueEngine {
    schema: SlotSchema,
}

impl DialogueEngine {
    pub fn state(&self, record: &CollectedRecord) -> DialogueState {
        match self.schema.first_missing(record) {
            Some(field) => DialogueState::AwaitingField(field.key),
            None => DialogueState::Complete,
        }
    }

    pub fn submit(
        &self,
        record: &mut CollectedRecord,
        raw: &str,
    ) -> Result<TurnOutcome, DialogueError> {
        let field = self.schema.first_missing(record).ok_or(DialogueError::AlreadyComplete)?;

        match process_answer(field, raw) {
            AnswerOutcome::Accepted(value) => {
                record.set(field.key, value.clone());
                Ok(TurnOutcome::Accepted { field: field.key, value, next: self.state(record) })
            }
            AnswerOutcome::Rejected(reason) => {
                Ok(TurnOutcome::Rejected { field: field.key, reason })
            }
        }
    }
}
