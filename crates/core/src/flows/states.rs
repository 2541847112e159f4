use serde::Serialize;

use crate::domain::order::{CollectedRecord, FieldKey};
use crate::flows::validation::RejectionReason;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueState {
    AwaitingField(FieldKey),
    Complete,
}

impl DialogueState {
    pub fn current_field(&self) -> Option<FieldKey> {
        match self {
            Self::AwaitingField(key) => Some(*key),
            Self::Complete => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    Accepted { field: FieldKey, value: String, next: DialogueState },
    Rejected { field: FieldKey, reason: RejectionReason },
}

/// What the phraser gets to see on a turn: the collected subset and the
/// field currently being asked for.
#[derive(Clone, Copy, Debug)]
pub struct DialogueTurnContext<'a> {
    pub collected: &'a CollectedRecord,
    pub current_field: FieldKey,
}

impl<'a> DialogueTurnContext<'a> {
    pub fn new(collected: &'a CollectedRecord, current_field: FieldKey) -> Self {
        Self { collected, current_field }
    }

    pub fn customer_name(&self) -> Option<&'a str> {
        self.collected.get(FieldKey::CustomerName)
    }
}
