use thiserror::Error;

use crate::domain::order::FieldKey;
use crate::flows::DialogueError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("record is missing required fields: {missing:?}")]
    IncompleteRecord { missing: Vec<FieldKey> },
    #[error(transparent)]
    Dialogue(#[from] DialogueError),
}
