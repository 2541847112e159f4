//! Order intake core - slot schema, validation and the dialogue state machine.
//!
//! Everything in this crate is deterministic and free of I/O. The agent crate
//! drives the turn loop and talks to the generation service and the store.

pub mod config;
pub mod domain;
pub mod errors;
pub mod flows;

pub use domain::order::{CollectedRecord, CompletedOrder, FieldKey, OrderId, PersistedOrder};
pub use errors::DomainError;
pub use flows::{
    is_valid_phone, process_answer, AnswerOutcome, DialogueEngine, DialogueError, DialogueState,
    DialogueTurnContext, FieldSpec, RejectionReason, SlotSchema, TurnOutcome, Validator,
};
