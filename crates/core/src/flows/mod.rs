pub mod engine;
pub mod schema;
pub mod states;
pub mod validation;

pub use engine::{DialogueEngine, DialogueError};
pub use schema::{FieldSpec, SlotSchema, Validator};
pub use states::{DialogueState, DialogueTurnContext, TurnOutcome};
pub use validation::{is_valid_phone, process_answer, AnswerOutcome, RejectionReason};
