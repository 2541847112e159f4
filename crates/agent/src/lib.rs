//! Agent runtime - drives one order-intake session end to end.
//!
//! # Architecture
//!
//! The session follows a constrained loop:
//! 1. **Ask** (`phraser`) - phrase the question for the first missing field
//! 2. **Read** (`terminal`) - take exactly one line of user input
//! 3. **Validate** - `intake_core::DialogueEngine` accepts or rejects the answer
//! 4. **Finalize** (`finalizer`) - persist the completed order and confirm it
//!
//! # Key Types
//!
//! - `SessionRuntime` - turn loop orchestrator (see `runtime` module)
//! - `LlmClient` - pluggable trait for the text-generation service
//! - `ResponsePhraser` - generation calls with deterministic fallback templates
//!
//! # Degradation Principle
//!
//! The generation service only phrases text. It never decides what is asked
//! next or whether an answer is valid, and every call has a fixed fallback,
//! so a session completes the same way with or without it.

pub mod errors;
pub mod finalizer;
pub mod llm;
pub mod phraser;
pub mod prompts;
pub mod runtime;
pub mod terminal;

pub use errors::SessionError;
pub use finalizer::{FinalizedOrder, RecordFinalizer, SavedOrder};
pub use llm::{ChatCompletionsClient, CompletionRequest, LlmClient, LlmError};
pub use phraser::{fallback_confirmation, ResponsePhraser, GOODBYE};
pub use runtime::{SessionReport, SessionRuntime};
pub use terminal::{StdioTerminal, Terminal, TerminalError};
