pub mod interpreter;
pub mod transcript;

pub use interpreter::{FlowInterpreter, RunState};
pub use transcript::{RunOutcome, TerminationReason, Transcript, TranscriptEntry};
