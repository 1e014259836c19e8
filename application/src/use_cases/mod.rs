//! Use cases — the application's orchestration logic
//!
//! [`process_turn`] is the sole entry point; the other modules are the
//! stages it composes.

pub mod generate_answer;
pub mod process_turn;
pub mod retrieve_evidence;
pub mod review_response;
pub mod route_question;
pub mod tool_runner;

pub use generate_answer::{DraftAnswer, GenerateAnswerUseCase};
pub use process_turn::{ProcessTurnInput, ProcessTurnUseCase, TurnError};
pub use retrieve_evidence::{RetrieveError, RetrieveEvidenceUseCase};
pub use review_response::ReviewResponseUseCase;
pub use route_question::RouteQuestionUseCase;
pub use tool_runner::ToolRunner;
