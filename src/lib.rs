//! Question pools for JQuestions: the data model, the compressed `.jqs`
//! codec, answer shuffling and quiz sessions.

pub mod libjqs;

pub use libjqs::codec::{load, load_resource, save};
pub use libjqs::content::{Mark, MarkKind, RichContent};
pub use libjqs::error::{CorruptFileError, JqsError, Result};
pub use libjqs::pool::QuestionPool;
pub use libjqs::question::{PossibleAnswer, Question, QuestionType};
pub use libjqs::session::{QuizSession, Report, Response};
pub use libjqs::shuffle::shuffle;
