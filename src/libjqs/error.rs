use std::io;
use thiserror::Error;

/// Everything that can go wrong while loading or saving a pool.
#[derive(Debug, Error)]
pub enum JqsError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("resource `{0}` not found")]
    ResourceNotFound(String),

    /// The file was written by a newer JQuestions. Nothing was loaded.
    #[error("file format {found} is newer than the supported {supported}; upgrade JQuestions to read this file")]
    FileTooNew { found: String, supported: String },

    #[error("corrupt question file: {0}")]
    Corrupt(#[from] CorruptFileError),
}

/// The token stream did not have the shape the writer produces.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CorruptFileError {
    #[error("unexpected end of data while reading {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("expected a number for {field}, found {token:?}")]
    InvalidNumber { field: &'static str, token: String },

    #[error("unknown question type code {0:?}")]
    UnknownQuestionType(String),

    #[error("payload is not valid UTF-8")]
    InvalidUtf8,

    #[error("unreadable format version {0:?}")]
    InvalidVersion(String),

    #[error("correct answer index {index} is outside 1..={answers}")]
    CorrectIndexOutOfRange { index: i64, answers: usize },

    #[error("image at {pos} declares {expected} pixels but carries {found}")]
    PixelCount { pos: usize, expected: usize, found: usize },

    #[error("mark position {pos} is outside content of length {len}")]
    MarkOutOfBounds { pos: usize, len: usize },

    #[error("two marks share position {0}")]
    DuplicateMark(usize),
}

pub type Result<T> = std::result::Result<T, JqsError>;

impl JqsError {
    /// True for errors caused by the file's contents rather than its access.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, JqsError::Corrupt(_))
    }
}
