//! Error types for slate
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (validation failure, unknown id)
//! - 3: Schedule conflict (time-slot overlap)
//! - 4: Operation failed (I/O, corrupt data file)

use thiserror::Error;

/// Exit codes for the slate CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const SCHEDULE_CONFLICT: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for slate operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Name must not be empty")]
    EmptyName,

    #[error("Name already in use: {0}")]
    DuplicateName(String),

    #[error("Invalid id: {0} (ids must be positive)")]
    InvalidId(u64),

    #[error("Id already in use: {0}")]
    DuplicateId(u64),

    #[error("Task not found: {0}")]
    TaskNotFound(u64),

    #[error("Epic not found: {0}")]
    EpicNotFound(u64),

    #[error("Subtask not found: {0}")]
    SubtaskNotFound(u64),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Schedule conflicts (exit code 3)
    #[error("Schedule conflict: slot for {id} overlaps the reservation held by {other}")]
    SlotConflict { id: u64, other: u64 },

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Corrupt data file at line {line}: {reason}")]
    CorruptRow { line: usize, reason: String },
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors
            Error::EmptyName
            | Error::DuplicateName(_)
            | Error::InvalidId(_)
            | Error::DuplicateId(_)
            | Error::TaskNotFound(_)
            | Error::EpicNotFound(_)
            | Error::SubtaskNotFound(_)
            | Error::InvalidArgument(_) => exit_codes::USER_ERROR,

            // Schedule conflicts
            Error::SlotConflict { .. } => exit_codes::SCHEDULE_CONFLICT,

            // Operation failures
            Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::CorruptRow { .. } => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured details for JSON error envelopes
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::SlotConflict { id, other } => Some(serde_json::json!({
                "id": id,
                "other": other,
            })),
            Error::CorruptRow { line, reason } => Some(serde_json::json!({
                "line": line,
                "reason": reason,
            })),
            _ => None,
        }
    }
}

/// Result type alias for slate operations
pub type Result<T> = std::result::Result<T, Error>;
