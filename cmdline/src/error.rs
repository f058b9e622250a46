use std::io;

#[derive(Debug, thiserror::Error)]
pub enum CommandLineError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Argument(#[from] argv::Error),

    #[error("end of input while waiting for an answer")]
    EndOfInput,

    #[error("{0}")]
    Usage(String),
}

impl CommandLineError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CommandLineError::Usage(_) => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, CommandLineError>;
