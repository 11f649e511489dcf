use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Usage error: {0}")]
    Usage(String),

    #[error("{} already exists and was not overwritten", .0.display())]
    OverwriteDeclined(PathBuf),

    #[error("Command `{command}` failed{}", describe_code(.code))]
    CommandFailed {
        command: String,
        code: Option<i32>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl PublishError {
    /// Process exit code reported by the binaries
    pub fn exit_code(&self) -> i32 {
        match self {
            PublishError::Usage(_) => 2,
            PublishError::OverwriteDeclined(_) => 3,
            PublishError::CommandFailed { .. } => 4,
            PublishError::Config(_) => 5,
            PublishError::Io(_) => 6,
        }
    }
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!(" with exit code {}", code),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, PublishError>;
