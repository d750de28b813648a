//! Error taxonomy for a run
//!
//! Configuration and acquisition errors end the run; the rest are reported
//! and the pipeline continues with the last good file.

use crate::tools::{FormatError, TrimError};
use std::io;
use std::process::ExitCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("acquisition failed: {0}")]
    Acquisition(String),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("invalid range: {0}")]
    Range(TrimError),

    #[error("no complete selection was made")]
    IncompleteSelection,

    #[error("tag write failed: {0}")]
    TagWrite(String),

    #[error("cover write failed: {0}")]
    CoverWrite(String),

    #[error("cancelled by user")]
    Cancelled,

    #[error("prompt failed: {0}")]
    Prompt(dialoguer::Error),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    External(#[from] anyhow::Error),
}

impl From<TrimError> for AppError {
    fn from(err: TrimError) -> Self {
        match err {
            TrimError::IncompleteSelection => Self::IncompleteSelection,
            range @ TrimError::Range { .. } => Self::Range(range),
        }
    }
}

impl From<dialoguer::Error> for AppError {
    fn from(err: dialoguer::Error) -> Self {
        match err {
            // Ctrl-C at a prompt outside `Prompter`, or at the quit confirmation itself
            dialoguer::Error::IO(e) if e.kind() == io::ErrorKind::Interrupted => Self::Cancelled,
            other => Self::Prompt(other),
        }
    }
}

impl AppError {
    /// Whether the run has to stop.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::Acquisition(_) | Self::Cancelled
        )
    }

    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Configuration(_) => ExitCode::from(2),
            _ => ExitCode::FAILURE,
        }
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;
