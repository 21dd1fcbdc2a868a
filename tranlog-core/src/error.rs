use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors surfaced to the caller of a logging operation.
#[derive(Debug, Error)]
pub enum TranLogError {
    /// An append to a log file failed. Nothing after it was written.
    #[error("LogFile({}) write error {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid settings: {0}")]
    Settings(#[from] serde_json::Error),
    #[error("unable to read settings: {0}")]
    Io(#[from] io::Error),
    #[error("invalid environment configuration: {0}")]
    Env(String),
    #[error("a global logger is already installed")]
    GlobalAlreadySet,
    #[error("another logger is already installed for the log crate")]
    LoggerAlreadySet,
}

/// Non-fatal problems found while applying settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigWarning {
    #[error("Tag '{0}' has multiple definitions in the settings")]
    DuplicateTag(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown message type '{0}'")]
pub struct UnknownMsgType(pub String);
