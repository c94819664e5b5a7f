use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExpandError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Keyboard hook error: {0}")]
    Hook(String),

    #[error("Input injection error: {0}")]
    Injection(String),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Trigger store not found at: {0}")]
    StoreNotFound(String),

    #[error("Invalid trigger: {0}")]
    InvalidTrigger(String),

    #[error("Engine is already running")]
    AlreadyRunning,

    #[error("Daemon already running with PID {0}")]
    DaemonAlreadyRunning(u32),

    #[error("Daemon is not running")]
    DaemonNotRunning,

    #[error("Invalid PID in daemon file")]
    InvalidPid,

    #[error("Error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ExpandError>;
