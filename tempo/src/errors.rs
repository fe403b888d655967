use log::error;
use snafu::Snafu;

pub use crate::errors::Error::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Runtime error: Are you sure your code runs inside #[tempo::runtime]?
    RuntimeError,
    /// Configuration error: {source}.
    ConfigurationError { source: ConfigurationError },
    /// Run error: {source}.
    RunError { source: RunError },
    /// Unknown error: {info}.
    Unknown { info: String },
}

impl From<ConfigurationError> for Error {
    fn from(value: ConfigurationError) -> Self {
        Self::ConfigurationError { source: value }
    }
}

impl From<RunError> for Error {
    fn from(value: RunError) -> Self {
        Self::RunError { source: value }
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(error: tokio::task::JoinError) -> Self {
        error!("tokio join error {:?}", error);
        Self::Unknown {
            info: error.to_string(),
        }
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::Unknown {
            info: value.to_string(),
        }
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConfigurationError {
    /// Unknown easing '{name}'
    UnknownEasing { name: String },
    /// Invalid fps ({fps}): must be a finite number greater than 0
    InvalidFps { fps: f64 },
    /// Invalid duration ({seconds}s): must be a finite number greater than 0
    InvalidDuration { seconds: f64 },
    /// Invalid speed ({speed}): must be a non-zero number
    InvalidSpeed { speed: f64 },
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RunError {
    /// Run {id} is already in progress on this driver
    AlreadyRunning { id: usize },
    /// Run {id} has been cancelled
    Cancelled { id: usize },
}
