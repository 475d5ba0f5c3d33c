use std::path::{Path, PathBuf};

use phpswitcher_core::CoreError;
use phpswitcher_platform::AppPathsError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppErrorDetail {
    Message(String),
    Io {
        kind: std::io::ErrorKind,
        message: String,
    },
}

impl std::fmt::Display for AppErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Message(message) => write!(f, "{message}"),
            Self::Io { kind, message } => write!(f, "{kind}: {message}"),
        }
    }
}

impl From<String> for AppErrorDetail {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

impl From<&str> for AppErrorDetail {
    fn from(value: &str) -> Self {
        Self::Message(value.to_string())
    }
}

impl From<std::io::Error> for AppErrorDetail {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for AppErrorDetail {
    fn from(value: serde_json::Error) -> Self {
        Self::Message(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    Core(CoreError),
    PathsUnavailable(AppPathsError),
    SettingsLoadFailed {
        path: PathBuf,
        details: AppErrorDetail,
    },
    OperationFailed {
        operation: &'static str,
        details: AppErrorDetail,
    },
    NoActiveVersion,
}

impl AppError {
    pub fn settings_load_failed(path: &Path, details: impl Into<AppErrorDetail>) -> Self {
        Self::SettingsLoadFailed {
            path: path.to_path_buf(),
            details: details.into(),
        }
    }

    pub fn operation_failed(operation: &'static str, details: impl Into<AppErrorDetail>) -> Self {
        Self::OperationFailed {
            operation,
            details: details.into(),
        }
    }

    /// Actionable follow-up printed on its own line below the error.
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::Core(error) => error.hint(),
            Self::SettingsLoadFailed { .. } => {
                Some("Fix or remove the file; defaults apply when it is absent.".to_string())
            }
            Self::NoActiveVersion => {
                Some("Switch to a version first: phpswitcher use X.Y".to_string())
            }
            Self::PathsUnavailable(_) | Self::OperationFailed { .. } => None,
        }
    }
}

impl From<CoreError> for AppError {
    fn from(value: CoreError) -> Self {
        Self::Core(value)
    }
}

impl From<phpswitcher_backend::BackendError> for AppError {
    fn from(value: phpswitcher_backend::BackendError) -> Self {
        Self::Core(CoreError::Backend(value))
    }
}

impl From<AppPathsError> for AppError {
    fn from(value: AppPathsError) -> Self {
        Self::PathsUnavailable(value)
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Core(error) => write!(f, "{error}"),
            Self::PathsUnavailable(error) => write!(f, "{error}"),
            Self::SettingsLoadFailed { path, details } => {
                write!(f, "Failed to load settings from {}: {details}", path.display())
            }
            Self::OperationFailed { operation, details } => {
                write!(f, "{operation} failed: {details}")
            }
            Self::NoActiveVersion => write!(f, "No active PHP version has been recorded"),
        }
    }
}

impl std::error::Error for AppError {}
