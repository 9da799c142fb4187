use std::path::PathBuf;

pub type TriggerSfResult<T> = Result<T, TriggerSfError>;

/// Failure classes and their process exit codes. Exit 1 is left to commands
/// that finish but report a negative result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    InputValidationError,
    IoSystemError,
    InternalError,
}

impl ErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::InputValidationError => 2,
            Self::IoSystemError => 3,
            Self::InternalError => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InputValidationError => "InputValidationError",
            Self::IoSystemError => "IoSystemError",
            Self::InternalError => "InternalError",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TriggerSfError {
    #[error("invalid trigger configuration: {message}")]
    Configuration { message: String },
    #[error("efficiencies are only provided for decay modes 0, 1, 10, got {decay_mode}")]
    InvalidDecayMode { decay_mode: i32 },
    #[error("uncertainty mode '{mode}' is not valid here, expected one of: {expected}")]
    InvalidUncertaintyMode {
        mode: String,
        expected: &'static str,
    },
    #[error("failed to read calibration bundle '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse calibration bundle '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("calibration table '{name}' is missing from the bundle")]
    MissingTable { name: String },
    #[error("calibration table '{name}' has kind '{found}', expected '{expected}'")]
    TableKindMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("calibration table '{name}' is malformed: {message}")]
    InvalidTable { name: String, message: String },
}

impl TriggerSfError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn invalid_table(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidTable {
            name: name.into(),
            message: message.into(),
        }
    }

    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration { .. }
            | Self::InvalidDecayMode { .. }
            | Self::InvalidUncertaintyMode { .. }
            | Self::MissingTable { .. }
            | Self::TableKindMismatch { .. }
            | Self::InvalidTable { .. } => ErrorCategory::InputValidationError,
            Self::Read { .. } | Self::Parse { .. } => ErrorCategory::IoSystemError,
        }
    }

    pub const fn exit_code(&self) -> i32 {
        self.category().exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.category().as_str(), self)
    }
}
