use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Address file in incorrect format at line {line}: expected {expected} columns, found {found}")]
    AddressFormatError {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("Failed to parse geocoder response after {attempts} attempts: {last_error}")]
    ResponseParseError { attempts: usize, last_error: String },

    #[error("Checkpoint error: {message}")]
    CheckpointError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Network,
    Parse,
    Storage,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl GeocodeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            GeocodeError::ApiError(_) => ErrorCategory::Network,
            GeocodeError::CsvError(_) | GeocodeError::AddressFormatError { .. } => {
                ErrorCategory::Input
            }
            GeocodeError::ResponseParseError { .. } | GeocodeError::SerializationError(_) => {
                ErrorCategory::Parse
            }
            GeocodeError::IoError(_) | GeocodeError::CheckpointError { .. } => {
                ErrorCategory::Storage
            }
            GeocodeError::ConfigError { .. }
            | GeocodeError::ConfigValidationError { .. }
            | GeocodeError::InvalidConfigValueError { .. }
            | GeocodeError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            GeocodeError::ApiError(e) if e.is_timeout() || e.is_connect() => {
                ErrorSeverity::Medium
            }
            GeocodeError::IoError(_) | GeocodeError::CheckpointError { .. } => {
                ErrorSeverity::Critical
            }
            _ => ErrorSeverity::High,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            GeocodeError::AddressFormatError { .. } => {
                "ERROR: Address file in incorrect format. Please refer to the README file for format requirements.".to_string()
            }
            GeocodeError::ResponseParseError { .. } => {
                "FAILURE TO PARSE geocoder response. Exiting program.".to_string()
            }
            GeocodeError::ApiError(e) => match e.status() {
                Some(status) => format!("Geocoder returned HTTP {}", status),
                None => format!("Could not reach the geocoder: {}", e),
            },
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => {
                "Use a pipe-delimited file with exactly 5 columns: ID|street|city|state|zip"
            }
            ErrorCategory::Network => {
                "Check connectivity to the geocoder, then rerun with --resume to continue from the last completed chunk"
            }
            ErrorCategory::Parse => {
                "Completed chunks are kept in the output file; rerun with --resume to retry the failed chunk"
            }
            ErrorCategory::Storage => {
                "Check that the output directory is writable and the state file matches the output file"
            }
            ErrorCategory::Configuration => "Review the command-line flags or the TOML configuration",
        }
    }
}

pub type Result<T> = std::result::Result<T, GeocodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_format_error_is_fatal_input() {
        let err = GeocodeError::AddressFormatError {
            line: 1,
            expected: 5,
            found: 4,
        };
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.exit_code(), 1);
        assert!(err.user_friendly_message().contains("incorrect format"));
    }

    #[test]
    fn test_checkpoint_error_exit_code() {
        let err = GeocodeError::CheckpointError {
            message: "state mismatch".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Storage);
        assert_eq!(err.exit_code(), 3);
    }
}
