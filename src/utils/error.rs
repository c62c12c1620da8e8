use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Upstream API returned {status}: {message}")]
    UpstreamFetchError { status: u16, message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Malformed payload in '{object}': {source}")]
    ParseError {
        object: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unrecognised trigger event: {description}")]
    UnrecognizedTrigger { description: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Object not found: {path}")]
    ObjectNotFound { path: String },

    #[error("Storage {operation} failed for '{path}': {message}")]
    StorageError {
        operation: String,
        path: String,
        message: String,
    },

    #[error("Archiving '{object}' left it in an inconsistent state: {reason}")]
    PartialArchiveError { object: String, reason: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Upstream,
    Storage,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn storage(operation: &str, path: &str, message: impl std::fmt::Display) -> Self {
        EtlError::StorageError {
            operation: operation.to_string(),
            path: path.to_string(),
            message: message.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::UnrecognizedTrigger { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            EtlError::ApiError(_) | EtlError::UpstreamFetchError { .. } => ErrorCategory::Upstream,
            EtlError::IoError(_)
            | EtlError::ObjectNotFound { .. }
            | EtlError::StorageError { .. }
            | EtlError::PartialArchiveError { .. } => ErrorCategory::Storage,
            EtlError::CsvError(_)
            | EtlError::SerializationError(_)
            | EtlError::ParseError { .. }
            | EtlError::ProcessingError { .. } => ErrorCategory::Data,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 上游暫時性錯誤，下一次排程可能就會成功
            EtlError::ApiError(_) | EtlError::UpstreamFetchError { .. } => ErrorSeverity::Medium,
            EtlError::ParseError { .. }
            | EtlError::CsvError(_)
            | EtlError::SerializationError(_)
            | EtlError::ProcessingError { .. }
            | EtlError::ObjectNotFound { .. } => ErrorSeverity::High,
            // 封存中斷需要人工介入
            EtlError::PartialArchiveError { .. }
            | EtlError::StorageError { .. }
            | EtlError::IoError(_) => ErrorSeverity::Critical,
            EtlError::UnrecognizedTrigger { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. } => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EtlError::MissingConfigError { field } => {
                format!("Provide '{}' via its command-line flag or environment variable", field)
            }
            EtlError::InvalidConfigValueError { field, .. }
            | EtlError::ConfigValidationError { field, .. } => {
                format!("Check the value configured for '{}'", field)
            }
            EtlError::UnrecognizedTrigger { .. } => {
                "Route only the schedule and staging object-created notifications to this function"
                    .to_string()
            }
            EtlError::ApiError(_) => {
                "Check network connectivity to the Spotify API; the next scheduled run will retry"
                    .to_string()
            }
            EtlError::UpstreamFetchError { status, .. } if *status == 401 || *status == 400 => {
                "Verify the Spotify client id and secret".to_string()
            }
            EtlError::UpstreamFetchError { status, .. } if *status == 404 => {
                "Verify the playlist link points to an existing public playlist".to_string()
            }
            EtlError::UpstreamFetchError { .. } => {
                "The Spotify API rejected the request; the next scheduled run will retry".to_string()
            }
            EtlError::ParseError { object, .. } => format!(
                "'{}' was left in the staging prefix; inspect it and re-run the transform manually",
                object
            ),
            EtlError::PartialArchiveError { object, .. } => format!(
                "Check whether '{}' exists under both the staging and processed prefixes and remove the stale copy",
                object
            ),
            EtlError::ObjectNotFound { path } => {
                format!("'{}' no longer exists; it may already have been archived", path)
            }
            EtlError::StorageError { .. } | EtlError::IoError(_) => {
                "Check storage permissions and availability".to_string()
            }
            EtlError::CsvError(_) | EtlError::SerializationError(_) | EtlError::ProcessingError { .. } => {
                "Inspect the payload that triggered this run".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Upstream => format!("Could not fetch playlist data: {}", self),
            ErrorCategory::Storage => format!("Storage operation failed: {}", self),
            ErrorCategory::Data => format!("Could not process playlist data: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_errors_are_categorised() {
        let err = EtlError::MissingConfigError {
            field: "spotify_client_id".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.recovery_suggestion().contains("spotify_client_id"));
    }

    #[test]
    fn test_partial_archive_is_critical() {
        let err = EtlError::PartialArchiveError {
            object: "rawdata/to_processed/a.json".to_string(),
            reason: "delete failed".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Storage);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.to_string().contains("rawdata/to_processed/a.json"));
    }

    #[test]
    fn test_upstream_auth_failure_suggests_credentials() {
        let err = EtlError::UpstreamFetchError {
            status: 401,
            message: "invalid_client".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(err.recovery_suggestion().contains("client id"));
    }
}
