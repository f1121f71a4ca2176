use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecordsError {
    #[error("Data source unavailable ({source_name}): {reason}")]
    DataSourceUnavailable { source_name: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV output error: {0}")]
    CsvError(#[from] csv::Error),

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

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    DataSource,
    Configuration,
    Data,
    Output,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RecordsError {
    pub fn data_source(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataSourceUnavailable {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// 將任何 store 回傳的錯誤統一為 DataSourceUnavailable
    pub fn into_data_source(self, source_name: &str) -> Self {
        match self {
            err @ Self::DataSourceUnavailable { .. } => err,
            other => Self::data_source(source_name, other.to_string()),
        }
    }

    pub fn is_data_source_failure(&self) -> bool {
        matches!(self, Self::DataSourceUnavailable { .. })
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::DataSourceUnavailable { .. } => ErrorCategory::DataSource,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::SerializationError(_) | Self::ValidationError { .. } => ErrorCategory::Data,
            Self::IoError(_) | Self::CsvError(_) => ErrorCategory::Output,
            Self::ProcessingError { .. } => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::DataSource => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Data | ErrorCategory::Output => {
                ErrorSeverity::High
            }
            ErrorCategory::Internal => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::DataSourceUnavailable { .. } => {
                "Check that the backing store is reachable and retry the request"
            }
            Self::MissingConfigError { .. } => "Add the missing setting to the configuration file",
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => {
                "Fix the configuration file and run the command again"
            }
            Self::SerializationError(_) | Self::ValidationError { .. } => {
                "Check the dataset file for malformed or duplicated records"
            }
            Self::IoError(_) => "Check that the file exists and is readable",
            Self::CsvError(_) => "Try a different output format",
            Self::ProcessingError { .. } => "This is a bug, please report it with the logs",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::DataSourceUnavailable { source_name, .. } => {
                format!("Could not read academic data from {}", source_name)
            }
            Self::MissingConfigError { field } => format!("Missing setting '{}'", field),
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RecordsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_data_source_wraps_other_kinds() {
        let err = RecordsError::ValidationError {
            message: "bad row".to_string(),
        }
        .into_data_source("enrollment_store");

        assert!(err.is_data_source_failure());
        assert!(err.to_string().contains("enrollment_store"));
        assert!(err.to_string().contains("bad row"));
    }

    #[test]
    fn test_into_data_source_keeps_original_source() {
        let err = RecordsError::data_source("grade_store", "timeout").into_data_source("other");
        match err {
            RecordsError::DataSourceUnavailable { source_name, .. } => {
                assert_eq!(source_name, "grade_store")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_severity_by_category() {
        assert_eq!(
            RecordsError::data_source("x", "y").severity(),
            ErrorSeverity::Medium
        );
        assert_eq!(
            RecordsError::MissingConfigError {
                field: "data.path".to_string()
            }
            .category(),
            ErrorCategory::Configuration
        );
    }
}
