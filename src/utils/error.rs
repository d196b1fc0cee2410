use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("Data source error: {message}")]
    DataSourceError { message: String },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("{entity} not found: {id}")]
    NotFoundError { entity: String, id: String },

    #[error("Configuration error in '{field}': {message}")]
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

    #[error("Analysis cancelled by caller")]
    Cancelled,

    #[error("Analysis timed out after {seconds}s")]
    TimedOut { seconds: u64 },

    #[error("Analyzer task failed: {message}")]
    JoinError { message: String },
}

/// 錯誤分類，對應分析器的錯誤處理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    DataSource,
    MissingData,
    Configuration,
    Validation,
    Cancellation,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AdvisorError {
    pub fn data_source(message: impl Into<String>) -> Self {
        AdvisorError::DataSourceError {
            message: message.into(),
        }
    }

    pub fn not_found(entity: &str, id: &str) -> Self {
        AdvisorError::NotFoundError {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AdvisorError::ValidationError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            AdvisorError::DataSourceError { .. }
            | AdvisorError::HttpError(_)
            | AdvisorError::IoError(_)
            | AdvisorError::SerializationError(_) => ErrorCategory::DataSource,
            AdvisorError::NotFoundError { .. } => ErrorCategory::MissingData,
            AdvisorError::ConfigValidationError { .. }
            | AdvisorError::InvalidConfigValueError { .. }
            | AdvisorError::MissingConfigError { .. } => ErrorCategory::Configuration,
            AdvisorError::ValidationError { .. } => ErrorCategory::Validation,
            AdvisorError::Cancelled | AdvisorError::TimedOut { .. } => ErrorCategory::Cancellation,
            AdvisorError::JoinError { .. } => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::MissingData => ErrorSeverity::Low,
            ErrorCategory::DataSource | ErrorCategory::Cancellation => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Validation => ErrorSeverity::High,
            ErrorCategory::Internal => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::DataSource => {
                "Check that the data source is reachable and the credentials are valid, then retry."
            }
            ErrorCategory::MissingData => {
                "Verify the employee and organization IDs exist in the data source."
            }
            ErrorCategory::Configuration => "Fix the configuration file or command line flags.",
            ErrorCategory::Validation => "Check the requested dates: start must not be after end.",
            ErrorCategory::Cancellation => "Retry with a longer timeout.",
            ErrorCategory::Internal => "Retry the analysis; if it keeps failing, report the log output.",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AdvisorError::Cancelled => "The leave analysis was cancelled.".to_string(),
            AdvisorError::TimedOut { seconds } => {
                format!("The leave analysis did not finish within {} seconds.", seconds)
            }
            AdvisorError::ValidationError { message } => format!("Invalid leave request: {}", message),
            other => match other.category() {
                ErrorCategory::DataSource => format!("Unable to read leave data: {}", other),
                ErrorCategory::Configuration => format!("Configuration problem: {}", other),
                _ => other.to_string(),
            },
        }
    }
}

impl From<tokio::task::JoinError> for AdvisorError {
    fn from(err: tokio::task::JoinError) -> Self {
        let message = if err.is_panic() {
            format!("analyzer panicked: {}", err)
        } else {
            err.to_string()
        };
        AdvisorError::JoinError { message }
    }
}

pub type Result<T> = std::result::Result<T, AdvisorError>;
