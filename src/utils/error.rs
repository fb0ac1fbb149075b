use thiserror::Error;

#[derive(Error, Debug)]
pub enum HunterError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

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

    #[error("[{provider}] {message}")]
    ProviderError { provider: String, message: String },

    #[error("[{provider}] rate limited after retry")]
    RateLimited { provider: String },

    #[error("[{provider}] malformed record: {reason}")]
    MalformedRecord { provider: String, reason: String },

    #[error("Render error: {message}")]
    RenderError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl HunterError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            HunterError::ApiError(_)
            | HunterError::ProviderError { .. }
            | HunterError::RateLimited { .. } => ErrorCategory::Network,
            HunterError::TomlError(_)
            | HunterError::ConfigValidationError { .. }
            | HunterError::InvalidConfigValueError { .. }
            | HunterError::MissingConfigError { .. } => ErrorCategory::Configuration,
            HunterError::SerializationError(_) | HunterError::MalformedRecord { .. } => {
                ErrorCategory::Data
            }
            HunterError::CsvError(_) | HunterError::IoError(_) | HunterError::RenderError { .. } => {
                ErrorCategory::Output
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            HunterError::MalformedRecord { .. } => ErrorSeverity::Low,
            HunterError::ApiError(_)
            | HunterError::ProviderError { .. }
            | HunterError::RateLimited { .. } => ErrorSeverity::Medium,
            HunterError::TomlError(_)
            | HunterError::ConfigValidationError { .. }
            | HunterError::InvalidConfigValueError { .. }
            | HunterError::MissingConfigError { .. }
            | HunterError::SerializationError(_)
            | HunterError::CsvError(_)
            | HunterError::RenderError { .. } => ErrorSeverity::High,
            HunterError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => {
                "Check your network connection and API keys, then try again later"
            }
            ErrorCategory::Configuration => {
                "Fix the configuration file or command-line flags and rerun"
            }
            ErrorCategory::Data => "The provider returned unexpected data; run with --verbose for details",
            ErrorCategory::Output => "Make sure the output directory exists and is writable",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            HunterError::MissingConfigError { field } => {
                format!("Missing configuration: {}", field)
            }
            HunterError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting '{}': {}", field, reason)
            }
            HunterError::IoError(e) => format!("Could not read or write a file: {}", e),
            other => other.to_string(),
        }
    }

    pub(crate) fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        HunterError::ProviderError {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub(crate) fn malformed(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        HunterError::MalformedRecord {
            provider: provider.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HunterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_high_severity() {
        let err = HunterError::MissingConfigError {
            field: "keys.rentcast".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(
            err.user_friendly_message(),
            "Missing configuration: keys.rentcast"
        );
    }

    #[test]
    fn test_malformed_record_is_low_severity() {
        let err = HunterError::malformed("zillow", "item is not an object");
        assert_eq!(err.category(), ErrorCategory::Data);
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert_eq!(err.to_string(), "[zillow] malformed record: item is not an object");
    }
}
