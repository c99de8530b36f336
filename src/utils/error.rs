use thiserror::Error;

#[derive(Error, Debug)]
pub enum RadarError {
    #[error("Invalid configuration for '{field}' ({value}): {reason}")]
    InvalidConfiguration {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing configuration: {field}")]
    MissingConfig { field: String },

    #[error("Source '{source_name}' failed: {reason}")]
    SourceFetchFailed { source_name: String, reason: String },

    #[error("Snapshot already exists, delete manually if necessary: {path}")]
    StoreCollision { path: String },

    #[error("Operation '{operation}' is not supported by the {backend} store")]
    NotSupported { operation: String, backend: String },

    #[error("Unreadable snapshot {path}: {reason}")]
    CorruptSnapshot { path: String, reason: String },

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RadarError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Source,
    Storage,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RadarError {
    pub fn invalid_config(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConfiguration {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn fetch_failed(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SourceFetchFailed {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    pub fn not_supported(operation: impl Into<String>, backend: impl Into<String>) -> Self {
        Self::NotSupported {
            operation: operation.into(),
            backend: backend.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidConfiguration { .. } | Self::MissingConfig { .. } => {
                ErrorCategory::Configuration
            }
            Self::SourceFetchFailed { .. } | Self::HttpError(_) => ErrorCategory::Source,
            Self::StoreCollision { .. }
            | Self::NotSupported { .. }
            | Self::CorruptSnapshot { .. }
            | Self::CsvError(_) => ErrorCategory::Storage,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 外部來源暫時失敗，稍後重跑即可
            Self::SourceFetchFailed { .. } | Self::HttpError(_) => ErrorSeverity::Medium,
            Self::NotSupported { .. } => ErrorSeverity::Low,
            Self::InvalidConfiguration { .. }
            | Self::MissingConfig { .. }
            | Self::StoreCollision { .. }
            | Self::CorruptSnapshot { .. }
            | Self::CsvError(_) => ErrorSeverity::High,
            Self::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration { .. } => {
                "Check the configuration file and command line flags against the documented values"
            }
            Self::MissingConfig { .. } => {
                "Provide the missing value in the config file or via STARTUPRADAR_API_KEY"
            }
            Self::SourceFetchFailed { .. } | Self::HttpError(_) => {
                "Verify the API key and network access, or set sources.on_failure = \"skip\""
            }
            Self::StoreCollision { .. } => {
                "Today's snapshot was already written; rename or remove it before running again"
            }
            Self::NotSupported { .. } => "Use a store backend that supports this operation",
            Self::CorruptSnapshot { .. } | Self::CsvError(_) => {
                "Inspect the snapshot files in the output directory; each needs a 'domain' column"
            }
            Self::IoError(_) => {
                "Check file permissions and free disk space for the output directory"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::SourceFetchFailed { source_name, .. } => {
                format!("Could not fetch domains from {}: {}", source_name, self)
            }
            Self::StoreCollision { path } => {
                format!("Nothing was written, a snapshot for today already exists ({})", path)
            }
            _ => self.to_string(),
        }
    }
}
