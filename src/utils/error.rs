use thiserror::Error;

#[derive(Error, Debug)]
pub enum CvError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Missing required column: {column}")]
    MissingColumn { column: String },

    #[error("Invalid value '{value}' in column '{column}' at row {row}: {reason}")]
    InvalidField {
        row: usize,
        column: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Input,
    Configuration,
    Rendering,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CvError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CvError::ZipError(_) | CvError::IoError(_) => ErrorCategory::Io,
            CvError::CsvError(_)
            | CvError::MissingColumn { .. }
            | CvError::InvalidField { .. } => ErrorCategory::Input,
            CvError::ConfigValidationError { .. }
            | CvError::MissingConfigError { .. }
            | CvError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            CvError::SerializationError(_) => ErrorCategory::Rendering,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Io => ErrorSeverity::Critical,
            ErrorCategory::Input | ErrorCategory::Rendering => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Medium,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            CvError::MissingColumn { column } => format!(
                "Add a '{}' column to the positions sheet header",
                column
            ),
            CvError::InvalidField { column, .. } => format!(
                "Fix the value in column '{}' (years must contain a four digit year)",
                column
            ),
            CvError::CsvError(_) => {
                "Check that the sheet is valid CSV/TSV with a consistent number of columns"
                    .to_string()
            }
            CvError::IoError(_) => "Check that the input files exist and the output path is writable".to_string(),
            CvError::ZipError(_) => "Disable bundling or check free disk space".to_string(),
            CvError::ConfigValidationError { field, .. }
            | CvError::InvalidConfigValueError { field, .. }
            | CvError::MissingConfigError { field } => {
                format!("Review the '{}' setting", field)
            }
            CvError::SerializationError(_) => {
                "Re-run with --verbose and inspect the offending entry".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Io => format!("Could not read or write a file: {}", self),
            ErrorCategory::Input => format!("The positions data is malformed: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Rendering => format!("Failed to render the document: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, CvError>;
