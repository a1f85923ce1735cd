use thiserror::Error;

#[derive(Error, Debug)]
pub enum PredictError {
    #[error("Failed to load classifier artifact '{path}': {message}")]
    ArtifactLoadError { path: String, message: String },

    #[error("Inference failed: {message}")]
    InferenceError { message: String },

    #[error("Unrecognized classifier output: {raw}")]
    MappingError { raw: String },

    #[error("Reference dataset not found: {path}")]
    DatasetMissingError { path: String },

    #[error("No '{group}' records available to summarize '{field}'")]
    EmptyGroupError { field: String, group: String },

    #[error("Invalid feature '{field}': {reason}")]
    InvalidFeatureError { field: String, reason: String },

    #[error("Unknown measurement field: {name}")]
    UnknownFieldError { name: String },

    #[error("Invalid dataset record at row {row}: {reason}")]
    InvalidRecordError { row: usize, reason: String },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

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
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Model,
    Input,
    Dataset,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl PredictError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ArtifactLoadError { .. } | Self::InferenceError { .. } | Self::MappingError { .. } => {
                ErrorCategory::Model
            }
            Self::InvalidFeatureError { .. } | Self::UnknownFieldError { .. } => ErrorCategory::Input,
            Self::DatasetMissingError { .. }
            | Self::EmptyGroupError { .. }
            | Self::InvalidRecordError { .. }
            | Self::CsvError(_) => ErrorCategory::Dataset,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::ZipError(_) | Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ArtifactLoadError { .. } => ErrorSeverity::Critical,
            Self::DatasetMissingError { .. }
            | Self::EmptyGroupError { .. }
            | Self::InvalidRecordError { .. } => ErrorSeverity::Low,
            Self::UnknownFieldError { .. }
            | Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorSeverity::Medium,
            _ => ErrorSeverity::High,
        }
    }

    /// 是否可在請求邊界處理而不中止服務
    pub fn is_recoverable(&self) -> bool {
        self.severity() != ErrorSeverity::Critical
    }

    /// Process exit code: 3 fatal, 2 configuration, 1 any other failure.
    pub fn exit_code(&self) -> i32 {
        match (self.severity(), self.category()) {
            (ErrorSeverity::Critical, _) => 3,
            (_, ErrorCategory::Configuration) => 2,
            _ => 1,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ArtifactLoadError { path, .. } => {
                format!("The prediction model could not be loaded from '{}'.", path)
            }
            Self::InferenceError { .. } => {
                "Error during prediction. Please check your model or input format.".to_string()
            }
            Self::MappingError { raw } => format!(
                "The model returned '{}', which is not a recognized diagnosis. No result is shown.",
                raw
            ),
            Self::DatasetMissingError { .. } => {
                "Reference dataset is unavailable; dataset insights are skipped.".to_string()
            }
            Self::EmptyGroupError { field, group } => {
                format!("Not enough {} samples to summarize {}.", group, field)
            }
            Self::InvalidFeatureError { field, reason } => {
                format!("Input value for '{}' is invalid: {}.", field, reason)
            }
            Self::UnknownFieldError { name } => format!("'{}' is not a known measurement.", name),
            Self::InvalidRecordError { row, .. } => {
                format!("The reference dataset has an invalid row ({}).", row)
            }
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => format!("Configuration problem: {}", self),
            Self::ZipError(_) | Self::IoError(_) | Self::SerializationError(_) | Self::CsvError(_) => {
                format!("A system error occurred: {}", self)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::ArtifactLoadError { .. } => {
                "Check [model].artifact_path and make sure the file is a valid classifier artifact".to_string()
            }
            Self::InferenceError { .. } => {
                "Make sure the artifact's feature_names match the ten mean measurements".to_string()
            }
            Self::MappingError { .. } => {
                "Use an artifact that outputs 0/1 or B/M, or set [model].mapping_policy".to_string()
            }
            Self::DatasetMissingError { .. } => {
                "Set [dataset].path to a CSV with a diagnosis column".to_string()
            }
            Self::EmptyGroupError { .. } => {
                "Use a reference dataset containing both benign and malignant samples".to_string()
            }
            Self::InvalidFeatureError { .. } => {
                "Provide all ten measurements as finite numbers".to_string()
            }
            Self::UnknownFieldError { .. } => format!(
                "Use one of: {}",
                crate::domain::model::Feature::ALL
                    .iter()
                    .map(|f| f.name())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Self::InvalidRecordError { .. } | Self::CsvError(_) => {
                "Fix the reference CSV file or point [dataset].path at a valid one".to_string()
            }
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => "Review the TOML configuration file".to_string(),
            Self::ZipError(_) | Self::IoError(_) | Self::SerializationError(_) => {
                "Check file permissions and available disk space".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, PredictError>;
