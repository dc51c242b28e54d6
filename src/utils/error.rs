use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single field-level problem, reported to editors at save time or to
/// visitors next to the offending form input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn required(field: impl Into<String>) -> Self {
        Self::new(field, "This field is required.")
    }

    pub fn too_long(field: impl Into<String>, max: usize, actual: usize) -> Self {
        Self::new(
            field,
            format!(
                "Ensure this value has at most {} characters (it has {}).",
                max, actual
            ),
        )
    }

    /// Prefix the field path, e.g. `title` -> `services[2].title`.
    pub fn nested(mut self, prefix: &str) -> Self {
        self.field = format!("{}.{}", prefix, self.field);
        self
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("{entity} is invalid: {}", join_errors(.errors))]
    SchemaInvalid {
        entity: String,
        errors: Vec<FieldError>,
    },

    #[error("Form submission rejected: {}", join_errors(.errors))]
    FormInvalid { errors: Vec<FieldError> },

    #[error("Page {0} not found")]
    PageNotFound(u64),

    #[error("Image {0} not found")]
    ImageNotFound(u64),

    #[error("Page tree error: {message}")]
    TreeError { message: String },

    #[error("Mail error: {message}")]
    MailError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Configuration,
    Schema,
    Submission,
    Content,
    Mail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SiteError {
    pub fn config(message: impl Into<String>) -> Self {
        SiteError::ConfigError {
            message: message.into(),
        }
    }

    pub fn tree(message: impl Into<String>) -> Self {
        SiteError::TreeError {
            message: message.into(),
        }
    }

    pub fn mail(message: impl fmt::Display) -> Self {
        SiteError::MailError {
            message: message.to_string(),
        }
    }

    /// Field-level errors carried by validation failures, empty otherwise.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            SiteError::SchemaInvalid { errors, .. } | SiteError::FormInvalid { errors } => errors,
            _ => &[],
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            SiteError::IoError(_) | SiteError::SerializationError(_) | SiteError::CsvError(_) => {
                ErrorCategory::Io
            }
            SiteError::ConfigError { .. } | SiteError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            SiteError::SchemaInvalid { .. } => ErrorCategory::Schema,
            SiteError::FormInvalid { .. } => ErrorCategory::Submission,
            SiteError::PageNotFound(_) | SiteError::ImageNotFound(_) | SiteError::TreeError { .. } => {
                ErrorCategory::Content
            }
            SiteError::MailError { .. } => ErrorCategory::Mail,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Submission => ErrorSeverity::Low,
            ErrorCategory::Mail => ErrorSeverity::Medium,
            ErrorCategory::Schema | ErrorCategory::Content => ErrorSeverity::High,
            ErrorCategory::Io | ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Io => "Check that the content and submission paths exist and are writable",
            ErrorCategory::Configuration => "Review the TOML configuration file and environment variables",
            ErrorCategory::Schema => "Fix the listed fields and save the page again",
            ErrorCategory::Submission => "Correct the highlighted form fields and submit again",
            ErrorCategory::Content => "Verify the page or image id exists in the content file",
            ErrorCategory::Mail => "Check the SMTP settings; the submission itself has been kept",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SiteError::FormInvalid { errors } => {
                format!("The form contains {} invalid field(s)", errors.len())
            }
            SiteError::SchemaInvalid { entity, errors } => {
                format!("{} cannot be saved: {} invalid field(s)", entity, errors.len())
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SiteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_error_lists_fields() {
        let err = SiteError::SchemaInvalid {
            entity: "HomePage".to_string(),
            errors: vec![
                FieldError::required("hero_title"),
                FieldError::too_long("hero_kicker", 150, 151),
            ],
        };
        let text = err.to_string();
        assert!(text.starts_with("HomePage is invalid"));
        assert!(text.contains("hero_title: This field is required."));
        assert!(text.contains("at most 150 characters (it has 151)"));
        assert_eq!(err.field_errors().len(), 2);
        assert_eq!(err.category(), ErrorCategory::Schema);
    }

    #[test]
    fn submission_errors_are_low_severity() {
        let err = SiteError::FormInvalid {
            errors: vec![FieldError::required("email")],
        };
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert_eq!(err.user_friendly_message(), "The form contains 1 invalid field(s)");
    }

    #[test]
    fn nested_prefixes_field_path() {
        let err = FieldError::required("title").nested("services[2]");
        assert_eq!(err.field, "services[2].title");
    }
}
