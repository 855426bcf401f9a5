use thiserror::Error;

#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("A responsible party is required to submit a review")]
    MissingResponsible,

    #[error("Review rejected: {unset_count} item(s) still unmarked")]
    Rejected { unset_count: usize },

    #[error("{resource} {id} not found")]
    NotFound { resource: String, id: String },

    #[error("Store unavailable: {message}")]
    Unavailable { message: String },

    #[error("Equipment {equipment_id} does not belong to vehicle {vehicle_id}")]
    UnknownItem { vehicle_id: i64, equipment_id: i64 },

    #[error("No review in progress")]
    NoActiveDraft,

    #[error("Store rejected the request ({status}): {body}")]
    StoreRejected { status: u16, body: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid configuration value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

pub type Result<T> = std::result::Result<T, InventoryError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Unavailable,
    Defect,
    Store,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl InventoryError {
    pub fn not_found(resource: &str, id: impl ToString) -> Self {
        InventoryError::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        InventoryError::Unavailable {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            InventoryError::MissingResponsible | InventoryError::Rejected { .. } => {
                ErrorCategory::Validation
            }
            InventoryError::NotFound { .. } => ErrorCategory::NotFound,
            InventoryError::Unavailable { .. } => ErrorCategory::Unavailable,
            InventoryError::ApiError(e) if e.is_connect() || e.is_timeout() => {
                ErrorCategory::Unavailable
            }
            InventoryError::UnknownItem { .. } | InventoryError::NoActiveDraft => {
                ErrorCategory::Defect
            }
            InventoryError::StoreRejected { .. }
            | InventoryError::ApiError(_)
            | InventoryError::SerializationError(_) => ErrorCategory::Store,
            InventoryError::IoError(_)
            | InventoryError::InvalidConfigValueError { .. }
            | InventoryError::ConfigValidationError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation => ErrorSeverity::Low,
            ErrorCategory::Unavailable => ErrorSeverity::Medium,
            ErrorCategory::NotFound | ErrorCategory::Store => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::Defect => ErrorSeverity::Critical,
        }
    }

    /// Only an unreachable store is worth retrying without changing anything.
    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::Unavailable
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            InventoryError::MissingResponsible => {
                "Select a responsible party before saving the review".to_string()
            }
            InventoryError::Rejected { unset_count } => format!(
                "Mark the remaining {} item(s) as present or absent, then submit again",
                unset_count
            ),
            InventoryError::NotFound { resource, .. } => {
                format!("The {} no longer exists; reload the fleet", resource)
            }
            InventoryError::StoreRejected { .. } => {
                "Check the review payload against the store's validation message".to_string()
            }
            InventoryError::InvalidConfigValueError { field, .. }
            | InventoryError::ConfigValidationError { field, .. } => {
                format!("Fix the '{}' setting and try again", field)
            }
            InventoryError::IoError(_) => "Check the file path and permissions".to_string(),
            _ if self.is_retryable() => {
                "Check that the store is reachable and retry; the draft is kept".to_string()
            }
            _ => "This is a bug; please report it with the logs".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Validation => self.to_string(),
            ErrorCategory::NotFound => format!("Not found: {}", self),
            ErrorCategory::Unavailable => {
                format!("Could not reach the inventory store: {}", self)
            }
            ErrorCategory::Store => format!("The inventory store returned an error: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Defect => format!("Internal error: {}", self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_low_severity() {
        let err = InventoryError::Rejected { unset_count: 2 };
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert!(err.recovery_suggestion().contains('2'));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_unavailable_is_retryable() {
        let err = InventoryError::unavailable("connection refused");
        assert!(err.is_retryable());
        assert_eq!(err.severity(), ErrorSeverity::Medium);
    }

    #[test]
    fn test_unknown_item_is_defect() {
        let err = InventoryError::UnknownItem {
            vehicle_id: 1,
            equipment_id: 99,
        };
        assert_eq!(err.category(), ErrorCategory::Defect);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }
}
