use thiserror::Error;

use shared_models::error::AppError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SlotError {
    #[error("Unknown weekday: {0}")]
    UnknownWeekday(String),

    #[error("Malformed availability entry for {day}: '{value}' ({reason})")]
    MalformedTemplateEntry {
        day: String,
        value: String,
        reason: String,
    },

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Limit must be between 1 and {max}, got {limit}")]
    InvalidLimit { limit: usize, max: usize },

    #[error("Lead time must be between 0 and {max} minutes, got {minutes}")]
    InvalidLeadTime { minutes: i64, max: i64 },
}

impl From<SlotError> for AppError {
    fn from(err: SlotError) -> Self {
        match err {
            SlotError::InvalidTimezone(_) => AppError::BadRequest(err.to_string()),
            other => AppError::ValidationError(other.to_string()),
        }
    }
}
