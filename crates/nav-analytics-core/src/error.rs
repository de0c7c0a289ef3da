use thiserror::Error;

#[derive(Debug, Error)]
pub enum NavAnalyticsError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Arithmetic overflow in {context}")]
    ArithmeticOverflow { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for NavAnalyticsError {
    fn from(e: serde_json::Error) -> Self {
        NavAnalyticsError::SerializationError(e.to_string())
    }
}
