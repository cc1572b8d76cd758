/*
 * Responsibility
 * - Record の検証失敗を分類する (InvalidInput / OutOfRange)
 * - どのフィールドで失敗したかを保持し、上位で分類を失わずに変換できるようにする
 */
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Empty after sanitizing, not an allowed value, or unparsable.
    #[error("{field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("{field} is too long: limit {max} characters")]
    OutOfRange { field: &'static str, max: usize },
}

impl ValidationError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::InvalidInput { field, .. } | ValidationError::OutOfRange { field, .. } => {
                field
            }
        }
    }
}
