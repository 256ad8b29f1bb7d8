//! Error types for recipe compilation.

use thiserror::Error;

/// The class of whitelisted token a validator was checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Operator,
    Direction,
    JoinType,
    Logic,
    Aggregate,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Operator => write!(f, "operator"),
            TokenKind::Direction => write!(f, "sort direction"),
            TokenKind::JoinType => write!(f, "join type"),
            TokenKind::Logic => write!(f, "logic connector"),
            TokenKind::Aggregate => write!(f, "aggregate function"),
        }
    }
}

/// Failure of a single validator, before it is tied to a step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid {kind}: '{value}'. Expected one of: {}", allowed.join(", "))]
    InvalidToken {
        kind: TokenKind,
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("Invalid expression '{expression}': {reason}")]
    InvalidExpression { expression: String, reason: String },
}

impl ValidationError {
    pub(crate) fn token(kind: TokenKind, value: &str, allowed: &'static [&'static str]) -> Self {
        Self::InvalidToken {
            kind,
            value: value.to_string(),
            allowed,
        }
    }

    pub(crate) fn expression(expression: &str, reason: impl Into<String>) -> Self {
        Self::InvalidExpression {
            expression: expression.to_string(),
            reason: reason.into(),
        }
    }

    /// Attach the position and type of the step that triggered this failure.
    pub fn at(self, index: usize, step: &'static str) -> RecipeError {
        match self {
            ValidationError::InvalidToken {
                kind,
                value,
                allowed,
            } => RecipeError::InvalidToken {
                index,
                step,
                kind,
                value,
                allowed,
            },
            ValidationError::InvalidExpression { expression, reason } => {
                RecipeError::InvalidExpression {
                    index,
                    step,
                    expression,
                    reason,
                }
            }
        }
    }
}

/// The main error type for recipe operations.
#[derive(Debug, Error)]
pub enum RecipeError {
    /// A whitelisted token (operator, direction, ...) was outside its set.
    #[error("Step {index} ({step}): invalid {kind} '{value}'. Expected one of: {}", allowed.join(", "))]
    InvalidToken {
        index: usize,
        step: &'static str,
        kind: TokenKind,
        value: String,
        allowed: &'static [&'static str],
    },

    /// A free-text expression was rejected.
    #[error("Step {index} ({step}): invalid expression '{expression}': {reason}")]
    InvalidExpression {
        index: usize,
        step: &'static str,
        expression: String,
        reason: String,
    },

    /// A step is missing a required field.
    #[error("Step {index} ({step}) is malformed: {message}")]
    MalformedStep {
        index: usize,
        step: &'static str,
        message: String,
    },

    /// The source table reference is unusable.
    #[error("Invalid source: {0}")]
    InvalidSource(String),

    /// The recipe document could not be decoded.
    #[error("Recipe decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RecipeError {
    /// Create a malformed step error.
    pub fn malformed(index: usize, step: &'static str, message: impl Into<String>) -> Self {
        Self::MalformedStep {
            index,
            step,
            message: message.into(),
        }
    }

    /// Index of the failing step, for errors raised while folding steps.
    pub fn step_index(&self) -> Option<usize> {
        match self {
            RecipeError::InvalidToken { index, .. }
            | RecipeError::InvalidExpression { index, .. }
            | RecipeError::MalformedStep { index, .. } => Some(*index),
            _ => None,
        }
    }
}

/// Result type alias for recipe operations.
pub type RecipeResult<T> = Result<T, RecipeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_error_display() {
        let err = ValidationError::token(TokenKind::Logic, "XOR", &["AND", "OR"]);
        assert_eq!(
            err.to_string(),
            "Invalid logic connector: 'XOR'. Expected one of: AND, OR"
        );
    }

    #[test]
    fn test_error_at_step() {
        let err = ValidationError::expression("1; DROP TABLE x", "semicolons are not allowed")
            .at(3, "add_column");
        assert_eq!(err.step_index(), Some(3));
        assert_eq!(
            err.to_string(),
            "Step 3 (add_column): invalid expression '1; DROP TABLE x': semicolons are not allowed"
        );
    }

    #[test]
    fn test_malformed_display() {
        let err = RecipeError::malformed(0, "join", "missing 'table'");
        assert_eq!(err.to_string(), "Step 0 (join) is malformed: missing 'table'");
    }
}
