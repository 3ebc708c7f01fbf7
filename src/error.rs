use thiserror::Error;

/// A parse failure reported by the front end.
///
/// `line` and `column` are 1-based and point at the first offending node in
/// document order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at line {line}, column {column}")]
pub struct SyntaxError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

/// Everything that can stop an extraction.
///
/// [`crate::extract::CallGraphBuilder::extract`] recovers all of these into an
/// empty dataset; `try_extract` hands them back to the caller.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("source is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },

    #[error("front-end failure: {0}")]
    Frontend(String),

    #[error("malformed syntax tree: {0}")]
    MalformedTree(String),
}

impl ExtractError {
    /// Short machine-friendly tag, used in event records and index reports.
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractError::Syntax(_) => "syntax",
            ExtractError::TooLarge { .. } => "too_large",
            ExtractError::Frontend(_) => "frontend",
            ExtractError::MalformedTree(_) => "malformed_tree",
        }
    }
}

pub type Result<T> = std::result::Result<T, ExtractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_display_includes_location() {
        let err = SyntaxError {
            message: "invalid syntax".into(),
            line: 3,
            column: 9,
        };
        assert_eq!(err.to_string(), "invalid syntax at line 3, column 9");

        let wrapped: ExtractError = err.into();
        assert_eq!(wrapped.kind(), "syntax");
        assert!(wrapped.to_string().starts_with("syntax error: invalid syntax"));
    }

    #[test]
    fn test_too_large_message() {
        let err = ExtractError::TooLarge { size: 10, limit: 4 };
        assert_eq!(err.to_string(), "source is 10 bytes, limit is 4");
        assert_eq!(err.kind(), "too_large");
    }
}
