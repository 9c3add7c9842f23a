//! Common result and error types for invariant violations.

/// The result type for operations that can only fail through a bug.
///
/// Architecture or configuration problems are reported through dedicated
/// error enums and diagnostics. An `Err` here means an internal invariant of
/// the graph builder was broken.
pub type AionResult<T> = Result<T, InternalError>;

/// An internal error: a broken invariant, never a user input problem.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    /// Description of the broken invariant.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for InternalError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        let err = InternalError::new("node lookup out of range");
        assert_eq!(format!("{err}"), "internal error: node lookup out of range");
    }

    #[test]
    fn question_mark_converts() {
        fn inner() -> AionResult<u32> {
            let track: u32 = Err("bad track")?;
            Ok(track)
        }
        assert_eq!(inner().unwrap_err().message, "bad track");
    }

    #[test]
    fn from_string() {
        let err: InternalError = format!("track {}", 3).into();
        assert_eq!(err.message, "track 3");
    }
}
