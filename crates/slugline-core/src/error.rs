use thiserror::Error;

/// Errors that can occur while turning a screenplay into a [`Script`](crate::Script).
///
/// Every document parse is all-or-nothing: when one of these is returned no
/// partial model exists for that document.
#[derive(Debug, Error)]
pub enum SluglineError {
    /// The file extension or content is not a screenplay format we read.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The document is not well-formed, or could not be decoded as text.
    #[error("malformed input: {reason}")]
    MalformedInput {
        /// What went wrong, including the reader's position when known.
        reason: String,
    },

    /// The page-text extraction collaborator is missing or failed.
    #[error("page text extraction unavailable: {0}")]
    ExtractionUnavailable(String),

    /// A regex pattern failed to compile (should not happen with static patterns).
    #[error("regex compilation error: {0}")]
    RegexError(#[from] regex::Error),
}

impl SluglineError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            reason: reason.into(),
        }
    }
}

impl From<quick_xml::Error> for SluglineError {
    fn from(err: quick_xml::Error) -> Self {
        Self::malformed(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for SluglineError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::malformed(err.to_string())
    }
}

/// Result type alias for slugline operations.
pub type Result<T> = std::result::Result<T, SluglineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let err = SluglineError::UnsupportedFormat(".docx".into());
        assert_eq!(err.to_string(), "unsupported format: .docx");

        let err = SluglineError::malformed("unexpected end of file");
        assert!(err.to_string().contains("unexpected end of file"));

        let err = SluglineError::ExtractionUnavailable("pdf support not compiled in".into());
        assert!(err.to_string().starts_with("page text extraction unavailable"));
    }

    #[test]
    fn regex_errors_convert() {
        let err: SluglineError = regex::Regex::new("(").unwrap_err().into();
        assert!(matches!(err, SluglineError::RegexError(_)));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SluglineError>();
    }
}
