use thiserror::Error;

/// Errors raised by romanization-dependent conversions.
///
/// Ambiguity in furigana distribution is not an error; it resolves to the
/// documented whole-term fallback segment instead.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RomanizationError {
    #[error("no romanization backend is configured for this conversion")]
    Unsupported,
}
