use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Basic email shape: something@something.something, no whitespace, one `@`.
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// Local check on the re-entered candidate email. Never reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Email is required")]
    Empty,

    #[error("Please enter a valid email address")]
    Malformed,

    #[error("Email does not match candidate record")]
    Mismatch,
}

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern compiles"))
}

pub fn is_email_shaped(text: &str) -> bool {
    email_regex().is_match(text)
}

/// Passes only when `entered` is non-empty, email-shaped, and byte-for-byte equal
/// to `stored`. No trimming and no case folding.
pub fn validate_confirmation_email(entered: &str, stored: &str) -> Result<(), ValidationError> {
    if entered.is_empty() {
        return Err(ValidationError::Empty);
    }
    if !is_email_shaped(entered) {
        return Err(ValidationError::Malformed);
    }
    if entered != stored {
        return Err(ValidationError::Mismatch);
    }
    Ok(())
}
