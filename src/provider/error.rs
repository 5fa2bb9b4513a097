/// Error types for provider calls
///
/// A timed-out call is a distinct variant so callers can report it as a
/// provider failure rather than leaving the request blocked.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider request timed out")]
    Timeout,

    #[error("Provider returned HTTP {0}")]
    Status(u16),

    #[error("Provider transport error: {0}")]
    Transport(String),

    #[error("Provider response could not be decoded: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if err.is_decode() {
            ProviderError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ProviderError::Status(status.as_u16())
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}
