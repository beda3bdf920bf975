use thiserror::Error;

/// Failure of one HTTP exchange; travels as the source of
/// [`wirebind::Error::Transport`].
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TransportError {
    /// The marker-built request could not be turned into a reqwest request.
    #[error("Failed to prepare request: {0}")]
    Prepare(String),

    #[error("Request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// Non-2xx status.
    #[error("HTTP {status}: {body_preview}")]
    Status {
        status: reqwest::StatusCode,
        body_preview: String,
    },
}
