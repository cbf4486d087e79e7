use thiserror::Error;

use screening_spec::SpecError;

/// Transport-level failures talking to the screening server.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Non-2xx response; the body text (or the status when it is blank) is what
    /// the user sees.
    #[error("{body}")]
    Status { status: u16, body: String },
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

/// Failures reading or writing persisted session state.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("session storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Anything a page-level action can fail with.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Please answer all questions before submitting.")]
    Incomplete(#[source] screening_spec::CollectError),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Spec(#[from] SpecError),
}
