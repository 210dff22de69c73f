use steamwatch_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("notifier returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("handshake failed: {0}")]
    Handshake(String),
    #[error("notifier is not ready")]
    NotReady,
    #[error("notifier session is closed")]
    Closed,
}

/// Errors that abort a whole sync run. Per-record failures never surface here.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("record store unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),
    #[error("notifier unavailable: {0}")]
    NotifierUnavailable(#[source] NotifyError),
}
