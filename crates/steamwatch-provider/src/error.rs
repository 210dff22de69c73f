use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("item not found: {0}")]
    ItemNotFound(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProviderError {
    /// `true` for [`ItemNotFound`](Self::ItemNotFound); any other variant means
    /// the provider could not be reached or understood.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ItemNotFound(_))
    }
}
