//! Provider layer: live commercial and review state for tracked items.

mod error;
pub use error::ProviderError;

mod scrape;
mod steam;

pub use scrape::extract_recent_review;
pub use steam::{SteamConfig, SteamProvider};

use async_trait::async_trait;
use steamwatch_core::FetchedState;

/// Source of live state for an item id.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Fetch the current state of `app_id`.
    ///
    /// Fails with [`ProviderError::ItemNotFound`] when the id is unknown or
    /// delisted; every other error means the provider is unavailable.
    async fn fetch_state(&self, app_id: &str) -> Result<FetchedState, ProviderError>;
}
