//! Tracked catalog entries and the live state fetched for them.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Tag that disables notifications for an entry while still allowing updates.
///
/// Compared by exact set membership only.
pub const SUPPRESSION_TAG: &str = "非通知";

const STORE_HOST: &str = "store.steampowered.com";
const STORE_APP_BASE: &str = "https://store.steampowered.com/app";

/// Canonical store URL for an app id.
pub fn store_url(app_id: &str) -> String {
    format!("{STORE_APP_BASE}/{app_id}/")
}

/// Extract the numeric app id from a store URL such as
/// `https://store.steampowered.com/app/620/Portal_2/`.
///
/// Only URLs on the Steam store host are accepted; the scheme is optional.
pub fn extract_app_id(url: &str) -> Option<&str> {
    let url = url.trim();
    let without_scheme = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let rest = without_scheme.strip_prefix(STORE_HOST)?.strip_prefix("/app/")?;
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    (end > 0).then(|| &rest[..end])
}

/// One tracked storefront item as persisted in the record store.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    /// Store-side handle used to address the record on update.
    pub record_id: String,
    /// Stable provider identifier (digits). Never changes after creation.
    pub app_id: String,
    pub title: String,
    pub store_url: String,
    /// `None` means not currently purchasable (e.g. unreleased).
    pub price: Option<f64>,
    pub original_price: Option<f64>,
    /// Whole percent in `0..=100`. `None` and `Some(0)` both mean no discount.
    pub sale_percent: Option<u8>,
    pub overall_review: Option<String>,
    pub cover_image: Option<String>,
    pub tags: BTreeSet<String>,
}

impl CatalogEntry {
    /// Create an entry with no commercial state yet.
    pub fn new(
        record_id: impl Into<String>,
        app_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        let app_id = app_id.into();
        Self {
            record_id: record_id.into(),
            store_url: store_url(&app_id),
            app_id,
            title: title.into(),
            price: None,
            original_price: None,
            sale_percent: None,
            overall_review: None,
            cover_image: None,
            tags: BTreeSet::new(),
        }
    }

    /// Whether the entry carries [`SUPPRESSION_TAG`].
    pub fn is_suppressed(&self) -> bool {
        self.tags.contains(SUPPRESSION_TAG)
    }

    pub fn has_discount(&self) -> bool {
        matches!(self.sale_percent, Some(p) if p > 0)
    }
}

/// Live snapshot of an item from the provider. Transient: diffed against the
/// stored entry, then written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchedState {
    pub title: String,
    pub price: Option<f64>,
    pub original_price: Option<f64>,
    pub sale_percent: Option<u8>,
    /// Formatted sentiment label, or [`NO_REVIEW_DATA`](crate::NO_REVIEW_DATA).
    pub overall_review: String,
    /// Formatted recent-review label scraped from the store page, if any.
    pub recent_review: Option<String>,
    pub cover_image: Option<String>,
}

impl FetchedState {
    pub fn has_discount(&self) -> bool {
        matches!(self.sale_percent, Some(p) if p > 0)
    }
}

/// The fields a sync overwrites on a stored entry.
///
/// Applying the same update twice leaves the entry in the same state.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryUpdate {
    pub title: String,
    pub price: Option<f64>,
    pub original_price: Option<f64>,
    pub sale_percent: Option<u8>,
    pub overall_review: String,
    pub cover_image: Option<String>,
    pub recent_review: Option<String>,
}

impl EntryUpdate {
    /// Overwrite the matching fields of `entry`. A missing cover image leaves
    /// the existing one in place.
    pub fn apply_to(&self, entry: &mut CatalogEntry) {
        entry.title.clone_from(&self.title);
        entry.price = self.price;
        entry.original_price = self.original_price;
        entry.sale_percent = self.sale_percent;
        entry.overall_review = Some(self.overall_review.clone());
        if let Some(cover) = &self.cover_image {
            entry.cover_image = Some(cover.clone());
        }
    }
}

impl From<&FetchedState> for EntryUpdate {
    fn from(state: &FetchedState) -> Self {
        Self {
            title: state.title.clone(),
            price: state.price,
            original_price: state.original_price,
            sale_percent: state.sale_percent,
            overall_review: state.overall_review.clone(),
            cover_image: state.cover_image.clone(),
            recent_review: state.recent_review.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetched() -> FetchedState {
        FetchedState {
            title: "Portal 2".into(),
            price: Some(1010.0),
            original_price: Some(1010.0),
            sale_percent: Some(0),
            overall_review: "圧倒的に好評(98%)".into(),
            recent_review: None,
            cover_image: Some("https://cdn.example/header.jpg".into()),
        }
    }

    #[test]
    fn store_url_is_derived_from_app_id() {
        assert_eq!(store_url("620"), "https://store.steampowered.com/app/620/");
        let entry = CatalogEntry::new("page-1", "620", "Portal 2");
        assert_eq!(entry.store_url, "https://store.steampowered.com/app/620/");
    }

    #[test]
    fn extract_app_id_from_store_urls() {
        assert_eq!(
            extract_app_id("https://store.steampowered.com/app/620/Portal_2/"),
            Some("620")
        );
        assert_eq!(
            extract_app_id("https://store.steampowered.com/app/1091500"),
            Some("1091500")
        );
        assert_eq!(extract_app_id("https://store.steampowered.com/app/"), None);
        assert_eq!(extract_app_id("https://example.com/"), None);
        assert_eq!(extract_app_id("store.steampowered.com/app/570/"), Some("570"));
    }

    #[test]
    fn extract_app_id_rejects_foreign_hosts() {
        assert_eq!(extract_app_id("https://example.com/app/12"), None);
        assert_eq!(
            extract_app_id("https://evil.example/store.steampowered.com/app/12"),
            None
        );
        assert_eq!(
            extract_app_id("https://store.steampowered.com.evil.example/app/12"),
            None
        );
    }

    #[test]
    fn suppression_is_exact_membership() {
        let mut entry = CatalogEntry::new("page-1", "620", "Portal 2");
        assert!(!entry.is_suppressed());

        entry.tags.insert("非通知 ".into());
        entry.tags.insert("非通知です".into());
        assert!(!entry.is_suppressed());

        entry.tags.insert(SUPPRESSION_TAG.into());
        assert!(entry.is_suppressed());
    }

    #[test]
    fn zero_percent_is_not_a_discount() {
        let mut state = fetched();
        assert!(!state.has_discount());
        state.sale_percent = None;
        assert!(!state.has_discount());
        state.sale_percent = Some(25);
        assert!(state.has_discount());
    }

    #[test]
    fn apply_update_is_idempotent() {
        let update = EntryUpdate::from(&fetched());
        let mut once = CatalogEntry::new("page-1", "620", "old title");
        once.tags.insert("puzzle".into());
        update.apply_to(&mut once);

        let mut twice = once.clone();
        update.apply_to(&mut twice);

        assert_eq!(once, twice);
        assert_eq!(once.title, "Portal 2");
        assert_eq!(once.price, Some(1010.0));
        assert!(once.tags.contains("puzzle"));
    }

    #[test]
    fn apply_update_keeps_cover_when_absent() {
        let mut state = fetched();
        state.cover_image = None;
        let mut entry = CatalogEntry::new("page-1", "620", "Portal 2");
        entry.cover_image = Some("https://cdn.example/old.jpg".into());
        EntryUpdate::from(&state).apply_to(&mut entry);
        assert_eq!(
            entry.cover_image.as_deref(),
            Some("https://cdn.example/old.jpg")
        );
    }

    #[test]
    fn fetched_state_json_null_price() {
        let json = r#"{
            "title": "Unreleased",
            "price": null,
            "original_price": null,
            "sale_percent": null,
            "overall_review": "評価なし",
            "recent_review": null,
            "cover_image": null
        }"#;
        let parsed: FetchedState = serde_json::from_str(json).unwrap();
        assert!(parsed.price.is_none());
        assert!(!parsed.has_discount());
    }
}
