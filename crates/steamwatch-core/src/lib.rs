pub mod entry;
pub mod message;
pub mod review;
pub mod transition;

pub use entry::{
    CatalogEntry, EntryUpdate, FetchedState, SUPPRESSION_TAG, extract_app_id, store_url,
};
pub use message::notification_message;
pub use review::{NO_REVIEW_DATA, ReviewSummary, format_review, sentiment_label};
pub use transition::{TransitionKind, classify};
