//! Review sentiment labels.

/// Label stored when no review data is available.
pub const NO_REVIEW_DATA: &str = "評価なし";

const SENTIMENT_LABELS: &[(&str, &str)] = &[
    ("Overwhelmingly Positive", "圧倒的に好評"),
    ("Very Positive", "非常に好評"),
    ("Positive", "好評"),
    ("Mostly Positive", "やや好評"),
    ("Mixed", "賛否両論"),
    ("Mostly Negative", "やや不評"),
    ("Negative", "不評"),
    ("Very Negative", "非常に不評"),
    ("Overwhelmingly Negative", "圧倒的に不評"),
    ("No user reviews", "レビューなし"),
];

/// Map a provider sentiment descriptor to its display string.
///
/// Unmapped descriptors pass through verbatim.
pub fn sentiment_label(descriptor: &str) -> &str {
    SENTIMENT_LABELS
        .iter()
        .find(|(en, _)| *en == descriptor)
        .map(|(_, ja)| *ja)
        .unwrap_or(descriptor)
}

/// A summary/percentage pair, from the review API or the store page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSummary {
    pub summary: String,
    pub percent: u32,
}

impl ReviewSummary {
    /// Build from aggregate counts. Returns `None` when there are no reviews.
    pub fn from_counts(descriptor: &str, positive: u64, total: u64) -> Option<Self> {
        if total == 0 {
            return None;
        }
        let percent = (positive as f64 / total as f64 * 100.0).round() as u32;
        Some(Self {
            summary: sentiment_label(descriptor).to_string(),
            percent,
        })
    }
}

/// Format as `"{summary}({percent}%)"`, or `default` when there is nothing to show.
pub fn format_review(review: Option<&ReviewSummary>, default: &str) -> String {
    match review {
        Some(r) if !r.summary.is_empty() => format!("{}({}%)", r.summary, r.percent),
        _ => default.to_string(),
    }
}
