//! Store page scraping for the recent-review summary.

use scraper::{ElementRef, Html, Selector};
use steamwatch_core::ReviewSummary;

const RECENT_LABEL: &str = "最近のレビュー：";

struct ReviewSelectors {
    row: Selector,
    subtitle: Selector,
    summary: Selector,
    description: Selector,
}

impl ReviewSelectors {
    fn new() -> Self {
        Self {
            row: Selector::parse(".user_reviews_summary_row").expect("row selector"),
            subtitle: Selector::parse(".subtitle").expect("subtitle selector"),
            summary: Selector::parse(".game_review_summary").expect("summary selector"),
            description: Selector::parse(".responsive_reviewdesc").expect("description selector"),
        }
    }
}

/// Find the recent-review row on a store page and return its summary and
/// percentage. The percentage is `0` when the description carries none.
pub fn extract_recent_review(html: &str) -> Option<ReviewSummary> {
    let selectors = ReviewSelectors::new();
    let document = Html::parse_document(html);
    document.select(&selectors.row).find_map(|row| {
        if text_of(&row, &selectors.subtitle) != RECENT_LABEL {
            return None;
        }
        let summary = text_of(&row, &selectors.summary);
        let percent = first_percent(&text_of(&row, &selectors.description)).unwrap_or(0);
        Some(ReviewSummary { summary, percent })
    })
}

fn text_of(row: &ElementRef<'_>, selector: &Selector) -> String {
    row.select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// First run of digits immediately followed by `%`.
fn first_percent(text: &str) -> Option<u32> {
    let bytes = text.as_bytes();
    let pos = bytes
        .iter()
        .enumerate()
        .filter(|&(_, &b)| b == b'%')
        .find_map(|(i, _)| {
            let start = bytes[..i]
                .iter()
                .rposition(|b| !b.is_ascii_digit())
                .map_or(0, |p| p + 1);
            (start < i).then_some((start, i))
        })?;
    text[pos.0..pos.1].parse().ok()
}
