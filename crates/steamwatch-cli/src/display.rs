//! Vertical card display for catalog entries and fetched provider state.

use std::fmt::Write;

use steamwatch_core::{CatalogEntry, FetchedState, store_url};

const LABEL_WIDTH: usize = 16;

// ── Public API ──

/// Render one stored entry as a card.
pub fn entry_card(entry: &CatalogEntry) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ===", entry.title);
    row(&mut out, "app_id", &entry.app_id);
    row(&mut out, "url", &entry.store_url);
    row(&mut out, "price", &amount(entry.price));
    row(&mut out, "original_price", &amount(entry.original_price));
    row(&mut out, "sale", &percent(entry.sale_percent));
    if let Some(review) = &entry.overall_review {
        row(&mut out, "overall_review", review);
    }
    if !entry.tags.is_empty() {
        let tags: Vec<&str> = entry.tags.iter().map(String::as_str).collect();
        row(&mut out, "tags", &tags.join(", "));
    }
    if entry.is_suppressed() {
        row(&mut out, "notifications", "off");
    }
    out
}

/// Render freshly fetched provider state as a card.
pub fn state_card(app_id: &str, state: &FetchedState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ===", state.title);
    row(&mut out, "app_id", app_id);
    row(&mut out, "url", &store_url(app_id));
    row(&mut out, "price", &amount(state.price));
    row(&mut out, "original_price", &amount(state.original_price));
    row(&mut out, "sale", &percent(state.sale_percent));
    row(&mut out, "overall_review", &state.overall_review);
    if let Some(recent) = &state.recent_review {
        row(&mut out, "recent_review", recent);
    }
    if let Some(cover) = &state.cover_image {
        row(&mut out, "cover_image", cover);
    }
    out
}

// ── Helpers ──

fn row(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(out, "  {label:<LABEL_WIDTH$} {value}");
}

fn amount(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v}円"),
        None => "(unreleased)".to_string(),
    }
}

fn percent(value: Option<u8>) -> String {
    match value {
        Some(p) if p > 0 => format!("{p}% off"),
        _ => "-".to_string(),
    }
}
