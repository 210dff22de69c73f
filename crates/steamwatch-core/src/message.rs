//! Notification message templates.

use crate::entry::FetchedState;
use crate::transition::TransitionKind;

/// Build the notification text for a notable transition.
///
/// Returns `None` for [`TransitionKind::RoutineUpdate`]. A missing discount
/// renders as `0` and a missing price as `-`.
pub fn notification_message(
    kind: TransitionKind,
    fresh: &FetchedState,
    url: &str,
) -> Option<String> {
    let heading = match kind {
        TransitionKind::SaleStarted => "SALE開始検知",
        TransitionKind::ReleaseDetected => "リリース検知",
        TransitionKind::RoutineUpdate => return None,
    };
    let percent = fresh.sale_percent.unwrap_or(0);
    let price = fresh
        .price
        .map(|p| p.to_string())
        .unwrap_or_else(|| "-".to_string());
    Some(format!(
        "{heading}\nタイトル: {}\nURL: {url}\n割引率: {percent}%\n価格: {price}円",
        fresh.title
    ))
}
