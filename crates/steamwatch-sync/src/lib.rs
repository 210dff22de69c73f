//! Sync layer: the catalog sync engine and the notifier it reports through.

mod discord;
mod engine;
mod error;
mod notifier;

pub use discord::{DiscordConfig, DiscordNotifier};
pub use engine::{RecordOutcome, RunReport, SyncEngine};
pub use error::{NotifyError, SyncError};
pub use notifier::{Notifier, ReadySignal, Readiness};
