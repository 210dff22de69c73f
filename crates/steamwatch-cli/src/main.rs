mod config;
mod display;

use anyhow::Context;
use clap::Parser;
use futures::TryStreamExt;
use steamwatch_core::{CatalogEntry, extract_app_id};
use steamwatch_provider::{Provider, SteamProvider};
use steamwatch_store::{NotionStore, list_all};
use steamwatch_sync::{DiscordNotifier, SyncEngine};
use tracing_subscriber::EnvFilter;

use config::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    tracing::info!("steamwatch v{}", env!("CARGO_PKG_VERSION"));

    match Cli::parse().command {
        Command::Sync {
            notion,
            discord,
            steam,
        } => {
            let store = NotionStore::new(notion.into());
            let provider = SteamProvider::new(steam.into());
            let (notifier, readiness) = DiscordNotifier::login(discord.into());

            let report = SyncEngine::new(&store, &provider, &*notifier)
                .run(readiness)
                .await
                .context("sync run aborted")?;
            eprintln!(
                "Synced {} entries: {} updated, {} notified, {} suppressed, {} skipped ({:.1}s)",
                report.seen(),
                report.updated(),
                report.notified(),
                report.suppressed(),
                report.skipped(),
                (report.finished_at - report.started_at).num_milliseconds() as f64 / 1000.0,
            );
        }
        Command::List { notion } => {
            let store = NotionStore::new(notion.into());
            let entries: Vec<CatalogEntry> = list_all(&store)
                .try_collect()
                .await
                .context("listing Notion database")?;
            for entry in &entries {
                println!("{}", display::entry_card(entry));
            }
            eprintln!("{} tracked entries", entries.len());
        }
        Command::Inspect { app, steam, json } => {
            let app_id = if !app.is_empty() && app.chars().all(|c| c.is_ascii_digit()) {
                app.as_str()
            } else {
                extract_app_id(&app)
                    .with_context(|| format!("not a Steam app id or store URL: {app}"))?
            };
            let provider = SteamProvider::new(steam.into());
            let state = provider
                .fetch_state(app_id)
                .await
                .with_context(|| format!("fetching Steam state for {app_id}"))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&state)?);
            } else {
                print!("{}", display::state_card(app_id, &state));
            }
        }
    }
    Ok(())
}
