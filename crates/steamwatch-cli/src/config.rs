//! Command-line and environment configuration.

use clap::{Args, Parser, Subcommand};
use steamwatch_provider::SteamConfig;
use steamwatch_store::NotionConfig;
use steamwatch_sync::DiscordConfig;

#[derive(Parser)]
#[command(name = "steamwatch", version, about = "Track Steam prices in Notion and announce sales on Discord")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run one sync pass over every tracked game, then exit.
    Sync {
        #[command(flatten)]
        notion: NotionArgs,
        #[command(flatten)]
        discord: DiscordArgs,
        #[command(flatten)]
        steam: SteamArgs,
    },
    /// Print every tracked game in the Notion database.
    List {
        #[command(flatten)]
        notion: NotionArgs,
    },
    /// Fetch and print the live Steam state for one app id or store URL.
    Inspect {
        app: String,
        #[command(flatten)]
        steam: SteamArgs,
        /// Print JSON instead of a card.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
pub struct NotionArgs {
    #[arg(long, env = "NOTION_TOKEN", hide_env_values = true)]
    pub notion_token: String,
    #[arg(long, env = "NOTION_DATABASE_ID")]
    pub notion_database_id: String,
    #[arg(long, env = "NOTION_BASE_URL", default_value = "https://api.notion.com")]
    pub notion_base_url: String,
    /// Rich-text property that receives the recent-review label.
    #[arg(long, env = "RECENT_REVIEW_PROPERTY")]
    pub recent_review_property: Option<String>,
}

#[derive(Args)]
pub struct DiscordArgs {
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    pub discord_token: String,
    #[arg(long, env = "DISCORD_CHANNEL_ID")]
    pub discord_channel_id: String,
    #[arg(long, env = "DISCORD_BASE_URL", default_value = "https://discord.com/api/v10")]
    pub discord_base_url: String,
}

#[derive(Args)]
pub struct SteamArgs {
    #[arg(long, env = "STEAM_BASE_URL", default_value = "https://store.steampowered.com")]
    pub steam_base_url: String,
    /// Country code used for pricing.
    #[arg(long, env = "STEAM_COUNTRY", default_value = "jp")]
    pub steam_country: String,
    #[arg(long, env = "STEAM_LANGUAGE", default_value = "japanese")]
    pub steam_language: String,
}

impl From<NotionArgs> for NotionConfig {
    fn from(args: NotionArgs) -> Self {
        Self {
            token: args.notion_token,
            database_id: args.notion_database_id,
            base_url: args.notion_base_url,
            recent_review_property: args.recent_review_property,
        }
    }
}

impl From<DiscordArgs> for DiscordConfig {
    fn from(args: DiscordArgs) -> Self {
        Self {
            token: args.discord_token,
            channel_id: args.discord_channel_id,
            base_url: args.discord_base_url,
        }
    }
}

impl From<SteamArgs> for SteamConfig {
    fn from(args: SteamArgs) -> Self {
        Self {
            base_url: args.steam_base_url,
            country: args.steam_country,
            language: args.steam_language,
        }
    }
}
