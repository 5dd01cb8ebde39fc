//! playlist-hub - social playlist discovery
//!
//! Searches and browses the provider's catalog, keeps linked user accounts'
//! tokens fresh, and ranks locally saved playlists.

mod api;
mod auth;
mod config;
mod models;
mod store;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "playlist-hub")]
#[command(about = "Discover, save, and rank playlists", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Link a provider account to a user
    Connect {
        /// Local user ID
        #[arg(short, long)]
        user: String,

        /// Access token from the authorization flow
        #[arg(long)]
        access_token: String,

        /// Refresh token from the authorization flow
        #[arg(long)]
        refresh_token: Option<String>,

        /// Access token lifetime in seconds
        #[arg(long)]
        expires_in: Option<u64>,
    },

    /// Remove a user's linked account
    Disconnect {
        #[arg(short, long)]
        user: String,
    },

    /// Check a user's token, refreshing it if expired
    Token {
        #[arg(short, long)]
        user: String,
    },

    /// Search playlists
    Search {
        query: String,

        /// Maximum number of playlists to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show a playlist and its tracks
    Playlist {
        id: String,

        /// Act as this user when connected
        #[arg(short, long)]
        user: Option<String>,
    },

    /// List a playlist's tracks
    Tracks {
        id: String,

        #[arg(short, long, default_value = "50")]
        limit: usize,

        /// Act as this user when connected
        #[arg(short, long)]
        user: Option<String>,
    },

    /// List a connected user's own playlists
    MyPlaylists {
        #[arg(short, long)]
        user: String,

        #[arg(short, long, default_value = "50")]
        limit: usize,
    },

    /// Featured playlists
    Featured {
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// List browse categories
    Categories {
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Playlists for a browse category
    Category {
        /// Category ID (from `categories` output)
        id: String,

        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Save a playlist, or unsave it if already saved
    Save {
        /// Playlist ID
        id: String,

        #[arg(short, long)]
        user: String,

        /// Category to file the playlist under
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Most-saved playlists
    Popular {
        /// Only playlists saved under this category
        #[arg(short, long)]
        category: Option<String>,

        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Commands::Categories { limit } = cli.command {
        return api::list_categories(limit, cli.json);
    }

    let ctx = api::Context::load(cli.json)?;

    match cli.command {
        Commands::Connect {
            user,
            access_token,
            refresh_token,
            expires_in,
        } => {
            api::connect(
                &ctx,
                &user,
                &access_token,
                refresh_token.as_deref(),
                expires_in,
            )?;
        }
        Commands::Disconnect { user } => {
            api::disconnect(&ctx, &user)?;
        }
        Commands::Token { user } => {
            api::token_status(&ctx, &user).await?;
        }
        Commands::Search { query, limit } => {
            tracing::info!("Searching playlists...");
            api::search(&ctx, &query, limit).await?;
        }
        Commands::Playlist { id, user } => {
            api::show_playlist(&ctx, &id, user.as_deref()).await?;
        }
        Commands::Tracks { id, limit, user } => {
            api::list_tracks(&ctx, &id, limit, user.as_deref()).await?;
        }
        Commands::MyPlaylists { user, limit } => {
            api::my_playlists(&ctx, &user, limit).await?;
        }
        Commands::Featured { limit } => {
            tracing::info!("Fetching featured playlists...");
            api::featured(&ctx, limit).await?;
        }
        Commands::Categories { .. } => {}
        Commands::Category { id, limit } => {
            api::category(&ctx, &id, limit).await?;
        }
        Commands::Save { id, user, category } => {
            api::toggle_save(&ctx, &user, &id, category).await?;
        }
        Commands::Popular { category, limit } => {
            api::popular(&ctx, category.as_deref(), limit)?;
        }
    }

    Ok(())
}
