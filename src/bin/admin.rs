//! CLI administration tool for the short URL store.
//!
//! Exposes owner, link and click operations plus database maintenance
//! without requiring an HTTP front end.
//!
//! # Usage
//!
//! ```bash
//! # Create an owner
//! shortener-admin owner create
//!
//! # Allocate a short URL, optionally prefixed
//! shortener-admin link create --owner 6553f1009c1e4a3b5d7f0e21 --url https://example.com --prefix promo
//!
//! # List an owner's short URLs
//! shortener-admin link list --owner 6553f1009c1e4a3b5d7f0e21
//!
//! # Resolve a code the way a redirect would (counts one click)
//! shortener-admin resolve promo-x9Qz1 --query utm_source=mail
//!
//! # Check database connection
//! shortener-admin db check
//! ```
//!
//! # Environment Variables
//!
//! See [`url_shortener_core::config`]. A `.env` file is honored.

use url_shortener_core::bootstrap;
use url_shortener_core::config::{self, Config};
use url_shortener_core::domain::entities::{OwnerId, ShortUrl};
use url_shortener_core::infrastructure::persistence;
use url_shortener_core::logging;
use url_shortener_core::state::AppState;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use tokio::task::JoinHandle;

/// CLI tool for managing short URLs.
#[derive(Parser)]
#[command(name = "shortener-admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log at the configured level instead of warnings only
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage owners
    Owner {
        #[command(subcommand)]
        action: OwnerAction,
    },

    /// Manage short URLs
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Resolve a short code to its redirect target and count a click
    Resolve {
        short_id: String,

        /// Incoming query string to merge into the target
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Count one click without resolving
    Track { short_id: String },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Owner subcommands.
#[derive(Subcommand)]
enum OwnerAction {
    /// Create a new owner and print its id
    Create,

    /// Remove an owner and every short URL it owns
    Remove {
        owner: OwnerId,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Short URL subcommands.
#[derive(Subcommand)]
enum LinkAction {
    /// Allocate a short code for a URL
    Create {
        #[arg(short, long)]
        owner: OwnerId,

        #[arg(short, long)]
        url: String,

        /// Optional label, rendered as `<prefix>-<random>`
        #[arg(short, long, default_value = "")]
        prefix: String,
    },

    /// Show one short URL
    Get {
        short_id: String,

        #[arg(short, long)]
        owner: OwnerId,
    },

    /// List an owner's short URLs, newest first
    List {
        #[arg(short, long)]
        owner: OwnerId,
    },

    /// Remove one short URL
    Remove {
        short_id: String,

        #[arg(short, long)]
        owner: OwnerId,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Remove every short URL of an owner, keeping the owner
    Purge {
        #[arg(short, long)]
        owner: OwnerId,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_from_env().context("Invalid configuration")?;

    let log_level = if cli.verbose {
        config.log_level.as_str()
    } else {
        "warn"
    };
    logging::init(log_level, &config.log_format)?;
    if cli.verbose {
        config.print_summary();
    }

    match cli.command {
        Commands::Db { action } => handle_db_action(action, &config).await,
        command => run_command(command, &config).await,
    }
}

/// Runs a command against the fully wired service, then drains the click queue.
async fn run_command(command: Commands, config: &Config) -> Result<()> {
    let (state, worker) = bootstrap::build(config).await?;

    let result = match command {
        Commands::Owner { action } => handle_owner_action(action, &state).await,
        Commands::Link { action } => handle_link_action(action, &state).await,
        Commands::Resolve { short_id, query } => {
            resolve(&state, &short_id, query.as_deref()).await
        }
        Commands::Track { short_id } => track(&state, &short_id).await,
        Commands::Db { action } => handle_db_action(action, config).await,
    };

    shutdown(state, worker).await?;
    result
}

/// Closes the click queue and waits for queued clicks to be applied.
async fn shutdown(state: AppState, worker: JoinHandle<()>) -> Result<()> {
    drop(state);
    worker.await.context("Click worker panicked")
}

/// Dispatches owner commands.
async fn handle_owner_action(action: OwnerAction, state: &AppState) -> Result<()> {
    match action {
        OwnerAction::Create => {
            let owner = state.owner_service.create_owner().await?;

            println!("{}", "✅ Owner created".green().bold());
            println!("  ID: {}", owner.to_string().bright_yellow().bold());
        }
        OwnerAction::Remove { owner, yes } => {
            println!("{}", "🗑️  Remove Owner".bright_blue().bold());
            println!("  Owner: {}", owner.to_string().cyan());
            println!(
                "{}",
                "⚠️  Every short URL of this owner is deleted too."
                    .red()
                    .bold()
            );

            if !confirm("Remove this owner?", yes)? {
                return Ok(());
            }

            state.owner_service.remove_owner(owner).await?;
            println!("{}", "✅ Owner removed".green().bold());
        }
    }

    Ok(())
}

/// Dispatches short URL commands.
async fn handle_link_action(action: LinkAction, state: &AppState) -> Result<()> {
    match action {
        LinkAction::Create { owner, url, prefix } => {
            let short_id = state
                .link_service
                .create_short_url(&prefix, &url, owner)
                .await?;

            println!("{}", "✨ Short URL created".green().bold());
            println!("  Code:  {}", short_id.bright_yellow().bold());
            println!("  Link:  {}", state.short_links.short_url(&short_id).cyan());
            println!("  QR:    {}", state.short_links.qr_code_url(&short_id).bright_black());
            println!("  URL:   {}", url);
        }
        LinkAction::Get { short_id, owner } => {
            let short_url = state.link_service.get_short_url(&short_id, owner).await?;
            print_short_url(state, &short_url);
        }
        LinkAction::List { owner } => {
            list_short_urls(state, owner).await?;
        }
        LinkAction::Remove {
            short_id,
            owner,
            yes,
        } => {
            println!("  Code: {}", short_id.cyan());
            if !confirm("Remove this short URL?", yes)? {
                return Ok(());
            }

            state.link_service.remove_short_url(&short_id, owner).await?;
            println!("{}", "✅ Short URL removed".green().bold());
        }
        LinkAction::Purge { owner, yes } => {
            println!("  Owner: {}", owner.to_string().cyan());
            if !confirm("Remove every short URL of this owner?", yes)? {
                return Ok(());
            }

            let removed = state.link_service.remove_short_urls(owner).await?;
            println!(
                "{} {}",
                "✅ Short URLs removed:".green().bold(),
                removed.to_string().bright_white().bold()
            );
        }
    }

    Ok(())
}

/// Lists an owner's short URLs.
///
/// # Output Format
///
/// ```text
/// 📋 Short URLs
///
///   Code           Clicks   Created              URL
///   ───────────────────────────────────────────────────────────────────
///   promo-x9Qz1    12       2026-01-15 10:30     https://example.com
/// ```
async fn list_short_urls(state: &AppState, owner: OwnerId) -> Result<()> {
    println!("{}", "📋 Short URLs".bright_blue().bold());
    println!();

    let short_urls = state.link_service.get_short_urls(owner).await?;

    if short_urls.is_empty() {
        println!("{}", "  No short URLs found".yellow());
        return Ok(());
    }

    println!(
        "  {:<14} {:<8} {:<20} {}",
        "Code".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "Created".bright_white().bold(),
        "URL".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for short_url in &short_urls {
        println!(
            "  {:<14} {:<8} {:<20} {}",
            short_url.short_id.cyan(),
            short_url.click_count().to_string().bright_green(),
            short_url
                .created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            short_url.url
        );
    }

    println!();
    println!(
        "  Total: {}",
        short_urls.len().to_string().bright_white().bold()
    );

    Ok(())
}

fn print_short_url(state: &AppState, short_url: &ShortUrl) {
    println!("{}", "🔗 Short URL".bright_blue().bold());
    println!("  Code:    {}", short_url.short_id.bright_yellow().bold());
    println!("  Link:    {}", state.short_links.short_url(&short_url.short_id).cyan());
    println!("  URL:     {}", short_url.url);
    println!("  Owner:   {}", short_url.owner.to_string().bright_black());
    println!("  Clicks:  {}", short_url.click_count().to_string().bright_green());
    println!(
        "  Created: {}",
        short_url.created_at.format("%Y-%m-%d %H:%M:%S").to_string().bright_black()
    );
}

async fn resolve(state: &AppState, short_id: &str, query: Option<&str>) -> Result<()> {
    let target = state.resolve(short_id, query).await?;
    println!("{}", target);
    Ok(())
}

async fn track(state: &AppState, short_id: &str) -> Result<()> {
    state.click_service.track(short_id).await?;
    println!("{}", "✅ Click recorded".green());
    Ok(())
}

/// Handles database maintenance commands. These never run migrations implicitly.
async fn handle_db_action(action: DbAction, config: &Config) -> Result<()> {
    let pool = persistence::connect(config).await?;

    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").execute(&pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Migrate => {
            println!("{}", "🛠️  Applying migrations...".bright_blue());

            persistence::run_migrations(&pool).await?;

            println!("{}", "✅ Migrations applied".green().bold());
        }
    }

    Ok(())
}

/// Asks for confirmation unless `skip` is set. Defaults to No.
fn confirm(prompt: &str, skip: bool) -> Result<bool> {
    if skip {
        return Ok(true);
    }

    let confirmed = Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?;

    if !confirmed {
        println!("{}", "❌ Cancelled".red());
    }

    Ok(confirmed)
}
