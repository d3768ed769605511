//! CLI administration tool for tiny-site.
//!
//! Manages zones and inspects the database without going through the HTTP
//! API.
//!
//! # Usage
//!
//! ```bash
//! # Create a zone
//! cargo run --bin tiny-admin -- zone create --name banners --owner tree
//!
//! # List zones
//! cargo run --bin tiny-admin -- zone list
//!
//! # Delete an empty zone
//! cargo run --bin tiny-admin -- zone delete banners
//!
//! # File and storage totals
//! cargo run --bin tiny-admin -- stats
//!
//! # Check database connection
//! cargo run --bin tiny-admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string

use tiny_site::application::services::ZoneService;
use tiny_site::domain::entities::Zone;
use tiny_site::infrastructure::clock::SystemClock;
use tiny_site::infrastructure::persistence::{PgFileRepository, PgZoneRepository};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing tiny-site.
#[derive(Parser)]
#[command(name = "tiny-admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage zones
    Zone {
        #[command(subcommand)]
        action: ZoneAction,
    },

    /// Show file and storage totals
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum ZoneAction {
    /// Create a new zone
    Create {
        /// Zone name (e.g., "banners", "avatars")
        #[arg(short, long)]
        name: Option<String>,

        /// Owner of the zone
        #[arg(short, long)]
        owner: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all zones
    List,

    /// Delete an empty zone
    Delete {
        /// Zone name or ID
        name_or_id: String,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Zone { action } => handle_zone_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

async fn handle_zone_action(action: ZoneAction, pool: &PgPool) -> Result<()> {
    let pool = Arc::new(pool.clone());
    let service = ZoneService::new(
        Arc::new(PgZoneRepository::new(pool.clone())),
        Arc::new(PgFileRepository::new(pool)),
        Arc::new(SystemClock),
    );

    match action {
        ZoneAction::Create {
            name,
            owner,
            description,
            yes,
        } => create_zone(&service, name, owner, description, yes).await,
        ZoneAction::List => list_zones(&service).await,
        ZoneAction::Delete { name_or_id } => delete_zone(&service, name_or_id).await,
    }
}

/// Creates a zone, prompting for missing values.
async fn create_zone(
    service: &ZoneService,
    name: Option<String>,
    owner: Option<String>,
    description: Option<String>,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "Create zone".bright_blue().bold());
    println!();

    let name = match name {
        Some(n) => n,
        None => Input::new().with_prompt("Zone name").interact_text()?,
    };

    let owner = match owner {
        Some(o) => o,
        None => Input::new().with_prompt("Owner").interact_text()?,
    };

    println!("  Name:  {}", name.cyan());
    println!("  Owner: {}", owner.cyan());
    if let Some(ref d) = description {
        println!("  Description: {}", d.bright_black());
    }
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this zone?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    let zone = service
        .create(name, owner, description)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create zone: {}", e))?;

    println!(
        "{} (id {})",
        "Zone created".green().bold(),
        zone.id.to_string().bright_white()
    );
    println!();

    Ok(())
}

/// Lists zones as a table.
///
/// ```text
///   ID  Name                 Owner                Created
///   ──────────────────────────────────────────────────────────────────
///   1   banners              tree                 2019-05-01 08:00
/// ```
async fn list_zones(service: &ZoneService) -> Result<()> {
    println!("{}", "Zones".bright_blue().bold());
    println!();

    let zones = service
        .list()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list zones: {}", e))?;

    if zones.is_empty() {
        println!("{}", "  No zones found".yellow());
        println!();
        println!(
            "  Create one with: {} tiny-admin zone create",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<3} {:<20} {:<20} {:<16}",
        "ID".bright_white().bold(),
        "Name".bright_white().bold(),
        "Owner".bright_white().bold(),
        "Created".bright_white().bold()
    );
    println!("  {}", "─".repeat(66).bright_black());

    for zone in &zones {
        println!(
            "  {:<3} {:<20} {:<20} {}",
            zone.id.to_string().bright_black(),
            zone.name.cyan(),
            zone.owner,
            zone.created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black()
        );
    }

    println!();
    println!("  Total: {}", zones.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

fn find_zone<'a>(zones: &'a [Zone], name_or_id: &str) -> Option<&'a Zone> {
    match name_or_id.parse::<i64>() {
        Ok(id) => zones.iter().find(|z| z.id == id),
        Err(_) => zones.iter().find(|z| z.name == name_or_id),
    }
}

/// Deletes a zone by name or ID after confirmation (default: No).
async fn delete_zone(service: &ZoneService, name_or_id: String) -> Result<()> {
    println!("{}", "Delete zone".bright_blue().bold());
    println!();

    let zones = service
        .list()
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;
    let zone = find_zone(&zones, &name_or_id).context("Zone not found")?;

    println!("  Zone: {}", zone.name.cyan());
    println!("  ID:   {}", zone.id.to_string().bright_black());
    println!();

    let confirmed = Confirm::new()
        .with_prompt("Delete this zone?")
        .default(false)
        .interact()?;

    if !confirmed {
        println!("{}", "Cancelled".red());
        return Ok(());
    }

    service
        .delete(zone.id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete zone: {}", e))?;

    println!("{}", "Zone deleted".green().bold());
    println!();

    Ok(())
}

/// Displays zone, file and storage totals.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "Statistics".bright_blue().bold());
    println!();

    let zones_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM file_zones")
        .fetch_one(pool)
        .await?;

    let (files_count, total_bytes): (i64, i64) =
        sqlx::query_as("SELECT COUNT(*), COALESCE(SUM(size), 0)::BIGINT FROM files")
            .fetch_one(pool)
            .await?;

    println!(
        "  Zones:   {}",
        zones_count.to_string().bright_green().bold()
    );
    println!(
        "  Files:   {}",
        files_count.to_string().bright_green().bold()
    );
    println!(
        "  Storage: {}",
        format_bytes(total_bytes).bright_green().bold()
    );
    println!();

    Ok(())
}

async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let migrations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
                .fetch_one(pool)
                .await
                .unwrap_or(0);

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Migrations: {}", migrations.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}

fn format_bytes(bytes: i64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
