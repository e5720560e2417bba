//! Roster maintenance for the check-in service.
//!
//! Reads the same environment as the server (`DATABASE_URL` and friends).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use checkin::services::{import, reconcile};
use checkin::{Config, ReportService, Stores};

#[derive(Parser)]
#[command(name = "roster")]
#[command(about = "Seed and repair the check-in roster", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Seed teams from a CSV, JSON or spreadsheet roster file
    Import(Import),

    /// Re-apply present attendance entries to the roster
    Sync,

    /// Print roster counts and teams
    Inspect(Inspect),
}

#[derive(Parser, Debug)]
struct Import {
    /// Roster file (.csv, .json or .xlsx)
    path: PathBuf,

    /// Delete every existing team before seeding
    #[arg(long)]
    replace: bool,

    /// Parse and validate without touching the store
    #[arg(long)]
    dry_run: bool,
}

#[derive(Parser, Debug)]
struct Inspect {
    /// Only show teams whose id or name contains this text
    #[arg(long)]
    search: Option<String>,

    /// Only show checked-in teams
    #[arg(long)]
    checked_in: bool,
}

impl Import {
    async fn execute(self, stores: &Stores) -> Result<()> {
        let rows = import::read_rows(&self.path)
            .with_context(|| format!("Failed to load {}", self.path.display()))?;
        println!("Found {} rows in {}", rows.len(), self.path.display());

        if self.dry_run {
            let summary =
                import::check_rows(stores.roster.as_ref(), &rows, self.replace).await?;
            for error in &summary.errors {
                println!("  {}", error);
            }
            println!(
                "Dry run: {} would be imported, {} would fail",
                summary.imported, summary.failed
            );
            return Ok(());
        }

        let summary = import::import_rows(stores.roster.as_ref(), &rows, self.replace).await?;

        if self.replace {
            println!("Cleared {} existing teams", summary.cleared);
        }
        println!("Imported: {}", summary.imported);
        println!("Failed:   {}", summary.failed);
        for error in &summary.errors {
            println!("  {}", error);
        }

        let stats = stores.roster.stats().await?;
        println!("Teams in roster: {}", stats.total);
        Ok(())
    }
}

async fn sync(stores: &Stores) -> Result<()> {
    let summary =
        reconcile::sync_roster_from_log(stores.roster.as_ref(), stores.attendance.as_ref())
            .await?;

    println!("Present entries: {}", summary.present_entries);
    println!("Updated:         {}", summary.updated);
    println!("Already synced:  {}", summary.already_synced);
    println!("Not in roster:   {}", summary.not_found.len());
    for team_id in &summary.not_found {
        println!("  {}", team_id);
    }
    println!("Checked in now:  {}", summary.checked_in);

    if !summary.is_consistent() {
        println!(
            "Warning: roster has {} checked-in teams but the log has {} present entries",
            summary.checked_in, summary.present_entries
        );
    }
    Ok(())
}

impl Inspect {
    async fn execute(self, config: &Config, stores: &Stores) -> Result<()> {
        let reports = ReportService::new(stores, config.export_utc_offset_minutes);

        let stats = reports.stats().await?;
        println!(
            "Total: {}  Checked in: {}  Pending: {}",
            stats.total, stats.checked_in, stats.pending
        );

        let teams = reports.list_teams(self.search.as_deref()).await?;
        for team in teams
            .iter()
            .filter(|team| !self.checked_in || team.is_checked_in)
        {
            let time = team
                .check_in_time
                .map(|at| at.to_rfc3339())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:<10} {:<32} {:<5} {}",
                team.team_id,
                team.team_name,
                if team.is_checked_in { "yes" } else { "no" },
                time
            );
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let stores = Stores::connect(&config).await?;

    match cli.command {
        Command::Import(cmd) => cmd.execute(&stores).await,
        Command::Sync => sync(&stores).await,
        Command::Inspect(cmd) => cmd.execute(&config, &stores).await,
    }
}
