//! Repair corrupted sector labels and merge duplicate sector records.
//!
//! Prints the cleanup report as JSON on stdout. Logging goes to stderr and
//! follows `RUST_LOG` (default `info`).

use clap::Parser;

use leadsignals::audit::SystemActor;
use leadsignals::db::LeadDb;
use leadsignals::hygiene::apply_sector_dedup;
use leadsignals::state::load_config_or_default;

#[derive(Parser)]
#[command(name = "sector-cleanup")]
#[command(about = "Canonicalize sector labels and merge duplicates", long_about = None)]
#[command(version)]
struct Cli {
    /// Compute and print the plan without writing anything.
    #[arg(long)]
    dry_run: bool,

    /// Database file; overrides `databasePath` from config.
    #[arg(long)]
    db: Option<std::path::PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config_or_default()
        .map_err(|e| anyhow::anyhow!("Failed to load config: {e} ({})", e.recovery_suggestion()))?;
    let actor = SystemActor::from_config(&config.system_user);

    let db = match cli.db {
        Some(path) => LeadDb::open_at(path.clone())
            .map_err(|e| anyhow::anyhow!("Failed to open database {}: {e}", path.display()))?,
        None => LeadDb::open(&config)
            .map_err(|e| anyhow::anyhow!("Failed to open database: {e} ({})", e.recovery_suggestion()))?,
    };

    let report = apply_sector_dedup(&db, &actor, cli.dry_run)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
