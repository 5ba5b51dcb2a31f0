//! Print the prioritized lead work queue as JSON.

use clap::Parser;

use leadsignals::db::LeadDb;
use leadsignals::error::LeadError;
use leadsignals::signals::queue::{load_work_queue, WorkQueueFilter};
use leadsignals::signals::{SlaStatus, Temperature};
use leadsignals::state::load_config_or_default;

#[derive(Parser)]
#[command(name = "work-queue")]
#[command(about = "Leads ordered by temperature and SLA urgency", long_about = None)]
#[command(version)]
struct Cli {
    /// Only leads with this temperature (HOT, WARM, COLD).
    #[arg(long)]
    temperature: Option<String>,

    /// Only leads with this SLA status (OK, WARNING, OVERDUE).
    #[arg(long)]
    sla: Option<String>,

    /// Database file; overrides `databasePath` from config.
    #[arg(long)]
    db: Option<std::path::PathBuf>,
}

impl Cli {
    fn filter(&self) -> Result<WorkQueueFilter, LeadError> {
        let temperature = match self.temperature.as_deref() {
            Some(raw) => Some(Temperature::from_label(raw).ok_or_else(|| {
                LeadError::InvalidArgument(format!("unknown temperature {raw:?}"))
            })?),
            None => None,
        };
        let sla_status = match self.sla.as_deref() {
            Some(raw) => Some(SlaStatus::from_label(raw).ok_or_else(|| {
                LeadError::InvalidArgument(format!("unknown SLA status {raw:?}"))
            })?),
            None => None,
        };
        Ok(WorkQueueFilter {
            temperature,
            sla_status,
        })
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let filter = cli.filter()?;
    let config = load_config_or_default()
        .map_err(|e| anyhow::anyhow!("Failed to load config: {e} ({})", e.recovery_suggestion()))?;

    let db = match cli.db.clone() {
        Some(path) => LeadDb::open_at(path.clone())
            .map_err(|e| anyhow::anyhow!("Failed to open database {}: {e}", path.display()))?,
        None => LeadDb::open(&config)
            .map_err(|e| anyhow::anyhow!("Failed to open database: {e} ({})", e.recovery_suggestion()))?,
    };

    let queue = load_work_queue(&db, &config, chrono::Utc::now(), &filter)?;
    println!("{}", serde_json::to_string_pretty(&queue)?);
    Ok(())
}
