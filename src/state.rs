use std::fs;
use std::path::{Path, PathBuf};

use crate::error::LeadError;
use crate::types::Config;
use crate::util::MAX_WINDOW_DAYS;

/// Environment variable that points at an alternate config file.
pub const CONFIG_ENV: &str = "LEADSIGNALS_CONFIG";

/// Get the data directory (~/.leadsignals)
pub fn data_dir() -> Result<PathBuf, LeadError> {
    let home = dirs::home_dir()
        .ok_or_else(|| LeadError::Config("Could not find home directory".to_string()))?;
    Ok(home.join(".leadsignals"))
}

/// Resolve the config file path: `$LEADSIGNALS_CONFIG` or `~/.leadsignals/config.json`.
pub fn config_path() -> Result<PathBuf, LeadError> {
    if let Ok(explicit) = std::env::var(CONFIG_ENV) {
        if !explicit.trim().is_empty() {
            return Ok(PathBuf::from(explicit));
        }
    }
    Ok(data_dir()?.join("config.json"))
}

/// Load config from the default location.
pub fn load_config() -> Result<Config, LeadError> {
    load_config_from(&config_path()?)
}

/// Load and validate config from an explicit path.
pub fn load_config_from(path: &Path) -> Result<Config, LeadError> {
    if !path.exists() {
        return Err(LeadError::ConfigNotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)?;
    let config: Config = serde_json::from_str(&content)?;
    validate_config(&config)?;
    Ok(config)
}

/// Load config, falling back to defaults when no file exists yet.
///
/// A file that exists but fails to parse is still an error.
pub fn load_config_or_default() -> Result<Config, LeadError> {
    match load_config() {
        Ok(config) => Ok(config),
        Err(LeadError::ConfigNotFound(path)) => {
            log::info!("No config at {}, using defaults", path.display());
            Ok(Config::default())
        }
        Err(e) => Err(e),
    }
}

fn validate_config(config: &Config) -> Result<(), LeadError> {
    if config.signals.lookback_days <= 0 {
        return Err(LeadError::Config(format!(
            "signals.lookbackDays must be positive, got {}",
            config.signals.lookback_days
        )));
    }
    if config.signals.lookback_days > MAX_WINDOW_DAYS {
        return Err(LeadError::Config(format!(
            "signals.lookbackDays must be at most {}, got {}",
            MAX_WINDOW_DAYS, config.signals.lookback_days
        )));
    }
    if !(0..=MAX_WINDOW_DAYS).contains(&config.signals.burst_window_days) {
        return Err(LeadError::Config(format!(
            "signals.burstWindowDays must be between 0 and {}, got {}",
            MAX_WINDOW_DAYS, config.signals.burst_window_days
        )));
    }
    if config.sla.warning_hours < 0.0 || config.sla.overdue_hours < config.sla.warning_hours {
        return Err(LeadError::Config(format!(
            "sla thresholds must satisfy 0 <= warningHours <= overdueHours (got {} / {})",
            config.sla.warning_hours, config.sla.overdue_hours
        )));
    }
    if config.system_user.id.trim().is_empty() {
        return Err(LeadError::Config("systemUser.id must not be empty".to_string()));
    }
    Ok(())
}

/// Resolve where the SQLite database lives.
pub fn database_path(config: &Config) -> Result<PathBuf, LeadError> {
    match config.database_path.as_deref().map(str::trim) {
        Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
        _ => Ok(data_dir()?.join("leadsignals.db")),
    }
}
