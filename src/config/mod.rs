//! User preferences persisted as JSON next to timestamped backups.

use std::{
    cmp::Reverse,
    env,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::currency::{CurrencyCode, LocaleConfig};
use crate::domain::BudgetPeriod;
use crate::errors::{FinanceError, Result};

/// Overrides the default `~/.finance_core` base directory.
pub const HOME_ENV_VAR: &str = "FINANCE_CORE_HOME";
/// Longest cash-flow forecast, in months, a config may ask for.
pub const MAX_FORECAST_HORIZON_MONTHS: u32 = 120;
const DEFAULT_DIR_NAME: &str = ".finance_core";
const CONFIG_FILE: &str = "config.json";
const BACKUP_PREFIX: &str = "config_";
const BACKUP_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    pub forecast_horizon_months: u32,
    pub emergency_fund_months: u32,
    pub default_budget_period: BudgetPeriod,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-US".into(),
            currency: "USD".into(),
            forecast_horizon_months: 6,
            emergency_fund_months: 6,
            default_budget_period: BudgetPeriod::Monthly,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_FORECAST_HORIZON_MONTHS).contains(&self.forecast_horizon_months) {
            return Err(FinanceError::Config(format!(
                "forecast_horizon_months must be in 1..={MAX_FORECAST_HORIZON_MONTHS}, got {}",
                self.forecast_horizon_months
            )));
        }
        if self.emergency_fund_months == 0 {
            return Err(FinanceError::Config(
                "emergency_fund_months must be at least 1".into(),
            ));
        }
        let currency = self.currency.trim();
        if currency.len() != 3 || !currency.chars().all(|ch| ch.is_ascii_alphabetic()) {
            return Err(FinanceError::Config(format!(
                "`{}` is not a three-letter currency code",
                self.currency
            )));
        }
        Ok(())
    }

    pub fn currency_code(&self) -> CurrencyCode {
        CurrencyCode::new(self.currency.trim())
    }

    pub fn locale_config(&self) -> LocaleConfig {
        LocaleConfig::from_tag(&self.locale)
    }
}

/// Resolves the data directory from `FINANCE_CORE_HOME`, falling back to the home directory.
pub fn resolve_base_dir() -> Result<PathBuf> {
    if let Some(custom) = env::var_os(HOME_ENV_VAR).filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(custom));
    }
    dirs::home_dir()
        .map(|home| home.join(DEFAULT_DIR_NAME))
        .ok_or_else(|| FinanceError::Config("unable to locate a home directory".into()))
}

/// Loads, saves, and snapshots [`Config`] under a base directory.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
    backups_dir: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(resolve_base_dir()?)
    }

    /// Same paths as [`ConfigManager::new`], but nothing is created on disk.
    pub fn locate() -> Result<Self> {
        Ok(Self::at_base_dir(resolve_base_dir()?))
    }

    /// Creates the config and backup directories under `base`.
    pub fn with_base_dir(base: impl AsRef<Path>) -> Result<Self> {
        let manager = Self::at_base_dir(base);
        fs::create_dir_all(&manager.backups_dir)?;
        Ok(manager)
    }

    /// Resolves paths under `base` without creating them.
    pub fn at_base_dir(base: impl AsRef<Path>) -> Self {
        let config_dir = base.as_ref().join("config");
        Self {
            config_path: config_dir.join(CONFIG_FILE),
            backups_dir: config_dir.join("backups"),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backups_dir(&self) -> &Path {
        &self.backups_dir
    }

    /// Returns the stored config, or defaults when nothing has been saved yet.
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            tracing::debug!(
                path = %self.config_path.display(),
                "no config on disk, using defaults"
            );
            return Ok(Config::default());
        }
        let config: Config = serde_json::from_str(&fs::read_to_string(&self.config_path)?)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config)?;
        let tmp = self.config_path.with_extension("json.tmp");
        write_file(&tmp, &json)?;
        fs::rename(&tmp, &self.config_path)?;
        tracing::info!(path = %self.config_path.display(), "saved config");
        Ok(())
    }

    /// Writes a timestamped copy and returns its file name.
    pub fn backup(&self, config: &Config, note: Option<&str>) -> Result<String> {
        let mut name = format!(
            "{BACKUP_PREFIX}{}",
            Utc::now().format(BACKUP_TIMESTAMP_FORMAT)
        );
        if let Some(label) = note.and_then(slug) {
            name.push('-');
            name.push_str(&label);
        }
        name.push('.');
        name.push_str(BACKUP_EXTENSION);
        write_file(
            &self.backups_dir.join(&name),
            &serde_json::to_string_pretty(config)?,
        )?;
        tracing::info!(backup = %name, "created config backup");
        Ok(name)
    }

    pub fn restore(&self, backup_name: &str) -> Result<Config> {
        let path = self.backups_dir.join(backup_name);
        if !path.is_file() {
            return Err(FinanceError::Config(format!(
                "configuration backup `{backup_name}` not found"
            )));
        }
        let config: Config = serde_json::from_str(&fs::read_to_string(&path)?)?;
        config.validate()?;
        Ok(config)
    }

    /// Backup names, newest first.
    pub fn list_backups(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        if !self.backups_dir.is_dir() {
            return Ok(names);
        }
        for entry in fs::read_dir(&self.backups_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort_by_key(|name| Reverse(backup_timestamp(name)));
        Ok(names)
    }
}

/// Lower-case alphanumerics joined by single dashes.
fn slug(note: &str) -> Option<String> {
    let joined = note
        .split(|ch: char| !ch.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    (!joined.is_empty()).then_some(joined)
}

fn backup_timestamp(name: &str) -> Option<NaiveDateTime> {
    let stem = name
        .strip_prefix(BACKUP_PREFIX)?
        .strip_suffix(&format!(".{BACKUP_EXTENSION}"))?;
    let stamp = stem.split('-').next()?;
    NaiveDateTime::parse_from_str(stamp, BACKUP_TIMESTAMP_FORMAT).ok()
}

fn write_file(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
