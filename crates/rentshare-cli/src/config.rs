use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use rentshare_core::{AggregationMode, OwnershipBinding};

/// Default number of months shown by `report monthly`.
pub const DEFAULT_MONTHLY_LIMIT: usize = 12;

#[derive(Debug, Serialize, Deserialize)]
pub struct RentshareConfig {
    pub store: StoreSection,
    #[serde(default)]
    pub allocation: AllocationSection,
    #[serde(default)]
    pub reports: ReportsSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StoreSection {
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct AllocationSection {
    #[serde(default)]
    pub binding: OwnershipBinding,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReportsSection {
    #[serde(default = "default_monthly_limit")]
    pub monthly_limit: usize,
    #[serde(default)]
    pub default_aggregation: AggregationMode,
}

impl Default for ReportsSection {
    fn default() -> Self {
        Self {
            monthly_limit: DEFAULT_MONTHLY_LIMIT,
            default_aggregation: AggregationMode::default(),
        }
    }
}

fn default_monthly_limit() -> usize {
    DEFAULT_MONTHLY_LIMIT
}

impl RentshareConfig {
    pub fn new(db_path: &Path) -> Self {
        Self {
            store: StoreSection {
                path: db_path.to_string_lossy().to_string(),
            },
            allocation: AllocationSection::default(),
            reports: ReportsSection::default(),
        }
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_db_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("rentshare.db"))
}

pub fn read_config(path: &Path) -> anyhow::Result<RentshareConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn write_config(path: &Path, config: &RentshareConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    std::fs::write(path, contents)
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("rentshare"));
        }
    }
    Ok(home_dir()?.join(".config").join("rentshare"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("rentshare"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("rentshare"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: RentshareConfig = toml::from_str("[store]\npath = \"/tmp/r.db\"\n").unwrap();
        assert_eq!(config.store.path, "/tmp/r.db");
        assert_eq!(config.allocation.binding, OwnershipBinding::Latest);
        assert_eq!(config.reports.monthly_limit, DEFAULT_MONTHLY_LIMIT);
        assert_eq!(
            config.reports.default_aggregation,
            AggregationMode::SinglePeriod
        );
    }

    #[test]
    fn test_full_config() {
        let config: RentshareConfig = toml::from_str(
            "[store]\npath = \"r.db\"\n\n[allocation]\nbinding = \"period_end\"\n\n[reports]\nmonthly_limit = 6\ndefault_aggregation = \"full_year\"\n",
        )
        .unwrap();
        assert_eq!(config.allocation.binding, OwnershipBinding::PeriodEnd);
        assert_eq!(config.reports.monthly_limit, 6);
        assert_eq!(config.reports.default_aggregation, AggregationMode::FullYear);
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        write_config(&path, &RentshareConfig::new(Path::new("/data/r.db"))).unwrap();
        let config = read_config(&path).unwrap();
        assert_eq!(config.store.path, "/data/r.db");
    }
}
