//! Application context for the rentshare CLI.
//!
//! Bundles the parsed arguments, the resolved UI context and the lazily
//! loaded config file so handlers don't thread them separately.

use std::path::PathBuf;

use once_cell::unsync::OnceCell;

use rentshare_core::{AggregationMode, OwnershipBinding, SqliteStore};

use crate::cli::Cli;
use crate::config::{default_db_path, read_config, RentshareConfig, DEFAULT_MONTHLY_LIMIT};
use crate::errors::CliError;
use crate::ui::UiContext;

use super::resolver::{missing_db_message, resolve_config_path};

pub struct AppContext<'a> {
    cli: &'a Cli,
    ui: UiContext,
    config: OnceCell<Option<RentshareConfig>>,
}

impl<'a> AppContext<'a> {
    /// Create a new application context from CLI arguments.
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            ui: UiContext::detect(cli),
            config: OnceCell::new(),
        }
    }

    pub fn cli(&self) -> &Cli {
        self.cli
    }

    pub fn ui(&self) -> &UiContext {
        &self.ui
    }

    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// The config file, if one exists. Loaded once per invocation.
    pub fn config(&self) -> anyhow::Result<Option<&RentshareConfig>> {
        let config = self.config.get_or_try_init(|| -> anyhow::Result<_> {
            let path = resolve_config_path()?;
            if !path.exists() {
                return Ok(None);
            }
            let config = read_config(&path)?;
            tracing::debug!(path = %path.display(), "loaded config");
            Ok(Some(config))
        })?;
        Ok(config.as_ref())
    }

    /// Database path: `--db` / `RENTSHARE_DB`, then the config file, then
    /// the XDG data directory.
    pub fn db_path(&self) -> anyhow::Result<PathBuf> {
        if let Some(path) = self.cli.db.as_ref() {
            return Ok(PathBuf::from(path));
        }
        if let Some(config) = self.config()? {
            return Ok(PathBuf::from(&config.store.path));
        }
        default_db_path()
    }

    /// Open the existing database.
    pub fn open_store(&self) -> anyhow::Result<SqliteStore> {
        let path = self.db_path()?;
        if !path.exists() {
            return Err(CliError::not_found(
                missing_db_message(&path),
                "Run `rentshare init` or pass --db PATH",
            )
            .into());
        }
        Ok(SqliteStore::open(&path)?)
    }

    /// Binding from the flag, falling back to the config file.
    pub fn binding(&self, flag: Option<&str>) -> anyhow::Result<OwnershipBinding> {
        if let Some(value) = flag {
            return Ok(value.parse()?);
        }
        Ok(self
            .config()?
            .map(|c| c.allocation.binding)
            .unwrap_or_default())
    }

    pub fn monthly_limit(&self) -> anyhow::Result<usize> {
        Ok(self
            .config()?
            .map(|c| c.reports.monthly_limit)
            .unwrap_or(DEFAULT_MONTHLY_LIMIT))
    }

    pub fn default_aggregation(&self) -> anyhow::Result<AggregationMode> {
        Ok(self
            .config()?
            .map(|c| c.reports.default_aggregation)
            .unwrap_or_default())
    }
}
