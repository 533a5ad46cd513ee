use std::path::PathBuf;

use rentshare_core::{RecordStore, SqliteStore};

use crate::app::{resolve_config_path, AppContext};
use crate::cli::InitArgs;
use crate::config::{write_config, RentshareConfig};
use crate::helpers::absolutize;
use crate::output::emit_json;
use crate::ui;

pub fn handle_init(ctx: &AppContext, args: &InitArgs) -> anyhow::Result<()> {
    let target = match args.path.as_ref() {
        Some(path) => PathBuf::from(path),
        None => ctx.db_path()?,
    };
    let target = absolutize(&target)?;

    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create data directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let existed = target.exists();
    let store = SqliteStore::open(&target)?;
    store.check_integrity()?;
    drop(store);

    let config_path = resolve_config_path()?;
    let write = args.force || !config_path.exists();
    if write {
        write_config(&config_path, &RentshareConfig::new(&target))?;
    }
    tracing::info!(
        db = %target.display(),
        config = %config_path.display(),
        created = !existed,
        config_written = write,
        "initialized"
    );

    let ui = ctx.ui();
    if ui.mode.is_json() {
        return emit_json(&serde_json::json!({
            "db_path": target,
            "created": !existed,
            "config_path": config_path,
            "config_written": write,
        }));
    }
    if ctx.quiet() {
        return Ok(());
    }
    let title = if existed {
        "Database already initialized"
    } else {
        "Initialized rentshare database"
    };
    let mut items = vec![("Database", target.display().to_string())];
    if write {
        items.push(("Config", config_path.display().to_string()));
    }
    ui::print(ui, &ui::receipt(ui, title, &items));
    Ok(())
}
