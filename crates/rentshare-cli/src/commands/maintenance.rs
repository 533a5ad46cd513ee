use rentshare_core::RecordStore;

use crate::app::AppContext;
use crate::errors::CliError;
use crate::output::emit_json;
use crate::ui::{self, Badge};

pub fn handle_check(ctx: &AppContext) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let ui = ctx.ui();

    match store.check_integrity() {
        Ok(()) => {
            if ui.mode.is_json() {
                return emit_json(&serde_json::json!({ "status": "ok" }));
            }
            if !ctx.quiet() {
                if ui.mode.is_pretty() {
                    ui::print(ui, &ui::badge(ui, Badge::Ok, "Integrity check passed"));
                    for check in [
                        "foreign keys",
                        "percentage bounds",
                        "month bounds",
                        "snapshot uniqueness",
                        "version stamps",
                    ] {
                        ui::print(ui, &format!("  - {}: OK", check));
                    }
                } else {
                    ui::print(ui, "status=ok");
                }
            }
            Ok(())
        }
        Err(err) => {
            tracing::error!(error = %err, "integrity check failed");
            if ui.mode.is_json() {
                emit_json(&serde_json::json!({
                    "status": "failed",
                    "error": err.to_string(),
                }))?;
            }
            Err(CliError::integrity(format!("Integrity check failed: {}", err)).into())
        }
    }
}
