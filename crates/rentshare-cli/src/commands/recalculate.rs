use rentshare_core::{FeeAllocator, SystemClock};

use crate::app::AppContext;
use crate::cli::RecalculateArgs;
use crate::output::{emit_json, NameBook};
use crate::ui::{self, id_cell, Badge, Column};

pub fn handle_recalculate(ctx: &AppContext, args: &RecalculateArgs) -> anyhow::Result<()> {
    let binding = ctx.binding(args.binding.as_deref())?;
    let store = ctx.open_store()?;
    let clock = SystemClock;
    let report = FeeAllocator::new(&store, &clock)
        .with_binding(binding)
        .recalculate_all()?;

    let ui = ctx.ui();
    if ui.mode.is_json() {
        emit_json(&report)?;
    } else if !ctx.quiet() || !report.is_clean() {
        let pretty = ui.mode.is_pretty();
        let items = [
            ("Binding", report.binding.to_string()),
            ("Processed", report.processed.to_string()),
            ("Updated", report.updated.to_string()),
            ("Skipped", report.skipped.to_string()),
        ];
        if report.is_clean() {
            ui::print(ui, &ui::receipt(ui, "Recalculated fee allocations", &items));
        } else {
            let names = NameBook::load(&store)?;
            if pretty {
                ui::print(
                    ui,
                    &ui::badge(ui, Badge::Warn, "Recalculation skipped some records"),
                );
            }
            for (key, value) in &items {
                ui::print(ui, &ui::kv(ui, key, value));
            }
            let rows: Vec<Vec<String>> = report
                .errors
                .iter()
                .map(|e| {
                    vec![
                        id_cell(&e.record_id, pretty),
                        e.period.to_string(),
                        names.property(&e.property_id).to_string(),
                        names.owner(&e.owner_id).to_string(),
                        e.reason.clone(),
                    ]
                })
                .collect();
            let columns = [
                Column::new("Record"),
                Column::new("Period"),
                Column::new("Property"),
                Column::new("Owner"),
                Column::new("Reason"),
            ];
            ui::print(ui, &ui::table(ui, &columns, &rows));
        }
    }

    report.into_result()?;
    Ok(())
}
