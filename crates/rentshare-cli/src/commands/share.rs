use serde::Deserialize;

use rentshare_core::storage::{NewSnapshot, OwnershipSnapshot};
use rentshare_core::{
    OwnershipLedger, OwnershipVersion, Percentage, PropertyBalance, RentshareError, SqliteStore,
    SystemClock,
};

use crate::app::{parse_id, resolve_owner, resolve_property, AppContext};
use crate::cli::{ShareCommand, ShareSetArgs};
use crate::helpers::parse_date;
use crate::output::json::snapshots_json;
use crate::output::{emit_json, NameBook};
use crate::ui::{self, id_cell, note_cell, Badge, Column};

/// One entry of a `share replace` file. Property and owner are names or IDs.
#[derive(Debug, Deserialize)]
struct ShareEntry {
    property: String,
    owner: String,
    percentage: Percentage,
    #[serde(default)]
    note: Option<String>,
    #[serde(default)]
    active: Option<bool>,
}

pub fn handle_share(ctx: &AppContext, command: &ShareCommand) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let clock = SystemClock;
    let ledger = OwnershipLedger::new(&store, &clock);

    match command {
        ShareCommand::Set(args) => handle_set(ctx, &store, &ledger, args),
        ShareCommand::Show { date } => {
            let date = date.as_deref().map(parse_date).transpose()?;
            let snapshots = ledger.get_version(date)?;
            let context = date.map(|d| d.to_string());
            print_snapshots(ctx, &store, &snapshots, context.as_deref())
        }
        ShareCommand::Versions => {
            let dates = ledger.list_versions()?;
            let ui = ctx.ui();
            if ui.mode.is_json() {
                return emit_json(&dates);
            }
            let rows: Vec<Vec<String>> = dates.iter().map(|d| vec![d.to_string()]).collect();
            ui::print(ui, &ui::header(ui, "share versions", None));
            ui::print(ui, &ui::table(ui, &[Column::new("Date")], &rows));
            Ok(())
        }
        ShareCommand::Replace { file } => {
            let contents = std::fs::read_to_string(file)
                .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", file, e))?;
            let entries: Vec<ShareEntry> = serde_json::from_str(&contents).map_err(|e| {
                RentshareError::InvalidArgument(format!("Invalid share file {}: {}", file, e))
            })?;
            let mut snapshots = Vec::with_capacity(entries.len());
            for entry in entries {
                let property = resolve_property(&store, &entry.property)?;
                let owner = resolve_owner(&store, &entry.owner)?;
                let mut snapshot = NewSnapshot::new(property.id, owner.id, entry.percentage);
                snapshot.note = entry.note;
                snapshot.active = entry.active.unwrap_or(true);
                snapshots.push(snapshot);
            }
            let version = ledger.replace_full(&snapshots)?;
            print_version(ctx, &store, &ledger, "Replaced ownership table", &version)
        }
        ShareCommand::Delete { id } => {
            let id = parse_id(id, "snapshot")?;
            ledger.delete_snapshot(&id)?;
            let ui = ctx.ui();
            if ui.mode.is_json() {
                return emit_json(&serde_json::json!({ "id": id, "deleted": true }));
            }
            if !ctx.quiet() {
                ui::print(
                    ui,
                    &ui::receipt(ui, "Deleted ownership snapshot", &[("ID", id.to_string())]),
                );
            }
            Ok(())
        }
        ShareCommand::Unbalanced => {
            let balances = match ledger.latest_version()? {
                Some(version) => ledger.unbalanced_properties(&version),
                None => Vec::new(),
            };
            print_balances(ctx, &store, &balances)
        }
    }
}

fn handle_set(
    ctx: &AppContext,
    store: &SqliteStore,
    ledger: &OwnershipLedger<'_, SqliteStore>,
    args: &ShareSetArgs,
) -> anyhow::Result<()> {
    let property = resolve_property(store, &args.property)?;
    let owner = resolve_owner(store, &args.owner)?;
    let percentage = Percentage::parse(&args.percentage)?;
    let version = ledger.replace_single(property.id, owner.id, percentage, args.note.clone())?;
    print_version(ctx, store, ledger, "Created ownership version", &version)
}

fn print_version(
    ctx: &AppContext,
    store: &SqliteStore,
    ledger: &OwnershipLedger<'_, SqliteStore>,
    title: &str,
    version: &OwnershipVersion,
) -> anyhow::Result<()> {
    let names = NameBook::load(store)?;
    let unbalanced = ledger.unbalanced_properties(version);
    let ui = ctx.ui();
    if ui.mode.is_json() {
        return emit_json(&serde_json::json!({
            "version": version.stamp,
            "snapshots": snapshots_json(&version.snapshots, &names)?,
            "unbalanced": balances_json(&unbalanced, &names),
        }));
    }
    if ctx.quiet() {
        return Ok(());
    }
    ui::print(
        ui,
        &ui::receipt(
            ui,
            title,
            &[
                ("Version", version.stamp.to_string()),
                ("Snapshots", version.snapshots.len().to_string()),
            ],
        ),
    );
    for balance in &unbalanced {
        let message = format!(
            "{} sums to {}% across {} owner(s)",
            names.property(&balance.property_id),
            balance.total_label(),
            balance.owner_count
        );
        if ui.mode.is_pretty() {
            ui::print(ui, &ui::badge(ui, Badge::Warn, &message));
        } else {
            ui::print(ui, &format!("warning={}", message));
        }
    }
    Ok(())
}

fn print_snapshots(
    ctx: &AppContext,
    store: &SqliteStore,
    snapshots: &[OwnershipSnapshot],
    context: Option<&str>,
) -> anyhow::Result<()> {
    let names = NameBook::load(store)?;
    let ui = ctx.ui();
    if ui.mode.is_json() {
        return emit_json(&snapshots_json(snapshots, &names)?);
    }

    let pretty = ui.mode.is_pretty();
    let rows: Vec<Vec<String>> = snapshots
        .iter()
        .map(|s| {
            let mut row = vec![
                id_cell(&s.id, pretty),
                names.property(&s.property_id).to_string(),
                names.owner(&s.owner_id).to_string(),
                s.percentage.to_string(),
                if s.active { "active" } else { "inactive" }.to_string(),
                s.version.to_string(),
            ];
            if pretty {
                row.push(note_cell(s.note.as_deref()));
            }
            row
        })
        .collect();
    let mut columns = vec![
        Column::new("ID"),
        Column::new("Property"),
        Column::new("Owner"),
        Column::numeric("Percentage"),
        Column::new("Status"),
        Column::new("Version"),
    ];
    if pretty {
        columns.push(Column::new("Note"));
    }
    ui::print(ui, &ui::header(ui, "share show", context));
    ui::print(ui, &ui::table(ui, &columns, &rows));
    if pretty && snapshots.is_empty() && !ctx.quiet() {
        ui::print(
            ui,
            &ui::hint(ui, "rentshare share set <PROPERTY> <OWNER> <PERCENTAGE>"),
        );
    }
    Ok(())
}

fn balances_json(balances: &[PropertyBalance], names: &NameBook) -> serde_json::Value {
    balances
        .iter()
        .map(|b| {
            serde_json::json!({
                "property_id": b.property_id,
                "property_name": names.property(&b.property_id),
                "owner_count": b.owner_count,
                "total": b.total_label(),
            })
        })
        .collect()
}

fn print_balances(
    ctx: &AppContext,
    store: &SqliteStore,
    balances: &[PropertyBalance],
) -> anyhow::Result<()> {
    let names = NameBook::load(store)?;
    let ui = ctx.ui();
    if ui.mode.is_json() {
        return emit_json(&balances_json(balances, &names));
    }
    if balances.is_empty() {
        if !ctx.quiet() && ui.mode.is_pretty() {
            ui::print(ui, &ui::badge(ui, Badge::Ok, "Every property sums to 100%"));
        }
        return Ok(());
    }
    let rows: Vec<Vec<String>> = balances
        .iter()
        .map(|b| {
            vec![
                names.property(&b.property_id).to_string(),
                b.owner_count.to_string(),
                b.total_label(),
            ]
        })
        .collect();
    let columns = [
        Column::new("Property"),
        Column::numeric("Owners"),
        Column::numeric("Total %"),
    ];
    ui::print(ui, &ui::header(ui, "share unbalanced", None));
    ui::print(ui, &ui::table(ui, &columns, &rows));
    Ok(())
}
