use rentshare_core::storage::NewOwner;
use rentshare_core::RecordStore;

use crate::app::{resolve_property, AppContext};
use crate::cli::{OwnerCommand, PropertyCommand};
use crate::output::emit_json;
use crate::ui::{self, id_cell, timestamp_cell, Column};

pub fn handle_property(ctx: &AppContext, command: &PropertyCommand) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let ui = ctx.ui();

    match command {
        PropertyCommand::Add { name } => {
            let property = store.insert_property(name)?;
            if ui.mode.is_json() {
                return emit_json(&property);
            }
            if !ctx.quiet() {
                ui::print(
                    ui,
                    &ui::receipt(
                        ui,
                        "Added property",
                        &[("ID", property.id.to_string()), ("Name", property.name)],
                    ),
                );
            }
        }
        PropertyCommand::List { all } => {
            let properties = store.list_properties(*all)?;
            if ui.mode.is_json() {
                return emit_json(&properties);
            }
            let pretty = ui.mode.is_pretty();
            let rows: Vec<Vec<String>> = properties
                .iter()
                .map(|p| {
                    vec![
                        id_cell(&p.id, pretty),
                        p.name.clone(),
                        if p.active { "active" } else { "inactive" }.to_string(),
                        timestamp_cell(&p.created_at, pretty),
                    ]
                })
                .collect();
            let columns = [
                Column::new("ID"),
                Column::new("Name"),
                Column::new("Status"),
                Column::new("Created"),
            ];
            ui::print(ui, &ui::header(ui, "property list", None));
            ui::print(ui, &ui::table(ui, &columns, &rows));
            if pretty && properties.is_empty() && !ctx.quiet() {
                ui::print(ui, &ui::hint(ui, "rentshare property add <NAME>"));
            }
        }
        PropertyCommand::Deactivate { property } => {
            let property = resolve_property(&store, property)?;
            store.set_property_active(&property.id, false)?;
            if ui.mode.is_json() {
                return emit_json(&serde_json::json!({
                    "id": property.id,
                    "name": property.name,
                    "active": false,
                }));
            }
            if !ctx.quiet() {
                ui::print(
                    ui,
                    &ui::receipt(
                        ui,
                        "Deactivated property",
                        &[("ID", property.id.to_string()), ("Name", property.name)],
                    ),
                );
            }
        }
    }
    Ok(())
}

pub fn handle_owner(ctx: &AppContext, command: &OwnerCommand) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let ui = ctx.ui();

    match command {
        OwnerCommand::Add { first_name, last } => {
            let mut new_owner = NewOwner::new(first_name.as_str());
            if let Some(last) = last {
                new_owner = new_owner.with_last_name(last.as_str());
            }
            let owner = store.insert_owner(&new_owner)?;
            if ui.mode.is_json() {
                return emit_json(&owner);
            }
            if !ctx.quiet() {
                ui::print(
                    ui,
                    &ui::receipt(
                        ui,
                        "Added owner",
                        &[("ID", owner.id.to_string()), ("Name", owner.display_name())],
                    ),
                );
            }
        }
        OwnerCommand::List => {
            let owners = store.list_owners()?;
            if ui.mode.is_json() {
                return emit_json(&owners);
            }
            let pretty = ui.mode.is_pretty();
            let rows: Vec<Vec<String>> = owners
                .iter()
                .map(|o| vec![id_cell(&o.id, pretty), o.display_name()])
                .collect();
            ui::print(ui, &ui::header(ui, "owner list", None));
            ui::print(
                ui,
                &ui::table(ui, &[Column::new("ID"), Column::new("Name")], &rows),
            );
        }
    }
    Ok(())
}
