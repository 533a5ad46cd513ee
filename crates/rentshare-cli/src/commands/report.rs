use rentshare_core::storage::OwnerSummaryFilter;
use rentshare_core::{AggregationBuilder, AggregationMode, MatrixRequest, SqliteStore};

use crate::app::{resolve_owner, resolve_property, AppContext};
use crate::cli::{MatrixArgs, OwnersReportArgs, ReportCommand};
use crate::output::emit_json;
use crate::ui::{self, money_cell, Column};

pub fn handle_report(ctx: &AppContext, command: &ReportCommand) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let builder = AggregationBuilder::new(&store);
    let ui = ctx.ui();

    match command {
        ReportCommand::Years => {
            let years = builder.available_years()?;
            if ui.mode.is_json() {
                return emit_json(&years);
            }
            let rows: Vec<Vec<String>> = years.iter().map(|y| vec![y.to_string()]).collect();
            ui::print(ui, &ui::header(ui, "report years", None));
            ui::print(ui, &ui::table(ui, &[Column::new("Year")], &rows));
        }
        ReportCommand::Latest => {
            let latest = builder.latest_period()?;
            if ui.mode.is_json() {
                return emit_json(&latest.map(|p| {
                    serde_json::json!({
                        "year": p.year,
                        "month": p.month,
                        "label": p.label(),
                    })
                }));
            }
            match latest {
                Some(period) if ui.mode.is_pretty() => {
                    ui::print(ui, &ui::kv(ui, "Latest period", &period.label()));
                }
                Some(period) => ui::print(ui, &period.to_string()),
                None if ui.mode.is_pretty() => {
                    ui::print(ui, &ui::hint(ui, "No rent records yet"));
                }
                None => {}
            }
        }
        ReportCommand::Monthly { limit } => {
            let limit = match limit {
                Some(limit) => *limit,
                None => ctx.monthly_limit()?,
            };
            let totals = builder.monthly_totals(limit)?;
            if ui.mode.is_json() {
                return emit_json(&totals);
            }
            let pretty = ui.mode.is_pretty();
            let rows: Vec<Vec<String>> = totals
                .iter()
                .map(|t| {
                    let mut row = vec![t.period.to_string()];
                    if pretty {
                        row.push(t.label.clone());
                    }
                    row.push(t.record_count.to_string());
                    row.push(t.total.to_string());
                    row
                })
                .collect();
            let mut columns = vec![Column::new("Period")];
            if pretty {
                columns.push(Column::new("Month"));
            }
            columns.push(Column::numeric("Records"));
            columns.push(Column::numeric("Net Total"));
            let context = format!("last {}", limit);
            ui::print(ui, &ui::header(ui, "report monthly", Some(&context)));
            ui::print(ui, &ui::table(ui, &columns, &rows));
        }
        ReportCommand::ByProperty { year, month } => {
            let totals = builder.totals_by_property(*year, *month)?;
            if ui.mode.is_json() {
                return emit_json(&totals);
            }
            let rows: Vec<Vec<String>> = totals
                .properties
                .iter()
                .map(|p| {
                    vec![
                        p.property_name.clone(),
                        p.owner_count.to_string(),
                        p.total.to_string(),
                    ]
                })
                .collect();
            let columns = [
                Column::new("Property"),
                Column::numeric("Owners"),
                Column::numeric("Net Total"),
            ];
            let context = totals.period.map(|p| p.label());
            ui::print(ui, &ui::header(ui, "report by-property", context.as_deref()));
            ui::print(ui, &ui::table(ui, &columns, &rows));
        }
        ReportCommand::Matrix(args) => return handle_matrix(ctx, &store, args),
        ReportCommand::Owners(args) => return handle_owners(ctx, &store, args),
        ReportCommand::Property { property } => {
            let property = resolve_property(&store, property)?;
            let summary = builder.property_summary(&property.id)?;
            if ui.mode.is_json() {
                return emit_json(&summary);
            }
            let items = [
                ("Property", summary.property.name.clone()),
                ("Records", summary.record_count.to_string()),
                ("Gross Total", summary.gross_total.to_string()),
                ("Average Gross", money_cell(summary.average_gross)),
                ("Fee Share Total", summary.fee_share_total.to_string()),
                ("Net Total", summary.net_total.to_string()),
            ];
            ui::print(ui, &ui::header(ui, "report property", None));
            for (key, value) in &items {
                ui::print(ui, &ui::kv(ui, key, value));
            }
        }
    }
    Ok(())
}

fn handle_matrix(ctx: &AppContext, store: &SqliteStore, args: &MatrixArgs) -> anyhow::Result<()> {
    let mode: AggregationMode = match args.mode.as_deref() {
        Some(value) => value.parse()?,
        None => ctx.default_aggregation()?,
    };
    let mut request = MatrixRequest::new(mode);
    if let Some(year) = args.year {
        request = request.year(year);
    }
    if let Some(month) = args.month {
        request = request.month(month);
    }
    if let Some(owner) = args.owner.as_ref() {
        request = request.owner(resolve_owner(store, owner)?.id);
    }

    let matrix = AggregationBuilder::new(store).owner_property_matrix(&request)?;
    let ui = ctx.ui();
    if ui.mode.is_json() {
        return emit_json(&matrix);
    }

    let mut columns = vec![Column::new("Owner")];
    columns.extend(matrix.properties.iter().map(|p| Column::numeric(&p.name)));
    columns.push(Column::numeric("Total"));

    let mut rows: Vec<Vec<String>> = matrix
        .matrix
        .iter()
        .map(|row| {
            let mut cells = vec![row.owner_name.clone()];
            cells.extend(row.values.iter().map(ToString::to_string));
            cells.push(row.total.to_string());
            cells
        })
        .collect();
    if ui.mode.is_pretty() && !matrix.is_empty() {
        let mut totals = vec!["Total".to_string()];
        totals.extend(matrix.property_totals().iter().map(ToString::to_string));
        totals.push(matrix.grand_total.to_string());
        rows.push(totals);
    }

    ui::print(
        ui,
        &ui::header(ui, "report matrix", Some(&matrix.period.description)),
    );
    if matrix.is_empty() {
        if ui.mode.is_pretty() && !ctx.quiet() {
            ui::print(ui, &ui::hint(ui, "No rent records in this window"));
        }
        return Ok(());
    }
    ui::print(ui, &ui::table(ui, &columns, &rows));
    if !ui.mode.is_pretty() {
        ui::print(ui, &ui::kv(ui, "Grand Total", &matrix.grand_total.to_string()));
    }
    Ok(())
}

fn handle_owners(
    ctx: &AppContext,
    store: &SqliteStore,
    args: &OwnersReportArgs,
) -> anyhow::Result<()> {
    let filter = OwnerSummaryFilter {
        year: args.year,
        month: args.month,
        owner_id: match args.owner.as_ref() {
            Some(owner) => Some(resolve_owner(store, owner)?.id),
            None => None,
        },
        name_contains: args.name.clone(),
    };
    let summary = AggregationBuilder::new(store).owner_monthly_summary(&filter)?;
    let ui = ctx.ui();
    if ui.mode.is_json() {
        return emit_json(&summary);
    }

    let rows: Vec<Vec<String>> = summary
        .iter()
        .map(|row| {
            vec![
                row.period.to_string(),
                row.owner_name.clone(),
                row.property_count.to_string(),
                row.total.to_string(),
            ]
        })
        .collect();
    let columns = [
        Column::new("Period"),
        Column::new("Owner"),
        Column::numeric("Properties"),
        Column::numeric("Net Total"),
    ];
    ui::print(ui, &ui::header(ui, "report owners", None));
    ui::print(ui, &ui::table(ui, &columns, &rows));
    Ok(())
}
