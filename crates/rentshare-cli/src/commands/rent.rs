use rentshare_core::storage::{NewRentRecord, RentFilter, RentRecord, RentRecordUpdate, SortOrder};
use rentshare_core::{Period, RecordStore, RentshareError};

use crate::app::{parse_id, resolve_owner, resolve_property, AppContext};
use crate::cli::{RentAddArgs, RentCommand, RentEditArgs, RentListArgs};
use crate::constants::DEFAULT_RENT_LIST_LIMIT;
use crate::helpers::parse_amount;
use crate::output::json::{rent_record_json, rent_records_json};
use crate::output::{emit_json, NameBook};
use crate::ui::{self, id_cell, money_cell, note_cell, note_line, Column};

pub fn handle_rent(ctx: &AppContext, command: &RentCommand) -> anyhow::Result<()> {
    match command {
        RentCommand::Add(args) => handle_add(ctx, args),
        RentCommand::List(args) => handle_list(ctx, args),
        RentCommand::Edit(args) => handle_edit(ctx, args),
        RentCommand::Delete { id } => handle_delete(ctx, id),
    }
}

fn handle_add(ctx: &AppContext, args: &RentAddArgs) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let property = resolve_property(&store, &args.property)?;
    let owner = resolve_owner(&store, &args.owner)?;
    let period: Period = args.period.parse()?;

    let mut record = NewRentRecord::new(property.id, owner.id, period);
    if let Some(gross) = parse_amount(args.gross.as_deref())? {
        record = record.with_gross(gross);
    }
    if let Some(fee) = parse_amount(args.fee.as_deref())? {
        record = record.with_admin_fee(fee);
    }
    if let Some(net) = parse_amount(args.net.as_deref())? {
        record = record.with_net(net);
    }
    if let Some(note) = args.note.as_ref() {
        record = record.with_note(note.as_str());
    }

    let record = store.insert_rent_record(&record)?;
    print_record(ctx, &store, "Added rent record", &record)
}

fn handle_list(ctx: &AppContext, args: &RentListArgs) -> anyhow::Result<()> {
    let store = ctx.open_store()?;

    let mut filter = RentFilter::new().order(if args.asc {
        SortOrder::Asc
    } else {
        SortOrder::Desc
    });
    if let Some(year) = args.year {
        filter = filter.year(year);
    }
    if let Some(month) = args.month {
        filter = filter.month(month);
    }
    if let Some(property) = args.property.as_ref() {
        filter = filter.property(resolve_property(&store, property)?.id);
    }
    if let Some(owner) = args.owner.as_ref() {
        filter = filter.owner(resolve_owner(&store, owner)?.id);
    }
    if let Some(offset) = args.offset {
        filter = filter.offset(offset);
    }
    filter = filter.limit(args.limit.unwrap_or(DEFAULT_RENT_LIST_LIMIT));

    let records = store.list_rent_records(&filter)?;
    let names = NameBook::load(&store)?;
    let ui = ctx.ui();
    if ui.mode.is_json() {
        return emit_json(&rent_records_json(&records, &names)?);
    }

    let pretty = ui.mode.is_pretty();
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            let mut row = vec![
                id_cell(&r.id, pretty),
                r.period.to_string(),
                names.property(&r.property_id).to_string(),
                names.owner(&r.owner_id).to_string(),
                money_cell(r.gross_amount),
                r.total_admin_fee.to_string(),
                r.fee_share.to_string(),
                r.net_amount.to_string(),
            ];
            if pretty {
                row.push(note_cell(r.note.as_deref()));
            }
            row
        })
        .collect();

    let mut columns = vec![
        Column::new("ID"),
        Column::new("Period"),
        Column::new("Property"),
        Column::new("Owner"),
        Column::numeric("Gross"),
        Column::numeric("Fee"),
        Column::numeric("Fee Share"),
        Column::numeric("Net"),
    ];
    if pretty {
        columns.push(Column::new("Note"));
    }
    ui::print(ui, &ui::header(ui, "rent list", None));
    ui::print(ui, &ui::table(ui, &columns, &rows));
    Ok(())
}

fn handle_edit(ctx: &AppContext, args: &RentEditArgs) -> anyhow::Result<()> {
    let id = parse_id(&args.id, "rent record")?;

    let mut update = RentRecordUpdate::default();
    if args.clear_gross {
        update.gross_amount = Some(None);
    } else if let Some(gross) = parse_amount(args.gross.as_deref())? {
        update.gross_amount = Some(Some(gross));
    }
    update.total_admin_fee = parse_amount(args.fee.as_deref())?;
    if args.clear_note {
        update.note = Some(None);
    } else if let Some(note) = args.note.as_ref() {
        update.note = Some(Some(note.clone()));
    }
    if update.is_empty() {
        return Err(RentshareError::InvalidArgument(
            "Nothing to change; pass --gross, --fee or --note".to_string(),
        )
        .into());
    }

    let store = ctx.open_store()?;
    let record = store.update_rent_record(&id, &update)?;
    print_record(ctx, &store, "Updated rent record", &record)?;
    if ctx.ui().mode.is_pretty() && !ctx.quiet() {
        ui::print(
            ctx.ui(),
            &ui::hint(ctx.ui(), "Run `rentshare recalculate` to refresh fee share and net"),
        );
    }
    Ok(())
}

fn handle_delete(ctx: &AppContext, id: &str) -> anyhow::Result<()> {
    let id = parse_id(id, "rent record")?;
    let store = ctx.open_store()?;
    if !store.delete_rent_record(&id)? {
        return Err(RentshareError::NotFound(format!("Rent record {}", id)).into());
    }

    let ui = ctx.ui();
    if ui.mode.is_json() {
        return emit_json(&serde_json::json!({ "id": id, "deleted": true }));
    }
    if !ctx.quiet() {
        ui::print(
            ui,
            &ui::receipt(ui, "Deleted rent record", &[("ID", id.to_string())]),
        );
    }
    Ok(())
}

fn print_record<S: RecordStore + ?Sized>(
    ctx: &AppContext,
    store: &S,
    title: &str,
    record: &RentRecord,
) -> anyhow::Result<()> {
    let names = NameBook::load(store)?;
    let ui = ctx.ui();
    if ui.mode.is_json() {
        return emit_json(&rent_record_json(record, &names)?);
    }
    if ctx.quiet() {
        return Ok(());
    }
    let mut items = vec![
        ("ID", record.id.to_string()),
        ("Property", names.property(&record.property_id).to_string()),
        ("Owner", names.owner(&record.owner_id).to_string()),
        ("Period", record.period.to_string()),
        ("Gross", money_cell(record.gross_amount)),
        ("Admin Fee", record.total_admin_fee.to_string()),
        ("Fee Share", record.fee_share.to_string()),
        ("Net", record.net_amount.to_string()),
    ];
    if let Some(note) = record.note.as_ref() {
        items.push(("Note", note_line(note)));
    }
    ui::print(ui, &ui::receipt(ui, title, &items));
    Ok(())
}
