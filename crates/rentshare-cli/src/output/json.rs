//! JSON views that add display names to ID-only rows.

use serde::Serialize;
use serde_json::Value;

use rentshare_core::storage::{OwnershipSnapshot, RentRecord};

use super::NameBook;

fn with_names<T: Serialize>(
    row: &T,
    property_name: &str,
    owner_name: &str,
) -> anyhow::Result<Value> {
    let mut value = serde_json::to_value(row)?;
    if let Some(object) = value.as_object_mut() {
        object.insert("property_name".to_string(), property_name.into());
        object.insert("owner_name".to_string(), owner_name.into());
    }
    Ok(value)
}

pub fn rent_record_json(record: &RentRecord, names: &NameBook) -> anyhow::Result<Value> {
    with_names(
        record,
        names.property(&record.property_id),
        names.owner(&record.owner_id),
    )
}

pub fn rent_records_json(records: &[RentRecord], names: &NameBook) -> anyhow::Result<Vec<Value>> {
    records.iter().map(|r| rent_record_json(r, names)).collect()
}

pub fn snapshots_json(
    snapshots: &[OwnershipSnapshot],
    names: &NameBook,
) -> anyhow::Result<Vec<Value>> {
    snapshots
        .iter()
        .map(|s| with_names(s, names.property(&s.property_id), names.owner(&s.owner_id)))
        .collect()
}
