//! Column lists and row mappers for database queries.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Params, Row};
use uuid::Uuid;

use crate::clock::VersionStamp;
use crate::error::{RentshareError, Result};
use crate::money::Money;
use crate::percentage::Percentage;
use crate::period::Period;
use crate::storage::types::{OwnershipSnapshot, Owner, Property, RentRecord};

/// SQL expression for an owner's display name over the `o` alias.
pub const OWNER_NAME_SQL: &str = "CASE WHEN o.last_name IS NULL OR TRIM(o.last_name) = '' \
     THEN o.first_name ELSE o.first_name || ' ' || TRIM(o.last_name) END";

pub const PROPERTY_COLUMNS: &str = "p.id, p.name, p.active, p.created_at";

pub const OWNER_COLUMNS: &str = "o.id, o.first_name, o.last_name, o.created_at";

pub const RENT_RECORD_COLUMNS: &str = "r.id, r.property_id, r.owner_id, r.year, r.month, \
     r.gross_cents, r.admin_fee_cents, r.fee_share_cents, r.net_cents, r.note, \
     r.created_at, r.updated_at";

pub const SNAPSHOT_COLUMNS: &str =
    "s.id, s.property_id, s.owner_id, s.percentage_micros, s.note, s.active, s.version_at";

/// Run `sql` and map every returned row.
pub fn query_all<T, P, F>(conn: &Connection, sql: &str, params: P, mut map: F) -> Result<Vec<T>>
where
    P: Params,
    F: FnMut(&Row<'_>) -> Result<T>,
{
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut mapped = Vec::new();
    while let Some(row) = rows.next()? {
        mapped.push(map(row)?);
    }
    Ok(mapped)
}

/// Run `sql` and map the first returned row, if any.
pub fn query_opt<T, P, F>(conn: &Connection, sql: &str, params: P, map: F) -> Result<Option<T>>
where
    P: Params,
    F: FnOnce(&Row<'_>) -> Result<T>,
{
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let first = rows.next()?;
    first.map(map).transpose()
}

pub fn uuid_at(row: &Row<'_>, idx: usize, what: &str) -> Result<Uuid> {
    let value: String = row.get(idx)?;
    Uuid::parse_str(&value)
        .map_err(|e| RentshareError::Storage(format!("Invalid {} UUID: {}", what, e)))
}

fn timestamp_at(row: &Row<'_>, idx: usize) -> Result<DateTime<Utc>> {
    let value: String = row.get(idx)?;
    Ok(DateTime::parse_from_rfc3339(&value)
        .map_err(|e| RentshareError::Storage(format!("Invalid timestamp: {}", e)))?
        .with_timezone(&Utc))
}

pub fn money_at(row: &Row<'_>, idx: usize) -> Result<Money> {
    Ok(Money::from_cents(row.get(idx)?))
}

pub fn count_at(row: &Row<'_>, idx: usize) -> Result<usize> {
    let value: i64 = row.get(idx)?;
    Ok(usize::try_from(value).unwrap_or(0))
}

/// `year` and `month` columns at `idx` and `idx + 1`.
pub fn period_at(row: &Row<'_>, idx: usize) -> Result<Period> {
    stored_period(row.get(idx)?, row.get(idx + 1)?)
}

/// Stored periods bypass the year window so old data stays readable.
fn stored_period(year: i32, month: u32) -> Result<Period> {
    if !(1..=12).contains(&month) {
        return Err(RentshareError::Storage(format!(
            "Invalid stored month {} for year {}",
            month, year
        )));
    }
    Ok(Period { year, month })
}

/// Maps [`PROPERTY_COLUMNS`].
pub fn property(row: &Row<'_>) -> Result<Property> {
    Ok(Property {
        id: uuid_at(row, 0, "property")?,
        name: row.get(1)?,
        active: row.get(2)?,
        created_at: timestamp_at(row, 3)?,
    })
}

/// Maps [`OWNER_COLUMNS`].
pub fn owner(row: &Row<'_>) -> Result<Owner> {
    Ok(Owner {
        id: uuid_at(row, 0, "owner")?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        created_at: timestamp_at(row, 3)?,
    })
}

/// Maps [`RENT_RECORD_COLUMNS`].
pub fn rent_record(row: &Row<'_>) -> Result<RentRecord> {
    let gross: Option<i64> = row.get(5)?;
    Ok(RentRecord {
        id: uuid_at(row, 0, "rent record")?,
        property_id: uuid_at(row, 1, "property")?,
        owner_id: uuid_at(row, 2, "owner")?,
        period: period_at(row, 3)?,
        gross_amount: gross.map(Money::from_cents),
        total_admin_fee: money_at(row, 6)?,
        fee_share: money_at(row, 7)?,
        net_amount: money_at(row, 8)?,
        note: row.get(9)?,
        created_at: timestamp_at(row, 10)?,
        updated_at: timestamp_at(row, 11)?,
    })
}

/// Maps [`SNAPSHOT_COLUMNS`].
pub fn snapshot(row: &Row<'_>) -> Result<OwnershipSnapshot> {
    let percentage = Percentage::from_micros(row.get(3)?)
        .map_err(|e| RentshareError::Storage(format!("Invalid stored percentage: {}", e)))?;
    let version_at: String = row.get(6)?;
    Ok(OwnershipSnapshot {
        id: uuid_at(row, 0, "snapshot")?,
        property_id: uuid_at(row, 1, "property")?,
        owner_id: uuid_at(row, 2, "owner")?,
        percentage,
        note: row.get(4)?,
        active: row.get(5)?,
        version: VersionStamp::parse_db(&version_at)?,
    })
}
