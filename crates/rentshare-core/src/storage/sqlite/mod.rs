//! SQLite storage backend.
//!
//! One connection guarded by a mutex. File databases run in WAL mode so a
//! second process can read while a recalculation is writing; ownership
//! versions are appended inside an immediate transaction so the
//! compare-and-swap also holds across processes.

mod row;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use uuid::Uuid;

use crate::clock::VersionStamp;
use crate::error::{RentshareError, Result};
use crate::money::Money;
use crate::period::Period;
use crate::storage::traits::RecordStore;
use crate::storage::types::{
    MatrixFilter, NewOwner, NewRentRecord, NewSnapshot, Owner, OwnerPeriodTotal,
    OwnerPropertySum, OwnerSummaryFilter, OwnershipSnapshot, PeriodTotal, Property,
    PropertyRentStats, PropertyTotal, RentFilter, RentRecord, RentRecordUpdate, SortOrder,
};

use row::{
    count_at, money_at, period_at, query_all, query_opt, uuid_at, OWNER_COLUMNS, OWNER_NAME_SQL,
    PROPERTY_COLUMNS, RENT_RECORD_COLUMNS, SNAPSHOT_COLUMNS,
};

/// Current schema version, stored in the `meta` table.
pub const SCHEMA_VERSION: &str = "1";

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS meta (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS properties (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS owners (
        id TEXT PRIMARY KEY,
        first_name TEXT NOT NULL,
        last_name TEXT,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS rent_records (
        id TEXT PRIMARY KEY,
        property_id TEXT NOT NULL,
        owner_id TEXT NOT NULL,
        year INTEGER NOT NULL,
        month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
        gross_cents INTEGER,
        admin_fee_cents INTEGER NOT NULL DEFAULT 0,
        fee_share_cents INTEGER NOT NULL DEFAULT 0,
        net_cents INTEGER NOT NULL DEFAULT 0,
        note TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,

        UNIQUE(property_id, owner_id, year, month),
        FOREIGN KEY(property_id) REFERENCES properties(id),
        FOREIGN KEY(owner_id) REFERENCES owners(id)
    );

    CREATE INDEX IF NOT EXISTS rent_records_period
    ON rent_records (year, month);

    -- Append-only: one row per (property, owner) per version
    CREATE TABLE IF NOT EXISTS ownership_snapshots (
        id TEXT PRIMARY KEY,
        property_id TEXT NOT NULL,
        owner_id TEXT NOT NULL,
        percentage_micros INTEGER NOT NULL
            CHECK (percentage_micros BETWEEN 0 AND 100000000),
        note TEXT,
        active INTEGER NOT NULL DEFAULT 1,
        version_at TEXT NOT NULL,

        UNIQUE(property_id, owner_id, version_at),
        FOREIGN KEY(property_id) REFERENCES properties(id),
        FOREIGN KEY(owner_id) REFERENCES owners(id)
    );

    CREATE INDEX IF NOT EXISTS ownership_snapshots_version
    ON ownership_snapshots (version_at);
"#;

/// SQLite-backed record store.
pub struct SqliteStore {
    path: Option<PathBuf>,
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        let store = Self::init(conn, Some(path.to_path_buf()))?;
        tracing::debug!(path = %path.display(), "opened sqlite store");
        Ok(store)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?, None)
    }

    /// Location of the database file, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;

        let existing: Option<String> = conn
            .query_row(
                "SELECT value FROM meta WHERE key = 'schema_version'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        match existing {
            None => {
                conn.execute(
                    "INSERT INTO meta (key, value) VALUES ('schema_version', ?)",
                    [SCHEMA_VERSION],
                )?;
                conn.execute(
                    "INSERT INTO meta (key, value) VALUES ('created_at', ?)",
                    [Utc::now().to_rfc3339()],
                )?;
            }
            Some(version) if version != SCHEMA_VERSION => {
                return Err(RentshareError::Storage(format!(
                    "Unsupported schema version {} (expected {})",
                    version, SCHEMA_VERSION
                )));
            }
            Some(_) => {}
        }

        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Lock the database connection, returning an error if the mutex is poisoned.
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| RentshareError::Storage("SQLite connection poisoned".to_string()))
    }

    fn select_rent_record(conn: &Connection, id: &Uuid) -> Result<Option<RentRecord>> {
        let sql = format!(
            "SELECT {} FROM rent_records r WHERE r.id = ?",
            RENT_RECORD_COLUMNS
        );
        query_opt(conn, &sql, [id.to_string()], row::rent_record)
    }

    fn select_snapshots(
        conn: &Connection,
        condition: &str,
        param: &str,
    ) -> Result<Vec<OwnershipSnapshot>> {
        let sql = format!(
            "SELECT {} FROM ownership_snapshots s \
             JOIN properties p ON p.id = s.property_id \
             JOIN owners o ON o.id = s.owner_id \
             WHERE {} ORDER BY s.version_at, p.name, {}",
            SNAPSHOT_COLUMNS,
            condition,
            OWNER_NAME_SQL
        );
        query_all(conn, &sql, [param], row::snapshot)
    }

    fn max_version(conn: &Connection) -> Result<Option<String>> {
        let value: Option<String> =
            conn.query_row("SELECT MAX(version_at) FROM ownership_snapshots", [], |row| {
                row.get(0)
            })?;
        Ok(value)
    }

    fn exists(conn: &Connection, table: &str, id: &Uuid) -> Result<bool> {
        let sql = format!("SELECT 1 FROM {} WHERE id = ?", table);
        let found: Option<i64> = conn
            .query_row(&sql, [id.to_string()], |row| row.get(0))
            .optional()?;
        Ok(found.is_some())
    }
}

fn clean_optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl RecordStore for SqliteStore {
    fn insert_property(&self, name: &str) -> Result<Property> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RentshareError::InvalidArgument(
                "Property name cannot be empty".to_string(),
            ));
        }

        let conn = self.lock_conn()?;
        let taken: Option<String> = conn
            .query_row(
                "SELECT id FROM properties WHERE name = ?",
                [name],
                |row| row.get(0),
            )
            .optional()?;
        if taken.is_some() {
            return Err(RentshareError::Conflict(format!(
                "Property '{}' already exists",
                name
            )));
        }

        let property = Property {
            id: Uuid::new_v4(),
            name: name.to_string(),
            active: true,
            created_at: Utc::now(),
        };
        conn.execute(
            "INSERT INTO properties (id, name, active, created_at) VALUES (?, ?, 1, ?)",
            params![
                property.id.to_string(),
                property.name,
                property.created_at.to_rfc3339()
            ],
        )?;
        Ok(property)
    }

    fn get_property(&self, id: &Uuid) -> Result<Option<Property>> {
        let conn = self.lock_conn()?;
        let sql = format!("SELECT {} FROM properties p WHERE p.id = ?", PROPERTY_COLUMNS);
        query_opt(&conn, &sql, [id.to_string()], row::property)
    }

    fn find_property_by_name(&self, name: &str) -> Result<Option<Property>> {
        let conn = self.lock_conn()?;
        let sql = format!("SELECT {} FROM properties p WHERE p.name = ?", PROPERTY_COLUMNS);
        query_opt(&conn, &sql, [name.trim()], row::property)
    }

    fn list_properties(&self, include_inactive: bool) -> Result<Vec<Property>> {
        let conn = self.lock_conn()?;
        let mut sql = format!("SELECT {} FROM properties p", PROPERTY_COLUMNS);
        if !include_inactive {
            sql.push_str(" WHERE p.active = 1");
        }
        sql.push_str(" ORDER BY p.name");
        query_all(&conn, &sql, [], row::property)
    }

    fn set_property_active(&self, id: &Uuid, active: bool) -> Result<()> {
        let conn = self.lock_conn()?;
        let changed = conn.execute(
            "UPDATE properties SET active = ? WHERE id = ?",
            params![active, id.to_string()],
        )?;
        if changed == 0 {
            return Err(RentshareError::NotFound(format!("Property {}", id)));
        }
        Ok(())
    }

    fn insert_owner(&self, owner: &NewOwner) -> Result<Owner> {
        let first_name = owner.first_name.trim();
        if first_name.is_empty() {
            return Err(RentshareError::InvalidArgument(
                "Owner first name cannot be empty".to_string(),
            ));
        }

        let created = Owner {
            id: Uuid::new_v4(),
            first_name: first_name.to_string(),
            last_name: clean_optional(&owner.last_name),
            created_at: Utc::now(),
        };
        let conn = self.lock_conn()?;
        conn.execute(
            "INSERT INTO owners (id, first_name, last_name, created_at) VALUES (?, ?, ?, ?)",
            params![
                created.id.to_string(),
                created.first_name,
                created.last_name,
                created.created_at.to_rfc3339()
            ],
        )?;
        Ok(created)
    }

    fn get_owner(&self, id: &Uuid) -> Result<Option<Owner>> {
        let conn = self.lock_conn()?;
        let sql = format!("SELECT {} FROM owners o WHERE o.id = ?", OWNER_COLUMNS);
        query_opt(&conn, &sql, [id.to_string()], row::owner)
    }

    fn find_owner_by_name(&self, name: &str) -> Result<Vec<Owner>> {
        let conn = self.lock_conn()?;
        let sql = format!(
            "SELECT {cols} FROM owners o \
             WHERE LOWER(o.first_name) = LOWER(?1) OR LOWER({name}) = LOWER(?1) \
             ORDER BY {name}",
            cols = OWNER_COLUMNS,
            name = OWNER_NAME_SQL
        );
        query_all(&conn, &sql, [name.trim()], row::owner)
    }

    fn list_owners(&self) -> Result<Vec<Owner>> {
        let conn = self.lock_conn()?;
        let sql = format!(
            "SELECT {} FROM owners o ORDER BY {}",
            OWNER_COLUMNS, OWNER_NAME_SQL
        );
        query_all(&conn, &sql, [], row::owner)
    }

    fn insert_rent_record(&self, record: &NewRentRecord) -> Result<RentRecord> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        if !Self::exists(&tx, "properties", &record.property_id)? {
            return Err(RentshareError::NotFound(format!(
                "Property {}",
                record.property_id
            )));
        }
        if !Self::exists(&tx, "owners", &record.owner_id)? {
            return Err(RentshareError::NotFound(format!("Owner {}", record.owner_id)));
        }

        let duplicate: Option<String> = tx
            .query_row(
                "SELECT id FROM rent_records WHERE property_id = ? AND owner_id = ? AND year = ? AND month = ?",
                params![
                    record.property_id.to_string(),
                    record.owner_id.to_string(),
                    record.period.year,
                    record.period.month
                ],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(existing) = duplicate {
            return Err(RentshareError::Conflict(format!(
                "Rent record {} already exists for this property, owner and period {}",
                existing, record.period
            )));
        }

        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();
        tx.execute(
            "INSERT INTO rent_records (id, property_id, owner_id, year, month, gross_cents, admin_fee_cents, fee_share_cents, net_cents, note, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?, ?)",
            params![
                id.to_string(),
                record.property_id.to_string(),
                record.owner_id.to_string(),
                record.period.year,
                record.period.month,
                record.gross_amount.map(|m| m.cents()),
                record.total_admin_fee.cents(),
                record.net_amount.cents(),
                clean_optional(&record.note),
                now,
                now
            ],
        )?;

        let created = Self::select_rent_record(&tx, &id)?
            .ok_or_else(|| RentshareError::Storage("Inserted rent record vanished".to_string()))?;
        tx.commit()?;
        Ok(created)
    }

    fn get_rent_record(&self, id: &Uuid) -> Result<Option<RentRecord>> {
        let conn = self.lock_conn()?;
        Self::select_rent_record(&conn, id)
    }

    fn list_rent_records(&self, filter: &RentFilter) -> Result<Vec<RentRecord>> {
        let conn = self.lock_conn()?;

        let mut conditions: Vec<&str> = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(year) = filter.year {
            conditions.push("r.year = ?");
            params.push(Box::new(year));
        }
        if let Some(month) = filter.month {
            conditions.push("r.month = ?");
            params.push(Box::new(month));
        }
        if let Some(property_id) = filter.property_id {
            conditions.push("r.property_id = ?");
            params.push(Box::new(property_id.to_string()));
        }
        if let Some(owner_id) = filter.owner_id {
            conditions.push("r.owner_id = ?");
            params.push(Box::new(owner_id.to_string()));
        }

        let mut query = format!(
            "SELECT {} FROM rent_records r \
             JOIN properties p ON p.id = r.property_id \
             JOIN owners o ON o.id = r.owner_id",
            RENT_RECORD_COLUMNS
        );
        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }
        let direction = match filter.order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        query.push_str(&format!(
            " ORDER BY r.year {dir}, r.month {dir}, p.name, {name}",
            dir = direction,
            name = OWNER_NAME_SQL
        ));

        if filter.limit.is_some() || filter.offset.is_some() {
            query.push_str(" LIMIT ? OFFSET ?");
            params.push(Box::new(filter.limit.map(|l| l as i64).unwrap_or(-1)));
            params.push(Box::new(filter.offset.unwrap_or(0) as i64));
        }

        query_all(
            &conn,
            &query,
            rusqlite::params_from_iter(params.iter()),
            row::rent_record,
        )
    }

    fn update_rent_record(&self, id: &Uuid, update: &RentRecordUpdate) -> Result<RentRecord> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let current = Self::select_rent_record(&tx, id)?
            .ok_or_else(|| RentshareError::NotFound(format!("Rent record {}", id)))?;
        if update.is_empty() {
            return Ok(current);
        }

        let gross = match update.gross_amount {
            Some(value) => value,
            None => current.gross_amount,
        };
        let fee = update.total_admin_fee.unwrap_or(current.total_admin_fee);
        let note = match &update.note {
            Some(value) => clean_optional(value),
            None => current.note.clone(),
        };

        tx.execute(
            "UPDATE rent_records SET gross_cents = ?, admin_fee_cents = ?, note = ?, updated_at = ? WHERE id = ?",
            params![
                gross.map(|m| m.cents()),
                fee.cents(),
                note,
                Utc::now().to_rfc3339(),
                id.to_string()
            ],
        )?;

        let updated = Self::select_rent_record(&tx, id)?
            .ok_or_else(|| RentshareError::NotFound(format!("Rent record {}", id)))?;
        tx.commit()?;
        Ok(updated)
    }

    fn apply_allocation(&self, id: &Uuid, fee_share: Money, net_amount: Money) -> Result<bool> {
        let conn = self.lock_conn()?;
        let changed = conn.execute(
            "UPDATE rent_records SET fee_share_cents = ?1, net_cents = ?2, updated_at = ?3 \
             WHERE id = ?4 AND (fee_share_cents != ?1 OR net_cents != ?2)",
            params![
                fee_share.cents(),
                net_amount.cents(),
                Utc::now().to_rfc3339(),
                id.to_string()
            ],
        )?;
        if changed > 0 {
            return Ok(true);
        }
        if !Self::exists(&conn, "rent_records", id)? {
            return Err(RentshareError::NotFound(format!("Rent record {}", id)));
        }
        Ok(false)
    }

    fn delete_rent_record(&self, id: &Uuid) -> Result<bool> {
        let conn = self.lock_conn()?;
        let deleted = conn.execute("DELETE FROM rent_records WHERE id = ?", [id.to_string()])?;
        Ok(deleted > 0)
    }

    fn latest_version_stamp(&self) -> Result<Option<VersionStamp>> {
        let conn = self.lock_conn()?;
        Self::max_version(&conn)?
            .map(|value| VersionStamp::parse_db(&value))
            .transpose()
    }

    fn version_stamps(&self) -> Result<Vec<VersionStamp>> {
        let conn = self.lock_conn()?;
        query_all(
            &conn,
            "SELECT DISTINCT version_at FROM ownership_snapshots ORDER BY version_at DESC",
            [],
            |row| VersionStamp::parse_db(&row.get::<_, String>(0)?),
        )
    }

    fn snapshots_at(&self, stamp: &VersionStamp) -> Result<Vec<OwnershipSnapshot>> {
        let conn = self.lock_conn()?;
        Self::select_snapshots(&conn, "s.version_at = ?", &stamp.to_db_string())
    }

    fn snapshots_on(&self, date: NaiveDate) -> Result<Vec<OwnershipSnapshot>> {
        let conn = self.lock_conn()?;
        Self::select_snapshots(
            &conn,
            "substr(s.version_at, 1, 10) = ?",
            &date.format("%Y-%m-%d").to_string(),
        )
    }

    fn version_at_or_before(&self, instant: DateTime<Utc>) -> Result<Option<VersionStamp>> {
        let conn = self.lock_conn()?;
        let bound = VersionStamp::new(instant).to_db_string();
        let value: Option<String> = conn.query_row(
            "SELECT MAX(version_at) FROM ownership_snapshots WHERE version_at <= ?",
            [bound],
            |row| row.get(0),
        )?;
        value.map(|v| VersionStamp::parse_db(&v)).transpose()
    }

    fn append_version(
        &self,
        expected_latest: Option<&VersionStamp>,
        stamp: &VersionStamp,
        entries: &[NewSnapshot],
    ) -> Result<Vec<OwnershipSnapshot>> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current = Self::max_version(&tx)?;
        let expected = expected_latest.map(VersionStamp::to_db_string);
        if current != expected {
            return Err(RentshareError::Conflict(format!(
                "Ownership version changed (expected {}, found {})",
                expected.as_deref().unwrap_or("none"),
                current.as_deref().unwrap_or("none")
            )));
        }

        let stamp_text = stamp.to_db_string();
        if let Some(ref latest) = current {
            if stamp_text <= *latest {
                return Err(RentshareError::Conflict(format!(
                    "Version stamp {} does not sort after {}",
                    stamp_text, latest
                )));
            }
        }

        {
            let mut insert = tx.prepare(
                "INSERT INTO ownership_snapshots (id, property_id, owner_id, percentage_micros, note, active, version_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )?;
            for entry in entries {
                insert.execute(params![
                    Uuid::new_v4().to_string(),
                    entry.property_id.to_string(),
                    entry.owner_id.to_string(),
                    entry.percentage.micros(),
                    clean_optional(&entry.note),
                    entry.active,
                    stamp_text
                ])?;
            }
        }

        let created = Self::select_snapshots(&tx, "s.version_at = ?", &stamp_text)?;
        tx.commit()?;
        Ok(created)
    }

    fn get_snapshot(&self, id: &Uuid) -> Result<Option<OwnershipSnapshot>> {
        let conn = self.lock_conn()?;
        let sql = format!(
            "SELECT {} FROM ownership_snapshots s WHERE s.id = ?",
            SNAPSHOT_COLUMNS
        );
        query_opt(&conn, &sql, [id.to_string()], row::snapshot)
    }

    fn delete_snapshot(&self, id: &Uuid) -> Result<bool> {
        let conn = self.lock_conn()?;
        let deleted = conn.execute(
            "DELETE FROM ownership_snapshots WHERE id = ?",
            [id.to_string()],
        )?;
        Ok(deleted > 0)
    }

    fn distinct_years(&self) -> Result<Vec<i32>> {
        let conn = self.lock_conn()?;
        query_all(
            &conn,
            "SELECT DISTINCT year FROM rent_records ORDER BY year DESC",
            [],
            |row| Ok(row.get(0)?),
        )
    }

    fn latest_period(&self) -> Result<Option<Period>> {
        let conn = self.lock_conn()?;
        query_opt(
            &conn,
            "SELECT year, month FROM rent_records ORDER BY year DESC, month DESC LIMIT 1",
            [],
            |row| period_at(row, 0),
        )
    }

    fn period_totals(&self, limit: usize) -> Result<Vec<PeriodTotal>> {
        let conn = self.lock_conn()?;
        query_all(
            &conn,
            "SELECT year, month, COALESCE(SUM(net_cents), 0), COUNT(*) FROM rent_records \
             GROUP BY year, month ORDER BY year DESC, month DESC LIMIT ?",
            [limit as i64],
            |row| {
                Ok(PeriodTotal {
                    period: period_at(row, 0)?,
                    total: money_at(row, 2)?,
                    record_count: count_at(row, 3)?,
                })
            },
        )
    }

    fn property_totals(&self, period: &Period) -> Result<Vec<PropertyTotal>> {
        let conn = self.lock_conn()?;
        query_all(
            &conn,
            "SELECT p.id, p.name, COALESCE(SUM(r.net_cents), 0) AS total, COUNT(DISTINCT r.owner_id) \
             FROM rent_records r JOIN properties p ON p.id = r.property_id \
             WHERE r.year = ? AND r.month = ? \
             GROUP BY p.id, p.name ORDER BY total DESC, p.name",
            params![period.year, period.month],
            |row| {
                Ok(PropertyTotal {
                    property_id: uuid_at(row, 0, "property")?,
                    property_name: row.get(1)?,
                    total: money_at(row, 2)?,
                    owner_count: count_at(row, 3)?,
                })
            },
        )
    }

    fn owner_property_sums(&self, filter: &MatrixFilter) -> Result<Vec<OwnerPropertySum>> {
        let conn = self.lock_conn()?;

        let mut conditions: Vec<&str> = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        if let Some(year) = filter.year {
            conditions.push("r.year = ?");
            params.push(Box::new(year));
        }
        if let Some(month) = filter.month {
            conditions.push("r.month = ?");
            params.push(Box::new(month));
        }
        if let Some(owner_id) = filter.owner_id {
            conditions.push("r.owner_id = ?");
            params.push(Box::new(owner_id.to_string()));
        }

        let mut query = format!(
            "SELECT o.id, {name} AS owner_name, p.id, p.name, COALESCE(SUM(r.net_cents), 0) \
             FROM rent_records r \
             JOIN properties p ON p.id = r.property_id \
             JOIN owners o ON o.id = r.owner_id",
            name = OWNER_NAME_SQL
        );
        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }
        query.push_str(" GROUP BY o.id, p.id ORDER BY owner_name, p.name");

        query_all(
            &conn,
            &query,
            rusqlite::params_from_iter(params.iter()),
            |row| {
                Ok(OwnerPropertySum {
                    owner_id: uuid_at(row, 0, "owner")?,
                    owner_name: row.get(1)?,
                    property_id: uuid_at(row, 2, "property")?,
                    property_name: row.get(3)?,
                    total: money_at(row, 4)?,
                })
            },
        )
    }

    fn owner_period_totals(&self, filter: &OwnerSummaryFilter) -> Result<Vec<OwnerPeriodTotal>> {
        let conn = self.lock_conn()?;

        let mut conditions: Vec<String> = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        if let Some(year) = filter.year {
            conditions.push("r.year = ?".to_string());
            params.push(Box::new(year));
        }
        if let Some(month) = filter.month {
            conditions.push("r.month = ?".to_string());
            params.push(Box::new(month));
        }
        if let Some(owner_id) = filter.owner_id {
            conditions.push("r.owner_id = ?".to_string());
            params.push(Box::new(owner_id.to_string()));
        }
        if let Some(ref needle) = filter.name_contains {
            conditions.push(format!(
                "INSTR(LOWER({}), LOWER(?)) > 0",
                OWNER_NAME_SQL
            ));
            params.push(Box::new(needle.trim().to_string()));
        }

        let mut query = format!(
            "SELECT o.id, {name} AS owner_name, r.year, r.month, \
             COALESCE(SUM(r.net_cents), 0), COUNT(DISTINCT r.property_id) \
             FROM rent_records r JOIN owners o ON o.id = r.owner_id",
            name = OWNER_NAME_SQL
        );
        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }
        query.push_str(
            " GROUP BY o.id, r.year, r.month ORDER BY r.year DESC, r.month DESC, owner_name",
        );

        query_all(
            &conn,
            &query,
            rusqlite::params_from_iter(params.iter()),
            |row| {
                Ok(OwnerPeriodTotal {
                    owner_id: uuid_at(row, 0, "owner")?,
                    owner_name: row.get(1)?,
                    period: period_at(row, 2)?,
                    total: money_at(row, 4)?,
                    property_count: count_at(row, 5)?,
                })
            },
        )
    }

    fn property_rent_stats(&self, property_id: &Uuid) -> Result<PropertyRentStats> {
        let conn = self.lock_conn()?;
        let stats = query_opt(
            &conn,
            "SELECT COUNT(*), COALESCE(SUM(gross_cents), 0), COALESCE(SUM(fee_share_cents), 0), \
             COALESCE(SUM(net_cents), 0) FROM rent_records WHERE property_id = ?",
            [property_id.to_string()],
            |row| {
                Ok(PropertyRentStats {
                    record_count: count_at(row, 0)?,
                    gross_total: money_at(row, 1)?,
                    fee_share_total: money_at(row, 2)?,
                    net_total: money_at(row, 3)?,
                })
            },
        )?;
        stats.ok_or_else(|| RentshareError::Storage("Aggregate query returned no row".to_string()))
    }

    fn check_integrity(&self) -> Result<()> {
        let conn = self.lock_conn()?;

        let mut stmt = conn.prepare("PRAGMA foreign_key_check")?;
        let mut rows = stmt.query([])?;
        if rows.next()?.is_some() {
            return Err(RentshareError::Validation(
                "Foreign key integrity check failed".to_string(),
            ));
        }

        let bad_percentages: i64 = conn.query_row(
            "SELECT COUNT(*) FROM ownership_snapshots WHERE percentage_micros < 0 OR percentage_micros > 100000000",
            [],
            |row| row.get(0),
        )?;
        if bad_percentages > 0 {
            return Err(RentshareError::Validation(format!(
                "{} ownership snapshot(s) have a percentage outside [0, 100]",
                bad_percentages
            )));
        }

        let bad_months: i64 = conn.query_row(
            "SELECT COUNT(*) FROM rent_records WHERE month < 1 OR month > 12",
            [],
            |row| row.get(0),
        )?;
        if bad_months > 0 {
            return Err(RentshareError::Validation(format!(
                "{} rent record(s) have an invalid month",
                bad_months
            )));
        }

        let duplicates: i64 = conn.query_row(
            "SELECT COUNT(*) FROM (SELECT 1 FROM ownership_snapshots GROUP BY property_id, owner_id, version_at HAVING COUNT(*) > 1)",
            [],
            |row| row.get(0),
        )?;
        if duplicates > 0 {
            return Err(RentshareError::Validation(
                "Ownership versions contain duplicate (property, owner) pairs".to_string(),
            ));
        }

        let malformed_stamps: i64 = conn.query_row(
            "SELECT COUNT(*) FROM ownership_snapshots WHERE LENGTH(version_at) != 27",
            [],
            |row| row.get(0),
        )?;
        if malformed_stamps > 0 {
            return Err(RentshareError::Validation(
                "Ownership snapshots have malformed version stamps".to_string(),
            ));
        }

        Ok(())
    }
}
