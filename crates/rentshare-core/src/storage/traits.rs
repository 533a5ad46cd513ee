//! Record store trait definition.
//!
//! The `RecordStore` trait is the relational substrate the ledger, the
//! allocation engine and the aggregation builder run on. Every method takes
//! `&self` so one store can be shared across threads behind an `Arc`.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::types::{
    MatrixFilter, NewOwner, NewRentRecord, NewSnapshot, Owner, OwnerPeriodTotal,
    OwnerPropertySum, OwnerSummaryFilter, OwnershipSnapshot, PeriodTotal, Property,
    PropertyRentStats, PropertyTotal, RentFilter, RentRecord, RentRecordUpdate,
};
use crate::clock::VersionStamp;
use crate::error::Result;
use crate::money::Money;
use crate::period::Period;

/// Storage interface for properties, owners, rent records and ownership
/// snapshots.
///
/// All implementations must ensure:
/// - A new ownership version becomes visible all at once or not at all
/// - Fee share and net amount of a rent record are written together
/// - At most one rent record exists per (property, owner, period)
pub trait RecordStore: Send + Sync {
    // --- Registry ---

    /// Insert a property with a unique name.
    ///
    /// # Errors
    ///
    /// Returns `RentshareError::Conflict` if the name is taken.
    fn insert_property(&self, name: &str) -> Result<Property>;

    fn get_property(&self, id: &Uuid) -> Result<Option<Property>>;

    /// Look a property up by exact name.
    fn find_property_by_name(&self, name: &str) -> Result<Option<Property>>;

    /// List properties ordered by name.
    fn list_properties(&self, include_inactive: bool) -> Result<Vec<Property>>;

    /// Flip the active flag of a property.
    ///
    /// # Errors
    ///
    /// Returns `RentshareError::NotFound` if the property does not exist.
    fn set_property_active(&self, id: &Uuid, active: bool) -> Result<()>;

    fn insert_owner(&self, owner: &NewOwner) -> Result<Owner>;

    fn get_owner(&self, id: &Uuid) -> Result<Option<Owner>>;

    /// Look an owner up by first name or by "first last" display name
    /// (case-insensitive). Returns every match; callers decide what an
    /// ambiguous result means.
    fn find_owner_by_name(&self, name: &str) -> Result<Vec<Owner>>;

    /// List owners ordered by display name.
    fn list_owners(&self) -> Result<Vec<Owner>>;

    // --- Rent records ---

    /// Insert a rent record.
    ///
    /// The stored fee share starts at zero; the net amount starts at the
    /// supplied value.
    ///
    /// # Errors
    ///
    /// Returns `RentshareError::Conflict` if a record already exists for the
    /// same property, owner and period, and `RentshareError::NotFound` if
    /// the property or owner does not exist.
    fn insert_rent_record(&self, record: &NewRentRecord) -> Result<RentRecord>;

    fn get_rent_record(&self, id: &Uuid) -> Result<Option<RentRecord>>;

    /// List rent records matching the filter.
    fn list_rent_records(&self, filter: &RentFilter) -> Result<Vec<RentRecord>>;

    /// Apply an externally supplied partial update.
    ///
    /// # Errors
    ///
    /// Returns `RentshareError::NotFound` if the record does not exist.
    fn update_rent_record(&self, id: &Uuid, update: &RentRecordUpdate) -> Result<RentRecord>;

    /// Write the engine-owned fields of one record in a single statement.
    ///
    /// Returns `true` if either stored value changed.
    fn apply_allocation(&self, id: &Uuid, fee_share: Money, net_amount: Money) -> Result<bool>;

    /// Delete a rent record. Returns `false` if it did not exist.
    fn delete_rent_record(&self, id: &Uuid) -> Result<bool>;

    // --- Ownership snapshots ---

    /// Maximum version stamp across all snapshots.
    fn latest_version_stamp(&self) -> Result<Option<VersionStamp>>;

    /// Distinct version stamps, newest first.
    fn version_stamps(&self) -> Result<Vec<VersionStamp>>;

    /// Every snapshot carrying exactly `stamp`.
    fn snapshots_at(&self, stamp: &VersionStamp) -> Result<Vec<OwnershipSnapshot>>;

    /// Every snapshot stamped on `date` (UTC), across all versions of that day.
    fn snapshots_on(&self, date: NaiveDate) -> Result<Vec<OwnershipSnapshot>>;

    /// Greatest version stamp not after `instant`.
    fn version_at_or_before(&self, instant: DateTime<Utc>) -> Result<Option<VersionStamp>>;

    /// Append a complete ownership version.
    ///
    /// Runs as a compare-and-swap inside one transaction: the latest stamp
    /// must still be `expected_latest` and `stamp` must be strictly greater
    /// than it. On success every entry is stored with `stamp`.
    ///
    /// # Errors
    ///
    /// Returns `RentshareError::Conflict` if another version was appended in
    /// the meantime or `stamp` does not sort after the current latest.
    fn append_version(
        &self,
        expected_latest: Option<&VersionStamp>,
        stamp: &VersionStamp,
        entries: &[NewSnapshot],
    ) -> Result<Vec<OwnershipSnapshot>>;

    fn get_snapshot(&self, id: &Uuid) -> Result<Option<OwnershipSnapshot>>;

    /// Remove one snapshot row. Returns `false` if it did not exist.
    fn delete_snapshot(&self, id: &Uuid) -> Result<bool>;

    // --- Aggregates over rent records ---

    /// Distinct years with rent records, descending.
    fn distinct_years(&self) -> Result<Vec<i32>>;

    /// Greatest (year, month) with rent records.
    fn latest_period(&self) -> Result<Option<Period>>;

    /// Net totals per period for the `limit` most recent periods, newest
    /// first.
    fn period_totals(&self, limit: usize) -> Result<Vec<PeriodTotal>>;

    /// Net totals per property for one period, largest first.
    fn property_totals(&self, period: &Period) -> Result<Vec<PropertyTotal>>;

    /// Net totals per (owner, property) pair under a period restriction.
    fn owner_property_sums(&self, filter: &MatrixFilter) -> Result<Vec<OwnerPropertySum>>;

    /// Net totals per (owner, period), ordered year desc, month desc, owner
    /// name.
    fn owner_period_totals(&self, filter: &OwnerSummaryFilter) -> Result<Vec<OwnerPeriodTotal>>;

    fn property_rent_stats(&self, property_id: &Uuid) -> Result<PropertyRentStats>;

    // --- Maintenance ---

    /// Check store integrity.
    ///
    /// Verifies:
    /// - Foreign key relationships
    /// - Percentage and month bounds
    /// - Snapshot uniqueness per version
    ///
    /// # Errors
    ///
    /// Returns `RentshareError::Validation` describing the first problem
    /// found.
    fn check_integrity(&self) -> Result<()>;
}
