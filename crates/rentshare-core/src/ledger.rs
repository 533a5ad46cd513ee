//! Ownership ledger.
//!
//! Ownership percentages are kept as immutable versions. Every edit copies
//! the whole current ownership table into a new version stamped with one
//! fresh instant, so "all ownership as of version V" is a single equality
//! lookup. Nothing is ever updated in place.
//!
//! Version creation is optimistic: the new version is appended only if the
//! latest stamp is still the one the copy-forward read. On a collision the
//! whole read-copy-append cycle is retried up to [`MAX_VERSION_ATTEMPTS`]
//! times before the `Conflict` is surfaced.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::clock::{Clock, VersionStamp};
use crate::error::{RentshareError, Result};
use crate::percentage::{format_micros, Percentage};
use crate::storage::{NewSnapshot, OwnershipSnapshot, RecordStore};

/// How many times a version append is attempted before giving up.
pub const MAX_VERSION_ATTEMPTS: usize = 5;

/// One complete ownership version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnershipVersion {
    pub stamp: VersionStamp,
    pub snapshots: Vec<OwnershipSnapshot>,
}

impl OwnershipVersion {
    /// Snapshot for one (property, owner) pair, if the version has one.
    pub fn find(&self, property_id: &Uuid, owner_id: &Uuid) -> Option<&OwnershipSnapshot> {
        self.snapshots
            .iter()
            .find(|s| s.property_id == *property_id && s.owner_id == *owner_id)
    }

    /// Active percentage for one (property, owner) pair.
    pub fn percentage_of(&self, property_id: &Uuid, owner_id: &Uuid) -> Option<Percentage> {
        self.find(property_id, owner_id)
            .filter(|s| s.active)
            .map(|s| s.percentage)
    }
}

/// Sum of active percentages of one property inside a version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyBalance {
    pub property_id: Uuid,
    pub owner_count: usize,
    pub total_micros: i64,
}

impl PropertyBalance {
    /// Total as a percent string, e.g. `"125"`.
    pub fn total_label(&self) -> String {
        format_micros(self.total_micros)
    }

    pub fn is_balanced(&self) -> bool {
        self.total_micros == Percentage::FULL_MICROS
    }
}

/// Versioned store of ownership percentages.
pub struct OwnershipLedger<'a, S: RecordStore + ?Sized> {
    store: &'a S,
    clock: &'a dyn Clock,
}

impl<'a, S: RecordStore + ?Sized> OwnershipLedger<'a, S> {
    pub fn new(store: &'a S, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    /// Distinct calendar dates that carry a version, newest first.
    pub fn list_versions(&self) -> Result<Vec<NaiveDate>> {
        let mut dates: Vec<NaiveDate> = Vec::new();
        for stamp in self.store.version_stamps()? {
            let date = stamp.date();
            if dates.last() != Some(&date) {
                dates.push(date);
            }
        }
        Ok(dates)
    }

    /// Snapshots of the latest version, or of every version created on `at`.
    ///
    /// With no date and an empty ledger the result is empty.
    ///
    /// # Errors
    ///
    /// Returns `RentshareError::NotFound` if a date is given and no version
    /// was created that day.
    pub fn get_version(&self, at: Option<NaiveDate>) -> Result<Vec<OwnershipSnapshot>> {
        match at {
            None => Ok(self
                .latest_version()?
                .map(|version| version.snapshots)
                .unwrap_or_default()),
            Some(date) => {
                let snapshots = self.store.snapshots_on(date)?;
                if snapshots.is_empty() {
                    return Err(RentshareError::NotFound(format!(
                        "No ownership version on {}",
                        date
                    )));
                }
                Ok(snapshots)
            }
        }
    }

    /// The version carrying the greatest stamp.
    pub fn latest_version(&self) -> Result<Option<OwnershipVersion>> {
        match self.store.latest_version_stamp()? {
            Some(stamp) => Ok(Some(self.load(stamp)?)),
            None => Ok(None),
        }
    }

    /// The version in force at `instant` (greatest stamp not after it).
    ///
    /// # Errors
    ///
    /// Returns `RentshareError::NotFound` if every version is newer.
    pub fn version_as_of(&self, instant: DateTime<Utc>) -> Result<OwnershipVersion> {
        self.version_in_force(instant)?.ok_or_else(|| {
            RentshareError::NotFound(format!("No ownership version at or before {}", instant))
        })
    }

    /// Like [`Self::version_as_of`], with `None` instead of `NotFound`.
    pub fn version_in_force(&self, instant: DateTime<Utc>) -> Result<Option<OwnershipVersion>> {
        match self.store.version_at_or_before(instant)? {
            Some(stamp) => Ok(Some(self.load(stamp)?)),
            None => Ok(None),
        }
    }

    /// Active percentage of one pair, in the latest version or the one in
    /// force at `at`.
    pub fn percentage_for(
        &self,
        property_id: &Uuid,
        owner_id: &Uuid,
        at: Option<DateTime<Utc>>,
    ) -> Result<Option<Percentage>> {
        let version = match at {
            Some(instant) => Some(self.version_as_of(instant)?),
            None => self.latest_version()?,
        };
        Ok(version.and_then(|v| v.percentage_of(property_id, owner_id)))
    }

    /// Write a new version that changes one (property, owner) pair and
    /// carries every other pair of the latest version forward unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RentshareError::NotFound` if the property or owner does not
    /// exist, and `RentshareError::Conflict` if concurrent writers won every
    /// attempt.
    pub fn replace_single(
        &self,
        property_id: Uuid,
        owner_id: Uuid,
        percentage: Percentage,
        note: Option<String>,
    ) -> Result<OwnershipVersion> {
        self.require_references(&[(property_id, owner_id)])?;

        let mut replacement = NewSnapshot::new(property_id, owner_id, percentage);
        replacement.note = note;

        self.append_with_retry(|latest| {
            let mut entries: Vec<NewSnapshot> = latest
                .map(|version| {
                    version
                        .snapshots
                        .iter()
                        .filter(|s| !(s.property_id == property_id && s.owner_id == owner_id))
                        .map(NewSnapshot::carried_from)
                        .collect()
                })
                .unwrap_or_default();
            entries.push(replacement.clone());
            entries
        })
    }

    /// Write a new version made of exactly `entries`. Pairs not mentioned
    /// are not carried forward.
    ///
    /// Every entry is checked before anything is written.
    ///
    /// # Errors
    ///
    /// Returns `RentshareError::InvalidArgument` for an empty list or a
    /// repeated pair, and `RentshareError::NotFound` for an unknown property
    /// or owner.
    pub fn replace_full(&self, entries: &[NewSnapshot]) -> Result<OwnershipVersion> {
        if entries.is_empty() {
            return Err(RentshareError::InvalidArgument(
                "A full replacement needs at least one entry".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for entry in entries {
            if !seen.insert((entry.property_id, entry.owner_id)) {
                return Err(RentshareError::InvalidArgument(format!(
                    "Property {} and owner {} appear more than once",
                    entry.property_id, entry.owner_id
                )));
            }
        }

        let pairs: Vec<(Uuid, Uuid)> = entries
            .iter()
            .map(|e| (e.property_id, e.owner_id))
            .collect();
        self.require_references(&pairs)?;

        self.append_with_retry(|_| entries.to_vec())
    }

    /// Remove one snapshot row outright. History is not preserved.
    pub fn delete_snapshot(&self, id: &Uuid) -> Result<()> {
        if !self.store.delete_snapshot(id)? {
            return Err(RentshareError::NotFound(format!("Ownership snapshot {}", id)));
        }
        tracing::info!(snapshot = %id, "deleted ownership snapshot");
        Ok(())
    }

    /// Properties whose active percentages do not add up to 100%.
    pub fn unbalanced_properties(&self, version: &OwnershipVersion) -> Vec<PropertyBalance> {
        let mut totals: BTreeMap<Uuid, (usize, i64)> = BTreeMap::new();
        for snapshot in version.snapshots.iter().filter(|s| s.active) {
            let slot = totals.entry(snapshot.property_id).or_insert((0, 0));
            slot.0 += 1;
            slot.1 += snapshot.percentage.micros();
        }
        totals
            .into_iter()
            .map(|(property_id, (owner_count, total_micros))| PropertyBalance {
                property_id,
                owner_count,
                total_micros,
            })
            .filter(|balance| !balance.is_balanced())
            .collect()
    }

    fn load(&self, stamp: VersionStamp) -> Result<OwnershipVersion> {
        let snapshots = self.store.snapshots_at(&stamp)?;
        Ok(OwnershipVersion { stamp, snapshots })
    }

    fn require_references(&self, pairs: &[(Uuid, Uuid)]) -> Result<()> {
        let mut properties = HashSet::new();
        let mut owners = HashSet::new();
        for (property_id, owner_id) in pairs {
            if properties.insert(*property_id) && self.store.get_property(property_id)?.is_none()
            {
                return Err(RentshareError::NotFound(format!("Property {}", property_id)));
            }
            if owners.insert(*owner_id) && self.store.get_owner(owner_id)?.is_none() {
                return Err(RentshareError::NotFound(format!("Owner {}", owner_id)));
            }
        }
        Ok(())
    }

    /// Smallest usable stamp: now, or just past the current latest when the
    /// clock has not moved beyond it.
    fn next_stamp(&self, latest: Option<&VersionStamp>) -> VersionStamp {
        let now = VersionStamp::new(self.clock.now());
        match latest {
            Some(latest) if now <= *latest => latest.next(),
            _ => now,
        }
    }

    fn append_with_retry<F>(&self, build: F) -> Result<OwnershipVersion>
    where
        F: Fn(Option<&OwnershipVersion>) -> Vec<NewSnapshot>,
    {
        let mut last_conflict = None;
        for attempt in 1..=MAX_VERSION_ATTEMPTS {
            let latest = self.latest_version()?;
            let latest_stamp = latest.as_ref().map(|v| v.stamp);
            let entries = build(latest.as_ref());
            let stamp = self.next_stamp(latest_stamp.as_ref());

            match self
                .store
                .append_version(latest_stamp.as_ref(), &stamp, &entries)
            {
                Ok(snapshots) => {
                    let version = OwnershipVersion { stamp, snapshots };
                    tracing::info!(
                        version = %version.stamp,
                        snapshots = version.snapshots.len(),
                        attempt,
                        "created ownership version"
                    );
                    for balance in self.unbalanced_properties(&version) {
                        tracing::warn!(
                            version = %version.stamp,
                            property = %balance.property_id,
                            total = %balance.total_label(),
                            "ownership percentages do not sum to 100"
                        );
                    }
                    return Ok(version);
                }
                Err(RentshareError::Conflict(reason)) => {
                    tracing::warn!(attempt, %reason, "ownership version collision, retrying");
                    last_conflict = Some(reason);
                }
                Err(err) => return Err(err),
            }
        }

        Err(RentshareError::Conflict(format!(
            "Gave up creating an ownership version after {} attempts: {}",
            MAX_VERSION_ATTEMPTS,
            last_conflict.unwrap_or_default()
        )))
    }
}
