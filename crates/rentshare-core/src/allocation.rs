//! Fee allocation engine.
//!
//! Splits each property's administration fee among its owners by ownership
//! percentage and derives every owner's net payout. A batch is best effort:
//! a record that cannot be allocated is reported and skipped, and each
//! record is written on its own, so an interrupted batch leaves the records
//! it already finished in place.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::{Clock, VersionStamp};
use crate::error::{RentshareError, Result};
use crate::ledger::{OwnershipLedger, OwnershipVersion};
use crate::money::Money;
use crate::percentage::Percentage;
use crate::period::Period;
use crate::storage::{RecordStore, RentFilter, RentRecord, SortOrder};

/// Which ownership version a rent record is allocated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnershipBinding {
    /// The latest version, whatever the record's period.
    #[default]
    Latest,

    /// The version in force at the last instant of the record's month.
    PeriodEnd,
}

impl fmt::Display for OwnershipBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str("latest"),
            Self::PeriodEnd => f.write_str("period_end"),
        }
    }
}

impl FromStr for OwnershipBinding {
    type Err = RentshareError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latest" => Ok(Self::Latest),
            "period_end" | "period-end" => Ok(Self::PeriodEnd),
            other => Err(RentshareError::InvalidArgument(format!(
                "Unknown ownership binding '{}' (expected latest or period_end)",
                other
            ))),
        }
    }
}

/// Derived fee fields of one rent record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Allocation {
    pub fee_share: Money,
    pub net_amount: Money,
}

/// Compute a record's fee share and net amount for a given percentage.
///
/// `fee_share` is the record's total fee times `percentage / 100`, rounded
/// half to even at the cent. When the record tracks a gross amount the net
/// amount is gross minus fee share; otherwise the stored net amount is kept.
///
/// # Errors
///
/// Returns `RentshareError::InvalidArgument` if the total fee is negative.
pub fn allocate(record: &RentRecord, percentage: Percentage) -> Result<Allocation> {
    if record.total_admin_fee.is_negative() {
        return Err(RentshareError::InvalidArgument(format!(
            "Administration fee {} is negative",
            record.total_admin_fee
        )));
    }

    let fee_share = record.total_admin_fee.share(percentage);
    let net_amount = match record.gross_amount {
        Some(gross) => gross - fee_share,
        None => record.net_amount,
    };
    Ok(Allocation {
        fee_share,
        net_amount,
    })
}

/// Why one record was skipped during a recalculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationError {
    pub record_id: Uuid,
    pub property_id: Uuid,
    pub owner_id: Uuid,
    pub period: Period,
    pub reason: String,
}

impl fmt::Display for AllocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "record {} ({}): {}", self.record_id, self.period, self.reason)
    }
}

/// Outcome of a recalculation batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecalculationReport {
    pub binding: OwnershipBinding,

    /// Records examined
    pub processed: usize,

    /// Records whose stored fee share or net amount changed
    pub updated: usize,

    pub skipped: usize,
    pub errors: Vec<AllocationError>,
}

impl RecalculationReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// The report itself if nothing was skipped, `PartialFailure` otherwise.
    pub fn into_result(self) -> Result<Self> {
        if self.is_clean() {
            return Ok(self);
        }
        Err(RentshareError::PartialFailure {
            skipped: self.skipped,
            reasons: self.errors.iter().map(ToString::to_string).collect(),
        })
    }
}

/// Recomputes the engine-owned fields of rent records.
pub struct FeeAllocator<'a, S: RecordStore + ?Sized> {
    store: &'a S,
    ledger: OwnershipLedger<'a, S>,
    binding: OwnershipBinding,
}

impl<'a, S: RecordStore + ?Sized> FeeAllocator<'a, S> {
    pub fn new(store: &'a S, clock: &'a dyn Clock) -> Self {
        Self {
            store,
            ledger: OwnershipLedger::new(store, clock),
            binding: OwnershipBinding::default(),
        }
    }

    pub fn with_binding(mut self, binding: OwnershipBinding) -> Self {
        self.binding = binding;
        self
    }

    pub fn binding(&self) -> OwnershipBinding {
        self.binding
    }

    /// Recompute fee share and net amount of every rent record.
    ///
    /// Ownership versions are resolved once per batch: the latest version
    /// as it stood when the batch started, or one version per period.
    ///
    /// # Errors
    ///
    /// Only storage failures abort the batch. Per-record problems end up in
    /// the report.
    pub fn recalculate_all(&self) -> Result<RecalculationReport> {
        let records = self
            .store
            .list_rent_records(&RentFilter::new().order(SortOrder::Asc))?;

        let mut resolver = VersionResolver::new(&self.ledger, self.binding)?;
        let mut report = RecalculationReport {
            binding: self.binding,
            ..Default::default()
        };

        for record in &records {
            report.processed += 1;
            match self.recalculate_record(record, &mut resolver) {
                Ok(true) => report.updated += 1,
                Ok(false) => {}
                Err(err) if err.is_client_error() => {
                    let reason = match err {
                        RentshareError::NotFound(msg)
                        | RentshareError::InvalidArgument(msg)
                        | RentshareError::Conflict(msg) => msg,
                        other => other.to_string(),
                    };
                    tracing::warn!(
                        record = %record.id,
                        period = %record.period,
                        %reason,
                        "skipped rent record"
                    );
                    report.skipped += 1;
                    report.errors.push(AllocationError {
                        record_id: record.id,
                        property_id: record.property_id,
                        owner_id: record.owner_id,
                        period: record.period,
                        reason,
                    });
                }
                Err(err) => return Err(err),
            }
        }

        tracing::info!(
            binding = %self.binding,
            processed = report.processed,
            updated = report.updated,
            skipped = report.skipped,
            "fee recalculation finished"
        );
        Ok(report)
    }

    fn recalculate_record(
        &self,
        record: &RentRecord,
        resolver: &mut VersionResolver<'_, 'a, S>,
    ) -> Result<bool> {
        let version = resolver.version_for(&record.period)?;
        let percentage = version
            .and_then(|v| v.percentage_of(&record.property_id, &record.owner_id))
            .ok_or_else(|| {
                RentshareError::NotFound(format!(
                    "no ownership percentage found for owner {} on property {}",
                    record.owner_id, record.property_id
                ))
            })?;

        let allocation = allocate(record, percentage)?;
        if allocation.fee_share == record.fee_share && allocation.net_amount == record.net_amount
        {
            return Ok(false);
        }
        self.store
            .apply_allocation(&record.id, allocation.fee_share, allocation.net_amount)
    }
}

/// Resolves and caches the ownership version each period binds to.
struct VersionResolver<'l, 'a, S: RecordStore + ?Sized> {
    ledger: &'l OwnershipLedger<'a, S>,
    binding: OwnershipBinding,
    latest: Option<OwnershipVersion>,
    by_stamp: HashMap<VersionStamp, OwnershipVersion>,
    by_period: HashMap<Period, Option<VersionStamp>>,
}

impl<'l, 'a, S: RecordStore + ?Sized> VersionResolver<'l, 'a, S> {
    fn new(ledger: &'l OwnershipLedger<'a, S>, binding: OwnershipBinding) -> Result<Self> {
        let latest = match binding {
            OwnershipBinding::Latest => ledger.latest_version()?,
            OwnershipBinding::PeriodEnd => None,
        };
        Ok(Self {
            ledger,
            binding,
            latest,
            by_stamp: HashMap::new(),
            by_period: HashMap::new(),
        })
    }

    fn version_for(&mut self, period: &Period) -> Result<Option<&OwnershipVersion>> {
        if self.binding == OwnershipBinding::Latest {
            return Ok(self.latest.as_ref());
        }

        let stamp = match self.by_period.get(period) {
            Some(stamp) => *stamp,
            None => {
                let resolved = self.ledger.version_in_force(period.end_instant())?;
                let stamp = resolved.as_ref().map(|v| v.stamp);
                if let Some(version) = resolved {
                    self.by_stamp.entry(version.stamp).or_insert(version);
                }
                self.by_period.insert(*period, stamp);
                stamp
            }
        };
        Ok(stamp.and_then(|s| self.by_stamp.get(&s)))
    }
}
