//! Core data types for the storage layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::VersionStamp;
use crate::money::Money;
use crate::percentage::Percentage;
use crate::period::Period;

/// A rental property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub id: Uuid,

    /// Unique display name
    pub name: String,

    pub active: bool,

    pub created_at: DateTime<Utc>,
}

/// An owner of (parts of) properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Owner {
    /// Display name: first and last name joined by a space.
    pub fn display_name(&self) -> String {
        match self.last_name.as_deref().map(str::trim) {
            Some(last) if !last.is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        }
    }
}

/// Builder for a new owner.
#[derive(Debug, Clone)]
pub struct NewOwner {
    pub first_name: String,
    pub last_name: Option<String>,
}

impl NewOwner {
    pub fn new(first_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: None,
        }
    }

    pub fn with_last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }
}

/// One owner's rent for one property and period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentRecord {
    pub id: Uuid,
    pub property_id: Uuid,
    pub owner_id: Uuid,
    pub period: Period,

    /// Owner's gross rent, when tracked separately from the net payout
    pub gross_amount: Option<Money>,

    /// Administration fee charged for the whole property this period
    pub total_admin_fee: Money,

    /// Owner's share of `total_admin_fee` (engine-owned)
    pub fee_share: Money,

    /// Owner's payout (engine-owned when `gross_amount` is present)
    pub net_amount: Money,

    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Builder for a new rent record.
#[derive(Debug, Clone)]
pub struct NewRentRecord {
    pub property_id: Uuid,
    pub owner_id: Uuid,
    pub period: Period,
    pub gross_amount: Option<Money>,
    pub total_admin_fee: Money,

    /// Externally supplied payout, used as-is when no gross amount is tracked
    pub net_amount: Money,

    pub note: Option<String>,
}

impl NewRentRecord {
    pub fn new(property_id: Uuid, owner_id: Uuid, period: Period) -> Self {
        Self {
            property_id,
            owner_id,
            period,
            gross_amount: None,
            total_admin_fee: Money::zero(),
            net_amount: Money::zero(),
            note: None,
        }
    }

    pub fn with_gross(mut self, gross: Money) -> Self {
        self.gross_amount = Some(gross);
        self
    }

    pub fn with_admin_fee(mut self, fee: Money) -> Self {
        self.total_admin_fee = fee;
        self
    }

    pub fn with_net(mut self, net: Money) -> Self {
        self.net_amount = net;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Fields of a rent record that may be overwritten from outside.
///
/// Fee share and net amount belong to the allocation engine. `None` leaves a field untouched; `Some(None)` clears
/// an optional field.
#[derive(Debug, Clone, Default)]
pub struct RentRecordUpdate {
    pub gross_amount: Option<Option<Money>>,
    pub total_admin_fee: Option<Money>,
    pub note: Option<Option<String>>,
}

impl RentRecordUpdate {
    pub fn is_empty(&self) -> bool {
        self.gross_amount.is_none() && self.total_admin_fee.is_none() && self.note.is_none()
    }
}

/// Sort direction for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Filter for querying rent records.
#[derive(Debug, Clone, Default)]
pub struct RentFilter {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub property_id: Option<Uuid>,
    pub owner_id: Option<Uuid>,

    /// Period ordering (ties broken by property, then owner)
    pub order: SortOrder,

    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl RentFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn month(mut self, month: u32) -> Self {
        self.month = Some(month);
        self
    }

    pub fn property(mut self, id: Uuid) -> Self {
        self.property_id = Some(id);
        self
    }

    pub fn owner(mut self, id: Uuid) -> Self {
        self.owner_id = Some(id);
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// One (property, owner) percentage inside an ownership version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipSnapshot {
    pub id: Uuid,
    pub property_id: Uuid,
    pub owner_id: Uuid,
    pub percentage: Percentage,
    pub note: Option<String>,
    pub active: bool,
    pub version: VersionStamp,
}

/// A snapshot to be written as part of a new version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSnapshot {
    pub property_id: Uuid,
    pub owner_id: Uuid,
    pub percentage: Percentage,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl NewSnapshot {
    pub fn new(property_id: Uuid, owner_id: Uuid, percentage: Percentage) -> Self {
        Self {
            property_id,
            owner_id,
            percentage,
            note: None,
            active: true,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Carry an existing snapshot forward into a new version unchanged.
    pub fn carried_from(snapshot: &OwnershipSnapshot) -> Self {
        Self {
            property_id: snapshot.property_id,
            owner_id: snapshot.owner_id,
            percentage: snapshot.percentage,
            note: snapshot.note.clone(),
            active: snapshot.active,
        }
    }
}

/// Summed net amount for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodTotal {
    pub period: Period,
    pub total: Money,
    pub record_count: usize,
}

/// Summed net amount for one property within a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyTotal {
    pub property_id: Uuid,
    pub property_name: String,
    pub total: Money,
    pub owner_count: usize,
}

/// Summed net amount for one (owner, property) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerPropertySum {
    pub owner_id: Uuid,
    pub owner_name: String,
    pub property_id: Uuid,
    pub property_name: String,
    pub total: Money,
}

/// Period restriction for owner × property sums.
#[derive(Debug, Clone, Default)]
pub struct MatrixFilter {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub owner_id: Option<Uuid>,
}

/// Summed net amount for one owner within one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerPeriodTotal {
    pub owner_id: Uuid,
    pub owner_name: String,
    pub period: Period,
    pub total: Money,
    pub property_count: usize,
}

/// Filter for per-owner period totals.
#[derive(Debug, Clone, Default)]
pub struct OwnerSummaryFilter {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub owner_id: Option<Uuid>,

    /// Case-insensitive substring of the owner's display name
    pub name_contains: Option<String>,
}

/// Totals over every rent record of one property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRentStats {
    pub record_count: usize,
    pub gross_total: Money,
    pub fee_share_total: Money,
    pub net_total: Money,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_display_name() {
        let mut owner = Owner {
            id: Uuid::new_v4(),
            first_name: "Ana".to_string(),
            last_name: Some("Souza".to_string()),
            created_at: Utc::now(),
        };
        assert_eq!(owner.display_name(), "Ana Souza");
        owner.last_name = Some("  ".to_string());
        assert_eq!(owner.display_name(), "Ana");
        owner.last_name = None;
        assert_eq!(owner.display_name(), "Ana");
    }

    #[test]
    fn test_rent_filter_builder() {
        let property = Uuid::new_v4();
        let filter = RentFilter::new()
            .year(2025)
            .month(3)
            .property(property)
            .order(SortOrder::Asc)
            .limit(10);

        assert_eq!(filter.year, Some(2025));
        assert_eq!(filter.month, Some(3));
        assert_eq!(filter.property_id, Some(property));
        assert_eq!(filter.order, SortOrder::Asc);
        assert_eq!(filter.limit, Some(10));
        assert_eq!(filter.owner_id, None);
    }

    #[test]
    fn test_new_snapshot_deserializes_with_defaults() {
        let property = Uuid::new_v4();
        let owner = Uuid::new_v4();
        let json = serde_json::json!({
            "property_id": property,
            "owner_id": owner,
            "percentage": 25,
        });
        let snapshot: NewSnapshot = serde_json::from_value(json).unwrap();
        assert!(snapshot.active);
        assert_eq!(snapshot.note, None);
        assert_eq!(snapshot.percentage, Percentage::whole(25).unwrap());
    }

    #[test]
    fn test_empty_update() {
        assert!(RentRecordUpdate::default().is_empty());
        let update = RentRecordUpdate {
            note: Some(None),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
