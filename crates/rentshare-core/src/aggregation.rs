//! Aggregation builder: owner × property pivots and period discovery.
//!
//! Every view is computed from the rent records as they are stored at call
//! time. Amounts are net payouts, so views reflect the last fee
//! recalculation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{RentshareError, Result};
use crate::money::Money;
use crate::period::{validate_year, Period};
use crate::storage::{
    MatrixFilter, OwnerPeriodTotal, OwnerSummaryFilter, Property, PropertyTotal, RecordStore,
};

/// Upper bound for [`AggregationBuilder::monthly_totals`].
pub const MAX_MONTHLY_LIMIT: usize = 120;

/// How much history one matrix cell sums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMode {
    /// One (year, month); missing parts resolve to the latest period
    #[default]
    SinglePeriod,

    /// All months of one year
    FullYear,

    /// Every record
    AllTime,
}

impl fmt::Display for AggregationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SinglePeriod => "single_period",
            Self::FullYear => "full_year",
            Self::AllTime => "all_time",
        };
        f.write_str(name)
    }
}

impl FromStr for AggregationMode {
    type Err = RentshareError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "single_period" | "month" => Ok(Self::SinglePeriod),
            "full_year" | "year" => Ok(Self::FullYear),
            "all_time" | "all" => Ok(Self::AllTime),
            other => Err(RentshareError::InvalidArgument(format!(
                "Unknown aggregation mode '{}' (expected single_period, full_year or all_time)",
                other
            ))),
        }
    }
}

/// Net total of one period, labelled for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyTotal {
    pub period: Period,
    pub label: String,
    pub total: Money,
    pub record_count: usize,
}

/// Per-property totals for one resolved period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyTotals {
    /// `None` when there are no rent records at all
    pub period: Option<Period>,
    pub properties: Vec<PropertyTotal>,
}

/// Parameters of an owner × property matrix.
#[derive(Debug, Clone, Default)]
pub struct MatrixRequest {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub owner_id: Option<Uuid>,
    pub mode: AggregationMode,
}

impl MatrixRequest {
    pub fn new(mode: AggregationMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn month(mut self, month: u32) -> Self {
        self.month = Some(month);
        self
    }

    pub fn owner(mut self, owner_id: Uuid) -> Self {
        self.owner_id = Some(owner_id);
        self
    }
}

/// The window a matrix was built over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixPeriod {
    pub mode: AggregationMode,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixOwner {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixProperty {
    pub id: Uuid,
    pub name: String,
}

/// One owner's row; `values` follows the matrix's property order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixRow {
    pub owner_id: Uuid,
    pub owner_name: String,
    pub values: Vec<Money>,
    pub total: Money,
}

/// Dense owner × property matrix of summed net amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerPropertyMatrix {
    pub period: MatrixPeriod,
    pub owners: Vec<MatrixOwner>,
    pub properties: Vec<MatrixProperty>,
    pub matrix: Vec<MatrixRow>,
    pub grand_total: Money,
}

impl OwnerPropertyMatrix {
    fn empty(period: MatrixPeriod) -> Self {
        Self {
            period,
            owners: Vec::new(),
            properties: Vec::new(),
            matrix: Vec::new(),
            grand_total: Money::zero(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }

    /// Summed amount for one (owner, property) pair; zero when absent.
    pub fn cell(&self, owner_id: &Uuid, property_id: &Uuid) -> Money {
        let column = self.properties.iter().position(|p| p.id == *property_id);
        let row = self.matrix.iter().find(|r| r.owner_id == *owner_id);
        match (row, column) {
            (Some(row), Some(column)) => row.values[column],
            _ => Money::zero(),
        }
    }

    /// Column totals in property order.
    pub fn property_totals(&self) -> Vec<Money> {
        (0..self.properties.len())
            .map(|column| self.matrix.iter().map(|row| row.values[column]).sum())
            .collect()
    }
}

/// Summary of every rent record of one property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertySummary {
    pub property: Property,
    pub record_count: usize,
    pub gross_total: Money,
    pub average_gross: Option<Money>,
    pub fee_share_total: Money,
    pub net_total: Money,
}

/// Builds reporting views over rent records.
pub struct AggregationBuilder<'a, S: RecordStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: RecordStore + ?Sized> AggregationBuilder<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Years with rent records, newest first.
    pub fn available_years(&self) -> Result<Vec<i32>> {
        self.store.distinct_years()
    }

    /// Most recent (year, month) with rent records.
    pub fn latest_period(&self) -> Result<Option<Period>> {
        self.store.latest_period()
    }

    /// Net totals of the `limit` most recent periods, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RentshareError::InvalidArgument` if `limit` is zero or above
    /// [`MAX_MONTHLY_LIMIT`].
    pub fn monthly_totals(&self, limit: usize) -> Result<Vec<MonthlyTotal>> {
        if limit == 0 || limit > MAX_MONTHLY_LIMIT {
            return Err(RentshareError::InvalidArgument(format!(
                "Limit must be between 1 and {}, got {}",
                MAX_MONTHLY_LIMIT, limit
            )));
        }

        let mut totals = self.store.period_totals(limit)?;
        totals.reverse();
        Ok(totals
            .into_iter()
            .map(|t| MonthlyTotal {
                label: t.period.label(),
                period: t.period,
                total: t.total,
                record_count: t.record_count,
            })
            .collect())
    }

    /// Net totals per property for one period, largest first.
    ///
    /// A missing year or month is taken from the latest period.
    pub fn totals_by_property(
        &self,
        year: Option<i32>,
        month: Option<u32>,
    ) -> Result<PropertyTotals> {
        let period = self.resolve_period(year, month)?;
        let properties = match period {
            Some(ref period) => self.store.property_totals(period)?,
            None => Vec::new(),
        };
        Ok(PropertyTotals { period, properties })
    }

    /// Complete a partial (year, month) from the latest period.
    ///
    /// `None` only when something is missing and there are no records.
    fn resolve_period(&self, year: Option<i32>, month: Option<u32>) -> Result<Option<Period>> {
        if let (Some(year), Some(month)) = (year, month) {
            return Period::new(year, month).map(Some);
        }
        match self.store.latest_period()? {
            Some(latest) => Period::new(
                year.unwrap_or(latest.year),
                month.unwrap_or(latest.month),
            )
            .map(Some),
            None => Ok(None),
        }
    }

    /// Owner × property matrix of net amounts under an aggregation mode.
    ///
    /// An empty window yields an empty matrix, never an error.
    ///
    /// # Errors
    ///
    /// Returns `RentshareError::InvalidArgument` for `FullYear` without a
    /// year, or for an out-of-range year or month.
    pub fn owner_property_matrix(&self, request: &MatrixRequest) -> Result<OwnerPropertyMatrix> {
        let (filter, period) = match request.mode {
            AggregationMode::SinglePeriod => {
                let Some(resolved) = self.resolve_period(request.year, request.month)? else {
                    return Ok(OwnerPropertyMatrix::empty(MatrixPeriod {
                        mode: request.mode,
                        year: None,
                        month: None,
                        description: "No rent records".to_string(),
                    }));
                };
                (
                    MatrixFilter {
                        year: Some(resolved.year),
                        month: Some(resolved.month),
                        owner_id: request.owner_id,
                    },
                    MatrixPeriod {
                        mode: request.mode,
                        year: Some(resolved.year),
                        month: Some(resolved.month),
                        description: resolved.label(),
                    },
                )
            }
            AggregationMode::FullYear => {
                let year = request.year.ok_or_else(|| {
                    RentshareError::InvalidArgument(
                        "Full-year aggregation requires a year".to_string(),
                    )
                })?;
                validate_year(year)?;
                (
                    MatrixFilter {
                        year: Some(year),
                        month: None,
                        owner_id: request.owner_id,
                    },
                    MatrixPeriod {
                        mode: request.mode,
                        year: Some(year),
                        month: None,
                        description: format!("Year {}", year),
                    },
                )
            }
            AggregationMode::AllTime => (
                MatrixFilter {
                    year: None,
                    month: None,
                    owner_id: request.owner_id,
                },
                MatrixPeriod {
                    mode: request.mode,
                    year: None,
                    month: None,
                    description: "All periods".to_string(),
                },
            ),
        };

        let sums = self.store.owner_property_sums(&filter)?;
        if sums.is_empty() {
            return Ok(OwnerPropertyMatrix::empty(period));
        }

        let mut owners: Vec<MatrixOwner> = Vec::new();
        let mut properties: Vec<MatrixProperty> = Vec::new();
        for sum in &sums {
            if !owners.iter().any(|o| o.id == sum.owner_id) {
                owners.push(MatrixOwner {
                    id: sum.owner_id,
                    name: sum.owner_name.clone(),
                });
            }
            if !properties.iter().any(|p| p.id == sum.property_id) {
                properties.push(MatrixProperty {
                    id: sum.property_id,
                    name: sum.property_name.clone(),
                });
            }
        }
        owners.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        properties.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        let matrix: Vec<MatrixRow> = owners
            .iter()
            .map(|owner| {
                let values: Vec<Money> = properties
                    .iter()
                    .map(|property| {
                        sums.iter()
                            .filter(|s| s.owner_id == owner.id && s.property_id == property.id)
                            .map(|s| s.total)
                            .sum()
                    })
                    .collect();
                let total = values.iter().copied().sum();
                MatrixRow {
                    owner_id: owner.id,
                    owner_name: owner.name.clone(),
                    values,
                    total,
                }
            })
            .collect();
        let grand_total = matrix.iter().map(|row| row.total).sum();

        Ok(OwnerPropertyMatrix {
            period,
            owners,
            properties,
            matrix,
            grand_total,
        })
    }

    /// Per-owner net totals per period, newest period first.
    pub fn owner_monthly_summary(
        &self,
        filter: &OwnerSummaryFilter,
    ) -> Result<Vec<OwnerPeriodTotal>> {
        if let Some(year) = filter.year {
            validate_year(year)?;
        }
        if let Some(month) = filter.month {
            if !(1..=12).contains(&month) {
                return Err(RentshareError::InvalidArgument(format!(
                    "Month {} is outside 1..=12",
                    month
                )));
            }
        }
        self.store.owner_period_totals(filter)
    }

    /// Record count and money totals over every rent record of a property.
    ///
    /// # Errors
    ///
    /// Returns `RentshareError::NotFound` if the property does not exist.
    pub fn property_summary(&self, property_id: &Uuid) -> Result<PropertySummary> {
        let property = self
            .store
            .get_property(property_id)?
            .ok_or_else(|| RentshareError::NotFound(format!("Property {}", property_id)))?;
        let stats = self.store.property_rent_stats(property_id)?;

        Ok(PropertySummary {
            property,
            record_count: stats.record_count,
            average_gross: stats.gross_total.divided_by(stats.record_count),
            gross_total: stats.gross_total,
            fee_share_total: stats.fee_share_total,
            net_total: stats.net_total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStore;

    #[test]
    fn test_mode_parse_and_display() {
        assert_eq!(
            "full-year".parse::<AggregationMode>().unwrap(),
            AggregationMode::FullYear
        );
        assert_eq!(
            "all".parse::<AggregationMode>().unwrap(),
            AggregationMode::AllTime
        );
        assert_eq!(AggregationMode::SinglePeriod.to_string(), "single_period");
        assert!("weekly".parse::<AggregationMode>().is_err());
    }

    #[test]
    fn test_monthly_limit_bounds() {
        let store = SqliteStore::open_in_memory().unwrap();
        let builder = AggregationBuilder::new(&store);
        assert!(builder.monthly_totals(0).is_err());
        assert!(builder.monthly_totals(MAX_MONTHLY_LIMIT + 1).is_err());
        assert!(builder.monthly_totals(12).unwrap().is_empty());
    }

    #[test]
    fn test_full_year_requires_year() {
        let store = SqliteStore::open_in_memory().unwrap();
        let builder = AggregationBuilder::new(&store);
        let err = builder
            .owner_property_matrix(&MatrixRequest::new(AggregationMode::FullYear))
            .unwrap_err();
        assert!(matches!(err, RentshareError::InvalidArgument(_)));
    }

    #[test]
    fn test_empty_store_views() {
        let store = SqliteStore::open_in_memory().unwrap();
        let builder = AggregationBuilder::new(&store);

        assert_eq!(builder.latest_period().unwrap(), None);
        assert!(builder.available_years().unwrap().is_empty());
        let totals = builder.totals_by_property(None, None).unwrap();
        assert_eq!(totals.period, None);
        assert!(totals.properties.is_empty());

        let matrix = builder
            .owner_property_matrix(&MatrixRequest::default())
            .unwrap();
        assert!(matrix.is_empty());
        assert!(matrix.owners.is_empty());
        assert!(matrix.properties.is_empty());
        assert_eq!(matrix.grand_total, Money::zero());
    }

    #[test]
    fn test_property_summary_requires_property() {
        let store = SqliteStore::open_in_memory().unwrap();
        let builder = AggregationBuilder::new(&store);
        assert!(matches!(
            builder.property_summary(&Uuid::new_v4()),
            Err(RentshareError::NotFound(_))
        ));
    }
}
