//! # Rentshare Core
//!
//! Core library for rentshare: ownership versioning and administration-fee
//! allocation for jointly owned rental properties.
//!
//! This crate holds the domain logic, the storage abstraction and the data
//! models, independent of the CLI.
//!
//! ## Architecture
//!
//! - **storage**: `RecordStore` trait and its SQLite implementation
//! - **ledger**: versioned ownership percentages
//! - **allocation**: fee share and net amount recalculation
//! - **aggregation**: owner × property matrices and period discovery
//! - **money**, **percentage**, **period**, **clock**: value types

pub mod aggregation;
pub mod allocation;
pub mod clock;
pub mod error;
pub mod ledger;
pub mod money;
pub mod percentage;
pub mod period;
pub mod storage;

pub use aggregation::{
    AggregationBuilder, AggregationMode, MatrixRequest, MonthlyTotal, OwnerPropertyMatrix,
    PropertySummary, PropertyTotals,
};
pub use allocation::{
    allocate, Allocation, AllocationError, FeeAllocator, OwnershipBinding, RecalculationReport,
};
pub use clock::{Clock, ManualClock, SystemClock, VersionStamp};
pub use error::{RentshareError, Result};
pub use ledger::{OwnershipLedger, OwnershipVersion, PropertyBalance, MAX_VERSION_ATTEMPTS};
pub use money::Money;
pub use percentage::Percentage;
pub use period::Period;
pub use storage::{RecordStore, SqliteStore};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
