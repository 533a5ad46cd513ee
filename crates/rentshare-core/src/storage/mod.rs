//! Storage layer: the record store trait, its SQLite implementation and the
//! types that cross it.

pub mod sqlite;
pub mod traits;
pub mod types;

pub use sqlite::SqliteStore;
pub use traits::RecordStore;
pub use types::*;
