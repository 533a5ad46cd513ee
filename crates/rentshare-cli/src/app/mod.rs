//! Application-level utilities for the rentshare CLI.
//!
//! This module provides:
//! - Path resolution for the config file and the database
//! - The per-invocation context handed to command handlers
//! - Lookup of properties and owners by name or ID

mod context;
mod resolver;

pub use context::AppContext;
pub use resolver::{
    missing_db_message, parse_id, resolve_config_path, resolve_owner, resolve_property,
};
