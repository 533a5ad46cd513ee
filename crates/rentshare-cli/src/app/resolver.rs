//! Path resolution and name lookups.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use rentshare_core::storage::{Owner, Property};
use rentshare_core::{RecordStore, RentshareError};

use crate::config::default_config_path;

/// Resolve the config file path, checking RENTSHARE_CONFIG env var first.
pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("RENTSHARE_CONFIG") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    default_config_path()
}

/// Error message when the database file is missing.
pub fn missing_db_message(path: &Path) -> String {
    format!("No rentshare database found at {}", path.display())
}

/// Parse a full UUID argument.
pub fn parse_id(value: &str, what: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(value.trim()).map_err(|_| {
        RentshareError::InvalidArgument(format!("Invalid {} ID: '{}'", what, value)).into()
    })
}

/// Find a property by ID or exact name.
pub fn resolve_property<S: RecordStore + ?Sized>(
    store: &S,
    input: &str,
) -> anyhow::Result<Property> {
    let found = match Uuid::parse_str(input.trim()) {
        Ok(id) => store.get_property(&id)?,
        Err(_) => store.find_property_by_name(input.trim())?,
    };
    found.ok_or_else(|| RentshareError::NotFound(format!("Property '{}'", input)).into())
}

/// Find an owner by ID, first name or full name.
///
/// A name shared by several owners is rejected; the caller must pass an ID.
pub fn resolve_owner<S: RecordStore + ?Sized>(store: &S, input: &str) -> anyhow::Result<Owner> {
    if let Ok(id) = Uuid::parse_str(input.trim()) {
        return store
            .get_owner(&id)?
            .ok_or_else(|| RentshareError::NotFound(format!("Owner '{}'", input)).into());
    }

    let mut matches = store.find_owner_by_name(input.trim())?;
    match matches.len() {
        0 => Err(RentshareError::NotFound(format!("Owner '{}'", input)).into()),
        1 => Ok(matches.remove(0)),
        n => {
            let ids: Vec<String> = matches.iter().map(|o| o.id.to_string()).collect();
            Err(RentshareError::InvalidArgument(format!(
                "Owner name '{}' matches {} owners; use an ID ({})",
                input,
                n,
                ids.join(", ")
            ))
            .into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rentshare_core::storage::NewOwner;
    use rentshare_core::SqliteStore;

    #[test]
    fn test_resolve_property_by_name_and_id() {
        let store = SqliteStore::open_in_memory().unwrap();
        let loja = store.insert_property("Loja 1").unwrap();

        assert_eq!(resolve_property(&store, "Loja 1").unwrap().id, loja.id);
        assert_eq!(
            resolve_property(&store, &loja.id.to_string()).unwrap().id,
            loja.id
        );
        let err = resolve_property(&store, "Casa").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RentshareError>(),
            Some(RentshareError::NotFound(_))
        ));
    }

    #[test]
    fn test_ambiguous_owner_name_is_rejected() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .insert_owner(&NewOwner::new("Ana").with_last_name("Souza"))
            .unwrap();
        store
            .insert_owner(&NewOwner::new("Ana").with_last_name("Lima"))
            .unwrap();

        let err = resolve_owner(&store, "Ana").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RentshareError>(),
            Some(RentshareError::InvalidArgument(_))
        ));
        assert_eq!(
            resolve_owner(&store, "Ana Lima").unwrap().last_name.as_deref(),
            Some("Lima")
        );
    }

    #[test]
    fn test_parse_id_rejects_garbage() {
        assert!(parse_id("not-a-uuid", "record").is_err());
    }
}
