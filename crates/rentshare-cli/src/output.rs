//! Output helpers shared by command handlers.

pub mod json;

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use rentshare_core::RecordStore;

/// Print a value as pretty JSON on stdout.
pub fn emit_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Display names of every property and owner, for labelling ID-only rows.
pub struct NameBook {
    properties: HashMap<Uuid, String>,
    owners: HashMap<Uuid, String>,
}

impl NameBook {
    pub fn load<S: RecordStore + ?Sized>(store: &S) -> anyhow::Result<Self> {
        let properties = store
            .list_properties(true)?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect();
        let owners = store
            .list_owners()?
            .into_iter()
            .map(|o| (o.id, o.display_name()))
            .collect();
        Ok(Self { properties, owners })
    }

    pub fn property(&self, id: &Uuid) -> &str {
        self.properties.get(id).map(String::as_str).unwrap_or("unknown")
    }

    pub fn owner(&self, id: &Uuid) -> &str {
        self.owners.get(id).map(String::as_str).unwrap_or("unknown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rentshare_core::storage::NewOwner;
    use rentshare_core::SqliteStore;

    #[test]
    fn test_name_book() {
        let store = SqliteStore::open_in_memory().unwrap();
        let loja = store.insert_property("Loja 1").unwrap();
        store.set_property_active(&loja.id, false).unwrap();
        let ana = store
            .insert_owner(&NewOwner::new("Ana").with_last_name("Souza"))
            .unwrap();

        let names = NameBook::load(&store).unwrap();
        assert_eq!(names.property(&loja.id), "Loja 1");
        assert_eq!(names.owner(&ana.id), "Ana Souza");
        assert_eq!(names.owner(&Uuid::new_v4()), "unknown");
    }
}
