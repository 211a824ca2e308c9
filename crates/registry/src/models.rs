use std::path::Path;

use indexmap::IndexMap;
use paddock_types::{Horse, Owner, ParentRole};
use serde::Deserialize;
use tracing::info;

use crate::error::RegistryError;

/// Default number of suggestions returned by a lookup.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

const EMBEDDED_STABLE: &str = include_str!("../data/stable.json");

#[derive(Debug, Deserialize)]
struct StableDocument {
    #[serde(default)]
    owners: Vec<Owner>,
    #[serde(default)]
    horses: Vec<Horse>,
}

/// Owners and horses of one stable, indexed by id in file order.
#[derive(Debug, Clone, Default)]
pub struct StableRegistry {
    owners: IndexMap<i64, Owner>,
    horses: IndexMap<i64, Horse>,
}

impl StableRegistry {
    /// Load the sample stable compiled into the binary.
    pub fn from_embedded_sample() -> Result<Self, RegistryError> {
        Self::from_json_str(EMBEDDED_STABLE)
    }

    /// Load a `{ "owners": [...], "horses": [...] }` document from disk.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let data = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let registry = Self::from_json_str(&data)?;
        info!(
            path = %path.display(),
            owners = registry.owners.len(),
            horses = registry.horses.len(),
            "loaded stable data"
        );
        Ok(registry)
    }

    /// Parse and validate a stable document.
    ///
    /// Ids must be unique per record kind, and every owner or parent a horse
    /// references must exist in the same document.
    pub fn from_json_str(data: &str) -> Result<Self, RegistryError> {
        let document: StableDocument = serde_json::from_str(data)?;

        let mut owners = IndexMap::with_capacity(document.owners.len());
        for owner in document.owners {
            let id = owner.id;
            if owners.insert(id, owner).is_some() {
                return Err(RegistryError::DuplicateId { kind: "owner", id });
            }
        }
        let mut horses = IndexMap::with_capacity(document.horses.len());
        for horse in document.horses {
            let id = horse.id;
            if horses.insert(id, horse).is_some() {
                return Err(RegistryError::DuplicateId { kind: "horse", id });
            }
        }

        let registry = Self { owners, horses };
        registry.check_references()?;
        Ok(registry)
    }

    fn check_references(&self) -> Result<(), RegistryError> {
        for horse in self.horses.values() {
            if let Some(id) = horse.owner_id
                && !self.owners.contains_key(&id)
            {
                return Err(RegistryError::DanglingReference { horse: horse.id, relation: "owner", id });
            }
            for (relation, parent) in [("mother", horse.mother_id), ("father", horse.father_id)] {
                if let Some(id) = parent
                    && !self.horses.contains_key(&id)
                {
                    return Err(RegistryError::DanglingReference { horse: horse.id, relation, id });
                }
            }
        }
        Ok(())
    }

    pub fn owners(&self) -> impl Iterator<Item = &Owner> {
        self.owners.values()
    }

    pub fn horses(&self) -> impl Iterator<Item = &Horse> {
        self.horses.values()
    }

    pub fn owner(&self, id: i64) -> Option<&Owner> {
        self.owners.get(&id)
    }

    pub fn horse(&self, id: i64) -> Option<&Horse> {
        self.horses.get(&id)
    }

    /// Owners whose `"first last"` contains `text`, ignoring case.
    ///
    /// Empty text yields nothing rather than every owner.
    pub fn search_by_name(&self, text: &str, limit: usize) -> Vec<Owner> {
        if text.is_empty() {
            return Vec::new();
        }
        let needle = text.to_lowercase();
        self.owners
            .values()
            .filter(|owner| owner.full_name().to_lowercase().contains(&needle))
            .take(limit)
            .cloned()
            .collect()
    }

    /// Horses eligible for `role` whose name starts with `text`.
    ///
    /// The prefix match is case-sensitive.
    pub fn parent_suggestions(&self, text: &str, role: ParentRole, limit: usize) -> Vec<Horse> {
        if text.is_empty() {
            return Vec::new();
        }
        let sex = role.required_sex();
        self.horses
            .values()
            .filter(|horse| horse.sex == sex && horse.name.starts_with(text))
            .take(limit)
            .cloned()
            .collect()
    }

    /// Distinct existing descriptions starting with `text`, in first-seen order.
    pub fn description_suggestions(&self, text: &str, limit: usize) -> Vec<String> {
        let mut seen: IndexMap<&str, ()> = IndexMap::new();
        for description in self.horses.values().filter_map(|horse| horse.description.as_deref()) {
            if seen.len() >= limit {
                break;
            }
            if description.starts_with(text) {
                seen.entry(description).or_default();
            }
        }
        seen.into_keys().map(str::to_owned).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paddock_types::Sex;

    fn sample() -> StableRegistry {
        StableRegistry::from_embedded_sample().expect("embedded sample")
    }

    #[test]
    fn embedded_sample_loads() {
        let registry = sample();
        assert!(registry.owners().count() > 0);
        assert!(registry.horses().count() > 0);
        assert_eq!(registry.owner(1).map(Owner::full_name).as_deref(), Some("Anna Berger"));
    }

    #[test]
    fn owner_search_is_case_insensitive_across_full_name() {
        let registry = sample();
        let names: Vec<String> = registry.search_by_name("a b", DEFAULT_SUGGESTION_LIMIT).iter().map(Owner::full_name).collect();
        assert_eq!(names, vec!["Anna Berger".to_string(), "Hanna Bergmann".to_string()]);

        let names: Vec<String> = registry.search_by_name("BERG", DEFAULT_SUGGESTION_LIMIT).iter().map(Owner::full_name).collect();
        assert_eq!(names, vec!["Anna Berger".to_string(), "Hanna Bergmann".to_string()]);
    }

    #[test]
    fn owner_search_respects_limit_and_empty_text() {
        let registry = sample();
        assert_eq!(registry.search_by_name("n", 2).len(), 2);
        assert!(registry.search_by_name("", 5).is_empty());
    }

    #[test]
    fn parent_suggestions_filter_by_sex_and_prefix() {
        let registry = sample();
        let mothers = registry.parent_suggestions("W", ParentRole::Mother, DEFAULT_SUGGESTION_LIMIT);
        assert_eq!(mothers.len(), 5);
        assert!(mothers.iter().all(|horse| horse.sex == Sex::Female && horse.name.starts_with('W')));

        let fathers: Vec<String> = registry
            .parent_suggestions("Wi", ParentRole::Father, DEFAULT_SUGGESTION_LIMIT)
            .into_iter()
            .map(|horse| horse.name)
            .collect();
        assert_eq!(fathers, vec!["Winston".to_string(), "Windsor".to_string()]);
    }

    #[test]
    fn parent_prefix_is_case_sensitive() {
        let registry = sample();
        assert!(registry.parent_suggestions("w", ParentRole::Mother, 5).is_empty());
        assert!(registry.parent_suggestions("", ParentRole::Father, 5).is_empty());
    }

    #[test]
    fn description_suggestions_are_distinct() {
        let registry = sample();
        assert_eq!(registry.description_suggestions("Calm", 5), vec!["Calm bay mare".to_string()]);
        assert_eq!(
            registry.description_suggestions("Grey", 5),
            vec!["Grey stallion, good jumper".to_string()]
        );
        assert_eq!(registry.description_suggestions("", 2).len(), 2);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let data = r#"{ "owners": [
            { "id": 1, "firstName": "A", "lastName": "B" },
            { "id": 1, "firstName": "C", "lastName": "D" }
        ] }"#;
        assert!(matches!(
            StableRegistry::from_json_str(data),
            Err(RegistryError::DuplicateId { kind: "owner", id: 1 })
        ));
    }

    #[test]
    fn dangling_parent_is_rejected() {
        let data = r#"{ "horses": [
            { "id": 1, "name": "Solo", "dateOfBirth": "2010-01-01", "sex": "MALE", "motherId": 9 }
        ] }"#;
        assert!(matches!(
            StableRegistry::from_json_str(data),
            Err(RegistryError::DanglingReference { horse: 1, relation: "mother", id: 9 })
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nope.json");
        assert!(matches!(StableRegistry::load(&missing), Err(RegistryError::Io { .. })));
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("stable.json");
        std::fs::write(&path, r#"{ "owners": [{ "id": 4, "firstName": "Ida", "lastName": "Roth" }] }"#).expect("write");
        let registry = StableRegistry::load(&path).expect("load");
        assert_eq!(registry.search_by_name("ida", 5).len(), 1);
        assert_eq!(registry.horses().count(), 0);
    }
}
