//! Resource identifiers and the store the validators ask about them
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// The `{type, id}` pair that identifies a resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
}

impl ResourceIdentifier {
    pub fn new<T: Into<String>, I: Into<String>>(resource_type: T, id: I) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource_type, self.id)
    }
}

/// Answers existence questions on behalf of the application's storage
///
/// Validators never touch storage themselves; every lookup goes through
/// this trait.
pub trait ResourceStore {
    /// Whether the application knows this resource type at all
    fn is_type(&self, resource_type: &str) -> bool;

    /// Whether the identified resource exists
    fn exists(&self, identifier: &ResourceIdentifier) -> bool;

    /// Existence of several resources, in the order given
    ///
    /// Implementations backed by a database should override this with a
    /// single query.
    fn exists_many(&self, identifiers: &[ResourceIdentifier]) -> Vec<bool> {
        identifiers.iter().map(|identifier| self.exists(identifier)).collect()
    }
}

impl<S: ResourceStore + ?Sized> ResourceStore for &S {
    fn is_type(&self, resource_type: &str) -> bool {
        (**self).is_type(resource_type)
    }

    fn exists(&self, identifier: &ResourceIdentifier) -> bool {
        (**self).exists(identifier)
    }

    fn exists_many(&self, identifiers: &[ResourceIdentifier]) -> Vec<bool> {
        (**self).exists_many(identifiers)
    }
}

/// In-memory store, keyed by resource type
///
/// Deserializes from a fixture of the form `{"posts": ["1", "2"], "tags": []}`;
/// a type listed with no ids is recognised but holds no resources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryStore {
    resources: BTreeMap<String, BTreeSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource type
    pub fn with_type<T: Into<String>>(mut self, resource_type: T) -> Self {
        self.resources.entry(resource_type.into()).or_default();
        self
    }

    /// Register a resource, and its type if not already known
    pub fn with_resource<T: Into<String>, I: Into<String>>(mut self, resource_type: T, id: I) -> Self {
        self.insert(ResourceIdentifier::new(resource_type, id));
        self
    }

    pub fn insert(&mut self, identifier: ResourceIdentifier) {
        self.resources
            .entry(identifier.resource_type)
            .or_default()
            .insert(identifier.id);
    }

    /// Merge another store into this one
    pub fn merge(&mut self, other: MemoryStore) {
        for (resource_type, ids) in other.resources {
            self.resources.entry(resource_type).or_default().extend(ids);
        }
    }

    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    /// Total number of resources across all types
    pub fn len(&self) -> usize {
        self.resources.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResourceStore for MemoryStore {
    fn is_type(&self, resource_type: &str) -> bool {
        self.resources.contains_key(resource_type)
    }

    fn exists(&self, identifier: &ResourceIdentifier) -> bool {
        self.resources
            .get(&identifier.resource_type)
            .map_or(false, |ids| ids.contains(&identifier.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_store_lookups() {
        let store = MemoryStore::new()
            .with_type("tags")
            .with_resource("posts", "1");

        assert!(store.is_type("posts"));
        assert!(store.is_type("tags"));
        assert!(!store.is_type("post"));
        assert!(store.exists(&ResourceIdentifier::new("posts", "1")));
        assert!(!store.exists(&ResourceIdentifier::new("posts", "2")));
        assert!(!store.exists(&ResourceIdentifier::new("tags", "1")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_exists_many_preserves_order() {
        let store = MemoryStore::new().with_resource("tags", "a").with_resource("tags", "c");
        let ids = vec![
            ResourceIdentifier::new("tags", "a"),
            ResourceIdentifier::new("tags", "b"),
            ResourceIdentifier::new("tags", "c"),
        ];
        assert_eq!(store.exists_many(&ids), vec![true, false, true]);
    }

    #[test]
    fn test_fixture_deserialization() {
        let store: MemoryStore = serde_json::from_value(json!({
            "posts": ["1", "2"],
            "comments": []
        }))
        .unwrap();

        assert!(store.is_type("comments"));
        assert!(store.exists(&ResourceIdentifier::new("posts", "2")));
        assert_eq!(store.types().collect::<Vec<_>>(), vec!["comments", "posts"]);
    }

    #[test]
    fn test_merge() {
        let mut store = MemoryStore::new().with_resource("posts", "1");
        store.merge(MemoryStore::new().with_resource("posts", "2").with_type("users"));
        assert_eq!(store.len(), 2);
        assert!(store.is_type("users"));
    }

    #[test]
    fn test_identifier_serializes_type_member() {
        let identifier = ResourceIdentifier::new("posts", "1");
        assert_eq!(serde_json::to_value(&identifier).unwrap(), json!({"type": "posts", "id": "1"}));
        assert_eq!(identifier.to_string(), "posts:1");
    }
}
