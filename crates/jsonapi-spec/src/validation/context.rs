//! Per-request validation settings
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::validation::error::ConfigurationError;
use crate::validation::store::{ResourceIdentifier, ResourceStore};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// How the `id` member of a resource document is treated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdPolicy {
    /// Create request for a type that does not accept client-generated ids
    Forbidden,
    /// Create request; a client-generated id is accepted if it is not taken
    Optional,
    /// Update request; the id must match the resource addressed by the URL
    Required(String),
}

/// Whether a relationship holds one resource or many
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cardinality {
    ToOne,
    ToMany,
}

impl Cardinality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToOne => "to-one",
            Self::ToMany => "to-many",
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Constraints the caller knows about one relationship
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationshipRule {
    types: Vec<String>,
    cardinality: Option<Cardinality>,
}

impl RelationshipRule {
    /// A relationship whose targets may be of any recognised type
    pub fn any() -> Self {
        Self::default()
    }

    /// A relationship restricted to the given target types; several types
    /// make it polymorphic.
    pub fn of_types<I, S>(field: &str, types: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let types: Vec<String> = types.into_iter().map(Into::into).collect();
        if types.is_empty() {
            return Err(ConfigurationError::NoRelationshipTypes {
                field: field.to_string(),
            });
        }
        if types.iter().any(String::is_empty) {
            return Err(ConfigurationError::EmptyRelationshipType {
                field: field.to_string(),
            });
        }
        Ok(Self {
            types,
            cardinality: None,
        })
    }

    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = Some(cardinality);
        self
    }

    pub fn to_one(self) -> Self {
        self.with_cardinality(Cardinality::ToOne)
    }

    pub fn to_many(self) -> Self {
        self.with_cardinality(Cardinality::ToMany)
    }

    pub fn types(&self) -> &[String] {
        &self.types
    }

    pub fn cardinality(&self) -> Option<Cardinality> {
        self.cardinality
    }

    /// Whether a target of this type may be linked
    pub fn allows(&self, resource_type: &str) -> bool {
        self.types.is_empty() || self.types.iter().any(|t| t == resource_type)
    }
}

/// Relationship rules keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationshipRules {
    rules: HashMap<String, RelationshipRule>,
}

impl RelationshipRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<F: Into<String>>(mut self, field: F, rule: RelationshipRule) -> Self {
        self.rules.insert(field.into(), rule);
        self
    }

    pub fn insert<F: Into<String>>(&mut self, field: F, rule: RelationshipRule) {
        self.rules.insert(field.into(), rule);
    }

    pub fn get(&self, field: &str) -> Option<&RelationshipRule> {
        self.rules.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Outcome of a caller-supplied acceptance rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acceptance {
    Accepted,
    Rejected,
    /// Rejected, with a message for the client
    RejectedBecause(String),
}

impl From<bool> for Acceptance {
    fn from(accepted: bool) -> Self {
        if accepted {
            Self::Accepted
        } else {
            Self::Rejected
        }
    }
}

/// Domain-specific rule deciding whether an existing resource may be linked
///
/// Runs once per related identifier, after the identifier is known to
/// exist. `record` is the resource object being created or updated, or
/// the record supplied to a relationship document validator.
pub trait AcceptRelated {
    fn accept(
        &self,
        field: Option<&str>,
        identifier: &ResourceIdentifier,
        record: Option<&Value>,
    ) -> Acceptance;
}

impl<F> AcceptRelated for F
where
    F: Fn(Option<&str>, &ResourceIdentifier, Option<&Value>) -> Acceptance,
{
    fn accept(
        &self,
        field: Option<&str>,
        identifier: &ResourceIdentifier,
        record: Option<&Value>,
    ) -> Acceptance {
        self(field, identifier, record)
    }
}

/// Everything a resource document validator needs to know about the endpoint
pub struct ValidationContext<'a> {
    expected_type: String,
    id_policy: IdPolicy,
    store: &'a dyn ResourceStore,
    relationships: RelationshipRules,
    acceptance: Option<&'a dyn AcceptRelated>,
}

impl<'a> ValidationContext<'a> {
    /// Create a context; fails if the endpoint settings are unusable
    pub fn new<T: Into<String>>(
        expected_type: T,
        id_policy: IdPolicy,
        store: &'a dyn ResourceStore,
    ) -> Result<Self, ConfigurationError> {
        let expected_type = expected_type.into();
        if expected_type.is_empty() {
            return Err(ConfigurationError::EmptyExpectedType);
        }
        if matches!(&id_policy, IdPolicy::Required(id) if id.is_empty()) {
            return Err(ConfigurationError::EmptyExpectedId);
        }

        Ok(Self {
            expected_type,
            id_policy,
            store,
            relationships: RelationshipRules::new(),
            acceptance: None,
        })
    }

    /// Create request accepting client-generated ids
    pub fn for_create<T: Into<String>>(
        expected_type: T,
        store: &'a dyn ResourceStore,
    ) -> Result<Self, ConfigurationError> {
        Self::new(expected_type, IdPolicy::Optional, store)
    }

    /// Create request rejecting client-generated ids
    pub fn for_create_without_client_ids<T: Into<String>>(
        expected_type: T,
        store: &'a dyn ResourceStore,
    ) -> Result<Self, ConfigurationError> {
        Self::new(expected_type, IdPolicy::Forbidden, store)
    }

    /// Update request for the resource `expected_type:expected_id`
    pub fn for_update<T: Into<String>, I: Into<String>>(
        expected_type: T,
        expected_id: I,
        store: &'a dyn ResourceStore,
    ) -> Result<Self, ConfigurationError> {
        Self::new(expected_type, IdPolicy::Required(expected_id.into()), store)
    }

    pub fn with_relationships(mut self, relationships: RelationshipRules) -> Self {
        self.relationships = relationships;
        self
    }

    pub fn with_acceptance(mut self, acceptance: &'a dyn AcceptRelated) -> Self {
        self.acceptance = Some(acceptance);
        self
    }

    pub fn expected_type(&self) -> &str {
        &self.expected_type
    }

    pub fn id_policy(&self) -> &IdPolicy {
        &self.id_policy
    }

    pub fn store(&self) -> &'a dyn ResourceStore {
        self.store
    }

    pub fn relationships(&self) -> &RelationshipRules {
        &self.relationships
    }

    pub fn acceptance(&self) -> Option<&'a dyn AcceptRelated> {
        self.acceptance
    }
}

impl fmt::Debug for ValidationContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationContext")
            .field("expected_type", &self.expected_type)
            .field("id_policy", &self.id_policy)
            .field("relationships", &self.relationships)
            .field("acceptance", &self.acceptance.is_some())
            .finish()
    }
}
