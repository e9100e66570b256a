//! Validation module for JSON:API request documents
//!
//! This module walks a decoded request document and checks it against the
//! JSON:API structural grammar and the endpoint's expectations. It supports
//! three kinds of request:
//!
//! - **Create**: `{"data": {resource}}` where the `id` is optional or forbidden
//! - **Update**: `{"data": {resource}}` where the `id` must match the URL
//! - **Relationship**: `{"data": null | identifier | [identifiers]}`
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

pub mod base;
pub mod context;
pub mod document;
pub mod error;
pub mod identifier;
pub mod pointer;
pub mod relationship;
pub mod store;

// Re-export commonly used types
pub use base::{DocumentValidator, OptionalMember, ValidationHelpers};
pub use context::{
    Acceptance, AcceptRelated, Cardinality, IdPolicy, RelationshipRule, RelationshipRules,
    ValidationContext,
};
pub use document::{RelationshipDocumentValidator, ResourceValidator};
pub use error::{
    ConfigurationError, ErrorClass, ErrorKind, ValidationError, ValidationErrors, ValidationResult,
};
pub use identifier::IdentifierValidator;
pub use pointer::Pointer;
pub use relationship::{RelationshipTarget, RelationshipValidator};
pub use store::{MemoryStore, ResourceIdentifier, ResourceStore};

use serde_json::Value;

/// Validate a create or update document in one call
///
/// # Examples
///
/// ```rust
/// use jsonapi_spec::validation::{validate_resource, MemoryStore, ValidationContext};
/// use serde_json::json;
///
/// let store = MemoryStore::new().with_type("posts");
/// let context = ValidationContext::for_create("posts", &store).unwrap();
/// let document = json!({"data": {"type": "posts", "attributes": {"title": "Hello"}}});
///
/// assert!(validate_resource(&document, context).is_ok());
/// ```
pub fn validate_resource(document: &Value, context: ValidationContext<'_>) -> ValidationResult<()> {
    ResourceValidator::new(document, context).validate()
}

/// Validate a relationship document in one call
///
/// # Examples
///
/// ```rust
/// use jsonapi_spec::validation::{validate_relationship, MemoryStore};
/// use serde_json::json;
///
/// let store = MemoryStore::new().with_resource("tags", "1");
/// let document = json!({"data": [{"type": "tags", "id": "1"}]});
///
/// assert!(validate_relationship(&document, &store).is_ok());
/// ```
pub fn validate_relationship(document: &Value, store: &dyn ResourceStore) -> ValidationResult<()> {
    RelationshipDocumentValidator::new(document, store).validate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_resource_collects_errors() {
        let store = MemoryStore::new().with_type("posts");
        let context = ValidationContext::for_update("posts", "1", &store).unwrap();
        let document = json!({"data": {"attributes": []}});

        let errors = validate_resource(&document, context).unwrap_err();
        let members: Vec<_> = errors.iter().map(|e| e.member.as_str()).collect();
        assert_eq!(members, vec!["type", "id", "attributes"]);
    }

    #[test]
    fn test_validate_relationship_null() {
        let store = MemoryStore::new();
        assert!(validate_relationship(&json!({"data": null}), &store).is_ok());
    }
}
