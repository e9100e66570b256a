//! Resource identifier validation
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::validation::base::ValidationHelpers;
use crate::validation::error::{ErrorKind, ValidationError, ValidationErrors};
use crate::validation::pointer::Pointer;
use crate::validation::store::{ResourceIdentifier, ResourceStore};
use serde_json::Value;
use tracing::trace;

/// Checks a single `{type, id}` object, independent of where it appears
///
/// Existence is not checked here: whether a well-formed identifier must
/// also resolve depends on the relationship that holds it.
#[derive(Clone, Copy)]
pub struct IdentifierValidator<'a> {
    store: &'a dyn ResourceStore,
}

impl<'a> IdentifierValidator<'a> {
    pub fn new(store: &'a dyn ResourceStore) -> Self {
        Self { store }
    }

    /// Validate the identifier found in member `member` of the object at `parent`
    ///
    /// Returns the identifier only when it is complete and its type is
    /// recognised. `type` and `id` are checked independently, so both are
    /// reported when both are wrong.
    pub fn validate(
        &self,
        value: &Value,
        parent: &Pointer,
        member: &str,
        errors: &mut ValidationErrors,
    ) -> Option<ResourceIdentifier> {
        let object = ValidationHelpers::object(value, parent, member, errors)?;
        let path = parent.child(member);

        let resource_type = ValidationHelpers::required_string(object, &path, "type", errors)
            .filter(|resource_type| self.recognised(resource_type, &path, errors));
        let id = ValidationHelpers::required_string(object, &path, "id", errors);

        Some(ResourceIdentifier::new(resource_type?, id?))
    }

    /// Validate the identifier at position `index` of the array at `parent`
    ///
    /// Every error for the element, including a non-object element, is
    /// addressed by the element's own pointer.
    pub fn validate_index(
        &self,
        value: &Value,
        parent: &Pointer,
        index: usize,
        errors: &mut ValidationErrors,
    ) -> Option<ResourceIdentifier> {
        let path = parent.child_index(index);
        ValidationHelpers::object(value, &path, &index.to_string(), errors)?;
        self.validate(value, parent, &index.to_string(), errors)
    }

    fn recognised(&self, resource_type: &str, path: &Pointer, errors: &mut ValidationErrors) -> bool {
        let known = self.store.is_type(resource_type);
        trace!(resource_type, known, "checked resource type");
        if !known {
            errors.add(
                ValidationError::new(path, "type", ErrorKind::ResourceTypeNotRecognised)
                    .actual(resource_type),
            );
        }
        known
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::store::MemoryStore;
    use serde_json::json;

    fn store() -> MemoryStore {
        MemoryStore::new().with_resource("posts", "1")
    }

    #[test]
    fn test_valid_identifier() {
        let store = store();
        let mut errors = ValidationErrors::new();
        let parent = Pointer::root().child("data").child("relationships").child("post");

        let identifier = IdentifierValidator::new(&store).validate(
            &json!({"type": "posts", "id": "99"}),
            &parent,
            "data",
            &mut errors,
        );

        assert_eq!(identifier, Some(ResourceIdentifier::new("posts", "99")));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_non_object_member_reported_at_parent() {
        let store = store();
        let mut errors = ValidationErrors::new();
        let parent = Pointer::root().child("data").child("relationships").child("author");

        let identifier = IdentifierValidator::new(&store).validate(&json!("1"), &parent, "data", &mut errors);

        assert!(identifier.is_none());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors[0].path, "/data/relationships/author");
        assert_eq!(errors.errors[0].member, "data");
    }

    #[test]
    fn test_non_object_element_reported_at_its_index() {
        let store = store();
        let mut errors = ValidationErrors::new();
        let parent = Pointer::root().child("data");

        let identifier = IdentifierValidator::new(&store).validate_index(&json!("1"), &parent, 3, &mut errors);

        assert!(identifier.is_none());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors[0].path, "/data/3");
        assert_eq!(errors.errors[0].member, "3");
        assert_eq!(errors.errors[0].kind, ErrorKind::MemberNotObject);
    }

    #[test]
    fn test_type_and_id_reported_independently() {
        let store = store();
        let mut errors = ValidationErrors::new();

        let identifier = IdentifierValidator::new(&store).validate(
            &json!({"type": "post", "id": ""}),
            &Pointer::root(),
            "data",
            &mut errors,
        );

        assert!(identifier.is_none());
        let found: Vec<_> = errors.iter().map(|e| (e.member.as_str(), e.kind)).collect();
        assert_eq!(
            found,
            vec![
                ("type", ErrorKind::ResourceTypeNotRecognised),
                ("id", ErrorKind::MemberEmptyNotAllowed),
            ]
        );
        assert!(errors.iter().all(|e| e.path == "/data"));
    }

    #[test]
    fn test_missing_members() {
        let store = store();
        let mut errors = ValidationErrors::new();

        IdentifierValidator::new(&store).validate(&json!({}), &Pointer::root(), "data", &mut errors);

        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.kind == ErrorKind::MemberRequired));
    }
}
