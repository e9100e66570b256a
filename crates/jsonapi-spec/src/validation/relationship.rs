//! Relationship validation for to-one and to-many relationships
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::validation::base::ValidationHelpers;
use crate::validation::context::{Acceptance, AcceptRelated, Cardinality, RelationshipRule};
use crate::validation::error::{ErrorKind, ValidationError, ValidationErrors};
use crate::validation::identifier::IdentifierValidator;
use crate::validation::pointer::Pointer;
use crate::validation::store::{ResourceIdentifier, ResourceStore};
use serde_json::{Map, Value};
use tracing::trace;

/// Validates a relationship object: `{"data": null | {...} | [...]}`
///
/// Cardinality is read from the shape of `data`. A rule supplied by the
/// caller can pin the cardinality and restrict the target types; each
/// well-formed identifier is then checked for existence and, last, offered
/// to the acceptance strategy.
pub struct RelationshipValidator<'a> {
    identifiers: IdentifierValidator<'a>,
    store: &'a dyn ResourceStore,
    acceptance: Option<&'a dyn AcceptRelated>,
}

/// Where a relationship sits and what the caller expects of it
#[derive(Debug, Clone, Copy, Default)]
pub struct RelationshipTarget<'r> {
    /// Field name; `None` when the relationship is a whole document
    pub field: Option<&'r str>,
    pub rule: Option<&'r RelationshipRule>,
    /// Resource the relationship belongs to, handed to the acceptance strategy
    pub record: Option<&'r Value>,
}

impl<'a> RelationshipValidator<'a> {
    pub fn new(store: &'a dyn ResourceStore) -> Self {
        Self {
            identifiers: IdentifierValidator::new(store),
            store,
            acceptance: None,
        }
    }

    pub fn with_acceptance(mut self, acceptance: Option<&'a dyn AcceptRelated>) -> Self {
        self.acceptance = acceptance;
        self
    }

    /// Validate the relationship object located at `path`
    pub fn validate(
        &self,
        relation: &Map<String, Value>,
        path: &Pointer,
        target: RelationshipTarget<'_>,
        errors: &mut ValidationErrors,
    ) -> bool {
        let Some(data) = relation.get("data") else {
            errors.add(ValidationError::new(path, "data", ErrorKind::MemberRequired));
            return false;
        };

        match data {
            Value::Null => self.shape(Cardinality::ToOne, target.rule, path, errors),
            Value::Object(_) => {
                self.shape(Cardinality::ToOne, target.rule, path, errors)
                    && self.to_one(data, path, target, errors)
            }
            Value::Array(items) => {
                self.shape(Cardinality::ToMany, target.rule, path, errors)
                    && self.to_many(items, path, target, errors)
            }
            other => {
                errors.add(
                    ValidationError::new(path, "data", ErrorKind::MemberNotObject)
                        .actual(ValidationHelpers::type_name(other)),
                );
                false
            }
        }
    }

    fn shape(
        &self,
        found: Cardinality,
        rule: Option<&RelationshipRule>,
        path: &Pointer,
        errors: &mut ValidationErrors,
    ) -> bool {
        match rule.and_then(RelationshipRule::cardinality) {
            Some(expected) if expected != found => {
                errors.add(
                    ValidationError::new(path, "data", ErrorKind::RelationshipShapeInvalid)
                        .expected(expected.as_str())
                        .actual(found.as_str()),
                );
                false
            }
            _ => true,
        }
    }

    fn to_one(
        &self,
        data: &Value,
        path: &Pointer,
        target: RelationshipTarget<'_>,
        errors: &mut ValidationErrors,
    ) -> bool {
        let Some(identifier) = self.identifiers.validate(data, path, "data", errors) else {
            return false;
        };
        let identifier_path = path.child("data");
        if !self.allowed(&identifier, target.rule, &identifier_path, errors) {
            return false;
        }

        let exists = self.store.exists(&identifier);
        trace!(%identifier, exists, "checked related resource");
        if !exists {
            errors.add(missing(&identifier_path, &identifier));
            return false;
        }

        self.accepted(&identifier, &identifier_path, target, errors)
    }

    fn to_many(
        &self,
        items: &[Value],
        path: &Pointer,
        target: RelationshipTarget<'_>,
        errors: &mut ValidationErrors,
    ) -> bool {
        let data_path = path.child("data");
        let mut valid = true;
        let mut candidates = Vec::with_capacity(items.len());

        for (index, item) in items.iter().enumerate() {
            let Some(identifier) = self.identifiers.validate_index(item, &data_path, index, errors) else {
                valid = false;
                continue;
            };
            let item_path = data_path.child_index(index);
            if self.allowed(&identifier, target.rule, &item_path, errors) {
                candidates.push((item_path, identifier));
            } else {
                valid = false;
            }
        }

        if candidates.is_empty() {
            return valid;
        }

        let identifiers: Vec<ResourceIdentifier> =
            candidates.iter().map(|(_, identifier)| identifier.clone()).collect();
        let found = self.store.exists_many(&identifiers);
        trace!(count = identifiers.len(), "checked related resources");

        for (position, (item_path, identifier)) in candidates.iter().enumerate() {
            if !found.get(position).copied().unwrap_or(false) {
                errors.add(missing(item_path, identifier));
                valid = false;
            } else if !self.accepted(identifier, item_path, target, errors) {
                valid = false;
            }
        }

        valid
    }

    fn allowed(
        &self,
        identifier: &ResourceIdentifier,
        rule: Option<&RelationshipRule>,
        path: &Pointer,
        errors: &mut ValidationErrors,
    ) -> bool {
        match rule {
            Some(rule) if !rule.allows(&identifier.resource_type) => {
                errors.add(
                    ValidationError::new(path, "type", ErrorKind::ResourceTypeNotSupported)
                        .expected(rule.types().to_vec())
                        .actual(identifier.resource_type.as_str()),
                );
                false
            }
            _ => true,
        }
    }

    fn accepted(
        &self,
        identifier: &ResourceIdentifier,
        path: &Pointer,
        target: RelationshipTarget<'_>,
        errors: &mut ValidationErrors,
    ) -> bool {
        let Some(acceptance) = self.acceptance else {
            return true;
        };

        let error = match acceptance.accept(target.field, identifier, target.record) {
            Acceptance::Accepted => return true,
            Acceptance::Rejected => ValidationError::new(path, "id", ErrorKind::RelationshipNotAcceptable),
            Acceptance::RejectedBecause(reason) => {
                ValidationError::new(path, "id", ErrorKind::RelationshipNotAcceptable)
                    .with_detail("reason", reason)
            }
        };
        errors.add(error.with_detail("type", identifier.resource_type.as_str()));
        false
    }
}

fn missing(path: &Pointer, identifier: &ResourceIdentifier) -> ValidationError {
    ValidationError::new(path, "id", ErrorKind::RelatedResourceDoesNotExist)
        .with_detail("type", identifier.resource_type.as_str())
        .actual(identifier.id.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::store::MemoryStore;
    use serde_json::json;

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with_resource("users", "1")
            .with_resource("tags", "1")
            .with_resource("tags", "2")
            .with_type("posts")
    }

    fn run(
        validator: &RelationshipValidator<'_>,
        relation: Value,
        target: RelationshipTarget<'_>,
    ) -> (bool, ValidationErrors) {
        let mut errors = ValidationErrors::new();
        let path = Pointer::root().child("data").child("relationships").child("rel");
        let valid = validator.validate(relation.as_object().unwrap(), &path, target, &mut errors);
        (valid, errors)
    }

    #[test]
    fn test_null_to_one_is_valid() {
        let store = store();
        let (valid, errors) = run(&RelationshipValidator::new(&store), json!({"data": null}), Default::default());
        assert!(valid);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_missing_data_member() {
        let store = store();
        let (valid, errors) = run(&RelationshipValidator::new(&store), json!({"meta": {}}), Default::default());
        assert!(!valid);
        assert_eq!(errors.errors[0].kind, ErrorKind::MemberRequired);
        assert_eq!(errors.errors[0].path, "/data/relationships/rel");
        assert_eq!(errors.errors[0].member, "data");
    }

    #[test]
    fn test_scalar_data_member() {
        let store = store();
        let (valid, errors) = run(&RelationshipValidator::new(&store), json!({"data": "users"}), Default::default());
        assert!(!valid);
        assert_eq!(errors.errors[0].kind, ErrorKind::MemberNotObject);
        assert_eq!(errors.errors[0].detail_str("actual"), Some("string"));
    }

    #[test]
    fn test_to_one_missing_resource() {
        let store = store();
        let (valid, errors) = run(
            &RelationshipValidator::new(&store),
            json!({"data": {"type": "users", "id": "2"}}),
            Default::default(),
        );
        assert!(!valid);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors[0].kind, ErrorKind::RelatedResourceDoesNotExist);
        assert_eq!(errors.errors[0].path, "/data/relationships/rel/data");
        assert_eq!(errors.errors[0].kind.status(), 404);
    }

    #[test]
    fn test_to_many_reports_every_element() {
        let store = store();
        let (valid, errors) = run(
            &RelationshipValidator::new(&store),
            json!({"data": [
                {"type": "tags", "id": "1"},
                {"type": "tags"},
                {"type": "tags", "id": "9"},
                42
            ]}),
            Default::default(),
        );
        assert!(!valid);
        let found: Vec<_> = errors
            .iter()
            .map(|e| (e.path.as_str(), e.member.as_str(), e.kind))
            .collect();
        assert_eq!(
            found,
            vec![
                ("/data/relationships/rel/data/1", "id", ErrorKind::MemberRequired),
                ("/data/relationships/rel/data/3", "3", ErrorKind::MemberNotObject),
                ("/data/relationships/rel/data/2", "id", ErrorKind::RelatedResourceDoesNotExist),
            ]
        );
    }

    #[test]
    fn test_cardinality_mismatch() {
        let store = store();
        let rule = RelationshipRule::any().to_many();
        let target = RelationshipTarget {
            rule: Some(&rule),
            ..Default::default()
        };
        let (valid, errors) = run(&RelationshipValidator::new(&store), json!({"data": null}), target);
        assert!(!valid);
        assert_eq!(errors.errors[0].kind, ErrorKind::RelationshipShapeInvalid);
        assert_eq!(errors.errors[0].message(), "The relationship must be a to-many relationship.");
    }

    #[test]
    fn test_polymorphic_types() {
        let store = store();
        let rule = RelationshipRule::of_types("rel", ["users", "posts"]).unwrap();
        let target = RelationshipTarget {
            field: Some("rel"),
            rule: Some(&rule),
            record: None,
        };
        let validator = RelationshipValidator::new(&store);

        let (valid, _) = run(&validator, json!({"data": {"type": "users", "id": "1"}}), target);
        assert!(valid);

        let (valid, errors) = run(&validator, json!({"data": {"type": "tags", "id": "1"}}), target);
        assert!(!valid);
        assert_eq!(errors.errors[0].kind, ErrorKind::ResourceTypeNotSupported);
        assert_eq!(errors.errors[0].detail["expected"], json!(["users", "posts"]));
    }

    #[test]
    fn test_acceptance_runs_after_existence() {
        let store = store();
        let reject_two = |field: Option<&str>, identifier: &ResourceIdentifier, _: Option<&Value>| {
            assert_eq!(field, Some("rel"));
            if identifier.id == "2" {
                Acceptance::RejectedBecause("Tag 2 is archived.".into())
            } else {
                Acceptance::Accepted
            }
        };
        let validator = RelationshipValidator::new(&store).with_acceptance(Some(&reject_two));
        let target = RelationshipTarget {
            field: Some("rel"),
            ..Default::default()
        };

        let (valid, errors) = run(
            &validator,
            json!({"data": [{"type": "tags", "id": "1"}, {"type": "tags", "id": "2"}, {"type": "tags", "id": "3"}]}),
            target,
        );
        assert!(!valid);
        let kinds: Vec<_> = errors.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![ErrorKind::RelationshipNotAcceptable, ErrorKind::RelatedResourceDoesNotExist]
        );
        assert_eq!(errors.errors[0].message(), "Tag 2 is archived.");
    }
}
