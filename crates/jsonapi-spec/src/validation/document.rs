//! Validators for whole request documents
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::validation::base::{DocumentValidator, OptionalMember, ValidationHelpers};
use crate::validation::context::{AcceptRelated, Cardinality, IdPolicy, RelationshipRule, ValidationContext};
use crate::validation::error::{ConfigurationError, ErrorKind, ValidationError, ValidationErrors};
use crate::validation::pointer::Pointer;
use crate::validation::relationship::{RelationshipTarget, RelationshipValidator};
use crate::validation::store::{ResourceIdentifier, ResourceStore};
use serde_json::{Map, Value};
use std::cell::OnceCell;
use tracing::debug;

/// Validates a create or update request document, `{"data": {resource}}`
///
/// The id policy of the context decides between create and update
/// semantics. Every member of the resource is checked even when an earlier
/// one failed; only a missing or non-object `data` stops validation.
pub struct ResourceValidator<'a> {
    document: &'a Value,
    context: ValidationContext<'a>,
    outcome: OnceCell<ValidationErrors>,
}

impl<'a> ResourceValidator<'a> {
    pub fn new(document: &'a Value, context: ValidationContext<'a>) -> Self {
        Self {
            document,
            context,
            outcome: OnceCell::new(),
        }
    }

    fn run(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        let root = Pointer::root();

        let Some(data) = ValidationHelpers::required_object(self.document.get("data"), &root, "data", &mut errors)
        else {
            return errors;
        };
        let path = root.child("data");

        let type_valid = self.validate_type(data, &path, &mut errors);
        let id_valid = self.validate_id(data, &path, &mut errors);
        let attributes_valid = self.validate_attributes(data, &path, &mut errors);
        let relationships_valid = self.validate_relationships(data, &path, &mut errors);
        let fields_valid = self.validate_field_names(data, &path, &mut errors);

        debug!(
            expected_type = self.context.expected_type(),
            id_policy = ?self.context.id_policy(),
            passes = type_valid && id_valid && attributes_valid && relationships_valid && fields_valid,
            errors = errors.len(),
            "validated resource document"
        );
        errors
    }

    fn validate_type(&self, data: &Map<String, Value>, path: &Pointer, errors: &mut ValidationErrors) -> bool {
        let Some(resource_type) = ValidationHelpers::required_string(data, path, "type", errors) else {
            return false;
        };
        let expected = self.context.expected_type();
        if resource_type == expected {
            return true;
        }

        let kind = if self.context.store().is_type(resource_type) {
            ErrorKind::ResourceTypeNotSupported
        } else {
            ErrorKind::ResourceTypeNotRecognised
        };
        errors.add(
            ValidationError::new(path, "type", kind)
                .expected(expected)
                .actual(resource_type),
        );
        false
    }

    fn validate_id(&self, data: &Map<String, Value>, path: &Pointer, errors: &mut ValidationErrors) -> bool {
        let expected_type = self.context.expected_type();
        match self.context.id_policy() {
            IdPolicy::Forbidden => {
                if data.contains_key("id") {
                    errors.add(
                        ValidationError::new(path, "id", ErrorKind::ResourceClientIdsNotSupported)
                            .with_detail("type", expected_type),
                    );
                    return false;
                }
                true
            }
            IdPolicy::Optional => match ValidationHelpers::optional_string(data, path, "id", errors) {
                OptionalMember::Absent => true,
                OptionalMember::Invalid => false,
                OptionalMember::Present(id) => {
                    let identifier = ResourceIdentifier::new(expected_type, id);
                    if self.context.store().exists(&identifier) {
                        errors.add(
                            ValidationError::new(path, "id", ErrorKind::ResourceExists)
                                .with_detail("type", expected_type)
                                .actual(id),
                        );
                        return false;
                    }
                    true
                }
            },
            IdPolicy::Required(expected_id) => {
                let Some(id) = ValidationHelpers::required_string(data, path, "id", errors) else {
                    return false;
                };
                if id != expected_id {
                    errors.add(
                        ValidationError::new(path, "id", ErrorKind::ResourceIdNotSupported)
                            .expected(expected_id.as_str())
                            .actual(id),
                    );
                    return false;
                }
                true
            }
        }
    }

    fn validate_attributes(&self, data: &Map<String, Value>, path: &Pointer, errors: &mut ValidationErrors) -> bool {
        let Some(attributes) = data.get("attributes") else {
            return true;
        };
        let Some(attributes) = ValidationHelpers::object(attributes, path, "attributes", errors) else {
            return false;
        };
        ValidationHelpers::reserved_fields(attributes, path, "attributes", errors)
    }

    fn validate_relationships(&self, data: &Map<String, Value>, path: &Pointer, errors: &mut ValidationErrors) -> bool {
        let Some(relationships) = data.get("relationships") else {
            return true;
        };
        let Some(relationships) = ValidationHelpers::object(relationships, path, "relationships", errors) else {
            return false;
        };

        let mut valid = ValidationHelpers::reserved_fields(relationships, path, "relationships", errors);
        let relationships_path = path.child("relationships");
        let validator = RelationshipValidator::new(self.context.store()).with_acceptance(self.context.acceptance());
        let record = self.document.get("data");

        // Reserved names were reported above
        for (field, relation) in relationships.iter().filter(|(field, _)| !ValidationHelpers::is_reserved(field)) {
            let Some(relation) = ValidationHelpers::object(relation, &relationships_path, field, errors) else {
                valid = false;
                continue;
            };
            let target = RelationshipTarget {
                field: Some(field.as_str()),
                rule: self.context.relationships().get(field),
                record,
            };
            valid &= validator.validate(relation, &relationships_path.child(field), target, errors);
        }

        valid
    }

    /// Attributes and relationships share one namespace
    fn validate_field_names(&self, data: &Map<String, Value>, path: &Pointer, errors: &mut ValidationErrors) -> bool {
        let (Some(Value::Object(attributes)), Some(Value::Object(relationships))) =
            (data.get("attributes"), data.get("relationships"))
        else {
            return true;
        };

        let mut valid = true;
        let conflicts = attributes
            .keys()
            .filter(|field| !ValidationHelpers::is_reserved(field) && relationships.contains_key(*field));
        for field in conflicts {
            errors.add(ValidationError::new(path, field.as_str(), ErrorKind::ResourceFieldConflict));
            valid = false;
        }
        valid
    }
}

impl DocumentValidator for ResourceValidator<'_> {
    fn errors(&self) -> &ValidationErrors {
        self.outcome.get_or_init(|| self.run())
    }
}

/// Validates a relationship request document, `{"data": null | {...} | [...]}`
///
/// Used for the relationship endpoints, where the document's `data` member is
/// the relationship itself rather than a resource.
pub struct RelationshipDocumentValidator<'a> {
    document: &'a Value,
    store: &'a dyn ResourceStore,
    field: Option<String>,
    rule: RelationshipRule,
    record: Option<&'a Value>,
    acceptance: Option<&'a dyn AcceptRelated>,
    outcome: OnceCell<ValidationErrors>,
}

impl<'a> RelationshipDocumentValidator<'a> {
    pub fn new(document: &'a Value, store: &'a dyn ResourceStore) -> Self {
        Self {
            document,
            store,
            field: None,
            rule: RelationshipRule::any(),
            record: None,
            acceptance: None,
            outcome: OnceCell::new(),
        }
    }

    /// Name the relationship; it is passed to the acceptance strategy
    pub fn for_field<F: Into<String>>(mut self, field: F) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Restrict the related resource types
    pub fn with_types<I, S>(mut self, types: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let cardinality = self.rule.cardinality();
        let field = self.field.as_deref().unwrap_or("data");
        let mut rule = RelationshipRule::of_types(field, types)?;
        if let Some(cardinality) = cardinality {
            rule = rule.with_cardinality(cardinality);
        }
        self.rule = rule;
        Ok(self)
    }

    pub fn expecting(mut self, cardinality: Cardinality) -> Self {
        self.rule = self.rule.with_cardinality(cardinality);
        self
    }

    /// The resource whose relationship is being replaced or modified
    pub fn with_record(mut self, record: &'a Value) -> Self {
        self.record = Some(record);
        self
    }

    pub fn with_acceptance(mut self, acceptance: &'a dyn AcceptRelated) -> Self {
        self.acceptance = Some(acceptance);
        self
    }

    fn run(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        let root = Pointer::root();
        let Some(document) = self.document.as_object() else {
            errors.add(ValidationError::new(&root, "data", ErrorKind::MemberRequired));
            return errors;
        };

        let target = RelationshipTarget {
            field: self.field.as_deref(),
            rule: Some(&self.rule),
            record: self.record,
        };
        let passes = RelationshipValidator::new(self.store)
            .with_acceptance(self.acceptance)
            .validate(document, &root, target, &mut errors);

        debug!(
            field = self.field.as_deref().unwrap_or("-"),
            passes,
            errors = errors.len(),
            "validated relationship document"
        );
        errors
    }
}

impl DocumentValidator for RelationshipDocumentValidator<'_> {
    fn errors(&self) -> &ValidationErrors {
        self.outcome.get_or_init(|| self.run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::store::MemoryStore;
    use serde_json::json;

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with_resource("posts", "1")
            .with_resource("users", "1")
            .with_type("people")
            .with_type("comments")
    }

    #[test]
    fn test_missing_data_stops_validation() {
        let store = store();
        let document = json!({"meta": {}});
        let validator = ResourceValidator::new(&document, ValidationContext::for_create("posts", &store).unwrap());

        assert!(validator.fails());
        assert_eq!(validator.errors().len(), 1);
        assert_eq!(validator.errors().errors[0].path, "/");
        assert_eq!(validator.errors().errors[0].member, "data");
    }

    #[test]
    fn test_non_object_document() {
        let store = store();
        let document = json!([1, 2]);
        let validator = ResourceValidator::new(&document, ValidationContext::for_create("posts", &store).unwrap());
        assert_eq!(validator.errors().errors[0].kind, ErrorKind::MemberRequired);
    }

    #[test]
    fn test_client_id_collision() {
        let store = store();
        let document = json!({"data": {"type": "posts", "id": "1"}});
        let validator = ResourceValidator::new(&document, ValidationContext::for_create("posts", &store).unwrap());

        let errors = validator.validate().unwrap_err();
        assert_eq!(errors.errors[0].kind, ErrorKind::ResourceExists);
        assert_eq!(errors.status(), Some(409));
    }

    #[test]
    fn test_client_ids_forbidden() {
        let store = store();
        let document = json!({"data": {"type": "posts", "id": "2"}});
        let context = ValidationContext::for_create_without_client_ids("posts", &store).unwrap();
        let validator = ResourceValidator::new(&document, context);

        let errors = validator.validate().unwrap_err();
        assert_eq!(errors.errors[0].kind, ErrorKind::ResourceClientIdsNotSupported);
        assert_eq!(errors.errors[0].message(), "Resource type posts does not support client-generated IDs.");
    }

    #[test]
    fn test_update_id_mismatch() {
        let store = store();
        let document = json!({"data": {"type": "posts", "id": "2"}});
        let validator = ResourceValidator::new(&document, ValidationContext::for_update("posts", "1", &store).unwrap());

        let errors = validator.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors[0].kind, ErrorKind::ResourceIdNotSupported);
        assert_eq!(errors.errors[0].detail_str("expected"), Some("1"));
    }

    #[test]
    fn test_field_namespace_conflict() {
        let store = store();
        let document = json!({"data": {
            "type": "posts",
            "attributes": {"author": "bob", "id": "x"},
            "relationships": {"author": {"data": {"type": "users", "id": "1"}}}
        }});
        let validator = ResourceValidator::new(&document, ValidationContext::for_create("posts", &store).unwrap());

        let found: Vec<_> = validator.errors().iter().map(|e| (e.member.as_str(), e.kind)).collect();
        assert_eq!(
            found,
            vec![
                ("attributes", ErrorKind::MemberFieldNotAllowed),
                ("author", ErrorKind::ResourceFieldConflict),
            ]
        );
    }

    #[test]
    fn test_reserved_relationship_name_reported_once() {
        let store = store();
        let document = json!({"data": {
            "type": "posts",
            "attributes": {"type": "draft"},
            "relationships": {"id": "1", "type": {"data": null}}
        }});
        let validator = ResourceValidator::new(&document, ValidationContext::for_create("posts", &store).unwrap());

        let found: Vec<_> = validator
            .errors()
            .iter()
            .map(|e| (e.member.as_str(), e.detail_str("field"), e.kind))
            .collect();
        assert_eq!(
            found,
            vec![
                ("attributes", Some("type"), ErrorKind::MemberFieldNotAllowed),
                ("relationships", Some("type"), ErrorKind::MemberFieldNotAllowed),
                ("relationships", Some("id"), ErrorKind::MemberFieldNotAllowed),
            ]
        );
    }

    #[test]
    fn test_non_object_documents_agree_across_validators() {
        let store = store();
        let document = json!([]);

        let resource = ResourceValidator::new(&document, ValidationContext::for_create("posts", &store).unwrap());
        let relationship = RelationshipDocumentValidator::new(&document, &store);

        assert_eq!(relationship.errors(), resource.errors());
        assert_eq!(relationship.errors().errors[0].kind, ErrorKind::MemberRequired);
        assert_eq!(relationship.errors().errors[0].message(), "The member data is required.");
    }

    #[test]
    fn test_relationship_document_to_many_at_root() {
        let store = store();
        let document = json!({"data": [{"type": "users", "id": "1"}, {"type": "users"}]});
        let validator = RelationshipDocumentValidator::new(&document, &store).expecting(Cardinality::ToMany);

        let errors = validator.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors[0].path, "/data/1");
        assert_eq!(errors.errors[0].member, "id");
    }

    #[test]
    fn test_relationship_document_missing_data() {
        let store = store();
        let document = json!({});
        let validator = RelationshipDocumentValidator::new(&document, &store);

        let errors = validator.validate().unwrap_err();
        assert_eq!(errors.errors[0].kind, ErrorKind::MemberRequired);
        assert_eq!(errors.errors[0].path, "/");
    }

    #[test]
    fn test_relationship_document_types_keep_cardinality() {
        let store = store();
        let document = json!({"data": {"type": "posts", "id": "1"}});
        let validator = RelationshipDocumentValidator::new(&document, &store)
            .for_field("author")
            .expecting(Cardinality::ToOne)
            .with_types(["users"])
            .unwrap();

        let errors = validator.validate().unwrap_err();
        assert_eq!(errors.errors[0].kind, ErrorKind::ResourceTypeNotSupported);
        assert_eq!(errors.errors[0].path, "/data");
    }

    #[test]
    fn test_relationship_document_rejects_empty_types() {
        let store = store();
        let document = json!({"data": null});
        let err = RelationshipDocumentValidator::new(&document, &store)
            .for_field("author")
            .with_types([""])
            .err()
            .unwrap();
        assert_eq!(err, ConfigurationError::EmptyRelationshipType { field: "author".into() });
    }
}
