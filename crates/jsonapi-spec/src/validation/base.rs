//! Base validation trait and common member checks
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::validation::error::{ErrorKind, ValidationError, ValidationErrors, ValidationResult};
use crate::validation::pointer::Pointer;
use serde_json::{Map, Value};

/// Base trait for document validators
///
/// A validator is built for one document, runs at most once, and keeps the
/// outcome; asking again returns the same errors without new store lookups.
pub trait DocumentValidator {
    /// Every violation found in the document, in document order
    fn errors(&self) -> &ValidationErrors;

    /// Whether the document is valid
    fn passes(&self) -> bool {
        self.errors().is_empty()
    }

    /// Whether the document has at least one violation
    fn fails(&self) -> bool {
        !self.passes()
    }

    /// Validate, returning the collected errors on failure
    fn validate(&self) -> ValidationResult<()> {
        self.errors().clone().into_result()
    }
}

/// State of a member the document may omit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionalMember<'v> {
    Absent,
    /// Present but malformed; an error has been recorded
    Invalid,
    Present(&'v str),
}

/// Helper functions for common member checks
///
/// Each check records at most one error for the member it inspects, so a
/// member that is structurally broken is never also reported as
/// semantically wrong.
pub struct ValidationHelpers;

impl ValidationHelpers {
    /// Names that identify a resource and cannot be used as field names
    pub const RESERVED_FIELDS: [&'static str; 2] = ["type", "id"];

    pub fn is_reserved(field: &str) -> bool {
        Self::RESERVED_FIELDS.contains(&field)
    }

    /// Name of a JSON value's type, for error details
    pub fn type_name(value: &Value) -> &'static str {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Require `member` to be present and an object
    pub fn required_object<'v>(
        value: Option<&'v Value>,
        path: &Pointer,
        member: &str,
        errors: &mut ValidationErrors,
    ) -> Option<&'v Map<String, Value>> {
        match value {
            None => {
                errors.add(ValidationError::new(path, member, ErrorKind::MemberRequired));
                None
            }
            Some(value) => Self::object(value, path, member, errors),
        }
    }

    /// Require a present value to be an object
    pub fn object<'v>(
        value: &'v Value,
        path: &Pointer,
        member: &str,
        errors: &mut ValidationErrors,
    ) -> Option<&'v Map<String, Value>> {
        match value {
            Value::Object(map) => Some(map),
            other => {
                errors.add(
                    ValidationError::new(path, member, ErrorKind::MemberNotObject)
                        .actual(Self::type_name(other)),
                );
                None
            }
        }
    }

    /// Require `member` of `object` to be a non-empty string
    pub fn required_string<'v>(
        object: &'v Map<String, Value>,
        path: &Pointer,
        member: &str,
        errors: &mut ValidationErrors,
    ) -> Option<&'v str> {
        match object.get(member) {
            None => {
                errors.add(ValidationError::new(path, member, ErrorKind::MemberRequired));
                None
            }
            Some(value) => Self::non_empty_string(value, path, member, errors),
        }
    }

    /// Check `member` of `object` only if present
    pub fn optional_string<'v>(
        object: &'v Map<String, Value>,
        path: &Pointer,
        member: &str,
        errors: &mut ValidationErrors,
    ) -> OptionalMember<'v> {
        match object.get(member) {
            None => OptionalMember::Absent,
            Some(value) => match Self::non_empty_string(value, path, member, errors) {
                Some(s) => OptionalMember::Present(s),
                None => OptionalMember::Invalid,
            },
        }
    }

    fn non_empty_string<'v>(
        value: &'v Value,
        path: &Pointer,
        member: &str,
        errors: &mut ValidationErrors,
    ) -> Option<&'v str> {
        match value {
            Value::String(s) if s.is_empty() => {
                errors.add(ValidationError::new(path, member, ErrorKind::MemberEmptyNotAllowed));
                None
            }
            Value::String(s) => Some(s.as_str()),
            other => {
                errors.add(
                    ValidationError::new(path, member, ErrorKind::MemberNotString)
                        .actual(Self::type_name(other)),
                );
                None
            }
        }
    }

    /// Reject `type` and `id` used as field names inside `member`
    pub fn reserved_fields(
        fields: &Map<String, Value>,
        path: &Pointer,
        member: &str,
        errors: &mut ValidationErrors,
    ) -> bool {
        let mut valid = true;
        for reserved in Self::RESERVED_FIELDS {
            if fields.contains_key(reserved) {
                errors.add(
                    ValidationError::new(path, member, ErrorKind::MemberFieldNotAllowed)
                        .with_detail("field", reserved),
                );
                valid = false;
            }
        }
        valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_required_string() {
        let path = Pointer::root().child("data");
        let data = object(json!({"type": "posts", "id": 1, "empty": ""}));
        let mut errors = ValidationErrors::new();

        assert_eq!(ValidationHelpers::required_string(&data, &path, "type", &mut errors), Some("posts"));
        assert!(errors.is_empty());

        assert_eq!(ValidationHelpers::required_string(&data, &path, "id", &mut errors), None);
        assert_eq!(ValidationHelpers::required_string(&data, &path, "empty", &mut errors), None);
        assert_eq!(ValidationHelpers::required_string(&data, &path, "missing", &mut errors), None);

        let kinds: Vec<_> = errors.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ErrorKind::MemberNotString,
                ErrorKind::MemberEmptyNotAllowed,
                ErrorKind::MemberRequired
            ]
        );
        assert_eq!(errors.errors[0].detail_str("actual"), Some("number"));
        assert!(errors.iter().all(|e| e.path == "/data"));
    }

    #[test]
    fn test_optional_string() {
        let path = Pointer::root().child("data");
        let data = object(json!({"id": ""}));
        let mut errors = ValidationErrors::new();

        assert_eq!(
            ValidationHelpers::optional_string(&data, &path, "lid", &mut errors),
            OptionalMember::Absent
        );
        assert_eq!(
            ValidationHelpers::optional_string(&data, &path, "id", &mut errors),
            OptionalMember::Invalid
        );
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_required_object() {
        let mut errors = ValidationErrors::new();
        let doc = json!({"data": []});

        assert!(ValidationHelpers::required_object(doc.get("data"), &Pointer::root(), "data", &mut errors).is_none());
        assert!(ValidationHelpers::required_object(doc.get("meta"), &Pointer::root(), "meta", &mut errors).is_none());

        assert_eq!(errors.errors[0].kind, ErrorKind::MemberNotObject);
        assert_eq!(errors.errors[0].path, "/");
        assert_eq!(errors.errors[1].kind, ErrorKind::MemberRequired);
    }

    #[test]
    fn test_reserved_fields() {
        let path = Pointer::root().child("data");
        let mut errors = ValidationErrors::new();
        let attributes = object(json!({"type": "x", "id": "y", "title": "z"}));

        assert!(!ValidationHelpers::reserved_fields(&attributes, &path, "attributes", &mut errors));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.errors[1].detail_str("field"), Some("id"));
        assert_eq!(errors.errors[1].message(), "The member attributes cannot have a field named id.");
    }
}
