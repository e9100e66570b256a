//! Validation error types for JSON:API request documents
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Broad class of a violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// A member is missing or has the wrong JSON type
    Structural,
    /// A member is well formed but not acceptable in this request
    Semantic,
}

/// The kind of rule a document broke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    MemberRequired,
    MemberNotObject,
    MemberNotString,
    MemberEmptyNotAllowed,
    MemberFieldNotAllowed,
    ResourceFieldConflict,
    ResourceTypeNotRecognised,
    ResourceTypeNotSupported,
    ResourceIdNotSupported,
    ResourceClientIdsNotSupported,
    ResourceExists,
    RelationshipShapeInvalid,
    RelatedResourceDoesNotExist,
    RelationshipNotAcceptable,
}

impl ErrorKind {
    /// Machine-readable code, as rendered in the `code` member of a JSON:API error
    pub fn code(&self) -> &'static str {
        match self {
            Self::MemberRequired => "member-required",
            Self::MemberNotObject => "member-not-object",
            Self::MemberNotString => "member-not-string",
            Self::MemberEmptyNotAllowed => "member-empty-not-allowed",
            Self::MemberFieldNotAllowed => "member-field-not-allowed",
            Self::ResourceFieldConflict => "resource-field-conflict",
            Self::ResourceTypeNotRecognised => "resource-type-not-recognised",
            Self::ResourceTypeNotSupported => "resource-type-not-supported",
            Self::ResourceIdNotSupported => "resource-id-not-supported",
            Self::ResourceClientIdsNotSupported => "resource-client-ids-not-supported",
            Self::ResourceExists => "resource-exists",
            Self::RelationshipShapeInvalid => "relationship-shape-invalid",
            Self::RelatedResourceDoesNotExist => "related-resource-does-not-exist",
            Self::RelationshipNotAcceptable => "relationship-not-acceptable",
        }
    }

    /// HTTP status a server should use when this is the only error
    pub fn status(&self) -> u16 {
        match self {
            Self::ResourceTypeNotSupported
            | Self::ResourceIdNotSupported
            | Self::ResourceExists => 409,
            Self::ResourceClientIdsNotSupported => 403,
            Self::RelatedResourceDoesNotExist => 404,
            Self::RelationshipNotAcceptable => 422,
            _ => 400,
        }
    }

    /// Short, human-readable summary
    pub fn title(&self) -> &'static str {
        match self {
            Self::MemberRequired => "Required Member",
            Self::MemberNotObject => "Object Expected",
            Self::MemberNotString => "String Expected",
            Self::MemberEmptyNotAllowed => "Value Expected",
            Self::MemberFieldNotAllowed => "Field Not Allowed",
            Self::ResourceFieldConflict => "Invalid Resource",
            Self::ResourceTypeNotRecognised
            | Self::ResourceTypeNotSupported
            | Self::ResourceIdNotSupported
            | Self::ResourceClientIdsNotSupported => "Not Supported",
            Self::ResourceExists => "Conflict",
            Self::RelationshipShapeInvalid
            | Self::RelatedResourceDoesNotExist
            | Self::RelationshipNotAcceptable => "Invalid Relationship",
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Self::MemberRequired
            | Self::MemberNotObject
            | Self::MemberNotString
            | Self::MemberEmptyNotAllowed
            | Self::MemberFieldNotAllowed
            | Self::ResourceFieldConflict
            | Self::RelationshipShapeInvalid => ErrorClass::Structural,
            _ => ErrorClass::Semantic,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single violation, addressed by JSON Pointer
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub struct ValidationError {
    /// JSON Pointer of the object holding the offending member
    pub path: String,
    /// Name of the offending member, or its index inside an array
    pub member: String,
    /// Which rule was broken
    pub kind: ErrorKind,
    /// Expected/actual values and other facts used to build the message
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub detail: BTreeMap<String, Value>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Validation error at '{}' [{}]: {}",
            self.path,
            self.kind,
            self.message()
        )
    }
}

impl ValidationError {
    /// Create a new validation error
    pub fn new<P, M>(path: P, member: M, kind: ErrorKind) -> Self
    where
        P: Into<String>,
        M: Into<String>,
    {
        Self {
            path: path.into(),
            member: member.into(),
            kind,
            detail: BTreeMap::new(),
        }
    }

    /// Attach a detail value
    pub fn with_detail<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.detail.insert(key.into(), value.into());
        self
    }

    /// Attach the value that was expected
    pub fn expected<V: Into<Value>>(self, value: V) -> Self {
        self.with_detail("expected", value)
    }

    /// Attach the value that was found
    pub fn actual<V: Into<Value>>(self, value: V) -> Self {
        self.with_detail("actual", value)
    }

    pub fn detail_str(&self, key: &str) -> Option<&str> {
        self.detail.get(key).and_then(Value::as_str)
    }

    /// Human-readable sentence describing the violation
    pub fn message(&self) -> String {
        let actual = self.detail_str("actual").unwrap_or("");
        match self.kind {
            ErrorKind::MemberRequired => format!("The member {} is required.", self.member),
            ErrorKind::MemberNotObject => {
                format!("The member {} must be an object.", self.member)
            }
            ErrorKind::MemberNotString => format!("The member {} must be a string.", self.member),
            ErrorKind::MemberEmptyNotAllowed => {
                format!("The member {} cannot be empty.", self.member)
            }
            ErrorKind::MemberFieldNotAllowed => format!(
                "The member {} cannot have a field named {}.",
                self.member,
                self.detail_str("field").unwrap_or(""),
            ),
            ErrorKind::ResourceFieldConflict => format!(
                "The {} field cannot exist as an attribute and a relationship.",
                self.member
            ),
            ErrorKind::ResourceTypeNotRecognised => {
                format!("Resource type {} is not recognised.", actual)
            }
            ErrorKind::ResourceTypeNotSupported => {
                format!("Resource type {} is not supported by this endpoint.", actual)
            }
            ErrorKind::ResourceIdNotSupported => {
                format!("Resource id {} is not supported by this endpoint.", actual)
            }
            ErrorKind::ResourceClientIdsNotSupported => format!(
                "Resource type {} does not support client-generated IDs.",
                self.detail_str("type").unwrap_or("")
            ),
            ErrorKind::ResourceExists => format!("Resource {} already exists.", actual),
            ErrorKind::RelationshipShapeInvalid => format!(
                "The relationship must be a {} relationship.",
                self.detail_str("expected").unwrap_or("different")
            ),
            ErrorKind::RelatedResourceDoesNotExist => {
                "The related resource does not exist.".to_string()
            }
            ErrorKind::RelationshipNotAcceptable => self
                .detail_str("reason")
                .map(str::to_string)
                .unwrap_or_else(|| "The related resource is not acceptable.".to_string()),
        }
    }

    /// Render as a JSON:API error object
    pub fn to_error_object(&self) -> Value {
        let mut object = Map::new();
        object.insert("status".into(), json!(self.kind.status().to_string()));
        object.insert("code".into(), json!(self.kind.code()));
        object.insert("title".into(), json!(self.kind.title()));
        object.insert("detail".into(), json!(self.message()));
        object.insert("source".into(), json!({ "pointer": self.path }));

        let mut meta = Map::new();
        meta.insert("member".into(), json!(self.member));
        meta.extend(self.detail.iter().map(|(key, value)| (key.clone(), value.clone())));
        object.insert("meta".into(), Value::Object(meta));
        Value::Object(object)
    }
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationErrors>;

/// Ordered collection of every violation found in one validation call
#[derive(Debug, Clone, Default, PartialEq, Error, Serialize, Deserialize)]
pub struct ValidationErrors {
    /// List of validation errors
    pub errors: Vec<ValidationError>,
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Document failed validation with {} error(s):", self.len())?;
        for (i, error) in self.errors.iter().enumerate() {
            write!(f, "\n{}. {}", i + 1, error)?;
        }
        Ok(())
    }
}

impl ValidationErrors {
    /// Create a new validation errors collection
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Add an error to the collection
    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Check if there are any errors
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the number of errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    /// HTTP status for the whole collection: the shared status when every
    /// error agrees, otherwise 400.
    pub fn status(&self) -> Option<u16> {
        let first = self.errors.first()?.kind.status();
        if self.errors.iter().all(|e| e.kind.status() == first) {
            Some(first)
        } else {
            Some(400)
        }
    }

    /// Render as a JSON:API `errors` document
    pub fn to_document(&self) -> Value {
        json!({
            "errors": self.errors.iter().map(ValidationError::to_error_object).collect::<Vec<_>>()
        })
    }

    /// Convert to result - Ok if no errors, Err if any errors exist
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl Extend<ValidationError> for ValidationErrors {
    fn extend<T: IntoIterator<Item = ValidationError>>(&mut self, iter: T) {
        self.errors.extend(iter);
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        let mut errors = Self::new();
        errors.add(error);
        errors
    }
}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }
}

/// A validator was built with settings that can never describe a real endpoint
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("expected resource type must be a non-empty string")]
    EmptyExpectedType,

    #[error("expected resource id must be a non-empty string")]
    EmptyExpectedId,

    #[error("relationship {field} declares an empty resource type")]
    EmptyRelationshipType { field: String },

    #[error("relationship {field} declares no resource types")]
    NoRelationshipTypes { field: String },
}
