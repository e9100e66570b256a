//! JSON:API Spec - request document validation for JSON:API servers
//!
//! This crate checks inbound JSON:API request documents before a server
//! acts on them. It walks the decoded document and reports every
//! violation it finds, each addressed by a JSON Pointer, so a client gets
//! the complete list of problems from a single request.
//!
//! ## Features
//!
//! - **Resource Documents**: create and update requests, with expected type
//!   and id checks and client-generated id handling
//! - **Relationship Documents**: to-one and to-many relationship requests
//! - **Existence Checks**: related resources are looked up through a
//!   caller-supplied [`ResourceStore`]
//! - **Polymorphic Relationships**: per-field allowed target types
//! - **Acceptance Rules**: pluggable domain rules for linking resources
//! - **JSON:API Errors**: errors render directly as an `errors` document
//!
//! ## Quick Start
//!
//! ```rust
//! use jsonapi_spec::{DocumentValidator, MemoryStore, ResourceValidator, ValidationContext};
//! use serde_json::json;
//!
//! let store = MemoryStore::new()
//!     .with_type("comments")
//!     .with_resource("posts", "1");
//!
//! let document = json!({
//!     "data": {
//!         "type": "comments",
//!         "attributes": {"content": "hi"},
//!         "relationships": {
//!             "post": {"data": {"type": "posts", "id": "1"}}
//!         }
//!     }
//! });
//!
//! let context = ValidationContext::for_create("comments", &store).unwrap();
//! let validator = ResourceValidator::new(&document, context);
//!
//! match validator.validate() {
//!     Ok(()) => println!("Valid document!"),
//!     Err(errors) => println!("{}", errors.to_document()),
//! }
//! ```
//!
//! ## Error Handling
//!
//! Malformed client documents never produce a Rust error from a
//! constructor; they are reported through [`ValidationErrors`]. Only
//! unusable validator settings, such as an empty expected type, fail at
//! construction with a [`ConfigurationError`].
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

pub mod validation;

// Re-export commonly used types for convenience
pub use validation::{
    validate_relationship, validate_resource, Acceptance, AcceptRelated, Cardinality,
    ConfigurationError, DocumentValidator, ErrorClass, ErrorKind, IdPolicy, MemoryStore, Pointer,
    RelationshipDocumentValidator, RelationshipRule, RelationshipRules, ResourceIdentifier,
    ResourceStore, ResourceValidator, ValidationContext, ValidationError, ValidationErrors,
    ValidationResult,
};
