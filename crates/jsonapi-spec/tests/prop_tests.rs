//! Property-based tests for document validation
//!
//! These tests verify that validators behave correctly across a wide
//! range of inputs, including arbitrary JSON that is nothing like a
//! JSON:API document.

use jsonapi_spec::{
    Cardinality, DocumentValidator, ErrorKind, MemoryStore, RelationshipDocumentValidator,
    ResourceValidator, ValidationContext,
};
use proptest::prelude::*;
use serde_json::{json, Value};

/// Strategy for generating random JSON values with controlled complexity
fn json_value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(n.into())),
        "[a-zA-Z0-9 ]{0,20}".prop_map(Value::String),
    ];

    leaf.prop_recursive(
        4,  // max depth
        24, // max size
        5,  // items per collection
        |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
                proptest::collection::hash_map(
                    prop_oneof![
                        Just("data".to_string()),
                        Just("type".to_string()),
                        Just("id".to_string()),
                        Just("attributes".to_string()),
                        Just("relationships".to_string()),
                        "[a-z]{1,8}",
                    ],
                    inner,
                    0..5
                )
                .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        },
    )
}

/// Strategy for resource identifiers that are sometimes broken
fn identifier_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        3 => ("tags|users", "[1-5]").prop_map(|(t, id)| json!({"type": t, "id": id})),
        1 => "[1-5]".prop_map(|id| json!({"id": id})),
        1 => "tags|users".prop_map(|t| json!({"type": t})),
        1 => Just(json!({"type": "", "id": ""})),
        1 => Just(json!(null)),
    ]
}

fn store() -> MemoryStore {
    MemoryStore::new()
        .with_type("posts")
        .with_resource("tags", "1")
        .with_resource("tags", "2")
        .with_resource("users", "1")
}

proptest! {
    #[test]
    fn arbitrary_documents_never_panic(document in json_value_strategy()) {
        let store = store();

        let create = ResourceValidator::new(&document, ValidationContext::for_create("posts", &store).unwrap());
        let update = ResourceValidator::new(&document, ValidationContext::for_update("posts", "1", &store).unwrap());
        let relationship = RelationshipDocumentValidator::new(&document, &store);

        for errors in [create.errors(), update.errors(), relationship.errors()] {
            prop_assert_eq!(errors.is_empty(), errors.status().is_none());
            for error in errors {
                prop_assert!(error.path.starts_with('/'));
                prop_assert!(!error.message().is_empty());
            }
        }
    }

    #[test]
    fn validation_is_idempotent(document in json_value_strategy()) {
        let store = store();
        let validator = ResourceValidator::new(&document, ValidationContext::for_create("posts", &store).unwrap());

        let first = validator.validate();
        let second = validator.validate();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn to_many_reports_each_broken_element_once(items in proptest::collection::vec(identifier_strategy(), 0..8)) {
        let store = store();
        let document = json!({"data": items});
        let validator = RelationshipDocumentValidator::new(&document, &store).expecting(Cardinality::ToMany);

        let mut expected = 0;
        for item in &items {
            expected += match item {
                Value::Null => 1,
                Value::Object(object) => {
                    let broken = |member: &str| object.get(member).and_then(Value::as_str).map_or(true, str::is_empty);
                    let structural = usize::from(broken("type")) + usize::from(broken("id"));
                    if structural > 0 {
                        structural
                    } else {
                        let identifier = jsonapi_spec::ResourceIdentifier::new(
                            object["type"].as_str().unwrap_or_default(),
                            object["id"].as_str().unwrap_or_default(),
                        );
                        usize::from(!jsonapi_spec::ResourceStore::exists(&store, &identifier))
                    }
                }
                _ => unreachable!("strategy only yields objects and null"),
            };
        }

        prop_assert_eq!(validator.errors().len(), expected);
        prop_assert_eq!(validator.passes(), expected == 0);
        for error in validator.errors().iter() {
            let index = error.path.strip_prefix("/data/").and_then(|rest| rest.parse::<usize>().ok());
            prop_assert!(index.is_some_and(|i| i < items.len()), "unexpected path {}", error.path);
        }
    }

    #[test]
    fn missing_type_and_id_always_yield_two_errors(title in "[a-zA-Z ]{0,30}") {
        let store = store();
        let document = json!({"data": {"attributes": {"title": title}}});
        let validator = ResourceValidator::new(&document, ValidationContext::for_update("posts", "1", &store).unwrap());

        let kinds: Vec<_> = validator.errors().iter().map(|e| e.kind).collect();
        prop_assert_eq!(kinds, vec![ErrorKind::MemberRequired, ErrorKind::MemberRequired]);
    }
}
