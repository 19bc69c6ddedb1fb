//! Integration tests for schema files and validation.
//!
//! These tests verify that schemas declared in TOML resolve relations from
//! both ends, that invalid schemas report every problem at once, and that a
//! file-defined schema drives relationship dispatch end to end.

use pretty_assertions::assert_eq;
use serde_json::json;
use tandem::prelude::*;
use tandem::schema::{Direction, SchemaError, SchemaIntrospector};

const SCHEMA: &str = r#"
    [[models]]
    name = "owner"
    fields = ["name"]

    [[models]]
    name = "widget"
    fields = ["name"]
    relations = [{ name = "owner", target = "owner", kind = "foreign_key", related_name = "widgets" }]

    [[models]]
    name = "thing"
    fields = ["name", { name = "size", choices = [["L", "Large"], ["S", "Small"]] }]
    relations = [{ name = "widget", target = "widget", kind = "one_to_one" }]

    [[models]]
    name = "category"
    fields = ["name"]
    relations = [{ name = "widget_set", target = "widget", kind = "many_to_many" }]
"#;

#[test]
fn test_relations_resolve_from_both_ends() {
    let schema = Schema::from_toml_str(SCHEMA).expect("Failed to load schema");

    let forward = schema.describe_relationship("widget", "owner").unwrap();
    assert_eq!(forward.direction, Direction::Forward);
    assert_eq!(forward.cardinality, Cardinality::Single);
    assert_eq!(forward.related_model, "owner");

    let reverse = schema.describe_relationship("owner", "widgets").unwrap();
    assert_eq!(reverse.direction, Direction::Reverse);
    assert_eq!(reverse.cardinality, Cardinality::Multiple);
    assert_eq!(reverse.back_reference.as_deref(), Some("owner"));

    let one_to_one = schema.describe_relationship("widget", "thing").unwrap();
    assert_eq!(one_to_one.cardinality, Cardinality::Single);
    assert_eq!(one_to_one.back_reference.as_deref(), Some("widget"));

    assert!(schema.describe_relationship("category", "widget_set").unwrap().symmetrical);
    assert!(schema.describe_relationship("widget", "category_set").unwrap().symmetrical);

    assert!(matches!(
        schema.describe_relationship("owner", "widget_set"),
        Err(SchemaError::UnknownRelation { .. })
    ));
}

#[test]
fn test_display_labels() {
    let schema = Schema::from_toml_str(SCHEMA).unwrap();
    assert_eq!(schema.display_label("thing", "size", "S").unwrap(), "Small");
    assert_eq!(schema.display_label("thing", "size", "XL").unwrap(), "XL");
    assert!(matches!(
        schema.display_label("thing", "name", "x"),
        Err(SchemaError::NotAChoiceField { .. })
    ));
}

#[test]
fn test_validation_reports_every_error() {
    let result = Schema::from_toml_str(
        r#"
        [[models]]
        name = "widget"
        fields = ["name", "name"]
        relations = [
            { name = "owner", target = "owner", kind = "foreign_key" },
            { name = "thing", target = "thing", kind = "foreign_key" },
        ]

        [[models]]
        name = "thing"
        fields = ["widget_set"]
    "#,
    );

    match result {
        Err(SchemaError::ValidationFailed { count, errors }) => {
            assert_eq!(count, 3);
            assert_eq!(errors.len(), 3);
        }
        other => panic!("expected validation failure, got {:?}", other),
    }
}

#[test]
fn test_file_schema_drives_pairs() {
    let store = MemoryStore::new(Schema::from_toml_str(SCHEMA).unwrap());
    let owner = store.insert("owner", [("name", "test owner")]).unwrap();
    let widget = store
        .insert(
            "widget",
            [("name", Value::from("test widget")), ("owner", Value::from(owner))],
        )
        .unwrap();
    store
        .insert(
            "thing",
            [
                ("name", Value::from("test thing")),
                ("size", Value::from("L")),
                ("widget", Value::from(widget)),
            ],
        )
        .unwrap();

    let pair = combine([
        field("name"),
        auto_relationship(
            "widgets",
            combine([
                field("name"),
                auto_relationship("thing", combine([field("name"), field_display("size")])),
            ]),
        ),
    ]);

    let out = pair.load(&store, store.collection("owner").unwrap()).unwrap();
    assert_eq!(
        serde_json::Value::Object(out[0].clone()),
        json!({
            "name": "test owner",
            "widgets": [
                {
                    "name": "test widget",
                    "thing": {"name": "test thing", "size_display": "Large"},
                },
            ],
        })
    );
    assert_eq!(store.stats().queries, 3);
}
