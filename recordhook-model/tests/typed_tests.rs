use pretty_assertions::assert_eq;
use recordhook_model::types::EntityReference;
use recordhook_model::{EntityCollection, Record, TypedRecord, Value, coerce, typed_record};
use uuid::Uuid;

typed_record!(
    /// Test shape for contacts.
    Contact,
    "contact"
);

// ── Identity projection ──────────────────────────────────────────

#[test]
fn record_coerces_to_itself() {
    let r = Record::with_id("contact", Uuid::new_v4()).with("name", "A");
    let coerced: Record = coerce(&Value::Record(r.clone())).unwrap();
    assert_eq!(coerced, r);
}

#[test]
fn record_has_no_declared_logical_name() {
    assert_eq!(<Record as TypedRecord>::LOGICAL_NAME, None);
}

// ── Typed projection ─────────────────────────────────────────────

#[test]
fn generic_record_projects_into_typed_shape() {
    let id = Uuid::new_v4();
    let r = Record::with_id("contact", id)
        .with("name", "A")
        .with("custom_unknown", Value::Opaque(serde_json::json!({"x": 1})));

    let c: Contact = coerce(&Value::Record(r.clone())).unwrap();

    assert_eq!(c.id(), id);
    assert_eq!(TypedRecord::logical_name(&c), "contact");
    assert_eq!(c.get_str("name"), Some("A"));
    assert_eq!(
        c.get("custom_unknown"),
        Some(&Value::Opaque(serde_json::json!({"x": 1})))
    );
    assert_eq!(c.into_record(), r);
}

#[test]
fn projection_copies_foreign_logical_name() {
    let r = Record::new("lead").with("subject", "hi");
    let c: Contact = coerce(&Value::Record(r)).unwrap();
    assert_eq!(c.as_record().logical_name(), "lead");
}

#[test]
fn non_record_values_coerce_to_none() {
    let reference = Value::EntityReference(EntityReference::new("contact", Uuid::new_v4()));
    assert!(coerce::<Contact>(&reference).is_none());
    assert!(coerce::<Record>(&Value::Null).is_none());
    assert!(coerce::<Record>(&Value::from("text")).is_none());
}

// ── Macro-generated API ──────────────────────────────────────────

#[test]
fn macro_shape_defaults_to_its_logical_name() {
    let c = Contact::default().with("FullName", "Ada");
    assert_eq!(Contact::ENTITY_NAME, "contact");
    assert_eq!(<Contact as TypedRecord>::LOGICAL_NAME, Some("contact"));
    assert_eq!(c.get_str("fullname"), Some("Ada"));
    assert!(c.id().is_nil());
}

#[test]
fn macro_shape_derefs_mutably() {
    let mut c = Contact::new();
    c.set("age", 42);
    assert_eq!(c.get_int("age"), Some(42));
}

#[test]
fn collection_typed_projects_every_record() {
    let collection = EntityCollection::new(
        "contact",
        vec![Record::new("contact").with("n", 1), Record::new("contact").with("n", 2)],
    );
    let typed: Vec<Contact> = collection.typed();
    assert_eq!(typed.len(), 2);
    assert_eq!(typed[1].get_int("n"), Some(2));
}
