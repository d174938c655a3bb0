mod common;

use common::{Call, Recorder, contact};
use pretty_assertions::assert_eq;
use recordhook_host::{
    BoundaryFailure, DispatchTable, Dispatcher, EventContext, MessageKind, MessageOperationExecutor,
    PluginConfig, PluginContext, PluginError, PluginResult,
};
use recordhook_model::{EntityCollection, Record, TypedRecord, Value, typed_record};
use recordhook_types::{
    ConditionOperator, EntityReference, EntityReferenceCollection, OptionSetValue, Query,
    QueryExpression,
};
use std::io::Write;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// ── End-to-end scenarios ─────────────────────────────────────────

#[test]
fn create_invokes_callback_with_target_and_generated_id() {
    let u = Uuid::new_v4();
    let dispatcher = Dispatcher::new(Recorder::new());
    let mut event = EventContext::new("Create")
        .with_input("Target", contact("A"))
        .with_output("id", u);

    dispatcher.handle(&mut event).unwrap();

    assert_eq!(
        dispatcher.executor().calls(),
        vec![Call::Create {
            entity: Some(contact("A")),
            id: u,
            post_image: None,
        }]
    );
}

#[test]
fn update_invokes_callback_with_target_id_and_images() {
    let u2 = Uuid::new_v4();
    let target = Record::with_id("contact", u2).with("name", "B");
    let r1 = Record::with_id("contact", u2).with("name", "A");
    let r2 = Record::with_id("contact", u2).with("name", "B").with("age", 30);

    let dispatcher = Dispatcher::new(Recorder::new());
    let mut event = EventContext::new("Update")
        .with_input("Target", target.clone())
        .with_pre_image("preimage", r1.clone())
        .with_post_image("postimage", r2.clone());

    dispatcher.handle(&mut event).unwrap();

    assert_eq!(
        dispatcher.executor().calls(),
        vec![Call::Update {
            entity: Some(target),
            id: u2,
            pre_image: Some(r1),
            post_image: Some(r2),
        }]
    );
}

#[test]
fn images_under_other_names_are_ignored() {
    let dispatcher = Dispatcher::new(Recorder::new());
    let mut event = EventContext::new("Update")
        .with_input("Target", contact("A"))
        .with_pre_image("before", contact("old"));

    dispatcher.handle(&mut event).unwrap();

    match &dispatcher.executor().calls()[0] {
        Call::Update { pre_image, .. } => assert_eq!(pre_image, &None),
        other => panic!("unexpected call: {other:?}"),
    }
}

#[test]
fn configured_image_names_are_used() {
    let config = PluginConfig::default().with_image_names("before", "after");
    let dispatcher = Dispatcher::with_config(Recorder::new(), config);
    let mut event = EventContext::new("Update")
        .with_input("Target", contact("A"))
        .with_pre_image("before", contact("old"))
        .with_post_image("postimage", contact("ignored"));

    dispatcher.handle(&mut event).unwrap();

    match &dispatcher.executor().calls()[0] {
        Call::Update {
            pre_image,
            post_image,
            ..
        } => {
            assert_eq!(pre_image, &Some(contact("old")));
            assert_eq!(post_image, &None);
        }
        other => panic!("unexpected call: {other:?}"),
    }
}

// ── Routing ──────────────────────────────────────────────────────

#[test]
fn unrouted_message_is_a_silent_no_op() {
    let dispatcher = Dispatcher::new(Recorder::new());
    let mut event = EventContext::new("WhoAmI").with_input("Target", contact("A"));
    let before = event.clone();

    dispatcher.handle(&mut event).unwrap();

    assert!(dispatcher.executor().calls().is_empty());
    assert_eq!(event, before);
}

#[test]
fn set_state_dynamic_entity_shares_set_state_callback() {
    let id = Uuid::new_v4();
    let dispatcher = Dispatcher::new(Recorder::new());
    let mut event = EventContext::new("SetStateDynamicEntity")
        .with_input("EntityMoniker", EntityReference::new("account", id))
        .with_input("State", OptionSetValue::labeled(1, "Inactive"))
        .with_input("Status", 2);

    dispatcher.handle(&mut event).unwrap();

    assert_eq!(
        dispatcher.executor().calls(),
        vec![Call::SetState {
            entity_name: "account".into(),
            id,
            state: OptionSetValue::labeled(1, "Inactive"),
            status: OptionSetValue::new(2),
        }]
    );
}

#[test]
fn retrieve_under_export_parent_goes_to_export_callback() {
    let dispatcher = Dispatcher::new(Recorder::new());
    for parent in ["ExportToExcel", "ExportDynamicToExcel"] {
        let mut event = EventContext::new("RetrieveMultiple")
            .with_input("Query", Query::from(QueryExpression::new("account")))
            .with_parent(EventContext::new(parent));
        dispatcher.handle(&mut event).unwrap();
    }

    let calls = dispatcher.executor().calls();
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|c| matches!(c, Call::ExportToExcel { .. })));
}

#[test]
fn plain_retrieve_goes_to_retrieve_callback() {
    let dispatcher = Dispatcher::new(Recorder::new());
    let mut event = EventContext::new("RetrieveMultiple").with_parent(EventContext::new("Retrieve"));

    dispatcher.handle(&mut event).unwrap();

    assert_eq!(
        dispatcher.executor().calls(),
        vec![Call::RetrieveMultiple {
            query: None,
            collection: None,
        }]
    );
}

#[test]
fn custom_operation_category_builds_generic_request() {
    let target = EntityReference::new("quote", Uuid::new_v4());
    let dispatcher = Dispatcher::new(Recorder::new());
    let mut event = EventContext::new("new_Approve")
        .with_category("CustomOperation")
        .with_input("Comment", "looks fine")
        .with_input("Target", target.clone());

    dispatcher.handle(&mut event).unwrap();

    let calls = dispatcher.executor().calls();
    let Call::CustomOperation { request, target: seen } = &calls[0] else {
        panic!("unexpected call: {:?}", calls[0]);
    };
    assert_eq!(request.request_name, "new_Approve");
    assert_eq!(request.parameters, event.input_parameters);
    assert_eq!(seen.as_ref(), Some(&target));
}

#[test]
fn custom_route_decodes_as_registered_kind() {
    let dispatcher = Dispatcher::builder(Recorder::new())
        .route("new_Approve", MessageKind::CustomOperation)
        .build();
    let mut event = EventContext::new("new_Approve");

    dispatcher.handle(&mut event).unwrap();

    assert!(matches!(
        dispatcher.executor().calls().as_slice(),
        [Call::CustomOperation { target: None, .. }]
    ));
    assert!(dispatcher.table().contains("new_Approve"));
}

#[test]
fn empty_table_routes_nothing() {
    let dispatcher = Dispatcher::builder(Recorder::new())
        .table(DispatchTable::empty())
        .build();
    let mut event = EventContext::new("Create").with_input("Target", contact("A"));

    dispatcher.handle(&mut event).unwrap();

    assert!(dispatcher.executor().calls().is_empty());
}

#[test]
fn standard_table_covers_every_kind_and_alias() {
    let table = DispatchTable::standard();
    for kind in MessageKind::ALL {
        assert_eq!(table.lookup(kind.as_str()), Some(kind));
    }
    assert_eq!(table.lookup("SetStateDynamicEntity"), Some(MessageKind::SetState));
    assert_eq!(table.lookup("ExportDynamicToExcel"), Some(MessageKind::ExportToExcel));
    assert_eq!(table.lookup("create"), None);
    assert_eq!(table.len(), MessageKind::ALL.len() + 2);
    assert_eq!(table.names().count(), table.len());
    assert!(table.names().all(|name| table.contains(name)));
    assert!(table.names().any(|name| name == "SetStateDynamicEntity"));
}

// ── Logging ──────────────────────────────────────────────────────

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn dispatch_logs_message_name_field() {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let dispatcher = Dispatcher::new(Recorder::new());
    let mut routed = EventContext::new("Create").with_input("Target", contact("A"));
    let mut unrouted = EventContext::new("new_DoSomething");

    tracing::subscriber::with_default(subscriber, || {
        dispatcher.handle(&mut routed).unwrap();
        dispatcher.handle(&mut unrouted).unwrap();
    });

    let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
    assert!(output.contains("message_name=Create"));
    assert!(output.contains("message_name=new_DoSomething"));
    assert!(!output.contains(" message="));
}

// ── Convenience overloads ────────────────────────────────────────

#[derive(Default)]
struct ShortForms {
    seen: Mutex<Vec<String>>,
}

impl MessageOperationExecutor for ShortForms {
    type Entity = Record;

    fn on_create(&self, _ctx: &PluginContext<'_>, _entity: Option<Record>, id: Uuid) -> PluginResult {
        self.seen.lock().unwrap().push(format!("create {id}"));
        Ok(())
    }

    fn on_update(&self, _ctx: &PluginContext<'_>, entity: Option<Record>, _id: Uuid) -> PluginResult {
        let name = entity.and_then(|e| e.get_str("name").map(str::to_string));
        self.seen.lock().unwrap().push(format!("update {}", name.unwrap_or_default()));
        Ok(())
    }

    fn on_delete(&self, _ctx: &PluginContext<'_>, entity_name: &str, _id: Uuid) -> PluginResult {
        self.seen.lock().unwrap().push(format!("delete {entity_name}"));
        Ok(())
    }
}

#[test]
fn image_overloads_forward_to_short_forms_by_default() {
    let id = Uuid::new_v4();
    let dispatcher = Dispatcher::new(ShortForms::default());

    let mut create = EventContext::new("Create")
        .with_input("Target", contact("A"))
        .with_output("id", id);
    let mut update = EventContext::new("Update").with_input("Target", contact("B"));
    let mut delete =
        EventContext::new("Delete").with_input("Target", EntityReference::new("lead", Uuid::new_v4()));

    dispatcher.handle(&mut create).unwrap();
    dispatcher.handle(&mut update).unwrap();
    dispatcher.handle(&mut delete).unwrap();

    assert_eq!(
        *dispatcher.executor().seen.lock().unwrap(),
        vec![format!("create {id}"), "update B".to_string(), "delete lead".to_string()]
    );
}

// ── Typed executors ──────────────────────────────────────────────

typed_record!(Contact, "contact");

#[derive(Default)]
struct TypedCreates {
    seen: Mutex<Vec<Contact>>,
}

impl MessageOperationExecutor for TypedCreates {
    type Entity = Contact;

    fn on_create(&self, _ctx: &PluginContext<'_>, entity: Option<Contact>, _id: Uuid) -> PluginResult {
        self.seen.lock().unwrap().extend(entity);
        Ok(())
    }
}

#[test]
fn typed_executor_receives_projected_target() {
    let dispatcher = Dispatcher::new(TypedCreates::default());
    let mut event = EventContext::new("Create").with_input("Target", contact("Ada"));

    dispatcher.handle(&mut event).unwrap();

    let seen = dispatcher.executor().seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].get_str("name"), Some("Ada"));
    assert_eq!(seen[0].as_record(), &contact("Ada"));
    assert!(dispatcher.resolver().knows("contact"));
}

// ── Failures ─────────────────────────────────────────────────────

struct Failing(fn() -> PluginError);

impl MessageOperationExecutor for Failing {
    type Entity = Record;

    fn on_update(&self, _ctx: &PluginContext<'_>, _entity: Option<Record>, _id: Uuid) -> PluginResult {
        Err((self.0)())
    }
}

fn update_event() -> EventContext {
    EventContext::new("Update").with_input("Target", contact("A"))
}

#[test]
fn expected_rejection_renders_without_trace() {
    let dispatcher = Dispatcher::new(Failing(|| PluginError::rejected("X")));

    let failure = dispatcher.handle(&mut update_event()).unwrap_err();

    assert!(failure.expected);
    assert_eq!(failure.message, "Error occured:\nX");
    assert_eq!(failure.code(), -1);
    assert!(matches!(failure.cause, PluginError::Rejected { .. }));
}

#[test]
fn rejection_code_survives_to_boundary() {
    let dispatcher = Dispatcher::new(Failing(|| PluginError::rejected_with_code("quota", 7)));
    let failure = dispatcher.handle(&mut update_event()).unwrap_err();
    assert_eq!(failure.code(), 7);
}

#[test]
fn unexpected_failure_renders_with_trace() {
    let dispatcher = Dispatcher::new(Failing(|| {
        PluginError::Other(anyhow::anyhow!("socket closed").context("Y"))
    }));

    let failure = dispatcher.handle(&mut update_event()).unwrap_err();

    assert!(!failure.expected);
    let expected_prefix = BoundaryFailure::compose("Y", Some("caused by: socket closed"));
    assert!(
        failure.message.starts_with(&expected_prefix),
        "message was {:?}",
        failure.message
    );
}

#[test]
fn missing_required_parameter_is_an_unexpected_failure() {
    let dispatcher = Dispatcher::new(Recorder::new());
    let mut event = EventContext::new("Create");

    let failure = dispatcher.handle(&mut event).unwrap_err();

    assert!(!failure.expected);
    assert!(
        failure
            .message
            .starts_with("Error occured:\nrequired parameter 'Target' is missing\nStackTrace:\n")
    );
    assert!(dispatcher.executor().calls().is_empty());
}

#[test]
fn boundary_failure_exposes_cause_as_source() {
    let dispatcher = Dispatcher::new(Failing(|| PluginError::rejected("X")));
    let failure = dispatcher.handle(&mut update_event()).unwrap_err();
    let source = std::error::Error::source(&failure).map(|s| s.to_string());
    assert_eq!(source.as_deref(), Some("X"));
}

struct CustomHook;

impl MessageOperationExecutor for CustomHook {
    type Entity = Record;

    fn on_update(&self, _ctx: &PluginContext<'_>, _entity: Option<Record>, _id: Uuid) -> PluginResult {
        Err(PluginError::rejected("inner"))
    }

    fn on_exception(&self, error: PluginError) -> BoundaryFailure {
        BoundaryFailure {
            message: format!("[{}] {}", error.code(), error),
            expected: error.is_expected(),
            cause: error,
        }
    }
}

#[test]
fn on_exception_can_be_overridden() {
    let failure = Dispatcher::new(CustomHook).handle(&mut update_event()).unwrap_err();
    assert_eq!(failure.message, "[-1] inner");
}

// ── Output write-back ────────────────────────────────────────────

struct Rewriter {
    fail: bool,
}

impl MessageOperationExecutor for Rewriter {
    type Entity = Record;

    fn on_retrieve_multiple(
        &self,
        _ctx: &PluginContext<'_>,
        query: &mut Option<Query>,
        collection: &mut Option<EntityCollection>,
    ) -> PluginResult {
        if let Some(expression) = query.as_mut().and_then(Query::as_expression_mut) {
            expression.add_condition("statecode", ConditionOperator::Equal, vec![serde_json::json!(0)]);
        }
        if let Some(collection) = collection {
            collection.retain(|r| r.get_str("name") != Some("hidden"));
        }
        if self.fail {
            return Err(PluginError::rejected("stop"));
        }
        Ok(())
    }

    fn on_retrieve_filtered_forms(
        &self,
        _ctx: &PluginContext<'_>,
        _entity_name: &str,
        _user_id: Uuid,
        _form_type: OptionSetValue,
        system_forms: &mut EntityReferenceCollection,
    ) -> PluginResult {
        system_forms.retain(|form| form.name.as_deref() != Some("Legacy"));
        Ok(())
    }
}

fn retrieve_event() -> EventContext {
    EventContext::new("RetrieveMultiple")
        .with_input("Query", Query::from(QueryExpression::new("account")))
        .with_output(
            "BusinessEntityCollection",
            EntityCollection::new("account", vec![contact("shown"), contact("hidden")]),
        )
}

fn written_back(event: &EventContext) -> (usize, usize) {
    let conditions = match event.input_parameters.get("Query") {
        Some(Value::Query(Query::Expression(q))) => q.criteria.conditions.len(),
        other => panic!("unexpected query slot: {other:?}"),
    };
    let rows = event
        .output_parameters
        .get("BusinessEntityCollection")
        .and_then(Value::as_entity_collection)
        .map(EntityCollection::len)
        .unwrap_or_default();
    (conditions, rows)
}

#[test]
fn retrieve_edits_are_written_back() {
    let dispatcher = Dispatcher::new(Rewriter { fail: false });
    let mut event = retrieve_event();

    dispatcher.handle(&mut event).unwrap();

    assert_eq!(written_back(&event), (1, 1));
}

#[test]
fn retrieve_edits_are_written_back_on_failure_too() {
    let dispatcher = Dispatcher::new(Rewriter { fail: true });
    let mut event = retrieve_event();

    assert!(dispatcher.handle(&mut event).is_err());

    assert_eq!(written_back(&event), (1, 1));
}

#[test]
fn filtered_forms_are_written_back() {
    let keep = EntityReference::new("systemform", Uuid::new_v4()).with_name("Main");
    let drop = EntityReference::new("systemform", Uuid::new_v4()).with_name("Legacy");
    let dispatcher = Dispatcher::new(Rewriter { fail: false });
    let mut event = EventContext::new("RetrieveFilteredForms")
        .with_input("EntityLogicalName", "account")
        .with_input("SystemUserId", Uuid::new_v4())
        .with_input("FormType", 2)
        .with_output(
            "SystemForms",
            EntityReferenceCollection::from(vec![keep.clone(), drop]),
        );

    dispatcher.handle(&mut event).unwrap();

    let forms = event
        .output_parameters
        .get("SystemForms")
        .and_then(Value::as_reference_collection)
        .cloned()
        .unwrap();
    assert_eq!(forms.into_inner(), vec![keep]);
}

#[test]
fn untouched_slots_are_left_alone() {
    let dispatcher = Dispatcher::new(Recorder::new());
    let mut event = retrieve_event();
    let before = event.clone();

    dispatcher.handle(&mut event).unwrap();

    assert_eq!(event, before);
}
