//! Replay harness for recordhook.
//!
//! Loads a serialized [`EventContext`], runs it through a [`Dispatcher`]
//! backed by an in-memory organization service and reports what happened:
//! the effective message, any boundary failure, the diagnostic lines the
//! plugin traced and the records it wrote.

use anyhow::{Context, Result};
use recordhook_host::{
    Dispatcher, EventContext, InMemoryServiceFactory, MemoryTracingService, MessageOperationExecutor,
    PluginContext, PluginError, PluginResult, ServiceProvider,
};
use recordhook_model::Record;
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Logical name of the records [`TraceAllUpdates`] writes.
pub const TRACE_ENTITY: &str = "rare_trace";
/// Attribute holding the trace text.
pub const TRACE_MESSAGE_ATTRIBUTE: &str = "rare_tracemessage";

const ACTIVE_STATE: i32 = 0;

// ================================================================
// Executors
// ================================================================

/// Writes a trace record for every update and echoes it to the host sink.
#[derive(Debug, Default)]
pub struct TraceAllUpdates;

impl MessageOperationExecutor for TraceAllUpdates {
    type Entity = Record;

    fn on_update(&self, ctx: &PluginContext<'_>, entity: Option<Record>, id: Uuid) -> PluginResult {
        let logical_name = entity
            .as_ref()
            .map(|e| e.logical_name().to_string())
            .unwrap_or_else(|| ctx.event().primary_entity_name.clone());
        let message = format!("Entity '{logical_name}', Id = '{id}' updated");

        let trace = Record::new(TRACE_ENTITY).with(TRACE_MESSAGE_ATTRIBUTE, message.as_str());
        ctx.system_service()?.create(trace)?;
        ctx.trace(&message);
        Ok(())
    }
}

/// Refuses to delete records whose pre-image is still active.
#[derive(Debug, Default)]
pub struct DenyActiveDeletion;

impl MessageOperationExecutor for DenyActiveDeletion {
    type Entity = Record;

    fn on_delete_with_image(
        &self,
        _ctx: &PluginContext<'_>,
        entity_name: &str,
        id: Uuid,
        pre_image: Option<Record>,
    ) -> PluginResult {
        let active = pre_image
            .as_ref()
            .and_then(|image| image.get("statecode"))
            .and_then(|state| state.to_option_set().ok())
            .is_some_and(|state| state.value == ACTIVE_STATE);
        if active {
            debug!(%entity_name, %id, "Refusing to delete active record");
            return Err(PluginError::rejected(format!(
                "Deletion of active {entity_name} records is forbidden!"
            )));
        }
        Ok(())
    }
}

// ================================================================
// Loading
// ================================================================

/// Reads an event from `source`, a file path or `-` for stdin.
pub fn load_event(source: &str) -> Result<EventContext> {
    let json = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read event from stdin")?;
        buf
    } else {
        std::fs::read_to_string(source).with_context(|| format!("Failed to read event file {source}"))?
    };
    parse_event(&json)
}

pub fn parse_event(json: &str) -> Result<EventContext> {
    serde_json::from_str(json).context("Failed to decode event context")
}

/// Reads a JSON array of records used to seed the organization service.
pub fn load_records(path: &Path) -> Result<Vec<Record>> {
    let json = std::fs::read_to_string(path).with_context(|| format!("Failed to read seed file {path:?}"))?;
    serde_json::from_str(&json).context("Failed to decode seed records")
}

// ================================================================
// Replay
// ================================================================

/// What a replayed dispatch did.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayOutcome {
    pub message: String,
    pub effective_message: String,
    pub routed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<ReplayFailure>,
    pub traces: Vec<String>,
    /// Store contents after the dispatch, seeds included.
    pub records: Vec<Record>,
    /// The event as the dispatcher left it.
    pub event: EventContext,
}

impl ReplayOutcome {
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayFailure {
    pub message: String,
    pub expected: bool,
    pub code: i32,
}

/// Dispatches `event` once against a fresh in-memory store seeded with `seed`.
pub fn replay<E: MessageOperationExecutor>(
    dispatcher: &Dispatcher<E>,
    mut event: EventContext,
    seed: Vec<Record>,
) -> ReplayOutcome {
    let store = InMemoryServiceFactory::new();
    for record in seed {
        store.seed(record);
    }
    let sink = Arc::new(MemoryTracingService::new());
    let services = ServiceProvider::new()
        .with_organization_factory(Arc::new(store.clone()))
        .with_tracing(sink.clone());

    let message = event.message_name.clone();
    let effective_message = event.effective_message_name().to_string();
    let routed = dispatcher.table().contains(&effective_message);
    info!(message_name = %message, %effective_message, routed, "Replaying event");

    let failure = dispatcher
        .handle_with(&services, &mut event)
        .err()
        .map(|failure| ReplayFailure {
            code: failure.code(),
            expected: failure.expected,
            message: failure.message,
        });

    ReplayOutcome {
        message,
        effective_message,
        routed,
        failure,
        traces: sink.lines(),
        records: store.records(),
        event,
    }
}

/// Messages of the trace records among `records`.
pub fn trace_messages(records: &[Record]) -> Vec<String> {
    records
        .iter()
        .filter(|r| r.logical_name() == TRACE_ENTITY)
        .filter_map(|r| r.get_str(TRACE_MESSAGE_ATTRIBUTE).map(str::to_string))
        .collect()
}
