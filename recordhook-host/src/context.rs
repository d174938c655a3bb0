//! The per-event view the host hands to the dispatcher.

use recordhook_model::{ParameterCollection, Record};
use recordhook_types::messages::{category, virtual_names};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Pipeline stage the event was raised in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    PreValidation,
    PreOperation,
    MainOperation,
    #[default]
    PostOperation,
}

impl Stage {
    /// Numeric stage as the platform reports it.
    pub fn code(&self) -> i32 {
        match self {
            Self::PreValidation => 10,
            Self::PreOperation => 20,
            Self::MainOperation => 30,
            Self::PostOperation => 40,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Synchronous,
    Asynchronous,
}

/// One host-delivered lifecycle event.
///
/// Owned by the host for the duration of a dispatch. The dispatcher reads
/// it, except for the output slots a callback may rewrite (query, result
/// collection, system forms), which are written back before `handle`
/// returns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventContext {
    pub message_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_category: Option<String>,
    #[serde(default)]
    pub input_parameters: ParameterCollection,
    #[serde(default)]
    pub output_parameters: ParameterCollection,
    #[serde(default)]
    pub pre_images: BTreeMap<String, Record>,
    #[serde(default)]
    pub post_images: BTreeMap<String, Record>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Box<EventContext>>,

    #[serde(default)]
    pub primary_entity_name: String,
    #[serde(default)]
    pub primary_entity_id: Uuid,
    #[serde(default)]
    pub user_id: Uuid,
    #[serde(default)]
    pub initiating_user_id: Uuid,
    #[serde(default)]
    pub stage: Stage,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default = "default_depth")]
    pub depth: u32,
    #[serde(default)]
    pub correlation_id: Uuid,
}

fn default_depth() -> u32 {
    1
}

impl EventContext {
    pub fn new(message_name: impl Into<String>) -> Self {
        Self {
            message_name: message_name.into(),
            depth: default_depth(),
            ..Self::default()
        }
    }

    // ================================================================
    // Builders
    // ================================================================

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.message_category = Some(category.into());
        self
    }

    #[must_use]
    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<recordhook_model::Value>) -> Self {
        self.input_parameters.insert(key, value);
        self
    }

    #[must_use]
    pub fn with_output(mut self, key: impl Into<String>, value: impl Into<recordhook_model::Value>) -> Self {
        self.output_parameters.insert(key, value);
        self
    }

    #[must_use]
    pub fn with_pre_image(mut self, name: impl Into<String>, image: Record) -> Self {
        self.pre_images.insert(name.into(), image);
        self
    }

    #[must_use]
    pub fn with_post_image(mut self, name: impl Into<String>, image: Record) -> Self {
        self.post_images.insert(name.into(), image);
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent: EventContext) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }

    #[must_use]
    pub fn with_primary_entity(mut self, logical_name: impl Into<String>, id: Uuid) -> Self {
        self.primary_entity_name = logical_name.into();
        self.primary_entity_id = id;
        self
    }

    #[must_use]
    pub fn with_users(mut self, user_id: Uuid, initiating_user_id: Uuid) -> Self {
        self.user_id = user_id;
        self.initiating_user_id = initiating_user_id;
        self
    }

    #[must_use]
    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = stage;
        self
    }

    // ================================================================
    // Resolution
    // ================================================================

    /// The operation name used for handler lookup.
    ///
    /// First match wins: the `CustomOperation` category, then a parent
    /// carrying a virtual export name, then the context's own name.
    pub fn effective_message_name(&self) -> &str {
        if self.message_category.as_deref() == Some(category::CUSTOM_OPERATION) {
            return category::CUSTOM_OPERATION;
        }
        match &self.parent {
            Some(parent) if virtual_names::is_virtual(&parent.message_name) => &parent.message_name,
            _ => &self.message_name,
        }
    }

    pub fn pre_image(&self, name: &str) -> Option<&Record> {
        self.pre_images.get(name)
    }

    pub fn post_image(&self, name: &str) -> Option<&Record> {
        self.post_images.get(name)
    }
}
