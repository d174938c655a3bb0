//! Shared test helpers for dispatcher tests.

#![allow(dead_code)]

use recordhook_host::{MessageOperationExecutor, PluginContext, PluginResult};
use recordhook_model::{EntityCollection, OrganizationRequest, Record};
use recordhook_types::{
    AccessRights, EntityReference, EntityReferenceCollection, OptionSetValue, Query,
};
use std::sync::Mutex;
use uuid::Uuid;

/// One observed callback invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create {
        entity: Option<Record>,
        id: Uuid,
        post_image: Option<Record>,
    },
    Update {
        entity: Option<Record>,
        id: Uuid,
        pre_image: Option<Record>,
        post_image: Option<Record>,
    },
    Delete {
        entity_name: String,
        id: Uuid,
        pre_image: Option<Record>,
    },
    SetState {
        entity_name: String,
        id: Uuid,
        state: OptionSetValue,
        status: OptionSetValue,
    },
    Assign {
        entity_name: String,
        id: Uuid,
        assignee_name: String,
        assignee_id: Uuid,
    },
    Merge {
        target: EntityReference,
        subordinate_id: Uuid,
        update_content: Option<Record>,
        perform_parenting_checks: bool,
    },
    AddMember {
        list_id: Uuid,
        entity_id: Uuid,
        member_id: Uuid,
    },
    RemoveMember {
        list_id: Uuid,
        entity_id: Uuid,
    },
    RetrieveMultiple {
        query: Option<Query>,
        collection: Option<EntityCollection>,
    },
    ExportToExcel {
        query: Option<Query>,
        collection: Option<EntityCollection>,
    },
    Close {
        closed_entity: Option<Record>,
        status: OptionSetValue,
    },
    Cancel {
        order_close: Option<Record>,
        status: OptionSetValue,
    },
    GrantAccess {
        entity_name: String,
        id: Uuid,
        principal_name: String,
        principal_id: Uuid,
        mask: AccessRights,
    },
    ModifyAccess {
        entity_name: String,
        id: Uuid,
        principal_name: String,
        principal_id: Uuid,
        mask: AccessRights,
    },
    RevokeAccess {
        entity_name: String,
        id: Uuid,
        revokee_name: String,
        revokee_id: Uuid,
    },
    RetrieveFilteredForms {
        entity_name: String,
        user_id: Uuid,
        form_type: OptionSetValue,
        system_forms: EntityReferenceCollection,
    },
    CustomOperation {
        request: OrganizationRequest,
        target: Option<EntityReference>,
    },
}

/// Records every callback it receives.
#[derive(Debug, Default)]
pub struct Recorder {
    calls: Mutex<Vec<Call>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn push(&self, call: Call) -> PluginResult {
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

impl MessageOperationExecutor for Recorder {
    type Entity = Record;

    fn on_create_with_image(
        &self,
        _ctx: &PluginContext<'_>,
        entity: Option<Record>,
        id: Uuid,
        post_image: Option<Record>,
    ) -> PluginResult {
        self.push(Call::Create {
            entity,
            id,
            post_image,
        })
    }

    fn on_update_with_images(
        &self,
        _ctx: &PluginContext<'_>,
        entity: Option<Record>,
        id: Uuid,
        pre_image: Option<Record>,
        post_image: Option<Record>,
    ) -> PluginResult {
        self.push(Call::Update {
            entity,
            id,
            pre_image,
            post_image,
        })
    }

    fn on_delete_with_image(
        &self,
        _ctx: &PluginContext<'_>,
        entity_name: &str,
        id: Uuid,
        pre_image: Option<Record>,
    ) -> PluginResult {
        self.push(Call::Delete {
            entity_name: entity_name.to_string(),
            id,
            pre_image,
        })
    }

    fn on_set_state(
        &self,
        _ctx: &PluginContext<'_>,
        entity_name: &str,
        id: Uuid,
        state: OptionSetValue,
        status: OptionSetValue,
    ) -> PluginResult {
        self.push(Call::SetState {
            entity_name: entity_name.to_string(),
            id,
            state,
            status,
        })
    }

    fn on_assign(
        &self,
        _ctx: &PluginContext<'_>,
        entity_name: &str,
        id: Uuid,
        assignee_name: &str,
        assignee_id: Uuid,
    ) -> PluginResult {
        self.push(Call::Assign {
            entity_name: entity_name.to_string(),
            id,
            assignee_name: assignee_name.to_string(),
            assignee_id,
        })
    }

    fn on_merge(
        &self,
        _ctx: &PluginContext<'_>,
        target: &EntityReference,
        subordinate_id: Uuid,
        update_content: Option<Record>,
        perform_parenting_checks: bool,
    ) -> PluginResult {
        self.push(Call::Merge {
            target: target.clone(),
            subordinate_id,
            update_content,
            perform_parenting_checks,
        })
    }

    fn on_close(&self, _ctx: &PluginContext<'_>, closed_entity: Option<Record>, status: OptionSetValue) -> PluginResult {
        self.push(Call::Close {
            closed_entity,
            status,
        })
    }

    fn on_cancel(&self, _ctx: &PluginContext<'_>, order_close: Option<Record>, status: OptionSetValue) -> PluginResult {
        self.push(Call::Cancel {
            order_close,
            status,
        })
    }

    fn on_add_member(&self, _ctx: &PluginContext<'_>, list_id: Uuid, entity_id: Uuid, member_id: Uuid) -> PluginResult {
        self.push(Call::AddMember {
            list_id,
            entity_id,
            member_id,
        })
    }

    fn on_remove_member(&self, _ctx: &PluginContext<'_>, list_id: Uuid, entity_id: Uuid) -> PluginResult {
        self.push(Call::RemoveMember { list_id, entity_id })
    }

    fn on_retrieve_multiple(
        &self,
        _ctx: &PluginContext<'_>,
        query: &mut Option<Query>,
        collection: &mut Option<EntityCollection>,
    ) -> PluginResult {
        self.push(Call::RetrieveMultiple {
            query: query.clone(),
            collection: collection.clone(),
        })
    }

    fn on_export_to_excel(
        &self,
        _ctx: &PluginContext<'_>,
        query: &mut Option<Query>,
        collection: &mut Option<EntityCollection>,
    ) -> PluginResult {
        self.push(Call::ExportToExcel {
            query: query.clone(),
            collection: collection.clone(),
        })
    }

    fn on_retrieve_filtered_forms(
        &self,
        _ctx: &PluginContext<'_>,
        entity_name: &str,
        user_id: Uuid,
        form_type: OptionSetValue,
        system_forms: &mut EntityReferenceCollection,
    ) -> PluginResult {
        self.push(Call::RetrieveFilteredForms {
            entity_name: entity_name.to_string(),
            user_id,
            form_type,
            system_forms: system_forms.clone(),
        })
    }

    fn on_grant_access(
        &self,
        _ctx: &PluginContext<'_>,
        entity_name: &str,
        id: Uuid,
        principal_name: &str,
        principal_id: Uuid,
        mask: AccessRights,
    ) -> PluginResult {
        self.push(Call::GrantAccess {
            entity_name: entity_name.to_string(),
            id,
            principal_name: principal_name.to_string(),
            principal_id,
            mask,
        })
    }

    fn on_modify_access(
        &self,
        _ctx: &PluginContext<'_>,
        entity_name: &str,
        id: Uuid,
        principal_name: &str,
        principal_id: Uuid,
        mask: AccessRights,
    ) -> PluginResult {
        self.push(Call::ModifyAccess {
            entity_name: entity_name.to_string(),
            id,
            principal_name: principal_name.to_string(),
            principal_id,
            mask,
        })
    }

    fn on_revoke_access(
        &self,
        _ctx: &PluginContext<'_>,
        entity_name: &str,
        id: Uuid,
        revokee_name: &str,
        revokee_id: Uuid,
    ) -> PluginResult {
        self.push(Call::RevokeAccess {
            entity_name: entity_name.to_string(),
            id,
            revokee_name: revokee_name.to_string(),
            revokee_id,
        })
    }

    fn on_custom_operation(
        &self,
        _ctx: &PluginContext<'_>,
        request: &OrganizationRequest,
        target: Option<&EntityReference>,
    ) -> PluginResult {
        self.push(Call::CustomOperation {
            request: request.clone(),
            target: target.cloned(),
        })
    }
}

pub fn contact(name: &str) -> Record {
    Record::new("contact").with("name", name)
}
