//! The capability interface: one overridable callback per operation kind.
//!
//! Every method defaults to a no-op, so an executor overrides only the
//! operations it cares about. `Create`, `Update` and `Delete` come in two
//! forms: the image-carrying one is what the dispatcher calls, and by
//! default it forwards to the shorter one.

use crate::error::{BoundaryFailure, PluginError, PluginResult};
use crate::plugin::PluginContext;
use recordhook_model::{EntityCollection, OrganizationRequest, Record, TypedRecord};
use recordhook_types::{AccessRights, EntityReference, EntityReferenceCollection, OptionSetValue, Query};
use uuid::Uuid;

/// Business logic reacting to host record events.
///
/// `Entity` is the shape target records and images are projected into;
/// use [`Record`] to work with generic records.
#[allow(unused_variables)]
pub trait MessageOperationExecutor: Send + Sync {
    type Entity: TypedRecord + 'static;

    // ================================================================
    // Record lifecycle
    // ================================================================

    fn on_create_with_image(
        &self,
        ctx: &PluginContext<'_>,
        entity: Option<Self::Entity>,
        id: Uuid,
        post_image: Option<Self::Entity>,
    ) -> PluginResult {
        self.on_create(ctx, entity, id)
    }

    fn on_create(&self, ctx: &PluginContext<'_>, entity: Option<Self::Entity>, id: Uuid) -> PluginResult {
        Ok(())
    }

    fn on_update_with_images(
        &self,
        ctx: &PluginContext<'_>,
        entity: Option<Self::Entity>,
        id: Uuid,
        pre_image: Option<Self::Entity>,
        post_image: Option<Self::Entity>,
    ) -> PluginResult {
        self.on_update(ctx, entity, id)
    }

    fn on_update(&self, ctx: &PluginContext<'_>, entity: Option<Self::Entity>, id: Uuid) -> PluginResult {
        Ok(())
    }

    fn on_delete_with_image(
        &self,
        ctx: &PluginContext<'_>,
        entity_name: &str,
        id: Uuid,
        pre_image: Option<Self::Entity>,
    ) -> PluginResult {
        self.on_delete(ctx, entity_name, id)
    }

    fn on_delete(&self, ctx: &PluginContext<'_>, entity_name: &str, id: Uuid) -> PluginResult {
        Ok(())
    }

    /// Also receives `SetStateDynamicEntity`.
    fn on_set_state(
        &self,
        ctx: &PluginContext<'_>,
        entity_name: &str,
        id: Uuid,
        state: OptionSetValue,
        status: OptionSetValue,
    ) -> PluginResult {
        Ok(())
    }

    fn on_assign(
        &self,
        ctx: &PluginContext<'_>,
        entity_name: &str,
        id: Uuid,
        assignee_name: &str,
        assignee_id: Uuid,
    ) -> PluginResult {
        Ok(())
    }

    fn on_merge(
        &self,
        ctx: &PluginContext<'_>,
        target: &EntityReference,
        subordinate_id: Uuid,
        update_content: Option<Record>,
        perform_parenting_checks: bool,
    ) -> PluginResult {
        Ok(())
    }

    /// `closed_entity` is the incident resolution or quote close record.
    fn on_close(&self, ctx: &PluginContext<'_>, closed_entity: Option<Record>, status: OptionSetValue) -> PluginResult {
        Ok(())
    }

    fn on_cancel(&self, ctx: &PluginContext<'_>, order_close: Option<Record>, status: OptionSetValue) -> PluginResult {
        Ok(())
    }

    // ================================================================
    // Marketing lists
    // ================================================================

    fn on_add_member(&self, ctx: &PluginContext<'_>, list_id: Uuid, entity_id: Uuid, member_id: Uuid) -> PluginResult {
        Ok(())
    }

    fn on_remove_member(&self, ctx: &PluginContext<'_>, list_id: Uuid, entity_id: Uuid) -> PluginResult {
        Ok(())
    }

    // ================================================================
    // Retrieval
    // ================================================================

    /// Both slots are written back to the event when the callback returns.
    fn on_retrieve_multiple(
        &self,
        ctx: &PluginContext<'_>,
        query: &mut Option<Query>,
        collection: &mut Option<EntityCollection>,
    ) -> PluginResult {
        Ok(())
    }

    /// A bulk retrieve issued by the export-to-spreadsheet feature.
    fn on_export_to_excel(
        &self,
        ctx: &PluginContext<'_>,
        query: &mut Option<Query>,
        collection: &mut Option<EntityCollection>,
    ) -> PluginResult {
        Ok(())
    }

    /// `system_forms` may be filtered in place.
    fn on_retrieve_filtered_forms(
        &self,
        ctx: &PluginContext<'_>,
        entity_name: &str,
        user_id: Uuid,
        form_type: OptionSetValue,
        system_forms: &mut EntityReferenceCollection,
    ) -> PluginResult {
        Ok(())
    }

    // ================================================================
    // Sharing
    // ================================================================

    fn on_grant_access(
        &self,
        ctx: &PluginContext<'_>,
        entity_name: &str,
        id: Uuid,
        principal_name: &str,
        principal_id: Uuid,
        mask: AccessRights,
    ) -> PluginResult {
        Ok(())
    }

    fn on_modify_access(
        &self,
        ctx: &PluginContext<'_>,
        entity_name: &str,
        id: Uuid,
        principal_name: &str,
        principal_id: Uuid,
        mask: AccessRights,
    ) -> PluginResult {
        Ok(())
    }

    fn on_revoke_access(
        &self,
        ctx: &PluginContext<'_>,
        entity_name: &str,
        id: Uuid,
        revokee_name: &str,
        revokee_id: Uuid,
    ) -> PluginResult {
        Ok(())
    }

    // ================================================================
    // Custom operations & failures
    // ================================================================

    /// `target` is set when the request carried a `Target` reference.
    fn on_custom_operation(
        &self,
        ctx: &PluginContext<'_>,
        request: &OrganizationRequest,
        target: Option<&EntityReference>,
    ) -> PluginResult {
        Ok(())
    }

    /// Turns a failed dispatch into the failure raised to the host.
    fn on_exception(&self, error: PluginError) -> BoundaryFailure {
        BoundaryFailure::from_error(error)
    }
}
