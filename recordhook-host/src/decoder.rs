//! Projects an [`EventContext`]'s loosely-typed parameter bag into the
//! fields each operation kind needs.
//!
//! Decoding is pure: it reads the context and never mutates it. Required
//! keys that are absent fail with [`DecodeError::MissingParameter`];
//! record-typed fields of the wrong shape decode to `None`, every other
//! wrong shape fails with [`DecodeError::UnexpectedType`].

use crate::context::EventContext;
use crate::dispatch::MessageKind;
use crate::error::DecodeError;
use recordhook_model::{
    EntityCollection, OrganizationRequest, ParameterCollection, Record, TypedRecord, Value, coerce,
};
use recordhook_types::messages::params;
use recordhook_types::{AccessRights, EntityReference, EntityReferenceCollection, OptionSetValue, Query};
use std::collections::BTreeMap;
use uuid::Uuid;

type DecodeResult<T> = Result<T, DecodeError>;

// ================================================================
// Decoded parameter sets
// ================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct CreateParameters<T> {
    pub target: Option<T>,
    /// Generated id from the output `id`; nil before the record exists.
    pub id: Uuid,
    pub post_image: Option<T>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateParameters<T> {
    pub target: Option<T>,
    pub id: Uuid,
    pub pre_image: Option<T>,
    pub post_image: Option<T>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteParameters<T> {
    pub entity_name: String,
    pub id: Uuid,
    pub pre_image: Option<T>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetStateParameters {
    pub entity_name: String,
    pub id: Uuid,
    pub state: OptionSetValue,
    pub status: OptionSetValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignParameters {
    pub target: EntityReference,
    pub assignee: EntityReference,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeParameters {
    pub target: EntityReference,
    pub subordinate_id: Uuid,
    pub update_content: Option<Record>,
    pub perform_parenting_checks: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddMemberParameters {
    pub list_id: Uuid,
    pub entity_id: Uuid,
    /// Id of the created list-member row, from the output `id`.
    pub member_id: Uuid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoveMemberParameters {
    pub list_id: Uuid,
    pub entity_id: Uuid,
}

/// Shared by `RetrieveMultiple` and both export kinds.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrieveMultipleParameters {
    pub query: Option<Query>,
    /// Absent before the host executed the query.
    pub collection: Option<EntityCollection>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CloseParameters {
    pub closed_entity: Option<Record>,
    pub status: OptionSetValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CancelParameters {
    pub order_close: Option<Record>,
    pub status: OptionSetValue,
}

/// Shared by `GrantAccess` and `ModifyAccess`.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessParameters {
    pub target: EntityReference,
    pub principal: EntityReference,
    pub mask: AccessRights,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RevokeAccessParameters {
    pub target: EntityReference,
    pub revokee: EntityReference,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilteredFormsParameters {
    pub entity_name: String,
    pub user_id: Uuid,
    pub form_type: OptionSetValue,
    pub system_forms: EntityReferenceCollection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomOperationParameters {
    pub request: OrganizationRequest,
    pub target: Option<EntityReference>,
}

/// The decoded fields of one dispatch, tagged by operation kind.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedParameters<T> {
    Create(CreateParameters<T>),
    Update(UpdateParameters<T>),
    Delete(DeleteParameters<T>),
    SetState(SetStateParameters),
    Assign(AssignParameters),
    Merge(MergeParameters),
    AddMember(AddMemberParameters),
    RemoveMember(RemoveMemberParameters),
    RetrieveMultiple(RetrieveMultipleParameters),
    ExportToExcel(RetrieveMultipleParameters),
    Close(CloseParameters),
    Cancel(CancelParameters),
    GrantAccess(AccessParameters),
    ModifyAccess(AccessParameters),
    RevokeAccess(RevokeAccessParameters),
    RetrieveFilteredForms(FilteredFormsParameters),
    CustomOperation(CustomOperationParameters),
}

// ================================================================
// Decoder
// ================================================================

/// Reads one event's parameters on behalf of a dispatch.
pub struct ParameterDecoder<'a> {
    event: &'a EventContext,
    pre_image_name: &'a str,
    post_image_name: &'a str,
}

impl<'a> ParameterDecoder<'a> {
    pub fn new(event: &'a EventContext, pre_image_name: &'a str, post_image_name: &'a str) -> Self {
        Self {
            event,
            pre_image_name,
            post_image_name,
        }
    }

    /// Decodes the fields `kind` needs. Fails as a whole if any required
    /// field fails.
    pub fn decode<T: TypedRecord>(&self, kind: MessageKind) -> DecodeResult<DecodedParameters<T>> {
        let decoded = match kind {
            MessageKind::Create => DecodedParameters::Create(CreateParameters {
                target: self.target_record()?,
                id: self.output_id()?,
                post_image: self.image(&self.event.post_images, self.post_image_name),
            }),
            MessageKind::Update => {
                let target: Option<T> = self.target_record()?;
                DecodedParameters::Update(UpdateParameters {
                    id: target.as_ref().map(|t| t.id()).unwrap_or_default(),
                    target,
                    pre_image: self.image(&self.event.pre_images, self.pre_image_name),
                    post_image: self.image(&self.event.post_images, self.post_image_name),
                })
            }
            MessageKind::Delete => {
                let target = self.reference(params::TARGET)?;
                DecodedParameters::Delete(DeleteParameters {
                    entity_name: target.logical_name,
                    id: target.id,
                    pre_image: self.image(&self.event.pre_images, self.pre_image_name),
                })
            }
            MessageKind::SetState => {
                let moniker = self.reference(params::ENTITY_MONIKER)?;
                DecodedParameters::SetState(SetStateParameters {
                    entity_name: moniker.logical_name,
                    id: moniker.id,
                    state: self.option(params::STATE)?,
                    status: self.option(params::STATUS)?,
                })
            }
            MessageKind::Assign => DecodedParameters::Assign(AssignParameters {
                target: self.reference(params::TARGET)?,
                assignee: self.reference(params::ASSIGNEE)?,
            }),
            MessageKind::Merge => DecodedParameters::Merge(MergeParameters {
                target: self.reference(params::TARGET)?,
                subordinate_id: self.optional_guid(self.inputs(), params::SUBORDINATE_ID)?,
                update_content: self.required(params::UPDATE_CONTENT)?.as_record().cloned(),
                perform_parenting_checks: self.flag(params::PERFORM_PARENTING_CHECKS)?,
            }),
            MessageKind::AddMember => DecodedParameters::AddMember(AddMemberParameters {
                list_id: self.optional_guid(self.inputs(), params::LIST_ID)?,
                entity_id: self.optional_guid(self.inputs(), params::ENTITY_ID)?,
                member_id: self.output_id()?,
            }),
            MessageKind::RemoveMember => DecodedParameters::RemoveMember(RemoveMemberParameters {
                list_id: self.optional_guid(self.inputs(), params::LIST_ID)?,
                entity_id: self.optional_guid(self.inputs(), params::ENTITY_ID)?,
            }),
            MessageKind::RetrieveMultiple => DecodedParameters::RetrieveMultiple(self.retrieve_multiple()?),
            MessageKind::ExportToExcel => DecodedParameters::ExportToExcel(self.retrieve_multiple()?),
            MessageKind::Close => DecodedParameters::Close(CloseParameters {
                closed_entity: self.closed_entity()?,
                status: self.option(params::STATUS)?,
            }),
            MessageKind::Cancel => DecodedParameters::Cancel(CancelParameters {
                order_close: self.required(params::ORDER_CLOSE)?.as_record().cloned(),
                status: self.option(params::STATUS)?,
            }),
            MessageKind::GrantAccess => DecodedParameters::GrantAccess(self.access()?),
            MessageKind::ModifyAccess => DecodedParameters::ModifyAccess(self.access()?),
            MessageKind::RevokeAccess => DecodedParameters::RevokeAccess(RevokeAccessParameters {
                target: self.reference(params::TARGET)?,
                revokee: self.reference(params::REVOKEE)?,
            }),
            MessageKind::RetrieveFilteredForms => {
                DecodedParameters::RetrieveFilteredForms(FilteredFormsParameters {
                    entity_name: self.string(params::ENTITY_LOGICAL_NAME)?,
                    user_id: self.required_guid(params::SYSTEM_USER_ID)?,
                    form_type: self.option(params::FORM_TYPE)?,
                    system_forms: self.system_forms()?,
                })
            }
            MessageKind::CustomOperation => {
                DecodedParameters::CustomOperation(CustomOperationParameters {
                    request: OrganizationRequest::new(&self.event.message_name)
                        .with_parameters(self.event.input_parameters.clone()),
                    target: self
                        .inputs()
                        .get(params::TARGET)
                        .and_then(Value::as_reference)
                        .cloned(),
                })
            }
        };
        Ok(decoded)
    }

    // ── field readers ────────────────────────────────────────────

    fn inputs(&self) -> &'a ParameterCollection {
        &self.event.input_parameters
    }

    fn required(&self, key: &'static str) -> DecodeResult<&'a Value> {
        self.inputs()
            .get(key)
            .ok_or(DecodeError::MissingParameter { key })
    }

    fn target_record<T: TypedRecord>(&self) -> DecodeResult<Option<T>> {
        self.required(params::TARGET).map(coerce::<T>)
    }

    fn image<T: TypedRecord>(&self, images: &BTreeMap<String, Record>, name: &str) -> Option<T> {
        images.get(name).cloned().map(T::from_record)
    }

    fn reference(&self, key: &'static str) -> DecodeResult<EntityReference> {
        let value = self.required(key)?;
        value
            .as_reference()
            .cloned()
            .ok_or_else(|| mismatch(key, "entity_reference", value))
    }

    /// Labeled options pass through; bare numbers get an empty label.
    fn option(&self, key: &'static str) -> DecodeResult<OptionSetValue> {
        let value = self.required(key)?;
        value
            .to_option_set()
            .map_err(|_| mismatch(key, "option_set", value))
    }

    fn flag(&self, key: &'static str) -> DecodeResult<bool> {
        let value = self.required(key)?;
        value.as_bool().ok_or_else(|| mismatch(key, "bool", value))
    }

    fn string(&self, key: &'static str) -> DecodeResult<String> {
        let value = self.required(key)?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| mismatch(key, "string", value))
    }

    fn required_guid(&self, key: &'static str) -> DecodeResult<Uuid> {
        let value = self.required(key)?;
        value.to_guid().map_err(|_| mismatch(key, "guid", value))
    }

    /// Absent or null reads as the nil id.
    fn optional_guid(&self, bag: &ParameterCollection, key: &'static str) -> DecodeResult<Uuid> {
        match bag.get(key) {
            None | Some(Value::Null) => Ok(Uuid::nil()),
            Some(value) => value.to_guid().map_err(|_| mismatch(key, "guid", value)),
        }
    }

    fn output_id(&self) -> DecodeResult<Uuid> {
        self.optional_guid(&self.event.output_parameters, params::ID)
    }

    fn retrieve_multiple(&self) -> DecodeResult<RetrieveMultipleParameters> {
        let query = match self.inputs().get(params::QUERY) {
            None | Some(Value::Null) => None,
            Some(value) => Some(
                value
                    .as_query()
                    .cloned()
                    .ok_or_else(|| mismatch(params::QUERY, "query", value))?,
            ),
        };
        let collection = match self.event.output_parameters.get(params::BUSINESS_ENTITY_COLLECTION) {
            None | Some(Value::Null) => None,
            Some(value) => Some(
                value
                    .as_entity_collection()
                    .cloned()
                    .ok_or_else(|| mismatch(params::BUSINESS_ENTITY_COLLECTION, "entity_collection", value))?,
            ),
        };
        Ok(RetrieveMultipleParameters { query, collection })
    }

    /// `IncidentResolution` wins when present; otherwise `QuoteClose` is required.
    fn closed_entity(&self) -> DecodeResult<Option<Record>> {
        let value = match self.inputs().get(params::INCIDENT_RESOLUTION) {
            Some(value) => value,
            None => self.required(params::QUOTE_CLOSE)?,
        };
        Ok(value.as_record().cloned())
    }

    fn access(&self) -> DecodeResult<AccessParameters> {
        let target = self.reference(params::TARGET)?;
        let value = self.required(params::PRINCIPAL_ACCESS)?;
        let access = value
            .as_principal_access()
            .ok_or_else(|| mismatch(params::PRINCIPAL_ACCESS, "principal_access", value))?;
        Ok(AccessParameters {
            target,
            principal: access.principal.clone(),
            mask: access.access_mask,
        })
    }

    fn system_forms(&self) -> DecodeResult<EntityReferenceCollection> {
        let key = params::SYSTEM_FORMS;
        let value = self
            .event
            .output_parameters
            .get(key)
            .ok_or(DecodeError::MissingParameter { key })?;
        value
            .as_reference_collection()
            .cloned()
            .ok_or_else(|| mismatch(key, "entity_reference_collection", value))
    }
}

fn mismatch(key: &'static str, expected: &'static str, value: &Value) -> DecodeError {
    DecodeError::UnexpectedType {
        key,
        expected,
        found: value.type_name(),
    }
}
