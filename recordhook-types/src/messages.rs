//! Message names the host may deliver.
//!
//! Only a subset has a decoding rule in the dispatcher; the rest are listed
//! so integrations can register custom routes without spelling mistakes.

/// Primitive platform messages.
pub mod platform {
    pub const ADD_ITEM: &str = "AddItem";
    pub const ADD_MEMBER: &str = "AddMember";
    pub const ADD_MEMBERS: &str = "AddMembers";
    pub const ADD_MEMBERS_BY_FETCH_XML: &str = "AddMembersByFetchXml";
    pub const ASSIGN: &str = "Assign";
    pub const BOOK: &str = "Book";
    pub const CANCEL: &str = "Cancel";
    pub const CLONE: &str = "Clone";
    pub const CLOSE: &str = "Close";
    pub const COMPOUND_CREATE: &str = "CompoundCreate";
    pub const CREATE: &str = "Create";
    pub const DELETE: &str = "Delete";
    pub const DELIVER_INCOMING: &str = "DeliverIncoming";
    pub const DELIVER_PROMOTE: &str = "DeliverPromote";
    pub const EXECUTE_WORKFLOW: &str = "ExecuteWorkflow";
    pub const GRANT_ACCESS: &str = "GrantAccess";
    pub const HANDLE: &str = "Handle";
    pub const LOSE: &str = "Lose";
    pub const MERGE: &str = "Merge";
    pub const MODIFY_ACCESS: &str = "ModifyAccess";
    pub const REMOVE_ITEM: &str = "RemoveItem";
    pub const REMOVE_MEMBER: &str = "RemoveMember";
    pub const REMOVE_MEMBERS: &str = "RemoveMembers";
    pub const REMOVE_MEMBERS_BY_FETCH_XML: &str = "RemoveMembersByFetchXml";
    pub const RESCHEDULE: &str = "Reschedule";
    pub const RETRIEVE: &str = "Retrieve";
    pub const RETRIEVE_EXCHANGE_RATE: &str = "RetrieveExchangeRate";
    pub const RETRIEVE_FILTERED_FORMS: &str = "RetrieveFilteredForms";
    pub const RETRIEVE_MULTIPLE: &str = "RetrieveMultiple";
    pub const RETRIEVE_PRINCIPAL_ACCESS: &str = "RetrievePrincipalAccess";
    pub const RETRIEVE_SHARED_PRINCIPALS_AND_ACCESS: &str = "RetrieveSharedPrincipalsAndAccess";
    pub const REVOKE_ACCESS: &str = "RevokeAccess";
    pub const ROUTE: &str = "Route";
    pub const SEND: &str = "Send";
    pub const SET_STATE: &str = "SetState";
    pub const SET_STATE_DYNAMIC_ENTITY: &str = "SetStateDynamicEntity";
    pub const UPDATE: &str = "Update";
    pub const WIN: &str = "Win";
}

/// Names that only exist as the parent of a primitive bulk retrieve.
pub mod virtual_names {
    pub const EXPORT_TO_EXCEL: &str = "ExportToExcel";
    pub const EXPORT_DYNAMIC_TO_EXCEL: &str = "ExportDynamicToExcel";

    /// Both export names, in lookup order.
    pub const ALL: [&str; 2] = [EXPORT_TO_EXCEL, EXPORT_DYNAMIC_TO_EXCEL];

    pub fn is_virtual(name: &str) -> bool {
        ALL.contains(&name)
    }
}

/// Category tags attached to a context instead of a fixed name.
pub mod category {
    pub const CUSTOM_OPERATION: &str = "CustomOperation";
}

/// Well-known parameter keys.
pub mod params {
    pub const TARGET: &str = "Target";
    pub const ID: &str = "id";
    pub const ENTITY_MONIKER: &str = "EntityMoniker";
    pub const STATE: &str = "State";
    pub const STATUS: &str = "Status";
    pub const ASSIGNEE: &str = "Assignee";
    pub const SUBORDINATE_ID: &str = "SubordinateId";
    pub const UPDATE_CONTENT: &str = "UpdateContent";
    pub const PERFORM_PARENTING_CHECKS: &str = "PerformParentingChecks";
    pub const LIST_ID: &str = "ListId";
    pub const ENTITY_ID: &str = "EntityId";
    pub const QUERY: &str = "Query";
    pub const BUSINESS_ENTITY_COLLECTION: &str = "BusinessEntityCollection";
    pub const INCIDENT_RESOLUTION: &str = "IncidentResolution";
    pub const QUOTE_CLOSE: &str = "QuoteClose";
    pub const ORDER_CLOSE: &str = "OrderClose";
    pub const PRINCIPAL_ACCESS: &str = "PrincipalAccess";
    pub const REVOKEE: &str = "Revokee";
    pub const ENTITY_LOGICAL_NAME: &str = "EntityLogicalName";
    pub const SYSTEM_USER_ID: &str = "SystemUserId";
    pub const FORM_TYPE: &str = "FormType";
    pub const SYSTEM_FORMS: &str = "SystemForms";
}
