//! `dsconfig_delegated_admin_resource_rights`: what delegated administrators
//! may do with one REST resource type.

use std::collections::BTreeSet;

use async_trait::async_trait;
use dsconfig_client::{
    models::delegated_admin_resource_rights::*, ApiError, ConfigApi, Operation, UpdateRequest,
};
use dsconfig_resource::{
    attribute_model,
    diagnostics::Diagnostics,
    schema::{Attribute, Schema},
    value::{string_attr, string_set_attr, Attr},
};
use serde_json::json;

use super::{
    id_attribute, optional_string, parse_enum_set, required, required_enum, string_vec,
    ConfigKind, ObjectKeys,
};
use crate::operations::*;

attribute_model! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct DelegatedAdminResourceRightsModel {
        pub id: Attr<String>,
        pub delegated_admin_rights_name: Attr<String>,
        pub rest_resource_type: Attr<String>,
        pub description: Attr<String>,
        pub enabled: Attr<bool>,
        pub admin_permission: Attr<BTreeSet<String>>,
        pub admin_scope: Attr<String>,
        pub resource_subtree: Attr<BTreeSet<String>>,
        pub resources_in_group: Attr<BTreeSet<String>>,
    }
}

pub struct DelegatedAdminResourceRights;

#[async_trait]
impl ConfigKind for DelegatedAdminResourceRights {
    type Model = DelegatedAdminResourceRightsModel;
    type AddRequest = AddDelegatedAdminResourceRightsRequest;
    type Response = DelegatedAdminResourceRightsResponse;

    const KIND: &'static str = "delegated_admin_resource_rights";
    const LIST_NAME: &'static str = "delegated_admin_resource_rights_list";
    const DISPLAY_NAME: &'static str = "Delegated Admin Resource Rights";
    const KEYS: &'static [(&'static str, &'static str)] = &[
        ("delegated_admin_rights_name", "delegated-admin-rights-name"),
        ("rest_resource_type", "rest-resource-type"),
    ];
    const POLYMORPHIC: bool = false;

    fn schema() -> Schema {
        Schema::new("Manages a Delegated Admin Resource Rights.")
            .attribute("id", id_attribute())
            .attribute(
                "delegated_admin_rights_name",
                Attribute::string("Name of the parent Delegated Admin Rights")
                    .required()
                    .requires_replace(),
            )
            .attribute(
                "rest_resource_type",
                Attribute::string(
                    "Specifies the resource type applicable to these Delegated Admin Resource Rights.",
                )
                .required()
                .requires_replace(),
            )
            .attribute(
                "description",
                Attribute::string("A description for this Delegated Admin Resource Rights"),
            )
            .attribute(
                "enabled",
                Attribute::bool(
                    "Indicates whether these Delegated Admin Resource Rights are enabled.",
                )
                .required(),
            )
            .attribute(
                "admin_permission",
                Attribute::string_set(
                    "Specifies administrator(s) permissions.",
                )
                .with_default(json!([]))
                .one_of(DelegatedAdminPermission::VALUES),
            )
            .attribute(
                "admin_scope",
                Attribute::string(
                    "Specifies the scope of these Delegated Admin Resource Rights.",
                )
                .required()
                .one_of(DelegatedAdminScope::VALUES),
            )
            .attribute(
                "resource_subtree",
                Attribute::string_set(
                    "Specifies subtrees within the search base whose entries can be managed by the administrator(s).",
                )
                .with_default(json!([])),
            )
            .attribute(
                "resources_in_group",
                Attribute::string_set(
                    "Specifies groups (DNs) whose members can be managed by the administrator(s).",
                )
                .with_default(json!([])),
            )
    }

    fn build_add_request(
        keys: &ObjectKeys,
        plan: &DelegatedAdminResourceRightsModel,
        diags: &mut Diagnostics,
    ) -> Option<AddDelegatedAdminResourceRightsRequest> {
        let admin_scope = required_enum(diags, "admin_scope", &plan.admin_scope);
        let request = AddDelegatedAdminResourceRightsRequest {
            rest_resource_type: keys.name().to_string(),
            description: optional_string(&plan.description),
            enabled: required(diags, "enabled", &plan.enabled).unwrap_or_default(),
            admin_permission: parse_enum_set(diags, "admin_permission", &plan.admin_permission),
            admin_scope: admin_scope?,
            resource_subtree: string_vec(&plan.resource_subtree),
            resources_in_group: string_vec(&plan.resources_in_group),
        };
        Some(request)
    }

    async fn get(
        api: &dyn ConfigApi,
        keys: &ObjectKeys,
    ) -> Result<DelegatedAdminResourceRightsResponse, ApiError> {
        api.get_delegated_admin_resource_rights(keys.parent(0), keys.name())
            .await
    }

    async fn add(
        api: &dyn ConfigApi,
        keys: &ObjectKeys,
        request: &AddDelegatedAdminResourceRightsRequest,
    ) -> Result<DelegatedAdminResourceRightsResponse, ApiError> {
        api.add_delegated_admin_resource_rights(keys.parent(0), request)
            .await
    }

    async fn update(
        api: &dyn ConfigApi,
        keys: &ObjectKeys,
        request: &UpdateRequest,
    ) -> Result<DelegatedAdminResourceRightsResponse, ApiError> {
        api.update_delegated_admin_resource_rights(keys.parent(0), keys.name(), request)
            .await
    }

    async fn delete(api: &dyn ConfigApi, keys: &ObjectKeys) -> Result<(), ApiError> {
        api.delete_delegated_admin_resource_rights(keys.parent(0), keys.name())
            .await
    }

    async fn list(
        api: &dyn ConfigApi,
        parents: &ObjectKeys,
        filter: Option<&str>,
    ) -> Result<Vec<DelegatedAdminResourceRightsResponse>, ApiError> {
        api.list_delegated_admin_resource_rights(parents.parent(0), filter)
            .await
    }

    fn response_id(response: &DelegatedAdminResourceRightsResponse) -> &str {
        &response.id
    }

    fn read_response(
        response: &DelegatedAdminResourceRightsResponse,
        model: &mut DelegatedAdminResourceRightsModel,
    ) {
        model.id = Attr::Known(response.id.clone());
        model.rest_resource_type = Attr::Known(response.rest_resource_type.clone());
        model.description = string_attr(response.description.as_deref(), &model.description);
        model.enabled = Attr::Known(response.enabled);
        model.admin_permission = Attr::Known(
            response
                .admin_permission
                .iter()
                .map(|p| p.to_string())
                .collect(),
        );
        model.admin_scope = response.admin_scope.map(|s| s.to_string()).into();
        model.resource_subtree = string_set_attr(&response.resource_subtree);
        model.resources_in_group = string_set_attr(&response.resources_in_group);
    }

    fn create_operations(
        plan: &DelegatedAdminResourceRightsModel,
        state: &DelegatedAdminResourceRightsModel,
    ) -> Vec<Operation> {
        let mut ops = Vec::new();
        add_string_operation_if_necessary(&mut ops, &plan.description, &state.description, "description");
        add_bool_operation_if_necessary(&mut ops, &plan.enabled, &state.enabled, "enabled");
        add_string_set_operations_if_necessary(
            &mut ops,
            &plan.admin_permission,
            &state.admin_permission,
            "adminPermission",
        );
        add_string_operation_if_necessary(&mut ops, &plan.admin_scope, &state.admin_scope, "adminScope");
        add_string_set_operations_if_necessary(
            &mut ops,
            &plan.resource_subtree,
            &state.resource_subtree,
            "resourceSubtree",
        );
        add_string_set_operations_if_necessary(
            &mut ops,
            &plan.resources_in_group,
            &state.resources_in_group,
            "resourcesInGroup",
        );
        ops
    }
}
