//! Delegated admin resource rights: what a delegated administrator may do with
//! one REST resource type. Nested below a delegated admin rights object and
//! keyed by the REST resource type's name.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::decode_all;
use crate::{api::ConfigApi, error::ApiError, operation::UpdateRequest, path::ObjectPath};

config_enum! {
    pub enum DelegatedAdminPermission {
        Create => "create",
        Read => "read",
        Update => "update",
        Delete => "delete",
        ManageGroupMembership => "manage-group-membership",
        Upload => "upload",
        Download => "download",
    }
}

config_enum! {
    pub enum DelegatedAdminScope {
        AllResourcesInBase => "all-resources-in-base",
        ResourcesInSpecificSubtrees => "resources-in-specific-subtrees",
        ResourcesInSpecificGroups => "resources-in-specific-groups",
    }
}

pub fn delegated_admin_resource_rights_collection(rights_name: &str) -> ObjectPath {
    ObjectPath::collection("delegated-admin-rights")
        .join(rights_name)
        .join("delegated-admin-resource-rights")
}

pub fn delegated_admin_resource_rights_path(rights_name: &str, rest_resource_type: &str) -> ObjectPath {
    delegated_admin_resource_rights_collection(rights_name).join(rest_resource_type)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddDelegatedAdminResourceRightsRequest {
    pub rest_resource_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub admin_permission: Vec<DelegatedAdminPermission>,
    pub admin_scope: DelegatedAdminScope,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resource_subtree: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resources_in_group: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegatedAdminResourceRightsResponse {
    pub id: String,
    pub rest_resource_type: String,
    pub description: Option<String>,
    pub enabled: bool,
    #[serde(default)]
    pub admin_permission: Vec<DelegatedAdminPermission>,
    pub admin_scope: Option<DelegatedAdminScope>,
    #[serde(default)]
    pub resource_subtree: Vec<String>,
    #[serde(default)]
    pub resources_in_group: Vec<String>,
}

impl DelegatedAdminResourceRightsResponse {
    pub fn from_body(body: Value) -> Result<Self, ApiError> {
        Ok(serde_json::from_value(body)?)
    }
}

#[async_trait]
pub trait DelegatedAdminResourceRightsApi: ConfigApi {
    async fn get_delegated_admin_resource_rights(
        &self,
        rights_name: &str,
        rest_resource_type: &str,
    ) -> Result<DelegatedAdminResourceRightsResponse, ApiError> {
        let body = self
            .get(&delegated_admin_resource_rights_path(rights_name, rest_resource_type))
            .await?;
        DelegatedAdminResourceRightsResponse::from_body(body)
    }

    async fn add_delegated_admin_resource_rights(
        &self,
        rights_name: &str,
        request: &AddDelegatedAdminResourceRightsRequest,
    ) -> Result<DelegatedAdminResourceRightsResponse, ApiError> {
        let body = self
            .add(
                &delegated_admin_resource_rights_collection(rights_name),
                serde_json::to_value(request)?,
            )
            .await?;
        DelegatedAdminResourceRightsResponse::from_body(body)
    }

    async fn update_delegated_admin_resource_rights(
        &self,
        rights_name: &str,
        rest_resource_type: &str,
        request: &UpdateRequest,
    ) -> Result<DelegatedAdminResourceRightsResponse, ApiError> {
        let body = self
            .update(
                &delegated_admin_resource_rights_path(rights_name, rest_resource_type),
                request,
            )
            .await?;
        DelegatedAdminResourceRightsResponse::from_body(body)
    }

    async fn delete_delegated_admin_resource_rights(
        &self,
        rights_name: &str,
        rest_resource_type: &str,
    ) -> Result<(), ApiError> {
        self.delete(&delegated_admin_resource_rights_path(rights_name, rest_resource_type))
            .await
    }

    async fn list_delegated_admin_resource_rights(
        &self,
        rights_name: &str,
        filter: Option<&str>,
    ) -> Result<Vec<DelegatedAdminResourceRightsResponse>, ApiError> {
        let bodies = self
            .list(&delegated_admin_resource_rights_collection(rights_name), filter)
            .await?;
        decode_all(bodies, DelegatedAdminResourceRightsResponse::from_body)
    }
}

impl<T: ConfigApi + ?Sized> DelegatedAdminResourceRightsApi for T {}
