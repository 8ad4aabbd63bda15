//! REST resource types: LDAP-backed resource collections exposed to the
//! delegated admin application.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{decode_all, request_body, subtype_schema, subtype_tag};
use crate::{api::ConfigApi, error::ApiError, operation::UpdateRequest, path::ObjectPath};

pub const OBJECT_KIND: &str = "rest-resource-type";
pub const COLLECTION: &str = "rest-resource-types";

config_enum! {
    pub enum RestResourceTypeType {
        User => "user",
        Generic => "generic",
        Group => "group",
    }
}

pub fn rest_resource_type_path(name: &str) -> ObjectPath {
    ObjectPath::collection(COLLECTION).join(name)
}

/// Properties common to all subtypes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestResourceTypeProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub enabled: bool,
    pub resource_endpoint: String,
    #[serde(rename = "structuralLDAPObjectclass")]
    pub structural_ldap_objectclass: String,
    #[serde(
        rename = "auxiliaryLDAPObjectclass",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub auxiliary_ldap_objectclass: Vec<String>,
    #[serde(rename = "searchBaseDN")]
    pub search_base_dn: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_filter: Vec<String>,
    #[serde(rename = "parentDN", default, skip_serializing_if = "Option::is_none")]
    pub parent_dn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_resource_type: Option<String>,
    #[serde(
        rename = "relativeDNFromParentResource",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub relative_dn_from_parent_resource: Option<String>,
    #[serde(
        rename = "createRDNAttributeType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub create_rdn_attribute_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_filter_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_display_attribute_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegated_admin_search_size_limit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegated_admin_report_size_limit: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRestResourceTypeProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_attribute_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_display_order_index: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRestResourceTypeProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members_column_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonmembers_column_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddUserRestResourceTypeRequest {
    pub resource_type_name: String,
    #[serde(flatten)]
    pub properties: RestResourceTypeProperties,
    #[serde(flatten)]
    pub user: UserRestResourceTypeProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddGenericRestResourceTypeRequest {
    pub resource_type_name: String,
    #[serde(flatten)]
    pub properties: RestResourceTypeProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddGroupRestResourceTypeRequest {
    pub resource_type_name: String,
    #[serde(flatten)]
    pub properties: RestResourceTypeProperties,
    #[serde(flatten)]
    pub group: GroupRestResourceTypeProperties,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddRestResourceTypeRequest {
    User(AddUserRestResourceTypeRequest),
    Generic(AddGenericRestResourceTypeRequest),
    Group(AddGroupRestResourceTypeRequest),
}

impl AddRestResourceTypeRequest {
    pub fn type_(&self) -> RestResourceTypeType {
        match self {
            Self::User(_) => RestResourceTypeType::User,
            Self::Generic(_) => RestResourceTypeType::Generic,
            Self::Group(_) => RestResourceTypeType::Group,
        }
    }

    pub fn to_body(&self) -> Result<Value, ApiError> {
        let schema = Some(subtype_schema(OBJECT_KIND, self.type_().as_str()));
        match self {
            Self::User(r) => request_body(r, schema),
            Self::Generic(r) => request_body(r, schema),
            Self::Group(r) => request_body(r, schema),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserRestResourceTypeResponse {
    pub id: String,
    #[serde(flatten)]
    pub properties: RestResourceTypeProperties,
    #[serde(flatten)]
    pub user: UserRestResourceTypeProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GenericRestResourceTypeResponse {
    pub id: String,
    #[serde(flatten)]
    pub properties: RestResourceTypeProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GroupRestResourceTypeResponse {
    pub id: String,
    #[serde(flatten)]
    pub properties: RestResourceTypeProperties,
    #[serde(flatten)]
    pub group: GroupRestResourceTypeProperties,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestResourceTypeResponse {
    User(UserRestResourceTypeResponse),
    Generic(GenericRestResourceTypeResponse),
    Group(GroupRestResourceTypeResponse),
}

impl RestResourceTypeResponse {
    pub fn from_body(body: Value) -> Result<Self, ApiError> {
        let tag = subtype_tag(&body, OBJECT_KIND)?;
        let type_: RestResourceTypeType = tag.parse().map_err(|_| ApiError::UnknownSubtype {
            object_kind: OBJECT_KIND.to_string(),
        })?;
        Ok(match type_ {
            RestResourceTypeType::User => Self::User(serde_json::from_value(body)?),
            RestResourceTypeType::Generic => Self::Generic(serde_json::from_value(body)?),
            RestResourceTypeType::Group => Self::Group(serde_json::from_value(body)?),
        })
    }

    pub fn type_(&self) -> RestResourceTypeType {
        match self {
            Self::User(_) => RestResourceTypeType::User,
            Self::Generic(_) => RestResourceTypeType::Generic,
            Self::Group(_) => RestResourceTypeType::Group,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::User(r) => &r.id,
            Self::Generic(r) => &r.id,
            Self::Group(r) => &r.id,
        }
    }

    pub fn properties(&self) -> &RestResourceTypeProperties {
        match self {
            Self::User(r) => &r.properties,
            Self::Generic(r) => &r.properties,
            Self::Group(r) => &r.properties,
        }
    }
}

#[async_trait]
pub trait RestResourceTypeApi: ConfigApi {
    async fn get_rest_resource_type(&self, name: &str) -> Result<RestResourceTypeResponse, ApiError> {
        let body = self.get(&rest_resource_type_path(name)).await?;
        RestResourceTypeResponse::from_body(body)
    }

    async fn add_rest_resource_type(
        &self,
        request: &AddRestResourceTypeRequest,
    ) -> Result<RestResourceTypeResponse, ApiError> {
        let body = self
            .add(&ObjectPath::collection(COLLECTION), request.to_body()?)
            .await?;
        RestResourceTypeResponse::from_body(body)
    }

    async fn update_rest_resource_type(
        &self,
        name: &str,
        request: &UpdateRequest,
    ) -> Result<RestResourceTypeResponse, ApiError> {
        let body = self.update(&rest_resource_type_path(name), request).await?;
        RestResourceTypeResponse::from_body(body)
    }

    async fn delete_rest_resource_type(&self, name: &str) -> Result<(), ApiError> {
        self.delete(&rest_resource_type_path(name)).await
    }

    async fn list_rest_resource_types(
        &self,
        filter: Option<&str>,
    ) -> Result<Vec<RestResourceTypeResponse>, ApiError> {
        let bodies = self
            .list(&ObjectPath::collection(COLLECTION), filter)
            .await?;
        decode_all(bodies, RestResourceTypeResponse::from_body)
    }
}

impl<T: ConfigApi + ?Sized> RestResourceTypeApi for T {}
