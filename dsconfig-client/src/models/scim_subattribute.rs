//! SCIM subattributes, nested below a SCIM schema's attribute.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::decode_all;
use crate::{api::ConfigApi, error::ApiError, operation::UpdateRequest, path::ObjectPath};

config_enum! {
    /// The SCIM data type of a subattribute.
    pub enum ScimAttributeType {
        String => "string",
        Boolean => "boolean",
        Datetime => "datetime",
        Decimal => "decimal",
        Integer => "integer",
        Binary => "binary",
        Reference => "reference",
    }
}

config_enum! {
    pub enum ScimMutability {
        ReadOnly => "read-only",
        ReadWrite => "read-write",
        Immutable => "immutable",
        WriteOnly => "write-only",
    }
}

config_enum! {
    pub enum ScimReturned {
        Always => "always",
        Never => "never",
        ByDefault => "by-default",
        Request => "request",
    }
}

pub fn scim_subattributes_path(scim_schema_name: &str, scim_attribute_name: &str) -> ObjectPath {
    ObjectPath::collection("scim-schemas")
        .join(scim_schema_name)
        .join("scim-attributes")
        .join(scim_attribute_name)
        .join("scim-subattributes")
}

pub fn scim_subattribute_path(
    scim_schema_name: &str,
    scim_attribute_name: &str,
    name: &str,
) -> ObjectPath {
    scim_subattributes_path(scim_schema_name, scim_attribute_name).join(name)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScimSubattributeProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<ScimAttributeType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_exact: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_valued: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub canonical_value: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutability: Option<ScimMutability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returned: Option<ScimReturned>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reference_type: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddScimSubattributeRequest {
    pub name: String,
    #[serde(flatten)]
    pub properties: ScimSubattributeProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScimSubattributeResponse {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub properties: ScimSubattributeProperties,
}

impl ScimSubattributeResponse {
    pub fn from_body(body: Value) -> Result<Self, ApiError> {
        Ok(serde_json::from_value(body)?)
    }
}

#[async_trait]
pub trait ScimSubattributeApi: ConfigApi {
    async fn get_scim_subattribute(
        &self,
        scim_schema_name: &str,
        scim_attribute_name: &str,
        name: &str,
    ) -> Result<ScimSubattributeResponse, ApiError> {
        let body = self
            .get(&scim_subattribute_path(scim_schema_name, scim_attribute_name, name))
            .await?;
        ScimSubattributeResponse::from_body(body)
    }

    async fn add_scim_subattribute(
        &self,
        scim_schema_name: &str,
        scim_attribute_name: &str,
        request: &AddScimSubattributeRequest,
    ) -> Result<ScimSubattributeResponse, ApiError> {
        let body = self
            .add(
                &scim_subattributes_path(scim_schema_name, scim_attribute_name),
                serde_json::to_value(request)?,
            )
            .await?;
        ScimSubattributeResponse::from_body(body)
    }

    async fn update_scim_subattribute(
        &self,
        scim_schema_name: &str,
        scim_attribute_name: &str,
        name: &str,
        request: &UpdateRequest,
    ) -> Result<ScimSubattributeResponse, ApiError> {
        let body = self
            .update(
                &scim_subattribute_path(scim_schema_name, scim_attribute_name, name),
                request,
            )
            .await?;
        ScimSubattributeResponse::from_body(body)
    }

    async fn delete_scim_subattribute(
        &self,
        scim_schema_name: &str,
        scim_attribute_name: &str,
        name: &str,
    ) -> Result<(), ApiError> {
        self.delete(&scim_subattribute_path(scim_schema_name, scim_attribute_name, name))
            .await
    }

    async fn list_scim_subattributes(
        &self,
        scim_schema_name: &str,
        scim_attribute_name: &str,
        filter: Option<&str>,
    ) -> Result<Vec<ScimSubattributeResponse>, ApiError> {
        let bodies = self
            .list(
                &scim_subattributes_path(scim_schema_name, scim_attribute_name),
                filter,
            )
            .await?;
        decode_all(bodies, ScimSubattributeResponse::from_body)
    }
}

impl<T: ConfigApi + ?Sized> ScimSubattributeApi for T {}
