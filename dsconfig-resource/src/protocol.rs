//! Response payloads of the `provider_*` methods.

use serde::{Deserialize, Serialize};

use crate::{diagnostics::Diagnostics, value::AttributeValues};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataResponse {
    pub type_name: String,
    pub version: String,
    pub resources: Vec<String>,
    pub data_sources: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsResponse {
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    /// `None` when the resource is planned to be destroyed.
    pub planned_state: Option<AttributeValues>,
    #[serde(default)]
    pub requires_replace: Vec<String>,
    pub diagnostics: Diagnostics,
}

/// Result of create, read, update, import and data source reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateResponse {
    /// `None` means the object does not exist (or was not created).
    pub new_state: Option<AttributeValues>,
    pub diagnostics: Diagnostics,
}
