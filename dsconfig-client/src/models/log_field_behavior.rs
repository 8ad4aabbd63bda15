//! Log field behaviors: per-field preserve/omit/redact/tokenize rules for
//! access loggers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{decode_all, request_body, subtype_schema, subtype_tag};
use crate::{api::ConfigApi, error::ApiError, operation::UpdateRequest, path::ObjectPath};

pub const OBJECT_KIND: &str = "log-field-behavior";
pub const COLLECTION: &str = "log-field-behaviors";

config_enum! {
    pub enum LogFieldBehaviorType {
        TextAccess => "text-access",
        JsonFormattedAccess => "json-formatted-access",
    }
}

config_enum! {
    /// What happens to fields not covered by any explicit rule.
    pub enum LogFieldDefaultBehavior {
        Preserve => "preserve",
        Omit => "omit",
        RedactEntireValue => "redact-entire-value",
        RedactValueComponents => "redact-value-components",
        TokenizeEntireValue => "tokenize-entire-value",
        TokenizeValueComponents => "tokenize-value-components",
    }
}

pub fn log_field_behavior_path(name: &str) -> ObjectPath {
    ObjectPath::collection(COLLECTION).join(name)
}

/// Properties shared by both subtypes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFieldBehaviorProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_behavior: Option<LogFieldDefaultBehavior>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preserve_field: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preserve_field_name: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub omit_field: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub omit_field_name: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub redact_entire_value_field: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub redact_entire_value_field_name: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tokenize_entire_value_field: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tokenize_entire_value_field_name: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddLogFieldBehaviorProperties {
    pub behavior_name: String,
    #[serde(flatten)]
    pub properties: LogFieldBehaviorProperties,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddLogFieldBehaviorRequest {
    TextAccess(AddLogFieldBehaviorProperties),
    JsonFormattedAccess(AddLogFieldBehaviorProperties),
}

impl AddLogFieldBehaviorRequest {
    pub fn type_(&self) -> LogFieldBehaviorType {
        match self {
            Self::TextAccess(_) => LogFieldBehaviorType::TextAccess,
            Self::JsonFormattedAccess(_) => LogFieldBehaviorType::JsonFormattedAccess,
        }
    }

    pub fn to_body(&self) -> Result<Value, ApiError> {
        let schema = Some(subtype_schema(OBJECT_KIND, self.type_().as_str()));
        match self {
            Self::TextAccess(r) | Self::JsonFormattedAccess(r) => request_body(r, schema),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogFieldBehaviorObject {
    pub id: String,
    #[serde(flatten)]
    pub properties: LogFieldBehaviorProperties,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFieldBehaviorResponse {
    TextAccess(LogFieldBehaviorObject),
    JsonFormattedAccess(LogFieldBehaviorObject),
}

impl LogFieldBehaviorResponse {
    pub fn from_body(body: Value) -> Result<Self, ApiError> {
        let tag = subtype_tag(&body, OBJECT_KIND)?;
        let type_: LogFieldBehaviorType = tag.parse().map_err(|_| ApiError::UnknownSubtype {
            object_kind: OBJECT_KIND.to_string(),
        })?;
        let object = serde_json::from_value(body)?;
        Ok(match type_ {
            LogFieldBehaviorType::TextAccess => Self::TextAccess(object),
            LogFieldBehaviorType::JsonFormattedAccess => Self::JsonFormattedAccess(object),
        })
    }

    pub fn type_(&self) -> LogFieldBehaviorType {
        match self {
            Self::TextAccess(_) => LogFieldBehaviorType::TextAccess,
            Self::JsonFormattedAccess(_) => LogFieldBehaviorType::JsonFormattedAccess,
        }
    }

    pub fn object(&self) -> &LogFieldBehaviorObject {
        match self {
            Self::TextAccess(o) | Self::JsonFormattedAccess(o) => o,
        }
    }
}

#[async_trait]
pub trait LogFieldBehaviorApi: ConfigApi {
    async fn get_log_field_behavior(&self, name: &str) -> Result<LogFieldBehaviorResponse, ApiError> {
        let body = self.get(&log_field_behavior_path(name)).await?;
        LogFieldBehaviorResponse::from_body(body)
    }

    async fn add_log_field_behavior(
        &self,
        request: &AddLogFieldBehaviorRequest,
    ) -> Result<LogFieldBehaviorResponse, ApiError> {
        let body = self
            .add(&ObjectPath::collection(COLLECTION), request.to_body()?)
            .await?;
        LogFieldBehaviorResponse::from_body(body)
    }

    async fn update_log_field_behavior(
        &self,
        name: &str,
        request: &UpdateRequest,
    ) -> Result<LogFieldBehaviorResponse, ApiError> {
        let body = self.update(&log_field_behavior_path(name), request).await?;
        LogFieldBehaviorResponse::from_body(body)
    }

    async fn delete_log_field_behavior(&self, name: &str) -> Result<(), ApiError> {
        self.delete(&log_field_behavior_path(name)).await
    }

    async fn list_log_field_behaviors(
        &self,
        filter: Option<&str>,
    ) -> Result<Vec<LogFieldBehaviorResponse>, ApiError> {
        let bodies = self
            .list(&ObjectPath::collection(COLLECTION), filter)
            .await?;
        decode_all(bodies, LogFieldBehaviorResponse::from_body)
    }
}

impl<T: ConfigApi + ?Sized> LogFieldBehaviorApi for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_formatted_access_roundtrip_of_wire_names() {
        let request = AddLogFieldBehaviorRequest::JsonFormattedAccess(AddLogFieldBehaviorProperties {
            behavior_name: "Redact Filters".to_string(),
            properties: LogFieldBehaviorProperties {
                default_behavior: Some(LogFieldDefaultBehavior::Preserve),
                redact_entire_value_field: vec!["filter".to_string()],
                ..Default::default()
            },
        });
        let body = request.to_body().unwrap();
        assert_eq!(
            body,
            json!({
                "schemas": ["urn:pingidentity:schemas:configuration:2.0:log-field-behavior:json-formatted-access"],
                "behaviorName": "Redact Filters",
                "defaultBehavior": "preserve",
                "redactEntireValueField": ["filter"],
            })
        );

        let mut stored = body;
        stored["id"] = json!("Redact Filters");
        let response = LogFieldBehaviorResponse::from_body(stored).unwrap();
        assert_eq!(response.type_(), LogFieldBehaviorType::JsonFormattedAccess);
        assert_eq!(response.object().id, "Redact Filters");
        assert_eq!(
            response.object().properties.redact_entire_value_field,
            vec!["filter".to_string()]
        );
        assert!(response.object().properties.omit_field.is_empty());
    }
}
