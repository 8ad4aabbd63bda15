//! Typed requests and responses per configuration object type.
//!
//! Polymorphic object types (certificate mappers, log field behaviors, REST
//! resource types) are modelled as enums with one variant per subtype. The
//! subtype travels on the wire as a schema URN in the `schemas` array.

use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;

pub mod certificate_mapper;
pub mod delegated_admin_resource_rights;
pub mod log_field_behavior;
pub mod rest_resource_type;
pub mod scim_subattribute;

pub const CONFIGURATION_SCHEMA_PREFIX: &str = "urn:pingidentity:schemas:configuration:2.0:";

/// The schema URN of one subtype of `object_kind`.
pub fn subtype_schema(object_kind: &str, tag: &str) -> String {
    format!("{}{}:{}", CONFIGURATION_SCHEMA_PREFIX, object_kind, tag)
}

/// Extract the subtype tag of a polymorphic response.
///
/// Exactly one schema URN for `object_kind` must be present.
pub fn subtype_tag(body: &Value, object_kind: &str) -> Result<String, ApiError> {
    let prefix = format!("{}{}:", CONFIGURATION_SCHEMA_PREFIX, object_kind);
    let tags: Vec<String> = body
        .get("schemas")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .filter_map(|schema| schema.strip_prefix(prefix.as_str()))
        .map(str::to_string)
        .collect();
    match tags.as_slice() {
        [tag] => Ok(tag.clone()),
        [] => Err(ApiError::UnknownSubtype {
            object_kind: object_kind.to_string(),
        }),
        _ => Err(ApiError::AmbiguousSubtype {
            object_kind: object_kind.to_string(),
            tags,
        }),
    }
}

/// Serialize an add request, tagging it with a schema URN if given.
pub(crate) fn request_body<T: Serialize>(
    request: &T,
    schema: Option<String>,
) -> Result<Value, ApiError> {
    let mut body = serde_json::to_value(request)?;
    if let (Some(schema), Value::Object(fields)) = (schema, &mut body) {
        fields.insert("schemas".to_string(), Value::Array(vec![Value::String(schema)]));
    }
    Ok(body)
}

/// Decode a list of responses, failing on the first malformed element.
pub(crate) fn decode_all<T>(
    bodies: Vec<Value>,
    decode: impl Fn(Value) -> Result<T, ApiError>,
) -> Result<Vec<T>, ApiError> {
    bodies.into_iter().map(decode).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_subtype_tag() {
        let body = json!({
            "schemas": ["urn:pingidentity:schemas:configuration:2.0:certificate-mapper:fingerprint"],
            "id": "Fingerprint Mapper",
        });
        assert_eq!(
            subtype_tag(&body, "certificate-mapper").unwrap(),
            "fingerprint"
        );
    }

    #[test]
    fn missing_subtype_tag_is_an_error() {
        let body = json!({"schemas": ["urn:pingidentity:schemas:configuration:2.0:log-field-behavior:text-access"]});
        assert!(matches!(
            subtype_tag(&body, "certificate-mapper"),
            Err(ApiError::UnknownSubtype { .. })
        ));
        assert!(matches!(
            subtype_tag(&json!({"id": "x"}), "certificate-mapper"),
            Err(ApiError::UnknownSubtype { .. })
        ));
    }

    #[test]
    fn multiple_subtype_tags_are_an_error() {
        let body = json!({
            "schemas": [
                "urn:pingidentity:schemas:configuration:2.0:certificate-mapper:fingerprint",
                "urn:pingidentity:schemas:configuration:2.0:certificate-mapper:third-party",
            ]
        });
        match subtype_tag(&body, "certificate-mapper") {
            Err(ApiError::AmbiguousSubtype { tags, .. }) => {
                assert_eq!(tags, vec!["fingerprint", "third-party"])
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn request_body_carries_schema() {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Req {
            mapper_name: String,
        }
        let body = request_body(
            &Req {
                mapper_name: "m".to_string(),
            },
            Some(subtype_schema("certificate-mapper", "third-party")),
        )
        .unwrap();
        assert_eq!(
            body,
            json!({
                "mapperName": "m",
                "schemas": ["urn:pingidentity:schemas:configuration:2.0:certificate-mapper:third-party"],
            })
        );
    }
}
