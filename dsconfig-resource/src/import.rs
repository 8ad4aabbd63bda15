use crate::{diagnostics::Diagnostics, value::AttributeValues};

/// Turn an import identifier into the attributes identifying the object.
///
/// `keys` pairs each attribute with the label shown in the expected syntax,
/// outermost first. A single key takes the identifier verbatim. Otherwise the
/// identifier must consist of exactly one non-empty `/` separated segment per
/// key; if not, an error is reported and nothing is returned.
pub fn split_import_id(
    id: &str,
    keys: &[(&str, &str)],
    diags: &mut Diagnostics,
) -> Option<AttributeValues> {
    if let [(attribute, _)] = keys {
        return Some(AttributeValues::new().with(attribute, id));
    }

    let segments: Vec<&str> = id.split('/').collect();
    if segments.len() != keys.len() || segments.iter().any(|s| s.is_empty()) {
        let syntax = keys
            .iter()
            .map(|(_, label)| format!("[{}]", label))
            .collect::<Vec<_>>()
            .join("/");
        diags.error(
            "Unexpected Import Identifier",
            format!(
                "Expected import identifier with format: {}. Got: {:?}",
                syntax, id
            ),
        );
        return None;
    }

    Some(
        keys.iter()
            .zip(segments)
            .fold(AttributeValues::new(), |values, ((attribute, _), segment)| {
                values.with(attribute, segment)
            }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const RIGHTS_KEYS: &[(&str, &str)] = &[
        ("delegated_admin_rights_name", "delegated-admin-rights-name"),
        ("rest_resource_type", "rest-resource-type"),
    ];

    #[test]
    fn two_segments() {
        let mut diags = Diagnostics::new();
        let values = split_import_id("rights1/resourceTypeA", RIGHTS_KEYS, &mut diags).unwrap();
        assert!(diags.is_empty());
        assert_eq!(values.values.len(), 2);
        assert_eq!(
            values.raw("delegated_admin_rights_name"),
            Some(&json!("rights1"))
        );
        assert_eq!(values.raw("rest_resource_type"), Some(&json!("resourceTypeA")));
    }

    #[test]
    fn wrong_segment_count() {
        for id in ["rights1", "a/b/c", "a/", ""] {
            let mut diags = Diagnostics::new();
            assert_eq!(split_import_id(id, RIGHTS_KEYS, &mut diags), None, "{}", id);
            assert!(diags.has_errors());
            let detail = &diags.iter().next().unwrap().detail;
            assert!(
                detail.contains("[delegated-admin-rights-name]/[rest-resource-type]"),
                "{}",
                detail
            );
        }
    }

    #[test]
    fn single_key_passes_through() {
        let mut diags = Diagnostics::new();
        let values = split_import_id("Subject/DN", &[("name", "name")], &mut diags).unwrap();
        assert!(diags.is_empty());
        assert_eq!(values.raw("name"), Some(&json!("Subject/DN")));
    }

    #[test]
    fn three_segments() {
        let keys = &[
            ("scim_schema_name", "scim-schema-name"),
            ("scim_attribute_name", "scim-attribute-name"),
            ("name", "scim-subattribute-name"),
        ];
        let mut diags = Diagnostics::new();
        let values = split_import_id("urn:s/emails/value", keys, &mut diags).unwrap();
        assert_eq!(values.raw("scim_attribute_name"), Some(&json!("emails")));
        assert_eq!(values.raw("name"), Some(&json!("value")));
        assert!(split_import_id("urn:s/emails", keys, &mut diags).is_none());
    }
}
