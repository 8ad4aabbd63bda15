use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Everything a provider declares to the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSchema {
    /// Schema for the provider configuration itself
    pub provider: Schema,
    /// Schemas for each resource type this provider supports
    pub resource_schemas: BTreeMap<String, Schema>,
    /// Schemas for each data source type this provider supports
    pub data_source_schemas: BTreeMap<String, Schema>,
}

impl ProviderSchema {
    pub fn has_resource(&self, name: &str) -> bool {
        self.resource_schemas.contains_key(name)
    }

    pub fn get_resource_schema(&self, name: &str) -> Option<&Schema> {
        self.resource_schemas.get(name)
    }

    pub fn has_data_source(&self, name: &str) -> bool {
        self.data_source_schemas.contains_key(name)
    }
}

/// Schema definition for a resource, data source, or provider configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    /// Version of this schema
    pub version: i64,
    /// Human-readable description
    pub description: Option<String>,
    pub description_kind: DescriptionKind,
    /// Attributes by name
    pub attributes: BTreeMap<String, Attribute>,
}

/// Schema for a single attribute
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attribute {
    /// The data type of this attribute
    pub r#type: AttributeType,
    /// Human-readable description
    pub description: Option<String>,
    pub description_kind: DescriptionKind,
    /// Whether this attribute is required
    pub required: bool,
    /// Whether this attribute is optional
    pub optional: bool,
    /// Whether the provider may decide this attribute's value
    pub computed: bool,
    /// Whether this attribute is sensitive (should be redacted)
    pub sensitive: bool,
    /// Value planned when the configuration leaves this attribute null
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plan_modifiers: Vec<PlanModifier>,
    /// Permitted values of a string, or of each element of a set
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<String>,
    /// The values of the `type` attribute this attribute may be set for.
    /// Empty means all.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub applies_to_types: Vec<String>,
    /// The values of the `type` attribute this attribute must be set for.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_for_types: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    String,
    Bool,
    Int64,
    StringSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanModifier {
    /// A change to this attribute replaces the object.
    RequiresReplace,
    /// Plan the prior state's value instead of unknown.
    UseStateForUnknown,
}

/// How descriptions should be interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DescriptionKind {
    /// Plain text
    #[default]
    Plain,
    /// Markdown formatted text
    Markdown,
}

/// The attribute holding the subtype of polymorphic objects.
pub const TYPE_ATTRIBUTE: &str = "type";

impl Schema {
    pub fn new(description: &str) -> Self {
        Schema {
            version: 0,
            description: Some(description.to_string()),
            description_kind: DescriptionKind::Markdown,
            attributes: BTreeMap::new(),
        }
    }

    pub fn attribute(mut self, name: &str, attribute: Attribute) -> Self {
        self.attributes.insert(name.to_string(), attribute);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Derive the schema of a resource that adopts an existing object.
    ///
    /// Identifying attributes keep their declaration. Every other configurable
    /// attribute becomes optional and computed without a default, so that
    /// whatever is not configured keeps the object's current value.
    pub fn for_existing_objects(&self, identifying: &[&str]) -> Schema {
        let mut schema = self.clone();
        for (name, attribute) in schema.attributes.iter_mut() {
            if identifying.contains(&name.as_str()) || !attribute.is_configurable() {
                continue;
            }
            attribute.required = false;
            attribute.optional = true;
            attribute.computed = true;
            attribute.default = None;
            attribute.required_for_types.clear();
            if !attribute.plan_modifiers.contains(&PlanModifier::UseStateForUnknown) {
                attribute.plan_modifiers.push(PlanModifier::UseStateForUnknown);
            }
        }
        schema
    }

    /// Derive a data source schema: `keys` are required, the rest is read.
    pub fn for_data_source(&self, keys: &[&str]) -> Schema {
        let mut schema = self.clone();
        for (name, attribute) in schema.attributes.iter_mut() {
            attribute.default = None;
            attribute.plan_modifiers.clear();
            attribute.required_for_types.clear();
            if keys.contains(&name.as_str()) {
                attribute.required = true;
                attribute.optional = false;
                attribute.computed = false;
            } else {
                attribute.required = false;
                attribute.optional = false;
                attribute.computed = true;
            }
        }
        schema
    }
}

impl Attribute {
    fn new(r#type: AttributeType, description: &str) -> Self {
        Attribute {
            r#type,
            description: Some(description.to_string()),
            description_kind: DescriptionKind::Markdown,
            required: false,
            optional: true,
            computed: false,
            sensitive: false,
            default: None,
            plan_modifiers: Vec::new(),
            allowed_values: Vec::new(),
            applies_to_types: Vec::new(),
            required_for_types: Vec::new(),
        }
    }

    /// An optional string attribute. Use the builder methods to refine.
    pub fn string(description: &str) -> Self {
        Self::new(AttributeType::String, description)
    }

    pub fn bool(description: &str) -> Self {
        Self::new(AttributeType::Bool, description)
    }

    pub fn int64(description: &str) -> Self {
        Self::new(AttributeType::Int64, description)
    }

    pub fn string_set(description: &str) -> Self {
        Self::new(AttributeType::StringSet, description)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self.optional = false;
        self
    }

    /// Output only.
    pub fn computed(mut self) -> Self {
        self.required = false;
        self.optional = false;
        self.computed = true;
        self
    }

    pub fn optional_computed(mut self) -> Self {
        self.required = false;
        self.optional = true;
        self.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self.optional_computed()
    }

    pub fn requires_replace(mut self) -> Self {
        self.plan_modifiers.push(PlanModifier::RequiresReplace);
        self
    }

    pub fn use_state_for_unknown(mut self) -> Self {
        self.plan_modifiers.push(PlanModifier::UseStateForUnknown);
        self
    }

    pub fn one_of(mut self, values: &[&str]) -> Self {
        self.allowed_values = values.iter().map(|v| v.to_string()).collect();
        self
    }

    pub fn applies_to(mut self, types: &[&str]) -> Self {
        self.applies_to_types = types.iter().map(|v| v.to_string()).collect();
        self
    }

    pub fn required_for(mut self, types: &[&str]) -> Self {
        self.required_for_types = types.iter().map(|v| v.to_string()).collect();
        self
    }

    pub fn is_configurable(&self) -> bool {
        self.required || self.optional
    }

    pub fn has_modifier(&self, modifier: PlanModifier) -> bool {
        self.plan_modifiers.contains(&modifier)
    }

    /// Whether this attribute may be set for objects of subtype `type_`.
    pub fn applies_to_type(&self, type_: &str) -> bool {
        self.applies_to_types.is_empty() || self.applies_to_types.iter().any(|t| t == type_)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new("Manages a Certificate Mapper.")
            .attribute(
                "id",
                Attribute::string("The ID of this resource.")
                    .computed()
                    .use_state_for_unknown(),
            )
            .attribute(
                "name",
                Attribute::string("Name of this config object.")
                    .required()
                    .requires_replace(),
            )
            .attribute(
                "type",
                Attribute::string("The type of Certificate Mapper resource.")
                    .required()
                    .requires_replace()
                    .one_of(&["fingerprint", "third-party"]),
            )
            .attribute("enabled", Attribute::bool("Enabled.").required())
            .attribute(
                "fingerprint_algorithm",
                Attribute::string("Digest algorithm.")
                    .applies_to(&["fingerprint"])
                    .required_for(&["fingerprint"]),
            )
            .attribute(
                "fingerprint_attribute",
                Attribute::string("Attribute holding fingerprints.")
                    .applies_to(&["fingerprint"])
                    .with_default("ds-certificate-fingerprint"),
            )
    }

    #[test]
    fn existing_objects_relax_non_identifying_attributes() {
        let schema = schema().for_existing_objects(&["name", "type"]);

        let name = schema.get("name").unwrap();
        assert!(name.required && !name.computed);

        let enabled = schema.get("enabled").unwrap();
        assert!(!enabled.required && enabled.optional && enabled.computed);
        assert!(enabled.has_modifier(PlanModifier::UseStateForUnknown));

        let attr = schema.get("fingerprint_attribute").unwrap();
        assert_eq!(attr.default, None);

        let algorithm = schema.get("fingerprint_algorithm").unwrap();
        assert!(algorithm.required_for_types.is_empty());
        assert_eq!(algorithm.applies_to_types, vec!["fingerprint"]);

        let id = schema.get("id").unwrap();
        assert!(id.computed && !id.optional);
    }

    #[test]
    fn data_source_schema() {
        let schema = schema().for_data_source(&["name"]);
        let name = schema.get("name").unwrap();
        assert!(name.required);
        assert!(name.plan_modifiers.is_empty());
        for key in ["type", "enabled", "fingerprint_attribute"] {
            let attribute = schema.get(key).unwrap();
            assert!(attribute.computed && !attribute.optional && !attribute.required);
            assert_eq!(attribute.default, None);
        }
    }

    #[test]
    fn serialized_form() {
        let value = serde_json::to_value(
            Attribute::string("Digest algorithm.")
                .with_default("sha-256")
                .one_of(&["sha-256"]),
        )
        .unwrap();
        assert_eq!(
            value,
            json!({
                "type": "string",
                "description": "Digest algorithm.",
                "description_kind": "Markdown",
                "required": false,
                "optional": true,
                "computed": true,
                "sensitive": false,
                "default": "sha-256",
                "allowed_values": ["sha-256"],
            })
        );
    }
}
