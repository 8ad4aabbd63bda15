//! Schema driven configuration validation.

use serde_json::Value;

use crate::{
    diagnostics::Diagnostics,
    schema::{Attribute, AttributeType, Schema, TYPE_ATTRIBUTE},
    value::AttributeValues,
};

/// Check `config` against `schema`, reporting every problem found.
///
/// Unknown values are accepted wherever a value is allowed; they are checked
/// again once known.
pub fn validate_config(schema: &Schema, config: &AttributeValues, diags: &mut Diagnostics) {
    for name in config.names() {
        if schema.get(name).is_none() {
            diags.attribute_error(
                name,
                "Unsupported argument",
                format!("An argument named {:?} is not expected here.", name),
            );
        }
    }

    let type_ = config.raw(TYPE_ATTRIBUTE).and_then(Value::as_str);

    for (name, attribute) in &schema.attributes {
        let is_set = !config.is_null(name);

        if is_set && !attribute.is_configurable() {
            diags.attribute_error(
                name,
                "Value for unconfigurable attribute",
                format!("Can't configure a value for {:?}: its value will be decided automatically.", name),
            );
            continue;
        }
        if !is_set {
            if attribute.required {
                diags.attribute_error(
                    name,
                    "Missing required argument",
                    format!("The argument {:?} is required, but no definition was found.", name),
                );
            } else if let Some(t) = type_ {
                if attribute.required_for_types.iter().any(|r| r == t) {
                    diags.attribute_error(
                        name,
                        "Missing required argument",
                        format!("The argument {:?} is required when type is {:?}.", name, t),
                    );
                }
            }
            continue;
        }

        if let Some(t) = type_ {
            if !attribute.applies_to_type(t) {
                diags.attribute_error(
                    name,
                    "Invalid attribute for type",
                    format!(
                        "{:?} is not supported for type {:?}. It applies to: {}.",
                        name,
                        t,
                        attribute.applies_to_types.join(", ")
                    ),
                );
            }
        }

        if let Some(value) = config.raw(name) {
            check_value(name, attribute, value, diags);
        }
    }
}

/// Check the known values of a planned state against their declared types
/// and allowed values.
///
/// Plans carry computed attributes and unknowns, so only the values
/// themselves are checked, not whether they may be configured.
pub fn validate_planned_values(schema: &Schema, planned: &AttributeValues, diags: &mut Diagnostics) {
    for (name, attribute) in &schema.attributes {
        if let Some(value) = planned.raw(name) {
            check_value(name, attribute, value, diags);
        }
    }
}

fn check_value(name: &str, attribute: &Attribute, value: &Value, diags: &mut Diagnostics) {
    let elements: Vec<&str> = match (attribute.r#type, value) {
        (AttributeType::String, Value::String(s)) => vec![s.as_str()],
        (AttributeType::Bool, Value::Bool(_)) => return,
        (AttributeType::Int64, v) if v.as_i64().is_some() => return,
        (AttributeType::StringSet, Value::Array(a)) if a.iter().all(Value::is_string) => {
            a.iter().filter_map(Value::as_str).collect()
        }
        (expected, _) => {
            diags.attribute_error(
                name,
                "Incorrect attribute value type",
                format!("Expected a value of type {:?}, got {}.", expected, value),
            );
            return;
        }
    };

    if attribute.allowed_values.is_empty() {
        return;
    }
    for element in elements {
        if !attribute.allowed_values.iter().any(|v| v == element) {
            diags.attribute_error(
                name,
                "Invalid attribute value",
                format!(
                    "Value must be one of: {}, got: {:?}.",
                    attribute.allowed_values.join(", "),
                    element
                ),
            );
        }
    }
}
