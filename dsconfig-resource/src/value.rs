//! Attribute values as exchanged with the host.
//!
//! On the wire a configuration, plan or state is an [`AttributeValues`]
//! object: known values by attribute name, plus the names of attributes whose
//! value is not known until apply. Attributes that appear in neither are null.
//!
//! Resource code works with typed models whose fields are [`Attr`]s, see
//! [`attribute_model!`](crate::attribute_model).

use std::collections::BTreeSet;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The three states of one attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Attr<T> {
    /// Explicitly absent: the server default applies.
    #[default]
    Null,
    /// Decided by the server during apply.
    Unknown,
    Known(T),
}

impl<T> Attr<T> {
    pub fn known(&self) -> Option<&T> {
        match self {
            Attr::Known(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Attr::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Attr::Unknown)
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Attr::Known(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Attr<U> {
        match self {
            Attr::Null => Attr::Null,
            Attr::Unknown => Attr::Unknown,
            Attr::Known(v) => Attr::Known(f(v)),
        }
    }
}

impl<T> From<Option<T>> for Attr<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Attr::Known(v),
            None => Attr::Null,
        }
    }
}

impl Attr<String> {
    pub fn as_deref(&self) -> Option<&str> {
        self.known().map(String::as_str)
    }
}

/// Conversion between a Rust value and its JSON form on the wire.
pub trait AttributeValue: Sized {
    fn from_json(value: &Value) -> Result<Self>;
    fn to_json(&self) -> Value;
}

impl AttributeValue for String {
    fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s.clone()),
            other => bail!("expected a string, got {}", other),
        }
    }

    fn to_json(&self) -> Value {
        Value::String(self.clone())
    }
}

impl AttributeValue for bool {
    fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(*b),
            other => bail!("expected a boolean, got {}", other),
        }
    }

    fn to_json(&self) -> Value {
        Value::Bool(*self)
    }
}

impl AttributeValue for i64 {
    fn from_json(value: &Value) -> Result<Self> {
        value
            .as_i64()
            .with_context(|| format!("expected a 64-bit integer, got {}", value))
    }

    fn to_json(&self) -> Value {
        Value::from(*self)
    }
}

impl AttributeValue for BTreeSet<String> {
    fn from_json(value: &Value) -> Result<Self> {
        let Value::Array(elements) = value else {
            bail!("expected a set of strings, got {}", value);
        };
        elements.iter().map(String::from_json).collect()
    }

    fn to_json(&self) -> Value {
        Value::Array(self.iter().cloned().map(Value::String).collect())
    }
}

/// A configuration, plan or state on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeValues {
    #[serde(default)]
    pub values: Map<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub unknown: BTreeSet<String>,
}

impl AttributeValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder style insertion of a known value.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value.into());
        self
    }

    pub fn get<T: AttributeValue>(&self, name: &str) -> Result<Attr<T>> {
        if self.unknown.contains(name) {
            return Ok(Attr::Unknown);
        }
        match self.values.get(name) {
            None | Some(Value::Null) => Ok(Attr::Null),
            Some(value) => T::from_json(value)
                .map(Attr::Known)
                .with_context(|| format!("invalid value for attribute {:?}", name)),
        }
    }

    pub fn set<T: AttributeValue>(&mut self, name: &str, value: &Attr<T>) {
        match value {
            Attr::Null => {
                self.values.remove(name);
                self.unknown.remove(name);
            }
            Attr::Unknown => self.mark_unknown(name),
            Attr::Known(v) => self.insert(name, v.to_json()),
        }
    }

    /// The raw value of a known, non-null attribute.
    pub fn raw(&self, name: &str) -> Option<&Value> {
        if self.unknown.contains(name) {
            return None;
        }
        self.values.get(name).filter(|v| !v.is_null())
    }

    pub fn insert(&mut self, name: &str, value: Value) {
        self.unknown.remove(name);
        if value.is_null() {
            self.values.remove(name);
        } else {
            self.values.insert(name.to_string(), value);
        }
    }

    pub fn remove(&mut self, name: &str) {
        self.values.remove(name);
        self.unknown.remove(name);
    }

    pub fn mark_unknown(&mut self, name: &str) {
        self.values.remove(name);
        self.unknown.insert(name.to_string());
    }

    pub fn is_unknown(&self, name: &str) -> bool {
        self.unknown.contains(name)
    }

    pub fn is_null(&self, name: &str) -> bool {
        !self.is_unknown(name) && self.raw(name).is_none()
    }

    pub fn has_unknowns(&self) -> bool {
        !self.unknown.is_empty()
    }

    /// Replace unknown attributes by their value in `prior`, or null.
    pub fn resolve_unknowns_from(&mut self, prior: &AttributeValues) {
        for name in std::mem::take(&mut self.unknown) {
            if let Some(value) = prior.raw(&name) {
                self.values.insert(name, value.clone());
            }
        }
    }

    /// Turn every unknown attribute into null.
    pub fn null_unknowns(&mut self) {
        self.unknown.clear();
    }

    /// The names of all non-null attributes, known or not.
    pub fn names(&self) -> BTreeSet<&str> {
        self.values
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, _)| k.as_str())
            .chain(self.unknown.iter().map(String::as_str))
            .collect()
    }
}

/// A typed view of an [`AttributeValues`].
pub trait AttributeModel: Sized {
    fn from_values(values: &AttributeValues) -> Result<Self>;
    fn to_values(&self) -> AttributeValues;
}

/// Declare a struct of [`Attr`] fields with an [`AttributeModel`] impl.
///
/// Attribute names are the field names; a raw identifier such as `r#type`
/// maps to `type`.
#[macro_export]
macro_rules! attribute_model {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $( $(#[$fmeta:meta])* $fvis:vis $field:ident : $fty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $( $(#[$fmeta])* $fvis $field: $fty ),*
        }

        impl $crate::value::AttributeModel for $name {
            fn from_values(
                values: &$crate::value::AttributeValues,
            ) -> ::anyhow::Result<Self> {
                Ok($name {
                    $( $field: values.get(stringify!($field).trim_start_matches("r#"))?, )*
                })
            }

            fn to_values(&self) -> $crate::value::AttributeValues {
                let mut values = $crate::value::AttributeValues::default();
                $( values.set(stringify!($field).trim_start_matches("r#"), &self.$field); )*
                values
            }
        }
    };
}

/// Map an optional string from a server response.
///
/// The server does not distinguish an empty string from an absent value, so
/// an absent value stays `""` when that is what was expected.
pub fn string_attr(response: Option<&str>, expected: &Attr<String>) -> Attr<String> {
    match response {
        Some(s) if !s.is_empty() => Attr::Known(s.to_string()),
        _ if expected.as_deref() == Some("") => Attr::Known(String::new()),
        _ => Attr::Null,
    }
}

/// Map a multi-valued property from a server response. Absent means empty.
pub fn string_set_attr<S: AsRef<str>>(response: &[S]) -> Attr<BTreeSet<String>> {
    Attr::Known(response.iter().map(|s| s.as_ref().to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    attribute_model! {
        #[derive(Debug, Default, PartialEq)]
        struct Example {
            name: Attr<String>,
            r#type: Attr<String>,
            enabled: Attr<bool>,
            limit: Attr<i64>,
            members: Attr<BTreeSet<String>>,
        }
    }

    #[test]
    fn model_from_wire() {
        let values: AttributeValues = serde_json::from_value(json!({
            "values": {
                "name": "x",
                "type": "fingerprint",
                "members": ["b", "a", "b"],
                "limit": null,
            },
            "unknown": ["enabled"],
        }))
        .unwrap();
        let model = Example::from_values(&values).unwrap();
        assert_eq!(
            model,
            Example {
                name: Attr::Known("x".to_string()),
                r#type: Attr::Known("fingerprint".to_string()),
                enabled: Attr::Unknown,
                limit: Attr::Null,
                members: Attr::Known(["a".to_string(), "b".to_string()].into()),
            }
        );
        assert_eq!(
            serde_json::to_value(model.to_values()).unwrap(),
            json!({
                "values": {"name": "x", "type": "fingerprint", "members": ["a", "b"]},
                "unknown": ["enabled"],
            })
        );
    }

    #[test]
    fn type_mismatch_names_the_attribute() {
        let values = AttributeValues::new().with("enabled", "yes");
        let err = Example::from_values(&values).unwrap_err();
        assert!(format!("{:#}", err).contains("\"enabled\""));
    }

    #[test]
    fn resolve_unknowns() {
        let prior = AttributeValues::new().with("id", "abc");
        let mut planned = AttributeValues::new().with("name", "x");
        planned.mark_unknown("id");
        planned.mark_unknown("description");
        planned.resolve_unknowns_from(&prior);
        assert_eq!(planned, AttributeValues::new().with("name", "x").with("id", "abc"));
    }

    #[test]
    fn empty_string_normalization() {
        assert_eq!(string_attr(None, &Attr::Null), Attr::Null);
        assert_eq!(
            string_attr(None, &Attr::Known(String::new())),
            Attr::Known(String::new())
        );
        assert_eq!(
            string_attr(Some("v"), &Attr::Known(String::new())),
            Attr::Known("v".to_string())
        );
        assert_eq!(string_attr(Some(""), &Attr::Unknown), Attr::Null);
    }
}
