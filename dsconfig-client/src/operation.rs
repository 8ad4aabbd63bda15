use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Add,
    Remove,
    Replace,
}

/// One PATCH instruction against a configuration object.
///
/// Scalars travel as strings in `value` (`"true"`, `"1000"`); the elements of
/// multi-valued properties travel in `values`. A `remove` without values
/// resets the property to its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub op: OperationKind,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

impl Operation {
    pub fn replace(path: &str, value: impl Into<String>) -> Self {
        Operation {
            op: OperationKind::Replace,
            path: path.to_string(),
            value: Some(value.into()),
            values: Vec::new(),
        }
    }

    pub fn add_values(path: &str, values: Vec<String>) -> Self {
        Operation {
            op: OperationKind::Add,
            path: path.to_string(),
            value: None,
            values,
        }
    }

    pub fn remove_values(path: &str, values: Vec<String>) -> Self {
        Operation {
            op: OperationKind::Remove,
            path: path.to_string(),
            value: None,
            values,
        }
    }
}

/// Body of a PATCH request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub operations: Vec<Operation>,
}

impl UpdateRequest {
    pub fn new(operations: Vec<Operation>) -> Self {
        UpdateRequest { operations }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_format() {
        let request = UpdateRequest::new(vec![
            Operation::replace("enabled", "false"),
            Operation::add_values("userBaseDN", vec!["ou=people,dc=example,dc=com".into()]),
            Operation::remove_values("userBaseDN", vec!["dc=example,dc=com".into()]),
        ]);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "operations": [
                    {"op": "replace", "path": "enabled", "value": "false"},
                    {"op": "add", "path": "userBaseDN", "values": ["ou=people,dc=example,dc=com"]},
                    {"op": "remove", "path": "userBaseDN", "values": ["dc=example,dc=com"]},
                ]
            })
        );
    }
}
