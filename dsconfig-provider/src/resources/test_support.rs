//! An in-memory configuration API for resource tests.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use dsconfig_client::{ApiError, ConfigApi, ObjectPath, OperationKind, UpdateRequest};
use dsconfig_resource::{
    diagnostics::Diagnostics, framework::Resource, plan::plan_resource_change,
    validate::validate_config, value::AttributeValues,
};
use serde_json::{Map, Value};

use crate::provider::ProviderData;

/// Request fields that carry the name of a new object.
const NAME_FIELDS: &[&str] = &[
    "mapperName",
    "behaviorName",
    "resourceTypeName",
    "restResourceType",
    "name",
];

/// Keeps objects as JSON by path and applies PATCH operations the way the
/// server does.
#[derive(Default)]
pub(crate) struct FakeConfigApi {
    objects: Mutex<BTreeMap<ObjectPath, Value>>,
    calls: Mutex<Vec<String>>,
    updates: Mutex<Vec<UpdateRequest>>,
    fail_status: Mutex<Option<u16>>,
}

impl FakeConfigApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Store an object as if it already existed on the server.
    pub(crate) fn insert(&self, path: ObjectPath, body: Value) {
        self.objects.lock().unwrap().insert(path, body);
    }

    pub(crate) fn object(&self, path: &ObjectPath) -> Option<Value> {
        self.objects.lock().unwrap().get(path).cloned()
    }

    /// `"METHOD /path"` for every request made so far.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn updates(&self) -> Vec<UpdateRequest> {
        self.updates.lock().unwrap().clone()
    }

    /// Answer every following request with this HTTP status.
    pub(crate) fn fail_with(&self, status: u16) {
        *self.fail_status.lock().unwrap() = Some(status);
    }

    fn record(&self, method: &str, path: &ObjectPath) -> Result<(), ApiError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{} {}", method, path));
        match *self.fail_status.lock().unwrap() {
            Some(status) => Err(ApiError::Status {
                method: method.to_string(),
                path: path.to_string(),
                status,
                body: r#"{"detail":"injected failure"}"#.to_string(),
            }),
            None => Ok(()),
        }
    }
}

fn not_found(path: &ObjectPath) -> ApiError {
    ApiError::NotFound {
        path: path.to_string(),
    }
}

/// Convert a PATCH scalar back to JSON, keeping the type the field has.
fn scalar(existing: Option<&Value>, value: &str) -> Value {
    match existing {
        Some(Value::String(_)) => Value::String(value.to_string()),
        _ => value
            .parse::<bool>()
            .map(Value::from)
            .or_else(|_| value.parse::<i64>().map(Value::from))
            .unwrap_or_else(|_| Value::String(value.to_string())),
    }
}

fn apply_operations(object: &mut Map<String, Value>, request: &UpdateRequest) {
    for operation in &request.operations {
        let path = operation.path.as_str();
        match operation.op {
            OperationKind::Replace => {
                let value = scalar(object.get(path), operation.value.as_deref().unwrap_or(""));
                object.insert(path.to_string(), value);
            }
            OperationKind::Add => {
                let entry = object
                    .entry(path.to_string())
                    .or_insert_with(|| Value::Array(Vec::new()));
                if let Value::Array(values) = entry {
                    for v in &operation.values {
                        let v = Value::String(v.clone());
                        if !values.contains(&v) {
                            values.push(v);
                        }
                    }
                }
            }
            OperationKind::Remove if operation.values.is_empty() => {
                object.remove(path);
            }
            OperationKind::Remove => {
                if let Some(Value::Array(values)) = object.get_mut(path) {
                    values.retain(|v| {
                        !v.as_str()
                            .is_some_and(|s| operation.values.iter().any(|r| r == s))
                    });
                }
            }
        }
    }
}

#[async_trait]
impl ConfigApi for FakeConfigApi {
    async fn get(&self, path: &ObjectPath) -> Result<Value, ApiError> {
        self.record("GET", path)?;
        self.object(path).ok_or_else(|| not_found(path))
    }

    async fn add(&self, collection: &ObjectPath, body: Value) -> Result<Value, ApiError> {
        self.record("POST", collection)?;
        let Value::Object(mut fields) = body else {
            return Err(ApiError::Status {
                method: "POST".to_string(),
                path: collection.to_string(),
                status: 400,
                body: "expected an object".to_string(),
            });
        };
        let name = NAME_FIELDS
            .iter()
            .find_map(|f| fields.get(*f).and_then(Value::as_str))
            .unwrap_or_default()
            .to_string();
        for f in ["mapperName", "behaviorName", "resourceTypeName"] {
            fields.remove(f);
        }
        let path = collection.join(name.clone());
        let mut objects = self.objects.lock().unwrap();
        if objects.contains_key(&path) {
            return Err(ApiError::Status {
                method: "POST".to_string(),
                path: collection.to_string(),
                status: 409,
                body: format!("{} already exists", name),
            });
        }
        fields.insert("id".to_string(), Value::String(name));
        let object = Value::Object(fields);
        objects.insert(path, object.clone());
        Ok(object)
    }

    async fn update(&self, path: &ObjectPath, request: &UpdateRequest) -> Result<Value, ApiError> {
        self.record("PATCH", path)?;
        self.updates.lock().unwrap().push(request.clone());
        let mut objects = self.objects.lock().unwrap();
        let object = objects.get_mut(path).ok_or_else(|| not_found(path))?;
        if let Value::Object(fields) = object {
            apply_operations(fields, request);
        }
        Ok(object.clone())
    }

    async fn delete(&self, path: &ObjectPath) -> Result<(), ApiError> {
        self.record("DELETE", path)?;
        match self.objects.lock().unwrap().remove(path) {
            Some(_) => Ok(()),
            None => Err(not_found(path)),
        }
    }

    async fn list(
        &self,
        collection: &ObjectPath,
        _filter: Option<&str>,
    ) -> Result<Vec<Value>, ApiError> {
        self.record("GET", collection)?;
        Ok(self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|(path, _)| path.parent().as_ref() == Some(collection))
            .map(|(_, object)| object.clone())
            .collect())
    }
}

/// The provider data handed to resources, backed by `api`.
pub(crate) fn provider_data(api: &Arc<FakeConfigApi>) -> ProviderData {
    api.clone()
}

/// Validate `config` and plan it like the host would.
pub(crate) fn plan(
    resource: &dyn Resource<ProviderData>,
    prior: Option<&AttributeValues>,
    config: &AttributeValues,
) -> AttributeValues {
    let mut diags = Diagnostics::new();
    validate_config(&resource.schema(), config, &mut diags);
    resource.validate_config(config, &mut diags);
    assert!(diags.is_empty(), "invalid config: {:?}", diags);
    plan_resource_change(&resource.schema(), prior, config).planned_state
}

/// Plan and apply `config`, the way the host does for one resource.
pub(crate) async fn apply(
    resource: &dyn Resource<ProviderData>,
    data: &ProviderData,
    prior: Option<&AttributeValues>,
    config: &AttributeValues,
) -> (Option<AttributeValues>, Diagnostics) {
    let planned = plan(resource, prior, config);
    let mut diags = Diagnostics::new();
    let state = match prior {
        None => resource.create(data, &planned, &mut diags).await,
        Some(prior) => resource.update(data, prior, &planned, &mut diags).await,
    };
    let state = state.map(|mut s| {
        s.null_unknowns();
        s
    });
    (state, diags)
}
