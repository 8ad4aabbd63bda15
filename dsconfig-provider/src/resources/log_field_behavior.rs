//! `dsconfig_log_field_behavior`: how access loggers treat individual fields.

use std::collections::BTreeSet;

use async_trait::async_trait;
use dsconfig_client::{
    models::log_field_behavior::*, ApiError, ConfigApi, Operation, UpdateRequest,
};
use dsconfig_resource::{
    attribute_model,
    diagnostics::Diagnostics,
    schema::{Attribute, Schema},
    value::{string_attr, string_set_attr, Attr},
};
use serde_json::json;

use super::{
    id_attribute, optional_string, parse_enum, required_enum, string_vec, ConfigKind, ObjectKeys,
};
use crate::operations::*;

attribute_model! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct LogFieldBehaviorModel {
        pub id: Attr<String>,
        pub name: Attr<String>,
        pub r#type: Attr<String>,
        pub description: Attr<String>,
        pub default_behavior: Attr<String>,
        pub preserve_field: Attr<BTreeSet<String>>,
        pub preserve_field_name: Attr<BTreeSet<String>>,
        pub omit_field: Attr<BTreeSet<String>>,
        pub omit_field_name: Attr<BTreeSet<String>>,
        pub redact_entire_value_field: Attr<BTreeSet<String>>,
        pub redact_entire_value_field_name: Attr<BTreeSet<String>>,
        pub tokenize_entire_value_field: Attr<BTreeSet<String>>,
        pub tokenize_entire_value_field_name: Attr<BTreeSet<String>>,
    }
}

/// The field set attributes with their API names, in declaration order.
const FIELD_SETS: &[(&str, &str, &str)] = &[
    (
        "preserve_field",
        "preserveField",
        "The log fields whose values should be logged with the intended value.",
    ),
    (
        "preserve_field_name",
        "preserveFieldName",
        "The names of any custom fields whose values should be preserved.",
    ),
    (
        "omit_field",
        "omitField",
        "The log fields that should be omitted entirely from log messages.",
    ),
    (
        "omit_field_name",
        "omitFieldName",
        "The names of any custom fields that should be omitted from log messages.",
    ),
    (
        "redact_entire_value_field",
        "redactEntireValueField",
        "The log fields whose values should be completely redacted in log messages.",
    ),
    (
        "redact_entire_value_field_name",
        "redactEntireValueFieldName",
        "The names of any custom fields whose values should be completely redacted.",
    ),
    (
        "tokenize_entire_value_field",
        "tokenizeEntireValueField",
        "The log fields whose values should be completely tokenized in log messages.",
    ),
    (
        "tokenize_entire_value_field_name",
        "tokenizeEntireValueFieldName",
        "The names of any custom fields whose values should be completely tokenized.",
    ),
];

impl LogFieldBehaviorModel {
    fn field_sets(&self) -> [&Attr<BTreeSet<String>>; 8] {
        [
            &self.preserve_field,
            &self.preserve_field_name,
            &self.omit_field,
            &self.omit_field_name,
            &self.redact_entire_value_field,
            &self.redact_entire_value_field_name,
            &self.tokenize_entire_value_field,
            &self.tokenize_entire_value_field_name,
        ]
    }
}

pub struct LogFieldBehavior;

#[async_trait]
impl ConfigKind for LogFieldBehavior {
    type Model = LogFieldBehaviorModel;
    type AddRequest = AddLogFieldBehaviorRequest;
    type Response = LogFieldBehaviorResponse;

    const KIND: &'static str = "log_field_behavior";
    const LIST_NAME: &'static str = "log_field_behaviors";
    const DISPLAY_NAME: &'static str = "Log Field Behavior";
    const KEYS: &'static [(&'static str, &'static str)] = &[("name", "name")];
    const POLYMORPHIC: bool = true;

    fn schema() -> Schema {
        let mut schema = Schema::new("Manages a Log Field Behavior.")
            .attribute("id", id_attribute())
            .attribute(
                "name",
                Attribute::string("Name of this config object.")
                    .required()
                    .requires_replace(),
            )
            .attribute(
                "type",
                Attribute::string("The type of Log Field Behavior resource.")
                    .required()
                    .requires_replace()
                    .one_of(LogFieldBehaviorType::VALUES),
            )
            .attribute(
                "description",
                Attribute::string("A description for this Log Field Behavior"),
            )
            .attribute(
                "default_behavior",
                Attribute::string(
                    "The default behavior for fields not explicitly listed in any other property.",
                )
                .optional_computed()
                .one_of(LogFieldDefaultBehavior::VALUES),
            );
        for (attribute, _, description) in FIELD_SETS {
            schema = schema.attribute(
                attribute,
                Attribute::string_set(description).with_default(json!([])),
            );
        }
        schema
    }

    fn build_add_request(
        keys: &ObjectKeys,
        plan: &LogFieldBehaviorModel,
        diags: &mut Diagnostics,
    ) -> Option<AddLogFieldBehaviorRequest> {
        let type_: LogFieldBehaviorType = required_enum(diags, "type", &plan.r#type)?;
        let request = AddLogFieldBehaviorProperties {
            behavior_name: keys.name().to_string(),
            properties: LogFieldBehaviorProperties {
                description: optional_string(&plan.description),
                default_behavior: parse_enum(diags, "default_behavior", &plan.default_behavior),
                preserve_field: string_vec(&plan.preserve_field),
                preserve_field_name: string_vec(&plan.preserve_field_name),
                omit_field: string_vec(&plan.omit_field),
                omit_field_name: string_vec(&plan.omit_field_name),
                redact_entire_value_field: string_vec(&plan.redact_entire_value_field),
                redact_entire_value_field_name: string_vec(&plan.redact_entire_value_field_name),
                tokenize_entire_value_field: string_vec(&plan.tokenize_entire_value_field),
                tokenize_entire_value_field_name: string_vec(
                    &plan.tokenize_entire_value_field_name,
                ),
            },
        };
        Some(match type_ {
            LogFieldBehaviorType::TextAccess => AddLogFieldBehaviorRequest::TextAccess(request),
            LogFieldBehaviorType::JsonFormattedAccess => {
                AddLogFieldBehaviorRequest::JsonFormattedAccess(request)
            }
        })
    }

    async fn get(
        api: &dyn ConfigApi,
        keys: &ObjectKeys,
    ) -> Result<LogFieldBehaviorResponse, ApiError> {
        api.get_log_field_behavior(keys.name()).await
    }

    async fn add(
        api: &dyn ConfigApi,
        _keys: &ObjectKeys,
        request: &AddLogFieldBehaviorRequest,
    ) -> Result<LogFieldBehaviorResponse, ApiError> {
        api.add_log_field_behavior(request).await
    }

    async fn update(
        api: &dyn ConfigApi,
        keys: &ObjectKeys,
        request: &UpdateRequest,
    ) -> Result<LogFieldBehaviorResponse, ApiError> {
        api.update_log_field_behavior(keys.name(), request).await
    }

    async fn delete(api: &dyn ConfigApi, keys: &ObjectKeys) -> Result<(), ApiError> {
        api.delete_log_field_behavior(keys.name()).await
    }

    async fn list(
        api: &dyn ConfigApi,
        _parents: &ObjectKeys,
        filter: Option<&str>,
    ) -> Result<Vec<LogFieldBehaviorResponse>, ApiError> {
        api.list_log_field_behaviors(filter).await
    }

    fn response_id(response: &LogFieldBehaviorResponse) -> &str {
        &response.object().id
    }

    fn response_type(response: &LogFieldBehaviorResponse) -> Option<&'static str> {
        Some(response.type_().as_str())
    }

    fn read_response(response: &LogFieldBehaviorResponse, model: &mut LogFieldBehaviorModel) {
        let object = response.object();
        let p = &object.properties;
        model.id = Attr::Known(object.id.clone());
        model.r#type = Attr::Known(response.type_().to_string());
        model.description = string_attr(p.description.as_deref(), &model.description);
        model.default_behavior = p.default_behavior.map(|b| b.to_string()).into();
        model.preserve_field = string_set_attr(&p.preserve_field);
        model.preserve_field_name = string_set_attr(&p.preserve_field_name);
        model.omit_field = string_set_attr(&p.omit_field);
        model.omit_field_name = string_set_attr(&p.omit_field_name);
        model.redact_entire_value_field = string_set_attr(&p.redact_entire_value_field);
        model.redact_entire_value_field_name = string_set_attr(&p.redact_entire_value_field_name);
        model.tokenize_entire_value_field = string_set_attr(&p.tokenize_entire_value_field);
        model.tokenize_entire_value_field_name =
            string_set_attr(&p.tokenize_entire_value_field_name);
    }

    fn create_operations(
        plan: &LogFieldBehaviorModel,
        state: &LogFieldBehaviorModel,
    ) -> Vec<Operation> {
        let mut ops = Vec::new();
        add_string_operation_if_necessary(&mut ops, &plan.description, &state.description, "description");
        add_string_operation_if_necessary(
            &mut ops,
            &plan.default_behavior,
            &state.default_behavior,
            "defaultBehavior",
        );
        for ((plan, state), (_, path, _)) in plan
            .field_sets()
            .into_iter()
            .zip(state.field_sets())
            .zip(FIELD_SETS)
        {
            add_string_set_operations_if_necessary(&mut ops, plan, state, path);
        }
        ops
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use dsconfig_resource::{framework::Resource, value::AttributeValues};

    use super::*;
    use crate::resources::{
        test_support::{apply, provider_data, FakeConfigApi},
        ConfigResource, Variant,
    };

    fn config() -> AttributeValues {
        AttributeValues::new()
            .with("name", "Redact passwords")
            .with("type", "json-formatted-access")
            .with("default_behavior", "preserve")
            .with("redact_entire_value_field", json!(["filter", "dn"]))
    }

    #[tokio::test]
    async fn create_and_update() {
        let fake = Arc::new(FakeConfigApi::new());
        let data = provider_data(&fake);
        let resource = ConfigResource::<LogFieldBehavior>::new(Variant::Managed);

        let (state, diags) = apply(&resource, &data, None, &config()).await;
        assert!(diags.is_empty(), "{:?}", diags);
        let state = state.unwrap();
        assert_eq!(state.raw("type"), Some(&json!("json-formatted-access")));
        assert_eq!(state.raw("redact_entire_value_field"), Some(&json!(["dn", "filter"])));
        assert_eq!(state.raw("omit_field"), Some(&json!([])));

        let body = fake.object(&log_field_behavior_path("Redact passwords")).unwrap();
        assert_eq!(
            body["schemas"],
            json!(["urn:pingidentity:schemas:configuration:2.0:log-field-behavior:json-formatted-access"])
        );
        assert_eq!(body["defaultBehavior"], json!("preserve"));

        let config = config()
            .with("default_behavior", "omit")
            .with("redact_entire_value_field", json!(["filter"]))
            .with("tokenize_entire_value_field", json!(["dn"]));
        let (state, diags) = apply(&resource, &data, Some(&state), &config).await;
        assert!(diags.is_empty(), "{:?}", diags);
        assert_eq!(
            fake.updates().last().unwrap().operations,
            vec![
                Operation::replace("defaultBehavior", "omit"),
                Operation::remove_values("redactEntireValueField", vec!["dn".to_string()]),
                Operation::add_values("tokenizeEntireValueField", vec!["dn".to_string()]),
            ]
        );
        let state = state.unwrap();
        assert_eq!(state.raw("tokenize_entire_value_field"), Some(&json!(["dn"])));
    }

    #[tokio::test]
    async fn invalid_default_behavior() {
        let fake = Arc::new(FakeConfigApi::new());
        let data = provider_data(&fake);
        let resource = ConfigResource::<LogFieldBehavior>::new(Variant::Managed);

        let planned = config().with("default_behavior", "forget");
        let mut diags = Diagnostics::new();
        assert_eq!(resource.create(&data, &planned, &mut diags).await, None);
        assert_eq!(
            diags.iter().next().unwrap().attribute.as_deref(),
            Some("default_behavior")
        );
        assert!(fake.calls().is_empty());
    }

    #[test]
    fn every_field_set_is_declared() {
        let schema = LogFieldBehavior::schema();
        for (attribute, _, _) in FIELD_SETS {
            assert!(schema.get(attribute).is_some(), "{}", attribute);
        }
        let model = LogFieldBehaviorModel::default();
        assert_eq!(model.field_sets().len(), FIELD_SETS.len());
    }
}
