//! `dsconfig_scim_subattribute`: a subattribute of a SCIM schema attribute.

use std::collections::BTreeSet;

use async_trait::async_trait;
use dsconfig_client::{
    models::scim_subattribute::*, ApiError, ConfigApi, Operation, UpdateRequest,
};
use dsconfig_resource::{
    attribute_model,
    diagnostics::Diagnostics,
    schema::{Attribute, Schema},
    value::{string_attr, string_set_attr, Attr},
};
use serde_json::json;

use super::{id_attribute, optional_string, parse_enum, string_vec, ConfigKind, ObjectKeys};
use crate::operations::*;

attribute_model! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct ScimSubattributeModel {
        pub id: Attr<String>,
        pub scim_schema_name: Attr<String>,
        pub scim_attribute_name: Attr<String>,
        pub name: Attr<String>,
        pub description: Attr<String>,
        pub r#type: Attr<String>,
        pub required: Attr<bool>,
        pub case_exact: Attr<bool>,
        pub multi_valued: Attr<bool>,
        pub canonical_value: Attr<BTreeSet<String>>,
        pub mutability: Attr<String>,
        pub returned: Attr<String>,
        pub reference_type: Attr<BTreeSet<String>>,
    }
}

pub struct ScimSubattribute;

#[async_trait]
impl ConfigKind for ScimSubattribute {
    type Model = ScimSubattributeModel;
    type AddRequest = AddScimSubattributeRequest;
    type Response = ScimSubattributeResponse;

    const KIND: &'static str = "scim_subattribute";
    const LIST_NAME: &'static str = "scim_subattributes";
    const DISPLAY_NAME: &'static str = "Scim Subattribute";
    const KEYS: &'static [(&'static str, &'static str)] = &[
        ("scim_schema_name", "scim-schema-name"),
        ("scim_attribute_name", "scim-attribute-name"),
        ("name", "scim-subattribute-name"),
    ];
    const POLYMORPHIC: bool = false;

    fn schema() -> Schema {
        Schema::new("Manages a Scim Subattribute.")
            .attribute("id", id_attribute())
            .attribute(
                "scim_schema_name",
                Attribute::string("Name of the parent SCIM Schema")
                    .required()
                    .requires_replace(),
            )
            .attribute(
                "scim_attribute_name",
                Attribute::string("Name of the parent SCIM Attribute")
                    .required()
                    .requires_replace(),
            )
            .attribute(
                "name",
                Attribute::string("Name of this config object.")
                    .required()
                    .requires_replace(),
            )
            .attribute(
                "description",
                Attribute::string("A description of the attribute."),
            )
            .attribute(
                "type",
                Attribute::string("Specifies the data type for this sub-attribute.")
                    .with_default("string")
                    .one_of(ScimAttributeType::VALUES),
            )
            .attribute(
                "required",
                Attribute::bool("Specifies whether this sub-attribute is required.")
                    .with_default(false),
            )
            .attribute(
                "case_exact",
                Attribute::bool(
                    "Specifies whether the sub-attribute values are case sensitive.",
                )
                .with_default(false),
            )
            .attribute(
                "multi_valued",
                Attribute::bool("Specifies whether this attribute may have multiple values.")
                    .with_default(false),
            )
            .attribute(
                "canonical_value",
                Attribute::string_set(
                    "Specifies the suggested canonical type values for the sub-attribute.",
                )
                .with_default(json!([])),
            )
            .attribute(
                "mutability",
                Attribute::string(
                    "Specifies the circumstances under which the values of the sub-attribute can be written.",
                )
                .with_default("read-write")
                .one_of(ScimMutability::VALUES),
            )
            .attribute(
                "returned",
                Attribute::string(
                    "Specifies the circumstances under which the values of the sub-attribute are returned in response to a request.",
                )
                .with_default("by-default")
                .one_of(ScimReturned::VALUES),
            )
            .attribute(
                "reference_type",
                Attribute::string_set(
                    "Specifies the SCIM resource types that may be referenced.",
                )
                .with_default(json!([])),
            )
    }

    fn build_add_request(
        keys: &ObjectKeys,
        plan: &ScimSubattributeModel,
        diags: &mut Diagnostics,
    ) -> Option<AddScimSubattributeRequest> {
        Some(AddScimSubattributeRequest {
            name: keys.name().to_string(),
            properties: ScimSubattributeProperties {
                description: optional_string(&plan.description),
                type_: parse_enum(diags, "type", &plan.r#type),
                required: plan.required.known().copied(),
                case_exact: plan.case_exact.known().copied(),
                multi_valued: plan.multi_valued.known().copied(),
                canonical_value: string_vec(&plan.canonical_value),
                mutability: parse_enum(diags, "mutability", &plan.mutability),
                returned: parse_enum(diags, "returned", &plan.returned),
                reference_type: string_vec(&plan.reference_type),
            },
        })
    }

    async fn get(
        api: &dyn ConfigApi,
        keys: &ObjectKeys,
    ) -> Result<ScimSubattributeResponse, ApiError> {
        api.get_scim_subattribute(keys.parent(0), keys.parent(1), keys.name())
            .await
    }

    async fn add(
        api: &dyn ConfigApi,
        keys: &ObjectKeys,
        request: &AddScimSubattributeRequest,
    ) -> Result<ScimSubattributeResponse, ApiError> {
        api.add_scim_subattribute(keys.parent(0), keys.parent(1), request)
            .await
    }

    async fn update(
        api: &dyn ConfigApi,
        keys: &ObjectKeys,
        request: &UpdateRequest,
    ) -> Result<ScimSubattributeResponse, ApiError> {
        api.update_scim_subattribute(keys.parent(0), keys.parent(1), keys.name(), request)
            .await
    }

    async fn delete(api: &dyn ConfigApi, keys: &ObjectKeys) -> Result<(), ApiError> {
        api.delete_scim_subattribute(keys.parent(0), keys.parent(1), keys.name())
            .await
    }

    async fn list(
        api: &dyn ConfigApi,
        parents: &ObjectKeys,
        filter: Option<&str>,
    ) -> Result<Vec<ScimSubattributeResponse>, ApiError> {
        api.list_scim_subattributes(parents.parent(0), parents.parent(1), filter)
            .await
    }

    fn response_id(response: &ScimSubattributeResponse) -> &str {
        &response.id
    }

    fn read_response(response: &ScimSubattributeResponse, model: &mut ScimSubattributeModel) {
        let p = &response.properties;
        model.id = Attr::Known(response.id.clone());
        model.name = Attr::Known(response.name.clone());
        model.description = string_attr(p.description.as_deref(), &model.description);
        model.r#type = p.type_.map(|t| t.to_string()).into();
        model.required = p.required.into();
        model.case_exact = p.case_exact.into();
        model.multi_valued = p.multi_valued.into();
        model.canonical_value = string_set_attr(&p.canonical_value);
        model.mutability = p.mutability.map(|m| m.to_string()).into();
        model.returned = p.returned.map(|r| r.to_string()).into();
        model.reference_type = string_set_attr(&p.reference_type);
    }

    fn create_operations(
        plan: &ScimSubattributeModel,
        state: &ScimSubattributeModel,
    ) -> Vec<Operation> {
        let mut ops = Vec::new();
        add_string_operation_if_necessary(&mut ops, &plan.description, &state.description, "description");
        add_string_operation_if_necessary(&mut ops, &plan.r#type, &state.r#type, "type");
        add_bool_operation_if_necessary(&mut ops, &plan.required, &state.required, "required");
        add_bool_operation_if_necessary(&mut ops, &plan.case_exact, &state.case_exact, "caseExact");
        add_bool_operation_if_necessary(&mut ops, &plan.multi_valued, &state.multi_valued, "multiValued");
        add_string_set_operations_if_necessary(
            &mut ops,
            &plan.canonical_value,
            &state.canonical_value,
            "canonicalValue",
        );
        add_string_operation_if_necessary(&mut ops, &plan.mutability, &state.mutability, "mutability");
        add_string_operation_if_necessary(&mut ops, &plan.returned, &state.returned, "returned");
        add_string_set_operations_if_necessary(
            &mut ops,
            &plan.reference_type,
            &state.reference_type,
            "referenceType",
        );
        ops
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use dsconfig_resource::{
        framework::Resource,
        value::AttributeValues,
    };

    use super::*;
    use crate::resources::{
        test_support::{apply, provider_data, FakeConfigApi},
        ConfigListDataSource, ConfigResource, Variant,
    };

    fn config() -> AttributeValues {
        AttributeValues::new()
            .with("scim_schema_name", "urn:com:example:account")
            .with("scim_attribute_name", "address")
            .with("name", "street")
            .with("case_exact", true)
    }

    #[tokio::test]
    async fn nested_lifecycle() {
        let fake = Arc::new(FakeConfigApi::new());
        let data = provider_data(&fake);
        let resource = ConfigResource::<ScimSubattribute>::new(Variant::Managed);

        let (state, diags) = apply(&resource, &data, None, &config()).await;
        assert!(diags.is_empty(), "{:?}", diags);
        let state = state.unwrap();
        assert_eq!(
            fake.calls(),
            vec!["POST /scim-schemas/urn:com:example:account/scim-attributes/address/scim-subattributes"]
        );
        assert_eq!(state.raw("type"), Some(&json!("string")));
        assert_eq!(state.raw("mutability"), Some(&json!("read-write")));
        assert_eq!(state.raw("scim_attribute_name"), Some(&json!("address")));

        let config = config().with("returned", "always");
        let (state, diags) = apply(&resource, &data, Some(&state), &config).await;
        assert!(diags.is_empty(), "{:?}", diags);
        assert_eq!(
            fake.updates().last().unwrap().operations,
            vec![Operation::replace("returned", "always")]
        );

        let mut diags = Diagnostics::new();
        resource.delete(&data, &state.unwrap(), &mut diags).await;
        assert!(diags.is_empty());
        assert_eq!(
            fake.calls().last().unwrap(),
            "DELETE /scim-schemas/urn:com:example:account/scim-attributes/address/scim-subattributes/street"
        );
    }

    #[test]
    fn import_needs_three_segments() {
        let resource = ConfigResource::<ScimSubattribute>::new(Variant::Managed);

        let mut diags = Diagnostics::new();
        let imported = resource
            .import_state("urn:com:example:account/address/street", &mut diags)
            .unwrap();
        assert_eq!(imported.raw("scim_schema_name"), Some(&json!("urn:com:example:account")));
        assert_eq!(imported.raw("scim_attribute_name"), Some(&json!("address")));
        assert_eq!(imported.raw("name"), Some(&json!("street")));

        let mut diags = Diagnostics::new();
        assert_eq!(resource.import_state("address/street", &mut diags), None);
        assert_eq!(
            diags.iter().next().unwrap().detail,
            "Expected import identifier with format: [scim-schema-name]/[scim-attribute-name]/[scim-subattribute-name]. Got: \"address/street\""
        );
    }

    #[test]
    fn type_is_an_ordinary_attribute() {
        let default = ConfigResource::<ScimSubattribute>::new(Variant::Default);
        let schema = default.schema();
        let type_ = schema.get("type").unwrap();
        assert!(type_.optional && type_.computed);
        assert!(schema.get("scim_attribute_name").unwrap().required);
    }

    #[tokio::test]
    async fn list_below_parents() {
        let fake = Arc::new(FakeConfigApi::new());
        let data = provider_data(&fake);
        fake.insert(
            scim_subattribute_path("urn:com:example:account", "address", "street"),
            json!({"id": "street", "name": "street"}),
        );
        fake.insert(
            scim_subattribute_path("urn:com:example:account", "phone", "value"),
            json!({"id": "value", "name": "value"}),
        );

        let list = ConfigListDataSource::<ScimSubattribute>::boxed();
        let schema = list.schema();
        assert!(schema.get("scim_schema_name").unwrap().required);
        assert!(schema.get("name").is_none());

        let config = AttributeValues::new()
            .with("scim_schema_name", "urn:com:example:account")
            .with("scim_attribute_name", "address");
        let mut diags = Diagnostics::new();
        let state = list.read(&data, &config, &mut diags).await.unwrap();
        assert_eq!(state.raw("ids"), Some(&json!(["street"])));
    }
}
