//! `dsconfig_rest_resource_type`: LDAP entries exposed to delegated admins.

use std::collections::BTreeSet;

use async_trait::async_trait;
use dsconfig_client::{
    models::rest_resource_type::*, ApiError, ConfigApi, Operation, UpdateRequest,
};
use dsconfig_resource::{
    attribute_model,
    diagnostics::Diagnostics,
    schema::{Attribute, Schema},
    value::{string_attr, string_set_attr, Attr},
};
use serde_json::json;

use super::{
    id_attribute, optional_string, required, required_enum, string_vec, ConfigKind, ObjectKeys,
};
use crate::operations::*;

attribute_model! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct RestResourceTypeModel {
        pub id: Attr<String>,
        pub name: Attr<String>,
        pub r#type: Attr<String>,
        pub description: Attr<String>,
        pub enabled: Attr<bool>,
        pub resource_endpoint: Attr<String>,
        pub structural_ldap_objectclass: Attr<String>,
        pub auxiliary_ldap_objectclass: Attr<BTreeSet<String>>,
        pub search_base_dn: Attr<String>,
        pub include_filter: Attr<BTreeSet<String>>,
        pub parent_dn: Attr<String>,
        pub parent_resource_type: Attr<String>,
        pub relative_dn_from_parent_resource: Attr<String>,
        pub create_rdn_attribute_type: Attr<String>,
        pub display_name: Attr<String>,
        pub search_filter_pattern: Attr<String>,
        pub primary_display_attribute_type: Attr<String>,
        pub delegated_admin_search_size_limit: Attr<i64>,
        pub delegated_admin_report_size_limit: Attr<i64>,
        pub members_column_name: Attr<String>,
        pub nonmembers_column_name: Attr<String>,
        pub password_attribute_category: Attr<String>,
        pub password_display_order_index: Attr<i64>,
    }
}

const USER: &str = "user";
const GROUP: &str = "group";

pub struct RestResourceType;

impl RestResourceType {
    fn properties(
        plan: &RestResourceTypeModel,
        diags: &mut Diagnostics,
    ) -> RestResourceTypeProperties {
        RestResourceTypeProperties {
            description: optional_string(&plan.description),
            enabled: required(diags, "enabled", &plan.enabled).unwrap_or_default(),
            resource_endpoint: required(diags, "resource_endpoint", &plan.resource_endpoint)
                .unwrap_or_default(),
            structural_ldap_objectclass: required(
                diags,
                "structural_ldap_objectclass",
                &plan.structural_ldap_objectclass,
            )
            .unwrap_or_default(),
            auxiliary_ldap_objectclass: string_vec(&plan.auxiliary_ldap_objectclass),
            search_base_dn: required(diags, "search_base_dn", &plan.search_base_dn)
                .unwrap_or_default(),
            include_filter: string_vec(&plan.include_filter),
            parent_dn: optional_string(&plan.parent_dn),
            parent_resource_type: optional_string(&plan.parent_resource_type),
            relative_dn_from_parent_resource: optional_string(
                &plan.relative_dn_from_parent_resource,
            ),
            create_rdn_attribute_type: optional_string(&plan.create_rdn_attribute_type),
            display_name: optional_string(&plan.display_name),
            search_filter_pattern: optional_string(&plan.search_filter_pattern),
            primary_display_attribute_type: optional_string(&plan.primary_display_attribute_type),
            delegated_admin_search_size_limit: plan
                .delegated_admin_search_size_limit
                .known()
                .copied(),
            delegated_admin_report_size_limit: plan
                .delegated_admin_report_size_limit
                .known()
                .copied(),
        }
    }
}

#[async_trait]
impl ConfigKind for RestResourceType {
    type Model = RestResourceTypeModel;
    type AddRequest = AddRestResourceTypeRequest;
    type Response = RestResourceTypeResponse;

    const KIND: &'static str = "rest_resource_type";
    const LIST_NAME: &'static str = "rest_resource_types";
    const DISPLAY_NAME: &'static str = "Rest Resource Type";
    const KEYS: &'static [(&'static str, &'static str)] = &[("name", "name")];
    const POLYMORPHIC: bool = true;

    fn schema() -> Schema {
        Schema::new("Manages a Rest Resource Type.")
            .attribute("id", id_attribute())
            .attribute(
                "name",
                Attribute::string("Name of this config object.")
                    .required()
                    .requires_replace(),
            )
            .attribute(
                "type",
                Attribute::string("The type of REST Resource Type resource.")
                    .required()
                    .requires_replace()
                    .one_of(RestResourceTypeType::VALUES),
            )
            .attribute(
                "description",
                Attribute::string("A description for this REST Resource Type"),
            )
            .attribute(
                "enabled",
                Attribute::bool("Indicates whether the REST Resource Type is enabled.").required(),
            )
            .attribute(
                "resource_endpoint",
                Attribute::string(
                    "The HTTP addressable endpoint of this REST Resource Type relative to a REST API base URL.",
                )
                .required(),
            )
            .attribute(
                "structural_ldap_objectclass",
                Attribute::string(
                    "Specifies the LDAP structural object class that should be exposed by this REST Resource Type.",
                )
                .required(),
            )
            .attribute(
                "auxiliary_ldap_objectclass",
                Attribute::string_set(
                    "Specifies an auxiliary LDAP object class that should be exposed by this REST Resource Type.",
                )
                .with_default(json!([])),
            )
            .attribute(
                "search_base_dn",
                Attribute::string(
                    "Specifies the base DN of the branch of the LDAP directory where resources of this type are located.",
                )
                .required(),
            )
            .attribute(
                "include_filter",
                Attribute::string_set(
                    "The set of LDAP filters that resources of this type must match.",
                )
                .with_default(json!([])),
            )
            .attribute(
                "parent_dn",
                Attribute::string(
                    "Specifies the DN of the parent entry for new resources of this type, when a parent resource is not provided by the app.",
                ),
            )
            .attribute(
                "parent_resource_type",
                Attribute::string(
                    "Specifies the name of another resource type which may be a parent of new resources of this type.",
                ),
            )
            .attribute(
                "relative_dn_from_parent_resource",
                Attribute::string(
                    "Specifies a template for a relative DN from the parent resource which identifies the parent entry for a new resource of this type.",
                ),
            )
            .attribute(
                "create_rdn_attribute_type",
                Attribute::string(
                    "Specifies the name of the LDAP attribute type to be used as the RDN of new resources.",
                ),
            )
            .attribute(
                "display_name",
                Attribute::string("A human readable display name for this resource type."),
            )
            .attribute(
                "search_filter_pattern",
                Attribute::string(
                    "Specifies the LDAP filter that should be used when searching for resources matching provided search text.",
                ),
            )
            .attribute(
                "primary_display_attribute_type",
                Attribute::string(
                    "Specifies the name of the LDAP attribute type which should be used as the primary display name.",
                ),
            )
            .attribute(
                "delegated_admin_search_size_limit",
                Attribute::int64(
                    "The maximum number of resources that may be returned from a search request.",
                )
                .with_default(1000),
            )
            .attribute(
                "delegated_admin_report_size_limit",
                Attribute::int64(
                    "The maximum number of resources that may be included in a report.",
                )
                .with_default(100000),
            )
            .attribute(
                "members_column_name",
                Attribute::string(
                    "Specifies the name of the group member column that will be displayed in the Delegated Admin UI",
                )
                .applies_to(&[GROUP]),
            )
            .attribute(
                "nonmembers_column_name",
                Attribute::string(
                    "Specifies the name of the group nonmember column that will be displayed in the Delegated Admin UI",
                )
                .applies_to(&[GROUP]),
            )
            .attribute(
                "password_attribute_category",
                Attribute::string(
                    "Specifies which attribute category the password belongs to.",
                )
                .applies_to(&[USER]),
            )
            .attribute(
                "password_display_order_index",
                Attribute::int64(
                    "This property determines the display order for the password within its attribute category.",
                )
                .applies_to(&[USER]),
            )
    }

    fn build_add_request(
        keys: &ObjectKeys,
        plan: &RestResourceTypeModel,
        diags: &mut Diagnostics,
    ) -> Option<AddRestResourceTypeRequest> {
        let type_: RestResourceTypeType = required_enum(diags, "type", &plan.r#type)?;
        let resource_type_name = keys.name().to_string();
        let properties = Self::properties(plan, diags);
        Some(match type_ {
            RestResourceTypeType::User => {
                AddRestResourceTypeRequest::User(AddUserRestResourceTypeRequest {
                    resource_type_name,
                    properties,
                    user: UserRestResourceTypeProperties {
                        password_attribute_category: optional_string(
                            &plan.password_attribute_category,
                        ),
                        password_display_order_index: plan
                            .password_display_order_index
                            .known()
                            .copied(),
                    },
                })
            }
            RestResourceTypeType::Generic => {
                AddRestResourceTypeRequest::Generic(AddGenericRestResourceTypeRequest {
                    resource_type_name,
                    properties,
                })
            }
            RestResourceTypeType::Group => {
                AddRestResourceTypeRequest::Group(AddGroupRestResourceTypeRequest {
                    resource_type_name,
                    properties,
                    group: GroupRestResourceTypeProperties {
                        members_column_name: optional_string(&plan.members_column_name),
                        nonmembers_column_name: optional_string(&plan.nonmembers_column_name),
                    },
                })
            }
        })
    }

    async fn get(
        api: &dyn ConfigApi,
        keys: &ObjectKeys,
    ) -> Result<RestResourceTypeResponse, ApiError> {
        api.get_rest_resource_type(keys.name()).await
    }

    async fn add(
        api: &dyn ConfigApi,
        _keys: &ObjectKeys,
        request: &AddRestResourceTypeRequest,
    ) -> Result<RestResourceTypeResponse, ApiError> {
        api.add_rest_resource_type(request).await
    }

    async fn update(
        api: &dyn ConfigApi,
        keys: &ObjectKeys,
        request: &UpdateRequest,
    ) -> Result<RestResourceTypeResponse, ApiError> {
        api.update_rest_resource_type(keys.name(), request).await
    }

    async fn delete(api: &dyn ConfigApi, keys: &ObjectKeys) -> Result<(), ApiError> {
        api.delete_rest_resource_type(keys.name()).await
    }

    async fn list(
        api: &dyn ConfigApi,
        _parents: &ObjectKeys,
        filter: Option<&str>,
    ) -> Result<Vec<RestResourceTypeResponse>, ApiError> {
        api.list_rest_resource_types(filter).await
    }

    fn response_id(response: &RestResourceTypeResponse) -> &str {
        response.id()
    }

    fn response_type(response: &RestResourceTypeResponse) -> Option<&'static str> {
        Some(response.type_().as_str())
    }

    fn read_response(response: &RestResourceTypeResponse, model: &mut RestResourceTypeModel) {
        let expected = std::mem::take(model);
        let p = response.properties();
        model.name = expected.name.clone();
        model.id = Attr::Known(response.id().to_string());
        model.r#type = Attr::Known(response.type_().to_string());
        model.description = string_attr(p.description.as_deref(), &expected.description);
        model.enabled = Attr::Known(p.enabled);
        model.resource_endpoint = Attr::Known(p.resource_endpoint.clone());
        model.structural_ldap_objectclass = Attr::Known(p.structural_ldap_objectclass.clone());
        model.auxiliary_ldap_objectclass = string_set_attr(&p.auxiliary_ldap_objectclass);
        model.search_base_dn = Attr::Known(p.search_base_dn.clone());
        model.include_filter = string_set_attr(&p.include_filter);
        model.parent_dn = string_attr(p.parent_dn.as_deref(), &expected.parent_dn);
        model.parent_resource_type =
            string_attr(p.parent_resource_type.as_deref(), &expected.parent_resource_type);
        model.relative_dn_from_parent_resource = string_attr(
            p.relative_dn_from_parent_resource.as_deref(),
            &expected.relative_dn_from_parent_resource,
        );
        model.create_rdn_attribute_type = string_attr(
            p.create_rdn_attribute_type.as_deref(),
            &expected.create_rdn_attribute_type,
        );
        model.display_name = string_attr(p.display_name.as_deref(), &expected.display_name);
        model.search_filter_pattern =
            string_attr(p.search_filter_pattern.as_deref(), &expected.search_filter_pattern);
        model.primary_display_attribute_type = string_attr(
            p.primary_display_attribute_type.as_deref(),
            &expected.primary_display_attribute_type,
        );
        model.delegated_admin_search_size_limit = p.delegated_admin_search_size_limit.into();
        model.delegated_admin_report_size_limit = p.delegated_admin_report_size_limit.into();

        match response {
            RestResourceTypeResponse::User(r) => {
                model.password_attribute_category = string_attr(
                    r.user.password_attribute_category.as_deref(),
                    &expected.password_attribute_category,
                );
                model.password_display_order_index = r.user.password_display_order_index.into();
            }
            RestResourceTypeResponse::Generic(_) => {}
            RestResourceTypeResponse::Group(r) => {
                model.members_column_name = string_attr(
                    r.group.members_column_name.as_deref(),
                    &expected.members_column_name,
                );
                model.nonmembers_column_name = string_attr(
                    r.group.nonmembers_column_name.as_deref(),
                    &expected.nonmembers_column_name,
                );
            }
        }
    }

    fn create_operations(
        plan: &RestResourceTypeModel,
        state: &RestResourceTypeModel,
    ) -> Vec<Operation> {
        let mut ops = Vec::new();
        add_string_operation_if_necessary(&mut ops, &plan.description, &state.description, "description");
        add_bool_operation_if_necessary(&mut ops, &plan.enabled, &state.enabled, "enabled");
        add_string_operation_if_necessary(
            &mut ops,
            &plan.resource_endpoint,
            &state.resource_endpoint,
            "resourceEndpoint",
        );
        add_string_operation_if_necessary(
            &mut ops,
            &plan.structural_ldap_objectclass,
            &state.structural_ldap_objectclass,
            "structuralLDAPObjectclass",
        );
        add_string_set_operations_if_necessary(
            &mut ops,
            &plan.auxiliary_ldap_objectclass,
            &state.auxiliary_ldap_objectclass,
            "auxiliaryLDAPObjectclass",
        );
        add_string_operation_if_necessary(
            &mut ops,
            &plan.search_base_dn,
            &state.search_base_dn,
            "searchBaseDN",
        );
        add_string_set_operations_if_necessary(
            &mut ops,
            &plan.include_filter,
            &state.include_filter,
            "includeFilter",
        );
        add_string_operation_if_necessary(&mut ops, &plan.parent_dn, &state.parent_dn, "parentDN");
        add_string_operation_if_necessary(
            &mut ops,
            &plan.parent_resource_type,
            &state.parent_resource_type,
            "parentResourceType",
        );
        add_string_operation_if_necessary(
            &mut ops,
            &plan.relative_dn_from_parent_resource,
            &state.relative_dn_from_parent_resource,
            "relativeDNFromParentResource",
        );
        add_string_operation_if_necessary(
            &mut ops,
            &plan.create_rdn_attribute_type,
            &state.create_rdn_attribute_type,
            "createRDNAttributeType",
        );
        add_string_operation_if_necessary(&mut ops, &plan.display_name, &state.display_name, "displayName");
        add_string_operation_if_necessary(
            &mut ops,
            &plan.search_filter_pattern,
            &state.search_filter_pattern,
            "searchFilterPattern",
        );
        add_string_operation_if_necessary(
            &mut ops,
            &plan.primary_display_attribute_type,
            &state.primary_display_attribute_type,
            "primaryDisplayAttributeType",
        );
        add_int64_operation_if_necessary(
            &mut ops,
            &plan.delegated_admin_search_size_limit,
            &state.delegated_admin_search_size_limit,
            "delegatedAdminSearchSizeLimit",
        );
        add_int64_operation_if_necessary(
            &mut ops,
            &plan.delegated_admin_report_size_limit,
            &state.delegated_admin_report_size_limit,
            "delegatedAdminReportSizeLimit",
        );
        add_string_operation_if_necessary(
            &mut ops,
            &plan.members_column_name,
            &state.members_column_name,
            "membersColumnName",
        );
        add_string_operation_if_necessary(
            &mut ops,
            &plan.nonmembers_column_name,
            &state.nonmembers_column_name,
            "nonmembersColumnName",
        );
        add_string_operation_if_necessary(
            &mut ops,
            &plan.password_attribute_category,
            &state.password_attribute_category,
            "passwordAttributeCategory",
        );
        add_int64_operation_if_necessary(
            &mut ops,
            &plan.password_display_order_index,
            &state.password_display_order_index,
            "passwordDisplayOrderIndex",
        );
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

    fn users() -> AttributeValues {
        AttributeValues::new()
            .with("name", "Users")
            .with("type", "user")
            .with("enabled", true)
            .with("resource_endpoint", "users")
            .with("structural_ldap_objectclass", "inetOrgPerson")
            .with("search_base_dn", "ou=people,dc=example,dc=com")
    }

    #[tokio::test]
    async fn defaults_are_applied_and_sent() {
        let fake = Arc::new(FakeConfigApi::new());
        let data = provider_data(&fake);
        let resource = ConfigResource::<RestResourceType>::new(Variant::Managed);

        let (state, diags) = apply(&resource, &data, None, &users()).await;
        assert!(diags.is_empty(), "{:?}", diags);
        let state = state.unwrap();
        assert_eq!(state.raw("delegated_admin_search_size_limit"), Some(&json!(1000)));
        assert_eq!(state.raw("delegated_admin_report_size_limit"), Some(&json!(100000)));
        assert!(state.is_null("members_column_name"));

        let body = fake.object(&rest_resource_type_path("Users")).unwrap();
        assert_eq!(body["structuralLDAPObjectclass"], json!("inetOrgPerson"));
        assert_eq!(body["searchBaseDN"], json!("ou=people,dc=example,dc=com"));
        assert_eq!(body["delegatedAdminSearchSizeLimit"], json!(1000));
        assert_eq!(
            body["schemas"],
            json!(["urn:pingidentity:schemas:configuration:2.0:rest-resource-type:user"])
        );
    }

    #[tokio::test]
    async fn integer_changes_are_sent_as_strings() {
        let fake = Arc::new(FakeConfigApi::new());
        let data = provider_data(&fake);
        let resource = ConfigResource::<RestResourceType>::new(Variant::Managed);

        let (state, _) = apply(&resource, &data, None, &users()).await;
        let config = users()
            .with("delegated_admin_search_size_limit", 50)
            .with("password_display_order_index", 2);
        let (state, diags) = apply(&resource, &data, state.as_ref(), &config).await;
        assert!(diags.is_empty(), "{:?}", diags);
        assert_eq!(
            fake.updates().last().unwrap().operations,
            vec![
                Operation::replace("delegatedAdminSearchSizeLimit", "50"),
                Operation::replace("passwordDisplayOrderIndex", "2"),
            ]
        );
        let state = state.unwrap();
        assert_eq!(state.raw("delegated_admin_search_size_limit"), Some(&json!(50)));
    }

    #[tokio::test]
    async fn group_attributes_are_read_for_groups_only() {
        let fake = Arc::new(FakeConfigApi::new());
        let data = provider_data(&fake);
        let resource = ConfigResource::<RestResourceType>::new(Variant::Managed);
        fake.insert(
            rest_resource_type_path("Groups"),
            json!({
                "schemas": ["urn:pingidentity:schemas:configuration:2.0:rest-resource-type:group"],
                "id": "Groups",
                "enabled": true,
                "resourceEndpoint": "groups",
                "structuralLDAPObjectclass": "groupOfUniqueNames",
                "searchBaseDN": "ou=groups,dc=example,dc=com",
                "membersColumnName": "Members",
            }),
        );

        let mut diags = Diagnostics::new();
        let state = resource
            .read(&data, &AttributeValues::new().with("name", "Groups"), &mut diags)
            .await
            .unwrap();
        assert_eq!(state.raw("type"), Some(&json!("group")));
        assert_eq!(state.raw("members_column_name"), Some(&json!("Members")));
        assert!(state.is_null("password_attribute_category"));
        assert!(state.is_null("delegated_admin_search_size_limit"));
    }

    #[tokio::test]
    async fn missing_required_properties_are_reported() {
        let fake = Arc::new(FakeConfigApi::new());
        let data = provider_data(&fake);
        let resource = ConfigResource::<RestResourceType>::new(Variant::Managed);

        let mut planned = users();
        planned.remove("search_base_dn");
        let mut diags = Diagnostics::new();
        assert_eq!(resource.create(&data, &planned, &mut diags).await, None);
        assert_eq!(
            diags.iter().next().unwrap().attribute.as_deref(),
            Some("search_base_dn")
        );
        assert!(fake.calls().is_empty());
    }
}
