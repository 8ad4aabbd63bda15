//! `dsconfig_certificate_mapper`: maps client certificates to user entries.

use std::collections::BTreeSet;

use async_trait::async_trait;
use dsconfig_client::{
    models::certificate_mapper::*, ApiError, ConfigApi, Operation, UpdateRequest,
};
use dsconfig_resource::{
    attribute_model,
    diagnostics::Diagnostics,
    schema::{Attribute, Schema},
    value::{string_attr, string_set_attr, Attr, AttributeValues},
};
use serde_json::json;

use super::{
    id_attribute, optional_string, parse_enum, required, required_enum, string_vec, ConfigKind,
    ObjectKeys,
};
use crate::operations::*;

attribute_model! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct CertificateMapperModel {
        pub id: Attr<String>,
        pub name: Attr<String>,
        pub r#type: Attr<String>,
        pub description: Attr<String>,
        pub enabled: Attr<bool>,
        pub subject_attribute: Attr<String>,
        pub subject_attribute_mapping: Attr<BTreeSet<String>>,
        pub fingerprint_attribute: Attr<String>,
        pub fingerprint_algorithm: Attr<String>,
        pub user_base_dn: Attr<BTreeSet<String>>,
        pub script_class: Attr<String>,
        pub script_argument: Attr<BTreeSet<String>>,
        pub extension_class: Attr<String>,
        pub extension_argument: Attr<BTreeSet<String>>,
    }
}

const SUBJECT_EQUALS_DN: &str = "subject-equals-dn";
const SUBJECT_DN_TO_USER_ATTRIBUTE: &str = "subject-dn-to-user-attribute";
const GROOVY_SCRIPTED: &str = "groovy-scripted";
const SUBJECT_ATTRIBUTE_TO_USER_ATTRIBUTE: &str = "subject-attribute-to-user-attribute";
const FINGERPRINT: &str = "fingerprint";
const THIRD_PARTY: &str = "third-party";

pub struct CertificateMapper;

#[async_trait]
impl ConfigKind for CertificateMapper {
    type Model = CertificateMapperModel;
    type AddRequest = AddCertificateMapperRequest;
    type Response = CertificateMapperResponse;

    const KIND: &'static str = "certificate_mapper";
    const LIST_NAME: &'static str = "certificate_mappers";
    const DISPLAY_NAME: &'static str = "Certificate Mapper";
    const KEYS: &'static [(&'static str, &'static str)] = &[("name", "name")];
    const POLYMORPHIC: bool = true;

    fn schema() -> Schema {
        Schema::new("Manages a Certificate Mapper.")
            .attribute("id", id_attribute())
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
                    .one_of(CertificateMapperType::VALUES),
            )
            .attribute(
                "description",
                Attribute::string("A description for this Certificate Mapper"),
            )
            .attribute(
                "enabled",
                Attribute::bool("Indicates whether the Certificate Mapper is enabled.").required(),
            )
            .attribute(
                "subject_attribute",
                Attribute::string(
                    "Specifies the name or OID of the attribute whose value should exactly match the certificate subject DN.",
                )
                .with_default("ds-certificate-subject-dn")
                .applies_to(&[SUBJECT_DN_TO_USER_ATTRIBUTE]),
            )
            .attribute(
                "subject_attribute_mapping",
                Attribute::string_set(
                    "Specifies a mapping between certificate attributes and user attributes.",
                )
                .applies_to(&[SUBJECT_ATTRIBUTE_TO_USER_ATTRIBUTE])
                .required_for(&[SUBJECT_ATTRIBUTE_TO_USER_ATTRIBUTE]),
            )
            .attribute(
                "fingerprint_attribute",
                Attribute::string(
                    "Specifies the attribute in which to look for the fingerprint.",
                )
                .with_default("ds-certificate-fingerprint")
                .applies_to(&[FINGERPRINT]),
            )
            .attribute(
                "fingerprint_algorithm",
                Attribute::string(
                    "Specifies the name of the digest algorithm to compute the fingerprint of client certificates.",
                )
                .one_of(FingerprintAlgorithm::VALUES)
                .applies_to(&[FINGERPRINT])
                .required_for(&[FINGERPRINT]),
            )
            .attribute(
                "user_base_dn",
                Attribute::string_set(
                    "Specifies the base DNs that should be used when performing searches to map the client certificate to a user entry.",
                )
                .with_default(json!([]))
                .applies_to(&[
                    SUBJECT_EQUALS_DN,
                    SUBJECT_DN_TO_USER_ATTRIBUTE,
                    SUBJECT_ATTRIBUTE_TO_USER_ATTRIBUTE,
                    FINGERPRINT,
                ]),
            )
            .attribute(
                "script_class",
                Attribute::string(
                    "The fully-qualified name of the Groovy class providing the logic for the Groovy Scripted Certificate Mapper.",
                )
                .applies_to(&[GROOVY_SCRIPTED])
                .required_for(&[GROOVY_SCRIPTED]),
            )
            .attribute(
                "script_argument",
                Attribute::string_set(
                    "The set of arguments used to customize the behavior for the Scripted Certificate Mapper.",
                )
                .with_default(json!([]))
                .applies_to(&[GROOVY_SCRIPTED]),
            )
            .attribute(
                "extension_class",
                Attribute::string(
                    "The fully-qualified name of the Java class providing the logic for the Third Party Certificate Mapper.",
                )
                .applies_to(&[THIRD_PARTY])
                .required_for(&[THIRD_PARTY]),
            )
            .attribute(
                "extension_argument",
                Attribute::string_set(
                    "The set of arguments used to customize the behavior for the Third Party Certificate Mapper.",
                )
                .with_default(json!([]))
                .applies_to(&[THIRD_PARTY]),
            )
    }

    fn build_add_request(
        keys: &ObjectKeys,
        plan: &CertificateMapperModel,
        diags: &mut Diagnostics,
    ) -> Option<AddCertificateMapperRequest> {
        let type_: CertificateMapperType = required_enum(diags, "type", &plan.r#type)?;
        let mapper_name = keys.name().to_string();
        let description = optional_string(&plan.description);
        let enabled = required(diags, "enabled", &plan.enabled).unwrap_or_default();

        Some(match type_ {
            CertificateMapperType::SubjectEqualsDn => AddCertificateMapperRequest::SubjectEqualsDn(
                AddSubjectEqualsDnCertificateMapperRequest {
                    mapper_name,
                    description,
                    enabled,
                    user_base_dn: string_vec(&plan.user_base_dn),
                },
            ),
            CertificateMapperType::SubjectDnToUserAttribute => {
                AddCertificateMapperRequest::SubjectDnToUserAttribute(
                    AddSubjectDnToUserAttributeCertificateMapperRequest {
                        mapper_name,
                        description,
                        enabled,
                        subject_attribute: optional_string(&plan.subject_attribute),
                        user_base_dn: string_vec(&plan.user_base_dn),
                    },
                )
            }
            CertificateMapperType::GroovyScripted => AddCertificateMapperRequest::GroovyScripted(
                AddGroovyScriptedCertificateMapperRequest {
                    mapper_name,
                    description,
                    enabled,
                    script_class: required(diags, "script_class", &plan.script_class)
                        .unwrap_or_default(),
                    script_argument: string_vec(&plan.script_argument),
                },
            ),
            CertificateMapperType::SubjectAttributeToUserAttribute => {
                AddCertificateMapperRequest::SubjectAttributeToUserAttribute(
                    AddSubjectAttributeToUserAttributeCertificateMapperRequest {
                        mapper_name,
                        description,
                        enabled,
                        subject_attribute_mapping: string_vec(&plan.subject_attribute_mapping),
                        user_base_dn: string_vec(&plan.user_base_dn),
                    },
                )
            }
            CertificateMapperType::Fingerprint => {
                let fingerprint_algorithm =
                    required_enum(diags, "fingerprint_algorithm", &plan.fingerprint_algorithm)?;
                AddCertificateMapperRequest::Fingerprint(AddFingerprintCertificateMapperRequest {
                    mapper_name,
                    description,
                    enabled,
                    fingerprint_attribute: optional_string(&plan.fingerprint_attribute),
                    fingerprint_algorithm,
                    user_base_dn: string_vec(&plan.user_base_dn),
                })
            }
            CertificateMapperType::ThirdParty => AddCertificateMapperRequest::ThirdParty(
                AddThirdPartyCertificateMapperRequest {
                    mapper_name,
                    description,
                    enabled,
                    extension_class: required(diags, "extension_class", &plan.extension_class)
                        .unwrap_or_default(),
                    extension_argument: string_vec(&plan.extension_argument),
                },
            ),
        })
    }

    async fn get(
        api: &dyn ConfigApi,
        keys: &ObjectKeys,
    ) -> Result<CertificateMapperResponse, ApiError> {
        api.get_certificate_mapper(keys.name()).await
    }

    async fn add(
        api: &dyn ConfigApi,
        _keys: &ObjectKeys,
        request: &AddCertificateMapperRequest,
    ) -> Result<CertificateMapperResponse, ApiError> {
        api.add_certificate_mapper(request).await
    }

    async fn update(
        api: &dyn ConfigApi,
        keys: &ObjectKeys,
        request: &UpdateRequest,
    ) -> Result<CertificateMapperResponse, ApiError> {
        api.update_certificate_mapper(keys.name(), request).await
    }

    async fn delete(api: &dyn ConfigApi, keys: &ObjectKeys) -> Result<(), ApiError> {
        api.delete_certificate_mapper(keys.name()).await
    }

    async fn list(
        api: &dyn ConfigApi,
        _parents: &ObjectKeys,
        filter: Option<&str>,
    ) -> Result<Vec<CertificateMapperResponse>, ApiError> {
        api.list_certificate_mappers(filter).await
    }

    fn response_id(response: &CertificateMapperResponse) -> &str {
        response.id()
    }

    fn response_type(response: &CertificateMapperResponse) -> Option<&'static str> {
        Some(response.type_().as_str())
    }

    fn read_response(response: &CertificateMapperResponse, model: &mut CertificateMapperModel) {
        let expected = std::mem::take(model);
        model.name = expected.name.clone();
        model.id = Attr::Known(response.id().to_string());
        model.r#type = Attr::Known(response.type_().to_string());

        match response {
            CertificateMapperResponse::SubjectEqualsDn(r) => {
                model.description = string_attr(r.description.as_deref(), &expected.description);
                model.enabled = Attr::Known(r.enabled);
                model.user_base_dn = string_set_attr(&r.user_base_dn);
            }
            CertificateMapperResponse::SubjectDnToUserAttribute(r) => {
                model.description = string_attr(r.description.as_deref(), &expected.description);
                model.enabled = Attr::Known(r.enabled);
                model.subject_attribute =
                    string_attr(r.subject_attribute.as_deref(), &expected.subject_attribute);
                model.user_base_dn = string_set_attr(&r.user_base_dn);
            }
            CertificateMapperResponse::GroovyScripted(r) => {
                model.description = string_attr(r.description.as_deref(), &expected.description);
                model.enabled = Attr::Known(r.enabled);
                model.script_class = Attr::Known(r.script_class.clone());
                model.script_argument = string_set_attr(&r.script_argument);
            }
            CertificateMapperResponse::SubjectAttributeToUserAttribute(r) => {
                model.description = string_attr(r.description.as_deref(), &expected.description);
                model.enabled = Attr::Known(r.enabled);
                model.subject_attribute_mapping = string_set_attr(&r.subject_attribute_mapping);
                model.user_base_dn = string_set_attr(&r.user_base_dn);
            }
            CertificateMapperResponse::Fingerprint(r) => {
                model.description = string_attr(r.description.as_deref(), &expected.description);
                model.enabled = Attr::Known(r.enabled);
                model.fingerprint_attribute = string_attr(
                    r.fingerprint_attribute.as_deref(),
                    &expected.fingerprint_attribute,
                );
                model.fingerprint_algorithm =
                    r.fingerprint_algorithm.map(|a| a.to_string()).into();
                model.user_base_dn = string_set_attr(&r.user_base_dn);
            }
            CertificateMapperResponse::ThirdParty(r) => {
                model.description = string_attr(r.description.as_deref(), &expected.description);
                model.enabled = Attr::Known(r.enabled);
                model.extension_class = Attr::Known(r.extension_class.clone());
                model.extension_argument = string_set_attr(&r.extension_argument);
            }
        }
    }

    fn create_operations(
        plan: &CertificateMapperModel,
        state: &CertificateMapperModel,
    ) -> Vec<Operation> {
        let mut ops = Vec::new();
        add_string_operation_if_necessary(&mut ops, &plan.description, &state.description, "description");
        add_bool_operation_if_necessary(&mut ops, &plan.enabled, &state.enabled, "enabled");
        add_string_operation_if_necessary(
            &mut ops,
            &plan.subject_attribute,
            &state.subject_attribute,
            "subjectAttribute",
        );
        add_string_set_operations_if_necessary(
            &mut ops,
            &plan.subject_attribute_mapping,
            &state.subject_attribute_mapping,
            "subjectAttributeMapping",
        );
        add_string_operation_if_necessary(
            &mut ops,
            &plan.fingerprint_attribute,
            &state.fingerprint_attribute,
            "fingerprintAttribute",
        );
        add_string_operation_if_necessary(
            &mut ops,
            &plan.fingerprint_algorithm,
            &state.fingerprint_algorithm,
            "fingerprintAlgorithm",
        );
        add_string_set_operations_if_necessary(
            &mut ops,
            &plan.user_base_dn,
            &state.user_base_dn,
            "userBaseDN",
        );
        add_string_operation_if_necessary(&mut ops, &plan.script_class, &state.script_class, "scriptClass");
        add_string_set_operations_if_necessary(
            &mut ops,
            &plan.script_argument,
            &state.script_argument,
            "scriptArgument",
        );
        add_string_operation_if_necessary(
            &mut ops,
            &plan.extension_class,
            &state.extension_class,
            "extensionClass",
        );
        add_string_set_operations_if_necessary(
            &mut ops,
            &plan.extension_argument,
            &state.extension_argument,
            "extensionArgument",
        );
        ops
    }

    fn validate_config(config: &AttributeValues, diags: &mut Diagnostics) {
        if let Ok(algorithm) = config.get::<String>("fingerprint_algorithm") {
            let _: Option<FingerprintAlgorithm> =
                parse_enum(diags, "fingerprint_algorithm", &algorithm);
        }
    }
}
