//! Certificate mappers: map a client certificate to a user entry.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{decode_all, request_body, subtype_schema, subtype_tag};
use crate::{api::ConfigApi, error::ApiError, operation::UpdateRequest, path::ObjectPath};

pub const OBJECT_KIND: &str = "certificate-mapper";
pub const COLLECTION: &str = "certificate-mappers";

config_enum! {
    /// Subtypes of certificate mapper.
    pub enum CertificateMapperType {
        SubjectEqualsDn => "subject-equals-dn",
        SubjectDnToUserAttribute => "subject-dn-to-user-attribute",
        GroovyScripted => "groovy-scripted",
        SubjectAttributeToUserAttribute => "subject-attribute-to-user-attribute",
        Fingerprint => "fingerprint",
        ThirdParty => "third-party",
    }
}

config_enum! {
    pub enum FingerprintAlgorithm {
        Md5 => "md5",
        Sha1 => "sha1",
        Sha256 => "sha-256",
        Sha384 => "sha-384",
        Sha512 => "sha-512",
    }
}

pub fn certificate_mapper_path(name: &str) -> ObjectPath {
    ObjectPath::collection(COLLECTION).join(name)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSubjectEqualsDnCertificateMapperRequest {
    pub mapper_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub enabled: bool,
    #[serde(rename = "userBaseDN", skip_serializing_if = "Vec::is_empty")]
    pub user_base_dn: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSubjectDnToUserAttributeCertificateMapperRequest {
    pub mapper_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_attribute: Option<String>,
    #[serde(rename = "userBaseDN", skip_serializing_if = "Vec::is_empty")]
    pub user_base_dn: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddGroovyScriptedCertificateMapperRequest {
    pub mapper_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub enabled: bool,
    pub script_class: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub script_argument: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSubjectAttributeToUserAttributeCertificateMapperRequest {
    pub mapper_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub enabled: bool,
    pub subject_attribute_mapping: Vec<String>,
    #[serde(rename = "userBaseDN", skip_serializing_if = "Vec::is_empty")]
    pub user_base_dn: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFingerprintCertificateMapperRequest {
    pub mapper_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint_attribute: Option<String>,
    pub fingerprint_algorithm: FingerprintAlgorithm,
    #[serde(rename = "userBaseDN", skip_serializing_if = "Vec::is_empty")]
    pub user_base_dn: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddThirdPartyCertificateMapperRequest {
    pub mapper_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub enabled: bool,
    pub extension_class: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extension_argument: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddCertificateMapperRequest {
    SubjectEqualsDn(AddSubjectEqualsDnCertificateMapperRequest),
    SubjectDnToUserAttribute(AddSubjectDnToUserAttributeCertificateMapperRequest),
    GroovyScripted(AddGroovyScriptedCertificateMapperRequest),
    SubjectAttributeToUserAttribute(AddSubjectAttributeToUserAttributeCertificateMapperRequest),
    Fingerprint(AddFingerprintCertificateMapperRequest),
    ThirdParty(AddThirdPartyCertificateMapperRequest),
}

impl AddCertificateMapperRequest {
    pub fn type_(&self) -> CertificateMapperType {
        match self {
            Self::SubjectEqualsDn(_) => CertificateMapperType::SubjectEqualsDn,
            Self::SubjectDnToUserAttribute(_) => CertificateMapperType::SubjectDnToUserAttribute,
            Self::GroovyScripted(_) => CertificateMapperType::GroovyScripted,
            Self::SubjectAttributeToUserAttribute(_) => {
                CertificateMapperType::SubjectAttributeToUserAttribute
            }
            Self::Fingerprint(_) => CertificateMapperType::Fingerprint,
            Self::ThirdParty(_) => CertificateMapperType::ThirdParty,
        }
    }

    pub fn to_body(&self) -> Result<Value, ApiError> {
        let schema = Some(subtype_schema(OBJECT_KIND, self.type_().as_str()));
        match self {
            Self::SubjectEqualsDn(r) => request_body(r, schema),
            Self::SubjectDnToUserAttribute(r) => request_body(r, schema),
            Self::GroovyScripted(r) => request_body(r, schema),
            Self::SubjectAttributeToUserAttribute(r) => request_body(r, schema),
            Self::Fingerprint(r) => request_body(r, schema),
            Self::ThirdParty(r) => request_body(r, schema),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectEqualsDnCertificateMapperResponse {
    pub id: String,
    pub description: Option<String>,
    pub enabled: bool,
    #[serde(rename = "userBaseDN", default)]
    pub user_base_dn: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectDnToUserAttributeCertificateMapperResponse {
    pub id: String,
    pub description: Option<String>,
    pub enabled: bool,
    pub subject_attribute: Option<String>,
    #[serde(rename = "userBaseDN", default)]
    pub user_base_dn: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroovyScriptedCertificateMapperResponse {
    pub id: String,
    pub description: Option<String>,
    pub enabled: bool,
    pub script_class: String,
    #[serde(default)]
    pub script_argument: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectAttributeToUserAttributeCertificateMapperResponse {
    pub id: String,
    pub description: Option<String>,
    pub enabled: bool,
    #[serde(default)]
    pub subject_attribute_mapping: Vec<String>,
    #[serde(rename = "userBaseDN", default)]
    pub user_base_dn: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FingerprintCertificateMapperResponse {
    pub id: String,
    pub description: Option<String>,
    pub enabled: bool,
    pub fingerprint_attribute: Option<String>,
    pub fingerprint_algorithm: Option<FingerprintAlgorithm>,
    #[serde(rename = "userBaseDN", default)]
    pub user_base_dn: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThirdPartyCertificateMapperResponse {
    pub id: String,
    pub description: Option<String>,
    pub enabled: bool,
    pub extension_class: String,
    #[serde(default)]
    pub extension_argument: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertificateMapperResponse {
    SubjectEqualsDn(SubjectEqualsDnCertificateMapperResponse),
    SubjectDnToUserAttribute(SubjectDnToUserAttributeCertificateMapperResponse),
    GroovyScripted(GroovyScriptedCertificateMapperResponse),
    SubjectAttributeToUserAttribute(SubjectAttributeToUserAttributeCertificateMapperResponse),
    Fingerprint(FingerprintCertificateMapperResponse),
    ThirdParty(ThirdPartyCertificateMapperResponse),
}

impl CertificateMapperResponse {
    pub fn from_body(body: Value) -> Result<Self, ApiError> {
        let tag = subtype_tag(&body, OBJECT_KIND)?;
        let type_: CertificateMapperType =
            tag.parse().map_err(|_| ApiError::UnknownSubtype {
                object_kind: OBJECT_KIND.to_string(),
            })?;
        Ok(match type_ {
            CertificateMapperType::SubjectEqualsDn => {
                Self::SubjectEqualsDn(serde_json::from_value(body)?)
            }
            CertificateMapperType::SubjectDnToUserAttribute => {
                Self::SubjectDnToUserAttribute(serde_json::from_value(body)?)
            }
            CertificateMapperType::GroovyScripted => {
                Self::GroovyScripted(serde_json::from_value(body)?)
            }
            CertificateMapperType::SubjectAttributeToUserAttribute => {
                Self::SubjectAttributeToUserAttribute(serde_json::from_value(body)?)
            }
            CertificateMapperType::Fingerprint => Self::Fingerprint(serde_json::from_value(body)?),
            CertificateMapperType::ThirdParty => Self::ThirdParty(serde_json::from_value(body)?),
        })
    }

    pub fn type_(&self) -> CertificateMapperType {
        match self {
            Self::SubjectEqualsDn(_) => CertificateMapperType::SubjectEqualsDn,
            Self::SubjectDnToUserAttribute(_) => CertificateMapperType::SubjectDnToUserAttribute,
            Self::GroovyScripted(_) => CertificateMapperType::GroovyScripted,
            Self::SubjectAttributeToUserAttribute(_) => {
                CertificateMapperType::SubjectAttributeToUserAttribute
            }
            Self::Fingerprint(_) => CertificateMapperType::Fingerprint,
            Self::ThirdParty(_) => CertificateMapperType::ThirdParty,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::SubjectEqualsDn(r) => &r.id,
            Self::SubjectDnToUserAttribute(r) => &r.id,
            Self::GroovyScripted(r) => &r.id,
            Self::SubjectAttributeToUserAttribute(r) => &r.id,
            Self::Fingerprint(r) => &r.id,
            Self::ThirdParty(r) => &r.id,
        }
    }
}

/// Typed certificate mapper calls on any [`ConfigApi`].
#[async_trait]
pub trait CertificateMapperApi: ConfigApi {
    async fn get_certificate_mapper(
        &self,
        name: &str,
    ) -> Result<CertificateMapperResponse, ApiError> {
        let body = self.get(&certificate_mapper_path(name)).await?;
        CertificateMapperResponse::from_body(body)
    }

    async fn add_certificate_mapper(
        &self,
        request: &AddCertificateMapperRequest,
    ) -> Result<CertificateMapperResponse, ApiError> {
        let body = self
            .add(&ObjectPath::collection(COLLECTION), request.to_body()?)
            .await?;
        CertificateMapperResponse::from_body(body)
    }

    async fn update_certificate_mapper(
        &self,
        name: &str,
        request: &UpdateRequest,
    ) -> Result<CertificateMapperResponse, ApiError> {
        let body = self.update(&certificate_mapper_path(name), request).await?;
        CertificateMapperResponse::from_body(body)
    }

    async fn delete_certificate_mapper(&self, name: &str) -> Result<(), ApiError> {
        self.delete(&certificate_mapper_path(name)).await
    }

    async fn list_certificate_mappers(
        &self,
        filter: Option<&str>,
    ) -> Result<Vec<CertificateMapperResponse>, ApiError> {
        let bodies = self
            .list(&ObjectPath::collection(COLLECTION), filter)
            .await?;
        decode_all(bodies, CertificateMapperResponse::from_body)
    }
}

impl<T: ConfigApi + ?Sized> CertificateMapperApi for T {}
