use std::sync::Arc;

use async_trait::async_trait;
use dsconfig_client::{ConfigApi, HttpConfigApi};
use dsconfig_resource::{
    diagnostics::Diagnostics,
    framework::{DataSource, Provider, Resource},
    schema::Schema,
    value::AttributeValues,
};

use crate::{
    config::{self, Env, ProviderConfig},
    resources::{
        self, certificate_mapper::CertificateMapper,
        delegated_admin_resource_rights::DelegatedAdminResourceRights,
        log_field_behavior::LogFieldBehavior, rest_resource_type::RestResourceType,
        scim_subattribute::ScimSubattribute,
    },
};

/// What every resource and data source talks to once the provider is configured.
pub type ProviderData = Arc<dyn ConfigApi>;

pub struct DsConfigProvider {
    env: Box<Env>,
}

impl DsConfigProvider {
    /// A provider that falls back to the process environment.
    pub fn new() -> Self {
        Self::with_env(|name| std::env::var(name).ok())
    }

    pub fn with_env(env: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        DsConfigProvider { env: Box::new(env) }
    }

    fn user_agent(&self) -> String {
        format!("dsconfig-provider/{}", self.version())
    }
}

impl Default for DsConfigProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for DsConfigProvider {
    type Data = ProviderData;

    fn type_name(&self) -> String {
        "dsconfig".to_string()
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    fn schema(&self) -> Schema {
        config::schema()
    }

    async fn configure(
        &self,
        config: &AttributeValues,
        diags: &mut Diagnostics,
    ) -> Option<ProviderData> {
        let config = ProviderConfig::resolve(config, self.env.as_ref(), diags)?;
        let http = match config.http_config(&self.user_agent()) {
            Ok(http) => http,
            Err(e) => {
                diags.error_chain("Unable to read CA certificates", &e);
                return None;
            }
        };
        let api = match HttpConfigApi::new(http) {
            Ok(api) => api,
            Err(e) => {
                diags.error("Unable to create the configuration API client", e.to_string());
                return None;
            }
        };
        tracing::info!(
            host = %config.https_host,
            product_version = %config.product_version,
            "configured the directory server connection"
        );
        Some(Arc::new(api))
    }

    fn resources(&self) -> Vec<Box<dyn Resource<ProviderData>>> {
        [
            resources::resources::<CertificateMapper>(),
            resources::resources::<LogFieldBehavior>(),
            resources::resources::<RestResourceType>(),
            resources::resources::<ScimSubattribute>(),
            resources::resources::<DelegatedAdminResourceRights>(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn data_sources(&self) -> Vec<Box<dyn DataSource<ProviderData>>> {
        [
            resources::data_sources::<CertificateMapper>(),
            resources::data_sources::<LogFieldBehavior>(),
            resources::data_sources::<RestResourceType>(),
            resources::data_sources::<ScimSubattribute>(),
            resources::data_sources::<DelegatedAdminResourceRights>(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}
