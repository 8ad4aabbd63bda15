use std::{
    collections::BTreeMap,
    os::fd::{AsRawFd, FromRawFd},
    sync::OnceLock,
};

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures_util::StreamExt;
use nix::unistd::{dup, dup2};
use tokio::io::AsyncWriteExt;
use tokio_util::codec::{FramedRead, LinesCodec};

use crate::{
    diagnostics::Diagnostics,
    import::split_import_id,
    plan::plan_resource_change,
    protocol::{DiagnosticsResponse, MetadataResponse, PlanResponse, StateResponse},
    rpc::ProviderRpcServer,
    schema::{ProviderSchema, Schema},
    validate::validate_config,
    value::AttributeValues,
};

/// A managed resource type. `D` is the data produced by configuring the
/// provider, typically an API client.
#[async_trait]
pub trait Resource<D: Send + Sync>: Send + Sync {
    fn type_name(&self) -> String;

    fn schema(&self) -> Schema;

    /// Checks beyond what the schema expresses.
    fn validate_config(&self, _config: &AttributeValues, _diags: &mut Diagnostics) {}

    /// Adjust a plan after the schema driven plan modification.
    fn modify_plan(
        &self,
        _prior: Option<&AttributeValues>,
        _planned: &mut AttributeValues,
        _diags: &mut Diagnostics,
    ) {
    }

    async fn create(
        &self,
        data: &D,
        planned: &AttributeValues,
        diags: &mut Diagnostics,
    ) -> Option<AttributeValues>;

    /// `None` means the object is gone.
    async fn read(
        &self,
        data: &D,
        state: &AttributeValues,
        diags: &mut Diagnostics,
    ) -> Option<AttributeValues>;

    async fn update(
        &self,
        data: &D,
        prior: &AttributeValues,
        planned: &AttributeValues,
        diags: &mut Diagnostics,
    ) -> Option<AttributeValues>;

    async fn delete(&self, data: &D, state: &AttributeValues, diags: &mut Diagnostics);

    /// The attributes identifying the object named by an import identifier.
    /// The host reads the object with these afterwards.
    fn import_state(&self, id: &str, diags: &mut Diagnostics) -> Option<AttributeValues> {
        split_import_id(id, &[("name", "name")], diags)
    }
}

#[async_trait]
pub trait DataSource<D: Send + Sync>: Send + Sync {
    fn type_name(&self) -> String;

    fn schema(&self) -> Schema;

    fn validate_config(&self, _config: &AttributeValues, _diags: &mut Diagnostics) {}

    async fn read(
        &self,
        data: &D,
        config: &AttributeValues,
        diags: &mut Diagnostics,
    ) -> Option<AttributeValues>;
}

#[async_trait]
pub trait Provider: Send + Sync + 'static {
    /// Shared with every resource and data source once configured.
    type Data: Send + Sync + 'static;

    fn type_name(&self) -> String;

    fn version(&self) -> String;

    /// Schema of the provider configuration.
    fn schema(&self) -> Schema;

    async fn configure(
        &self,
        config: &AttributeValues,
        diags: &mut Diagnostics,
    ) -> Option<Self::Data>;

    fn resources(&self) -> Vec<Box<dyn Resource<Self::Data>>>;

    fn data_sources(&self) -> Vec<Box<dyn DataSource<Self::Data>>>;
}

/// Dispatches host requests to a [`Provider`]'s resources and data sources.
pub struct ProviderServer<P: Provider> {
    provider: P,
    resources: BTreeMap<String, Box<dyn Resource<P::Data>>>,
    data_sources: BTreeMap<String, Box<dyn DataSource<P::Data>>>,
    data: OnceLock<P::Data>,
}

impl<P: Provider> ProviderServer<P> {
    pub fn new(provider: P) -> Self {
        let resources = provider
            .resources()
            .into_iter()
            .map(|r| (r.type_name(), r))
            .collect();
        let data_sources = provider
            .data_sources()
            .into_iter()
            .map(|d| (d.type_name(), d))
            .collect();
        ProviderServer {
            provider,
            resources,
            data_sources,
            data: OnceLock::new(),
        }
    }

    pub fn metadata(&self) -> MetadataResponse {
        MetadataResponse {
            type_name: self.provider.type_name(),
            version: self.provider.version(),
            resources: self.resources.keys().cloned().collect(),
            data_sources: self.data_sources.keys().cloned().collect(),
        }
    }

    pub fn schema(&self) -> ProviderSchema {
        ProviderSchema {
            provider: self.provider.schema(),
            resource_schemas: self
                .resources
                .iter()
                .map(|(name, r)| (name.clone(), r.schema()))
                .collect(),
            data_source_schemas: self
                .data_sources
                .iter()
                .map(|(name, d)| (name.clone(), d.schema()))
                .collect(),
        }
    }

    /// Configure the provider. Only the first successful call takes effect.
    pub async fn configure(&self, config: AttributeValues) -> DiagnosticsResponse {
        let mut diagnostics = Diagnostics::new();
        if self.data.get().is_some() {
            diagnostics.error(
                "Provider already configured",
                "The provider can only be configured once per process.",
            );
            return DiagnosticsResponse { diagnostics };
        }
        validate_config(&self.provider.schema(), &config, &mut diagnostics);
        if diagnostics.has_errors() {
            return DiagnosticsResponse { diagnostics };
        }
        let data = self.provider.configure(&config, &mut diagnostics).await;
        if let (Some(data), false) = (data, diagnostics.has_errors()) {
            if self.data.set(data).is_err() {
                diagnostics.error(
                    "Provider already configured",
                    "The provider was configured concurrently.",
                );
            }
        }
        DiagnosticsResponse { diagnostics }
    }

    pub fn validate_resource_config(
        &self,
        type_name: &str,
        config: AttributeValues,
    ) -> DiagnosticsResponse {
        let mut diagnostics = Diagnostics::new();
        if let Some(resource) = self.resource(type_name, &mut diagnostics) {
            validate_config(&resource.schema(), &config, &mut diagnostics);
            resource.validate_config(&config, &mut diagnostics);
        }
        DiagnosticsResponse { diagnostics }
    }

    pub fn plan_resource_change(
        &self,
        type_name: &str,
        prior_state: Option<AttributeValues>,
        proposed_new_state: Option<AttributeValues>,
    ) -> PlanResponse {
        let mut diagnostics = Diagnostics::new();
        let Some(resource) = self.resource(type_name, &mut diagnostics) else {
            return PlanResponse {
                diagnostics,
                ..Default::default()
            };
        };
        let Some(proposed) = proposed_new_state else {
            return PlanResponse {
                diagnostics,
                ..Default::default()
            };
        };
        let mut change = plan_resource_change(&resource.schema(), prior_state.as_ref(), &proposed);
        resource.modify_plan(
            prior_state.as_ref(),
            &mut change.planned_state,
            &mut diagnostics,
        );
        PlanResponse {
            planned_state: Some(change.planned_state),
            requires_replace: change.requires_replace,
            diagnostics,
        }
    }

    pub async fn create(&self, type_name: &str, planned_state: AttributeValues) -> StateResponse {
        let mut diagnostics = Diagnostics::new();
        let new_state = match self.resource_and_data(type_name, &mut diagnostics) {
            Some((resource, data)) => {
                tracing::debug!(type_name, "creating resource");
                resource.create(data, &planned_state, &mut diagnostics).await
            }
            None => None,
        };
        Self::applied(new_state, diagnostics)
    }

    /// On error the prior state is returned unchanged.
    pub async fn read(&self, type_name: &str, current_state: AttributeValues) -> StateResponse {
        let mut diagnostics = Diagnostics::new();
        let new_state = match self.resource_and_data(type_name, &mut diagnostics) {
            Some((resource, data)) => {
                resource.read(data, &current_state, &mut diagnostics).await
            }
            None => None,
        };
        if diagnostics.has_errors() {
            return StateResponse {
                new_state: Some(current_state),
                diagnostics,
            };
        }
        Self::applied(new_state, diagnostics)
    }

    pub async fn update(
        &self,
        type_name: &str,
        prior_state: AttributeValues,
        planned_state: AttributeValues,
    ) -> StateResponse {
        let mut diagnostics = Diagnostics::new();
        let new_state = match self.resource_and_data(type_name, &mut diagnostics) {
            Some((resource, data)) => {
                resource
                    .update(data, &prior_state, &planned_state, &mut diagnostics)
                    .await
            }
            None => None,
        };
        Self::applied(new_state, diagnostics)
    }

    pub async fn delete(&self, type_name: &str, prior_state: AttributeValues) -> DiagnosticsResponse {
        let mut diagnostics = Diagnostics::new();
        if let Some((resource, data)) = self.resource_and_data(type_name, &mut diagnostics) {
            resource.delete(data, &prior_state, &mut diagnostics).await;
        }
        DiagnosticsResponse { diagnostics }
    }

    pub fn import_state(&self, type_name: &str, id: &str) -> StateResponse {
        let mut diagnostics = Diagnostics::new();
        let new_state = self
            .resource(type_name, &mut diagnostics)
            .and_then(|resource| resource.import_state(id, &mut diagnostics));
        Self::applied(new_state, diagnostics)
    }

    pub fn validate_data_source_config(
        &self,
        type_name: &str,
        config: AttributeValues,
    ) -> DiagnosticsResponse {
        let mut diagnostics = Diagnostics::new();
        if let Some(data_source) = self.data_source(type_name, &mut diagnostics) {
            validate_config(&data_source.schema(), &config, &mut diagnostics);
            data_source.validate_config(&config, &mut diagnostics);
        }
        DiagnosticsResponse { diagnostics }
    }

    pub async fn read_data_source(&self, type_name: &str, config: AttributeValues) -> StateResponse {
        let mut diagnostics = Diagnostics::new();
        let new_state = match (
            self.data_source(type_name, &mut diagnostics),
            self.configured_data(&mut diagnostics),
        ) {
            (Some(data_source), Some(data)) => {
                data_source.read(data, &config, &mut diagnostics).await
            }
            _ => None,
        };
        Self::applied(new_state, diagnostics)
    }

    /// Withhold the state if anything failed. State never carries unknowns.
    fn applied(new_state: Option<AttributeValues>, diagnostics: Diagnostics) -> StateResponse {
        let new_state = if diagnostics.has_errors() {
            None
        } else {
            new_state.map(|mut state| {
                state.null_unknowns();
                state
            })
        };
        StateResponse {
            new_state,
            diagnostics,
        }
    }

    fn resource(&self, type_name: &str, diags: &mut Diagnostics) -> Option<&dyn Resource<P::Data>> {
        let resource = self.resources.get(type_name).map(|r| r.as_ref());
        if resource.is_none() {
            diags.error(
                "Unknown resource type",
                format!("The provider does not support resource type {:?}.", type_name),
            );
        }
        resource
    }

    fn data_source(
        &self,
        type_name: &str,
        diags: &mut Diagnostics,
    ) -> Option<&dyn DataSource<P::Data>> {
        let data_source = self.data_sources.get(type_name).map(|d| d.as_ref());
        if data_source.is_none() {
            diags.error(
                "Unknown data source type",
                format!("The provider does not support data source {:?}.", type_name),
            );
        }
        data_source
    }

    fn configured_data(&self, diags: &mut Diagnostics) -> Option<&P::Data> {
        let data = self.data.get();
        if data.is_none() {
            diags.error(
                "Provider not configured",
                "The provider must be configured before resources can be managed.",
            );
        }
        data
    }

    fn resource_and_data(
        &self,
        type_name: &str,
        diags: &mut Diagnostics,
    ) -> Option<(&dyn Resource<P::Data>, &P::Data)> {
        let resource = self.resource(type_name, diags)?;
        let data = self.configured_data(diags)?;
        Some((resource, data))
    }
}

/// Serve `provider` on the stdio channels until the host closes stdin.
pub async fn run_main(provider: impl Provider) {
    let pipe = init_stdio().unwrap_or_exit();
    serve(provider, pipe).await.unwrap_or_exit();
}

async fn serve(provider: impl Provider, pipe: InOut<Fd>) -> Result<()> {
    let InOut { in_, out } = pipe_fds_to_files(pipe);
    let module = ProviderServer::new(provider).into_rpc();

    let mut requests = FramedRead::new(tokio::fs::File::from_std(in_), LinesCodec::new());
    let mut out = tokio::fs::File::from_std(out);

    while let Some(line) = requests.next().await {
        let line = line.context("Could not read request line")?;
        if line.trim().is_empty() {
            continue;
        }
        let (response, _subscription) = match module.raw_json_request(&line, 1).await {
            Ok(r) => r,
            Err(e) => {
                tracing::error!("could not parse request: {}", e);
                continue;
            }
        };
        let response = response.to_string();
        out.write_all(response.as_bytes())
            .await
            .context("Could not write response")?;
        out.write_all(b"\n").await.context("Could not write response")?;
        out.flush().await.context("Could not flush response")?;
    }
    Ok(())
}

/// A pair of `T` values: one for input and one for output.
struct InOut<T> {
    in_: T,
    out: T,
}

/// A file descriptor
type Fd = i32;

/// Configure the standard input/output streams for the process.
/// This returns the communication channels with the host, and reconfigures
/// the stdio file descriptors as follows:
///
/// ```text
/// 0: /dev/null
/// 1: stderr
/// 2: stderr
/// ```
fn init_stdio() -> Result<InOut<Fd>> {
    let r = InOut {
        in_: dup(0).context("dup(0)")?,
        out: dup(1).context("dup(1)")?,
    };

    // 0: dev/null
    let dev_null = std::fs::File::open("/dev/null").context("Could not open /dev/null")?;
    dup2(dev_null.as_raw_fd(), 0).context("Could not dup2(/dev/null, 0)")?;

    // 1: stderr
    dup2(2, 1).context("Could not dup2(2, 1)")?;

    // 2: stderr is left as is

    Ok(r)
}

fn pipe_fds_to_files(pipe: InOut<Fd>) -> InOut<std::fs::File> {
    // SAFETY: both descriptors were just dup'ed by init_stdio and are owned
    // by nothing else.
    InOut {
        in_: unsafe { std::fs::File::from_raw_fd(pipe.in_) },
        out: unsafe { std::fs::File::from_raw_fd(pipe.out) },
    }
}

trait ProviderMainError<T> {
    type V;
    fn unwrap_or_exit(self) -> Self::V;
}
impl<T> ProviderMainError<Result<T>> for Result<T> {
    type V = T;
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("Error: {:?}", e);
                std::process::exit(1);
            }
        }
    }
}
