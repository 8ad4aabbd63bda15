use async_trait::async_trait;
use jsonrpsee::{core::RpcResult, proc_macros::rpc};

use crate::{
    framework::{Provider, ProviderServer},
    protocol::{DiagnosticsResponse, MetadataResponse, PlanResponse, StateResponse},
    schema::ProviderSchema,
    value::AttributeValues,
};

/// The methods a host calls on a provider process.
///
/// Domain failures are reported as diagnostics in the result; JSON-RPC errors
/// are reserved for malformed requests.
#[rpc(server, namespace = "provider")]
pub trait ProviderRpc {
    #[method(name = "get_metadata")]
    async fn get_metadata(&self) -> RpcResult<MetadataResponse>;

    #[method(name = "get_schema")]
    async fn get_schema(&self) -> RpcResult<ProviderSchema>;

    #[method(name = "configure")]
    async fn configure(&self, config: AttributeValues) -> RpcResult<DiagnosticsResponse>;

    #[method(name = "validate_resource_config")]
    async fn validate_resource_config(
        &self,
        #[argument(rename = "type")] type_: String,
        config: AttributeValues,
    ) -> RpcResult<DiagnosticsResponse>;

    #[method(name = "plan_resource_change")]
    async fn plan_resource_change(
        &self,
        #[argument(rename = "type")] type_: String,
        prior_state: Option<AttributeValues>,
        proposed_new_state: Option<AttributeValues>,
    ) -> RpcResult<PlanResponse>;

    #[method(name = "create")]
    async fn create(
        &self,
        #[argument(rename = "type")] type_: String,
        planned_state: AttributeValues,
    ) -> RpcResult<StateResponse>;

    #[method(name = "read")]
    async fn read(
        &self,
        #[argument(rename = "type")] type_: String,
        current_state: AttributeValues,
    ) -> RpcResult<StateResponse>;

    #[method(name = "update")]
    async fn update(
        &self,
        #[argument(rename = "type")] type_: String,
        prior_state: AttributeValues,
        planned_state: AttributeValues,
    ) -> RpcResult<StateResponse>;

    #[method(name = "delete")]
    async fn delete(
        &self,
        #[argument(rename = "type")] type_: String,
        prior_state: AttributeValues,
    ) -> RpcResult<DiagnosticsResponse>;

    #[method(name = "import_state")]
    async fn import_state(
        &self,
        #[argument(rename = "type")] type_: String,
        id: String,
    ) -> RpcResult<StateResponse>;

    #[method(name = "validate_data_source_config")]
    async fn validate_data_source_config(
        &self,
        #[argument(rename = "type")] type_: String,
        config: AttributeValues,
    ) -> RpcResult<DiagnosticsResponse>;

    #[method(name = "read_data_source")]
    async fn read_data_source(
        &self,
        #[argument(rename = "type")] type_: String,
        config: AttributeValues,
    ) -> RpcResult<StateResponse>;
}

#[async_trait]
impl<P> ProviderRpcServer for ProviderServer<P>
where
    P: Provider,
{
    async fn get_metadata(&self) -> RpcResult<MetadataResponse> {
        Ok(self.metadata())
    }

    async fn get_schema(&self) -> RpcResult<ProviderSchema> {
        Ok(self.schema())
    }

    async fn configure(&self, config: AttributeValues) -> RpcResult<DiagnosticsResponse> {
        Ok(ProviderServer::configure(self, config).await)
    }

    async fn validate_resource_config(
        &self,
        type_: String,
        config: AttributeValues,
    ) -> RpcResult<DiagnosticsResponse> {
        Ok(ProviderServer::validate_resource_config(self, &type_, config))
    }

    async fn plan_resource_change(
        &self,
        type_: String,
        prior_state: Option<AttributeValues>,
        proposed_new_state: Option<AttributeValues>,
    ) -> RpcResult<PlanResponse> {
        Ok(ProviderServer::plan_resource_change(
            self,
            &type_,
            prior_state,
            proposed_new_state,
        ))
    }

    async fn create(
        &self,
        type_: String,
        planned_state: AttributeValues,
    ) -> RpcResult<StateResponse> {
        Ok(ProviderServer::create(self, &type_, planned_state).await)
    }

    async fn read(
        &self,
        type_: String,
        current_state: AttributeValues,
    ) -> RpcResult<StateResponse> {
        Ok(ProviderServer::read(self, &type_, current_state).await)
    }

    async fn update(
        &self,
        type_: String,
        prior_state: AttributeValues,
        planned_state: AttributeValues,
    ) -> RpcResult<StateResponse> {
        Ok(ProviderServer::update(self, &type_, prior_state, planned_state).await)
    }

    async fn delete(
        &self,
        type_: String,
        prior_state: AttributeValues,
    ) -> RpcResult<DiagnosticsResponse> {
        Ok(ProviderServer::delete(self, &type_, prior_state).await)
    }

    async fn import_state(&self, type_: String, id: String) -> RpcResult<StateResponse> {
        Ok(ProviderServer::import_state(self, &type_, &id))
    }

    async fn validate_data_source_config(
        &self,
        type_: String,
        config: AttributeValues,
    ) -> RpcResult<DiagnosticsResponse> {
        Ok(ProviderServer::validate_data_source_config(
            self, &type_, config,
        ))
    }

    async fn read_data_source(
        &self,
        type_: String,
        config: AttributeValues,
    ) -> RpcResult<StateResponse> {
        Ok(ProviderServer::read_data_source(self, &type_, config).await)
    }
}
