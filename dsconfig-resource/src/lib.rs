//! Building blocks for a resource provider process.
//!
//! A provider implements [`framework::Provider`] and hands it to
//! [`framework::run_main`], which serves the `provider_*` JSON-RPC methods of
//! [`rpc::ProviderRpcServer`] over stdio. Attribute values travel as
//! [`value::AttributeValues`]; every callback reports problems through
//! [`diagnostics::Diagnostics`] instead of failing the RPC call.

pub mod diagnostics;
pub mod framework;
pub mod import;
pub mod plan;
pub mod protocol;
pub mod rpc;
pub mod schema;
pub mod validate;
pub mod value;
