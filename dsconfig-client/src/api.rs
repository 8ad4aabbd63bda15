use async_trait::async_trait;
use serde_json::Value;

use crate::{error::ApiError, operation::UpdateRequest, path::ObjectPath};

/// The raw capability set of the configuration API.
///
/// Implementations are stateless with respect to the objects they manage and
/// may be shared between concurrently running callbacks.
#[async_trait]
pub trait ConfigApi: Send + Sync {
    /// Fetch one object.
    async fn get(&self, path: &ObjectPath) -> Result<Value, ApiError>;

    /// Create an object in `collection`. The object's name is part of `body`.
    async fn add(&self, collection: &ObjectPath, body: Value) -> Result<Value, ApiError>;

    /// Apply `request` to an object and return the resulting object.
    async fn update(&self, path: &ObjectPath, request: &UpdateRequest) -> Result<Value, ApiError>;

    async fn delete(&self, path: &ObjectPath) -> Result<(), ApiError>;

    /// List the objects of a collection, optionally narrowed by a server-side
    /// filter expression.
    async fn list(&self, collection: &ObjectPath, filter: Option<&str>)
        -> Result<Vec<Value>, ApiError>;
}
