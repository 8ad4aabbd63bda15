//! Client for the directory server's REST configuration API.
//!
//! The API is exposed under `/config/v2` and manages configuration objects as
//! JSON documents. Objects are created with a `POST` to their collection, read
//! with `GET`, modified with a `PATCH` carrying a list of [`Operation`]s, and
//! removed with `DELETE`.
//!
//! [`ConfigApi`] is the raw capability set, keyed by [`ObjectPath`]. The
//! [`models`] modules layer a typed capability trait per object type on top of
//! it, e.g. [`models::certificate_mapper::CertificateMapperApi`], so that any
//! `ConfigApi` implementation (the reqwest based [`HttpConfigApi`], or a fake
//! in tests) can be used with typed requests and responses.

pub mod api;
pub mod error;
pub mod http;
#[macro_use]
mod macros;
pub mod models;
pub mod operation;
pub mod path;

pub use api::ConfigApi;
pub use error::{ApiError, EnumParseError};
pub use http::{HttpConfig, HttpConfigApi};
pub use operation::{Operation, OperationKind, UpdateRequest};
pub use path::ObjectPath;
