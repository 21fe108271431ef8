//! Async client layer for exercising the reqres user API from tests.
//!
//! # Overview
//! A `RequestContext` owns the one transport handle a test run shares. The
//! `ApiClientFactory` turns that handle into domain clients (`UserClient`,
//! `RegisterClient`), which build paths and payloads and delegate to
//! `BaseApiClient`. Every call logs its intent before hitting the transport
//! and its outcome after, then hands the raw `HttpResponse` back for
//! assertions.
//!
//! # Design
//! - HTTP error statuses are data. Only transport failures, body reads,
//!   JSON and factory lookups produce `ApiError`.
//! - The transport and the logger are traits so tests can swap them.
//! - Domain clients compose a `BaseApiClient` instead of extending one.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod factory;
pub mod http;
pub mod logging;
pub mod register;
pub mod transport;
pub mod types;
pub mod users;

pub use client::BaseApiClient;
pub use config::ClientConfig;
pub use context::{ContextState, RequestContext};
pub use error::ApiError;
pub use factory::{ApiClient, ApiClientFactory, ClientKind};
pub use http::{BodySource, HttpMethod, HttpRequest, HttpResponse};
pub use logging::{ApiLogger, Level, LogRecord, MemoryLogger, TracingLogger};
pub use register::RegisterClient;
pub use transport::{Connector, ReqwestConnector, ReqwestTransport, Transport, TransportHandle};
pub use types::{
    CreateUser, CreatedUser, Credentials, ErrorMessage, Registration, SingleUser, UpdateUser,
    UpdatedUser, User, UserPage,
};
pub use users::UserClient;
