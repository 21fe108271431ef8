//! Builds domain clients from a transport handle.
//!
//! # Design
//! The set of clients is closed: `ClientKind` enumerates it and `create`
//! maps each kind to its constructor. `create_by_name` is the late-bound
//! path for table-driven tests and is the only one that can fail.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::client::BaseApiClient;
use crate::context::RequestContext;
use crate::error::ApiError;
use crate::logging::{ApiLogger, TracingLogger};
use crate::register::RegisterClient;
use crate::transport::TransportHandle;
use crate::users::UserClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientKind {
    User,
    Register,
}

impl ClientKind {
    pub const ALL: [ClientKind; 2] = [ClientKind::User, ClientKind::Register];

    /// Registered name, as accepted by `create_by_name`.
    pub fn name(self) -> &'static str {
        match self {
            ClientKind::User => "UserApi",
            ClientKind::Register => "RegisterApi",
        }
    }
}

impl fmt::Display for ClientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ClientKind {
    type Err = ApiError;

    /// Accepts the registered names and the short aliases `user` and
    /// `register`, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        ClientKind::ALL
            .into_iter()
            .find(|kind| {
                let alias = match kind {
                    ClientKind::User => "user",
                    ClientKind::Register => "register",
                };
                name.eq_ignore_ascii_case(kind.name()) || name.eq_ignore_ascii_case(alias)
            })
            .ok_or_else(|| ApiError::UnknownKind(s.to_string()))
    }
}

/// A client built through the dynamic path.
#[derive(Debug, Clone)]
pub enum ApiClient {
    User(UserClient),
    Register(RegisterClient),
}

impl ApiClient {
    pub fn kind(&self) -> ClientKind {
        match self {
            ApiClient::User(_) => ClientKind::User,
            ApiClient::Register(_) => ClientKind::Register,
        }
    }

    pub fn as_user(&self) -> Option<&UserClient> {
        match self {
            ApiClient::User(client) => Some(client),
            _ => None,
        }
    }

    pub fn as_register(&self) -> Option<&RegisterClient> {
        match self {
            ApiClient::Register(client) => Some(client),
            _ => None,
        }
    }
}

/// Hands its logger to every client it builds. Holds no other state.
#[derive(Clone)]
pub struct ApiClientFactory {
    logger: Arc<dyn ApiLogger>,
}

impl fmt::Debug for ApiClientFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClientFactory").finish_non_exhaustive()
    }
}

impl Default for ApiClientFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiClientFactory {
    pub fn new() -> Self {
        Self::with_logger(Arc::new(TracingLogger))
    }

    pub fn with_logger(logger: Arc<dyn ApiLogger>) -> Self {
        Self { logger }
    }

    fn base(&self, transport: TransportHandle) -> BaseApiClient {
        BaseApiClient::with_logger(transport, self.logger.clone())
    }

    pub fn user_client(&self, transport: TransportHandle) -> UserClient {
        UserClient::new(self.base(transport))
    }

    pub fn register_client(&self, transport: TransportHandle) -> RegisterClient {
        RegisterClient::new(self.base(transport))
    }

    pub fn create(&self, kind: ClientKind, transport: TransportHandle) -> ApiClient {
        match kind {
            ClientKind::User => ApiClient::User(self.user_client(transport)),
            ClientKind::Register => ApiClient::Register(self.register_client(transport)),
        }
    }

    pub fn create_by_name(&self, name: &str, transport: TransportHandle) -> Result<ApiClient, ApiError> {
        let kind = name.parse::<ClientKind>()?;
        Ok(self.create(kind, transport))
    }

    /// Acquires the context's handle, then builds `kind` on it.
    pub async fn client_for(&self, context: &RequestContext, kind: ClientKind) -> Result<ApiClient, ApiError> {
        let transport = context.acquire().await?;
        Ok(self.create(kind, transport))
    }
}
