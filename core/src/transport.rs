//! The seam between the client layer and the network.
//!
//! `Transport` executes an `HttpRequest`; `Connector` builds a transport
//! from a `ClientConfig`. `RequestContext` owns the connector and hands out
//! the single `TransportHandle` it produced.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

/// Executes HTTP requests. Implementations must be shareable across any
/// number of concurrent in-flight calls.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue `request` and return the response, whatever its status.
    /// Errors mean the call could not complete.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;

    /// Release held resources. Called once by `RequestContext::dispose`.
    async fn dispose(&self) {}
}

/// Shared handle to the context's transport.
pub type TransportHandle = Arc<dyn Transport>;

/// Builds a transport from configuration.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, config: &ClientConfig) -> Result<TransportHandle, ApiError>;
}

/// `Transport` backed by a pooled `reqwest::Client`.
///
/// `dispose` drops the client, which closes its idle pooled connections
/// once the calls still in flight have finished with their clones.
#[derive(Debug)]
pub struct ReqwestTransport {
    client: RwLock<Option<reqwest::Client>>,
    base_url: String,
}

impl ReqwestTransport {
    /// Applies the config's default headers and timeout to every request.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .default_headers(header_map(&config.default_headers)?)
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            client: RwLock::new(Some(client)),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_disposed(&self) -> bool {
        self.client
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    fn client(&self) -> Option<reqwest::Client> {
        self.client
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn header_map<'a, I>(headers: I) -> Result<HeaderMap, ApiError>
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ApiError::InvalidConfig(format!("header name {name:?}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ApiError::InvalidConfig(format!("header {name}: {e}")))?;
        map.insert(name, value);
    }
    Ok(map)
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let client = self.client().ok_or(ApiError::Disposed)?;
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = client.request(request.method.into(), url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        let response = builder.send().await?;
        Ok(HttpResponse::from_reqwest(response))
    }

    async fn dispose(&self) {
        self.client
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

/// Default connector: one `ReqwestTransport` per connect.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReqwestConnector;

#[async_trait]
impl Connector for ReqwestConnector {
    async fn connect(&self, config: &ClientConfig) -> Result<TransportHandle, ApiError> {
        Ok(Arc::new(ReqwestTransport::new(config)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;

    #[test]
    fn new_strips_trailing_slash() {
        let transport = ReqwestTransport::new(&ClientConfig::new("http://localhost:3000/")).unwrap();
        assert_eq!(transport.base_url(), "http://localhost:3000");
        assert!(!transport.is_disposed());
    }

    #[test]
    fn invalid_header_name_is_rejected() {
        let config = ClientConfig::new("http://localhost").with_header("bad header", "x");
        let err = ReqwestTransport::new(&config).unwrap_err();
        assert!(matches!(err, ApiError::InvalidConfig(_)));
    }

    #[test]
    fn invalid_header_value_is_rejected() {
        let config = ClientConfig::new("http://localhost").with_header("x-api-key", "line\nbreak");
        let err = ReqwestTransport::new(&config).unwrap_err();
        assert!(matches!(err, ApiError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn disposed_transport_refuses_to_send() {
        let transport = ReqwestTransport::new(&ClientConfig::new("http://127.0.0.1:9")).unwrap();
        transport.dispose().await;
        assert!(transport.is_disposed());
        let err = transport
            .send(HttpRequest {
                method: HttpMethod::Get,
                path: "/api/users/2".to_string(),
                headers: Vec::new(),
                body: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Disposed));
    }

    #[tokio::test]
    async fn connector_builds_a_fresh_transport_each_time() {
        let config = ClientConfig::default();
        let a = ReqwestConnector.connect(&config).await.unwrap();
        let b = ReqwestConnector.connect(&config).await.unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }
}
