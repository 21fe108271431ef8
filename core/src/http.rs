//! HTTP request and response types shared by every transport.
//!
//! # Design
//! `HttpRequest` is plain data: the verb wrapper builds it and a `Transport`
//! executes it. `HttpResponse` is what comes back. Its body is read lazily
//! and memoised, so the logging layer can peek at an error body and the
//! caller still gets the same bytes afterwards. A failed read is memoised
//! too; every later reader sees the same `ApiError::Body`.

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use crate::error::ApiError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// An HTTP request described as plain data.
///
/// `path` is relative to the transport's base URL and already has every
/// identifier and query parameter substituted, e.g. `/api/users?page=2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// Something that can produce a response body exactly once.
#[async_trait]
pub trait BodySource: Send {
    async fn read(self: Box<Self>) -> Result<Bytes, ApiError>;
}

#[async_trait]
impl BodySource for Bytes {
    async fn read(self: Box<Self>) -> Result<Bytes, ApiError> {
        Ok(*self)
    }
}

#[async_trait]
impl BodySource for reqwest::Response {
    async fn read(self: Box<Self>) -> Result<Bytes, ApiError> {
        self.bytes().await.map_err(|e| ApiError::Body(e.to_string()))
    }
}

enum BodyState {
    Unread(Box<dyn BodySource>),
    Read(Bytes),
    Failed(String),
    /// Only observable if a reader was cancelled mid-read.
    Lost,
}

/// A completed HTTP exchange, whatever its status.
pub struct HttpResponse {
    status: u16,
    status_text: String,
    headers: Vec<(String, String)>,
    url: String,
    body: Mutex<BodyState>,
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("status_text", &self.status_text)
            .field("headers", &self.headers)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl HttpResponse {
    pub fn new(
        status: u16,
        status_text: &str,
        headers: Vec<(String, String)>,
        url: &str,
        body: impl BodySource + 'static,
    ) -> Self {
        Self {
            status,
            status_text: status_text.to_string(),
            headers,
            url: url.to_string(),
            body: Mutex::new(BodyState::Unread(Box::new(body))),
        }
    }

    /// Wraps a `reqwest::Response` without touching its body.
    pub fn from_reqwest(response: reqwest::Response) -> Self {
        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let url = response.url().to_string();
        Self::new(
            status.as_u16(),
            status.canonical_reason().unwrap_or(""),
            headers,
            &url,
            response,
        )
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    /// True for 2xx and 3xx statuses.
    pub fn ok(&self) -> bool {
        (200..400).contains(&self.status)
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Raw body bytes. The first call reads from the transport; later calls
    /// return the memoised result.
    pub async fn body(&self) -> Result<Bytes, ApiError> {
        let mut state = self.body.lock().await;
        match std::mem::replace(&mut *state, BodyState::Lost) {
            BodyState::Unread(source) => match source.read().await {
                Ok(bytes) => {
                    *state = BodyState::Read(bytes.clone());
                    Ok(bytes)
                }
                Err(e) => {
                    let message = e.to_string();
                    *state = BodyState::Failed(message.clone());
                    Err(ApiError::Body(message))
                }
            },
            BodyState::Read(bytes) => {
                *state = BodyState::Read(bytes.clone());
                Ok(bytes)
            }
            BodyState::Failed(message) => {
                *state = BodyState::Failed(message.clone());
                Err(ApiError::Body(message))
            }
            BodyState::Lost => Err(ApiError::Body("body read was interrupted".to_string())),
        }
    }

    pub async fn text(&self) -> Result<String, ApiError> {
        let bytes = self.body().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub async fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let bytes = self.body().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Deserialization(e.to_string()))
    }
}
