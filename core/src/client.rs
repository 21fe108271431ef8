//! Generic verb wrapper with uniform logging.
//!
//! # Design
//! `BaseApiClient` holds only a shared transport handle and a logger, and
//! carries no mutable state between calls. Every verb follows the same
//! sequence: intent line, transport call, outcome line, return. Responses
//! come back untouched whatever their status; a 4xx/5xx is logged at error
//! severity together with a best-effort copy of its body.

use std::sync::Arc;

use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::logging::{ApiLogger, LogRecord, TracingLogger};
use crate::transport::TransportHandle;

/// Issues GET/POST/PUT/DELETE through a shared transport.
#[derive(Clone)]
pub struct BaseApiClient {
    transport: TransportHandle,
    logger: Arc<dyn ApiLogger>,
}

impl std::fmt::Debug for BaseApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaseApiClient").finish_non_exhaustive()
    }
}

impl BaseApiClient {
    /// Logs through `tracing`.
    pub fn new(transport: TransportHandle) -> Self {
        Self::with_logger(transport, Arc::new(TracingLogger))
    }

    pub fn with_logger(transport: TransportHandle, logger: Arc<dyn ApiLogger>) -> Self {
        Self { transport, logger }
    }

    pub async fn get(&self, path: &str) -> Result<HttpResponse, ApiError> {
        self.send(HttpMethod::Get, path, None).await
    }

    pub async fn post<P>(&self, path: &str, payload: Option<&P>) -> Result<HttpResponse, ApiError>
    where
        P: Serialize + ?Sized,
    {
        let body = serialize(payload)?;
        self.send(HttpMethod::Post, path, body).await
    }

    pub async fn put<P>(&self, path: &str, payload: Option<&P>) -> Result<HttpResponse, ApiError>
    where
        P: Serialize + ?Sized,
    {
        let body = serialize(payload)?;
        self.send(HttpMethod::Put, path, body).await
    }

    pub async fn delete(&self, path: &str) -> Result<HttpResponse, ApiError> {
        self.send(HttpMethod::Delete, path, None).await
    }

    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<String>,
    ) -> Result<HttpResponse, ApiError> {
        let intent = LogRecord::Intent {
            method,
            path: path.to_string(),
            payload: body.clone(),
        };
        self.logger.info(&intent.to_string());

        let headers = if body.is_some() {
            vec![("content-type".to_string(), "application/json".to_string())]
        } else {
            Vec::new()
        };
        let request = HttpRequest {
            method,
            path: path.to_string(),
            headers,
            body,
        };
        let response = self.transport.send(request).await?;

        self.log_outcome(method, path, &response).await;
        Ok(response)
    }

    async fn log_outcome(&self, method: HttpMethod, path: &str, response: &HttpResponse) {
        if response.ok() {
            let record = LogRecord::Success {
                method,
                path: path.to_string(),
                status: response.status(),
                status_text: response.status_text().to_string(),
            };
            self.logger.info(&record.to_string());
            return;
        }

        let record = LogRecord::Failure {
            method,
            path: path.to_string(),
            status: response.status(),
            status_text: response.status_text().to_string(),
            url: response.url().to_string(),
        };
        self.logger.error(&record.to_string());

        match response.text().await {
            Ok(text) => self.logger.error(&LogRecord::error_body(&text).to_string()),
            Err(e) => self
                .logger
                .debug(&format!("Error body unavailable ({method} {path}): {e}")),
        }
    }
}

fn serialize<P>(payload: Option<&P>) -> Result<Option<String>, ApiError>
where
    P: Serialize + ?Sized,
{
    payload
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| ApiError::Serialization(e.to_string()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::http::BodySource;
    use crate::logging::{Level, MemoryLogger};
    use crate::transport::Transport;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::Mutex;

    /// Answers every request with a canned status and body, and remembers
    /// what it was asked.
    pub(crate) struct CannedTransport {
        pub status: u16,
        pub status_text: &'static str,
        pub body: &'static str,
        pub requests: Mutex<Vec<HttpRequest>>,
    }

    impl CannedTransport {
        pub(crate) fn new(status: u16, status_text: &'static str, body: &'static str) -> Arc<Self> {
            Arc::new(Self {
                status,
                status_text,
                body,
                requests: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn last_request(&self) -> HttpRequest {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl Transport for CannedTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            let url = format!("http://mock{}", request.path);
            self.requests.lock().unwrap().push(request);
            Ok(HttpResponse::new(
                self.status,
                self.status_text,
                Vec::new(),
                &url,
                Bytes::from_static(self.body.as_bytes()),
            ))
        }
    }

    struct UnreadableBody;

    #[async_trait]
    impl BodySource for UnreadableBody {
        async fn read(self: Box<Self>) -> Result<Bytes, ApiError> {
            Err(ApiError::Body("body already consumed".to_string()))
        }
    }

    struct UnreadableTransport;

    #[async_trait]
    impl Transport for UnreadableTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            Ok(HttpResponse::new(
                500,
                "Internal Server Error",
                Vec::new(),
                &format!("http://mock{}", request.path),
                UnreadableBody,
            ))
        }
    }

    struct DownTransport;

    #[async_trait]
    impl Transport for DownTransport {
        async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, ApiError> {
            Err(ApiError::Disposed)
        }
    }

    fn client(transport: TransportHandle) -> (BaseApiClient, Arc<MemoryLogger>) {
        let logger = Arc::new(MemoryLogger::new());
        (BaseApiClient::with_logger(transport, logger.clone()), logger)
    }

    #[derive(Serialize)]
    struct Job<'a> {
        name: &'a str,
        job: &'a str,
    }

    #[tokio::test]
    async fn get_logs_intent_then_outcome() {
        let transport = CannedTransport::new(200, "OK", r#"{"data":{}}"#);
        let (api, logger) = client(transport.clone());

        let resp = api.get("/api/users/2").await.unwrap();

        assert_eq!(resp.status(), 200);
        assert_eq!(
            logger.lines(),
            vec![
                (Level::Info, "Sending GET request to: /api/users/2".to_string()),
                (Level::Info, "Response (GET /api/users/2): 200 OK".to_string()),
            ]
        );
        let req = transport.last_request();
        assert_eq!(req.method, HttpMethod::Get);
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[tokio::test]
    async fn post_serializes_payload_and_logs_it() {
        let transport = CannedTransport::new(201, "Created", "{}");
        let (api, logger) = client(transport.clone());

        api.post("/api/users", Some(&Job { name: "morpheus", job: "leader" }))
            .await
            .unwrap();

        let lines = logger.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0].1,
            r#"Sending POST request to: /api/users with data: {"name":"morpheus","job":"leader"}"#
        );
        assert_eq!(lines[1].1, "Response (POST /api/users): 201 Created");

        let req = transport.last_request();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["job"], "leader");
    }

    #[tokio::test]
    async fn put_without_payload_sends_no_body() {
        let transport = CannedTransport::new(200, "OK", "{}");
        let (api, logger) = client(transport.clone());

        api.put::<()>("/api/users/2", None).await.unwrap();

        assert_eq!(
            logger.lines()[0].1,
            "Sending PUT request to: /api/users/2 with data: null"
        );
        assert!(transport.last_request().body.is_none());
    }

    #[tokio::test]
    async fn error_status_is_returned_and_logged_with_body() {
        let transport = CannedTransport::new(404, "Not Found", "{}");
        let (api, logger) = client(transport);

        let resp = api.delete("/api/users/9999").await.unwrap();

        assert_eq!(resp.status(), 404);
        assert_eq!(resp.status_text(), "Not Found");
        assert_eq!(
            logger.lines(),
            vec![
                (Level::Info, "Sending DELETE request to: /api/users/9999".to_string()),
                (
                    Level::Error,
                    "Response ERROR (DELETE /api/users/9999): 404 Not Found - URL: http://mock/api/users/9999"
                        .to_string()
                ),
                (Level::Error, "Error Body: {}".to_string()),
            ]
        );
        // The logging read must not consume the caller's body.
        assert_eq!(resp.text().await.unwrap(), "{}");
    }

    #[tokio::test]
    async fn unreadable_error_body_does_not_affect_the_call() {
        let (api, logger) = client(Arc::new(UnreadableTransport));

        let resp = api.get("/api/unknown/23").await.unwrap();

        assert_eq!(resp.status(), 500);
        assert_eq!(resp.status_text(), "Internal Server Error");
        let loud = logger.messages_at_least(Level::Info);
        assert_eq!(loud.len(), 2);
        assert!(loud[1].starts_with("Response ERROR (GET /api/unknown/23): 500"));
        let debug: Vec<_> = logger
            .lines()
            .into_iter()
            .filter(|(l, _)| *l == Level::Debug)
            .collect();
        assert_eq!(debug.len(), 1);
        assert!(debug[0].1.contains("body already consumed"));
    }

    #[tokio::test]
    async fn transport_failure_propagates_after_intent_only() {
        let (api, logger) = client(Arc::new(DownTransport));

        let err = api.get("/api/users/2").await.unwrap_err();

        assert!(matches!(err, ApiError::Disposed));
        assert_eq!(
            logger.lines(),
            vec![(Level::Info, "Sending GET request to: /api/users/2".to_string())]
        );
    }

    #[tokio::test]
    async fn unserializable_payload_fails_before_logging() {
        struct Broken;
        impl Serialize for Broken {
            fn serialize<S: serde::Serializer>(&self, _s: S) -> Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("refused"))
            }
        }

        let transport = CannedTransport::new(200, "OK", "{}");
        let (api, logger) = client(transport.clone());

        let err = api.post("/api/users", Some(&Broken)).await.unwrap_err();

        assert!(matches!(err, ApiError::Serialization(_)));
        assert!(logger.lines().is_empty());
        assert!(transport.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn redirect_status_counts_as_ok() {
        let transport = CannedTransport::new(304, "Not Modified", "");
        let (api, logger) = client(transport);

        api.get("/api/users?page=1").await.unwrap();

        assert_eq!(logger.messages_at_least(Level::Error).len(), 0);
    }
}
