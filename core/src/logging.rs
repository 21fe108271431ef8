//! Injectable logging for the verb wrapper.
//!
//! `BaseApiClient` renders one `LogRecord` per log line and hands the text to
//! an `ApiLogger`. `TracingLogger` forwards to `tracing`; `MemoryLogger`
//! keeps the lines so tests can assert on them.

use std::fmt;
use std::sync::Mutex;

use crate::http::HttpMethod;

/// Longest error body, in characters, copied into an `ErrorBody` line.
pub const ERROR_BODY_SNIPPET_LIMIT: usize = 2048;

/// Log sink with the three severities the client layer uses, plus a
/// debug level for diagnostics that must never be louder than that.
pub trait ApiLogger: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
    fn debug(&self, _message: &str) {}
}

/// Forwards every line to `tracing` under the `reqres_client` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl ApiLogger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!(target: "reqres_client", "{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "reqres_client", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "reqres_client", "{message}");
    }

    fn debug(&self, message: &str) {
        tracing::debug!(target: "reqres_client", "{message}");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

/// Keeps every line in memory, in emission order.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    lines: Mutex<Vec<(Level, String)>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    /// Lines at `level` or above, messages only.
    pub fn messages_at_least(&self, level: Level) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(l, _)| *l >= level)
            .map(|(_, m)| m)
            .collect()
    }

    fn push(&self, level: Level, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push((level, message.to_string()));
        }
    }
}

impl ApiLogger for MemoryLogger {
    fn info(&self, message: &str) {
        self.push(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(Level::Error, message);
    }

    fn debug(&self, message: &str) {
        self.push(Level::Debug, message);
    }
}

/// One line emitted around a verb call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogRecord {
    /// Before the transport is called. `payload` is the JSON body for
    /// POST and PUT, `None` for GET and DELETE.
    Intent {
        method: HttpMethod,
        path: String,
        payload: Option<String>,
    },
    /// After a 2xx/3xx response.
    Success {
        method: HttpMethod,
        path: String,
        status: u16,
        status_text: String,
    },
    /// After any other response.
    Failure {
        method: HttpMethod,
        path: String,
        status: u16,
        status_text: String,
        url: String,
    },
    /// The body of a failed response, truncated.
    ErrorBody { snippet: String },
}

impl LogRecord {
    pub fn error_body(body: &str) -> Self {
        LogRecord::ErrorBody {
            snippet: body.chars().take(ERROR_BODY_SNIPPET_LIMIT).collect(),
        }
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogRecord::Intent {
                method,
                path,
                payload: None,
            } if matches!(method, HttpMethod::Get | HttpMethod::Delete) => {
                write!(f, "Sending {method} request to: {path}")
            }
            LogRecord::Intent {
                method,
                path,
                payload,
            } => write!(
                f,
                "Sending {method} request to: {path} with data: {}",
                payload.as_deref().unwrap_or("null")
            ),
            LogRecord::Success {
                method,
                path,
                status,
                status_text,
            } => write!(f, "Response ({method} {path}): {status} {status_text}"),
            LogRecord::Failure {
                method,
                path,
                status,
                status_text,
                url,
            } => write!(
                f,
                "Response ERROR ({method} {path}): {status} {status_text} - URL: {url}"
            ),
            LogRecord::ErrorBody { snippet } => write!(f, "Error Body: {snippet}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_lines_match_verb_shape() {
        let get = LogRecord::Intent {
            method: HttpMethod::Get,
            path: "/api/users/2".to_string(),
            payload: None,
        };
        assert_eq!(get.to_string(), "Sending GET request to: /api/users/2");

        let post = LogRecord::Intent {
            method: HttpMethod::Post,
            path: "/api/users".to_string(),
            payload: Some(r#"{"name":"morpheus","job":"leader"}"#.to_string()),
        };
        assert_eq!(
            post.to_string(),
            r#"Sending POST request to: /api/users with data: {"name":"morpheus","job":"leader"}"#
        );

        let empty_put = LogRecord::Intent {
            method: HttpMethod::Put,
            path: "/api/users/2".to_string(),
            payload: None,
        };
        assert_eq!(
            empty_put.to_string(),
            "Sending PUT request to: /api/users/2 with data: null"
        );
    }

    #[test]
    fn outcome_lines() {
        let ok = LogRecord::Success {
            method: HttpMethod::Delete,
            path: "/api/users/2".to_string(),
            status: 204,
            status_text: "No Content".to_string(),
        };
        assert_eq!(ok.to_string(), "Response (DELETE /api/users/2): 204 No Content");

        let failed = LogRecord::Failure {
            method: HttpMethod::Get,
            path: "/api/users/9999".to_string(),
            status: 404,
            status_text: "Not Found".to_string(),
            url: "http://127.0.0.1:3000/api/users/9999".to_string(),
        };
        assert_eq!(
            failed.to_string(),
            "Response ERROR (GET /api/users/9999): 404 Not Found - URL: http://127.0.0.1:3000/api/users/9999"
        );
    }

    #[test]
    fn error_body_is_truncated() {
        let long = "x".repeat(ERROR_BODY_SNIPPET_LIMIT + 10);
        let LogRecord::ErrorBody { snippet } = LogRecord::error_body(&long) else {
            panic!("expected ErrorBody");
        };
        assert_eq!(snippet.len(), ERROR_BODY_SNIPPET_LIMIT);
    }

    #[test]
    fn memory_logger_keeps_order_and_levels() {
        let logger = MemoryLogger::new();
        logger.info("one");
        logger.debug("two");
        logger.error("three");
        logger.warn("four");
        assert_eq!(
            logger.lines(),
            vec![
                (Level::Info, "one".to_string()),
                (Level::Debug, "two".to_string()),
                (Level::Error, "three".to_string()),
                (Level::Warn, "four".to_string()),
            ]
        );
        assert_eq!(logger.messages_at_least(Level::Warn), vec!["three", "four"]);
    }
}
