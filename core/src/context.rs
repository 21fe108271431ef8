//! Lifecycle owner for the single shared transport.
//!
//! # Design
//! The handle lives in a `OnceCell` behind a mutex-guarded `Arc`. `acquire`
//! clones the current cell and initialises it at most once, so concurrent
//! first callers all await the same in-flight construction. `dispose` swaps
//! in an empty cell and then releases the old handle; the next `acquire`
//! therefore builds a new one.

use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::transport::{Connector, ReqwestConnector, TransportHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    Absent,
    Active,
}

/// Owns one transport handle at a time, built lazily from `ClientConfig`.
///
/// Construct it once in the test harness and pass it by reference. Call
/// `dispose` once after every client is done with the handle.
pub struct RequestContext {
    config: ClientConfig,
    connector: Box<dyn Connector>,
    slot: Mutex<Arc<OnceCell<TransportHandle>>>,
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RequestContext {
    /// A context whose transport is a `ReqwestTransport`.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_connector(config, ReqwestConnector)
    }

    pub fn with_connector(config: ClientConfig, connector: impl Connector + 'static) -> Self {
        Self {
            config,
            connector: Box::new(connector),
            slot: Mutex::new(Arc::new(OnceCell::new())),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The shared handle, constructed on first use.
    ///
    /// A failed construction leaves the context absent; the error goes to
    /// whichever caller ran the connector and the next call tries again.
    pub async fn acquire(&self) -> Result<TransportHandle, ApiError> {
        let cell = self.slot.lock().await.clone();
        let handle = cell
            .get_or_try_init(|| async {
                tracing::info!(base_url = %self.config.base_url, "creating transport");
                self.connector.connect(&self.config).await
            })
            .await?;
        Ok(handle.clone())
    }

    /// Resets to absent and releases the previous handle. No-op when absent.
    ///
    /// A construction still in flight is awaited and its handle released,
    /// so the caller that started it receives an already disposed handle.
    pub async fn dispose(&self) {
        let previous = std::mem::take(&mut *self.slot.lock().await);
        // Waits out an in-flight init; with none running, leaves the cell empty.
        let settled = previous
            .get_or_try_init(|| async { Err::<TransportHandle, ()>(()) })
            .await
            .ok();
        match settled {
            Some(handle) => {
                handle.dispose().await;
                tracing::info!(base_url = %self.config.base_url, "transport disposed");
            }
            None => tracing::debug!("dispose called with no active transport"),
        }
    }

    pub async fn state(&self) -> ContextState {
        if self.slot.lock().await.initialized() {
            ContextState::Active
        } else {
            ContextState::Absent
        }
    }
}
