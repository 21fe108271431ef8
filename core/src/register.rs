//! Client for the `/api/register` endpoint.

use crate::client::BaseApiClient;
use crate::error::ApiError;
use crate::http::HttpResponse;
use crate::types::Credentials;

#[derive(Debug, Clone)]
pub struct RegisterClient {
    api: BaseApiClient,
}

impl RegisterClient {
    pub fn new(api: BaseApiClient) -> Self {
        Self { api }
    }

    /// `POST /api/register`
    pub async fn register_user(&self, credentials: &Credentials) -> Result<HttpResponse, ApiError> {
        self.api.post("/api/register", Some(credentials)).await
    }
}
