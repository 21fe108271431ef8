//! Client for the `/api/users` resource.

use std::fmt::Display;

use crate::client::BaseApiClient;
use crate::error::ApiError;
use crate::http::HttpResponse;
use crate::types::{CreateUser, UpdateUser};

/// One method per remote user operation. Responses are returned as-is.
#[derive(Debug, Clone)]
pub struct UserClient {
    api: BaseApiClient,
}

impl UserClient {
    pub fn new(api: BaseApiClient) -> Self {
        Self { api }
    }

    /// `GET /api/users/{id}`
    pub async fn get_user(&self, id: impl Display) -> Result<HttpResponse, ApiError> {
        self.api.get(&format!("/api/users/{id}")).await
    }

    /// `POST /api/users`
    pub async fn create_user(&self, user: &CreateUser) -> Result<HttpResponse, ApiError> {
        self.api.post("/api/users", Some(user)).await
    }

    /// `PUT /api/users/{id}`
    pub async fn update_user(
        &self,
        id: impl Display,
        user: &UpdateUser,
    ) -> Result<HttpResponse, ApiError> {
        self.api.put(&format!("/api/users/{id}"), Some(user)).await
    }

    /// `DELETE /api/users/{id}`
    pub async fn delete_user(&self, id: impl Display) -> Result<HttpResponse, ApiError> {
        self.api.delete(&format!("/api/users/{id}")).await
    }

    /// `GET /api/users?page={page}`
    pub async fn list_users(&self, page: u32) -> Result<HttpResponse, ApiError> {
        self.api.get(&format!("/api/users?page={page}")).await
    }
}
