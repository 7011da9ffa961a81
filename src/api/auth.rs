use super::{ApiClient, ApiRequest, RequestError};
use crate::models::{LoginRequest, LoginResponse, RegisterRequest};

impl ApiClient {
    /// POST /api/auth/register
    pub async fn register(&self, request: &RegisterRequest) -> Result<String, RequestError> {
        self.execute(ApiRequest::post("/auth/register").json(request)?)
            .await
    }

    /// POST /api/auth/login
    ///
    /// Only returns the issued identity; establishing the session is up to
    /// the caller.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, RequestError> {
        self.fetch_json(ApiRequest::post("/auth/login").json(request)?)
            .await
    }
}
