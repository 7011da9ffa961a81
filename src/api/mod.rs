//! Authenticated access to the TaskBoard REST service.
//!
//! [`ApiClient`] attaches the session credential to every call and folds the
//! result into `Result<T, RequestError>`. Resource-specific calls live in
//! the submodules, one per endpoint family.

mod admin;
mod auth;
pub mod error;
mod tasks;
mod transport;
pub mod validation;

#[cfg(test)]
pub(crate) mod mock;

pub use error::{RequestError, NETWORK_ERROR_MESSAGE};
pub use transport::{OutboundRequest, RawResponse, ReqwestTransport, Transport, TransportError};

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::models::Id;
use crate::session::SessionStore;

/// Prefix shared by every endpoint
pub const API_PREFIX: &str = "/api";

/// `id` as a path segment. Anything that would leave its segment is refused
/// before a request is built.
fn id_segment(id: &Id) -> Result<&str, RequestError> {
    if id.is_path_segment() {
        Ok(id.as_str())
    } else {
        Err(RequestError::invalid(format!("Invalid id '{}'", id)))
    }
}

/// A call relative to the API root, e.g. `GET /task`
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Attach a JSON body. Encoding failures surface like any other failed
    /// attempt to send.
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, RequestError> {
        let value = serde_json::to_value(body)
            .map_err(|e| RequestError::network(format!("could not encode request body: {}", e)))?;
        self.body = Some(value);
        Ok(self)
    }
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    session: SessionStore,
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    /// Client over HTTP for the service at `base_url`
    pub fn new(base_url: &str, session: SessionStore) -> Result<Self, TransportError> {
        Ok(Self::with_transport(
            base_url,
            session,
            Arc::new(ReqwestTransport::new()?),
        ))
    }

    pub fn with_transport(
        base_url: &str,
        session: SessionStore,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    /// Issue one attempt and return the body text of a 2xx response.
    ///
    /// The credential is read from the session at send time and attached as
    /// a bearer header when present. Authorization failures are returned like
    /// any other server failure and leave the session alone.
    pub async fn execute(&self, request: ApiRequest) -> Result<String, RequestError> {
        let bearer = self.session.credential();

        debug!(
            method = %request.method,
            path = %request.path,
            authenticated = bearer.is_some(),
            "Sending request"
        );

        let outbound = OutboundRequest {
            method: request.method.clone(),
            url: self.url_for(&request.path),
            query: request.query,
            bearer,
            body: request.body,
        };

        let response = match self.transport.send(outbound).await {
            Ok(response) => response,
            Err(e) => {
                debug!(method = %request.method, path = %request.path, error = %e, "Request did not complete");
                return Err(RequestError::network(e.0));
            }
        };

        debug!(
            method = %request.method,
            path = %request.path,
            status = response.status.as_u16(),
            "Response received"
        );

        if response.status.is_success() {
            Ok(response.body)
        } else {
            Err(RequestError::server(response.status, response.body))
        }
    }

    /// Like [`execute`](Self::execute), decoding the body as JSON.
    ///
    /// A 2xx body that does not decode counts as a network failure.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<T, RequestError> {
        let path = request.path.clone();
        let body = self.execute(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            debug!(path = %path, error = %e, "Response body did not decode");
            RequestError::network(format!("invalid response body: {}", e))
        })
    }
}
