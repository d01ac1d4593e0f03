//! Shared API client.
//!
//! Every call in the crate goes through one [`ApiClient`]. It attaches the
//! `x-api-key` credential to everything outside [`PUBLIC_ENDPOINTS`], turns
//! non-2xx responses into [`ApiError::Status`] with the service's `detail`
//! message, and logs failures. It never swallows an error.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use crate::config::ApiConfig;
use crate::error::{ApiError, Result, GENERIC_ERROR_DETAIL};
use crate::transport::{ApiRequest, ApiResponse, BaseTransport, Method, ReqwestTransport};

/// Paths that never carry the API key. Matched by prefix.
pub const PUBLIC_ENDPOINTS: &[&str] = &["/health", "/qr/sign", "/qr/verify", "/auth/login"];

pub const API_KEY_HEADER: &str = "x-api-key";

pub fn is_public_path(path: &str) -> bool {
    PUBLIC_ENDPOINTS
        .iter()
        .any(|endpoint| path.starts_with(endpoint))
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<Value>,
}

/// Human-readable message from an error response body.
pub fn error_detail(body: &str) -> String {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail);

    match detail {
        Some(Value::String(message)) if !message.is_empty() => message,
        Some(Value::Null) | None => GENERIC_ERROR_DETAIL.to_string(),
        Some(Value::String(_)) => GENERIC_ERROR_DETAIL.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Collection-request API client.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn BaseTransport>,
    config: ApiConfig,
}

impl ApiClient {
    /// Create a client that talks HTTP to `config.base_url`.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client over an injected transport.
    pub fn with_transport(config: ApiConfig, transport: Arc<dyn BaseTransport>) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let request = ApiRequest::new(Method::Get, path).query(query);
        self.execute(request).await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &B,
    ) -> Result<T> {
        let body = serde_json::to_value(body).map_err(|e| ApiError::Encode {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        let request = ApiRequest::new(Method::Post, path).query(query).body(body);
        self.execute(request).await
    }

    /// Attach the credential unless the path is public or no key is configured.
    pub fn authorize(&self, mut request: ApiRequest) -> ApiRequest {
        if let Some(key) = &self.config.api_key {
            if !is_public_path(&request.path) {
                request
                    .headers
                    .push((API_KEY_HEADER.to_string(), key.clone()));
            }
        }
        request
    }

    async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let request = self.authorize(request);
        let path = request.path.clone();

        debug!(
            method = request.method.as_str(),
            path = %path,
            authenticated = request.header(API_KEY_HEADER).is_some(),
            "Sending API request"
        );

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(err) => {
                error!(path = %path, error = %err, "API Error: {}", GENERIC_ERROR_DETAIL);
                return Err(err);
            }
        };

        decode(&path, response)
    }
}

fn decode<T: DeserializeOwned>(path: &str, response: ApiResponse) -> Result<T> {
    if !response.is_success() {
        let detail = error_detail(&response.body);
        error!(path = %path, status = response.status, "API Error: {}", detail);
        return Err(ApiError::Status {
            path: path.to_string(),
            status: response.status,
            detail,
        });
    }

    serde_json::from_str(&response.body).map_err(|e| ApiError::Decode {
        path: path.to_string(),
        message: e.to_string(),
    })
}
