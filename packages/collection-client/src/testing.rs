// Test doubles - scripted transport and geolocation
//
// Injected in place of the real HTTP transport and device location so flows
// can be exercised without a network. Both record every call they receive.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::client::ApiClient;
use crate::config::ApiConfig;
use crate::error::{ApiError, Result};
use crate::geolocation::{BaseGeolocator, GeolocationError, PositionOptions};
use crate::transport::{ApiRequest, ApiResponse, BaseTransport};
use crate::types::GeoLocation;

// =============================================================================
// Mock Transport
// =============================================================================

enum Reply {
    Response(ApiResponse),
    Failure(String),
}

/// Transport that replays scripted replies in order and records requests.
///
/// Running out of scripted replies is reported as a transport failure.
#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with a JSON body
    pub fn with_json(self, status: u16, body: Value) -> Self {
        self.push(Reply::Response(ApiResponse {
            status,
            body: body.to_string(),
        }))
    }

    /// Queue a response with a raw body
    pub fn with_body(self, status: u16, body: &str) -> Self {
        self.push(Reply::Response(ApiResponse {
            status,
            body: body.to_string(),
        }))
    }

    /// Queue a transport failure (no response at all)
    pub fn with_failure(self, message: &str) -> Self {
        self.push(Reply::Failure(message.to_string()))
    }

    fn push(self, reply: Reply) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    /// All requests received so far, after credential handling
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Build an [`ApiClient`] over this transport
    pub fn client(self: &Arc<Self>, config: ApiConfig) -> ApiClient {
        ApiClient::with_transport(config, self.clone())
    }
}

#[async_trait]
impl BaseTransport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let path = request.path.clone();
        self.requests.lock().unwrap().push(request);

        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Response(response)) => Ok(response),
            Some(Reply::Failure(message)) => Err(ApiError::Transport { path, message }),
            None => Err(ApiError::Transport {
                path,
                message: "no scripted response".to_string(),
            }),
        }
    }
}

// =============================================================================
// Scripted Geolocator
// =============================================================================

/// Geolocator returning a fixed outcome, optionally after a delay.
pub struct ScriptedGeolocator {
    outcome: std::result::Result<GeoLocation, GeolocationError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedGeolocator {
    pub fn succeeding(location: GeoLocation) -> Self {
        Self {
            outcome: Ok(location),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: GeolocationError) -> Self {
        Self {
            outcome: Err(error),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BaseGeolocator for ScriptedGeolocator {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> std::result::Result<GeoLocation, GeolocationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome.clone()
    }
}
