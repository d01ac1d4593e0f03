//! Collection-request submission.

use std::sync::Arc;

use tracing::{debug, info};

use crate::client::ApiClient;
use crate::error::Result;
use crate::geolocation::{acquire_location, BaseGeolocator, PositionOptions};
use crate::state::RequestState;
use crate::types::{
    ContainerId, CreateRequestBody, CreatedRequest, GeoLocation, HouseholdId, Signature,
};

pub const ALREADY_PENDING: &str = "A collection request for this container is already pending.";
pub const SESSION_EXPIRED: &str = "Session expired. Please scan the QR code again.";
pub const CREATE_FAILED: &str = "Failed to create collection request. Please try again.";

/// User-facing message for a failed create call.
pub fn create_error_message(status: Option<u16>) -> &'static str {
    match status {
        Some(409) => ALREADY_PENDING,
        Some(401) => SESSION_EXPIRED,
        _ => CREATE_FAILED,
    }
}

pub struct CollectionRequestSubmitter {
    client: ApiClient,
    geolocator: Arc<dyn BaseGeolocator>,
    position_options: PositionOptions,
    state: RequestState,
}

impl CollectionRequestSubmitter {
    pub fn new(client: ApiClient, geolocator: Arc<dyn BaseGeolocator>) -> Self {
        Self {
            client,
            geolocator,
            position_options: PositionOptions::default(),
            state: RequestState::default(),
        }
    }

    pub fn with_position_options(mut self, options: PositionOptions) -> Self {
        self.position_options = options;
        self
    }

    /// Id of the last request this submitter created.
    pub fn request_id(&self) -> Option<&str> {
        self.state.result_id.as_deref()
    }

    pub fn loading(&self) -> bool {
        self.state.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    pub fn success(&self) -> bool {
        self.state.success
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    /// Submit a collection request and return its id.
    ///
    /// `signature` authorizes the call and travels as the `sig` query
    /// parameter. Location is optional; `{0, 0}` is sent when unavailable.
    /// Duplicates are rejected by the service with 409.
    pub async fn create_request(
        &mut self,
        container_id: &ContainerId,
        household_id: Option<&HouseholdId>,
        signature: &Signature,
    ) -> Result<String> {
        self.state.begin();
        let result = self.submit(container_id, household_id, signature).await;

        match &result {
            Ok(id) => self.state.succeed(id.as_str()),
            Err(err) => self.state.fail(create_error_message(err.status())),
        }

        self.state.finish();
        result
    }

    async fn submit(
        &self,
        container_id: &ContainerId,
        household_id: Option<&HouseholdId>,
        signature: &Signature,
    ) -> Result<String> {
        let location = acquire_location(self.geolocator.as_ref(), &self.position_options).await;
        debug!(container_id = %container_id, located = location.is_some(), "Submitting collection request");

        let body = CreateRequestBody {
            container_id: container_id.clone(),
            household_id: household_id.cloned(),
            geo_at_request: location.unwrap_or(GeoLocation::UNAVAILABLE),
        };

        let created: CreatedRequest = self
            .client
            .post("/collection-requests", &[("sig", signature.as_str())], &body)
            .await?;

        info!(container_id = %container_id, request_id = %created.id, "Collection request created");
        Ok(created.id)
    }
}
