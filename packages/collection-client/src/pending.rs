//! Pending-request check.

use tracing::error;

use crate::client::ApiClient;
use crate::state::RequestState;
use crate::types::{ContainerId, HouseholdId, PendingResponse};

pub const PENDING_CHECK_FAILED: &str = "Failed to check pending requests";

/// Asks whether a collection request already exists for a container.
///
/// Fails open: a check that cannot complete reports "not pending" so the
/// user is never blocked by it. The service still rejects duplicates.
pub struct PendingCheck {
    client: ApiClient,
    has_pending: bool,
    state: RequestState,
}

impl PendingCheck {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            has_pending: false,
            state: RequestState::default(),
        }
    }

    /// Last known answer. Not refreshed after the check returns.
    pub fn has_pending(&self) -> bool {
        self.has_pending
    }

    pub fn loading(&self) -> bool {
        self.state.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub async fn check_pending(
        &mut self,
        container_id: &ContainerId,
        household_id: Option<&HouseholdId>,
    ) -> bool {
        self.state.begin();

        let mut query = vec![("containerId", container_id.as_str())];
        if let Some(household_id) = household_id {
            query.push(("householdId", household_id.as_str()));
        }

        let pending = match self
            .client
            .get::<PendingResponse>("/collection-requests/check-pending", &query)
            .await
        {
            Ok(response) => {
                self.has_pending = response.pending;
                response.pending
            }
            Err(err) => {
                self.state.fail(PENDING_CHECK_FAILED);
                error!(container_id = %container_id, error = %err, "Check pending error");
                false
            }
        };

        self.state.finish();
        pending
    }
}
