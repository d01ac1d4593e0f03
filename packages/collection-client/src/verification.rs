//! Container verification: trade a container id for a signature.

use tracing::{debug, error, warn};

use crate::client::ApiClient;
use crate::error::{ApiError, Result};
use crate::state::RequestState;
use crate::types::{
    ContainerDetails, ContainerId, HouseholdId, SignResponse, Signature, SignedContainer,
    VerifyResponse,
};

pub const CONTAINER_NOT_FOUND: &str = "Container not found. Please check the QR code.";
pub const VERIFICATION_FAILED: &str = "Failed to verify container. Please try again.";

pub struct ContainerVerification {
    client: ApiClient,
    signature: Option<Signature>,
    container_id: Option<ContainerId>,
    household_id: Option<HouseholdId>,
    state: RequestState,
}

impl ContainerVerification {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            signature: None,
            container_id: None,
            household_id: None,
            state: RequestState::default(),
        }
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    /// Container id as echoed by the sign endpoint.
    pub fn container_id(&self) -> Option<&ContainerId> {
        self.container_id.as_ref()
    }

    pub fn household_id(&self) -> Option<&HouseholdId> {
        self.household_id.as_ref()
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

    /// Obtain a signature for `container_id`, then look up its household.
    ///
    /// Sign failures set a user-facing error and are returned. The household
    /// lookup is best-effort: if it fails the household is `None`.
    pub async fn sign_qr_action(&mut self, container_id: &ContainerId) -> Result<SignedContainer> {
        self.state.begin();
        let result = self.sign_and_lookup(container_id).await;
        self.state.finish();
        result
    }

    async fn sign_and_lookup(&mut self, container_id: &ContainerId) -> Result<SignedContainer> {
        let signed: SignResponse = match self
            .client
            .get("/qr/sign", &[("containerId", container_id.as_str())])
            .await
        {
            Ok(signed) => signed,
            Err(err) => {
                self.state.fail(if err.status() == Some(404) {
                    CONTAINER_NOT_FOUND
                } else {
                    VERIFICATION_FAILED
                });
                return Err(err);
            }
        };

        debug!(container_id = %signed.container_id, "Container signed");
        self.container_id = Some(signed.container_id);
        self.signature = Some(signed.sig.clone());
        self.household_id = self.lookup_household(container_id).await;

        Ok(SignedContainer {
            signature: signed.sig,
            household_id: self.household_id.clone(),
        })
    }

    async fn lookup_household(&self, container_id: &ContainerId) -> Option<HouseholdId> {
        let path = format!("/containers/{}", container_id);
        match self.client.get::<ContainerDetails>(&path, &[]).await {
            Ok(details) => details.household_id(),
            Err(err) => {
                warn!(container_id = %container_id, error = %err, "Could not fetch container details");
                None
            }
        }
    }

    /// Ask the service whether the stored signature is still valid.
    ///
    /// Fails with [`ApiError::MissingSignature`] (without a request) if no
    /// signature has been issued. A failed request reports `false`.
    pub async fn verify_signature(&self) -> Result<bool> {
        let (Some(signature), Some(container_id)) = (&self.signature, &self.container_id) else {
            return Err(ApiError::MissingSignature);
        };

        let query = [
            ("containerId", container_id.as_str()),
            ("sig", signature.as_str()),
        ];
        match self.client.get::<VerifyResponse>("/qr/verify", &query).await {
            Ok(response) => Ok(response.valid),
            Err(err) => {
                error!(error = %err, "Signature verification failed");
                Ok(false)
            }
        }
    }
}
