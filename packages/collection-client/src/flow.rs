//! End-to-end form flow: scanned link to submitted request.
//!
//! Runs the same steps as the collection-request form: read the container
//! id, sign it, check for a pending request, then (once the user confirms)
//! submit. Each step keeps its own state, exposed for rendering.

use std::sync::Arc;

use tracing::info;
use url::Url;

use crate::client::ApiClient;
use crate::error::Result;
use crate::geolocation::BaseGeolocator;
use crate::pending::PendingCheck;
use crate::router;
use crate::submission::CollectionRequestSubmitter;
use crate::types::{ContainerId, SignedContainer};
use crate::url_params::extract_container_id;
use crate::verification::ContainerVerification;

/// A container that is signed and has no known pending request.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadyState {
    pub container_id: ContainerId,
    pub signed: SignedContainer,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FlowStage {
    /// Link had no usable `containerId`; nothing was requested
    MissingContainerId,
    /// A request is already open for this container
    AlreadyPending {
        container_id: ContainerId,
        signed: SignedContainer,
    },
    /// Ready to submit
    Ready(ReadyState),
}

pub struct CollectionFlow {
    verification: ContainerVerification,
    pending: PendingCheck,
    submitter: CollectionRequestSubmitter,
}

impl CollectionFlow {
    pub fn new(client: ApiClient, geolocator: Arc<dyn BaseGeolocator>) -> Self {
        Self {
            verification: ContainerVerification::new(client.clone()),
            pending: PendingCheck::new(client.clone()),
            submitter: CollectionRequestSubmitter::new(client, geolocator),
        }
    }

    pub fn verification(&self) -> &ContainerVerification {
        &self.verification
    }

    pub fn pending(&self) -> &PendingCheck {
        &self.pending
    }

    pub fn submitter(&self) -> &CollectionRequestSubmitter {
        &self.submitter
    }

    /// Route a scanned URL, then prepare from its query string.
    pub async fn prepare_from_url(&mut self, url: &Url) -> Result<FlowStage> {
        let page = router::resolve_url(url);
        self.prepare(page.query.as_deref().unwrap_or("")).await
    }

    /// Sign the container named in `query` and check for a pending request.
    ///
    /// Sign failures are returned; the verification state holds the message.
    pub async fn prepare(&mut self, query: &str) -> Result<FlowStage> {
        let Some(container_id) = extract_container_id(query) else {
            return Ok(FlowStage::MissingContainerId);
        };

        let signed = self.verification.sign_qr_action(&container_id).await?;

        if self
            .pending
            .check_pending(&container_id, signed.household_id.as_ref())
            .await
        {
            info!(container_id = %container_id, "Collection request already pending");
            return Ok(FlowStage::AlreadyPending {
                container_id,
                signed,
            });
        }

        Ok(FlowStage::Ready(ReadyState {
            container_id,
            signed,
        }))
    }

    /// Submit the collection request for a prepared container.
    pub async fn submit(&mut self, ready: &ReadyState) -> Result<String> {
        self.submitter
            .create_request(
                &ready.container_id,
                ready.signed.household_id.as_ref(),
                &ready.signed.signature,
            )
            .await
    }

    /// User-facing message from the furthest step that has one.
    pub fn error(&self) -> Option<&str> {
        self.submitter
            .error()
            .or_else(|| self.pending.error())
            .or_else(|| self.verification.error())
    }
}
