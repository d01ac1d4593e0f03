//! Identifiers and wire shapes for the collection-request API.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Every container identifier printed on a QR code starts with this prefix.
pub const CONTAINER_ID_PREFIX: &str = "container_";

// =============================================================================
// Identifiers
// =============================================================================

/// Container identifier, e.g. `container_42`.
///
/// Built from user input through [`ContainerId::parse`], which enforces the
/// [`CONTAINER_ID_PREFIX`]. Values echoed back by the service are taken as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId(String);

impl ContainerId {
    /// Validate a raw identifier. Returns `None` if it lacks the prefix.
    pub fn parse(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.starts_with(CONTAINER_ID_PREFIX) {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque token issued by `/qr/sign`; authorizes one create call for a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(String);

impl Signature {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Household a container is assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HouseholdId(String);

impl HouseholdId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HouseholdId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Geolocation
// =============================================================================

/// Device coordinates captured when a request is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoLocation {
    /// Sentinel sent when no location could be obtained. Not a real coordinate.
    pub const UNAVAILABLE: GeoLocation = GeoLocation {
        latitude: 0.0,
        longitude: 0.0,
    };

    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

// =============================================================================
// Wire shapes
// =============================================================================

/// `GET /qr/sign` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignResponse {
    pub container_id: ContainerId,
    pub sig: Signature,
}

/// `GET /qr/verify` response.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyResponse {
    #[serde(default)]
    pub valid: bool,
}

/// `GET /containers/{id}` response. Only the fields this client reads.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerDetails {
    #[serde(default)]
    pub assigned_household_id: Option<String>,
}

impl ContainerDetails {
    /// Assigned household, with an empty string treated as unassigned.
    pub fn household_id(&self) -> Option<HouseholdId> {
        self.assigned_household_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(HouseholdId::new)
    }
}

/// `GET /collection-requests/check-pending` response.
#[derive(Debug, Clone, Deserialize)]
pub struct PendingResponse {
    #[serde(default)]
    pub pending: bool,
}

/// `POST /collection-requests` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestBody {
    pub container_id: ContainerId,
    pub household_id: Option<HouseholdId>,
    pub geo_at_request: GeoLocation,
}

/// `POST /collection-requests` response.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedRequest {
    pub id: String,
}

/// Result of a successful sign step.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedContainer {
    pub signature: Signature,
    pub household_id: Option<HouseholdId>,
}
