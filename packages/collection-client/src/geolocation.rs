//! Device location capture.
//!
//! Location is optional metadata on a collection request. [`acquire_location`]
//! is the only entry point the flows use: it applies the timeout and folds
//! every failure into `None`, so nothing here can fail a submission.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::time::Instant;
use tracing::warn;

use crate::types::GeoLocation;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("Geolocation not supported")]
    Unsupported,

    #[error("Geolocation permission denied")]
    PermissionDenied,

    #[error("Position unavailable: {0}")]
    Unavailable(String),

    #[error("Geolocation timed out")]
    Timeout,
}

/// Options for one position lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    /// Upper bound on how long a lookup may take
    pub timeout: Duration,
    /// Oldest cached fix that may be returned instead of a fresh one
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            maximum_age: Duration::from_secs(60),
        }
    }
}

#[async_trait]
pub trait BaseGeolocator: Send + Sync {
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<GeoLocation, GeolocationError>;
}

#[async_trait]
impl<G: BaseGeolocator + ?Sized> BaseGeolocator for Arc<G> {
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<GeoLocation, GeolocationError> {
        (**self).current_position(options).await
    }
}

/// Acquire a position, or `None` if it is unsupported, fails, or times out.
pub async fn acquire_location(
    geolocator: &dyn BaseGeolocator,
    options: &PositionOptions,
) -> Option<GeoLocation> {
    match tokio::time::timeout(options.timeout, geolocator.current_position(options)).await {
        Ok(Ok(location)) => Some(location),
        Ok(Err(GeolocationError::Unsupported)) => {
            warn!("Geolocation not supported");
            None
        }
        Ok(Err(err)) => {
            warn!(error = %err, "Geolocation error");
            None
        }
        Err(_) => {
            warn!(
                timeout_ms = options.timeout.as_millis() as u64,
                error = %GeolocationError::Timeout,
                "Geolocation error"
            );
            None
        }
    }
}

/// Device without a location capability
pub struct NoopGeolocator;

#[async_trait]
impl BaseGeolocator for NoopGeolocator {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<GeoLocation, GeolocationError> {
        Err(GeolocationError::Unsupported)
    }
}

/// Location supplied up front, e.g. from command-line flags.
pub struct FixedGeolocator {
    location: GeoLocation,
}

impl FixedGeolocator {
    pub fn new(location: GeoLocation) -> Self {
        Self { location }
    }
}

#[async_trait]
impl BaseGeolocator for FixedGeolocator {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<GeoLocation, GeolocationError> {
        Ok(self.location)
    }
}

/// Reuses the last fix while it is younger than `options.maximum_age`.
pub struct CachedGeolocator<G> {
    inner: G,
    last_fix: Mutex<Option<(GeoLocation, Instant)>>,
}

impl<G: BaseGeolocator> CachedGeolocator<G> {
    pub fn new(inner: G) -> Self {
        Self {
            inner,
            last_fix: Mutex::new(None),
        }
    }

    fn cached(&self, maximum_age: Duration) -> Option<GeoLocation> {
        let last_fix = *self.last_fix.lock().ok()?;
        last_fix
            .filter(|(_, taken_at)| taken_at.elapsed() <= maximum_age)
            .map(|(location, _)| location)
    }
}

#[async_trait]
impl<G: BaseGeolocator> BaseGeolocator for CachedGeolocator<G> {
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<GeoLocation, GeolocationError> {
        if let Some(location) = self.cached(options.maximum_age) {
            return Ok(location);
        }

        let location = self.inner.current_position(options).await?;
        if let Ok(mut guard) = self.last_fix.lock() {
            *guard = Some((location, Instant::now()));
        }
        Ok(location)
    }
}
