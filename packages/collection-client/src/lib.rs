//! Container collection-request client.
//!
//! A QR code on a container links to the collection-request form with a
//! `containerId` query parameter. This crate runs that form's calls against
//! the collection-request API: sign the container, look up its household,
//! check for a pending request, and submit a new one tagged with the device
//! location when available.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use collection_client::{ApiClient, ApiConfig, CollectionFlow, FlowStage, NoopGeolocator, Url};
//!
//! let client = ApiClient::new(ApiConfig::from_env()?)?;
//! let mut flow = CollectionFlow::new(client, Arc::new(NoopGeolocator));
//!
//! let url = Url::parse("https://forms.example.com/deatils?containerId=container_42")?;
//! if let FlowStage::Ready(ready) = flow.prepare_from_url(&url).await? {
//!     let request_id = flow.submit(&ready).await?;
//!     println!("created {request_id}");
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod flow;
pub mod geolocation;
pub mod pending;
pub mod router;
pub mod state;
pub mod submission;
pub mod testing;
pub mod transport;
pub mod types;
pub mod url_params;
pub mod verification;

pub use client::{is_public_path, ApiClient, API_KEY_HEADER, PUBLIC_ENDPOINTS};
pub use config::ApiConfig;
pub use error::{ApiError, Result};
pub use flow::{CollectionFlow, FlowStage, ReadyState};
pub use geolocation::{
    acquire_location, BaseGeolocator, CachedGeolocator, FixedGeolocator, GeolocationError,
    NoopGeolocator, PositionOptions,
};
pub use pending::PendingCheck;
pub use router::{resolve, resolve_url, ResolvedPage, Route, RouteResolution, View};
pub use state::RequestState;
pub use submission::CollectionRequestSubmitter;
pub use transport::{ApiRequest, ApiResponse, BaseTransport, Method, ReqwestTransport};
pub use types::*;
pub use url::Url;
pub use url_params::{container_id_from_url, extract_container_id};
pub use verification::ContainerVerification;
