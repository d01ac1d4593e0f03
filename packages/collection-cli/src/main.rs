//! `collect` - request a container collection from a scanned QR link.
//!
//! ```bash
//! collect "https://forms.example.com/deatils?containerId=container_42"
//! collect "/details?containerId=container_42" --latitude 25.2 --longitude 55.3 --yes
//! ```
//!
//! Configuration comes from `COLLECTION_API_BASE_URL`, `COLLECTION_API_KEY`
//! and `COLLECTION_API_TIMEOUT_SECS` (a `.env` file is read if present);
//! flags override the environment.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use collection_client::{
    ApiClient, ApiConfig, BaseGeolocator, CachedGeolocator, CollectionFlow, FixedGeolocator,
    FlowStage, GeoLocation, NoopGeolocator, Url,
};
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Origin used to resolve links given as a bare path and query.
const LINK_ORIGIN: &str = "https://collect.invalid";

#[derive(Debug, Parser)]
#[command(name = "collect", version, about = "Request a collection for a container QR code")]
struct Cli {
    /// Scanned QR link, or just its path and query (`/details?containerId=...`)
    link: String,

    /// API base URL (overrides COLLECTION_API_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// API key for protected endpoints (overrides COLLECTION_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Device latitude to attach to the request
    #[arg(long, requires = "longitude", allow_negative_numbers = true)]
    latitude: Option<f64>,

    /// Device longitude to attach to the request
    #[arg(long, requires = "latitude", allow_negative_numbers = true)]
    longitude: Option<f64>,

    /// Re-verify the issued signature before continuing
    #[arg(long)]
    verify: bool,

    /// Stop after the pending check
    #[arg(long)]
    check_only: bool,

    /// Submit without asking for confirmation
    #[arg(short, long)]
    yes: bool,
}

impl Cli {
    fn location(&self) -> Option<GeoLocation> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoLocation::new(latitude, longitude)),
            _ => None,
        }
    }

    fn config(&self) -> Result<ApiConfig> {
        let mut config = ApiConfig::from_env().context("Failed to load configuration")?;
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url.as_str());
        }
        if let Some(api_key) = &self.api_key {
            config = config.with_api_key(api_key.as_str());
        }
        Ok(config)
    }
}

/// Accept a full URL or a path-and-query relative to the form's origin.
fn parse_link(link: &str) -> Result<Url> {
    let link = link.trim();
    match Url::parse(link) {
        Ok(url) => Ok(url),
        Err(_) => Url::parse(LINK_ORIGIN)
            .and_then(|origin| origin.join(link))
            .with_context(|| format!("Not a valid link: {link}")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,collection_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let url = parse_link(&cli.link)?;
    let config = cli.config()?;
    tracing::debug!(base_url = %config.base_url, "Configuration loaded");

    let geolocator: Arc<dyn BaseGeolocator> = match cli.location() {
        Some(location) => Arc::new(CachedGeolocator::new(FixedGeolocator::new(location))),
        None => Arc::new(NoopGeolocator),
    };

    let client = ApiClient::new(config).context("Failed to create API client")?;
    let mut flow = CollectionFlow::new(client, geolocator);

    println!("{}", "🔎 Verifying container...".bright_blue());
    let prepared = flow.prepare_from_url(&url).await;
    let stage = match prepared {
        Ok(stage) => stage,
        Err(err) => return Err(report(&flow, err)),
    };

    let ready = match stage {
        FlowStage::MissingContainerId => {
            println!(
                "{}",
                "✗ This link has no valid container id. Please scan the QR code on the container."
                    .bright_red()
            );
            anyhow::bail!("missing or invalid containerId");
        }
        FlowStage::AlreadyPending { container_id, .. } => {
            println!(
                "{} {}",
                "⏳ A collection request is already pending for".bright_yellow(),
                container_id.to_string().bold()
            );
            return Ok(());
        }
        FlowStage::Ready(ready) => ready,
    };

    println!("  {} {}", "✓".bright_green(), ready.container_id.to_string().bold());
    match &ready.signed.household_id {
        Some(household) => println!("  {} household {}", "✓".bright_green(), household),
        None => println!("  {} household unknown", "•".dimmed()),
    }
    if let Some(message) = flow.pending().error() {
        println!("  {} {}", "!".bright_yellow(), message.dimmed());
    }

    if cli.verify {
        match flow.verification().verify_signature().await {
            Ok(true) => println!("  {} signature valid", "✓".bright_green()),
            Ok(false) => println!("  {} signature could not be confirmed", "!".bright_yellow()),
            Err(err) => println!("  {} {}", "!".bright_yellow(), err),
        }
    }

    if cli.check_only {
        println!("{}", "No pending request. Nothing submitted (--check-only).".dimmed());
        return Ok(());
    }

    if !cli.yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Request a collection for {}?", ready.container_id))
            .default(true)
            .interact()?;
        if !confirmed {
            println!("{}", "Cancelled.".dimmed());
            return Ok(());
        }
    }

    println!("{}", "📨 Submitting collection request...".bright_blue());
    let submitted = flow.submit(&ready).await;
    match submitted {
        Ok(request_id) => {
            println!(
                "{} {}",
                "✅ Collection requested. Reference:".bright_green().bold(),
                request_id.bold()
            );
            Ok(())
        }
        Err(err) => Err(report(&flow, err)),
    }
}

/// Print the flow's user-facing message and keep the underlying error.
fn report(flow: &CollectionFlow, err: collection_client::ApiError) -> anyhow::Error {
    if let Some(message) = flow.error() {
        println!("{} {}", "✗".bright_red(), message.bright_red());
    }
    anyhow::Error::new(err)
}
