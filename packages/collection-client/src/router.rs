//! Page routes for scanned QR links.
//!
//! Every link lands on the single collection-request form. `/deatils` is a
//! misspelling printed on QR codes already in the field and must keep
//! working. Unknown paths and `/` redirect to `/details` with the query string
//! kept, so the `containerId` survives the redirect.
//!
//! Matching is case-insensitive and tolerates one trailing slash.

use tracing::debug;
use url::Url;

pub const DETAILS_PATH: &str = "/details";
pub const DETAILS_TYPO_PATH: &str = "/deatils";

/// Views a route can render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    CollectionRequest,
}

/// Routes that render a view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Details,
    DetailsTypo,
}

impl Route {
    pub fn name(&self) -> &'static str {
        match self {
            Route::Details => "collection-request",
            Route::DetailsTypo => "collection-request-typo",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Details => DETAILS_PATH,
            Route::DetailsTypo => DETAILS_TYPO_PATH,
        }
    }

    pub fn view(&self) -> View {
        View::CollectionRequest
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteResolution {
    Render(Route),
    Redirect { location: String },
}

/// Resolve a request path and optional query string.
pub fn resolve(path: &str, query: Option<&str>) -> RouteResolution {
    match normalize(path).as_str() {
        DETAILS_PATH => RouteResolution::Render(Route::Details),
        DETAILS_TYPO_PATH => RouteResolution::Render(Route::DetailsTypo),
        _ => RouteResolution::Redirect {
            location: details_location(query),
        },
    }
}

/// A page after redirects have been followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPage {
    pub route: Route,
    pub query: Option<String>,
}

impl ResolvedPage {
    pub fn view(&self) -> View {
        self.route.view()
    }
}

/// Resolve a full scanned URL to the page it ends up rendering.
pub fn resolve_url(url: &Url) -> ResolvedPage {
    let query = url.query().filter(|q| !q.is_empty()).map(str::to_string);

    match resolve(url.path(), query.as_deref()) {
        RouteResolution::Render(route) => ResolvedPage { route, query },
        RouteResolution::Redirect { location } => {
            debug!(from = url.path(), to = %location, "Redirecting");
            ResolvedPage {
                route: Route::Details,
                query,
            }
        }
    }
}

fn normalize(path: &str) -> String {
    let trimmed = match path.strip_suffix('/') {
        Some(rest) if !rest.is_empty() => rest,
        _ => path,
    };
    trimmed.to_ascii_lowercase()
}

fn details_location(query: Option<&str>) -> String {
    match query.map(|q| q.trim_start_matches('?')) {
        Some(q) if !q.is_empty() => format!("{DETAILS_PATH}?{q}"),
        _ => DETAILS_PATH.to_string(),
    }
}
