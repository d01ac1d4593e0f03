//! Query-string helpers for scanned QR links.

use tracing::error;
use url::{form_urlencoded, Url};

use crate::types::ContainerId;

pub const CONTAINER_ID_PARAM: &str = "containerId";

/// Read and validate `containerId` from a query string.
///
/// Accepts the query with or without its leading `?`. A missing, empty or
/// unprefixed value is logged and yields `None`; it is never an error.
pub fn extract_container_id(query: &str) -> Option<ContainerId> {
    let query = query.strip_prefix('?').unwrap_or(query);

    let value = form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == CONTAINER_ID_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty());

    let Some(value) = value else {
        error!("No containerId found in URL");
        return None;
    };

    let container_id = ContainerId::parse(value.as_str());
    if container_id.is_none() {
        error!(container_id = %value, "Invalid containerId format");
    }
    container_id
}

pub fn container_id_from_url(url: &Url) -> Option<ContainerId> {
    extract_container_id(url.query().unwrap_or(""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_parameter_is_none() {
        assert_eq!(extract_container_id(""), None);
        assert_eq!(extract_container_id("?"), None);
        assert_eq!(extract_container_id("foo=bar"), None);
        assert_eq!(extract_container_id("containerid=container_1"), None);
        assert_eq!(extract_container_id("containerId="), None);
    }

    #[test]
    fn unprefixed_value_is_none() {
        assert_eq!(extract_container_id("containerId=42"), None);
        assert_eq!(extract_container_id("containerId=bin_42"), None);
        assert_eq!(extract_container_id("containerId=%20container_42"), None);
    }

    #[test]
    fn prefixed_value_is_returned_exactly() {
        for id in ["container_42", "container_", "container_a-b_C9"] {
            let query = format!("?containerId={id}");
            assert_eq!(extract_container_id(&query).unwrap().as_str(), id);
        }
    }

    #[test]
    fn value_is_percent_decoded_and_first_wins() {
        let id = extract_container_id("x=1&containerId=container_a%2Fb&containerId=container_2");
        assert_eq!(id.unwrap().as_str(), "container_a/b");
    }

    #[test]
    fn reads_from_full_url() {
        let url = Url::parse("https://forms.example.com/deatils?containerId=container_42").unwrap();
        assert_eq!(container_id_from_url(&url).unwrap().as_str(), "container_42");

        let url = Url::parse("https://forms.example.com/details").unwrap();
        assert_eq!(container_id_from_url(&url), None);
    }
}
