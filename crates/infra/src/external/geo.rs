//! ip-api.com geolocation (`/json/{ip}?fields=countryCode`).

use std::net::IpAddr;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use super::{ExternalError, GeoLocator};

pub const DEFAULT_GEO_API_BASE_URL: &str = "http://ip-api.com";

#[derive(Debug, Clone)]
pub struct IpApiLocator {
    base_url: String,
    http_client: Client,
}

impl IpApiLocator {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ExternalError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExternalError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CountryResponse {
    country_code: Option<String>,
}

impl CountryResponse {
    /// ip-api answers private or reserved ranges with no code or an empty one.
    fn into_code(self) -> Option<String> {
        self.country_code.filter(|code| !code.trim().is_empty())
    }
}

#[async_trait::async_trait]
impl GeoLocator for IpApiLocator {
    #[instrument(skip(self))]
    async fn country_code(&self, ip: &str) -> Result<Option<String>, ExternalError> {
        // The address is reported by game servers and goes into the URL path.
        let ip: IpAddr = ip
            .trim()
            .parse()
            .map_err(|_| ExternalError::Unavailable(format!("not an IP address: {ip}")))?;
        let url = format!("{}/json/{}", self.base_url, ip);
        let body: CountryResponse = self
            .http_client
            .get(&url)
            .query(&[("fields", "countryCode")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(body.into_code())
    }
}
