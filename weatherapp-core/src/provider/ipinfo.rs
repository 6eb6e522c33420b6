use async_trait::async_trait;
use reqwest::Client;

use crate::{
    error::FetchError,
    model::GeoLocation,
    provider::{classify_response, decode_json},
};

use super::GeolocationProvider;

pub const DEFAULT_BASE_URL: &str = "https://ipinfo.io";

/// ipinfo.io `/json`: location of the requesting IP, no parameters.
#[derive(Debug, Clone)]
pub struct IpInfoProvider {
    base_url: String,
    http: Client,
}

impl IpInfoProvider {
    pub fn new(http: Client) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.to_string(), http)
    }

    pub fn with_base_url(base_url: String, http: Client) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    pub fn lookup_url(&self) -> String {
        format!("{}/json", self.base_url)
    }
}

#[async_trait]
impl GeolocationProvider for IpInfoProvider {
    async fn locate(&self) -> Result<GeoLocation, FetchError> {
        tracing::debug!("requesting location from IP");

        let res = self.http.get(self.lookup_url()).send().await?;

        let status = res.status();
        let body = res.text().await?;
        tracing::debug!(status = status.as_u16(), bytes = body.len(), "geolocation response");

        let body = classify_response(status, body)?;
        decode_json(&body)
    }
}
