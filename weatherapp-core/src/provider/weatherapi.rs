use async_trait::async_trait;
use reqwest::Client;

use crate::{
    error::FetchError,
    model::WeatherReport,
    provider::{classify_response, decode_json},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com";

/// WeatherAPI.com `current.json`.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: String, http: Client) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string(), http)
    }

    pub fn with_base_url(api_key: String, base_url: String, http: Client) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self { api_key, base_url, http }
    }

    pub fn current_url(&self) -> String {
        format!("{}/v1/current.json", self.base_url)
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn current(&self, city: &str) -> Result<WeatherReport, FetchError> {
        tracing::debug!(city, "requesting current weather");

        let res = self
            .http
            .get(self.current_url())
            .query(&[("key", self.api_key.as_str()), ("q", city)])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        tracing::debug!(city, status = status.as_u16(), bytes = body.len(), "weather response");

        let body = classify_response(status, body)?;
        decode_json(&body)
    }
}
