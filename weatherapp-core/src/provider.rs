use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, de::DeserializeOwned};
use std::fmt::Debug;

use crate::{
    error::FetchError,
    model::{GeoLocation, WeatherReport},
};

pub mod ipinfo;
pub mod weatherapi;

pub use ipinfo::IpInfoProvider;
pub use weatherapi::WeatherApiProvider;

/// Source of current weather for a free-text city name.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// `city` is forwarded as-is; the remote side decides what an empty or unknown name means.
    async fn current(&self, city: &str) -> Result<WeatherReport, FetchError>;
}

/// Resolves the caller's location from its public IP.
#[async_trait]
pub trait GeolocationProvider: Send + Sync + Debug {
    async fn locate(&self) -> Result<GeoLocation, FetchError>;
}

/// Map a status line and body text to a usable body or a [`FetchError`].
pub fn classify_response(status: StatusCode, body: String) -> Result<String, FetchError> {
    if !status.is_success() {
        return Err(FetchError::Server { status: status.as_u16(), message: server_message(status, &body) });
    }

    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(FetchError::EmptyBody);
    }

    Ok(body)
}

pub fn decode_json<T: DeserializeOwned>(body: &str) -> Result<T, FetchError> {
    Ok(serde_json::from_str(body)?)
}

/// WeatherAPI error body: `{"error": {"code": 1006, "message": "No matching location found."}}`.
/// ipinfo uses `{"error": {"title": "...", "message": "..."}}`, which fits the same shape.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

fn server_message(status: StatusCode, body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        if !envelope.error.message.trim().is_empty() {
            return envelope.error.message;
        }
    }

    if let Some(reason) = status.canonical_reason() {
        return reason.to_string();
    }

    if body.trim().is_empty() { status.as_str().to_string() } else { truncate_body(body) }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

/// One-shot HTTP responders on 127.0.0.1 for exercising the real request path.
#[cfg(test)]
pub(crate) mod canned {
    use reqwest::Client;
    use std::sync::Arc;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        task::JoinHandle,
    };

    /// Answer a single request with `status` (e.g. `"400 Bad Request"`) and a JSON `body`.
    /// Returns the base URL and a handle yielding the request head that was received.
    pub(crate) async fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            stream.write_all(response.as_bytes()).await.unwrap();
            let _ = stream.shutdown().await;
            String::from_utf8_lossy(&head).into_owned()
        });

        (base_url, handle)
    }

    /// Base URL of a port nothing listens on.
    pub(crate) async fn closed_port_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    /// Local requests must not go through a proxy picked up from the environment.
    pub(crate) fn client() -> Client {
        Client::builder().no_proxy().build().unwrap()
    }

    /// Session wired to real providers pointing at the given base URLs.
    pub(crate) fn session(weather_base: String, geo_base: String) -> crate::WeatherSession {
        let http = client();
        crate::WeatherSession::new(
            Arc::new(super::WeatherApiProvider::with_base_url("KEY".into(), weather_base, http.clone())),
            Arc::new(super::IpInfoProvider::with_base_url(geo_base, http)),
        )
    }
}
