//! Request flows that feed the result cell.
//!
//! A [`WeatherSession`] owns the [`StateCell`] and both providers. It exposes the weather flow
//! ([`WeatherSession::fetch_weather`]) and runs the location bootstrap once on start. Flows are
//! independent tokio tasks with no ordering between them: whichever finishes last owns the cell.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{
    error::FetchError,
    provider::{GeolocationProvider, WeatherProvider},
    state::{ResultState, StateCell, StateStream},
};

pub const EMPTY_WEATHER_MESSAGE: &str = "Failed to load: Empty weather data";
pub const EMPTY_LOCATION_MESSAGE: &str = "Failed to load: Empty response";

#[derive(Debug)]
pub struct WeatherSession {
    shared: Arc<Shared>,
    shutdown: CancellationToken,
    bootstrapped: AtomicBool,
}

#[derive(Debug)]
struct Shared {
    weather: Arc<dyn WeatherProvider>,
    geo: Arc<dyn GeolocationProvider>,
    state: StateCell,
}

impl WeatherSession {
    /// Build a session in `Idle` without touching the network.
    pub fn new(weather: Arc<dyn WeatherProvider>, geo: Arc<dyn GeolocationProvider>) -> Self {
        Self {
            shared: Arc::new(Shared { weather, geo, state: StateCell::new() }),
            shutdown: CancellationToken::new(),
            bootstrapped: AtomicBool::new(false),
        }
    }

    /// Build a session and immediately spawn the location bootstrap.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(weather: Arc<dyn WeatherProvider>, geo: Arc<dyn GeolocationProvider>) -> Self {
        let session = Self::new(weather, geo);
        session.bootstrap();
        session
    }

    pub fn state(&self) -> ResultState {
        self.shared.state.snapshot()
    }

    pub fn subscribe(&self) -> StateStream {
        self.shared.state.subscribe()
    }

    /// Resolve the caller's city from its IP and fetch weather for it.
    ///
    /// Runs at most once per session; later calls, and calls after shutdown, return `None`.
    pub fn bootstrap(&self) -> Option<JoinHandle<()>> {
        if self.shutdown.is_cancelled() {
            tracing::warn!("session is shut down, skipping location bootstrap");
            return None;
        }
        if self.bootstrapped.swap(true, Ordering::SeqCst) {
            tracing::debug!("location bootstrap already ran");
            return None;
        }

        let shared = Arc::clone(&self.shared);
        Some(self.spawn(async move { shared.locate_and_fetch().await }))
    }

    /// Fetch weather for `city`.
    ///
    /// The cell is `Loading` by the time this returns; the request itself runs on a spawned
    /// task. Returns `None` after [`shutdown`](Self::shutdown).
    pub fn fetch_weather(&self, city: impl Into<String>) -> Option<JoinHandle<()>> {
        if self.shutdown.is_cancelled() {
            tracing::warn!("session is shut down, ignoring weather request");
            return None;
        }

        let city = city.into();
        self.shared.state.set(ResultState::Loading);

        let shared = Arc::clone(&self.shared);
        Some(self.spawn(async move { shared.request_weather(&city).await }))
    }

    /// Same flow as [`fetch_weather`](Self::fetch_weather), awaited in place instead of
    /// spawned; returns the state it leaves behind. After shutdown the cell is not touched.
    pub async fn load_weather(&self, city: &str) -> ResultState {
        if self.shutdown.is_cancelled() {
            tracing::warn!("session is shut down, ignoring weather request");
            return self.state();
        }

        self.shared.state.set(ResultState::Loading);

        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => tracing::debug!(city, "weather request cancelled"),
            _ = self.shared.request_weather(city) => {}
        }

        self.state()
    }

    /// Cancel every in-flight flow. Cancelled flows leave the cell as it is.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    fn spawn<F>(&self, flow: F) -> JoinHandle<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let token = self.shutdown.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => tracing::debug!("flow cancelled"),
                _ = flow => {}
            }
        })
    }
}

impl Drop for WeatherSession {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl Shared {
    async fn request_weather(&self, city: &str) {
        tracing::debug!(city, "fetching weather");

        let next = match self.weather.current(city).await {
            Ok(report) => {
                tracing::info!(city, location = %report.location.name, "weather data loaded");
                ResultState::Success(report)
            }
            Err(err) => {
                tracing::error!(city, status = err.status(), error = %err, "failed to load weather");
                ResultState::Error(weather_error_message(&err))
            }
        };

        self.state.set(next);
    }

    async fn locate_and_fetch(&self) {
        tracing::debug!("fetching city from IP");

        match self.geo.locate().await {
            Ok(location) => match location.city_name() {
                Some(city) => {
                    tracing::info!(city, "city fetched");
                    self.state.set(ResultState::Loading);
                    self.request_weather(city).await;
                }
                None => {
                    tracing::error!(ip = location.ip.as_deref(), "location response has no city");
                    self.state.set(ResultState::Error(EMPTY_LOCATION_MESSAGE.to_string()));
                }
            },
            Err(err) => {
                tracing::error!(status = err.status(), error = %err, "failed to load location");
                self.state.set(ResultState::Error(location_error_message(&err)));
            }
        }
    }
}

// `FetchError`'s `Display` is the bare reason, so each flow adds exactly one prefix.
fn weather_error_message(err: &FetchError) -> String {
    match err {
        FetchError::EmptyBody => EMPTY_WEATHER_MESSAGE.to_string(),
        other => format!("Failed to load weather: {other}"),
    }
}

fn location_error_message(err: &FetchError) -> String {
    match err {
        FetchError::EmptyBody => EMPTY_LOCATION_MESSAGE.to_string(),
        other => format!("Failed to get location: {other}"),
    }
}
