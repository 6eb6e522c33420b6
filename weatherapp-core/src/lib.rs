//! Core library for the `weatherapp` client.
//!
//! This crate defines:
//! - The weather and IP-geolocation providers, sharing one injected HTTP client
//! - The observable result cell (`Idle` / `Loading` / `Success` / `Error`)
//! - The session that runs the location bootstrap and user-triggered weather requests
//! - Configuration & credentials handling
//!
//! It is used by `weatherapp-cli`, but any other front end can subscribe to a session's state.

pub mod config;
pub mod error;
pub mod http;
pub mod model;
pub mod provider;
pub mod session;
pub mod state;

pub use config::Config;
pub use error::FetchError;
pub use model::{GeoLocation, WeatherReport};
pub use provider::{GeolocationProvider, WeatherProvider};
pub use session::WeatherSession;
pub use state::{ResultState, StateStream};
