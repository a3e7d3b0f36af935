//! # hue_bridge_rs
//!
//! An async Rust client for the Philips Hue bridge REST API.
//!
//! The bridge exposes lights, groups, sensors, scenes and schedules as JSON
//! resources below `http://<bridge>/api/<username>/`. This crate wraps them in
//! typed accessors and handles, and takes care of the one-time pairing that
//! yields the `username` token.
//!
//! ## Quick Start
//!
//! ```ignore
//! use hue_bridge_rs::{Bridge, Brightness, TransitionTime};
//!
//! async fn evening() -> Result<(), hue_bridge_rs::Error> {
//!     // First run: press the link button on the bridge, then call connect.
//!     // The token is stored in `.hue_bridge` and reused afterwards.
//!     let bridge = Bridge::builder().ip("192.168.1.2").connect().await?;
//!
//!     let mut kitchen = bridge.lights().get("Kitchen").await?;
//!     kitchen.set_transition_time(Some(TransitionTime::from_deciseconds(20)));
//!     kitchen.set_on(true).await?;
//!     kitchen.set_brightness(Brightness::create(120).unwrap()).await?;
//!     kitchen.set_colortemp_k(2700).await?;
//!
//!     bridge.scenes().run_scene("Living room", "Relax", None).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Resources
//!
//! - **Lights**: [`Lights`] resolves names, caches the id/name list and sends
//!   raw state changes; [`Light`] is a handle with one getter/setter pair per
//!   attribute
//! - **Groups**: [`Groups`] and [`Group`]; group 0 ([`Group::all_lights`]) is
//!   every light on the bridge
//! - **Sensors**: [`Sensors`] and [`Sensor`], including creation of software sensors
//! - **Scenes**: [`Scenes`], with [`Scenes::run_scene`] to recall a scene by
//!   group and scene name
//! - **Schedules**: [`Schedules`]
//!
//! ## Replies
//!
//! Writes return the bridge's reply list as [`ApiResponse`] entries. Errors the
//! bridge reports for a write are logged at `warn` and left in the list;
//! errors for a read become [`Error::Api`].
//!
//! ## Logging
//!
//! The crate logs through the [`log`](https://docs.rs/log) facade: requests at
//! `debug`, connection steps at `info`, out-of-range values and bridge errors
//! at `warn`.
//!
//! ## Feature Flags
//!
//! - `default-tls` (default): TLS for the discovery service through the
//!   platform's native TLS
//! - `rustls-tls`: TLS through rustls

mod bridge;
mod config;
mod discovery;
mod errors;
mod group;
mod light;
mod payload;
mod registry;
mod response;
mod scene;
mod schedule;
mod sensor;
mod status;
pub mod transport;
mod types;

// Re-export public API
pub use bridge::{Bridge, BridgeBuilder};
pub use config::{CredentialFile, Credentials, StoredBridge};
pub use discovery::{
    DISCOVERY_URL, DiscoveredBridge, discover_bridges, discover_bridges_at, discover_bridges_with,
};
pub use errors::Error;
pub use group::{Group, GroupInfo, GroupUpdate, Groups};
pub use light::{Light, LightInfo, LightState, Lights, Target};
pub use payload::Payload;
pub use registry::{Collection, CollectionMode, Registry, ResourceKey};
pub use response::{ApiError, ApiResponse, first_error};
pub use scene::{Scene, Scenes};
pub use schedule::{DEFAULT_DESCRIPTION, Schedules};
pub use sensor::{NewSensor, Sensor, SensorContent, SensorInfo, Sensors};
pub use status::LightStatus;
pub use transport::{ApiRequest, HttpTransport, Method, Transport};
pub use types::{
    Alert, Brightness, ColorMode, Effect, Kelvin, Mired, Saturation, TransitionTime, Xy,
};
