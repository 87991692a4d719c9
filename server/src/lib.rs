//! # edb server
//!
//! The read-only HTTP face of an edb store and the `edbd` daemon that wires it to the
//! GitHub fetchers.

pub mod api;
pub mod assets;
pub mod config;

pub use api::{ApiError, EventsServer};
pub use assets::Assets;
pub use config::{Config, ConfigError};
