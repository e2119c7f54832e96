//! Client-side resource cache and fetch orchestration for the stockdb
//! portfolio tracker.

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod invalidation;
pub mod logging;
pub mod plot;
pub mod resources;
pub mod selectors;
pub mod state;

pub use client::Client;
pub use state::{AppState, Store};
