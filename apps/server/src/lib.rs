//! cartlist HTTP server: request gateway, auth, and price-feed wiring.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod state;

pub use config::Config;
pub use state::{build_state, init_tracing, AppState};
