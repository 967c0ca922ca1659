//! DevAssist Server: axum HTTP API over the DevAssist services.

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod extract;
pub mod gate;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use routes::build_router;
pub use state::AppState;
