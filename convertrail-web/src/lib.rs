//! Convertrail web front end: an axum server rendering yew pages on the
//! server, with one signed-cookie session per player.
#![forbid(unsafe_code)]

pub mod components;
pub mod config;
pub mod cookie;
pub mod error;
pub mod i18n;
pub mod pages;
pub mod render;
pub mod routes;
pub mod session;
pub mod state;

pub use config::ServerConfig;
pub use cookie::{CookieSigner, SESSION_COOKIE};
pub use error::WebError;
pub use routes::create_router;
pub use session::SessionStore;
pub use state::AppState;

/// Re-export of the core crate for page tests and embedding.
pub use convertrail_game as game;
