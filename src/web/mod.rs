//! HTTP API for marknote.
//!
//! Serves collections, their trees and file records as JSON, plus image
//! uploads, for the browser frontend.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::create_router;
pub use server::WebServer;
