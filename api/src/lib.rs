//! HTTP surface of the KeyKeeper backend
//!
//! Routes, request DTOs, the bearer token middleware, error mapping and the
//! process lifecycle that wires infrastructure into the core services.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod telemetry;

pub use app::{create_app, AppState};
pub use server::Application;
