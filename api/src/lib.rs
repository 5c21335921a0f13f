pub mod config;
pub mod error;
pub mod handlers;
pub mod handoff;
pub mod metrics;
pub mod metrics_handler;
pub mod navigation_guard;
pub mod observability;
pub mod routes;
pub mod session_middleware;
pub mod state;
pub mod validation;
pub mod views;
