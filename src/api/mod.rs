//! HTTP endpoint layer.
//!
//! Thin axum adapter over the task service: verb+path routing, query and
//! body parsing, and status-code translation.

pub mod server;

pub use server::{ApiServer, build_router, router, serve};
