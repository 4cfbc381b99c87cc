//! HTTP and WebSocket host for Morra games.
//!
//! The binary in `main.rs` wires configuration, logging and a store backend
//! into [`api::create_router`].

pub mod api;
pub mod config;
pub mod logging;
