//! # shapestat HTTP Server Module
//!
//! JSON over HTTP on top of the API handler.
//!
//! # Endpoints
//!
//! - `GET  /health`
//! - `GET  /schemas`
//! - `POST /schemas/:id` register
//! - `GET  /schemas/:id` wire-format schema
//! - `POST /schemas/:id/records` submit (201 accepted, 422 rejected)
//! - `GET  /schemas/:id/analysis`
//! - `POST /schemas/:id/analysis/rebuild`

pub mod config;
pub mod routes;
pub mod server;

pub use config::HttpServerConfig;
pub use server::HttpServer;
