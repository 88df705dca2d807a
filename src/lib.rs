//! shapestat - schema-driven record validation with running statistics
//!
//! Register a nested record shape under an identifier, submit records
//! against it, and read back count, mean, and population standard
//! deviation for every numeric field at any depth.
//!
//! Core (pure, synchronous): `schema`, `record`, `stats`.
//! Surroundings: `store`, `api`, `http_server`, `cli`, `observability`.

pub mod api;
pub mod cli;
pub mod http_server;
pub mod observability;
pub mod record;
pub mod schema;
pub mod stats;
pub mod store;
