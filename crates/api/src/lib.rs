//! Intake API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes,
//! event subscribers) so integration tests and the binary entrypoint can
//! both access them.

pub mod config;
pub mod error;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod subscribers;
