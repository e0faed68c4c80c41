//! services/client/src/lib.rs
//!
//! The movie review client: configuration, the HTTP and storage adapters for the
//! core ports, and the application layer a view binds to.

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
