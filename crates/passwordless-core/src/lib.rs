//! Shared plumbing for passwordless services: tracing, request ids and
//! environment-backed configuration.

pub mod config;
pub mod middleware;
pub mod tracing;
