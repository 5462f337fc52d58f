//! Function runner - serves a configured pipeline over HTTP
//!
//! Loads a pipeline definition at startup and exposes it together with the
//! function catalog, health and Prometheus metrics.

pub mod api;
pub mod config;
