//! # Assay Library
//!
//! This library exposes the Assay application modules for testing and
//! integration: evidence sources, the async interrogation driver, the
//! lifecycle engine, configuration, CLI commands and the HTTP API.
//!
//! The main binary uses these modules through the `main.rs` entry point.

pub mod api;
pub mod cli;
pub mod config;
pub mod engine;
pub mod interrogation;
pub mod parallel;
pub mod source;

// Re-export assay_core for convenience
pub use assay_core;
