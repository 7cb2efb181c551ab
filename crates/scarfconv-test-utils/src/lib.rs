#![deny(unsafe_code)]

//! Shared test utilities for the scarfconv workspace.
//!
//! Provides tool list fixtures, config builders, an in-memory finding sink,
//! and tracing helpers so that individual crate tests stay concise.
//!
//! Add this crate as a `[dev-dependency]` in any workspace member:
//!
//! ```toml
//! [dev-dependencies]
//! scarfconv-test-utils = { workspace = true }
//! ```

pub mod config;
pub mod fixtures;
pub mod log_capture;
pub mod sink;
pub mod tracing_setup;
