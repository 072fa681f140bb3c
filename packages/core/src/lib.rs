// Library root. Exposes internal modules for integration tests in `tests/`.
// Production entry point remains `src/main.rs`.

pub mod api;
pub mod cache;
pub mod error;
pub mod metrics;
pub mod proxy;
pub mod services;
pub mod sweeper;
pub mod valuation;

// Startup plumbing used by the binary.
pub mod cli;
pub mod config;
pub mod logging;
