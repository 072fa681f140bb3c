//! MVRV Valuation Module
//!
//! Estimates "market value to realized value" for a coin or a comparison
//! set from upstream market data fetched through the proxy cache.

pub mod calculator;
pub mod service;
pub mod status;
pub mod types;

pub use service::ValuationService;
pub use status::{MvrvStatus, StatusInfo};
pub use types::*;
