//! # Web API Integration Tests
//!
//! Router-level tests driven through `tower::ServiceExt::oneshot`:
//! - Sales tile envelopes (data, no data, degraded)
//! - GA4 dashboard endpoints
//! - Health probes and the request ID header

pub mod dashboard_tests;
pub mod health_tests;
pub mod pospago_tile_tests;
pub mod test_infrastructure;

/// Re-export common test utilities
pub use test_infrastructure::*;
