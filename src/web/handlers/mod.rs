//! # Web Handlers
//!
//! Request handlers grouped by endpoint family.

pub mod ga4;
pub mod health;
pub mod pospago;
