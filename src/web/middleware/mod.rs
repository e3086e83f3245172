//! # Web Middleware
//!
//! Request ID tagging. Timeouts, CORS and tracing come from `tower-http` and
//! are layered in [`crate::web::create_app`].

pub mod request_id;
