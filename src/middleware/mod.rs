//! HTTP middleware components.
//!
//! Middleware run before route handlers and can short-circuit requests
//! (e.g. reject unauthenticated callers).

/// API key authentication middleware
pub mod auth;
