//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, URL params, etc.)
//! 2. Calls into the store and services
//! 3. Returns HTTP response (JSON, status code)

/// Extractors answering with the JSON error body
pub mod extract;
/// Health check endpoint
pub mod health;
/// Public status page views
pub mod public;
/// Service endpoints
pub mod services;
/// Status update endpoints
pub mod status_updates;
