//! Business logic services.
//!
//! Services contain the core logic separated from HTTP handlers: status
//! resolution, update ingestion, history queries and API key handling.

pub mod auth_service;
pub mod history;
pub mod ingestion;
pub mod resolver;
