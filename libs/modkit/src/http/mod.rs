//! HTTP utilities for modkit
//!
//! Shared middleware for request correlation and the standard layer stack.

pub mod health;
pub mod layers;
pub mod request_id;
