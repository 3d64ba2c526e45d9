//! HalalNest API client and types.
//!
//! This module provides the interface for communicating with the merchant
//! REST API.

mod client;
pub mod error;
pub mod types;

pub use client::HalalNestClient;
pub use error::ApiError;
