//! REST API client module for the satellite monitoring service.
//!
//! This module provides the `ApiClient` for communicating with the
//! monitoring backend: images, detections, alerts, investigations,
//! regions, financial risks, event logs, spectral analytics, statistics
//! and reports.
//!
//! The API uses JWT bearer token authentication. Access tokens are
//! refreshed once per rejected request through the refresh endpoint.

pub mod client;
pub mod endpoints;
pub mod error;
pub mod retry;

pub use client::{ApiClient, ApiRequest};
pub use endpoints::ListQuery;
pub use error::ApiError;
