//! Clients for the studio backend
//!
//! This module provides:
//! - `BackendClient`, the reqwest-based client for every endpoint
//! - Service traits (`DesignService`, `ProjectService`) the wizard depends on
//! - `ApiError`, the shared failure taxonomy

pub mod client;
pub mod design;
pub mod error;
pub mod estimation;
pub mod projects;

pub use client::BackendClient;
pub use design::DesignService;
pub use error::{ApiError, FieldError};
pub use projects::ProjectService;
