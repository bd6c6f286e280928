//! Core types and shared functionality for pagesift.
//!
//! This crate provides:
//! - Request/result data model for the acquisition pipeline
//! - Unified error types
//! - Configuration structures

pub mod config;
pub mod error;
pub mod model;

pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use model::{AcquisitionResult, AttemptOutcome, FetchMode, FetchRequest, SearchHit, TierAttempt, TierUsed};
