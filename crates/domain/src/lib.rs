//! # EventHorizon Domain
//!
//! Business domain types and models for the EventHorizon client.
//!
//! This crate contains:
//! - Resource representations (events, registrations, users)
//! - The outer response envelope shared by every API call
//! - Domain error types and Result definitions
//! - Client configuration structures
//!
//! ## Architecture
//! - No dependencies on other EventHorizon crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
