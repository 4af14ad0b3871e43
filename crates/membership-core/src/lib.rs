//! Core types and trait definitions for the membership intake service.
//!
//! This crate has no HTTP or database dependencies.
//! The API layer and every storage adapter depend on it.

pub mod applicant;
pub mod error;
pub mod query;
pub mod report;
pub mod store;

pub use error::{Error, Result};
