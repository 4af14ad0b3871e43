//! In-process record store for the membership service.
//!
//! Records live in a vector behind an async lock. When opened with a path the
//! vector is loaded from, and written through to, a pretty-printed JSON array
//! on disk.

mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::JsonStore;

#[cfg(test)]
mod tests;
