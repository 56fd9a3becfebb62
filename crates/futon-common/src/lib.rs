//! Common types for the futon workspace
//!
//! This crate provides the unified error taxonomy shared by every futon crate.

pub mod error;

pub use error::{FutonError, Result};
