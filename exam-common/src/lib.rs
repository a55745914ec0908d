//! # Exam Results Common Library
//!
//! Shared code for the exam results lookup service including:
//! - Bootstrap configuration loading (TOML, environment, command line)
//! - Identifier digit normalization
//! - Update secret verification
//! - Common error types

pub mod auth;
pub mod config;
pub mod digits;
pub mod error;

pub use digits::normalize_digits;
pub use error::{Error, Result};
