//! Core types for Tidemark.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod money;
pub mod status;

pub use money::{Money, MoneyError, minor_units};
pub use status::StockStatus;
