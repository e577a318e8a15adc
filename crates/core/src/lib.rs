//! Tidemark Core - Shared types library.
//!
//! This crate provides common types and pure logic used across Tidemark
//! components:
//! - `storefront` - Public-facing e-commerce site
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Money and stock-status types
//! - [`format`] - Display-price and text formatting helpers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod format;
pub mod types;

pub use types::*;
