//! HTTP middleware for the storefront.

pub mod session;
