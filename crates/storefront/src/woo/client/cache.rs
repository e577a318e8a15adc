//! Cache types for catalog API responses.
//!
//! Only catalog reads are cached. Cart and checkout responses are
//! session-scoped mutable state and always hit the backend.

use crate::woo::types::{Category, Product};

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(Vec<Product>),
    Category(Box<Category>),
    Categories(Vec<Category>),
}
