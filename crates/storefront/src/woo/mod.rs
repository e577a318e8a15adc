//! WooCommerce GraphQL (WPGraphQL + WooGraphQL) client.
//!
//! # Architecture
//!
//! - Uses `graphql-client` for type-safe GraphQL queries
//! - WooCommerce is source of truth - NO local sync, direct API calls
//! - In-memory caching via `moka` for catalog responses (5 minute TTL)
//! - Cart and checkout operations are tied to a guest session: the backend
//!   issues a `woocommerce-session` token that must be echoed back on every
//!   subsequent cart request
//!
//! # Example
//!
//! ```rust,ignore
//! use tidemark_storefront::woo::WooClient;
//!
//! let client = WooClient::new(&config.woo);
//!
//! let product = client.get_product_by_slug("my-product").await?;
//!
//! let cart = client
//!     .add_to_cart(None, AddToCartRequest {
//!         product_id: product.database_id,
//!         quantity: 1,
//!         variation_id: None,
//!         attributes: vec![],
//!     })
//!     .await?;
//! ```

mod client;
pub mod types;

pub use client::{RawGraphQLResponse, SESSION_HEADER, WooClient};
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to the WooCommerce GraphQL endpoint.
#[derive(Debug, Error)]
pub enum WooError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Mutation rejected the input (e.g. out-of-stock item).
    #[error("User error: {0}")]
    UserError(String),
}

/// A GraphQL error returned by the WooCommerce endpoint.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

impl GraphQLError {
    /// An error carrying only a message.
    #[must_use]
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: vec![],
            path: vec![],
        }
    }
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let mut parts = Vec::new();

            if !e.message.is_empty() {
                parts.push(e.message.clone());
            }

            if !e.path.is_empty() {
                let path_str = e
                    .path
                    .iter()
                    .map(|p| match p {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(".");
                parts.push(format!("path: {path_str}"));
            }

            if !e.locations.is_empty() {
                let loc = &e.locations[0];
                parts.push(format!("at line {}:{}", loc.line, loc.column));
            }

            if parts.is_empty() {
                format!("[error {}]: (no details)", i + 1)
            } else {
                parts.join(" ")
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_woo_error_display() {
        let err = WooError::NotFound("product: coastal-mug".to_string());
        assert_eq!(err.to_string(), "Not found: product: coastal-mug");
    }

    #[test]
    fn test_graphql_error_formatting() {
        let errors = vec![
            GraphQLError::message_only("Field not found"),
            GraphQLError::message_only("Invalid ID"),
        ];
        let err = WooError::GraphQL(errors);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: Field not found; Invalid ID"
        );
    }

    #[test]
    fn test_graphql_error_path_and_location() {
        let errors = vec![GraphQLError {
            message: String::new(),
            locations: vec![GraphQLErrorLocation { line: 5, column: 10 }],
            path: vec![
                serde_json::Value::String("products".to_string()),
                serde_json::Value::Number(0.into()),
            ],
        }];
        let err = WooError::GraphQL(errors);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: path: products.0 at line 5:10"
        );
    }

    #[test]
    fn test_graphql_error_no_details() {
        let err = WooError::GraphQL(vec![GraphQLError::message_only("")]);
        assert_eq!(err.to_string(), "GraphQL errors: [error 1]: (no details)");
    }

    #[test]
    fn test_graphql_error_empty_vec() {
        let err = WooError::GraphQL(vec![]);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: (no error details provided)"
        );
    }
}
