//! JSON API endpoints.

pub mod graphql;
pub mod revalidate;
