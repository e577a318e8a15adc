//! GraphQL query definitions for the WooCommerce endpoint.
//!
//! The schema subset lives at `graphql/schema.graphql`; the query documents
//! under `graphql/queries/` are validated against it at compile time.

use graphql_client::GraphQLQuery;

// Product queries
#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/schema.graphql",
    query_path = "graphql/queries/products.graphql",
    response_derives = "Debug, Clone"
)]
pub struct GetProducts;

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/schema.graphql",
    query_path = "graphql/queries/products.graphql",
    response_derives = "Debug, Clone"
)]
pub struct GetProductBySlug;

// Category queries
#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/schema.graphql",
    query_path = "graphql/queries/categories.graphql",
    response_derives = "Debug, Clone"
)]
pub struct GetCategories;

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/schema.graphql",
    query_path = "graphql/queries/categories.graphql",
    response_derives = "Debug, Clone"
)]
pub struct GetCategoryBySlug;

// Cart queries and mutations
#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/schema.graphql",
    query_path = "graphql/queries/cart.graphql",
    response_derives = "Debug, Clone"
)]
pub struct GetCart;

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/schema.graphql",
    query_path = "graphql/queries/cart.graphql",
    response_derives = "Debug, Clone"
)]
pub struct AddToCart;

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/schema.graphql",
    query_path = "graphql/queries/cart.graphql",
    response_derives = "Debug, Clone"
)]
pub struct UpdateItemQuantities;

// Checkout mutation
#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/schema.graphql",
    query_path = "graphql/queries/checkout.graphql",
    response_derives = "Debug, Clone"
)]
pub struct Checkout;
