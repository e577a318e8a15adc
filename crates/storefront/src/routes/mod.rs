//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check
//!
//! # Catalog
//! GET  /products               - Product listing
//! GET  /product/:slug          - Product detail (selection in query string)
//! GET  /categories             - Category listing
//! GET  /category/:slug         - Category detail
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (returns count badge, triggers cart-updated)
//! POST /cart/update            - Update quantity (returns cart_items fragment)
//! POST /cart/remove            - Remove item (returns cart_items fragment)
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout
//! GET  /checkout               - Current checkout stage
//! POST /checkout/billing       - Submit billing details
//! POST /checkout/billing/edit  - Return from payment to edit billing
//! POST /checkout/payment       - Choose payment method (COD places order, card shows element)
//! GET  /checkout/card/return   - Landing after hosted card confirmation
//! GET  /order-confirmation     - Order confirmation page
//!
//! # API
//! POST /api/graphql            - GraphQL proxy to the commerce backend
//! POST /api/revalidate         - Catalog cache revalidation webhook
//! ```

pub mod api;
pub mod cart;
pub mod categories;
pub mod checkout;
pub mod home;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show))
        .route("/billing", post(checkout::submit_billing))
        .route("/billing/edit", post(checkout::edit_billing))
        .route("/payment", post(checkout::submit_payment))
        .route("/card/return", get(checkout::card_return))
}

/// Create the API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/graphql", post(api::graphql::proxy))
        .route("/revalidate", post(api::revalidate::revalidate))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Catalog routes
        .route("/products", get(products::index))
        .route("/product/{slug}", get(products::show))
        .route("/categories", get(categories::index))
        .route("/category/{slug}", get(categories::show))
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout routes
        .nest("/checkout", checkout_routes())
        .route("/order-confirmation", get(checkout::confirmation))
        // API routes
        .nest("/api", api_routes())
}
