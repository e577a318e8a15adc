//! Domain types for the WooCommerce storefront API.
//!
//! These are clean Rust representations converted from the generated GraphQL
//! response types. Attribute axis names are normalized at conversion time
//! (lowercased, taxonomy `pa_` prefix stripped) so the variant resolver and
//! templates never have to worry about backend casing quirks.

use serde::{Deserialize, Serialize};

use tidemark_core::StockStatus;

/// A value paired with the `woocommerce-session` token the backend returned
/// alongside it, if any. Callers persist the token so the next cart request
/// reaches the same backend cart.
#[derive(Debug, Clone)]
pub struct Sessioned<T> {
    pub value: T,
    /// Replacement session token, when the backend rotated or issued one.
    pub session_token: Option<String>,
}

/// A product image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductImage {
    /// Source URL as stored by the backend.
    pub url: String,
    /// Alt text for accessibility.
    pub alt: Option<String>,
}

/// One attribute axis of a variable product (e.g. "color" with
/// options "Red" and "Blue"). The name is normalized; option values keep
/// their display casing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeAxis {
    pub name: String,
    pub options: Vec<String>,
}

/// A single attribute binding on a variation or a default selection.
///
/// An empty `value` means "any": the variation matches every option on that
/// axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationAttribute {
    /// Normalized axis name.
    pub axis: String,
    /// Display value, empty for wildcard bindings.
    pub value: String,
}

/// A purchasable variation of a variable product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variation {
    pub id: String,
    pub database_id: i64,
    pub name: String,
    pub on_sale: bool,
    pub price: Option<String>,
    pub regular_price: Option<String>,
    pub sale_price: Option<String>,
    pub stock_quantity: Option<i64>,
    pub stock_status: StockStatus,
    pub image: Option<ProductImage>,
    pub attributes: Vec<VariationAttribute>,
}

/// A product, simple or variable. A simple product has no variations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub database_id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub on_sale: bool,
    pub price: Option<String>,
    pub regular_price: Option<String>,
    pub sale_price: Option<String>,
    pub stock_quantity: Option<i64>,
    pub stock_status: StockStatus,
    pub image: Option<ProductImage>,
    /// Declared attribute axes with their full option lists.
    pub axes: Vec<AttributeAxis>,
    /// Backend-declared default selection, one entry per axis at most.
    pub default_attributes: Vec<VariationAttribute>,
    pub variations: Vec<Variation>,
}

impl Product {
    /// Whether this product is sold in variations.
    #[must_use]
    pub fn is_variable(&self) -> bool {
        !self.variations.is_empty()
    }
}

/// A product category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub database_id: i64,
    pub name: String,
    pub slug: String,
    /// Number of products in the category, when reported.
    pub count: Option<i64>,
    /// Products in the category. Empty for listing queries that do not
    /// request them.
    pub products: Vec<Product>,
}

/// The product half of a cart line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartProduct {
    pub id: String,
    pub database_id: i64,
    pub name: String,
    pub slug: String,
    pub on_sale: bool,
    pub price: Option<String>,
    pub image: Option<ProductImage>,
}

/// The variation half of a cart line, present for variable products.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartVariation {
    pub id: String,
    pub database_id: i64,
    pub name: String,
    pub price: Option<String>,
    pub stock_quantity: Option<i64>,
    pub stock_status: StockStatus,
    pub image: Option<ProductImage>,
    pub attributes: Vec<VariationAttribute>,
}

/// One line in the backend cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    /// Backend-assigned line key, stable across quantity updates.
    pub key: String,
    pub quantity: i64,
    pub subtotal: Option<String>,
    pub total: Option<String>,
    pub product: CartProduct,
    pub variation: Option<CartVariation>,
}

impl CartItem {
    /// Image to show for the line: variation image when set, product image
    /// otherwise.
    #[must_use]
    pub fn display_image(&self) -> Option<&ProductImage> {
        self.variation
            .as_ref()
            .and_then(|v| v.image.as_ref())
            .or(self.product.image.as_ref())
    }
}

/// Authoritative cart state as reported by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub is_empty: bool,
    /// Total number of units across all lines.
    pub item_count: i64,
    pub subtotal: Option<String>,
    /// Formatted display total, e.g. `"$125.50"`.
    pub total: Option<String>,
    pub items: Vec<CartItem>,
}

/// Summary of a placed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: String,
    pub database_id: Option<i64>,
    pub order_key: Option<String>,
    pub order_number: Option<String>,
    pub status: Option<String>,
    pub total: Option<String>,
}

/// Result of the checkout mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutOutcome {
    pub result: Option<String>,
    pub redirect: Option<String>,
    pub order: Option<OrderSummary>,
}

/// One attribute selection sent with an add-to-cart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedAttribute {
    pub name: String,
    pub value: String,
}

/// Input for adding an item to the cart.
#[derive(Debug, Clone)]
pub struct AddToCartRequest {
    pub product_id: i64,
    pub quantity: i64,
    /// Required for variable products.
    pub variation_id: Option<i64>,
    /// Attribute selections matching the chosen variation.
    pub attributes: Vec<SelectedAttribute>,
}

/// One quantity change keyed by cart line. A quantity of zero removes the
/// line.
#[derive(Debug, Clone)]
pub struct QuantityUpdate {
    pub key: String,
    pub quantity: i64,
}

/// Billing address fields submitted with checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingFields {
    pub first_name: String,
    pub last_name: String,
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    pub postcode: String,
    pub country: String,
    pub email: String,
    pub phone: String,
}

/// Input for placing an order through the checkout mutation.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    /// Backend payment gateway code, e.g. `"cod"` or `"stripe"`.
    pub payment_method: String,
    /// Whether payment was already captured out of band.
    pub is_paid: bool,
    /// Processor reference for captured payments.
    pub transaction_id: Option<String>,
    pub billing: BillingFields,
}
