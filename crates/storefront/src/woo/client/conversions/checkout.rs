//! Checkout conversion functions.

use crate::woo::types::{CheckoutOutcome, OrderSummary};

use super::super::queries::checkout;

/// Convert the checkout mutation payload.
pub fn convert_checkout(payload: checkout::CheckoutCheckout) -> CheckoutOutcome {
    CheckoutOutcome {
        result: payload.result,
        redirect: payload.redirect,
        order: payload.order.map(|o| OrderSummary {
            id: o.id,
            database_id: o.database_id,
            order_key: o.order_key,
            order_number: o.order_number,
            status: o.status,
            total: o.total,
        }),
    }
}
