//! Cart conversion functions.

use crate::woo::types::{
    CartItem, CartProduct, CartSnapshot, CartVariation, VariationAttribute,
};

use super::super::queries::get_cart;
use super::{image_from, normalize_axis_name, stock_status};

/// The snapshot used when the backend reports no cart for the session.
#[must_use]
pub fn empty_cart() -> CartSnapshot {
    CartSnapshot {
        is_empty: true,
        ..CartSnapshot::default()
    }
}

/// Convert the authoritative backend cart into a [`CartSnapshot`].
pub fn convert_cart(cart: get_cart::GetCartCart) -> CartSnapshot {
    let (reported_count, items) = cart.contents.map_or((None, vec![]), |contents| {
        let items = contents
            .nodes
            .into_iter()
            .filter_map(convert_cart_item)
            .collect();
        (contents.item_count, items)
    });

    let items: Vec<CartItem> = items;
    let item_count =
        reported_count.unwrap_or_else(|| items.iter().map(|i| i.quantity).sum());

    CartSnapshot {
        is_empty: cart.is_empty.unwrap_or_else(|| items.is_empty()),
        item_count,
        subtotal: cart.subtotal,
        total: cart.total,
        items,
    }
}

/// Lines whose product node is missing are dropped rather than rendered
/// half-empty.
fn convert_cart_item(node: get_cart::GetCartCartContentsNodes) -> Option<CartItem> {
    let product = node.product?.node;

    let variation = node.variation.map(|edge| {
        let attributes = edge.attributes.map_or_else(Vec::new, |attrs| {
            attrs
                .into_iter()
                .filter_map(|a| {
                    let name = a.name?;
                    Some(VariationAttribute {
                        axis: normalize_axis_name(&name),
                        value: a.value.unwrap_or_default(),
                    })
                })
                .collect()
        });

        let v = edge.node;
        CartVariation {
            id: v.id,
            database_id: v.database_id,
            name: v.name,
            price: v.price,
            stock_quantity: v.stock_quantity,
            stock_status: stock_status(v.stock_status),
            image: v.image.and_then(|i| image_from(i.source_url, i.alt_text)),
            attributes,
        }
    });

    Some(CartItem {
        key: node.key,
        quantity: node.quantity.unwrap_or(1),
        subtotal: node.subtotal,
        total: node.total,
        product: CartProduct {
            id: product.id,
            database_id: product.database_id,
            name: product.name,
            slug: product.slug,
            on_sale: product.on_sale,
            price: product.price,
            image: product
                .image
                .and_then(|i| image_from(i.source_url, i.alt_text)),
        },
        variation,
    })
}
