//! Type conversion functions for WooCommerce GraphQL responses.

pub mod cart;
pub mod checkout;
pub mod products;

pub use cart::{convert_cart, empty_cart};
pub use checkout::convert_checkout;
pub use products::{
    convert_category, convert_category_list, convert_product, convert_product_list,
};

use tidemark_core::StockStatus;

use crate::woo::types::ProductImage;

/// Normalize an attribute axis name: lowercase, with the WooCommerce
/// taxonomy prefix (`pa_`) stripped.
pub(crate) fn normalize_axis_name(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    match lower.strip_prefix("pa_") {
        Some(rest) => rest.to_string(),
        None => lower,
    }
}

/// Convert a generated `StockStatusEnum` to the shared [`StockStatus`].
///
/// Each query module generates its own copy of the enum, so this goes
/// through the `Debug` representation, which is the schema-level name.
pub(crate) fn stock_status<T: std::fmt::Debug>(status: Option<T>) -> StockStatus {
    status.map_or(StockStatus::OutOfStock, |s| {
        match format!("{s:?}").as_str() {
            "IN_STOCK" => StockStatus::InStock,
            "ON_BACKORDER" => StockStatus::OnBackorder,
            _ => StockStatus::OutOfStock,
        }
    })
}

/// Build a [`ProductImage`] from the url/alt pair of a generated image node.
pub(crate) fn image_from(url: Option<String>, alt: Option<String>) -> Option<ProductImage> {
    url.filter(|u| !u.is_empty()).map(|url| ProductImage { url, alt })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_axis_name() {
        assert_eq!(normalize_axis_name("pa_color"), "color");
        assert_eq!(normalize_axis_name("Size"), "size");
        assert_eq!(normalize_axis_name("PA_Finish"), "finish");
    }

    #[test]
    fn test_stock_status_from_debug_name() {
        #[derive(Debug)]
        #[allow(non_camel_case_types, dead_code)]
        enum Fake {
            IN_STOCK,
            ON_BACKORDER,
            Other(String),
        }

        assert_eq!(stock_status(Some(Fake::IN_STOCK)), StockStatus::InStock);
        assert_eq!(
            stock_status(Some(Fake::ON_BACKORDER)),
            StockStatus::OnBackorder
        );
        assert_eq!(
            stock_status(Some(Fake::Other("MYSTERY".to_string()))),
            StockStatus::OutOfStock
        );
        assert_eq!(stock_status::<Fake>(None), StockStatus::OutOfStock);
    }

    #[test]
    fn test_image_from_skips_empty_url() {
        assert!(image_from(Some(String::new()), None).is_none());
        assert!(image_from(None, Some("alt".to_string())).is_none());
        let image = image_from(Some("https://cdn.test/a.jpg".to_string()), None);
        assert_eq!(image.map(|i| i.url).as_deref(), Some("https://cdn.test/a.jpg"));
    }
}
