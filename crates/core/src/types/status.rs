//! Stock status for products and variations.

use serde::{Deserialize, Serialize};

/// Stock status reported by the commerce backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockStatus {
    InStock,
    #[default]
    OutOfStock,
    OnBackorder,
}

impl StockStatus {
    /// Whether this status allows the item to be purchased.
    #[must_use]
    pub const fn is_purchasable(self) -> bool {
        matches!(self, Self::InStock | Self::OnBackorder)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_purchasable() {
        assert!(StockStatus::InStock.is_purchasable());
        assert!(StockStatus::OnBackorder.is_purchasable());
        assert!(!StockStatus::OutOfStock.is_purchasable());
    }

    #[test]
    fn test_serde_screaming_snake_case() {
        let json = serde_json::to_string(&StockStatus::InStock).unwrap();
        assert_eq!(json, "\"IN_STOCK\"");
        let status: StockStatus = serde_json::from_str("\"OUT_OF_STOCK\"").unwrap();
        assert_eq!(status, StockStatus::OutOfStock);
    }
}
