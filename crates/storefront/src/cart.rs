//! Session-local cart mirror.
//!
//! The backend cart is the source of truth for lines and totals. This module
//! keeps a small mirror in the shopper's session so the cart badge and line
//! counts render without a backend round trip, and reconciles it against
//! every authoritative snapshot that comes back.

use serde::{Deserialize, Serialize};

use crate::woo::types::CartSnapshot;

/// Compose a stable line key from the purchasable identity of an item.
///
/// Two adds of the same product, variation, and attribute set must land on
/// the same line, so attributes are normalized and sorted before joining.
#[must_use]
pub fn line_key(
    product_id: i64,
    variation_id: Option<i64>,
    attributes: &[(String, String)],
) -> String {
    let mut attrs: Vec<String> = attributes
        .iter()
        .map(|(name, value)| {
            format!(
                "{}={}",
                name.trim().to_ascii_lowercase(),
                value.trim().to_ascii_lowercase()
            )
        })
        .collect();
    attrs.sort_unstable();

    let variation = variation_id.unwrap_or(0);
    if attrs.is_empty() {
        format!("p{product_id}:v{variation}")
    } else {
        format!("p{product_id}:v{variation}:{}", attrs.join(";"))
    }
}

/// One mirrored cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub key: String,
    pub quantity: i64,
}

/// Mirrored cart state, stored in the session between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartState {
    lines: Vec<CartLine>,
    /// Display total as last reported by the backend. Never computed
    /// locally.
    total: Option<String>,
}

impl CartState {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Backend-reported display total, if known.
    #[must_use]
    pub fn total(&self) -> Option<&str> {
        self.total.as_deref()
    }

    /// Add quantity to a line, merging with an existing line of the same
    /// key. New lines append at the end; other lines are untouched.
    pub fn add(&mut self, key: &str, quantity: i64) {
        if quantity <= 0 {
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| l.key == key) {
            line.quantity += quantity;
        } else {
            self.lines.push(CartLine {
                key: key.to_string(),
                quantity,
            });
        }
    }

    /// Set a line's quantity. Zero (or below) removes the line. Lines with
    /// other keys keep their position and quantity.
    pub fn set_quantity(&mut self, key: &str, quantity: i64) {
        if quantity <= 0 {
            self.lines.retain(|l| l.key != key);
        } else if let Some(line) = self.lines.iter_mut().find(|l| l.key == key) {
            line.quantity = quantity;
        }
    }

    /// Replace the mirror wholesale with the authoritative backend snapshot.
    pub fn reconcile(&mut self, snapshot: &CartSnapshot) {
        self.lines = snapshot
            .items
            .iter()
            .map(|item| CartLine {
                key: item.key.clone(),
                quantity: item.quantity,
            })
            .collect();
        self.total = snapshot.total.clone();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::woo::types::{CartItem, CartProduct};

    fn snapshot(items: &[(&str, i64)], total: &str) -> CartSnapshot {
        CartSnapshot {
            is_empty: items.is_empty(),
            item_count: items.iter().map(|(_, q)| q).sum(),
            subtotal: None,
            total: Some(total.to_string()),
            items: items
                .iter()
                .map(|(key, quantity)| CartItem {
                    key: (*key).to_string(),
                    quantity: *quantity,
                    subtotal: None,
                    total: None,
                    product: CartProduct {
                        id: "gid://product/1".to_string(),
                        database_id: 1,
                        name: "Product".to_string(),
                        slug: "product".to_string(),
                        on_sale: false,
                        price: None,
                        image: None,
                    },
                    variation: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_line_key_sorts_attributes() {
        let a = line_key(
            7,
            Some(12),
            &[
                ("size".to_string(), "M".to_string()),
                ("color".to_string(), "Red".to_string()),
            ],
        );
        let b = line_key(
            7,
            Some(12),
            &[
                ("Color".to_string(), "red".to_string()),
                ("Size".to_string(), "m".to_string()),
            ],
        );
        assert_eq!(a, b);
        assert_eq!(a, "p7:v12:color=red;size=m");
    }

    #[test]
    fn test_line_key_without_attributes() {
        assert_eq!(line_key(7, None, &[]), "p7:v0");
        assert_ne!(line_key(7, None, &[]), line_key(7, Some(12), &[]));
    }

    #[test]
    fn test_add_merges_same_key() {
        let mut state = CartState::default();
        state.add("a", 1);
        state.add("b", 2);
        state.add("a", 3);
        assert_eq!(state.lines().len(), 2);
        assert_eq!(state.lines()[0], CartLine { key: "a".to_string(), quantity: 4 });
        assert_eq!(state.item_count(), 6);
    }

    #[test]
    fn test_add_ignores_non_positive() {
        let mut state = CartState::default();
        state.add("a", 0);
        state.add("a", -2);
        assert!(state.is_empty());
    }

    #[test]
    fn test_set_quantity_touches_only_target_line() {
        let mut state = CartState::default();
        state.add("a", 1);
        state.add("b", 2);
        state.add("c", 3);

        state.set_quantity("b", 5);
        assert_eq!(
            state.lines(),
            &[
                CartLine { key: "a".to_string(), quantity: 1 },
                CartLine { key: "b".to_string(), quantity: 5 },
                CartLine { key: "c".to_string(), quantity: 3 },
            ]
        );
    }

    #[test]
    fn test_set_quantity_zero_removes_line() {
        let mut state = CartState::default();
        state.add("a", 1);
        state.add("b", 2);
        state.set_quantity("a", 0);
        assert_eq!(state.lines().len(), 1);
        assert_eq!(state.lines()[0].key, "b");
    }

    #[test]
    fn test_reconcile_replaces_with_server_truth() {
        let mut state = CartState::default();
        state.add("stale", 9);

        state.reconcile(&snapshot(&[("a", 2), ("b", 1)], "$30.00"));
        assert_eq!(state.item_count(), 3);
        assert_eq!(state.lines().len(), 2);
        assert_eq!(state.total(), Some("$30.00"));

        // An empty server cart clears the mirror.
        state.reconcile(&snapshot(&[], "$0.00"));
        assert!(state.is_empty());
    }
}
