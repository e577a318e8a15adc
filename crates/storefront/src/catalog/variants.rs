//! Variant resolution for variable products.
//!
//! A variable product declares attribute axes (color, size, ...) and a list
//! of variations, each binding some axes to values. A binding with an empty
//! value is a wildcard: the variation matches every option on that axis.
//! Matching is case-insensitive; axis names and values are normalized once
//! when the matrix is built.
//!
//! An axis is *active* only if at least one variation carries a binding for
//! it. Declared-but-unused axes are dropped so they can never block a
//! selection from completing.

use std::collections::{BTreeMap, HashSet};

use crate::woo::types::{Product, Variation};

/// The shopper's current attribute selection, normalized axis -> value.
///
/// Backed by an ordered map so generated query strings are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection(BTreeMap<String, String>);

impl Selection {
    /// Build a selection from raw (axis, value) pairs, e.g. query parameters.
    /// Pairs with an empty value are ignored.
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut map = BTreeMap::new();
        for (axis, value) in pairs {
            let axis = normalize(axis.as_ref());
            let value = normalize(value.as_ref());
            if !axis.is_empty() && !value.is_empty() {
                map.insert(axis, value);
            }
        }
        Self(map)
    }

    /// The selected (normalized) value on an axis, if any.
    #[must_use]
    pub fn get(&self, axis: &str) -> Option<&str> {
        self.0.get(axis).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A copy with `value` toggled on `axis`: selecting an already-selected
    /// value unsets that axis, anything else replaces it.
    #[must_use]
    pub fn toggled(&self, axis: &str, value: &str) -> Self {
        let axis = normalize(axis);
        let value = normalize(value);
        let mut map = self.0.clone();
        if map.get(&axis).map(String::as_str) == Some(value.as_str()) {
            map.remove(&axis);
        } else {
            map.insert(axis, value);
        }
        Self(map)
    }

    /// Render as a URL query string (`color=red&size=m`), percent-encoded.
    /// Empty selections render as an empty string.
    #[must_use]
    pub fn query_string(&self) -> String {
        self.0
            .iter()
            .map(|(axis, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(axis),
                    urlencoding::encode(value)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// How one option on one axis relates to the current selection.
#[derive(Debug, Clone)]
pub struct OptionState {
    /// Display value as declared on the product.
    pub value: String,
    /// Normalized value used in selections and URLs.
    pub norm: String,
    pub selected: bool,
    /// Whether some in-stock variation is reachable by picking this value
    /// while keeping the rest of the selection.
    pub available: bool,
    /// Combined stock across reachable in-stock variations, summing missing
    /// quantities as zero. `None` when no reachable variation reports one.
    pub stock: Option<i64>,
}

/// All options of one active axis, contextualized to a selection.
#[derive(Debug, Clone)]
pub struct AxisState {
    /// Normalized axis name.
    pub axis: String,
    pub options: Vec<OptionState>,
}

/// Outcome of resolving a selection against the matrix.
#[derive(Debug, Clone, Copy)]
pub struct Resolution<'a> {
    /// Whether every active axis has a selected value.
    pub complete: bool,
    /// First variation (in source order) matching the complete selection.
    /// Always `None` while the selection is incomplete.
    pub variation: Option<&'a Variation>,
    /// Whether the resolved variation can be purchased.
    pub purchasable: bool,
}

struct MatrixVariation<'a> {
    variation: &'a Variation,
    /// Normalized bindings; `None` value marks a wildcard.
    bindings: Vec<(String, Option<String>)>,
}

struct MatrixAxis {
    name: String,
    /// Display values in declaration order.
    options: Vec<String>,
}

/// Normalized view of a product's axes and variations, built once per
/// request.
pub struct VariantMatrix<'a> {
    axes: Vec<MatrixAxis>,
    variations: Vec<MatrixVariation<'a>>,
}

impl<'a> VariantMatrix<'a> {
    #[must_use]
    pub fn new(product: &'a Product) -> Self {
        let variations: Vec<MatrixVariation<'a>> = product
            .variations
            .iter()
            .map(|v| MatrixVariation {
                variation: v,
                bindings: v
                    .attributes
                    .iter()
                    .map(|a| {
                        let value = normalize(&a.value);
                        (
                            normalize(&a.axis),
                            if value.is_empty() { None } else { Some(value) },
                        )
                    })
                    .collect(),
            })
            .collect();

        // An axis is active only when some variation binds it.
        let used: HashSet<&str> = variations
            .iter()
            .flat_map(|v| v.bindings.iter().map(|(axis, _)| axis.as_str()))
            .collect();

        let axes = product
            .axes
            .iter()
            .filter(|a| used.contains(normalize(&a.name).as_str()))
            .map(|a| MatrixAxis {
                name: normalize(&a.name),
                options: a.options.clone(),
            })
            .collect();

        Self { axes, variations }
    }

    /// Whether the product has no active axes to choose on.
    #[must_use]
    pub fn is_simple(&self) -> bool {
        self.axes.is_empty()
    }

    /// Active axis names in declaration order.
    #[must_use]
    pub fn axis_names(&self) -> Vec<&str> {
        self.axes.iter().map(|a| a.name.as_str()).collect()
    }

    /// Resolve a selection to a concrete variation.
    #[must_use]
    pub fn resolve(&self, selection: &Selection) -> Resolution<'a> {
        let complete = self
            .axes
            .iter()
            .all(|axis| selection.get(&axis.name).is_some());

        let variation = if complete {
            self.first_match(selection).map(|m| m.variation)
        } else {
            None
        };

        Resolution {
            complete,
            variation,
            purchasable: variation.is_some_and(in_stock),
        }
    }

    /// Contextual option states for every active axis.
    ///
    /// Availability and stock for a value are computed with that value
    /// swapped into the selection, keeping the other axes' choices.
    #[must_use]
    pub fn axis_states(&self, selection: &Selection) -> Vec<AxisState> {
        self.axes
            .iter()
            .map(|axis| AxisState {
                axis: axis.name.clone(),
                options: axis
                    .options
                    .iter()
                    .map(|value| self.option_state(axis, value, selection))
                    .collect(),
            })
            .collect()
    }

    fn option_state(
        &self,
        axis: &MatrixAxis,
        value: &str,
        selection: &Selection,
    ) -> OptionState {
        let norm = normalize(value);
        let selected = selection.get(&axis.name) == Some(norm.as_str());

        let survivors: Vec<&MatrixVariation<'a>> = self
            .variations
            .iter()
            .filter(|v| {
                self.matches(v, selection, Some((&axis.name, &norm))) && in_stock(v.variation)
            })
            .collect();

        let stock = if survivors
            .iter()
            .any(|v| v.variation.stock_quantity.is_some())
        {
            Some(
                survivors
                    .iter()
                    .map(|v| v.variation.stock_quantity.unwrap_or(0))
                    .sum(),
            )
        } else {
            None
        };

        OptionState {
            value: value.to_string(),
            norm,
            selected,
            available: !survivors.is_empty(),
            stock,
        }
    }

    /// First variation in source order matching the selection on every
    /// active axis. Ties go to the earlier variation.
    fn first_match(&self, selection: &Selection) -> Option<&MatrixVariation<'a>> {
        self.variations
            .iter()
            .find(|v| self.matches(v, selection, None))
    }

    /// A variation matches when, on every active axis, it either has no
    /// binding, a wildcard binding, or a binding equal to the constrained
    /// value. Axes without a constraint never filter.
    fn matches(
        &self,
        variation: &MatrixVariation<'a>,
        selection: &Selection,
        replace: Option<(&str, &str)>,
    ) -> bool {
        self.axes.iter().all(|axis| {
            let constraint = match replace {
                Some((name, value)) if name == axis.name => Some(value),
                _ => selection.get(&axis.name),
            };
            let Some(wanted) = constraint else {
                return true;
            };
            match variation
                .bindings
                .iter()
                .find(|(name, _)| name == &axis.name)
            {
                None | Some((_, None)) => true,
                Some((_, Some(bound))) => bound == wanted,
            }
        })
    }
}

fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase()
}

/// A variation counts as in stock when its status allows purchase or it
/// reports a positive quantity despite the status.
fn in_stock(variation: &Variation) -> bool {
    variation.stock_status.is_purchasable() || variation.stock_quantity.is_some_and(|q| q > 0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::woo::types::{AttributeAxis, VariationAttribute};
    use tidemark_core::StockStatus;

    fn variation(
        id: i64,
        attrs: &[(&str, &str)],
        status: StockStatus,
        qty: Option<i64>,
    ) -> Variation {
        Variation {
            id: format!("gid://variation/{id}"),
            database_id: id,
            name: format!("variation-{id}"),
            on_sale: false,
            price: Some("$10.00".to_string()),
            regular_price: Some("$10.00".to_string()),
            sale_price: None,
            stock_quantity: qty,
            stock_status: status,
            image: None,
            attributes: attrs
                .iter()
                .map(|(axis, value)| VariationAttribute {
                    axis: (*axis).to_string(),
                    value: (*value).to_string(),
                })
                .collect(),
        }
    }

    fn product(axes: &[(&str, &[&str])], variations: Vec<Variation>) -> Product {
        Product {
            id: "gid://product/1".to_string(),
            database_id: 1,
            name: "Test Product".to_string(),
            slug: "test-product".to_string(),
            description: None,
            on_sale: false,
            price: Some("$10.00 - $20.00".to_string()),
            regular_price: None,
            sale_price: None,
            stock_quantity: None,
            stock_status: StockStatus::InStock,
            image: None,
            axes: axes
                .iter()
                .map(|(name, options)| AttributeAxis {
                    name: (*name).to_string(),
                    options: options.iter().map(|o| (*o).to_string()).collect(),
                })
                .collect(),
            default_attributes: vec![],
            variations,
        }
    }

    /// color in {Red, Blue}, size in {S, M}. Red comes in explicit sizes,
    /// Blue uses a wildcard size binding.
    fn sample_product() -> Product {
        product(
            &[("color", &["Red", "Blue"]), ("size", &["S", "M"])],
            vec![
                variation(
                    1,
                    &[("color", "Red"), ("size", "S")],
                    StockStatus::InStock,
                    Some(3),
                ),
                variation(
                    2,
                    &[("color", "Red"), ("size", "M")],
                    StockStatus::InStock,
                    Some(1),
                ),
                variation(3, &[("color", "Blue"), ("size", "")], StockStatus::InStock, Some(5)),
            ],
        )
    }

    #[test]
    fn test_unused_axis_is_inactive() {
        let mut p = sample_product();
        p.axes.push(AttributeAxis {
            name: "material".to_string(),
            options: vec!["Wool".to_string()],
        });
        let matrix = VariantMatrix::new(&p);
        assert_eq!(matrix.axis_names(), vec!["color", "size"]);

        // The unused axis never blocks completion.
        let selection = Selection::from_pairs([("color", "red"), ("size", "s")]);
        assert!(matrix.resolve(&selection).complete);
    }

    #[test]
    fn test_incomplete_selection_resolves_nothing() {
        let p = sample_product();
        let matrix = VariantMatrix::new(&p);
        let selection = Selection::from_pairs([("color", "red")]);
        let resolution = matrix.resolve(&selection);
        assert!(!resolution.complete);
        assert!(resolution.variation.is_none());
        assert!(!resolution.purchasable);
    }

    #[test]
    fn test_complete_selection_resolves_exact_match() {
        let p = sample_product();
        let matrix = VariantMatrix::new(&p);
        let selection = Selection::from_pairs([("color", "red"), ("size", "m")]);
        let resolution = matrix.resolve(&selection);
        assert!(resolution.complete);
        assert_eq!(resolution.variation.unwrap().database_id, 2);
        assert!(resolution.purchasable);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let p = sample_product();
        let matrix = VariantMatrix::new(&p);
        let selection = Selection::from_pairs([("Color", "RED"), ("SIZE", "s")]);
        let resolution = matrix.resolve(&selection);
        assert_eq!(resolution.variation.unwrap().database_id, 1);
    }

    #[test]
    fn test_wildcard_binding_matches_any_value() {
        let p = sample_product();
        let matrix = VariantMatrix::new(&p);
        for size in ["s", "m"] {
            let selection = Selection::from_pairs([("color", "blue"), ("size", size)]);
            let resolution = matrix.resolve(&selection);
            assert_eq!(resolution.variation.unwrap().database_id, 3, "size {size}");
        }
    }

    #[test]
    fn test_first_source_order_match_wins() {
        let mut p = sample_product();
        // Overlaps with variation 1 on red/S.
        p.variations.push(variation(
            4,
            &[("color", "Red"), ("size", "")],
            StockStatus::InStock,
            Some(9),
        ));
        let matrix = VariantMatrix::new(&p);
        let selection = Selection::from_pairs([("color", "red"), ("size", "s")]);
        assert_eq!(matrix.resolve(&selection).variation.unwrap().database_id, 1);
    }

    #[test]
    fn test_out_of_stock_match_is_not_purchasable() {
        let p = product(
            &[("color", &["Red"])],
            vec![variation(1, &[("color", "Red")], StockStatus::OutOfStock, Some(0))],
        );
        let matrix = VariantMatrix::new(&p);
        let selection = Selection::from_pairs([("color", "red")]);
        let resolution = matrix.resolve(&selection);
        assert!(resolution.complete);
        assert!(resolution.variation.is_some());
        assert!(!resolution.purchasable);
    }

    #[test]
    fn test_option_stock_is_contextual() {
        let p = sample_product();
        let matrix = VariantMatrix::new(&p);

        // With red selected, size stock comes from the red variations.
        let selection = Selection::from_pairs([("color", "red")]);
        let states = matrix.axis_states(&selection);
        let size = states.iter().find(|s| s.axis == "size").unwrap();
        let s = size.options.iter().find(|o| o.norm == "s").unwrap();
        let m = size.options.iter().find(|o| o.norm == "m").unwrap();
        assert_eq!(s.stock, Some(3));
        assert_eq!(m.stock, Some(1));

        // With blue selected, the wildcard variation covers both sizes.
        let selection = Selection::from_pairs([("color", "blue")]);
        let states = matrix.axis_states(&selection);
        let size = states.iter().find(|s| s.axis == "size").unwrap();
        for option in &size.options {
            assert_eq!(option.stock, Some(5));
            assert!(option.available);
        }
    }

    #[test]
    fn test_option_unavailable_when_no_purchasable_match() {
        let p = product(
            &[("color", &["Red", "Blue"])],
            vec![
                variation(1, &[("color", "Red")], StockStatus::InStock, Some(2)),
                variation(2, &[("color", "Blue")], StockStatus::OutOfStock, Some(0)),
            ],
        );
        let matrix = VariantMatrix::new(&p);
        let states = matrix.axis_states(&Selection::default());
        let color = &states[0];
        let red = color.options.iter().find(|o| o.norm == "red").unwrap();
        let blue = color.options.iter().find(|o| o.norm == "blue").unwrap();
        assert!(red.available);
        assert!(!blue.available);
        assert_eq!(blue.stock, None);
    }

    #[test]
    fn test_positive_quantity_overrides_stock_status() {
        let p = product(
            &[("color", &["Red"])],
            vec![variation(1, &[("color", "Red")], StockStatus::OutOfStock, Some(5))],
        );
        let matrix = VariantMatrix::new(&p);

        let states = matrix.axis_states(&Selection::default());
        assert!(states[0].options[0].available);
        assert_eq!(states[0].options[0].stock, Some(5));

        let resolution = matrix.resolve(&Selection::from_pairs([("color", "red")]));
        assert!(resolution.purchasable);
    }

    #[test]
    fn test_stock_sums_missing_quantities_as_zero() {
        let p = product(
            &[("color", &["Red"])],
            vec![
                variation(1, &[("color", "Red")], StockStatus::InStock, Some(2)),
                variation(2, &[("color", "Red")], StockStatus::InStock, None),
            ],
        );
        let matrix = VariantMatrix::new(&p);
        let states = matrix.axis_states(&Selection::default());
        assert!(states[0].options[0].available);
        assert_eq!(states[0].options[0].stock, Some(2));
    }

    #[test]
    fn test_unknown_stock_propagates_as_none() {
        let p = product(
            &[("color", &["Red"])],
            vec![variation(1, &[("color", "Red")], StockStatus::InStock, None)],
        );
        let matrix = VariantMatrix::new(&p);
        let states = matrix.axis_states(&Selection::default());
        assert!(states[0].options[0].available);
        assert_eq!(states[0].options[0].stock, None);
    }

    #[test]
    fn test_selected_flag() {
        let p = sample_product();
        let matrix = VariantMatrix::new(&p);
        let selection = Selection::from_pairs([("color", "red")]);
        let states = matrix.axis_states(&selection);
        let color = states.iter().find(|s| s.axis == "color").unwrap();
        assert!(color.options.iter().find(|o| o.norm == "red").unwrap().selected);
        assert!(!color.options.iter().find(|o| o.norm == "blue").unwrap().selected);
    }

    #[test]
    fn test_simple_product_has_no_axes() {
        let p = product(&[], vec![]);
        let matrix = VariantMatrix::new(&p);
        assert!(matrix.is_simple());
        let resolution = matrix.resolve(&Selection::default());
        assert!(resolution.complete);
        assert!(resolution.variation.is_none());
    }

    #[test]
    fn test_toggle_selects_replaces_and_unsets() {
        let selection = Selection::default();
        let selection = selection.toggled("color", "Red");
        assert_eq!(selection.get("color"), Some("red"));

        let selection = selection.toggled("color", "Blue");
        assert_eq!(selection.get("color"), Some("blue"));

        let selection = selection.toggled("color", "blue");
        assert_eq!(selection.get("color"), None);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_query_string_is_sorted_and_encoded() {
        let selection = Selection::from_pairs([("size", "m"), ("color", "sea blue")]);
        assert_eq!(selection.query_string(), "color=sea%20blue&size=m");
        assert_eq!(Selection::default().query_string(), "");
    }

    #[test]
    fn test_from_pairs_skips_empty_values() {
        let selection = Selection::from_pairs([("color", "red"), ("size", "")]);
        assert_eq!(selection.get("color"), Some("red"));
        assert_eq!(selection.get("size"), None);
    }
}
