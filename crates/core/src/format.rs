//! Display-price and text formatting helpers.
//!
//! These mirror the formatting conventions the storefront templates rely on:
//! a space between the currency symbol and the amount, truncated card
//! descriptions, and splitting of variable-product price ranges.

/// Insert a space after every occurrence of the currency symbol.
///
/// Idempotent: already-padded input comes back unchanged, and price-range
/// strings with multiple symbol occurrences are padded at each one.
#[must_use]
pub fn padded_price(price: &str, symbol: &str) -> String {
    if symbol.is_empty() {
        return price.to_string();
    }
    let padded = format!("{symbol} ");
    // Collapse any existing padding first so re-padding cannot double it.
    price.replace(&padded, symbol).replace(symbol, &padded)
}

/// Truncate `text` to at most `length` characters, appending `...` when cut.
#[must_use]
pub fn trimmed_string_to_length(text: &str, length: usize) -> String {
    if text.chars().count() > length {
        let cut: String = text.chars().take(length).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

/// Which side of a price range to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceRangeSide {
    /// The minimum price (left of the dash).
    Left,
    /// The maximum price (right of the dash).
    Right,
}

/// Extract one side of a variable-product price range.
///
/// `"$100 - $200"` yields `"$100"` for [`PriceRangeSide::Left`] and `"$200"`
/// for [`PriceRangeSide::Right`]. Input without a dash is returned as-is.
#[must_use]
pub fn filtered_variant_price(price: &str, side: PriceRangeSide) -> String {
    let Some((left, right)) = price.split_once('-') else {
        return price.trim().to_string();
    };
    match side {
        PriceRangeSide::Left => left.trim().to_string(),
        PriceRangeSide::Right => right.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_price_adds_space() {
        assert_eq!(padded_price("$100", "$"), "$ 100");
    }

    #[test]
    fn test_padded_price_multiple_occurrences() {
        assert_eq!(padded_price("$100 - $200", "$"), "$ 100 - $ 200");
    }

    #[test]
    fn test_padded_price_idempotent() {
        assert_eq!(padded_price("$ 100 - $ 200", "$"), "$ 100 - $ 200");
        let once = padded_price("kr500", "kr");
        assert_eq!(padded_price(&once, "kr"), once);
    }

    #[test]
    fn test_padded_price_multichar_symbol() {
        assert_eq!(padded_price("kr500", "kr"), "kr 500");
    }

    #[test]
    fn test_trimmed_string_longer_than_length() {
        assert_eq!(trimmed_string_to_length("Hello World", 5), "Hello...");
    }

    #[test]
    fn test_trimmed_string_shorter_than_length() {
        assert_eq!(trimmed_string_to_length("Hi", 10), "Hi");
    }

    #[test]
    fn test_trimmed_string_exact_length() {
        assert_eq!(trimmed_string_to_length("Hello", 5), "Hello");
    }

    #[test]
    fn test_filtered_variant_price_left() {
        assert_eq!(
            filtered_variant_price("$100 - $200", PriceRangeSide::Left),
            "$100"
        );
    }

    #[test]
    fn test_filtered_variant_price_right() {
        assert_eq!(
            filtered_variant_price("$100 - $200", PriceRangeSide::Right),
            "$200"
        );
    }

    #[test]
    fn test_filtered_variant_price_no_range() {
        assert_eq!(
            filtered_variant_price("$100", PriceRangeSide::Right),
            "$100"
        );
    }
}
