//! Catalog domain logic built on top of the WooCommerce types.

pub mod variants;

pub use variants::{AxisState, OptionState, Resolution, Selection, VariantMatrix};
