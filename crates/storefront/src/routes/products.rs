//! Product route handlers.
//!
//! The product detail page drives variant selection through plain links:
//! every attribute option is an anchor whose query string is the current
//! selection with that value toggled. Add-to-cart stays disabled until the
//! selection resolves to a purchasable variation.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use tracing::instrument;

use tidemark_core::format::{padded_price, trimmed_string_to_length};

use crate::catalog::{Selection, VariantMatrix};
use crate::error::Result;
use crate::filters;
use crate::images::ImagePreset;
use crate::state::AppState;
use crate::woo::types::Product;

/// Characters kept of a product description on listing cards.
const CARD_DESCRIPTION_LENGTH: usize = 120;

/// Number of products fetched for the listing page.
const LISTING_PAGE_SIZE: i64 = 24;

/// Image display data for templates.
#[derive(Clone)]
pub struct ImageView {
    pub url: String,
    pub srcset: String,
    pub alt: String,
}

/// Product display data for listing cards.
#[derive(Clone)]
pub struct ProductCardView {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub regular_price: Option<String>,
    pub on_sale: bool,
    pub in_stock: bool,
    pub image: ImageView,
}

/// One attribute option on the detail page.
#[derive(Clone)]
pub struct OptionView {
    pub label: String,
    /// Link that toggles this option in the current selection.
    pub href: String,
    pub selected: bool,
    pub available: bool,
    pub stock: Option<i64>,
}

/// One attribute axis on the detail page.
#[derive(Clone)]
pub struct AxisView {
    pub name: String,
    pub options: Vec<OptionView>,
}

/// Product detail display data.
#[derive(Clone)]
pub struct ProductDetailView {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub regular_price: Option<String>,
    pub on_sale: bool,
    pub image: ImageView,
    pub axes: Vec<AxisView>,
    /// Whether the selection covers every axis.
    pub selection_complete: bool,
    /// Whether the add-to-cart form may be submitted.
    pub can_add: bool,
    pub product_id: i64,
    pub variation_id: Option<i64>,
    /// Hidden form fields carrying the attribute selection.
    pub selection_fields: Vec<(String, String)>,
    /// Stock of the resolved variation, when reported.
    pub stock: Option<i64>,
}

/// Build the image view for a product, falling back to the placeholder.
pub fn image_view(state: &AppState, product: &Product) -> ImageView {
    let source = product.image.as_ref().map(|i| i.url.as_str());
    ImageView {
        url: state.images().url(source, ImagePreset::Grid),
        srcset: state.images().srcset(source),
        alt: product
            .image
            .as_ref()
            .and_then(|i| i.alt.clone())
            .unwrap_or_else(|| product.name.clone()),
    }
}

/// Build a listing card from a product.
pub fn product_card(state: &AppState, product: &Product) -> ProductCardView {
    let symbol = &state.config().currency_symbol;
    ProductCardView {
        slug: product.slug.clone(),
        name: product.name.clone(),
        description: product
            .description
            .as_deref()
            .map(|d| trimmed_string_to_length(d, CARD_DESCRIPTION_LENGTH))
            .unwrap_or_default(),
        price: product
            .price
            .as_deref()
            .map(|p| padded_price(p, symbol))
            .unwrap_or_default(),
        regular_price: if product.on_sale {
            product
                .regular_price
                .as_deref()
                .map(|p| padded_price(p, symbol))
        } else {
            None
        },
        on_sale: product.on_sale,
        in_stock: product.stock_status.is_purchasable(),
        image: image_view(state, product),
    }
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub products: Vec<ProductCardView>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: ProductDetailView,
}

/// Display product listing page.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<ProductsIndexTemplate> {
    let products = state.woo().get_products(Some(LISTING_PAGE_SIZE)).await?;

    Ok(ProductsIndexTemplate {
        products: products.iter().map(|p| product_card(&state, p)).collect(),
    })
}

/// Display product detail page with the selection from the query string.
#[instrument(skip(state, params), fields(slug = %slug))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<ProductShowTemplate> {
    let product = state.woo().get_product_by_slug(&slug).await?;
    let matrix = VariantMatrix::new(&product);

    // An empty query string starts from the backend-declared defaults.
    let selection = if params.is_empty() {
        Selection::from_pairs(
            product
                .default_attributes
                .iter()
                .map(|a| (a.axis.as_str(), a.value.as_str())),
        )
    } else {
        Selection::from_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    };

    let resolution = matrix.resolve(&selection);
    let symbol = &state.config().currency_symbol;

    let axes = matrix
        .axis_states(&selection)
        .into_iter()
        .map(|axis_state| {
            let axis = axis_state.axis;
            let options = axis_state
                .options
                .into_iter()
                .map(|o| {
                    let query = selection.toggled(&axis, &o.norm).query_string();
                    let href = if query.is_empty() {
                        format!("/product/{slug}")
                    } else {
                        format!("/product/{slug}?{query}")
                    };
                    OptionView {
                        label: o.value,
                        href,
                        selected: o.selected,
                        available: o.available,
                        stock: o.stock,
                    }
                })
                .collect();
            AxisView {
                name: axis,
                options,
            }
        })
        .collect::<Vec<_>>();

    // The resolved variation overrides price, image, and stock.
    let price_source = resolution
        .variation
        .and_then(|v| v.price.as_deref())
        .or(product.price.as_deref());
    let regular_source = resolution
        .variation
        .and_then(|v| v.regular_price.as_deref())
        .or(product.regular_price.as_deref());
    let on_sale = resolution.variation.map_or(product.on_sale, |v| v.on_sale);

    let image = resolution
        .variation
        .and_then(|v| v.image.as_ref())
        .or(product.image.as_ref());
    let image_source = image.map(|i| i.url.as_str());

    let selection_fields = axes
        .iter()
        .map(|a| &a.name)
        .filter_map(|axis| {
            selection
                .get(axis)
                .map(|value| (format!("attr_{axis}"), value.to_string()))
        })
        .collect();

    let can_add = if matrix.is_simple() {
        product.stock_status.is_purchasable()
    } else {
        resolution.purchasable
    };

    let view = ProductDetailView {
        slug: product.slug.clone(),
        name: product.name.clone(),
        description: product.description.clone().unwrap_or_default(),
        price: price_source
            .map(|p| padded_price(p, symbol))
            .unwrap_or_default(),
        regular_price: if on_sale {
            regular_source.map(|p| padded_price(p, symbol))
        } else {
            None
        },
        on_sale,
        image: ImageView {
            url: state.images().url(image_source, ImagePreset::Preview),
            srcset: state.images().srcset(image_source),
            alt: image
                .and_then(|i| i.alt.clone())
                .unwrap_or_else(|| product.name.clone()),
        },
        axes,
        selection_complete: resolution.complete,
        can_add,
        product_id: product.database_id,
        variation_id: resolution.variation.map(|v| v.database_id),
        selection_fields,
        stock: resolution
            .variation
            .and_then(|v| v.stock_quantity)
            .or(product.stock_quantity),
    };

    Ok(ProductShowTemplate { product: view })
}
