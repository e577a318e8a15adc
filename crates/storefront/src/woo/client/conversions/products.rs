//! Product and category conversion functions.

use crate::woo::types::{
    AttributeAxis, Category, Product, Variation, VariationAttribute,
};

use super::super::queries::{
    get_categories, get_category_by_slug, get_product_by_slug, get_products,
};
use super::{image_from, normalize_axis_name, stock_status};

/// Convert a product listing response into a flat product list.
pub fn convert_product_list(
    connection: Option<get_products::GetProductsProducts>,
) -> Vec<Product> {
    connection.map_or_else(Vec::new, |c| {
        c.nodes.into_iter().map(convert_listing_node).collect()
    })
}

/// Listing queries skip variation data, so these products carry empty axes.
fn convert_listing_node(node: get_products::GetProductsProductsNodes) -> Product {
    Product {
        id: node.id,
        database_id: node.database_id,
        name: node.name,
        slug: node.slug,
        description: node.description,
        on_sale: node.on_sale,
        price: node.price,
        regular_price: node.regular_price,
        sale_price: node.sale_price,
        stock_quantity: node.stock_quantity,
        stock_status: stock_status(node.stock_status),
        image: node.image.and_then(|i| image_from(i.source_url, i.alt_text)),
        axes: vec![],
        default_attributes: vec![],
        variations: vec![],
    }
}

/// Convert a full single-product response, including attribute axes,
/// default attributes, and variations.
pub fn convert_product(product: get_product_by_slug::GetProductBySlugProduct) -> Product {
    let axes = product.attributes.map_or_else(Vec::new, |attrs| {
        attrs
            .nodes
            .into_iter()
            .map(|a| AttributeAxis {
                name: normalize_axis_name(&a.name),
                options: a.options.unwrap_or_default(),
            })
            .collect()
    });

    let default_attributes = product.default_attributes.map_or_else(Vec::new, |attrs| {
        attrs
            .nodes
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

    let variations = product.variations.map_or_else(Vec::new, |vars| {
        vars.nodes.into_iter().map(convert_variation).collect()
    });

    Product {
        id: product.id,
        database_id: product.database_id,
        name: product.name,
        slug: product.slug,
        description: product.description,
        on_sale: product.on_sale,
        price: product.price,
        regular_price: product.regular_price,
        sale_price: product.sale_price,
        stock_quantity: product.stock_quantity,
        stock_status: stock_status(product.stock_status),
        image: product
            .image
            .and_then(|i| image_from(i.source_url, i.alt_text)),
        axes,
        default_attributes,
        variations,
    }
}

fn convert_variation(
    node: get_product_by_slug::GetProductBySlugProductVariationsNodes,
) -> Variation {
    let attributes = node.attributes.map_or_else(Vec::new, |attrs| {
        attrs
            .nodes
            .into_iter()
            .filter_map(|a| {
                let name = a.name?;
                Some(VariationAttribute {
                    axis: normalize_axis_name(&name),
                    // An empty value is a wildcard binding ("any" option).
                    value: a.value.unwrap_or_default(),
                })
            })
            .collect()
    });

    Variation {
        id: node.id,
        database_id: node.database_id,
        name: node.name,
        on_sale: node.on_sale,
        price: node.price,
        regular_price: node.regular_price,
        sale_price: node.sale_price,
        stock_quantity: node.stock_quantity,
        stock_status: stock_status(node.stock_status),
        image: node.image.and_then(|i| image_from(i.source_url, i.alt_text)),
        attributes,
    }
}

/// Convert a category listing response.
pub fn convert_category_list(
    connection: Option<get_categories::GetCategoriesProductCategories>,
) -> Vec<Category> {
    connection.map_or_else(Vec::new, |c| {
        c.nodes
            .into_iter()
            .map(|node| Category {
                id: node.id,
                database_id: node.database_id,
                name: node.name,
                slug: node.slug,
                count: node.count,
                products: vec![],
            })
            .collect()
    })
}

/// Convert a single category with its product list.
pub fn convert_category(
    category: get_category_by_slug::GetCategoryBySlugProductCategory,
) -> Category {
    let products = category.products.map_or_else(Vec::new, |conn| {
        conn.nodes
            .into_iter()
            .map(|node| Product {
                id: node.id,
                database_id: node.database_id,
                name: node.name,
                slug: node.slug,
                description: node.description,
                on_sale: node.on_sale,
                price: node.price,
                regular_price: node.regular_price,
                sale_price: node.sale_price,
                stock_quantity: node.stock_quantity,
                stock_status: stock_status(node.stock_status),
                image: node.image.and_then(|i| image_from(i.source_url, i.alt_text)),
                axes: vec![],
                default_attributes: vec![],
                variations: vec![],
            })
            .collect()
    });

    Category {
        id: category.id,
        database_id: category.database_id,
        name: category.name,
        slug: category.slug,
        count: category.count,
        products,
    }
}
