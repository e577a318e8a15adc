//! Category route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::routes::products::{product_card, ProductCardView};
use crate::state::AppState;
use crate::woo::types::Category;

/// Number of products fetched for a category page.
const CATEGORY_PAGE_SIZE: i64 = 24;

/// Category display data for listing cards.
#[derive(Clone)]
pub struct CategoryCardView {
    pub slug: String,
    pub name: String,
    pub count: Option<i64>,
}

/// Build a listing card from a category.
pub fn category_card(category: &Category) -> CategoryCardView {
    CategoryCardView {
        slug: category.slug.clone(),
        name: category.name.clone(),
        count: category.count,
    }
}

/// Category listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoriesIndexTemplate {
    pub categories: Vec<CategoryCardView>,
}

/// Category detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/show.html")]
pub struct CategoryShowTemplate {
    pub name: String,
    pub products: Vec<ProductCardView>,
}

/// Display category listing page.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<CategoriesIndexTemplate> {
    let categories = state.woo().get_categories(None).await?;

    Ok(CategoriesIndexTemplate {
        categories: categories.iter().map(category_card).collect(),
    })
}

/// Display a category with its products.
#[instrument(skip(state), fields(slug = %slug))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<CategoryShowTemplate> {
    let category = state
        .woo()
        .get_category_by_slug(&slug, Some(CATEGORY_PAGE_SIZE))
        .await?;

    Ok(CategoryShowTemplate {
        name: category.name.clone(),
        products: category
            .products
            .iter()
            .map(|p| product_card(&state, p))
            .collect(),
    })
}
