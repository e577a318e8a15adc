//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::routes::categories::{category_card, CategoryCardView};
use crate::routes::products::{product_card, ProductCardView};
use crate::state::AppState;

/// Number of products featured on the home page.
const FEATURED_COUNT: i64 = 8;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub products: Vec<ProductCardView>,
    pub categories: Vec<CategoryCardView>,
}

/// Display home page with featured products and categories.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> Result<HomeTemplate> {
    let products = state.woo().get_products(Some(FEATURED_COUNT)).await?;
    let categories = state.woo().get_categories(None).await?;

    Ok(HomeTemplate {
        products: products.iter().map(|p| product_card(&state, p)).collect(),
        categories: categories.iter().map(category_card).collect(),
    })
}
