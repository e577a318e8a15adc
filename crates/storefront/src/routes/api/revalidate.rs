//! Cache revalidation endpoint.
//!
//! The commerce backend calls this webhook after content changes so the
//! catalog cache drops stale entries immediately instead of waiting out the
//! TTL. Callers authenticate with a shared secret, passed either in the
//! body or as a query parameter.

use axum::extract::{Query, State};
use axum::Json;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Query parameters for the revalidation webhook.
#[derive(Debug, Default, Deserialize)]
pub struct RevalidateQuery {
    pub secret: Option<String>,
}

/// Revalidation request body. All path fields are optional; `slug` is
/// shorthand that expands to the product page plus the listing pages
/// showing it. An empty request revalidates the listing pages.
#[derive(Debug, Default, Deserialize)]
pub struct RevalidateBody {
    pub secret: Option<String>,
    pub path: Option<String>,
    pub paths: Option<Vec<String>>,
    pub slug: Option<String>,
}

/// Revalidation response: which paths were invalidated and which were
/// rejected.
#[derive(Debug, Serialize)]
pub struct RevalidateResponse {
    pub revalidated: Vec<String>,
    pub failed: Vec<String>,
}

/// Expand the request body into a deduplicated list of paths. An empty
/// request falls back to the listing pages.
fn collect_paths(body: &RevalidateBody) -> Vec<String> {
    let mut paths: Vec<String> = Vec::new();
    let mut push = |path: String, paths: &mut Vec<String>| {
        if !path.is_empty() && !paths.contains(&path) {
            paths.push(path);
        }
    };

    if let Some(path) = &body.path {
        push(path.clone(), &mut paths);
    }
    if let Some(list) = &body.paths {
        for path in list {
            push(path.clone(), &mut paths);
        }
    }
    if let Some(slug) = &body.slug {
        let slug = slug.trim();
        if !slug.is_empty() {
            push(format!("/product/{slug}"), &mut paths);
            push("/".to_string(), &mut paths);
            push("/products".to_string(), &mut paths);
        }
    }

    if paths.is_empty() {
        paths.push("/".to_string());
        paths.push("/products".to_string());
    }

    paths
}

/// Invalidate cached catalog data for the given paths.
///
/// Product and category pages map to single cache entries; any other path
/// is a listing page, which shares cache entries with every other listing,
/// so the whole catalog cache is dropped once. Entries that are not paths
/// at all are reported back as failed.
#[instrument(skip(state, query, body))]
pub async fn revalidate(
    State(state): State<AppState>,
    Query(query): Query<RevalidateQuery>,
    Json(body): Json<RevalidateBody>,
) -> Result<Json<RevalidateResponse>> {
    let secret = body.secret.as_deref().or(query.secret.as_deref());
    if secret != Some(state.config().revalidate_secret.expose_secret()) {
        return Err(AppError::Unauthorized(
            "Invalid revalidation secret".to_string(),
        ));
    }

    let mut revalidated = Vec::new();
    let mut failed = Vec::new();
    let mut dropped_listings = false;

    for path in collect_paths(&body) {
        if !path.starts_with('/') {
            warn!(path = %path, "Rejected revalidation entry");
            failed.push(path);
            continue;
        }

        if let Some(slug) = path.strip_prefix("/product/") {
            state.woo().invalidate_product(slug).await;
        } else if let Some(slug) = path.strip_prefix("/category/") {
            state.woo().invalidate_category(slug).await;
        } else if !dropped_listings {
            state.woo().invalidate_all().await;
            dropped_listings = true;
        }
        revalidated.push(path);
    }

    info!(count = revalidated.len(), "Revalidated catalog cache paths");

    Ok(Json(RevalidateResponse {
        revalidated,
        failed,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_paths_from_slug() {
        let body = RevalidateBody {
            slug: Some("coastal-mug".to_string()),
            ..RevalidateBody::default()
        };
        assert_eq!(
            collect_paths(&body),
            vec!["/product/coastal-mug", "/", "/products"]
        );
    }

    #[test]
    fn test_collect_paths_deduplicates() {
        let body = RevalidateBody {
            path: Some("/products".to_string()),
            paths: Some(vec![
                "/products".to_string(),
                "/product/coastal-mug".to_string(),
            ]),
            slug: Some("coastal-mug".to_string()),
            ..RevalidateBody::default()
        };
        assert_eq!(
            collect_paths(&body),
            vec!["/products", "/product/coastal-mug", "/"]
        );
    }

    #[test]
    fn test_collect_paths_empty_body_defaults_to_listings() {
        assert_eq!(collect_paths(&RevalidateBody::default()), vec!["/", "/products"]);

        let body = RevalidateBody {
            slug: Some("  ".to_string()),
            ..RevalidateBody::default()
        };
        assert_eq!(collect_paths(&body), vec!["/", "/products"]);
    }
}
