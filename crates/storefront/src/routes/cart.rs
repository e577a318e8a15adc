//! Cart route handlers.
//!
//! Cart mutations use HTMX: handlers return HTML fragments and fire the
//! `cart-updated` event so the header badge refreshes itself. Every mutation
//! goes to the commerce backend first; the session mirror is reconciled from
//! the snapshot that comes back, never trusted on its own.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use axum::response::AppendHeaders;
use axum::Form;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use tidemark_core::format::padded_price;

use crate::cart::CartState;
use crate::error::{add_breadcrumb, AppError, Result};
use crate::filters;
use crate::images::ImagePreset;
use crate::models::session::BackendSession;
use crate::models::session_keys;
use crate::state::AppState;
use crate::woo::types::{AddToCartRequest, CartSnapshot, QuantityUpdate, SelectedAttribute};

/// Map a session store failure to an application error.
fn session_error(err: tower_sessions::session::Error) -> AppError {
    AppError::Internal(format!("Session error: {err}"))
}

/// Read the backend cart token from the session, discarding it if it has
/// outlived the backend's validity window.
pub(crate) async fn backend_token(session: &Session) -> Result<Option<String>> {
    let Some(backend) = session
        .get::<BackendSession>(session_keys::BACKEND_SESSION)
        .await
        .map_err(session_error)?
    else {
        return Ok(None);
    };

    if backend.is_expired() {
        session
            .remove::<BackendSession>(session_keys::BACKEND_SESSION)
            .await
            .map_err(session_error)?;
        return Ok(None);
    }

    Ok(Some(backend.token))
}

/// Persist a rotated backend token, if the backend sent one.
pub(crate) async fn store_rotated_token(session: &Session, token: Option<String>) -> Result<()> {
    if let Some(token) = token {
        session
            .insert(session_keys::BACKEND_SESSION, BackendSession::new(token))
            .await
            .map_err(session_error)?;
    }
    Ok(())
}

/// Load the mirrored cart state, defaulting to an empty mirror.
pub(crate) async fn load_cart_state(session: &Session) -> Result<CartState> {
    Ok(session
        .get::<CartState>(session_keys::CART_STATE)
        .await
        .map_err(session_error)?
        .unwrap_or_default())
}

/// Save the mirrored cart state.
pub(crate) async fn save_cart_state(session: &Session, state: &CartState) -> Result<()> {
    session
        .insert(session_keys::CART_STATE, state)
        .await
        .map_err(session_error)
}

/// Reconcile the session mirror against an authoritative snapshot.
pub(crate) async fn reconcile_mirror(session: &Session, snapshot: &CartSnapshot) -> Result<()> {
    let mut mirror = load_cart_state(session).await?;
    mirror.reconcile(snapshot);
    save_cart_state(session, &mirror).await
}

/// One cart line prepared for display.
#[derive(Clone)]
pub struct CartItemView {
    pub key: String,
    pub name: String,
    pub slug: String,
    /// Joined variation attributes, e.g. "Red / M". Empty for simple
    /// products.
    pub variant_label: String,
    pub quantity: i64,
    pub line_total: String,
    pub image_url: String,
    pub image_alt: String,
}

/// Cart display data.
#[derive(Clone)]
pub struct CartView {
    pub is_empty: bool,
    pub item_count: i64,
    pub subtotal: String,
    pub total: String,
    pub items: Vec<CartItemView>,
}

/// Build the cart view from an authoritative snapshot.
fn cart_view(state: &AppState, snapshot: &CartSnapshot) -> CartView {
    let symbol = &state.config().currency_symbol;
    let items = snapshot
        .items
        .iter()
        .map(|item| {
            let variant_label = item.variation.as_ref().map_or_else(String::new, |v| {
                let parts: Vec<&str> = v
                    .attributes
                    .iter()
                    .filter(|a| !a.value.is_empty())
                    .map(|a| a.value.as_str())
                    .collect();
                if parts.is_empty() {
                    v.name.clone()
                } else {
                    parts.join(" / ")
                }
            });
            let image = item.display_image();
            CartItemView {
                key: item.key.clone(),
                name: item.product.name.clone(),
                slug: item.product.slug.clone(),
                variant_label,
                quantity: item.quantity,
                line_total: item
                    .total
                    .as_deref()
                    .or(item.subtotal.as_deref())
                    .map(|t| padded_price(t, symbol))
                    .unwrap_or_default(),
                image_url: state
                    .images()
                    .url(image.map(|i| i.url.as_str()), ImagePreset::Thumbnail),
                image_alt: image
                    .and_then(|i| i.alt.clone())
                    .unwrap_or_else(|| item.product.name.clone()),
            }
        })
        .collect();

    CartView {
        is_empty: snapshot.is_empty,
        item_count: snapshot.item_count,
        subtotal: snapshot
            .subtotal
            .as_deref()
            .map(|s| padded_price(s, symbol))
            .unwrap_or_default(),
        total: snapshot
            .total
            .as_deref()
            .map(|t| padded_price(t, symbol))
            .unwrap_or_default(),
        items,
    }
}

fn empty_view() -> CartView {
    CartView {
        is_empty: true,
        item_count: 0,
        subtotal: String::new(),
        total: String::new(),
        items: Vec::new(),
    }
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Cart lines fragment, swapped in by HTMX after mutations.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart badge fragment for the site header.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: i64,
}

/// Display the cart page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<CartShowTemplate> {
    let Some(token) = backend_token(&session).await? else {
        return Ok(CartShowTemplate { cart: empty_view() });
    };

    let cart = state.woo().get_cart(Some(&token)).await?;
    store_rotated_token(&session, cart.session_token.clone()).await?;
    reconcile_mirror(&session, &cart.value).await?;

    Ok(CartShowTemplate {
        cart: cart_view(&state, &cart.value),
    })
}

/// Add an item to the cart.
///
/// The form carries `product_id`, `quantity`, optionally `variation_id`, and
/// one `attr_<axis>` field per selected attribute.
#[instrument(skip(state, session, form))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<HashMap<String, String>>,
) -> Result<impl axum::response::IntoResponse> {
    let request = parse_add_form(&form)?;

    add_breadcrumb(
        "cart",
        "Add to cart",
        Some(&[("product_id", &request.product_id.to_string())]),
    );

    let token = backend_token(&session).await?;
    let cart = state.woo().add_to_cart(token.as_deref(), request).await?;

    store_rotated_token(&session, cart.session_token.clone()).await?;
    reconcile_mirror(&session, &cart.value).await?;

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartCountTemplate {
            count: cart.value.item_count,
        },
    ))
}

/// Quantity change form for a single cart line.
#[derive(Debug, Deserialize)]
pub struct UpdateLineForm {
    pub key: String,
    pub quantity: i64,
}

/// Set the quantity of a cart line. Zero removes the line.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<UpdateLineForm>,
) -> Result<impl axum::response::IntoResponse> {
    let Some(token) = backend_token(&session).await? else {
        return Ok((
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartItemsTemplate { cart: empty_view() },
        ));
    };

    let cart = state
        .woo()
        .update_item_quantities(
            Some(&token),
            vec![QuantityUpdate {
                key: form.key,
                quantity: form.quantity.max(0),
            }],
        )
        .await?;

    store_rotated_token(&session, cart.session_token.clone()).await?;
    reconcile_mirror(&session, &cart.value).await?;

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: cart_view(&state, &cart.value),
        },
    ))
}

/// Removal form for a single cart line.
#[derive(Debug, Deserialize)]
pub struct RemoveLineForm {
    pub key: String,
}

/// Remove a cart line entirely.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RemoveLineForm>,
) -> Result<impl axum::response::IntoResponse> {
    update(
        State(state),
        session,
        Form(UpdateLineForm {
            key: form.key,
            quantity: 0,
        }),
    )
    .await
}

/// Render the cart badge from the session mirror, without touching the
/// backend.
#[instrument(skip(session))]
pub async fn count(session: Session) -> Result<CartCountTemplate> {
    let mirror = load_cart_state(&session).await?;
    Ok(CartCountTemplate {
        count: mirror.item_count(),
    })
}

/// Parse the add-to-cart form into a request.
fn parse_add_form(form: &HashMap<String, String>) -> Result<AddToCartRequest> {
    let product_id = form
        .get("product_id")
        .and_then(|v| v.parse::<i64>().ok())
        .ok_or_else(|| AppError::BadRequest("Missing or invalid product_id".to_string()))?;

    let quantity = form
        .get("quantity")
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(1)
        .max(1);

    let variation_id = match form.get("variation_id").map(String::as_str) {
        None | Some("") => None,
        Some(raw) => Some(
            raw.parse::<i64>()
                .map_err(|_| AppError::BadRequest("Invalid variation_id".to_string()))?,
        ),
    };

    let mut attributes: Vec<SelectedAttribute> = form
        .iter()
        .filter_map(|(key, value)| {
            key.strip_prefix("attr_").map(|name| SelectedAttribute {
                name: name.to_string(),
                value: value.clone(),
            })
        })
        .collect();
    attributes.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(AddToCartRequest {
        product_id,
        quantity,
        variation_id,
        attributes,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_parse_add_form_simple_product() {
        let request = parse_add_form(&form(&[("product_id", "7")])).unwrap();
        assert_eq!(request.product_id, 7);
        assert_eq!(request.quantity, 1);
        assert!(request.variation_id.is_none());
        assert!(request.attributes.is_empty());
    }

    #[test]
    fn test_parse_add_form_with_variation() {
        let request = parse_add_form(&form(&[
            ("product_id", "7"),
            ("quantity", "2"),
            ("variation_id", "12"),
            ("attr_size", "M"),
            ("attr_color", "Sea Blue"),
        ]))
        .unwrap();

        assert_eq!(request.quantity, 2);
        assert_eq!(request.variation_id, Some(12));
        assert_eq!(
            request.attributes,
            vec![
                SelectedAttribute {
                    name: "color".to_string(),
                    value: "Sea Blue".to_string()
                },
                SelectedAttribute {
                    name: "size".to_string(),
                    value: "M".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_parse_add_form_rejects_missing_product() {
        assert!(parse_add_form(&form(&[("quantity", "1")])).is_err());
        assert!(parse_add_form(&form(&[("product_id", "abc")])).is_err());
    }

    #[test]
    fn test_parse_add_form_clamps_quantity() {
        let request = parse_add_form(&form(&[("product_id", "7"), ("quantity", "-3")])).unwrap();
        assert_eq!(request.quantity, 1);
    }

    #[test]
    fn test_parse_add_form_empty_variation_id_is_none() {
        let request = parse_add_form(&form(&[("product_id", "7"), ("variation_id", "")])).unwrap();
        assert!(request.variation_id.is_none());
    }
}
