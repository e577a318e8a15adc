//! WooCommerce GraphQL client implementation.
//!
//! Uses `graphql_client` for type-safe queries with `reqwest` for HTTP.
//! Catalog reads are cached with `moka` (5-minute TTL); cart and checkout
//! requests carry the guest session token and are never cached.

mod cache;
mod conversions;
pub mod queries;

use std::sync::Arc;
use std::time::Duration;

use graphql_client::{GraphQLQuery, Response};
use moka::future::Cache;
use tracing::{debug, instrument};

use crate::config::WooConfig;
use crate::woo::types::{
    AddToCartRequest, CartSnapshot, Category, CheckoutOutcome, CheckoutRequest, Product,
    QuantityUpdate, Sessioned,
};
use crate::woo::{GraphQLError, WooError};

use cache::CacheValue;
use conversions::{
    convert_cart, convert_category, convert_category_list, convert_checkout, convert_product,
    convert_product_list, empty_cart,
};
use queries::{
    AddToCart, Checkout, GetCart, GetCategories, GetCategoryBySlug, GetProductBySlug,
    GetProducts, UpdateItemQuantities, add_to_cart, checkout, get_cart, get_categories,
    get_category_by_slug, get_product_by_slug, get_products, update_item_quantities,
};

/// Header carrying the WooCommerce guest session token, in both directions.
pub const SESSION_HEADER: &str = "woocommerce-session";

/// An unparsed GraphQL response, relayed verbatim by the proxy endpoint.
#[derive(Debug)]
pub struct RawGraphQLResponse {
    pub status: u16,
    pub body: String,
    /// Session token the backend attached to this response, if any.
    pub session_token: Option<String>,
}

// =============================================================================
// WooClient
// =============================================================================

/// Client for the WooCommerce GraphQL endpoint.
///
/// Provides type-safe access to products, categories, cart, and checkout.
/// Products and categories are cached for 5 minutes.
#[derive(Clone)]
pub struct WooClient {
    inner: Arc<WooClientInner>,
}

struct WooClientInner {
    client: reqwest::Client,
    endpoint: String,
    cache: Cache<String, CacheValue>,
}

impl WooClient {
    /// Create a new WooCommerce GraphQL client.
    #[must_use]
    pub fn new(config: &WooConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(WooClientInner {
                client: reqwest::Client::new(),
                endpoint: config.endpoint.clone(),
                cache,
            }),
        }
    }

    /// Execute a GraphQL query, carrying the session token when present.
    async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
        session_token: Option<&str>,
    ) -> Result<Sessioned<Q::ResponseData>, WooError>
    where
        Q::Variables: serde::Serialize,
    {
        let request_body = Q::build_query(variables);

        let mut request = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header("Content-Type", "application/json");

        if let Some(token) = session_token {
            // WooGraphQL expects the "Session <jwt>" form on requests.
            request = request.header(SESSION_HEADER, format!("Session {token}"));
        }

        let response = request.json(&request_body).send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(WooError::RateLimited(retry_after));
        }

        // Capture the rotated session token before the body consumes the
        // response.
        let next_token = session_token_from(response.headers());

        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "WooCommerce API returned non-success status"
            );
            return Err(WooError::GraphQL(vec![GraphQLError::message_only(
                format!(
                    "HTTP {status}: {}",
                    response_text.chars().take(200).collect::<String>()
                ),
            )]));
        }

        let response: Response<Q::ResponseData> = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse WooCommerce GraphQL response"
                );
                return Err(WooError::Parse(e));
            }
        };

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            tracing::debug!(errors = ?errors, "GraphQL errors in response");

            return Err(WooError::GraphQL(
                errors
                    .into_iter()
                    .map(|e| GraphQLError {
                        message: e.message,
                        locations: e.locations.map_or_else(Vec::new, |locs| {
                            locs.into_iter()
                                .map(|l| crate::woo::GraphQLErrorLocation {
                                    line: i64::from(l.line),
                                    column: i64::from(l.column),
                                })
                                .collect()
                        }),
                        path: e.path.map_or_else(Vec::new, |p| {
                            p.into_iter()
                                .map(|fragment| match fragment {
                                    graphql_client::PathFragment::Key(s) => {
                                        serde_json::Value::String(s)
                                    }
                                    graphql_client::PathFragment::Index(i) => {
                                        serde_json::Value::Number(i.into())
                                    }
                                })
                                .collect()
                        }),
                    })
                    .collect(),
            ));
        }

        let data = response.data.ok_or_else(|| {
            tracing::error!(
                body = %response_text.chars().take(500).collect::<String>(),
                "WooCommerce GraphQL response has no data and no errors"
            );
            WooError::GraphQL(vec![GraphQLError::message_only("No data in response")])
        })?;

        Ok(Sessioned {
            value: data,
            session_token: next_token,
        })
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// Get a paginated list of products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_products(&self, first: Option<i64>) -> Result<Vec<Product>, WooError> {
        let cache_key = format!("products:{first:?}");

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let data = self
            .execute::<GetProducts>(get_products::Variables { first }, None)
            .await?;

        let products = convert_product_list(data.value.products);

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Get a product by its slug, with axes, defaults, and variations.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the API request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn get_product_by_slug(&self, slug: &str) -> Result<Product, WooError> {
        let cache_key = format!("product:{slug}");

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let data = self
            .execute::<GetProductBySlug>(
                get_product_by_slug::Variables {
                    slug: slug.to_string(),
                },
                None,
            )
            .await?;

        let product_data = data
            .value
            .product
            .ok_or_else(|| WooError::NotFound(format!("Product not found: {slug}")))?;

        let product = convert_product(product_data);

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Get a list of product categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_categories(&self, first: Option<i64>) -> Result<Vec<Category>, WooError> {
        let cache_key = format!("categories:{first:?}");

        if let Some(CacheValue::Categories(categories)) = self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let data = self
            .execute::<GetCategories>(get_categories::Variables { first }, None)
            .await?;

        let categories = convert_category_list(data.value.product_categories);

        self.inner
            .cache
            .insert(cache_key, CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }

    /// Get a category by its slug, including its products.
    ///
    /// # Errors
    ///
    /// Returns an error if the category is not found or the API request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn get_category_by_slug(
        &self,
        slug: &str,
        product_count: Option<i64>,
    ) -> Result<Category, WooError> {
        let cache_key = format!("category:{slug}");

        if let Some(CacheValue::Category(category)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for category");
            return Ok(*category);
        }

        let data = self
            .execute::<GetCategoryBySlug>(
                get_category_by_slug::Variables {
                    slug: slug.to_string(),
                    first: product_count,
                },
                None,
            )
            .await?;

        let category_data = data
            .value
            .product_category
            .ok_or_else(|| WooError::NotFound(format!("Category not found: {slug}")))?;

        let category = convert_category(category_data);

        self.inner
            .cache
            .insert(cache_key, CacheValue::Category(Box::new(category.clone())))
            .await;

        Ok(category)
    }

    // =========================================================================
    // Cart Methods (not cached - session-scoped mutable state)
    // =========================================================================

    /// Get the cart for the given session. A missing backend cart yields an
    /// empty snapshot, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, session_token))]
    pub async fn get_cart(
        &self,
        session_token: Option<&str>,
    ) -> Result<Sessioned<CartSnapshot>, WooError> {
        let data = self
            .execute::<GetCart>(get_cart::Variables, session_token)
            .await?;

        let snapshot = data.value.cart.map_or_else(empty_cart, convert_cart);

        Ok(Sessioned {
            value: snapshot,
            session_token: data.session_token,
        })
    }

    /// Add an item to the cart, then re-fetch the authoritative cart.
    ///
    /// The backend owns line merging and totals, so the returned snapshot
    /// comes from a follow-up `GetCart` under the (possibly rotated) session
    /// token rather than from the mutation payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the mutation is rejected or a request fails.
    #[instrument(skip(self, session_token), fields(product_id = request.product_id))]
    pub async fn add_to_cart(
        &self,
        session_token: Option<&str>,
        request: AddToCartRequest,
    ) -> Result<Sessioned<CartSnapshot>, WooError> {
        let variation = if request.attributes.is_empty() {
            None
        } else {
            Some(
                request
                    .attributes
                    .into_iter()
                    .map(|a| add_to_cart::ProductAttributeInput {
                        attribute_name: a.name,
                        attribute_value: Some(a.value),
                    })
                    .collect(),
            )
        };

        let variables = add_to_cart::Variables {
            input: add_to_cart::AddToCartInput {
                client_mutation_id: None,
                product_id: request.product_id,
                quantity: Some(request.quantity),
                variation_id: request.variation_id,
                variation,
            },
        };

        let data = self.execute::<AddToCart>(variables, session_token).await?;

        if data.value.add_to_cart.is_none() {
            return Err(WooError::UserError(
                "The item could not be added to the cart".to_string(),
            ));
        }

        self.refetch_cart(data.session_token, session_token).await
    }

    /// Apply quantity updates (zero removes the line), then re-fetch the
    /// authoritative cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the mutation is rejected or a request fails.
    #[instrument(skip(self, session_token, updates))]
    pub async fn update_item_quantities(
        &self,
        session_token: Option<&str>,
        updates: Vec<QuantityUpdate>,
    ) -> Result<Sessioned<CartSnapshot>, WooError> {
        let variables = update_item_quantities::Variables {
            input: update_item_quantities::UpdateItemQuantitiesInput {
                client_mutation_id: None,
                items: Some(
                    updates
                        .into_iter()
                        .map(|u| update_item_quantities::CartItemQuantityInput {
                            key: u.key,
                            quantity: u.quantity,
                        })
                        .collect(),
                ),
            },
        };

        let data = self
            .execute::<UpdateItemQuantities>(variables, session_token)
            .await?;

        if data.value.update_item_quantities.is_none() {
            return Err(WooError::UserError(
                "The cart could not be updated".to_string(),
            ));
        }

        self.refetch_cart(data.session_token, session_token).await
    }

    /// Re-fetch the cart after a mutation, preferring the token the mutation
    /// response carried over the one the caller started with.
    async fn refetch_cart(
        &self,
        rotated_token: Option<String>,
        original_token: Option<&str>,
    ) -> Result<Sessioned<CartSnapshot>, WooError> {
        let token = rotated_token.or_else(|| original_token.map(str::to_string));
        let cart = self.get_cart(token.as_deref()).await?;
        let session_token = cart.session_token.or(token);
        Ok(Sessioned {
            value: cart.value,
            session_token,
        })
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Place an order from the session's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the mutation is rejected or the request fails.
    #[instrument(skip(self, session_token, request))]
    pub async fn checkout(
        &self,
        session_token: Option<&str>,
        request: CheckoutRequest,
    ) -> Result<Sessioned<CheckoutOutcome>, WooError> {
        let billing = request.billing;
        let variables = checkout::Variables {
            input: checkout::CheckoutInput {
                client_mutation_id: None,
                payment_method: Some(request.payment_method),
                is_paid: Some(request.is_paid),
                transaction_id: request.transaction_id,
                billing: Some(checkout::CustomerAddressInput {
                    first_name: Some(billing.first_name),
                    last_name: Some(billing.last_name),
                    address1: Some(billing.address1),
                    address2: billing.address2,
                    city: Some(billing.city),
                    postcode: Some(billing.postcode),
                    country: Some(billing.country),
                    email: Some(billing.email),
                    phone: Some(billing.phone),
                }),
            },
        };

        let data = self.execute::<Checkout>(variables, session_token).await?;

        let outcome = data
            .value
            .checkout
            .map(convert_checkout)
            .ok_or_else(|| WooError::UserError("Checkout returned no data".to_string()))?;

        Ok(Sessioned {
            value: outcome,
            session_token: data.session_token,
        })
    }

    // =========================================================================
    // Raw Proxy
    // =========================================================================

    /// Forward a raw GraphQL request body to the backend.
    ///
    /// Used by the proxy endpoint: the body and the response are relayed
    /// without interpretation, and any non-transport failure is reflected in
    /// the returned status rather than an error.
    ///
    /// # Errors
    ///
    /// Returns an error only when the HTTP request itself fails.
    #[instrument(skip(self, body, session_token))]
    pub async fn forward_raw(
        &self,
        body: String,
        session_token: Option<&str>,
    ) -> Result<RawGraphQLResponse, WooError> {
        let mut request = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header("Content-Type", "application/json");

        if let Some(token) = session_token {
            request = request.header(SESSION_HEADER, format!("Session {token}"));
        }

        let response = request.body(body).send().await?;

        let status = response.status().as_u16();
        let session_token = session_token_from(response.headers());
        let body = response.text().await?;

        Ok(RawGraphQLResponse {
            status,
            body,
            session_token,
        })
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Invalidate a cached product.
    pub async fn invalidate_product(&self, slug: &str) {
        self.inner
            .cache
            .invalidate(&format!("product:{slug}"))
            .await;
    }

    /// Invalidate a cached category.
    pub async fn invalidate_category(&self, slug: &str) {
        self.inner
            .cache
            .invalidate(&format!("category:{slug}"))
            .await;
    }

    /// Invalidate all cached catalog data.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}

/// Pull the session token out of response headers, tolerating both the bare
/// token and the `Session <token>` form.
fn session_token_from(headers: &reqwest::header::HeaderMap) -> Option<String> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.strip_prefix("Session ").unwrap_or(v).to_string())
        .filter(|v| !v.is_empty())
}
