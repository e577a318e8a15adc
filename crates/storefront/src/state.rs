//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::images::ImageService;
use crate::services::stripe::{StripeClient, StripeError};
use crate::woo::WooClient;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the commerce client and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    woo: WooClient,
    stripe: StripeClient,
    images: ImageService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the Stripe client fails to build.
    pub fn new(config: StorefrontConfig) -> Result<Self, StripeError> {
        let woo = WooClient::new(&config.woo);
        let stripe = StripeClient::new(&config.stripe)?;
        let images = ImageService::new(config.cloudinary_cloud_name.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                woo,
                stripe,
                images,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the WooCommerce GraphQL client.
    #[must_use]
    pub fn woo(&self) -> &WooClient {
        &self.inner.woo
    }

    /// Get a reference to the Stripe client.
    #[must_use]
    pub fn stripe(&self) -> &StripeClient {
        &self.inner.stripe
    }

    /// Get a reference to the CDN image URL builder.
    #[must_use]
    pub fn images(&self) -> &ImageService {
        &self.inner.images
    }
}
