//! Stripe API client for card payments.
//!
//! Creates and retrieves payment intents over Stripe's form-encoded REST
//! API. The storefront never sees card numbers; the client secret goes to
//! the hosted payment element in the browser and the server re-checks the
//! intent's status before placing the order.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;

use crate::config::StripeConfig;

/// Stripe API base URL.
const BASE_URL: &str = "https://api.stripe.com/v1";

/// Smallest chargeable amount in minor units. Stripe rejects anything
/// lower.
pub const MIN_AMOUNT_MINOR: i64 = 50;

/// Errors that can occur when interacting with the Stripe API.
#[derive(Debug, Error)]
pub enum StripeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The card was declined or otherwise rejected.
    #[error("Card error: {message}")]
    Card { message: String },

    /// Any other error response from the API.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Amount below the chargeable minimum.
    #[error("Amount {0} is below the {MIN_AMOUNT_MINOR} minor-unit minimum")]
    AmountTooSmall(i64),

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// A Stripe payment intent, reduced to the fields the storefront uses.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    /// Secret handed to the browser-side payment element.
    pub client_secret: Option<String>,
    pub status: String,
    pub amount: i64,
}

impl PaymentIntent {
    /// Whether the payment has been captured.
    #[must_use]
    pub fn is_succeeded(&self) -> bool {
        self.status == "succeeded"
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(rename = "type")]
    error_type: Option<String>,
    message: Option<String>,
}

/// Stripe API client.
#[derive(Clone)]
pub struct StripeClient {
    client: reqwest::Client,
}

impl StripeClient {
    /// Create a new Stripe API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &StripeConfig) -> Result<Self, StripeError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.secret_key.expose_secret());
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&auth_value)
                .map_err(|e| StripeError::Parse(format!("Invalid secret key format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self { client })
    }

    /// Create a payment intent for `amount_minor` in `currency`.
    ///
    /// # Errors
    ///
    /// Returns [`StripeError::AmountTooSmall`] below the minimum, a card or
    /// API error from Stripe, or a transport error.
    pub async fn create_payment_intent(
        &self,
        amount_minor: i64,
        currency: &str,
    ) -> Result<PaymentIntent, StripeError> {
        if amount_minor < MIN_AMOUNT_MINOR {
            return Err(StripeError::AmountTooSmall(amount_minor));
        }

        let amount = amount_minor.to_string();
        let params = [
            ("amount", amount.as_str()),
            ("currency", currency),
            ("automatic_payment_methods[enabled]", "true"),
        ];

        let response = self
            .client
            .post(format!("{BASE_URL}/payment_intents"))
            .form(&params)
            .send()
            .await?;

        Self::parse_intent(response).await
    }

    /// Retrieve a payment intent to verify its status server-side.
    ///
    /// # Errors
    ///
    /// Returns an API error for unknown ids or a transport error.
    pub async fn retrieve_payment_intent(&self, id: &str) -> Result<PaymentIntent, StripeError> {
        let response = self
            .client
            .get(format!(
                "{BASE_URL}/payment_intents/{}",
                urlencoding::encode(id)
            ))
            .send()
            .await?;

        Self::parse_intent(response).await
    }

    async fn parse_intent(response: reqwest::Response) -> Result<PaymentIntent, StripeError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(classify_error(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| StripeError::Parse(e.to_string()))
    }
}

/// Map a Stripe error response to the right error variant. Card errors are
/// shopper-facing declines; everything else is an API failure.
fn classify_error(status: u16, body: &str) -> StripeError {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => {
            let message = parsed
                .error
                .message
                .unwrap_or_else(|| "Payment failed".to_string());
            if parsed.error.error_type.as_deref() == Some("card_error") {
                StripeError::Card { message }
            } else {
                StripeError::Api { status, message }
            }
        }
        Err(_) => StripeError::Api {
            status,
            message: body.chars().take(200).collect(),
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_card_error_is_classified_as_decline() {
        let body = r#"{"error":{"type":"card_error","code":"card_declined","message":"Your card was declined."}}"#;
        let err = classify_error(402, body);
        assert!(matches!(
            err,
            StripeError::Card { ref message } if message == "Your card was declined."
        ));
    }

    #[test]
    fn test_other_errors_are_api_errors() {
        let body = r#"{"error":{"type":"invalid_request_error","message":"No such payment_intent"}}"#;
        let err = classify_error(404, body);
        assert!(matches!(err, StripeError::Api { status: 404, .. }));
    }

    #[test]
    fn test_unparseable_error_body_falls_back_to_api_error() {
        let err = classify_error(500, "<html>Internal Server Error</html>");
        assert!(matches!(err, StripeError::Api { status: 500, .. }));
    }

    #[test]
    fn test_intent_status_helper() {
        let intent: PaymentIntent = serde_json::from_str(
            r#"{"id":"pi_1","client_secret":"pi_1_secret","status":"succeeded","amount":12550}"#,
        )
        .unwrap();
        assert!(intent.is_succeeded());
        assert_eq!(intent.amount, 12550);
    }
}
