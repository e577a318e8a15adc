//! Checkout route handlers.
//!
//! The flow state machine lives in the session; handlers only translate HTTP
//! into state-machine transitions and backend calls. Card payments run
//! through the hosted payment element: the server creates the intent, the
//! browser confirms it, and the server re-checks the intent's status before
//! placing the order.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{instrument, warn};

use tidemark_core::format::padded_price;
use tidemark_core::minor_units;

use crate::checkout::{BillingForm, CheckoutFlow, CheckoutStage, FieldError, PaymentMethod, PaymentOutcome};
use crate::error::{add_breadcrumb, AppError, Result};
use crate::filters;
use crate::models::session_keys;
use crate::routes::cart::{backend_token, save_cart_state, store_rotated_token};
use crate::services::stripe::StripeError;
use crate::state::AppState;
use crate::woo::types::{BillingFields, CheckoutRequest, OrderSummary};
use crate::woo::WooError;

fn session_error(err: tower_sessions::session::Error) -> AppError {
    AppError::Internal(format!("Session error: {err}"))
}

async fn load_flow(session: &Session) -> Result<CheckoutFlow> {
    Ok(session
        .get::<CheckoutFlow>(session_keys::CHECKOUT_FLOW)
        .await
        .map_err(session_error)?
        .unwrap_or_default())
}

async fn save_flow(session: &Session, flow: &CheckoutFlow) -> Result<()> {
    session
        .insert(session_keys::CHECKOUT_FLOW, flow)
        .await
        .map_err(session_error)
}

/// Clear per-order session state once the order is placed: the flow, the
/// cart mirror, and the backend token the backend invalidated with the cart.
async fn finish_order(session: &Session, order: Option<&OrderSummary>) -> Result<()> {
    session
        .remove::<CheckoutFlow>(session_keys::CHECKOUT_FLOW)
        .await
        .map_err(session_error)?;
    save_cart_state(session, &crate::cart::CartState::default()).await?;

    if let Some(order) = order {
        session
            .insert(session_keys::LAST_ORDER, order)
            .await
            .map_err(session_error)?;
    }
    Ok(())
}

/// Translate a failed order placement into a payment outcome. Input
/// rejections carry the backend's message; everything else gets a generic
/// retry message, with the detail kept to the logs.
fn order_failure(err: &WooError) -> PaymentOutcome {
    match err {
        WooError::UserError(message) => PaymentOutcome::Declined {
            message: message.clone(),
        },
        _ => PaymentOutcome::Failed {
            message: "The order could not be placed. Please try again.".to_string(),
        },
    }
}

/// Prefill the billing form from previously validated fields.
fn billing_to_form(billing: &BillingFields) -> BillingForm {
    BillingForm {
        first_name: billing.first_name.clone(),
        last_name: billing.last_name.clone(),
        address1: billing.address1.clone(),
        address2: billing.address2.clone().unwrap_or_default(),
        city: billing.city.clone(),
        postcode: billing.postcode.clone(),
        country: billing.country.clone(),
        email: billing.email.clone(),
        phone: billing.phone.clone(),
    }
}

/// Billing step template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/billing.html")]
pub struct CheckoutBillingTemplate {
    pub form: BillingForm,
    pub errors: Vec<FieldError>,
}

/// Payment method step template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/payment.html")]
pub struct CheckoutPaymentTemplate {
    pub total: String,
    pub error: Option<String>,
}

/// Hosted card element template, shown after a payment intent is created.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/card.html")]
pub struct CheckoutCardTemplate {
    pub total: String,
    pub client_secret: String,
    pub publishable_key: String,
}

/// Order confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/complete.html")]
pub struct OrderConfirmationTemplate {
    pub order_number: String,
    pub status: String,
    pub total: String,
}

/// Display the checkout page for the flow's current stage.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Response> {
    let flow = load_flow(&session).await?;

    match flow.stage() {
        CheckoutStage::Billing => {
            let form = flow.billing().map(billing_to_form).unwrap_or_default();
            Ok(CheckoutBillingTemplate {
                form,
                errors: Vec::new(),
            }
            .into_response())
        }
        CheckoutStage::Payment => {
            let total = cart_total(&state, &session).await?;
            Ok(CheckoutPaymentTemplate {
                total,
                error: flow.error().map(str::to_string),
            }
            .into_response())
        }
        CheckoutStage::Completed => Ok(Redirect::to("/order-confirmation").into_response()),
    }
}

/// Submit the billing step.
#[instrument(skip(session, form))]
pub async fn submit_billing(
    session: Session,
    Form(form): Form<BillingForm>,
) -> Result<Response> {
    let mut flow = load_flow(&session).await?;

    match flow.submit_billing(&form) {
        Ok(()) => {
            save_flow(&session, &flow).await?;
            Ok(Redirect::to("/checkout").into_response())
        }
        Err(errors) => Ok(CheckoutBillingTemplate { form, errors }.into_response()),
    }
}

/// Return from payment to edit the billing address.
#[instrument(skip(session))]
pub async fn edit_billing(session: Session) -> Result<Redirect> {
    let mut flow = load_flow(&session).await?;
    flow.edit_billing();
    save_flow(&session, &flow).await?;
    Ok(Redirect::to("/checkout"))
}

/// Payment method form.
#[derive(Debug, Deserialize)]
pub struct PaymentMethodForm {
    pub payment_method: String,
}

/// Take the chosen payment method. Cash on delivery places the order
/// immediately; card creates a payment intent and hands off to the hosted
/// element.
#[instrument(skip(state, session))]
pub async fn submit_payment(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<PaymentMethodForm>,
) -> Result<Response> {
    let mut flow = load_flow(&session).await?;
    if !flow.ready_for_payment() {
        return Ok(Redirect::to("/checkout").into_response());
    }

    let Some(method) = PaymentMethod::from_form_value(&form.payment_method) else {
        return Err(AppError::BadRequest("Unknown payment method".to_string()));
    };

    // ready_for_payment guarantees billing details exist.
    let Some(billing) = flow.billing().cloned() else {
        return Ok(Redirect::to("/checkout").into_response());
    };

    add_breadcrumb(
        "checkout",
        "Payment method chosen",
        Some(&[("method", method.gateway_code())]),
    );

    match method {
        PaymentMethod::CashOnDelivery => {
            let token = backend_token(&session).await?;
            let placed = state
                .woo()
                .checkout(
                    token.as_deref(),
                    CheckoutRequest {
                        payment_method: method.gateway_code().to_string(),
                        is_paid: false,
                        transaction_id: None,
                        billing,
                    },
                )
                .await;

            let outcome = match placed {
                Ok(placed) => placed,
                Err(err) => {
                    warn!(error = %err, "Order placement failed");
                    flow.record_payment(&order_failure(&err));
                    save_flow(&session, &flow).await?;
                    return Ok(Redirect::to("/checkout").into_response());
                }
            };

            store_rotated_token(&session, outcome.session_token.clone()).await?;
            flow.complete_unpaid();
            save_flow(&session, &flow).await?;
            finish_order(&session, outcome.value.order.as_ref()).await?;

            Ok(Redirect::to("/order-confirmation").into_response())
        }
        PaymentMethod::HostedCard => {
            let total = cart_total(&state, &session).await?;
            let Some(amount) = minor_units(&total) else {
                return Err(AppError::BadRequest("Cart total unavailable".to_string()));
            };

            match state
                .stripe()
                .create_payment_intent(amount, &state.config().currency)
                .await
            {
                Ok(intent) => {
                    let Some(client_secret) = intent.client_secret else {
                        return Err(AppError::Internal(
                            "Payment intent missing client secret".to_string(),
                        ));
                    };
                    Ok(CheckoutCardTemplate {
                        total,
                        client_secret,
                        publishable_key: state.config().stripe.publishable_key.clone(),
                    }
                    .into_response())
                }
                Err(StripeError::Card { message }) => {
                    flow.record_payment(&PaymentOutcome::Declined { message });
                    save_flow(&session, &flow).await?;
                    Ok(Redirect::to("/checkout").into_response())
                }
                Err(err) => Err(err.into()),
            }
        }
    }
}

/// Query parameters appended by the hosted element's return redirect.
#[derive(Debug, Deserialize)]
pub struct CardReturnParams {
    pub payment_intent: String,
}

/// Land the shopper after card confirmation. The intent's status is
/// re-checked server-side; only a captured payment places the order.
#[instrument(skip(state, session, params))]
pub async fn card_return(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<CardReturnParams>,
) -> Result<Response> {
    let mut flow = load_flow(&session).await?;
    if !flow.ready_for_payment() {
        return Ok(Redirect::to("/checkout").into_response());
    }
    let Some(billing) = flow.billing().cloned() else {
        return Ok(Redirect::to("/checkout").into_response());
    };

    let outcome = match state
        .stripe()
        .retrieve_payment_intent(&params.payment_intent)
        .await
    {
        Ok(intent) if intent.is_succeeded() => PaymentOutcome::Authorized {
            reference: intent.id,
        },
        Ok(_) => PaymentOutcome::Declined {
            message: "Payment was not completed".to_string(),
        },
        Err(StripeError::Card { message }) => PaymentOutcome::Declined { message },
        Err(err) => PaymentOutcome::Failed {
            message: format!("Payment check failed: {err}"),
        },
    };

    // The flow stays on the payment stage until the order is placed, so a
    // failed placement can be retried.
    let PaymentOutcome::Authorized { reference } = outcome else {
        flow.record_payment(&outcome);
        save_flow(&session, &flow).await?;
        return Ok(Redirect::to("/checkout").into_response());
    };

    let token = backend_token(&session).await?;
    let placed = match state
        .woo()
        .checkout(
            token.as_deref(),
            CheckoutRequest {
                payment_method: PaymentMethod::HostedCard.gateway_code().to_string(),
                is_paid: true,
                transaction_id: Some(reference),
                billing,
            },
        )
        .await
    {
        Ok(placed) => placed,
        Err(err) => {
            warn!(error = %err, "Order placement failed after card capture");
            flow.record_payment(&order_failure(&err));
            save_flow(&session, &flow).await?;
            return Ok(Redirect::to("/checkout").into_response());
        }
    };

    store_rotated_token(&session, placed.session_token.clone()).await?;
    finish_order(&session, placed.value.order.as_ref()).await?;

    Ok(Redirect::to("/order-confirmation").into_response())
}

/// Display the order confirmation page.
#[instrument(skip(state, session))]
pub async fn confirmation(State(state): State<AppState>, session: Session) -> Result<Response> {
    let Some(order) = session
        .get::<OrderSummary>(session_keys::LAST_ORDER)
        .await
        .map_err(session_error)?
    else {
        return Ok(Redirect::to("/").into_response());
    };

    let symbol = &state.config().currency_symbol;
    Ok(OrderConfirmationTemplate {
        order_number: order
            .order_number
            .or(order.database_id.map(|id| id.to_string()))
            .unwrap_or_else(|| order.id.clone()),
        status: order.status.unwrap_or_default(),
        total: order
            .total
            .as_deref()
            .map(|t| padded_price(t, symbol))
            .unwrap_or_default(),
    }
    .into_response())
}

/// Fetch the authoritative cart total for display and charging.
async fn cart_total(state: &AppState, session: &Session) -> Result<String> {
    let token = backend_token(session).await?;
    let cart = state.woo().get_cart(token.as_deref()).await?;
    store_rotated_token(session, cart.session_token.clone()).await?;

    let symbol = &state.config().currency_symbol;
    Ok(cart
        .value
        .total
        .as_deref()
        .map(|t| padded_price(t, symbol))
        .unwrap_or_default())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::woo::GraphQLError;

    fn flow_at_payment() -> CheckoutFlow {
        let mut flow = CheckoutFlow::new();
        flow.submit_billing(&BillingForm {
            first_name: "Astrid".to_string(),
            last_name: "Berg".to_string(),
            address1: "12 Harbour Lane".to_string(),
            address2: String::new(),
            city: "Bergen".to_string(),
            postcode: "5003".to_string(),
            country: "NO".to_string(),
            email: "astrid@example.com".to_string(),
            phone: "+47 555 0100".to_string(),
        })
        .unwrap();
        flow
    }

    #[test]
    fn test_failed_order_keeps_flow_on_payment() {
        let mut flow = flow_at_payment();
        let err = WooError::GraphQL(vec![GraphQLError::message_only("Internal server error")]);
        flow.record_payment(&order_failure(&err));
        assert_eq!(flow.stage(), CheckoutStage::Payment);
        assert!(flow.ready_for_payment());
        assert!(flow.error().is_some());
    }

    #[test]
    fn test_rejected_order_surfaces_backend_message() {
        let err = WooError::UserError("Item is out of stock".to_string());
        assert_eq!(
            order_failure(&err),
            PaymentOutcome::Declined {
                message: "Item is out of stock".to_string(),
            }
        );
    }

    #[test]
    fn test_transport_failure_withholds_detail() {
        let err = WooError::NotFound("cart".to_string());
        let PaymentOutcome::Failed { message } = order_failure(&err) else {
            panic!("expected a failed outcome");
        };
        assert!(!message.contains("cart"));
    }
}
