//! Checkout flow state machine.
//!
//! Checkout moves through three stages: billing, payment, completed. The
//! flow lives in the shopper's session; every transition is validated here
//! so handlers cannot skip a stage (paying without a billing address, or
//! confirming an order that was never authorized).

use serde::{Deserialize, Serialize};

use crate::woo::types::BillingFields;

/// Where the shopper is in the checkout flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CheckoutStage {
    #[default]
    Billing,
    Payment,
    Completed,
}

/// How the shopper pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Pay on delivery; the order is placed unpaid.
    CashOnDelivery,
    /// Card payment captured by the hosted payment processor before the
    /// order is placed.
    HostedCard,
}

impl PaymentMethod {
    /// Parse the form value submitted from the payment step.
    #[must_use]
    pub fn from_form_value(value: &str) -> Option<Self> {
        match value {
            "cod" => Some(Self::CashOnDelivery),
            "card" => Some(Self::HostedCard),
            _ => None,
        }
    }

    /// Gateway code the order backend expects.
    #[must_use]
    pub const fn gateway_code(self) -> &'static str {
        match self {
            Self::CashOnDelivery => "cod",
            Self::HostedCard => "stripe",
        }
    }
}

/// Result of a payment attempt, tagged by what actually happened.
///
/// Only [`PaymentOutcome::Authorized`] may advance the flow; a decline and a
/// processing failure both keep the shopper on the payment step but are
/// reported differently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// Payment captured; `reference` is the processor's transaction id.
    Authorized { reference: String },
    /// The processor rejected the card.
    Declined { message: String },
    /// The attempt failed before a decision was made (network, config).
    Failed { message: String },
}

/// One rejected billing field with a shopper-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Raw billing form input, straight from the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BillingForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub address1: String,
    #[serde(default)]
    pub address2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postcode: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl BillingForm {
    /// Validate into clean billing fields, reporting every failing field.
    ///
    /// # Errors
    ///
    /// Returns one [`FieldError`] per rejected field.
    pub fn validate(&self) -> Result<BillingFields, Vec<FieldError>> {
        let mut errors = Vec::new();

        let required = [
            ("first_name", &self.first_name, "First name is required"),
            ("last_name", &self.last_name, "Last name is required"),
            ("address1", &self.address1, "Street address is required"),
            ("city", &self.city, "City is required"),
            ("postcode", &self.postcode, "Postcode is required"),
            ("country", &self.country, "Country is required"),
            ("phone", &self.phone, "Phone number is required"),
        ];
        for (field, value, message) in required {
            if value.trim().is_empty() {
                errors.push(FieldError {
                    field,
                    message: message.to_string(),
                });
            }
        }

        let email = self.email.trim();
        if email.is_empty() {
            errors.push(FieldError {
                field: "email",
                message: "Email is required".to_string(),
            });
        } else if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
            errors.push(FieldError {
                field: "email",
                message: "Email address looks invalid".to_string(),
            });
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let address2 = self.address2.trim();
        Ok(BillingFields {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            address1: self.address1.trim().to_string(),
            address2: if address2.is_empty() {
                None
            } else {
                Some(address2.to_string())
            },
            city: self.city.trim().to_string(),
            postcode: self.postcode.trim().to_string(),
            country: self.country.trim().to_string(),
            email: email.to_string(),
            phone: self.phone.trim().to_string(),
        })
    }
}

/// Session-held checkout flow state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutFlow {
    stage: CheckoutStage,
    billing: Option<BillingFields>,
    /// Shopper-facing message from the last payment attempt that did not
    /// authorize.
    error: Option<String>,
}

impl CheckoutFlow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn stage(&self) -> CheckoutStage {
        self.stage
    }

    /// Billing details, available once the billing step has passed.
    #[must_use]
    pub fn billing(&self) -> Option<&BillingFields> {
        self.billing.as_ref()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Submit the billing step. On success the flow advances to payment; on
    /// validation failure it stays on billing.
    ///
    /// # Errors
    ///
    /// Returns the failing fields from [`BillingForm::validate`].
    pub fn submit_billing(&mut self, form: &BillingForm) -> Result<(), Vec<FieldError>> {
        let billing = form.validate()?;
        self.billing = Some(billing);
        self.stage = CheckoutStage::Payment;
        self.error = None;
        Ok(())
    }

    /// Whether the flow is ready to take a payment.
    #[must_use]
    pub fn ready_for_payment(&self) -> bool {
        self.stage == CheckoutStage::Payment && self.billing.is_some()
    }

    /// Record a payment attempt. Authorization completes the flow; anything
    /// else keeps the payment stage and stores a shopper-facing message.
    pub fn record_payment(&mut self, outcome: &PaymentOutcome) {
        match outcome {
            PaymentOutcome::Authorized { .. } => {
                self.stage = CheckoutStage::Completed;
                self.error = None;
            }
            PaymentOutcome::Declined { message } | PaymentOutcome::Failed { message } => {
                self.error = Some(message.clone());
            }
        }
    }

    /// Mark the flow completed without a card payment (cash on delivery).
    /// Has no effect unless the flow is on the payment stage.
    pub fn complete_unpaid(&mut self) {
        if self.ready_for_payment() {
            self.stage = CheckoutStage::Completed;
            self.error = None;
        }
    }

    /// Drop back to the billing step, keeping entered details for editing.
    pub fn edit_billing(&mut self) {
        if self.stage == CheckoutStage::Payment {
            self.stage = CheckoutStage::Billing;
            self.error = None;
        }
    }
}
