//! Checkout Flow
//!
//! A linear four-step machine (Information → Shipping → Payment → Review)
//! holding its own ephemeral form data. It reads cart contents and totals
//! for display only; the single mutation it performs is clearing the cart
//! once an order is placed. Form fields are free text and never gate step
//! advancement; the only hard validations are the empty-cart entry guard
//! and the review-only submit.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use crate::config::Pricing;
use crate::domain::aggregates::cart::CartEngine;
use crate::domain::events::{CheckoutEvent, DomainEvent};
use crate::domain::value_objects::Money;
use crate::{Result, StorefrontError};

/// Simulated payment-processing latency.
pub const PROCESSING_DELAY: Duration = Duration::from_secs(2);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckoutStep {
    Information,
    Shipping,
    Payment,
    Review,
}

impl CheckoutStep {
    pub const ALL: [CheckoutStep; 4] =
        [Self::Information, Self::Shipping, Self::Payment, Self::Review];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Information => "Information",
            Self::Shipping => "Shipping",
            Self::Payment => "Payment",
            Self::Review => "Review",
        }
    }

    fn index(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(0)
    }
}

/// Visual state of one step in the progress indicator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepStatus {
    Completed,
    Active,
    Upcoming,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ShippingMethod {
    #[default]
    Standard,
    Express,
    Overnight,
}

impl ShippingMethod {
    pub const ALL: [ShippingMethod; 3] = [Self::Standard, Self::Express, Self::Overnight];

    /// Stable identifier, also what [`ShippingMethod::parse`] accepts.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Express => "express",
            Self::Overnight => "overnight",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Standard => "Standard Shipping",
            Self::Express => "Express Shipping",
            Self::Overnight => "Overnight Shipping",
        }
    }

    pub fn transit_time(&self) -> &'static str {
        match self {
            Self::Standard => "5-7 business days",
            Self::Express => "2-3 business days",
            Self::Overnight => "Next business day",
        }
    }

    /// Display quote for this method. Standard follows the free-shipping
    /// threshold; express and overnight are flat. Note that the cart
    /// engine's standard-based totals stay authoritative regardless of the
    /// method chosen here.
    pub fn quote(&self, subtotal: &Money, pricing: &Pricing) -> Money {
        match self {
            Self::Standard => {
                if subtotal.amount() >= pricing.free_shipping_threshold.amount() {
                    Money::usd(Decimal::ZERO)
                } else {
                    pricing.flat_shipping_rate.clone()
                }
            }
            Self::Express => Money::usd(Decimal::new(25, 0)),
            Self::Overnight => Money::usd(Decimal::new(45, 0)),
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "standard" => Some(Self::Standard),
            "express" => Some(Self::Express),
            "overnight" => Some(Self::Overnight),
            _ => None,
        }
    }
}

/// Flat contact / address / payment record. Ephemeral: discarded when the
/// flow is dropped, never persisted.
#[derive(Clone, Debug, Default)]
pub struct CheckoutForm {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub apartment: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub phone: String,
    pub shipping_method: ShippingMethod,
    pub card_number: String,
    pub card_name: String,
    pub card_expiry: String,
    pub card_cvc: String,
}

impl CheckoutForm {
    /// Masked card tail for the review step, `****` until one is entered.
    pub fn card_last4(&self) -> String {
        let digits: String = self.card_number.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() >= 4 {
            digits[digits.len() - 4..].to_string()
        } else {
            "****".to_string()
        }
    }
}

/// Confirmation handed to the success surface.
#[derive(Clone, Debug)]
pub struct OrderConfirmation {
    pub order_id: String,
    pub placed_at: DateTime<Utc>,
}

/// Per-process submission counter folded into the id suffix so two
/// submissions landing in the same millisecond still get distinct ids.
static ORDER_SEQ: AtomicU32 = AtomicU32::new(0);

impl OrderConfirmation {
    /// Ids are a base-36 millisecond timestamp plus an opaque suffix mixing
    /// a sequence number with random bits.
    fn generate() -> Self {
        let placed_at = Utc::now();
        let stamp = base36(placed_at.timestamp_millis().max(0) as u64);
        let seq = u64::from(ORDER_SEQ.fetch_add(1, Ordering::Relaxed));
        let suffix = base36((seq << 16) | u64::from(rand::random::<u16>()));
        Self { order_id: format!("MYNY-{stamp}-{suffix:0>4}"), placed_at }
    }
}

fn base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

pub struct CheckoutFlow {
    step: CheckoutStep,
    form: CheckoutForm,
    processing: bool,
    processing_delay: Duration,
    events: Vec<DomainEvent>,
}

impl CheckoutFlow {
    /// Entry guard: the flow is meaningless with nothing to purchase, so an
    /// empty cart refuses entry and the surface shows its empty-cart notice.
    pub fn begin(cart: &CartEngine) -> Result<Self> {
        if cart.is_empty() {
            return Err(StorefrontError::EmptyCart);
        }
        Ok(Self {
            step: CheckoutStep::Information,
            form: CheckoutForm::default(),
            processing: false,
            processing_delay: PROCESSING_DELAY,
            events: Vec::new(),
        })
    }

    /// Shortens the simulated processing delay, mainly for tests.
    pub fn with_processing_delay(mut self, delay: Duration) -> Self {
        self.processing_delay = delay;
        self
    }

    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    pub fn form(&self) -> &CheckoutForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut CheckoutForm {
        &mut self.form
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    /// Advances one step; stays put at Review. There is no direct jump.
    pub fn next(&mut self) {
        let index = self.step.index();
        if index + 1 < CheckoutStep::ALL.len() {
            self.step = CheckoutStep::ALL[index + 1];
            self.raise(CheckoutEvent::StepEntered { step: self.step });
        }
    }

    /// Retreats one step; stays put at Information.
    pub fn back(&mut self) {
        let index = self.step.index();
        if index > 0 {
            self.step = CheckoutStep::ALL[index - 1];
            self.raise(CheckoutEvent::StepEntered { step: self.step });
        }
    }

    /// Completed / active / upcoming state per step, in order, for the
    /// progress indicator.
    pub fn progress(&self) -> [(CheckoutStep, StepStatus); 4] {
        let current = self.step.index();
        CheckoutStep::ALL.map(|step| {
            let status = match step.index() {
                i if i < current => StepStatus::Completed,
                i if i == current => StepStatus::Active,
                _ => StepStatus::Upcoming,
            };
            (step, status)
        })
    }

    /// Places the order: review-only, latched against repeat submission,
    /// and suspended for the simulated processing delay before the effects
    /// apply. On resume it generates the confirmation and clears the cart
    /// exactly once. There is no decline path in this simulation.
    pub async fn submit_order(&mut self, cart: &mut CartEngine) -> Result<OrderConfirmation> {
        if self.step != CheckoutStep::Review {
            return Err(StorefrontError::NotAtReview);
        }
        if self.processing {
            return Err(StorefrontError::SubmissionInProgress);
        }
        self.processing = true;

        tokio::time::sleep(self.processing_delay).await;

        let confirmation = OrderConfirmation::generate();
        cart.clear();
        self.raise(CheckoutEvent::OrderPlaced { order_id: confirmation.order_id.clone() });
        tracing::info!(order_id = %confirmation.order_id, "order placed");
        Ok(confirmation)
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }

    fn raise(&mut self, event: CheckoutEvent) {
        self.events.push(DomainEvent::Checkout(event));
    }
}
