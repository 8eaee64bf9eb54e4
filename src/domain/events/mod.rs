//! Domain events
//!
//! Change feed raised by the cart engine and checkout flow. Presentation
//! surfaces drain these with `take_events` and re-render from current state;
//! derived figures are never carried in an event, only recomputed.

use crate::domain::value_objects::LineKey;

#[derive(Clone, Debug, PartialEq)]
pub enum DomainEvent {
    Cart(CartEvent),
    Checkout(CheckoutEvent),
}

#[derive(Clone, Debug, PartialEq)]
pub enum CartEvent {
    LineAdded { key: LineKey, quantity: u32 },
    QuantityChanged { key: LineKey, quantity: u32 },
    LineRemoved { key: LineKey },
    Cleared,
    /// Panel visibility changes; the surface holds its scroll lock while the
    /// panel is open and releases it on `Closed`.
    Opened,
    Closed,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CheckoutEvent {
    StepEntered { step: crate::domain::aggregates::checkout::CheckoutStep },
    OrderPlaced { order_id: String },
}
