//! Domain aggregates: the cart engine and the checkout flow.
//!
//! The cart is the one piece of process-wide mutable state; every surface
//! holds a handle to it and mutates only through its operations. The
//! checkout flow is ephemeral and discarded after submission.

pub mod cart;
pub mod checkout;
