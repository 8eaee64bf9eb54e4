//! MYNY Storefront Core
//!
//! Client-side storefront engine for the MYNY streetwear label.
//!
//! ## Features
//! - Static product catalog with size runs and drop metadata
//! - Persistent shopping cart with line-key deduplication
//! - Derived pricing (subtotal, shipping, free-shipping progress)
//! - Linear four-step checkout flow with simulated payment submission
//!
//! There is no backend: the cart persists to a local JSON record and order
//! submission is an artificial delay followed by a generated confirmation.

use thiserror::Error;

pub mod catalog;
pub mod config;
pub mod domain;
pub mod storage;

pub use catalog::{Catalog, Product};
pub use config::{Config, Pricing};
pub use domain::aggregates::cart::{CartEngine, CartLine};
pub use domain::aggregates::checkout::{
    CheckoutFlow, CheckoutForm, CheckoutStep, OrderConfirmation, ShippingMethod, StepStatus,
};
pub use domain::value_objects::{LineKey, Money};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Product not found")]
    ProductNotFound,

    #[error("A size must be selected")]
    SizeRequired,

    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Orders can only be placed from the review step")]
    NotAtReview,

    #[error("An order submission is already in progress")]
    SubmissionInProgress,

    #[error("Cart storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
