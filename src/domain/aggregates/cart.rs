//! Cart Engine
//!
//! The one piece of process-wide mutable state: the ordered line list, the
//! panel visibility flag, and write-through persistence. All pricing figures
//! are derived from the line list on every read and never stored, so they
//! cannot drift from it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::config::Pricing;
use crate::domain::events::{CartEvent, DomainEvent};
use crate::domain::value_objects::{LineKey, Money};
use crate::storage::CartStore;
use crate::{Result, StorefrontError};

/// One distinct (product, size) pairing in the cart: a snapshot of the
/// product at add time plus the selected size and quantity. Identity is the
/// [`LineKey`]; at most one line exists per key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(flatten)]
    pub product: Product,
    pub selected_size: String,
    pub quantity: u32,
    pub line_key: LineKey,
}

impl CartLine {
    pub fn line_total(&self) -> Money {
        self.product.price.multiply(self.quantity)
    }
}

pub struct CartEngine {
    lines: Vec<CartLine>,
    is_open: bool,
    pricing: Pricing,
    store: Box<dyn CartStore>,
    events: Vec<DomainEvent>,
}

impl CartEngine {
    /// Builds the engine, replaying the persisted line list before anything
    /// can observe the cart. A malformed record is discarded with a warning
    /// and the session starts empty; it is never surfaced to the user.
    pub fn new(pricing: Pricing, store: Box<dyn CartStore>) -> Self {
        let lines = match store.load() {
            Ok(lines) => lines,
            Err(e) => {
                tracing::warn!("discarding unreadable cart record: {e}");
                Vec::new()
            }
        };
        Self { lines, is_open: false, pricing, store, events: Vec::new() }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn pricing(&self) -> &Pricing {
        &self.pricing
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Adds `quantity` of a product in the chosen size. Lines are deduped by
    /// key alone: an existing line has its quantity bumped, otherwise a new
    /// line is appended (insertion order drives display order everywhere).
    /// Size membership is the caller's concern; any string is accepted here.
    /// Adding always pops the cart panel open.
    pub fn add(&mut self, product: &Product, size: &str, quantity: u32) -> Result<()> {
        if quantity < 1 {
            return Err(StorefrontError::InvalidQuantity);
        }
        let key = LineKey::new(product.id, size);
        if let Some(existing) = self.lines.iter_mut().find(|l| l.line_key == key) {
            // Repeated adds have no upper bound, so pin at u32::MAX rather
            // than wrapping.
            existing.quantity = existing.quantity.saturating_add(quantity);
            let quantity = existing.quantity;
            self.raise(CartEvent::QuantityChanged { key, quantity });
        } else {
            self.lines.push(CartLine {
                product: product.clone(),
                selected_size: size.to_string(),
                quantity,
                line_key: key.clone(),
            });
            self.raise(CartEvent::LineAdded { key, quantity });
        }
        if !self.is_open {
            self.is_open = true;
            self.raise(CartEvent::Opened);
        }
        self.persist();
        Ok(())
    }

    /// Removes the line with that key; a no-op when the key is absent.
    pub fn remove(&mut self, key: &LineKey) {
        let before = self.lines.len();
        self.lines.retain(|l| &l.line_key != key);
        if self.lines.len() != before {
            self.raise(CartEvent::LineRemoved { key: key.clone() });
            self.persist();
        }
    }

    /// Sets the quantity on the matching line. Anything below 1 removes the
    /// line entirely; an unknown key leaves the cart untouched.
    pub fn set_quantity(&mut self, key: &LineKey, quantity: i64) {
        if quantity < 1 {
            self.remove(key);
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| &l.line_key == key) {
            // Values past u32::MAX clamp instead of truncating; a line's
            // quantity never silently drops back to zero.
            line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
            let quantity = line.quantity;
            self.raise(CartEvent::QuantityChanged { key: key.clone(), quantity });
            self.persist();
        }
    }

    /// Empties the line list without touching panel visibility. Clearing an
    /// already-empty cart is a safe no-op, so a reloaded confirmation page
    /// cannot clear twice.
    pub fn clear(&mut self) {
        if self.lines.is_empty() {
            return;
        }
        self.lines.clear();
        self.raise(CartEvent::Cleared);
        self.persist();
    }

    pub fn open(&mut self) {
        if !self.is_open {
            self.is_open = true;
            self.raise(CartEvent::Opened);
        }
    }

    pub fn close(&mut self) {
        if self.is_open {
            self.is_open = false;
            self.raise(CartEvent::Closed);
        }
    }

    pub fn toggle(&mut self) {
        if self.is_open {
            self.close();
        } else {
            self.open();
        }
    }

    // -------------------------------------------------------------------------
    // Derived pricing
    // -------------------------------------------------------------------------

    pub fn total_items(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn subtotal(&self) -> Money {
        self.lines
            .iter()
            .fold(Money::usd(Decimal::ZERO), |acc, l| acc.add(&l.line_total()).unwrap_or(acc))
    }

    /// Standard shipping: free at or above the threshold, the flat rate
    /// below it, never a partial value.
    pub fn shipping_fee(&self) -> Money {
        if self.subtotal().amount() >= self.pricing.free_shipping_threshold.amount() {
            Money::usd(Decimal::ZERO)
        } else {
            self.pricing.flat_shipping_rate.clone()
        }
    }

    pub fn total(&self) -> Money {
        let subtotal = self.subtotal();
        subtotal.add(&self.shipping_fee()).unwrap_or(subtotal)
    }

    /// Progress toward free shipping, capped at 100.
    pub fn free_shipping_progress(&self) -> Decimal {
        let threshold = self.pricing.free_shipping_threshold.amount();
        if threshold <= Decimal::ZERO {
            return Decimal::new(100, 0);
        }
        let pct = self.subtotal().amount() / threshold * Decimal::new(100, 0);
        pct.min(Decimal::new(100, 0))
    }

    /// How much more spend unlocks free shipping; zero once unlocked.
    pub fn amount_until_free_shipping(&self) -> Money {
        let remaining = self.pricing.free_shipping_threshold.amount() - self.subtotal().amount();
        Money::usd(remaining.max(Decimal::ZERO))
    }

    /// Drains events raised since the last call, oldest first.
    pub fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }

    fn raise(&mut self, event: CartEvent) {
        self.events.push(DomainEvent::Cart(event));
    }

    /// Write-through of the full line list. A failed write degrades the
    /// session to memory-only rather than propagating.
    fn persist(&self) {
        if let Err(e) = self.store.save(&self.lines) {
            tracing::warn!("cart persistence failed, continuing in memory: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::storage::{JsonFileStore, MemoryStore};

    fn engine() -> CartEngine {
        CartEngine::new(Pricing::default(), Box::new(MemoryStore::new()))
    }

    fn product(id: u32, price_cents: i64) -> Product {
        Product {
            id,
            name: format!("Item {id}"),
            price: Money::usd(Decimal::new(price_cents, 2)),
            image: "/item.jpg".to_string(),
            images: vec![],
            category: "T-Shirts".to_string(),
            description: None,
            details: vec![],
            materials: None,
            care: vec![],
            sizes: vec![],
            limited: false,
        }
    }

    #[test]
    fn test_add_dedups_by_line_key() {
        let mut cart = engine();
        let tee = product(1, 4500);
        cart.add(&tee, "M", 1).unwrap();
        cart.add(&tee, "M", 1).unwrap();
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 2);

        // Same product, different size: a second distinct line.
        cart.add(&tee, "L", 1).unwrap();
        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.total_items(), 3);
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut cart = engine();
        cart.add(&product(2, 8500), "L", 1).unwrap();
        cart.add(&product(1, 4500), "M", 2).unwrap();
        cart.add(&product(2, 8500), "L", 1).unwrap();
        let keys: Vec<_> = cart.lines().iter().map(|l| l.line_key.as_str().to_string()).collect();
        assert_eq!(keys, vec!["2-L", "1-M"]);
    }

    #[test]
    fn test_add_rejects_zero_quantity() {
        let mut cart = engine();
        assert!(matches!(
            cart.add(&product(1, 4500), "M", 0),
            Err(StorefrontError::InvalidQuantity)
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_opens_panel() {
        let mut cart = engine();
        assert!(!cart.is_open());
        cart.add(&product(1, 4500), "M", 1).unwrap();
        assert!(cart.is_open());
    }

    #[test]
    fn test_shipping_fee_boundary() {
        let mut cart = engine();
        cart.add(&product(1, 24999), "M", 1).unwrap();
        assert_eq!(cart.subtotal().amount(), Decimal::new(24999, 2));
        assert_eq!(cart.shipping_fee().amount(), Decimal::new(15, 0));
        assert_eq!(cart.total().amount(), Decimal::new(26499, 2));

        let mut cart = engine();
        cart.add(&product(2, 25000), "M", 1).unwrap();
        assert_eq!(cart.shipping_fee().amount(), Decimal::ZERO);
        assert_eq!(cart.total().amount(), Decimal::new(250, 0));
    }

    #[test]
    fn test_derived_totals_stay_consistent() {
        let mut cart = engine();
        cart.add(&product(1, 4500), "M", 2).unwrap();
        cart.add(&product(2, 8500), "L", 1).unwrap();
        cart.set_quantity(&LineKey::new(1, "M"), 5);
        cart.remove(&LineKey::new(2, "L"));
        let expected = cart.subtotal().add(&cart.shipping_fee()).unwrap();
        assert_eq!(cart.total(), expected);
        let fee = cart.shipping_fee().amount();
        assert!(fee == Decimal::ZERO || fee == Decimal::new(15, 0));
    }

    #[test]
    fn test_free_shipping_progress() {
        let mut cart = engine();
        cart.add(&product(1, 12500), "M", 1).unwrap();
        assert_eq!(cart.free_shipping_progress(), Decimal::new(50, 0));
        assert_eq!(cart.amount_until_free_shipping().amount(), Decimal::new(125, 0));
        cart.add(&product(2, 50000), "L", 1).unwrap();
        assert_eq!(cart.free_shipping_progress(), Decimal::new(100, 0));
        assert!(cart.amount_until_free_shipping().is_zero());
    }

    #[test]
    fn test_quantity_below_one_removes_line() {
        let mut cart = engine();
        let key = LineKey::new(1, "M");
        cart.add(&product(1, 4500), "M", 2).unwrap();
        cart.set_quantity(&key, 0);
        assert!(cart.is_empty());

        cart.add(&product(1, 4500), "M", 2).unwrap();
        cart.set_quantity(&key, -5);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_oversized_quantity_clamps_instead_of_truncating() {
        let mut cart = engine();
        let key = LineKey::new(1, "M");
        cart.add(&product(1, 4500), "M", 2).unwrap();
        cart.set_quantity(&key, u32::MAX as i64 + 1);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, u32::MAX);
    }

    #[test]
    fn test_repeated_adds_saturate_at_max_quantity() {
        let mut cart = engine();
        let tee = product(1, 4500);
        cart.add(&tee, "M", u32::MAX).unwrap();
        cart.add(&tee, "M", 5).unwrap();
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, u32::MAX);
    }

    #[test]
    fn test_unknown_key_is_a_no_op() {
        let mut cart = engine();
        cart.add(&product(1, 4500), "M", 2).unwrap();
        cart.set_quantity(&LineKey::raw("99-XS"), 3);
        cart.remove(&LineKey::raw("99-XS"));
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 2);
    }

    #[test]
    fn test_clear_is_idempotent_and_keeps_panel_state() {
        let mut cart = engine();
        cart.add(&product(1, 4500), "M", 1).unwrap();
        cart.clear();
        assert!(cart.is_empty());
        assert!(cart.is_open());
        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_toggle_round_trip() {
        let mut cart = engine();
        cart.toggle();
        assert!(cart.is_open());
        cart.toggle();
        assert!(!cart.is_open());
    }

    #[test]
    fn test_persistence_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("myny-cart.json");

        let mut cart =
            CartEngine::new(Pricing::default(), Box::new(JsonFileStore::new(path.clone())));
        cart.add(&product(1, 4500), "M", 2).unwrap();
        cart.add(&product(2, 8500), "XL", 1).unwrap();

        // A fresh engine over the same record sees the same lines, in order,
        // with the panel reset to closed.
        let reloaded = CartEngine::new(Pricing::default(), Box::new(JsonFileStore::new(path)));
        assert_eq!(reloaded.lines(), cart.lines());
        assert!(!reloaded.is_open());
        assert_eq!(reloaded.total_items(), 3);
    }

    #[test]
    fn test_malformed_record_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("myny-cart.json");
        std::fs::write(&path, "][ definitely not json").unwrap();
        let cart = CartEngine::new(Pricing::default(), Box::new(JsonFileStore::new(path)));
        assert!(cart.is_empty());
    }

    struct BrokenStore;
    impl CartStore for BrokenStore {
        fn load(&self) -> crate::Result<Vec<CartLine>> {
            Ok(Vec::new())
        }
        fn save(&self, _lines: &[CartLine]) -> crate::Result<()> {
            Err(StorefrontError::Storage("quota exceeded".to_string()))
        }
    }

    #[test]
    fn test_failed_writes_degrade_to_memory_only() {
        let mut cart = CartEngine::new(Pricing::default(), Box::new(BrokenStore));
        cart.add(&product(1, 4500), "M", 1).unwrap();
        cart.set_quantity(&LineKey::new(1, "M"), 4);
        assert_eq!(cart.total_items(), 4);
    }

    #[test]
    fn test_events_report_mutations_in_order() {
        let mut cart = engine();
        let tee = Catalog::seed().get(1).unwrap().clone();
        cart.add(&tee, "M", 1).unwrap();
        cart.add(&tee, "M", 2).unwrap();
        cart.remove(&LineKey::new(1, "M"));
        let events = cart.take_events();
        assert_eq!(
            events,
            vec![
                DomainEvent::Cart(CartEvent::LineAdded { key: LineKey::new(1, "M"), quantity: 1 }),
                DomainEvent::Cart(CartEvent::Opened),
                DomainEvent::Cart(CartEvent::QuantityChanged {
                    key: LineKey::new(1, "M"),
                    quantity: 3
                }),
                DomainEvent::Cart(CartEvent::LineRemoved { key: LineKey::new(1, "M") }),
            ]
        );
        assert!(cart.take_events().is_empty());
    }
}
