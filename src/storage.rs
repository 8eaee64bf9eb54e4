//! Cart persistence.
//!
//! The durable record is one JSON document holding the serialized line list
//! under a fixed namespaced filename. There is no versioning or migration:
//! a schema change needs a compatible reader or a reset, and an unreadable
//! record is reported as an error for the engine to discard.

use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;

use crate::domain::aggregates::cart::CartLine;
use crate::{Result, StorefrontError};

/// Fixed name of the durable cart record.
pub const CART_STORE_FILE: &str = "myny-cart.json";

/// Load-once / write-through persistence seam for the cart engine.
///
/// `load` runs exactly once, at engine construction; `save` runs after every
/// mutation of the line list and receives the full list each time.
pub trait CartStore {
    fn load(&self) -> Result<Vec<CartLine>>;
    fn save(&self, lines: &[CartLine]) -> Result<()>;
}

/// JSON-file-backed store, the local-storage analog.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl CartStore for JsonFileStore {
    fn load(&self) -> Result<Vec<CartLine>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path)
            .map_err(|e| StorefrontError::Storage(e.to_string()))?;
        serde_json::from_str(&raw).map_err(|e| StorefrontError::Storage(e.to_string()))
    }

    fn save(&self, lines: &[CartLine]) -> Result<()> {
        let raw = serde_json::to_string(lines)
            .map_err(|e| StorefrontError::Storage(e.to_string()))?;
        fs::write(&self.path, raw).map_err(|e| StorefrontError::Storage(e.to_string()))
    }
}

/// In-memory store for tests and memory-only sessions.
///
/// `RefCell` is enough here: the engine model is single-threaded and there is
/// only ever one active writer.
#[derive(Debug, Default)]
pub struct MemoryStore {
    lines: RefCell<Vec<CartLine>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lines(lines: Vec<CartLine>) -> Self {
        Self { lines: RefCell::new(lines) }
    }
}

impl CartStore for MemoryStore {
    fn load(&self) -> Result<Vec<CartLine>> {
        Ok(self.lines.borrow().clone())
    }

    fn save(&self, lines: &[CartLine]) -> Result<()> {
        *self.lines.borrow_mut() = lines.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::domain::value_objects::LineKey;

    fn line(product_id: u32, size: &str, quantity: u32) -> CartLine {
        let catalog = Catalog::seed();
        let product = catalog.get(product_id).unwrap().clone();
        CartLine {
            line_key: LineKey::new(product.id, size),
            selected_size: size.to_string(),
            quantity,
            product,
        }
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("myny-cart.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_round_trip_preserves_lines_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("myny-cart.json"));
        let lines = vec![line(2, "L", 1), line(1, "M", 3)];
        store.save(&lines).unwrap();

        let reloaded = store.load().unwrap();
        assert_eq!(reloaded, lines);
        assert_eq!(reloaded[0].line_key, LineKey::new(2, "L"));
        assert_eq!(reloaded[1].quantity, 3);
    }

    #[test]
    fn test_corrupt_record_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("myny-cart.json");
        fs::write(&path, "{not json").unwrap();
        let store = JsonFileStore::new(path);
        assert!(matches!(store.load(), Err(StorefrontError::Storage(_))));
    }
}
