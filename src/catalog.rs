//! Static product catalog.
//!
//! Products are defined at load time and never mutated; everything else in
//! the crate treats this module as a read-only lookup. Optional merch fields
//! (`sizes`, `details`, `care`, ...) fall back to documented defaults rather
//! than being absent at the call site.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Money;

/// Size run used when a product does not declare its own.
pub const DEFAULT_SIZES: [&str; 4] = ["S", "M", "L", "XL"];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u32,
    pub name: String,
    pub price: Money,
    pub image: String,
    /// Additional gallery shots; may be empty.
    #[serde(default)]
    pub images: Vec<String>,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub details: Vec<String>,
    #[serde(default)]
    pub materials: Option<String>,
    #[serde(default)]
    pub care: Vec<String>,
    /// Declared size run; empty means the default S-XL run applies.
    #[serde(default)]
    pub sizes: Vec<String>,
    /// Limited-drop flag shown on the product card.
    #[serde(default)]
    pub limited: bool,
}

impl Product {
    /// The sizes offered for this product, falling back to [`DEFAULT_SIZES`].
    pub fn size_run(&self) -> Vec<String> {
        if self.sizes.is_empty() {
            DEFAULT_SIZES.iter().map(|s| s.to_string()).collect()
        } else {
            self.sizes.clone()
        }
    }

    pub fn has_size(&self, size: &str) -> bool {
        self.size_run().iter().any(|s| s == size)
    }
}

/// Read-only product index. Fully available synchronously; there is no
/// loading state to model.
#[derive(Clone, Debug)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    pub fn get(&self, id: u32) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Result-typed lookup for callers that treat a missing id as an error.
    pub fn require(&self, id: u32) -> crate::Result<&Product> {
        self.get(id).ok_or(crate::StorefrontError::ProductNotFound)
    }

    pub fn all(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// The current MYNY drop.
    pub fn seed() -> Self {
        Self::new(vec![
            Product {
                id: 1,
                name: "MNYB Signature Tee".to_string(),
                price: Money::usd(Decimal::new(45, 0)),
                image: "/shirt1.jpg".to_string(),
                images: vec!["/shirt1.jpg".to_string(), "/shirt1-back.jpg".to_string()],
                category: "T-Shirts".to_string(),
                description: Some("Heavyweight signature tee with the MNYB chest hit.".to_string()),
                details: vec![
                    "Boxy cut, drop shoulder".to_string(),
                    "Puff-print front graphic".to_string(),
                ],
                materials: Some("100% ring-spun cotton, 240 gsm".to_string()),
                care: vec!["Machine wash cold".to_string(), "Hang dry".to_string()],
                sizes: vec![],
                limited: false,
            },
            Product {
                id: 2,
                name: "Culture First Hoodie".to_string(),
                price: Money::usd(Decimal::new(85, 0)),
                image: "/shirt2.jpg".to_string(),
                images: vec![],
                category: "Hoodies".to_string(),
                description: Some("Oversized fleece hoodie, brushed inside.".to_string()),
                details: vec!["Kangaroo pocket".to_string(), "Double-lined hood".to_string()],
                materials: Some("80% cotton / 20% polyester fleece".to_string()),
                care: vec!["Machine wash cold".to_string()],
                sizes: vec![
                    "S".to_string(),
                    "M".to_string(),
                    "L".to_string(),
                    "XL".to_string(),
                    "XXL".to_string(),
                ],
                limited: true,
            },
            Product {
                id: 3,
                name: "Downtown Snapback".to_string(),
                price: Money::usd(Decimal::new(35, 0)),
                image: "/shirt3.jpg".to_string(),
                images: vec![],
                category: "Headwear".to_string(),
                description: None,
                details: vec![],
                materials: None,
                care: vec![],
                sizes: vec!["OS".to_string()],
                limited: false,
            },
            Product {
                id: 4,
                name: "Concrete Jungle LS".to_string(),
                price: Money::usd(Decimal::new(55, 0)),
                image: "/shirt1.jpg".to_string(),
                images: vec![],
                category: "T-Shirts".to_string(),
                description: Some("Long sleeve with sleeve prints down both arms.".to_string()),
                details: vec![],
                materials: Some("100% cotton".to_string()),
                care: vec![],
                sizes: vec![],
                limited: false,
            },
        ])
    }
}
