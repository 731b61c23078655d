//! Gift catalog - read-only definitions referenced by transactions.
//!
//! A gift-send references exactly one definition and a quantity >= 1; the
//! catalog resolves the total diamond cost before the coordinator runs.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::GiftError;

/// Catalog category of a gift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GiftCategory {
    Small,
    Medium,
    Car,
    SuperGift,
    EntryEffect,
}

/// Special room-entry effect triggered by owning certain gifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryEffect {
    Car,
    Plane,
    Frame,
}

/// Catalog entry, read-only during a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiftDefinition {
    pub name: String,
    /// Per-unit cost in diamonds, always >= 1.
    pub diamond_cost: u64,
    pub category: GiftCategory,
    /// Super gifts always trigger the global announcement, regardless of
    /// the cost threshold.
    #[serde(default)]
    pub is_super_gift: bool,
    #[serde(default)]
    pub entry_effect: Option<EntryEffect>,
}

impl GiftDefinition {
    pub fn new(name: impl Into<String>, diamond_cost: u64, category: GiftCategory) -> Self {
        Self {
            name: name.into(),
            diamond_cost,
            category,
            is_super_gift: matches!(category, GiftCategory::SuperGift),
            entry_effect: None,
        }
    }

    pub fn with_entry_effect(mut self, effect: EntryEffect) -> Self {
        self.entry_effect = Some(effect);
        self
    }
}

/// Built-in catalog seed.
static DEFAULT_GIFTS: Lazy<Vec<GiftDefinition>> = Lazy::new(|| {
    vec![
        GiftDefinition::new("Rose", 10, GiftCategory::Small),
        GiftDefinition::new("Teddy Bear", 50, GiftCategory::Small),
        GiftDefinition::new("Perfume", 200, GiftCategory::Medium),
        GiftDefinition::new("Sports Car", 1000, GiftCategory::Car)
            .with_entry_effect(EntryEffect::Car),
        GiftDefinition::new("Private Jet", 5000, GiftCategory::SuperGift)
            .with_entry_effect(EntryEffect::Plane),
        GiftDefinition::new("Castle", 20000, GiftCategory::SuperGift),
    ]
});

/// Name-keyed gift catalog.
pub struct GiftCatalog {
    gifts: FxHashMap<String, GiftDefinition>,
}

impl GiftCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self {
            gifts: FxHashMap::default(),
        }
    }

    /// Catalog pre-loaded with the built-in gift set.
    pub fn with_defaults() -> Self {
        let mut catalog = Self::new();
        for gift in DEFAULT_GIFTS.iter() {
            catalog.insert(gift.clone());
        }
        catalog
    }

    /// Insert or replace a definition, keyed by name.
    pub fn insert(&mut self, gift: GiftDefinition) {
        self.gifts.insert(gift.name.clone(), gift);
    }

    pub fn get(&self, name: &str) -> Option<&GiftDefinition> {
        self.gifts.get(name)
    }

    pub fn len(&self) -> usize {
        self.gifts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gifts.is_empty()
    }

    /// Resolve the total diamond cost of `quantity` units of a named gift.
    ///
    /// # Errors
    /// - `UnknownGift` if the name is not in the catalog
    /// - `InvalidQuantity` for quantity 0
    /// - `InvalidAmount` if the multiplication overflows
    pub fn resolve_cost(&self, name: &str, quantity: u64) -> Result<u64, GiftError> {
        if quantity == 0 {
            return Err(GiftError::InvalidQuantity);
        }
        let gift = self
            .gifts
            .get(name)
            .ok_or_else(|| GiftError::UnknownGift(name.to_string()))?;
        gift.diamond_cost
            .checked_mul(quantity)
            .ok_or(GiftError::InvalidAmount)
    }
}

impl Default for GiftCatalog {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_contents() {
        let catalog = GiftCatalog::with_defaults();
        assert!(!catalog.is_empty());
        let rose = catalog.get("Rose").unwrap();
        assert_eq!(rose.diamond_cost, 10);
        assert!(!rose.is_super_gift);

        let jet = catalog.get("Private Jet").unwrap();
        assert!(jet.is_super_gift);
        assert_eq!(jet.entry_effect, Some(EntryEffect::Plane));
    }

    #[test]
    fn test_resolve_cost() {
        let catalog = GiftCatalog::with_defaults();
        assert_eq!(catalog.resolve_cost("Rose", 3).unwrap(), 30);
        assert!(matches!(
            catalog.resolve_cost("Rose", 0),
            Err(GiftError::InvalidQuantity)
        ));
        assert!(matches!(
            catalog.resolve_cost("Nope", 1),
            Err(GiftError::UnknownGift(_))
        ));
    }

    #[test]
    fn test_resolve_cost_overflow() {
        let mut catalog = GiftCatalog::new();
        catalog.insert(GiftDefinition::new("Galaxy", u64::MAX / 2, GiftCategory::SuperGift));
        assert!(matches!(
            catalog.resolve_cost("Galaxy", 3),
            Err(GiftError::InvalidAmount)
        ));
    }
}
