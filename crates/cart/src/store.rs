//! The cart store: authoritative line items plus their persisted form.
//!
//! Lines are kept in insertion order, which is also display order. Titles are
//! unique within a cart and no line ever holds zero units.

use std::collections::HashSet;

use panier_core::{CurrencyCode, LineId, Price, Quantity};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{CartError, Result};
use crate::storage::{Storage, StorageError};

/// Storage key the cart is persisted under.
pub const CART_STORAGE_KEY: &str = "cart";

/// One product entry in the cart.
#[derive(Debug, Clone)]
pub struct LineItem {
    id: LineId,
    title: String,
    price_text: String,
    image_url: String,
    quantity: Quantity,
}

impl LineItem {
    fn new(title: String, price_text: String, image_url: String, quantity: Quantity) -> Self {
        Self {
            id: LineId::generate(),
            title,
            price_text,
            image_url,
            quantity,
        }
    }

    /// Session-local stable identifier.
    #[must_use]
    pub const fn id(&self) -> LineId {
        self.id
    }

    /// Product title; unique within the cart.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Unit price as displayed in the catalog (e.g. `"12,50 €"`).
    #[must_use]
    pub fn price_text(&self) -> &str {
        &self.price_text
    }

    /// Product image URL.
    #[must_use]
    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    /// Units on this line.
    #[must_use]
    pub const fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// Parsed unit price.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Price`] if the price text does not parse.
    pub fn unit_price(&self, currency: CurrencyCode) -> Result<Price> {
        Price::parse(&self.price_text, currency).map_err(|source| CartError::Price {
            title: self.title.clone(),
            source,
        })
    }

    /// Unit price times quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Price`] if the price text does not parse or the
    /// product overflows.
    pub fn line_total(&self, currency: CurrencyCode) -> Result<Price> {
        self.unit_price(currency)?
            .times(self.quantity.get())
            .map_err(|source| CartError::Price {
                title: self.title.clone(),
                source,
            })
    }
}

/// Persisted shape of a line: `{ "title", "price", "image", "quantity" }`.
///
/// Line IDs are session-local and never written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StoredLine {
    title: String,
    price: String,
    image: String,
    quantity: Quantity,
}

impl From<&LineItem> for StoredLine {
    fn from(line: &LineItem) -> Self {
        Self {
            title: line.title.clone(),
            price: line.price_text.clone(),
            image: line.image_url.clone(),
            quantity: line.quantity,
        }
    }
}

impl From<StoredLine> for LineItem {
    fn from(stored: StoredLine) -> Self {
        Self::new(stored.title, stored.price, stored.image, stored.quantity)
    }
}

/// Owns the cart's lines and the storage they are persisted to.
///
/// Mutations are in-memory only; call [`CartStore::persist`] afterwards (the
/// [`crate::CartController`] does this after every mutating intent).
#[derive(Debug)]
pub struct CartStore<S> {
    lines: Vec<LineItem>,
    storage: S,
    key: String,
    currency: CurrencyCode,
}

impl<S: Storage> CartStore<S> {
    /// Create an empty cart persisted under [`CART_STORAGE_KEY`] with EUR prices.
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self {
            lines: Vec::new(),
            storage,
            key: CART_STORAGE_KEY.to_owned(),
            currency: CurrencyCode::default(),
        }
    }

    /// Use a different storage key.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Use a different currency for price parsing and totals.
    #[must_use]
    pub fn with_currency(mut self, currency: CurrencyCode) -> Self {
        self.currency = currency;
        self
    }

    /// Storage key in use.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Currency in use.
    #[must_use]
    pub const fn currency(&self) -> CurrencyCode {
        self.currency
    }

    /// Lines in display order.
    #[must_use]
    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    /// Number of lines (not units).
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Line at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&LineItem> {
        self.lines.get(index)
    }

    /// Current position of the line with `id`.
    #[must_use]
    pub fn position(&self, id: LineId) -> Option<usize> {
        self.lines.iter().position(|line| line.id == id)
    }

    /// Line with `id`, if still in the cart.
    #[must_use]
    pub fn find(&self, id: LineId) -> Option<&LineItem> {
        self.lines.iter().find(|line| line.id == id)
    }

    /// Storage collaborator.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Mutable storage collaborator.
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Add one unit of a product.
    ///
    /// An existing line with the same title gains one unit; otherwise a new
    /// line with quantity 1 is appended. Always succeeds. Returns the line's ID.
    pub fn add(
        &mut self,
        title: impl Into<String>,
        price_text: impl Into<String>,
        image_url: impl Into<String>,
    ) -> LineId {
        let title = title.into();

        if let Some(line) = self.lines.iter_mut().find(|line| line.title == title) {
            line.quantity = line.quantity.increment();
            debug!(title = %line.title, quantity = %line.quantity, "Incremented existing line");
            return line.id;
        }

        let line = LineItem::new(title, price_text.into(), image_url.into(), Quantity::ONE);
        let id = line.id;
        debug!(title = %line.title, line_id = %id, "Appended new line");
        self.lines.push(line);
        id
    }

    /// Add one unit to the line at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::IndexOutOfRange`] if there is no such line.
    pub fn increment_quantity(&mut self, index: usize) -> Result<Quantity> {
        let line = self.line_mut(index)?;
        line.quantity = line.quantity.increment();
        debug!(index, title = %line.title, quantity = %line.quantity, "Incremented line");
        Ok(line.quantity)
    }

    /// Remove one unit from the line at `index`.
    ///
    /// The last unit removes the line, shifting later lines left; in that
    /// case `Ok(None)` is returned and previously held indices are stale.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::IndexOutOfRange`] if there is no such line.
    pub fn decrement_quantity(&mut self, index: usize) -> Result<Option<Quantity>> {
        let line = self.line_mut(index)?;
        if let Some(quantity) = line.quantity.decrement() {
            line.quantity = quantity;
            debug!(index, title = %line.title, quantity = %quantity, "Decremented line");
            return Ok(Some(quantity));
        }

        let removed = self.lines.remove(index);
        debug!(index, title = %removed.title, "Removed line on last unit");
        Ok(None)
    }

    /// Remove the line at `index` regardless of quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::IndexOutOfRange`] if there is no such line.
    pub fn remove_item(&mut self, index: usize) -> Result<LineItem> {
        self.check_index(index)?;
        let removed = self.lines.remove(index);
        debug!(index, title = %removed.title, "Removed line");
        Ok(removed)
    }

    /// [`CartStore::increment_quantity`] addressed by line ID.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::UnknownLine`] if the line is gone.
    pub fn increment(&mut self, id: LineId) -> Result<Quantity> {
        let index = self.resolve(id)?;
        self.increment_quantity(index)
    }

    /// [`CartStore::decrement_quantity`] addressed by line ID.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::UnknownLine`] if the line is gone.
    pub fn decrement(&mut self, id: LineId) -> Result<Option<Quantity>> {
        let index = self.resolve(id)?;
        self.decrement_quantity(index)
    }

    /// [`CartStore::remove_item`] addressed by line ID.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::UnknownLine`] if the line is gone.
    pub fn remove(&mut self, id: LineId) -> Result<LineItem> {
        let index = self.resolve(id)?;
        self.remove_item(index)
    }

    /// Drop every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Delete the persisted cart. In-memory lines are left alone.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the backend fails the delete.
    pub fn discard_persisted(&mut self) -> Result<()> {
        self.storage.remove(&self.key)?;
        info!(key = %self.key, "Discarded stored cart");
        Ok(())
    }

    /// Sum of all quantities, for the badge.
    #[must_use]
    pub fn total_item_count(&self) -> u64 {
        self.lines
            .iter()
            .map(|line| u64::from(line.quantity.get()))
            .sum()
    }

    /// Sum of unit price times quantity over all lines.
    ///
    /// The returned price keeps full precision; its `Display` rounds to two
    /// decimal places.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Price`] for the first line whose price text does
    /// not parse, is in another currency, or overflows.
    pub fn total_price(&self) -> Result<Price> {
        self.lines
            .iter()
            .try_fold(Price::zero(self.currency), |total, line| {
                let line_total = line.line_total(self.currency)?;
                total
                    .checked_add(&line_total)
                    .map_err(|source| CartError::Price {
                        title: line.title.clone(),
                        source,
                    })
            })
    }

    /// Write the whole cart to storage under the store's key.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or the storage rejects the write
    /// (e.g. quota exceeded).
    pub fn persist(&mut self) -> Result<()> {
        let stored: Vec<StoredLine> = self.lines.iter().map(StoredLine::from).collect();
        let value = serde_json::to_string(&stored)?;
        self.storage.set(&self.key, &value)?;
        debug!(key = %self.key, lines = stored.len(), bytes = value.len(), "Persisted cart");
        Ok(())
    }

    /// Replace the cart with the value stored under the store's key.
    ///
    /// Returns `Ok(true)` if a stored cart was loaded and `Ok(false)` if the
    /// key was absent, in which case the cart is left untouched. On error the
    /// cart is also left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::MalformedPersistedData`] if the value is not text,
    /// is not a JSON array of lines, holds a quantity of 0 or repeats a title.
    /// Returns [`CartError::Storage`] if the storage cannot be read.
    pub fn restore(&mut self) -> Result<bool> {
        let stored = match self.storage.get(&self.key) {
            Ok(stored) => stored,
            Err(e @ StorageError::NotUtf8 { .. }) => {
                return Err(CartError::MalformedPersistedData(e.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        let Some(value) = stored else {
            debug!(key = %self.key, "No stored cart");
            return Ok(false);
        };

        let stored: Vec<StoredLine> = serde_json::from_str(&value)
            .map_err(|e| CartError::MalformedPersistedData(e.to_string()))?;

        if let Some(dup) = first_duplicate_title(&stored) {
            return Err(CartError::MalformedPersistedData(format!(
                "duplicate title {dup:?}"
            )));
        }

        self.lines = stored.into_iter().map(LineItem::from).collect();
        info!(key = %self.key, lines = self.lines.len(), "Restored cart");
        Ok(true)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.lines.len() {
            Ok(())
        } else {
            Err(CartError::IndexOutOfRange {
                index,
                len: self.lines.len(),
            })
        }
    }

    fn line_mut(&mut self, index: usize) -> Result<&mut LineItem> {
        let len = self.lines.len();
        self.lines
            .get_mut(index)
            .ok_or(CartError::IndexOutOfRange { index, len })
    }

    fn resolve(&self, id: LineId) -> Result<usize> {
        self.position(id).ok_or(CartError::UnknownLine(id))
    }
}

fn first_duplicate_title(lines: &[StoredLine]) -> Option<&str> {
    let mut seen = HashSet::with_capacity(lines.len());
    lines
        .iter()
        .map(|line| line.title.as_str())
        .find(|title| !seen.insert(*title))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::storage::MemoryStorage;

    fn store() -> CartStore<MemoryStorage> {
        CartStore::new(MemoryStorage::new())
    }

    fn snapshot<S: Storage>(store: &CartStore<S>) -> Vec<(String, String, String, u32)> {
        store
            .lines()
            .iter()
            .map(|l| {
                (
                    l.title().to_owned(),
                    l.price_text().to_owned(),
                    l.image_url().to_owned(),
                    l.quantity().get(),
                )
            })
            .collect()
    }

    #[test]
    fn test_add_same_title_twice_increments() {
        let mut cart = store();
        let first = cart.add("Widget", "5,00 €", "img.png");
        let second = cart.add("Widget", "5,00 €", "img.png");

        assert_eq!(first, second);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].quantity().get(), 2);
        assert_eq!(cart.total_price().unwrap().amount, Decimal::new(1000, 2));
        assert_eq!(cart.total_price().unwrap().to_string(), "10.00 €");
    }

    #[test]
    fn test_add_keeps_first_price_and_image() {
        let mut cart = store();
        cart.add("Widget", "5,00 €", "a.png");
        cart.add("Widget", "9,00 €", "b.png");
        assert_eq!(cart.lines()[0].price_text(), "5,00 €");
        assert_eq!(cart.lines()[0].image_url(), "a.png");
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut cart = store();
        cart.add("B", "1 €", "b");
        cart.add("A", "1 €", "a");
        cart.add("B", "1 €", "b");
        let titles: Vec<&str> = cart.lines().iter().map(LineItem::title).collect();
        assert_eq!(titles, ["B", "A"]);
    }

    #[test]
    fn test_total_item_count() {
        let mut cart = store();
        assert_eq!(cart.total_item_count(), 0);

        cart.add("A", "1 €", "a");
        cart.add("A", "1 €", "a");
        cart.add("B", "1 €", "b");
        assert_eq!(cart.total_item_count(), 3);
    }

    #[test]
    fn test_increment_quantity() {
        let mut cart = store();
        cart.add("A", "1 €", "a");
        assert_eq!(cart.increment_quantity(0).unwrap().get(), 2);
        assert!(matches!(
            cart.increment_quantity(1),
            Err(CartError::IndexOutOfRange { index: 1, len: 1 })
        ));
    }

    #[test]
    fn test_decrement_last_unit_removes_line() {
        let mut cart = store();
        cart.add("A", "1 €", "a");
        cart.add("B", "1 €", "b");
        cart.increment_quantity(1).unwrap();

        assert_eq!(cart.decrement_quantity(1).unwrap(), Some(Quantity::ONE));
        assert_eq!(cart.decrement_quantity(0).unwrap(), None);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total_item_count(), 1);
        assert_eq!(cart.lines()[0].title(), "B");
    }

    #[test]
    fn test_decrement_on_empty_cart_fails_without_change() {
        let mut cart = store();
        assert!(matches!(
            cart.decrement_quantity(0),
            Err(CartError::IndexOutOfRange { index: 0, len: 0 })
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_item_shifts_later_lines() {
        let mut cart = store();
        cart.add("A", "1 €", "a");
        cart.add("B", "1 €", "b");
        cart.add("C", "1 €", "c");
        cart.increment_quantity(0).unwrap();

        let removed = cart.remove_item(0).unwrap();
        assert_eq!(removed.title(), "A");
        assert_eq!(removed.quantity().get(), 2);
        assert_eq!(cart.lines()[0].title(), "B");
        assert_eq!(cart.lines()[1].title(), "C");
        assert!(cart.remove_item(2).is_err());
    }

    #[test]
    fn test_id_addressing_survives_shifts() {
        let mut cart = store();
        let a = cart.add("A", "1 €", "a");
        cart.add("B", "1 €", "b");
        let c = cart.add("C", "1 €", "c");

        cart.remove(a).unwrap();
        assert_eq!(cart.position(c), Some(1));
        assert_eq!(cart.increment(c).unwrap().get(), 2);
        assert_eq!(cart.find(c).unwrap().title(), "C");

        assert!(matches!(cart.remove(a), Err(CartError::UnknownLine(id)) if id == a));
        assert!(matches!(cart.decrement(a), Err(CartError::UnknownLine(_))));
    }

    #[test]
    fn test_total_price_mixed_quantities() {
        let mut cart = store();
        cart.add("Affiche", "12,50 €", "a");
        cart.add("Affiche", "12,50 €", "a");
        cart.add("Affiche", "12,50 €", "a");
        cart.add("Carte", "12,50 €", "c");
        assert_eq!(cart.total_price().unwrap().amount, Decimal::new(5000, 2));
    }

    #[test]
    fn test_total_price_empty_is_zero() {
        let cart = store();
        assert_eq!(cart.total_price().unwrap().to_string(), "0.00 €");
    }

    #[test]
    fn test_total_price_malformed_names_line() {
        let mut cart = store();
        cart.add("Good", "1,00 €", "g");
        cart.add("Bad", "gratuit", "b");
        match cart.total_price() {
            Err(CartError::Price { title, .. }) => assert_eq!(title, "Bad"),
            other => panic!("expected price error, got {other:?}"),
        }
    }

    #[test]
    fn test_total_price_uses_store_currency() {
        let mut cart = CartStore::new(MemoryStorage::new()).with_currency(CurrencyCode::USD);
        cart.add("Mug", "$4.50", "m");
        cart.add("Mug", "$4.50", "m");
        assert_eq!(cart.total_price().unwrap().to_string(), "$9.00");
    }

    #[test]
    fn test_persist_writes_expected_shape() {
        let mut cart = store();
        cart.add("Widget", "5,00 €", "img.png");
        cart.add("Widget", "5,00 €", "img.png");
        cart.persist().unwrap();

        let raw = cart.storage().get(CART_STORAGE_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            value,
            serde_json::json!([
                {"title": "Widget", "price": "5,00 €", "image": "img.png", "quantity": 2}
            ])
        );
    }

    #[test]
    fn test_persist_restore_roundtrip() {
        let mut cart = store();
        cart.add("B", "2,00 €", "b.png");
        cart.add("A", "1,00 €", "a.png");
        cart.add("B", "2,00 €", "b.png");
        cart.persist().unwrap();

        let mut fresh = CartStore::new(cart.storage().clone());
        assert!(fresh.restore().unwrap());
        assert_eq!(snapshot(&fresh), snapshot(&cart));
    }

    #[test]
    fn test_restore_absent_leaves_cart_empty() {
        let mut cart = store();
        assert!(!cart.restore().unwrap());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_restore_accepts_browser_widget_format() {
        let mut storage = MemoryStorage::new();
        storage
            .set(
                "cart",
                r#"[{"title":"Affiche","price":"12,50 €","image":"https://x/a.jpg","quantity":3}]"#,
            )
            .unwrap();

        let mut cart = CartStore::new(storage);
        cart.restore().unwrap();
        assert_eq!(cart.total_item_count(), 3);
        assert_eq!(cart.total_price().unwrap().to_string(), "37.50 €");
    }

    #[test]
    fn test_restore_malformed_json_leaves_cart_untouched() {
        let mut cart = store();
        cart.add("Keep", "1 €", "k");
        cart.storage_mut().set("cart", "{not json").unwrap();

        assert!(matches!(
            cart.restore(),
            Err(CartError::MalformedPersistedData(_))
        ));
        assert_eq!(cart.lines()[0].title(), "Keep");
    }

    #[test]
    fn test_restore_rejects_zero_quantity() {
        let mut cart = store();
        cart.storage_mut()
            .set("cart", r#"[{"title":"A","price":"1 €","image":"a","quantity":0}]"#)
            .unwrap();
        assert!(matches!(
            cart.restore(),
            Err(CartError::MalformedPersistedData(_))
        ));
    }

    #[test]
    fn test_restore_rejects_duplicate_titles() {
        let mut cart = store();
        cart.storage_mut()
            .set(
                "cart",
                r#"[{"title":"A","price":"1 €","image":"a","quantity":1},
                    {"title":"A","price":"1 €","image":"a","quantity":2}]"#,
            )
            .unwrap();
        match cart.restore() {
            Err(CartError::MalformedPersistedData(msg)) => assert!(msg.contains("\"A\"")),
            other => panic!("expected malformed data, got {other:?}"),
        }
    }

    #[test]
    fn test_persist_surfaces_quota_error() {
        let mut cart = CartStore::new(MemoryStorage::with_quota(16));
        cart.add("A title long enough to overflow", "1 €", "a");
        assert!(matches!(
            cart.persist(),
            Err(CartError::Storage(StorageError::QuotaExceeded { .. }))
        ));
    }

    #[test]
    fn test_custom_key() {
        let mut cart = CartStore::new(MemoryStorage::new()).with_key("panier");
        cart.add("A", "1 €", "a");
        cart.persist().unwrap();
        assert!(cart.storage().get("panier").unwrap().is_some());
        assert!(cart.storage().get("cart").unwrap().is_none());
    }

    #[test]
    fn test_discard_persisted_keeps_lines() {
        let mut cart = store();
        cart.add("A", "1 €", "a");
        cart.persist().unwrap();

        cart.discard_persisted().unwrap();
        assert!(cart.storage().get("cart").unwrap().is_none());
        assert_eq!(cart.len(), 1);
        cart.discard_persisted().unwrap();
    }
}
