//! Render snapshots and the renderer collaborator.
//!
//! A [`CartView`] is an immutable snapshot of everything a front end needs:
//! ordered lines, badge count, formatted totals and whether the panel is
//! open. Renderers never read the store directly.

use std::fmt;

use panier_core::{CurrencyCode, LineId, Price};
use tracing::warn;

use crate::storage::Storage;
use crate::store::{CartStore, LineItem};

/// Placeholder shown for an empty cart.
pub const EMPTY_CART_MESSAGE: &str = "Votre panier est vide";

/// Shown in place of an amount that could not be computed.
const UNAVAILABLE: &str = "--";

/// Receives a fresh snapshot after every change.
pub trait Renderer {
    /// Draw `view`. Rendering is fire-and-forget; failures stay inside the renderer.
    fn render(&mut self, view: &CartView);
}

/// Cart line display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemView {
    pub id: LineId,
    pub index: usize,
    pub title: String,
    pub image_url: String,
    pub quantity: u32,
    /// Unit price exactly as the catalog shows it.
    pub price: String,
    /// Unit price times quantity, `None` if the price text is malformed.
    pub line_price: Option<String>,
}

/// Cart display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    /// Formatted total, `None` if any line's price is malformed.
    pub subtotal: Option<String>,
    pub item_count: u64,
    pub is_open: bool,
}

impl CartView {
    /// Create an empty, closed cart view.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: Some(Price::zero(CurrencyCode::default()).to_string()),
            item_count: 0,
            is_open: false,
        }
    }

    /// Snapshot `store`.
    #[must_use]
    pub fn from_store<S: Storage>(store: &CartStore<S>, is_open: bool) -> Self {
        let currency = store.currency();
        let subtotal = match store.total_price() {
            Ok(total) => Some(total.to_string()),
            Err(e) => {
                warn!("Cart total unavailable: {e}");
                None
            }
        };

        Self {
            items: store
                .lines()
                .iter()
                .enumerate()
                .map(|(index, line)| CartItemView::new(index, line, currency))
                .collect(),
            subtotal,
            item_count: store.total_item_count(),
            is_open,
        }
    }

    /// Whether there is nothing in the cart.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Subtotal text, with a placeholder when it could not be computed.
    #[must_use]
    pub fn subtotal_text(&self) -> &str {
        self.subtotal.as_deref().unwrap_or(UNAVAILABLE)
    }
}

impl CartItemView {
    fn new(index: usize, line: &LineItem, currency: CurrencyCode) -> Self {
        Self {
            id: line.id(),
            index,
            title: line.title().to_string(),
            image_url: line.image_url().to_string(),
            quantity: line.quantity().get(),
            price: line.price_text().to_string(),
            line_price: line
                .line_total(currency)
                .ok()
                .map(|price: Price| price.to_string()),
        }
    }
}

/// Plain-text rendering used by terminal front ends.
impl fmt::Display for CartView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Panier ({})", self.item_count)?;
        if self.is_empty() {
            return writeln!(f, "  {EMPTY_CART_MESSAGE}");
        }
        for item in &self.items {
            writeln!(
                f,
                "  [{}] {} - {} x {} = {}  ({})",
                item.index,
                item.title,
                item.price,
                item.quantity,
                item.line_price.as_deref().unwrap_or(UNAVAILABLE),
                item.image_url,
            )?;
        }
        writeln!(f, "  Total: {}", self.subtotal_text())
    }
}

/// Renderer that keeps the most recent snapshot.
///
/// Useful for front ends that draw once at the end of a session, and for tests.
#[derive(Debug, Default)]
pub struct LatestView {
    view: Option<CartView>,
    renders: usize,
}

impl LatestView {
    /// Create a renderer that has not rendered yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent snapshot, if any.
    #[must_use]
    pub const fn latest(&self) -> Option<&CartView> {
        self.view.as_ref()
    }

    /// How many times [`Renderer::render`] was called.
    #[must_use]
    pub const fn renders(&self) -> usize {
        self.renders
    }
}

impl Renderer for LatestView {
    fn render(&mut self, view: &CartView) {
        self.view = Some(view.clone());
        self.renders += 1;
    }
}
