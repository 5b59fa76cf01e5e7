//! Intent dispatch: the single entry point a view talks to.
//!
//! One [`CartController`] exists per page session. It owns the store and the
//! collaborators, and runs every intent to completion:
//!
//! 1. mutate the store
//! 2. snapshot a [`CartView`] (totals recomputed) and render it
//! 3. persist the cart, for intents that change its contents
//! 4. notify the shopper
//!
//! A failed mutation stops at step 1 with the cart untouched.

use panier_core::{LineId, NotificationKind, Quantity};
use tracing::{info, instrument, warn};

use crate::error::{CartError, Result};
use crate::notify::Notifier;
use crate::storage::Storage;
use crate::store::CartStore;
use crate::view::{CartView, EMPTY_CART_MESSAGE, Renderer};

/// Shown when checkout starts.
pub const CHECKOUT_MESSAGE: &str = "Redirection vers le paiement...";

/// User intents emitted by a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartIntent {
    /// Add one unit of a catalog product.
    Add {
        title: String,
        price: String,
        image: String,
    },
    /// One more unit on a line.
    Increment(LineId),
    /// One fewer unit on a line; the last unit removes it.
    Decrement(LineId),
    /// Drop a line entirely.
    Remove(LineId),
    /// Open or close the cart panel.
    ToggleOpen,
    /// Proceed to payment.
    Checkout,
}

impl CartIntent {
    /// Convenience constructor for [`CartIntent::Add`].
    pub fn add(
        title: impl Into<String>,
        price: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        Self::Add {
            title: title.into(),
            price: price.into(),
            image: image.into(),
        }
    }

    /// Whether handling this intent changes cart contents.
    #[must_use]
    pub const fn mutates_cart(&self) -> bool {
        matches!(
            self,
            Self::Add { .. } | Self::Increment(_) | Self::Decrement(_) | Self::Remove(_)
        )
    }
}

/// Result of a checkout attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// The cart has items; the front end should hand off to payment.
    Redirect,
    /// Nothing to pay for.
    EmptyCart,
}

/// What a dispatched intent did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A unit was added to this line (new or existing).
    Added(LineId),
    /// The line now holds `quantity` units.
    QuantityChanged { id: LineId, quantity: Quantity },
    /// The line left the cart.
    Removed(LineId),
    /// The panel is now open (`true`) or closed.
    Toggled(bool),
    /// Checkout was attempted.
    Checkout(CheckoutOutcome),
}

/// Owns the cart store and its collaborators for one session.
#[derive(Debug)]
pub struct CartController<S, R, N> {
    store: CartStore<S>,
    renderer: R,
    notifier: N,
    is_open: bool,
}

impl<S: Storage, R: Renderer, N: Notifier> CartController<S, R, N> {
    /// Wrap a store and its collaborators. No I/O happens until [`Self::init`].
    pub const fn new(store: CartStore<S>, renderer: R, notifier: N) -> Self {
        Self {
            store,
            renderer,
            notifier,
            is_open: false,
        }
    }

    /// Restore the persisted cart and render it.
    ///
    /// Malformed stored data is logged, deleted and replaced by an empty cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the storage cannot be read.
    #[instrument(skip(self), fields(key = %self.store.key()))]
    pub fn init(&mut self) -> Result<()> {
        match self.store.restore() {
            Ok(_) => {}
            Err(CartError::MalformedPersistedData(reason)) => {
                warn!(%reason, "Discarding malformed stored cart");
                self.store.clear();
                if let Err(e) = self.store.discard_persisted() {
                    warn!(error = %e, "Could not delete malformed stored cart");
                }
            }
            Err(e) => return Err(e),
        }
        self.refresh();
        Ok(())
    }

    /// Handle one intent to completion.
    ///
    /// Every intent re-renders; only cart-mutating intents persist.
    ///
    /// # Errors
    ///
    /// - [`CartError::UnknownLine`] if the intent addresses a line that is gone;
    ///   nothing is rendered, persisted or changed.
    /// - [`CartError::Storage`] / [`CartError::Serialization`] if persisting
    ///   fails; the in-memory cart and the view already reflect the change.
    #[instrument(skip(self))]
    pub fn dispatch(&mut self, intent: CartIntent) -> Result<DispatchOutcome> {
        let mutates = intent.mutates_cart();
        let mut notice = None;

        let outcome = match intent {
            CartIntent::Add {
                title,
                price,
                image,
            } => {
                notice = Some((format!("{title} ajouté au panier"), NotificationKind::Success));
                DispatchOutcome::Added(self.store.add(title, price, image))
            }
            CartIntent::Increment(id) => {
                let quantity = self.store.increment(id)?;
                DispatchOutcome::QuantityChanged { id, quantity }
            }
            CartIntent::Decrement(id) => match self.store.decrement(id)? {
                Some(quantity) => DispatchOutcome::QuantityChanged { id, quantity },
                None => DispatchOutcome::Removed(id),
            },
            CartIntent::Remove(id) => {
                self.store.remove(id)?;
                DispatchOutcome::Removed(id)
            }
            CartIntent::ToggleOpen => {
                self.is_open = !self.is_open;
                DispatchOutcome::Toggled(self.is_open)
            }
            CartIntent::Checkout => {
                let (outcome, message, kind) = self.checkout();
                notice = Some((message.to_owned(), kind));
                DispatchOutcome::Checkout(outcome)
            }
        };

        self.refresh();
        if mutates {
            self.store.persist()?;
        }
        if let Some((message, kind)) = notice {
            self.notifier.notify(&message, kind);
        }
        Ok(outcome)
    }

    /// Open the panel if it is closed.
    pub fn open(&mut self) {
        if !self.is_open {
            self.is_open = true;
            self.refresh();
        }
    }

    /// Resolve a display position to a line ID, for index-based front ends.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::IndexOutOfRange`] if there is no such line.
    pub fn line_at(&self, index: usize) -> Result<LineId> {
        self.store
            .get(index)
            .map(crate::store::LineItem::id)
            .ok_or(CartError::IndexOutOfRange {
                index,
                len: self.store.len(),
            })
    }

    /// Current snapshot.
    #[must_use]
    pub fn view(&self) -> CartView {
        CartView::from_store(&self.store, self.is_open)
    }

    /// Whether the panel is open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.is_open
    }

    /// The cart store.
    #[must_use]
    pub const fn store(&self) -> &CartStore<S> {
        &self.store
    }

    /// The renderer.
    #[must_use]
    pub const fn renderer(&self) -> &R {
        &self.renderer
    }

    /// The notifier.
    #[must_use]
    pub const fn notifier(&self) -> &N {
        &self.notifier
    }

    fn checkout(&self) -> (CheckoutOutcome, &'static str, NotificationKind) {
        if self.store.is_empty() {
            return (
                CheckoutOutcome::EmptyCart,
                EMPTY_CART_MESSAGE,
                NotificationKind::Error,
            );
        }
        info!(
            lines = self.store.len(),
            items = self.store.total_item_count(),
            "Checkout requested"
        );
        (
            CheckoutOutcome::Redirect,
            CHECKOUT_MESSAGE,
            NotificationKind::Success,
        )
    }

    fn refresh(&mut self) {
        let view = self.view();
        self.renderer.render(&view);
    }

}
