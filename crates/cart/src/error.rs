//! Unified error handling for cart operations.
//!
//! Every fallible cart operation returns [`CartError`]. A failed operation
//! leaves the cart exactly as it was; callers decide whether to surface the
//! error or fall back (e.g. start from an empty cart when restore fails).

use panier_core::{LineId, PriceError};
use thiserror::Error;

use crate::storage::StorageError;

/// Error type for cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// A positional operation addressed a line that does not exist.
    #[error("Line index {index} out of range (cart has {len} lines)")]
    IndexOutOfRange {
        /// Requested position.
        index: usize,
        /// Number of lines at the time of the call.
        len: usize,
    },

    /// An intent addressed a line ID that is no longer in the cart.
    #[error("Unknown cart line: {0}")]
    UnknownLine(LineId),

    /// Stored cart data could not be decoded or failed validation.
    #[error("Malformed persisted cart: {0}")]
    MalformedPersistedData(String),

    /// A line's price text could not be used in the total.
    #[error("Price error for {title:?}: {source}")]
    Price {
        /// Title of the offending line.
        title: String,
        /// Underlying parse or arithmetic failure.
        #[source]
        source: PriceError,
    },

    /// The storage collaborator failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The cart could not be encoded for storage.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CartError {
    /// Whether this error came from addressing a line that is not there.
    ///
    /// These are recoverable: the view should re-fetch and re-render.
    #[must_use]
    pub const fn is_stale_reference(&self) -> bool {
        matches!(self, Self::IndexOutOfRange { .. } | Self::UnknownLine(_))
    }
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;
