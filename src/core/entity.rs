//! Visual node identification.
//!
//! Every card-sized slot on the table (a card in a hand, the deck stack, the
//! discard top, the crib pile) is a node with a unique `NodeId`.
//!
//! ## ID Layout
//!
//! IDs are allocated monotonically by the zone model and never reused while
//! the model lives, so an id captured by an in-flight animation can never
//! alias a newer slot after a zone is rebuilt.
//!
//! ```
//! use card_table::core::NodeId;
//!
//! let first = NodeId::new(0);
//! assert_eq!(first.next(), NodeId::new(1));
//! ```

use serde::{Deserialize, Serialize};

/// Unique identifier for one visual card node.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a node ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// The id allocated after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node-{}", self.0)
    }
}
