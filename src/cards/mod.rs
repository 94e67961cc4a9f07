//! Card system: cards, wire codes and the face registry.
//!
//! ## Key Types
//!
//! - `Card`, `Rank`, `Suit`: card values, parsed from 2-char codes
//! - `CardFace`: visual attributes of one card node
//! - `CardRegistry`: face lookup and glyph rendering

pub mod card;
pub mod registry;

pub use card::{Card, CardCodeError, Rank, Suit};
pub use registry::{code_to_glyph, is_valid_code, CardFace, CardRegistry, BLANK_GLYPH};
