//! Table configuration.
//!
//! Hosts configure the engine at startup by providing:
//! - `AnimationConfig`: per-move duration and easing curve
//! - `LayoutConfig`: grid cell and card geometry for the default layout
//! - `TableConfig`: combines all configuration plus the selection seed
//!
//! Every field has a default, so a config file only needs the keys it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::TableError;
use crate::animation::easing::CubicBezier;

/// Which card game a room is playing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    ThirtyOne,
    Cribbage,
}

impl GameKind {
    /// Display name used in room headers.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            GameKind::ThirtyOne => "31",
            GameKind::Cribbage => "Cribbage",
        }
    }

    /// Whether the board has a discard pile (thirty-one) rather than a crib.
    #[must_use]
    pub const fn has_discard_pile(self) -> bool {
        matches!(self, GameKind::ThirtyOne)
    }
}

/// Card move animation parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Duration of a single card move, in milliseconds.
    pub duration_ms: u32,

    /// Easing applied to every move.
    pub easing: CubicBezier,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration_ms: 1000,
            easing: CubicBezier::EASE_OUT_QUART,
        }
    }
}

/// Geometry for the default 3x3 grid layout, in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub cell_width: f64,
    pub cell_height: f64,
    pub card_width: f64,
    pub card_height: f64,
    /// Horizontal gap between adjacent cards in a hand.
    pub card_gap: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            cell_width: 360.0,
            cell_height: 220.0,
            card_width: 70.0,
            card_height: 100.0,
            card_gap: 8.0,
        }
    }
}

/// Complete table configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub animation: AnimationConfig,

    pub layout: LayoutConfig,

    /// Seed for hidden-card selection. `None` seeds from entropy.
    pub selection_seed: Option<u64>,

    /// Maximum number of server log lines retained in the session.
    pub log_capacity: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            animation: AnimationConfig::default(),
            layout: LayoutConfig::default(),
            selection_seed: None,
            log_capacity: 200,
        }
    }
}

impl TableConfig {
    /// Parse a config from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, TableError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a config from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| TableError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Set a fixed selection seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.selection_seed = Some(seed);
        self
    }

    /// Set the per-move animation duration.
    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: u32) -> Self {
        self.animation.duration_ms = duration_ms;
        self
    }
}
