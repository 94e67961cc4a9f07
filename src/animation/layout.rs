//! Layout probes: where zones and slots sit on screen.
//!
//! The engine never reads geometry from a rendered view. Moves are measured
//! through a `LayoutProbe`, which a host implements against its own renderer.
//! `GridLayout` is the built-in probe for the 3x3 table grid: the board sits
//! in the centre cell and each seated player's hand in one of the others.

use rustc_hash::FxHashMap;

use super::geometry::Rect;
use crate::core::config::LayoutConfig;
use crate::zones::{ZoneKey, ZoneKind};

/// Grid cell holding the deck, discard and crib.
pub const BOARD_CELL: u8 = 5;

/// Measures zones and slots.
pub trait LayoutProbe {
    /// Rect of a zone's container, or `None` if the zone isn't on screen.
    fn zone_rect(&self, zone: &ZoneKey) -> Option<Rect>;

    /// Rect of slot `index` in a zone that holds `len` slots.
    fn slot_rect(&self, zone: &ZoneKey, index: usize, len: usize) -> Option<Rect>;

    /// Called whenever seat assignments change.
    fn assign_seats(&mut self, _seats: &[(String, u8)]) {}
}

/// Probe for the 3x3 grid layout.
#[derive(Clone, Debug, Default)]
pub struct GridLayout {
    config: LayoutConfig,
    seats: FxHashMap<String, u8>,
}

impl GridLayout {
    #[must_use]
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            seats: FxHashMap::default(),
        }
    }

    /// Rect of grid cell `cell` (1..=9, row-major).
    #[must_use]
    pub fn cell_rect(&self, cell: u8) -> Option<Rect> {
        if !(1..=9).contains(&cell) {
            return None;
        }
        let idx = f64::from(cell - 1);
        let col = idx % 3.0;
        let row = (idx / 3.0).floor();
        Some(Rect::new(
            col * self.config.cell_width,
            row * self.config.cell_height,
            self.config.cell_width,
            self.config.cell_height,
        ))
    }

    #[must_use]
    pub fn seat_of(&self, player: &str) -> Option<u8> {
        self.seats.get(player).copied()
    }

    fn card_top(&self, cell: &Rect) -> f64 {
        cell.top + (cell.height - self.config.card_height) / 2.0
    }

    fn board_rect(&self, kind: ZoneKind) -> Option<Rect> {
        let cell = self.cell_rect(BOARD_CELL)?;
        let c = &self.config;
        let centre = cell.left + cell.width / 2.0;
        let left = match kind {
            ZoneKind::Deck => centre - c.card_width - c.card_gap / 2.0,
            ZoneKind::Discard | ZoneKind::Crib => centre + c.card_gap / 2.0,
            ZoneKind::Hand => return None,
        };
        Some(Rect::new(left, self.card_top(&cell), c.card_width, c.card_height))
    }

    fn hand_cell(&self, zone: &ZoneKey) -> Option<Rect> {
        let seat = self.seat_of(zone.owner()?)?;
        self.cell_rect(seat)
    }
}

impl LayoutProbe for GridLayout {
    fn zone_rect(&self, zone: &ZoneKey) -> Option<Rect> {
        match zone.kind {
            ZoneKind::Hand => self.hand_cell(zone),
            kind => self.board_rect(kind),
        }
    }

    fn slot_rect(&self, zone: &ZoneKey, index: usize, len: usize) -> Option<Rect> {
        if zone.kind != ZoneKind::Hand {
            return self.zone_rect(zone);
        }
        let cell = self.hand_cell(zone)?;
        let c = &self.config;
        let len = len.max(index + 1) as f64;
        let span = len * c.card_width + (len - 1.0) * c.card_gap;
        let left = cell.left + (cell.width - span) / 2.0 + index as f64 * (c.card_width + c.card_gap);
        Some(Rect::new(left, self.card_top(&cell), c.card_width, c.card_height))
    }

    fn assign_seats(&mut self, seats: &[(String, u8)]) {
        self.seats = seats.iter().cloned().collect();
    }
}
