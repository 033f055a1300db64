// src/castle/sink.rs
//! Where the layout walk sends its placements.

use super::layout::{Perimeter, Placement};

/// Receives placements in walk order.
pub trait PlacementSink {
    fn place(&mut self, placement: Placement);
}

impl PlacementSink for Perimeter {
    fn place(&mut self, placement: Placement) {
        self.0.push(placement);
    }
}
