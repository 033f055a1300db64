// src/castle/config.rs
//! Layout parameters and the height/size mutator.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::layout::{self, Perimeter};

/// Tallest allowed stack of mid pieces.
pub const MAX_HEIGHT: u32 = 64;
/// Widest allowed side, in wall columns.
pub const MAX_SIZE: u32 = 128;

/// Inputs for one perimeter pass. `height` stays in `1..=MAX_HEIGHT`, `size` in `1..=MAX_SIZE`.
#[derive(Resource, Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Mid pieces per column.
    pub height: u32,
    /// Wall columns per full side.
    pub size: u32,
    #[serde(default)]
    pub origin: Vec3,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self { height: 1, size: 3, origin: Vec3::ZERO }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayoutField {
    Height,
    Size,
}

impl LayoutConfig {
    pub fn clamped(self) -> Self {
        Self {
            height: self.height.clamp(1, MAX_HEIGHT),
            size: self.size.clamp(1, MAX_SIZE),
            ..self
        }
    }

    pub fn generate(&self) -> Perimeter {
        layout::generate(self.height, self.size, self.origin)
    }
}

/// Add `delta` to one field, keeping it between 1 and the field's ceiling.
pub fn apply_delta(config: LayoutConfig, field: LayoutField, delta: i32) -> LayoutConfig {
    let bump = |v: u32, max: u32| -> u32 {
        let next = i64::from(v) + i64::from(delta);
        next.clamp(1, i64::from(max)) as u32
    };
    match field {
        LayoutField::Height => LayoutConfig { height: bump(config.height, MAX_HEIGHT), ..config },
        LayoutField::Size => LayoutConfig { size: bump(config.size, MAX_SIZE), ..config },
    }
}
