// src/castle/queue.rs
use bevy::prelude::*;
use std::collections::VecDeque;

use super::layout::Placement;
use super::sink::PlacementSink;

/// One pending piece of a given perimeter generation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnRequest {
    pub generation: u64,
    pub placement: Placement,
}

/// FIFO so pieces appear in walk order. `generation` stamps new requests.
#[derive(Resource, Default)]
pub struct PieceSpawnQueue {
    pub generation: u64,
    pub items: VecDeque<SpawnRequest>,
}

impl PieceSpawnQueue {
    /// Drop everything pending and stamp future requests with `generation`.
    pub fn restart(&mut self, generation: u64) {
        self.items.clear();
        self.generation = generation;
    }

    pub fn len(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
}

impl PlacementSink for PieceSpawnQueue {
    fn place(&mut self, placement: Placement) {
        self.items.push_back(SpawnRequest { generation: self.generation, placement });
    }
}

/// config: how many pieces to actually spawn per frame
#[derive(Resource)]
pub struct SpawnQueueConfig {
    pub max_per_frame: usize,
}
impl Default for SpawnQueueConfig {
    fn default() -> Self { Self { max_per_frame: 200 } }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::castle::layout::generate_into;

    #[test]
    fn restart_discards_previous_generation() {
        let mut q = PieceSpawnQueue::default();
        generate_into(1, 2, Vec3::ZERO, &mut q);
        assert!(!q.is_empty());
        assert!(q.items.iter().all(|r| r.generation == 0));

        q.restart(4);
        assert!(q.is_empty());
        generate_into(1, 1, Vec3::ZERO, &mut q);
        assert!(q.items.iter().all(|r| r.generation == 4));
        assert_eq!(q.items.front().map(|r| r.placement.position), Some(Vec3::ZERO));
    }
}
