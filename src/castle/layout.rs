// src/castle/layout.rs
//! Perimeter layout: walks a closed rectangle of wall columns around a gate.
//! Pure and deterministic; the scene side only ever sees the placements.

use bevy::prelude::*; // Vec3, Quat, Transform
use serde::{Deserialize, Serialize};

use super::sink::PlacementSink;

/// Vertical spacing between stacked pieces.
pub const UNIT_HEIGHT: f32 = 4.0;
/// Horizontal spacing between neighbouring columns.
pub const UNIT_WIDTH: f32 = 4.0;

// ---------- Pieces ----------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceFamily {
    Gate,
    Wall,
    Corner,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    Bottom,
    Mid,
    Top,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    CornerBottom,
    CornerMid,
    CornerTop,
    WallBottom,
    WallMid,
    WallTop,
    GateBottom,
    GateMid,
    GateTop,
}

impl PieceKind {
    pub const ALL: [PieceKind; 9] = [
        PieceKind::CornerBottom,
        PieceKind::CornerMid,
        PieceKind::CornerTop,
        PieceKind::WallBottom,
        PieceKind::WallMid,
        PieceKind::WallTop,
        PieceKind::GateBottom,
        PieceKind::GateMid,
        PieceKind::GateTop,
    ];

    pub const fn new(family: PieceFamily, tier: Tier) -> Self {
        match (family, tier) {
            (PieceFamily::Corner, Tier::Bottom) => PieceKind::CornerBottom,
            (PieceFamily::Corner, Tier::Mid) => PieceKind::CornerMid,
            (PieceFamily::Corner, Tier::Top) => PieceKind::CornerTop,
            (PieceFamily::Wall, Tier::Bottom) => PieceKind::WallBottom,
            (PieceFamily::Wall, Tier::Mid) => PieceKind::WallMid,
            (PieceFamily::Wall, Tier::Top) => PieceKind::WallTop,
            (PieceFamily::Gate, Tier::Bottom) => PieceKind::GateBottom,
            (PieceFamily::Gate, Tier::Mid) => PieceKind::GateMid,
            (PieceFamily::Gate, Tier::Top) => PieceKind::GateTop,
        }
    }

    pub const fn family(self) -> PieceFamily {
        match self {
            PieceKind::CornerBottom | PieceKind::CornerMid | PieceKind::CornerTop => PieceFamily::Corner,
            PieceKind::WallBottom | PieceKind::WallMid | PieceKind::WallTop => PieceFamily::Wall,
            PieceKind::GateBottom | PieceKind::GateMid | PieceKind::GateTop => PieceFamily::Gate,
        }
    }

    pub const fn tier(self) -> Tier {
        match self {
            PieceKind::CornerBottom | PieceKind::WallBottom | PieceKind::GateBottom => Tier::Bottom,
            PieceKind::CornerMid | PieceKind::WallMid | PieceKind::GateMid => Tier::Mid,
            PieceKind::CornerTop | PieceKind::WallTop | PieceKind::GateTop => Tier::Top,
        }
    }
}

// ---------- Output ----------

/// One piece to instantiate. Yaw is in degrees around +Y.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub kind: PieceKind,
    pub position: Vec3,
    pub yaw_deg: f32,
}

impl Placement {
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw_deg.to_radians())
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position).with_rotation(self.rotation())
    }
}

/// Ordered placements of one full generation pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Perimeter(pub Vec<Placement>);

impl Perimeter {
    /// Min/max corners over all piece positions, `None` when empty.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = self.0.first()?.position;
        Some(self.0.iter().fold((first, first), |(lo, hi), p| {
            (lo.min(p.position), hi.max(p.position))
        }))
    }
}

// ---------- Counts ----------

/// Columns in one perimeter: gate, both flanks, four corners, three full runs.
pub fn column_count(size: u32) -> usize {
    let size = size as usize;
    1 + 2 * (size / 2) + 4 + 3 * size
}

pub fn placement_count(height: u32, size: u32) -> usize {
    column_count(size) * (height as usize + 2)
}

// ---------- Walk ----------

/// Direction the cursor steps in before a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Heading {
    PosX,
    NegX,
    PosZ,
    NegZ,
}

impl Heading {
    fn step(self) -> Vec3 {
        match self {
            Heading::PosX => Vec3::X * UNIT_WIDTH,
            Heading::NegX => Vec3::NEG_X * UNIT_WIDTH,
            Heading::PosZ => Vec3::Z * UNIT_WIDTH,
            Heading::NegZ => Vec3::NEG_Z * UNIT_WIDTH,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Cursor {
    position: Vec3,
    yaw_deg: f32,
}

/// Owns the cursor for one pass; each step reads and advances it in place.
struct Walk<'s, S: PlacementSink + ?Sized> {
    height: u32,
    size: u32,
    origin: Vec3,
    cursor: Cursor,
    sink: &'s mut S,
}

impl<'s, S: PlacementSink + ?Sized> Walk<'s, S> {
    fn new(height: u32, size: u32, origin: Vec3, sink: &'s mut S) -> Self {
        Self {
            height,
            size,
            origin,
            cursor: Cursor { position: origin, yaw_deg: 0.0 },
            sink,
        }
    }

    fn run(mut self) {
        self.gate(0.0);
        self.gate_flanks(0.0);
        self.corner(Heading::PosX);
        self.wall_run(Heading::NegZ, 90.0);
        self.corner(Heading::NegZ);
        self.wall_run(Heading::NegX, 180.0);
        self.corner(Heading::NegX);
        self.wall_run(Heading::PosZ, 270.0);
        self.corner(Heading::PosZ);
    }

    /// Stack bottom, `height` mids and a top upwards from `base`.
    fn column(&mut self, family: PieceFamily, mut base: Vec3) -> Vec3 {
        let yaw_deg = self.cursor.yaw_deg;
        self.sink.place(Placement { kind: PieceKind::new(family, Tier::Bottom), position: base, yaw_deg });
        for _ in 0..self.height {
            base.y += UNIT_HEIGHT;
            self.sink.place(Placement { kind: PieceKind::new(family, Tier::Mid), position: base, yaw_deg });
        }
        base.y += UNIT_HEIGHT;
        self.sink.place(Placement { kind: PieceKind::new(family, Tier::Top), position: base, yaw_deg });
        base
    }

    /// Step along `heading` at ground level, then stack a column there.
    fn advance_column(&mut self, family: PieceFamily, heading: Heading) {
        self.cursor.position.y = 0.0;
        self.cursor.position += heading.step();
        self.cursor.position = self.column(family, self.cursor.position);
    }

    // The gate stacks from a copy of the origin; the cursor stays put.
    fn gate(&mut self, yaw_deg: f32) {
        self.cursor.yaw_deg = yaw_deg;
        self.column(PieceFamily::Gate, self.origin);
    }

    fn gate_flanks(&mut self, yaw_deg: f32) {
        self.cursor.yaw_deg = yaw_deg;
        let per_side = self.size / 2;
        for _ in 0..per_side {
            self.advance_column(PieceFamily::Wall, Heading::NegX);
        }
        self.cursor.position.x = self.origin.x;
        for _ in 0..per_side {
            self.advance_column(PieceFamily::Wall, Heading::PosX);
        }
    }

    fn corner(&mut self, heading: Heading) {
        self.advance_column(PieceFamily::Corner, heading);
    }

    fn wall_run(&mut self, heading: Heading, yaw_deg: f32) {
        self.cursor.yaw_deg = yaw_deg;
        for _ in 0..self.size {
            self.advance_column(PieceFamily::Wall, heading);
        }
    }
}

/// Stream one perimeter pass into `sink`. Callers clamp `height`/`size` to >= 1.
pub fn generate_into<S: PlacementSink + ?Sized>(height: u32, size: u32, origin: Vec3, sink: &mut S) {
    Walk::new(height, size, origin, sink).run();
}

pub fn generate(height: u32, size: u32, origin: Vec3) -> Perimeter {
    let mut out = Perimeter(Vec::with_capacity(placement_count(height, size)));
    generate_into(height, size, origin, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(p: &Perimeter, height: u32) -> Vec<&[Placement]> {
        p.0.chunks(height as usize + 2).collect()
    }

    #[test]
    fn placement_count_matches_closed_form() {
        for height in 1..=4 {
            for size in 1..=7 {
                let p = generate(height, size, Vec3::ZERO);
                assert_eq!(p.0.len(), placement_count(height, size), "h={height} s={size}");
            }
        }
        assert_eq!(placement_count(1, 3), (1 + 2 + 4 + 9) * 3);
    }

    #[test]
    fn default_castle_opens_with_gate_and_flanks() {
        let p = generate(1, 3, Vec3::ZERO);
        let s = &p.0;

        assert_eq!(s[0], Placement { kind: PieceKind::GateBottom, position: Vec3::ZERO, yaw_deg: 0.0 });
        assert_eq!(s[1], Placement { kind: PieceKind::GateMid, position: Vec3::new(0.0, UNIT_HEIGHT, 0.0), yaw_deg: 0.0 });
        assert_eq!(s[2], Placement { kind: PieceKind::GateTop, position: Vec3::new(0.0, 2.0 * UNIT_HEIGHT, 0.0), yaw_deg: 0.0 });

        // one flank column per side
        assert_eq!(s[3].kind, PieceKind::WallBottom);
        assert_eq!(s[3].position, Vec3::new(-UNIT_WIDTH, 0.0, 0.0));
        assert_eq!(s[6].kind, PieceKind::WallBottom);
        assert_eq!(s[6].position, Vec3::new(UNIT_WIDTH, 0.0, 0.0));
    }

    #[test]
    fn every_column_is_bottom_mids_top() {
        let height = 3;
        let p = generate(height, 4, Vec3::ZERO);
        for col in columns(&p, height) {
            let family = col[0].kind.family();
            assert_eq!(col[0].kind.tier(), Tier::Bottom);
            for mid in &col[1..=height as usize] {
                assert_eq!(mid.kind, PieceKind::new(family, Tier::Mid));
            }
            assert_eq!(col[height as usize + 1].kind, PieceKind::new(family, Tier::Top));
            // one xz spot per column, evenly stacked
            for (k, piece) in col.iter().enumerate() {
                assert_eq!(piece.position.x, col[0].position.x);
                assert_eq!(piece.position.z, col[0].position.z);
                assert_eq!(piece.position.y, col[0].position.y + k as f32 * UNIT_HEIGHT);
                assert_eq!(piece.yaw_deg, col[0].yaw_deg);
            }
        }
    }

    #[test]
    fn first_corner_sits_one_unit_past_last_flank() {
        let height = 1;
        let size = 5;
        let p = generate(height, size, Vec3::ZERO);
        let cols = columns(&p, height);
        let flanks = 2 * (size as usize / 2);
        let last_flank = cols[flanks][0];
        let corner = cols[flanks + 1][0];
        assert_eq!(corner.kind, PieceKind::CornerBottom);
        assert_eq!(corner.position, last_flank.position + Vec3::X * UNIT_WIDTH);
    }

    #[test]
    fn corners_and_runs_follow_the_walk() {
        let height = 1;
        let size = 2;
        let p = generate(height, size, Vec3::ZERO);
        let bases: Vec<(PieceKind, Vec3, f32)> = columns(&p, height)
            .iter()
            .map(|c| (c[0].kind, c[0].position, c[0].yaw_deg))
            .collect();

        let w = UNIT_WIDTH;
        let expected = vec![
            (PieceKind::GateBottom, Vec3::ZERO, 0.0),
            (PieceKind::WallBottom, Vec3::new(-w, 0.0, 0.0), 0.0),
            (PieceKind::WallBottom, Vec3::new(w, 0.0, 0.0), 0.0),
            (PieceKind::CornerBottom, Vec3::new(2.0 * w, 0.0, 0.0), 0.0),
            (PieceKind::WallBottom, Vec3::new(2.0 * w, 0.0, -w), 90.0),
            (PieceKind::WallBottom, Vec3::new(2.0 * w, 0.0, -2.0 * w), 90.0),
            (PieceKind::CornerBottom, Vec3::new(2.0 * w, 0.0, -3.0 * w), 90.0),
            (PieceKind::WallBottom, Vec3::new(w, 0.0, -3.0 * w), 180.0),
            (PieceKind::WallBottom, Vec3::new(0.0, 0.0, -3.0 * w), 180.0),
            (PieceKind::CornerBottom, Vec3::new(-w, 0.0, -3.0 * w), 180.0),
            (PieceKind::WallBottom, Vec3::new(-w, 0.0, -2.0 * w), 270.0),
            (PieceKind::WallBottom, Vec3::new(-w, 0.0, -w), 270.0),
            (PieceKind::CornerBottom, Vec3::new(-w, 0.0, 0.0), 270.0),
        ];
        assert_eq!(bases, expected);
    }

    fn count_of(p: &Perimeter, kind: PieceKind) -> usize {
        p.0.iter().filter(|pl| pl.kind == kind).count()
    }

    #[test]
    fn odd_size_keeps_short_flanks() {
        let p = generate(1, 3, Vec3::ZERO);
        // 1 flank per side, 3 per far run
        assert_eq!(count_of(&p, PieceKind::WallBottom), 2 + 3 * 3);
        assert_eq!(count_of(&p, PieceKind::CornerBottom), 4);
        assert_eq!(count_of(&p, PieceKind::GateBottom), 1);
    }

    #[test]
    fn size_one_has_no_flanks() {
        let p = generate(1, 1, Vec3::ZERO);
        let cols = columns(&p, 1);
        assert_eq!(cols[1][0].kind, PieceKind::CornerBottom);
        assert_eq!(cols[1][0].position, Vec3::new(UNIT_WIDTH, 0.0, 0.0));
    }

    #[test]
    fn repeated_generation_is_identical() {
        let origin = Vec3::new(12.0, 0.0, -8.0);
        assert_eq!(generate(2, 6, origin), generate(2, 6, origin));
    }

    #[test]
    fn growing_height_adds_one_mid_per_column() {
        let size = 4;
        let low = generate(1, size, Vec3::ZERO);
        let high = generate(2, size, Vec3::ZERO);
        let low_cols = columns(&low, 1);
        let high_cols = columns(&high, 2);
        assert_eq!(low_cols.len(), high_cols.len());

        for (a, b) in low_cols.iter().zip(&high_cols) {
            assert_eq!(b.len(), a.len() + 1);
            assert_eq!(a[0].position, b[0].position);
            // new mid slots in directly above the old ones
            assert_eq!(b[2].kind.tier(), Tier::Mid);
            assert_eq!(b[2].position.y, a[1].position.y + UNIT_HEIGHT);
        }
    }

    #[test]
    fn gate_starts_at_origin_height_walls_at_ground() {
        let origin = Vec3::new(3.0, 10.0, 5.0);
        let p = generate(1, 2, origin);
        let s = &p.0;
        assert_eq!(s[0].position, origin);
        assert_eq!(s[2].position.y, origin.y + 2.0 * UNIT_HEIGHT);
        assert_eq!(s[3].position, Vec3::new(origin.x - UNIT_WIDTH, 0.0, origin.z));
    }

    #[test]
    fn bounds_cover_the_footprint() {
        let p = generate(1, 2, Vec3::ZERO);
        let (lo, hi) = p.bounds().unwrap();
        assert_eq!(lo, Vec3::new(-UNIT_WIDTH, 0.0, -3.0 * UNIT_WIDTH));
        assert_eq!(hi, Vec3::new(2.0 * UNIT_WIDTH, 2.0 * UNIT_HEIGHT, 0.0));
        assert!(Perimeter::default().bounds().is_none());
    }

    #[test]
    fn transform_carries_yaw() {
        let p = Placement { kind: PieceKind::WallMid, position: Vec3::ONE, yaw_deg: 90.0 };
        let t = p.transform();
        assert_eq!(t.translation, Vec3::ONE);
        let fwd = t.rotation * Vec3::X;
        assert!((fwd - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn kinds_compose_and_decompose() {
        for kind in PieceKind::ALL {
            assert_eq!(PieceKind::new(kind.family(), kind.tier()), kind);
        }
    }
}
