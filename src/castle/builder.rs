// src/castle/builder.rs
//! Scene side of the castle: tag, sweep, rebuild, spawn.
//! Bundle-free: we add components explicitly (Transform, Visibility, SceneRoot, Mesh3d, ...).

use bevy::math::primitives::Cuboid;
use bevy::pbr::MeshMaterial3d;
use bevy::prelude::*;
use std::collections::HashMap;

use super::config::{apply_delta, LayoutConfig, LayoutField};
use super::layout::{generate_into, PieceKind};
use super::plugin::PieceRegistryHandle;
use super::queue::{PieceSpawnQueue, SpawnQueueConfig};
use super::registry::{PieceRegistry, RenderRef};

/// Tag on every spawned castle piece.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastlePart {
    pub generation: u64,
    pub kind: PieceKind,
}

/// Id of the perimeter currently standing (or being spawned).
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastleGeneration(pub u64);

/// Grow or shrink one layout field; clamped to `1..=MAX_*`.
#[derive(Event, Debug, Clone, Copy)]
pub struct AdjustLayout {
    pub field: LayoutField,
    pub delta: i32,
}

/// Throw away the current castle and build one from `LayoutConfig`.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct RegenerateCastle;

pub fn apply_layout_adjustments(
    mut evr: EventReader<AdjustLayout>,
    mut config: ResMut<LayoutConfig>,
    mut regen: EventWriter<RegenerateCastle>,
) {
    let before = *config;
    let mut next = before;
    for ev in evr.read() {
        next = apply_delta(next, ev.field, ev.delta);
    }
    if next != before {
        *config = next;
        info!(
            "Castle: layout height {} -> {}, size {} -> {}",
            before.height, next.height, before.size, next.size
        );
        regen.write(RegenerateCastle);
    }
}

/// Sweep every tagged piece, then queue a fresh perimeter.
pub fn rebuild_castle(
    mut evr: EventReader<RegenerateCastle>,
    config: Res<LayoutConfig>,
    mut generation: ResMut<CastleGeneration>,
    mut queue: ResMut<PieceSpawnQueue>,
    parts: Query<Entity, With<CastlePart>>,
    mut commands: Commands,
) {
    // several requests in one frame collapse into one rebuild
    if evr.read().count() == 0 {
        return;
    }

    let mut swept = 0usize;
    for e in &parts {
        commands.entity(e).despawn();
        swept += 1;
    }

    generation.0 += 1;
    queue.restart(generation.0);
    let cfg = config.clamped();
    generate_into(cfg.height, cfg.size, cfg.origin, &mut *queue);

    info!(
        "Castle: generation {} (height {}, size {}) swept {} pieces, queued {}",
        generation.0,
        cfg.height,
        cfg.size,
        swept,
        queue.len()
    );
}

/// Spawn up to `max_per_frame` queued pieces.
pub fn drain_spawn_queue(
    mut commands: Commands,
    assets: Res<AssetServer>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut cuboids: Local<CuboidHandles>,
    handle: Res<PieceRegistryHandle>,
    registries: Res<Assets<PieceRegistry>>,
    generation: Res<CastleGeneration>,
    mut queue: ResMut<PieceSpawnQueue>,
    cfg: Res<SpawnQueueConfig>,
) {
    let Some(reg) = registries.get(&handle.0) else { return };

    let take = cfg.max_per_frame.min(queue.len());
    if take == 0 { return; }

    let mut spawner = PieceSpawner {
        assets: &assets,
        meshes: &mut meshes,
        materials: &mut materials,
        cuboids: &mut cuboids,
    };

    let mut skipped = 0usize;
    for req in queue.items.drain(..take) {
        if req.generation != generation.0 {
            continue;
        }
        let kind = req.placement.kind;
        let Some(render) = reg.render_for(kind) else {
            skipped += 1;
            continue;
        };
        let root = spawner.spawn(&mut commands, kind, render, req.placement.transform());
        commands.entity(root).insert((
            CastlePart { generation: req.generation, kind },
            Name::new(format!("{kind:?}")),
        ));
    }

    if skipped > 0 {
        warn!("Castle: skipped {} pieces with no render binding", skipped);
    }
    if queue.is_empty() {
        debug!("Castle: generation {} fully spawned", generation.0);
    }
}

/// Mesh + material shared by every piece of one cuboid-bound kind.
pub type CuboidHandles = HashMap<PieceKind, (Handle<Mesh>, Handle<StandardMaterial>)>;

/// Borrowed asset stores for turning a `RenderRef` into entities.
pub struct PieceSpawner<'a> {
    pub assets: &'a AssetServer,
    pub meshes: &'a mut Assets<Mesh>,
    pub materials: &'a mut Assets<StandardMaterial>,
    pub cuboids: &'a mut CuboidHandles,
}

impl PieceSpawner<'_> {
    /// Spawn `render` at `transform` and return the root.
    pub fn spawn(
        &mut self,
        commands: &mut Commands,
        kind: PieceKind,
        render: &RenderRef,
        transform: Transform,
    ) -> Entity {
        // Common vis/transform components we want on every spawned root.
        let vis_components = (
            Visibility::Visible,
            InheritedVisibility::VISIBLE,
            ViewVisibility::default(),
        );

        match render {
            RenderRef::Scene { path } => {
                let scene: Handle<Scene> = self.assets.load(path.as_str());
                commands
                    .spawn((transform, GlobalTransform::IDENTITY, vis_components, SceneRoot(scene)))
                    .id()
            }

            RenderRef::MeshMaterial { mesh, material } => {
                let mesh_h: Handle<Mesh> = self.assets.load(mesh.as_str());
                let mat_h: Handle<StandardMaterial> = match material {
                    Some(m) => self.assets.load(m.as_str()),
                    None => self.materials.add(StandardMaterial::default()),
                };
                commands
                    .spawn((
                        transform,
                        GlobalTransform::IDENTITY,
                        vis_components,
                        Mesh3d(mesh_h),
                        MeshMaterial3d(mat_h),
                    ))
                    .id()
            }

            RenderRef::Cuboid { size, color } => {
                let meshes = &mut *self.meshes;
                let materials = &mut *self.materials;
                let (mesh_h, mat_h) = self
                    .cuboids
                    .entry(kind)
                    .or_insert_with(|| {
                        let mesh = meshes.add(Mesh::from(Cuboid::new(size.x, size.y, size.z)));
                        let mat = materials.add(StandardMaterial {
                            base_color: Color::srgb(color.0, color.1, color.2),
                            perceptual_roughness: 0.9,
                            ..Default::default()
                        });
                        (mesh, mat)
                    })
                    .clone();
                commands
                    .spawn((
                        transform,
                        GlobalTransform::IDENTITY,
                        vis_components,
                        Mesh3d(mesh_h),
                        MeshMaterial3d(mat_h),
                    ))
                    .id()
            }
        }
    }
}
