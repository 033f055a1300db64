//! Castle plugin wiring (glue).
//! - Piece registry asset/loader
//! - Layout config + adjust/regenerate events
//! - Rebuild + budgeted spawn systems

use bevy::asset::LoadState;
use bevy::prelude::*;

use super::builder::{
    apply_layout_adjustments, drain_spawn_queue, rebuild_castle, AdjustLayout, CastleGeneration,
    RegenerateCastle,
};
use super::config::LayoutConfig;
use super::queue::{PieceSpawnQueue, SpawnQueueConfig};
use super::registry::{PieceRegistry, PieceRegistryAssetPlugin};

/// Configure where the piece manifest lives.
#[derive(Resource, Clone)]
pub struct CastleSettings {
    pub manifest_path: String,
}
impl Default for CastleSettings {
    fn default() -> Self {
        Self {
            manifest_path: "castle/pieces.castle.ron".to_string(),
        }
    }
}

/// Handle to the loaded PieceRegistry asset.
#[derive(Resource, Default)]
pub struct PieceRegistryHandle(pub Handle<PieceRegistry>);

pub struct CastlePlugin;
impl Plugin for CastlePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(PieceRegistryAssetPlugin)
            .init_resource::<CastleSettings>()
            .init_resource::<PieceRegistryHandle>()
            .init_resource::<LayoutConfig>()
            .init_resource::<CastleGeneration>()
            .init_resource::<PieceSpawnQueue>()
            .init_resource::<SpawnQueueConfig>()
            .add_event::<AdjustLayout>()
            .add_event::<RegenerateCastle>()
            .add_systems(Startup, load_registry)
            .add_systems(
                Update,
                (
                    on_registry_ready,
                    apply_layout_adjustments,
                    rebuild_castle,
                    drain_spawn_queue,
                )
                    .chain(),
            );
    }
}

/// Startup: request loading the manifest, store handle.
fn load_registry(
    mut handle_res: ResMut<PieceRegistryHandle>,
    settings: Res<CastleSettings>,
    assets: Res<AssetServer>,
) {
    if handle_res.0.is_strong() { return; }
    let h: Handle<PieceRegistry> = assets.load(settings.manifest_path.as_str());
    handle_res.0 = h;
    info!("Castle: loading pieces from '{}'", settings.manifest_path);
}

/// Update: once the registry is in, adopt its layout and build the first castle.
/// A manifest that fails to load is replaced by the built-in block set.
fn on_registry_ready(
    assets: Res<AssetServer>,
    mut handle_res: ResMut<PieceRegistryHandle>,
    mut registries: ResMut<Assets<PieceRegistry>>,
    mut config: ResMut<LayoutConfig>,
    mut regen: EventWriter<RegenerateCastle>,
    mut done: Local<bool>,
) {
    if *done { return; }

    if registries.get(&handle_res.0).is_none() {
        let Some(LoadState::Failed(err)) = assets.get_load_state(handle_res.0.id()) else { return };
        warn!("Castle: piece manifest failed to load ({err}); using built-in blocks");
        handle_res.0 = registries.add(PieceRegistry::builtin());
        *config = LayoutConfig::default();
    }
    let Some(reg) = registries.get(&handle_res.0) else { return };
    *done = true;

    if let Some(layout) = reg.layout {
        *config = layout;
    }
    info!(
        "Castle: registry ready, building height {} size {} at {:?}",
        config.height, config.size, config.origin
    );
    regen.write(RegenerateCastle);
}
