// src/castle/registry.rs
//! Data-driven piece bindings + loader.

use bevy::asset::{io::Reader, AssetLoader, LoadContext};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::config::LayoutConfig;
use super::layout::{PieceFamily, PieceKind, Tier, UNIT_HEIGHT, UNIT_WIDTH};

// ---------- Public plugin to register asset+loader ----------

pub struct PieceRegistryAssetPlugin;

impl Plugin for PieceRegistryAssetPlugin {
    fn build(&self, app: &mut App) {
        app.init_asset::<PieceRegistry>()
            .register_asset_loader(PieceRegistryLoader);
    }
}

// ---------- Render refs (data form) ----------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RenderRef {
    Scene { path: String },
    MeshMaterial { mesh: String, material: Option<String> },
    /// Built-in box, no files needed. `color` is sRGB.
    Cuboid { size: Vec3, color: (f32, f32, f32) },
}

/// Block stand-in for `kind`, sized to the layout grid.
pub fn default_render(kind: PieceKind) -> RenderRef {
    let (size, base) = match kind.family() {
        PieceFamily::Gate => (Vec3::new(UNIT_WIDTH, UNIT_HEIGHT, 1.6), (0.45, 0.32, 0.20)),
        PieceFamily::Wall => (Vec3::new(UNIT_WIDTH, UNIT_HEIGHT, 1.0), (0.62, 0.60, 0.55)),
        PieceFamily::Corner => (Vec3::new(UNIT_WIDTH * 1.25, UNIT_HEIGHT, UNIT_WIDTH * 1.25), (0.52, 0.50, 0.47)),
    };
    // darker footing, lighter battlements
    let shade: f32 = match kind.tier() {
        Tier::Bottom => 0.8,
        Tier::Mid => 1.0,
        Tier::Top => 1.2,
    };
    let c = |v: f32| (v * shade).min(1.0);
    RenderRef::Cuboid { size, color: (c(base.0), c(base.1), c(base.2)) }
}

// ---------- Manifest (data form) ----------

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PieceDef {
    pub kind: PieceKind,
    pub render: RenderRef,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CastleManifest {
    /// Starting layout; falls back to `LayoutConfig::default()` when absent.
    #[serde(default)]
    pub layout: Option<LayoutConfig>,
    pub pieces: Vec<PieceDef>,
}

// ---------- Runtime registry asset ----------

#[derive(Asset, TypePath, Clone, Debug)]
pub struct PieceRegistry {
    pub layout: Option<LayoutConfig>,
    by_kind: HashMap<PieceKind, RenderRef>,
}

impl PieceRegistry {
    pub fn render_for(&self, kind: PieceKind) -> Option<&RenderRef> {
        self.by_kind.get(&kind)
    }

    pub fn missing_kinds(&self) -> Vec<PieceKind> {
        PieceKind::ALL
            .into_iter()
            .filter(|k| !self.by_kind.contains_key(k))
            .collect()
    }

    /// Every kind bound to its `default_render` block; no starting layout.
    pub fn builtin() -> Self {
        Self {
            layout: None,
            by_kind: PieceKind::ALL.into_iter().map(|k| (k, default_render(k))).collect(),
        }
    }

    pub fn from_manifest(manifest: CastleManifest) -> Result<Self, PieceRegistryLoadError> {
        let mut by_kind = HashMap::with_capacity(manifest.pieces.len());
        let mut first_index = HashMap::with_capacity(manifest.pieces.len());
        for (i, def) in manifest.pieces.into_iter().enumerate() {
            if let Some(&first) = first_index.get(&def.kind) {
                return Err(PieceRegistryLoadError::DuplicateKind {
                    kind: def.kind,
                    first,
                    second: i,
                });
            }
            first_index.insert(def.kind, i);
            by_kind.insert(def.kind, def.render);
        }

        Ok(Self {
            layout: manifest.layout.map(LayoutConfig::clamped),
            by_kind,
        })
    }

    pub fn from_ron_bytes(bytes: &[u8]) -> Result<Self, PieceRegistryLoadError> {
        let manifest: CastleManifest =
            ron::de::from_bytes(bytes).map_err(|e| PieceRegistryLoadError::Ron(e.to_string()))?;
        Self::from_manifest(manifest)
    }
}

// ---------- Asset loader for `.castle.ron` ----------

#[derive(Default)]
pub struct PieceRegistryLoader;

impl AssetLoader for PieceRegistryLoader {
    type Asset = PieceRegistry;
    type Settings = ();
    type Error = PieceRegistryLoadError;

    fn extensions(&self) -> &[&str] {
        &["castle.ron"]
    }

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &Self::Settings,
        load_context: &mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;
        let registry = PieceRegistry::from_ron_bytes(&bytes)?;

        let missing = registry.missing_kinds();
        if !missing.is_empty() {
            warn!(
                "Castle: '{}' has no render for {:?}; those pieces will be skipped",
                load_context.path().display(),
                missing
            );
        }
        Ok(registry)
    }
}

// ---------- Loader errors ----------

#[derive(thiserror::Error, Debug)]
pub enum PieceRegistryLoadError {
    #[error("I/O while reading castle manifest: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Ron(String),
    #[error("Duplicate piece kind {kind:?} (first idx {first}, second idx {second})")]
    DuplicateKind { kind: PieceKind, first: usize, second: usize },
}
