use bevy::prelude::*;

use crate::castle::builder::RegenerateCastle;
use crate::castle::config::LayoutConfig;

#[derive(Component)]
pub struct MainCamera;

pub fn setup(
    mut commands: Commands,
) {
    // 1) Light
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(20.0, 40.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // 2) Camera (re-aimed by `frame_castle` once a castle exists)
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(-20.0, 30.0, 40.0).looking_at(Vec3::ZERO, Vec3::Y),
        MainCamera,
    ));
}

/// Keep the whole perimeter in view whenever it is rebuilt.
pub fn frame_castle(
    mut evr: EventReader<RegenerateCastle>,
    config: Res<LayoutConfig>,
    mut query: Query<&mut Transform, With<MainCamera>>,
) {
    if evr.read().count() == 0 { return; }
    let Ok(mut tf) = query.single_mut() else { return; };
    let Some((lo, hi)) = config.clamped().generate().bounds() else { return; };

    let center = (lo + hi) * 0.5;
    let radius = (hi - lo).length().max(1.0);
    // front-left of the gate side, looking down at the middle
    tf.translation = center + Vec3::new(-0.6, 0.8, 1.2).normalize() * radius * 1.4;
    tf.look_at(center, Vec3::Y);
}
