use bevy::prelude::*;

mod setup;
mod castle;

use castle::builder::rebuild_castle;
use castle::CastlePlugin;

fn main() {
    App::new()
        // core engine plugins
        .add_plugins(DefaultPlugins)
        // loads the piece manifest, builds + rebuilds the castle
        .add_plugins(CastlePlugin)
        // camera, lights
        .add_systems(Startup, setup::setup)
        .add_systems(Update, setup::frame_castle.after(rebuild_castle))
        .run();
}
