pub mod builder;
pub mod config;
pub mod layout;
pub mod plugin;
pub mod queue;
pub mod registry;
pub mod sink;

pub use plugin::CastlePlugin;
