//! Built-in inventory plugin: puts the block a player breaks into their
//! inventory, following the placement rules in `blockdrop_game::placement`.

mod config;
mod plugin;

pub use config::{GridConfig, InventoryConfig, StackLimitEntry};
pub use plugin::{InventoryPlugin, PLUGIN_NAME};
