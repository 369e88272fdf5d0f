//! Built-in `CoreBlocks` plugin: registers the vanilla block types.

use blockdrop_plugin_api::{LogLevel, Plugin, PluginInfo, ServerApi};

pub const CORE_BLOCKS: &str = "CoreBlocks";

/// Block types registered at startup, in id order after `Air`.
pub const CORE_BLOCK_NAMES: &[&str] = &[
    "Stone",
    "Grass",
    "Dirt",
    "Cobblestone",
    "Wood",
    "Sapling",
    "Bedrock",
    "Water",
    "Lava",
    "Sand",
    "Gravel",
    "GoldOre",
    "IronOre",
    "CoalOre",
    "TrunkOak",
    "Leaves",
    "Sponge",
    "Glass",
    "Granite",
    "Brick",
];

#[derive(Default)]
pub struct CoreBlocksPlugin;

impl Plugin for CoreBlocksPlugin {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            name: CORE_BLOCKS.into(),
            version: env!("CARGO_PKG_VERSION").into(),
            description: "Registers the core block types".into(),
            author: "blockdrop".into(),
        }
    }

    fn on_enable(&mut self, api: &mut dyn ServerApi) {
        for name in CORE_BLOCK_NAMES {
            api.register_block(name);
        }
        api.log(
            LogLevel::Info,
            &format!("[{CORE_BLOCKS}] Registered {} block types", CORE_BLOCK_NAMES.len()),
        );
    }
}
