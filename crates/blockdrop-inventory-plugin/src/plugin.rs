//! `InventoryPlugin`: the event-side adapter around [`PlacementPolicy`].

use blockdrop_game::{LimitError, PlacementPolicy, StackLimits};
use blockdrop_plugin_api::{
    EventResult, LogLevel, Plugin, PluginEvent, PluginInfo, PluginPlayer, ServerApi,
};
use tracing::warn;

use crate::config::{InventoryConfig, StackLimitEntry};

pub const PLUGIN_NAME: &str = "InventorySystem";

/// Plugin that must be enabled first: it registers the block types.
const CORE_BLOCKS: &str = "CoreBlocks";

pub struct InventoryPlugin {
    config: InventoryConfig,
    policy: PlacementPolicy,
    /// Configured limits whose block names didn't resolve yet.
    pending: Vec<StackLimitEntry>,
}

impl Default for InventoryPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl InventoryPlugin {
    pub fn new() -> Self {
        Self::with_config(InventoryConfig::default())
    }

    pub fn with_config(config: InventoryConfig) -> Self {
        let policy = PlacementPolicy::new(
            StackLimits::new(config.default_max_stack),
            config.grid.into(),
        );
        Self {
            config,
            policy,
            pending: Vec::new(),
        }
    }

    pub fn policy(&self) -> &PlacementPolicy {
        &self.policy
    }

    /// Block names from the config that the registry didn't know.
    pub fn unresolved(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(|e| e.block.as_str())
    }

    /// Try to resolve `entries`. Entries whose name is unknown are kept for
    /// a later retry; invalid limits are logged and dropped.
    fn apply_limits(&mut self, entries: Vec<StackLimitEntry>, api: &dyn ServerApi) {
        let errors = self.policy.limits_mut().apply(
            entries.iter().map(|e| (e.block.as_str(), e.limit)),
            |name| api.block_id(name),
        );
        for error in errors {
            match &error {
                LimitError::UnresolvedBlock(name) => {
                    if self.pending.iter().any(|e| &e.block == name) {
                        continue;
                    }
                    // Later entries for the same block win, as when they resolve.
                    if let Some(entry) = entries.iter().rfind(|e| e.block == error.block()) {
                        self.pending.push(entry.clone());
                    }
                }
                LimitError::ZeroLimit { .. } => api.log(
                    LogLevel::Warn,
                    &format!("[{PLUGIN_NAME}] Ignoring stack limit: {error}"),
                ),
            }
        }
    }

    fn handle_block_break(&self, player: &PluginPlayer, block_id: u32, api: &mut dyn ServerApi) {
        let block_name = api
            .block_name(block_id)
            .unwrap_or_else(|| format!("block #{block_id}"));

        let Some(inventory) = api.inventory_mut(&player.name) else {
            api.log(
                LogLevel::Warn,
                &format!("[{PLUGIN_NAME}] No inventory for {}, dropping {block_name}", player.name),
            );
            return;
        };
        let placement = self.policy.place(inventory, block_id);

        if placement.is_placed() {
            api.notify_inventory(&player.name);
        } else {
            api.log(
                LogLevel::Debug,
                &format!("[{PLUGIN_NAME}] {}'s inventory is full, {block_name} lost", player.name),
            );
        }
        api.send_message(&player.name, &placement.status_message(&block_name));
    }
}

impl Plugin for InventoryPlugin {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            name: PLUGIN_NAME.into(),
            version: env!("CARGO_PKG_VERSION").into(),
            description: "Puts broken blocks into the player's inventory".into(),
            author: "blockdrop".into(),
        }
    }

    fn dependencies(&self) -> Vec<String> {
        vec![CORE_BLOCKS.into()]
    }

    fn on_enable(&mut self, api: &mut dyn ServerApi) {
        self.pending.clear();
        self.policy = PlacementPolicy::new(
            StackLimits::new(self.config.default_max_stack),
            self.config.grid.into(),
        );
        let entries = self.config.stack_limits.clone();
        self.apply_limits(entries, api);

        for name in self.unresolved() {
            api.log(
                LogLevel::Warn,
                &format!("[{PLUGIN_NAME}] Stack limit for {name} not applied yet: unknown block type"),
            );
        }
        api.register_command("stacklimit", "Show the max stack size of a block", PLUGIN_NAME);
        api.log(
            LogLevel::Info,
            &format!(
                "[{PLUGIN_NAME}] Loaded {} custom stack sizes",
                self.policy.limits().len()
            ),
        );
    }

    fn on_event(&mut self, event: &PluginEvent, api: &mut dyn ServerApi) -> EventResult {
        match event {
            PluginEvent::BlockBreak {
                player, block_id, ..
            } => self.handle_block_break(player, *block_id, api),
            PluginEvent::ServerStarted if !self.pending.is_empty() => {
                let retry = std::mem::take(&mut self.pending);
                let before = self.policy.limits().len();
                self.apply_limits(retry, api);
                for name in self.unresolved() {
                    api.log(
                        LogLevel::Warn,
                        &format!("[{PLUGIN_NAME}] Unknown block type {name}, stack limit not applied"),
                    );
                }
                let resolved = self.policy.limits().len() - before;
                if resolved > 0 {
                    api.log(
                        LogLevel::Info,
                        &format!("[{PLUGIN_NAME}] Resolved {resolved} more stack limits after startup"),
                    );
                }
            }
            _ => {}
        }
        EventResult::Continue
    }

    fn on_command(
        &mut self,
        command: &str,
        args: &[String],
        _sender: &str,
        api: &mut dyn ServerApi,
    ) -> Option<String> {
        if command != "stacklimit" {
            return None;
        }
        let Some(block) = args.first() else {
            return Some("Usage: /stacklimit <block>".into());
        };
        Some(match api.block_id(block) {
            Some(id) => format!("{block}: max stack {}", self.policy.limits().limit(id)),
            None => format!("Unknown block: {block}"),
        })
    }

    fn default_config(&self) -> Option<serde_json::Value> {
        serde_json::to_value(InventoryConfig::default()).ok()
    }

    fn load_config(&mut self, config: serde_json::Value) {
        match serde_json::from_value::<InventoryConfig>(config) {
            Ok(config) => *self = Self::with_config(config),
            Err(e) => warn!("Invalid {PLUGIN_NAME} config, using defaults: {e}"),
        }
    }
}
