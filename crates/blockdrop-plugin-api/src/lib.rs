//! Plugin API: traits, events, and server API for plugin authors.
//!
//! This crate defines the interface between the host server and plugins.
//! It depends only on blockdrop-game for the inventory model the host owns.

pub use blockdrop_game::PlayerInventory;

// ─── Types ───────────────────────────────────────────────────────────────────

/// Information about an online player, passed to plugins in events.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginPlayer {
    pub name: String,
    pub runtime_id: u64,
    pub position: (f32, f32, f32),
}

/// Block position for plugin events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginBlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// Log level for plugin logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Debug,
}

/// Result of dispatching an event to a plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Continue normal handling.
    Continue,
    /// Event was cancelled by this plugin.
    Cancelled,
}

// ─── Events ──────────────────────────────────────────────────────────────────

/// All events that plugins can listen to.
#[derive(Debug, Clone)]
pub enum PluginEvent {
    // --- Player events ---
    PlayerJoin {
        player: PluginPlayer,
    },
    PlayerQuit {
        player: PluginPlayer,
    },

    // --- Block events ---
    /// A player destroyed a block. `block_id` is the block that was there.
    BlockBreak {
        player: PluginPlayer,
        position: PluginBlockPos,
        block_id: u32,
    },

    // --- Server events ---
    /// Every plugin has been enabled; registries are complete.
    ServerStarted,
    ServerStopping,
}

impl PluginEvent {
    /// Whether this event type can be cancelled by a plugin.
    pub fn is_cancellable(&self) -> bool {
        matches!(self, PluginEvent::BlockBreak { .. })
    }
}

// ─── Plugin trait ────────────────────────────────────────────────────────────

/// Metadata about a plugin.
#[derive(Debug, Clone)]
pub struct PluginInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: String,
}

/// The Plugin trait, implemented by built-in and external plugins.
pub trait Plugin: Send {
    /// Return plugin metadata.
    fn info(&self) -> PluginInfo;

    /// Names of plugins that must be enabled before this one.
    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }

    /// Called when the plugin is loaded. Use `api` to register blocks and commands.
    fn on_enable(&mut self, api: &mut dyn ServerApi);

    /// Called when the plugin is unloaded.
    fn on_disable(&mut self) {}

    /// Called for every dispatched event. Return `Cancelled` to cancel cancellable events.
    fn on_event(&mut self, event: &PluginEvent, api: &mut dyn ServerApi) -> EventResult {
        let _ = (event, api);
        EventResult::Continue
    }

    /// Called when a plugin-registered command is executed. Return a response message.
    fn on_command(
        &mut self,
        command: &str,
        args: &[String],
        sender: &str,
        api: &mut dyn ServerApi,
    ) -> Option<String> {
        let _ = (command, args, sender, api);
        None
    }

    /// Return a default config as JSON. If `Some`, the plugin gets a config file.
    fn default_config(&self) -> Option<serde_json::Value> {
        None
    }

    /// Called with the loaded config (from `plugins/<name>/config.json`).
    fn load_config(&mut self, _config: serde_json::Value) {}
}

// ─── Server API ──────────────────────────────────────────────────────────────

/// Access to server state, passed to plugins during callbacks.
///
/// Inventories are borrowed in place for the duration of the callback.
/// Messages and notifications are delivered after the callback returns.
pub trait ServerApi {
    // --- Players ---
    fn send_message(&mut self, player_name: &str, message: &str);

    // --- Inventory ---
    fn inventory_mut(&mut self, player_name: &str) -> Option<&mut PlayerInventory>;
    /// Ask the host to re-sync the player's inventory with their client.
    fn notify_inventory(&mut self, player_name: &str);

    // --- Block registry ---
    fn block_id(&self, name: &str) -> Option<u32>;
    fn block_name(&self, block_id: u32) -> Option<String>;
    /// Register a block type, returning its id. Registering a known name returns the existing id.
    fn register_block(&mut self, name: &str) -> u32;

    // --- Server ---
    fn log(&self, level: LogLevel, message: &str);

    // --- Commands ---
    fn register_command(&mut self, name: &str, description: &str, plugin_name: &str);
}

// ─── Tests ───────────────────────────────────────────────────────────────────
