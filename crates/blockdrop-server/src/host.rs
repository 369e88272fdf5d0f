//! In-memory host state: block registry and online players.

use std::collections::HashMap;

use blockdrop_game::PlayerInventory;
use blockdrop_plugin_api::PluginPlayer;
use tracing::debug;

/// Block type registry. Ids are assigned in registration order; id 0 is `Air`.
#[derive(Debug)]
pub struct BlockRegistry {
    names: Vec<String>,
    by_name: HashMap<String, u32>,
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            names: Vec::new(),
            by_name: HashMap::new(),
        };
        registry.register("Air");
        registry
    }

    /// Register `name`, returning its id. Known names keep their id.
    pub fn register(&mut self, name: &str) -> u32 {
        if let Some(id) = self.by_name.get(name) {
            return *id;
        }
        let id = self.names.len() as u32;
        self.names.push(name.to_string());
        self.by_name.insert(name.to_string(), id);
        debug!("Registered block {name} as #{id}");
        id
    }

    pub fn id(&self, name: &str) -> Option<u32> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, id: u32) -> Option<&str> {
        self.names.get(id as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}

/// A connected player and the inventory the host keeps for them.
#[derive(Debug)]
pub struct OnlinePlayer {
    pub info: PluginPlayer,
    pub inventory: PlayerInventory,
}

/// Everything plugins can read or change through `ServerApi`.
#[derive(Debug)]
pub struct HostState {
    pub blocks: BlockRegistry,
    players: HashMap<String, OnlinePlayer>,
    hotbar_size: usize,
    next_runtime_id: u64,
}

impl HostState {
    pub fn new(hotbar_size: usize) -> Self {
        Self {
            blocks: BlockRegistry::new(),
            players: HashMap::new(),
            hotbar_size,
            next_runtime_id: 1,
        }
    }

    /// Add a player with an empty inventory. Returns `None` if already online.
    pub fn join(&mut self, name: &str) -> Option<&PluginPlayer> {
        if self.players.contains_key(name) {
            return None;
        }
        let info = PluginPlayer {
            name: name.to_string(),
            runtime_id: self.next_runtime_id,
            position: (0.5, 64.0, 0.5),
        };
        self.next_runtime_id += 1;
        let inventory = PlayerInventory::with_hotbar_size(self.hotbar_size);
        let player = self
            .players
            .entry(name.to_string())
            .or_insert(OnlinePlayer { info, inventory });
        Some(&player.info)
    }

    pub fn leave(&mut self, name: &str) -> Option<OnlinePlayer> {
        self.players.remove(name)
    }

    pub fn player(&self, name: &str) -> Option<&OnlinePlayer> {
        self.players.get(name)
    }

    pub fn player_mut(&mut self, name: &str) -> Option<&mut OnlinePlayer> {
        self.players.get_mut(name)
    }

    /// Online players, sorted by name.
    pub fn players(&self) -> Vec<PluginPlayer> {
        let mut players: Vec<PluginPlayer> =
            self.players.values().map(|p| p.info.clone()).collect();
        players.sort_by(|a, b| a.name.cmp(&b.name));
        players
    }
}
