//! Plugin manager: loads, enables, and dispatches events to plugins.

use std::collections::HashMap;
use std::path::Path;

use blockdrop_plugin_api::{EventResult, LogLevel, Plugin, PluginEvent, PlayerInventory, ServerApi};
use tracing::{debug, error, info, warn};

use crate::error::PluginError;
use crate::host::HostState;

// ─── Types ───────────────────────────────────────────────────────────────────

/// Side-effect requested by a plugin, delivered after the callback returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    SendMessage {
        player_name: String,
        message: String,
    },
    NotifyInventory {
        player_name: String,
    },
    RegisterCommand {
        name: String,
        description: String,
        plugin_name: String,
    },
}

// ─── ServerApiImpl ───────────────────────────────────────────────────────────

/// Implements `ServerApi` over the live host state. Inventory and registry
/// changes happen in place; messages and notifications are queued.
struct ServerApiImpl<'a> {
    host: &'a mut HostState,
    actions: Vec<PendingAction>,
}

impl<'a> ServerApiImpl<'a> {
    fn new(host: &'a mut HostState) -> Self {
        Self {
            host,
            actions: Vec::new(),
        }
    }

    fn take_actions(self) -> Vec<PendingAction> {
        self.actions
    }
}

impl ServerApi for ServerApiImpl<'_> {
    fn send_message(&mut self, player_name: &str, message: &str) {
        self.actions.push(PendingAction::SendMessage {
            player_name: player_name.to_string(),
            message: message.to_string(),
        });
    }

    fn inventory_mut(&mut self, player_name: &str) -> Option<&mut PlayerInventory> {
        self.host.player_mut(player_name).map(|p| &mut p.inventory)
    }

    fn notify_inventory(&mut self, player_name: &str) {
        self.actions.push(PendingAction::NotifyInventory {
            player_name: player_name.to_string(),
        });
    }

    fn block_id(&self, name: &str) -> Option<u32> {
        self.host.blocks.id(name)
    }

    fn block_name(&self, block_id: u32) -> Option<String> {
        self.host.blocks.name(block_id).map(str::to_string)
    }

    fn register_block(&mut self, name: &str) -> u32 {
        self.host.blocks.register(name)
    }

    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Info => info!("[plugin] {message}"),
            LogLevel::Warn => warn!("[plugin] {message}"),
            LogLevel::Error => error!("[plugin] {message}"),
            LogLevel::Debug => debug!("[plugin] {message}"),
        }
    }

    fn register_command(&mut self, name: &str, description: &str, plugin_name: &str) {
        self.actions.push(PendingAction::RegisterCommand {
            name: name.to_string(),
            description: description.to_string(),
            plugin_name: plugin_name.to_string(),
        });
    }
}

// ─── PluginManager ───────────────────────────────────────────────────────────

/// Manages all loaded plugins and their command registrations.
pub struct PluginManager {
    plugins: Vec<Box<dyn Plugin>>,
    /// Commands registered by plugins: command_name → plugin_name.
    pub plugin_commands: HashMap<String, String>,
}

impl Default for PluginManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginManager {
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
            plugin_commands: HashMap::new(),
        }
    }

    /// Register a plugin (call before enable_all).
    pub fn register(&mut self, plugin: Box<dyn Plugin>) -> Result<(), PluginError> {
        let name = plugin.info().name;
        if self.plugins.iter().any(|p| p.info().name == name) {
            return Err(PluginError::DuplicatePlugin(name));
        }
        info!("Registered plugin: {name}");
        self.plugins.push(plugin);
        Ok(())
    }

    /// Names of registered plugins, in enable order once enabled.
    pub fn plugin_names(&self) -> Vec<String> {
        self.plugins.iter().map(|p| p.info().name).collect()
    }

    /// Order plugins so every plugin comes after its dependencies.
    /// Ties keep registration order.
    fn enable_order(&self) -> Result<Vec<usize>, PluginError> {
        let names: Vec<String> = self.plugins.iter().map(|p| p.info().name).collect();
        let deps: Vec<Vec<String>> = self.plugins.iter().map(|p| p.dependencies()).collect();

        for (name, plugin_deps) in names.iter().zip(&deps) {
            if let Some(missing) = plugin_deps.iter().find(|d| !names.contains(d)) {
                return Err(PluginError::MissingDependency {
                    plugin: name.clone(),
                    dependency: missing.clone(),
                });
            }
        }

        let mut order: Vec<usize> = Vec::with_capacity(names.len());
        while order.len() < names.len() {
            let next = (0..names.len()).find(|i| {
                !order.contains(i)
                    && deps[*i]
                        .iter()
                        .all(|d| order.iter().any(|&o| &names[o] == d))
            });
            match next {
                Some(i) => order.push(i),
                None => {
                    let stuck = (0..names.len())
                        .filter(|i| !order.contains(i))
                        .map(|i| names[i].clone())
                        .collect();
                    return Err(PluginError::DependencyCycle(stuck));
                }
            }
        }
        Ok(order)
    }

    /// Enable all registered plugins, dependencies first.
    /// Returns the non-internal actions requested during `on_enable`.
    pub fn enable_all(&mut self, host: &mut HostState) -> Result<Vec<PendingAction>, PluginError> {
        let order = self.enable_order()?;
        let mut slots: Vec<Option<Box<dyn Plugin>>> =
            std::mem::take(&mut self.plugins).into_iter().map(Some).collect();
        self.plugins = order.into_iter().filter_map(|i| slots[i].take()).collect();

        let mut all_actions = Vec::new();
        for plugin in &mut self.plugins {
            let mut api = ServerApiImpl::new(host);
            plugin.on_enable(&mut api);
            all_actions.extend(api.take_actions());
            debug!("Enabled plugin {}", plugin.info().name);
        }
        Ok(self.apply_internal_actions(all_actions))
    }

    /// Disable all registered plugins, dependents first.
    pub fn disable_all(&mut self) {
        for plugin in self.plugins.iter_mut().rev() {
            plugin.on_disable();
        }
    }

    /// Dispatch an event to all plugins. Returns the combined result and pending actions.
    pub fn dispatch(
        &mut self,
        event: &PluginEvent,
        host: &mut HostState,
    ) -> (EventResult, Vec<PendingAction>) {
        let cancellable = event.is_cancellable();
        let mut all_actions = Vec::new();
        let mut final_result = EventResult::Continue;

        for plugin in &mut self.plugins {
            let mut api = ServerApiImpl::new(host);
            let result = plugin.on_event(event, &mut api);
            all_actions.extend(api.take_actions());

            if cancellable && result == EventResult::Cancelled {
                final_result = EventResult::Cancelled;
                break; // Stop propagation
            }
        }

        (final_result, all_actions)
    }

    /// Handle a plugin-registered command. Returns (response_message, pending_actions).
    pub fn handle_command(
        &mut self,
        command: &str,
        args: &[String],
        sender: &str,
        host: &mut HostState,
    ) -> (Option<String>, Vec<PendingAction>) {
        let plugin_name = match self.plugin_commands.get(command) {
            Some(name) => name.clone(),
            None => return (None, Vec::new()),
        };

        if let Some(plugin) = self
            .plugins
            .iter_mut()
            .find(|p| p.info().name == plugin_name)
        {
            let mut api = ServerApiImpl::new(host);
            let response = plugin.on_command(command, args, sender, &mut api);
            (response, api.take_actions())
        } else {
            (None, Vec::new())
        }
    }

    /// Load configs for all plugins from `<dir>/<plugin>/config.json`,
    /// writing the default config when the file doesn't exist yet.
    pub fn load_configs(&mut self, dir: &Path) {
        for plugin in &mut self.plugins {
            let info = plugin.info();
            if let Some(default_config) = plugin.default_config() {
                let plugin_dir = dir.join(&info.name);
                let config_path = plugin_dir.join("config.json");

                let config = if config_path.exists() {
                    match std::fs::read_to_string(&config_path) {
                        Ok(data) => match serde_json::from_str(&data) {
                            Ok(v) => v,
                            Err(e) => {
                                warn!("Failed to parse config for {}: {e}", info.name);
                                default_config
                            }
                        },
                        Err(e) => {
                            warn!("Failed to read config for {}: {e}", info.name);
                            default_config
                        }
                    }
                } else {
                    if let Err(e) = std::fs::create_dir_all(&plugin_dir) {
                        warn!("Failed to create {}: {e}", plugin_dir.display());
                    }
                    match serde_json::to_string_pretty(&default_config) {
                        Ok(json) => {
                            if let Err(e) = std::fs::write(&config_path, json) {
                                warn!("Failed to write default config for {}: {e}", info.name);
                            }
                        }
                        Err(e) => warn!("Failed to encode default config for {}: {e}", info.name),
                    }
                    default_config
                };

                plugin.load_config(config);
            }
        }
    }

    /// Apply RegisterCommand immediately; return everything else.
    fn apply_internal_actions(&mut self, actions: Vec<PendingAction>) -> Vec<PendingAction> {
        let mut rest = Vec::new();
        for action in actions {
            match action {
                PendingAction::RegisterCommand {
                    name, plugin_name, ..
                } => {
                    if let Some(previous) = self.plugin_commands.insert(name.clone(), plugin_name) {
                        warn!("Command /{name} was registered by {previous}, overriding");
                    }
                }
                other => rest.push(other),
            }
        }
        rest
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use blockdrop_game::ItemStack;
    use blockdrop_plugin_api::{PluginBlockPos, PluginInfo, PluginPlayer};

    /// A test plugin that cancels breaking Bedrock and greets on join.
    struct TestPlugin {
        name: &'static str,
        deps: Vec<String>,
        enabled: bool,
    }

    impl TestPlugin {
        fn new(name: &'static str, deps: &[&str]) -> Self {
            Self {
                name,
                deps: deps.iter().map(|d| d.to_string()).collect(),
                enabled: false,
            }
        }
    }

    impl Plugin for TestPlugin {
        fn info(&self) -> PluginInfo {
            PluginInfo {
                name: self.name.into(),
                version: "0.1.0".into(),
                description: "Test".into(),
                author: "Test".into(),
            }
        }

        fn dependencies(&self) -> Vec<String> {
            self.deps.clone()
        }

        fn on_enable(&mut self, api: &mut dyn ServerApi) {
            self.enabled = true;
            api.register_block(self.name);
            api.register_command("test", "A test command", self.name);
        }

        fn on_disable(&mut self) {
            self.enabled = false;
        }

        fn on_event(&mut self, event: &PluginEvent, api: &mut dyn ServerApi) -> EventResult {
            match event {
                PluginEvent::BlockBreak { block_id, .. }
                    if api.block_name(*block_id).as_deref() == Some("Bedrock") =>
                {
                    EventResult::Cancelled
                }
                PluginEvent::BlockBreak {
                    player, block_id, ..
                } => {
                    if let Some(inv) = api.inventory_mut(&player.name) {
                        inv.set_hotbar_slot(0, Some(ItemStack::block(*block_id, 1)));
                    }
                    api.notify_inventory(&player.name);
                    EventResult::Continue
                }
                PluginEvent::PlayerJoin { player } => {
                    api.send_message(&player.name, "Welcome!");
                    EventResult::Continue
                }
                _ => EventResult::Continue,
            }
        }

        fn on_command(
            &mut self,
            _command: &str,
            args: &[String],
            _sender: &str,
            _api: &mut dyn ServerApi,
        ) -> Option<String> {
            Some(format!("Test OK: {} args", args.len()))
        }
    }

    fn alice(host: &mut HostState) -> PluginPlayer {
        host.join("Alice").cloned().unwrap()
    }

    fn break_event(player: PluginPlayer, block_id: u32) -> PluginEvent {
        PluginEvent::BlockBreak {
            player,
            position: PluginBlockPos { x: 0, y: 64, z: 0 },
            block_id,
        }
    }

    #[test]
    fn enable_all_calls_on_enable() {
        let mut host = HostState::new(10);
        let mut mgr = PluginManager::new();
        mgr.register(Box::new(TestPlugin::new("TestPlugin", &[]))).unwrap();
        let actions = mgr.enable_all(&mut host).unwrap();
        assert!(actions.is_empty());
        assert!(mgr.plugin_commands.contains_key("test"));
        assert_eq!(host.blocks.id("TestPlugin"), Some(1));
    }

    #[test]
    fn duplicate_plugin_is_rejected() {
        let mut mgr = PluginManager::new();
        mgr.register(Box::new(TestPlugin::new("A", &[]))).unwrap();
        let err = mgr.register(Box::new(TestPlugin::new("A", &[]))).unwrap_err();
        assert_eq!(err, PluginError::DuplicatePlugin("A".into()));
    }

    #[test]
    fn dependencies_are_enabled_first() {
        let mut host = HostState::new(10);
        let mut mgr = PluginManager::new();
        mgr.register(Box::new(TestPlugin::new("Inventory", &["Core"]))).unwrap();
        mgr.register(Box::new(TestPlugin::new("Extra", &[]))).unwrap();
        mgr.register(Box::new(TestPlugin::new("Core", &[]))).unwrap();
        mgr.enable_all(&mut host).unwrap();

        assert_eq!(mgr.plugin_names(), vec!["Extra", "Core", "Inventory"]);
        // Registration order in the block registry follows enable order.
        assert_eq!(host.blocks.id("Extra"), Some(1));
        assert_eq!(host.blocks.id("Core"), Some(2));
        assert_eq!(host.blocks.id("Inventory"), Some(3));
    }

    #[test]
    fn missing_dependency_fails() {
        let mut host = HostState::new(10);
        let mut mgr = PluginManager::new();
        mgr.register(Box::new(TestPlugin::new("Inventory", &["CoreBlocks"])))
            .unwrap();
        let err = mgr.enable_all(&mut host).unwrap_err();
        assert_eq!(
            err,
            PluginError::MissingDependency {
                plugin: "Inventory".into(),
                dependency: "CoreBlocks".into(),
            }
        );
    }

    #[test]
    fn dependency_cycle_fails() {
        let mut host = HostState::new(10);
        let mut mgr = PluginManager::new();
        mgr.register(Box::new(TestPlugin::new("A", &["B"]))).unwrap();
        mgr.register(Box::new(TestPlugin::new("B", &["A"]))).unwrap();
        mgr.register(Box::new(TestPlugin::new("C", &[]))).unwrap();
        let err = mgr.enable_all(&mut host).unwrap_err();
        assert_eq!(err, PluginError::DependencyCycle(vec!["A".into(), "B".into()]));
    }

    #[test]
    fn dispatch_mutates_inventory_and_queues_notify() {
        let mut host = HostState::new(10);
        let mut mgr = PluginManager::new();
        mgr.register(Box::new(TestPlugin::new("TestPlugin", &[]))).unwrap();
        mgr.enable_all(&mut host).unwrap();
        let player = alice(&mut host);

        let (result, actions) = mgr.dispatch(&break_event(player, 1), &mut host);
        assert_eq!(result, EventResult::Continue);
        assert_eq!(
            actions,
            vec![PendingAction::NotifyInventory {
                player_name: "Alice".into()
            }]
        );
        let inv = &host.player("Alice").unwrap().inventory;
        assert_eq!(inv.hotbar_slot(0), Some(&ItemStack::block(1, 1)));
    }

    #[test]
    fn dispatch_cancels_bedrock_break() {
        let mut host = HostState::new(10);
        let bedrock = host.blocks.register("Bedrock");
        let mut mgr = PluginManager::new();
        mgr.register(Box::new(TestPlugin::new("TestPlugin", &[]))).unwrap();
        mgr.enable_all(&mut host).unwrap();
        let player = alice(&mut host);

        let (result, actions) = mgr.dispatch(&break_event(player, bedrock), &mut host);
        assert_eq!(result, EventResult::Cancelled);
        assert!(actions.is_empty());
    }

    #[test]
    fn dispatch_continues_for_join() {
        let mut host = HostState::new(10);
        let mut mgr = PluginManager::new();
        mgr.register(Box::new(TestPlugin::new("TestPlugin", &[]))).unwrap();
        mgr.enable_all(&mut host).unwrap();
        let player = alice(&mut host);

        let (result, actions) = mgr.dispatch(&PluginEvent::PlayerJoin { player }, &mut host);
        assert_eq!(result, EventResult::Continue);
        assert!(actions.iter().any(|a| matches!(a, PendingAction::SendMessage { player_name, .. } if player_name == "Alice")));
    }

    #[test]
    fn dispatch_no_plugins_continues() {
        let mut host = HostState::new(10);
        let mut mgr = PluginManager::new();
        let (result, actions) = mgr.dispatch(&PluginEvent::ServerStarted, &mut host);
        assert_eq!(result, EventResult::Continue);
        assert!(actions.is_empty());
    }

    #[test]
    fn handle_command_routes_to_plugin() {
        let mut host = HostState::new(10);
        let mut mgr = PluginManager::new();
        mgr.register(Box::new(TestPlugin::new("TestPlugin", &[]))).unwrap();
        mgr.enable_all(&mut host).unwrap();

        let (response, _actions) =
            mgr.handle_command("test", &["a".into(), "b".into()], "Alice", &mut host);
        assert_eq!(response, Some("Test OK: 2 args".into()));
    }

    #[test]
    fn handle_unknown_command_returns_none() {
        let mut host = HostState::new(10);
        let mut mgr = PluginManager::new();
        let (response, actions) = mgr.handle_command("unknown", &[], "Alice", &mut host);
        assert!(response.is_none());
        assert!(actions.is_empty());
    }

    /// Records whatever config the manager hands it.
    struct ConfigPlugin {
        loaded: std::sync::Arc<std::sync::Mutex<Option<serde_json::Value>>>,
    }

    impl Plugin for ConfigPlugin {
        fn info(&self) -> PluginInfo {
            PluginInfo {
                name: "Configured".into(),
                version: "0.1.0".into(),
                description: "Test".into(),
                author: "Test".into(),
            }
        }

        fn on_enable(&mut self, _api: &mut dyn ServerApi) {}

        fn default_config(&self) -> Option<serde_json::Value> {
            Some(serde_json::json!({ "limit": 55 }))
        }

        fn load_config(&mut self, config: serde_json::Value) {
            *self.loaded.lock().unwrap() = Some(config);
        }
    }

    fn config_plugin_manager() -> (
        PluginManager,
        std::sync::Arc<std::sync::Mutex<Option<serde_json::Value>>>,
    ) {
        let loaded = std::sync::Arc::new(std::sync::Mutex::new(None));
        let mut mgr = PluginManager::new();
        mgr.register(Box::new(ConfigPlugin {
            loaded: loaded.clone(),
        }))
        .unwrap();
        (mgr, loaded)
    }

    #[test]
    fn load_configs_writes_missing_default() {
        let dir = tempfile::tempdir().unwrap();
        let (mut mgr, loaded) = config_plugin_manager();
        mgr.load_configs(dir.path());

        let path = dir.path().join("Configured").join("config.json");
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written, serde_json::json!({ "limit": 55 }));
        assert_eq!(*loaded.lock().unwrap(), Some(written));
    }

    #[test]
    fn load_configs_reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let plugin_dir = dir.path().join("Configured");
        std::fs::create_dir_all(&plugin_dir).unwrap();
        std::fs::write(plugin_dir.join("config.json"), r#"{ "limit": 2 }"#).unwrap();

        let (mut mgr, loaded) = config_plugin_manager();
        mgr.load_configs(dir.path());
        assert_eq!(
            *loaded.lock().unwrap(),
            Some(serde_json::json!({ "limit": 2 }))
        );
    }

    #[test]
    fn load_configs_falls_back_on_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let plugin_dir = dir.path().join("Configured");
        std::fs::create_dir_all(&plugin_dir).unwrap();
        std::fs::write(plugin_dir.join("config.json"), "{ not json").unwrap();

        let (mut mgr, loaded) = config_plugin_manager();
        mgr.load_configs(dir.path());
        assert_eq!(
            *loaded.lock().unwrap(),
            Some(serde_json::json!({ "limit": 55 }))
        );
        // The broken file is left for the operator to fix.
        assert_eq!(
            std::fs::read_to_string(plugin_dir.join("config.json")).unwrap(),
            "{ not json"
        );
    }

    #[test]
    fn load_configs_skips_plugins_without_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut mgr = PluginManager::new();
        mgr.register(Box::new(TestPlugin::new("TestPlugin", &[]))).unwrap();
        mgr.load_configs(dir.path());
        assert!(!dir.path().join("TestPlugin").exists());
    }

    #[test]
    fn server_api_impl_reads_host() {
        let mut host = HostState::new(10);
        host.blocks.register("Stone");
        alice(&mut host);
        let mut api = ServerApiImpl::new(&mut host);
        assert_eq!(api.block_id("Stone"), Some(1));
        assert_eq!(api.block_name(1).as_deref(), Some("Stone"));
        assert!(api.inventory_mut("Alice").is_some());
        assert!(api.inventory_mut("Bob").is_none());
    }

    #[test]
    fn server_api_impl_accumulates_actions() {
        let mut host = HostState::new(10);
        let mut api = ServerApiImpl::new(&mut host);
        api.send_message("Alice", "Hello");
        api.notify_inventory("Alice");
        let actions = api.take_actions();
        assert_eq!(
            actions,
            vec![
                PendingAction::SendMessage {
                    player_name: "Alice".into(),
                    message: "Hello".into(),
                },
                PendingAction::NotifyInventory {
                    player_name: "Alice".into(),
                },
            ]
        );
    }
}
