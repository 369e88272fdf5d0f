//! Ties the host state, plugins, and console together.

use std::fmt::Write as _;
use std::path::PathBuf;

use blockdrop_game::ItemKind;
use blockdrop_inventory_plugin::InventoryPlugin;
use blockdrop_plugin_api::{EventResult, PluginBlockPos, PluginEvent};
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::console::{ConsoleCommand, HELP};
use crate::core_blocks::CoreBlocksPlugin;
use crate::error::PluginError;
use crate::host::HostState;
use crate::plugin_manager::{PendingAction, PluginManager};

/// A chat message delivered to a player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivered {
    pub to: String,
    pub text: String,
}

pub struct Server {
    pub host: HostState,
    plugins: PluginManager,
    plugin_dir: PathBuf,
    /// Messages delivered so far, oldest first.
    pub outbox: Vec<Delivered>,
}

impl Server {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            host: HostState::new(config.server.hotbar_size),
            plugins: PluginManager::new(),
            plugin_dir: PathBuf::from(&config.plugins.directory),
            outbox: Vec::new(),
        }
    }

    /// Register the built-in plugins, load their configs, enable them, and
    /// announce that the server has started.
    pub fn start(&mut self) -> Result<(), PluginError> {
        self.plugins.register(Box::new(CoreBlocksPlugin))?;
        self.plugins.register(Box::new(InventoryPlugin::new()))?;
        self.plugins.load_configs(&self.plugin_dir);

        let actions = self.plugins.enable_all(&mut self.host)?;
        self.apply_actions(actions);
        info!(
            "Enabled plugins: {} ({} block types)",
            self.plugins.plugin_names().join(", "),
            self.host.blocks.len()
        );

        self.dispatch(&PluginEvent::ServerStarted);
        Ok(())
    }

    pub fn stop(&mut self) {
        self.dispatch(&PluginEvent::ServerStopping);
        self.plugins.disable_all();
    }

    fn dispatch(&mut self, event: &PluginEvent) -> EventResult {
        let (result, actions) = self.plugins.dispatch(event, &mut self.host);
        self.apply_actions(actions);
        result
    }

    /// Deliver queued plugin side-effects.
    fn apply_actions(&mut self, actions: Vec<PendingAction>) {
        for action in actions {
            match action {
                PendingAction::SendMessage {
                    player_name,
                    message,
                } => {
                    info!("[{player_name}] {}", render_chat(&message));
                    self.outbox.push(Delivered {
                        to: player_name,
                        text: message,
                    });
                }
                PendingAction::NotifyInventory { player_name } => {
                    debug!("Inventory sync -> {player_name}");
                }
                PendingAction::RegisterCommand { name, .. } => {
                    warn!("Command /{name} registered outside on_enable, ignored");
                }
            }
        }
    }

    /// Run one console command. Returns `false` when the server should stop.
    pub fn run_command(&mut self, command: ConsoleCommand) -> bool {
        match command {
            ConsoleCommand::Join(name) => match self.host.join(&name).cloned() {
                Some(player) => {
                    self.dispatch(&PluginEvent::PlayerJoin { player });
                }
                None => warn!("{name} is already online"),
            },
            ConsoleCommand::Quit(name) => match self.host.player(&name) {
                Some(online) => {
                    let player = online.info.clone();
                    self.dispatch(&PluginEvent::PlayerQuit { player });
                    self.host.leave(&name);
                }
                None => warn!("{name} is not online"),
            },
            ConsoleCommand::Break {
                player,
                block,
                position,
            } => {
                if let Err(e) = self.break_block(&player, &block, position) {
                    warn!("{e}");
                }
            }
            ConsoleCommand::Inventory(name) => match self.inventory_report(&name) {
                Some(report) => println!("{report}"),
                None => warn!("{name} is not online"),
            },
            ConsoleCommand::Players => {
                let names: Vec<String> = self.host.players().into_iter().map(|p| p.name).collect();
                println!("{} online: {}", names.len(), names.join(", "));
            }
            ConsoleCommand::Plugin { command, args } => {
                let (response, actions) =
                    self.plugins
                        .handle_command(&command, &args, "console", &mut self.host);
                self.apply_actions(actions);
                match response {
                    Some(text) => println!("{text}"),
                    None => warn!("Unknown plugin command: /{command}"),
                }
            }
            ConsoleCommand::Help => println!("{HELP}"),
            ConsoleCommand::Stop => return false,
        }
        true
    }

    /// `player` destroys a block of type `block` at `position`.
    pub fn break_block(
        &mut self,
        player: &str,
        block: &str,
        position: PluginBlockPos,
    ) -> Result<EventResult, String> {
        let info = self
            .host
            .player(player)
            .map(|p| p.info.clone())
            .ok_or_else(|| format!("{player} is not online"))?;
        let block_id = self
            .host
            .blocks
            .id(block)
            .ok_or_else(|| format!("Unknown block: {block}"))?;

        let result = self.dispatch(&PluginEvent::BlockBreak {
            player: info,
            position,
            block_id,
        });
        if result == EventResult::Cancelled {
            debug!("{player} breaking {block} was cancelled");
        }
        Ok(result)
    }

    /// Human-readable listing of a player's inventory.
    pub fn inventory_report(&self, player: &str) -> Option<String> {
        let inventory = &self.host.player(player)?.inventory;
        let mut out = format!("Inventory of {player}:");

        let name_of = |kind: ItemKind, id: u32| match kind {
            ItemKind::Block => self
                .host
                .blocks
                .name(id)
                .map(str::to_string)
                .unwrap_or_else(|| format!("block #{id}")),
            ItemKind::Item => format!("item #{id}"),
        };

        for (slot, stack) in inventory.hotbar().iter().enumerate() {
            if let Some(stack) = stack {
                let _ = write!(
                    out,
                    "\n  hotbar[{slot}] {} x{}",
                    name_of(stack.kind, stack.block_id),
                    stack.count
                );
            }
        }
        for (pos, stack) in inventory.main_entries() {
            let _ = write!(
                out,
                "\n  main{pos} {} x{}",
                name_of(stack.kind, stack.block_id),
                stack.count
            );
        }
        if inventory.is_empty() {
            out.push_str("\n  (empty)");
        }
        Some(out)
    }
}

/// Render `&c` (red) colour codes for a terminal.
fn render_chat(message: &str) -> String {
    match message.strip_prefix("&c") {
        Some(rest) => format!("\x1b[31m{rest}\x1b[0m"),
        None => message.to_string(),
    }
}
