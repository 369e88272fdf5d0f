//! Console command parsing.

use blockdrop_plugin_api::PluginBlockPos;

use crate::error::ConsoleError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Join(String),
    Quit(String),
    /// `break <player> <block> [x y z]`
    Break {
        player: String,
        block: String,
        position: PluginBlockPos,
    },
    Inventory(String),
    Players,
    /// `/name args...`, routed to the plugin that registered `name`.
    Plugin {
        command: String,
        args: Vec<String>,
    },
    Help,
    Stop,
}

pub const HELP: &str = "\
join <player>                  add a player
quit <player>                  remove a player
break <player> <block> [x y z] player breaks a block
inv <player>                   show a player's inventory
list                           list online players
/<command> [args]              run a plugin command
stop                           shut down";

impl ConsoleCommand {
    pub fn parse(line: &str) -> Result<Self, ConsoleError> {
        let mut parts = line.split_whitespace();
        let Some(head) = parts.next() else {
            return Err(ConsoleError::Usage("help"));
        };
        let rest: Vec<&str> = parts.collect();

        if let Some(command) = head.strip_prefix('/') {
            return Ok(ConsoleCommand::Plugin {
                command: command.to_string(),
                args: rest.iter().map(|s| s.to_string()).collect(),
            });
        }

        match (head, rest.as_slice()) {
            ("join", [player]) => Ok(ConsoleCommand::Join(player.to_string())),
            ("join", _) => Err(ConsoleError::Usage("join <player>")),
            ("quit", [player]) => Ok(ConsoleCommand::Quit(player.to_string())),
            ("quit", _) => Err(ConsoleError::Usage("quit <player>")),
            ("break", [player, block]) => Ok(ConsoleCommand::Break {
                player: player.to_string(),
                block: block.to_string(),
                position: PluginBlockPos { x: 0, y: 0, z: 0 },
            }),
            ("break", [player, block, x, y, z]) => Ok(ConsoleCommand::Break {
                player: player.to_string(),
                block: block.to_string(),
                position: PluginBlockPos {
                    x: parse_coord(x)?,
                    y: parse_coord(y)?,
                    z: parse_coord(z)?,
                },
            }),
            ("break", _) => Err(ConsoleError::Usage("break <player> <block> [x y z]")),
            ("inv", [player]) => Ok(ConsoleCommand::Inventory(player.to_string())),
            ("inv", _) => Err(ConsoleError::Usage("inv <player>")),
            ("list", []) => Ok(ConsoleCommand::Players),
            ("help", _) => Ok(ConsoleCommand::Help),
            ("stop", []) => Ok(ConsoleCommand::Stop),
            _ => Err(ConsoleError::UnknownCommand(head.to_string())),
        }
    }
}

fn parse_coord(s: &str) -> Result<i32, ConsoleError> {
    s.parse()
        .map_err(|_| ConsoleError::InvalidCoordinate(s.to_string()))
}
