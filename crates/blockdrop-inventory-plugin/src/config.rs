//! Inventory plugin config (`plugins/InventorySystem/config.json`).

use blockdrop_game::inventory::{GRID_HEIGHT, GRID_WIDTH};
use blockdrop_game::{GridSize, DEFAULT_MAX_STACK, DEFAULT_STACK_LIMITS};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryConfig {
    #[serde(default = "default_max_stack")]
    pub default_max_stack: u32,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default = "default_stack_limits")]
    pub stack_limits: Vec<StackLimitEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_grid_width")]
    pub width: i32,
    #[serde(default = "default_grid_height")]
    pub height: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackLimitEntry {
    pub block: String,
    pub limit: u32,
}

fn default_max_stack() -> u32 {
    DEFAULT_MAX_STACK
}

fn default_grid_width() -> i32 {
    GRID_WIDTH
}

fn default_grid_height() -> i32 {
    GRID_HEIGHT
}

fn default_stack_limits() -> Vec<StackLimitEntry> {
    DEFAULT_STACK_LIMITS
        .iter()
        .map(|(block, limit)| StackLimitEntry {
            block: (*block).to_string(),
            limit: *limit,
        })
        .collect()
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: default_grid_width(),
            height: default_grid_height(),
        }
    }
}

impl From<GridConfig> for GridSize {
    fn from(grid: GridConfig) -> Self {
        GridSize::new(grid.width, grid.height)
    }
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            default_max_stack: default_max_stack(),
            grid: GridConfig::default(),
            stack_limits: default_stack_limits(),
        }
    }
}
