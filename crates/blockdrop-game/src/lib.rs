//! Inventory rules for block drops: player inventory model, per-block stack
//! limits, and the slot placement policy run when a player breaks a block.

pub mod error;
pub mod inventory;
pub mod placement;
pub mod stack_limits;

pub use error::LimitError;
pub use inventory::{GridPos, GridSize, ItemKind, ItemStack, PlayerInventory};
pub use placement::{Placement, PlacementPolicy};
pub use stack_limits::{StackLimits, DEFAULT_MAX_STACK, DEFAULT_STACK_LIMITS};
