//! Where a dropped block goes.
//!
//! Placement is tried in a fixed order and the first step that succeeds wins:
//!
//! 1. stack onto a matching hotbar stack
//! 2. an empty hotbar slot
//! 3. stack onto a matching main-grid stack (grid insertion order)
//! 4. the first vacant grid coordinate, row-major within the grid bounds
//! 5. overflow: nothing changes and the block is lost
//!
//! A stack at its limit is skipped, never topped up past it.

use tracing::debug;

use crate::inventory::{GridPos, GridSize, ItemStack, PlayerInventory};
use crate::stack_limits::StackLimits;

/// Outcome of placing one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// An existing hotbar stack grew to `count`.
    StackedHotbar {
        slot: usize,
        count: u32,
        max_stack: u32,
    },
    /// A new stack was started in an empty hotbar slot.
    AddedHotbar { slot: usize, max_stack: u32 },
    /// An existing main-grid stack grew to `count`.
    StackedMain {
        pos: GridPos,
        count: u32,
        max_stack: u32,
    },
    /// A new stack was started at a vacant grid coordinate.
    AddedMain { pos: GridPos, max_stack: u32 },
    /// No slot could take the block.
    Overflow,
}

impl Placement {
    /// Whether the inventory changed.
    pub fn is_placed(&self) -> bool {
        !matches!(self, Placement::Overflow)
    }

    /// Player-facing status line. `&c` renders the overflow line in red.
    pub fn status_message(&self, block_name: &str) -> String {
        match self {
            Placement::StackedHotbar {
                count, max_stack, ..
            } => format!("{block_name} now x{count}/{max_stack} [Hotbar]"),
            Placement::AddedHotbar { max_stack, .. } => {
                format!("Picked up {block_name} (1/{max_stack}) [Hotbar]")
            }
            Placement::StackedMain {
                count, max_stack, ..
            } => format!("{block_name} now x{count}/{max_stack} [Inventory]"),
            Placement::AddedMain { max_stack, .. } => {
                format!("Added {block_name} (1/{max_stack}) [Inventory]")
            }
            Placement::Overflow => format!("&cInventory full! {block_name} was lost."),
        }
    }
}

/// Placement rules: the stack-limit table plus the main-grid bounds.
#[derive(Debug, Clone, Default)]
pub struct PlacementPolicy {
    limits: StackLimits,
    grid: GridSize,
}

impl PlacementPolicy {
    pub fn new(limits: StackLimits, grid: GridSize) -> Self {
        Self { limits, grid }
    }

    pub fn limits(&self) -> &StackLimits {
        &self.limits
    }

    pub fn limits_mut(&mut self) -> &mut StackLimits {
        &mut self.limits
    }

    pub fn grid(&self) -> GridSize {
        self.grid
    }

    /// Place one block of `block_id` into `inventory`.
    pub fn place(&self, inventory: &mut PlayerInventory, block_id: u32) -> Placement {
        let max_stack = self.limits.limit(block_id);

        let placement = stack_hotbar(inventory, block_id, max_stack)
            .or_else(|| add_hotbar(inventory, block_id, max_stack))
            .or_else(|| stack_main(inventory, block_id, max_stack))
            .or_else(|| add_main(inventory, block_id, max_stack, self.grid))
            .unwrap_or(Placement::Overflow);

        debug!("Block #{block_id} placement: {placement:?}");
        placement
    }
}

fn stack_hotbar(inv: &mut PlayerInventory, block_id: u32, max_stack: u32) -> Option<Placement> {
    inv.hotbar_mut()
        .iter_mut()
        .enumerate()
        .find_map(|(slot, item)| {
            let stack = item.as_mut().filter(|s| s.can_stack(block_id, max_stack))?;
            stack.count += 1;
            Some(Placement::StackedHotbar {
                slot,
                count: stack.count,
                max_stack,
            })
        })
}

fn add_hotbar(inv: &mut PlayerInventory, block_id: u32, max_stack: u32) -> Option<Placement> {
    let slot = inv.hotbar().iter().position(|s| s.is_none())?;
    inv.set_hotbar_slot(slot, Some(ItemStack::block(block_id, 1)));
    Some(Placement::AddedHotbar { slot, max_stack })
}

fn stack_main(inv: &mut PlayerInventory, block_id: u32, max_stack: u32) -> Option<Placement> {
    inv.main_entries_mut().find_map(|(pos, stack)| {
        if !stack.can_stack(block_id, max_stack) {
            return None;
        }
        stack.count += 1;
        Some(Placement::StackedMain {
            pos: *pos,
            count: stack.count,
            max_stack,
        })
    })
}

fn add_main(
    inv: &mut PlayerInventory,
    block_id: u32,
    max_stack: u32,
    grid: GridSize,
) -> Option<Placement> {
    let pos = grid.positions().find(|p| inv.main_slot(*p).is_none())?;
    inv.set_main_slot(pos, ItemStack::block(block_id, 1));
    Some(Placement::AddedMain { pos, max_stack })
}
