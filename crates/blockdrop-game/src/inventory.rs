//! Player inventory model.
//!
//! Two regions: a fixed-length hotbar and a sparse main grid addressed by
//! (x, y) coordinates. A grid coordinate with no entry is vacant. The grid
//! keeps insertion order, which is the order placement scans it in.

use indexmap::IndexMap;

/// Default number of hotbar slots.
pub const HOTBAR_SIZE: usize = 10;

/// Default main grid width (columns).
pub const GRID_WIDTH: i32 = 40;

/// Default main grid height (rows).
pub const GRID_HEIGHT: i32 = 12;

/// What a stack holds. Only blocks take part in drop placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Block,
    /// Any non-block item (tools, food, ...). Occupies a slot, never stacks with blocks.
    Item,
}

/// A quantity of identical items occupying one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemStack {
    pub kind: ItemKind,
    pub block_id: u32,
    pub count: u32,
}

impl ItemStack {
    /// A block stack with the given count.
    pub fn block(block_id: u32, count: u32) -> Self {
        Self {
            kind: ItemKind::Block,
            block_id,
            count,
        }
    }

    /// A non-block item stack.
    pub fn item(id: u32, count: u32) -> Self {
        Self {
            kind: ItemKind::Item,
            block_id: id,
            count,
        }
    }

    /// Whether another block of `block_id` can be added without exceeding `max_stack`.
    pub fn can_stack(&self, block_id: u32, max_stack: u32) -> bool {
        self.kind == ItemKind::Block && self.block_id == block_id && self.count < max_stack
    }
}

/// Coordinate of a main-grid slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for GridPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Bounds of the main grid that new stacks may be placed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSize {
    pub width: i32,
    pub height: i32,
}

impl Default for GridSize {
    fn default() -> Self {
        Self {
            width: GRID_WIDTH,
            height: GRID_HEIGHT,
        }
    }
}

impl GridSize {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// All coordinates in row-major order: row 0 left to right, then row 1, ...
    pub fn positions(&self) -> impl Iterator<Item = GridPos> {
        let width = self.width.max(0);
        let height = self.height.max(0);
        (0..height).flat_map(move |y| (0..width).map(move |x| GridPos::new(x, y)))
    }
}

/// Per-player inventory, owned by the host for the player's session.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerInventory {
    hotbar: Vec<Option<ItemStack>>,
    main: IndexMap<GridPos, ItemStack>,
}

impl Default for PlayerInventory {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerInventory {
    /// Create an empty inventory with the default hotbar size.
    pub fn new() -> Self {
        Self::with_hotbar_size(HOTBAR_SIZE)
    }

    /// Create an empty inventory with `size` hotbar slots.
    pub fn with_hotbar_size(size: usize) -> Self {
        Self {
            hotbar: vec![None; size],
            main: IndexMap::new(),
        }
    }

    pub fn hotbar(&self) -> &[Option<ItemStack>] {
        &self.hotbar
    }

    pub fn hotbar_mut(&mut self) -> &mut [Option<ItemStack>] {
        &mut self.hotbar
    }

    pub fn hotbar_slot(&self, slot: usize) -> Option<&ItemStack> {
        self.hotbar.get(slot).and_then(|s| s.as_ref())
    }

    /// Set a hotbar slot. Out-of-range slots are ignored.
    pub fn set_hotbar_slot(&mut self, slot: usize, item: Option<ItemStack>) {
        if let Some(s) = self.hotbar.get_mut(slot) {
            *s = item;
        }
    }

    pub fn main_slot(&self, pos: GridPos) -> Option<&ItemStack> {
        self.main.get(&pos)
    }

    /// Put a stack at `pos`. A new coordinate is appended to the scan order,
    /// replacing an existing one keeps its position.
    pub fn set_main_slot(&mut self, pos: GridPos, item: ItemStack) {
        self.main.insert(pos, item);
    }

    /// Occupied main-grid entries in insertion order.
    pub fn main_entries(&self) -> impl Iterator<Item = (&GridPos, &ItemStack)> {
        self.main.iter()
    }

    pub(crate) fn main_entries_mut(&mut self) -> impl Iterator<Item = (&GridPos, &mut ItemStack)> {
        self.main.iter_mut()
    }

    pub fn main_len(&self) -> usize {
        self.main.len()
    }

    /// Every stack in the inventory, hotbar first.
    pub fn stacks(&self) -> impl Iterator<Item = &ItemStack> {
        self.hotbar.iter().flatten().chain(self.main.values())
    }

    /// Total number of `block_id` blocks across both regions.
    pub fn block_count(&self, block_id: u32) -> u32 {
        self.stacks()
            .filter(|s| s.kind == ItemKind::Block && s.block_id == block_id)
            .map(|s| s.count)
            .sum()
    }

    /// Number of occupied slots in both regions.
    pub fn occupied_slots(&self) -> usize {
        self.hotbar.iter().flatten().count() + self.main.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occupied_slots() == 0
    }
}
