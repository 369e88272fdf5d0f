//! Per-block maximum stack sizes.
//!
//! Overrides are keyed by the host's numeric block id, but configured by block
//! name. Name resolution goes through a caller-supplied resolver so the table
//! stays independent of any particular block registry. Names the registry
//! doesn't know yet are returned to the caller instead of being dropped.

use std::collections::HashMap;

use tracing::debug;

use crate::error::LimitError;

/// Stack size for blocks without an override.
pub const DEFAULT_MAX_STACK: u32 = 55;

/// Built-in overrides applied when no config says otherwise.
pub const DEFAULT_STACK_LIMITS: &[(&str, u32)] = &[
    ("Stone", 30),
    ("Cobblestone", 30),
    ("Granite", 30),
    ("Dirt", 64),
    ("Sand", 64),
    ("GoldOre", 20),
    ("IronOre", 25),
    ("CoalOre", 40),
];

/// Maximum stack count per block type, with a fallback default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackLimits {
    default_limit: u32,
    overrides: HashMap<u32, u32>,
}

impl Default for StackLimits {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_STACK)
    }
}

impl StackLimits {
    /// Empty table. A zero default is raised to 1 so every block can be held.
    pub fn new(default_limit: u32) -> Self {
        Self {
            default_limit: default_limit.max(1),
            overrides: HashMap::new(),
        }
    }

    /// Resolve `name` and record its limit. Returns the resolved block id.
    pub fn set_limit<F>(&mut self, name: &str, limit: u32, resolve: F) -> Result<u32, LimitError>
    where
        F: FnOnce(&str) -> Option<u32>,
    {
        if limit == 0 {
            return Err(LimitError::ZeroLimit {
                block: name.to_string(),
            });
        }
        let id = resolve(name).ok_or_else(|| LimitError::UnresolvedBlock(name.to_string()))?;
        self.overrides.insert(id, limit);
        debug!("Stack limit for {name} (#{id}) set to {limit}");
        Ok(id)
    }

    /// Record a limit for an already-resolved block id.
    pub fn set_limit_by_id(&mut self, block_id: u32, limit: u32) -> Result<(), LimitError> {
        if limit == 0 {
            return Err(LimitError::ZeroLimit {
                block: format!("#{block_id}"),
            });
        }
        self.overrides.insert(block_id, limit);
        Ok(())
    }

    /// Apply every `(name, limit)` pair. Failures are collected, not fatal:
    /// the caller decides whether to warn, retry later, or give up.
    pub fn apply<'a, I, F>(&mut self, entries: I, mut resolve: F) -> Vec<LimitError>
    where
        I: IntoIterator<Item = (&'a str, u32)>,
        F: FnMut(&str) -> Option<u32>,
    {
        entries
            .into_iter()
            .filter_map(|(name, limit)| self.set_limit(name, limit, &mut resolve).err())
            .collect()
    }

    /// Maximum stack size for `block_id`.
    pub fn limit(&self, block_id: u32) -> u32 {
        self.overrides
            .get(&block_id)
            .copied()
            .unwrap_or(self.default_limit)
    }

    pub fn default_limit(&self) -> u32 {
        self.default_limit
    }

    /// Number of overrides.
    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}
