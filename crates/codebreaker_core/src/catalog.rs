//! The fixed table of 100 levels.
//!
//! Secret length and attempt budget are pure functions of the level id:
//!
//! | ids     | length | attempts |
//! |---------|--------|----------|
//! | 1-10    | 3      | 10       |
//! | 11-40   | 4      | 12       |
//! | 41-100  | 5      | 12       |
//!
//! Every tenth level is a milestone. Milestones only change the title and
//! description.

use std::collections::BTreeSet;

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Number of levels in the catalog.
pub const LEVEL_COUNT: u32 = 100;

/// One level's fixed parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct LevelDefinition {
    id: u32,
    secret_length: usize,
    max_attempts: u32,
    is_milestone: bool,
    title: String,
    description: String,
}

impl LevelDefinition {
    /// Builds the definition for `id` from the tier rule.
    #[instrument]
    pub fn for_id(id: u32) -> Self {
        let (secret_length, max_attempts) = tier(id);
        let is_milestone = id % 10 == 0;

        let (title, description) = if id == 1 {
            (
                "First Steps".to_string(),
                "Welcome to the code machine. Let's start with a simple 3-color code.".to_string(),
            )
        } else if is_milestone {
            (
                format!("Milestone Level {}", id),
                "Time to prove what you can do!".to_string(),
            )
        } else {
            (
                format!("Level {}", id),
                "Crack the code to reach the next level.".to_string(),
            )
        };

        Self {
            id,
            secret_length,
            max_attempts,
            is_milestone,
            title,
            description,
        }
    }

    /// Builds a custom definition outside the tier rule.
    ///
    /// Used for practice games and tests; the catalog never contains these.
    /// Length and attempts are raised to at least one.
    pub fn custom(id: u32, secret_length: usize, max_attempts: u32) -> Self {
        Self {
            id,
            secret_length: secret_length.max(1),
            max_attempts: max_attempts.max(1),
            is_milestone: false,
            title: format!("Custom {}", id),
            description: "Custom game.".to_string(),
        }
    }
}

/// Secret length and attempt budget for a level id.
fn tier(id: u32) -> (usize, u32) {
    match id {
        0..=10 => (3, 10),
        11..=40 => (4, 12),
        _ => (5, 12),
    }
}

/// The ordered list of all levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    levels: Vec<LevelDefinition>,
}

impl Catalog {
    /// Generates the catalog. Deterministic: every call yields the same table.
    #[instrument]
    pub fn generate() -> Self {
        let levels: Vec<_> = (1..=LEVEL_COUNT).map(LevelDefinition::for_id).collect();
        debug!(count = levels.len(), "Generated level catalog");
        Self { levels }
    }

    /// All levels in id order.
    pub fn levels(&self) -> &[LevelDefinition] {
        &self.levels
    }

    /// Looks up a level by id.
    pub fn level(&self, id: u32) -> Option<&LevelDefinition> {
        let index = usize::try_from(id).ok()?.checked_sub(1)?;
        self.levels.get(index)
    }

    /// The highest level id.
    pub fn last_id(&self) -> u32 {
        self.levels.last().map(|l| *l.id()).unwrap_or(0)
    }

    /// The level after `id`, or `None` if `id` is the last one.
    pub fn next_after(&self, id: u32) -> Option<&LevelDefinition> {
        self.level(id.checked_add(1)?)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::generate()
    }
}

/// Convenience for [`Catalog::generate`] returning the bare list.
pub fn generate_catalog() -> Vec<LevelDefinition> {
    Catalog::generate().levels
}

/// First level the player has not unlocked past: one above the highest completed id.
pub fn highest_unlocked(completed: &BTreeSet<u32>) -> u32 {
    completed.iter().next_back().copied().unwrap_or(0) + 1
}

/// True when `id` lies beyond the highest unlocked level.
pub fn is_locked(id: u32, completed: &BTreeSet<u32>) -> bool {
    id > highest_unlocked(completed)
}

/// Whole-number completion percentage over the catalog.
pub fn progress_percent(completed: &BTreeSet<u32>) -> u32 {
    let done = completed
        .iter()
        .filter(|id| (1..=LEVEL_COUNT).contains(*id))
        .count() as f64;
    (done / f64::from(LEVEL_COUNT) * 100.0).round() as u32
}
