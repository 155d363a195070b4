//! Character ledger: level, XP, health and inventory bookkeeping.
//!
//! Level crossings resolve a single step per award or revocation. A reward
//! larger than a whole level leaves `xp >= max_xp` until the next award; a
//! revocation larger than a whole level drops one level and then floors `xp`
//! at zero so the ledger never stores negative progress.

use serde::Serialize;

use crate::loot::LootItem;
use crate::types::{DbId, Timestamp};

/// Starting values for a freshly created character.
pub const STARTING_LEVEL: i32 = 1;
pub const STARTING_MAX_XP: i32 = 100;
pub const STARTING_HEALTH: i32 = 100;

/// A player character. One per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Character {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub level: i32,
    pub xp: i32,
    pub max_xp: i32,
    pub health: i32,
    pub max_health: i32,
    /// Acquisition order.
    pub inventory: Vec<LootItem>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new character.
#[derive(Debug, Clone)]
pub struct CreateCharacter {
    pub user_id: DbId,
    pub name: String,
}

/// Outcome of applying an XP delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelChange {
    Unchanged,
    LeveledUp { level: i32 },
    LeveledDown { level: i32 },
    /// XP went negative at level 1 and was floored at zero.
    Floored,
}

/// XP needed for the next level after levelling up from `max_xp`:
/// `floor(max_xp * 1.5)`.
pub fn next_max_xp(max_xp: i32) -> i32 {
    max_xp.saturating_mul(3) / 2
}

/// XP that was needed for the previous level: `ceil(max_xp / 1.5)`.
///
/// Exact inverse of [`next_max_xp`] for every positive input.
pub fn previous_max_xp(max_xp: i32) -> i32 {
    (max_xp.saturating_mul(2) + 2) / 3
}

impl Character {
    /// Add XP and resolve at most one level-up.
    pub fn award_xp(&mut self, amount: i32) -> LevelChange {
        self.xp += amount;
        if self.xp >= self.max_xp {
            self.level += 1;
            self.xp -= self.max_xp;
            self.max_xp = next_max_xp(self.max_xp);
            self.health = self.max_health;
            if self.xp >= self.max_xp {
                tracing::debug!(
                    character_id = self.id,
                    xp = self.xp,
                    max_xp = self.max_xp,
                    "Award exceeded a full level; remaining XP carries to the next award"
                );
            }
            return LevelChange::LeveledUp { level: self.level };
        }
        LevelChange::Unchanged
    }

    /// Subtract XP and resolve at most one level-down.
    pub fn revoke_xp(&mut self, amount: i32) -> LevelChange {
        self.xp -= amount;
        if self.xp >= 0 {
            return LevelChange::Unchanged;
        }

        if self.level > 1 {
            self.level -= 1;
            self.max_xp = previous_max_xp(self.max_xp);
            self.xp += self.max_xp;
            if self.xp < 0 {
                tracing::warn!(
                    character_id = self.id,
                    xp = self.xp,
                    "Revocation exceeded a full level; flooring XP at zero"
                );
                self.xp = 0;
            }
            LevelChange::LeveledDown { level: self.level }
        } else {
            self.xp = 0;
            LevelChange::Floored
        }
    }

    /// Append a granted item to the inventory.
    ///
    /// An item without artwork picks up the artwork already stored for that
    /// item name, so a name is only ever illustrated once.
    pub fn grant_loot(&mut self, mut item: LootItem) -> &LootItem {
        if item.image_url.is_none() {
            item.image_url = self
                .inventory
                .iter()
                .find(|i| i.item_name == item.item_name)
                .and_then(|i| i.image_url.clone());
        }
        self.inventory.push(item);
        &self.inventory[self.inventory.len() - 1]
    }

    /// Remove the inventory copy of a granted item, if it is still there.
    ///
    /// Grant ids decide when both sides carry one. Name and description
    /// equality only applies when either side lacks an id.
    pub fn revoke_loot(&mut self, granted: &LootItem) -> Option<LootItem> {
        let index = self.inventory.iter().position(|i| i.is_grant_of(granted))?;
        Some(self.inventory.remove(index))
    }

    /// First inventory item with the given name.
    pub fn item_named(&self, item_name: &str) -> Option<&LootItem> {
        self.inventory.iter().find(|i| i.item_name == item_name)
    }

    /// Remove the first inventory item with the given name.
    pub fn remove_item_named(&mut self, item_name: &str) -> Option<LootItem> {
        let index = self
            .inventory
            .iter()
            .position(|i| i.item_name == item_name)?;
        Some(self.inventory.remove(index))
    }

    /// Point every item with `item_name` at the stored artwork.
    ///
    /// Returns how many items were updated.
    pub fn attach_artwork(&mut self, item_name: &str, image_url: &str) -> usize {
        let mut updated = 0;
        for item in self
            .inventory
            .iter_mut()
            .filter(|i| i.item_name == item_name)
        {
            item.image_url = Some(image_url.to_string());
            updated += 1;
        }
        updated
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loot::{ItemType, LootDraft, Rarity};

    fn character(level: i32, xp: i32, max_xp: i32) -> Character {
        let now = chrono::Utc::now();
        Character {
            id: 1,
            user_id: 1,
            name: "Hero".into(),
            level,
            xp,
            max_xp,
            health: 40,
            max_health: 100,
            inventory: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn item(name: &str, description: &str) -> LootItem {
        LootItem::grant(
            LootDraft {
                item_name: name.into(),
                description: description.into(),
                item_type: ItemType::Scroll,
                rarity: Rarity::Common,
                image_prompt: None,
            },
            "Quest",
            "Project",
            chrono::Utc::now(),
        )
    }

    // -- Max XP scaling --

    #[test]
    fn max_xp_scaling_is_floor_and_ceil_of_one_point_five() {
        assert_eq!(next_max_xp(100), 150);
        assert_eq!(next_max_xp(101), 151);
        assert_eq!(previous_max_xp(150), 100);
        assert_eq!(previous_max_xp(151), 101);
        assert_eq!(previous_max_xp(225), 150);
    }

    #[test]
    fn previous_max_xp_inverts_next_max_xp() {
        for max_xp in 1..5_000 {
            assert_eq!(previous_max_xp(next_max_xp(max_xp)), max_xp, "max_xp={max_xp}");
        }
    }

    // -- Level up --

    #[test]
    fn award_below_threshold_only_adds() {
        let mut c = character(1, 10, 100);
        assert_eq!(c.award_xp(25), LevelChange::Unchanged);
        assert_eq!((c.level, c.xp, c.max_xp, c.health), (1, 35, 100, 40));
    }

    #[test]
    fn award_crossing_threshold_levels_up_and_heals() {
        let mut c = character(1, 90, 100);
        assert_eq!(c.award_xp(25), LevelChange::LeveledUp { level: 2 });
        assert_eq!((c.level, c.xp, c.max_xp, c.health), (2, 15, 150, 100));
    }

    #[test]
    fn award_exactly_at_threshold_levels_up_to_zero() {
        let mut c = character(3, 75, 100);
        c.award_xp(25);
        assert_eq!((c.level, c.xp, c.max_xp), (4, 0, 150));
    }

    #[test]
    fn huge_award_resolves_a_single_level() {
        let mut c = character(1, 0, 100);
        c.award_xp(1_000);
        assert_eq!((c.level, c.xp, c.max_xp), (2, 900, 150));
    }

    // -- Level down --

    #[test]
    fn revoke_after_level_up_is_exact_inverse() {
        let mut c = character(1, 90, 100);
        c.award_xp(25);
        assert_eq!(c.revoke_xp(25), LevelChange::LeveledDown { level: 1 });
        assert_eq!((c.level, c.xp, c.max_xp), (1, 90, 100));
    }

    #[test]
    fn revoke_at_level_one_floors_at_zero() {
        let mut c = character(1, 10, 100);
        assert_eq!(c.revoke_xp(25), LevelChange::Floored);
        assert_eq!((c.level, c.xp), (1, 0));
    }

    #[test]
    fn revoke_past_a_whole_level_drops_one_level_and_floors() {
        let mut c = character(3, 5, 225);
        assert_eq!(c.revoke_xp(500), LevelChange::LeveledDown { level: 2 });
        assert_eq!((c.level, c.max_xp, c.xp), (2, 150, 0));
    }

    #[test]
    fn revoke_within_level_only_subtracts() {
        let mut c = character(2, 40, 150);
        assert_eq!(c.revoke_xp(25), LevelChange::Unchanged);
        assert_eq!((c.level, c.xp, c.max_xp), (2, 15, 150));
    }

    // -- Inventory --

    #[test]
    fn revoke_loot_prefers_grant_id_over_duplicates() {
        let mut c = character(1, 0, 100);
        let first = item("Sword", "Sharp");
        let second = item("Sword", "Sharp");
        c.grant_loot(first.clone());
        c.grant_loot(second.clone());

        let removed = c.revoke_loot(&second).unwrap();
        assert_eq!(removed.id, second.id);
        assert_eq!(c.inventory, vec![first]);
    }

    #[test]
    fn revoke_loot_falls_back_to_name_and_description() {
        let mut c = character(1, 0, 100);
        let mut legacy = item("Sword", "Sharp");
        legacy.id = None;
        c.grant_loot(legacy);

        let granted = item("Sword", "Sharp");
        assert!(c.revoke_loot(&granted).is_some());
        assert!(c.inventory.is_empty());
    }

    #[test]
    fn revoke_loot_never_takes_another_grant_with_equal_fields() {
        let mut c = character(1, 0, 100);
        let first = LootItem::grant(LootDraft::fallback(), "Quest A", "P", chrono::Utc::now());
        let second = LootItem::grant(LootDraft::fallback(), "Quest B", "P", chrono::Utc::now());
        c.grant_loot(first.clone());
        c.grant_loot(second.clone());

        // The first token was discarded by hand before its quest was reverted.
        let discarded = c.remove_item_named(&first.item_name).unwrap();
        assert_eq!(discarded.id, first.id);

        assert!(c.revoke_loot(&first).is_none());
        assert_eq!(c.inventory, vec![second]);
    }

    #[test]
    fn revoke_loot_without_match_is_noop() {
        let mut c = character(1, 0, 100);
        c.grant_loot(item("Shield", "Round"));
        assert!(c.revoke_loot(&item("Sword", "Sharp")).is_none());
        assert_eq!(c.inventory.len(), 1);
    }

    #[test]
    fn attach_artwork_updates_every_item_with_that_name() {
        let mut c = character(1, 0, 100);
        c.grant_loot(item("Sword", "Sharp"));
        c.grant_loot(item("Sword", "Dull"));
        c.grant_loot(item("Shield", "Round"));

        assert_eq!(c.attach_artwork("Sword", "Sword_1.png"), 2);
        assert!(c.item_named("Shield").unwrap().image_url.is_none());
        assert_eq!(
            c.item_named("Sword").unwrap().image_url.as_deref(),
            Some("Sword_1.png")
        );
    }

    #[test]
    fn granted_item_inherits_existing_artwork_for_its_name() {
        let mut c = character(1, 0, 100);
        c.grant_loot(item("Sword", "Sharp"));
        c.attach_artwork("Sword", "Sword_1.png");

        c.grant_loot(item("Sword", "Dull"));
        c.grant_loot(item("Shield", "Round"));
        assert_eq!(c.inventory[1].image_url.as_deref(), Some("Sword_1.png"));
        assert!(c.inventory[2].image_url.is_none());

        // Discarding the original keeps the artwork reachable by name.
        c.remove_item_named("Sword");
        assert_eq!(
            c.item_named("Sword").unwrap().image_url.as_deref(),
            Some("Sword_1.png")
        );
    }

    #[test]
    fn remove_item_named_removes_first_only() {
        let mut c = character(1, 0, 100);
        c.grant_loot(item("Sword", "Sharp"));
        c.grant_loot(item("Sword", "Dull"));
        let removed = c.remove_item_named("Sword").unwrap();
        assert_eq!(removed.description, "Sharp");
        assert_eq!(c.inventory.len(), 1);
        assert!(c.remove_item_named("Bow").is_none());
    }
}
