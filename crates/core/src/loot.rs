//! Loot items granted on quest completion.
//!
//! A [`LootDraft`] is what a text-generation backend proposes; a [`LootItem`]
//! is the draft once granted to a character, stamped with a grant id and the
//! quest it came from. Field names serialize in camelCase because drafts are
//! parsed directly from model output using the same keys.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GenerationError;
use crate::types::Timestamp;

/// Name of the item granted when every loot backend fails.
pub const FALLBACK_ITEM_NAME: &str = "Adventurer's Token";

const FALLBACK_DESCRIPTION: &str = "A simple token commemorating your achievement. \
     The Dungeon Master was too busy to craft proper loot.";

const FALLBACK_IMAGE_PROMPT: &str =
    "Simple bronze coin with adventurer emblem, game icon style, transparent background";

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Category of a loot item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum ItemType {
    Weapon,
    Armor,
    Scroll,
    Potion,
    Trinket,
}

impl ItemType {
    pub const ALL: [ItemType; 5] = [
        ItemType::Weapon,
        ItemType::Armor,
        ItemType::Scroll,
        ItemType::Potion,
        ItemType::Trinket,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ItemType::Weapon => "Weapon",
            ItemType::Armor => "Armor",
            ItemType::Scroll => "Scroll",
            ItemType::Potion => "Potion",
            ItemType::Trinket => "Trinket",
        }
    }
}

impl TryFrom<String> for ItemType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        ItemType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("unknown item type '{trimmed}'"))
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rarity tier. The weighting between tiers is requested from the generator
/// in the prompt and is not enforced locally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub const ALL: [Rarity; 5] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
        }
    }
}

impl TryFrom<String> for Rarity {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        Rarity::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("unknown rarity '{trimmed}'"))
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Draft and granted item
// ---------------------------------------------------------------------------

/// A loot proposal as produced by a generation backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LootDraft {
    pub item_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    #[serde(default)]
    pub rarity: Rarity,
    #[serde(default)]
    pub image_prompt: Option<String>,
}

impl LootDraft {
    /// The item substituted when loot generation fails outright.
    pub fn fallback() -> Self {
        Self {
            item_name: FALLBACK_ITEM_NAME.to_string(),
            description: FALLBACK_DESCRIPTION.to_string(),
            item_type: ItemType::Trinket,
            rarity: Rarity::Common,
            image_prompt: Some(FALLBACK_IMAGE_PROMPT.to_string()),
        }
    }
}

/// An inventory entry owned by a character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LootItem {
    /// Grant identifier used to match the item on rollback. Absent on items
    /// written before grant ids existed.
    #[serde(default)]
    pub id: Option<Uuid>,
    pub item_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    #[serde(default)]
    pub rarity: Rarity,
    #[serde(default)]
    pub image_prompt: Option<String>,
    /// Reference to stored artwork, set once the image has been generated.
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub quest_name: Option<String>,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub completed_at: Option<Timestamp>,
}

impl LootItem {
    /// Turn a draft into a granted item with a fresh grant id.
    pub fn grant(
        draft: LootDraft,
        quest_name: &str,
        project_name: &str,
        completed_at: Timestamp,
    ) -> Self {
        Self {
            id: Some(Uuid::new_v4()),
            item_name: draft.item_name,
            description: draft.description,
            item_type: draft.item_type,
            rarity: draft.rarity,
            image_prompt: draft.image_prompt,
            image_url: None,
            quest_name: Some(quest_name.to_string()),
            project_name: Some(project_name.to_string()),
            completed_at: Some(completed_at),
        }
    }

    /// Whether `self` is the inventory copy of the `granted` snapshot.
    ///
    /// Grant ids are authoritative when both sides carry one; otherwise the
    /// legacy `itemName` + `description` equality applies.
    pub fn is_grant_of(&self, granted: &LootItem) -> bool {
        match (self.id, granted.id) {
            (Some(a), Some(b)) => a == b,
            _ => self.same_name_and_description(granted),
        }
    }

    pub fn same_name_and_description(&self, other: &LootItem) -> bool {
        self.item_name == other.item_name && self.description == other.description
    }
}

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

/// Produces a themed loot draft for a completed real-world task.
#[async_trait]
pub trait LootSource: Send + Sync {
    async fn generate_loot(&self, completed_task: &str) -> Result<LootDraft, GenerationError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
