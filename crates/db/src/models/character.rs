//! Row model for the `characters` table.

use questlog_core::ledger::Character;
use questlog_core::loot::LootItem;
use questlog_core::types::{DbId, Timestamp};
use sqlx::types::Json;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct CharacterRow {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub level: i32,
    pub xp: i32,
    pub max_xp: i32,
    pub health: i32,
    pub max_health: i32,
    /// JSONB array in acquisition order.
    pub inventory: Json<Vec<LootItem>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CharacterRow {
    pub fn into_domain(self) -> Character {
        Character {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            level: self.level,
            xp: self.xp,
            max_xp: self.max_xp,
            health: self.health,
            max_health: self.max_health,
            inventory: self.inventory.0,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
