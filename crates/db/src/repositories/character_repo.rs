//! Repository for the `characters` table.

use questlog_core::ledger::{Character, CreateCharacter};
use questlog_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::character::CharacterRow;

const COLUMNS: &str = "id, user_id, name, level, xp, max_xp, health, max_health, \
                       inventory, created_at, updated_at";

/// Provides queries for characters.
pub struct CharacterRepo;

impl CharacterRepo {
    /// Insert a character with starting stats and an empty inventory.
    pub async fn create(
        pool: &PgPool,
        input: &CreateCharacter,
    ) -> Result<CharacterRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO characters (user_id, name)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CharacterRow>(&query)
            .bind(input.user_id)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<CharacterRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM characters WHERE user_id = $1");
        sqlx::query_as::<_, CharacterRow>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite stats and inventory. Returns `None` if the row is gone.
    pub async fn save(
        pool: &PgPool,
        character: &Character,
    ) -> Result<Option<CharacterRow>, sqlx::Error> {
        let query = format!(
            "UPDATE characters SET
                 name = $2,
                 level = $3,
                 xp = $4,
                 max_xp = $5,
                 health = $6,
                 max_health = $7,
                 inventory = $8,
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CharacterRow>(&query)
            .bind(character.id)
            .bind(&character.name)
            .bind(character.level)
            .bind(character.xp)
            .bind(character.max_xp)
            .bind(character.health)
            .bind(character.max_health)
            .bind(Json(&character.inventory))
            .fetch_optional(pool)
            .await
    }
}
