//! Quest completion state machine.
//!
//! ```text
//! Pending --complete--> Completed
//! Completed --uncomplete--> Pending
//! ```
//!
//! Completing grants loot and XP; un-completing revokes exactly what was
//! granted. The quest is persisted before the character and no transaction
//! spans the two writes.

use std::sync::Arc;

use crate::error::CoreError;
use crate::ledger::{Character, LevelChange};
use crate::loot::{LootDraft, LootItem, LootSource};
use crate::quest::{OwnedQuest, QuestStatus};
use crate::store::{CharacterStore, QuestStore};
use crate::types::DbId;

/// Result of a successful completion.
#[derive(Debug, Clone)]
pub struct Completion {
    pub character: Character,
    pub loot: LootItem,
    pub level_change: LevelChange,
}

/// Result of a successful un-completion.
#[derive(Debug, Clone)]
pub struct Reversal {
    pub character: Character,
    /// The inventory item removed, if it was still present.
    pub removed_loot: Option<LootItem>,
    pub level_change: LevelChange,
}

/// Orchestrates loot generation and the character ledger for quest
/// transitions.
pub struct QuestLifecycle {
    quests: Arc<dyn QuestStore>,
    characters: Arc<dyn CharacterStore>,
    loot: Arc<dyn LootSource>,
}

impl QuestLifecycle {
    pub fn new(
        quests: Arc<dyn QuestStore>,
        characters: Arc<dyn CharacterStore>,
        loot: Arc<dyn LootSource>,
    ) -> Self {
        Self {
            quests,
            characters,
            loot,
        }
    }

    /// Mark a pending quest completed and reward the user's character.
    ///
    /// Fails with `NotFound` if the quest or character is missing, or if the
    /// quest is already completed. Loot generation failures are absorbed by
    /// granting the fallback item.
    pub async fn complete(&self, quest_id: DbId, user_id: DbId) -> Result<Completion, CoreError> {
        let (owned, mut character) = self.load(quest_id, user_id).await?;
        let OwnedQuest {
            mut quest,
            project_title,
        } = owned;

        if quest.status == QuestStatus::Completed {
            return Err(quest_not_found(quest_id));
        }

        let draft = match self.loot.generate_loot(&quest.task).await {
            Ok(draft) => draft,
            Err(e) => {
                tracing::warn!(quest_id, error = %e, "Loot generation failed, granting fallback item");
                LootDraft::fallback()
            }
        };
        let granted = LootItem::grant(draft, &quest.title, &project_title, chrono::Utc::now());

        let loot = character.grant_loot(granted).clone();
        let level_change = character.award_xp(quest.xp_reward);

        quest.generated_loot = Some(loot.clone());
        quest.status = QuestStatus::Completed;

        self.quests.save_quest(&quest).await?;
        let character = self.characters.save_character(&character).await?;

        tracing::info!(
            quest_id,
            user_id,
            item = %loot.item_name,
            level = character.level,
            xp = character.xp,
            ?level_change,
            "Quest completed"
        );

        Ok(Completion {
            character,
            loot,
            level_change,
        })
    }

    /// Revert a completed quest to pending and revoke its rewards.
    ///
    /// Fails with `NotFound` if the quest or character is missing, or if the
    /// quest is not completed. A granted item that is no longer in the
    /// inventory is skipped silently.
    pub async fn uncomplete(&self, quest_id: DbId, user_id: DbId) -> Result<Reversal, CoreError> {
        let (owned, mut character) = self.load(quest_id, user_id).await?;
        let mut quest = owned.quest;

        if quest.status != QuestStatus::Completed {
            return Err(quest_not_found(quest_id));
        }

        let removed_loot = quest
            .generated_loot
            .as_ref()
            .and_then(|granted| character.revoke_loot(granted));
        let level_change = character.revoke_xp(quest.xp_reward);

        quest.generated_loot = None;
        quest.status = QuestStatus::Pending;

        self.quests.save_quest(&quest).await?;
        let character = self.characters.save_character(&character).await?;

        tracing::info!(
            quest_id,
            user_id,
            loot_removed = removed_loot.is_some(),
            level = character.level,
            xp = character.xp,
            ?level_change,
            "Quest reverted"
        );

        Ok(Reversal {
            character,
            removed_loot,
            level_change,
        })
    }

    async fn load(
        &self,
        quest_id: DbId,
        user_id: DbId,
    ) -> Result<(OwnedQuest, Character), CoreError> {
        let owned = self
            .quests
            .find_quest_for_user(quest_id, user_id)
            .await?
            .ok_or_else(|| quest_not_found(quest_id))?;
        let character = self
            .characters
            .find_character_by_user(user_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Character",
                id: user_id,
            })?;
        Ok((owned, character))
    }
}

fn quest_not_found(quest_id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "Quest",
        id: quest_id,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
