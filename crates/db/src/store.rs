//! PostgreSQL implementation of the store traits.

use std::collections::HashMap;

use async_trait::async_trait;
use questlog_core::error::CoreError;
use questlog_core::ledger::{Character, CreateCharacter};
use questlog_core::quest::{CreateProject, OwnedQuest, Project, Quest};
use questlog_core::store::{CharacterStore, HealthCheck, ProjectStore, QuestStore, UserStore};
use questlog_core::types::{DbId, Timestamp};
use questlog_core::user::{CreateUser, User};

use crate::error::classify;
use crate::repositories::{CharacterRepo, ProjectRepo, QuestRepo, UserRepo};
use crate::DbPool;

/// Every store capability over one connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, input: &CreateUser) -> Result<User, CoreError> {
        let row = UserRepo::create(&self.pool, input).await.map_err(classify)?;
        Ok(row.into_domain())
    }

    async fn find_user(&self, id: DbId) -> Result<Option<User>, CoreError> {
        let row = UserRepo::find_by_id(&self.pool, id).await.map_err(classify)?;
        Ok(row.map(|r| r.into_domain()))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, CoreError> {
        let row = UserRepo::find_by_email(&self.pool, email)
            .await
            .map_err(classify)?;
        Ok(row.map(|r| r.into_domain()))
    }

    async fn find_user_by_local_id(
        &self,
        local_user_id: &str,
    ) -> Result<Option<User>, CoreError> {
        let row = UserRepo::find_by_local_id(&self.pool, local_user_id)
            .await
            .map_err(classify)?;
        Ok(row.map(|r| r.into_domain()))
    }

    async fn find_user_by_refresh_hash(&self, hash: &str) -> Result<Option<User>, CoreError> {
        let row = UserRepo::find_by_refresh_hash(&self.pool, hash)
            .await
            .map_err(classify)?;
        Ok(row.map(|r| r.into_domain()))
    }

    async fn set_refresh_token(
        &self,
        user_id: DbId,
        hash: &str,
        expires_at: Timestamp,
    ) -> Result<(), CoreError> {
        let updated = UserRepo::set_refresh_token(&self.pool, user_id, hash, expires_at)
            .await
            .map_err(classify)?;
        if !updated {
            return Err(CoreError::NotFound {
                entity: "User",
                id: user_id,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CharacterStore for PgStore {
    async fn create_character(&self, input: &CreateCharacter) -> Result<Character, CoreError> {
        let row = CharacterRepo::create(&self.pool, input)
            .await
            .map_err(classify)?;
        Ok(row.into_domain())
    }

    async fn find_character_by_user(
        &self,
        user_id: DbId,
    ) -> Result<Option<Character>, CoreError> {
        let row = CharacterRepo::find_by_user(&self.pool, user_id)
            .await
            .map_err(classify)?;
        Ok(row.map(|r| r.into_domain()))
    }

    async fn save_character(&self, character: &Character) -> Result<Character, CoreError> {
        CharacterRepo::save(&self.pool, character)
            .await
            .map_err(classify)?
            .map(|r| r.into_domain())
            .ok_or(CoreError::NotFound {
                entity: "Character",
                id: character.id,
            })
    }
}

#[async_trait]
impl ProjectStore for PgStore {
    async fn create_project(&self, input: &CreateProject) -> Result<Project, CoreError> {
        let (project, quests) = ProjectRepo::create_with_quests(&self.pool, input)
            .await
            .map_err(classify)?;
        let quests = quests.into_iter().map(|q| q.into_domain()).collect();
        Ok(project.into_domain(quests))
    }

    async fn list_projects_for_user(&self, user_id: DbId) -> Result<Vec<Project>, CoreError> {
        let projects = ProjectRepo::list_for_user(&self.pool, user_id)
            .await
            .map_err(classify)?;
        if projects.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<DbId> = projects.iter().map(|p| p.id).collect();
        let mut by_project: HashMap<DbId, Vec<Quest>> = HashMap::new();
        for row in QuestRepo::list_for_projects(&self.pool, &ids)
            .await
            .map_err(classify)?
        {
            by_project
                .entry(row.project_id)
                .or_default()
                .push(row.into_domain());
        }

        Ok(projects
            .into_iter()
            .map(|p| {
                let quests = by_project.remove(&p.id).unwrap_or_default();
                p.into_domain(quests)
            })
            .collect())
    }
}

#[async_trait]
impl QuestStore for PgStore {
    async fn find_quest_for_user(
        &self,
        quest_id: DbId,
        user_id: DbId,
    ) -> Result<Option<OwnedQuest>, CoreError> {
        let row = QuestRepo::find_for_user(&self.pool, quest_id, user_id)
            .await
            .map_err(classify)?;
        Ok(row.map(|r| r.into_domain()))
    }

    async fn save_quest(&self, quest: &Quest) -> Result<Quest, CoreError> {
        QuestRepo::save(&self.pool, quest)
            .await
            .map_err(classify)?
            .map(|r| r.into_domain())
            .ok_or(CoreError::NotFound {
                entity: "Quest",
                id: quest.id,
            })
    }
}

#[async_trait]
impl HealthCheck for PgStore {
    async fn health_check(&self) -> Result<(), CoreError> {
        crate::health_check(&self.pool).await.map_err(classify)
    }
}
