//! Persistence capabilities.
//!
//! The lifecycle and HTTP handlers only see these traits. The PostgreSQL
//! implementation lives in `questlog-db`; an in-memory one is available
//! behind the `testing` feature.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::CoreError;
use crate::ledger::{Character, CreateCharacter};
use crate::quest::{CreateProject, OwnedQuest, Project, Quest};
use crate::types::{DbId, Timestamp};
use crate::user::{CreateUser, User};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user. Duplicate email or local id fails with `Conflict`.
    async fn create_user(&self, input: &CreateUser) -> Result<User, CoreError>;
    async fn find_user(&self, id: DbId) -> Result<Option<User>, CoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, CoreError>;
    async fn find_user_by_local_id(&self, local_user_id: &str)
        -> Result<Option<User>, CoreError>;
    async fn find_user_by_refresh_hash(&self, hash: &str) -> Result<Option<User>, CoreError>;
    /// Replace the stored refresh token hash and its expiry.
    async fn set_refresh_token(
        &self,
        user_id: DbId,
        hash: &str,
        expires_at: Timestamp,
    ) -> Result<(), CoreError>;
}

#[async_trait]
pub trait CharacterStore: Send + Sync {
    async fn create_character(&self, input: &CreateCharacter) -> Result<Character, CoreError>;
    async fn find_character_by_user(&self, user_id: DbId)
        -> Result<Option<Character>, CoreError>;
    /// Overwrite the character document, returning the stored version.
    async fn save_character(&self, character: &Character) -> Result<Character, CoreError>;
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Insert a project and its quests in plan order.
    async fn create_project(&self, input: &CreateProject) -> Result<Project, CoreError>;
    /// All projects of a user, newest first, quests populated.
    async fn list_projects_for_user(&self, user_id: DbId) -> Result<Vec<Project>, CoreError>;
}

#[async_trait]
pub trait QuestStore: Send + Sync {
    /// Find a quest that belongs to one of the user's projects.
    async fn find_quest_for_user(
        &self,
        quest_id: DbId,
        user_id: DbId,
    ) -> Result<Option<OwnedQuest>, CoreError>;
    /// Overwrite status and generated loot, returning the stored version.
    async fn save_quest(&self, quest: &Quest) -> Result<Quest, CoreError>;
}

#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn health_check(&self) -> Result<(), CoreError>;
}

/// Every store capability, cheaply cloneable.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub characters: Arc<dyn CharacterStore>,
    pub projects: Arc<dyn ProjectStore>,
    pub quests: Arc<dyn QuestStore>,
    pub health: Arc<dyn HealthCheck>,
}

impl Stores {
    /// Use one backend for every capability.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: UserStore + CharacterStore + ProjectStore + QuestStore + HealthCheck + 'static,
    {
        Self {
            users: backend.clone(),
            characters: backend.clone(),
            projects: backend.clone(),
            quests: backend.clone(),
            health: backend,
        }
    }

    /// Create a user together with their character.
    pub async fn create_user_with_character(
        &self,
        input: &CreateUser,
    ) -> Result<(User, Character), CoreError> {
        let user = self.users.create_user(input).await?;
        let character = self
            .characters
            .create_character(&CreateCharacter {
                user_id: user.id,
                name: user.username.clone(),
            })
            .await?;
        Ok((user, character))
    }

    /// Find or create the anonymous user for a local device id, making sure
    /// the character exists too.
    pub async fn provision_local_user(
        &self,
        local_user_id: &str,
    ) -> Result<(User, Character), CoreError> {
        let user = match self.users.find_user_by_local_id(local_user_id).await? {
            Some(user) => user,
            None => match self.users.create_user(&CreateUser::local(local_user_id)).await {
                Ok(user) => {
                    tracing::info!(user_id = user.id, "Provisioned anonymous user");
                    user
                }
                // Another request created it first.
                Err(CoreError::Conflict(_)) => self
                    .users
                    .find_user_by_local_id(local_user_id)
                    .await?
                    .ok_or_else(|| {
                        CoreError::Internal("local user vanished after conflict".into())
                    })?,
                Err(e) => return Err(e),
            },
        };

        let character = self.ensure_character(&user).await?;
        Ok((user, character))
    }

    /// The user's character, created on first use if missing.
    pub async fn ensure_character(&self, user: &User) -> Result<Character, CoreError> {
        if let Some(character) = self.characters.find_character_by_user(user.id).await? {
            return Ok(character);
        }
        match self
            .characters
            .create_character(&CreateCharacter {
                user_id: user.id,
                name: user.username.clone(),
            })
            .await
        {
            Ok(character) => Ok(character),
            Err(CoreError::Conflict(_)) => self
                .characters
                .find_character_by_user(user.id)
                .await?
                .ok_or(CoreError::NotFound {
                    entity: "Character",
                    id: user.id,
                }),
            Err(e) => Err(e),
        }
    }
}
