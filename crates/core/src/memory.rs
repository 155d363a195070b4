//! In-memory store used by tests.
//!
//! Mirrors the uniqueness rules of the PostgreSQL schema (one character per
//! user, unique email, unique local id) so conflict paths behave the same.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::CoreError;
use crate::ledger::{
    Character, CreateCharacter, STARTING_HEALTH, STARTING_LEVEL, STARTING_MAX_XP,
};
use crate::quest::{CreateProject, OwnedQuest, Project, ProjectStatus, Quest, QuestStatus};
use crate::store::{CharacterStore, HealthCheck, ProjectStore, QuestStore, UserStore};
use crate::types::{DbId, Timestamp};
use crate::user::{CreateUser, User};

#[derive(Default)]
struct Inner {
    next_id: DbId,
    users: Vec<User>,
    characters: Vec<Character>,
    projects: Vec<Project>,
    quests: Vec<Quest>,
    character_saves: usize,
}

impl Inner {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }
}

/// Thread-safe in-memory implementation of every store trait.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    fn lock(&self) -> Result<MutexGuard<'_, Inner>, CoreError> {
        self.inner
            .lock()
            .map_err(|_| CoreError::Storage("memory store lock poisoned".into()))
    }

    /// Drop a user's character.
    pub fn remove_character(&self, user_id: DbId) {
        if let Ok(mut inner) = self.lock() {
            inner.characters.retain(|c| c.user_id != user_id);
        }
    }

    /// Number of `save_character` calls so far.
    pub fn character_saves(&self) -> usize {
        self.lock().map(|inner| inner.character_saves).unwrap_or(0)
    }

    fn project_with_quests(inner: &Inner, project: &Project) -> Project {
        let mut quests: Vec<Quest> = inner
            .quests
            .iter()
            .filter(|q| q.project_id == project.id)
            .cloned()
            .collect();
        quests.sort_by_key(|q| q.position);
        Project {
            quests,
            ..project.clone()
        }
    }
}

fn now() -> Timestamp {
    chrono::Utc::now()
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, input: &CreateUser) -> Result<User, CoreError> {
        let mut inner = self.lock()?;
        if let Some(email) = &input.email {
            if inner.users.iter().any(|u| u.email.as_ref() == Some(email)) {
                return Err(CoreError::Conflict(format!("Email {email} is already registered")));
            }
        }
        if let Some(local) = &input.local_user_id {
            if inner.users.iter().any(|u| u.local_user_id.as_ref() == Some(local)) {
                return Err(CoreError::Conflict("Local user id already exists".into()));
            }
        }
        let ts = now();
        let user = User {
            id: inner.next_id(),
            username: input.username.clone(),
            email: input.email.clone(),
            password_hash: input.password_hash.clone(),
            local_user_id: input.local_user_id.clone(),
            refresh_token_hash: None,
            refresh_token_expires_at: None,
            created_at: ts,
            updated_at: ts,
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: DbId) -> Result<Option<User>, CoreError> {
        Ok(self.lock()?.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, CoreError> {
        Ok(self
            .lock()?
            .users
            .iter()
            .find(|u| u.email.as_deref() == Some(email))
            .cloned())
    }

    async fn find_user_by_local_id(
        &self,
        local_user_id: &str,
    ) -> Result<Option<User>, CoreError> {
        Ok(self
            .lock()?
            .users
            .iter()
            .find(|u| u.local_user_id.as_deref() == Some(local_user_id))
            .cloned())
    }

    async fn find_user_by_refresh_hash(&self, hash: &str) -> Result<Option<User>, CoreError> {
        Ok(self
            .lock()?
            .users
            .iter()
            .find(|u| u.refresh_token_hash.as_deref() == Some(hash))
            .cloned())
    }

    async fn set_refresh_token(
        &self,
        user_id: DbId,
        hash: &str,
        expires_at: Timestamp,
    ) -> Result<(), CoreError> {
        let mut inner = self.lock()?;
        let user = inner
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(CoreError::NotFound {
                entity: "User",
                id: user_id,
            })?;
        user.refresh_token_hash = Some(hash.to_string());
        user.refresh_token_expires_at = Some(expires_at);
        user.updated_at = now();
        Ok(())
    }
}

#[async_trait]
impl CharacterStore for MemoryStore {
    async fn create_character(&self, input: &CreateCharacter) -> Result<Character, CoreError> {
        let mut inner = self.lock()?;
        if inner.characters.iter().any(|c| c.user_id == input.user_id) {
            return Err(CoreError::Conflict("User already has a character".into()));
        }
        let ts = now();
        let character = Character {
            id: inner.next_id(),
            user_id: input.user_id,
            name: input.name.clone(),
            level: STARTING_LEVEL,
            xp: 0,
            max_xp: STARTING_MAX_XP,
            health: STARTING_HEALTH,
            max_health: STARTING_HEALTH,
            inventory: Vec::new(),
            created_at: ts,
            updated_at: ts,
        };
        inner.characters.push(character.clone());
        Ok(character)
    }

    async fn find_character_by_user(
        &self,
        user_id: DbId,
    ) -> Result<Option<Character>, CoreError> {
        Ok(self
            .lock()?
            .characters
            .iter()
            .find(|c| c.user_id == user_id)
            .cloned())
    }

    async fn save_character(&self, character: &Character) -> Result<Character, CoreError> {
        let mut inner = self.lock()?;
        inner.character_saves += 1;
        let stored = inner
            .characters
            .iter_mut()
            .find(|c| c.id == character.id)
            .ok_or(CoreError::NotFound {
                entity: "Character",
                id: character.id,
            })?;
        *stored = Character {
            updated_at: now(),
            ..character.clone()
        };
        Ok(stored.clone())
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn create_project(&self, input: &CreateProject) -> Result<Project, CoreError> {
        let mut inner = self.lock()?;
        let ts = now();
        let project = Project {
            id: inner.next_id(),
            user_id: input.user_id,
            title: input.title.clone(),
            status: ProjectStatus::Active,
            quests: Vec::new(),
            created_at: ts,
            updated_at: ts,
        };
        for (position, draft) in input.quests.iter().enumerate() {
            let quest = Quest {
                id: inner.next_id(),
                project_id: project.id,
                position: position as i32,
                title: draft.title.clone(),
                description: draft.description.clone(),
                task: draft.task.clone(),
                status: QuestStatus::Pending,
                xp_reward: input.xp_reward,
                generated_loot: None,
                created_at: ts,
                updated_at: ts,
            };
            inner.quests.push(quest);
        }
        inner.projects.push(project.clone());
        Ok(Self::project_with_quests(&inner, &project))
    }

    async fn list_projects_for_user(&self, user_id: DbId) -> Result<Vec<Project>, CoreError> {
        let inner = self.lock()?;
        // Ids are monotonic, so reverse id order is newest first.
        let mut projects: Vec<Project> = inner
            .projects
            .iter()
            .filter(|p| p.user_id == user_id)
            .map(|p| Self::project_with_quests(&inner, p))
            .collect();
        projects.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(projects)
    }
}

#[async_trait]
impl QuestStore for MemoryStore {
    async fn find_quest_for_user(
        &self,
        quest_id: DbId,
        user_id: DbId,
    ) -> Result<Option<OwnedQuest>, CoreError> {
        let inner = self.lock()?;
        let Some(quest) = inner.quests.iter().find(|q| q.id == quest_id) else {
            return Ok(None);
        };
        Ok(inner
            .projects
            .iter()
            .find(|p| p.id == quest.project_id && p.user_id == user_id)
            .map(|p| OwnedQuest {
                quest: quest.clone(),
                project_title: p.title.clone(),
            }))
    }

    async fn save_quest(&self, quest: &Quest) -> Result<Quest, CoreError> {
        let mut inner = self.lock()?;
        let stored = inner
            .quests
            .iter_mut()
            .find(|q| q.id == quest.id)
            .ok_or(CoreError::NotFound {
                entity: "Quest",
                id: quest.id,
            })?;
        stored.status = quest.status;
        stored.generated_loot = quest.generated_loot.clone();
        stored.updated_at = now();
        Ok(stored.clone())
    }
}

#[async_trait]
impl HealthCheck for MemoryStore {
    async fn health_check(&self) -> Result<(), CoreError> {
        self.lock().map(|_| ())
    }
}
