//! Store tests against a real PostgreSQL database.
//!
//! Ignored by default; run with `DATABASE_URL` set and `--ignored`.

use std::sync::Arc;

use assert_matches::assert_matches;
use sqlx::PgPool;

use questlog_core::error::CoreError;
use questlog_core::lifecycle::QuestLifecycle;
use questlog_core::loot::{LootDraft, LootSource};
use questlog_core::quest::{CreateProject, QuestDraft, QuestStatus};
use questlog_core::store::{CharacterStore, ProjectStore, QuestStore, Stores, UserStore};
use questlog_core::user::CreateUser;
use questlog_db::store::PgStore;

struct FallbackLoot;

#[async_trait::async_trait]
impl LootSource for FallbackLoot {
    async fn generate_loot(
        &self,
        _task: &str,
    ) -> Result<LootDraft, questlog_core::error::GenerationError> {
        Ok(LootDraft::fallback())
    }
}

fn registered(email: &str) -> CreateUser {
    CreateUser {
        username: "hero".into(),
        email: Some(email.into()),
        password_hash: Some("hash".into()),
        local_user_id: None,
    }
}

fn drafts(n: usize) -> Vec<QuestDraft> {
    (0..n)
        .map(|i| QuestDraft {
            title: format!("Step {i}"),
            description: "desc".into(),
            task: format!("Do thing {i}"),
        })
        .collect()
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn duplicate_email_is_conflict(pool: PgPool) {
    let store = PgStore::new(pool);
    store.create_user(&registered("a@example.com")).await.unwrap();
    assert_matches!(
        store.create_user(&registered("a@example.com")).await,
        Err(CoreError::Conflict(_))
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn local_user_is_provisioned_once(pool: PgPool) {
    let stores = Stores::from_backend(Arc::new(PgStore::new(pool)));
    let (first, character) = stores.provision_local_user("local_abc").await.unwrap();
    let (second, again) = stores.provision_local_user("local_abc").await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(character.id, again.id);
    assert_eq!(first.username, "User_abc");
    assert_eq!(character.level, 1);
    assert_eq!(character.max_xp, 100);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn projects_list_newest_first_with_quests_in_order(pool: PgPool) {
    let store = PgStore::new(pool);
    let user = store.create_user(&registered("p@example.com")).await.unwrap();

    for title in ["first", "second"] {
        store
            .create_project(&CreateProject {
                user_id: user.id,
                title: title.into(),
                quests: drafts(3),
                xp_reward: 25,
            })
            .await
            .unwrap();
    }

    let projects = store.list_projects_for_user(user.id).await.unwrap();
    assert_eq!(projects.len(), 2);
    assert_eq!(projects[0].title, "second");
    let positions: Vec<i32> = projects[0].quests.iter().map(|q| q.position).collect();
    assert_eq!(positions, vec![0, 1, 2]);
    assert!(projects[0].quests.iter().all(|q| q.xp_reward == 25));
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn quest_lookup_is_scoped_to_owner(pool: PgPool) {
    let store = PgStore::new(pool);
    let owner = store.create_user(&registered("o@example.com")).await.unwrap();
    let other = store.create_user(&registered("x@example.com")).await.unwrap();
    let project = store
        .create_project(&CreateProject {
            user_id: owner.id,
            title: "Mine".into(),
            quests: drafts(1),
            xp_reward: 25,
        })
        .await
        .unwrap();
    let quest_id = project.quests[0].id;

    let owned = store.find_quest_for_user(quest_id, owner.id).await.unwrap();
    assert_eq!(owned.map(|o| o.project_title).as_deref(), Some("Mine"));
    assert!(store.find_quest_for_user(quest_id, other.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn lifecycle_round_trip_persists_jsonb(pool: PgPool) {
    let store = Arc::new(PgStore::new(pool));
    let stores = Stores::from_backend(store.clone());
    let (user, before) = stores
        .create_user_with_character(&registered("l@example.com"))
        .await
        .unwrap();
    let project = store
        .create_project(&CreateProject {
            user_id: user.id,
            title: "Goal".into(),
            quests: drafts(1),
            xp_reward: 25,
        })
        .await
        .unwrap();
    let quest_id = project.quests[0].id;
    let lifecycle = QuestLifecycle::new(store.clone(), store.clone(), Arc::new(FallbackLoot));

    let done = lifecycle.complete(quest_id, user.id).await.unwrap();
    let stored = store.find_character_by_user(user.id).await.unwrap().unwrap();
    assert_eq!(stored.inventory, vec![done.loot.clone()]);
    let quest = store.find_quest_for_user(quest_id, user.id).await.unwrap().unwrap().quest;
    assert_eq!(quest.status, QuestStatus::Completed);
    assert_eq!(quest.generated_loot, Some(done.loot));

    lifecycle.uncomplete(quest_id, user.id).await.unwrap();
    let after = store.find_character_by_user(user.id).await.unwrap().unwrap();
    assert_eq!(after.xp, before.xp);
    assert_eq!(after.level, before.level);
    assert!(after.inventory.is_empty());
}
