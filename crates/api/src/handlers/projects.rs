//! Handlers for the `/projects` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use questlog_core::quest::{validate_goal, CreateProject, Project, GENERATED_QUEST_XP_REWARD};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Request body for `POST /projects/generate`.
#[derive(Debug, Deserialize)]
pub struct GenerateProjectRequest {
    pub goal: String,
}

/// POST /api/projects/generate
///
/// Decompose a goal into quests and store them as a new project.
pub async fn generate(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<GenerateProjectRequest>,
) -> AppResult<(StatusCode, Json<Project>)> {
    let goal = validate_goal(&input.goal)?;
    let quests = state.planner.plan_quests(goal).await?;

    let project = state
        .stores
        .projects
        .create_project(&CreateProject {
            user_id: auth.user_id,
            title: goal.to_string(),
            quests,
            xp_reward: GENERATED_QUEST_XP_REWARD,
        })
        .await?;

    tracing::info!(
        user_id = auth.user_id,
        project_id = project.id,
        quests = project.quests.len(),
        "Generated project"
    );
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/projects
///
/// The caller's projects, newest first.
pub async fn list(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<Vec<Project>>> {
    let projects = state
        .stores
        .projects
        .list_projects_for_user(auth.user_id)
        .await?;
    Ok(Json(projects))
}
