//! HTTP-level tests for goal decomposition and project listing.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, generate_project, get, local, post_json};
use questlog_core::error::GenerationError;
use serde_json::json;

#[tokio::test]
async fn generate_creates_pending_quests_in_plan_order() {
    let app = build_test_app();
    let project = generate_project(&app, "local_hero", "  Learn the lute  ").await;

    assert_eq!(project["title"], "Learn the lute");
    assert_eq!(project["status"], "Active");
    let quests = project["quests"].as_array().unwrap();
    assert_eq!(quests.len(), 3);
    for (i, quest) in quests.iter().enumerate() {
        assert_eq!(quest["position"], i);
        assert_eq!(quest["title"], format!("Chapter {}", i + 1));
        assert_eq!(quest["status"], "Pending");
        assert_eq!(quest["xp_reward"], 25);
        assert!(quest["generated_loot"].is_null());
    }
}

#[tokio::test]
async fn blank_goal_is_rejected() {
    let app = build_test_app();
    let response = post_json(
        app.app(),
        "/api/projects/generate",
        &[local("local_hero")],
        json!({ "goal": "   " }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn planner_failure_surfaces_and_stores_nothing() {
    let app = build_test_app();
    *app.planner.error.lock().unwrap() = Some(GenerationError::MalformedResponse {
        backend: "openrouter".into(),
        reason: "no JSON array".into(),
    });

    let response = post_json(
        app.app(),
        "/api/projects/generate",
        &[local("local_hero")],
        json!({ "goal": "Learn the lute" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["code"], "GENERATION_FAILED");

    let projects = body_json(get(app.app(), "/api/projects", &[local("local_hero")]).await).await;
    assert!(projects.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn rate_limited_planner_is_429() {
    let app = build_test_app();
    *app.planner.error.lock().unwrap() = Some(GenerationError::BackendUnavailable {
        backend: "openrouter".into(),
        reason: "429 Too Many Requests".into(),
        rate_limited: true,
    });

    let response = post_json(
        app.app(),
        "/api/projects/generate",
        &[local("local_hero")],
        json!({ "goal": "Learn the lute" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn list_is_newest_first_and_scoped_to_caller() {
    let app = build_test_app();
    generate_project(&app, "local_hero", "Learn the lute").await;
    generate_project(&app, "local_hero", "Run a marathon").await;
    generate_project(&app, "local_other", "Bake bread").await;

    let response = get(app.app(), "/api/projects", &[local("local_hero")]).await;
    assert_eq!(response.status(), StatusCode::OK);
    let projects = body_json(response).await;
    let titles: Vec<&str> = projects
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["Run a marathon", "Learn the lute"]);
    assert_eq!(projects[0]["quests"].as_array().unwrap().len(), 3);
}
