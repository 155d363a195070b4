//! Handlers for item artwork: generation with cache short-circuit, and
//! serving stored files.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use questlog_core::error::GenerationError;
use questlog_core::image_cache::ImageResolution;
use questlog_core::loot::LootItem;
use serde::Deserialize;

use crate::artwork::{detect_content_type, CACHED_MAX_AGE, FRESH_MAX_AGE};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Request body for `POST /images/generate`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageRequest {
    #[serde(default)]
    pub prompt: String,
    pub item_name: Option<String>,
}

fn image_response(
    bytes: Vec<u8>,
    content_type: &'static str,
    cache_control: &'static str,
) -> Response {
    (
        StatusCode::OK,
        [(CONTENT_TYPE, content_type), (CACHE_CONTROL, cache_control)],
        Body::from(bytes),
    )
        .into_response()
}

/// Load stored artwork, 404 when the file is gone or the name is unsafe.
async fn read_stored(state: &AppState, filename: &str) -> AppResult<(Vec<u8>, &'static str)> {
    let bytes = state
        .artwork
        .read(filename)
        .await
        .map_err(|e| AppError::InternalError(format!("Artwork read error: {e}")))?
        .ok_or_else(|| AppError::NotFound(format!("Image {filename} not found")))?;
    let content_type = detect_content_type(&bytes).unwrap_or("application/octet-stream");
    Ok((bytes, content_type))
}

/// POST /api/images/generate
///
/// When `itemName` names an inventory item that already has artwork, the
/// stored file is returned and no backend is called. Otherwise the prompt is
/// run through the backend chain and, for a known item, the result is stored
/// and recorded on every item with that name.
pub async fn generate(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<GenerateImageRequest>,
) -> AppResult<Response> {
    let prompt = input.prompt.trim();
    if prompt.is_empty() {
        return Err(AppError::BadRequest("Prompt is required.".into()));
    }

    let item_name = input
        .item_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let mut character = match item_name {
        Some(_) => {
            state
                .stores
                .characters
                .find_character_by_user(auth.user_id)
                .await?
        }
        None => None,
    };
    let item: Option<LootItem> = match (&character, item_name) {
        (Some(c), Some(name)) => c.item_named(name).cloned(),
        _ => None,
    };

    let resolution = match &item {
        Some(item) => {
            let request = LootItem {
                image_prompt: Some(prompt.to_string()),
                ..item.clone()
            };
            state.images.resolve(&request).await?
        }
        None => ImageResolution::Generated {
            bytes: state.images.generate(prompt).await?,
        },
    };

    let bytes = match resolution {
        ImageResolution::Cached { image_url } => {
            tracing::debug!(%image_url, "Serving cached artwork");
            let (bytes, content_type) = read_stored(&state, &image_url).await?;
            return Ok(image_response(bytes, content_type, CACHED_MAX_AGE));
        }
        ImageResolution::Generated { bytes } => bytes,
        ImageResolution::Unavailable => {
            return Err(AppError::BadRequest("Prompt is required.".into()));
        }
    };

    let content_type =
        detect_content_type(&bytes).ok_or_else(|| GenerationError::MalformedResponse {
            backend: "image".to_string(),
            reason: "payload is not a recognised image".to_string(),
        })?;

    if let (Some(character), Some(item)) = (character.as_mut(), item.as_ref()) {
        let filename = state
            .artwork
            .save(&item.item_name, &bytes)
            .await
            .map_err(|e| AppError::InternalError(format!("Artwork write error: {e}")))?;
        let updated = character.attach_artwork(&item.item_name, &filename);
        state.stores.characters.save_character(character).await?;
        tracing::info!(
            user_id = auth.user_id,
            item_name = %item.item_name,
            %filename,
            updated,
            "Attached artwork"
        );
    }

    Ok(image_response(bytes, content_type, FRESH_MAX_AGE))
}

/// GET /api/images/{filename}
pub async fn serve(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> AppResult<Response> {
    let (bytes, content_type) = read_stored(&state, &filename).await?;
    Ok(image_response(bytes, content_type, CACHED_MAX_AGE))
}
