use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::{get, put},
    Json, Router,
};
use bytes::Bytes;
use tracing::{info, instrument, warn};

use super::dto::{ProfileResponse, UpdatedPfpResponse, UpdateProfileRequest};
use crate::{
    auth::{
        extractors::AuthUser,
        handlers::is_valid_email,
        password::hash_password,
    },
    avatars,
    error::ApiError,
    state::AppState,
    users,
};

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .route(
            "/profile/pfp",
            put(update_pfp)
                .post(update_pfp)
                .layer(DefaultBodyLimit::max(10 * 1024 * 1024)),
        )
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = users::repo::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if payload.name.is_none() && payload.email.is_none() && payload.password.is_none() {
        return Err(ApiError::validation("No data provided"));
    }

    let email = match payload.email {
        Some(e) => {
            let e = e.trim().to_lowercase();
            if !is_valid_email(&e) {
                return Err(ApiError::validation("Invalid email"));
            }
            if users::repo::email_taken(&state.db, &e, Some(user_id)).await? {
                return Err(ApiError::conflict("Email already in use"));
            }
            Some(e)
        }
        None => None,
    };

    let password_hash = match payload.password.as_deref() {
        Some(p) if p.len() < 8 => return Err(ApiError::validation("Password too short")),
        Some(p) => Some(hash_password(p)?),
        None => None,
    };

    let updated = users::repo::update_profile(
        &state.db,
        user_id,
        payload.name.as_deref(),
        email.as_deref(),
        password_hash.as_deref(),
    )
    .await?;

    match updated {
        Some(_) => {
            info!(user_id = %user_id, "profile updated");
            Ok(Json(serde_json::json!({
                "success": true,
                "message": "Profile updated",
            })))
        }
        None => Err(ApiError::not_found("User not found")),
    }
}

#[instrument(skip(state, mp))]
pub async fn update_pfp(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mut mp: Multipart,
) -> Result<Json<UpdatedPfpResponse>, ApiError> {
    let user = users::repo::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))?;

    let mut photo: Option<(Bytes, String)> = None;
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() == Some("photo") {
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "image/jpeg".into());
            let data = field
                .bytes()
                .await
                .map_err(|_| ApiError::validation("Invalid photo upload"))?;
            photo = Some((data, content_type));
        }
    }
    let (data, content_type) = photo.ok_or_else(|| ApiError::validation("No photo provided"))?;

    let refs = avatars::upload_avatar(
        &state,
        user.id,
        data,
        &content_type,
        user.photo_key.as_deref(),
    )
    .await
    .map_err(|e| {
        warn!(error = %e, user_id = %user.id, "avatar upload failed");
        ApiError::Internal(e.context("Upload failed"))
    })?;

    users::repo::set_avatar(&state.db, user.id, &refs).await?;

    info!(user_id = %user.id, "profile picture updated");
    Ok(Json(UpdatedPfpResponse {
        success: true,
        message: "Profile picture updated".into(),
        photo_profile: refs.photo_url,
        photo_thumbnail: refs.photo_thumbnail,
        photo_public_id: refs.photo_key,
    }))
}
