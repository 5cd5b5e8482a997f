use axum::{
    extract::{Path, State},
    routing::{delete, get, put},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{
    ActionResponse, AdminUserItem, AnalyticsResponse, DeactivateRequest, StatsResponse,
    UpdateRoleRequest, UserListResponse,
};
use crate::{
    analytics,
    auth::extractors::AdminUser,
    error::ApiError,
    state::AppState,
    users::{self, Role},
};

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users))
        .route("/admin/users/:id/role", put(update_role))
        .route("/admin/users/:id/deactivate", put(deactivate_user))
        .route("/admin/users/:id/activate", put(activate_user))
        .route("/admin/users/:id", delete(delete_user))
        .route("/admin/stats", get(stats))
        .route("/admin/analytics", get(gen_analytics))
}

#[instrument(skip(state, _admin))]
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<UserListResponse>, ApiError> {
    let users: Vec<AdminUserItem> = users::repo::list_all(&state.db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    let total = users.len();
    Ok(Json(UserListResponse {
        success: true,
        users,
        total,
    }))
}

#[instrument(skip(state, admin, payload))]
pub async fn update_role(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    let role = Role::parse(&payload.role)
        .ok_or_else(|| ApiError::validation("Invalid role"))?;

    let rows = users::repo::set_role(&state.db, user_id, role.as_str()).await?;
    if rows == 0 {
        return Err(ApiError::not_found("User not found"));
    }

    info!(admin_id = %admin.id, %user_id, role = role.as_str(), "role updated");
    Ok(Json(ActionResponse {
        success: true,
        message: "Role updated".into(),
        email_sent: None,
    }))
}

#[instrument(skip(state, admin, payload))]
pub async fn deactivate_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<Uuid>,
    payload: Option<Json<DeactivateRequest>>,
) -> Result<Json<ActionResponse>, ApiError> {
    let reason = payload
        .and_then(|Json(p)| p.reason)
        .unwrap_or_else(|| "No reason provided".into());

    let user = users::repo::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let rows = users::repo::deactivate(&state.db, user_id, &reason).await?;
    if rows == 0 {
        return Err(ApiError::not_found("User not found or already deactivated"));
    }

    // Best-effort notification; failures only show up in emailSent.
    let email_sent = state
        .mailer
        .send_deactivation(&user.email, &user.name, &reason)
        .await;

    info!(admin_id = %admin.id, %user_id, email_sent, "user deactivated");
    Ok(Json(ActionResponse {
        success: true,
        message: "User deactivated".into(),
        email_sent: Some(email_sent),
    }))
}

#[instrument(skip(state, admin))]
pub async fn activate_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ActionResponse>, ApiError> {
    let user = users::repo::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let rows = users::repo::activate(&state.db, user_id).await?;
    if rows == 0 {
        return Err(ApiError::not_found("User not found or already active"));
    }

    let email_sent = state
        .mailer
        .send_reactivation(&user.email, &user.name)
        .await;

    info!(admin_id = %admin.id, %user_id, email_sent, "user reactivated");
    Ok(Json(ActionResponse {
        success: true,
        message: "User reactivated".into(),
        email_sent: Some(email_sent),
    }))
}

/// Soft delete: deactivation without notification. Records are never
/// removed from the store.
#[instrument(skip(state, admin))]
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ActionResponse>, ApiError> {
    let rows = users::repo::soft_delete(&state.db, user_id).await?;
    if rows == 0 {
        return Err(ApiError::not_found("User not found"));
    }

    info!(admin_id = %admin.id, %user_id, "user soft-deleted");
    Ok(Json(ActionResponse {
        success: true,
        message: "User deleted".into(),
        email_sent: None,
    }))
}

#[instrument(skip(state, _admin))]
pub async fn stats(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<StatsResponse>, ApiError> {
    let stats = analytics::user_stats(&state.db).await?;
    Ok(Json(StatsResponse {
        success: true,
        stats,
    }))
}

#[instrument(skip(state, _admin))]
pub async fn gen_analytics(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<AnalyticsResponse>, ApiError> {
    let stats = analytics::snapshot(&state.db).await.map_err(|e| {
        warn!(error = %e, "analytics aggregation failed");
        ApiError::Internal(e.context("Failed to fetch admin analytics"))
    })?;
    Ok(Json(AnalyticsResponse {
        success: true,
        stats,
    }))
}
