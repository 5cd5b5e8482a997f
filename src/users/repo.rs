use sqlx::PgPool;
use uuid::Uuid;

use super::User;
use crate::avatars::AvatarRefs;

const USER_COLUMNS: &str = "id, name, email, password_hash, role, is_active, is_logged_in, \
     photo_url, photo_thumbnail, photo_key, deactivation_reason, deactivated_at, \
     created_at, updated_at, last_login";

pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

pub async fn email_taken(db: &PgPool, email: &str, exclude: Option<Uuid>) -> anyhow::Result<bool> {
    let taken = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM users WHERE email = $1 AND ($2::uuid IS NULL OR id <> $2))",
    )
    .bind(email)
    .bind(exclude)
    .fetch_one(db)
    .await?;
    Ok(taken)
}

fn create_sql() -> String {
    // Registration counts as a first login.
    format!(
        "INSERT INTO users (name, email, password_hash, photo_url, photo_thumbnail, photo_key, \
             is_logged_in, last_login) \
         VALUES ($1, $2, $3, $4, $5, $6, TRUE, now()) \
         RETURNING {USER_COLUMNS}"
    )
}

pub async fn create(
    db: &PgPool,
    name: &str,
    email: &str,
    password_hash: &str,
    avatar: &AvatarRefs,
) -> anyhow::Result<User> {
    let user = sqlx::query_as::<_, User>(&create_sql())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(&avatar.photo_url)
    .bind(&avatar.photo_thumbnail)
    .bind(&avatar.photo_key)
    .fetch_one(db)
    .await?;
    Ok(user)
}

pub async fn mark_logged_in(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
    sqlx::query("UPDATE users SET is_logged_in = TRUE, last_login = now() WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn mark_logged_out(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
    sqlx::query("UPDATE users SET is_logged_in = FALSE WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

/// Partial merge: NULL arguments leave the column untouched.
pub async fn update_profile(
    db: &PgPool,
    id: Uuid,
    name: Option<&str>,
    email: Option<&str>,
    password_hash: Option<&str>,
) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET \
             name = COALESCE($2, name), \
             email = COALESCE($3, email), \
             password_hash = COALESCE($4, password_hash), \
             updated_at = now() \
         WHERE id = $1 \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(id)
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

pub async fn set_avatar(db: &PgPool, id: Uuid, avatar: &AvatarRefs) -> anyhow::Result<u64> {
    let result = sqlx::query(
        "UPDATE users SET photo_url = $2, photo_thumbnail = $3, photo_key = $4, \
         updated_at = now() WHERE id = $1",
    )
    .bind(id)
    .bind(&avatar.photo_url)
    .bind(&avatar.photo_thumbnail)
    .bind(&avatar.photo_key)
    .execute(db)
    .await?;
    Ok(result.rows_affected())
}

pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
    ))
    .fetch_all(db)
    .await?;
    Ok(users)
}

pub async fn set_role(db: &PgPool, id: Uuid, role: &str) -> anyhow::Result<u64> {
    let result = sqlx::query("UPDATE users SET role = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(role)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

// Guarded on the current flag so repeating the action reports zero rows
// instead of silently succeeding.
const DEACTIVATE_SQL: &str = "UPDATE users SET is_active = FALSE, deactivation_reason = $2, \
     deactivated_at = now(), updated_at = now() WHERE id = $1 AND is_active";

const ACTIVATE_SQL: &str = "UPDATE users SET is_active = TRUE, deactivation_reason = NULL, \
     deactivated_at = NULL, updated_at = now() WHERE id = $1 AND NOT is_active";

pub async fn deactivate(db: &PgPool, id: Uuid, reason: &str) -> anyhow::Result<u64> {
    let result = sqlx::query(DEACTIVATE_SQL)
        .bind(id)
        .bind(reason)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

pub async fn activate(db: &PgPool, id: Uuid) -> anyhow::Result<u64> {
    let result = sqlx::query(ACTIVATE_SQL).bind(id).execute(db).await?;
    Ok(result.rows_affected())
}

/// Soft delete: same flag flip as deactivation, no reason, no notification.
pub async fn soft_delete(db: &PgPool, id: Uuid) -> anyhow::Result<u64> {
    let result =
        sqlx::query("UPDATE users SET is_active = FALSE, updated_at = now() WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
    Ok(result.rows_affected())
}
