use axum::{
    extract::{DefaultBodyLimit, FromRef, Multipart, State},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use super::{
    dto::{AuthResponse, LoginRequest, MeResponse, MessageResponse, PublicUser, SignupRequest},
    extractors::AuthUser,
    jwt::JwtKeys,
    password::{hash_password, verify_password},
};
use crate::{avatars, error::ApiError, state::AppState, users};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route(
            "/auth/signup-with-pfp",
            post(signup_with_pfp).layer(DefaultBodyLimit::max(10 * 1024 * 1024)),
        )
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn validate_signup(payload: &SignupRequest) -> Result<(), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::validation("Name is required"));
    }
    if !is_valid_email(&payload.email) {
        return Err(ApiError::validation("Invalid email"));
    }
    if payload.password.len() < 8 {
        return Err(ApiError::validation("Password too short"));
    }
    if payload.password != payload.confirm_password {
        return Err(ApiError::validation("Passwords do not match"));
    }
    Ok(())
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(mut payload): Json<SignupRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    validate_signup(&payload)?;

    // Check-then-insert; the unique index catches the benign race.
    if users::repo::email_taken(&state.db, &payload.email, None).await? {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::conflict("User already exists"));
    }

    let hash = hash_password(&payload.password)?;
    let avatar = avatars::default_avatar(&payload.name);
    let user = users::repo::create(&state.db, &payload.name, &payload.email, &hash, &avatar)
        .await
        .map_err(ApiError::Internal)?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(Json(AuthResponse {
        success: true,
        message: Some("User registered successfully".into()),
        token,
        user: user.into(),
    }))
}

#[instrument(skip(state, mp))]
pub async fn signup_with_pfp(
    State(state): State<AppState>,
    mut mp: Multipart,
) -> Result<Json<AuthResponse>, ApiError> {
    let mut name = String::new();
    let mut email = String::new();
    let mut password = String::new();
    let mut confirm_password = String::new();
    let mut photo: Option<(Bytes, String)> = None;

    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Malformed multipart body: {e}")))?
    {
        match field.name().map(|s| s.to_string()).as_deref() {
            Some("name") => name = field.text().await.unwrap_or_default(),
            Some("email") => email = field.text().await.unwrap_or_default(),
            Some("password") => password = field.text().await.unwrap_or_default(),
            Some("confirmPassword") => confirm_password = field.text().await.unwrap_or_default(),
            Some("photo") => {
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
            _ => {}
        }
    }

    let mut payload = SignupRequest {
        name,
        email,
        password,
        confirm_password,
    };
    payload.email = payload.email.trim().to_lowercase();
    validate_signup(&payload)?;

    if users::repo::email_taken(&state.db, &payload.email, None).await? {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::conflict("User already exists"));
    }

    let hash = hash_password(&payload.password)?;
    let avatar = avatars::default_avatar(&payload.name);
    let mut user = users::repo::create(&state.db, &payload.name, &payload.email, &hash, &avatar)
        .await
        .map_err(ApiError::Internal)?;

    // Photo upload failures degrade to the placeholder avatar rather than
    // failing the whole registration.
    if let Some((data, content_type)) = photo {
        match avatars::upload_avatar(&state, user.id, data, &content_type, None).await {
            Ok(refs) => {
                users::repo::set_avatar(&state.db, user.id, &refs).await?;
                user.photo_url = refs.photo_url;
                user.photo_thumbnail = refs.photo_thumbnail;
                user.photo_key = refs.photo_key;
            }
            Err(e) => {
                warn!(error = %e, user_id = %user.id, "avatar upload failed, keeping placeholder");
            }
        }
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user registered with photo");
    Ok(Json(AuthResponse {
        success: true,
        message: Some("User registered successfully".into()),
        token,
        user: user.into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    let user = users::repo::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login unknown email");
            ApiError::unauthorized("Invalid credentials")
        })?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    if !user.is_active {
        warn!(user_id = %user.id, "login attempt on deactivated account");
        return Err(ApiError::unauthorized(
            "User is deactivated. Please contact support.",
        ));
    }

    users::repo::mark_logged_in(&state.db, user.id).await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(AuthResponse {
        success: true,
        message: None,
        token,
        user: user.into(),
    }))
}

/// Flips the store's logged-in flag; the token itself stays valid until
/// expiry (stateless JWT, no deny-list).
#[instrument(skip(state))]
pub async fn logout(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<MessageResponse>, ApiError> {
    users::repo::mark_logged_out(&state.db, user_id).await?;
    info!(user_id = %user_id, "user logged out");
    Ok(Json(MessageResponse {
        success: true,
        message: "Logged out".into(),
    }))
}

#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<MeResponse>, ApiError> {
    let user = users::repo::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))?;
    Ok(Json(MeResponse {
        success: true,
        user: PublicUser::from(user),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(password: &str, confirm: &str, email: &str) -> SignupRequest {
        SignupRequest {
            name: "Test User".into(),
            email: email.into(),
            password: password.into(),
            confirm_password: confirm.into(),
        }
    }

    #[test]
    fn valid_emails() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("a.b+c@sub.domain.ph"));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("spaces in@example.com"));
    }

    #[test]
    fn signup_rejects_password_mismatch() {
        let err = validate_signup(&req("12345678", "87654321", "a@b.co")).unwrap_err();
        assert!(err.to_string().contains("Passwords do not match"));
    }

    #[test]
    fn signup_rejects_short_password() {
        let err = validate_signup(&req("short", "short", "a@b.co")).unwrap_err();
        assert!(err.to_string().contains("Password too short"));
    }

    #[test]
    fn signup_rejects_bad_email() {
        let err = validate_signup(&req("12345678", "12345678", "nope")).unwrap_err();
        assert!(err.to_string().contains("Invalid email"));
    }

    #[test]
    fn signup_accepts_valid_payload() {
        assert!(validate_signup(&req("12345678", "12345678", "a@b.co")).is_ok());
    }

    #[tokio::test]
    async fn signup_with_pfp_reports_truncated_upload() {
        use axum::{body::Body, extract::FromRequest, http::Request};

        // One complete field, then the stream ends without the closing
        // boundary marker.
        let body = "--BOUNDARY\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\nAlice\r\n--BOUNDARY\r\n";
        let request = Request::builder()
            .method("POST")
            .header(
                axum::http::header::CONTENT_TYPE,
                "multipart/form-data; boundary=BOUNDARY",
            )
            .body(Body::from(body))
            .unwrap();
        let mp = Multipart::from_request(request, &()).await.unwrap();

        let err = signup_with_pfp(State(AppState::fake()), mp)
            .await
            .err()
            .expect("truncated body should be rejected");
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(err.to_string().contains("Malformed multipart body"));
    }
}
