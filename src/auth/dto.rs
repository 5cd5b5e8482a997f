use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::User;

/// Request body for JSON signup.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub photo_profile: Option<String>,
    pub photo_thumbnail: Option<String>,
    pub photo_public_id: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
            photo_profile: u.photo_url,
            photo_thumbnail: u.photo_thumbnail,
            photo_public_id: u.photo_key,
            created_at: u.created_at,
        }
    }
}

/// Response returned after signup or login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub token: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub success: bool,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_serializes_camel_case() {
        let user = PublicUser {
            id: Uuid::new_v4(),
            name: "Test".into(),
            email: "test@example.com".into(),
            role: "user".into(),
            photo_profile: Some("https://img.local/p.jpg".into()),
            photo_thumbnail: None,
            photo_public_id: None,
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("photoProfile"));
        assert!(json.contains("createdAt"));
        assert!(json.contains("test@example.com"));
    }

    #[test]
    fn auth_response_omits_empty_message() {
        let resp = AuthResponse {
            success: true,
            message: None,
            token: "abc".into(),
            user: PublicUser {
                id: Uuid::new_v4(),
                name: "T".into(),
                email: "t@e.com".into(),
                role: "user".into(),
                photo_profile: None,
                photo_thumbnail: None,
                photo_public_id: None,
                created_at: OffsetDateTime::now_utc(),
            },
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(!json.contains("message"));
        assert!(json.contains("token"));
    }

    #[test]
    fn signup_request_accepts_camel_case_confirm() {
        let req: SignupRequest = serde_json::from_str(
            r#"{"name":"A","email":"a@b.c","password":"12345678","confirmPassword":"12345678"}"#,
        )
        .unwrap();
        assert_eq!(req.confirm_password, "12345678");
    }
}
