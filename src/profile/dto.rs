use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::User;

/// Own-profile view; everything the account holder may see about
/// themselves, password hash excluded.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub photo_profile: Option<String>,
    pub photo_thumbnail: Option<String>,
    pub photo_public_id: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
    pub is_logged_in: bool,
}

impl From<User> for ProfileResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            photo_profile: u.photo_url,
            photo_thumbnail: u.photo_thumbnail,
            photo_public_id: u.photo_key,
            created_at: u.created_at,
            updated_at: u.updated_at,
            is_logged_in: u.is_logged_in,
        }
    }
}

/// Partial merge: absent or null fields are left untouched.
#[derive(Debug, Deserialize, Default)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedPfpResponse {
    pub success: bool,
    pub message: String,
    pub photo_profile: Option<String>,
    pub photo_thumbnail: Option<String>,
    pub photo_public_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_request_fields_default_to_none() {
        let req: UpdateProfileRequest = serde_json::from_str(r#"{"name":"X"}"#).unwrap();
        assert_eq!(req.name.as_deref(), Some("X"));
        assert!(req.email.is_none());
        assert!(req.password.is_none());
    }

    #[test]
    fn profile_response_is_camel_case() {
        let resp = ProfileResponse {
            id: Uuid::new_v4(),
            name: "T".into(),
            email: "t@e.com".into(),
            photo_profile: None,
            photo_thumbnail: None,
            photo_public_id: None,
            created_at: OffsetDateTime::now_utc(),
            updated_at: None,
            is_logged_in: true,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("isLoggedIn"));
        assert!(json.contains("photoProfile"));
    }
}
