use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    analytics::{AnalyticsSnapshot, UserStats},
    users::User,
};

/// User row as exposed to administrators; password hash excluded.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserItem {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub photo_profile: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
    pub is_active: bool,
}

impl From<User> for AdminUserItem {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
            photo_profile: u.photo_url,
            created_at: u.created_at,
            updated_at: u.updated_at,
            is_active: u.is_active,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub success: bool,
    pub users: Vec<AdminUserItem>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct DeactivateRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_sent: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: UserStats,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub success: bool,
    pub stats: AnalyticsSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_response_omits_absent_email_flag() {
        let resp = ActionResponse {
            success: true,
            message: "User deleted".into(),
            email_sent: None,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(!json.contains("emailSent"));

        let resp = ActionResponse {
            success: true,
            message: "User deactivated".into(),
            email_sent: Some(false),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"emailSent\":false"));
    }
}
