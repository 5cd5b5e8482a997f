use anyhow::Context;
use bytes::Bytes;
use uuid::Uuid;

use crate::state::AppState;

/// References persisted on the user record after an avatar upload.
#[derive(Debug, Clone)]
pub struct AvatarRefs {
    pub photo_url: Option<String>,
    pub photo_thumbnail: Option<String>,
    /// Object key in external storage; None for generated placeholders.
    pub photo_key: Option<String>,
}

/// Generated placeholder avatar, used when no photo is provided or an
/// upload fails. Registration never fails because of the picture.
pub fn default_avatar(name: &str) -> AvatarRefs {
    let initials: String = name
        .chars()
        .filter(|c| c.is_alphanumeric())
        .take(2)
        .collect();
    let initials = if initials.is_empty() { "U".to_string() } else { initials };
    let url = format!(
        "https://ui-avatars.com/api/?name={}&background=random&color=fff&size=400",
        initials
    );
    AvatarRefs {
        photo_url: Some(url.clone()),
        photo_thumbnail: Some(url),
        photo_key: None,
    }
}

/// Uploads avatar bytes to the object store and returns the persisted
/// references. The thumbnail mirrors the primary URL; transforms are the
/// image host's concern.
pub async fn upload_avatar(
    st: &AppState,
    user_id: Uuid,
    body: Bytes,
    content_type: &str,
    delete_old_key: Option<&str>,
) -> anyhow::Result<AvatarRefs> {
    anyhow::ensure!(!body.is_empty(), "empty photo");

    let ext = ext_from_mime(content_type).unwrap_or("bin");
    let key = format!("avatars/{}/{}.{}", user_id, Uuid::new_v4(), ext);
    st.storage
        .put_object(&key, body, content_type)
        .await
        .with_context(|| format!("put_object {}", key))?;

    if let Some(old) = delete_old_key {
        if let Err(e) = st.storage.delete_object(old).await {
            tracing::warn!(error = %e, key = old, "delete old avatar failed");
        }
    }

    let url = st.storage.object_url(&key);
    Ok(AvatarRefs {
        photo_url: Some(url.clone()),
        photo_thumbnail: Some(url),
        photo_key: Some(key),
    })
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    #[test]
    fn test_ext_from_mime() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("image/webp"), Some("webp"));
        assert_eq!(ext_from_mime("application/octet-stream"), None);
    }

    #[test]
    fn default_avatar_uses_initials() {
        let refs = default_avatar("Maria Santos");
        let url = refs.photo_url.unwrap();
        assert!(url.contains("name=Ma"));
        assert_eq!(refs.photo_thumbnail.unwrap(), url);
        assert!(refs.photo_key.is_none());
    }

    #[test]
    fn default_avatar_handles_empty_name() {
        let refs = default_avatar("  ");
        assert!(refs.photo_url.unwrap().contains("name=U"));
    }

    #[tokio::test]
    async fn upload_rejects_empty_body() {
        let state = AppState::fake();
        let err = upload_avatar(&state, Uuid::new_v4(), Bytes::new(), "image/png", None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("empty photo"));
    }

    #[tokio::test]
    async fn upload_returns_storage_refs() {
        let state = AppState::fake();
        let refs = upload_avatar(
            &state,
            Uuid::new_v4(),
            Bytes::from_static(b"fakejpegbytes"),
            "image/jpeg",
            None,
        )
        .await
        .unwrap();
        let key = refs.photo_key.unwrap();
        assert!(key.starts_with("avatars/"));
        assert!(key.ends_with(".jpg"));
        assert!(refs.photo_url.unwrap().contains(&key));
    }
}
