//! Profile forms
//!
//! Submitting a form validates the raw input and upserts the profile keyed by
//! the connected wallet. Every save stamps `createdAt` with the current time.

use crate::store::{CreatorProfile, RecordStore, StoreError, SupporterProfile, DEFAULT_AVATAR_URL};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

/// Largest accepted avatar upload
pub const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

/// Image types accepted for avatars
pub const AVATAR_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

#[derive(Error, Debug)]
pub enum FormError {
    #[error("Please connect your wallet first")]
    NotConnected,

    #[error("Please fill in all required fields ({0})")]
    MissingField(&'static str),

    #[error("Invalid avatar: {0}")]
    Avatar(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

fn required(value: &str, field: &'static str) -> Result<String, FormError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FormError::MissingField(field));
    }
    Ok(value.to_string())
}

fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Encode an uploaded image as a `data:` URL
pub fn avatar_data_url(bytes: &[u8], mime: &str) -> Result<String, FormError> {
    if !AVATAR_MIME_TYPES.contains(&mime) {
        return Err(FormError::Avatar(format!(
            "unsupported type {}; use JPG, PNG, GIF or WebP",
            mime
        )));
    }
    if bytes.len() > MAX_AVATAR_BYTES {
        return Err(FormError::Avatar("image must be smaller than 5MB".to_string()));
    }
    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
}

/// Guess an image MIME type from a file extension
pub fn mime_from_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Raw creator form input
#[derive(Debug, Clone, Default)]
pub struct CreatorForm {
    pub name: String,
    pub category: String,
    pub bio: String,
    pub avatar_url: Option<String>,
    /// One URL per line
    pub portfolio: String,
}

impl CreatorForm {
    /// Validate and store the profile for `connected`
    pub fn submit(
        &self,
        store: &RecordStore,
        connected: Option<&str>,
    ) -> Result<CreatorProfile, FormError> {
        let wallet = connected.ok_or(FormError::NotConnected)?;

        let name = required(&self.name, "name")?;
        let category = required(&self.category, "category")?;
        let bio = required(&self.bio, "bio")?;

        let mut profile = CreatorProfile::new(wallet, name, category, bio)
            .avatar(optional(self.avatar_url.as_deref()).unwrap_or_else(|| DEFAULT_AVATAR_URL.to_string()));
        for url in self.portfolio.lines().map(str::trim).filter(|l| !l.is_empty()) {
            profile = profile.portfolio_item(url);
        }

        store.upsert_creator(profile.clone())?;
        tracing::info!(wallet, "Creator profile saved");
        Ok(profile)
    }
}

/// Raw supporter form input
#[derive(Debug, Clone, Default)]
pub struct SupporterForm {
    pub display_name: String,
    pub bio: String,
    pub social_media: Option<String>,
    /// Inline avatar, see [`avatar_data_url`]
    pub avatar_url: Option<String>,
}

impl SupporterForm {
    pub fn submit(
        &self,
        store: &RecordStore,
        connected: Option<&str>,
    ) -> Result<SupporterProfile, FormError> {
        let wallet = connected.ok_or(FormError::NotConnected)?;

        let display_name = required(&self.display_name, "displayName")?;
        let bio = required(&self.bio, "bio")?;

        let existing = store.get_supporter(wallet);

        let mut profile = SupporterProfile::new(wallet, display_name, bio);
        if let Some(social) = optional(self.social_media.as_deref()) {
            profile = profile.social(social);
        }
        // Without a new upload the previous avatar stays
        match optional(self.avatar_url.as_deref()) {
            Some(avatar) => profile = profile.avatar(avatar),
            None => profile.avatar_url = existing.and_then(|p| p.avatar_url),
        }

        store.upsert_supporter(profile.clone())?;
        tracing::info!(wallet, "Supporter profile saved");
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creator_form() -> CreatorForm {
        CreatorForm {
            name: "  Ada ".to_string(),
            category: "Artist".to_string(),
            bio: "Paints".to_string(),
            avatar_url: None,
            portfolio: "https://a.example/1\n\n  https://a.example/2  \n".to_string(),
        }
    }

    #[test]
    fn test_creator_submit() {
        let store = RecordStore::in_memory();
        let profile = creator_form().submit(&store, Some("W")).unwrap();

        assert_eq!(profile.name, "Ada");
        assert_eq!(profile.avatar_url, DEFAULT_AVATAR_URL);
        assert_eq!(profile.portfolio, ["https://a.example/1", "https://a.example/2"]);
        assert_eq!(store.get_creator("W").unwrap(), profile);
    }

    #[test]
    fn test_creator_requires_wallet_and_fields() {
        let store = RecordStore::in_memory();
        assert!(matches!(
            creator_form().submit(&store, None),
            Err(FormError::NotConnected)
        ));

        let form = CreatorForm {
            category: " ".to_string(),
            ..creator_form()
        };
        assert!(matches!(
            form.submit(&store, Some("W")),
            Err(FormError::MissingField("category"))
        ));
        assert!(store.list_creators().is_empty());
    }

    #[test]
    fn test_edit_restamps_created_at() {
        let store = RecordStore::in_memory();
        store
            .upsert_creator(CreatorProfile::new("W", "Old", "Artist", "Old bio").created_at(42))
            .unwrap();

        let profile = creator_form().submit(&store, Some("W")).unwrap();
        assert!(profile.created_at > 42);
        assert_eq!(store.list_creators().len(), 1);
        assert_eq!(store.list_creators()[0].name, "Ada");
    }

    #[test]
    fn test_supporter_submit() {
        let store = RecordStore::in_memory();
        let form = SupporterForm {
            display_name: "Fan".to_string(),
            bio: "Loves art".to_string(),
            social_media: Some("".to_string()),
            avatar_url: Some(avatar_data_url(b"png", "image/png").unwrap()),
        };

        let profile = form.submit(&store, Some("W")).unwrap();
        assert_eq!(profile.social_media, None);
        assert!(profile.inline_avatar().is_some());

        // Re-submitting without an avatar keeps the stored one
        let edit = SupporterForm {
            avatar_url: None,
            social_media: Some("https://social.example/fan".to_string()),
            ..form
        };
        let edited = edit.submit(&store, Some("W")).unwrap();
        assert_eq!(edited.avatar_url, profile.avatar_url);
        assert!(edited.created_at >= profile.created_at);
        assert_eq!(edited.social_media.as_deref(), Some("https://social.example/fan"));
    }

    #[test]
    fn test_supporter_missing_name() {
        let store = RecordStore::in_memory();
        let form = SupporterForm {
            bio: "bio".to_string(),
            ..SupporterForm::default()
        };
        assert!(matches!(
            form.submit(&store, Some("W")),
            Err(FormError::MissingField("displayName"))
        ));
    }

    #[test]
    fn test_avatar_data_url() {
        assert_eq!(avatar_data_url(b"hi", "image/gif").unwrap(), "data:image/gif;base64,aGk=");
        assert!(matches!(
            avatar_data_url(b"hi", "image/bmp"),
            Err(FormError::Avatar(_))
        ));
        let big = vec![0u8; MAX_AVATAR_BYTES + 1];
        assert!(avatar_data_url(&big, "image/png").is_err());
        assert_eq!(mime_from_extension("JPG"), Some("image/jpeg"));
        assert_eq!(mime_from_extension("txt"), None);
    }
}
