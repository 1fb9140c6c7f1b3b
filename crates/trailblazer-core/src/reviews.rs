use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const FALLBACK_REVIEWER_NAME: &str = "User";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub shoe_id: Uuid,
    pub user_id: String,
    pub user_name: String,
    pub user_photo: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Identity details supplied by whoever signed in to post a review.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewerProfile {
    pub user_id: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

/// A review ready to persist: content trimmed, display name resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub shoe_id: Uuid,
    pub user_id: String,
    pub user_name: String,
    pub user_photo: Option<String>,
    pub content: String,
}

impl NewReview {
    /// Builds a review from raw input. Returns `None` when the content is blank.
    #[must_use]
    pub fn from_profile(shoe_id: Uuid, profile: ReviewerProfile, content: &str) -> Option<Self> {
        let content = content.trim();
        if content.is_empty() {
            return None;
        }

        let user_name =
            reviewer_display_name(profile.full_name.as_deref(), profile.email.as_deref());
        Some(Self {
            shoe_id,
            user_id: profile.user_id,
            user_name,
            user_photo: profile.avatar_url.filter(|u| !u.trim().is_empty()),
            content: content.to_string(),
        })
    }

    #[must_use]
    pub fn into_review(self, id: Uuid, created_at: DateTime<Utc>) -> Review {
        Review {
            id,
            shoe_id: self.shoe_id,
            user_id: self.user_id,
            user_name: self.user_name,
            user_photo: self.user_photo,
            content: self.content,
            created_at,
        }
    }
}

/// Display name for a reviewer: full name, then the email's local part,
/// then `"User"`.
#[must_use]
pub fn reviewer_display_name(full_name: Option<&str>, email: Option<&str>) -> String {
    if let Some(name) = full_name.map(str::trim).filter(|n| !n.is_empty()) {
        return name.to_string();
    }

    email
        .and_then(|e| e.split('@').next())
        .map(str::trim)
        .filter(|local| !local.is_empty())
        .unwrap_or(FALLBACK_REVIEWER_NAME)
        .to_string()
}
