use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::DomainError;
use super::slug::slugify;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub(crate) enum PostStatus {
    Draft,
    Published,
}

impl PostStatus {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            _ => Err(DomainError::Validation {
                field: "status",
                message: "must be 'draft' or 'published'",
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) content: String,
    pub(crate) author_id: i64,
    pub(crate) category_id: i64,
    pub(crate) tags: Option<String>,
    pub(crate) status: PostStatus,
    pub(crate) likes_count: i64,
    pub(crate) views: i64,
    pub(crate) images: Vec<String>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub(crate) struct CreatePostRequest {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) category_id: i64,
    pub(crate) tags: Option<String>,
    pub(crate) status: Option<PostStatus>,
    pub(crate) images: Vec<String>,
}

impl CreatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let title = normalize_title(&self.title)?;
        let content = normalize_content(&self.content)?;
        if self.category_id <= 0 {
            return Err(DomainError::Validation {
                field: "category_id",
                message: "must be > 0",
            });
        }
        Ok(Self {
            title,
            content,
            ..self
        })
    }

    pub(crate) fn derive_slug(&self) -> Result<String, DomainError> {
        slugify("title", &self.title)
    }
}

/// Partial post update. Absent fields keep their stored values; `images`
/// are appended to the existing sequence, never replacing it.
#[derive(Debug, Clone, Default)]
pub(crate) struct UpdatePostRequest {
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
    pub(crate) category_id: Option<i64>,
    pub(crate) tags: Option<String>,
    pub(crate) status: Option<PostStatus>,
    pub(crate) new_images: Vec<String>,
}

impl UpdatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let title = self.title.map(|t| normalize_title(&t)).transpose()?;
        let content = self.content.map(|c| normalize_content(&c)).transpose()?;
        if let Some(category_id) = self.category_id
            && category_id <= 0
        {
            return Err(DomainError::Validation {
                field: "category_id",
                message: "must be > 0",
            });
        }
        Ok(Self {
            title,
            content,
            ..self
        })
    }
}

fn normalize_title(title: &str) -> Result<String, DomainError> {
    let title = title.trim();
    if title.is_empty() || title.len() > 255 {
        return Err(DomainError::Validation {
            field: "title",
            message: "must be 1..255 chars",
        });
    }
    Ok(title.to_string())
}

fn normalize_content(content: &str) -> Result<String, DomainError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(DomainError::Validation {
            field: "content",
            message: "must not be empty",
        });
    }
    Ok(content.to_string())
}
