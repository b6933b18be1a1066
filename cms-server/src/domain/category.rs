use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::slug::slugify;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Category {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) description: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub(crate) struct CreateCategoryRequest {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
}

impl CreateCategoryRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            name: normalize_name(&self.name)?,
            description: self.description.map(|d| d.trim().to_string()),
        })
    }

    pub(crate) fn derive_slug(&self) -> Result<String, DomainError> {
        slugify("name", &self.name)
    }
}

/// Partial category update. `name: None` keeps the name (and slug).
/// `description` distinguishes "absent" (keep) from "null" (clear to "").
#[derive(Debug, Clone, Default)]
pub(crate) struct UpdateCategoryRequest {
    pub(crate) name: Option<String>,
    pub(crate) description: Option<Option<String>>,
}

impl UpdateCategoryRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let name = self.name.map(|n| normalize_name(&n)).transpose()?;
        let description = self
            .description
            .map(|d| d.map(|d| d.trim().to_string()));
        Ok(Self { name, description })
    }
}

fn normalize_name(name: &str) -> Result<String, DomainError> {
    let name = name.trim();
    if name.is_empty() || name.len() > 100 {
        return Err(DomainError::Validation {
            field: "name",
            message: "must be 1..100 chars",
        });
    }
    Ok(name.to_string())
}
