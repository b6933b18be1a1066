use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::category::Category;
use crate::domain::error::DomainError;
use crate::domain::post::PostStatus;

#[derive(Debug, Clone)]
pub(crate) struct NewCategory {
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) description: String,
}

/// `name_slug` carries the re-derived slug together with the new name so the
/// pair is written in one statement. `description: Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub(crate) struct CategoryPatch {
    pub(crate) name_slug: Option<(String, String)>,
    pub(crate) description: Option<Option<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CategoryDeleteOutcome {
    Deleted,
    HasPosts,
    NotFound,
}

#[derive(Debug, Clone)]
pub(crate) struct CategoryWithCount {
    pub(crate) category: Category,
    pub(crate) post_count: i64,
}

#[derive(Debug, Clone)]
pub(crate) struct CategoryPostSummary {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) status: PostStatus,
    pub(crate) author_id: i64,
    pub(crate) created_at: DateTime<Utc>,
}

#[async_trait]
pub(crate) trait CategoryRepository: Send + Sync {
    async fn create_category(&self, input: NewCategory) -> Result<Category, DomainError>;
    async fn get_category(&self, id: i64) -> Result<Option<Category>, DomainError>;
    async fn update_category(
        &self,
        id: i64,
        patch: CategoryPatch,
    ) -> Result<Option<Category>, DomainError>;
    /// Conditional delete: succeeds only when no post references the
    /// category, in a single statement so no post can slip in between the
    /// check and the delete.
    async fn delete_category_if_unused(&self, id: i64)
    -> Result<CategoryDeleteOutcome, DomainError>;
    async fn list_categories(&self) -> Result<Vec<CategoryWithCount>, DomainError>;
    async fn post_summaries(&self, category_id: i64)
    -> Result<Vec<CategoryPostSummary>, DomainError>;
}
