use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostStatus};

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) content: String,
    pub(crate) author_id: i64,
    pub(crate) category_id: i64,
    pub(crate) tags: Option<String>,
    pub(crate) status: PostStatus,
    pub(crate) images: Vec<String>,
}

/// Partial update; `title_slug` writes the new title and its re-derived slug
/// together, `new_images` are appended to the stored sequence.
#[derive(Debug, Clone, Default)]
pub(crate) struct PostPatch {
    pub(crate) title_slug: Option<(String, String)>,
    pub(crate) content: Option<String>,
    pub(crate) category_id: Option<i64>,
    pub(crate) tags: Option<String>,
    pub(crate) status: Option<PostStatus>,
    pub(crate) new_images: Vec<String>,
}

/// A post joined with the display fields of its references.
#[derive(Debug, Clone)]
pub(crate) struct PostWithRefs {
    pub(crate) post: Post,
    pub(crate) author_username: String,
    pub(crate) category_name: String,
}

/// Result of a like toggle, read back atomically with the flip.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LikeOutcome {
    pub(crate) liked: bool,
    pub(crate) likes_count: i64,
}

#[derive(Debug, Clone)]
pub(crate) struct AuthorPostSummary {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) status: PostStatus,
    pub(crate) created_at: DateTime<Utc>,
}

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError>;
    /// Fetches the post and increments `views` by exactly 1, atomically.
    async fn get_post_and_bump_views(&self, id: i64)
    -> Result<Option<PostWithRefs>, DomainError>;
    async fn update_post(&self, id: i64, patch: PostPatch) -> Result<Option<Post>, DomainError>;
    /// Deletes the post; its comments go with it.
    async fn delete_post(&self, id: i64) -> Result<bool, DomainError>;
    async fn list_posts(&self) -> Result<Vec<PostWithRefs>, DomainError>;
    /// Strict like toggle: membership flip and counter adjustment happen in
    /// one transaction. Returns `None` when the post does not exist.
    async fn toggle_like(&self, post_id: i64, user_id: i64)
    -> Result<Option<LikeOutcome>, DomainError>;
    async fn summaries_by_author(&self, author_id: i64)
    -> Result<Vec<AuthorPostSummary>, DomainError>;
    async fn total_posts(&self) -> Result<i64, DomainError>;
}
