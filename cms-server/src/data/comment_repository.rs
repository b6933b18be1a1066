use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::data::post_repository::LikeOutcome;
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct NewComment {
    pub(crate) post_id: i64,
    pub(crate) author_id: i64,
    pub(crate) content: String,
    pub(crate) parent_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub(crate) struct AuthorCommentSummary {
    pub(crate) id: i64,
    pub(crate) content: String,
    pub(crate) post_id: i64,
    pub(crate) post_title: String,
    pub(crate) post_slug: String,
    pub(crate) created_at: DateTime<Utc>,
}

#[async_trait]
pub(crate) trait CommentRepository: Send + Sync {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError>;
    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, DomainError>;
    async fn update_comment(&self, id: i64, content: String)
    -> Result<Option<Comment>, DomainError>;
    async fn delete_comment(&self, id: i64) -> Result<bool, DomainError>;
    /// All comments of a post (roots and replies), newest first.
    async fn list_by_post(&self, post_id: i64) -> Result<Vec<Comment>, DomainError>;
    /// Strict like toggle, same contract as the post variant.
    async fn toggle_like(&self, comment_id: i64, user_id: i64)
    -> Result<Option<LikeOutcome>, DomainError>;
    async fn summaries_by_author(&self, author_id: i64)
    -> Result<Vec<AuthorCommentSummary>, DomainError>;
    async fn total_comments(&self) -> Result<i64, DomainError>;
}
