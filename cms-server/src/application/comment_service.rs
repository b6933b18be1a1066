use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::data::post_repository::{LikeOutcome, PostRepository};
use crate::domain::comment::{
    Comment, CommentNode, CreateCommentRequest, UpdateCommentRequest, build_thread,
};
use crate::domain::error::DomainError;
use crate::domain::policy;
use crate::domain::role::Role;

/// One level of replies is materialized in the public thread view.
const DEFAULT_THREAD_DEPTH: usize = 1;

pub(crate) struct CommentService<C: CommentRepository, P: PostRepository> {
    comments: C,
    posts: P,
}

impl<C: CommentRepository, P: PostRepository> CommentService<C, P> {
    pub(crate) fn new(comments: C, posts: P) -> Self {
        Self { comments, posts }
    }

    pub(crate) async fn create_comment(
        &self,
        author_id: i64,
        post_id: i64,
        req: CreateCommentRequest,
    ) -> Result<Comment, DomainError> {
        let req = req.validate()?;

        self.posts
            .get_post(post_id)
            .await?
            .ok_or(DomainError::NotFound(format!("post id: {post_id}")))?;

        if let Some(parent_id) = req.parent_id {
            let parent = self
                .comments
                .get_comment(parent_id)
                .await?
                .ok_or(DomainError::NotFound(format!(
                    "parent comment id: {parent_id}"
                )))?;
            if parent.post_id != post_id {
                return Err(DomainError::Validation {
                    field: "parent_id",
                    message: "must reference a comment on the same post",
                });
            }
        }

        self.comments
            .create_comment(NewComment {
                post_id,
                author_id,
                content: req.content,
                parent_id: req.parent_id,
            })
            .await
    }

    /// Comments are editable by their author only; admins may delete but
    /// not rewrite other people's words.
    pub(crate) async fn update_comment(
        &self,
        actor_id: i64,
        comment_id: i64,
        req: UpdateCommentRequest,
    ) -> Result<Comment, DomainError> {
        let req = req.validate()?;

        let comment = self
            .comments
            .get_comment(comment_id)
            .await?
            .ok_or(DomainError::NotFound(format!("comment id: {comment_id}")))?;
        if comment.author_id != actor_id {
            return Err(DomainError::Forbidden);
        }

        self.comments
            .update_comment(comment_id, req.content)
            .await?
            .ok_or(DomainError::NotFound(format!("comment id: {comment_id}")))
    }

    pub(crate) async fn delete_comment(
        &self,
        actor_id: i64,
        actor_role: Role,
        comment_id: i64,
    ) -> Result<(), DomainError> {
        let comment = self
            .comments
            .get_comment(comment_id)
            .await?
            .ok_or(DomainError::NotFound(format!("comment id: {comment_id}")))?;
        if !policy::can_modify_content(actor_id, comment.author_id, actor_role) {
            return Err(DomainError::Forbidden);
        }

        let deleted = self.comments.delete_comment(comment_id).await?;
        if !deleted {
            return Err(DomainError::NotFound(format!("comment id: {comment_id}")));
        }
        Ok(())
    }

    pub(crate) async fn get_comments_by_post(
        &self,
        post_id: i64,
    ) -> Result<Vec<CommentNode>, DomainError> {
        self.posts
            .get_post(post_id)
            .await?
            .ok_or(DomainError::NotFound(format!("post id: {post_id}")))?;

        let comments = self.comments.list_by_post(post_id).await?;
        Ok(build_thread(comments, DEFAULT_THREAD_DEPTH))
    }

    pub(crate) async fn toggle_like(
        &self,
        actor_id: i64,
        comment_id: i64,
    ) -> Result<LikeOutcome, DomainError> {
        self.comments
            .toggle_like(comment_id, actor_id)
            .await?
            .ok_or(DomainError::NotFound(format!("comment id: {comment_id}")))
    }
}
