use crate::data::post_repository::{
    LikeOutcome, NewPost, PostPatch, PostRepository, PostWithRefs,
};
use crate::domain::error::DomainError;
use crate::domain::policy;
use crate::domain::post::{CreatePostRequest, Post, PostStatus, UpdatePostRequest};
use crate::domain::role::Role;
use crate::domain::slug::slugify;

pub(crate) struct PostService<R: PostRepository> {
    repo: R,
}

impl<R: PostRepository> PostService<R> {
    pub(crate) fn new(repo: R) -> Self {
        Self { repo }
    }

    pub(crate) async fn create_post(
        &self,
        author_id: i64,
        req: CreatePostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;
        let slug = req.derive_slug()?;

        self.repo
            .create_post(NewPost {
                title: req.title,
                slug,
                content: req.content,
                author_id,
                category_id: req.category_id,
                tags: req.tags,
                status: req.status.unwrap_or(PostStatus::Draft),
                images: req.images,
            })
            .await
    }

    pub(crate) async fn update_post(
        &self,
        actor_id: i64,
        actor_role: Role,
        post_id: i64,
        req: UpdatePostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;

        let post = self
            .repo
            .get_post(post_id)
            .await?
            .ok_or(DomainError::NotFound(format!("post id: {post_id}")))?;
        if !policy::can_modify_content(actor_id, post.author_id, actor_role) {
            return Err(DomainError::Forbidden);
        }

        let title_slug = match req.title {
            Some(title) => {
                let slug = slugify("title", &title)?;
                Some((title, slug))
            }
            None => None,
        };

        self.repo
            .update_post(
                post_id,
                PostPatch {
                    title_slug,
                    content: req.content,
                    category_id: req.category_id,
                    tags: req.tags,
                    status: req.status,
                    new_images: req.new_images,
                },
            )
            .await?
            .ok_or(DomainError::NotFound(format!("post id: {post_id}")))
    }

    pub(crate) async fn delete_post(
        &self,
        actor_id: i64,
        actor_role: Role,
        post_id: i64,
    ) -> Result<(), DomainError> {
        let post = self
            .repo
            .get_post(post_id)
            .await?
            .ok_or(DomainError::NotFound(format!("post id: {post_id}")))?;
        if !policy::can_modify_content(actor_id, post.author_id, actor_role) {
            return Err(DomainError::Forbidden);
        }

        let deleted = self.repo.delete_post(post_id).await?;
        if !deleted {
            return Err(DomainError::NotFound(format!("post id: {post_id}")));
        }
        Ok(())
    }

    pub(crate) async fn list_posts(&self) -> Result<Vec<PostWithRefs>, DomainError> {
        self.repo.list_posts().await
    }

    /// Public read; bumps the view counter by exactly 1 as a side effect.
    pub(crate) async fn get_post(&self, post_id: i64) -> Result<PostWithRefs, DomainError> {
        self.repo
            .get_post_and_bump_views(post_id)
            .await?
            .ok_or(DomainError::NotFound(format!("post id: {post_id}")))
    }

    pub(crate) async fn toggle_like(
        &self,
        actor_id: i64,
        post_id: i64,
    ) -> Result<LikeOutcome, DomainError> {
        self.repo
            .toggle_like(post_id, actor_id)
            .await?
            .ok_or(DomainError::NotFound(format!("post id: {post_id}")))
    }
}
