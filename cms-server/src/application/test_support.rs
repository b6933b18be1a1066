//! In-memory repository fakes backed by one shared store, so cross-entity
//! behavior (cascades, category-in-use checks, like counters) can be
//! exercised without a database.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::application::password;
use crate::data::category_repository::{
    CategoryDeleteOutcome, CategoryPatch, CategoryPostSummary, CategoryRepository,
    CategoryWithCount, NewCategory,
};
use crate::data::comment_repository::{AuthorCommentSummary, CommentRepository, NewComment};
use crate::data::post_repository::{
    AuthorPostSummary, LikeOutcome, NewPost, PostPatch, PostRepository, PostWithRefs,
};
use crate::data::user_repository::{NewUser, UserCredentials, UserRepository};
use crate::domain::category::Category;
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostStatus};
use crate::domain::role::Role;
use crate::domain::slug::slugify;
use crate::domain::user::{Profile, ProfilePatch, User};
use crate::infrastructure::mailer::{MailMessage, Mailer};

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: String,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    users: BTreeMap<i64, StoredUser>,
    categories: BTreeMap<i64, Category>,
    posts: BTreeMap<i64, Post>,
    comments: BTreeMap<i64, Comment>,
    post_likes: HashSet<(i64, i64)>,
    comment_likes: HashSet<(i64, i64)>,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn remove_post(&mut self, post_id: i64) {
        self.posts.remove(&post_id);
        let comment_ids: Vec<i64> = self
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .map(|c| c.id)
            .collect();
        for comment_id in comment_ids {
            self.comments.remove(&comment_id);
            self.comment_likes.retain(|(cid, _)| *cid != comment_id);
        }
        self.post_likes.retain(|(pid, _)| *pid != post_id);
    }

    fn remove_comment_tree(&mut self, comment_id: i64) {
        let children: Vec<i64> = self
            .comments
            .values()
            .filter(|c| c.parent_id == Some(comment_id))
            .map(|c| c.id)
            .collect();
        for child in children {
            self.remove_comment_tree(child);
        }
        self.comments.remove(&comment_id);
        self.comment_likes.retain(|(cid, _)| *cid != comment_id);
    }
}

#[derive(Clone, Default)]
pub(crate) struct MemStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("mem store mutex poisoned")
    }

    pub(crate) fn password_hash(&self, user_id: i64) -> Option<String> {
        self.lock()
            .users
            .get(&user_id)
            .map(|stored| stored.password_hash.clone())
    }
}

pub(crate) fn seed_user(store: &MemStore, username: &str, email: &str, raw_password: &str) -> i64 {
    let password_hash = password::hash_password(raw_password).expect("hash must be created");
    let mut inner = store.lock();
    let id = inner.next_id();
    let now = Utc::now();
    let user = User::new(
        id,
        username,
        email,
        Role::User,
        false,
        true,
        Profile::default(),
        now,
        now,
    )
    .expect("seed user must be valid");
    inner.users.insert(id, StoredUser {
        user,
        password_hash,
    });
    id
}

pub(crate) fn seed_category(store: &MemStore, name: &str) -> i64 {
    let mut inner = store.lock();
    let id = inner.next_id();
    let now = Utc::now();
    let slug = slugify("name", name).expect("seed category slug must derive");
    inner.categories.insert(id, Category {
        id,
        name: name.to_string(),
        slug,
        description: String::new(),
        created_at: now,
        updated_at: now,
    });
    id
}

pub(crate) fn seed_post(
    store: &MemStore,
    author_id: i64,
    category_id: i64,
    title: &str,
    slug: &str,
) -> i64 {
    let mut inner = store.lock();
    let id = inner.next_id();
    let now = Utc::now();
    inner.posts.insert(id, Post {
        id,
        title: title.to_string(),
        slug: slug.to_string(),
        content: "content".to_string(),
        author_id,
        category_id,
        tags: None,
        status: PostStatus::Published,
        likes_count: 0,
        views: 0,
        images: Vec::new(),
        created_at: now,
        updated_at: now,
    });
    id
}

pub(crate) fn seed_comment(
    store: &MemStore,
    post_id: i64,
    author_id: i64,
    content: &str,
    parent_id: Option<i64>,
) -> i64 {
    let mut inner = store.lock();
    let id = inner.next_id();
    let now = Utc::now();
    inner.comments.insert(id, Comment {
        id,
        post_id,
        author_id,
        content: content.to_string(),
        parent_id,
        likes_count: 0,
        created_at: now,
        updated_at: now,
    });
    id
}

#[derive(Clone)]
pub(crate) struct InMemoryUserRepo {
    store: MemStore,
}

impl InMemoryUserRepo {
    pub(crate) fn new(store: MemStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepo {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        let mut inner = self.store.lock();
        if inner
            .users
            .values()
            .any(|stored| stored.user.username == input.username)
        {
            return Err(DomainError::Conflict("username".to_string()));
        }
        if inner
            .users
            .values()
            .any(|stored| stored.user.email == input.email)
        {
            return Err(DomainError::Conflict("email".to_string()));
        }

        let id = inner.next_id();
        let now = Utc::now();
        let user = User::new(
            id,
            input.username,
            input.email,
            input.role,
            false,
            true,
            Profile::default(),
            now,
            now,
        )
        .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        inner.users.insert(id, StoredUser {
            user: user.clone(),
            password_hash: input.password_hash,
        });
        Ok(user)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, DomainError> {
        Ok(self.store.lock().users.get(&id).map(|s| s.user.clone()))
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, DomainError> {
        Ok(self
            .store
            .lock()
            .users
            .values()
            .find(|stored| stored.user.username == username)
            .map(|stored| UserCredentials {
                user: stored.user.clone(),
                password_hash: stored.password_hash.clone(),
            }))
    }

    async fn get_credentials(&self, id: i64) -> Result<Option<UserCredentials>, DomainError> {
        Ok(self
            .store
            .lock()
            .users
            .get(&id)
            .map(|stored| UserCredentials {
                user: stored.user.clone(),
                password_hash: stored.password_hash.clone(),
            }))
    }

    async fn update_profile(
        &self,
        id: i64,
        patch: ProfilePatch,
    ) -> Result<Option<User>, DomainError> {
        let mut inner = self.store.lock();
        let Some(stored) = inner.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(bio) = patch.bio {
            stored.user.profile.bio = bio;
        }
        if let Some(image) = patch.image {
            stored.user.profile.image = Some(image);
        }
        stored.user.updated_at = Utc::now();
        Ok(Some(stored.user.clone()))
    }

    async fn update_password(&self, id: i64, password_hash: String) -> Result<bool, DomainError> {
        let mut inner = self.store.lock();
        match inner.users.get_mut(&id) {
            Some(stored) => {
                stored.password_hash = password_hash;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_role(&self, id: i64, role: Role) -> Result<Option<User>, DomainError> {
        let mut inner = self.store.lock();
        let Some(stored) = inner.users.get_mut(&id) else {
            return Ok(None);
        };
        stored.user.role = role;
        stored.user.updated_at = Utc::now();
        Ok(Some(stored.user.clone()))
    }

    async fn delete_user(&self, id: i64) -> Result<bool, DomainError> {
        let mut inner = self.store.lock();
        if inner.users.remove(&id).is_none() {
            return Ok(false);
        }
        let post_ids: Vec<i64> = inner
            .posts
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in post_ids {
            inner.remove_post(post_id);
        }
        let comment_ids: Vec<i64> = inner
            .comments
            .values()
            .filter(|c| c.author_id == id)
            .map(|c| c.id)
            .collect();
        for comment_id in comment_ids {
            inner.remove_comment_tree(comment_id);
        }
        let liked_posts: Vec<i64> = inner
            .post_likes
            .iter()
            .filter(|(_, user_id)| *user_id == id)
            .map(|(post_id, _)| *post_id)
            .collect();
        for post_id in liked_posts {
            inner.post_likes.remove(&(post_id, id));
            if let Some(post) = inner.posts.get_mut(&post_id) {
                post.likes_count -= 1;
            }
        }
        let liked_comments: Vec<i64> = inner
            .comment_likes
            .iter()
            .filter(|(_, user_id)| *user_id == id)
            .map(|(comment_id, _)| *comment_id)
            .collect();
        for comment_id in liked_comments {
            inner.comment_likes.remove(&(comment_id, id));
            if let Some(comment) = inner.comments.get_mut(&comment_id) {
                comment.likes_count -= 1;
            }
        }
        Ok(true)
    }

    async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        let inner = self.store.lock();
        let mut users: Vec<User> = inner.users.values().map(|s| s.user.clone()).collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(users)
    }

    async fn total_users(&self) -> Result<i64, DomainError> {
        Ok(self.store.lock().users.len() as i64)
    }
}

#[derive(Clone)]
pub(crate) struct InMemoryCategoryRepo {
    store: MemStore,
}

impl InMemoryCategoryRepo {
    pub(crate) fn new(store: MemStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepo {
    async fn create_category(&self, input: NewCategory) -> Result<Category, DomainError> {
        let mut inner = self.store.lock();
        if inner
            .categories
            .values()
            .any(|c| c.name == input.name || c.slug == input.slug)
        {
            return Err(DomainError::Conflict("category slug".to_string()));
        }

        let id = inner.next_id();
        let now = Utc::now();
        let category = Category {
            id,
            name: input.name,
            slug: input.slug,
            description: input.description,
            created_at: now,
            updated_at: now,
        };
        inner.categories.insert(id, category.clone());
        Ok(category)
    }

    async fn get_category(&self, id: i64) -> Result<Option<Category>, DomainError> {
        Ok(self.store.lock().categories.get(&id).cloned())
    }

    async fn update_category(
        &self,
        id: i64,
        patch: CategoryPatch,
    ) -> Result<Option<Category>, DomainError> {
        let mut inner = self.store.lock();
        if let Some((name, slug)) = &patch.name_slug
            && inner
                .categories
                .values()
                .any(|c| c.id != id && (&c.name == name || &c.slug == slug))
        {
            return Err(DomainError::Conflict("category slug".to_string()));
        }
        let Some(category) = inner.categories.get_mut(&id) else {
            return Ok(None);
        };
        if let Some((name, slug)) = patch.name_slug {
            category.name = name;
            category.slug = slug;
        }
        if let Some(description) = patch.description {
            category.description = description.unwrap_or_default();
        }
        category.updated_at = Utc::now();
        Ok(Some(category.clone()))
    }

    async fn delete_category_if_unused(
        &self,
        id: i64,
    ) -> Result<CategoryDeleteOutcome, DomainError> {
        let mut inner = self.store.lock();
        if !inner.categories.contains_key(&id) {
            return Ok(CategoryDeleteOutcome::NotFound);
        }
        if inner.posts.values().any(|p| p.category_id == id) {
            return Ok(CategoryDeleteOutcome::HasPosts);
        }
        inner.categories.remove(&id);
        Ok(CategoryDeleteOutcome::Deleted)
    }

    async fn list_categories(&self) -> Result<Vec<CategoryWithCount>, DomainError> {
        let inner = self.store.lock();
        let mut listed: Vec<CategoryWithCount> = inner
            .categories
            .values()
            .map(|category| CategoryWithCount {
                category: category.clone(),
                post_count: inner
                    .posts
                    .values()
                    .filter(|p| p.category_id == category.id)
                    .count() as i64,
            })
            .collect();
        listed.sort_by(|a, b| a.category.name.cmp(&b.category.name));
        Ok(listed)
    }

    async fn post_summaries(
        &self,
        category_id: i64,
    ) -> Result<Vec<CategoryPostSummary>, DomainError> {
        let inner = self.store.lock();
        let mut posts: Vec<&Post> = inner
            .posts
            .values()
            .filter(|p| p.category_id == category_id)
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(posts
            .into_iter()
            .map(|p| CategoryPostSummary {
                id: p.id,
                title: p.title.clone(),
                slug: p.slug.clone(),
                status: p.status,
                author_id: p.author_id,
                created_at: p.created_at,
            })
            .collect())
    }
}

#[derive(Clone)]
pub(crate) struct InMemoryPostRepo {
    store: MemStore,
}

impl InMemoryPostRepo {
    pub(crate) fn new(store: MemStore) -> Self {
        Self { store }
    }
}

fn with_refs(inner: &Inner, post: Post) -> Result<PostWithRefs, DomainError> {
    let author_username = inner
        .users
        .get(&post.author_id)
        .map(|s| s.user.username.clone())
        .ok_or(DomainError::Unexpected("author missing".to_string()))?;
    let category_name = inner
        .categories
        .get(&post.category_id)
        .map(|c| c.name.clone())
        .ok_or(DomainError::Unexpected("category missing".to_string()))?;
    Ok(PostWithRefs {
        post,
        author_username,
        category_name,
    })
}

#[async_trait]
impl PostRepository for InMemoryPostRepo {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let mut inner = self.store.lock();
        if !inner.categories.contains_key(&input.category_id) {
            return Err(DomainError::NotFound("category".to_string()));
        }
        if !inner.users.contains_key(&input.author_id) {
            return Err(DomainError::NotFound("author".to_string()));
        }
        if inner.posts.values().any(|p| p.slug == input.slug) {
            return Err(DomainError::Conflict("post slug".to_string()));
        }

        let id = inner.next_id();
        let now = Utc::now();
        let post = Post {
            id,
            title: input.title,
            slug: input.slug,
            content: input.content,
            author_id: input.author_id,
            category_id: input.category_id,
            tags: input.tags,
            status: input.status,
            likes_count: 0,
            views: 0,
            images: input.images,
            created_at: now,
            updated_at: now,
        };
        inner.posts.insert(id, post.clone());
        Ok(post)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        Ok(self.store.lock().posts.get(&id).cloned())
    }

    async fn get_post_and_bump_views(
        &self,
        id: i64,
    ) -> Result<Option<PostWithRefs>, DomainError> {
        let mut inner = self.store.lock();
        let Some(post) = inner.posts.get_mut(&id) else {
            return Ok(None);
        };
        post.views += 1;
        let post = post.clone();
        Ok(Some(with_refs(&inner, post)?))
    }

    async fn update_post(&self, id: i64, patch: PostPatch) -> Result<Option<Post>, DomainError> {
        let mut inner = self.store.lock();
        if let Some((_, slug)) = &patch.title_slug
            && inner.posts.values().any(|p| p.id != id && &p.slug == slug)
        {
            return Err(DomainError::Conflict("post slug".to_string()));
        }
        if let Some(category_id) = patch.category_id
            && !inner.categories.contains_key(&category_id)
        {
            return Err(DomainError::NotFound("category".to_string()));
        }
        let Some(post) = inner.posts.get_mut(&id) else {
            return Ok(None);
        };
        if let Some((title, slug)) = patch.title_slug {
            post.title = title;
            post.slug = slug;
        }
        if let Some(content) = patch.content {
            post.content = content;
        }
        if let Some(category_id) = patch.category_id {
            post.category_id = category_id;
        }
        if let Some(tags) = patch.tags {
            post.tags = Some(tags);
        }
        if let Some(status) = patch.status {
            post.status = status;
        }
        post.images.extend(patch.new_images);
        post.updated_at = Utc::now();
        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        let mut inner = self.store.lock();
        if !inner.posts.contains_key(&id) {
            return Ok(false);
        }
        inner.remove_post(id);
        Ok(true)
    }

    async fn list_posts(&self) -> Result<Vec<PostWithRefs>, DomainError> {
        let inner = self.store.lock();
        let mut posts: Vec<Post> = inner.posts.values().cloned().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        posts
            .into_iter()
            .map(|post| with_refs(&inner, post))
            .collect()
    }

    async fn toggle_like(
        &self,
        post_id: i64,
        user_id: i64,
    ) -> Result<Option<LikeOutcome>, DomainError> {
        let mut inner = self.store.lock();
        if !inner.posts.contains_key(&post_id) {
            return Ok(None);
        }
        let key = (post_id, user_id);
        let liked = !inner.post_likes.remove(&key);
        if liked {
            inner.post_likes.insert(key);
        }
        let post = inner
            .posts
            .get_mut(&post_id)
            .ok_or(DomainError::Unexpected("post vanished".to_string()))?;
        post.likes_count += if liked { 1 } else { -1 };
        Ok(Some(LikeOutcome {
            liked,
            likes_count: post.likes_count,
        }))
    }

    async fn summaries_by_author(
        &self,
        author_id: i64,
    ) -> Result<Vec<AuthorPostSummary>, DomainError> {
        let inner = self.store.lock();
        let mut posts: Vec<&Post> = inner
            .posts
            .values()
            .filter(|p| p.author_id == author_id)
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(posts
            .into_iter()
            .map(|p| AuthorPostSummary {
                id: p.id,
                title: p.title.clone(),
                slug: p.slug.clone(),
                status: p.status,
                created_at: p.created_at,
            })
            .collect())
    }

    async fn total_posts(&self) -> Result<i64, DomainError> {
        Ok(self.store.lock().posts.len() as i64)
    }
}

#[derive(Clone)]
pub(crate) struct InMemoryCommentRepo {
    store: MemStore,
}

impl InMemoryCommentRepo {
    pub(crate) fn new(store: MemStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepo {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
        let mut inner = self.store.lock();
        if !inner.posts.contains_key(&input.post_id) {
            return Err(DomainError::NotFound("post".to_string()));
        }
        if let Some(parent_id) = input.parent_id
            && !inner.comments.contains_key(&parent_id)
        {
            return Err(DomainError::NotFound("parent comment".to_string()));
        }

        let id = inner.next_id();
        let now = Utc::now();
        let comment = Comment {
            id,
            post_id: input.post_id,
            author_id: input.author_id,
            content: input.content,
            parent_id: input.parent_id,
            likes_count: 0,
            created_at: now,
            updated_at: now,
        };
        inner.comments.insert(id, comment.clone());
        Ok(comment)
    }

    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, DomainError> {
        Ok(self.store.lock().comments.get(&id).cloned())
    }

    async fn update_comment(
        &self,
        id: i64,
        content: String,
    ) -> Result<Option<Comment>, DomainError> {
        let mut inner = self.store.lock();
        let Some(comment) = inner.comments.get_mut(&id) else {
            return Ok(None);
        };
        comment.content = content;
        comment.updated_at = Utc::now();
        Ok(Some(comment.clone()))
    }

    async fn delete_comment(&self, id: i64) -> Result<bool, DomainError> {
        let mut inner = self.store.lock();
        if !inner.comments.contains_key(&id) {
            return Ok(false);
        }
        inner.remove_comment_tree(id);
        Ok(true)
    }

    async fn list_by_post(&self, post_id: i64) -> Result<Vec<Comment>, DomainError> {
        let inner = self.store.lock();
        let mut comments: Vec<Comment> = inner
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(comments)
    }

    async fn toggle_like(
        &self,
        comment_id: i64,
        user_id: i64,
    ) -> Result<Option<LikeOutcome>, DomainError> {
        let mut inner = self.store.lock();
        if !inner.comments.contains_key(&comment_id) {
            return Ok(None);
        }
        let key = (comment_id, user_id);
        let liked = !inner.comment_likes.remove(&key);
        if liked {
            inner.comment_likes.insert(key);
        }
        let comment = inner
            .comments
            .get_mut(&comment_id)
            .ok_or(DomainError::Unexpected("comment vanished".to_string()))?;
        comment.likes_count += if liked { 1 } else { -1 };
        Ok(Some(LikeOutcome {
            liked,
            likes_count: comment.likes_count,
        }))
    }

    async fn summaries_by_author(
        &self,
        author_id: i64,
    ) -> Result<Vec<AuthorCommentSummary>, DomainError> {
        let inner = self.store.lock();
        let mut comments: Vec<&Comment> = inner
            .comments
            .values()
            .filter(|c| c.author_id == author_id)
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        comments
            .into_iter()
            .map(|c| {
                let post = inner
                    .posts
                    .get(&c.post_id)
                    .ok_or(DomainError::Unexpected("post missing".to_string()))?;
                Ok(AuthorCommentSummary {
                    id: c.id,
                    content: c.content.clone(),
                    post_id: c.post_id,
                    post_title: post.title.clone(),
                    post_slug: post.slug.clone(),
                    created_at: c.created_at,
                })
            })
            .collect()
    }

    async fn total_comments(&self) -> Result<i64, DomainError> {
        Ok(self.store.lock().comments.len() as i64)
    }
}

#[derive(Clone, Default)]
pub(crate) struct RecordingMailer {
    sent: Arc<Mutex<Vec<MailMessage>>>,
}

impl RecordingMailer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().expect("mailer mutex poisoned").clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: MailMessage) -> Result<(), DomainError> {
        self.sent
            .lock()
            .expect("mailer mutex poisoned")
            .push(message);
        Ok(())
    }
}
