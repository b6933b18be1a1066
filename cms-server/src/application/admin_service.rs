use std::str::FromStr;

use tracing::warn;

use crate::application::password;
use crate::data::comment_repository::{AuthorCommentSummary, CommentRepository};
use crate::data::post_repository::{AuthorPostSummary, PostRepository};
use crate::data::user_repository::{NewUser, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::policy;
use crate::domain::role::Role;
use crate::domain::user::{CreateAdminRequest, User};
use crate::infrastructure::mailer::{Mailer, admin_created_message};

#[derive(Debug, Clone)]
pub(crate) struct UserWithActivity {
    pub(crate) user: User,
    pub(crate) posts: Vec<AuthorPostSummary>,
    pub(crate) comments: Vec<AuthorCommentSummary>,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct DashboardStats {
    pub(crate) total_users: i64,
    pub(crate) total_posts: i64,
    pub(crate) total_comments: i64,
}

pub(crate) struct AdminService<U, P, C, M>
where
    U: UserRepository,
    P: PostRepository,
    C: CommentRepository,
    M: Mailer,
{
    users: U,
    posts: P,
    comments: C,
    mailer: M,
}

impl<U, P, C, M> AdminService<U, P, C, M>
where
    U: UserRepository,
    P: PostRepository,
    C: CommentRepository,
    M: Mailer,
{
    pub(crate) fn new(users: U, posts: P, comments: C, mailer: M) -> Self {
        Self {
            users,
            posts,
            comments,
            mailer,
        }
    }

    pub(crate) async fn create_admin(
        &self,
        actor_role: Role,
        req: CreateAdminRequest,
    ) -> Result<User, DomainError> {
        if !policy::can_create_admin(actor_role) {
            return Err(DomainError::Forbidden);
        }
        let req = req.validate()?;

        let password_hash = password::hash_password(&req.password)?;
        let user = self
            .users
            .create_user(NewUser {
                username: req.username,
                email: req.email,
                password_hash,
                role: req.role.unwrap_or(Role::Admin),
            })
            .await?;

        // The account exists at this point; a failed notification is logged
        // and does not fail the request.
        let message = admin_created_message(&user.email, &user.username);
        if let Err(err) = self.mailer.send(message).await {
            warn!(user_id = user.id, "admin creation mail failed: {err}");
        }

        Ok(user)
    }

    pub(crate) async fn manage_user_role(
        &self,
        actor_role: Role,
        target_id: i64,
        action: &str,
        role: &str,
    ) -> Result<User, DomainError> {
        if !policy::can_moderate_users(actor_role) {
            return Err(DomainError::Forbidden);
        }
        if action != "update" {
            return Err(DomainError::Validation {
                field: "action",
                message: "must be 'update'",
            });
        }

        let role = Role::from_str(role)?;
        if !policy::can_assign_role(actor_role, role) {
            return Err(DomainError::Forbidden);
        }

        self.users
            .update_role(target_id, role)
            .await?
            .ok_or(DomainError::NotFound(format!("user id: {target_id}")))
    }

    pub(crate) async fn get_all_users(
        &self,
        actor_role: Role,
    ) -> Result<Vec<UserWithActivity>, DomainError> {
        if !policy::can_moderate_users(actor_role) {
            return Err(DomainError::Forbidden);
        }

        let users = self.users.list_users().await?;

        // One posts + one comments query per user; fine at admin-panel scale.
        let mut enriched = Vec::with_capacity(users.len());
        for user in users {
            let posts = self.posts.summaries_by_author(user.id).await?;
            let comments = self.comments.summaries_by_author(user.id).await?;
            enriched.push(UserWithActivity {
                user,
                posts,
                comments,
            });
        }
        Ok(enriched)
    }

    pub(crate) async fn delete_user(
        &self,
        actor_role: Role,
        target_id: i64,
    ) -> Result<(), DomainError> {
        if !policy::can_moderate_users(actor_role) {
            return Err(DomainError::Forbidden);
        }

        let deleted = self.users.delete_user(target_id).await?;
        if !deleted {
            return Err(DomainError::NotFound(format!("user id: {target_id}")));
        }
        Ok(())
    }

    pub(crate) async fn dashboard_stats(
        &self,
        actor_role: Role,
    ) -> Result<DashboardStats, DomainError> {
        if !policy::can_moderate_users(actor_role) {
            return Err(DomainError::Forbidden);
        }

        Ok(DashboardStats {
            total_users: self.users.total_users().await?,
            total_posts: self.posts.total_posts().await?,
            total_comments: self.comments.total_comments().await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::AdminService;
    use crate::application::test_support::{
        InMemoryCommentRepo, InMemoryPostRepo, InMemoryUserRepo, MemStore, RecordingMailer,
        seed_category, seed_comment, seed_post, seed_user,
    };
    use crate::domain::error::DomainError;
    use crate::domain::role::Role;
    use crate::domain::user::CreateAdminRequest;

    fn service(
        store: MemStore,
    ) -> (
        AdminService<InMemoryUserRepo, InMemoryPostRepo, InMemoryCommentRepo, RecordingMailer>,
        RecordingMailer,
    ) {
        let mailer = RecordingMailer::new();
        let service = AdminService::new(
            InMemoryUserRepo::new(store.clone()),
            InMemoryPostRepo::new(store.clone()),
            InMemoryCommentRepo::new(store),
            mailer.clone(),
        );
        (service, mailer)
    }

    fn admin_req(username: &str, email: &str) -> CreateAdminRequest {
        CreateAdminRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: "very-secure-password".to_string(),
            role: None,
        }
    }

    #[tokio::test]
    async fn create_admin_is_superadmin_only() {
        let store = MemStore::new();
        let (service, _) = service(store);

        for role in [Role::User, Role::Editor, Role::Admin] {
            let err = service
                .create_admin(role, admin_req("root2", "root2@example.com"))
                .await
                .expect_err("must be forbidden");
            assert!(matches!(err, DomainError::Forbidden), "{role}");
        }
    }

    #[tokio::test]
    async fn create_admin_defaults_role_and_sends_mail() {
        let store = MemStore::new();
        let (service, mailer) = service(store);

        let user = service
            .create_admin(Role::Superadmin, admin_req("root2", "root2@example.com"))
            .await
            .expect("create must succeed");

        assert_eq!(user.role, Role::Admin);
        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "root2@example.com");
    }

    #[tokio::test]
    async fn create_admin_rejects_duplicate_email() {
        let store = MemStore::new();
        seed_user(&store, "existing", "taken@example.com", "password-one");
        let (service, _) = service(store);

        let err = service
            .create_admin(Role::Superadmin, admin_req("root2", "taken@example.com"))
            .await
            .expect_err("duplicate email must conflict");
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn create_admin_never_creates_superadmin() {
        let store = MemStore::new();
        let (service, _) = service(store);

        let mut req = admin_req("root2", "root2@example.com");
        req.role = Some(Role::Superadmin);
        let err = service
            .create_admin(Role::Superadmin, req)
            .await
            .expect_err("superadmin role must be rejected");
        assert!(matches!(err, DomainError::Validation { field: "role", .. }));
    }

    #[tokio::test]
    async fn manage_user_role_updates_assignable_roles() {
        let store = MemStore::new();
        let target_id = seed_user(&store, "bob", "bob@example.com", "password-one");
        let (service, _) = service(store);

        let user = service
            .manage_user_role(Role::Superadmin, target_id, "update", "editor")
            .await
            .expect("update must succeed");
        assert_eq!(user.role, Role::Editor);
    }

    #[tokio::test]
    async fn manage_user_role_rejects_unknown_action() {
        let store = MemStore::new();
        let target_id = seed_user(&store, "bob", "bob@example.com", "password-one");
        let (service, _) = service(store);

        let err = service
            .manage_user_role(Role::Admin, target_id, "promote", "editor")
            .await
            .expect_err("unknown action must be a validation error");
        assert!(matches!(
            err,
            DomainError::Validation { field: "action", .. }
        ));
    }

    #[tokio::test]
    async fn manage_user_role_rejects_invalid_role_value() {
        let store = MemStore::new();
        let target_id = seed_user(&store, "bob", "bob@example.com", "password-one");
        let (service, _) = service(store);

        let err = service
            .manage_user_role(Role::Admin, target_id, "update", "overlord")
            .await
            .expect_err("unknown role must be a validation error");
        assert!(matches!(err, DomainError::Validation { field: "role", .. }));
    }

    #[tokio::test]
    async fn admin_cannot_hand_out_admin_role() {
        let store = MemStore::new();
        let target_id = seed_user(&store, "bob", "bob@example.com", "password-one");
        let (service, _) = service(store);

        let err = service
            .manage_user_role(Role::Admin, target_id, "update", "admin")
            .await
            .expect_err("must be forbidden");
        assert!(matches!(err, DomainError::Forbidden));

        service
            .manage_user_role(Role::Superadmin, target_id, "update", "admin")
            .await
            .expect("superadmin may assign admin");
    }

    #[tokio::test]
    async fn get_all_users_attaches_posts_and_comments() {
        let store = MemStore::new();
        let author_id = seed_user(&store, "alice", "alice@example.com", "password-one");
        let category_id = seed_category(&store, "Rust");
        let post_id = seed_post(&store, author_id, category_id, "Hello", "hello");
        seed_comment(&store, post_id, author_id, "first!", None);
        let (service, _) = service(store);

        let users = service
            .get_all_users(Role::Admin)
            .await
            .expect("list must succeed");

        assert_eq!(users.len(), 1);
        assert_eq!(users[0].posts.len(), 1);
        assert_eq!(users[0].posts[0].slug, "hello");
        assert_eq!(users[0].comments.len(), 1);
        assert_eq!(users[0].comments[0].post_title, "Hello");
    }

    #[tokio::test]
    async fn delete_user_cascades_their_content() {
        let store = MemStore::new();
        let author_id = seed_user(&store, "alice", "alice@example.com", "password-one");
        let category_id = seed_category(&store, "Rust");
        let post_id = seed_post(&store, author_id, category_id, "Hello", "hello");
        seed_comment(&store, post_id, author_id, "first!", None);
        let (service, _) = service(store);

        service
            .delete_user(Role::Admin, author_id)
            .await
            .expect("delete must succeed");

        let stats = service
            .dashboard_stats(Role::Admin)
            .await
            .expect("stats must succeed");
        assert_eq!(stats.total_users, 0);
        assert_eq!(stats.total_posts, 0);
        assert_eq!(stats.total_comments, 0);
    }

    #[tokio::test]
    async fn dashboard_stats_counts_all_collections() {
        let store = MemStore::new();
        let author_id = seed_user(&store, "alice", "alice@example.com", "password-one");
        let category_id = seed_category(&store, "Rust");
        let post_id = seed_post(&store, author_id, category_id, "Hello", "hello");
        seed_comment(&store, post_id, author_id, "first!", None);
        seed_comment(&store, post_id, author_id, "second!", None);
        let (service, _) = service(store);

        let stats = service
            .dashboard_stats(Role::Superadmin)
            .await
            .expect("stats must succeed");
        assert_eq!(stats.total_users, 1);
        assert_eq!(stats.total_posts, 1);
        assert_eq!(stats.total_comments, 2);

        let err = service
            .dashboard_stats(Role::Editor)
            .await
            .expect_err("must be forbidden");
        assert!(matches!(err, DomainError::Forbidden));
    }
}
