use crate::data::category_repository::{
    CategoryDeleteOutcome, CategoryPatch, CategoryPostSummary, CategoryRepository,
    CategoryWithCount, NewCategory,
};
use crate::domain::category::{Category, CreateCategoryRequest, UpdateCategoryRequest};
use crate::domain::error::DomainError;
use crate::domain::policy;
use crate::domain::role::Role;
use crate::domain::slug::slugify;

pub(crate) struct CategoryService<R: CategoryRepository> {
    repo: R,
}

impl<R: CategoryRepository> CategoryService<R> {
    pub(crate) fn new(repo: R) -> Self {
        Self { repo }
    }

    pub(crate) async fn create_category(
        &self,
        actor_role: Role,
        req: CreateCategoryRequest,
    ) -> Result<Category, DomainError> {
        if !policy::can_moderate_users(actor_role) {
            return Err(DomainError::Forbidden);
        }
        let req = req.validate()?;
        let slug = req.derive_slug()?;

        self.repo
            .create_category(NewCategory {
                name: req.name,
                slug,
                description: req.description.unwrap_or_default(),
            })
            .await
    }

    pub(crate) async fn update_category(
        &self,
        actor_role: Role,
        category_id: i64,
        req: UpdateCategoryRequest,
    ) -> Result<Category, DomainError> {
        if !policy::can_moderate_users(actor_role) {
            return Err(DomainError::Forbidden);
        }
        let req = req.validate()?;

        // The slug is re-derived only when the name changes.
        let name_slug = match req.name {
            Some(name) => {
                let slug = slugify("name", &name)?;
                Some((name, slug))
            }
            None => None,
        };

        self.repo
            .update_category(
                category_id,
                CategoryPatch {
                    name_slug,
                    description: req.description,
                },
            )
            .await?
            .ok_or(DomainError::NotFound(format!("category id: {category_id}")))
    }

    pub(crate) async fn delete_category(
        &self,
        actor_role: Role,
        category_id: i64,
    ) -> Result<(), DomainError> {
        if !policy::can_moderate_users(actor_role) {
            return Err(DomainError::Forbidden);
        }

        match self.repo.delete_category_if_unused(category_id).await? {
            CategoryDeleteOutcome::Deleted => Ok(()),
            CategoryDeleteOutcome::HasPosts => Err(DomainError::Conflict(
                "category still has posts".to_string(),
            )),
            CategoryDeleteOutcome::NotFound => Err(DomainError::NotFound(format!(
                "category id: {category_id}"
            ))),
        }
    }

    pub(crate) async fn list_categories(&self) -> Result<Vec<CategoryWithCount>, DomainError> {
        self.repo.list_categories().await
    }

    pub(crate) async fn get_category(
        &self,
        category_id: i64,
    ) -> Result<(Category, Vec<CategoryPostSummary>), DomainError> {
        let category = self
            .repo
            .get_category(category_id)
            .await?
            .ok_or(DomainError::NotFound(format!("category id: {category_id}")))?;
        let posts = self.repo.post_summaries(category_id).await?;
        Ok((category, posts))
    }
}
