//! Category and tag management.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::error::Result;
use crate::models::*;
use crate::patch::Patch;
use crate::traits::{CategoryRepository, TagRepository};

/// Validates and normalizes category/tag input before handing it to the stores.
#[derive(Clone)]
pub struct CatalogService {
    categories: Arc<dyn CategoryRepository>,
    tags: Arc<dyn TagRepository>,
}

impl CatalogService {
    pub fn new(categories: Arc<dyn CategoryRepository>, tags: Arc<dyn TagRepository>) -> Self {
        Self { categories, tags }
    }

    // ─── Categories ────────────────────────────────────────────────────────

    pub async fn list_categories(&self, owner: OwnerId) -> Result<Vec<Category>> {
        self.categories.list(owner).await
    }

    pub async fn get_category(&self, id: i64, owner: OwnerId) -> Result<Category> {
        self.categories.get(id, owner).await
    }

    #[instrument(skip(self, req), fields(subsystem = "core", component = "catalog", op = "create_category", owner_id = owner))]
    pub async fn create_category(
        &self,
        owner: OwnerId,
        req: CreateCategoryRequest,
    ) -> Result<Category> {
        let color = if req.color.trim().is_empty() {
            DEFAULT_COLOR.to_string()
        } else {
            req.color
        };
        let req = CreateCategoryRequest {
            name: normalize_category_name(&req.name),
            color,
        };
        req.validate().into_result()?;

        let category = self.categories.create(owner, &req).await?;
        info!(category_id = category.id, "Category created");
        Ok(category)
    }

    #[instrument(skip(self, req), fields(subsystem = "core", component = "catalog", op = "update_category", owner_id = owner, category_id = id))]
    pub async fn update_category(
        &self,
        id: i64,
        owner: OwnerId,
        req: UpdateCategoryRequest,
    ) -> Result<Category> {
        let req = UpdateCategoryRequest {
            name: req.name.as_deref().map(normalize_category_name),
            color: req.color,
        };
        req.validate().into_result()?;
        self.categories.update(id, owner, &req).await
    }

    #[instrument(skip(self), fields(subsystem = "core", component = "catalog", op = "delete_category", owner_id = owner, category_id = id))]
    pub async fn delete_category(&self, id: i64, owner: OwnerId) -> Result<()> {
        self.categories.delete(id, owner).await?;
        info!("Category deleted");
        Ok(())
    }

    // ─── Tags ──────────────────────────────────────────────────────────────

    pub async fn list_tags(&self, owner: OwnerId) -> Result<Vec<Tag>> {
        self.tags.list(owner).await
    }

    pub async fn get_tag(&self, id: i64, owner: OwnerId) -> Result<Tag> {
        self.tags.get(id, owner).await
    }

    #[instrument(skip(self, req), fields(subsystem = "core", component = "catalog", op = "create_tag", owner_id = owner))]
    pub async fn create_tag(&self, owner: OwnerId, req: CreateTagRequest) -> Result<Tag> {
        let req = CreateTagRequest {
            name: normalize_tag_name(&req.name),
            color: req.color.filter(|c| !c.trim().is_empty()),
        };
        req.validate().into_result()?;

        let tag = self.tags.create(owner, &req).await?;
        info!(tag_id = tag.id, "Tag created");
        Ok(tag)
    }

    #[instrument(skip(self, req), fields(subsystem = "core", component = "catalog", op = "update_tag", owner_id = owner, tag_id = id))]
    pub async fn update_tag(&self, id: i64, owner: OwnerId, req: UpdateTagRequest) -> Result<Tag> {
        let color = match req.color {
            Patch::Value(c) if c.trim().is_empty() => Patch::Null,
            other => other,
        };
        let req = UpdateTagRequest {
            name: req.name.as_deref().map(normalize_tag_name),
            color,
        };
        req.validate().into_result()?;
        self.tags.update(id, owner, &req).await
    }

    #[instrument(skip(self), fields(subsystem = "core", component = "catalog", op = "delete_tag", owner_id = owner, tag_id = id))]
    pub async fn delete_tag(&self, id: i64, owner: OwnerId) -> Result<()> {
        self.tags.delete(id, owner).await?;
        info!("Tag deleted");
        Ok(())
    }
}
