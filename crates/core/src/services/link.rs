//! Curated links service.

use sea_orm::Set;
use serde::{Deserialize, Serialize};

use arbor_common::{AppError, AppResult, IdGenerator, slugify};
use arbor_db::entities::{link, link_category};
use arbor_db::repositories::{LinkCategoryRepository, LinkRepository, Paged};

use super::image::{ImageService, ImageUpload};

/// Page size for the links directory.
const LINKS_PER_PAGE: u64 = 6;

/// Listing filters for the links directory.
#[derive(Debug, Default, Deserialize)]
pub struct LinkListQuery {
    /// Category name to filter on.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub page: Option<u64>,
}

/// Input for creating a link.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkInput {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub published: bool,
}

/// Input for updating a link. `None` leaves a field untouched.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLinkInput {
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<Option<String>>,
    pub category_id: Option<Option<String>>,
    pub published: Option<bool>,
}

/// Response for a curated link.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResponse {
    pub id: String,
    pub category_id: Option<String>,
    pub title: String,
    pub slug: String,
    pub url: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub published: bool,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<link::Model> for LinkResponse {
    fn from(l: link::Model) -> Self {
        Self {
            id: l.id,
            category_id: l.category_id,
            title: l.title,
            slug: l.slug,
            url: l.url,
            description: l.description,
            image: l.image,
            published: l.published,
            created_at: l.created_at.to_rfc3339(),
            updated_at: l.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Service for managing curated links.
#[derive(Clone)]
pub struct LinkService {
    link_repo: LinkRepository,
    category_repo: LinkCategoryRepository,
    images: ImageService,
    id_gen: IdGenerator,
}

impl LinkService {
    /// Create a new link service.
    #[must_use]
    pub const fn new(
        link_repo: LinkRepository,
        category_repo: LinkCategoryRepository,
        images: ImageService,
    ) -> Self {
        Self {
            link_repo,
            category_repo,
            images,
            id_gen: IdGenerator::new(),
        }
    }

    /// Public listing, optionally filtered by category name.
    pub async fn list(&self, query: LinkListQuery) -> AppResult<Paged<LinkResponse>> {
        let page = query.page.unwrap_or(1).max(1);

        let paged = if let Some(category) = query.category.as_deref().filter(|s| !s.is_empty()) {
            self.link_repo
                .find_by_category_name(category, page, LINKS_PER_PAGE)
                .await?
        } else {
            self.link_repo.find_published(page, LINKS_PER_PAGE).await?
        };

        Ok(Paged {
            items: paged.items.into_iter().map(Into::into).collect(),
            total: paged.total,
            page: paged.page,
            per_page: paged.per_page,
        })
    }

    /// Unpublished links, for the admin dashboard.
    pub async fn list_unpublished(&self) -> AppResult<Vec<LinkResponse>> {
        let links = self.link_repo.find_unpublished().await?;
        Ok(links.into_iter().map(Into::into).collect())
    }

    /// Fetch a link by slug. Unpublished links are only visible to
    /// admins.
    pub async fn get_by_slug(&self, slug: &str, is_admin: bool) -> AppResult<LinkResponse> {
        let link = self
            .link_repo
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Link: {slug}")))?;

        if !link.published && !is_admin {
            return Err(AppError::NotFound(format!("Link: {slug}")));
        }

        Ok(link.into())
    }

    /// All link categories.
    pub async fn categories(&self) -> AppResult<Vec<link_category::Model>> {
        self.category_repo.all().await
    }

    /// Create a link category.
    pub async fn create_category(&self, name: &str) -> AppResult<link_category::Model> {
        if name.is_empty() || name.len() > 128 {
            return Err(AppError::Validation(
                "Category name must be between 1 and 128 characters".to_string(),
            ));
        }
        if self.category_repo.find_by_name(name).await?.is_some() {
            return Err(AppError::Conflict("Category already exists".to_string()));
        }
        self.category_repo
            .create(link_category::ActiveModel {
                id: Set(self.id_gen.generate()),
                name: Set(name.to_string()),
            })
            .await
    }

    /// Create a link, optionally with a thumbnail upload.
    pub async fn create(
        &self,
        input: CreateLinkInput,
        thumbnail: Option<ImageUpload>,
    ) -> AppResult<LinkResponse> {
        validate_link(&input.title, &input.url)?;
        self.check_category(input.category_id.as_deref()).await?;

        let id = self.id_gen.generate();
        let slug = self.unique_slug(&input.title, &id).await?;

        let image = match thumbnail {
            Some(upload) => Some(self.images.ingest_link_thumbnail(upload).await?),
            None => None,
        };

        let model = link::ActiveModel {
            id: Set(id),
            category_id: Set(input.category_id),
            title: Set(input.title),
            slug: Set(slug),
            url: Set(input.url),
            description: Set(input.description),
            image: Set(image),
            published: Set(input.published),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        let link = self.link_repo.create(model).await?;
        tracing::info!(link_id = %link.id, "link created");
        Ok(link.into())
    }

    /// Update a link. A new thumbnail replaces and deletes the old one.
    pub async fn update(
        &self,
        id: &str,
        input: UpdateLinkInput,
        thumbnail: Option<ImageUpload>,
    ) -> AppResult<LinkResponse> {
        let link = self.link_repo.get_by_id(id).await?;
        if let Some(ref category_id) = input.category_id {
            self.check_category(category_id.as_deref()).await?;
        }

        let mut active: link::ActiveModel = link.clone().into();

        if let Some(upload) = thumbnail {
            let image = self.images.ingest_link_thumbnail(upload).await?;
            active.image = Set(Some(image));
            if let Some(old) = link.image.clone() {
                self.images.remove(&[old]).await;
            }
        }

        if let Some(title) = input.title {
            if title != link.title {
                active.slug = Set(self.unique_slug(&title, &link.id).await?);
            }
            validate_link(&title, link.url.as_str())?;
            active.title = Set(title);
        }
        if let Some(url) = input.url {
            url::Url::parse(&url)
                .map_err(|_| AppError::Validation("Invalid URL".to_string()))?;
            active.url = Set(url);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(category_id) = input.category_id {
            active.category_id = Set(category_id);
        }
        if let Some(published) = input.published {
            active.published = Set(published);
        }
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        let link = self.link_repo.update(active).await?;
        Ok(link.into())
    }

    /// Delete a link and its thumbnail.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let link = self.link_repo.get_by_id(id).await?;

        self.link_repo.delete(id).await?;
        if let Some(image) = link.image {
            self.images.remove(&[image]).await;
        }

        tracing::info!(link_id = %id, "link deleted");
        Ok(())
    }

    async fn check_category(&self, category_id: Option<&str>) -> AppResult<()> {
        if let Some(category_id) = category_id
            && self.category_repo.find_by_id(category_id).await?.is_none()
        {
            return Err(AppError::NotFound(format!("Category: {category_id}")));
        }
        Ok(())
    }

    async fn unique_slug(&self, title: &str, id: &str) -> AppResult<String> {
        let slug = slugify(title);
        let slug = if slug.is_empty() {
            id.to_string()
        } else {
            slug
        };

        match self.link_repo.find_by_slug(&slug).await? {
            Some(existing) if existing.id != id => Ok(format!("{slug}-{id}")),
            _ => Ok(slug),
        }
    }
}

fn validate_link(title: &str, url: &str) -> AppResult<()> {
    if title.is_empty() || title.len() > 256 {
        return Err(AppError::Validation(
            "Title must be between 1 and 256 characters".to_string(),
        ));
    }
    url::Url::parse(url).map_err(|_| AppError::Validation("Invalid URL".to_string()))?;
    Ok(())
}
