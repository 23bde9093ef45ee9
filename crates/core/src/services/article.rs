//! Article service: static ordered pages and their images.

use sea_orm::Set;
use serde::{Deserialize, Serialize};
use serde_json::json;

use arbor_common::{AppError, AppResult, IdGenerator, slugify};
use arbor_db::entities::{article, article_category};
use arbor_db::repositories::{ArticleCategoryRepository, ArticleRepository};

use super::blog::{file_name_of, parse_manifest};
use super::image::{GalleryItem, ImageService, ImageUpload};

/// Input for creating an article.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateArticleInput {
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    pub body: String,
    pub date: chrono::NaiveDate,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default)]
    pub published: bool,
}

/// Input for updating an article. `None` leaves a field untouched.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArticleInput {
    pub title: Option<String>,
    pub summary: Option<Option<String>>,
    pub body: Option<String>,
    pub date: Option<chrono::NaiveDate>,
    pub category_id: Option<Option<String>>,
    pub display_order: Option<i32>,
    pub published: Option<bool>,
}

/// Response for an article.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleResponse {
    pub id: String,
    pub user_id: String,
    pub category_id: Option<String>,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub body: String,
    pub date: String,
    pub display_order: i32,
    pub original_image: Option<String>,
    pub images: Vec<String>,
    pub published: bool,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<article::Model> for ArticleResponse {
    fn from(a: article::Model) -> Self {
        Self {
            id: a.id,
            user_id: a.user_id,
            category_id: a.category_id,
            title: a.title,
            slug: a.slug,
            summary: a.summary,
            body: a.body,
            date: a.date.to_string(),
            display_order: a.display_order,
            original_image: a.original_image,
            images: serde_json::from_value(a.images).unwrap_or_default(),
            published: a.published,
            created_at: a.created_at.to_rfc3339(),
            updated_at: a.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Service for managing articles.
#[derive(Clone)]
pub struct ArticleService {
    article_repo: ArticleRepository,
    category_repo: ArticleCategoryRepository,
    images: ImageService,
    id_gen: IdGenerator,
}

impl ArticleService {
    /// Create a new article service.
    #[must_use]
    pub const fn new(
        article_repo: ArticleRepository,
        category_repo: ArticleCategoryRepository,
        images: ImageService,
    ) -> Self {
        Self {
            article_repo,
            category_repo,
            images,
            id_gen: IdGenerator::new(),
        }
    }

    /// Published articles in display order.
    pub async fn list(&self) -> AppResult<Vec<ArticleResponse>> {
        let articles = self.article_repo.find_published().await?;
        Ok(articles.into_iter().map(Into::into).collect())
    }

    /// Every article, for the admin dashboard.
    pub async fn list_all(&self) -> AppResult<Vec<ArticleResponse>> {
        let articles = self.article_repo.all().await?;
        Ok(articles.into_iter().map(Into::into).collect())
    }

    /// Fetch an article by slug. Unpublished articles are only visible
    /// to admins.
    pub async fn get_by_slug(&self, slug: &str, is_admin: bool) -> AppResult<ArticleResponse> {
        let article = self
            .article_repo
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Article: {slug}")))?;

        if !article.published && !is_admin {
            return Err(AppError::NotFound(format!("Article: {slug}")));
        }

        Ok(article.into())
    }

    /// All article categories.
    pub async fn categories(&self) -> AppResult<Vec<article_category::Model>> {
        self.category_repo.all().await
    }

    /// Create an article category.
    pub async fn create_category(&self, name: &str) -> AppResult<article_category::Model> {
        if name.is_empty() || name.len() > 128 {
            return Err(AppError::Validation(
                "Category name must be between 1 and 128 characters".to_string(),
            ));
        }
        if self.category_repo.find_by_name(name).await?.is_some() {
            return Err(AppError::Conflict("Category already exists".to_string()));
        }
        self.category_repo
            .create(article_category::ActiveModel {
                id: Set(self.id_gen.generate()),
                name: Set(name.to_string()),
            })
            .await
    }

    /// Create an article.
    pub async fn create(
        &self,
        user_id: &str,
        input: CreateArticleInput,
        featured_image: Option<ImageUpload>,
        gallery_images: Vec<ImageUpload>,
    ) -> AppResult<ArticleResponse> {
        validate_title(&input.title)?;
        self.check_category(input.category_id.as_deref()).await?;

        let id = self.id_gen.generate();
        let slug = self.unique_slug(&input.title, &id).await?;

        let (original_image, manifest) = match featured_image {
            Some(upload) => {
                let featured = self.images.ingest_featured(upload).await?;
                (Some(featured.name), Some(featured.manifest))
            }
            None => (None, None),
        };

        let mut image_paths = Vec::with_capacity(gallery_images.len());
        for upload in gallery_images {
            let item = self.images.ingest_gallery_item(upload, "").await?;
            image_paths.push(format!("{}/{}", item.dir, item.name));
        }

        let now = chrono::Utc::now();
        let model = article::ActiveModel {
            id: Set(id),
            user_id: Set(user_id.to_string()),
            category_id: Set(input.category_id),
            title: Set(input.title),
            slug: Set(slug),
            summary: Set(input.summary),
            body: Set(input.body),
            date: Set(input.date),
            display_order: Set(input.display_order),
            original_image: Set(original_image),
            image_manifest: Set(manifest.map(|m| json!(m))),
            images: Set(json!(image_paths)),
            published: Set(input.published),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };

        let article = self.article_repo.create(model).await?;
        tracing::info!(article_id = %article.id, "article created");
        Ok(article.into())
    }

    /// Update an article. A new featured upload replaces the previous
    /// one and deletes its files; gallery uploads are appended.
    pub async fn update(
        &self,
        id: &str,
        input: UpdateArticleInput,
        featured_image: Option<ImageUpload>,
        gallery_images: Vec<ImageUpload>,
    ) -> AppResult<ArticleResponse> {
        let article = self.article_repo.get_by_id(id).await?;
        if let Some(ref category_id) = input.category_id {
            self.check_category(category_id.as_deref()).await?;
        }

        let old_files = article.original_image.as_deref().map(|original| {
            let manifest = parse_manifest(article.image_manifest.as_ref());
            ImageService::featured_files(original, manifest.as_ref())
        });

        let mut image_paths: Vec<String> =
            serde_json::from_value(article.images.clone()).unwrap_or_default();
        for upload in gallery_images {
            let item = self.images.ingest_gallery_item(upload, "").await?;
            image_paths.push(format!("{}/{}", item.dir, item.name));
        }

        let mut active: article::ActiveModel = article.clone().into();

        if let Some(upload) = featured_image {
            // Old files go first; see BlogService::update.
            if let Some(files) = old_files {
                self.images.remove(&files).await;
            }
            let featured = self.images.ingest_featured(upload).await?;
            active.original_image = Set(Some(featured.name));
            active.image_manifest = Set(Some(json!(featured.manifest)));
        }

        if let Some(title) = input.title {
            validate_title(&title)?;
            if title != article.title {
                active.slug = Set(self.unique_slug(&title, &article.id).await?);
            }
            active.title = Set(title);
        }
        if let Some(summary) = input.summary {
            active.summary = Set(summary);
        }
        if let Some(body) = input.body {
            active.body = Set(body);
        }
        if let Some(date) = input.date {
            active.date = Set(date);
        }
        if let Some(category_id) = input.category_id {
            active.category_id = Set(category_id);
        }
        if let Some(display_order) = input.display_order {
            active.display_order = Set(display_order);
        }
        if let Some(published) = input.published {
            active.published = Set(published);
        }
        active.images = Set(json!(image_paths));
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        let article = self.article_repo.update(active).await?;
        Ok(article.into())
    }

    /// Delete an article along with every file it owns.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let article = self.article_repo.get_by_id(id).await?;

        let mut files = Vec::new();
        if let Some(ref original) = article.original_image {
            let manifest = parse_manifest(article.image_manifest.as_ref());
            files.extend(ImageService::featured_files(original, manifest.as_ref()));
        }
        let gallery: Vec<String> =
            serde_json::from_value(article.images.clone()).unwrap_or_default();
        files.extend(gallery.iter().filter_map(|p| file_name_of(p)));

        self.article_repo.delete(id).await?;
        self.images.remove(&files).await;

        tracing::info!(article_id = %id, "article deleted");
        Ok(())
    }

    /// Store one gallery image for the editor and return where it
    /// landed.
    pub async fn upload_gallery_image(
        &self,
        id: &str,
        upload: ImageUpload,
    ) -> AppResult<GalleryItem> {
        let article = self.article_repo.get_by_id(id).await?;
        let item = self.images.ingest_gallery_item(upload, "").await?;

        let mut image_paths: Vec<String> =
            serde_json::from_value(article.images.clone()).unwrap_or_default();
        image_paths.push(format!("{}/{}", item.dir, item.name));

        let mut active: article::ActiveModel = article.into();
        active.images = Set(json!(image_paths));
        active.updated_at = Set(Some(chrono::Utc::now().into()));
        self.article_repo.update(active).await?;

        Ok(item)
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

        match self.article_repo.find_by_slug(&slug).await? {
            Some(existing) if existing.id != id => Ok(format!("{slug}-{id}")),
            _ => Ok(slug),
        }
    }
}

fn validate_title(title: &str) -> AppResult<()> {
    if title.is_empty() || title.len() > 256 {
        return Err(AppError::Validation(
            "Title must be between 1 and 256 characters".to_string(),
        ));
    }
    Ok(())
}
