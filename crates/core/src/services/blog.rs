//! Blog service: posts, categories, tags and their images.

use sea_orm::Set;
use serde::{Deserialize, Serialize};
use serde_json::json;

use arbor_common::{AppError, AppResult, IdGenerator, slugify};
use arbor_db::entities::{blog_category, blog_post};
use arbor_db::repositories::{
    BlogCategoryRepository, BlogPostRepository, BlogTagRepository, Paged, TagUsage,
};

use super::image::{ImageManifest, ImageService, ImageUpload};

/// Page size for the default listing.
const DEFAULT_PER_PAGE: u64 = 10;

/// Page size when a search, category or tag filter is active.
const FILTERED_PER_PAGE: u64 = 6;

/// Listing filters. At most one is applied: search wins over category,
/// category wins over tag.
#[derive(Debug, Default, Deserialize)]
pub struct BlogListQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub page: Option<u64>,
}

/// Input for creating a blog post.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBlogPostInput {
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    pub body: String,
    pub date: chrono::NaiveDate,
    #[serde(default)]
    pub category_id: Option<String>,
    /// Comma-separated tag names.
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub featured: bool,
}

/// Input for updating a blog post. `None` leaves a field untouched.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBlogPostInput {
    pub title: Option<String>,
    pub summary: Option<Option<String>>,
    pub body: Option<String>,
    pub date: Option<chrono::NaiveDate>,
    pub category_id: Option<Option<String>>,
    pub tags: Option<String>,
    pub published: Option<bool>,
    pub featured: Option<bool>,
}

/// Response for a blog post.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostResponse {
    pub id: String,
    pub user_id: String,
    pub category_id: Option<String>,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub body: String,
    pub date: String,
    pub original_image: Option<String>,
    pub images: Vec<String>,
    pub tags: Vec<String>,
    pub published: bool,
    pub featured: bool,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<blog_post::Model> for BlogPostResponse {
    fn from(p: blog_post::Model) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            category_id: p.category_id,
            title: p.title,
            slug: p.slug,
            summary: p.summary,
            body: p.body,
            date: p.date.to_string(),
            original_image: p.original_image,
            images: serde_json::from_value(p.images).unwrap_or_default(),
            tags: Vec::new(),
            published: p.published,
            featured: p.featured,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Service for managing blog posts.
#[derive(Clone)]
pub struct BlogService {
    post_repo: BlogPostRepository,
    category_repo: BlogCategoryRepository,
    tag_repo: BlogTagRepository,
    images: ImageService,
    id_gen: IdGenerator,
}

impl BlogService {
    /// Create a new blog service.
    #[must_use]
    pub const fn new(
        post_repo: BlogPostRepository,
        category_repo: BlogCategoryRepository,
        tag_repo: BlogTagRepository,
        images: ImageService,
    ) -> Self {
        Self {
            post_repo,
            category_repo,
            tag_repo,
            images,
            id_gen: IdGenerator::new(),
        }
    }

    /// Public listing with at most one filter applied.
    pub async fn list(&self, query: BlogListQuery) -> AppResult<Paged<BlogPostResponse>> {
        let page = query.page.unwrap_or(1).max(1);

        let paged = if let Some(term) = query.search.as_deref().filter(|s| !s.is_empty()) {
            self.post_repo.search(term, page, FILTERED_PER_PAGE).await?
        } else if let Some(category) = query.category.as_deref().filter(|s| !s.is_empty()) {
            self.post_repo
                .find_by_category(category, page, FILTERED_PER_PAGE)
                .await?
        } else if let Some(tag) = query.tag.as_deref().filter(|s| !s.is_empty()) {
            self.post_repo
                .find_by_tag(tag, page, FILTERED_PER_PAGE)
                .await?
        } else {
            self.post_repo.find_published(page, DEFAULT_PER_PAGE).await?
        };

        Ok(Paged {
            items: paged.items.into_iter().map(Into::into).collect(),
            total: paged.total,
            page: paged.page,
            per_page: paged.per_page,
        })
    }

    /// Unpublished posts, for the admin dashboard.
    pub async fn list_unpublished(&self) -> AppResult<Vec<BlogPostResponse>> {
        let posts = self.post_repo.find_unpublished().await?;
        Ok(posts.into_iter().map(Into::into).collect())
    }

    /// Fetch a post by slug. Unpublished posts are only visible to
    /// admins.
    pub async fn get_by_slug(&self, slug: &str, is_admin: bool) -> AppResult<BlogPostResponse> {
        let post = self
            .post_repo
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Blog post: {slug}")))?;

        if !post.published && !is_admin {
            return Err(AppError::NotFound(format!("Blog post: {slug}")));
        }

        let tags = self.tag_repo.find_for_post(&post.id).await?;
        let mut response = BlogPostResponse::from(post);
        response.tags = tags.into_iter().map(|t| t.name).collect();
        Ok(response)
    }

    /// Most recent published posts, for sidebars.
    pub async fn recent(&self, limit: u64) -> AppResult<Vec<BlogPostResponse>> {
        let posts = self.post_repo.find_recent(limit).await?;
        Ok(posts.into_iter().map(Into::into).collect())
    }

    /// Most-used tags, for sidebars.
    pub async fn popular_tags(&self, limit: u64) -> AppResult<Vec<TagUsage>> {
        self.tag_repo.find_popular(limit).await
    }

    /// All blog categories.
    pub async fn categories(&self) -> AppResult<Vec<blog_category::Model>> {
        self.category_repo.all().await
    }

    /// Create a blog category.
    pub async fn create_category(&self, name: &str) -> AppResult<blog_category::Model> {
        if name.is_empty() || name.len() > 128 {
            return Err(AppError::Validation(
                "Category name must be between 1 and 128 characters".to_string(),
            ));
        }
        if self.category_repo.find_by_name(name).await?.is_some() {
            return Err(AppError::Conflict("Category already exists".to_string()));
        }
        self.category_repo
            .create(blog_category::ActiveModel {
                id: Set(self.id_gen.generate()),
                name: Set(name.to_string()),
            })
            .await
    }

    /// Create a post. The featured upload produces the original plus
    /// its variants; gallery uploads land in the images array.
    pub async fn create(
        &self,
        user_id: &str,
        input: CreateBlogPostInput,
        featured_image: Option<ImageUpload>,
        gallery_images: Vec<ImageUpload>,
    ) -> AppResult<BlogPostResponse> {
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
        let model = blog_post::ActiveModel {
            id: Set(id.clone()),
            user_id: Set(user_id.to_string()),
            category_id: Set(input.category_id),
            title: Set(input.title),
            slug: Set(slug),
            summary: Set(input.summary),
            body: Set(input.body),
            date: Set(input.date),
            original_image: Set(original_image),
            image_manifest: Set(manifest.map(|m| json!(m))),
            images: Set(json!(image_paths)),
            published: Set(input.published),
            featured: Set(input.featured),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };

        let post = self.post_repo.create(model).await?;
        self.sync_tags(&post.id, input.tags.as_deref()).await?;

        tracing::info!(post_id = %post.id, "blog post created");
        self.get_by_slug(&post.slug, true).await
    }

    /// Update a post. A new featured upload replaces the previous one
    /// and deletes its files; gallery uploads are appended, existing
    /// entries are never removed.
    pub async fn update(
        &self,
        id: &str,
        input: UpdateBlogPostInput,
        featured_image: Option<ImageUpload>,
        gallery_images: Vec<ImageUpload>,
    ) -> AppResult<BlogPostResponse> {
        let post = self.post_repo.get_by_id(id).await?;
        if let Some(ref category_id) = input.category_id {
            self.check_category(category_id.as_deref()).await?;
        }

        let old_files = post.original_image.as_deref().map(|original| {
            let manifest = parse_manifest(post.image_manifest.as_ref());
            ImageService::featured_files(original, manifest.as_ref())
        });

        let mut image_paths: Vec<String> =
            serde_json::from_value(post.images.clone()).unwrap_or_default();
        for upload in gallery_images {
            let item = self.images.ingest_gallery_item(upload, "").await?;
            image_paths.push(format!("{}/{}", item.dir, item.name));
        }

        let mut active: blog_post::ActiveModel = post.clone().into();

        if let Some(upload) = featured_image {
            // Old files go first: under the timestamp namer a same-named
            // upload in the same second reuses the base name, and deleting
            // after the ingest would destroy the files just written.
            if let Some(files) = old_files {
                self.images.remove(&files).await;
            }
            let featured = self.images.ingest_featured(upload).await?;
            active.original_image = Set(Some(featured.name));
            active.image_manifest = Set(Some(json!(featured.manifest)));
        }

        if let Some(title) = input.title {
            validate_title(&title)?;
            if title != post.title {
                active.slug = Set(self.unique_slug(&title, &post.id).await?);
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
        if let Some(published) = input.published {
            active.published = Set(published);
        }
        if let Some(featured) = input.featured {
            active.featured = Set(featured);
        }
        active.images = Set(json!(image_paths));
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        let post = self.post_repo.update(active).await?;
        if input.tags.is_some() {
            self.sync_tags(&post.id, input.tags.as_deref()).await?;
        }

        self.get_by_slug(&post.slug, true).await
    }

    /// Delete a post along with every file it owns.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let post = self.post_repo.get_by_id(id).await?;

        let mut files = Vec::new();
        if let Some(ref original) = post.original_image {
            let manifest = parse_manifest(post.image_manifest.as_ref());
            files.extend(ImageService::featured_files(original, manifest.as_ref()));
        }
        let gallery: Vec<String> = serde_json::from_value(post.images.clone()).unwrap_or_default();
        files.extend(gallery.iter().filter_map(|p| file_name_of(p)));

        self.post_repo.delete(id).await?;
        self.images.remove(&files).await;

        tracing::info!(post_id = %id, "blog post deleted");
        Ok(())
    }

    /// Store one gallery image for the editor and return where it
    /// landed.
    pub async fn upload_gallery_image(
        &self,
        id: &str,
        upload: ImageUpload,
    ) -> AppResult<super::image::GalleryItem> {
        let post = self.post_repo.get_by_id(id).await?;
        let item = self.images.ingest_gallery_item(upload, "").await?;

        let mut image_paths: Vec<String> =
            serde_json::from_value(post.images.clone()).unwrap_or_default();
        image_paths.push(format!("{}/{}", item.dir, item.name));

        let mut active: blog_post::ActiveModel = post.into();
        active.images = Set(json!(image_paths));
        active.updated_at = Set(Some(chrono::Utc::now().into()));
        self.post_repo.update(active).await?;

        Ok(item)
    }

    /// Replace the post's tag set from a comma-separated name list.
    async fn sync_tags(&self, post_id: &str, tags: Option<&str>) -> AppResult<()> {
        let names: Vec<String> = tags
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let mut tag_ids = Vec::with_capacity(names.len());
        for name in &names {
            let tag = self.tag_repo.find_or_create(name).await?;
            if !tag_ids.contains(&tag.id) {
                tag_ids.push(tag.id);
            }
        }

        self.tag_repo.set_post_tags(post_id, &tag_ids).await
    }

    async fn check_category(&self, category_id: Option<&str>) -> AppResult<()> {
        if let Some(category_id) = category_id
            && self.category_repo.find_by_id(category_id).await?.is_none()
        {
            return Err(AppError::NotFound(format!("Category: {category_id}")));
        }
        Ok(())
    }

    /// Slug from the title; on collision with another post, the record
    /// ID keeps it unique.
    async fn unique_slug(&self, title: &str, id: &str) -> AppResult<String> {
        let slug = slugify(title);
        let slug = if slug.is_empty() {
            id.to_string()
        } else {
            slug
        };

        match self.post_repo.find_by_slug(&slug).await? {
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

/// Decode a stored manifest column, tolerating legacy rows.
pub(crate) fn parse_manifest(value: Option<&serde_json::Value>) -> Option<ImageManifest> {
    value.and_then(|v| serde_json::from_value(v.clone()).ok())
}

/// Storage key of a public image path.
pub(crate) fn file_name_of(path: &str) -> Option<String> {
    path.rsplit('/').next().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::codec::ImageCodec;
    use crate::services::image::UploadNamer;
    use crate::services::store::{MediaStore, MemoryStore};
    use arbor_db::entities::blog_tag;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use std::sync::Arc;

    /// Codec that passes bytes through untouched.
    struct PassCodec;

    impl ImageCodec for PassCodec {
        fn dimensions(&self, _data: &[u8]) -> AppResult<(u32, u32)> {
            Ok((1, 1))
        }

        fn cover(&self, data: &[u8], _w: u32, _h: u32, _q: u8) -> AppResult<Vec<u8>> {
            Ok(data.to_vec())
        }

        fn reencode(&self, data: &[u8], _q: u8) -> AppResult<Vec<u8>> {
            Ok(data.to_vec())
        }

        fn thumbnail(&self, data: &[u8], _w: u32, _h: u32, _q: u8) -> AppResult<Vec<u8>> {
            Ok(data.to_vec())
        }
    }

    /// Deterministic namer, mirroring a same-second timestamp collision.
    struct FixedNamer;

    impl UploadNamer for FixedNamer {
        fn name(&self, stem: &str, ext: &str) -> String {
            format!("{stem}_t0.{ext}")
        }
    }

    fn service_with(
        db: DatabaseConnection,
        store: Arc<MemoryStore>,
    ) -> (BlogService, Arc<DatabaseConnection>) {
        let db = Arc::new(db);
        let images = ImageService::new(
            store,
            Arc::new(PassCodec),
            Arc::new(FixedNamer),
            "/assets/images/uploads",
        );
        let svc = BlogService::new(
            BlogPostRepository::new(Arc::clone(&db)),
            BlogCategoryRepository::new(Arc::clone(&db)),
            BlogTagRepository::new(Arc::clone(&db)),
            images,
        );
        (svc, db)
    }

    fn sample_post(
        images: serde_json::Value,
        original_image: Option<String>,
    ) -> blog_post::Model {
        blog_post::Model {
            id: "p1".to_string(),
            user_id: "u1".to_string(),
            category_id: None,
            title: "Post".to_string(),
            slug: "post".to_string(),
            summary: None,
            body: "Body".to_string(),
            date: chrono::NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            original_image,
            image_manifest: None,
            images,
            published: true,
            featured: false,
            created_at: chrono::Utc::now().into(),
            updated_at: None,
        }
    }

    fn upload(file_name: &str, data: &[u8]) -> ImageUpload {
        ImageUpload {
            file_name: file_name.to_string(),
            data: data.to_vec(),
        }
    }

    #[tokio::test]
    async fn test_update_appends_gallery_uploads_after_existing() {
        let post = sample_post(
            json!([
                "/assets/images/uploads/old-a_t0.png",
                "/assets/images/uploads/old-b_t0.png"
            ]),
            None,
        );
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![post.clone()], vec![post.clone()], vec![post]])
            .append_query_results([Vec::<blog_tag::Model>::new()])
            .into_connection();
        let store = Arc::new(MemoryStore::new());
        let (svc, db) = service_with(db, Arc::clone(&store));

        svc.update(
            "p1",
            UpdateBlogPostInput::default(),
            None,
            vec![upload("photo.png", b"px")],
        )
        .await
        .unwrap();
        drop(svc);

        assert_eq!(store.keys(), vec!["photo_t0.png".to_string()]);

        // The persisted list keeps the stored entries in order and
        // appends the new path at the end.
        let log = format!("{:?}", Arc::try_unwrap(db).ok().unwrap().into_transaction_log());
        assert!(log.contains(
            r#"String("/assets/images/uploads/old-a_t0.png"), String("/assets/images/uploads/old-b_t0.png"), String("/assets/images/uploads/photo_t0.png")"#
        ));
    }

    #[tokio::test]
    async fn test_update_syncs_tags_from_comma_list() {
        let post = sample_post(json!([]), None);
        let tag_rust = blog_tag::Model {
            id: "tagrust01".to_string(),
            name: "rust".to_string(),
        };
        let tag_web = blog_tag::Model {
            id: "tagweb01".to_string(),
            name: "web".to_string(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![post.clone()], vec![post.clone()]])
            .append_query_results([
                vec![tag_rust.clone()],
                Vec::new(),
                vec![tag_web.clone()],
                vec![tag_rust.clone()],
            ])
            .append_query_results([vec![post]])
            .append_query_results([vec![tag_rust, tag_web]])
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                },
            ])
            .into_connection();
        let store = Arc::new(MemoryStore::new());
        let (svc, db) = service_with(db, store);

        let input = UpdateBlogPostInput {
            tags: Some(" rust ,, web ,rust".to_string()),
            ..Default::default()
        };
        let res = svc.update("p1", input, None, Vec::new()).await.unwrap();
        assert_eq!(res.tags, vec!["rust".to_string(), "web".to_string()]);
        drop(svc);

        let log = format!("{:?}", Arc::try_unwrap(db).ok().unwrap().into_transaction_log());

        // Join rows are rebuilt: old set dropped, each tag inserted once.
        // The SQL text's quotes appear escaped in the Debug-formatted log.
        assert!(log.contains(r#"DELETE FROM \"blog_post_tag\""#));
        assert_eq!(log.matches(r#"INSERT INTO \"blog_post_tag\""#).count(), 1);
        assert!(log.contains("tagrust01"));
        assert!(log.contains("tagweb01"));

        // Names were trimmed and empty segments dropped before the upsert.
        assert!(log.contains(r#"String(Some("web"))"#));
        assert!(!log.contains(r#"String(Some(" web "))"#));
        assert!(!log.contains(r#"String(Some(""))"#));
    }

    #[tokio::test]
    async fn test_featured_replacement_with_same_name_keeps_new_files() {
        let post = sample_post(json!([]), Some("photo_t0.jpg".to_string()));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![post.clone()], vec![post.clone()], vec![post]])
            .append_query_results([Vec::<blog_tag::Model>::new()])
            .into_connection();

        let store = Arc::new(MemoryStore::new());
        for name in [
            "photo_t0.jpg",
            "small_photo_t0.jpg",
            "medium_photo_t0.jpg",
            "large_photo_t0.jpg",
        ] {
            store.save(name, b"old").await.unwrap();
        }
        let (svc, _db) = service_with(db, Arc::clone(&store));

        // The namer reuses the old base name, as a same-second timestamp
        // replacement would. The just-written files must survive.
        svc.update(
            "p1",
            UpdateBlogPostInput::default(),
            Some(upload("photo.jpg", b"new")),
            Vec::new(),
        )
        .await
        .unwrap();

        assert_eq!(store.load("photo_t0.jpg").await.unwrap(), b"new");
        assert_eq!(
            store.keys(),
            vec![
                "large_photo_t0.jpg".to_string(),
                "medium_photo_t0.jpg".to_string(),
                "photo_t0.jpg".to_string(),
                "small_photo_t0.jpg".to_string(),
            ]
        );
    }

    #[test]
    fn test_file_name_of_strips_prefix() {
        assert_eq!(
            file_name_of("/assets/images/uploads/pic_t0.jpg"),
            Some("pic_t0.jpg".to_string())
        );
        assert_eq!(file_name_of("bare.jpg"), Some("bare.jpg".to_string()));
    }

    #[test]
    fn test_parse_manifest_tolerates_garbage() {
        assert!(parse_manifest(Some(&serde_json::json!("not a manifest"))).is_none());
        assert!(parse_manifest(None).is_none());
    }
}
