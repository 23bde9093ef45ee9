//! Image ingest pipeline for uploaded media.
//!
//! Featured images keep the original file and gain three cover-cropped
//! variants; gallery images get a single recompressed rendition; link
//! thumbnails get a fixed 200x200 rendition under a `link_` prefix.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use arbor_common::{AppError, AppResult, IdGenerator};

use super::codec::{ImageCodec, SUPPORTED_EXTENSIONS};
use super::store::MediaStore;

/// One cover-crop rendition of a featured image.
#[derive(Debug, Clone, Copy)]
pub struct VariantSpec {
    /// File-name prefix of the rendition.
    pub prefix: &'static str,
    /// Target width.
    pub width: u32,
    /// Target height.
    pub height: u32,
    /// Encode quality.
    pub quality: u8,
}

/// Renditions generated for every featured image.
pub const FEATURED_VARIANTS: [VariantSpec; 3] = [
    VariantSpec {
        prefix: "small_",
        width: 350,
        height: 200,
        quality: 50,
    },
    VariantSpec {
        prefix: "medium_",
        width: 800,
        height: 300,
        quality: 75,
    },
    VariantSpec {
        prefix: "large_",
        width: 1200,
        height: 400,
        quality: 75,
    },
];

/// Quality for gallery renditions.
const GALLERY_QUALITY: u8 = 50;

/// Box and quality for link thumbnails.
const LINK_THUMB_SIZE: u32 = 200;
const LINK_THUMB_QUALITY: u8 = 75;

/// An uploaded image: the client file name plus its bytes.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// File name as sent by the client.
    pub file_name: String,
    /// Raw encoded bytes.
    pub data: Vec<u8>,
}

/// One generated rendition, as persisted in the manifest column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageVariant {
    /// File-name prefix (`small_`, `medium_`, `large_`).
    pub prefix: String,
    /// Full file name of the rendition.
    pub file: String,
    /// Rendition width.
    pub width: u32,
    /// Rendition height.
    pub height: u32,
    /// Encode quality.
    pub quality: u8,
}

/// Manifest of every file a featured-image ingest produced.
///
/// Stored alongside the record so deletion does not depend on
/// reconstructing names from prefixes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageManifest {
    /// File name of the stored original.
    pub original: String,
    /// Generated renditions.
    pub variants: Vec<ImageVariant>,
}

impl ImageManifest {
    /// Every file name the manifest covers, original first.
    #[must_use]
    pub fn files(&self) -> Vec<String> {
        let mut files = vec![self.original.clone()];
        files.extend(self.variants.iter().map(|v| v.file.clone()));
        files
    }
}

/// Result of a featured-image ingest.
#[derive(Debug, Clone)]
pub struct FeaturedImage {
    /// Base file name of the stored original.
    pub name: String,
    /// Manifest of all produced files.
    pub manifest: ImageManifest,
}

/// Result of a gallery ingest.
#[derive(Debug, Clone, Serialize)]
pub struct GalleryItem {
    /// Public directory the file is served from.
    pub dir: String,
    /// File name within that directory.
    pub name: String,
}

/// Strategy for naming stored uploads.
///
/// Produces a full file name in the `{stem}_{token}.{ext}` shape; the
/// stem is already sanitized by the caller.
pub trait UploadNamer: Send + Sync {
    /// Name a stored file.
    fn name(&self, stem: &str, ext: &str) -> String;
}

/// Default namer: a ULID token, collision-free across uploads.
#[derive(Clone, Default)]
pub struct UlidNamer {
    id_gen: IdGenerator,
}

impl UlidNamer {
    /// Create a new ULID namer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            id_gen: IdGenerator::new(),
        }
    }
}

impl UploadNamer for UlidNamer {
    fn name(&self, stem: &str, ext: &str) -> String {
        format!("{stem}_{}.{ext}", self.id_gen.generate())
    }
}

/// Legacy namer: unix seconds. Two uploads of the same file within one
/// second collide and the later write wins; kept only for installs
/// that need the historical name shape.
#[derive(Clone, Copy, Default)]
pub struct TimestampNamer;

impl UploadNamer for TimestampNamer {
    fn name(&self, stem: &str, ext: &str) -> String {
        format!("{stem}_{}.{ext}", chrono::Utc::now().timestamp())
    }
}

/// Image ingest service.
///
/// Owns the storage backend, the codec and the naming strategy; content
/// services call into it and persist the returned names.
#[derive(Clone)]
pub struct ImageService {
    store: Arc<dyn MediaStore>,
    codec: Arc<dyn ImageCodec>,
    namer: Arc<dyn UploadNamer>,
    public_prefix: String,
}

impl ImageService {
    /// Create a new image service.
    #[must_use]
    pub fn new(
        store: Arc<dyn MediaStore>,
        codec: Arc<dyn ImageCodec>,
        namer: Arc<dyn UploadNamer>,
        public_prefix: impl Into<String>,
    ) -> Self {
        Self {
            store,
            codec,
            namer,
            public_prefix: public_prefix.into(),
        }
    }

    /// Public URL path for a stored file name.
    #[must_use]
    pub fn public_path(&self, name: &str) -> String {
        format!("{}/{name}", self.public_prefix)
    }

    /// Store a featured image: the original as uploaded plus one
    /// cover-cropped rendition per [`FEATURED_VARIANTS`] entry.
    ///
    /// Variants are generated from the stored original, not the upload
    /// buffer, so what was written to disk is what gets cropped.
    pub async fn ingest_featured(&self, upload: ImageUpload) -> AppResult<FeaturedImage> {
        let (stem, ext) = split_file_name(&upload.file_name)?;
        let name = self.namer.name(&stem, &ext);

        self.store.save(&name, &upload.data).await?;
        let original = self.store.load(&name).await?;

        let mut variants = Vec::with_capacity(FEATURED_VARIANTS.len());
        for spec in FEATURED_VARIANTS {
            let rendition = self
                .codec
                .cover(&original, spec.width, spec.height, spec.quality)?;
            let file = format!("{}{name}", spec.prefix);
            self.store.save(&file, &rendition).await?;
            variants.push(ImageVariant {
                prefix: spec.prefix.to_string(),
                file,
                width: spec.width,
                height: spec.height,
                quality: spec.quality,
            });
        }

        tracing::debug!(name = %name, variants = variants.len(), "stored featured image");

        Ok(FeaturedImage {
            manifest: ImageManifest {
                original: name.clone(),
                variants,
            },
            name,
        })
    }

    /// Store a gallery image as a single recompressed rendition.
    ///
    /// `subdir` is an optional directory under the upload root (created
    /// as needed); pass `""` for the flat layout featured and link
    /// images use.
    pub async fn ingest_gallery_item(
        &self,
        upload: ImageUpload,
        subdir: &str,
    ) -> AppResult<GalleryItem> {
        let (stem, ext) = split_file_name(&upload.file_name)?;
        let name = self.namer.name(&stem, &ext);

        let key = if subdir.is_empty() {
            name.clone()
        } else {
            format!("{subdir}/{name}")
        };
        let rendition = self.codec.reencode(&upload.data, GALLERY_QUALITY)?;
        self.store.save(&key, &rendition).await?;

        let dir = if subdir.is_empty() {
            self.public_prefix.clone()
        } else {
            format!("{}/{subdir}", self.public_prefix)
        };
        Ok(GalleryItem { dir, name })
    }

    /// Store a link thumbnail: a 200x200 rendition under a `link_`
    /// prefix. Undersized sources are not upscaled.
    pub async fn ingest_link_thumbnail(&self, upload: ImageUpload) -> AppResult<String> {
        let (stem, ext) = split_file_name(&upload.file_name)?;
        let name = format!("link_{}", self.namer.name(&stem, &ext));

        let rendition =
            self.codec
                .thumbnail(&upload.data, LINK_THUMB_SIZE, LINK_THUMB_SIZE, LINK_THUMB_QUALITY)?;
        self.store.save(&name, &rendition).await?;

        Ok(name)
    }

    /// Best-effort delete of stored files. Missing files are fine;
    /// backend failures are logged and skipped so one bad file never
    /// blocks cleanup of the rest.
    pub async fn remove(&self, names: &[String]) {
        for name in names {
            if let Err(e) = self.store.delete(name).await {
                tracing::warn!(name = %name, error = %e, "failed to delete stored image");
            }
        }
    }

    /// Every file belonging to a featured image: the manifest when one
    /// was persisted, otherwise reconstructed from the variant
    /// prefixes (rows written before manifests existed).
    #[must_use]
    pub fn featured_files(original: &str, manifest: Option<&ImageManifest>) -> Vec<String> {
        manifest.map_or_else(
            || {
                let mut files = vec![original.to_string()];
                files.extend(
                    FEATURED_VARIANTS
                        .iter()
                        .map(|spec| format!("{}{original}", spec.prefix)),
                );
                files
            },
            ImageManifest::files,
        )
    }
}

/// Split an uploaded file name into a sanitized stem and a validated
/// lowercase extension.
fn split_file_name(file_name: &str) -> AppResult<(String, String)> {
    let (stem, ext) = file_name
        .rsplit_once('.')
        .ok_or_else(|| AppError::UnsupportedImage(format!("File has no extension: {file_name}")))?;

    let ext = ext.to_lowercase();
    if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(AppError::UnsupportedImage(format!(
            "Unsupported image extension: {ext}"
        )));
    }

    Ok((sanitize_stem(stem), ext))
}

/// Reduce a stem to `[a-z0-9_-]`, collapsing anything else to a single
/// dash. Path separators never survive into storage keys.
fn sanitize_stem(stem: &str) -> String {
    let mut out = String::with_capacity(stem.len());
    let mut last_dash = false;
    for c in stem.chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }
    let trimmed = out.trim_matches('-').to_string();
    if trimmed.is_empty() {
        "image".to_string()
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::store::MemoryStore;
    use std::sync::Mutex;

    /// Codec stub that records each operation and tags the output.
    #[derive(Default)]
    struct FakeCodec {
        calls: Mutex<Vec<String>>,
    }

    impl FakeCodec {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ImageCodec for FakeCodec {
        fn dimensions(&self, _data: &[u8]) -> AppResult<(u32, u32)> {
            Ok((1000, 1000))
        }

        fn cover(&self, data: &[u8], width: u32, height: u32, quality: u8) -> AppResult<Vec<u8>> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("cover {width}x{height} q{quality}"));
            let mut out = data.to_vec();
            out.extend_from_slice(format!(" cover{width}x{height}").as_bytes());
            Ok(out)
        }

        fn reencode(&self, data: &[u8], quality: u8) -> AppResult<Vec<u8>> {
            self.calls.lock().unwrap().push(format!("reencode q{quality}"));
            Ok(data.to_vec())
        }

        fn thumbnail(
            &self,
            data: &[u8],
            width: u32,
            height: u32,
            quality: u8,
        ) -> AppResult<Vec<u8>> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("thumbnail {width}x{height} q{quality}"));
            Ok(data.to_vec())
        }
    }

    /// Deterministic namer for asserting on exact file names.
    struct StubNamer;

    impl UploadNamer for StubNamer {
        fn name(&self, stem: &str, ext: &str) -> String {
            format!("{stem}_t0.{ext}")
        }
    }

    fn service(
        store: Arc<MemoryStore>,
        codec: Arc<FakeCodec>,
        namer: Arc<dyn UploadNamer>,
    ) -> ImageService {
        ImageService::new(store, codec, namer, "/assets/images/uploads")
    }

    fn upload(file_name: &str) -> ImageUpload {
        ImageUpload {
            file_name: file_name.to_string(),
            data: b"pixels".to_vec(),
        }
    }

    #[tokio::test]
    async fn test_featured_writes_original_and_three_variants() {
        let store = Arc::new(MemoryStore::new());
        let codec = Arc::new(FakeCodec::default());
        let svc = service(store.clone(), codec.clone(), Arc::new(StubNamer));

        let featured = svc.ingest_featured(upload("Sunset Photo.jpg")).await.unwrap();

        assert_eq!(featured.name, "sunset-photo_t0.jpg");
        assert_eq!(
            store.keys(),
            vec![
                "large_sunset-photo_t0.jpg".to_string(),
                "medium_sunset-photo_t0.jpg".to_string(),
                "small_sunset-photo_t0.jpg".to_string(),
                "sunset-photo_t0.jpg".to_string(),
            ]
        );
        assert_eq!(
            codec.calls(),
            vec![
                "cover 350x200 q50".to_string(),
                "cover 800x300 q75".to_string(),
                "cover 1200x400 q75".to_string(),
            ]
        );

        let manifest = &featured.manifest;
        assert_eq!(manifest.original, "sunset-photo_t0.jpg");
        assert_eq!(manifest.variants.len(), 3);
        assert_eq!(manifest.variants[0].prefix, "small_");
        assert_eq!(manifest.variants[0].file, "small_sunset-photo_t0.jpg");
        assert_eq!(manifest.variants[2].width, 1200);
        assert_eq!(manifest.variants[2].height, 400);
    }

    #[tokio::test]
    async fn test_original_bytes_stored_untouched() {
        let store = Arc::new(MemoryStore::new());
        let codec = Arc::new(FakeCodec::default());
        let svc = service(store.clone(), codec, Arc::new(StubNamer));

        svc.ingest_featured(upload("a.png")).await.unwrap();

        assert_eq!(store.load("a_t0.png").await.unwrap(), b"pixels");
    }

    #[tokio::test]
    async fn test_gallery_item_recompresses_at_q50() {
        let store = Arc::new(MemoryStore::new());
        let codec = Arc::new(FakeCodec::default());
        let svc = service(store.clone(), codec.clone(), Arc::new(StubNamer));

        let item = svc
            .ingest_gallery_item(upload("chart.png"), "")
            .await
            .unwrap();

        assert_eq!(item.dir, "/assets/images/uploads");
        assert_eq!(item.name, "chart_t0.png");
        assert_eq!(codec.calls(), vec!["reencode q50".to_string()]);
        assert_eq!(store.keys(), vec!["chart_t0.png".to_string()]);
    }

    #[tokio::test]
    async fn test_gallery_item_in_subdirectory() {
        let store = Arc::new(MemoryStore::new());
        let codec = Arc::new(FakeCodec::default());
        let svc = service(store.clone(), codec, Arc::new(StubNamer));

        let item = svc
            .ingest_gallery_item(upload("chart.png"), "editor")
            .await
            .unwrap();

        assert_eq!(item.dir, "/assets/images/uploads/editor");
        assert_eq!(item.name, "chart_t0.png");
        assert_eq!(store.keys(), vec!["editor/chart_t0.png".to_string()]);
    }

    #[tokio::test]
    async fn test_link_thumbnail_gets_prefix_and_box() {
        let store = Arc::new(MemoryStore::new());
        let codec = Arc::new(FakeCodec::default());
        let svc = service(store.clone(), codec.clone(), Arc::new(StubNamer));

        let name = svc.ingest_link_thumbnail(upload("logo.webp")).await.unwrap();

        assert_eq!(name, "link_logo_t0.webp");
        assert_eq!(codec.calls(), vec!["thumbnail 200x200 q75".to_string()]);
        assert!(store.exists("link_logo_t0.webp").await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let codec = Arc::new(FakeCodec::default());
        let svc = service(store.clone(), codec, Arc::new(StubNamer));

        store.save("a_t0.jpg", b"x").await.unwrap();
        let names = vec!["a_t0.jpg".to_string(), "never-there.jpg".to_string()];

        svc.remove(&names).await;
        svc.remove(&names).await;

        assert!(store.keys().is_empty());
    }

    #[tokio::test]
    async fn test_timestamp_namer_collides_within_a_second() {
        let store = Arc::new(MemoryStore::new());
        let codec = Arc::new(FakeCodec::default());
        let svc = service(store.clone(), codec, Arc::new(TimestampNamer));

        svc.ingest_gallery_item(upload("dup.jpg"), "").await.unwrap();
        svc.ingest_gallery_item(upload("dup.jpg"), "").await.unwrap();

        // Same stem, same second: the second write wins.
        assert_eq!(store.keys().len(), 1);
    }

    #[tokio::test]
    async fn test_unsupported_extension_rejected() {
        let store = Arc::new(MemoryStore::new());
        let codec = Arc::new(FakeCodec::default());
        let svc = service(store, codec, Arc::new(StubNamer));

        let err = svc.ingest_featured(upload("notes.txt")).await.unwrap_err();
        assert!(matches!(err, AppError::UnsupportedImage(_)));
    }

    #[test]
    fn test_featured_files_prefers_manifest() {
        let manifest = ImageManifest {
            original: "a_t0.jpg".to_string(),
            variants: vec![ImageVariant {
                prefix: "small_".to_string(),
                file: "small_a_t0.jpg".to_string(),
                width: 350,
                height: 200,
                quality: 50,
            }],
        };
        assert_eq!(
            ImageService::featured_files("a_t0.jpg", Some(&manifest)),
            vec!["a_t0.jpg".to_string(), "small_a_t0.jpg".to_string()]
        );
    }

    #[test]
    fn test_featured_files_reconstructs_without_manifest() {
        assert_eq!(
            ImageService::featured_files("a_t0.jpg", None),
            vec![
                "a_t0.jpg".to_string(),
                "small_a_t0.jpg".to_string(),
                "medium_a_t0.jpg".to_string(),
                "large_a_t0.jpg".to_string(),
            ]
        );
    }

    #[test]
    fn test_stem_sanitization() {
        assert_eq!(sanitize_stem("My Photo (1)"), "my-photo-1");
        assert_eq!(sanitize_stem("../../etc/passwd"), "etc-passwd");
        assert_eq!(sanitize_stem("___"), "___");
        assert_eq!(sanitize_stem("!!!"), "image");
    }
}
