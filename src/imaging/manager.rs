//! Placeholder image bookkeeping.
//!
//! [`ImageManager`] owns the `{prefix}_{key}` naming scheme. `generate` first
//! looks the title up in the store and returns an existing image untouched,
//! so re-seeding never duplicates images. Newly rendered images are stored
//! as `{title lowercased}.jpg`. Every image handled in a run is remembered
//! in a key → record cache that `get` reads from.

use super::backend::ImageBackend;
use super::manifest::ImageSpec;
use super::palette::{DEFAULT_BACKGROUND, DEFAULT_TEXT, Palette};
use super::params::{FONT_SIZE, PlaceholderParams, Quality};
use super::rust_backend::RustBackend;
use crate::error::{Result, SeedError};
use crate::store::{ContentStore, ImageRecord, NewImage};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Image key → stored image.
pub type ImageRegistry = BTreeMap<String, ImageRecord>;

/// Colors and label for one placeholder. Unset values use the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageOptions {
    pub bg: Option<String>,
    pub text: Option<String>,
    pub label: Option<String>,
}

impl From<&ImageSpec> for ImageOptions {
    fn from(spec: &ImageSpec) -> Self {
        Self {
            bg: spec.bg.clone(),
            text: spec.text.clone(),
            label: spec.label.clone(),
        }
    }
}

pub struct ImageManager {
    prefix: String,
    palette: Palette,
    quality: Quality,
    backend: Box<dyn ImageBackend>,
    cache: ImageRegistry,
}

impl ImageManager {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::with_backend(prefix, Box::new(RustBackend::new()))
    }

    pub fn with_backend(prefix: impl Into<String>, backend: Box<dyn ImageBackend>) -> Self {
        Self {
            prefix: prefix.into(),
            palette: Palette::default(),
            quality: Quality::default(),
            backend,
            cache: ImageRegistry::new(),
        }
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Store title for `key`.
    pub fn title_for(&self, key: &str) -> String {
        format!("{}_{}", self.prefix, key)
    }

    /// Return the image for `key`, rendering and storing it if needed.
    pub fn generate(
        &mut self,
        store: &mut dyn ContentStore,
        key: &str,
        width: u32,
        height: u32,
        options: &ImageOptions,
    ) -> Result<ImageRecord> {
        let title = self.title_for(key);
        if let Some(existing) = store.image_by_title(&title) {
            debug!(key, id = existing.id.0, "reusing image");
            let record = existing.clone();
            self.cache.insert(key.to_string(), record.clone());
            return Ok(record);
        }
        if width == 0 || height == 0 {
            return Err(SeedError::Content(format!(
                "Image '{key}' needs non-zero dimensions, got {width}x{height}"
            )));
        }

        let params = PlaceholderParams {
            width,
            height,
            background: self.palette.resolve(options.bg.as_deref(), DEFAULT_BACKGROUND),
            foreground: self.palette.resolve(options.text.as_deref(), DEFAULT_TEXT),
            label: options.label.clone().unwrap_or_else(|| title_case(key)),
            caption: format!("{width}x{height}"),
            font_size: FONT_SIZE,
            quality: self.quality,
        };
        let data = self.backend.render_placeholder(&params)?;
        let record = store.insert_image(NewImage {
            file: format!("{}.jpg", title.to_lowercase()),
            title,
            width,
            height,
            data,
        })?;
        info!(key, id = record.id.0, "{}x{} placeholder", width, height);
        self.cache.insert(key.to_string(), record.clone());
        Ok(record)
    }

    /// Generate every spec in order. Returns the images of this manifest.
    pub fn generate_manifest(
        &mut self,
        store: &mut dyn ContentStore,
        specs: &[ImageSpec],
    ) -> Result<ImageRegistry> {
        let mut produced = ImageRegistry::new();
        for spec in specs {
            if produced.contains_key(&spec.key) {
                return Err(SeedError::Content(format!(
                    "Duplicate image key in manifest: {}",
                    spec.key
                )));
            }
            let options = ImageOptions::from(spec);
            let record = self.generate(store, &spec.key, spec.width, spec.height, &options)?;
            produced.insert(spec.key.clone(), record);
        }
        Ok(produced)
    }

    /// Cached image for `key`. Never touches the store.
    pub fn get(&self, key: &str) -> Option<&ImageRecord> {
        self.cache.get(key)
    }

    /// Every image handled since the last `forget_all`.
    pub fn cached(&self) -> &ImageRegistry {
        &self.cache
    }

    /// Drop the cache, e.g. after the store's images were deleted.
    pub fn forget_all(&mut self) {
        self.cache.clear();
    }
}

/// `HERO_IMAGE` → `Hero Image`.
fn title_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut in_word = false;
    for ch in key.chars() {
        if ch == '_' {
            out.push(' ');
            in_word = false;
        } else if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::MockBackend;
    use crate::store::MemoryStore;

    fn manager() -> (ImageManager, MockBackend) {
        let backend = MockBackend::new();
        let manager = ImageManager::with_backend("SEED", Box::new(backend.clone()));
        (manager, backend)
    }

    #[test]
    fn title_case_matches_labels() {
        assert_eq!(title_case("HERO_IMAGE"), "Hero Image");
        assert_eq!(title_case("DETAIL_1"), "Detail 1");
        assert_eq!(title_case("logo"), "Logo");
    }

    #[test]
    fn generate_stores_prefixed_image() {
        let (mut images, backend) = manager();
        let mut store = MemoryStore::new();

        let record = images
            .generate(&mut store, "HERO_IMAGE", 1920, 1080, &ImageOptions::default())
            .unwrap();

        assert_eq!(record.title, "SEED_HERO_IMAGE");
        assert_eq!(record.file, "seed_hero_image.jpg");
        assert_eq!((record.width, record.height), (1920, 1080));
        assert_eq!(images.get("HERO_IMAGE"), Some(&record));

        let renders = backend.get_renders();
        assert_eq!(renders.len(), 1);
        assert_eq!(renders[0].label, "Hero Image");
        assert_eq!(renders[0].caption, "1920x1080");
        assert_eq!(renders[0].background, [0x1A, 0x2F, 0x23]);
        assert_eq!(renders[0].foreground, [0xED, 0xE8, 0xE0]);
        assert_eq!(renders[0].quality.value(), 85);
    }

    #[test]
    fn generate_reuses_existing_image() {
        let (mut images, backend) = manager();
        let mut store = MemoryStore::new();
        let first = images
            .generate(&mut store, "LOGO", 300, 80, &ImageOptions::default())
            .unwrap();

        // A fresh manager (empty cache) still finds the stored image.
        let (mut fresh, _) = manager();
        let second = fresh
            .generate(&mut store, "LOGO", 10, 10, &ImageOptions::default())
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(store.images().len(), 1);
        assert_eq!(backend.get_renders().len(), 1);
        assert_eq!(fresh.get("LOGO"), Some(&first));
    }

    #[test]
    fn options_override_colors_and_label() {
        let (mut images, backend) = manager();
        let mut store = MemoryStore::new();
        let options = ImageOptions {
            bg: Some("sage_linen".into()),
            text: Some("#000".into()),
            label: Some("Gas Safe".into()),
        };
        images
            .generate(&mut store, "LOGO_GASSAFE", 200, 80, &options)
            .unwrap();

        let render = &backend.get_renders()[0];
        assert_eq!(render.background, [0xF7, 0xF5, 0xF1]);
        assert_eq!(render.foreground, [0, 0, 0]);
        assert_eq!(render.label, "Gas Safe");
    }

    #[test]
    fn zero_dimensions_are_content_errors() {
        let (mut images, _) = manager();
        let mut store = MemoryStore::new();
        let err = images
            .generate(&mut store, "BROKEN", 0, 10, &ImageOptions::default())
            .unwrap_err();
        assert!(matches!(err, SeedError::Content(_)));
        assert!(store.images().is_empty());
    }

    #[test]
    fn generate_manifest_returns_produced_images() {
        let (mut images, _) = manager();
        let mut store = MemoryStore::new();
        let specs = vec![
            ImageSpec::new("A", 10, 10),
            ImageSpec::new("B", 20, 10).bg("sage_moss"),
        ];

        let produced = images.generate_manifest(&mut store, &specs).unwrap();
        assert_eq!(produced.len(), 2);
        assert_eq!(produced["B"].width, 20);
        assert!(images.get("A").is_some());
    }

    #[test]
    fn generate_manifest_rejects_duplicate_keys() {
        let (mut images, _) = manager();
        let mut store = MemoryStore::new();
        let specs = vec![ImageSpec::new("A", 10, 10), ImageSpec::new("A", 20, 20)];
        let err = images.generate_manifest(&mut store, &specs).unwrap_err();
        assert!(err.to_string().contains("Duplicate image key"));
    }

    #[test]
    fn forget_all_clears_cache_only() {
        let (mut images, _) = manager();
        let mut store = MemoryStore::new();
        images
            .generate(&mut store, "A", 10, 10, &ImageOptions::default())
            .unwrap();
        images.forget_all();
        assert!(images.get("A").is_none());
        assert_eq!(store.images().len(), 1);
    }
}
