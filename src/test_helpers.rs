//! Shared test utilities for the sum-seed test suite.
//!
//! Provides profile builders (on disk and in memory), a [`Harness`] that runs
//! one seeder at a time against a [`MemoryStore`], and lookup helpers that
//! panic with a clear message on a miss.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let mut h = Harness::new(profile_data(&[("home", "slug: home\ntitle: Home\n")]))
//!     .with_images(&["HERO_IMAGE"]);
//! h.seed("home", &mut HomePageSeeder::new()).unwrap();
//!
//! let home = find_page(&h.store, "home");
//! assert_eq!(home.title, "Home");
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use serde_yaml::Mapping;

use crate::content::ProfileData;
use crate::error::Result;
use crate::imaging::backend::tests::MockBackend;
use crate::imaging::{ImageManager, ImageOptions, ImageRegistry};
use crate::registry::{PageRegistry, SeedContext, SeedOutput, Seeder};
use crate::store::{ContentStore, MemoryStore, PageId, PageRecord, PageType};

pub const SITE_YAML: &str = "\
brand:
  company_name: Sage & Stone
  tagline: Kitchens built to last
contact:
  email: hello@example.com
  phone: 01234 567890
colors:
  primary: \"#1A2F23\"
  text_light: \"#EDE8E0\"
";

pub const NAV_YAML: &str = "\
header:
  cta_text: Get a quote
  menu_items:
    - label: About
      link:
        link_type: page
        page: about
footer:
  tagline: Built by hand
";

// =========================================================================
// Fixture setup
// =========================================================================

/// The bundled `fixtures/content` directory.
pub fn fixture_content_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content")
}

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    copy_dir_recursive(&fixture_content_dir(), tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Write a profile directory under `root`. `pages` holds `(file name, yaml)`.
pub fn write_profile(root: &Path, name: &str, site: &str, nav: &str, pages: &[(&str, &str)]) {
    let dir = root.join(name);
    fs::create_dir_all(dir.join("pages")).unwrap();
    fs::write(dir.join("site.yaml"), site).unwrap();
    fs::write(dir.join("navigation.yaml"), nav).unwrap();
    for (file, yaml) in pages {
        fs::write(dir.join("pages").join(file), yaml).unwrap();
    }
}

// =========================================================================
// In-memory profiles
// =========================================================================

pub fn parse_mapping(yaml: &str) -> Mapping {
    serde_yaml::from_str(yaml).unwrap()
}

/// Profile with the stock site and navigation and the given `(name, yaml)`
/// pages.
pub fn profile_data(pages: &[(&str, &str)]) -> ProfileData {
    ProfileData {
        site: parse_mapping(SITE_YAML),
        navigation: parse_mapping(NAV_YAML),
        pages: pages
            .iter()
            .map(|(name, yaml)| (name.to_string(), parse_mapping(yaml)))
            .collect(),
    }
}

// =========================================================================
// Seeder harness
// =========================================================================

/// A store, an image manager on the mock backend and the registries a run
/// accumulates.
pub struct Harness {
    pub store: MemoryStore,
    pub image_manager: ImageManager,
    pub backend: MockBackend,
    pub images: ImageRegistry,
    pub pages: PageRegistry,
    pub data: ProfileData,
}

impl Harness {
    pub fn new(data: ProfileData) -> Self {
        let backend = MockBackend::new();
        Self {
            store: MemoryStore::new(),
            image_manager: ImageManager::with_backend("SEED", Box::new(backend.clone())),
            backend,
            images: ImageRegistry::new(),
            pages: PageRegistry::new(),
            data,
        }
    }

    /// Generate a small placeholder for every key.
    pub fn with_images(mut self, keys: &[&str]) -> Self {
        for key in keys {
            let record = self
                .image_manager
                .generate(&mut self.store, key, 16, 9, &ImageOptions::default())
                .unwrap();
            self.images.insert(key.to_string(), record);
        }
        self
    }

    /// Run `seeder` as `name` and merge its pages into the registry.
    pub fn seed(&mut self, name: &str, seeder: &mut dyn Seeder) -> Result<SeedOutput> {
        let mut ctx = SeedContext {
            profile: "test",
            data: &self.data,
            page_name: name,
            pages: &self.pages,
            images: &self.images,
            store: &mut self.store,
            image_manager: &mut self.image_manager,
        };
        let output = seeder.seed(&mut ctx, false)?;
        output.merge_into(name, &mut self.pages);
        Ok(output)
    }

    pub fn clear(&mut self, name: &str, seeder: &mut dyn Seeder) -> Result<()> {
        let mut ctx = SeedContext {
            profile: "test",
            data: &self.data,
            page_name: name,
            pages: &self.pages,
            images: &self.images,
            store: &mut self.store,
            image_manager: &mut self.image_manager,
        };
        seeder.clear(&mut ctx)
    }
}

// =========================================================================
// Store lookups: panic with a clear message on miss
// =========================================================================

/// Find a page anywhere in the tree by slug. Panics if not found.
pub fn find_page<'a>(store: &'a MemoryStore, slug: &str) -> &'a PageRecord {
    let root = root_id(store);
    store
        .descendants(root)
        .into_iter()
        .find(|page| page.slug == slug)
        .unwrap_or_else(|| {
            let slugs: Vec<&str> = store
                .descendants(root)
                .into_iter()
                .map(|page| page.slug.as_str())
                .collect();
            panic!("page '{slug}' not found. Available: {slugs:?}")
        })
}

/// Slugs of the children of `parent`, in tree order.
pub fn child_slugs<'a>(store: &'a MemoryStore, parent: &PageRecord) -> Vec<&'a str> {
    store
        .children(parent.id)
        .into_iter()
        .map(|page| page.slug.as_str())
        .collect()
}

fn root_id(store: &MemoryStore) -> PageId {
    store
        .pages_of_type(PageType::Root)
        .first()
        .map(|page| page.id)
        .unwrap_or_else(|| panic!("store has no root page"))
}
