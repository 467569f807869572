//! In-memory [`ContentStore`] with optional JSON persistence.
//!
//! All state lives in one [`StoreState`] value. `begin` snapshots it and
//! `rollback` restores the snapshot, so a failed seeding run leaves nothing
//! behind. A store opened from a path writes itself back on `commit`:
//!
//! ```text
//! .sum-seed/
//! ├── store.json               # pages, images, categories, sites, settings
//! └── media/
//!     ├── seed_hero_image.jpg  # encoded placeholder files
//!     └── ...
//! ```
//!
//! Media files are written only on commit and only for images that still
//! exist, so a rolled-back run never leaves files on disk. Files of deleted
//! images are removed on the next commit.

use super::{
    Category, CategoryId, ContentStore, ImageId, ImageRecord, NavigationSettings, NavigationSlot,
    NewImage, PageDraft, PageId, PageKind, PageRecord, PageType, SiteDraft, SiteId, SiteRecord,
    SiteSettings, StoreError,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Version of the store document. Bump when the format changes.
const STORE_VERSION: u32 = 1;

/// Directory next to the store document holding encoded images.
const MEDIA_DIR: &str = "media";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreState {
    version: u32,
    next_id: u64,
    pages: Vec<PageRecord>,
    images: Vec<ImageRecord>,
    categories: Vec<Category>,
    sites: Vec<SiteRecord>,
    site_settings: BTreeMap<u64, SiteSettings>,
    headers: BTreeMap<u64, NavigationSettings>,
    footers: BTreeMap<u64, NavigationSettings>,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            version: STORE_VERSION,
            next_id: 1,
            pages: Vec::new(),
            images: Vec::new(),
            categories: Vec::new(),
            sites: Vec::new(),
            site_settings: BTreeMap::new(),
            headers: BTreeMap::new(),
            footers: BTreeMap::new(),
        }
    }
}

impl StoreState {
    fn allocate(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn page_index(&self, id: PageId) -> Result<usize, StoreError> {
        self.pages
            .iter()
            .position(|page| page.id == id)
            .ok_or(StoreError::MissingPage(id))
    }

    fn ensure_slug_free(
        &self,
        parent: PageId,
        slug: &str,
        except: Option<PageId>,
    ) -> Result<(), StoreError> {
        let taken = self.pages.iter().any(|page| {
            page.parent == Some(parent) && page.slug == slug && Some(page.id) != except
        });
        if taken {
            return Err(StoreError::SlugTaken {
                parent,
                slug: slug.to_string(),
            });
        }
        Ok(())
    }
}

/// Page tree, images, categories, sites and settings held in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: StoreState,
    /// Snapshot taken by `begin`.
    checkpoint: Option<StoreState>,
    /// Encoded image bytes keyed by file name, written on commit.
    media: BTreeMap<String, Vec<u8>>,
    /// Store document path when persistent.
    path: Option<PathBuf>,
}

impl MemoryStore {
    /// An empty store that is never written to disk.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a persistent store. A missing document starts an empty store;
    /// the file is created on the first commit.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let state = match fs::read_to_string(path) {
            Ok(content) => {
                let state: StoreState = serde_json::from_str(&content)?;
                if state.version != STORE_VERSION {
                    return Err(StoreError::Version(state.version));
                }
                state
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => StoreState::default(),
            Err(err) => return Err(err.into()),
        };
        debug!(path = %path.display(), pages = state.pages.len(), "opened store");
        Ok(Self {
            state,
            path: Some(path.to_path_buf()),
            ..Self::default()
        })
    }

    /// Directory encoded images are written to, when persistent.
    pub fn media_dir(&self) -> Option<PathBuf> {
        self.path
            .as_ref()
            .map(|path| path.parent().unwrap_or(Path::new(".")).join(MEDIA_DIR))
    }

    /// Write pending media files, then the store document, then prune media
    /// of deleted images. The document is written last so a failed write
    /// never points at missing files.
    pub fn save(&mut self) -> Result<(), StoreError> {
        let Some(path) = self.path.clone() else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let media_dir = self.media_dir();
        if let Some(media_dir) = &media_dir {
            fs::create_dir_all(media_dir)?;
            for (file, data) in &self.media {
                if self.state.images.iter().any(|image| &image.file == file) {
                    fs::write(media_dir.join(file), data)?;
                }
            }
        }

        let json = serde_json::to_string_pretty(&self.state)?;
        fs::write(&path, json)?;
        self.media.clear();

        if let Some(media_dir) = &media_dir {
            for entry in fs::read_dir(media_dir)? {
                let entry = entry?;
                let name = entry.file_name().to_string_lossy().into_owned();
                if !self.state.images.iter().any(|image| image.file == name) {
                    fs::remove_file(entry.path())?;
                }
            }
        }
        debug!(path = %path.display(), "saved store");
        Ok(())
    }

    pub fn page_count(&self) -> usize {
        self.state.pages.len()
    }
}

impl ContentStore for MemoryStore {
    fn root_page(&mut self) -> Result<PageId, StoreError> {
        if let Some(root) = self.state.pages.iter().find(|page| page.parent.is_none()) {
            return Ok(root.id);
        }
        let id = PageId(self.state.allocate());
        self.state.pages.push(PageRecord {
            id,
            parent: None,
            slug: "root".to_string(),
            title: "Root".to_string(),
            seo_title: String::new(),
            search_description: String::new(),
            show_in_menus: false,
            live: true,
            revision: 1,
            body: Vec::new(),
            kind: PageKind::Root,
        });
        Ok(id)
    }

    fn page(&self, id: PageId) -> Option<&PageRecord> {
        self.state.pages.iter().find(|page| page.id == id)
    }

    fn children(&self, parent: PageId) -> Vec<&PageRecord> {
        self.state
            .pages
            .iter()
            .filter(|page| page.parent == Some(parent))
            .collect()
    }

    fn pages_of_type(&self, page_type: PageType) -> Vec<&PageRecord> {
        self.state
            .pages
            .iter()
            .filter(|page| page.page_type() == page_type)
            .collect()
    }

    fn add_child(&mut self, parent: PageId, draft: PageDraft) -> Result<PageId, StoreError> {
        self.state.page_index(parent)?;
        self.state.ensure_slug_free(parent, &draft.slug, None)?;
        let id = PageId(self.state.allocate());
        let mut page = PageRecord {
            id,
            parent: Some(parent),
            slug: String::new(),
            title: String::new(),
            seo_title: String::new(),
            search_description: String::new(),
            show_in_menus: false,
            live: false,
            revision: 0,
            body: Vec::new(),
            kind: PageKind::Standard,
        };
        page.assign(draft);
        self.state.pages.push(page);
        Ok(id)
    }

    fn update_page(&mut self, page: PageRecord) -> Result<(), StoreError> {
        let index = self.state.page_index(page.id)?;
        let stored = &self.state.pages[index];
        if stored.parent.is_none() || page.parent.is_none() {
            return Err(StoreError::RootPage);
        }
        let parent = stored.parent;
        if let Some(parent) = parent {
            self.state.ensure_slug_free(parent, &page.slug, Some(page.id))?;
        }
        self.state.pages[index] = PageRecord { parent, ..page };
        Ok(())
    }

    fn publish_page(&mut self, id: PageId) -> Result<(), StoreError> {
        let index = self.state.page_index(id)?;
        let page = &mut self.state.pages[index];
        page.live = true;
        page.revision += 1;
        Ok(())
    }

    fn delete_page(&mut self, id: PageId) -> Result<usize, StoreError> {
        let page = self.page(id).ok_or(StoreError::MissingPage(id))?;
        if page.parent.is_none() {
            return Err(StoreError::RootPage);
        }
        let doomed: Vec<PageId> = self.descendants(id).iter().map(|page| page.id).collect();
        self.state.pages.retain(|page| !doomed.contains(&page.id));
        Ok(doomed.len())
    }

    fn image_by_title(&self, title: &str) -> Option<&ImageRecord> {
        self.state.images.iter().find(|image| image.title == title)
    }

    fn images(&self) -> Vec<&ImageRecord> {
        self.state.images.iter().collect()
    }

    fn insert_image(&mut self, image: NewImage) -> Result<ImageRecord, StoreError> {
        let record = ImageRecord {
            id: ImageId(self.state.allocate()),
            title: image.title,
            width: image.width,
            height: image.height,
            file: image.file.clone(),
            file_hash: format!("{:x}", Sha256::digest(&image.data)),
        };
        self.state.images.push(record.clone());
        if self.path.is_some() {
            self.media.insert(image.file, image.data);
        }
        Ok(record)
    }

    fn delete_images_with_prefix(&mut self, prefix: &str) -> Result<usize, StoreError> {
        let before = self.state.images.len();
        self.state
            .images
            .retain(|image| !image.title.starts_with(prefix));
        Ok(before - self.state.images.len())
    }

    fn category(&self, slug: &str) -> Option<&Category> {
        self.state
            .categories
            .iter()
            .find(|category| category.slug == slug)
    }

    fn categories(&self) -> Vec<&Category> {
        self.state.categories.iter().collect()
    }

    fn save_category(
        &mut self,
        slug: &str,
        name: &str,
        description: &str,
    ) -> Result<CategoryId, StoreError> {
        if let Some(category) = self
            .state
            .categories
            .iter_mut()
            .find(|category| category.slug == slug)
        {
            category.name = name.to_string();
            category.description = description.to_string();
            return Ok(category.id);
        }
        let id = CategoryId(self.state.allocate());
        self.state.categories.push(Category {
            id,
            slug: slug.to_string(),
            name: name.to_string(),
            description: description.to_string(),
        });
        Ok(id)
    }

    fn delete_category(&mut self, slug: &str) -> Result<bool, StoreError> {
        let before = self.state.categories.len();
        self.state.categories.retain(|category| category.slug != slug);
        Ok(before != self.state.categories.len())
    }

    fn sites(&self) -> Vec<&SiteRecord> {
        self.state.sites.iter().collect()
    }

    fn insert_site(&mut self, site: SiteDraft) -> Result<SiteId, StoreError> {
        self.state.page_index(site.root_page)?;
        let id = SiteId(self.state.allocate());
        self.state.sites.push(SiteRecord {
            id,
            hostname: site.hostname,
            port: site.port,
            site_name: site.site_name,
            root_page: site.root_page,
            is_default_site: site.is_default_site,
        });
        Ok(id)
    }

    fn update_site(&mut self, site: SiteRecord) -> Result<(), StoreError> {
        self.state.page_index(site.root_page)?;
        if let Some(stored) = self.state.sites.iter_mut().find(|s| s.id == site.id) {
            *stored = site;
        }
        Ok(())
    }

    fn site_settings(&self, site: SiteId) -> Option<&SiteSettings> {
        self.state.site_settings.get(&site.0)
    }

    fn save_site_settings(
        &mut self,
        site: SiteId,
        settings: SiteSettings,
    ) -> Result<(), StoreError> {
        self.state.site_settings.insert(site.0, settings);
        Ok(())
    }

    fn navigation(&self, site: SiteId, slot: NavigationSlot) -> Option<&NavigationSettings> {
        match slot {
            NavigationSlot::Header => self.state.headers.get(&site.0),
            NavigationSlot::Footer => self.state.footers.get(&site.0),
        }
    }

    fn save_navigation(
        &mut self,
        site: SiteId,
        slot: NavigationSlot,
        settings: NavigationSettings,
    ) -> Result<(), StoreError> {
        let map = match slot {
            NavigationSlot::Header => &mut self.state.headers,
            NavigationSlot::Footer => &mut self.state.footers,
        };
        map.insert(site.0, settings);
        Ok(())
    }

    fn delete_site_settings(&mut self, site: SiteId) -> Result<usize, StoreError> {
        let removed = [
            self.state.site_settings.remove(&site.0).is_some(),
            self.state.headers.remove(&site.0).is_some(),
            self.state.footers.remove(&site.0).is_some(),
        ];
        Ok(removed.iter().filter(|r| **r).count())
    }

    fn begin(&mut self) -> Result<(), StoreError> {
        if self.checkpoint.is_some() {
            return Err(StoreError::TransactionOpen);
        }
        self.checkpoint = Some(self.state.clone());
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        if self.checkpoint.is_none() {
            return Err(StoreError::NoTransaction);
        }
        if let Err(err) = self.save() {
            self.rollback();
            return Err(err);
        }
        self.checkpoint = None;
        Ok(())
    }

    fn rollback(&mut self) {
        if let Some(snapshot) = self.checkpoint.take() {
            self.state = snapshot;
            self.media
                .retain(|file, _| self.state.images.iter().any(|image| &image.file == file));
        }
    }
}
