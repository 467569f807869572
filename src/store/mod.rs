//! The page-tree boundary the seeders write through.
//!
//! Seeders never touch persistence directly. They call the primitives on
//! [`ContentStore`]: add a child page, update and publish, delete a subtree,
//! and upsert images, categories, sites and per-site settings. The store
//! also owns the transaction so a failed run can be undone as a whole.
//!
//! ## Page Tree
//!
//! ```text
//! Root (created on first use, never seeded)
//! └── Home            slug "home"
//!     ├── About       slug "about"
//!     ├── Blog        BlogIndex
//!     │   └── Post    BlogPost
//!     └── Terms       Legal
//! ```
//!
//! Slugs are unique among the children of one parent. Every operation that
//! would break that fails with [`StoreError::SlugTaken`].
//!
//! [`MemoryStore`] is the shipped implementation.

mod memory;

pub use memory::MemoryStore;

use crate::content::Block;
use crate::content::Node;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("page {0} does not exist")]
    MissingPage(PageId),
    #[error("slug '{slug}' is already used under page {parent}")]
    SlugTaken { parent: PageId, slug: String },
    #[error("the root page cannot be modified")]
    RootPage,
    #[error("a transaction is already open")]
    TransactionOpen,
    #[error("no transaction is open")]
    NoTransaction,
    #[error("unsupported store version {0}")]
    Version(u32),
}

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "#{}", self.0)
            }
        }
    };
}

record_id!(
    /// Identifier of a page in the tree.
    PageId
);
record_id!(
    /// Identifier of a stored image.
    ImageId
);
record_id!(CategoryId);
record_id!(SiteId);

/// Page types known to the seeders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageType {
    Root,
    Home,
    Standard,
    Legal,
    BlogIndex,
    BlogPost,
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PageType::Root => "root",
            PageType::Home => "home",
            PageType::Standard => "standard",
            PageType::Legal => "legal",
            PageType::BlogIndex => "blog index",
            PageType::BlogPost => "blog post",
        };
        f.write_str(name)
    }
}

/// Type-specific page data.
///
/// `Legal` pages keep their sections in the page body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageKind {
    Root,
    Home {
        #[serde(default)]
        intro: String,
    },
    Standard,
    Legal {
        #[serde(default)]
        last_updated: Option<NaiveDate>,
    },
    BlogIndex {
        intro: String,
        posts_per_page: u32,
    },
    BlogPost {
        category: CategoryId,
        published_date: DateTime<Utc>,
        featured_image: Option<ImageId>,
        excerpt: String,
        author_name: String,
    },
}

impl PageKind {
    pub fn page_type(&self) -> PageType {
        match self {
            PageKind::Root => PageType::Root,
            PageKind::Home { .. } => PageType::Home,
            PageKind::Standard => PageType::Standard,
            PageKind::Legal { .. } => PageType::Legal,
            PageKind::BlogIndex { .. } => PageType::BlogIndex,
            PageKind::BlogPost { .. } => PageType::BlogPost,
        }
    }
}

/// The seeder-controlled fields of a page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageDraft {
    pub slug: String,
    pub title: String,
    pub seo_title: String,
    pub search_description: String,
    pub show_in_menus: bool,
    pub body: Vec<Block>,
    pub kind: PageKind,
}

impl PageDraft {
    pub fn new(slug: impl Into<String>, title: impl Into<String>, kind: PageKind) -> Self {
        Self {
            slug: slug.into(),
            title: title.into(),
            seo_title: String::new(),
            search_description: String::new(),
            show_in_menus: false,
            body: Vec::new(),
            kind,
        }
    }
}

/// A page as stored in the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub id: PageId,
    pub parent: Option<PageId>,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub seo_title: String,
    #[serde(default)]
    pub search_description: String,
    #[serde(default)]
    pub show_in_menus: bool,
    /// Set by the first publish.
    pub live: bool,
    /// Bumped by every publish.
    pub revision: u32,
    #[serde(default)]
    pub body: Vec<Block>,
    pub kind: PageKind,
}

impl PageRecord {
    pub fn page_type(&self) -> PageType {
        self.kind.page_type()
    }

    /// Overwrite every seeder-controlled field with `draft`.
    pub fn assign(&mut self, draft: PageDraft) {
        self.slug = draft.slug;
        self.title = draft.title;
        self.seo_title = draft.seo_title;
        self.search_description = draft.search_description;
        self.show_in_menus = draft.show_in_menus;
        self.body = draft.body;
        self.kind = draft.kind;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: ImageId,
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// File name under the store's media directory.
    pub file: String,
    /// SHA-256 of the encoded file, hex.
    pub file_hash: String,
}

/// An encoded image about to be stored.
#[derive(Debug, Clone)]
pub struct NewImage {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub file: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteRecord {
    pub id: SiteId,
    pub hostname: String,
    pub port: u16,
    pub site_name: String,
    pub root_page: PageId,
    pub is_default_site: bool,
}

/// Site record fields without an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteDraft {
    pub hostname: String,
    pub port: u16,
    pub site_name: String,
    pub root_page: PageId,
    pub is_default_site: bool,
}

/// Per-site branding settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteSettings {
    /// Branding values keyed by settings field name.
    #[serde(default)]
    pub fields: BTreeMap<String, Node>,
    pub header_logo: Option<ImageId>,
    pub footer_logo: Option<ImageId>,
    pub favicon: Option<ImageId>,
    pub og_default_image: Option<ImageId>,
}

/// Which per-site navigation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationSlot {
    Header,
    Footer,
}

/// Per-site header or footer settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigationSettings {
    #[serde(default)]
    pub fields: BTreeMap<String, Node>,
}

/// Primitives the seeders need from a page-tree backend.
///
/// Lookups return borrowed records; callers clone what they intend to change
/// and hand it back through the `update_*` methods.
pub trait ContentStore {
    // --- pages ---

    /// The tree root, created on first use.
    fn root_page(&mut self) -> Result<PageId, StoreError>;
    fn page(&self, id: PageId) -> Option<&PageRecord>;
    /// Direct children of `parent`, in creation order.
    fn children(&self, parent: PageId) -> Vec<&PageRecord>;
    /// All pages of one type, in creation order.
    fn pages_of_type(&self, page_type: PageType) -> Vec<&PageRecord>;
    /// Create a draft page under `parent`. It is not live until published.
    fn add_child(&mut self, parent: PageId, draft: PageDraft) -> Result<PageId, StoreError>;
    /// Replace a stored page's fields. The parent cannot change.
    fn update_page(&mut self, page: PageRecord) -> Result<(), StoreError>;
    /// Make the current fields live and bump the revision.
    fn publish_page(&mut self, id: PageId) -> Result<(), StoreError>;
    /// Delete a page and all its descendants. Returns how many were removed.
    fn delete_page(&mut self, id: PageId) -> Result<usize, StoreError>;

    // --- images ---

    fn image_by_title(&self, title: &str) -> Option<&ImageRecord>;
    fn images(&self) -> Vec<&ImageRecord>;
    fn insert_image(&mut self, image: NewImage) -> Result<ImageRecord, StoreError>;
    /// Delete every image whose title starts with `prefix`.
    fn delete_images_with_prefix(&mut self, prefix: &str) -> Result<usize, StoreError>;

    // --- blog categories ---

    fn category(&self, slug: &str) -> Option<&Category>;
    fn categories(&self) -> Vec<&Category>;
    /// Create or update the category with this slug.
    fn save_category(
        &mut self,
        slug: &str,
        name: &str,
        description: &str,
    ) -> Result<CategoryId, StoreError>;
    fn delete_category(&mut self, slug: &str) -> Result<bool, StoreError>;

    // --- sites and settings ---

    fn sites(&self) -> Vec<&SiteRecord>;
    fn insert_site(&mut self, site: SiteDraft) -> Result<SiteId, StoreError>;
    fn update_site(&mut self, site: SiteRecord) -> Result<(), StoreError>;
    fn site_settings(&self, site: SiteId) -> Option<&SiteSettings>;
    fn save_site_settings(&mut self, site: SiteId, settings: SiteSettings)
    -> Result<(), StoreError>;
    fn navigation(&self, site: SiteId, slot: NavigationSlot) -> Option<&NavigationSettings>;
    fn save_navigation(
        &mut self,
        site: SiteId,
        slot: NavigationSlot,
        settings: NavigationSettings,
    ) -> Result<(), StoreError>;
    /// Remove branding, header and footer settings of a site. Returns how
    /// many records were removed.
    fn delete_site_settings(&mut self, site: SiteId) -> Result<usize, StoreError>;

    // --- transactions ---

    fn begin(&mut self) -> Result<(), StoreError>;
    /// Make the transaction durable. A failed commit rolls back and closes
    /// the transaction.
    fn commit(&mut self) -> Result<(), StoreError>;
    /// Discard everything since `begin`. A no-op outside a transaction.
    fn rollback(&mut self);

    // --- derived lookups ---

    fn find_child(&self, parent: PageId, slug: &str) -> Option<&PageRecord> {
        self.children(parent).into_iter().find(|page| page.slug == slug)
    }

    fn site_by_host(&self, hostname: &str, port: u16) -> Option<&SiteRecord> {
        self.sites()
            .into_iter()
            .find(|site| site.hostname == hostname && site.port == port)
    }

    /// `id` and every page below it, depth first.
    fn descendants(&self, id: PageId) -> Vec<&PageRecord> {
        let mut found = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            for child in self.children(current).into_iter().rev() {
                stack.push(child.id);
            }
            if let Some(page) = self.page(current) {
                found.push(page);
            }
        }
        found
    }

    /// The site whose root page is `id` or one of its ancestors.
    fn site_for_page(&self, id: PageId) -> Option<&SiteRecord> {
        let mut current = self.page(id);
        while let Some(page) = current {
            if let Some(site) = self.sites().into_iter().find(|s| s.root_page == page.id) {
                return Some(site);
            }
            current = page.parent.and_then(|parent| self.page(parent));
        }
        None
    }
}

/// Run `f` inside a store transaction: commit on success, roll back on any
/// error, including a failed commit.
pub fn atomic<T, E>(
    store: &mut dyn ContentStore,
    f: impl FnOnce(&mut dyn ContentStore) -> Result<T, E>,
) -> Result<T, E>
where
    E: From<StoreError>,
{
    store.begin()?;
    match f(&mut *store) {
        Ok(value) => match store.commit() {
            Ok(()) => Ok(value),
            Err(err) => {
                store.rollback();
                Err(err.into())
            }
        },
        Err(err) => {
            store.rollback();
            Err(err)
        }
    }
}
