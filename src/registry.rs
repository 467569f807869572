//! Seeders and the registry that names them.
//!
//! A [`Seeder`] owns one slice of a profile: the home page, the blog, the
//! site record. The orchestrator builds a fresh [`SeedContext`] for every
//! seeder and merges what it returns ([`SeedOutput`]) into the run's
//! [`PageRegistry`], so later seeders can link to earlier pages.
//!
//! Seeders are created through a [`SeederRegistry`], an explicit object that
//! maps names to factories. There is no global registration: callers build a
//! registry (usually [`SeederRegistry::with_builtin`]) and hand it to the
//! orchestrator.
//!
//! ## Ordering
//!
//! `produces()` names what a seeder adds to the page registry and
//! `consumes()` what it needs from it. The orchestrator sorts seeders so every
//! producer runs before its consumers.

use crate::config::SiteConfig;
use crate::content::{ContentLoader, ProfileData};
use crate::error::{Result, SeedError};
use crate::imaging::{ImageManager, ImageRegistry};
use crate::pages::{BlogSeeder, HomePageSeeder, LegalPageSeeder, StandardPageSeeder};
use crate::store::{ContentStore, PageId};
use serde_yaml::Mapping;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Page name or slug → page id, accumulated over one run.
pub type PageRegistry = BTreeMap<String, PageId>;

/// Everything a seeder may read or write during one step.
pub struct SeedContext<'a> {
    pub profile: &'a str,
    pub data: &'a ProfileData,
    /// Registry name of the seeder being run.
    pub page_name: &'a str,
    /// Pages produced by earlier seeders.
    pub pages: &'a PageRegistry,
    /// Images generated for this run.
    pub images: &'a ImageRegistry,
    pub store: &'a mut dyn ContentStore,
    pub image_manager: &'a mut ImageManager,
}

impl SeedContext<'_> {
    pub fn site(&self) -> &Mapping {
        &self.data.site
    }

    pub fn navigation(&self) -> &Mapping {
        &self.data.navigation
    }

    pub fn pages_data(&self) -> &BTreeMap<String, Mapping> {
        &self.data.pages
    }

    /// Content of the page this seeder is named after, if the profile has it.
    pub fn page_data(&self) -> Option<&Mapping> {
        self.data.page(self.page_name)
    }
}

/// What a seeder hands back to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SeedOutput {
    #[default]
    Nothing,
    /// One page, registered under the seeder's name.
    Page(PageId),
    /// Several pages under their own names.
    Pages(PageRegistry),
}

impl SeedOutput {
    /// A page registered under both `name` and `slug`.
    pub fn named(name: &str, slug: &str, id: PageId) -> Self {
        let mut pages = PageRegistry::new();
        pages.insert(name.to_string(), id);
        pages.insert(slug.to_string(), id);
        SeedOutput::Pages(pages)
    }

    pub fn merge_into(&self, name: &str, pages: &mut PageRegistry) {
        match self {
            SeedOutput::Nothing => {}
            SeedOutput::Page(id) => {
                pages.insert(name.to_string(), *id);
            }
            SeedOutput::Pages(produced) => {
                pages.extend(produced.iter().map(|(k, v)| (k.clone(), *v)));
            }
        }
    }
}

pub trait Seeder {
    /// Create or update this seeder's content. With `clear`, the seeder
    /// first removes what a previous run created.
    fn seed(&mut self, ctx: &mut SeedContext<'_>, clear: bool) -> Result<SeedOutput>;

    /// Remove what this seeder creates. Slugs come from the current content.
    fn clear(&mut self, ctx: &mut SeedContext<'_>) -> Result<()>;

    /// Page registry names this seeder adds.
    fn produces(&self) -> Vec<String> {
        Vec::new()
    }

    /// Page registry names this seeder needs.
    fn consumes(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Shared services handed to every seeder factory.
#[derive(Debug, Clone, Default)]
pub struct SeederServices {
    pub content_loader: ContentLoader,
    pub site: SiteConfig,
}

pub type SeederFactory = Arc<dyn Fn(&SeederServices) -> Box<dyn Seeder>>;

#[derive(Clone, Default)]
pub struct SeederRegistry {
    factories: BTreeMap<String, SeederFactory>,
}

impl fmt::Debug for SeederRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.factories.keys()).finish()
    }
}

impl SeederRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in page seeders.
    pub fn with_builtin() -> Result<Self> {
        let mut registry = Self::new();
        registry.register("home", |_| Box::new(HomePageSeeder::new()))?;
        registry.register("about", |_| Box::new(StandardPageSeeder::about()))?;
        registry.register("services", |_| Box::new(StandardPageSeeder::services()))?;
        registry.register("portfolio", |_| Box::new(StandardPageSeeder::portfolio()))?;
        registry.register("contact", |_| Box::new(StandardPageSeeder::contact()))?;
        registry.register("blog", |services| {
            Box::new(BlogSeeder::new().with_site_name(services.site.site_name.clone()))
        })?;
        registry.register("legal", |_| Box::new(LegalPageSeeder::new()))?;
        Ok(registry)
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn(&SeederServices) -> Box<dyn Seeder> + 'static,
    ) -> Result<()> {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(SeedError::Registration(format!(
                "Seeder already registered: {name}"
            )));
        }
        self.factories.insert(name, Arc::new(factory));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<SeederFactory> {
        self.factories
            .get(name)
            .cloned()
            .ok_or_else(|| SeedError::NotFound(format!("No seeder registered for: {name}")))
    }

    /// Copy of every registration.
    pub fn all(&self) -> BTreeMap<String, SeederFactory> {
        self.factories.clone()
    }

    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
