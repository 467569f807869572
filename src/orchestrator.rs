//! Runs a whole profile: every page seeder, then the site.
//!
//! ## Run Order
//!
//! ```text
//! load profile ─→ order seeders ─→ ┌─ store transaction ─────────────────────┐
//!                                  │ clear (optional, reverse order, site 1st)│
//!                                  │ generate image manifest                 │
//!                                  │ seed pages (registry grows per seeder)  │
//!                                  │ seed site (final page registry)         │
//!                                  └─ commit, or roll back on any error ─────┘
//! ```
//!
//! Seeders are ordered from what they declare: a seeder that `consumes` a
//! page name runs after the seeder that `produces` it. Seeders with no
//! dependency between them keep the preferred order (config
//! `seeders.order`), and anything not listed there runs alphabetically after.
//!
//! Seeders are always called with `clear = false`. Clearing happens once, up
//! front, for the whole run.

use crate::config::{DEFAULT_PAGE_ORDER, SeedConfig};
use crate::content::{ContentLoader, ProfileData};
use crate::error::{Result, SeedError};
use crate::imaging::{ImageManager, ImageRegistry, ImageSpec, Palette, default_manifest};
use crate::registry::{PageRegistry, SeedContext, Seeder, SeederRegistry, SeederServices};
use crate::site::SiteSeeder;
use crate::store::{self, ContentStore};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// What a run would do, without touching the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedPlan {
    pub profile: String,
    pub content_dir: PathBuf,
    /// Page files of the profile, in preferred order.
    pub pages: Vec<String>,
    /// Seeders in the order they will run.
    pub seeders: Vec<String>,
}

/// Outcome of a committed run.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedResult {
    pub profile: String,
    pub pages: PageRegistry,
    pub images: ImageRegistry,
}

type NamedSeeder = (String, Box<dyn Seeder>);

pub struct SeedOrchestrator {
    registry: SeederRegistry,
    services: SeederServices,
    image_manager: ImageManager,
    image_manifest: Vec<ImageSpec>,
    page_order: Vec<String>,
    site_seeder: SiteSeeder,
}

impl SeedOrchestrator {
    /// Orchestrator with the built-in seeders, the sage-stone manifest and
    /// default site settings.
    pub fn new(content_loader: ContentLoader, image_manager: ImageManager) -> Result<Self> {
        let services = SeederServices {
            content_loader,
            site: Default::default(),
        };
        Ok(Self {
            registry: SeederRegistry::with_builtin()?,
            site_seeder: SiteSeeder::new(services.site.clone(), services.content_loader.clone()),
            services,
            image_manager,
            image_manifest: default_manifest(),
            page_order: DEFAULT_PAGE_ORDER.iter().map(|s| s.to_string()).collect(),
        })
    }

    pub fn from_config(config: &SeedConfig) -> Result<Self> {
        let content_loader = ContentLoader::new(&config.content_dir);
        let image_manager = ImageManager::new(&config.images.prefix)
            .with_palette(Palette::with_colors(&config.images.palette));
        let mut orchestrator = Self::new(content_loader.clone(), image_manager)?
            .with_page_order(config.seeders.order.clone())
            .with_site_seeder(SiteSeeder::new(config.site.clone(), content_loader));
        orchestrator.services.site = config.site.clone();
        Ok(orchestrator)
    }

    pub fn with_registry(mut self, registry: SeederRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_image_manager(mut self, image_manager: ImageManager) -> Self {
        self.image_manager = image_manager;
        self
    }

    /// Images generated before the page seeders run. Empty skips generation.
    pub fn with_image_manifest(mut self, manifest: Vec<ImageSpec>) -> Self {
        self.image_manifest = manifest;
        self
    }

    pub fn with_page_order(mut self, order: Vec<String>) -> Self {
        self.page_order = order;
        self
    }

    pub fn with_site_seeder(mut self, site_seeder: SiteSeeder) -> Self {
        self.site_seeder = site_seeder;
        self
    }

    pub fn list_profiles(&self) -> Result<Vec<String>> {
        self.services.content_loader.list_profiles()
    }

    /// Load `profile` and resolve the run order. Nothing is written.
    pub fn plan(&self, profile: &str) -> Result<SeedPlan> {
        let data = self.services.content_loader.load_profile(profile)?;
        let seeders = self.resolve_seeders()?;
        Ok(SeedPlan {
            profile: profile.to_string(),
            content_dir: self.services.content_loader.content_dir().to_path_buf(),
            pages: order_page_names(data.pages.keys(), &self.page_order),
            seeders: seeders.into_iter().map(|(name, _)| name).collect(),
        })
    }

    /// Seed `profile` into `store` in a single transaction.
    pub fn seed(
        &mut self,
        store: &mut dyn ContentStore,
        profile: &str,
        clear: bool,
    ) -> Result<SeedResult> {
        let data = self.services.content_loader.load_profile(profile)?;
        let mut seeders = self.resolve_seeders()?;
        info!(
            profile,
            seeders = seeders.len(),
            clear,
            "seeding profile"
        );

        let result = store::atomic(store, |store| {
            self.run(store, profile, &data, &mut seeders, clear)
        });
        match &result {
            Ok(result) => info!(
                profile,
                pages = result.pages.len(),
                images = result.images.len(),
                "seeded profile"
            ),
            Err(err) => {
                // Cached records may point at rolled-back images.
                self.image_manager.forget_all();
                warn!(profile, error = %err, "seeding failed, rolled back");
            }
        }
        result
    }

    /// Instantiate every registered seeder and sort them.
    fn resolve_seeders(&self) -> Result<Vec<NamedSeeder>> {
        if self.registry.is_empty() {
            return Err(SeedError::NotFound("No page seeders registered.".to_string()));
        }
        let seeders = self
            .registry
            .all()
            .into_iter()
            .map(|(name, factory)| {
                let seeder = factory(&self.services);
                (name, seeder)
            })
            .collect();
        order_seeders(seeders, &self.page_order)
    }

    fn run(
        &mut self,
        store: &mut dyn ContentStore,
        profile: &str,
        data: &ProfileData,
        seeders: &mut [NamedSeeder],
        clear: bool,
    ) -> Result<SeedResult> {
        if clear {
            self.clear(store, profile, data, seeders)?;
        }

        let images = if self.image_manifest.is_empty() {
            ImageRegistry::new()
        } else {
            self.image_manager
                .generate_manifest(store, &self.image_manifest)?
        };

        let mut pages = PageRegistry::new();
        for (name, seeder) in seeders.iter_mut() {
            let output = {
                let mut ctx = SeedContext {
                    profile,
                    data,
                    page_name: name,
                    pages: &pages,
                    images: &images,
                    store: &mut *store,
                    image_manager: &mut self.image_manager,
                };
                seeder.seed(&mut ctx, false)?
            };
            output.merge_into(name, &mut pages);
            debug!(seeder = %name, pages = pages.len(), "seeder finished");
        }

        self.site_seeder.seed(
            store,
            &mut self.image_manager,
            &data.site,
            &data.navigation,
            Some(&pages),
            false,
        )?;

        Ok(SeedResult {
            profile: profile.to_string(),
            pages,
            images,
        })
    }

    /// Clear the site, then the page seeders from last to first.
    fn clear(
        &mut self,
        store: &mut dyn ContentStore,
        profile: &str,
        data: &ProfileData,
        seeders: &mut [NamedSeeder],
    ) -> Result<()> {
        self.site_seeder.clear(store, &mut self.image_manager)?;
        let pages = PageRegistry::new();
        let images = ImageRegistry::new();
        for (name, seeder) in seeders.iter_mut().rev() {
            let mut ctx = SeedContext {
                profile,
                data,
                page_name: name,
                pages: &pages,
                images: &images,
                store: &mut *store,
                image_manager: &mut self.image_manager,
            };
            seeder.clear(&mut ctx)?;
        }
        info!(profile, seeders = seeders.len(), "cleared previous seed");
        Ok(())
    }
}

// =============================================================================
// Ordering
// =============================================================================

/// Sort key for seeders with no dependency between them: position in
/// `preferred`, then name.
fn rank<'a>(name: &'a str, preferred: &[String]) -> (usize, &'a str) {
    let position = preferred
        .iter()
        .position(|p| p == name)
        .unwrap_or(preferred.len());
    (position, name)
}

/// Topologically sort seeders over `produces`/`consumes`.
///
/// A consumed name no seeder produces is not a dependency; the seeder will
/// look it up in the store instead. A cycle is a registration error.
pub fn order_seeders(seeders: Vec<NamedSeeder>, preferred: &[String]) -> Result<Vec<NamedSeeder>> {
    let declared: Vec<(String, Vec<String>, Vec<String>)> = seeders
        .iter()
        .map(|(name, seeder)| (name.clone(), seeder.produces(), seeder.consumes()))
        .collect();
    let order = dependency_order(&declared, preferred)?;

    let mut slots: Vec<Option<NamedSeeder>> = seeders.into_iter().map(Some).collect();
    Ok(order
        .into_iter()
        .filter_map(|index| slots[index].take())
        .collect())
}

/// Kahn's algorithm over `(name, produces, consumes)`. Returns indexes into
/// `declared`.
fn dependency_order(
    declared: &[(String, Vec<String>, Vec<String>)],
    preferred: &[String],
) -> Result<Vec<usize>> {
    let mut producers: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (index, (_, produces, _)) in declared.iter().enumerate() {
        for name in produces {
            producers.entry(name.as_str()).or_default().push(index);
        }
    }

    let mut dependents: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); declared.len()];
    let mut blockers: Vec<usize> = vec![0; declared.len()];
    for (index, (_, _, consumes)) in declared.iter().enumerate() {
        let mut needs = BTreeSet::new();
        for name in consumes {
            for &producer in producers.get(name.as_str()).into_iter().flatten() {
                if producer != index {
                    needs.insert(producer);
                }
            }
        }
        blockers[index] = needs.len();
        for producer in needs {
            dependents[producer].insert(index);
        }
    }

    let mut ready: BTreeSet<((usize, &str), usize)> = declared
        .iter()
        .enumerate()
        .filter(|(index, _)| blockers[*index] == 0)
        .map(|(index, (name, _, _))| (rank(name, preferred), index))
        .collect();

    let mut order = Vec::with_capacity(declared.len());
    while let Some(next) = ready.pop_first() {
        let index = next.1;
        order.push(index);
        for &dependent in &dependents[index] {
            blockers[dependent] -= 1;
            if blockers[dependent] == 0 {
                ready.insert((rank(&declared[dependent].0, preferred), dependent));
            }
        }
    }

    if order.len() < declared.len() {
        let stuck: Vec<&str> = declared
            .iter()
            .enumerate()
            .filter(|(index, _)| blockers[*index] > 0)
            .map(|(_, (name, _, _))| name.as_str())
            .collect();
        return Err(SeedError::Registration(format!(
            "Seeder dependency cycle between: {}",
            stuck.join(", ")
        )));
    }
    Ok(order)
}

/// Page names in preferred order, then alphabetically.
pub fn order_page_names<'a>(
    pages: impl IntoIterator<Item = &'a String>,
    preferred: &[String],
) -> Vec<String> {
    let mut names: Vec<&String> = pages.into_iter().collect();
    names.sort_by(|a, b| rank(a, preferred).cmp(&rank(b, preferred)));
    names.dedup();
    names.into_iter().cloned().collect()
}
