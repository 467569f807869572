//! Site record, branding settings and navigation.
//!
//! Runs once per seeding run, after every page exists. `site.yaml` groups
//! its values into sections; the seeder flattens them into one namespace
//! and renames the short aliases:
//!
//! ```yaml
//! brand:
//!   company_name: Sage & Stone   # → company_name
//! contact:
//!   phone: 01432 000000          # → phone_number
//! colors:
//!   primary: "#1A2F23"           # → primary_color
//! social:
//!   x: https://x.com/sage        # → twitter_url
//! ```
//!
//! ## What gets written
//!
//! | Record                | Source                                               |
//! |-----------------------|------------------------------------------------------|
//! | site `(host, port)`   | config, site name, root page                         |
//! | branding settings     | flattened values on the [`SETTINGS_FIELDS`] list     |
//! | logos and favicon     | `LOGO` 300×80, `FAVICON` 64×64 in the brand colors   |
//! | OpenGraph image       | the run's `HERO_IMAGE`, else a new 1920×1080 one     |
//! | header / footer       | [`HEADER_FIELDS`] / [`FOOTER_FIELDS`] of navigation  |
//!
//! Keys outside the allow-lists are ignored. Page links (`link_type: page`)
//! and the page reference settings resolve slugs through the run's page
//! registry; an unknown slug fails the run.

use crate::config::SiteConfig;
use crate::content::{ContentLoader, Node, PageRef};
use crate::error::{Result, SeedError};
use crate::imaging::{ImageManager, ImageOptions};
use crate::pages::section;
use crate::registry::PageRegistry;
use crate::store::{ContentStore, NavigationSlot, PageId, SiteDraft, SiteId};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// `site.yaml` sections whose keys are flattened.
pub const SITE_SECTIONS: &[&str] = &[
    "brand",
    "contact",
    "colors",
    "typography",
    "social",
    "analytics",
    "cookies",
];

/// Short content names → settings field names.
pub const FIELD_ALIASES: &[(&str, &str)] = &[
    ("phone", "phone_number"),
    ("instagram", "instagram_url"),
    ("facebook", "facebook_url"),
    ("linkedin", "linkedin_url"),
    ("twitter", "twitter_url"),
    ("x", "twitter_url"),
    ("youtube", "youtube_url"),
    ("tiktok", "tiktok_url"),
    ("primary", "primary_color"),
    ("secondary", "secondary_color"),
    ("accent", "accent_color"),
    ("background", "background_color"),
    ("text", "text_color"),
    ("surface", "surface_color"),
    ("surface_elevated", "surface_elevated_color"),
    ("text_light", "text_light_color"),
];

/// Branding settings fields.
pub const SETTINGS_FIELDS: &[&str] = &[
    "company_name",
    "established_year",
    "tagline",
    "phone_number",
    "email",
    "address",
    "business_hours",
    "primary_color",
    "secondary_color",
    "accent_color",
    "background_color",
    "text_color",
    "surface_color",
    "surface_elevated_color",
    "text_light_color",
    "heading_font",
    "body_font",
    "instagram_url",
    "facebook_url",
    "linkedin_url",
    "twitter_url",
    "youtube_url",
    "tiktok_url",
    "gtm_container_id",
    "ga_measurement_id",
    "cookie_banner_enabled",
    "cookie_consent_version",
    "robots_txt",
    "privacy_policy_page",
    "cookie_policy_page",
    "terms_page",
];

/// Settings fields holding a page slug or id.
pub const PAGE_REFERENCE_FIELDS: &[&str] =
    &["privacy_policy_page", "cookie_policy_page", "terms_page"];

pub const HEADER_FIELDS: &[&str] = &[
    "menu_items",
    "show_phone_in_header",
    "header_cta_enabled",
    "header_cta_text",
    "header_cta_link",
    "mobile_cta_enabled",
    "mobile_cta_phone_enabled",
    "mobile_cta_button_enabled",
    "mobile_cta_button_text",
    "mobile_cta_button_link",
];

pub const FOOTER_FIELDS: &[&str] = &[
    "tagline",
    "link_sections",
    "auto_service_areas",
    "social_facebook",
    "social_instagram",
    "social_linkedin",
    "social_youtube",
    "social_x",
    "copyright_text",
];

const DEFAULT_SITE_NAME: &str = "Site";
const DEFAULT_FAVICON_LABEL: &str = "S";

/// Flattened, alias-resolved site values.
pub type SiteValues = BTreeMap<String, Value>;

fn alias(key: &str) -> &str {
    FIELD_ALIASES
        .iter()
        .find(|(from, _)| *from == key)
        .map(|(_, to)| *to)
        .unwrap_or(key)
}

/// Flatten the known sections of `site.yaml` and apply [`FIELD_ALIASES`].
///
/// Top-level keys that are not a section mapping are kept as they are.
pub fn normalize_site(site: &Mapping) -> Result<SiteValues> {
    let mut values = SiteValues::new();
    for (key, value) in site {
        let key = key
            .as_str()
            .ok_or_else(|| SeedError::Content("Site content keys must be strings".to_string()))?;
        match value {
            Value::Mapping(inner) if SITE_SECTIONS.contains(&key) => {
                for (inner_key, inner_value) in inner {
                    let inner_key = inner_key.as_str().ok_or_else(|| {
                        SeedError::Content(format!("Keys in site section '{key}' must be strings"))
                    })?;
                    values.insert(alias(inner_key).to_string(), inner_value.clone());
                }
            }
            _ => {
                values.insert(alias(key).to_string(), value.clone());
            }
        }
    }
    Ok(values)
}

/// `site_name`, else `company_name`, from a profile's `site.yaml`.
pub fn profile_site_name(site: &Mapping) -> Option<String> {
    let values = normalize_site(site).ok()?;
    non_empty(values.get("site_name")).or_else(|| non_empty(values.get("company_name")))
}

fn non_empty(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn favicon_label(company_name: Option<&str>) -> String {
    company_name
        .and_then(|name| name.trim().chars().next())
        .map(|first| first.to_uppercase().collect())
        .unwrap_or_else(|| DEFAULT_FAVICON_LABEL.to_string())
}

/// Seeds one site: its record, branding settings and navigation.
#[derive(Debug, Clone)]
pub struct SiteSeeder {
    config: SiteConfig,
    content_loader: ContentLoader,
    root_page: Option<PageId>,
    pages: PageRegistry,
}

impl SiteSeeder {
    pub fn new(config: SiteConfig, content_loader: ContentLoader) -> Self {
        Self {
            config,
            content_loader,
            root_page: None,
            pages: PageRegistry::new(),
        }
    }

    /// Root page for the site record, instead of the run's home page.
    pub fn with_root_page(mut self, root_page: PageId) -> Self {
        self.root_page = Some(root_page);
        self
    }

    /// Pages used when a seed call passes none.
    pub fn with_pages(mut self, pages: PageRegistry) -> Self {
        self.pages = pages;
        self
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Load `profile` and seed from its site and navigation files.
    pub fn seed_profile(
        &self,
        store: &mut dyn ContentStore,
        image_manager: &mut ImageManager,
        profile: &str,
        pages: Option<&PageRegistry>,
        clear: bool,
    ) -> Result<SiteId> {
        let data = self.content_loader.load_profile(profile)?;
        self.seed(store, image_manager, &data.site, &data.navigation, pages, clear)
    }

    pub fn seed(
        &self,
        store: &mut dyn ContentStore,
        image_manager: &mut ImageManager,
        site: &Mapping,
        navigation: &Mapping,
        pages: Option<&PageRegistry>,
        clear: bool,
    ) -> Result<SiteId> {
        let pages = pages.unwrap_or(&self.pages);
        let values = normalize_site(site)?;
        let fields = branding_fields(&values, pages)?;
        let header = navigation_fields(section(navigation, "header")?, HEADER_FIELDS, pages)?;
        let footer = navigation_fields(section(navigation, "footer")?, FOOTER_FIELDS, pages)?;
        let root_page = self.resolve_root_page(&*store, pages)?;

        if clear {
            self.clear(store, image_manager)?;
        }

        let site_id = self.ensure_site(store, &values, root_page)?;
        self.configure_branding(store, image_manager, site_id, &values, fields)?;
        for (slot, fields) in [(NavigationSlot::Header, header), (NavigationSlot::Footer, footer)] {
            configure_navigation(store, image_manager, site_id, slot, fields)?;
        }

        info!(
            site = site_id.0,
            hostname = %self.config.hostname,
            port = self.config.port,
            "seeded site"
        );
        Ok(site_id)
    }

    /// Delete this site's settings and every image with the manager's
    /// prefix. Pages are left alone.
    pub fn clear(
        &self,
        store: &mut dyn ContentStore,
        image_manager: &mut ImageManager,
    ) -> Result<()> {
        let site = store
            .site_by_host(&self.config.hostname, self.config.port)
            .map(|site| site.id);
        if let Some(site) = site {
            let removed = store.delete_site_settings(site)?;
            debug!(site = site.0, removed, "cleared site settings");
        }
        let images = store.delete_images_with_prefix(&format!("{}_", image_manager.prefix()))?;
        image_manager.forget_all();
        info!(images, "cleared site");
        Ok(())
    }

    fn resolve_root_page(&self, store: &dyn ContentStore, pages: &PageRegistry) -> Result<PageId> {
        let root = self
            .root_page
            .or_else(|| pages.get("home").copied())
            .ok_or_else(|| {
                SeedError::Page("Root page is required for site seeding.".to_string())
            })?;
        if store.page(root).is_none() {
            return Err(SeedError::Page(format!("Root page {root} does not exist")));
        }
        Ok(root)
    }

    fn site_name(&self, values: &SiteValues) -> String {
        self.config
            .site_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .or_else(|| non_empty(values.get("site_name")))
            .or_else(|| non_empty(values.get("company_name")))
            .unwrap_or_else(|| DEFAULT_SITE_NAME.to_string())
    }

    /// Upsert the site record for the configured host and port.
    fn ensure_site(
        &self,
        store: &mut dyn ContentStore,
        values: &SiteValues,
        root_page: PageId,
    ) -> Result<SiteId> {
        let site_name = self.site_name(values);
        let existing = store
            .site_by_host(&self.config.hostname, self.config.port)
            .cloned();
        match existing {
            Some(mut site) => {
                site.site_name = site_name;
                site.root_page = root_page;
                site.is_default_site = self.config.is_default_site;
                let id = site.id;
                store.update_site(site)?;
                Ok(id)
            }
            None => Ok(store.insert_site(SiteDraft {
                hostname: self.config.hostname.clone(),
                port: self.config.port,
                site_name,
                root_page,
                is_default_site: self.config.is_default_site,
            })?),
        }
    }

    fn configure_branding(
        &self,
        store: &mut dyn ContentStore,
        image_manager: &mut ImageManager,
        site: SiteId,
        values: &SiteValues,
        fields: BTreeMap<String, Node>,
    ) -> Result<()> {
        let company_name = non_empty(values.get("company_name"));
        let colors = ImageOptions {
            bg: non_empty(values.get("primary_color")),
            text: non_empty(values.get("text_light_color")),
            label: None,
        };

        let logo = image_manager.generate(
            store,
            "LOGO",
            300,
            80,
            &ImageOptions {
                label: company_name.clone(),
                ..colors.clone()
            },
        )?;
        let favicon = image_manager.generate(
            store,
            "FAVICON",
            64,
            64,
            &ImageOptions {
                label: Some(favicon_label(company_name.as_deref())),
                ..colors
            },
        )?;
        let og_image = match image_manager.get("HERO_IMAGE").cloned() {
            Some(hero) => hero,
            None => image_manager.generate(
                store,
                "HERO_IMAGE",
                1920,
                1080,
                &ImageOptions {
                    label: company_name,
                    ..ImageOptions::default()
                },
            )?,
        };

        let mut settings = store.site_settings(site).cloned().unwrap_or_default();
        settings.fields.extend(fields);
        settings.header_logo = Some(logo.id);
        settings.footer_logo = Some(logo.id);
        settings.favicon = Some(favicon.id);
        settings.og_default_image = Some(og_image.id);
        store.save_site_settings(site, settings)?;
        Ok(())
    }
}

/// Settings-field values, with page references resolved.
fn branding_fields(values: &SiteValues, pages: &PageRegistry) -> Result<BTreeMap<String, Node>> {
    let mut fields = BTreeMap::new();
    for (key, value) in values {
        if !SETTINGS_FIELDS.contains(&key.as_str()) {
            continue;
        }
        let node = if PAGE_REFERENCE_FIELDS.contains(&key.as_str()) {
            page_setting(value, pages)?
        } else {
            Node::from_yaml(value)?
        };
        fields.insert(key.clone(), node);
    }
    Ok(fields)
}

fn invalid_page_reference() -> SeedError {
    SeedError::Content("Page reference must be a slug or page id.".to_string())
}

fn page_setting(value: &Value, pages: &PageRegistry) -> Result<Node> {
    match value {
        Value::Null => Ok(Node::Null),
        Value::String(slug) => pages
            .get(slug.as_str())
            .map(|id| Node::Page(PageRef::Id(*id)))
            .ok_or_else(|| SeedError::Content(format!("Page not found for slug: {slug}"))),
        Value::Number(n) => n
            .as_u64()
            .map(|id| Node::Page(PageRef::Id(PageId(id))))
            .ok_or_else(invalid_page_reference),
        _ => Err(invalid_page_reference()),
    }
}

/// Allow-listed navigation fields with page links resolved. Image keys are
/// resolved later, once the run's images are final.
fn navigation_fields(
    data: &Mapping,
    allowed: &[&str],
    pages: &PageRegistry,
) -> Result<BTreeMap<String, Node>> {
    let mut fields = BTreeMap::new();
    for field in allowed {
        if let Some(value) = data.get(*field) {
            let mut node = Node::from_yaml(value)?;
            node.resolve_pages(pages)?;
            fields.insert(field.to_string(), node);
        }
    }
    Ok(fields)
}

fn configure_navigation(
    store: &mut dyn ContentStore,
    image_manager: &ImageManager,
    site: SiteId,
    slot: NavigationSlot,
    mut fields: BTreeMap<String, Node>,
) -> Result<()> {
    for node in fields.values_mut() {
        node.resolve_images(image_manager.cached())?;
    }
    let mut settings = store.navigation(site, slot).cloned().unwrap_or_default();
    let count = fields.len();
    settings.fields.extend(fields);
    store.save_navigation(site, slot, settings)?;
    debug!(site = site.0, ?slot, fields = count, "saved navigation");
    Ok(())
}
