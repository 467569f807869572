//! Content profile loading.
//!
//! A profile is a directory of YAML files describing one site:
//!
//! ```text
//! content/
//! └── sage-stone/
//!     ├── site.yaml          # brand, contact, colors, typography, social, ...
//!     ├── navigation.yaml    # header and footer menus
//!     └── pages/
//!         ├── home.yaml      # page name = file stem
//!         ├── about.yaml
//!         └── blog.yml       # .yml works too
//! ```
//!
//! [`ContentLoader::load_profile`] reads all of it, checks its shape, and runs
//! `${path}` interpolation ([`interpolate`]) so the seeders only ever see final
//! values. The result is an immutable [`ProfileData`].
//!
//! ## Validation
//!
//! | Problem                                      | Error            |
//! |----------------------------------------------|------------------|
//! | profile dir, site/navigation file or `pages/` missing | `ContentProfile` |
//! | two page files with the same stem            | `ContentProfile` |
//! | YAML syntax error, non-mapping root          | `ContentSchema`  |
//! | empty site or navigation                     | `ContentSchema`  |
//! | page without a string `slug` and `title`     | `ContentSchema`  |
//! | unresolvable `${path}`                       | `ContentSchema`  |

pub mod interpolate;
mod tree;

pub use tree::{
    Block, IMAGE_FIELDS, ImageRef, ImageResolver, Node, NodeVisitorMut, PageRef, PageResolver,
    resolve_block_images,
};

use crate::error::{Result, SeedError};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// One loaded, validated and interpolated profile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileData {
    pub site: Mapping,
    pub navigation: Mapping,
    /// Page name (file stem) → page mapping.
    pub pages: BTreeMap<String, Mapping>,
}

impl ProfileData {
    pub fn page(&self, name: &str) -> Option<&Mapping> {
        self.pages.get(name)
    }
}

/// Reads profiles from a content root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLoader {
    content_dir: PathBuf,
}

impl Default for ContentLoader {
    fn default() -> Self {
        Self::new("content")
    }
}

impl ContentLoader {
    pub fn new(content_dir: impl Into<PathBuf>) -> Self {
        Self {
            content_dir: content_dir.into(),
        }
    }

    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }

    /// Profile names: immediate, non-hidden subdirectories, sorted.
    pub fn list_profiles(&self) -> Result<Vec<String>> {
        if !self.content_dir.exists() {
            return Ok(Vec::new());
        }
        if !self.content_dir.is_dir() {
            return Err(SeedError::ContentProfile(format!(
                "Content path is not a directory: {}",
                self.content_dir.display()
            )));
        }
        let mut profiles = Vec::new();
        for entry in WalkDir::new(&self.content_dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|err| SeedError::ContentProfile(err.to_string()))?;
            let name = entry.file_name().to_string_lossy();
            if entry.file_type().is_dir() && !name.starts_with('.') {
                profiles.push(name.into_owned());
            }
        }
        profiles.sort();
        Ok(profiles)
    }

    pub fn load_profile(&self, profile: &str) -> Result<ProfileData> {
        let profile_dir = self.content_dir.join(profile);
        if !profile_dir.is_dir() {
            return Err(SeedError::ContentProfile(format!(
                "Content profile not found: {}",
                profile_dir.display()
            )));
        }

        let site = load_yaml(&profile_dir.join("site.yaml"))?;
        let navigation = load_yaml(&profile_dir.join("navigation.yaml"))?;
        let pages = load_pages(&profile_dir.join("pages"))?;

        if site.is_empty() {
            return Err(SeedError::ContentSchema(
                "Site content cannot be empty".to_string(),
            ));
        }
        if navigation.is_empty() {
            return Err(SeedError::ContentSchema(
                "Navigation content cannot be empty".to_string(),
            ));
        }
        for (name, page) in &pages {
            validate_page(name, page)?;
        }

        let context = interpolate::build_context(&site, &navigation, &pages);
        let data = ProfileData {
            site: interpolate::interpolate_mapping(&site, &context)?,
            navigation: interpolate::interpolate_mapping(&navigation, &context)?,
            pages: pages
                .iter()
                .map(|(name, page)| {
                    Ok((name.clone(), interpolate::interpolate_mapping(page, &context)?))
                })
                .collect::<Result<_>>()?,
        };
        debug!(profile, pages = data.pages.len(), "loaded content profile");
        Ok(data)
    }
}

fn validate_page(name: &str, page: &Mapping) -> Result<()> {
    let non_empty = |key: &str| {
        page.get(key)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.is_empty())
    };
    if !non_empty("slug") || !non_empty("title") {
        return Err(SeedError::ContentSchema(format!(
            "Page '{name}' missing valid slug/title"
        )));
    }
    Ok(())
}

/// Page files keyed by stem. `.yaml` files are read before `.yml`.
fn load_pages(pages_dir: &Path) -> Result<BTreeMap<String, Mapping>> {
    if !pages_dir.is_dir() {
        return Err(SeedError::ContentProfile(format!(
            "Pages directory missing: {}",
            pages_dir.display()
        )));
    }
    let mut files: Vec<PathBuf> = Vec::new();
    for extension in ["yaml", "yml"] {
        let mut found: Vec<PathBuf> = WalkDir::new(pages_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| path.extension().is_some_and(|ext| ext == extension))
            .collect();
        files.append(&mut found);
    }

    let mut pages = BTreeMap::new();
    let mut sources: BTreeMap<String, PathBuf> = BTreeMap::new();
    for file in files {
        let Some(stem) = file.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };
        if let Some(first) = sources.get(&stem) {
            return Err(SeedError::ContentProfile(format!(
                "Duplicate page definition for '{stem}': {} and {}",
                first.display(),
                file.display()
            )));
        }
        pages.insert(stem.clone(), load_yaml(&file)?);
        sources.insert(stem, file);
    }
    Ok(pages)
}

/// Read a YAML file whose root must be a mapping. An empty file is `{}`.
fn load_yaml(path: &Path) -> Result<Mapping> {
    if !path.is_file() {
        return Err(SeedError::ContentProfile(format!(
            "Required content file missing: {}",
            path.display()
        )));
    }
    let text = fs::read_to_string(path)?;
    let value: Value = serde_yaml::from_str(&text).map_err(|err| {
        SeedError::ContentSchema(format!("Invalid YAML in {}: {err}", path.display()))
    })?;
    match value {
        Value::Null => Ok(Mapping::new()),
        Value::Mapping(map) => Ok(map),
        _ => Err(SeedError::ContentSchema(format!(
            "YAML root must be a mapping in {}",
            path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::write_profile;
    use tempfile::TempDir;

    const SITE: &str = "brand:\n  company_name: Sage & Stone\n";
    const NAV: &str = "header:\n  menu_items: []\n";

    #[test]
    fn list_profiles_skips_hidden_and_files() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("zeta")).unwrap();
        fs::create_dir_all(tmp.path().join("alpha")).unwrap();
        fs::create_dir_all(tmp.path().join(".git")).unwrap();
        fs::write(tmp.path().join("README.md"), "x").unwrap();

        let loader = ContentLoader::new(tmp.path());
        assert_eq!(loader.list_profiles().unwrap(), vec!["alpha", "zeta"]);
    }

    #[test]
    fn list_profiles_missing_root_is_empty() {
        let tmp = TempDir::new().unwrap();
        let loader = ContentLoader::new(tmp.path().join("nope"));
        assert!(loader.list_profiles().unwrap().is_empty());
    }

    #[test]
    fn list_profiles_file_root_is_error() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("content");
        fs::write(&file, "").unwrap();
        let err = ContentLoader::new(file).list_profiles().unwrap_err();
        assert!(matches!(err, SeedError::ContentProfile(_)));
    }

    #[test]
    fn load_profile_reads_all_files() {
        let tmp = TempDir::new().unwrap();
        write_profile(
            tmp.path(),
            "demo",
            SITE,
            NAV,
            &[
                ("home.yaml", "slug: home\ntitle: Home\n"),
                ("about.yml", "slug: about\ntitle: About ${brand.company_name}\n"),
            ],
        );

        let data = ContentLoader::new(tmp.path()).load_profile("demo").unwrap();
        assert_eq!(data.pages.len(), 2);
        assert_eq!(
            data.page("about").unwrap().get("title").and_then(Value::as_str),
            Some("About Sage & Stone")
        );
    }

    #[test]
    fn missing_profile_is_profile_error() {
        let tmp = TempDir::new().unwrap();
        let err = ContentLoader::new(tmp.path()).load_profile("ghost").unwrap_err();
        assert!(matches!(err, SeedError::ContentProfile(_)));
    }

    #[test]
    fn missing_navigation_is_profile_error() {
        let tmp = TempDir::new().unwrap();
        write_profile(tmp.path(), "demo", SITE, NAV, &[]);
        fs::remove_file(tmp.path().join("demo/navigation.yaml")).unwrap();

        let err = ContentLoader::new(tmp.path()).load_profile("demo").unwrap_err();
        assert!(err.to_string().contains("Required content file missing"));
    }

    #[test]
    fn missing_pages_dir_is_profile_error() {
        let tmp = TempDir::new().unwrap();
        write_profile(tmp.path(), "demo", SITE, NAV, &[]);
        fs::remove_dir(tmp.path().join("demo/pages")).unwrap();

        let err = ContentLoader::new(tmp.path()).load_profile("demo").unwrap_err();
        assert!(err.to_string().contains("Pages directory missing"));
    }

    #[test]
    fn duplicate_stems_are_rejected() {
        let tmp = TempDir::new().unwrap();
        write_profile(
            tmp.path(),
            "demo",
            SITE,
            NAV,
            &[
                ("about.yaml", "slug: about\ntitle: About\n"),
                ("about.yml", "slug: about\ntitle: About\n"),
            ],
        );

        let err = ContentLoader::new(tmp.path()).load_profile("demo").unwrap_err();
        assert!(matches!(err, SeedError::ContentProfile(_)));
        assert!(err.to_string().contains("Duplicate page definition for 'about'"));
    }

    #[test]
    fn empty_site_is_schema_error() {
        let tmp = TempDir::new().unwrap();
        write_profile(tmp.path(), "demo", "", NAV, &[]);

        let err = ContentLoader::new(tmp.path()).load_profile("demo").unwrap_err();
        assert_eq!(err.to_string(), "Content schema error: Site content cannot be empty");
    }

    #[test]
    fn non_mapping_root_is_schema_error() {
        let tmp = TempDir::new().unwrap();
        write_profile(tmp.path(), "demo", "- a\n- b\n", NAV, &[]);

        let err = ContentLoader::new(tmp.path()).load_profile("demo").unwrap_err();
        assert!(err.to_string().contains("YAML root must be a mapping"));
    }

    #[test]
    fn invalid_yaml_is_schema_error() {
        let tmp = TempDir::new().unwrap();
        write_profile(tmp.path(), "demo", "brand: [unclosed\n", NAV, &[]);

        let err = ContentLoader::new(tmp.path()).load_profile("demo").unwrap_err();
        assert!(matches!(err, SeedError::ContentSchema(_)));
    }

    #[test]
    fn page_without_slug_is_schema_error() {
        let tmp = TempDir::new().unwrap();
        write_profile(tmp.path(), "demo", SITE, NAV, &[("about.yaml", "title: About\n")]);

        let err = ContentLoader::new(tmp.path()).load_profile("demo").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Content schema error: Page 'about' missing valid slug/title"
        );
    }

    #[test]
    fn only_empty_slug_and_title_are_rejected() {
        let tmp = TempDir::new().unwrap();
        write_profile(
            tmp.path(),
            "demo",
            SITE,
            NAV,
            &[("about.yaml", "slug: ' '\ntitle: ' '\n")],
        );
        let data = ContentLoader::new(tmp.path()).load_profile("demo").unwrap();
        assert_eq!(data.pages["about"]["slug"], Value::from(" "));

        write_profile(tmp.path(), "empty", SITE, NAV, &[("about.yaml", "slug: ''\ntitle: About\n")]);
        let err = ContentLoader::new(tmp.path()).load_profile("empty").unwrap_err();
        assert!(matches!(err, SeedError::ContentSchema(_)));
    }

    #[test]
    fn empty_page_file_is_schema_error() {
        let tmp = TempDir::new().unwrap();
        write_profile(tmp.path(), "demo", SITE, NAV, &[("about.yaml", "")]);

        let err = ContentLoader::new(tmp.path()).load_profile("demo").unwrap_err();
        assert!(matches!(err, SeedError::ContentSchema(_)));
    }

    #[test]
    fn unresolved_interpolation_is_schema_error() {
        let tmp = TempDir::new().unwrap();
        write_profile(
            tmp.path(),
            "demo",
            SITE,
            NAV,
            &[("about.yaml", "slug: about\ntitle: ${brand.nope}\n")],
        );

        let err = ContentLoader::new(tmp.path()).load_profile("demo").unwrap_err();
        assert!(err.to_string().contains("Interpolation path not found: brand.nope"));
    }
}
