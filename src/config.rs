//! Seeding configuration module.
//!
//! Handles loading, validating, and layering `seed.toml`. The file is
//! optional: stock defaults cover every key, and a user file only needs the
//! values it wants to change. CLI flags (`--content-path`, `--store`) are
//! applied on top of the loaded config by the binary.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! content_dir = "content"              # Root holding one directory per profile
//! store = ".sum-seed/store.json"       # JSON document written on commit
//! default_profile = "sage-stone"       # Used when `seed` gets no profile
//!
//! [site]
//! hostname = "localhost"
//! port = 8000
//! is_default_site = true
//! # site_name = "Sage & Stone"       # Overrides the name from site.yaml
//!
//! [images]
//! prefix = "SEED"                      # Generated image titles: {prefix}_{key}
//!
//! [images.palette]                     # Extra named colors for manifests
//! # brand_gold = "#C8A24A"
//!
//! [seeders]
//! order = ["home", "about", "services", "portfolio", "blog", "contact", "legal"]
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::parse_hex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Seeding configuration loaded from `seed.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeedConfig {
    /// Directory holding one subdirectory per content profile.
    pub content_dir: PathBuf,
    /// Path of the JSON store document. Media files land next to it.
    pub store: PathBuf,
    /// Profile seeded when none is given on the command line.
    pub default_profile: String,
    /// Site record defaults.
    pub site: SiteConfig,
    /// Placeholder image settings.
    pub images: ImagesConfig,
    /// Seeder ordering preferences.
    pub seeders: SeedersConfig,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("content"),
            store: PathBuf::from(".sum-seed/store.json"),
            default_profile: "sage-stone".to_string(),
            site: SiteConfig::default(),
            images: ImagesConfig::default(),
            seeders: SeedersConfig::default(),
        }
    }
}

impl SeedConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site.hostname.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site.hostname must not be empty".into(),
            ));
        }
        if self.site.port == 0 {
            return Err(ConfigError::Validation("site.port must be non-zero".into()));
        }
        if self.images.prefix.trim().is_empty() {
            return Err(ConfigError::Validation(
                "images.prefix must not be empty".into(),
            ));
        }
        for (name, value) in &self.images.palette {
            if parse_hex(value).is_none() {
                return Err(ConfigError::Validation(format!(
                    "images.palette.{name} must be a 3 or 6 digit hex color, got {value:?}"
                )));
            }
        }
        if self.seeders.order.iter().any(|name| name.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "seeders.order entries must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Defaults for the site record the site seeder upserts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub hostname: String,
    pub port: u16,
    pub is_default_site: bool,
    /// Overrides `site_name`/`company_name` from the profile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            hostname: "localhost".to_string(),
            port: 8000,
            is_default_site: true,
            site_name: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Title prefix for generated images.
    pub prefix: String,
    /// Named colors added to (or overriding) the built-in palette.
    pub palette: BTreeMap<String, String>,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            prefix: "SEED".to_string(),
            palette: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeedersConfig {
    /// Preferred seeding order, used to break ties between seeders that do
    /// not depend on each other.
    pub order: Vec<String>,
}

impl Default for SeedersConfig {
    fn default() -> Self {
        Self {
            order: DEFAULT_PAGE_ORDER.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Preferred order for the built-in page seeders.
pub const DEFAULT_PAGE_ORDER: &[&str] = &[
    "home",
    "about",
    "services",
    "portfolio",
    "blog",
    "contact",
    "legal",
];

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a TOML value tree.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SeedConfig::default()).expect("default config must serialize")
}

/// Deep-merge two TOML value trees. Tables merge recursively; any other
/// overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut table), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                let merged = match table.remove(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => value,
                };
                table.insert(key, merged);
            }
            toml::Value::Table(table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value. A missing file is not an error.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Layer an optional user overlay over `base`, deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SeedConfig, ConfigError> {
    let merged = match overlay {
        Some(overlay) => merge_toml(base, overlay),
        None => base,
    };
    let config: SeedConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `seed.toml` from `path`, falling back to stock defaults.
pub fn load_config(path: &Path) -> Result<SeedConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(path)?)
}

/// A documented `seed.toml` with every key at its default value.
pub fn stock_config_toml() -> &'static str {
    r##"# sum-seed configuration
# ======================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Directory holding one subdirectory per content profile:
#   content/<profile>/site.yaml
#   content/<profile>/navigation.yaml
#   content/<profile>/pages/<name>.yaml
content_dir = "content"

# JSON document the store is written to on commit. Generated placeholder
# images are written to a `media/` directory next to it.
store = ".sum-seed/store.json"

# Profile used by `sum-seed seed` when none is given. When this profile does
# not exist and exactly one profile is available, that one is used instead.
default_profile = "sage-stone"

# ---------------------------------------------------------------------------
# Site record
# ---------------------------------------------------------------------------
[site]
# The site is matched on (hostname, port); a second run updates it in place.
hostname = "localhost"
port = 8000
is_default_site = true

# Overrides site_name / company_name from the profile's site.yaml.
# site_name = "Sage & Stone"

# ---------------------------------------------------------------------------
# Placeholder images
# ---------------------------------------------------------------------------
[images]
# Generated images are titled {prefix}_{key}. Clearing a profile removes
# every image carrying this prefix.
prefix = "SEED"

# Extra named colors usable as `bg`/`text` in image manifests. Built-in
# names: sage_black, sage_moss, sage_terra, sage_oat, sage_linen.
[images.palette]
# brand_gold = "#C8A24A"

# ---------------------------------------------------------------------------
# Seeders
# ---------------------------------------------------------------------------
[seeders]
# Preferred order. Dependencies between seeders always win; this list only
# breaks ties. Seeders not listed run afterwards, alphabetically.
order = ["home", "about", "services", "portfolio", "blog", "contact", "legal"]
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = SeedConfig::default();
        assert_eq!(config.content_dir, PathBuf::from("content"));
        assert_eq!(config.default_profile, "sage-stone");
        assert_eq!(config.site.hostname, "localhost");
        assert_eq!(config.site.port, 8000);
        assert!(config.site.is_default_site);
        assert_eq!(config.images.prefix, "SEED");
        assert_eq!(config.seeders.order[0], "home");
    }

    #[test]
    fn parse_partial_config() {
        let config: SeedConfig = toml::from_str(
            r#"
[site]
port = 9000
"#,
        )
        .unwrap();
        assert_eq!(config.site.port, 9000);
        assert_eq!(config.site.hostname, "localhost");
        assert_eq!(config.images.prefix, "SEED");
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("seed.toml")).unwrap();
        assert_eq!(config, SeedConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("seed.toml");
        fs::write(
            &path,
            r##"
content_dir = "profiles"

[site]
site_name = "Override"

[images]
prefix = "DEMO"

[images.palette]
brand_gold = "#C8A24A"
"##,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.content_dir, PathBuf::from("profiles"));
        assert_eq!(config.site.site_name.as_deref(), Some("Override"));
        assert_eq!(config.images.prefix, "DEMO");
        assert_eq!(config.images.palette["brand_gold"], "#C8A24A");
        assert_eq!(config.site.port, 8000);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("seed.toml");
        fs::write(&path, "this is not [valid toml").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let result: Result<SeedConfig, _> = toml::from_str("content_root = \"x\"");
        assert!(result.is_err());

        let result: Result<SeedConfig, _> = toml::from_str("[site]\nhost = \"x\"");
        assert!(result.is_err());
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_overrides_nested_keys_only() {
        let base = stock_defaults_value();
        let overlay: toml::Value = toml::from_str("[site]\nport = 8080").unwrap();
        let merged = merge_toml(base, overlay);
        let site = merged.get("site").unwrap();
        assert_eq!(site.get("port").unwrap().as_integer(), Some(8080));
        assert_eq!(site.get("hostname").unwrap().as_str(), Some("localhost"));
    }

    #[test]
    fn merge_toml_replaces_arrays() {
        let base = stock_defaults_value();
        let overlay: toml::Value = toml::from_str("[seeders]\norder = [\"blog\"]").unwrap();
        let config = resolve_config(base, Some(overlay)).unwrap();
        assert_eq!(config.seeders.order, vec!["blog".to_string()]);
    }

    // =========================================================================
    // validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(SeedConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_port() {
        let overlay: toml::Value = toml::from_str("[site]\nport = 0").unwrap();
        let result = resolve_config(stock_defaults_value(), Some(overlay));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_empty_prefix() {
        let overlay: toml::Value = toml::from_str("[images]\nprefix = \" \"").unwrap();
        let result = resolve_config(stock_defaults_value(), Some(overlay));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_bad_palette_color() {
        let overlay: toml::Value =
            toml::from_str("[images.palette]\nmud = \"not-a-color\"").unwrap();
        let err = resolve_config(stock_defaults_value(), Some(overlay)).unwrap_err();
        assert!(err.to_string().contains("images.palette.mud"));
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: SeedConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, SeedConfig::default());
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        assert!(content.contains("[site]"));
        assert!(content.contains("[images]"));
        assert!(content.contains("[images.palette]"));
        assert!(content.contains("[seeders]"));
    }
}
