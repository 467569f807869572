//! Image manifests: which placeholders a profile needs.

use serde::{Deserialize, Serialize};

/// One placeholder to generate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSpec {
    pub key: String,
    pub width: u32,
    pub height: u32,
    /// Background color: palette name or hex.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg: Option<String>,
    /// Text color: palette name or hex.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Centered label. Defaults to the key in title case.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ImageSpec {
    pub fn new(key: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            key: key.into(),
            width,
            height,
            bg: None,
            text: None,
            label: None,
        }
    }

    pub fn bg(mut self, color: impl Into<String>) -> Self {
        self.bg = Some(color.into());
        self
    }

    pub fn text(mut self, color: impl Into<String>) -> Self {
        self.text = Some(color.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

// (key, width, height, bg, label)
const SAGE_STONE: &[(&str, u32, u32, &str, &str)] = &[
    ("HERO_IMAGE", 1920, 1080, "sage_black", "Hero Kitchen"),
    ("SURREY_IMAGE", 1000, 700, "sage_black", "Surrey Commission"),
    ("PROVENANCE_IMAGE", 800, 600, "sage_terra", "Brass Plate"),
    ("WORKSHOP_IMAGE", 1200, 800, "sage_black", "Workshop Interior"),
    ("FOUNDER_IMAGE", 800, 1000, "sage_moss", "Thomas J. Wright"),
    ("TEAM_JAMES", 400, 500, "sage_moss", "James E."),
    ("TEAM_SARAH", 400, 500, "sage_moss", "Sarah M."),
    ("TEAM_DAVID", 400, 500, "sage_moss", "David R."),
    ("TEAM_MARCUS", 400, 500, "sage_moss", "Marcus T."),
    ("SERVICE_COMMISSION", 600, 400, "sage_black", "The Commission"),
    ("SERVICE_RESTORATION", 600, 400, "sage_black", "The Restoration"),
    ("SERVICE_LARDER", 600, 400, "sage_black", "The Larder"),
    ("SERVICE_APPLIANCE", 600, 400, "sage_moss", "Appliance Integration"),
    ("SERVICE_JOINERY", 600, 400, "sage_moss", "Bespoke Joinery"),
    ("SERVICE_TECHNICAL", 600, 400, "sage_moss", "Technical Integration"),
    ("SERVICE_STONE", 600, 400, "sage_moss", "Stone & Surfaces"),
    ("PORTFOLIO_KENSINGTON", 800, 600, "sage_black", "Kensington"),
    ("PORTFOLIO_COTSWOLD", 800, 600, "sage_black", "Cotswold Barn"),
    ("PORTFOLIO_GEORGIAN", 800, 600, "sage_black", "Georgian Townhouse"),
    ("PORTFOLIO_HIGHLAND", 1200, 600, "sage_black", "Highland Commission"),
    ("PORTFOLIO_LARDER", 600, 800, "sage_black", "Pantry Larder"),
    ("PORTFOLIO_GEORGIAN_REST", 600, 800, "sage_black", "Georgian Restoration"),
    ("PORTFOLIO_BRUTALIST", 800, 500, "sage_black", "Brutalist Barn"),
    ("PORTFOLIO_UTILITY", 600, 800, "sage_black", "Utility Room"),
    ("DETAIL_1", 600, 600, "sage_terra", "Dovetail Joint"),
    ("DETAIL_2", 600, 600, "sage_terra", "Hinge Detail"),
    ("DETAIL_3", 600, 600, "sage_terra", "Surface Finish"),
    ("BLOG_TIMBER_IMAGE", 1200, 600, "sage_black", "Seasoning Timber"),
    ("BLOG_TIMBER_STACK", 1000, 600, "sage_black", "Timber Stacking"),
    ("BLOG_KENSINGTON", 1200, 600, "sage_black", "Kensington Story"),
    ("BLOG_DOVETAILS", 1200, 600, "sage_terra", "Dovetails"),
    ("BLOG_WORKSHOP", 1200, 600, "sage_moss", "Workshop Update"),
    ("BLOG_GEORGIAN", 1200, 600, "sage_black", "Georgian Journey"),
    ("BLOG_MDF", 1200, 600, "sage_terra", "Why Not MDF"),
    ("BLOG_MARCUS", 800, 1000, "sage_moss", "Meet Marcus"),
];

// Certification logos sit on a light background with dark text.
const SAGE_STONE_LOGOS: &[(&str, &str)] = &[
    ("LOGO_GASSAFE", "Gas Safe"),
    ("LOGO_NICEIC", "NICEIC"),
    ("LOGO_BIKBBI", "BiKBBI"),
    ("LOGO_GUILD", "Guild"),
];

/// The built-in sage-stone manifest.
pub fn default_manifest() -> Vec<ImageSpec> {
    let photos = SAGE_STONE
        .iter()
        .map(|(key, w, h, bg, label)| ImageSpec::new(*key, *w, *h).bg(*bg).label(*label));
    let logos = SAGE_STONE_LOGOS.iter().map(|(key, label)| {
        ImageSpec::new(*key, 200, 80)
            .bg("sage_linen")
            .text("sage_black")
            .label(*label)
    });
    photos.chain(logos).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn default_manifest_keys_are_unique() {
        let manifest = default_manifest();
        let keys: BTreeSet<&str> = manifest.iter().map(|spec| spec.key.as_str()).collect();
        assert_eq!(keys.len(), manifest.len());
        assert_eq!(manifest.len(), 39);
    }

    #[test]
    fn hero_image_spec() {
        let hero = default_manifest()
            .into_iter()
            .find(|spec| spec.key == "HERO_IMAGE")
            .unwrap();
        assert_eq!((hero.width, hero.height), (1920, 1080));
        assert_eq!(hero.label.as_deref(), Some("Hero Kitchen"));
    }

    #[test]
    fn logos_use_dark_text_on_linen() {
        let logo = default_manifest()
            .into_iter()
            .find(|spec| spec.key == "LOGO_GUILD")
            .unwrap();
        assert_eq!(logo.bg.as_deref(), Some("sage_linen"));
        assert_eq!(logo.text.as_deref(), Some("sage_black"));
    }

    #[test]
    fn spec_deserializes_from_yaml() {
        let spec: ImageSpec =
            serde_yaml::from_str("key: BANNER\nwidth: 10\nheight: 5\nbg: '#fff'\n").unwrap();
        assert_eq!(spec, ImageSpec::new("BANNER", 10, 5).bg("#fff"));
    }
}
