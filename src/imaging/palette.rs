//! Named placeholder colors.
//!
//! Manifest colors are palette names (`sage_moss`) or hex literals (`#6B8F71`,
//! `6B8F71`, `#abc`). Anything else falls back to the default color.

use super::params::Rgb;
use std::collections::BTreeMap;

/// The built-in sage-stone palette.
pub const DEFAULT_PALETTE: &[(&str, &str)] = &[
    ("sage_black", "#1A2F23"),
    ("sage_moss", "#6B8F71"),
    ("sage_terra", "#A0563B"),
    ("sage_oat", "#EDE8E0"),
    ("sage_linen", "#F7F5F1"),
];

pub const DEFAULT_BACKGROUND: &str = "sage_black";
pub const DEFAULT_TEXT: &str = "sage_oat";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: BTreeMap<String, String>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_PALETTE
                .iter()
                .map(|(name, hex)| (name.to_string(), hex.to_string()))
                .collect(),
        }
    }
}

impl Palette {
    /// The default palette extended (or overridden) by `extra`.
    pub fn with_colors(extra: &BTreeMap<String, String>) -> Self {
        let mut palette = Self::default();
        palette.colors.extend(extra.clone());
        palette
    }

    /// Resolve `value`, then `fallback`, else black.
    pub fn resolve(&self, value: Option<&str>, fallback: &str) -> Rgb {
        value
            .and_then(|v| self.lookup(v))
            .or_else(|| self.lookup(fallback))
            .unwrap_or([0, 0, 0])
    }

    fn lookup(&self, value: &str) -> Option<Rgb> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        match self.colors.get(value) {
            Some(hex) => parse_hex(hex),
            None => parse_hex(value),
        }
    }
}

/// Parse a 3 or 6 digit hex color, with or without leading `#`.
pub fn parse_hex(value: &str) -> Option<Rgb> {
    let hex = value.trim().trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                rgb[i] = channel(&format!("{c}{c}"))?;
            }
            Some(rgb)
        }
        6 => Some([
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        ]),
        _ => None,
    }
}
