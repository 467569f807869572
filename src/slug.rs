//! URL-safe page and category slugs.
//!
//! Content files usually carry ready-made slugs (`about`, `art-of-seasoning-
//! timber`), which pass through unchanged. Anything else is transliterated to
//! ASCII and folded into lowercase words joined by single hyphens:
//!
//! - `"About Us"` → `about-us`
//! - `"Café & Bar"` → `cafe-bar`
//! - `"  --Hello__World--  "` → `hello__world`

use crate::error::{Result, SeedError};

/// Fold arbitrary text into a slug. Returns an empty string when nothing
/// slug-safe remains.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut need_dash = false;
    for ch in text.chars() {
        for b in deunicode::deunicode_char(ch).unwrap_or("-").bytes() {
            match b {
                b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' => {
                    if need_dash {
                        slug.push('-');
                        need_dash = false;
                    }
                    slug.push(b.to_ascii_lowercase() as char);
                }
                _ => need_dash = !slug.is_empty(),
            }
        }
    }
    slug.trim_matches('_').to_string()
}

/// Slug for `value`, or for `fallback` when `value` yields nothing usable.
pub fn generate_slug(value: &str, fallback: &str) -> Result<String> {
    let slug = slugify(value);
    if !slug.is_empty() {
        return Ok(slug);
    }
    let slug = slugify(fallback);
    if slug.is_empty() {
        return Err(SeedError::Slug(format!(
            "Unable to derive a slug from {value:?} or fallback {fallback:?}"
        )));
    }
    Ok(slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_made_slug_is_unchanged() {
        assert_eq!(slugify("art-of-seasoning-timber"), "art-of-seasoning-timber");
        assert_eq!(slugify("home"), "home");
    }

    #[test]
    fn words_are_lowercased_and_hyphenated() {
        assert_eq!(slugify("About Us"), "about-us");
        assert_eq!(slugify("Terms & Conditions"), "terms-conditions");
    }

    #[test]
    fn unicode_is_transliterated() {
        assert_eq!(slugify("Café Crème"), "cafe-creme");
    }

    #[test]
    fn leading_and_trailing_separators_are_stripped() {
        assert_eq!(slugify("  --Hello__World--  "), "hello__world");
        assert_eq!(slugify("__draft__"), "draft");
    }

    #[test]
    fn generate_slug_uses_fallback() {
        assert_eq!(generate_slug("!!!", "about").unwrap(), "about");
        assert_eq!(generate_slug("Our Story", "about").unwrap(), "our-story");
    }

    #[test]
    fn generate_slug_fails_when_fallback_is_empty() {
        let err = generate_slug("***", "").unwrap_err();
        assert!(matches!(err, SeedError::Slug(_)));
    }
}
