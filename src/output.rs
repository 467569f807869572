//! CLI output formatting for plans, runs and profile listings.
//!
//! # Information-First Display
//!
//! Pages are shown by title and position in the tree, with slug and id as
//! secondary context. Images are shown by manifest key, with the stored title
//! and size next to them. The output reads as an inventory of what the run
//! produced.
//!
//! # Output Format
//!
//! ## Plan (`seed --dry-run`)
//!
//! ```text
//! Plan for sage-stone
//!     Source: content/sage-stone/
//! Pages
//! 001 home
//! 002 about
//! Seeders
//! 001 home
//! 002 about
//! 003 blog
//! Dry run: nothing was written
//! ```
//!
//! ## Seed
//!
//! ```text
//! Pages
//! 001 Home → home (#2)
//!     001 About → about (#3)
//!     002 Journal → blog (#4)
//!         001 Oak Worktops → oak-worktops (#6)
//! Images
//!     HERO_IMAGE → SEED_HERO_IMAGE (1920x1080)
//! Seeded sage-stone: 4 pages, 1 image
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::orchestrator::{SeedPlan, SeedResult};
use crate::store::{ContentStore, PageId, PageType};
use std::collections::BTreeSet;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 page`, `2 pages`.
fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

fn numbered<'a>(heading: &str, names: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    let mut lines = vec![heading.to_string()];
    lines.extend(
        names
            .into_iter()
            .enumerate()
            .map(|(i, name)| format!("{} {}", format_index(i + 1), name)),
    );
    lines
}

// ============================================================================
// Plan
// ============================================================================

/// Format a dry-run plan.
pub fn format_plan(plan: &SeedPlan) -> Vec<String> {
    let mut lines = vec![
        format!("Plan for {}", plan.profile),
        format!(
            "    Source: {}/",
            plan.content_dir.join(&plan.profile).display()
        ),
    ];
    lines.extend(numbered("Pages", &plan.pages));
    lines.extend(numbered("Seeders", &plan.seeders));
    lines.push("Dry run: nothing was written".to_string());
    lines
}

pub fn print_plan(plan: &SeedPlan) {
    for line in format_plan(plan) {
        println!("{}", line);
    }
}

// ============================================================================
// Seed result
// ============================================================================

/// Format a committed run. Seeded pages are listed in tree order, indented
/// by depth below the root page.
pub fn format_result(result: &SeedResult, store: &dyn ContentStore) -> Vec<String> {
    let seeded: BTreeSet<PageId> = result.pages.values().copied().collect();
    let mut lines = vec!["Pages".to_string()];

    // Position counters per depth, reset when a shallower page is printed.
    let mut positions: Vec<usize> = Vec::new();
    let roots = store.pages_of_type(PageType::Root);
    for root in roots {
        for page in store.descendants(root.id) {
            if !seeded.contains(&page.id) {
                continue;
            }
            let depth = depth_below(store, page.id, root.id);
            positions.truncate(depth + 1);
            positions.resize(depth + 1, 0);
            positions[depth] += 1;
            lines.push(format!(
                "{}{} {} \u{2192} {} ({})",
                indent(depth),
                format_index(positions[depth]),
                page.title,
                page.slug,
                page.id
            ));
        }
    }

    if !result.images.is_empty() {
        lines.push("Images".to_string());
        for (key, image) in &result.images {
            lines.push(format!(
                "{}{} \u{2192} {} ({}x{})",
                indent(1),
                key,
                image.title,
                image.width,
                image.height
            ));
        }
    }

    lines.push(format!(
        "Seeded {}: {}, {}",
        result.profile,
        plural(seeded.len(), "page"),
        plural(result.images.len(), "image")
    ));
    lines
}

pub fn print_result(result: &SeedResult, store: &dyn ContentStore) {
    for line in format_result(result, store) {
        println!("{}", line);
    }
}

/// Levels between `id` and `root`; direct children of the root are 0.
fn depth_below(store: &dyn ContentStore, id: PageId, root: PageId) -> usize {
    let mut depth = 0;
    let mut current = store.page(id).and_then(|page| page.parent);
    while let Some(parent) = current {
        if parent == root {
            break;
        }
        depth += 1;
        current = store.page(parent).and_then(|page| page.parent);
    }
    depth
}

// ============================================================================
// Profiles
// ============================================================================

/// Format the profile listing, marking the configured default.
pub fn format_profiles(profiles: &[String], content_dir: &Path, default: &str) -> Vec<String> {
    if profiles.is_empty() {
        return vec![format!("No profiles in {}/", content_dir.display())];
    }
    let mut lines = vec![format!("Profiles in {}/", content_dir.display())];
    for profile in profiles {
        if profile == default {
            lines.push(format!("{}{} (default)", indent(1), profile));
        } else {
            lines.push(format!("{}{}", indent(1), profile));
        }
    }
    lines
}

pub fn print_profiles(profiles: &[String], content_dir: &Path, default: &str) {
    for line in format_profiles(profiles, content_dir, default) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::ImageRegistry;
    use crate::registry::PageRegistry;
    use crate::store::{ImageId, ImageRecord, MemoryStore, PageDraft, PageKind};
    use std::path::PathBuf;

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_index_pads_to_three_digits() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(100), "100");
    }

    #[test]
    fn plural_counts() {
        assert_eq!(plural(1, "page"), "1 page");
        assert_eq!(plural(0, "image"), "0 images");
        assert_eq!(plural(7, "page"), "7 pages");
    }

    // =========================================================================
    // Plan
    // =========================================================================

    #[test]
    fn plan_lists_pages_then_seeders() {
        let plan = SeedPlan {
            profile: "sage-stone".to_string(),
            content_dir: PathBuf::from("content"),
            pages: vec!["home".to_string(), "about".to_string()],
            seeders: vec!["home".to_string(), "about".to_string(), "blog".to_string()],
        };
        assert_eq!(
            format_plan(&plan),
            vec![
                "Plan for sage-stone",
                "    Source: content/sage-stone/",
                "Pages",
                "001 home",
                "002 about",
                "Seeders",
                "001 home",
                "002 about",
                "003 blog",
                "Dry run: nothing was written",
            ]
        );
    }

    // =========================================================================
    // Seed result
    // =========================================================================

    fn seeded_store() -> (MemoryStore, PageRegistry) {
        let mut store = MemoryStore::new();
        let root = store.root_page().unwrap();
        let home = store
            .add_child(
                root,
                PageDraft::new("home", "Home", PageKind::Home { intro: String::new() }),
            )
            .unwrap();
        let about = store
            .add_child(home, PageDraft::new("about", "About", PageKind::Standard))
            .unwrap();
        let team = store
            .add_child(about, PageDraft::new("team", "Team", PageKind::Standard))
            .unwrap();
        let contact = store
            .add_child(home, PageDraft::new("contact", "Contact", PageKind::Standard))
            .unwrap();
        store
            .add_child(home, PageDraft::new("stray", "Stray", PageKind::Standard))
            .unwrap();

        let mut pages = PageRegistry::new();
        pages.insert("home".to_string(), home);
        pages.insert("about".to_string(), about);
        pages.insert("our-story".to_string(), about);
        pages.insert("team".to_string(), team);
        pages.insert("contact".to_string(), contact);
        (store, pages)
    }

    #[test]
    fn result_shows_seeded_pages_as_tree() {
        let (store, pages) = seeded_store();
        let result = SeedResult {
            profile: "sage-stone".to_string(),
            pages,
            images: ImageRegistry::new(),
        };

        let lines = format_result(&result, &store);
        assert_eq!(lines[0], "Pages");
        assert!(lines[1].starts_with("001 Home \u{2192} home ("));
        assert!(lines[2].starts_with("    001 About \u{2192} about"));
        assert!(lines[3].starts_with("        001 Team \u{2192} team"));
        assert!(lines[4].starts_with("    002 Contact \u{2192} contact"));
        assert_eq!(lines[5], "Seeded sage-stone: 4 pages, 0 images");
        assert!(!lines.iter().any(|line| line.contains("Stray")));
    }

    #[test]
    fn result_lists_images_by_key() {
        let (store, pages) = seeded_store();
        let mut images = ImageRegistry::new();
        images.insert(
            "HERO_IMAGE".to_string(),
            ImageRecord {
                id: ImageId(1),
                title: "SEED_HERO_IMAGE".to_string(),
                file: "seed_hero_image.jpg".to_string(),
                width: 1920,
                height: 1080,
                file_hash: String::new(),
            },
        );
        let result = SeedResult {
            profile: "sage-stone".to_string(),
            pages,
            images,
        };

        let lines = format_result(&result, &store);
        assert!(lines.contains(&"Images".to_string()));
        assert!(lines.contains(&"    HERO_IMAGE \u{2192} SEED_HERO_IMAGE (1920x1080)".to_string()));
        assert_eq!(lines.last().unwrap(), "Seeded sage-stone: 4 pages, 1 image");
    }

    // =========================================================================
    // Profiles
    // =========================================================================

    #[test]
    fn profiles_mark_default() {
        let profiles = vec!["demo".to_string(), "sage-stone".to_string()];
        assert_eq!(
            format_profiles(&profiles, Path::new("content"), "sage-stone"),
            vec!["Profiles in content/", "    demo", "    sage-stone (default)"]
        );
    }

    #[test]
    fn no_profiles_message() {
        assert_eq!(
            format_profiles(&[], Path::new("content"), "sage-stone"),
            vec!["No profiles in content/"]
        );
    }
}
