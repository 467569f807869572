//! Terms, privacy and accessibility pages from one `legal` page file.
//!
//! The top level of the file is the terms page (a legal page with dated
//! `sections`). Optional `privacy` and `accessibility` mappings become
//! standard pages next to it, each with its own slug.

use super::{
    common_draft, delete_child, page_content, parse_date, resolve_parent, section, slug_for,
    stream_body, upsert_child_page,
};
use crate::error::Result;
use crate::registry::{PageRegistry, SeedContext, SeedOutput, Seeder};
use crate::store::{PageDraft, PageKind, PageType};
use serde_yaml::Mapping;
use tracing::info;

const TERMS_SLUG: &str = "terms";
const PRIVACY_SLUG: &str = "privacy";
const ACCESSIBILITY_SLUG: &str = "accessibility";

#[derive(Debug, Default)]
pub struct LegalPageSeeder;

impl LegalPageSeeder {
    pub fn new() -> Self {
        Self
    }
}

/// The three slugs as content currently names them.
fn slugs(content: &Mapping) -> Result<[String; 3]> {
    Ok([
        slug_for(content, TERMS_SLUG)?,
        slug_for(section(content, "privacy")?, PRIVACY_SLUG)?,
        slug_for(section(content, "accessibility")?, ACCESSIBILITY_SLUG)?,
    ])
}

impl Seeder for LegalPageSeeder {
    fn seed(&mut self, ctx: &mut SeedContext<'_>, clear: bool) -> Result<SeedOutput> {
        let content = page_content(ctx);
        let [terms_slug, privacy_slug, accessibility_slug] = slugs(content)?;

        let mut terms = common_draft(
            content,
            terms_slug,
            "Terms",
            PageKind::Legal {
                last_updated: parse_date(content.get("last_updated"), "last_updated")?,
            },
        )?;
        terms.body = stream_body(content, "sections", ctx.images)?;

        // (registry name, draft) for every page this run writes.
        let mut drafts: Vec<(&str, PageDraft)> = vec![("legal", terms)];
        for (name, slug, title) in [
            ("privacy", privacy_slug, "Privacy Policy"),
            ("accessibility", accessibility_slug, "Accessibility"),
        ] {
            let page = section(content, name)?;
            if page.is_empty() {
                continue;
            }
            let mut draft = common_draft(page, slug, title, PageKind::Standard)?;
            draft.body = stream_body(page, "body", ctx.images)?;
            drafts.push((name, draft));
        }
        let parent = resolve_parent(ctx)?;

        if clear {
            self.clear(ctx)?;
        }

        let mut pages = PageRegistry::new();
        for (name, draft) in drafts {
            let slug = draft.slug.clone();
            let (id, created) = upsert_child_page(ctx.store, parent, draft)?;
            info!(page = name, id = id.0, created, "seeded legal page");
            pages.insert(name.to_string(), id);
            pages.insert(slug, id);
        }
        Ok(SeedOutput::Pages(pages))
    }

    fn clear(&mut self, ctx: &mut SeedContext<'_>) -> Result<()> {
        let [terms_slug, privacy_slug, accessibility_slug] = slugs(page_content(ctx))?;
        let Ok(parent) = resolve_parent(ctx) else {
            return Ok(());
        };
        let removed = delete_child(ctx.store, parent, &terms_slug, PageType::Legal)?
            + delete_child(ctx.store, parent, &privacy_slug, PageType::Standard)?
            + delete_child(ctx.store, parent, &accessibility_slug, PageType::Standard)?;
        info!(removed, "cleared legal pages");
        Ok(())
    }

    fn produces(&self) -> Vec<String> {
        vec!["legal".to_string()]
    }

    fn consumes(&self) -> Vec<String> {
        vec!["home".to_string()]
    }
}
