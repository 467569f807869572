//! Plain content pages below home: about, services, portfolio, contact.

use super::{
    common_draft, delete_child, page_content, resolve_parent, slug_for, stream_body,
    upsert_child_page,
};
use crate::error::Result;
use crate::registry::{SeedContext, SeedOutput, Seeder};
use crate::store::{PageKind, PageType};
use tracing::info;

/// One standard page. The registry name, default slug and default title are
/// fixed per instance; content may override slug and title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardPageSeeder {
    name: String,
    default_slug: String,
    default_title: String,
}

impl StandardPageSeeder {
    pub fn new(
        name: impl Into<String>,
        default_slug: impl Into<String>,
        default_title: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            default_slug: default_slug.into(),
            default_title: default_title.into(),
        }
    }

    pub fn about() -> Self {
        Self::new("about", "about", "About")
    }

    pub fn services() -> Self {
        Self::new("services", "services", "Services")
    }

    pub fn portfolio() -> Self {
        Self::new("portfolio", "portfolio", "Portfolio")
    }

    pub fn contact() -> Self {
        Self::new("contact", "contact", "Contact")
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Seeder for StandardPageSeeder {
    fn seed(&mut self, ctx: &mut SeedContext<'_>, clear: bool) -> Result<SeedOutput> {
        let content = page_content(ctx);
        let slug = slug_for(content, &self.default_slug)?;
        let mut draft =
            common_draft(content, slug.clone(), &self.default_title, PageKind::Standard)?;
        draft.body = stream_body(content, "body", ctx.images)?;
        let parent = resolve_parent(ctx)?;

        if clear {
            self.clear(ctx)?;
        }

        let (id, created) = upsert_child_page(ctx.store, parent, draft)?;
        info!(page = %self.name, id = id.0, created, "seeded page");
        Ok(SeedOutput::named(&self.name, &slug, id))
    }

    fn clear(&mut self, ctx: &mut SeedContext<'_>) -> Result<()> {
        let slug = slug_for(page_content(ctx), &self.default_slug)?;
        let Ok(parent) = resolve_parent(ctx) else {
            return Ok(());
        };
        let removed = delete_child(ctx.store, parent, &slug, PageType::Standard)?;
        if removed > 0 {
            info!(page = %self.name, removed, "cleared page");
        }
        Ok(())
    }

    fn produces(&self) -> Vec<String> {
        vec![self.name.clone()]
    }

    fn consumes(&self) -> Vec<String> {
        vec!["home".to_string()]
    }
}
