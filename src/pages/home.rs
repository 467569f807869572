//! The home page, the single child of the tree root everything else hangs off.

use super::{
    common_draft, find_home, page_content, rename_conflicting_page, slug_for, stream_body, text,
};
use crate::error::Result;
use crate::registry::{SeedContext, SeedOutput, Seeder};
use crate::store::{PageKind, PageType};
use tracing::info;

const DEFAULT_SLUG: &str = "home";

#[derive(Debug, Default)]
pub struct HomePageSeeder;

impl HomePageSeeder {
    pub fn new() -> Self {
        Self
    }
}

impl Seeder for HomePageSeeder {
    fn seed(&mut self, ctx: &mut SeedContext<'_>, clear: bool) -> Result<SeedOutput> {
        let content = page_content(ctx);
        let slug = slug_for(content, DEFAULT_SLUG)?;
        let intro = match content.get("intro") {
            Some(_) => Some(text(content, "intro", "")?),
            None => None,
        };
        let mut draft = common_draft(
            content,
            slug.clone(),
            "Home",
            PageKind::Home {
                intro: intro.clone().unwrap_or_default(),
            },
        )?;
        draft.body = stream_body(content, "body", ctx.images)?;

        if clear {
            self.clear(ctx)?;
        }

        let store = &mut *ctx.store;
        let root = store.root_page()?;
        let existing = find_home(store).and_then(|id| store.page(id)).cloned();

        let id = match existing {
            Some(mut page) => {
                let id = page.id;
                rename_conflicting_page(store, root, &slug, None, Some(id))?;
                // Without an intro in content the stored one stays.
                if let (None, PageKind::Home { intro: kept }) = (&intro, &page.kind) {
                    draft.kind = PageKind::Home {
                        intro: kept.clone(),
                    };
                }
                page.assign(draft);
                store.update_page(page)?;
                store.publish_page(id)?;
                id
            }
            None => {
                rename_conflicting_page(store, root, &slug, Some(PageType::Home), None)?;
                let id = store.add_child(root, draft)?;
                store.publish_page(id)?;
                id
            }
        };

        info!(id = id.0, %slug, "seeded home page");
        Ok(SeedOutput::named("home", &slug, id))
    }

    /// Deletes the home page and everything below it.
    fn clear(&mut self, ctx: &mut SeedContext<'_>) -> Result<()> {
        if let Some(id) = find_home(&*ctx.store) {
            let removed = ctx.store.delete_page(id)?;
            info!(id = id.0, removed, "cleared home page");
        }
        Ok(())
    }

    fn produces(&self) -> Vec<String> {
        vec!["home".to_string()]
    }
}
