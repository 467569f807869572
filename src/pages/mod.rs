//! Built-in page seeders.
//!
//! | Seeder                 | Page name(s)                         | Parent    | Page type        |
//! |------------------------|--------------------------------------|-----------|------------------|
//! | [`HomePageSeeder`]     | `home`                               | tree root | Home             |
//! | [`StandardPageSeeder`] | `about`, `services`, `portfolio`, `contact` | home | Standard       |
//! | [`BlogSeeder`]         | `blog`                               | home      | BlogIndex + posts|
//! | [`LegalPageSeeder`]    | `legal` (terms, privacy, accessibility) | home   | Legal + Standard |
//!
//! Every seeder reads its page mapping from the profile, builds a complete
//! [`PageDraft`] before touching the store, and then upserts it with
//! [`upsert_child_page`].
//!
//! ## Slug conflicts
//!
//! A child with the wanted slug but a different page type is never
//! overwritten. It is renamed out of the way first:
//!
//! ```text
//! about (Standard, id 7)  ──►  about-legacy-7           "About (Legacy)"
//!                              about-legacy-7-conflict-1 when that is taken too
//! ```
//!
//! The renamed page stays published so links to it keep working.

mod blog;
mod home;
mod legal;
mod standard;

pub use blog::BlogSeeder;
pub use home::HomePageSeeder;
pub use legal::LegalPageSeeder;
pub use standard::StandardPageSeeder;

use crate::content::{Block, resolve_block_images};
use crate::error::{Result, SeedError};
use crate::imaging::ImageRegistry;
use crate::registry::SeedContext;
use crate::slug::generate_slug;
use crate::store::{ContentStore, PageDraft, PageId, PageKind, PageType};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_yaml::{Mapping, Value};
use std::sync::LazyLock;
use tracing::{debug, warn};

const LEGACY_SUFFIX: &str = " (Legacy)";

static EMPTY: LazyLock<Mapping> = LazyLock::new(Mapping::new);

/// The seeder's own page mapping, or an empty one when the profile has none.
pub(crate) fn page_content<'a>(ctx: &SeedContext<'a>) -> &'a Mapping {
    let data = ctx.data;
    data.page(ctx.page_name).unwrap_or(&*EMPTY)
}

/// Sub-mapping under `key`. Missing or null is empty.
pub(crate) fn section<'a>(map: &'a Mapping, key: &str) -> Result<&'a Mapping> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(&*EMPTY),
        Some(Value::Mapping(inner)) => Ok(inner),
        Some(_) => Err(SeedError::Content(format!("'{key}' must be a mapping"))),
    }
}

/// String field with a default. Numbers and booleans are written out.
pub(crate) fn text(map: &Mapping, key: &str, default: &str) -> Result<String> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(default.to_string()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(_) => Err(SeedError::Content(format!("'{key}' must be a string"))),
    }
}

pub(crate) fn flag(map: &Mapping, key: &str, default: bool) -> Result<bool> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(SeedError::Content(format!("'{key}' must be true or false"))),
    }
}

pub(crate) fn count(map: &Mapping, key: &str, default: u32) -> Result<u32> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(value) => value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| *n > 0)
            .ok_or_else(|| SeedError::Content(format!("'{key}' must be a positive integer"))),
    }
}

/// Slug from the mapping's `slug`, normalized, else `default`.
pub(crate) fn slug_for(map: &Mapping, default: &str) -> Result<String> {
    let raw = text(map, "slug", default)?;
    generate_slug(&raw, default)
}

/// Parse a stream body field and resolve its image keys.
pub(crate) fn stream_body(map: &Mapping, key: &str, images: &ImageRegistry) -> Result<Vec<Block>> {
    let mut blocks = Block::parse_stream(map.get(key), key)?;
    resolve_block_images(&mut blocks, images)?;
    Ok(blocks)
}

/// Draft with the fields every page shares: title, SEO and menu settings.
pub(crate) fn common_draft(
    map: &Mapping,
    slug: String,
    default_title: &str,
    kind: PageKind,
) -> Result<PageDraft> {
    let mut draft = PageDraft::new(slug, text(map, "title", default_title)?, kind);
    draft.seo_title = text(map, "seo_title", "")?;
    draft.search_description = text(map, "search_description", "")?;
    draft.show_in_menus = flag(map, "show_in_menus", false)?;
    Ok(draft)
}

/// ISO `YYYY-MM-DD`. Missing, null and empty values are `None`.
pub(crate) fn parse_date(value: Option<&Value>, field: &str) -> Result<Option<NaiveDate>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| SeedError::Content(format!("Invalid date for {field}: {s}"))),
        Some(other) => Err(SeedError::Content(format!(
            "Invalid date for {field}: {other:?}"
        ))),
    }
}

/// RFC 3339, `YYYY-MM-DDTHH:MM:SS` or `YYYY-MM-DD`. Values without an offset
/// are UTC.
pub(crate) fn parse_datetime(value: Option<&Value>, field: &str) -> Result<DateTime<Utc>> {
    let invalid = |shown: String| SeedError::Content(format!("Invalid datetime for {field}: {shown}"));
    let s = match value {
        Some(Value::String(s)) => s.as_str(),
        Some(other) => return Err(invalid(format!("{other:?}"))),
        None => return Err(invalid("None".to_string())),
    };
    if let Ok(parsed) = DateTime::parse_from_rfc3339(s) {
        return Ok(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| invalid(s.to_string()))
}

/// Parent for pages below home: this run's home page, else the stored one.
pub(crate) fn resolve_parent(ctx: &SeedContext<'_>) -> Result<PageId> {
    if let Some(id) = ctx.pages.get("home") {
        return Ok(*id);
    }
    find_home(&*ctx.store).ok_or_else(|| {
        SeedError::Page(format!(
            "Home page must exist before seeding '{}'",
            ctx.page_name
        ))
    })
}

pub(crate) fn find_home(store: &dyn ContentStore) -> Option<PageId> {
    store
        .pages_of_type(PageType::Home)
        .first()
        .map(|page| page.id)
}

/// Update the child of `parent` with the draft's slug and type, or create it.
///
/// Returns the page id and whether it was created. A same-slug child of
/// another type is renamed to a legacy slug first. Either way the page ends
/// up published.
pub fn upsert_child_page(
    store: &mut dyn ContentStore,
    parent: PageId,
    draft: PageDraft,
) -> Result<(PageId, bool)> {
    let page_type = draft.kind.page_type();
    let existing = store
        .find_child(parent, &draft.slug)
        .filter(|page| page.page_type() == page_type)
        .cloned();

    if let Some(mut page) = existing {
        let id = page.id;
        page.assign(draft);
        store.update_page(page)?;
        store.publish_page(id)?;
        debug!(id = id.0, %page_type, "updated page");
        return Ok((id, false));
    }

    rename_conflicting_page(store, parent, &draft.slug, Some(page_type), None)?;
    let slug = draft.slug.clone();
    let id = store.add_child(parent, draft)?;
    store.publish_page(id)?;
    debug!(id = id.0, %page_type, %slug, "created page");
    Ok((id, true))
}

/// Move a child of `parent` that holds `slug` out of the way, unless it is
/// `ignore` or already of the `expected` type. With no `expected` type any
/// other page is moved. Returns the renamed page.
pub fn rename_conflicting_page(
    store: &mut dyn ContentStore,
    parent: PageId,
    slug: &str,
    expected: Option<PageType>,
    ignore: Option<PageId>,
) -> Result<Option<PageId>> {
    let Some(conflict) = store.find_child(parent, slug) else {
        return Ok(None);
    };
    if Some(conflict.id) == ignore || Some(conflict.page_type()) == expected {
        return Ok(None);
    }

    let mut page = conflict.clone();
    let id = page.id;
    page.slug = legacy_slug(&*store, parent, slug, id);
    if !page.title.ends_with(LEGACY_SUFFIX) {
        page.title.push_str(LEGACY_SUFFIX);
    }
    warn!(id = id.0, from = slug, to = %page.slug, "renamed conflicting page");
    store.update_page(page)?;
    store.publish_page(id)?;
    Ok(Some(id))
}

/// `{slug}-legacy-{id}`, or the first free `-conflict-{n}` variant of it.
fn legacy_slug(store: &dyn ContentStore, parent: PageId, slug: &str, id: PageId) -> String {
    let base = format!("{slug}-legacy-{}", id.0);
    if store.find_child(parent, &base).is_none() {
        return base;
    }
    let mut counter = 1;
    loop {
        let candidate = format!("{base}-conflict-{counter}");
        if store.find_child(parent, &candidate).is_none() {
            return candidate;
        }
        counter += 1;
    }
}

/// Delete the child of `parent` with `slug` if it has the given type.
pub(crate) fn delete_child(
    store: &mut dyn ContentStore,
    parent: PageId,
    slug: &str,
    page_type: PageType,
) -> Result<usize> {
    let target = store
        .find_child(parent, slug)
        .filter(|page| page.page_type() == page_type)
        .map(|page| page.id);
    match target {
        Some(id) => Ok(store.delete_page(id)?),
        None => Ok(0),
    }
}
