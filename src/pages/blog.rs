//! Blog index, categories and posts.
//!
//! ```yaml
//! slug: blog
//! title: Journal
//! intro: Notes from the workshop
//! posts_per_page: 10
//! categories:
//!   - slug: kitchens
//!     name: Kitchens
//! posts:
//!   - slug: oak-worktops
//!     title: Caring for oak worktops
//!     category_slug: kitchens
//!     published_date: 2024-05-02
//!     image_key: BLOG_OAK
//!     excerpt: Oil, don't varnish.
//!     body:
//!       - type: image_block     # gets `image: BLOG_OAK` when it has none
//!         value: {caption: Freshly oiled}
//! ```
//!
//! Everything is parsed and checked before the first write: a post with an
//! unknown category or image key leaves the store untouched.

use super::{
    common_draft, count, delete_child, page_content, parse_datetime, resolve_parent, slug_for,
    text, upsert_child_page,
};
use crate::content::{Block, resolve_block_images};
use crate::error::{Result, SeedError};
use crate::imaging::ImageRegistry;
use crate::registry::{SeedContext, SeedOutput, Seeder};
use crate::site::profile_site_name;
use crate::store::{CategoryId, ContentStore, ImageId, PageDraft, PageId, PageKind, PageType};
use chrono::{DateTime, Utc};
use serde_yaml::{Mapping, Value};
use tracing::{debug, info};

const DEFAULT_SLUG: &str = "blog";
const DEFAULT_TITLE: &str = "Blog";
const DEFAULT_POST_TITLE: &str = "Blog Post";
const DEFAULT_POSTS_PER_PAGE: u32 = 10;
const SEARCH_DESCRIPTION_CHARS: usize = 160;

#[derive(Debug, Clone, Default)]
pub struct BlogSeeder {
    site_name: Option<String>,
}

impl BlogSeeder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Site name for post SEO titles, taking precedence over the profile's.
    pub fn with_site_name(mut self, site_name: Option<String>) -> Self {
        self.site_name = site_name.filter(|name| !name.trim().is_empty());
        self
    }

    fn resolve_site_name(&self, ctx: &SeedContext<'_>, parent: PageId) -> String {
        self.site_name
            .clone()
            .or_else(|| profile_site_name(ctx.site()))
            .or_else(|| {
                ctx.store
                    .site_for_page(parent)
                    .map(|site| site.site_name.clone())
            })
            .map(|name| name.trim().to_string())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct CategoryInput {
    slug: String,
    name: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
struct PostInput {
    slug: String,
    title: String,
    category_slug: String,
    published_date: DateTime<Utc>,
    featured_image: Option<ImageId>,
    excerpt: String,
    author_name: String,
    body: Vec<Block>,
}

impl PostInput {
    fn into_draft(self, category: CategoryId, index_title: &str, site_name: &str) -> PageDraft {
        let seo_title = [self.title.as_str(), index_title, site_name]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" | ");
        let search_description = self.excerpt.chars().take(SEARCH_DESCRIPTION_CHARS).collect();
        let mut draft = PageDraft::new(
            self.slug,
            self.title,
            PageKind::BlogPost {
                category,
                published_date: self.published_date,
                featured_image: self.featured_image,
                excerpt: self.excerpt,
                author_name: self.author_name,
            },
        );
        draft.seo_title = seo_title;
        draft.search_description = search_description;
        draft.body = self.body;
        draft
    }
}

impl Seeder for BlogSeeder {
    fn seed(&mut self, ctx: &mut SeedContext<'_>, clear: bool) -> Result<SeedOutput> {
        let content = page_content(ctx);
        let slug = slug_for(content, DEFAULT_SLUG)?;
        let categories = parse_categories(content.get("categories"))?;
        let index = common_draft(
            content,
            slug.clone(),
            DEFAULT_TITLE,
            PageKind::BlogIndex {
                intro: text(content, "intro", "")?,
                posts_per_page: count(content, "posts_per_page", DEFAULT_POSTS_PER_PAGE)?,
            },
        )?;
        let posts = parse_posts(content.get("posts"), ctx.images)?;
        for post in &posts {
            if !categories.iter().any(|c| c.slug == post.category_slug) {
                return Err(SeedError::Content(format!(
                    "Unknown blog category: {}",
                    post.category_slug
                )));
            }
        }
        let parent = resolve_parent(ctx)?;
        let site_name = self.resolve_site_name(ctx, parent);

        if clear {
            self.clear(ctx)?;
        }

        let store = &mut *ctx.store;
        let category_ids = save_categories(store, &categories)?;
        let index_title = if index.title.is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            index.title.clone()
        };
        let (index_id, _) = upsert_child_page(store, parent, index)?;

        let post_count = posts.len();
        for post in posts {
            let category = category_ids
                .iter()
                .find(|(slug, _)| *slug == post.category_slug)
                .map(|(_, id)| *id)
                .ok_or_else(|| {
                    SeedError::Content(format!("Unknown blog category: {}", post.category_slug))
                })?;
            let draft = post.into_draft(category, &index_title, &site_name);
            let (id, created) = upsert_child_page(store, index_id, draft)?;
            debug!(id = id.0, created, "seeded blog post");
        }

        info!(
            id = index_id.0,
            categories = category_ids.len(),
            posts = post_count,
            "seeded blog"
        );
        Ok(SeedOutput::named("blog", &slug, index_id))
    }

    /// Deletes the posts, then the index once nothing else lives under it,
    /// then the categories named in content.
    fn clear(&mut self, ctx: &mut SeedContext<'_>) -> Result<()> {
        let content = page_content(ctx);
        let slug = slug_for(content, DEFAULT_SLUG)?;
        let category_slugs = category_slugs(content.get("categories"));

        if let Ok(parent) = resolve_parent(ctx) {
            let store = &mut *ctx.store;
            let index = store
                .find_child(parent, &slug)
                .filter(|page| page.page_type() == PageType::BlogIndex)
                .map(|page| page.id);
            if let Some(index) = index {
                let posts: Vec<PageId> = store
                    .descendants(index)
                    .into_iter()
                    .filter(|page| page.page_type() == PageType::BlogPost)
                    .map(|page| page.id)
                    .collect();
                for post in &posts {
                    if store.page(*post).is_some() {
                        store.delete_page(*post)?;
                    }
                }
                if store.children(index).is_empty() {
                    delete_child(store, parent, &slug, PageType::BlogIndex)?;
                }
                info!(posts = posts.len(), "cleared blog");
            }
        }

        for category in &category_slugs {
            ctx.store.delete_category(category)?;
        }
        Ok(())
    }

    fn produces(&self) -> Vec<String> {
        vec!["blog".to_string()]
    }

    fn consumes(&self) -> Vec<String> {
        vec!["home".to_string()]
    }
}

fn parse_categories(value: Option<&Value>) -> Result<Vec<CategoryInput>> {
    let items = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Sequence(items)) => items,
        Some(_) => return Err(SeedError::Content("Blog categories must be a list".to_string())),
    };
    let mut categories: Vec<CategoryInput> = Vec::with_capacity(items.len());
    for item in items {
        let map = item.as_mapping().ok_or_else(|| {
            SeedError::Content("Blog category content must be a mapping".to_string())
        })?;
        let slug = text(map, "slug", "")?;
        if slug.is_empty() {
            return Err(SeedError::Content("Blog category slug is required".to_string()));
        }
        let optional = |key: &str| -> Result<Option<String>> {
            match map.get(key) {
                None => Ok(None),
                Some(_) => text(map, key, "").map(Some),
            }
        };
        let category = CategoryInput {
            name: optional("name")?,
            description: optional("description")?,
            slug,
        };
        // A later entry for the same slug wins.
        categories.retain(|c| c.slug != category.slug);
        categories.push(category);
    }
    Ok(categories)
}

/// Valid category slugs, ignoring malformed entries.
fn category_slugs(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_sequence)
        .into_iter()
        .flatten()
        .filter_map(|item| item.get("slug").and_then(Value::as_str))
        .filter(|slug| !slug.is_empty())
        .map(str::to_string)
        .collect()
}

/// Upsert categories by slug. Unset fields keep their stored values.
fn save_categories(
    store: &mut dyn ContentStore,
    categories: &[CategoryInput],
) -> Result<Vec<(String, CategoryId)>> {
    let mut saved = Vec::with_capacity(categories.len());
    for input in categories {
        let existing = store.category(&input.slug);
        let name = input
            .name
            .clone()
            .or_else(|| existing.map(|c| c.name.clone()))
            .unwrap_or_else(|| input.slug.clone());
        let description = input
            .description
            .clone()
            .or_else(|| existing.map(|c| c.description.clone()))
            .unwrap_or_default();
        let id = store.save_category(&input.slug, &name, &description)?;
        saved.push((input.slug.clone(), id));
    }
    Ok(saved)
}

fn parse_posts(value: Option<&Value>, images: &ImageRegistry) -> Result<Vec<PostInput>> {
    let items = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Sequence(items)) => items,
        Some(_) => return Err(SeedError::Content("Blog posts must be a list".to_string())),
    };
    items
        .iter()
        .map(|item| {
            let map = item.as_mapping().ok_or_else(|| {
                SeedError::Content("Blog post content must be a mapping".to_string())
            })?;
            parse_post(map, images)
        })
        .collect()
}

fn parse_post(map: &Mapping, images: &ImageRegistry) -> Result<PostInput> {
    let slug = text(map, "slug", "")?;
    if slug.is_empty() {
        return Err(SeedError::Content("Blog post slug is required".to_string()));
    }
    let category_slug = text(map, "category_slug", "")?;
    if category_slug.is_empty() {
        return Err(SeedError::Content(format!(
            "Unknown blog category: {category_slug}"
        )));
    }

    let image_key = text(map, "image_key", "")?;
    let featured_image = if image_key.is_empty() {
        None
    } else {
        let record = images.get(&image_key).ok_or_else(|| {
            SeedError::Content(format!("Unknown blog image key: {image_key}"))
        })?;
        Some(record.id)
    };

    let raw_body = with_default_images(map.get("body"), &image_key)?;
    let mut body = Block::parse_stream(raw_body.as_ref(), "body")?;
    resolve_block_images(&mut body, images)?;

    Ok(PostInput {
        published_date: parse_datetime(
            map.get("published_date"),
            &format!("published_date:{slug}"),
        )?,
        title: text(map, "title", DEFAULT_POST_TITLE)?,
        excerpt: text(map, "excerpt", "")?,
        author_name: text(map, "author_name", "")?,
        featured_image,
        category_slug,
        body,
        slug,
    })
}

/// Copy of a post body where `image_block` blocks without an image get
/// `image_key`.
fn with_default_images(body: Option<&Value>, image_key: &str) -> Result<Option<Value>> {
    let blocks = match body {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Sequence(blocks)) => blocks,
        Some(_) => return Err(SeedError::Content("Blog post body must be a list".to_string())),
    };
    let mut blocks = blocks.clone();
    for block in &mut blocks {
        let block = block.as_mapping_mut().ok_or_else(|| {
            SeedError::Content("Blog post block must be a mapping".to_string())
        })?;
        let is_image_block = block.get("type").and_then(Value::as_str) == Some("image_block");
        if image_key.is_empty() || !is_image_block {
            continue;
        }
        let value = block
            .entry(Value::String("value".into()))
            .or_insert(Value::Null);
        if value.is_null() {
            *value = Value::Mapping(Mapping::new());
        }
        if let Value::Mapping(fields) = value {
            if !fields.contains_key("image") {
                fields.insert("image".into(), Value::String(image_key.to_string()));
            }
        }
    }
    Ok(Some(Value::Sequence(blocks)))
}
