//! Typed content tree built from profile YAML.
//!
//! Page bodies, navigation menus and branding values are free-form YAML in
//! the profile, but two kinds of leaves mean something to the seeders:
//!
//! | YAML                                   | Node                              |
//! |----------------------------------------|-----------------------------------|
//! | `image: HERO_IMAGE` (also `photo`, `logo`) | `Node::Image(ImageRef::Key)`  |
//! | `image: 42`                            | `Node::Image(ImageRef::Id)`       |
//! | `page: about` next to `link_type: page`| `Node::Page(PageRef::Slug)`       |
//! | `page: 7` next to `link_type: page`    | `Node::Page(PageRef::Id)`         |
//!
//! Everything else maps onto plain scalars, lists and maps. References are
//! rewritten in place by a [`NodeVisitorMut`] pass:
//! [`ImageResolver`] turns image keys into ids and [`PageResolver`] turns
//! slugs into page ids. Unknown keys and slugs fail the pass.
//!
//! Stored nodes serialize as plain JSON with references as one-key objects
//! (`{"$image": 12}`, `{"$page": 3}`).

use crate::error::{Result, SeedError};
use crate::imaging::ImageRegistry;
use crate::registry::PageRegistry;
use crate::store::{ImageId, PageId};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;

/// Field names whose string values are image keys.
pub const IMAGE_FIELDS: &[&str] = &["image", "photo", "logo"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageRef {
    #[serde(rename = "$image_key")]
    Key(String),
    #[serde(rename = "$image")]
    Id(ImageId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageRef {
    #[serde(rename = "$page_slug")]
    Slug(String),
    #[serde(rename = "$page")]
    Id(PageId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Image(ImageRef),
    Page(PageRef),
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<Node>),
    Map(BTreeMap<String, Node>),
}

impl Node {
    /// Convert a YAML value, classifying image and page reference fields.
    pub fn from_yaml(value: &Value) -> Result<Node> {
        match value {
            Value::Null => Ok(Node::Null),
            Value::Bool(b) => Ok(Node::Bool(*b)),
            Value::Number(n) => Ok(match n.as_i64() {
                Some(i) => Node::Int(i),
                None => Node::Float(n.as_f64().unwrap_or_default()),
            }),
            Value::String(s) => Ok(Node::Text(s.clone())),
            Value::Sequence(items) => items
                .iter()
                .map(Node::from_yaml)
                .collect::<Result<Vec<_>>>()
                .map(Node::List),
            Value::Mapping(map) => {
                let links_to_page = map.get("link_type").and_then(Value::as_str) == Some("page");
                if links_to_page && !map.contains_key("page") {
                    return Err(missing_page_reference());
                }
                let mut fields = BTreeMap::new();
                for (key, value) in map {
                    let key = key.as_str().ok_or_else(|| {
                        SeedError::Content(format!("Mapping keys must be strings, got {key:?}"))
                    })?;
                    let node = if IMAGE_FIELDS.contains(&key) {
                        image_field(value)?
                    } else if links_to_page && key == "page" {
                        page_field(value)?
                    } else {
                        Node::from_yaml(value)?
                    };
                    fields.insert(key.to_string(), node);
                }
                Ok(Node::Map(fields))
            }
            Value::Tagged(tagged) => Node::from_yaml(&tagged.value),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Map(fields) => fields.get(key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn image_id(&self) -> Option<ImageId> {
        match self {
            Node::Image(ImageRef::Id(id)) => Some(*id),
            _ => None,
        }
    }

    pub fn page_id(&self) -> Option<PageId> {
        match self {
            Node::Page(PageRef::Id(id)) => Some(*id),
            _ => None,
        }
    }

    /// Visit every reference in the tree, depth first.
    pub fn walk_mut(&mut self, visitor: &mut dyn NodeVisitorMut) -> Result<()> {
        match self {
            Node::Image(image) => visitor.visit_image(image),
            Node::Page(page) => visitor.visit_page(page),
            Node::List(items) => items.iter_mut().try_for_each(|item| item.walk_mut(visitor)),
            Node::Map(fields) => fields
                .values_mut()
                .try_for_each(|value| value.walk_mut(visitor)),
            Node::Null | Node::Bool(_) | Node::Int(_) | Node::Float(_) | Node::Text(_) => Ok(()),
        }
    }

    pub fn resolve_images(&mut self, images: &ImageRegistry) -> Result<()> {
        self.walk_mut(&mut ImageResolver { images })
    }

    pub fn resolve_pages(&mut self, pages: &PageRegistry) -> Result<()> {
        self.walk_mut(&mut PageResolver { pages })
    }
}

fn image_field(value: &Value) -> Result<Node> {
    match value {
        Value::String(key) => Ok(Node::Image(ImageRef::Key(key.clone()))),
        Value::Number(n) => match n.as_u64() {
            Some(id) => Ok(Node::Image(ImageRef::Id(ImageId(id)))),
            None => Node::from_yaml(value),
        },
        _ => Node::from_yaml(value),
    }
}

fn page_field(value: &Value) -> Result<Node> {
    match value {
        Value::String(slug) => Ok(Node::Page(PageRef::Slug(slug.clone()))),
        Value::Number(n) => n
            .as_u64()
            .map(|id| Node::Page(PageRef::Id(PageId(id))))
            .ok_or_else(|| SeedError::Content(format!("Invalid page id: {n}"))),
        _ => Err(missing_page_reference()),
    }
}

fn missing_page_reference() -> SeedError {
    SeedError::Content("Page reference must be a slug or page id.".to_string())
}

/// Mutable pass over the references in a [`Node`] tree.
pub trait NodeVisitorMut {
    fn visit_image(&mut self, _image: &mut ImageRef) -> Result<()> {
        Ok(())
    }

    fn visit_page(&mut self, _page: &mut PageRef) -> Result<()> {
        Ok(())
    }
}

/// Rewrites image keys to the ids of generated images.
pub struct ImageResolver<'a> {
    pub images: &'a ImageRegistry,
}

impl NodeVisitorMut for ImageResolver<'_> {
    fn visit_image(&mut self, image: &mut ImageRef) -> Result<()> {
        if let ImageRef::Key(key) = image {
            let record = self
                .images
                .get(key.as_str())
                .ok_or_else(|| SeedError::Content(format!("Unknown image key: {key}")))?;
            *image = ImageRef::Id(record.id);
        }
        Ok(())
    }
}

/// Rewrites page slugs to the ids of seeded pages.
pub struct PageResolver<'a> {
    pub pages: &'a PageRegistry,
}

impl NodeVisitorMut for PageResolver<'_> {
    fn visit_page(&mut self, page: &mut PageRef) -> Result<()> {
        if let PageRef::Slug(slug) = page {
            let id = self
                .pages
                .get(slug.as_str())
                .ok_or_else(|| SeedError::Content(format!("Page not found for slug: {slug}")))?;
            *page = PageRef::Id(*id);
        }
        Ok(())
    }
}

/// One item of a stream body: `{type, value}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "type")]
    pub block_type: String,
    pub value: Node,
}

impl Block {
    pub fn new(block_type: impl Into<String>, value: Node) -> Self {
        Self {
            block_type: block_type.into(),
            value,
        }
    }

    /// Parse a stream body. A missing or null body is empty.
    pub fn parse_stream(value: Option<&Value>, field: &str) -> Result<Vec<Block>> {
        let items = match value {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Sequence(items)) => items,
            Some(_) => {
                return Err(SeedError::Content(format!("'{field}' must be a list of blocks")));
            }
        };
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let block_type = item
                    .get("type")
                    .and_then(Value::as_str)
                    .filter(|t| !t.is_empty())
                    .ok_or_else(|| {
                        SeedError::Content(format!(
                            "'{field}' block {index} must be a mapping with a string 'type'"
                        ))
                    })?;
                let value = match item.get("value") {
                    Some(value) => Node::from_yaml(value)?,
                    None => Node::Null,
                };
                Ok(Block::new(block_type, value))
            })
            .collect()
    }
}

/// Resolve image references in every block of a stream body.
pub fn resolve_block_images(blocks: &mut [Block], images: &ImageRegistry) -> Result<()> {
    let mut resolver = ImageResolver { images };
    blocks
        .iter_mut()
        .try_for_each(|block| block.value.walk_mut(&mut resolver))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ImageRecord;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    fn registry() -> ImageRegistry {
        let mut images = ImageRegistry::new();
        images.insert(
            "HERO_IMAGE".to_string(),
            ImageRecord {
                id: ImageId(9),
                title: "SEED_HERO_IMAGE".into(),
                width: 1920,
                height: 1080,
                file: "seed_hero_image.jpg".into(),
                file_hash: String::new(),
            },
        );
        images
    }

    #[test]
    fn image_fields_become_references() {
        let node = Node::from_yaml(&yaml("{image: HERO_IMAGE, photo: 4, logo: null, alt: HERO_IMAGE}"))
            .unwrap();
        assert_eq!(
            node.get("image"),
            Some(&Node::Image(ImageRef::Key("HERO_IMAGE".into())))
        );
        assert_eq!(node.get("photo"), Some(&Node::Image(ImageRef::Id(ImageId(4)))));
        assert_eq!(node.get("logo"), Some(&Node::Null));
        assert_eq!(node.get("alt"), Some(&Node::Text("HERO_IMAGE".into())));
    }

    #[test]
    fn page_field_is_a_reference_only_for_page_links() {
        let node = Node::from_yaml(&yaml(
            "[{link_type: page, page: about}, {link_type: url, page: about}]",
        ))
        .unwrap();
        let Node::List(items) = node else { panic!("expected list") };
        assert_eq!(
            items[0].get("page"),
            Some(&Node::Page(PageRef::Slug("about".into())))
        );
        assert_eq!(items[1].get("page"), Some(&Node::Text("about".into())));
    }

    #[test]
    fn page_link_without_slug_is_rejected() {
        let err = Node::from_yaml(&yaml("{link_type: page, page: [1]}")).unwrap_err();
        assert!(err.to_string().contains("slug or page id"));
    }

    #[test]
    fn page_link_needs_a_target() {
        for text in ["{label: About, link_type: page}", "{label: About, link_type: page, page: null}"] {
            let err = Node::from_yaml(&yaml(text)).unwrap_err();
            assert!(matches!(err, SeedError::Content(_)), "{text}: {err}");
        }
        // Other link types carry no page.
        assert!(Node::from_yaml(&yaml("{label: Blog, link_type: url, url: /blog}")).is_ok());
    }

    #[test]
    fn non_string_keys_are_rejected() {
        assert!(Node::from_yaml(&yaml("{1: one}")).is_err());
    }

    #[test]
    fn image_resolution_is_deep() {
        let mut node = Node::from_yaml(&yaml(
            "{cards: [{title: A, image: HERO_IMAGE}, {nested: {photo: HERO_IMAGE}}]}",
        ))
        .unwrap();
        node.resolve_images(&registry()).unwrap();

        let Some(Node::List(cards)) = node.get("cards") else { panic!("expected cards") };
        assert_eq!(cards[0].get("image").and_then(Node::image_id), Some(ImageId(9)));
        assert_eq!(
            cards[1]
                .get("nested")
                .and_then(|n| n.get("photo"))
                .and_then(Node::image_id),
            Some(ImageId(9))
        );
    }

    #[test]
    fn unknown_image_key_fails() {
        let mut node = Node::from_yaml(&yaml("{image: MISSING}")).unwrap();
        let err = node.resolve_images(&registry()).unwrap_err();
        assert_eq!(err.to_string(), "Content error: Unknown image key: MISSING");
    }

    #[test]
    fn page_resolution_uses_registry() {
        let mut pages = PageRegistry::new();
        pages.insert("about".into(), PageId(3));
        let mut node = Node::from_yaml(&yaml("{link_type: page, page: about}")).unwrap();
        node.resolve_pages(&pages).unwrap();
        assert_eq!(node.get("page").and_then(Node::page_id), Some(PageId(3)));

        let mut missing = Node::from_yaml(&yaml("{link_type: page, page: gone}")).unwrap();
        assert!(missing.resolve_pages(&pages).is_err());
    }

    #[test]
    fn stored_nodes_use_one_key_reference_objects() {
        let mut node = Node::from_yaml(&yaml("{image: HERO_IMAGE, count: 2}")).unwrap();
        node.resolve_images(&registry()).unwrap();
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json, serde_json::json!({"count": 2, "image": {"$image": 9}}));

        let back: Node = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn parse_stream_reads_typed_blocks() {
        let blocks = Block::parse_stream(
            Some(&yaml("[{type: hero, value: {image: HERO_IMAGE}}, {type: divider}]")),
            "body",
        )
        .unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].block_type, "hero");
        assert_eq!(blocks[1].value, Node::Null);
    }

    #[test]
    fn parse_stream_rejects_untyped_blocks() {
        let err = Block::parse_stream(Some(&yaml("[{value: 1}]")), "body").unwrap_err();
        assert!(matches!(err, SeedError::Content(_)));
        assert!(Block::parse_stream(Some(&yaml("{type: hero}")), "body").is_err());
        assert!(Block::parse_stream(None, "body").unwrap().is_empty());
    }
}
