//! # sum-seed
//!
//! Idempotent content seeding for multi-tenant sites. A content profile is a
//! directory of YAML files; seeding it creates (or updates) the home page,
//! the pages below it, blog categories and posts, placeholder images and the
//! site record with its branding and navigation settings.
//!
//! # Architecture: One Transactional Run
//!
//! ```text
//! content/<profile>/*.yaml ─→ ContentLoader ─→ ProfileData (validated, interpolated)
//!                                                   │
//!             SeederRegistry ─→ ordered seeders ────┤
//!                                                   ▼
//!                   ┌──────────── store transaction ─────────────┐
//!                   │ ImageManager: manifest → stored images     │
//!                   │ page seeders: home, about, …, blog, legal  │
//!                   │ SiteSeeder: site record, branding, menus   │
//!                   └──────────── commit or roll back ───────────┘
//! ```
//!
//! Every step writes through the [`store::ContentStore`] trait, so a failed
//! run leaves the store exactly as it was.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`content`] | Profile loading, validation, `${path}` interpolation, the typed block tree |
//! | [`imaging`] | Placeholder images: naming, palette, layout, JPEG rendering, the manifest |
//! | [`registry`] | The [`registry::Seeder`] trait, seed context and the explicit seeder registry |
//! | [`pages`] | Built-in page seeders and the shared upsert/legacy-rename helpers |
//! | [`site`] | Site record, branding settings and header/footer navigation |
//! | [`orchestrator`] | Seeder ordering, clearing and the transactional run |
//! | [`store`] | The page-tree boundary and the JSON-backed in-memory store |
//! | [`slug`] | Slug generation with transliteration and fallbacks |
//! | [`config`] | `seed.toml` loading, validation and layering over stock defaults |
//! | [`output`] | CLI output formatting for plans, runs and profile listings |
//! | [`error`] | The shared [`error::SeedError`] |
//!
//! # Design Decisions
//!
//! ## Idempotence by Lookup, Not by Bookkeeping
//!
//! No run log is kept. Pages are found by parent and slug, images by their
//! `{prefix}_{key}` title, categories by slug and the site by host and port.
//! Seeding twice finds everything the first run made and updates it in place,
//! so ids stay stable across runs.
//!
//! ## Conflicts Are Renamed, Never Deleted
//!
//! A page of another type sitting on a slug a seeder needs is moved aside to
//! `{slug}-legacy-{id}` with ` (Legacy)` appended to its title. Hand-made
//! content survives a seed; only `--clear` deletes.
//!
//! ## Explicit Registry and Declared Dependencies
//!
//! Seeders are registered on a [`registry::SeederRegistry`] value handed to
//! the orchestrator. Each seeder declares the page names it `produces` and
//! `consumes`; the orchestrator sorts them topologically and uses the
//! configured order only to break ties. A cycle is a registration error.
//!
//! ## Typed Content Tree
//!
//! Page bodies are parsed into [`content::Block`]s of [`content::Node`]s up
//! front. Image and page references are resolved by visitors over that tree,
//! so unknown image keys fail before anything is written.
//!
//! ## Pure-Rust Placeholders
//!
//! Images are drawn with the `image` crate and an embedded bitmap font. No
//! system tools, no network.

pub mod config;
pub mod content;
pub mod error;
pub mod imaging;
pub mod orchestrator;
pub mod output;
pub mod pages;
pub mod registry;
pub mod site;
pub mod slug;
pub mod store;

#[cfg(test)]
pub(crate) mod test_helpers;
