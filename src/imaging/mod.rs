//! Placeholder images: pure Rust, no external tools.
//!
//! | Step | Where |
//! |---|---|
//! | **Naming / reuse** | [`ImageManager`], titles `{prefix}_{key}` |
//! | **Colors** | [`Palette`], named colors or hex |
//! | **Layout** | centered label, `{w}x{h}` caption bottom-left |
//! | **Pixels → JPEG** | [`RustBackend`] (`image` crate, quality 85) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for text layout (unit testable)
//! - **Parameters**: Data structures describing one placeholder
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Manager**: [`ImageManager`] and the [`ImageSpec`] manifests it consumes

pub mod backend;
mod calculations;
mod font;
mod manager;
mod manifest;
mod palette;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use calculations::{PlaceholderLayout, font_scale, layout_placeholder, text_size};
pub use manager::{ImageManager, ImageOptions, ImageRegistry};
pub use manifest::{ImageSpec, default_manifest};
pub use palette::{DEFAULT_BACKGROUND, DEFAULT_PALETTE, DEFAULT_TEXT, Palette, parse_hex};
pub use params::{FONT_SIZE, PlaceholderParams, Quality, Rgb};
pub use rust_backend::RustBackend;
