//! Placeholder rendering backend trait and shared types.
//!
//! The [`ImageBackend`] trait turns [`PlaceholderParams`] into encoded image
//! bytes. The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use the recording `MockBackend` below so image bookkeeping can
//! be checked without encoding anything.

use super::params::PlaceholderParams;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("Invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Trait for placeholder rendering backends.
pub trait ImageBackend {
    /// Draw a placeholder and return the encoded JPEG bytes.
    fn render_placeholder(&self, params: &PlaceholderParams) -> Result<Vec<u8>, BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock backend that records render calls and returns a tiny fake file.
    ///
    /// Clones share the recording, so a test can keep one handle while the
    /// image manager owns another.
    #[derive(Clone, Default)]
    pub struct MockBackend {
        pub renders: Arc<Mutex<Vec<PlaceholderParams>>>,
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn get_renders(&self) -> Vec<PlaceholderParams> {
            self.renders.lock().unwrap().clone()
        }
    }

    impl ImageBackend for MockBackend {
        fn render_placeholder(
            &self,
            params: &PlaceholderParams,
        ) -> Result<Vec<u8>, BackendError> {
            if params.width == 0 || params.height == 0 {
                return Err(BackendError::InvalidDimensions {
                    width: params.width,
                    height: params.height,
                });
            }
            self.renders.lock().unwrap().push(params.clone());
            Ok(format!("{}:{}x{}", params.label, params.width, params.height).into_bytes())
        }
    }

    #[test]
    fn mock_records_renders() {
        let backend = MockBackend::new();
        let handle = backend.clone();
        let bytes = backend
            .render_placeholder(&PlaceholderParams {
                width: 40,
                height: 20,
                background: [0, 0, 0],
                foreground: [255, 255, 255],
                label: "Hero".into(),
                caption: "40x20".into(),
                font_size: 24,
                quality: Default::default(),
            })
            .unwrap();

        assert_eq!(bytes, b"Hero:40x20");
        assert_eq!(handle.get_renders().len(), 1);
    }
}
