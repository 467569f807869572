//! Error type shared by the loader, seeders and orchestrator.
//!
//! Every failure is raised eagerly and carries a human-readable message. The
//! variants mirror where the problem was found:
//!
//! | Variant          | Raised when                                          |
//! |------------------|------------------------------------------------------|
//! | `ContentProfile` | a profile, required file or directory is missing     |
//! | `ContentSchema`  | YAML is invalid or fails structural validation       |
//! | `Registration`   | a seeder name is registered twice, or seeders cycle  |
//! | `NotFound`       | a seeder name is unknown, or none are registered     |
//! | `Page`           | a required parent or root page does not exist        |
//! | `Slug`           | no slug can be derived, even from the fallback       |
//! | `Content`        | seeder input is malformed (unknown keys, bad types)  |

use crate::config::ConfigError;
use crate::imaging::BackendError;
use crate::store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Content profile error: {0}")]
    ContentProfile(String),
    #[error("Content schema error: {0}")]
    ContentSchema(String),
    #[error("Seeder registration error: {0}")]
    Registration(String),
    #[error("Seeder not found: {0}")]
    NotFound(String),
    #[error("Page error: {0}")]
    Page(String),
    #[error("Slug error: {0}")]
    Slug(String),
    #[error("Content error: {0}")]
    Content(String),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Image error: {0}")]
    Image(#[from] BackendError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = SeedError> = std::result::Result<T, E>;
