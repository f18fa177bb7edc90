//! Business logic services.

pub mod accounts;
pub mod analytics;
pub mod documents;
pub mod github_oauth;
pub mod jobs;
pub mod profile;
pub mod storage;

pub use github_oauth::configure_routes as configure_oauth_routes;
pub use storage::{BlobStore, MemoryStorage, S3Storage};
