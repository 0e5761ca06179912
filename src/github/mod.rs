//! GitHub releases API access: repository identifiers, the release schema,
//! and the fetch client with its error taxonomy.

pub mod client;
pub mod error;
pub mod repo;
pub mod types;

pub use client::{FetchReleases, ReleaseClient};
pub use error::FetchError;
pub use repo::GitHubRepo;
pub use types::{Release, ReleaseAsset};

#[cfg(test)]
pub use client::MockFetchReleases;
