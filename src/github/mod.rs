use anyhow::Result;
use async_trait::async_trait;

mod api;
mod client;

pub use api::*;
pub use client::{GithubClientImpl, OwnerScope, DEFAULT_API_URL};

/// The subset of the GitHub REST API needed to clean container packages.
///
/// Every owner-specific endpoint is addressed through an [`OwnerScope`], and all
/// package endpoints are limited to the `container` package type.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GithubClient: Send + Sync {
    async fn get_repository(&self, owner: &str, name: &str) -> Result<Repository>;

    /// Lists all container packages owned by `scope`.
    async fn list_packages(&self, scope: &OwnerScope) -> Result<Vec<Package>>;

    /// Lists all versions of a container package.
    async fn list_package_versions(
        &self,
        scope: &OwnerScope,
        package_name: &str,
    ) -> Result<Vec<PackageVersion>>;

    async fn delete_package_version(
        &self,
        scope: &OwnerScope,
        package_name: &str,
        version_id: u64,
    ) -> Result<()>;
}
