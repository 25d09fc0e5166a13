//! Removal of untagged container versions linked to a repository.
//!
//! The cleanup runs as a linear pipeline: resolve the repository, list its
//! linked container packages, select their untagged versions, delete them.
//! Any failure aborts the remaining stages.

use anyhow::{Context, Result};
use futures::future::try_join_all;

use crate::error::Error;
use crate::github::{GithubClient, OwnerScope, Package, PackageVersion, Repository};

/// Repository identifier of the form `owner/name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepositoryRef<'a> {
    pub owner: &'a str,
    pub name: &'a str,
}

impl<'a> RepositoryRef<'a> {
    pub fn parse(input: &'a str) -> Result<Self, Error> {
        match input.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(Self { owner, name })
            }
            _ => Err(Error::InvalidRepository(input.to_string())),
        }
    }
}

/// An untagged version together with the package it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionWithOwner {
    pub version: PackageVersion,
    pub package: Package,
}

/// Runs the whole cleanup and returns the ids of all deleted versions.
pub async fn run(client: &impl GithubClient, repository: &str) -> Result<Vec<u64>> {
    let repository = resolve_repository(client, repository).await?;
    let packages = list_linked_packages(client, &repository).await?;
    let versions = select_untagged_versions(client, &packages).await?;
    delete_versions(client, &versions).await
}

pub async fn resolve_repository(client: &impl GithubClient, input: &str) -> Result<Repository> {
    log::info!("Fetching the {} repository", input);

    let repository_ref = RepositoryRef::parse(input)?;
    let repository = client
        .get_repository(repository_ref.owner, repository_ref.name)
        .await
        .context(format!("Failed to fetch repository {}", input))?;

    log::debug!(
        "Repository {} is owned by {} ({})",
        repository.full_name,
        repository.owner.login,
        repository.owner.kind,
    );
    Ok(repository)
}

/// Lists the container packages of the repository's owner that are linked to
/// the repository itself.
pub async fn list_linked_packages(
    client: &impl GithubClient,
    repository: &Repository,
) -> Result<Vec<Package>> {
    log::info!("Fetching the repository's linked container packages");

    let scope = OwnerScope::from_owner(
        &repository.owner,
        format!("repository {}", repository.full_name),
    )?;
    let packages = client
        .list_packages(&scope)
        .await
        .context(format!("Failed to list the container packages of {}", scope))?;

    let linked: Vec<_> = packages
        .into_iter()
        .filter(|package| package.is_linked_to(repository))
        .collect();

    log::debug!(
        "Linked packages: {:?}",
        linked.iter().map(|package| &package.name).collect::<Vec<_>>(),
    );
    Ok(linked)
}

/// Fetches the versions of all packages concurrently and keeps the ones
/// without any tag. Fails as a whole if any package fails.
pub async fn select_untagged_versions(
    client: &impl GithubClient,
    packages: &[Package],
) -> Result<Vec<VersionWithOwner>> {
    log::info!("Fetching the packages' untagged versions");

    let per_package = try_join_all(
        packages
            .iter()
            .map(|package| select_package_versions(client, package)),
    )
    .await?;

    Ok(per_package.into_iter().flatten().collect())
}

async fn select_package_versions(
    client: &impl GithubClient,
    package: &Package,
) -> Result<Vec<VersionWithOwner>> {
    let scope = OwnerScope::from_owner(&package.owner, format!("package {}", package.name))?;
    let versions = client
        .list_package_versions(&scope, &package.name)
        .await
        .context(format!(
            "Failed to get versions of package {}/{}",
            scope, package.name,
        ))?;

    let untagged: Vec<_> = versions
        .into_iter()
        .filter(PackageVersion::is_untagged)
        .map(|version| VersionWithOwner {
            version,
            package: package.clone(),
        })
        .collect();

    log::debug!(
        "Package {}/{} has {} untagged versions",
        scope,
        package.name,
        untagged.len(),
    );
    Ok(untagged)
}

/// Deletes all given versions concurrently and returns their ids. Versions
/// deleted before a failure stay deleted.
pub async fn delete_versions(
    client: &impl GithubClient,
    versions: &[VersionWithOwner],
) -> Result<Vec<u64>> {
    if versions.is_empty() {
        return Ok(Vec::new());
    }

    log::info!("Deleting the packages' untagged versions");

    try_join_all(versions.iter().map(|version| delete_version(client, version))).await
}

async fn delete_version(client: &impl GithubClient, version: &VersionWithOwner) -> Result<u64> {
    let package = &version.package;
    let scope = OwnerScope::from_owner(
        &package.owner,
        format!("version {} of package {}", version.version.id, package.name),
    )?;

    log::info!(
        "Deleting {}/{}:{}",
        scope,
        package.name,
        version.version.name,
    );
    client
        .delete_package_version(&scope, &package.name, version.version.id)
        .await
        .context(format!(
            "Failed to delete version {} of package {}/{}",
            version.version.id, scope, package.name,
        ))?;

    Ok(version.version.id)
}

/// Logs the outcome of a successful run.
pub fn report(deleted_version_ids: &[u64]) {
    log::info!("👍 Success!");
    log::info!("{}", summary(deleted_version_ids));
}

fn summary(deleted_version_ids: &[u64]) -> String {
    if deleted_version_ids.is_empty() {
        return "There were no untagged versions to remove.".to_string();
    }

    let ids: Vec<_> = deleted_version_ids.iter().map(u64::to_string).collect();
    format!(
        "The following untagged versions were removed: {}.",
        ids.join(", "),
    )
}
