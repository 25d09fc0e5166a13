use anyhow::{Context, Result};
use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::de::DeserializeOwned;
use std::fmt::Display;

use reqwest::{
    header::{HeaderMap, ACCEPT, AUTHORIZATION, USER_AGENT},
    Client, ClientBuilder, Response, StatusCode,
};

use super::{GithubClient, Owner, OwnerKind, Package, PackageVersion, Repository};
use crate::error::Error;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const PACKAGE_TYPE: &str = "container";
const PER_PAGE: u32 = 100;

/// Characters escaped in a single path segment. Container package names may
/// contain slashes.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'?');

/// Account scope of the owner-specific package endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerScope {
    User(String),
    Organization(String),
}

impl OwnerScope {
    /// Fails for owner kinds other than users and organizations. `subject`
    /// names the thing being dispatched on in the error message.
    pub fn from_owner(owner: &Owner, subject: impl Display) -> Result<Self, Error> {
        match &owner.kind {
            OwnerKind::Organization => Ok(Self::Organization(owner.login.clone())),
            OwnerKind::User => Ok(Self::User(owner.login.clone())),
            kind @ OwnerKind::Unknown(_) => Err(Error::UnknownOwnerKind {
                subject: subject.to_string(),
                kind: kind.clone(),
            }),
        }
    }

    fn base_path(&self) -> String {
        match self {
            Self::User(user) => format!("users/{}", encode(user)),
            Self::Organization(org) => format!("orgs/{}", encode(org)),
        }
    }
}

impl Display for OwnerScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User(user) => f.write_str(user),
            Self::Organization(org) => f.write_str(org),
        }
    }
}

fn encode(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

pub struct GithubClientImpl {
    client: Client,
    api_url: String,
}

impl GithubClientImpl {
    pub fn new(token: impl AsRef<str>, api_url: impl Into<String>) -> Result<Self> {
        let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        log::debug!("{}: {}", USER_AGENT.as_str(), user_agent);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, "application/vnd.github.v3+json".try_into()?);
        headers.insert(
            AUTHORIZATION,
            format!("Bearer {}", token.as_ref()).try_into()?,
        );
        headers.insert(USER_AGENT, user_agent.try_into()?);

        let client = ClientBuilder::new().default_headers(headers).build()?;
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, api_url })
    }

    /// Fetches every page of a list endpoint.
    async fn get_all<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page = 1;
        loop {
            log::debug!("GET {} (page {})", url, page);
            let response = self
                .client
                .get(url)
                .query(&[("package_type", PACKAGE_TYPE)])
                .query(&[("per_page", PER_PAGE), ("page", page)])
                .send()
                .await
                .context("Failed to send request")?;

            let batch: Vec<T> = check_status(response, what)
                .await?
                .json()
                .await
                .context("Failed to parse reply as json")?;

            let last = batch.len() < PER_PAGE as usize;
            items.extend(batch);
            if last {
                break;
            }

            page += 1;
        }

        Ok(items)
    }
}

async fn check_status(response: Response, what: &str) -> Result<Response> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(Error::NotFound(what.to_string()).into());
    } else if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Transport { status, body }.into());
    }

    Ok(response)
}

#[async_trait]
impl GithubClient for GithubClientImpl {
    async fn get_repository(&self, owner: &str, name: &str) -> Result<Repository> {
        let url = format!("{}/repos/{}/{}", self.api_url, encode(owner), encode(name));
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send request")?;

        let repository = check_status(response, &format!("Repository {}/{}", owner, name))
            .await?
            .json()
            .await
            .context("Failed to parse reply as json")?;

        Ok(repository)
    }

    async fn list_packages(&self, scope: &OwnerScope) -> Result<Vec<Package>> {
        let url = format!("{}/{}/packages", self.api_url, scope.base_path());
        self.get_all(&url, &format!("Owner {}", scope)).await
    }

    async fn list_package_versions(
        &self,
        scope: &OwnerScope,
        package_name: &str,
    ) -> Result<Vec<PackageVersion>> {
        let url = format!(
            "{}/{}/packages/{}/{}/versions",
            self.api_url,
            scope.base_path(),
            PACKAGE_TYPE,
            encode(package_name),
        );
        self.get_all(&url, &format!("Package {}/{}", scope, package_name))
            .await
    }

    async fn delete_package_version(
        &self,
        scope: &OwnerScope,
        package_name: &str,
        version_id: u64,
    ) -> Result<()> {
        let url = format!(
            "{}/{}/packages/{}/{}/versions/{}",
            self.api_url,
            scope.base_path(),
            PACKAGE_TYPE,
            encode(package_name),
            version_id,
        );
        log::debug!("DELETE {}", url);

        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .context("Failed to send request")?;

        check_status(
            response,
            &format!("Version {} of package {}/{}", version_id, scope, package_name),
        )
        .await?;
        Ok(())
    }
}
