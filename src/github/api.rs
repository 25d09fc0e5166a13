use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub full_name: String,
    pub owner: Owner,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    pub login: String,
    #[serde(rename = "type")]
    pub kind: OwnerKind,
}

/// Kind of account owning a repository or package.
///
/// Kinds this tool does not know about are kept verbatim so that dispatching
/// on them can fail with a meaningful message.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum OwnerKind {
    Organization,
    User,
    Unknown(String),
}

impl From<String> for OwnerKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "Organization" => Self::Organization,
            "User" => Self::User,
            _ => Self::Unknown(kind),
        }
    }
}

impl From<OwnerKind> for String {
    fn from(kind: OwnerKind) -> Self {
        kind.to_string()
    }
}

impl Display for OwnerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Organization => f.write_str("Organization"),
            Self::User => f.write_str("User"),
            Self::Unknown(kind) => f.write_str(kind),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub name: String,
    pub owner: Owner,
    /// Missing for packages that are not linked to any repository.
    #[serde(default)]
    pub repository: Option<PackageRepository>,
}

impl Package {
    pub fn is_linked_to(&self, repository: &Repository) -> bool {
        self.repository
            .as_ref()
            .map_or(false, |linked| linked.full_name == repository.full_name)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PackageRepository {
    pub full_name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PackageVersion {
    pub id: u64,
    pub name: String,
    pub metadata: PackageVersionMetadata,
}

impl PackageVersion {
    pub fn is_untagged(&self) -> bool {
        self.metadata.container.tags.is_empty()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PackageVersionMetadata {
    pub package_type: String,
    pub container: ContainerVersionMetadata,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ContainerVersionMetadata {
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_kind_deserialization() {
        let owner: Owner = serde_json::from_str(r#"{"login": "acme", "type": "Organization"}"#).unwrap();
        assert_eq!(owner.kind, OwnerKind::Organization);

        let owner: Owner = serde_json::from_str(r#"{"login": "octocat", "type": "User"}"#).unwrap();
        assert_eq!(owner.kind, OwnerKind::User);

        let owner: Owner = serde_json::from_str(r#"{"login": "x", "type": "Enterprise"}"#).unwrap();
        assert_eq!(owner.kind, OwnerKind::Unknown("Enterprise".to_string()));
        assert_eq!(owner.kind.to_string(), "Enterprise");
    }

    #[test]
    fn test_package_linkage() {
        let repository = Repository {
            full_name: "acme/widgets".to_string(),
            owner: Owner {
                login: "acme".to_string(),
                kind: OwnerKind::Organization,
            },
        };

        let package: Package = serde_json::from_str(
            r#"{
                "name": "widgets",
                "owner": {"login": "acme", "type": "Organization"},
                "repository": {"full_name": "acme/widgets"}
            }"#,
        )
        .unwrap();
        assert!(package.is_linked_to(&repository));

        let package: Package = serde_json::from_str(
            r#"{
                "name": "gadgets",
                "owner": {"login": "acme", "type": "Organization"},
                "repository": {"full_name": "acme/gadgets"}
            }"#,
        )
        .unwrap();
        assert!(!package.is_linked_to(&repository));

        let package: Package = serde_json::from_str(
            r#"{"name": "orphan", "owner": {"login": "acme", "type": "Organization"}}"#,
        )
        .unwrap();
        assert!(!package.is_linked_to(&repository));
    }

    #[test]
    fn test_untagged_version() {
        let version: PackageVersion = serde_json::from_str(
            r#"{
                "id": 1,
                "name": "sha256:foobar1",
                "metadata": {"package_type": "container", "container": {"tags": []}}
            }"#,
        )
        .unwrap();
        assert!(version.is_untagged());

        let version: PackageVersion = serde_json::from_str(
            r#"{
                "id": 2,
                "name": "sha256:foobar2",
                "metadata": {"package_type": "container", "container": {"tags": ["latest"]}}
            }"#,
        )
        .unwrap();
        assert!(!version.is_untagged());
    }
}
