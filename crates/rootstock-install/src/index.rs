use serde::Deserialize;

use crate::error::Result;

const DIGEST_PREFIX: &str = "sha256:";

/// One installable archive from the package index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDescriptor {
    pub id: String,
    /// Virtual path of the `.tar.gz` inside the asset source.
    pub asset_path: String,
    /// Lowercase hex SHA-256 of the archive bytes, when declared.
    pub expected_digest: Option<String>,
    /// Extraction root relative to the prefix. Defaults to `opt/<id>`.
    pub install_dir: Option<String>,
    /// Required packages abort the install on failure; optional ones
    /// are skipped with a warning.
    pub required: bool,
}

#[derive(Debug, Deserialize)]
struct RawIndex {
    #[serde(default)]
    packages: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawPackage {
    asset_path: String,
    #[serde(default)]
    checksum: Option<String>,
    #[serde(default)]
    install_dir: Option<String>,
    #[serde(default)]
    required: bool,
}

/// Parsed package index.
#[derive(Debug, Clone, Default)]
pub struct PackageIndex {
    packages: Vec<PackageDescriptor>,
}

impl PackageIndex {
    pub fn parse(json: &str) -> Result<Self> {
        let raw: RawIndex = serde_json::from_str(json)?;
        let mut packages = Vec::with_capacity(raw.packages.len());
        for (id, value) in raw.packages {
            let pkg: RawPackage = serde_json::from_value(value)?;
            packages.push(PackageDescriptor {
                id,
                asset_path: pkg.asset_path,
                expected_digest: pkg.checksum.map(|c| normalize_digest(&c)),
                install_dir: pkg.install_dir,
                required: pkg.required,
            });
        }
        Ok(Self { packages })
    }

    pub fn packages(&self) -> &[PackageDescriptor] {
        &self.packages
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// Accepts both bare hex and `sha256:`-prefixed digests.
fn normalize_digest(raw: &str) -> String {
    raw.strip_prefix(DIGEST_PREFIX)
        .unwrap_or(raw)
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_descriptor() {
        let index = PackageIndex::parse(
            r#"{
                "packages": {
                    "node": {
                        "asset_path": "packages/node.tar.gz",
                        "checksum": "sha256:ABCDEF0123",
                        "install_dir": "opt/runtime",
                        "required": true
                    }
                }
            }"#,
        )
        .unwrap();

        let pkg = &index.packages()[0];
        assert_eq!(pkg.id, "node");
        assert_eq!(pkg.asset_path, "packages/node.tar.gz");
        assert_eq!(pkg.expected_digest.as_deref(), Some("abcdef0123"));
        assert_eq!(pkg.install_dir.as_deref(), Some("opt/runtime"));
        assert!(pkg.required);
    }

    #[test]
    fn test_parse_defaults() {
        let index = PackageIndex::parse(
            r#"{"packages": {"extras": {"asset_path": "extras.tar.gz"}}}"#,
        )
        .unwrap();

        let pkg = &index.packages()[0];
        assert_eq!(pkg.expected_digest, None);
        assert_eq!(pkg.install_dir, None);
        assert!(!pkg.required);
    }

    #[test]
    fn test_parse_bare_digest_kept_as_is() {
        let index = PackageIndex::parse(
            r#"{"packages": {"a": {"asset_path": "a.tar.gz", "checksum": "00ff"}}}"#,
        )
        .unwrap();
        assert_eq!(index.packages()[0].expected_digest.as_deref(), Some("00ff"));
    }

    #[test]
    fn test_parse_empty_document() {
        assert!(PackageIndex::parse("{}").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(PackageIndex::parse("not json").is_err());
        assert!(PackageIndex::parse(r#"{"packages": {"a": {}}}"#).is_err());
    }
}
