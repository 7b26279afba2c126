//! The package feed seam and a local-folder implementation.

use crate::error::FeedError;
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

/// Source of package ids and versions for completion.
///
/// Both calls may be slow (disk or network) and may fail. Callers treat a
/// failure as "no suggestions".
#[async_trait]
pub trait PackageFeed: Send + Sync {
    /// Package ids starting with `prefix`, ignoring case, de-duplicated and
    /// in a stable order.
    async fn suggest_ids(&self, prefix: &str) -> Result<Vec<String>, FeedError>;

    /// Known versions of `package_id`, newest first.
    async fn suggest_versions(&self, package_id: &str) -> Result<Vec<String>, FeedError>;
}

/// Package folders in the global-packages layout:
/// `<source>/<lowercase-id>/<version>/`.
///
/// A source that does not exist contributes nothing. Any other I/O failure
/// fails the call, with every failing source reported.
#[derive(Debug, Clone, Default)]
pub struct LocalPackageFeed {
    sources: Vec<PathBuf>,
}

impl LocalPackageFeed {
    pub fn new(sources: Vec<PathBuf>) -> Self {
        Self { sources }
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }
}

#[async_trait]
impl PackageFeed for LocalPackageFeed {
    async fn suggest_ids(&self, prefix: &str) -> Result<Vec<String>, FeedError> {
        let prefix = prefix.to_lowercase();
        let mut ids = BTreeSet::new();
        let mut errors = Vec::new();

        for source in &self.sources {
            match list_directories(source).await {
                Ok(names) => ids.extend(
                    names
                        .into_iter()
                        .filter(|name| name.to_lowercase().starts_with(&prefix)),
                ),
                Err(err) => errors.push(err),
            }
        }

        into_result(ids.into_iter().collect(), errors)
    }

    async fn suggest_versions(&self, package_id: &str) -> Result<Vec<String>, FeedError> {
        validate_package_id(package_id)?;
        let folder = package_id.to_lowercase();
        let mut versions = BTreeSet::new();
        let mut errors = Vec::new();

        for source in &self.sources {
            match list_directories(&source.join(&folder)).await {
                Ok(names) => versions.extend(names),
                Err(err) => errors.push(err),
            }
        }

        let mut versions: Vec<String> = versions.into_iter().collect();
        versions.sort_by(|a, b| compare_versions(b, a));
        into_result(versions, errors)
    }
}

fn into_result(values: Vec<String>, mut errors: Vec<FeedError>) -> Result<Vec<String>, FeedError> {
    match errors.len() {
        0 => Ok(values),
        1 => Err(errors.remove(0)),
        _ => Err(FeedError::Aggregate(errors)),
    }
}

/// Ids become folder names, so anything that could leave the source folder
/// is rejected.
fn validate_package_id(package_id: &str) -> Result<(), FeedError> {
    let invalid = package_id.is_empty()
        || package_id == "."
        || package_id == ".."
        || package_id.contains(['/', '\\', ':']);
    if invalid {
        return Err(FeedError::InvalidPackageId(package_id.to_string()));
    }
    Ok(())
}

/// Names of the subdirectories of `dir`; empty if `dir` does not exist.
async fn list_directories(dir: &Path) -> Result<Vec<String>, FeedError> {
    let io_error = |source: io::Error| FeedError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(io_error(err)),
    };

    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
        let is_dir = entry.file_type().await.map_err(io_error)?.is_dir();
        if let (true, Some(name)) = (is_dir, entry.file_name().to_str()) {
            names.push(name.to_string());
        }
    }
    Ok(names)
}

/// Order two version strings such as `1.10.0` and `2.0.0-preview.3`.
///
/// Dot-separated components compare numerically when both are numbers and
/// as text (ignoring case) otherwise. A release sorts after its own
/// prereleases.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let (a_release, a_pre) = split_prerelease(a);
    let (b_release, b_pre) = split_prerelease(b);

    compare_components(a_release, b_release).then_with(|| match (a_pre, b_pre) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a_pre), Some(b_pre)) => compare_components(a_pre, b_pre),
    })
}

fn split_prerelease(version: &str) -> (&str, Option<&str>) {
    // Build metadata never affects ordering
    let version = version.split('+').next().unwrap_or(version);
    match version.split_once('-') {
        Some((release, pre)) => (release, Some(pre)),
        None => (version, None),
    }
}

fn compare_components(a: &str, b: &str) -> Ordering {
    let mut a_parts = a.split('.');
    let mut b_parts = b.split('.');
    loop {
        match (a_parts.next(), b_parts.next()) {
            (None, None) => return Ordering::Equal,
            // `1.0` and `1.0.0` are the same release
            (Some(part), None) => {
                if part.parse::<u64>().is_ok_and(|n| n == 0) {
                    continue;
                }
                return Ordering::Greater;
            }
            (None, Some(part)) => {
                if part.parse::<u64>().is_ok_and(|n| n == 0) {
                    continue;
                }
                return Ordering::Less;
            }
            (Some(a), Some(b)) => {
                let ordering = match (a.parse::<u64>(), b.parse::<u64>()) {
                    (Ok(a), Ok(b)) => a.cmp(&b),
                    (Ok(_), Err(_)) => Ordering::Less,
                    (Err(_), Ok(_)) => Ordering::Greater,
                    (Err(_), Err(_)) => a.to_lowercase().cmp(&b.to_lowercase()),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_packages(root: &Path, packages: &[(&str, &[&str])]) {
        for (id, versions) in packages {
            for version in *versions {
                std::fs::create_dir_all(root.join(id).join(version)).unwrap();
            }
        }
    }

    #[test]
    fn numeric_components_compare_as_numbers() {
        assert_eq!(compare_versions("1.10.0", "1.9.0"), Ordering::Greater);
        assert_eq!(compare_versions("2.0", "2.0.0"), Ordering::Equal);
        assert_eq!(compare_versions("1.0.0", "1.0.1"), Ordering::Less);
    }

    #[test]
    fn prereleases_sort_before_release() {
        assert_eq!(compare_versions("2.0.0-preview.3", "2.0.0"), Ordering::Less);
        assert_eq!(
            compare_versions("2.0.0-preview.10", "2.0.0-preview.9"),
            Ordering::Greater
        );
        assert_eq!(compare_versions("2.0.0-beta", "2.0.0-alpha"), Ordering::Greater);
        assert_eq!(compare_versions("1.0.0+build.5", "1.0.0"), Ordering::Equal);
    }

    #[tokio::test]
    async fn ids_match_prefix_ignoring_case() {
        let root = tempfile::tempdir().unwrap();
        make_packages(
            root.path(),
            &[
                ("newtonsoft.json", &["13.0.3"]),
                ("newtonsoft.json.bson", &["1.0.2"]),
                ("serilog", &["3.1.1"]),
            ],
        );
        std::fs::write(root.path().join("new.txt"), "not a package").unwrap();

        let feed = LocalPackageFeed::new(vec![root.path().to_path_buf()]);
        let ids = feed.suggest_ids("New").await.unwrap();
        assert_eq!(ids, vec!["newtonsoft.json", "newtonsoft.json.bson"]);
    }

    #[tokio::test]
    async fn versions_are_newest_first_across_sources() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        make_packages(first.path(), &[("serilog", &["2.12.0", "3.1.1"])]);
        make_packages(second.path(), &[("serilog", &["3.1.1", "4.0.0-dev-02"])]);

        let feed = LocalPackageFeed::new(vec![
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ]);
        let versions = feed.suggest_versions("Serilog").await.unwrap();
        assert_eq!(versions, vec!["4.0.0-dev-02", "3.1.1", "2.12.0"]);
    }

    #[tokio::test]
    async fn missing_sources_contribute_nothing() {
        let feed = LocalPackageFeed::new(vec![PathBuf::from("/definitely/not/here")]);
        assert!(feed.suggest_ids("a").await.unwrap().is_empty());
        assert!(feed.suggest_versions("a").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn path_like_ids_are_rejected() {
        let feed = LocalPackageFeed::default();
        for id in ["", "..", "a/b", "c:\\x"] {
            assert!(matches!(
                feed.suggest_versions(id).await,
                Err(FeedError::InvalidPackageId(_))
            ));
        }
    }

    #[tokio::test]
    async fn unreadable_sources_are_aggregated() {
        // A regular file where a directory is expected cannot be listed
        let dir = tempfile::tempdir().unwrap();
        let not_a_dir = dir.path().join("file");
        std::fs::write(&not_a_dir, "x").unwrap();

        let feed = LocalPackageFeed::new(vec![not_a_dir.clone(), not_a_dir]);
        match feed.suggest_ids("").await {
            Err(FeedError::Aggregate(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected aggregate error, got {other:?}"),
        }
    }
}
