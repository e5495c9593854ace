//! Dataset locations backed by the object_store crate.
//!
//! A [`Location`] is either a local filesystem path or a URL on one of the
//! supported object stores. Remote locations know how to build the
//! [`ObjectStore`] that serves them so a query session can register it, and
//! every location can be cleared before a job overwrites it.

use futures::TryStreamExt;
use object_store::{ObjectStore, local::LocalFileSystem, path::Path as ObjectPath};
use std::fmt;
use std::path::{Component, MAIN_SEPARATOR, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

use crate::error::{CommonError, ErrorContext, Result};

/// Object store families a remote location can live on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteScheme {
    S3,
    Gcs,
    Azure,
}

impl RemoteScheme {
    fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme {
            "s3" | "s3a" => Some(Self::S3),
            "gs" => Some(Self::Gcs),
            "az" | "adl" | "azure" | "abfs" | "abfss" => Some(Self::Azure),
            _ => None,
        }
    }
}

/// Where a dataset is read from or written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// A path on the local filesystem.
    Local { path: PathBuf },
    /// A URL on a remote object store.
    Remote { url: Url, scheme: RemoteScheme },
}

impl Location {
    /// Parse a user supplied path or URL.
    ///
    /// Strings without a `scheme://` prefix and `file://` URLs are local.
    pub fn parse(location: &str) -> Result<Self> {
        if location.trim().is_empty() {
            return Err(CommonError::configuration_error("Location must not be empty"));
        }

        if !location.contains("://") {
            return Ok(Self::Local {
                path: PathBuf::from(location),
            });
        }

        let url = Url::parse(location)
            .with_configuration_context(|| format!("Invalid location URL '{}'", location))?;

        if url.scheme() == "file" {
            let path = url.to_file_path().map_err(|_| {
                CommonError::configuration_error(format!("Invalid file URL '{}'", location))
            })?;
            return Ok(Self::Local { path });
        }

        match RemoteScheme::from_scheme(url.scheme()) {
            Some(scheme) => {
                if url.host_str().is_none_or(str::is_empty) {
                    return Err(CommonError::configuration_error(format!(
                        "Remote location '{}' has no bucket or container",
                        location
                    )));
                }
                Ok(Self::Remote { url, scheme })
            }
            None => Err(CommonError::unsupported_scheme(url.scheme(), location)),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }

    /// The string handed to the query engine when reading or writing.
    pub fn as_table_path(&self) -> String {
        match self {
            Self::Local { path } => path.to_string_lossy().into_owned(),
            Self::Remote { url, .. } => url.to_string(),
        }
    }

    /// The same location with a trailing separator, so writers treat it as a
    /// directory of part files rather than a single file.
    pub fn as_directory(&self) -> Self {
        match self {
            Self::Local { path } => {
                let mut raw = path.to_string_lossy().into_owned();
                if !raw.ends_with(MAIN_SEPARATOR) && !raw.ends_with('/') {
                    raw.push(MAIN_SEPARATOR);
                }
                Self::Local {
                    path: PathBuf::from(raw),
                }
            }
            Self::Remote { url, scheme } => {
                let mut url = url.clone();
                if !url.path().ends_with('/') {
                    let path = format!("{}/", url.path());
                    url.set_path(&path);
                }
                Self::Remote {
                    url,
                    scheme: *scheme,
                }
            }
        }
    }

    /// The key inside the store for a remote location.
    pub fn object_path(&self) -> Result<ObjectPath> {
        match self {
            Self::Local { path } => {
                let absolute = std::path::absolute(path).with_io_context(|| {
                    format!("Failed to resolve local path '{}'", path.display())
                })?;
                ObjectPath::from_absolute_path(&absolute).with_storage_context(|| {
                    format!("Invalid local path '{}'", absolute.display())
                })
            }
            Self::Remote { url, .. } => ObjectPath::from_url_path(url.path())
                .with_storage_context(|| format!("Invalid object path in '{}'", url)),
        }
    }

    /// Build the object store serving this location.
    ///
    /// Remote stores pick up credentials and region from the environment the
    /// way the object_store builders do (`AWS_*`, `GOOGLE_*`, `AZURE_*`).
    pub fn build_store(&self) -> Result<Arc<dyn ObjectStore>> {
        match self {
            Self::Local { .. } => Ok(Arc::new(LocalFileSystem::new())),
            Self::Remote { url, scheme } => build_remote_store(url, *scheme),
        }
    }

    /// Whether `other` is this location or lives underneath it.
    pub fn contains(&self, other: &Location) -> Result<bool> {
        match (self, other) {
            (Self::Local { path }, Self::Local { path: other_path }) => {
                Ok(normalize_local(other_path)?.starts_with(normalize_local(path)?))
            }
            (
                Self::Remote { url, scheme },
                Self::Remote {
                    url: other_url,
                    scheme: other_scheme,
                },
            ) => {
                if scheme != other_scheme || url.host_str() != other_url.host_str() {
                    return Ok(false);
                }
                Ok(other.object_path()?.prefix_matches(&self.object_path()?))
            }
            _ => Ok(false),
        }
    }

    /// Remove whatever currently lives at this location.
    ///
    /// Returns the number of files or objects deleted. A location that does
    /// not exist yet is not an error.
    pub async fn clear(&self) -> Result<usize> {
        match self {
            Self::Local { path } => clear_local(path).await,
            Self::Remote { url, .. } => {
                let prefix = self.object_path()?;
                if prefix.as_ref().is_empty() {
                    return Err(CommonError::configuration_error(format!(
                        "Refusing to clear the root of '{}'",
                        url
                    )));
                }

                let store = self.build_store()?;
                let mut existing: Vec<_> = store
                    .list(Some(&prefix))
                    .map_ok(|meta| meta.location)
                    .try_collect()
                    .await?;
                // a single object stored at the prefix itself
                match store.head(&prefix).await {
                    Ok(meta) => existing.push(meta.location),
                    Err(object_store::Error::NotFound { .. }) => {}
                    Err(e) => return Err(e.into()),
                }

                for object in &existing {
                    debug!("Deleting {}", object);
                    store.delete(object).await?;
                }
                info!("Cleared {} objects under {}", existing.len(), url);
                Ok(existing.len())
            }
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local { path } => write!(f, "{}", path.display()),
            Self::Remote { url, .. } => write!(f, "{}", url),
        }
    }
}

/// Absolute form of `path` with `.` and `..` folded away.
///
/// Existing paths are canonicalized so symlinked parents compare equal.
fn normalize_local(path: &Path) -> Result<PathBuf> {
    if let Ok(canonical) = std::fs::canonicalize(path) {
        return Ok(canonical);
    }
    let absolute = std::path::absolute(path)
        .with_io_context(|| format!("Failed to resolve local path '{}'", path.display()))?;
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}

/// Refuse to clear the filesystem root or anything holding `working_dir`.
fn check_clearable(target: &Path, working_dir: &Path) -> Result<()> {
    if target.parent().is_none() || working_dir.starts_with(target) {
        return Err(CommonError::configuration_error(format!(
            "Refusing to clear '{}': it contains the working directory or is the filesystem root",
            target.display()
        )));
    }
    Ok(())
}

async fn clear_local(path: &Path) -> Result<usize> {
    let working_dir = std::env::current_dir()
        .with_io_context(|| "Failed to resolve the working directory".to_string())?;
    check_clearable(&normalize_local(path)?, &normalize_local(&working_dir)?)?;

    // drop any trailing separator so a plain file at the path is found
    let path: PathBuf = path.components().collect();
    let path = path.as_path();
    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => {
            return Err(CommonError::io_error_with_source(
                format!("Failed to inspect '{}'", path.display()),
                e,
            ));
        }
    };

    if metadata.is_dir() {
        let mut removed = 0;
        let mut entries = tokio::fs::read_dir(path)
            .await
            .with_io_context(|| format!("Failed to list '{}'", path.display()))?;
        while let Some(_entry) = entries
            .next_entry()
            .await
            .with_io_context(|| format!("Failed to list '{}'", path.display()))?
        {
            removed += 1;
        }
        tokio::fs::remove_dir_all(path)
            .await
            .with_io_context(|| format!("Failed to remove directory '{}'", path.display()))?;
        info!("Cleared directory {} ({} entries)", path.display(), removed);
        Ok(removed)
    } else {
        tokio::fs::remove_file(path)
            .await
            .with_io_context(|| format!("Failed to remove file '{}'", path.display()))?;
        info!("Removed file {}", path.display());
        Ok(1)
    }
}

#[allow(unused_variables)]
fn build_remote_store(url: &Url, scheme: RemoteScheme) -> Result<Arc<dyn ObjectStore>> {
    match scheme {
        #[cfg(feature = "aws")]
        RemoteScheme::S3 => {
            let store = object_store::aws::AmazonS3Builder::from_env()
                .with_url(url.as_str())
                .build()?;
            Ok(Arc::new(store))
        }
        #[cfg(feature = "gcp")]
        RemoteScheme::Gcs => {
            let store = object_store::gcp::GoogleCloudStorageBuilder::from_env()
                .with_url(url.as_str())
                .build()?;
            Ok(Arc::new(store))
        }
        #[cfg(feature = "azure")]
        RemoteScheme::Azure => {
            let store = object_store::azure::MicrosoftAzureBuilder::from_env()
                .with_url(url.as_str())
                .build()?;
            Ok(Arc::new(store))
        }
        #[allow(unreachable_patterns)]
        _ => Err(CommonError::configuration_error(format!(
            "Support for '{}' locations is not enabled in this build",
            url.scheme()
        ))),
    }
}
