//! Server configuration.
//!
//! Values are layered, lowest precedence first: built-in defaults and the
//! environment ([`ServerConfig::from_env`]), command-line flags (applied by
//! the binary), then the client's `initializationOptions`
//! ([`ServerConfig::merge_json`]).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default number of completion candidates returned per request.
pub const DEFAULT_COMPLETION_PAGE_SIZE: usize = 20;

/// Configuration for the document engine and its default collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerConfig {
    /// Directories holding SDKs as `<root>/<SdkName>/Sdk/Sdk.props`.
    #[serde(alias = "sdk_roots")]
    pub sdk_roots: Vec<PathBuf>,

    /// Package folders laid out as `<root>/<lowercase-id>/<version>/`.
    #[serde(alias = "package_sources")]
    pub package_sources: Vec<PathBuf>,

    #[serde(alias = "completion_page_size")]
    pub completion_page_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            sdk_roots: Vec::new(),
            package_sources: Vec::new(),
            completion_page_size: DEFAULT_COMPLETION_PAGE_SIZE,
        }
    }
}

/// Partial configuration as sent by a client; absent fields keep their value.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ConfigOverrides {
    #[serde(alias = "sdk_roots")]
    sdk_roots: Option<Vec<PathBuf>>,
    #[serde(alias = "package_sources")]
    package_sources: Option<Vec<PathBuf>>,
    #[serde(alias = "completion_page_size")]
    completion_page_size: Option<usize>,
}

impl ServerConfig {
    /// Defaults plus whatever the process environment provides.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var_os(key).map(PathBuf::from))
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    ///
    /// - `NUGET_PACKAGES`, else `$HOME/.nuget/packages` (or `%USERPROFILE%`)
    ///   when that directory exists, becomes the package source.
    /// - `MSBUILD_SDKS_PATH` becomes the SDK root.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<PathBuf>) -> Self {
        let mut config = Self::default();

        if let Some(packages) = lookup("NUGET_PACKAGES") {
            config.package_sources.push(packages);
        } else if let Some(home) = lookup("HOME").or_else(|| lookup("USERPROFILE")) {
            let packages = home.join(".nuget").join("packages");
            if packages.is_dir() {
                config.package_sources.push(packages);
            }
        }

        if let Some(sdks) = lookup("MSBUILD_SDKS_PATH") {
            config.sdk_roots.push(sdks);
        }

        config
    }

    /// Overlay client-supplied settings.
    ///
    /// `null` changes nothing. Unknown fields are ignored so newer clients
    /// can send settings this server does not know about.
    pub fn merge_json(&mut self, value: &serde_json::Value) -> Result<(), serde_json::Error> {
        if value.is_null() {
            return Ok(());
        }
        let overrides = ConfigOverrides::deserialize(value)?;
        if let Some(sdk_roots) = overrides.sdk_roots {
            self.sdk_roots = sdk_roots;
        }
        if let Some(package_sources) = overrides.package_sources {
            self.package_sources = package_sources;
        }
        if let Some(page_size) = overrides.completion_page_size {
            self.completion_page_size = page_size;
        }
        Ok(())
    }

    /// Page size actually used; a configured zero still yields one item.
    pub fn effective_page_size(&self) -> usize {
        self.completion_page_size.max(1)
    }
}
