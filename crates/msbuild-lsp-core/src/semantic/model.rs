//! The project object model produced by an evaluator.

use msbuild_source_map::Span;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Item types whose items name a package.
const PACKAGE_REFERENCE: &str = "PackageReference";

/// One evaluated object, tied to the markup it came from by `span`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticObject {
    Property {
        name: String,
        value: String,
        span: Span,
    },
    Item {
        item_type: String,
        /// Identity of the item: its `Include`, `Update` or `Remove` value.
        include: String,
        metadata: BTreeMap<String, String>,
        span: Span,
    },
    Target {
        name: String,
        depends_on: Vec<String>,
        span: Span,
    },
    Import {
        /// The path as written.
        project: String,
        /// Files the import resolved to; empty when unresolved.
        resolved: Vec<PathBuf>,
        span: Span,
    },
    SdkImport {
        sdk: String,
        version: Option<String>,
        resolved: Vec<PathBuf>,
        span: Span,
    },
}

impl SemanticObject {
    /// Source span of the markup this object was built from.
    pub fn span(&self) -> Span {
        match self {
            SemanticObject::Property { span, .. }
            | SemanticObject::Item { span, .. }
            | SemanticObject::Target { span, .. }
            | SemanticObject::Import { span, .. }
            | SemanticObject::SdkImport { span, .. } => *span,
        }
    }

    /// Whether this is an item naming a package dependency.
    pub fn is_package_reference(&self) -> bool {
        matches!(
            self,
            SemanticObject::Item { item_type, .. } if item_type.eq_ignore_ascii_case(PACKAGE_REFERENCE)
        )
    }

    /// Package id of a package reference.
    pub fn package_id(&self) -> Option<&str> {
        match self {
            SemanticObject::Item { include, .. } if self.is_package_reference() => Some(include),
            _ => None,
        }
    }

    /// Requested version of a package reference, from `Version` or else
    /// `VersionOverride` metadata.
    pub fn package_version(&self) -> Option<&str> {
        if !self.is_package_reference() {
            return None;
        }
        self.metadata_value("Version")
            .or_else(|| self.metadata_value("VersionOverride"))
    }

    /// Metadata of an item, looked up ignoring ASCII case.
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        match self {
            SemanticObject::Item { metadata, .. } => metadata
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(key))
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    /// Files an import points at. Empty for every other kind.
    pub fn resolved_files(&self) -> &[PathBuf] {
        match self {
            SemanticObject::Import { resolved, .. } | SemanticObject::SdkImport { resolved, .. } => {
                resolved
            }
            _ => &[],
        }
    }
}

/// All objects an evaluator found in one project file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SemanticModel {
    pub objects: Vec<SemanticObject>,
}

impl SemanticModel {
    pub fn new(objects: Vec<SemanticObject>) -> Self {
        Self { objects }
    }
}
