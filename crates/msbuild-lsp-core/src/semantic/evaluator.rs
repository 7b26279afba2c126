//! The evaluator seam and a syntactic default implementation.

use super::model::{SemanticModel, SemanticObject};
use crate::error::{EvaluationError, EvaluationProblem};
use async_trait::async_trait;
use msbuild_source_map::Span;
use msbuild_xml::{NodeId, SyntaxTree};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Import not found on disk.
pub const IMPORT_NOT_FOUND: &str = "MSE2001";
/// SDK not found under any configured root.
pub const SDK_NOT_RESOLVED: &str = "MSE2002";
/// Root element is not `<Project>`.
pub const NOT_A_PROJECT: &str = "MSE2003";

/// Attributes of an item element that are not metadata.
const ITEM_OPERATION_ATTRIBUTES: &[&str] = &[
    "Include",
    "Update",
    "Remove",
    "Exclude",
    "Condition",
    "KeepMetadata",
    "RemoveMetadata",
    "KeepDuplicates",
    "MatchOnMetadata",
    "MatchOnMetadataOptions",
];

/// Everything an evaluator gets to see about one document.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationRequest<'a> {
    /// File path of the document, when its URI names one.
    pub path: Option<&'a Path>,
    pub text: &'a str,
    pub tree: &'a SyntaxTree,
}

/// Turns a parsed project into a [`SemanticModel`].
///
/// Must be deterministic for a given tree and state of the file system.
#[async_trait]
pub trait Evaluator: Send + Sync {
    async fn evaluate(
        &self,
        request: EvaluationRequest<'_>,
    ) -> std::result::Result<SemanticModel, EvaluationError>;
}

/// Reads a project without evaluating it.
///
/// Properties, items, targets and imports are taken as written: there is no
/// property expansion and no condition evaluation. Imports are resolved
/// against the project directory and SDKs against `sdk_roots`.
#[derive(Debug, Clone, Default)]
pub struct StaticEvaluator {
    sdk_roots: Vec<PathBuf>,
}

impl StaticEvaluator {
    pub fn new(sdk_roots: Vec<PathBuf>) -> Self {
        Self { sdk_roots }
    }

    async fn resolve_import(&self, base: Option<&Path>, project: &str) -> Option<PathBuf> {
        let candidate = if Path::new(project).is_absolute() {
            PathBuf::from(project)
        } else {
            let relative: PathBuf = project.split(['/', '\\']).filter(|c| !c.is_empty()).collect();
            base?.join(relative)
        };
        is_file(&candidate).await.then_some(candidate)
    }

    /// Files an SDK contributes. `project` narrows the result to one file
    /// (for `<Import Sdk=".." Project=".." />`); otherwise both the props and
    /// targets files are returned.
    async fn resolve_sdk(&self, sdk: &str, project: Option<&str>) -> Vec<PathBuf> {
        for root in &self.sdk_roots {
            let dir = root.join(sdk).join("Sdk");
            let names: Vec<&str> = match project {
                Some(project) => vec![project],
                None => vec!["Sdk.props", "Sdk.targets"],
            };
            let mut files = Vec::new();
            for name in names {
                let file = dir.join(name);
                if is_file(&file).await {
                    files.push(file);
                }
            }
            if !files.is_empty() {
                return files;
            }
        }
        Vec::new()
    }
}

#[async_trait]
impl Evaluator for StaticEvaluator {
    async fn evaluate(
        &self,
        request: EvaluationRequest<'_>,
    ) -> std::result::Result<SemanticModel, EvaluationError> {
        let tree = request.tree;
        let root = tree.root();
        if !tree.is_element_named(root, "Project") {
            return Err(EvaluationError::single(EvaluationProblem::new(
                NOT_A_PROJECT,
                format!(
                    "Root element must be <Project>, found <{}>",
                    tree.element_name(root).unwrap_or_default()
                ),
                Some(tree.span(root)),
            )));
        }

        let base = request.path.and_then(Path::parent);
        let mut objects = Vec::new();
        let mut problems = Vec::new();

        // <Project Sdk="A;B/1.0">: each entry spans its own text in the value
        if let Some(value_span) = tree
            .attribute(root, "Sdk")
            .and_then(|attr| tree.attribute_value_inner_span(attr))
        {
            let raw = request
                .text
                .get(value_span.start..value_span.end())
                .unwrap_or_default();
            for (offset, reference) in list_entries(raw) {
                let span = Span::new(value_span.start + offset, reference.len());
                let (sdk, version) = split_sdk_reference(reference);
                let resolved = self.resolve_sdk(sdk, None).await;
                self.check_sdk(sdk, &resolved, span, &mut problems);
                objects.push(SemanticObject::SdkImport {
                    sdk: sdk.to_string(),
                    version,
                    resolved,
                    span,
                });
            }
        }

        for element in tree.descendants(root) {
            let Some(name) = tree.element_name(element) else {
                continue;
            };
            let parent_name = tree
                .parent(element)
                .and_then(|parent| tree.element_name(parent))
                .unwrap_or_default();

            if parent_name.eq_ignore_ascii_case("PropertyGroup") {
                objects.push(SemanticObject::Property {
                    name: name.to_string(),
                    value: tree.text_content(element),
                    span: tree.span(element),
                });
            } else if parent_name.eq_ignore_ascii_case("ItemGroup") {
                objects.push(read_item(tree, element, name));
            } else if name.eq_ignore_ascii_case("Target") {
                objects.push(SemanticObject::Target {
                    name: tree
                        .attribute_value_of(element, "Name")
                        .unwrap_or_default()
                        .to_string(),
                    depends_on: split_list(tree.attribute_value_of(element, "DependsOnTargets")),
                    span: tree.span(element),
                });
            } else if name.eq_ignore_ascii_case("Sdk") && element_parent_is_root(tree, element) {
                let Some(sdk) = tree.attribute_value_of(element, "Name") else {
                    continue;
                };
                let resolved = self.resolve_sdk(sdk, None).await;
                self.check_sdk(sdk, &resolved, tree.span(element), &mut problems);
                objects.push(SemanticObject::SdkImport {
                    sdk: sdk.to_string(),
                    version: tree
                        .attribute_value_of(element, "Version")
                        .map(str::to_string),
                    resolved,
                    span: tree.span(element),
                });
            } else if name.eq_ignore_ascii_case("Import") {
                let project = tree
                    .attribute_value_of(element, "Project")
                    .unwrap_or_default();
                let conditional = tree.attribute(element, "Condition").is_some();

                if let Some(sdk) = tree.attribute_value_of(element, "Sdk") {
                    let resolved = self
                        .resolve_sdk(sdk, Some(project).filter(|p| !p.is_empty()))
                        .await;
                    if !conditional {
                        self.check_sdk(sdk, &resolved, tree.span(element), &mut problems);
                    }
                    objects.push(SemanticObject::SdkImport {
                        sdk: sdk.to_string(),
                        version: tree
                            .attribute_value_of(element, "Version")
                            .map(str::to_string),
                        resolved,
                        span: tree.span(element),
                    });
                    continue;
                }

                // Properties and wildcards need real evaluation
                let expandable = project.contains("$(") || project.contains('*');
                let resolved = if expandable || project.is_empty() {
                    None
                } else {
                    self.resolve_import(base, project).await
                };
                if resolved.is_none() && !expandable && !conditional && base.is_some() {
                    problems.push(EvaluationProblem::new(
                        IMPORT_NOT_FOUND,
                        format!("Imported project not found: {project}"),
                        Some(tree.span(element)),
                    ));
                }
                objects.push(SemanticObject::Import {
                    project: project.to_string(),
                    resolved: resolved.into_iter().collect(),
                    span: tree.span(element),
                });
            }
        }

        if problems.is_empty() {
            Ok(SemanticModel::new(objects))
        } else {
            Err(EvaluationError::new(problems))
        }
    }
}

impl StaticEvaluator {
    /// Unresolved SDKs are only a problem when there is somewhere to look.
    fn check_sdk(
        &self,
        sdk: &str,
        resolved: &[PathBuf],
        span: Span,
        problems: &mut Vec<EvaluationProblem>,
    ) {
        if resolved.is_empty() && !self.sdk_roots.is_empty() {
            problems.push(EvaluationProblem::new(
                SDK_NOT_RESOLVED,
                format!("SDK '{sdk}' could not be resolved"),
                Some(span),
            ));
        }
    }
}

fn read_item(tree: &SyntaxTree, element: NodeId, item_type: &str) -> SemanticObject {
    let include = ["Include", "Update", "Remove"]
        .iter()
        .find_map(|attr| tree.attribute_value_of(element, attr))
        .unwrap_or_default()
        .to_string();

    let mut metadata = BTreeMap::new();
    for attr in tree.attributes(element) {
        let (Some(name), Some(value)) = (tree.attribute_name(attr), tree.attribute_value(attr))
        else {
            continue;
        };
        let reserved = ITEM_OPERATION_ATTRIBUTES
            .iter()
            .any(|reserved| reserved.eq_ignore_ascii_case(name));
        if !reserved {
            metadata.insert(name.to_string(), value.to_string());
        }
    }
    for child in tree.child_elements(element) {
        if let Some(name) = tree.element_name(child) {
            metadata.insert(name.to_string(), tree.text_content(child));
        }
    }

    SemanticObject::Item {
        item_type: item_type.to_string(),
        include,
        metadata,
        span: tree.span(element),
    }
}

fn element_parent_is_root(tree: &SyntaxTree, element: NodeId) -> bool {
    tree.parent(element) == Some(tree.root())
}

/// `Name/Version` as used in `Sdk` attributes.
fn split_sdk_reference(reference: &str) -> (&str, Option<String>) {
    match reference.split_once('/') {
        Some((sdk, version)) => (sdk.trim(), Some(version.trim().to_string())),
        None => (reference, None),
    }
}

/// Trimmed, non-empty `;`-separated entries of `raw` with their byte offsets.
fn list_entries(raw: &str) -> Vec<(usize, &str)> {
    let mut entries = Vec::new();
    let mut start = 0;
    for part in raw.split(';') {
        let leading = part.len() - part.trim_start().len();
        let entry = part.trim();
        if !entry.is_empty() {
            entries.push((start + leading, entry));
        }
        start += part.len() + 1;
    }
    entries
}

fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|metadata| metadata.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn evaluate(
        evaluator: &StaticEvaluator,
        path: Option<&Path>,
        text: &str,
    ) -> std::result::Result<SemanticModel, EvaluationError> {
        let tree = msbuild_xml::parse(text).unwrap();
        evaluator
            .evaluate(EvaluationRequest {
                path,
                text,
                tree: &tree,
            })
            .await
    }

    #[tokio::test]
    async fn reads_properties_items_and_targets() {
        let text = r#"<Project>
  <PropertyGroup>
    <TargetFramework>net8.0</TargetFramework>
  </PropertyGroup>
  <ItemGroup>
    <PackageReference Include="Serilog" Version="3.1.1" PrivateAssets="all" />
    <Compile Remove="Old.cs">
      <Link>Legacy</Link>
    </Compile>
  </ItemGroup>
  <Target Name="Pack" DependsOnTargets="Build; Test" />
</Project>"#;
        let model = evaluate(&StaticEvaluator::default(), None, text).await.unwrap();
        assert_eq!(model.objects.len(), 4);

        match &model.objects[0] {
            SemanticObject::Property { name, value, .. } => {
                assert_eq!(name, "TargetFramework");
                assert_eq!(value, "net8.0");
            }
            other => panic!("expected property, got {other:?}"),
        }

        let package = &model.objects[1];
        assert_eq!(package.package_id(), Some("Serilog"));
        assert_eq!(package.package_version(), Some("3.1.1"));
        assert_eq!(package.metadata_value("PrivateAssets"), Some("all"));
        assert_eq!(package.metadata_value("Include"), None);

        match &model.objects[2] {
            SemanticObject::Item {
                item_type,
                include,
                metadata,
                ..
            } => {
                assert_eq!(item_type, "Compile");
                assert_eq!(include, "Old.cs");
                assert_eq!(metadata.get("Link").map(String::as_str), Some("Legacy"));
            }
            other => panic!("expected item, got {other:?}"),
        }

        match &model.objects[3] {
            SemanticObject::Target {
                name, depends_on, ..
            } => {
                assert_eq!(name, "Pack");
                assert_eq!(depends_on, &vec!["Build".to_string(), "Test".to_string()]);
            }
            other => panic!("expected target, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn resolves_relative_imports() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("build")).unwrap();
        std::fs::write(dir.path().join("build").join("common.props"), "<Project/>").unwrap();
        let project = dir.path().join("app.csproj");

        let text = r#"<Project><Import Project="build\common.props" /></Project>"#;
        let model = evaluate(&StaticEvaluator::default(), Some(&project), text)
            .await
            .unwrap();
        assert_eq!(
            model.objects[0].resolved_files(),
            &[dir.path().join("build").join("common.props")]
        );
    }

    #[tokio::test]
    async fn missing_import_fails_evaluation() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("app.csproj");
        let text = r#"<Project><Import Project="missing.props" /></Project>"#;

        let err = evaluate(&StaticEvaluator::default(), Some(&project), text)
            .await
            .unwrap_err();
        assert_eq!(err.problems.len(), 1);
        assert_eq!(err.problems[0].code, IMPORT_NOT_FOUND);
        assert_eq!(err.problems[0].span, Some(Span::new(9, 34)));
    }

    #[tokio::test]
    async fn conditional_and_expandable_imports_never_fail() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("app.csproj");
        let text = r#"<Project>
  <Import Project="local.props" Condition="Exists('local.props')" />
  <Import Project="$(MSBuildExtensionsPath)\x.targets" />
</Project>"#;
        let model = evaluate(&StaticEvaluator::default(), Some(&project), text)
            .await
            .unwrap();
        assert_eq!(model.objects.len(), 2);
        assert!(model.objects.iter().all(|o| o.resolved_files().is_empty()));
    }

    #[tokio::test]
    async fn resolves_sdks_from_project_attribute_and_elements() {
        let roots = tempfile::tempdir().unwrap();
        let sdk_dir = roots.path().join("Microsoft.NET.Sdk").join("Sdk");
        std::fs::create_dir_all(&sdk_dir).unwrap();
        std::fs::write(sdk_dir.join("Sdk.props"), "<Project/>").unwrap();
        std::fs::write(sdk_dir.join("Sdk.targets"), "<Project/>").unwrap();

        let evaluator = StaticEvaluator::new(vec![roots.path().to_path_buf()]);
        let text = r#"<Project Sdk="Microsoft.NET.Sdk/8.0.100">
  <Import Sdk="Microsoft.NET.Sdk" Project="Sdk.targets" />
</Project>"#;
        let model = evaluate(&evaluator, None, text).await.unwrap();

        match &model.objects[0] {
            SemanticObject::SdkImport {
                sdk,
                version,
                resolved,
                ..
            } => {
                assert_eq!(sdk, "Microsoft.NET.Sdk");
                assert_eq!(version.as_deref(), Some("8.0.100"));
                assert_eq!(resolved, &vec![sdk_dir.join("Sdk.props"), sdk_dir.join("Sdk.targets")]);
            }
            other => panic!("expected sdk import, got {other:?}"),
        }
        assert_eq!(model.objects[1].resolved_files(), &[sdk_dir.join("Sdk.targets")]);
    }

    #[tokio::test]
    async fn each_sdk_entry_has_its_own_span() {
        let text = r#"<Project Sdk="A.Sdk; B.Sdk/2.0" />"#;
        let model = evaluate(&StaticEvaluator::default(), None, text).await.unwrap();
        let spans: Vec<_> = model.objects.iter().map(SemanticObject::span).collect();
        assert_eq!(spans, vec![Span::new(14, 5), Span::new(21, 9)]);
        assert_eq!(&text[21..30], "B.Sdk/2.0");
    }

    #[test]
    fn list_entries_keep_offsets() {
        assert_eq!(list_entries(" a ;;b"), vec![(1, "a"), (5, "b")]);
        assert!(list_entries("").is_empty());
    }

    #[tokio::test]
    async fn unresolved_sdk_fails_only_with_roots() {
        let text = r#"<Project Sdk="Missing.Sdk" />"#;
        let model = evaluate(&StaticEvaluator::default(), None, text).await.unwrap();
        assert_eq!(model.objects.len(), 1);

        let roots = tempfile::tempdir().unwrap();
        let evaluator = StaticEvaluator::new(vec![roots.path().to_path_buf()]);
        let err = evaluate(&evaluator, None, text).await.unwrap_err();
        assert_eq!(err.problems[0].code, SDK_NOT_RESOLVED);
    }

    #[tokio::test]
    async fn non_project_root_is_rejected() {
        let err = evaluate(&StaticEvaluator::default(), None, "<Solution/>")
            .await
            .unwrap_err();
        assert_eq!(err.problems[0].code, NOT_A_PROJECT);
    }
}
