//! Hover descriptions.

use crate::document::DocumentState;
use crate::semantic::SemanticObject;
use crate::types::{HoverResult, Position};
use std::fmt::Write as _;

/// Describe the object under `position`.
///
/// The cursor's node is widened to its element or attribute, and that node is
/// matched to the semantic object it stands for. Returns `None` without a tree,
/// without a semantic model, or when nothing describable is there.
pub fn hover(state: &DocumentState, position: Position) -> Option<HoverResult> {
    let snapshot = state.snapshot()?;
    let tree = snapshot.tree()?;
    let semantics = snapshot.semantics()?;

    let offset = snapshot.index.position_to_offset(position);
    let node = tree.find_node_at(tree.root(), offset)?;
    let target = tree.containing_element_or_attribute(node)?;
    let object = semantics.object_for_node(tree.span(target), offset)?;

    // An entry inside the node is highlighted on its own
    let node_span = tree.span(target);
    let span = if node_span.encloses(&object.span()) {
        object.span()
    } else {
        node_span
    };

    Some(HoverResult {
        contents: describe(object),
        range: Some(snapshot.index.span_to_range(span)),
    })
}

/// Markdown description of one object.
pub fn describe(object: &SemanticObject) -> String {
    match object {
        SemanticObject::Property { name, value, .. } => {
            format!("**Property**: `{name}`\n\nValue: `{value}`")
        }
        SemanticObject::Item { .. } if object.is_package_reference() => {
            let id = object.package_id().unwrap_or_default();
            match object.package_version() {
                Some(version) => format!("**NuGet Package**: `{id}`\n\nVersion: `{version}`"),
                None => format!("**NuGet Package**: `{id}`\n\nVersion: (not specified)"),
            }
        }
        SemanticObject::Item {
            item_type,
            include,
            metadata,
            ..
        } => {
            let mut text = format!("**Item**: `{item_type}`\n\nInclude: `{include}`");
            if !metadata.is_empty() {
                text.push_str("\n\nMetadata:");
                for (key, value) in metadata {
                    let _ = write!(text, "\n- {key}: `{value}`");
                }
            }
            text
        }
        SemanticObject::Target {
            name, depends_on, ..
        } => {
            if depends_on.is_empty() {
                format!("**Target**: `{name}`")
            } else {
                format!(
                    "**Target**: `{name}`\n\nDepends on: {}",
                    depends_on.join(", ")
                )
            }
        }
        SemanticObject::Import {
            project, resolved, ..
        } => match resolved.first() {
            Some(file) => format!("**Import**: `{project}`\n\nResolved: `{}`", file.display()),
            None => format!("**Import**: `{project}`\n\nNot resolved"),
        },
        SemanticObject::SdkImport {
            sdk,
            version,
            resolved,
            ..
        } => {
            let mut text = match version {
                Some(version) => format!("**SDK**: `{sdk}` ({version})"),
                None => format!("**SDK**: `{sdk}`"),
            };
            if resolved.is_empty() {
                text.push_str("\n\nNot resolved");
            }
            for file in resolved {
                let _ = write!(text, "\n\nImports `{}`", file.display());
            }
            text
        }
    }
}
