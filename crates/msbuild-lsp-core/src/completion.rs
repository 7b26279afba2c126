//! Package id and version completion inside `PackageReference` attributes.
//!
//! Completion is split in two so the document lock is never held while the
//! feed is queried: [`completion_context`] inspects the document under shared
//! access, and [`completion_list`] pages the feed's answer afterwards.

use crate::document::DocumentState;
use crate::types::{CompletionItem, CompletionItemKind, CompletionList, Position, Range};

const PACKAGE_REFERENCE: &str = "PackageReference";
const IDENTITY_ATTRIBUTES: &[&str] = &["Include", "Update"];
const VERSION_ATTRIBUTE: &str = "Version";

/// What the feed should be asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionTarget {
    PackageIds,
    PackageVersions { package_id: String },
}

/// A completion request resolved against the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionContext {
    pub target: CompletionTarget,
    /// Value text between the opening quote and the cursor.
    pub prefix: String,
    /// The whole value, quotes excluded.
    pub replace_range: Range,
}

/// Work out whether `position` is somewhere completion applies.
///
/// Only the value of an `Include`, `Update` or `Version` attribute on a
/// `PackageReference` element qualifies. A semantic model is not needed.
pub fn completion_context(state: &DocumentState, position: Position) -> Option<CompletionContext> {
    let snapshot = state.snapshot()?;
    let tree = snapshot.tree()?;

    let offset = snapshot.index.position_to_offset(position);
    let attr = tree.find_node_at(tree.root(), offset)?;
    let name = tree.attribute_name(attr)?;
    let value_span = tree.attribute_value_inner_span(attr)?;
    if !value_span.contains(offset) {
        return None;
    }

    let element = tree.parent(attr)?;
    if !tree.is_element_named(element, PACKAGE_REFERENCE) {
        return None;
    }

    let target = if IDENTITY_ATTRIBUTES
        .iter()
        .any(|identity| identity.eq_ignore_ascii_case(name))
    {
        CompletionTarget::PackageIds
    } else if name.eq_ignore_ascii_case(VERSION_ATTRIBUTE) {
        let package_id = IDENTITY_ATTRIBUTES
            .iter()
            .filter_map(|identity| tree.attribute_value_of(element, identity))
            .map(str::trim)
            .find(|id| !id.is_empty())?;
        CompletionTarget::PackageVersions {
            package_id: package_id.to_string(),
        }
    } else {
        return None;
    };

    Some(CompletionContext {
        target,
        prefix: snapshot.text[value_span.start..offset].to_string(),
        replace_range: snapshot.index.span_to_range(value_span),
    })
}

/// Turn feed candidates into one page of completion items.
///
/// Candidates not starting with the typed prefix (ignoring case) are dropped.
/// Order is kept. If more than `page_size` remain, the list is cut and
/// marked incomplete.
pub fn completion_list(
    context: &CompletionContext,
    candidates: Vec<String>,
    page_size: usize,
) -> CompletionList {
    let prefix = context.prefix.to_lowercase();
    let mut matching = candidates
        .into_iter()
        .filter(|candidate| candidate.to_lowercase().starts_with(&prefix));

    let (kind, detail) = match &context.target {
        CompletionTarget::PackageIds => (CompletionItemKind::Module, "NuGet package".to_string()),
        CompletionTarget::PackageVersions { package_id } => {
            (CompletionItemKind::Value, format!("Version of {package_id}"))
        }
    };

    let items: Vec<CompletionItem> = matching
        .by_ref()
        .take(page_size)
        .enumerate()
        .map(|(rank, label)| CompletionItem {
            label,
            kind,
            detail: Some(detail.clone()),
            replace_range: context.replace_range,
            sort_text: Some(format!("{rank:05}")),
        })
        .collect();

    CompletionList {
        is_incomplete: matching.next().is_some(),
        items,
    }
}
