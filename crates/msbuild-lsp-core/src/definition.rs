//! Go-to-definition for imports.

use crate::document::DocumentState;
use crate::types::{Location, Position, Range};

/// Files imported by the import under `position`.
///
/// Each location points at the start of the imported file, not at its root
/// element. Only `Import` and SDK imports have definitions; anything else,
/// or an import that did not resolve, gives `None`.
pub fn definition(state: &DocumentState, position: Position) -> Option<Vec<Location>> {
    let snapshot = state.snapshot()?;
    let tree = snapshot.tree()?;
    let semantics = snapshot.semantics()?;

    let offset = snapshot.index.position_to_offset(position);
    let node = tree.find_node_at(tree.root(), offset)?;
    let target = tree.containing_element_or_attribute(node)?;
    let object = semantics.object_for_node(tree.span(target), offset)?;

    let locations: Vec<Location> = object
        .resolved_files()
        .iter()
        .filter_map(|path| url::Url::from_file_path(path).ok())
        .map(|uri| Location {
            uri: uri.to_string(),
            range: Range::default(),
        })
        .collect();

    (!locations.is_empty()).then_some(locations)
}
