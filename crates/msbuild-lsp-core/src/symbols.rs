//! Document outline.

use crate::document::DocumentState;
use crate::semantic::SemanticObject;
use crate::types::{Symbol, SymbolKind};

/// One symbol per semantic object, sorted by label.
///
/// Returns `None` rather than an empty list when there is no semantic model
/// or it has no objects, meaning "no outline available".
pub fn document_symbols(state: &DocumentState) -> Option<Vec<Symbol>> {
    let snapshot = state.snapshot()?;
    let semantics = snapshot.semantics()?;

    let mut symbols: Vec<Symbol> = semantics
        .objects()
        .iter()
        .map(|object| {
            let (label, kind, container) = classify(object);
            Symbol::new(label, kind, snapshot.index.span_to_range(object.span()))
                .with_container(container)
        })
        .collect();

    if symbols.is_empty() {
        return None;
    }
    symbols.sort_by(|a, b| a.name.cmp(&b.name));
    Some(symbols)
}

fn classify(object: &SemanticObject) -> (String, SymbolKind, &'static str) {
    match object {
        SemanticObject::Property { name, .. } => {
            (format!("Property: {name}"), SymbolKind::Property, "Properties")
        }
        SemanticObject::Item {
            item_type, include, ..
        } => {
            let label = if include.is_empty() {
                format!("Item: {item_type}")
            } else {
                format!("Item: {item_type}({include})")
            };
            let kind = if object.is_package_reference() {
                SymbolKind::Object
            } else {
                SymbolKind::Field
            };
            (label, kind, "Items")
        }
        SemanticObject::Target { name, .. } => {
            (format!("Target: {name}"), SymbolKind::Function, "Targets")
        }
        SemanticObject::Import { project, .. } => {
            (format!("Import: {project}"), SymbolKind::Module, "Imports")
        }
        SemanticObject::SdkImport { sdk, .. } => {
            (format!("SDK Import: {sdk}"), SymbolKind::Package, "Imports")
        }
    }
}
