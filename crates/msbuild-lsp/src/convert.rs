//! Conversion between msbuild-lsp-core types and tower_lsp::lsp_types.

use tower_lsp::lsp_types::{
    CompletionItem as LspCompletionItem, CompletionItemKind as LspCompletionItemKind,
    CompletionList as LspCompletionList, CompletionTextEdit, Diagnostic as LspDiagnostic,
    DiagnosticSeverity as LspSeverity, Hover, HoverContents, Location as LspLocation,
    MarkupContent, MarkupKind, NumberOrString, Position as LspPosition, Range as LspRange,
    SymbolInformation, SymbolKind as LspSymbolKind, TextEdit, Url,
};

use msbuild_lsp_core::types::{
    CompletionItem, CompletionItemKind, CompletionList, Diagnostic, DiagnosticSeverity,
    HoverResult, Location, Position, Range, Symbol, SymbolKind,
};

/// Convert a core Position to an lsp-types Position.
pub fn position_to_lsp(pos: &Position) -> LspPosition {
    LspPosition {
        line: pos.line,
        character: pos.character,
    }
}

/// Convert an lsp-types Position to a core Position.
pub fn position_from_lsp(pos: &LspPosition) -> Position {
    Position::new(pos.line, pos.character)
}

pub fn range_to_lsp(range: &Range) -> LspRange {
    LspRange {
        start: position_to_lsp(&range.start),
        end: position_to_lsp(&range.end),
    }
}

pub fn severity_to_lsp(severity: &DiagnosticSeverity) -> LspSeverity {
    match severity {
        DiagnosticSeverity::Error => LspSeverity::ERROR,
        DiagnosticSeverity::Warning => LspSeverity::WARNING,
        DiagnosticSeverity::Information => LspSeverity::INFORMATION,
        DiagnosticSeverity::Hint => LspSeverity::HINT,
    }
}

pub fn diagnostic_to_lsp(diag: &Diagnostic) -> LspDiagnostic {
    LspDiagnostic {
        range: range_to_lsp(&diag.range),
        severity: Some(severity_to_lsp(&diag.severity)),
        code: diag.code.clone().map(NumberOrString::String),
        code_description: None,
        source: diag.source.clone(),
        message: diag.message.clone(),
        related_information: None,
        tags: None,
        data: None,
    }
}

pub fn symbol_kind_to_lsp(kind: &SymbolKind) -> LspSymbolKind {
    match kind {
        SymbolKind::Module => LspSymbolKind::MODULE,
        SymbolKind::Package => LspSymbolKind::PACKAGE,
        SymbolKind::Property => LspSymbolKind::PROPERTY,
        SymbolKind::Field => LspSymbolKind::FIELD,
        SymbolKind::Function => LspSymbolKind::FUNCTION,
        SymbolKind::Object => LspSymbolKind::OBJECT,
    }
}

/// Convert a core Symbol to a flat SymbolInformation located in `uri`.
pub fn symbol_to_lsp(symbol: &Symbol, uri: &Url) -> SymbolInformation {
    #[allow(deprecated)]
    SymbolInformation {
        name: symbol.name.clone(),
        kind: symbol_kind_to_lsp(&symbol.kind),
        tags: None,
        deprecated: None,
        location: LspLocation {
            uri: uri.clone(),
            range: range_to_lsp(&symbol.range),
        },
        container_name: symbol.container_name.clone(),
    }
}

pub fn hover_to_lsp(hover: &HoverResult) -> Hover {
    Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: hover.contents.clone(),
        }),
        range: hover.range.as_ref().map(range_to_lsp),
    }
}

pub fn completion_kind_to_lsp(kind: &CompletionItemKind) -> LspCompletionItemKind {
    match kind {
        CompletionItemKind::Module => LspCompletionItemKind::MODULE,
        CompletionItemKind::Value => LspCompletionItemKind::VALUE,
    }
}

/// Accepting an item replaces the whole attribute value with its label.
pub fn completion_item_to_lsp(item: &CompletionItem) -> LspCompletionItem {
    LspCompletionItem {
        label: item.label.clone(),
        kind: Some(completion_kind_to_lsp(&item.kind)),
        detail: item.detail.clone(),
        sort_text: item.sort_text.clone(),
        filter_text: Some(item.label.clone()),
        text_edit: Some(CompletionTextEdit::Edit(TextEdit {
            range: range_to_lsp(&item.replace_range),
            new_text: item.label.clone(),
        })),
        ..Default::default()
    }
}

pub fn completion_list_to_lsp(list: &CompletionList) -> LspCompletionList {
    LspCompletionList {
        is_incomplete: list.is_incomplete,
        items: list.items.iter().map(completion_item_to_lsp).collect(),
    }
}

/// Convert a core Location; `None` if its URI does not parse.
pub fn location_to_lsp(location: &Location) -> Option<LspLocation> {
    Some(LspLocation {
        uri: Url::parse(&location.uri).ok()?,
        range: range_to_lsp(&location.range),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use msbuild_lsp_core::types::DiagnosticStage;

    fn range() -> Range {
        Range::new(Position::new(2, 4), Position::new(2, 40))
    }

    #[test]
    fn position_round_trip() {
        let lsp = position_to_lsp(&Position::new(10, 5));
        assert_eq!((lsp.line, lsp.character), (10, 5));
        assert_eq!(position_from_lsp(&lsp), Position::new(10, 5));
    }

    #[test]
    fn diagnostic_conversion() {
        let diag = Diagnostic::new(
            range(),
            DiagnosticSeverity::Warning,
            DiagnosticStage::Evaluate,
            "Imported project not found",
        )
        .with_code("MSE2001");
        let lsp = diagnostic_to_lsp(&diag);
        assert_eq!(lsp.severity, Some(LspSeverity::WARNING));
        assert_eq!(lsp.code, Some(NumberOrString::String("MSE2001".into())));
        assert_eq!(lsp.source.as_deref(), Some("msbuild"));
        assert_eq!(lsp.range.start, LspPosition::new(2, 4));
    }

    #[test]
    fn symbol_keeps_container() {
        let uri = Url::parse("file:///work/app.csproj").unwrap();
        let symbol =
            Symbol::new("Version", SymbolKind::Property, range()).with_container("Properties");
        let lsp = symbol_to_lsp(&symbol, &uri);
        assert_eq!(lsp.kind, LspSymbolKind::PROPERTY);
        assert_eq!(lsp.container_name.as_deref(), Some("Properties"));
        assert_eq!(lsp.location.uri, uri);
    }

    #[test]
    fn hover_is_markdown() {
        let hover = hover_to_lsp(&HoverResult {
            contents: "**Property**: `A`".into(),
            range: Some(range()),
        });
        let HoverContents::Markup(markup) = hover.contents else {
            panic!("expected markup");
        };
        assert_eq!(markup.kind, MarkupKind::Markdown);
        assert_eq!(hover.range, Some(range_to_lsp(&range())));
    }

    #[test]
    fn completion_item_replaces_value() {
        let item = CompletionItem {
            label: "Newtonsoft.Json".into(),
            kind: CompletionItemKind::Module,
            detail: Some("NuGet package".into()),
            replace_range: range(),
            sort_text: Some("00000".into()),
        };
        let lsp = completion_list_to_lsp(&CompletionList {
            is_incomplete: true,
            items: vec![item],
        });
        assert!(lsp.is_incomplete);
        let Some(CompletionTextEdit::Edit(edit)) = &lsp.items[0].text_edit else {
            panic!("expected a text edit");
        };
        assert_eq!(edit.new_text, "Newtonsoft.Json");
        assert_eq!(edit.range, range_to_lsp(&range()));
        assert_eq!(lsp.items[0].kind, Some(LspCompletionItemKind::MODULE));
    }

    #[test]
    fn location_with_bad_uri_is_dropped() {
        let good = Location {
            uri: "file:///sdk/Sdk.props".into(),
            range: Range::default(),
        };
        let bad = Location {
            uri: "not a uri".into(),
            range: Range::default(),
        };
        assert!(location_to_lsp(&good).is_some());
        assert!(location_to_lsp(&bad).is_none());
    }
}
