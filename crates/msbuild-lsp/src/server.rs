//! LSP server implementation using tower-lsp.
//!
//! The server is a thin shell around [`LanguageService`]: it converts protocol
//! types, turns engine errors into JSON-RPC errors, and publishes diagnostics
//! through the client. The service is created in `initialize`, once the
//! client's `initializationOptions` have been merged into the configuration.

use std::sync::Arc;
use tokio::sync::OnceCell;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService, Server};
use tracing::{info, warn};

use msbuild_lsp_core::types::Diagnostic as CoreDiagnostic;
use msbuild_lsp_core::{Cancellation, DiagnosticPublisher, LanguageService, ServerConfig};

use crate::capabilities::server_capabilities;
use crate::convert;
use crate::error::ServerError;

/// The MSBuild language server.
pub struct MsBuildLanguageServer {
    client: Client,
    /// Configuration from the environment and command line.
    config: ServerConfig,
    service: OnceCell<Arc<LanguageService>>,
}

impl MsBuildLanguageServer {
    pub fn new(client: Client, config: ServerConfig) -> Self {
        Self {
            client,
            config,
            service: OnceCell::new(),
        }
    }

    /// The engine, available once `initialize` has run.
    pub fn service(&self) -> std::result::Result<&Arc<LanguageService>, ServerError> {
        self.service.get().ok_or(ServerError::NotInitialized)
    }

    /// For notifications, which cannot report errors back.
    fn service_or_warn(&self, method: &str) -> Option<&Arc<LanguageService>> {
        let service = self.service.get();
        if service.is_none() {
            warn!(method, "notification before initialize; ignoring");
        }
        service
    }
}

/// Sends engine diagnostics to the client as `textDocument/publishDiagnostics`.
struct ClientPublisher {
    client: Client,
}

#[tower_lsp::async_trait]
impl DiagnosticPublisher for ClientPublisher {
    async fn publish(&self, uri: &str, diagnostics: Vec<CoreDiagnostic>, version: Option<i32>) {
        let Ok(url) = Url::parse(uri) else {
            warn!(uri, "cannot publish diagnostics for an unparseable URI");
            return;
        };
        let diagnostics = diagnostics.iter().map(convert::diagnostic_to_lsp).collect();
        self.client.publish_diagnostics(url, diagnostics, version).await;
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for MsBuildLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let mut config = self.config.clone();
        if let Some(options) = &params.initialization_options {
            if let Err(err) = config.merge_json(options) {
                warn!(error = %err, "ignoring malformed initializationOptions");
            }
        }

        let publisher = Arc::new(ClientPublisher {
            client: self.client.clone(),
        });
        let service = Arc::new(LanguageService::new(&config, publisher));
        if self.service.set(service).is_err() {
            warn!("initialize received twice; keeping the first configuration");
        }
        info!("msbuild-lsp initialized");

        Ok(InitializeResult {
            capabilities: server_capabilities(),
            server_info: Some(ServerInfo {
                name: "msbuild-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "MSBuild LSP server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        if let Some(service) = self.service.get() {
            service.shutdown();
        }
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let Some(service) = self.service_or_warn("textDocument/didOpen") else {
            return;
        };
        let document = params.text_document;
        service
            .did_open(document.uri.as_str(), &document.text, Some(document.version))
            .await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let Some(service) = self.service_or_warn("textDocument/didChange") else {
            return;
        };
        let uri = params.text_document.uri;
        let version = params.text_document.version;

        // Full document sync, so the last change holds the whole text
        let Some(change) = params.content_changes.into_iter().last() else {
            return;
        };
        if let Err(err) = service
            .did_change(uri.as_str(), &change.text, Some(version))
            .await
        {
            warn!(uri = %uri, error = %err, "change for a document that is not open");
        }
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let Some(service) = self.service_or_warn("textDocument/didSave") else {
            return;
        };
        service.did_save(params.text_document.uri.as_str()).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let Some(service) = self.service_or_warn("textDocument/didClose") else {
            return;
        };
        service.did_close(params.text_document.uri.as_str()).await;
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let service = self.service()?;
        let position = params.text_document_position_params;
        let hover = service
            .hover(
                position.text_document.uri.as_str(),
                convert::position_from_lsp(&position.position),
                &Cancellation::new(),
            )
            .await
            .map_err(ServerError::from)?;
        Ok(hover.as_ref().map(convert::hover_to_lsp))
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let service = self.service()?;
        let position = params.text_document_position;
        let list = service
            .completion(
                position.text_document.uri.as_str(),
                convert::position_from_lsp(&position.position),
                &Cancellation::new(),
            )
            .await
            .map_err(ServerError::from)?;
        Ok(list.map(|list| CompletionResponse::List(convert::completion_list_to_lsp(&list))))
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>> {
        let service = self.service()?;
        let uri = params.text_document.uri;
        let symbols = service
            .document_symbols(uri.as_str(), &Cancellation::new())
            .await
            .map_err(ServerError::from)?;
        Ok(symbols.map(|symbols| {
            DocumentSymbolResponse::Flat(
                symbols
                    .iter()
                    .map(|symbol| convert::symbol_to_lsp(symbol, &uri))
                    .collect(),
            )
        }))
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let service = self.service()?;
        let position = params.text_document_position_params;
        let locations = service
            .definition(
                position.text_document.uri.as_str(),
                convert::position_from_lsp(&position.position),
                &Cancellation::new(),
            )
            .await
            .map_err(ServerError::from)?;
        Ok(locations.map(|locations| {
            GotoDefinitionResponse::Array(
                locations
                    .iter()
                    .filter_map(convert::location_to_lsp)
                    .collect(),
            )
        }))
    }
}

/// Run the LSP server over stdio.
///
/// A `$/cancelRequest` from the client drops the request's future, which
/// abandons the query at its next suspension point.
pub async fn run_server(config: ServerConfig) {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) =
        LspService::new(move |client| MsBuildLanguageServer::new(client, config.clone()));
    Server::new(stdin, stdout, socket).serve(service).await;
}
