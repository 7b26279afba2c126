//! MSBuild Language Server Protocol implementation.
//!
//! This crate provides the LSP server for MSBuild project files, wrapping
//! `msbuild-lsp-core` with the tower-lsp framework.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                          msbuild-lsp                           │
//! │        tower-lsp wrapper, JSON-RPC/stdio, `msbuild-lsp` bin     │
//! │                                                                │
//! │  ┌──────────────┐  ┌─────────────┐  ┌───────────────────────┐  │
//! │  │  server.rs   │  │ convert.rs  │  │    capabilities.rs    │  │
//! │  │LanguageServer│  │ Core ↔ LSP  │  │ Capability negotiation│  │
//! │  └──────┬───────┘  └──────┬──────┘  └───────────────────────┘  │
//! │         └─────────────────┴─────────────────┐                  │
//! │  ┌──────────────────────────────────────────▼───────────────┐  │
//! │  │                     msbuild-lsp-core                      │  │
//! │  │   documents, evaluation, package feed, query dispatch     │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```bash
//! msbuild-lsp --sdk-root /usr/share/dotnet/sdk/8.0.100/Sdks
//! ```
//!
//! Or programmatically:
//!
//! ```rust,ignore
//! msbuild_lsp::run_server(ServerConfig::from_env()).await;
//! ```

pub mod capabilities;
pub mod convert;
pub mod error;
pub mod server;

pub use error::ServerError;
pub use server::{MsBuildLanguageServer, run_server};
