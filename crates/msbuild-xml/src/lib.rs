//! Source-tracked markup parsing for project files.
//!
//! This crate wraps [`quick-xml`] to produce a [`SyntaxTree`]: an arena of
//! [`SyntaxNode`]s where every element, attribute and text run knows its span
//! in the original text. Parent links are plain [`NodeId`] indices, so walking
//! up the tree never needs shared ownership.
//!
//! # Overview
//!
//! - [`parse`]: text in, tree (or a single [`Error`]) out
//! - [`SyntaxTree`]: the arena, with lookups such as [`SyntaxTree::attribute`]
//! - [`navigation`]: `descendants`, `ancestors`, `find_node_at` and friends
//!
//! # Example
//!
//! ```rust
//! use msbuild_xml::{parse, SyntaxKind};
//!
//! let text = r#"<Project><ItemGroup><PackageReference Include="Serilog" /></ItemGroup></Project>"#;
//! let tree = parse(text).unwrap();
//!
//! assert_eq!(tree.element_name(tree.root()), Some("Project"));
//!
//! // The cursor sits inside the `Include` value
//! let node = tree.find_node_at(tree.root(), 50).unwrap();
//! assert_eq!(tree.kind(node), SyntaxKind::Attribute);
//! assert_eq!(tree.attribute_value(node), Some("Serilog"));
//! ```

pub mod error;
pub mod navigation;
pub mod parser;
pub mod tree;

pub use error::{Error, Result};
pub use msbuild_source_map::Span;
pub use navigation::{Ancestors, Descendants};
pub use parser::parse;
pub use tree::{NodeData, NodeId, SyntaxKind, SyntaxNode, SyntaxTree};
