//! Source positions for project files.
//!
//! This crate owns the three coordinate systems the language server has to
//! translate between:
//!
//! - [`Span`]: a `(start, length)` pair of UTF-8 byte offsets, the unit the
//!   markup parser produces
//! - [`Position`] / [`Range`]: zero-based `(line, character)` pairs, the unit
//!   the editor protocol speaks, with characters counted in UTF-16 code units
//! - [`PositionIndex`]: the bidirectional mapping between the two for a single
//!   text snapshot
//!
//! # Example
//!
//! ```rust
//! use msbuild_source_map::{Position, PositionIndex, Span};
//!
//! let index = PositionIndex::new("<Project>\n  <Target />\n</Project>");
//! assert_eq!(index.offset_to_position(12), Position::new(1, 2));
//! assert_eq!(index.position_to_offset(Position::new(1, 2)), 12);
//!
//! let range = index.span_to_range(Span::new(12, 10));
//! assert_eq!(range.end, Position::new(1, 12));
//! ```

pub mod position_index;
pub mod types;

pub use position_index::PositionIndex;
pub use types::{Position, Range, Span};
