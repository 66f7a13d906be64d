//! Chapel Pages - visual page builder model
//!
//! Public site pages are composed from a closed set of content blocks.
//! Each block kind has strongly typed props, a list of editable fields for
//! the builder's property panel, default props for new instances and a pure
//! HTML render that applies the active language's translation overlay.

#![warn(clippy::all)]

pub mod blocks;
pub mod document;
pub mod error;
pub mod render;
pub mod templates;
pub mod translations;

pub use blocks::{Block, BlockCommon, BlockKind, EditableField, EditorInput};
pub use document::{PageDocument, RootProps};
pub use error::{PagesError, Result};
pub use render::{render_block, render_document};
pub use templates::Template;
pub use translations::{resolve_language, Translations};
