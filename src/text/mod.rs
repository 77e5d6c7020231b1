//! Offset-preserving text model.
//!
//! A [`Fragment`] is an ordered set of [`Block`]s cut out of one document.
//! Removing or slicing never renumbers a block: every offset stays absolute
//! with respect to the original text, so spans discovered deep inside the
//! parser can be turned into edits against the untouched document.

pub mod block;
pub mod errors;
pub mod fragment;
pub mod span;

pub use block::Block;
pub use errors::TextError;
pub use fragment::{Fragment, MergedText};
pub use span::Span;
