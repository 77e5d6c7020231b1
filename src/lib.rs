//! codegen-cpp: incremental synchronization of C++ headers and sources
//!
//! A header is parsed into a structural tree of namespaces, classes and
//! functions. The tree renders as declarations, definitions, an
//! implementation class, an extracted interface or an abstract factory, and
//! is compared against what an existing file already contains to produce
//! the minimal set of insertions and deletions.
//!
//! # Architecture
//!
//! Every parsed node remembers the span it came from in the original text.
//! Parsing cuts recognized constructs out of a [`text::Fragment`] without
//! ever renumbering offsets, so the merge engine can turn differences
//! straight into [`TextEdit`]s against the untouched document. Applying
//! those edits is a separate, verified step.
//!
//! # Safety
//!
//! - Edit batches verify the whole file before applying
//! - Atomic file writes (tempfile + fsync + rename)
//! - Overlapping and out-of-range edits are rejected
//! - UTF-8 boundaries are checked
//!
//! # Example
//!
//! ```
//! use codegen_cpp::cpp::{parse_header, SerializationMode};
//! use codegen_cpp::merge::{MergeOptions, Merger, SourceMerger};
//! use codegen_cpp::EditBatch;
//!
//! let header = parse_header("namespace N {\nvoid foo(int x);\n}\n").unwrap();
//! let source = "namespace N {\n}\n";
//!
//! let options = MergeOptions::new(SerializationMode::Source, "n.cpp");
//! let edits = SourceMerger::new(&header, options).merge(source).unwrap();
//! let merged = EditBatch::new("n.cpp", source, edits)
//!     .apply_to_str(source)
//!     .unwrap();
//! assert_eq!(merged, "namespace N {\n\nvoid foo(int x) {\n}\n}\n");
//! ```

pub mod cache;
pub mod config;
pub mod cpp;
pub mod diff;
pub mod edit;
pub mod matcher;
pub mod merge;
pub mod text;

// Re-exports
pub use config::{
    discover, load_from_path, load_from_str, CodegenConfig, ConfigError, ValidationError,
};
pub use cpp::{
    generate_file, parse_header, parse_source, FilePreamble, Namespace, ParseError,
    SerializationMode, SerializeOptions,
};
pub use diff::{Comparable, Difference};
pub use edit::{EditBatch, EditError, EditResult, EditVerification, TextEdit};
pub use merge::{HeaderMerger, MergeOptions, Merger, SourceMerger};
