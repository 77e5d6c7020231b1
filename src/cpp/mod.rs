//! Structural model of C++ headers and sources.
//!
//! Parsing produces a [`Namespace`] tree whose nodes remember where they
//! came from; serialization renders the same tree back in any
//! [`SerializationMode`].

pub mod class;
pub mod errors;
pub mod function;
pub mod generate;
pub mod mode;
pub mod namespace;
pub mod naming;
pub mod output;
pub mod parser;
pub mod signature;
pub mod special;

pub use class::{Access, Class, ClassKeyword, ClassScope};
pub use errors::ParseError;
pub use function::{Function, FunctionKind, Virtuality};
pub use generate::{generate_file, FilePreamble};
pub use mode::{NamespaceStyle, SerializationMode, SerializeOptions};
pub use namespace::Namespace;
pub use naming::{ClassNames, ConfiguredNames, NameInputProvider, NamePattern};
pub use output::Lines;
pub use parser::{parse, parse_header, parse_source, HeaderParser, ParseStrategy, SourceParser};
pub use special::{Constructor, Defaulted, Destructor};
