use crate::text::Span;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Textual form a structural node renders to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SerializationMode {
    /// Declarations matching the parsed file.
    Header,
    /// Definitions matching the parsed header.
    Source,
    /// Declarations of the class implementing a parsed interface.
    ImplHeader,
    /// Definitions of the class implementing a parsed interface.
    ImplSource,
    /// Pure virtual interface extracted from a parsed class.
    InterfaceHeader,
    /// Factory interface creating instances of a parsed class.
    AbstractFactoryHeader,
}

impl SerializationMode {
    pub const ALL: [SerializationMode; 6] = [
        SerializationMode::Header,
        SerializationMode::Source,
        SerializationMode::ImplHeader,
        SerializationMode::ImplSource,
        SerializationMode::InterfaceHeader,
        SerializationMode::AbstractFactoryHeader,
    ];

    /// Modes producing a definition file.
    pub fn is_source(self) -> bool {
        matches!(self, SerializationMode::Source | SerializationMode::ImplSource)
    }

    /// Modes naming the implementation of an interface.
    pub fn is_implementation(self) -> bool {
        matches!(
            self,
            SerializationMode::ImplHeader | SerializationMode::ImplSource
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SerializationMode::Header => "header",
            SerializationMode::Source => "source",
            SerializationMode::ImplHeader => "impl-header",
            SerializationMode::ImplSource => "impl-source",
            SerializationMode::InterfaceHeader => "interface-header",
            SerializationMode::AbstractFactoryHeader => "abstract-factory-header",
        }
    }
}

impl fmt::Display for SerializationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SerializationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SerializationMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| format!("unknown serialization mode '{s}'"))
    }
}

/// How definitions for namespaces missing from a source file are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamespaceStyle {
    /// `void N::M::f() {}`
    #[default]
    Qualified,
    /// `namespace N { namespace M { void f() {} } }`
    Blocks,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializeOptions {
    pub mode: SerializationMode,
    /// Indentation unit.
    pub indent: String,
    /// Qualifiers prepended to definition names.
    pub name_scopes: Vec<String>,
    pub namespace_style: NamespaceStyle,
    /// Only nodes whose span overlaps this one are serialized.
    pub range: Option<Span>,
}

impl SerializeOptions {
    pub fn new(mode: SerializationMode) -> Self {
        Self {
            mode,
            indent: "    ".to_string(),
            name_scopes: Vec::new(),
            namespace_style: NamespaceStyle::default(),
            range: None,
        }
    }

    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    pub fn with_namespace_style(mut self, style: NamespaceStyle) -> Self {
        self.namespace_style = style;
        self
    }

    pub fn with_name_scopes(mut self, scopes: Vec<String>) -> Self {
        self.name_scopes = scopes;
        self
    }

    pub fn with_range(mut self, range: Option<Span>) -> Self {
        self.range = range;
        self
    }

    /// Whether a node spanning `span` is within the selected range.
    pub fn admits(&self, span: Span) -> bool {
        self.range.map_or(true, |range| range.overlaps(&span))
    }

    /// Same options with `scopes` appended to the name qualifiers.
    pub fn nested<I, S>(&self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut nested = self.clone();
        nested.name_scopes.extend(scopes.into_iter().map(Into::into));
        nested
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_names_round_trip_through_from_str() {
        for mode in SerializationMode::ALL {
            assert_eq!(mode.as_str().parse::<SerializationMode>(), Ok(mode));
        }
        assert!("declaration".parse::<SerializationMode>().is_err());
    }

    #[test]
    fn test_source_modes() {
        assert!(SerializationMode::Source.is_source());
        assert!(SerializationMode::ImplSource.is_source());
        assert!(!SerializationMode::InterfaceHeader.is_source());
    }

    #[test]
    fn test_nested_appends_scopes() {
        let options = SerializeOptions::new(SerializationMode::Source)
            .with_name_scopes(vec!["N".to_string()]);
        assert_eq!(options.nested(["M"]).name_scopes, vec!["N", "M"]);
        assert_eq!(options.name_scopes, vec!["N"]);
    }

    #[test]
    fn test_range_admits_overlapping_spans() {
        let options = SerializeOptions::new(SerializationMode::Header);
        assert!(options.admits(Span::new(0, 3).unwrap()));

        let options = options.with_range(Span::new(10, 20).ok());
        assert!(options.admits(Span::new(0, 10).unwrap()));
        assert!(options.admits(Span::new(12, 14).unwrap()));
        assert!(!options.admits(Span::new(21, 30).unwrap()));
        assert_eq!(options.nested(["N"]).range, options.range);
    }
}
