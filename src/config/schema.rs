use crate::cpp::{
    ConfiguredNames, FilePreamble, NamePattern, NamespaceStyle, SerializationMode,
    SerializeOptions,
};
use crate::cpp::naming::NAME_PLACEHOLDER;
use crate::merge::MergeOptions;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

/// Contents of `codegen-cpp.toml`. Every section is optional.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct CodegenConfig {
    #[serde(default)]
    pub format: FormatSection,
    #[serde(default)]
    pub naming: NamingSection,
    #[serde(default)]
    pub source: SourceSection,
    #[serde(default)]
    pub merge: MergeSection,
    #[serde(default)]
    pub file_header: FileHeaderSection,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FormatSection {
    #[serde(default = "default_indent")]
    pub indent: String,
}

impl Default for FormatSection {
    fn default() -> Self {
        Self {
            indent: default_indent(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct NamingSection {
    #[serde(default = "default_interface_pattern")]
    pub interface_pattern: String,
    /// Interface name to implementation name.
    #[serde(default)]
    pub implementations: HashMap<String, String>,
}

impl Default for NamingSection {
    fn default() -> Self {
        Self {
            interface_pattern: default_interface_pattern(),
            implementations: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SourceSection {
    #[serde(default)]
    pub namespace_style: NamespaceStyle,
    #[serde(default = "default_true")]
    pub include_header: bool,
}

impl Default for SourceSection {
    fn default() -> Self {
        Self {
            namespace_style: NamespaceStyle::default(),
            include_header: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct MergeSection {
    #[serde(default = "default_true")]
    pub remove_unmatched: bool,
}

impl Default for MergeSection {
    fn default() -> Self {
        Self {
            remove_unmatched: true,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct FileHeaderSection {
    #[serde(default)]
    pub header: Vec<String>,
    #[serde(default)]
    pub source: Vec<String>,
}

fn default_indent() -> String {
    "    ".to_string()
}

fn default_interface_pattern() -> String {
    NamePattern::default().as_str().to_string()
}

fn default_true() -> bool {
    true
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl CodegenConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        let indent = &self.format.indent;
        if indent.is_empty() || !indent.chars().all(|c| c == ' ' || c == '\t') {
            issues.push(ValidationIssue::InvalidIndent {
                value: indent.clone(),
            });
        }

        let pattern = &self.naming.interface_pattern;
        if pattern.matches(NAME_PLACEHOLDER).count() != 1 {
            issues.push(ValidationIssue::MissingPlaceholder {
                value: pattern.clone(),
            });
        } else if !is_identifier(&pattern.replace(NAME_PLACEHOLDER, "Name")) {
            issues.push(ValidationIssue::InvalidIdentifier {
                field: "naming.interface_pattern".to_string(),
                value: pattern.clone(),
            });
        }

        let mut fixed: Vec<_> = self.naming.implementations.iter().collect();
        fixed.sort();
        for (interface, implementation) in fixed {
            for name in [interface, implementation] {
                if !is_identifier(name) {
                    issues.push(ValidationIssue::InvalidIdentifier {
                        field: format!("naming.implementations.{interface}"),
                        value: name.clone(),
                    });
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    /// Names answered from `[naming]`.
    pub fn name_provider(&self) -> ConfiguredNames {
        ConfiguredNames::new(
            NamePattern::new(self.naming.interface_pattern.clone()),
            self.naming.implementations.clone(),
        )
    }

    pub fn serialize_options(&self, mode: SerializationMode) -> SerializeOptions {
        SerializeOptions::new(mode)
            .with_indent(self.format.indent.clone())
            .with_namespace_style(self.source.namespace_style)
    }

    pub fn merge_options(
        &self,
        mode: SerializationMode,
        file_name: impl Into<String>,
    ) -> MergeOptions {
        MergeOptions::new(mode, file_name)
            .with_indent(self.format.indent.clone())
            .with_namespace_style(self.source.namespace_style)
            .with_remove_unmatched(self.merge.remove_unmatched)
    }

    /// Preamble of a generated file in `mode`; `header` is what a source
    /// includes when `[source] include_header` is on.
    pub fn preamble(&self, mode: SerializationMode, header: Option<&str>) -> FilePreamble {
        let lines = if mode.is_source() {
            &self.file_header.source
        } else {
            &self.file_header.header
        };
        let preamble = FilePreamble::new().with_comment_lines(lines.clone());
        match header {
            Some(header) if self.source.include_header => preamble.with_include(header),
            _ => preamble,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    InvalidIndent { value: String },
    MissingPlaceholder { value: String },
    InvalidIdentifier { field: String, value: String },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::InvalidIndent { value } => {
                write!(f, "format.indent must be spaces or tabs, got {value:?}")
            }
            ValidationIssue::MissingPlaceholder { value } => write!(
                f,
                "naming.interface_pattern must contain {NAME_PLACEHOLDER} exactly once, got '{value}'"
            ),
            ValidationIssue::InvalidIdentifier { field, value } => {
                write!(f, "{field} is not a valid C++ identifier: '{value}'")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = CodegenConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.format.indent, "    ");
        assert_eq!(config.naming.interface_pattern, "I${name}");
        assert!(config.source.include_header);
        assert!(config.merge.remove_unmatched);
    }

    #[test]
    fn test_every_issue_is_reported() {
        let mut config = CodegenConfig::default();
        config.format.indent = "--".to_string();
        config.naming.interface_pattern = "Interface".to_string();
        config
            .naming
            .implementations
            .insert("IShape".to_string(), "my shape".to_string());

        let err = config.validate().unwrap_err();
        assert_eq!(err.issues.len(), 3);
        assert!(err.to_string().contains("format.indent"));
        assert!(err.to_string().contains("naming.implementations.IShape"));
    }

    #[test]
    fn test_preamble_per_mode() {
        let mut config = CodegenConfig::default();
        config.file_header.header = vec!["// header".to_string()];
        config.file_header.source = vec!["// source".to_string()];

        let source = config.preamble(SerializationMode::Source, Some("shape.h"));
        assert_eq!(source.comment_lines, vec!["// source"]);
        assert_eq!(source.include.as_deref(), Some("shape.h"));

        config.source.include_header = false;
        let source = config.preamble(SerializationMode::Source, Some("shape.h"));
        assert_eq!(source.include, None);

        let header = config.preamble(SerializationMode::Header, None);
        assert_eq!(header.comment_lines, vec!["// header"]);
    }

    #[test]
    fn test_merge_options_follow_sections() {
        let mut config = CodegenConfig::default();
        config.merge.remove_unmatched = false;
        config.format.indent = "\t".to_string();
        let options = config.merge_options(SerializationMode::Source, "shape.cpp");
        assert!(!options.remove_unmatched);
        assert_eq!(options.indent, "\t");
        assert_eq!(options.file_name, "shape.cpp");
    }
}
