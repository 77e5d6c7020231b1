//! Incremental synchronization of an existing file with a generated tree.
//!
//! A merger never rewrites a file. It compares what the file already holds
//! against what the parsed counterpart says it should hold and returns the
//! insertions and deletions that close the gap, all expressed against the
//! offsets of the untouched text.

mod definition;
mod header;
mod source;

pub use definition::{declared_definitions, parsed_definitions, Definition, Member};
pub use header::HeaderMerger;
pub use source::{Completion, CompletionKind, SourceMerger};

use crate::cpp::{Lines, Namespace, NamespaceStyle, ParseError, SerializationMode, SerializeOptions};
use crate::edit::TextEdit;
use crate::text::Span;

/// Computes the edits bringing an existing document in line.
pub trait Merger {
    fn merge(&self, existing: &str) -> Result<Vec<TextEdit>, ParseError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOptions {
    pub mode: SerializationMode,
    /// Indentation unit of inserted text.
    pub indent: String,
    /// Name used in edit labels.
    pub file_name: String,
    /// Delete members the generated side no longer has.
    pub remove_unmatched: bool,
    pub namespace_style: NamespaceStyle,
    /// Limit the merge to generated nodes overlapping this span. A limited
    /// merge only adds.
    pub range: Option<Span>,
}

impl MergeOptions {
    pub fn new(mode: SerializationMode, file_name: impl Into<String>) -> Self {
        Self {
            mode,
            indent: "    ".to_string(),
            file_name: file_name.into(),
            remove_unmatched: true,
            namespace_style: NamespaceStyle::default(),
            range: None,
        }
    }

    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    pub fn with_remove_unmatched(mut self, remove: bool) -> Self {
        self.remove_unmatched = remove;
        self
    }

    pub fn with_namespace_style(mut self, style: NamespaceStyle) -> Self {
        self.namespace_style = style;
        self
    }

    pub fn with_range(mut self, range: Option<Span>) -> Self {
        self.range = range;
        self
    }

    /// Unmatched members are deleted only by a full merge.
    pub fn removes_unmatched(&self) -> bool {
        self.remove_unmatched && self.range.is_none()
    }

    pub fn serialize_options(&self) -> SerializeOptions {
        SerializeOptions::new(self.mode)
            .with_indent(self.indent.clone())
            .with_namespace_style(self.namespace_style)
            .with_range(self.range)
    }

    fn added_label(&self) -> String {
        format!("Added to file {}", self.file_name)
    }

    fn removed_label(&self) -> String {
        format!("Removed from file {}", self.file_name)
    }
}

/// Where inserted text goes and how it is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Anchor<'t> {
    position: usize,
    indent: &'t str,
    /// Text follows a closing brace or the end of the document and needs a
    /// trailing newline.
    closing: bool,
}

impl<'t> Anchor<'t> {
    /// Right after the member covering `span`.
    fn after(text: &'t str, span: Span) -> Self {
        Self {
            position: span.end() + 1,
            indent: line_indent(text, span.start()),
            closing: false,
        }
    }

    /// End of the namespace body: the line of its closing brace when that
    /// line holds nothing else, the brace itself otherwise, and the end of the
    /// document for the root.
    fn closing(text: &'t str, namespace: &Namespace) -> Self {
        if namespace.is_root() {
            return Self {
                position: text.len(),
                indent: "",
                closing: true,
            };
        }
        let brace = namespace.span.end();
        let start = line_start(text, brace);
        let prefix = &text[start..brace];
        let position = if prefix.trim().is_empty() { start } else { brace };
        Self {
            position,
            indent: line_indent(text, brace),
            closing: true,
        }
    }
}

fn line_start(text: &str, position: usize) -> usize {
    text[..position].rfind('\n').map_or(0, |newline| newline + 1)
}

/// Leading whitespace of the line holding `position`.
pub fn line_indent(text: &str, position: usize) -> &str {
    let position = position.min(text.len());
    let start = line_start(text, position);
    let line = &text[start..];
    let width = line
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(line.len());
    &line[..width]
}

/// Accumulates the edits of one merge.
#[derive(Debug)]
struct EditCollector<'o> {
    options: &'o MergeOptions,
    edits: Vec<TextEdit>,
}

impl<'o> EditCollector<'o> {
    fn new(options: &'o MergeOptions) -> Self {
        Self {
            options,
            edits: Vec::new(),
        }
    }

    /// Insert `lines` at `anchor`; nothing happens when they are empty.
    fn insert(&mut self, anchor: Anchor<'_>, lines: &Lines) {
        let rendered = lines.render(&self.options.indent);
        let trimmed = rendered.trim();
        if trimmed.is_empty() {
            return;
        }
        let mut text = String::from("\n");
        let body: Vec<String> = trimmed
            .lines()
            .map(|line| {
                if line.trim().is_empty() {
                    String::new()
                } else {
                    format!("{}{line}", anchor.indent)
                }
            })
            .collect();
        text.push_str(&body.join("\n"));
        if anchor.closing {
            text.push('\n');
        }
        self.edits
            .push(TextEdit::insert(anchor.position, text, self.options.added_label()));
    }

    /// Delete `span`, unless removing is disabled.
    fn delete(&mut self, span: Span) {
        if self.options.removes_unmatched() {
            self.edits
                .push(TextEdit::delete(span, self.options.removed_label()));
        }
    }

    /// Edits ordered by position; insertion order is kept for equal positions.
    fn finish(mut self) -> Vec<TextEdit> {
        self.edits.sort_by_key(TextEdit::position);
        self.edits
    }
}
