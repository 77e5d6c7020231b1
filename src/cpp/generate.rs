use crate::cpp::mode::{SerializationMode, SerializeOptions};
use crate::cpp::namespace::Namespace;

/// Lines written above the serialized tree of a new file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilePreamble {
    /// Verbatim lines, usually comments, at the very top.
    pub comment_lines: Vec<String>,
    /// Header the generated file includes. Ignored in [`SerializationMode::Header`]
    /// and [`SerializationMode::InterfaceHeader`], which stand on their own.
    pub include: Option<String>,
}

impl FilePreamble {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_comment_lines(mut self, lines: Vec<String>) -> Self {
        self.comment_lines = lines;
        self
    }

    pub fn with_include(mut self, header: impl Into<String>) -> Self {
        self.include = Some(header.into());
        self
    }
}

/// Render a complete file for `root` in `options.mode`. The result always
/// ends with a newline.
pub fn generate_file(root: &Namespace, options: &SerializeOptions, preamble: &FilePreamble) -> String {
    let mode = options.mode;
    let mut out: Vec<String> = preamble.comment_lines.clone();

    if !mode.is_source() {
        out.push("#pragma once".to_string());
    }
    let mut includes = Vec::new();
    if mode == SerializationMode::AbstractFactoryHeader {
        includes.push("#include <memory>".to_string());
    }
    let standalone = matches!(
        mode,
        SerializationMode::Header | SerializationMode::InterfaceHeader
    );
    if let Some(header) = preamble.include.as_deref().filter(|_| !standalone) {
        includes.push(format!("#include \"{header}\""));
    }
    if !includes.is_empty() {
        if !out.is_empty() {
            out.push(String::new());
        }
        out.extend(includes);
    }

    let body = root.serialize(options).render(&options.indent);
    if !body.is_empty() {
        if !out.is_empty() {
            out.push(String::new());
        }
        out.push(body);
    }

    let mut text = out.join("\n");
    text.push('\n');
    text
}
