use crate::cpp::class::Class;
use crate::cpp::function::Function;
use crate::cpp::mode::{NamespaceStyle, SerializationMode, SerializeOptions};
use crate::cpp::naming::NameInputProvider;
use crate::cpp::output::Lines;
use crate::diff::Comparable;
use crate::text::Span;
use serde::Serialize;

/// A namespace block, or the whole document when the name is empty.
#[derive(Debug, Clone, Serialize)]
pub struct Namespace {
    pub name: String,
    pub span: Span,
    /// Inside of the braces; the whole document for the root, `None` for `{}`.
    pub body: Option<Span>,
    pub namespaces: Vec<Namespace>,
    pub classes: Vec<Class>,
    pub functions: Vec<Function>,
    /// Nothing but whitespace outside the recognized members.
    pub blank_outside_members: bool,
}

impl Namespace {
    pub fn new(name: impl Into<String>, span: Span, body: Option<Span>) -> Self {
        Self {
            name: name.into(),
            span,
            body,
            namespaces: Vec::new(),
            classes: Vec::new(),
            functions: Vec::new(),
            blank_outside_members: true,
        }
    }

    /// Root namespace covering `span`.
    pub fn root(span: Span) -> Self {
        Self::new("", span, Some(span))
    }

    pub fn is_root(&self) -> bool {
        self.name.is_empty()
    }

    /// `a::b` gives `["a", "b"]`.
    pub fn segments(&self) -> Vec<String> {
        self.name
            .split("::")
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty() && self.classes.is_empty() && self.functions.is_empty()
    }

    pub fn member_spans(&self) -> impl Iterator<Item = Span> + '_ {
        self.namespaces
            .iter()
            .map(|namespace| namespace.span)
            .chain(self.classes.iter().map(|class| class.span))
            .chain(self.functions.iter().map(|function| function.span))
    }

    pub fn namespace(&self, name: &str) -> Option<&Namespace> {
        self.namespaces.iter().find(|namespace| namespace.name == name)
    }

    pub fn class(&self, name: &str) -> Option<&Class> {
        self.classes.iter().find(|class| class.name == name)
    }

    pub fn provide_names(&self, provider: &dyn NameInputProvider, modes: &[SerializationMode]) {
        for class in &self.classes {
            class.provide_names(provider, modes);
        }
        for namespace in &self.namespaces {
            namespace.provide_names(provider, modes);
        }
    }

    /// Members one after the other; `options` already carries this
    /// namespace's qualifiers when they are needed.
    pub fn serialize_members(&self, options: &SerializeOptions) -> Lines {
        let mut lines = Lines::new();
        lines.append_separated(
            self.classes
                .iter()
                .map(|class| class.serialize(options))
                .chain(
                    self.functions
                        .iter()
                        .map(|function| function.serialize(options)),
                )
                .chain(
                    self.namespaces
                        .iter()
                        .map(|namespace| namespace.serialize(options)),
                ),
            0,
        );
        lines
    }

    pub fn serialize(&self, options: &SerializeOptions) -> Lines {
        if self.is_root() {
            return self.serialize_members(options);
        }
        if !options.admits(self.span) {
            return Lines::new();
        }
        let qualified =
            options.mode.is_source() && options.namespace_style == NamespaceStyle::Qualified;
        if qualified {
            return self.serialize_members(&options.nested(self.segments()));
        }
        wrap_in_namespace(&self.name, self.serialize_members(options))
    }
}

/// `namespace name {` + members + `}`; empty members give empty output.
pub fn wrap_in_namespace(name: &str, members: Lines) -> Lines {
    if members.is_empty() {
        return members;
    }
    let mut lines = Lines::single(format!("namespace {name} {{"));
    lines.blank();
    lines.append(members, 0);
    lines.blank();
    lines.push("}");
    lines
}

impl Comparable for Namespace {
    fn equals(&self, other: &Self, _mode: SerializationMode) -> bool {
        self.name == other.name
    }
}
