use crate::cpp::mode::{SerializationMode, SerializeOptions};
use crate::cpp::naming::ClassNames;
use crate::cpp::output::Lines;
use crate::cpp::signature::{
    arguments_equal, join_scopes, normalize_return_type, split_qualified, strip_default_arguments,
};
use crate::diff::Comparable;
use crate::text::Span;
use serde::Serialize;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Virtuality {
    None,
    Virtual,
    Override,
    Pure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FunctionKind {
    Member { virtuality: Virtuality },
    Static,
    Friend,
    /// `operator T()`; the name carries the target type.
    CastOperator { virtuality: Virtuality },
    /// Class-specific `operator new` / `operator delete`.
    Allocator,
    /// Namespace-level declaration or any parsed definition.
    Standalone,
}

/// How a function renders in one mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Form {
    Skip,
    Declaration {
        prefix: &'static str,
        suffix: &'static str,
    },
    Definition,
}

const PLAIN: Form = Form::Declaration {
    prefix: "",
    suffix: "",
};
const PURE: Form = Form::Declaration {
    prefix: "virtual ",
    suffix: " = 0",
};
const OVERRIDE: Form = Form::Declaration {
    prefix: "",
    suffix: " override",
};

fn virtual_form(virtuality: Virtuality, mode: SerializationMode) -> Form {
    use SerializationMode::*;
    match (virtuality, mode) {
        (Virtuality::None, Header) => PLAIN,
        (Virtuality::Virtual, Header) => Form::Declaration {
            prefix: "virtual ",
            suffix: "",
        },
        (Virtuality::Override, Header) => OVERRIDE,
        (Virtuality::Pure, Header) => PURE,
        (Virtuality::Pure, Source) => Form::Skip,
        (_, Source) => Form::Definition,
        (Virtuality::Pure, ImplHeader) => OVERRIDE,
        (Virtuality::Pure, ImplSource) => Form::Definition,
        (Virtuality::None, InterfaceHeader) => Form::Skip,
        (_, InterfaceHeader) => PURE,
        _ => Form::Skip,
    }
}

impl FunctionKind {
    fn form(self, mode: SerializationMode) -> Form {
        match self {
            FunctionKind::Member { virtuality } | FunctionKind::CastOperator { virtuality } => {
                virtual_form(virtuality, mode)
            }
            FunctionKind::Static => match mode {
                SerializationMode::Header => Form::Declaration {
                    prefix: "static ",
                    suffix: "",
                },
                SerializationMode::Source => Form::Definition,
                _ => Form::Skip,
            },
            FunctionKind::Friend => match mode {
                SerializationMode::Header => Form::Declaration {
                    prefix: "friend ",
                    suffix: "",
                },
                SerializationMode::Source => Form::Definition,
                _ => Form::Skip,
            },
            FunctionKind::Allocator | FunctionKind::Standalone => match mode {
                SerializationMode::Header => PLAIN,
                SerializationMode::Source => Form::Definition,
                _ => Form::Skip,
            },
        }
    }

    pub fn virtuality(self) -> Option<Virtuality> {
        match self {
            FunctionKind::Member { virtuality } | FunctionKind::CastOperator { virtuality } => {
                Some(virtuality)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Function {
    pub name: String,
    pub return_type: String,
    pub args: String,
    pub is_const: bool,
    #[serde(flatten)]
    pub kind: FunctionKind,
    pub span: Span,
    #[serde(skip)]
    class: Option<Rc<ClassNames>>,
}

impl Function {
    pub fn standalone(
        name: impl Into<String>,
        return_type: impl Into<String>,
        args: impl Into<String>,
        is_const: bool,
        span: Span,
    ) -> Self {
        Self {
            name: name.into(),
            return_type: return_type.into(),
            args: args.into(),
            is_const,
            kind: FunctionKind::Standalone,
            span,
            class: None,
        }
    }

    pub fn member(
        kind: FunctionKind,
        name: impl Into<String>,
        return_type: impl Into<String>,
        args: impl Into<String>,
        is_const: bool,
        span: Span,
        class: &Rc<ClassNames>,
    ) -> Self {
        Self {
            name: name.into(),
            return_type: return_type.into(),
            args: args.into(),
            is_const,
            kind,
            span,
            class: Some(Rc::clone(class)),
        }
    }

    pub fn class_names(&self) -> Option<&Rc<ClassNames>> {
        self.class.as_ref()
    }

    pub fn is_pure(&self) -> bool {
        self.kind.virtuality() == Some(Virtuality::Pure)
    }

    /// Whether the function renders as a definition in `mode`.
    pub fn has_definition(&self, mode: SerializationMode) -> bool {
        self.kind.form(mode) == Form::Definition && self.accepts(mode)
    }

    fn accepts(&self, mode: SerializationMode) -> bool {
        self.class
            .as_ref()
            .map_or(!mode.is_implementation(), |class| class.accepts(mode))
    }

    /// Class qualifiers of the definition in `mode`; friends are free functions.
    pub fn class_scopes(&self, mode: SerializationMode) -> Vec<String> {
        match (&self.class, self.kind) {
            (_, FunctionKind::Friend) | (None, _) => Vec::new(),
            (Some(class), _) => class.scopes(mode),
        }
    }

    fn signature(&self, name: &str, args: &str) -> String {
        let constness = if self.is_const { " const" } else { "" };
        if self.return_type.is_empty() {
            format!("{name}({args}){constness}")
        } else {
            format!("{} {name}({args}){constness}", self.return_type)
        }
    }

    /// Type returned by the stub body, if any.
    fn returned_type(&self) -> Option<String> {
        let returned = match self.kind {
            FunctionKind::CastOperator { .. } => {
                let (_, name) = split_qualified(&self.name);
                name.strip_prefix("operator ")?.to_string()
            }
            _ => normalize_return_type(&self.return_type),
        };
        (!returned.is_empty() && returned != "void").then_some(returned)
    }

    fn definition(&self, options: &SerializeOptions) -> Lines {
        let mut scopes = options.name_scopes.clone();
        scopes.extend(self.class_scopes(options.mode));
        let name = join_scopes(&scopes, &self.name);
        let heading = self.signature(&name, &strip_default_arguments(&self.args));

        let mut lines = Lines::single(format!("{heading} {{"));
        if let Some(returned) = self.returned_type() {
            match returned.strip_suffix(" &") {
                Some(referenced) => {
                    lines.push_indented(1, format!("static {referenced} returnValue;"))
                }
                None => lines.push_indented(1, format!("{returned} returnValue;")),
            };
            lines.push_indented(1, "return returnValue;");
        }
        lines.push("}");
        lines
    }

    pub fn serialize(&self, options: &SerializeOptions) -> Lines {
        if !self.accepts(options.mode) || !options.admits(self.span) {
            return Lines::new();
        }
        match self.kind.form(options.mode) {
            Form::Skip => Lines::new(),
            Form::Declaration { prefix, suffix } => Lines::single(format!(
                "{prefix}{}{suffix};",
                self.signature(&self.name, &self.args)
            )),
            Form::Definition => self.definition(options),
        }
    }
}

impl Comparable for Function {
    fn equals(&self, other: &Self, _mode: SerializationMode) -> bool {
        split_qualified(&self.name) == split_qualified(&other.name)
            && normalize_return_type(&self.return_type)
                == normalize_return_type(&other.return_type)
            && arguments_equal(&self.args, &other.args)
            && self.is_const == other.is_const
    }
}
