use crate::cpp::class::Access;
use crate::cpp::mode::{SerializationMode, SerializeOptions};
use crate::cpp::naming::ClassNames;
use crate::cpp::output::Lines;
use crate::cpp::signature::{arguments_equal, join_scopes, strip_default_arguments};
use crate::diff::Comparable;
use crate::text::Span;
use serde::Serialize;
use std::rc::Rc;

/// `= default` or `= delete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Defaulted {
    Default,
    Delete,
}

impl Defaulted {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "default" => Some(Defaulted::Default),
            "delete" => Some(Defaulted::Delete),
            _ => None,
        }
    }

    fn suffix(defaulted: Option<Self>) -> &'static str {
        match defaulted {
            Some(Defaulted::Default) => " = default",
            Some(Defaulted::Delete) => " = delete",
            None => "",
        }
    }
}

fn qualified(options: &SerializeOptions, class: &ClassNames, name: &str) -> String {
    let mut scopes = options.name_scopes.clone();
    scopes.extend(class.scopes(options.mode));
    join_scopes(&scopes, name)
}

#[derive(Debug, Clone, Serialize)]
pub struct Constructor {
    pub args: String,
    pub is_explicit: bool,
    pub defaulted: Option<Defaulted>,
    pub span: Span,
    #[serde(skip)]
    class: Rc<ClassNames>,
}

impl Constructor {
    pub fn new(
        args: impl Into<String>,
        is_explicit: bool,
        defaulted: Option<Defaulted>,
        span: Span,
        class: &Rc<ClassNames>,
    ) -> Self {
        Self {
            args: args.into(),
            is_explicit,
            defaulted,
            span,
            class: Rc::clone(class),
        }
    }

    pub fn class_names(&self) -> &Rc<ClassNames> {
        &self.class
    }

    /// Whether the constructor renders as a definition in `mode`.
    pub fn has_definition(&self, mode: SerializationMode) -> bool {
        mode.is_source() && self.defaulted.is_none() && self.class.accepts(mode)
    }

    pub fn serialize(&self, options: &SerializeOptions) -> Lines {
        let mode = options.mode;
        if !self.class.accepts(mode) || !options.admits(self.span) {
            return Lines::new();
        }
        let name = self.class.name(mode);
        match mode {
            SerializationMode::Header | SerializationMode::ImplHeader => {
                let explicit = if self.is_explicit { "explicit " } else { "" };
                Lines::single(format!(
                    "{explicit}{name}({}){};",
                    self.args,
                    Defaulted::suffix(self.defaulted)
                ))
            }
            SerializationMode::Source | SerializationMode::ImplSource
                if self.defaulted.is_none() =>
            {
                let mut lines = Lines::single(format!(
                    "{}({}) {{",
                    qualified(options, &self.class, &name),
                    strip_default_arguments(&self.args)
                ));
                lines.push("}");
                lines
            }
            _ => Lines::new(),
        }
    }
}

impl Comparable for Constructor {
    fn equals(&self, other: &Self, _mode: SerializationMode) -> bool {
        arguments_equal(&self.args, &other.args)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Destructor {
    /// `virtual` or `override`.
    pub is_virtual: bool,
    pub defaulted: Option<Defaulted>,
    pub access: Access,
    pub span: Span,
    #[serde(skip)]
    class: Rc<ClassNames>,
}

impl Destructor {
    pub fn new(
        is_virtual: bool,
        defaulted: Option<Defaulted>,
        access: Access,
        span: Span,
        class: &Rc<ClassNames>,
    ) -> Self {
        Self {
            is_virtual,
            defaulted,
            access,
            span,
            class: Rc::clone(class),
        }
    }

    pub fn class_names(&self) -> &Rc<ClassNames> {
        &self.class
    }

    /// The implementation of an interface always gets a real destructor.
    pub fn has_definition(&self, mode: SerializationMode) -> bool {
        match mode {
            SerializationMode::Source => self.defaulted.is_none(),
            SerializationMode::ImplSource => self.class.is_interface(),
            _ => false,
        }
    }

    pub fn serialize(&self, options: &SerializeOptions) -> Lines {
        if !options.admits(self.span) {
            return Lines::new();
        }
        let mode = options.mode;
        let name = format!("~{}", self.class.name(mode));
        match mode {
            SerializationMode::Header => {
                let virtual_ = if self.is_virtual { "virtual " } else { "" };
                Lines::single(format!(
                    "{virtual_}{name}(){};",
                    Defaulted::suffix(self.defaulted)
                ))
            }
            SerializationMode::InterfaceHeader | SerializationMode::AbstractFactoryHeader => {
                Lines::single(format!("virtual {name}() = default;"))
            }
            SerializationMode::ImplHeader if self.class.is_interface() => {
                Lines::single(format!("{name}() override;"))
            }
            SerializationMode::Source | SerializationMode::ImplSource
                if self.has_definition(mode) =>
            {
                let mut lines = Lines::single(format!(
                    "{}() {{",
                    qualified(options, &self.class, &name)
                ));
                lines.push("}");
                lines
            }
            _ => Lines::new(),
        }
    }
}

impl Comparable for Destructor {
    fn equals(&self, other: &Self, _mode: SerializationMode) -> bool {
        self.is_virtual == other.is_virtual
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span {
        Span::new(0, 1).unwrap()
    }

    fn render(lines: Lines) -> String {
        lines.render("    ")
    }

    #[test]
    fn test_constructor_forms() {
        let class = ClassNames::new("Widget", false, None);
        let ctor = Constructor::new("int size = 3", true, None, span(), &class);

        assert_eq!(
            render(ctor.serialize(&SerializeOptions::new(SerializationMode::Header))),
            "explicit Widget(int size = 3);"
        );
        let source = SerializeOptions::new(SerializationMode::Source)
            .with_name_scopes(vec!["ui".to_string()]);
        assert_eq!(
            render(ctor.serialize(&source)),
            "ui::Widget::Widget(int size) {\n}"
        );
    }

    #[test]
    fn test_defaulted_constructor_has_no_definition() {
        let class = ClassNames::new("Widget", false, None);
        let ctor = Constructor::new("", false, Some(Defaulted::Default), span(), &class);
        assert_eq!(
            render(ctor.serialize(&SerializeOptions::new(SerializationMode::Header))),
            "Widget() = default;"
        );
        assert!(ctor
            .serialize(&SerializeOptions::new(SerializationMode::Source))
            .is_empty());
        assert!(!ctor.has_definition(SerializationMode::Source));
    }

    #[test]
    fn test_constructors_compare_by_argument_types() {
        let class = ClassNames::new("Widget", false, None);
        let a = Constructor::new("int size", false, None, span(), &class);
        let b = Constructor::new("int", true, None, span(), &class);
        let c = Constructor::new("double", false, None, span(), &class);
        assert!(a.equals(&b, SerializationMode::Header));
        assert!(!a.equals(&c, SerializationMode::Header));
    }

    #[test]
    fn test_destructor_forms() {
        let class = ClassNames::new("IShape", true, None);
        let dtor = Destructor::new(true, Some(Defaulted::Default), Access::Public, span(), &class);

        let render_in = |mode| render(dtor.serialize(&SerializeOptions::new(mode)));
        assert_eq!(render_in(SerializationMode::Header), "virtual ~IShape() = default;");
        assert_eq!(render_in(SerializationMode::ImplHeader), "~Shape() override;");
        assert_eq!(render_in(SerializationMode::ImplSource), "Shape::~Shape() {\n}");
        assert_eq!(
            render_in(SerializationMode::InterfaceHeader),
            "virtual ~IIShape() = default;"
        );
        assert!(render_in(SerializationMode::Source).is_empty());
    }

    #[test]
    fn test_destructors_compare_virtuality() {
        let class = ClassNames::new("Widget", false, None);
        let plain = Destructor::new(false, None, Access::Public, span(), &class);
        let virtual_ = Destructor::new(true, None, Access::Private, span(), &class);
        assert!(!plain.equals(&virtual_, SerializationMode::Header));
        assert!(plain.equals(&plain.clone(), SerializationMode::Header));
    }
}
