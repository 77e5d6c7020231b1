use crate::cpp::signature::{arguments_equal, normalize_return_type, split_qualified};
use crate::cpp::{
    Class, Constructor, Destructor, Function, Lines, Namespace, SerializationMode,
    SerializeOptions,
};
use crate::diff::Comparable;
use crate::text::Span;

/// The parsed node a [`Definition`] stands for.
#[derive(Debug, Clone, Copy)]
pub enum Member<'a> {
    Function(&'a Function),
    Constructor(&'a Constructor),
    Destructor(&'a Destructor),
}

impl Member<'_> {
    fn serialize(&self, options: &SerializeOptions) -> Lines {
        match self {
            Member::Function(function) => function.serialize(options),
            Member::Constructor(ctor) => ctor.serialize(options),
            Member::Destructor(dtor) => dtor.serialize(options),
        }
    }
}

/// A function body as it appears in a source file, located by the
/// namespaces and classes that qualify it.
#[derive(Debug, Clone)]
pub struct Definition<'a> {
    /// Namespaces enclosing the definition in the document.
    pub namespaces: Vec<String>,
    /// Qualifiers of the name: classes, or namespaces spelled out in the name.
    pub classes: Vec<String>,
    pub name: String,
    pub return_type: String,
    pub args: String,
    pub is_const: bool,
    pub span: Span,
    pub member: Member<'a>,
}

impl<'a> Definition<'a> {
    fn new(
        namespaces: &[String],
        qualifiers: Vec<String>,
        name: &str,
        function: (&str, &str, bool),
        span: Span,
        member: Member<'a>,
    ) -> Self {
        let (mut classes, name) = split_qualified(name);
        let (return_type, args, is_const) = function;
        let mut qualified = qualifiers;
        qualified.append(&mut classes);
        Self {
            namespaces: namespaces.to_vec(),
            classes: qualified,
            name,
            return_type: return_type.to_string(),
            args: args.to_string(),
            is_const,
            span,
            member,
        }
    }

    fn from_function(namespaces: &[String], classes: Vec<String>, function: &'a Function) -> Self {
        Self::new(
            namespaces,
            classes,
            &function.name,
            (&function.return_type, &function.args, function.is_const),
            function.span,
            Member::Function(function),
        )
    }

    /// Every qualifier followed by the name.
    pub fn path(&self) -> impl Iterator<Item = &str> {
        self.namespaces
            .iter()
            .chain(&self.classes)
            .map(String::as_str)
            .chain(std::iter::once(self.name.as_str()))
    }

    /// Definition text; `options.name_scopes` goes in front of the
    /// qualifiers the member adds itself.
    pub fn serialize(&self, options: &SerializeOptions) -> Lines {
        self.member.serialize(options)
    }
}

impl Comparable for Definition<'_> {
    fn equals(&self, other: &Self, _mode: SerializationMode) -> bool {
        self.path().eq(other.path())
            && normalize_return_type(&self.return_type) == normalize_return_type(&other.return_type)
            && arguments_equal(&self.args, &other.args)
            && self.is_const == other.is_const
    }
}

/// Definitions of a parsed source file, in document order per namespace.
pub fn parsed_definitions(root: &Namespace) -> Vec<Definition<'_>> {
    let mut definitions = Vec::new();
    collect_namespace(root, &mut Vec::new(), None, &mut definitions);
    definitions
}

/// Definitions a parsed header calls for in `mode`: every member that
/// renders as a definition.
pub fn declared_definitions(root: &Namespace, mode: SerializationMode) -> Vec<Definition<'_>> {
    let mut definitions = Vec::new();
    collect_namespace(root, &mut Vec::new(), Some(mode), &mut definitions);
    definitions
}

fn collect_namespace<'a>(
    namespace: &'a Namespace,
    path: &mut Vec<String>,
    mode: Option<SerializationMode>,
    out: &mut Vec<Definition<'a>>,
) {
    let depth = path.len();
    path.extend(namespace.segments());

    out.extend(
        namespace
            .functions
            .iter()
            .filter(|function| mode.map_or(true, |mode| function.has_definition(mode)))
            .map(|function| Definition::from_function(path, Vec::new(), function)),
    );
    if let Some(mode) = mode {
        for class in &namespace.classes {
            collect_class(class, path, mode, out);
        }
    }
    for nested in &namespace.namespaces {
        collect_namespace(nested, path, mode, out);
    }
    path.truncate(depth);
}

fn collect_class<'a>(
    class: &'a Class,
    namespaces: &[String],
    mode: SerializationMode,
    out: &mut Vec<Definition<'a>>,
) {
    if !class.names().accepts(mode) {
        return;
    }
    let classes = class.names().scopes(mode);
    let name = class.name_in(mode);

    for scope in class.scopes() {
        out.extend(
            scope
                .constructors
                .iter()
                .filter(|ctor| ctor.has_definition(mode))
                .map(|ctor| {
                    Definition::new(
                        namespaces,
                        classes.clone(),
                        &name,
                        ("", &ctor.args, false),
                        ctor.span,
                        Member::Constructor(ctor),
                    )
                }),
        );
        if let Some(dtor) = class
            .destructor_in(scope.access)
            .filter(|dtor| dtor.has_definition(mode))
        {
            out.push(Definition::new(
                namespaces,
                classes.clone(),
                &format!("~{name}"),
                ("", "", false),
                dtor.span,
                Member::Destructor(dtor),
            ));
        }
        out.extend(
            scope
                .functions
                .iter()
                .filter(|function| function.has_definition(mode))
                .map(|function| {
                    Definition::from_function(namespaces, function.class_scopes(mode), function)
                }),
        );
        for nested in &scope.classes {
            collect_class(nested, namespaces, mode, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpp::{parse_header, parse_source};

    const HEADER: &str = "namespace geo {\n\nclass Shape {\npublic:\n    explicit Shape(int sides = 3);\n    virtual ~Shape();\n    double area(int precision) const;\n    virtual void draw() = 0;\n    friend bool operator==(const Shape& a, const Shape& b);\n\n    struct Cache {\n        void clear();\n    };\n};\n\nint count();\n\n}\n";

    fn paths(definitions: &[Definition<'_>]) -> Vec<String> {
        definitions
            .iter()
            .map(|definition| definition.path().collect::<Vec<_>>().join("::"))
            .collect()
    }

    #[test]
    fn test_header_definitions() {
        let root = parse_header(HEADER).unwrap();
        let definitions = declared_definitions(&root, SerializationMode::Source);
        assert_eq!(
            paths(&definitions),
            vec![
                "geo::count",
                "geo::Shape::Shape",
                "geo::Shape::~Shape",
                "geo::Shape::area",
                "geo::operator==",
                "geo::Shape::Cache::clear",
            ]
        );
        assert_eq!(definitions[1].args, "int sides = 3");
    }

    #[test]
    fn test_source_definitions_match_header() {
        let source = "#include \"shape.h\"\n\nnamespace geo {\n\nShape::Shape(int sides) {\n}\n\nShape::~Shape() {\n}\n\ndouble Shape::area(int p) const {\n    return 0.0;\n}\n\n}\n\nint geo::count() {\n    return 0;\n}\n";
        let header = parse_header(HEADER).unwrap();
        let parsed = parse_source(source).unwrap();
        let declared = declared_definitions(&header, SerializationMode::Source);
        let defined = parsed_definitions(&parsed);

        assert_eq!(defined.len(), 4);
        for definition in &defined {
            assert!(
                declared
                    .iter()
                    .any(|other| definition.equals(other, SerializationMode::Source)),
                "{:?} has no declaration",
                definition.name
            );
        }
    }

    #[test]
    fn test_interface_definitions_in_implementation_mode() {
        let header = "class IShape {\npublic:\n    virtual ~IShape() = default;\n    virtual double area() const = 0;\n    static int count();\n};\n";
        let root = parse_header(header).unwrap();
        let definitions = declared_definitions(&root, SerializationMode::ImplSource);
        assert_eq!(paths(&definitions), vec!["Shape::~Shape", "Shape::area"]);
    }
}
