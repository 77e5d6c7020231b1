use crate::cpp::function::Function;
use crate::cpp::mode::{SerializationMode, SerializeOptions};
use crate::cpp::naming::{ClassNames, NameInputProvider};
use crate::cpp::output::Lines;
use crate::cpp::special::{Constructor, Destructor};
use crate::diff::Comparable;
use crate::text::Span;
use serde::Serialize;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    Public,
    Protected,
    Private,
}

impl Access {
    pub const ALL: [Access; 3] = [Access::Public, Access::Protected, Access::Private];

    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "public" => Some(Access::Public),
            "protected" => Some(Access::Protected),
            "private" => Some(Access::Private),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Access::Public => "public:",
            Access::Protected => "protected:",
            Access::Private => "private:",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKeyword {
    Class,
    Struct,
}

impl ClassKeyword {
    pub fn parse(keyword: &str) -> Self {
        if keyword == "struct" {
            ClassKeyword::Struct
        } else {
            ClassKeyword::Class
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ClassKeyword::Class => "class",
            ClassKeyword::Struct => "struct",
        }
    }

    /// Access of members declared before any label.
    pub fn default_access(self) -> Access {
        match self {
            ClassKeyword::Class => Access::Private,
            ClassKeyword::Struct => Access::Public,
        }
    }
}

/// Members of one access level.
#[derive(Debug, Clone, Serialize)]
pub struct ClassScope {
    pub access: Access,
    pub constructors: Vec<Constructor>,
    pub functions: Vec<Function>,
    pub classes: Vec<Class>,
}

impl ClassScope {
    pub fn new(access: Access) -> Self {
        Self {
            access,
            constructors: Vec::new(),
            functions: Vec::new(),
            classes: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty() && self.functions.is_empty() && self.classes.is_empty()
    }

    /// Spans of every member, `destructor` included when it belongs here.
    pub fn member_spans<'a>(
        &'a self,
        destructor: Option<&'a Destructor>,
    ) -> impl Iterator<Item = Span> + 'a {
        self.constructors
            .iter()
            .map(|ctor| ctor.span)
            .chain(destructor.map(|dtor| dtor.span))
            .chain(self.functions.iter().map(|function| function.span))
            .chain(self.classes.iter().map(|class| class.span))
    }

    /// Member ending last: where new members of this scope go.
    pub fn anchor(&self, destructor: Option<&Destructor>) -> Option<Span> {
        self.member_spans(destructor).max_by_key(Span::end)
    }

    /// Members without label or wrapping.
    pub fn serialize_members(
        &self,
        options: &SerializeOptions,
        destructor: Option<&Destructor>,
    ) -> Lines {
        let mut blocks: Vec<Lines> = Vec::new();
        blocks.extend(self.constructors.iter().map(|ctor| ctor.serialize(options)));
        blocks.extend(destructor.map(|dtor| dtor.serialize(options)));
        blocks.extend(
            self.functions
                .iter()
                .map(|function| function.serialize(options)),
        );
        blocks.extend(self.classes.iter().map(|class| class.serialize(options)));

        let mut lines = Lines::new();
        if options.mode.is_source() {
            lines.append_separated(blocks, 0);
        } else {
            for block in blocks {
                lines.append(block, 0);
            }
        }
        lines
    }

    /// Label followed by the indented members; empty when nothing renders.
    fn serialize_labelled(
        &self,
        options: &SerializeOptions,
        destructor: Option<&Destructor>,
    ) -> Lines {
        let members = self.serialize_members(options, destructor);
        if members.is_empty() {
            return members;
        }
        let mut lines = Lines::single(self.access.label());
        lines.append(members, 1);
        lines
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Class {
    pub name: String,
    pub keyword: ClassKeyword,
    pub bases: Vec<String>,
    pub is_interface: bool,
    pub span: Span,
    pub destructor: Option<Destructor>,
    pub public: ClassScope,
    pub protected: ClassScope,
    pub private: ClassScope,
    #[serde(skip)]
    names: Rc<ClassNames>,
}

impl Class {
    pub fn new(
        keyword: ClassKeyword,
        bases: Vec<String>,
        span: Span,
        names: &Rc<ClassNames>,
    ) -> Self {
        Self {
            name: names.original().to_string(),
            keyword,
            bases,
            is_interface: names.is_interface(),
            span,
            destructor: None,
            public: ClassScope::new(Access::Public),
            protected: ClassScope::new(Access::Protected),
            private: ClassScope::new(Access::Private),
            names: Rc::clone(names),
        }
    }

    pub fn names(&self) -> &Rc<ClassNames> {
        &self.names
    }

    pub fn name_in(&self, mode: SerializationMode) -> String {
        self.names.name(mode)
    }

    pub fn scope(&self, access: Access) -> &ClassScope {
        match access {
            Access::Public => &self.public,
            Access::Protected => &self.protected,
            Access::Private => &self.private,
        }
    }

    pub fn scope_mut(&mut self, access: Access) -> &mut ClassScope {
        match access {
            Access::Public => &mut self.public,
            Access::Protected => &mut self.protected,
            Access::Private => &mut self.private,
        }
    }

    pub fn scopes(&self) -> [&ClassScope; 3] {
        [&self.public, &self.protected, &self.private]
    }

    /// The destructor when it is declared under `access`.
    pub fn destructor_in(&self, access: Access) -> Option<&Destructor> {
        self.destructor
            .as_ref()
            .filter(|dtor| dtor.access == access)
    }

    pub fn provide_names(&self, provider: &dyn NameInputProvider, modes: &[SerializationMode]) {
        self.names.provide(provider, modes);
        for scope in self.scopes() {
            for class in &scope.classes {
                class.provide_names(provider, modes);
            }
        }
    }

    pub fn serialize(&self, options: &SerializeOptions) -> Lines {
        let mode = options.mode;
        if !self.names.accepts(mode) || !options.admits(self.span) {
            return Lines::new();
        }
        match mode {
            SerializationMode::Header => self.serialize_declaration(options),
            SerializationMode::ImplHeader => self.serialize_implementation(options),
            SerializationMode::InterfaceHeader => self.serialize_interface(options),
            SerializationMode::AbstractFactoryHeader => self.serialize_factory(),
            SerializationMode::Source | SerializationMode::ImplSource => {
                let mut lines = Lines::new();
                lines.append_separated(
                    Access::ALL.into_iter().map(|access| {
                        self.scope(access)
                            .serialize_members(options, self.destructor_in(access))
                    }),
                    0,
                );
                lines
            }
        }
    }

    fn wrap(&self, heading: String, body: Lines) -> Lines {
        let mut lines = Lines::single(format!("{heading} {{"));
        lines.append(body, 0);
        lines.push("};");
        lines
    }

    fn serialize_declaration(&self, options: &SerializeOptions) -> Lines {
        let mut heading = format!("{} {}", self.keyword.as_str(), self.names.name(options.mode));
        if !self.bases.is_empty() {
            heading.push_str(" : ");
            heading.push_str(&self.bases.join(", "));
        }
        let mut body = Lines::new();
        for access in Access::ALL {
            body.append(
                self.scope(access)
                    .serialize_labelled(options, self.destructor_in(access)),
                0,
            );
        }
        self.wrap(heading, body)
    }

    fn serialize_implementation(&self, options: &SerializeOptions) -> Lines {
        let heading = format!(
            "class {} : public {}",
            self.names.name(options.mode),
            self.names.scoped_name(SerializationMode::Header)
        );
        let mut body = Lines::new();
        for access in Access::ALL {
            let destructor = match access {
                Access::Public => self.destructor.as_ref(),
                _ => None,
            };
            body.append(
                self.scope(access).serialize_labelled(options, destructor),
                0,
            );
        }
        self.wrap(heading, body)
    }

    fn serialize_interface(&self, options: &SerializeOptions) -> Lines {
        let name = self.names.name(options.mode);
        let mut members = Lines::single(format!("virtual ~{name}() = default;"));
        members.append(self.public.serialize_members(options, None), 0);

        let mut body = Lines::single(Access::Public.label());
        body.append(members, 1);
        self.wrap(format!("class {name}"), body)
    }

    fn serialize_factory(&self) -> Lines {
        let factory = self.names.name(SerializationMode::AbstractFactoryHeader);
        let product = self.names.scoped_name(SerializationMode::Header);
        let created = if self.is_interface {
            self.names.name(SerializationMode::ImplHeader)
        } else {
            self.name.clone()
        };

        let mut members = Lines::single(format!("virtual ~{factory}() = default;"));
        members.push(format!(
            "virtual std::unique_ptr<{product}> create{created}() = 0;"
        ));
        let mut body = Lines::single(Access::Public.label());
        body.append(members, 1);
        self.wrap(format!("class {factory}"), body)
    }
}

impl Comparable for Class {
    fn equals(&self, other: &Self, mode: SerializationMode) -> bool {
        self.names.resolved_name(mode) == other.names.resolved_name(mode)
    }
}
