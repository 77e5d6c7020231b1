//! Class names across serialization modes.
//!
//! A parsed class is known by its original name, but the implementation,
//! interface and factory views of it are named differently. Implementation
//! names come from a [`NameInputProvider`] and are asked for at most once
//! per class.

use crate::cpp::mode::SerializationMode;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// Placeholder substituted with the class name in a [`NamePattern`].
pub const NAME_PLACEHOLDER: &str = "${name}";

/// Source of names that cannot be derived from the parsed text alone.
pub trait NameInputProvider {
    /// Name of the class implementing `interface_name`.
    fn implementation_name(&self, interface_name: &str) -> String;

    /// Name of the interface extracted from `class_name`.
    fn interface_name(&self, class_name: &str) -> String {
        NamePattern::default().interface_name(class_name)
    }
}

/// Interface naming pattern such as `I${name}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePattern {
    pattern: String,
}

impl Default for NamePattern {
    fn default() -> Self {
        Self::new("I${name}")
    }
}

impl NamePattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    pub fn interface_name(&self, name: &str) -> String {
        self.pattern.replace(NAME_PLACEHOLDER, name)
    }

    /// Invert the pattern: `IShape` gives `Shape` for `I${name}`.
    pub fn deduce_implementation_name(&self, interface_name: &str) -> Option<String> {
        let (prefix, suffix) = self.pattern.split_once(NAME_PLACEHOLDER)?;
        let name = interface_name.strip_prefix(prefix)?.strip_suffix(suffix)?;
        if name.is_empty() || name.contains(|c: char| c.is_whitespace()) {
            return None;
        }
        Some(name.to_string())
    }
}

/// `IShape` becomes `Shape`, anything else gets an `Impl` suffix.
pub fn default_implementation_name(interface_name: &str) -> String {
    let mut chars = interface_name.chars();
    match (chars.next(), chars.next()) {
        (Some('I'), Some(next)) if next.is_ascii_uppercase() => interface_name[1..].to_string(),
        _ => format!("{interface_name}Impl"),
    }
}

/// Provider answering from configuration: fixed names first, then the
/// interface pattern, then [`default_implementation_name`].
#[derive(Debug, Clone, Default)]
pub struct ConfiguredNames {
    pattern: NamePattern,
    fixed: HashMap<String, String>,
}

impl ConfiguredNames {
    pub fn new(pattern: NamePattern, fixed: HashMap<String, String>) -> Self {
        Self { pattern, fixed }
    }
}

impl NameInputProvider for ConfiguredNames {
    fn implementation_name(&self, interface_name: &str) -> String {
        if let Some(name) = self.fixed.get(interface_name) {
            return name.clone();
        }
        self.pattern
            .deduce_implementation_name(interface_name)
            .unwrap_or_else(|| default_implementation_name(interface_name))
    }

    fn interface_name(&self, class_name: &str) -> String {
        self.pattern.interface_name(class_name)
    }
}

/// Names of one class, shared by the class and all of its members.
#[derive(Debug)]
pub struct ClassNames {
    original: String,
    is_interface: bool,
    outer: Option<Weak<ClassNames>>,
    resolved: RefCell<HashMap<SerializationMode, String>>,
}

impl ClassNames {
    pub fn new(
        original: impl Into<String>,
        is_interface: bool,
        outer: Option<&Rc<ClassNames>>,
    ) -> Rc<Self> {
        Rc::new(Self {
            original: original.into(),
            is_interface,
            outer: outer.map(Rc::downgrade),
            resolved: RefCell::new(HashMap::new()),
        })
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn is_interface(&self) -> bool {
        self.is_interface
    }

    /// Implementation modes only apply to interfaces.
    pub fn accepts(&self, mode: SerializationMode) -> bool {
        !mode.is_implementation() || self.is_interface
    }

    /// Resolve the names `modes` need through `provider`. Names already
    /// resolved are kept.
    pub fn provide(&self, provider: &dyn NameInputProvider, modes: &[SerializationMode]) {
        let mut resolved = self.resolved.borrow_mut();
        for &mode in modes {
            if resolved.contains_key(&mode) {
                continue;
            }
            match mode {
                SerializationMode::ImplHeader | SerializationMode::ImplSource => {
                    if self.is_interface {
                        let name = provider.implementation_name(&self.original);
                        resolved.insert(SerializationMode::ImplHeader, name.clone());
                        resolved.insert(SerializationMode::ImplSource, name);
                    }
                }
                SerializationMode::InterfaceHeader => {
                    resolved.insert(mode, provider.interface_name(&self.original));
                }
                _ => {}
            }
        }
    }

    /// Unqualified name of the class in `mode`.
    pub fn name(&self, mode: SerializationMode) -> String {
        if let Some(name) = self.resolved.borrow().get(&mode) {
            return name.clone();
        }
        match mode {
            SerializationMode::Header | SerializationMode::Source => self.original.clone(),
            SerializationMode::ImplHeader | SerializationMode::ImplSource => {
                if self.is_interface {
                    default_implementation_name(&self.original)
                } else {
                    self.original.clone()
                }
            }
            SerializationMode::InterfaceHeader => {
                NamePattern::default().interface_name(&self.original)
            }
            SerializationMode::AbstractFactoryHeader => format!("{}Factory", self.original),
        }
    }

    /// Name provided for `mode`, or the original name when nothing was
    /// provided. Classes parsed from an existing file are only known by what
    /// they are literally called.
    pub fn resolved_name(&self, mode: SerializationMode) -> String {
        self.resolved
            .borrow()
            .get(&mode)
            .cloned()
            .unwrap_or_else(|| self.original.clone())
    }

    /// Names of the enclosing classes followed by this class's own name.
    pub fn scopes(&self, mode: SerializationMode) -> Vec<String> {
        let mut scopes = self
            .outer
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|outer| outer.scopes(mode))
            .unwrap_or_default();
        scopes.push(self.name(mode));
        scopes
    }

    /// `Outer::Inner` in `mode`.
    pub fn scoped_name(&self, mode: SerializationMode) -> String {
        self.scopes(mode).join("::")
    }
}
