//! Structural parsing of C++ headers and sources.
//!
//! Parsing works on a [`Fragment`] of the document: every recognized
//! construct is cut out as soon as it is found, so later, looser patterns
//! never see text that already belongs to something. All spans reported in
//! the resulting tree are absolute offsets into the original document.
//!
//! The namespace walk is shared; what a namespace body contains is decided
//! by a [`ParseStrategy`].

mod header;
mod source;

pub use header::HeaderParser;
pub use source::SourceParser;

use crate::cpp::errors::ParseError;
use crate::cpp::namespace::Namespace;
use crate::matcher::{RegexMatcher, RemovingBodyMatcher, RemovingRegexMatcher, TextMatch};
use crate::text::{Fragment, Span};
use tracing::debug;

/// String and character literals are matched (group 1) so that comment
/// markers inside them are left alone.
const COMMENTS: &str = r#"("(?:[^"\\\n]|\\.)*"|'(?:[^'\\\n]|\\.)*')|/\*(?s:.*?)\*/|//[^\n]*"#;
const PREPROCESSOR: &str = r"(?m)^[ \t]*#(?:[^\\\n]|\\(?s:.))*";
const NAMESPACE: &str = r"\b(?:inline\s+)?namespace\s+([A-Za-z_][\w:]*)";
const ANONYMOUS_NAMESPACE: &str = r"\bnamespace";

/// Return type of a declaration; must end in whitespace, `*` or `&`.
pub(crate) const RETURN_TYPE: &str = r"\b([A-Za-z_][\w:<>,\t *&]*?[\t *&])\s*";
/// Possibly qualified function name, operators included.
pub(crate) const FUNCTION_NAME: &str =
    r"((?:\w+::)*(?:operator\s*(?:\(\)|\[\]|[^\s\w();{}]+)|operator\s+(?:new|delete)\b(?:\s*\[\s*\])?|~?\w+))";

/// Words that never start a function name.
const STATEMENT_KEYWORDS: &[&str] = &[
    "if", "for", "while", "switch", "return", "sizeof", "decltype", "alignof", "static_assert",
    "catch", "throw", "new", "delete",
];

/// Decides what a namespace body is made of.
pub trait ParseStrategy {
    /// Recover the classes and functions of `namespace` from `body`, which
    /// no longer contains nested namespaces.
    fn parse_members(&self, namespace: &mut Namespace, body: &mut Fragment)
        -> Result<(), ParseError>;
}

/// Parse a document with `strategy` into its root namespace.
pub fn parse(strategy: &dyn ParseStrategy, text: &str) -> Result<Namespace, ParseError> {
    let mut root = Namespace::root(Span::new(0, text.len().saturating_sub(1))?);
    let mut fragment = Fragment::new(text);
    strip_comments(&mut fragment)?;
    RemovingRegexMatcher::new(PREPROCESSOR)?.matches(&mut fragment);

    parse_namespace_body(strategy, &mut root, &mut fragment, text)?;
    debug!(
        namespaces = root.namespaces.len(),
        classes = root.classes.len(),
        functions = root.functions.len(),
        "parsed document"
    );
    Ok(root)
}

pub fn parse_header(text: &str) -> Result<Namespace, ParseError> {
    parse(&HeaderParser, text)
}

pub fn parse_source(text: &str) -> Result<Namespace, ParseError> {
    parse(&SourceParser, text)
}

fn strip_comments(fragment: &mut Fragment) -> Result<(), ParseError> {
    let comments: Vec<Span> = RegexMatcher::new(COMMENTS)?
        .find(fragment)
        .into_iter()
        .filter(|found| !found.has_group(1))
        .map(|found| found.span())
        .collect();
    fragment.remove(&comments);
    Ok(())
}

fn parse_namespace_body(
    strategy: &dyn ParseStrategy,
    namespace: &mut Namespace,
    body: &mut Fragment,
    text: &str,
) -> Result<(), ParseError> {
    // Anonymous namespaces hold translation-unit internals; leave them untouched.
    RemovingBodyMatcher::braces(ANONYMOUS_NAMESPACE)?.matches(body);

    for found in RemovingBodyMatcher::braces(NAMESPACE)?.matches(body) {
        let mut nested = Namespace::new(found.group(1).trim(), found.span(), found.group_span(2));
        let mut inner = found.group_fragment(2);
        parse_namespace_body(strategy, &mut nested, &mut inner, text)?;
        namespace.namespaces.push(nested);
    }

    strategy.parse_members(namespace, body)?;
    namespace.blank_outside_members = blank_outside_members(text, namespace);
    Ok(())
}

/// Whether the namespace body holds nothing but whitespace once its members
/// are cut out. Comments and preprocessor lines count as content.
fn blank_outside_members(text: &str, namespace: &Namespace) -> bool {
    let Some(body) = namespace.body else {
        return true;
    };
    let Some(content) = text.get(body.range()) else {
        return text.is_empty();
    };
    let members: Vec<Span> = namespace.member_spans().collect();
    Fragment::at(content, body.start())
        .splice(&members)
        .is_blank()
}

/// Whether a captured return type and name look like a declaration rather
/// than a statement or some other construct.
pub(crate) fn plausible_signature(return_type: &str, name: &str, forbidden: &[&str]) -> bool {
    let words = |text: &str| {
        text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|word| !word.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>()
    };
    let first_name_word = words(name).into_iter().next().unwrap_or_default();
    !words(return_type)
        .iter()
        .any(|word| forbidden.contains(&word.as_str()))
        && !STATEMENT_KEYWORDS.contains(&first_name_word.as_str())
}

pub(crate) fn has(found: &TextMatch, group: usize) -> bool {
    found.has_group(group) && !found.group(group).trim().is_empty()
}
