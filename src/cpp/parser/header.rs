use crate::cpp::class::{Access, Class, ClassKeyword};
use crate::cpp::errors::ParseError;
use crate::cpp::function::{Function, FunctionKind, Virtuality};
use crate::cpp::namespace::Namespace;
use crate::cpp::naming::ClassNames;
use crate::cpp::parser::{has, plausible_signature, ParseStrategy, FUNCTION_NAME, RETURN_TYPE};
use crate::cpp::signature::split_top_level;
use crate::cpp::special::{Constructor, Defaulted, Destructor};
use crate::matcher::{RegexMatcher, RemovingBodyMatcher, RemovingRegexMatcher, TextMatch};
use crate::text::{Block, Fragment, Span};
use std::rc::Rc;
use tracing::{debug, warn};

const CLASS: &str =
    r"\b(class|struct)\s+(?:[A-Z][A-Z0-9_]*\s+)?([A-Za-z_]\w*)\s*(?:final\s*)?(?::\s*([^{;]+?))?";
const ENUM_OR_UNION: &str = r"\b(?:enum|union)\b[^;{}()]*";
const PURE_VIRTUAL: &str = r"\bvirtual\b[^;]*?=\s*0\s*;";
const ACCESS_LABEL: &str = r"\b(public|protected|private)\s*:";
// Declarator of an inline definition, up to its body. The prefix never crosses
// a lone `:`, so a preceding access label stays in place.
const INLINE_DEFINITION: &str = r"[A-Za-z_~](?:[^;{}():]|::)*\([^;{}]*?\)[^;{}]*?";
const BRACED: &str = "";

const ALLOCATOR: &str = r"(?:\bstatic\s+)?\b(void\s*\*|void)\s*\boperator\s+(new|delete)\s*(\[\s*\])?";
const CAST_OPERATOR: &str = r"(?:\b(virtual)\s+)?(?:\bexplicit\s+)?\boperator\s+([A-Za-z_][\w:<>,\t *&]*?)\s*\(\s*\)\s*(const)?\s*(?:noexcept\s*)?(override)?\s*(?:final\s*)?(=\s*0)?\s*;";
const MEMBER_POST: &str = r"(const)?\s*(?:noexcept\s*)?(override)?\s*(?:final\s*)?(=\s*0)?\s*;";
const FRIEND_POST: &str = r"(const)?\s*;";
const SPECIAL_POST: &str = r"(?:noexcept\s*)?(?:=\s*(default|delete)\s*)?;";
const STANDALONE_POST: &str = r"(?:noexcept\s*)?;";

const MEMBER_FORBIDDEN: &[&str] = &[
    "static", "operator", "friend", "virtual", "typedef", "using", "return", "template",
    "explicit",
];
const FREE_FORBIDDEN: &[&str] = &[
    "operator", "friend", "virtual", "typedef", "using", "return", "template",
];

/// Declarations: classes with their scopes, and namespace-level functions.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderParser;

impl ParseStrategy for HeaderParser {
    fn parse_members(
        &self,
        namespace: &mut Namespace,
        body: &mut Fragment,
    ) -> Result<(), ParseError> {
        RemovingBodyMatcher::braces(ENUM_OR_UNION)?
            .with_post(";")?
            .matches(body);
        namespace.classes = parse_classes(body, None)?;
        remove_inline_definitions(body)?;
        namespace.functions = parse_standalone_functions(body)?;
        Ok(())
    }
}

/// Drops inline definitions whole, then any brace group left behind
/// (brace initializers and the like).
fn remove_inline_definitions(body: &mut Fragment) -> Result<(), ParseError> {
    RemovingBodyMatcher::braces(INLINE_DEFINITION)?.matches(body);
    RemovingBodyMatcher::braces(BRACED)?.matches(body);
    Ok(())
}

fn class_matcher() -> Result<RemovingBodyMatcher, ParseError> {
    Ok(RemovingBodyMatcher::braces(CLASS)?.with_post(";")?)
}

fn parse_classes(
    body: &mut Fragment,
    outer: Option<&Rc<ClassNames>>,
) -> Result<Vec<Class>, ParseError> {
    class_matcher()?
        .matches(body)
        .iter()
        .map(|found| parse_class(found, outer))
        .collect()
}

fn parse_class(found: &TextMatch, outer: Option<&Rc<ClassNames>>) -> Result<Class, ParseError> {
    let keyword = ClassKeyword::parse(found.group(1));
    let name = found.group(2);
    let bases = split_top_level(found.group(3), ',')
        .into_iter()
        .map(str::trim)
        .filter(|base| !base.is_empty())
        .map(str::to_string)
        .collect();
    let mut body = found.group_fragment(4);

    // Nested interfaces do not make the enclosing class one.
    let mut own = body.clone();
    class_matcher()?.matches(&mut own);
    RemovingBodyMatcher::braces(ENUM_OR_UNION)?
        .with_post(";")?
        .matches(&mut own);
    let is_interface = RegexMatcher::new(PURE_VIRTUAL)?.is_match(&own);

    let names = ClassNames::new(name, is_interface, outer);
    let mut class = Class::new(keyword, bases, found.span(), &names);

    RemovingBodyMatcher::braces(ENUM_OR_UNION)?
        .with_post(";")?
        .matches(&mut body);
    let nested = parse_classes(&mut body, Some(&names))?;
    remove_inline_definitions(&mut body)?;

    let labels = RegexMatcher::new(ACCESS_LABEL)?.find(&body);
    let default_access = keyword.default_access();
    for nested_class in nested {
        let access = access_at(&labels, nested_class.span.start(), default_access);
        class.scope_mut(access).classes.push(nested_class);
    }

    let mut destructors = Vec::new();
    for (access, mut section) in partition_scopes(&mut body, &labels, default_access)? {
        destructors.extend(parse_destructors(&mut section, &names, access)?);
        let scope = class.scope_mut(access);
        scope
            .constructors
            .extend(parse_constructors(&mut section, &names)?);
        scope
            .functions
            .extend(parse_member_functions(&mut section, &names)?);
        scope.functions.sort_by_key(|function| function.span.start());
    }

    if destructors.len() > 1 {
        return Err(ParseError::MultipleDestructors {
            class: name.to_string(),
            count: destructors.len(),
        });
    }
    class.destructor = destructors.pop();

    debug!(
        class = name,
        interface = is_interface,
        nested = class.scopes().iter().map(|s| s.classes.len()).sum::<usize>(),
        "parsed class"
    );
    Ok(class)
}

fn label_access(label: &TextMatch) -> Option<Access> {
    Access::parse(label.group(1))
}

/// Access in effect at absolute offset `position`.
fn access_at(labels: &[TextMatch], position: usize, default: Access) -> Access {
    labels
        .iter()
        .take_while(|label| label.span().start() < position)
        .filter_map(label_access)
        .last()
        .unwrap_or(default)
}

/// Split a class body into one fragment per access level. The text before
/// the first label gets the default access of the class keyword.
fn partition_scopes(
    body: &mut Fragment,
    labels: &[TextMatch],
    default_access: Access,
) -> Result<Vec<(Access, Fragment)>, ParseError> {
    let mut scopes: Vec<(Access, Fragment)> = Access::ALL
        .into_iter()
        .map(|access| (access, Fragment::default()))
        .collect();
    let Some(end) = body.end() else {
        return Ok(scopes);
    };

    let mut sections = Vec::new();
    for (i, label) in labels.iter().enumerate() {
        let from = label.span().end() + 1;
        let to = labels
            .get(i + 1)
            .map_or(end, |next| next.span().start().saturating_sub(1));
        if let (Some(access), true) = (label_access(label), from <= to) {
            sections.push((access, Span::new(from, to)?));
        }
    }

    for (access, span) in &sections {
        if let Some((_, fragment)) = scopes.iter_mut().find(|(a, _)| a == access) {
            fragment.extend(body.slice(&[*span]));
        }
    }
    let section_spans: Vec<Span> = sections.iter().map(|(_, span)| *span).collect();
    body.remove(&section_spans);

    let outside = RemovingRegexMatcher::new(ACCESS_LABEL)?
        .matches_inverse(body)
        .iter()
        .map(|piece| Block::new(piece.text(), piece.span().start()))
        .collect::<Result<Vec<_>, _>>()?;
    if let Some((_, fragment)) = scopes.iter_mut().find(|(a, _)| *a == default_access) {
        fragment.extend(Fragment::from_blocks(outside));
    }
    Ok(scopes)
}

fn parse_destructors(
    section: &mut Fragment,
    names: &Rc<ClassNames>,
    access: Access,
) -> Result<Vec<Destructor>, ParseError> {
    let pattern = format!(
        r"(?:\b(virtual)\s+)?~\s*{}\s*\(\s*(?:void\s*)?\)\s*(?:noexcept\s*)?(override)?\s*(?:final\s*)?(?:=\s*(default|delete)\s*)?;",
        regex::escape(names.original())
    );
    Ok(RemovingRegexMatcher::new(&pattern)?
        .matches(section)
        .iter()
        .map(|found| {
            Destructor::new(
                has(found, 1) || has(found, 2),
                Defaulted::parse(found.group(3)),
                access,
                found.span(),
                names,
            )
        })
        .collect())
}

fn parse_constructors(
    section: &mut Fragment,
    names: &Rc<ClassNames>,
) -> Result<Vec<Constructor>, ParseError> {
    let header = format!(
        r"(?:\b(explicit)\s+)?\b{}",
        regex::escape(names.original())
    );
    Ok(RemovingBodyMatcher::parens(&header)?
        .with_post(SPECIAL_POST)?
        .matches(section)
        .iter()
        .map(|found| {
            Constructor::new(
                found.group(2).trim(),
                has(found, 1),
                Defaulted::parse(found.group(3)),
                found.span(),
                names,
            )
        })
        .collect())
}

fn virtuality(is_virtual: bool, is_override: bool, is_pure: bool) -> Virtuality {
    match (is_virtual, is_override, is_pure) {
        (_, _, true) => Virtuality::Pure,
        (_, true, _) => Virtuality::Override,
        (true, _, _) => Virtuality::Virtual,
        _ => Virtuality::None,
    }
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn parse_member_functions(
    section: &mut Fragment,
    names: &Rc<ClassNames>,
) -> Result<Vec<Function>, ParseError> {
    let mut functions = Vec::new();

    for found in RemovingBodyMatcher::parens(ALLOCATOR)?
        .with_post(";")?
        .matches(section)
    {
        let mut name = format!("operator {}", found.group(2));
        if has(&found, 3) {
            name.push_str("[]");
        }
        functions.push(Function::member(
            FunctionKind::Allocator,
            name,
            collapse(found.group(1)),
            found.group(4).trim(),
            false,
            found.span(),
            names,
        ));
    }

    for found in RemovingRegexMatcher::new(CAST_OPERATOR)?.matches(section) {
        let name = format!("operator {}", collapse(found.group(2)));
        let is_pure = has(&found, 5);
        if is_pure && !has(&found, 1) {
            warn!(function = %name, "ignoring pure declaration that is not virtual");
            continue;
        }
        functions.push(Function::member(
            FunctionKind::CastOperator {
                virtuality: virtuality(has(&found, 1), has(&found, 4), is_pure),
            },
            name,
            "",
            "",
            has(&found, 3),
            found.span(),
            names,
        ));
    }

    for found in RemovingBodyMatcher::parens(&format!(r"\bfriend\s+{RETURN_TYPE}{FUNCTION_NAME}"))?
        .with_post(FRIEND_POST)?
        .accept_if(|m| plausible_signature(m.group(1), m.group(2), FREE_FORBIDDEN))
        .matches(section)
    {
        functions.push(Function::member(
            FunctionKind::Friend,
            found.group(2),
            found.group(1).trim(),
            found.group(3).trim(),
            has(&found, 4),
            found.span(),
            names,
        ));
    }

    for found in RemovingBodyMatcher::parens(&format!(
        r"(?:\b(virtual|static)\s+)?{RETURN_TYPE}{FUNCTION_NAME}"
    ))?
    .with_post(MEMBER_POST)?
    .accept_if(|m| plausible_signature(m.group(2), m.group(3), MEMBER_FORBIDDEN))
    .matches(section)
    {
        let specifier = found.group(1);
        let is_virtual = specifier == "virtual";
        let is_pure = has(&found, 7);
        if is_pure && !is_virtual {
            warn!(
                function = found.group(3),
                "ignoring pure declaration that is not virtual"
            );
            continue;
        }
        let kind = if specifier == "static" {
            FunctionKind::Static
        } else {
            FunctionKind::Member {
                virtuality: virtuality(is_virtual, has(&found, 6), is_pure),
            }
        };
        functions.push(Function::member(
            kind,
            found.group(3),
            found.group(2).trim(),
            found.group(4).trim(),
            has(&found, 5),
            found.span(),
            names,
        ));
    }

    Ok(functions)
}

fn parse_standalone_functions(body: &mut Fragment) -> Result<Vec<Function>, ParseError> {
    Ok(
        RemovingBodyMatcher::parens(&format!("{RETURN_TYPE}{FUNCTION_NAME}"))?
            .with_post(STANDALONE_POST)?
            .accept_if(|m| plausible_signature(m.group(1), m.group(2), FREE_FORBIDDEN))
            .matches(body)
            .iter()
            .map(|found| {
                Function::standalone(
                    found.group(2),
                    found.group(1).trim(),
                    found.group(3).trim(),
                    false,
                    found.span(),
                )
            })
            .collect(),
    )
}
