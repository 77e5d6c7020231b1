use crate::cpp::errors::ParseError;
use crate::cpp::function::Function;
use crate::cpp::namespace::Namespace;
use crate::cpp::parser::{has, plausible_signature, ParseStrategy, FUNCTION_NAME, RETURN_TYPE};
use crate::matcher::{RemovingBodyMatcher, TextMatch};
use crate::text::Fragment;

/// Local type definitions hide their member bodies from the definition scan.
const TYPE_DEFINITION: &str = r"\b(?:class|struct|union|enum)\b[^;{}()]*";
/// Argument list allowing two levels of nested parentheses.
const ARGS: &str = r"\(((?:[^()]|\((?:[^()]|\([^()]*\))*\))*)\)";

const FORBIDDEN: &[&str] = &[
    "operator", "return", "typedef", "using", "template", "else", "new", "delete", "throw",
    "case", "goto", "namespace",
];

/// Definitions only: every function body at namespace level becomes a
/// [`Function`] named as written, qualifiers included.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceParser;

impl ParseStrategy for SourceParser {
    fn parse_members(
        &self,
        namespace: &mut Namespace,
        body: &mut Fragment,
    ) -> Result<(), ParseError> {
        RemovingBodyMatcher::braces(TYPE_DEFINITION)?
            .with_post(";")?
            .matches(body);

        let mut functions = Vec::new();
        functions.extend(parse_constructors(body)?);
        functions.extend(parse_destructors(body)?);
        functions.extend(parse_cast_operators(body)?);
        functions.extend(parse_functions(body)?);
        functions.sort_by_key(|function| function.span.start());
        namespace.functions = functions;
        Ok(())
    }
}

fn names_itself(found: &TextMatch) -> bool {
    found.group(2) == found.group(3)
}

fn parse_constructors(body: &mut Fragment) -> Result<Vec<Function>, ParseError> {
    let header = format!(
        r"((?:\w+::)*(\w+)::(\w+))\s*{ARGS}\s*(?:noexcept\s*)?(?::(?:\w\{{[^{{}}]*\}}|[^{{}};])*)?"
    );
    Ok(RemovingBodyMatcher::braces(&header)?
        .accept_if(names_itself)
        .matches(body)
        .iter()
        .map(|found| {
            Function::standalone(found.group(1), "", found.group(4).trim(), false, found.span())
        })
        .collect())
}

fn parse_destructors(body: &mut Fragment) -> Result<Vec<Function>, ParseError> {
    Ok(RemovingBodyMatcher::braces(
        r"((?:\w+::)*(\w+)::~(\w+))\s*\(\s*(?:void\s*)?\)\s*(?:noexcept\s*)?",
    )?
    .accept_if(names_itself)
    .matches(body)
    .iter()
    .map(|found| Function::standalone(found.group(1), "", "", false, found.span()))
    .collect())
}

fn parse_cast_operators(body: &mut Fragment) -> Result<Vec<Function>, ParseError> {
    Ok(RemovingBodyMatcher::braces(
        r"((?:\w+::)*operator)\s+([A-Za-z_][\w:<>,\t *&]*?)\s*\(\s*\)\s*(const)?\s*(?:noexcept\s*)?",
    )?
    .matches(body)
    .iter()
    .map(|found| {
        let target = found.group(2).split_whitespace().collect::<Vec<_>>().join(" ");
        Function::standalone(
            format!("{} {target}", found.group(1)),
            "",
            "",
            has(found, 3),
            found.span(),
        )
    })
    .collect())
}

fn parse_functions(body: &mut Fragment) -> Result<Vec<Function>, ParseError> {
    let header = format!(r"{RETURN_TYPE}{FUNCTION_NAME}\s*{ARGS}\s*(const)?\s*(?:noexcept\s*)?");
    Ok(RemovingBodyMatcher::braces(&header)?
        .accept_if(|m| plausible_signature(m.group(1), m.group(2), FORBIDDEN))
        .matches(body)
        .iter()
        .map(|found| {
            Function::standalone(
                found.group(2),
                found.group(1).trim(),
                found.group(3).trim(),
                has(found, 4),
                found.span(),
            )
        })
        .collect())
}
