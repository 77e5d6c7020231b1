//! Normalization of declarator text so that a declaration and its
//! definition compare equal.

/// Keywords that name a type on their own; never mistaken for a parameter name.
const TYPE_KEYWORDS: &[&str] = &[
    "auto", "bool", "char", "char16_t", "char32_t", "char8_t", "const", "double", "float", "int",
    "long", "short", "signed", "unsigned", "void", "volatile", "wchar_t",
];

/// Words that do not make a type by themselves.
const QUALIFIERS: &[&str] = &[
    "const", "volatile", "struct", "class", "enum", "typename", "register",
];

/// Specifiers that only appear on one side of a declaration/definition pair.
const DECLARATION_SPECIFIERS: &[&str] = &[
    "inline", "static", "virtual", "extern", "explicit", "friend", "constexpr",
];

/// Split on `separator` outside of brackets.
pub fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' | '<' | '[' | '{' => depth += 1,
            ')' | '>' | ']' | '}' => depth = depth.saturating_sub(1),
            c if c == separator && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Split a `::` qualified name into its scopes and final name, keeping
/// `operator` names such as `operator==` or `operator int` whole.
pub fn split_qualified(name: &str) -> (Vec<String>, String) {
    let (qualifier, last) = match operator_position(name) {
        Some(at) => (
            name[..at].trim_end().trim_end_matches("::"),
            normalize_operator(&name[at..]),
        ),
        None => match rsplit_scope(name) {
            Some((qualifier, last)) => (qualifier, last.trim().to_string()),
            None => ("", name.trim().to_string()),
        },
    };

    let scopes = split_scopes(qualifier)
        .into_iter()
        .map(|scope| scope.trim().to_string())
        .filter(|scope| !scope.is_empty())
        .collect();
    (scopes, last)
}

/// Join scopes and a name with `::`.
pub fn join_scopes(scopes: &[String], name: &str) -> String {
    scopes
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(name))
        .collect::<Vec<_>>()
        .join("::")
}

fn operator_position(name: &str) -> Option<usize> {
    name.match_indices("operator").map(|(i, _)| i).find(|&i| {
        let before_ok = name[..i]
            .chars()
            .next_back()
            .map_or(true, |c| !(c.is_alphanumeric() || c == '_'));
        let after_ok = name[i + "operator".len()..]
            .chars()
            .next()
            .map_or(true, |c| !(c.is_alphanumeric() || c == '_'));
        before_ok && after_ok
    })
}

fn normalize_operator(name: &str) -> String {
    let rest = name["operator".len()..].trim();
    if rest.starts_with(|c: char| c.is_alphanumeric() || c == '_') {
        format!("operator {}", normalize_type(rest))
    } else {
        format!("operator{}", rest.split_whitespace().collect::<String>())
    }
}

fn split_scopes(text: &str) -> Vec<&str> {
    let mut scopes = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' => depth += 1,
            b'>' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                scopes.push(&text[start..i]);
                start = i + 2;
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }
    scopes.push(&text[start..]);
    scopes
}

fn rsplit_scope(name: &str) -> Option<(&str, &str)> {
    let scopes = split_scopes(name);
    let last = scopes.last()?;
    if scopes.len() < 2 {
        return None;
    }
    let qualifier_end = name.len() - last.len() - 2;
    Some((&name[..qualifier_end], last))
}

/// Remove default arguments, keeping the text untouched when there are none.
pub fn strip_default_arguments(args: &str) -> String {
    let parts = split_top_level(args, ',');
    if parts.iter().all(|part| default_position(part).is_none()) {
        return args.trim().to_string();
    }
    parts
        .iter()
        .map(|part| match default_position(part) {
            Some(at) => part[..at].trim(),
            None => part.trim(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn default_position(arg: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in arg.char_indices() {
        match c {
            '(' | '<' | '[' | '{' => depth += 1,
            ')' | '>' | ']' | '}' => depth = depth.saturating_sub(1),
            '=' if depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

fn tokens(text: &str) -> Vec<String> {
    text.replace('*', " * ")
        .replace('&', " & ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Collapse whitespace and detach `*` and `&`: `const Foo&` and
/// `const Foo &` both become `const Foo &`.
pub fn normalize_type(text: &str) -> String {
    tokens(text).join(" ")
}

/// [`normalize_type`] without specifiers that differ between a declaration
/// and its definition, such as `static` or `inline`.
pub fn normalize_return_type(text: &str) -> String {
    tokens(text)
        .into_iter()
        .filter(|token| !DECLARATION_SPECIFIERS.contains(&token.as_str()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Tokens of one argument with a trailing parameter name dropped, when the
/// last token can only be a name.
fn unnamed(tokens: &[String]) -> Option<&[String]> {
    let (last, rest) = tokens.split_last()?;
    let rest_is_type = rest
        .iter()
        .any(|token| !QUALIFIERS.contains(&token.as_str()) && token != "*" && token != "&");
    (rest_is_type && is_identifier(last) && !TYPE_KEYWORDS.contains(&last.as_str()))
        .then_some(rest)
}

fn argument_tokens(args: &str) -> Vec<Vec<String>> {
    let stripped = strip_default_arguments(args);
    let stripped = stripped.trim();
    if stripped.is_empty() || stripped == "void" {
        return Vec::new();
    }
    split_top_level(stripped, ',')
        .into_iter()
        .map(|arg| tokens(arg.trim()))
        .collect()
}

fn same_argument(a: &[String], b: &[String]) -> bool {
    if a == b {
        return true;
    }
    let (bare_a, bare_b) = (unnamed(a), unnamed(b));
    bare_a.is_some_and(|bare| bare == b)
        || bare_b.is_some_and(|bare| bare == a)
        || matches!((bare_a, bare_b), (Some(x), Some(y)) if x == y)
}

/// Whether two argument lists declare the same parameter types. Parameter
/// names and default values are ignored and `(void)` equals `()`.
pub fn arguments_equal(a: &str, b: &str) -> bool {
    let (a, b) = (argument_tokens(a), argument_tokens(b));
    a.len() == b.len() && a.iter().zip(&b).all(|(x, y)| same_argument(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_top_level_respects_brackets() {
        assert_eq!(
            split_top_level("std::map<int, int> m, int x", ','),
            vec!["std::map<int, int> m", " int x"]
        );
        assert_eq!(split_top_level("", ','), vec![""]);
    }

    #[test]
    fn test_strip_default_arguments() {
        assert_eq!(
            strip_default_arguments("int a = 1, const std::string& s = \"x\""),
            "int a, const std::string& s"
        );
        assert_eq!(strip_default_arguments(" int  a "), "int  a");
        assert_eq!(
            strip_default_arguments("std::function<void(int)> f = {}"),
            "std::function<void(int)> f"
        );
    }

    #[test]
    fn test_arguments_ignore_names_and_defaults() {
        assert!(arguments_equal("int x", "int"));
        assert!(arguments_equal("int x", "int y"));
        assert!(arguments_equal("const Foo& foo", "const Foo &"));
        assert!(arguments_equal("int a = 3", "int b"));
        assert!(arguments_equal("void", ""));
        assert!(arguments_equal("unsigned long n", "unsigned long"));
    }

    #[test]
    fn test_arguments_keep_types_apart() {
        assert!(!arguments_equal("int", "long"));
        assert!(!arguments_equal("const Foo", "const Bar"));
        assert!(!arguments_equal("Foo", "Bar"));
        assert!(!arguments_equal("int", "int, int"));
        assert!(!arguments_equal("int*", "int&"));
    }

    #[test]
    fn test_split_qualified_names() {
        assert_eq!(
            split_qualified("N::A::bar"),
            (vec!["N".to_string(), "A".to_string()], "bar".to_string())
        );
        assert_eq!(split_qualified("foo"), (vec![], "foo".to_string()));
        assert_eq!(
            split_qualified("A::operator =="),
            (vec!["A".to_string()], "operator==".to_string())
        );
        assert_eq!(
            split_qualified("A::operator  const char*"),
            (vec!["A".to_string()], "operator const char *".to_string())
        );
        assert_eq!(
            split_qualified("Map<K, std::string>::get"),
            (vec!["Map<K, std::string>".to_string()], "get".to_string())
        );
        assert_eq!(
            split_qualified("A::~A"),
            (vec!["A".to_string()], "~A".to_string())
        );
    }

    #[test]
    fn test_return_types_ignore_specifiers() {
        assert_eq!(normalize_return_type("static  int*"), "int *");
        assert_eq!(normalize_return_type("inline const Foo &"), "const Foo &");
        assert_eq!(normalize_type("std::vector<int>"), "std::vector<int>");
    }
}
