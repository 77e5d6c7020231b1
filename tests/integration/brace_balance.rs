use codegen_cpp::cpp::{parse_header, NamespaceStyle, SerializationMode};
use codegen_cpp::merge::{MergeOptions, Merger, SourceMerger};
use codegen_cpp::EditBatch;
use proptest::prelude::*;

const NAMES: [&str; 5] = ["alpha", "beta", "gamma", "delta", "epsilon"];

/// Even-length names return `int`.
fn returns_int(name: &str) -> bool {
    name.len() % 2 == 0
}

fn declaration(name: &str) -> String {
    if returns_int(name) {
        format!("int {name}(int value);")
    } else {
        format!("void {name}();")
    }
}

fn definition(name: &str, qualified: bool) -> String {
    let returns_int = returns_int(name);
    let name = if qualified {
        format!("N::{name}")
    } else {
        name.to_string()
    };
    if returns_int {
        format!("int {name}(int other) {{\n    if (other) {{\n        return other;\n    }}\n    return 0;\n}}\n")
    } else {
        format!("void {name}() {{\n    run({{1, 2}});\n}}\n")
    }
}

fn header(declared: &[bool]) -> String {
    let mut text = String::from("namespace N {\n\n");
    for (name, _) in NAMES.iter().zip(declared).filter(|(_, on)| **on) {
        text.push_str(&declaration(name));
        text.push('\n');
    }
    text.push_str("\n}\n");
    text
}

/// Defined names go inside `namespace N` or, when `qualified`, to the root
/// as `N::name`.
fn source(defined: &[bool], qualified: bool, with_namespace: bool) -> String {
    let mut body = String::new();
    for (name, _) in NAMES.iter().zip(defined).filter(|(_, on)| **on) {
        body.push('\n');
        body.push_str(&definition(name, qualified));
    }
    let mut text = String::from("#include \"n.h\"\n");
    if qualified {
        text.push_str(&body);
    }
    if with_namespace {
        text.push_str("\nnamespace N {\n");
        if !qualified {
            text.push_str(&body);
        }
        text.push_str("\n}\n");
    }
    text
}

fn balance(text: &str) -> i64 {
    text.chars().fold(0, |depth, c| match c {
        '{' => depth + 1,
        '}' => depth - 1,
        _ => depth,
    })
}

fn sync(header: &str, source: &str, style: NamespaceStyle) -> (usize, String) {
    let generated = parse_header(header).unwrap();
    let options =
        MergeOptions::new(SerializationMode::Source, "n.cpp").with_namespace_style(style);
    let edits = SourceMerger::new(&generated, options).merge(source).unwrap();
    let count = edits.len();
    let merged = EditBatch::new("n.cpp", source, edits)
        .apply_to_str(source)
        .unwrap();
    (count, merged)
}

fn style() -> impl Strategy<Value = NamespaceStyle> {
    prop_oneof![Just(NamespaceStyle::Qualified), Just(NamespaceStyle::Blocks)]
}

proptest! {
    #[test]
    fn merged_source_keeps_braces_balanced(
        declared in prop::collection::vec(any::<bool>(), NAMES.len()),
        defined in prop::collection::vec(any::<bool>(), NAMES.len()),
        qualified in any::<bool>(),
        with_namespace in any::<bool>(),
        style in style(),
    ) {
        let with_namespace = with_namespace || !qualified;
        let header = header(&declared);
        let source = source(&defined, qualified, with_namespace);
        prop_assert_eq!(balance(&source), 0);

        let (_, merged) = sync(&header, &source, style);
        prop_assert_eq!(balance(&merged), 0);
    }

    #[test]
    fn second_sync_has_nothing_to_do(
        declared in prop::collection::vec(any::<bool>(), NAMES.len()),
        defined in prop::collection::vec(any::<bool>(), NAMES.len()),
        style in style(),
    ) {
        let header = header(&declared);
        let source = source(&defined, false, true);

        let (_, merged) = sync(&header, &source, style);
        let (edits, again) = sync(&header, &merged, style);
        prop_assert_eq!(edits, 0);
        prop_assert_eq!(again, merged);
    }
}
