use codegen_cpp::cpp::{parse_header, ConfiguredNames, SerializationMode};
use codegen_cpp::merge::{HeaderMerger, MergeOptions, Merger};
use codegen_cpp::EditBatch;
use proptest::prelude::*;

const MEMBERS: [&str; 5] = [
    "Widget();",
    "double area() const;",
    "void draw();",
    "int count(int limit);",
    "void reset() const;",
];
const FREE_FUNCTIONS: [&str; 3] = [
    "int total();",
    "void clear(bool force);",
    "double scale(double factor);",
];

/// Which parts of the pools one header declares.
#[derive(Debug, Clone)]
struct Shape {
    members: Vec<bool>,
    functions: Vec<bool>,
    gadget: bool,
    detail: bool,
}

fn shape() -> impl Strategy<Value = Shape> {
    (
        prop::collection::vec(any::<bool>(), MEMBERS.len()),
        prop::collection::vec(any::<bool>(), FREE_FUNCTIONS.len()),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(members, functions, gadget, detail)| Shape {
            members,
            functions,
            gadget,
            detail,
        })
}

fn chosen<'a>(pool: &'a [&'a str], on: &'a [bool]) -> impl Iterator<Item = &'a str> + 'a {
    pool.iter().zip(on).filter(|(_, on)| **on).map(|(item, _)| *item)
}

fn header(shape: &Shape) -> String {
    let mut text = String::from("#pragma once\n\nnamespace N {\n\nclass Widget {\npublic:\n");
    for member in chosen(&MEMBERS, &shape.members) {
        text.push_str(&format!("    {member}\n"));
    }
    text.push_str("private:\n    int cached_;\n};\n\n");
    if shape.gadget {
        text.push_str("struct Gadget {\n    void run();\n    struct Part {\n        int id() const;\n    };\n};\n\n");
    }
    for function in chosen(&FREE_FUNCTIONS, &shape.functions) {
        text.push_str(function);
        text.push('\n');
    }
    if shape.detail {
        text.push_str("\nnamespace detail {\nvoid helper(int depth);\n}\n");
    }
    text.push_str("\n}\n");
    text
}

fn balance(text: &str) -> i64 {
    text.chars().fold(0, |depth, c| match c {
        '{' => depth + 1,
        '}' => depth - 1,
        _ => depth,
    })
}

fn sync_header(from: &str, into: &str) -> (usize, String) {
    let mode = SerializationMode::Header;
    let generated = parse_header(from).unwrap();
    generated.provide_names(&ConfiguredNames::default(), &[mode]);
    let edits = HeaderMerger::new(&generated, MergeOptions::new(mode, "n.h"))
        .merge(into)
        .unwrap();
    let count = edits.len();
    let merged = EditBatch::new("n.h", into, edits)
        .apply_to_str(into)
        .unwrap();
    (count, merged)
}

proptest! {
    #[test]
    fn merged_header_keeps_braces_balanced(wanted in shape(), present in shape()) {
        let existing = header(&present);
        prop_assert_eq!(balance(&existing), 0);

        let (_, merged) = sync_header(&header(&wanted), &existing);
        prop_assert_eq!(balance(&merged), 0);
        prop_assert_eq!(merged.contains("struct Gadget"), wanted.gadget);
        prop_assert_eq!(merged.contains("namespace detail"), wanted.detail);
    }

    #[test]
    fn second_header_sync_has_nothing_to_do(wanted in shape(), present in shape()) {
        let generated = header(&wanted);

        let (_, merged) = sync_header(&generated, &header(&present));
        let (edits, again) = sync_header(&generated, &merged);
        prop_assert_eq!(edits, 0);
        prop_assert_eq!(again, merged);
    }
}
