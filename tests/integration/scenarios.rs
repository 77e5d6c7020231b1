use codegen_cpp::cpp::{parse_header, ConfiguredNames, SerializationMode};
use codegen_cpp::merge::{HeaderMerger, MergeOptions, Merger, SourceMerger};
use codegen_cpp::{EditBatch, TextEdit};

fn sync_source(header: &str, source: &str) -> (Vec<TextEdit>, String) {
    let generated = parse_header(header).unwrap();
    let options = MergeOptions::new(SerializationMode::Source, "n.cpp");
    let edits = SourceMerger::new(&generated, options).merge(source).unwrap();
    let merged = EditBatch::new("n.cpp", source, edits.clone())
        .apply_to_str(source)
        .unwrap();
    (edits, merged)
}

#[test]
fn missing_definition_lands_at_end_of_namespace() {
    let header = "namespace N {\n\nvoid foo(int x);\nvoid keep();\n\n}\n";
    let source = "#include \"n.h\"\n\nnamespace N {\n\nvoid keep() {\n}\n\n}\n";

    let (edits, merged) = sync_source(header, source);

    assert_eq!(edits.len(), 1);
    let TextEdit::Insert { position, text, .. } = &edits[0] else {
        panic!("expected an insertion, got {:?}", edits[0]);
    };
    assert_eq!(*position, source.rfind('}').unwrap());
    assert!(text.contains("void foo(int x) {"));
    assert_eq!(
        merged,
        "#include \"n.h\"\n\nnamespace N {\n\nvoid keep() {\n}\n\n\nvoid foo(int x) {\n}\n}\n"
    );
}

#[test]
fn undeclared_definition_span_is_deleted() {
    let header = "namespace N {\nvoid foo();\n}\n";
    let source = "void N::foo() {\n}\n\nvoid N::bar() {\n    if (ready) {\n        run();\n    }\n}\n";

    let (edits, merged) = sync_source(header, source);

    assert_eq!(edits.len(), 1);
    let start = source.find("void N::bar").unwrap();
    assert_eq!(edits[0].byte_range(), start..source.len() - 1);
    assert_eq!(edits[0].label(), "Removed from file n.cpp");
    assert_eq!(merged, "void N::foo() {\n}\n\n\n");
}

#[test]
fn nested_definition_goes_inside_innermost_namespace() {
    let header = "namespace N {\nnamespace M {\nvoid baz();\n}\n}\n";
    let source = "namespace N {\nnamespace M {\n}\n}\n";

    let (edits, merged) = sync_source(header, source);

    assert_eq!(edits.len(), 1);
    let inner_close = source.find("}\n}").unwrap();
    assert_eq!(edits[0].position(), inner_close);
    assert_eq!(merged, "namespace N {\nnamespace M {\n\nvoid baz() {\n}\n}\n}\n");
}

#[test]
fn renamed_argument_is_not_a_difference() {
    let header = "class Shape {\npublic:\n    int scale(int factor, double ratio) const;\n};\n";
    let source = "int Shape::scale(int f, double r) const {\n    return 0;\n}\n";

    let (edits, _) = sync_source(header, source);
    assert!(edits.is_empty());
}

#[test]
fn changed_signature_replaces_definition() {
    let header = "class Shape {\npublic:\n    double area(int precision) const;\n};\n";
    let source = "double Shape::area() const {\n    return 0.0;\n}\n";

    let (edits, merged) = sync_source(header, source);

    assert_eq!(edits.len(), 2);
    assert!(!edits[0].is_insert());
    assert!(edits[1].is_insert());
    assert!(merged.contains("double Shape::area(int precision) const {"));
    assert!(!merged.contains("return 0.0;"));
}

#[test]
fn interface_header_follows_implementation_header() {
    let from = "class Shape {\npublic:\n    virtual double area() const;\n    virtual void draw();\n    void reset();\n};\n";
    let into = "class IShape {\npublic:\n    virtual ~IShape() = default;\n    virtual double area() const = 0;\n};\n";

    let generated = parse_header(from).unwrap();
    generated.provide_names(
        &ConfiguredNames::default(),
        &[SerializationMode::InterfaceHeader],
    );
    let options = MergeOptions::new(SerializationMode::InterfaceHeader, "ishape.h");
    let edits = HeaderMerger::new(&generated, options).merge(into).unwrap();
    let merged = EditBatch::new("ishape.h", into, edits)
        .apply_to_str(into)
        .unwrap();

    assert!(merged.contains("    virtual double area() const = 0;\n    virtual void draw() = 0;\n"));
}
