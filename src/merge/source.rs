use super::definition::{declared_definitions, parsed_definitions, Definition};
use super::{Anchor, EditCollector, MergeOptions, Merger};
use crate::cpp::namespace::wrap_in_namespace;
use crate::cpp::{parse_source, Lines, Namespace, NamespaceStyle, ParseError};
use crate::diff::{Comparable, Difference};
use crate::edit::TextEdit;
use crate::text::Span;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};

/// Keeps the definitions of a source file in line with a parsed header.
///
/// Names of `generated` must already be provided for the merge mode.
#[derive(Debug)]
pub struct SourceMerger<'g> {
    generated: &'g Namespace,
    options: MergeOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionKind {
    Namespace,
    Definition,
}

/// Something the header declares that could be typed at a cursor in the
/// source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Completion {
    pub kind: CompletionKind,
    /// Short text to pick the entry by.
    pub label: String,
    /// Source form, ready to insert at the cursor.
    pub insert_text: String,
}

impl Completion {
    fn new(kind: CompletionKind, label: String, lines: &Lines, indent: &str) -> Option<Self> {
        if lines.is_empty() {
            return None;
        }
        Some(Self {
            kind,
            label,
            insert_text: lines.render(indent).trim_end().to_string(),
        })
    }
}

/// Added definitions sharing an insertion point and missing namespaces.
struct Insertion<'e, 'g> {
    target: &'e Namespace,
    missing: Vec<String>,
    definitions: Vec<&'g Definition<'g>>,
}

impl<'g> SourceMerger<'g> {
    pub fn new(generated: &'g Namespace, options: MergeOptions) -> Self {
        Self { generated, options }
    }

    /// What the header adds right inside the namespace of `text` that holds
    /// byte `offset`: namespaces missing at that level, then definitions whose
    /// namespace is that one. Nested namespaces only count while both sides
    /// have them.
    pub fn completions_at(
        &self,
        text: &str,
        offset: usize,
    ) -> Result<Vec<Completion>, ParseError> {
        if offset > text.len() {
            return Ok(Vec::new());
        }
        let existing = parse_source(text)?;
        let mode = self.options.mode;
        let options = self.options.serialize_options();
        let indent = self.options.indent.as_str();

        let mut existing_level = &existing;
        let mut generated_level = self.generated;
        let mut path = Vec::new();
        while let Some((inner, wanted)) = existing_level
            .namespaces
            .iter()
            .filter(|nested| nested.span.start() <= offset && offset <= nested.span.end())
            .find_map(|nested| {
                generated_level
                    .namespaces
                    .iter()
                    .find(|wanted| wanted.equals(nested, mode))
                    .map(|wanted| (nested, wanted))
            })
        {
            path.extend(inner.segments());
            existing_level = inner;
            generated_level = wanted;
        }

        let mut completions = Vec::new();
        let namespaces =
            Difference::compare(&existing_level.namespaces, &generated_level.namespaces, mode);
        completions.extend(namespaces.added.iter().filter_map(|namespace| {
            Completion::new(
                CompletionKind::Namespace,
                format!("namespace {}", namespace.name),
                &Namespace::serialize(namespace, &options),
                indent,
            )
        }));

        let existing_definitions = parsed_definitions(&existing);
        let generated_definitions = declared_definitions(self.generated, mode);
        let definitions = Difference::compare(&existing_definitions, &generated_definitions, mode);
        completions.extend(
            definitions
                .added
                .iter()
                .filter(|definition| definition.namespaces == path)
                .filter_map(|definition| {
                    let lines = definition.serialize(&options);
                    let rendered = lines.render(indent);
                    let label = rendered
                        .lines()
                        .next()
                        .unwrap_or_default()
                        .trim_end_matches('{')
                        .trim()
                        .to_string();
                    Completion::new(CompletionKind::Definition, label, &lines, indent)
                }),
        );
        debug!(offset, namespace = %path.join("::"), entries = completions.len(), "completions");
        Ok(completions)
    }

    /// Group added definitions by the deepest existing namespace on their
    /// namespace path.
    fn plan_insertions<'e>(
        &self,
        existing: &'e Namespace,
        added: &[&'g Definition<'g>],
    ) -> Vec<Insertion<'e, 'g>> {
        let mut insertions: Vec<Insertion<'e, 'g>> = Vec::new();
        for definition in added {
            let (target, missing) = deepest_namespace(existing, &definition.namespaces);
            let grouped = self.options.namespace_style == NamespaceStyle::Blocks;
            let slot = insertions.iter_mut().find(|insertion| {
                grouped
                    && std::ptr::eq(insertion.target, target)
                    && insertion.missing == missing
            });
            match slot {
                Some(insertion) => insertion.definitions.push(definition),
                None => insertions.push(Insertion {
                    target,
                    missing,
                    definitions: vec![definition],
                }),
            }
        }
        insertions
    }

    fn render(&self, insertion: &Insertion<'_, '_>) -> Lines {
        let options = self.options.serialize_options();
        match self.options.namespace_style {
            NamespaceStyle::Qualified => {
                let nested = options.nested(insertion.missing.iter().cloned());
                let mut lines = Lines::new();
                lines.append_separated(
                    insertion
                        .definitions
                        .iter()
                        .map(|definition| definition.serialize(&nested)),
                    0,
                );
                lines
            }
            NamespaceStyle::Blocks => {
                let mut lines = Lines::new();
                lines.append_separated(
                    insertion
                        .definitions
                        .iter()
                        .map(|definition| definition.serialize(&options)),
                    0,
                );
                insertion
                    .missing
                    .iter()
                    .rev()
                    .fold(lines, |members, name| wrap_in_namespace(name, members))
            }
        }
    }
}

impl Merger for SourceMerger<'_> {
    fn merge(&self, text: &str) -> Result<Vec<TextEdit>, ParseError> {
        let existing = parse_source(text)?;
        let mode = self.options.mode;
        let existing_definitions = parsed_definitions(&existing);
        let selection = self.options.serialize_options();
        let mut generated_definitions = declared_definitions(self.generated, mode);
        generated_definitions.retain(|definition| selection.admits(definition.span));
        let diff = Difference::compare(&existing_definitions, &generated_definitions, mode);

        let mut collector = EditCollector::new(&self.options);
        let insertions = self.plan_insertions(&existing, &diff.added);

        if self.options.removes_unmatched() {
            let removed: HashSet<Span> = diff.removed.iter().map(|definition| definition.span).collect();
            let targets: Vec<&Namespace> = insertions.iter().map(|insertion| insertion.target).collect();
            let mut deletions = Vec::new();
            collect_deletions(&existing, &removed, &targets, &mut deletions);
            for span in deletions {
                collector.delete(span);
            }
        }

        for insertion in &insertions {
            let lines = self.render(insertion);
            collector.insert(Anchor::closing(text, insertion.target), &lines);
        }

        info!(
            added = diff.added.len(),
            removed = diff.removed.len(),
            unchanged = diff.changed.len(),
            mode = %mode,
            "merged source definitions"
        );
        Ok(collector.finish())
    }
}

/// Deepest namespace of `root` along `path`, plus the segments of `path`
/// it does not cover.
fn deepest_namespace<'e>(root: &'e Namespace, path: &[String]) -> (&'e Namespace, Vec<String>) {
    let mut current = root;
    let mut rest = path;
    'descend: loop {
        for nested in &current.namespaces {
            let segments = nested.segments();
            if !segments.is_empty() && rest.starts_with(&segments) {
                current = nested;
                rest = &rest[segments.len()..];
                continue 'descend;
            }
        }
        break;
    }
    (current, rest.to_vec())
}

/// Spans to delete under `namespace`. Returns true when the namespace
/// itself should go: every member is removed, at least one was, nothing but
/// whitespace remains and nothing is inserted into it.
fn collect_deletions(
    namespace: &Namespace,
    removed: &HashSet<Span>,
    targets: &[&Namespace],
    deletions: &mut Vec<Span>,
) -> bool {
    let mut inner = Vec::new();
    let mut emptied = namespace.classes.is_empty();
    for function in &namespace.functions {
        if removed.contains(&function.span) {
            inner.push(function.span);
        } else {
            emptied = false;
        }
    }
    for nested in &namespace.namespaces {
        if collect_deletions(nested, removed, targets, &mut inner) {
            inner.push(nested.span);
        } else {
            emptied = false;
        }
    }

    let drop_whole = !namespace.is_root()
        && emptied
        && !inner.is_empty()
        && namespace.blank_outside_members
        && !targets.iter().any(|target| std::ptr::eq(*target, namespace));
    if drop_whole {
        debug!(namespace = %namespace.name, "namespace emptied by removals");
        return true;
    }
    deletions.extend(inner);
    false
}
