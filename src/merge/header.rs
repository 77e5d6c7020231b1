use super::{Anchor, EditCollector, MergeOptions, Merger};
use crate::cpp::{
    parse_header, Access, Class, Lines, Namespace, ParseError, SerializationMode,
    SerializeOptions,
};
use crate::diff::{Comparable, Difference};
use crate::edit::TextEdit;
use crate::text::Span;
use tracing::{debug, info};

/// Keeps the declarations of a header in line with a parsed header, level
/// by level: namespaces, classes, then each access bucket.
///
/// Names of `generated` must already be provided for the merge mode.
#[derive(Debug)]
pub struct HeaderMerger<'g> {
    generated: &'g Namespace,
    options: MergeOptions,
}

/// One merge run over one existing document.
struct Run<'t, 'o> {
    text: &'t str,
    serialize: SerializeOptions,
    collector: EditCollector<'o>,
}

impl<'g> HeaderMerger<'g> {
    pub fn new(generated: &'g Namespace, options: MergeOptions) -> Self {
        Self { generated, options }
    }
}

impl Merger for HeaderMerger<'_> {
    fn merge(&self, text: &str) -> Result<Vec<TextEdit>, ParseError> {
        let existing = parse_header(text)?;
        let mut run = Run {
            text,
            serialize: self.options.serialize_options(),
            collector: EditCollector::new(&self.options),
        };
        run.merge_namespace(&existing, self.generated);
        let edits = run.collector.finish();
        info!(edits = edits.len(), mode = %self.options.mode, "merged header declarations");
        Ok(edits)
    }
}

impl Run<'_, '_> {
    /// Insert what is added at `anchor`, delete what is removed and hand
    /// back the pairs present on both sides.
    fn apply_diff<'e, 'g, T>(
        &mut self,
        anchor: Option<Anchor<'_>>,
        existing: &'e [T],
        generated: &'g [T],
        span: impl Fn(&T) -> Span,
        render: impl Fn(&T, &SerializeOptions) -> Lines,
    ) -> Vec<(&'e T, &'g T)>
    where
        T: Comparable,
    {
        let diff = Difference::compare(existing, generated, self.serialize.mode);
        if let Some(anchor) = anchor {
            for added in &diff.added {
                let lines = render(added, &self.serialize);
                self.collector.insert(anchor, &lines);
            }
        }
        for removed in &diff.removed {
            self.collector.delete(span(removed));
        }
        diff.changed
    }

    fn merge_namespace(&mut self, existing: &Namespace, generated: &Namespace) {
        let anchor = Anchor::closing(self.text, existing);

        let classes = self.apply_diff(
            Some(anchor),
            &existing.classes,
            &generated.classes,
            |class| class.span,
            Class::serialize,
        );
        self.apply_diff(
            Some(anchor),
            &existing.functions,
            &generated.functions,
            |function| function.span,
            |function, options| function.serialize(options),
        );
        let namespaces = self.apply_diff(
            Some(anchor),
            &existing.namespaces,
            &generated.namespaces,
            |namespace| namespace.span,
            Namespace::serialize,
        );

        for (existing, generated) in namespaces {
            self.merge_namespace(existing, generated);
        }
        for (existing, generated) in classes {
            self.merge_class(existing, generated);
        }
    }

    fn merge_class(&mut self, existing: &Class, generated: &Class) {
        // An interface has only public members and its own defaulted destructor.
        if self.serialize.mode == SerializationMode::InterfaceHeader {
            self.merge_bucket(existing, generated, Access::Public);
            return;
        }

        let public_anchor = existing
            .public
            .anchor(existing.destructor_in(Access::Public))
            .map(|span| Anchor::after(self.text, span));
        if public_anchor.is_none() && existing.destructor.is_none() && generated.destructor.is_some() {
            debug!(class = %existing.name, "no public member to place the destructor after");
        }
        self.apply_diff(
            public_anchor,
            existing.destructor.as_slice(),
            generated.destructor.as_slice(),
            |dtor| dtor.span,
            |dtor, options| dtor.serialize(options),
        );

        for access in Access::ALL {
            self.merge_bucket(existing, generated, access);
        }
    }

    fn merge_bucket(&mut self, existing: &Class, generated: &Class, access: Access) {
        let scope = existing.scope(access);
        let Some(span) = scope.anchor(existing.destructor_in(access)) else {
            debug!(class = %existing.name, access = access.label(), "empty bucket, skipped");
            return;
        };
        let anchor = Anchor::after(self.text, span);
        let wanted = generated.scope(access);

        let classes = self.apply_diff(
            Some(anchor),
            &scope.classes,
            &wanted.classes,
            |class| class.span,
            Class::serialize,
        );
        self.apply_diff(
            Some(anchor),
            &scope.functions,
            &wanted.functions,
            |function| function.span,
            |function, options| function.serialize(options),
        );
        self.apply_diff(
            Some(anchor),
            &scope.constructors,
            &wanted.constructors,
            |ctor| ctor.span,
            |ctor, options| ctor.serialize(options),
        );

        for (existing, generated) in classes {
            self.merge_class(existing, generated);
        }
    }
}
