//! Sibling-list comparison of parsed nodes.
//!
//! Two lists of the same node type are compared element by element with
//! [`Comparable::equals`]. Nothing here looks below one level of the tree:
//! callers recurse into the `changed` pairs themselves.

use crate::cpp::SerializationMode;

/// Equality of parsed nodes as far as synchronization cares.
pub trait Comparable {
    /// Whether `self` and `other` denote the same declaration once rendered
    /// in `mode`. Formatting, default arguments and parameter names do not
    /// count.
    fn equals(&self, other: &Self, mode: SerializationMode) -> bool;
}

/// Outcome of comparing an existing list against a generated one.
#[must_use]
#[derive(Debug)]
pub struct Difference<'e, 'g, T> {
    /// Generated elements with no counterpart in the existing list.
    pub added: Vec<&'g T>,
    /// Existing elements with no counterpart in the generated list.
    pub removed: Vec<&'e T>,
    /// Existing elements paired with the first generated element they equal.
    pub changed: Vec<(&'e T, &'g T)>,
}

impl<'e, 'g, T: Comparable> Difference<'e, 'g, T> {
    pub fn compare(existing: &'e [T], generated: &'g [T], mode: SerializationMode) -> Self {
        let mut removed = Vec::new();
        let mut changed = Vec::new();
        for old in existing {
            match generated.iter().find(|new| old.equals(new, mode)) {
                Some(new) => changed.push((old, new)),
                None => removed.push(old),
            }
        }
        let added = generated
            .iter()
            .filter(|new| !existing.iter().any(|old| old.equals(new, mode)))
            .collect();
        Self {
            added,
            removed,
            changed,
        }
    }

    /// No element added or removed.
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpp::Function;
    use crate::text::Span;

    #[derive(Debug, PartialEq)]
    struct Named(&'static str);

    impl Comparable for Named {
        fn equals(&self, other: &Self, _mode: SerializationMode) -> bool {
            self.0 == other.0
        }
    }

    #[test]
    fn test_added_removed_changed() {
        let existing = [Named("a"), Named("b")];
        let generated = [Named("a"), Named("c")];
        let diff = Difference::compare(&existing, &generated, SerializationMode::Header);

        assert_eq!(diff.added, vec![&Named("c")]);
        assert_eq!(diff.removed, vec![&Named("b")]);
        assert_eq!(diff.changed, vec![(&Named("a"), &Named("a"))]);
        assert!(!diff.is_unchanged());
    }

    #[test]
    fn test_first_generated_match_wins() {
        let existing = [Named("a")];
        let generated = [Named("a"), Named("a")];
        let diff = Difference::compare(&existing, &generated, SerializationMode::Header);

        assert!(std::ptr::eq(diff.changed[0].1, &generated[0]));
        assert!(diff.added.is_empty());
        assert!(diff.is_unchanged());
    }

    #[test]
    fn test_empty_lists() {
        let none: [Named; 0] = [];
        let diff = Difference::compare(&none, &none, SerializationMode::Source);
        assert!(diff.is_unchanged());
        assert!(diff.changed.is_empty());
    }

    #[test]
    fn test_functions_ignore_parameter_names() {
        let span = Span::new(0, 1).unwrap();
        let existing = [Function::standalone("N::foo", "void", "int x", false, span)];
        let generated = [
            Function::standalone("N::foo", "void", "int", false, span),
            Function::standalone("N::foo", "void", "long", false, span),
        ];
        let diff = Difference::compare(&existing, &generated, SerializationMode::Source);

        assert_eq!(diff.changed.len(), 1);
        assert_eq!(diff.added.len(), 1);
        assert_eq!(diff.added[0].args, "long");
        assert!(diff.removed.is_empty());
    }
}
