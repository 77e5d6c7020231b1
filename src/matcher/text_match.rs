use crate::text::{Block, Fragment, MergedText, Span};
use std::ops::Range;

/// A single hit of a matcher, in absolute coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMatch {
    span: Span,
    text: String,
    groups: Vec<Option<GroupMatch>>,
}

/// One capture group of a [`TextMatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMatch {
    text: String,
    span: Span,
    fragment: Fragment,
}

impl GroupMatch {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// The captured text as pieces of the searched fragment. A capture that
    /// straddled removed text comes back as several blocks.
    pub fn fragment(&self) -> &Fragment {
        &self.fragment
    }
}

impl TextMatch {
    /// Build a match from scratch ranges of `merged`, which must be the
    /// merged text of `searched`.
    pub(crate) fn assemble(
        merged: &MergedText,
        searched: &Fragment,
        full: Range<usize>,
        groups: impl IntoIterator<Item = Option<Range<usize>>>,
    ) -> Option<TextMatch> {
        let span = merged.span_of(full.clone())?;
        let text = merged.as_str().get(full)?.to_string();
        let groups = groups
            .into_iter()
            .map(|range| {
                let range = range?;
                let span = merged.span_of(range.clone())?;
                Some(GroupMatch {
                    text: merged.as_str().get(range)?.to_string(),
                    span,
                    fragment: searched.slice(&[span]),
                })
            })
            .collect();
        Some(TextMatch { span, text, groups })
    }

    /// Build a match from regex captures found at scratch offset `offset`.
    pub(crate) fn from_captures(
        captures: &regex::Captures<'_>,
        offset: usize,
        merged: &MergedText,
        searched: &Fragment,
    ) -> Option<TextMatch> {
        let full = captures.get(0)?;
        let shift = |m: regex::Match<'_>| m.start() + offset..m.end() + offset;
        TextMatch::assemble(
            merged,
            searched,
            shift(full),
            (1..captures.len()).map(|i| captures.get(i).map(shift)),
        )
    }

    /// A group-less match covering a whole block.
    pub(crate) fn from_block(block: &Block) -> TextMatch {
        TextMatch {
            span: block.span(),
            text: block.content().to_string(),
            groups: Vec::new(),
        }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of capture groups, present or not.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    fn group_match(&self, index: usize) -> Option<&GroupMatch> {
        self.groups.get(index.checked_sub(1)?)?.as_ref()
    }

    /// Text of capture group `index` (1-based; 0 is the whole match).
    /// Missing groups read as the empty string.
    pub fn group(&self, index: usize) -> &str {
        if index == 0 {
            return &self.text;
        }
        self.group_match(index).map_or("", GroupMatch::text)
    }

    pub fn has_group(&self, index: usize) -> bool {
        self.group_match(index).is_some()
    }

    pub fn group_span(&self, index: usize) -> Option<Span> {
        self.group_match(index).map(GroupMatch::span)
    }

    /// Fragment of capture group `index`, empty when the group did not take part.
    pub fn group_fragment(&self, index: usize) -> Fragment {
        self.group_match(index)
            .map(|group| group.fragment.clone())
            .unwrap_or_default()
    }

    /// Join `other` onto the end of this match.
    ///
    /// `other` must start right after this match or inside it; the groups of
    /// `other` are numbered after this match's groups.
    pub fn concat(&self, other: &TextMatch) -> Option<TextMatch> {
        let start = other.span.start();
        if start < self.span.start() || start > self.span.end() + 1 {
            return None;
        }

        let overlap = (self.span.end() + 1).saturating_sub(other.span.start());
        let mut text = self.text.clone();
        if other.span.end() > self.span.end() {
            text.push_str(other.text.get(overlap..).unwrap_or_default());
        }

        let mut groups = self.groups.clone();
        groups.extend(other.groups.iter().cloned());

        Some(TextMatch {
            span: self.span.cover(&other.span),
            text,
            groups,
        })
    }
}
