use crate::cache;
use crate::matcher::errors::MatcherError;
use crate::matcher::text_match::TextMatch;
use crate::text::{Fragment, Span};
use regex::Regex;

/// Global, non-overlapping regex search over a fragment.
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    regex: Regex,
}

impl RegexMatcher {
    pub fn new(pattern: &str) -> Result<Self, MatcherError> {
        let regex =
            cache::get_or_compile(pattern).map_err(|e| MatcherError::invalid(pattern, e))?;
        Ok(Self { regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// All hits, left to right. Zero-length hits cannot form a span and are
    /// skipped.
    pub fn find(&self, fragment: &Fragment) -> Vec<TextMatch> {
        let merged = fragment.merged();
        self.regex
            .captures_iter(merged.as_str())
            .filter_map(|captures| TextMatch::from_captures(&captures, 0, &merged, fragment))
            .collect()
    }

    pub fn is_match(&self, fragment: &Fragment) -> bool {
        self.regex.is_match(fragment.merged().as_str())
    }

    fn spans(&self, fragment: &Fragment) -> Vec<Span> {
        let merged = fragment.merged();
        self.regex
            .find_iter(merged.as_str())
            .filter_map(|m| merged.span_of(m.range()))
            .collect()
    }
}

/// Regex search that consumes what it reports.
#[derive(Debug, Clone)]
pub struct RemovingRegexMatcher {
    inner: RegexMatcher,
}

impl RemovingRegexMatcher {
    pub fn new(pattern: &str) -> Result<Self, MatcherError> {
        Ok(Self {
            inner: RegexMatcher::new(pattern)?,
        })
    }

    /// Return every hit and cut it out of `fragment`.
    pub fn matches(&self, fragment: &mut Fragment) -> Vec<TextMatch> {
        if fragment.is_empty() {
            return Vec::new();
        }
        let found = self.inner.find(fragment);
        let spans: Vec<Span> = found.iter().map(TextMatch::span).collect();
        fragment.remove(&spans);
        found
    }

    /// Return the regions between hits and cut those out of `fragment`,
    /// leaving only the hits behind.
    ///
    /// Without any hit the whole fragment is returned and emptied.
    pub fn matches_inverse(&self, fragment: &mut Fragment) -> Vec<TextMatch> {
        if fragment.is_empty() {
            return Vec::new();
        }
        let hits = self.inner.spans(fragment);
        let pieces: Vec<TextMatch> = fragment
            .splice(&hits)
            .blocks()
            .iter()
            .map(TextMatch::from_block)
            .collect();
        let spans: Vec<Span> = pieces.iter().map(TextMatch::span).collect();
        fragment.remove(&spans);
        pieces
    }
}
