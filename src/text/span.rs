use crate::text::errors::TextError;
use serde::Serialize;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Inclusive `[start, end]` interval of absolute byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Result<Self, TextError> {
        if start > end {
            return Err(TextError::InvertedSpan { start, end });
        }
        Ok(Self { start, end })
    }

    /// Span of `len` bytes beginning at `start`, `None` when `len` is zero.
    pub fn with_len(start: usize, len: usize) -> Option<Self> {
        if len == 0 {
            return None;
        }
        Some(Self {
            start,
            end: start + len - 1,
        })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// A span always covers at least one byte.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Half-open byte range, suitable for slicing the original document.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end + 1
    }

    pub fn fully_contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// `other` covers this span's first byte.
    pub fn contains_at_start(&self, other: &Span) -> bool {
        other.start <= self.start && self.start <= other.end
    }

    /// `other` covers this span's last byte.
    pub fn contains_at_end(&self, other: &Span) -> bool {
        other.start <= self.end && self.end <= other.end
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn intersection(&self, other: &Span) -> Option<Span> {
        if !self.overlaps(other) {
            return None;
        }
        Some(Span {
            start: self.start.max(other.start),
            end: self.end.min(other.end),
        })
    }

    /// Smallest span covering both.
    pub fn cover(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Sort by start and coalesce overlapping or adjacent spans.
    pub fn merge(spans: impl IntoIterator<Item = Span>) -> Vec<Span> {
        let mut sorted: Vec<Span> = spans.into_iter().collect();
        sorted.sort();

        let mut merged: Vec<Span> = Vec::with_capacity(sorted.len());
        for span in sorted {
            match merged.last_mut() {
                Some(last) if span.start <= last.end.saturating_add(1) => {
                    last.end = last.end.max(span.end);
                }
                _ => merged.push(span),
            }
        }
        merged
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Half-open `start..end` byte offsets, as in a Rust range.
impl FromStr for Span {
    type Err = TextError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let bad = || TextError::BadRange {
            input: input.to_string(),
        };
        let (start, end) = input.trim().split_once("..").ok_or_else(bad)?;
        let start: usize = start.trim().parse().map_err(|_| bad())?;
        let end: usize = end.trim().parse().map_err(|_| bad())?;
        if end <= start {
            return Err(bad());
        }
        Span::new(start, end - 1)
    }
}
