use crate::text::block::Block;
use crate::text::span::Span;
use std::fmt;
use std::ops::Range;

/// Ordered, possibly discontiguous, pieces of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    blocks: Vec<Block>,
}

impl Fragment {
    /// Fragment covering a whole document.
    pub fn new(content: &str) -> Self {
        Self::at(content, 0)
    }

    /// Fragment for `content` placed at absolute offset `start`.
    pub fn at(content: &str, start: usize) -> Self {
        Self {
            blocks: Block::new(content, start).into_iter().collect(),
        }
    }

    /// Blocks must be ordered by offset and disjoint.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        debug_assert!(blocks.windows(2).all(|w| w[0].end() < w[1].start()));
        Self { blocks }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Whether nothing but whitespace is left.
    pub fn is_blank(&self) -> bool {
        self.blocks
            .iter()
            .all(|block| block.content().trim().is_empty())
    }

    pub fn start(&self) -> Option<usize> {
        self.blocks.first().map(Block::start)
    }

    pub fn end(&self) -> Option<usize> {
        self.blocks.last().map(Block::end)
    }

    /// Span from the first to the last remaining byte, gaps included.
    pub fn span(&self) -> Option<Span> {
        Span::new(self.start()?, self.end()?).ok()
    }

    /// Cut `spans` out of every block in place.
    pub fn remove(&mut self, spans: &[Span]) {
        if spans.is_empty() {
            return;
        }
        self.blocks = self.splice_blocks(spans);
    }

    /// New fragment restricted to `spans`.
    pub fn slice(&self, spans: &[Span]) -> Fragment {
        Fragment {
            blocks: self
                .blocks
                .iter()
                .flat_map(|block| block.slice(spans))
                .collect(),
        }
    }

    /// New fragment with `spans` cut out.
    pub fn splice(&self, spans: &[Span]) -> Fragment {
        Fragment {
            blocks: self.splice_blocks(spans),
        }
    }

    /// Add the blocks of `other`, keeping offset order. Both fragments must
    /// come from the same document and not overlap.
    pub fn extend(&mut self, other: Fragment) {
        self.blocks.extend(other.blocks);
        self.blocks.sort_by_key(Block::start);
    }

    /// Everything at or after absolute offset `start`.
    pub fn slice_from(&self, start: usize) -> Fragment {
        match self.end() {
            Some(end) if start <= end => match Span::new(start, end) {
                Ok(span) => self.slice(&[span]),
                Err(_) => Fragment::default(),
            },
            _ => Fragment::default(),
        }
    }

    fn splice_blocks(&self, spans: &[Span]) -> Vec<Block> {
        self.blocks
            .iter()
            .flat_map(|block| block.splice(spans))
            .collect()
    }

    /// Concatenated scratch text with a table mapping back to absolute offsets.
    pub fn merged(&self) -> MergedText {
        let mut text = String::new();
        let mut segments = Vec::with_capacity(self.blocks.len());
        for block in &self.blocks {
            segments.push(Segment {
                scratch: text.len(),
                absolute: block.start(),
            });
            text.push_str(block.content());
        }
        MergedText { text, segments }
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for block in &self.blocks {
            f.write_str(block.content())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    scratch: usize,
    absolute: usize,
}

/// Block contents joined into one string for the regex engine.
///
/// Removed gaps are not addressable, so every scratch offset maps back to
/// exactly one absolute offset.
#[derive(Debug, Clone)]
pub struct MergedText {
    text: String,
    segments: Vec<Segment>,
}

impl MergedText {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Absolute offset of the byte at scratch offset `index`.
    pub fn to_absolute(&self, index: usize) -> Option<usize> {
        if index >= self.text.len() {
            return None;
        }
        let pos = self
            .segments
            .partition_point(|segment| segment.scratch <= index);
        let segment = self.segments.get(pos.checked_sub(1)?)?;
        Some(segment.absolute + (index - segment.scratch))
    }

    /// Absolute span of a non-empty scratch range.
    pub fn span_of(&self, range: Range<usize>) -> Option<Span> {
        if range.is_empty() {
            return None;
        }
        let start = self.to_absolute(range.start)?;
        let end = self.to_absolute(range.end - 1)?;
        Span::new(start, end).ok()
    }
}
