use crate::text::errors::TextError;
use crate::text::span::Span;

/// Literal text together with the absolute span it occupies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    span: Span,
    content: String,
}

impl Block {
    pub fn new(content: impl Into<String>, start: usize) -> Result<Self, TextError> {
        let content = content.into();
        let span = Span::with_len(start, content.len()).ok_or(TextError::EmptyBlock { start })?;
        Ok(Self { span, content })
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn start(&self) -> usize {
        self.span.start()
    }

    pub fn end(&self) -> usize {
        self.span.end()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// The part of this block inside `span`.
    ///
    /// Returns `None` when the spans are disjoint or the cut would split a
    /// UTF-8 character.
    fn piece(&self, span: Span) -> Option<Block> {
        let cut = self.span.intersection(&span)?;
        let from = cut.start() - self.start();
        let to = cut.end() - self.start() + 1;
        let content = self.content.get(from..to)?;
        Some(Block {
            span: cut,
            content: content.to_string(),
        })
    }

    /// Blocks covering only the requested spans.
    pub fn slice(&self, spans: &[Span]) -> Vec<Block> {
        Span::merge(spans.iter().copied())
            .into_iter()
            .filter_map(|span| self.piece(span))
            .collect()
    }

    /// Blocks covering everything except the given spans.
    pub fn splice(&self, spans: &[Span]) -> Vec<Block> {
        let mut pieces = Vec::new();
        let mut cursor = self.start();

        for cut in Span::merge(spans.iter().copied()) {
            if cut.end() < cursor {
                continue;
            }
            if cut.start() > self.end() {
                break;
            }
            if cut.start() > cursor {
                if let Some(kept) = Span::new(cursor, cut.start() - 1)
                    .ok()
                    .and_then(|span| self.piece(span))
                {
                    pieces.push(kept);
                }
            }
            cursor = cut.end().saturating_add(1);
        }

        if cursor <= self.end() {
            if let Some(kept) = Span::new(cursor, self.end())
                .ok()
                .and_then(|span| self.piece(span))
            {
                pieces.push(kept);
            }
        }

        pieces
    }
}
