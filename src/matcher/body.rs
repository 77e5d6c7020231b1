use crate::cache;
use crate::matcher::errors::MatcherError;
use crate::matcher::text_match::TextMatch;
use crate::text::Fragment;
use regex::Regex;
use tracing::debug;

/// Finds balanced delimiter groups, skipping string and character literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalancedScanner {
    open: char,
    close: char,
}

impl BalancedScanner {
    pub const BRACES: BalancedScanner = BalancedScanner::new('{', '}');
    pub const PARENS: BalancedScanner = BalancedScanner::new('(', ')');

    pub const fn new(open: char, close: char) -> Self {
        Self { open, close }
    }

    pub fn open(&self) -> char {
        self.open
    }

    pub fn close(&self) -> char {
        self.close
    }

    /// Byte offsets of the first balanced group opening at or after `from`.
    ///
    /// Returns `(open, close)`, both indexing the delimiter characters, or
    /// `None` when no group opens or the group is never closed.
    pub fn scan(&self, text: &str, from: usize) -> Option<(usize, usize)> {
        let rest = text.get(from..)?;
        let mut depth = 0usize;
        let mut opened_at = None;
        let mut literal: Option<char> = None;
        let mut escaped = false;

        for (index, c) in rest.char_indices() {
            if let Some(quote) = literal {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == quote || c == '\n' {
                    literal = None;
                }
                continue;
            }

            if c == self.open {
                if depth == 0 {
                    opened_at = Some(from + index);
                }
                depth += 1;
            } else if c == self.close {
                if depth == 0 {
                    continue;
                }
                depth -= 1;
                if depth == 0 {
                    return Some((opened_at?, from + index));
                }
            } else if (c == '"' || c == '\'') && depth > 0 {
                literal = Some(c);
            }
        }

        None
    }
}

/// Header regex followed by a balanced body, consumed as one unit.
///
/// Groups of a produced match are the header's groups, then the body's
/// interior, then the groups of the optional post pattern.
#[derive(Debug, Clone)]
pub struct RemovingBodyMatcher {
    header: Regex,
    post: Option<Regex>,
    scanner: BalancedScanner,
    accept: Option<fn(&TextMatch) -> bool>,
}

impl RemovingBodyMatcher {
    /// `header` is implicitly followed by optional whitespace and the opening
    /// delimiter.
    pub fn new(header: &str, scanner: BalancedScanner) -> Result<Self, MatcherError> {
        let pattern = format!(
            r"{header}\s*{}",
            regex::escape(&scanner.open().to_string())
        );
        let header = cache::get_or_compile(&pattern)
            .map_err(|e| MatcherError::invalid(&pattern, e))?;
        Ok(Self {
            header,
            post: None,
            scanner,
            accept: None,
        })
    }

    pub fn braces(header: &str) -> Result<Self, MatcherError> {
        Self::new(header, BalancedScanner::BRACES)
    }

    pub fn parens(header: &str) -> Result<Self, MatcherError> {
        Self::new(header, BalancedScanner::PARENS)
    }

    /// Require `post` right after the closing delimiter (whitespace allowed).
    pub fn with_post(mut self, post: &str) -> Result<Self, MatcherError> {
        let pattern = format!(
            r"^{}\s*{post}",
            regex::escape(&self.scanner.close().to_string())
        );
        self.post = Some(
            cache::get_or_compile(&pattern).map_err(|e| MatcherError::invalid(&pattern, e))?,
        );
        Ok(self)
    }

    /// Only keep candidates satisfying `predicate`.
    pub fn accept_if(mut self, predicate: fn(&TextMatch) -> bool) -> Self {
        self.accept = Some(predicate);
        self
    }

    /// Return every accepted header + body match, cutting each out of
    /// `fragment` as soon as it is found.
    pub fn matches(&self, fragment: &mut Fragment) -> Vec<TextMatch> {
        let mut found = Vec::new();
        let Some(mut cursor) = fragment.start() else {
            return found;
        };

        loop {
            let window = fragment.slice_from(cursor);
            if window.is_empty() {
                break;
            }
            let merged = window.merged();
            let Some(captures) = self.header.captures(merged.as_str()) else {
                break;
            };
            let (Some(full), Some(header)) = (
                captures.get(0),
                TextMatch::from_captures(&captures, 0, &merged, &window),
            ) else {
                break;
            };

            let open_at = full.end() - self.scanner.open().len_utf8();
            let Some((_, close_at)) = self.scanner.scan(merged.as_str(), open_at) else {
                debug!(
                    at = header.span().start(),
                    "unterminated body, skipping candidate"
                );
                cursor = header.span().end() + 1;
                continue;
            };

            let Some(close_abs) = merged.to_absolute(close_at) else {
                break;
            };
            let body = TextMatch::assemble(
                &merged,
                &window,
                open_at..close_at + 1,
                [Some(open_at + 1..close_at)],
            );
            let mut candidate = body.and_then(|body| header.concat(&body));

            if let (Some(post), Some(joined)) = (&self.post, candidate.as_ref()) {
                let tail = merged.as_str().get(close_at..).unwrap_or_default();
                candidate = post
                    .captures(tail)
                    .and_then(|c| TextMatch::from_captures(&c, close_at, &merged, &window))
                    .and_then(|post_match| joined.concat(&post_match));
            }

            match candidate.filter(|m| self.accept.map_or(true, |accept| accept(m))) {
                Some(accepted) => {
                    fragment.remove(&[accepted.span()]);
                    cursor = accepted.span().end() + 1;
                    found.push(accepted);
                }
                None => cursor = close_abs + 1,
            }
        }

        found
    }
}
