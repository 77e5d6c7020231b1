use crate::text::Span;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::ops::Range;
use std::path::{Path, PathBuf};
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// One change to a document, expressed against the document's original
/// offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TextEdit {
    /// Insert `text` before byte `position`.
    Insert {
        position: usize,
        text: String,
        label: String,
    },
    /// Remove every byte of `span`.
    Delete { span: Span, label: String },
}

impl TextEdit {
    pub fn insert(position: usize, text: impl Into<String>, label: impl Into<String>) -> Self {
        TextEdit::Insert {
            position,
            text: text.into(),
            label: label.into(),
        }
    }

    pub fn delete(span: Span, label: impl Into<String>) -> Self {
        TextEdit::Delete {
            span,
            label: label.into(),
        }
    }

    /// First byte affected.
    pub fn position(&self) -> usize {
        match self {
            TextEdit::Insert { position, .. } => *position,
            TextEdit::Delete { span, .. } => span.start(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            TextEdit::Insert { label, .. } | TextEdit::Delete { label, .. } => label,
        }
    }

    pub fn is_insert(&self) -> bool {
        matches!(self, TextEdit::Insert { .. })
    }

    /// Half-open byte range replaced by [`TextEdit::replacement`].
    pub fn byte_range(&self) -> Range<usize> {
        match self {
            TextEdit::Insert { position, .. } => *position..*position,
            TextEdit::Delete { span, .. } => span.range(),
        }
    }

    pub fn replacement(&self) -> &str {
        match self {
            TextEdit::Insert { text, .. } => text,
            TextEdit::Delete { .. } => "",
        }
    }
}

/// Verification strategy for edit safety.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditVerification {
    /// Exact text match required
    ExactMatch(String),
    /// xxh3 hash of expected text (faster for large documents)
    Hash(u64),
}

impl EditVerification {
    /// Check if the provided text matches the verification criteria.
    pub fn matches(&self, text: &str) -> bool {
        match self {
            EditVerification::ExactMatch(expected) => text == expected,
            EditVerification::Hash(expected_hash) => xxh3_64(text.as_bytes()) == *expected_hash,
        }
    }

    /// Create verification from text, using hash for text over 1KB.
    pub fn from_text(text: &str) -> Self {
        if text.len() > 1024 {
            EditVerification::Hash(xxh3_64(text.as_bytes()))
        } else {
            EditVerification::ExactMatch(text.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("{} changed since it was parsed", .file.display())]
    BeforeTextMismatch { file: PathBuf },

    #[error("Invalid byte range: [{byte_start}, {byte_end}) in document of length {len}")]
    InvalidByteRange {
        byte_start: usize,
        byte_end: usize,
        len: usize,
    },

    #[error("Byte offset {offset} is not on a character boundary")]
    NotCharBoundary { offset: usize },

    #[error("Overlapping edits: [{}, {}) and [{}, {})", .first.start, .first.end, .second.start, .second.end)]
    Overlap {
        first: Range<usize>,
        second: Range<usize>,
    },

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of applying a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "EditResult should be checked for success/unchanged"]
pub enum EditResult {
    /// The file was rewritten.
    Applied { file: PathBuf, edits: usize },
    /// The batch held no edits; the file was not touched.
    Unchanged { file: PathBuf },
}

/// Edits computed against one version of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "EditBatch does nothing until apply() is called"]
pub struct EditBatch {
    pub file: PathBuf,
    /// What the whole file must contain for the offsets to still hold.
    pub expected_before: EditVerification,
    pub edits: Vec<TextEdit>,
}

impl EditBatch {
    /// Batch of `edits` computed from `original`, the file's current content.
    pub fn new(file: impl Into<PathBuf>, original: &str, edits: Vec<TextEdit>) -> Self {
        Self {
            file: file.into(),
            expected_before: EditVerification::from_text(original),
            edits,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Check every edit against `content` and the others.
    fn validate(&self, content: &str) -> Result<(), EditError> {
        for edit in &self.edits {
            let range = edit.byte_range();
            if range.end > content.len() {
                return Err(EditError::InvalidByteRange {
                    byte_start: range.start,
                    byte_end: range.end,
                    len: content.len(),
                });
            }
            for offset in [range.start, range.end] {
                if !content.is_char_boundary(offset) {
                    return Err(EditError::NotCharBoundary { offset });
                }
            }
        }

        let mut deletions: Vec<Range<usize>> = self
            .edits
            .iter()
            .filter(|edit| !edit.is_insert())
            .map(TextEdit::byte_range)
            .collect();
        deletions.sort_by_key(|range| range.start);
        for window in deletions.windows(2) {
            if window[0].end > window[1].start {
                return Err(EditError::Overlap {
                    first: window[0].clone(),
                    second: window[1].clone(),
                });
            }
        }

        // An insertion may touch a deletion but never land inside it.
        for insert in self.edits.iter().filter(|edit| edit.is_insert()) {
            let at = insert.position();
            if let Some(deleted) = deletions.iter().find(|range| range.start < at && at < range.end) {
                return Err(EditError::Overlap {
                    first: deleted.clone(),
                    second: at..at,
                });
            }
        }
        Ok(())
    }

    /// Apply the batch to `content` in memory.
    ///
    /// Edits are applied bottom-to-top so that every offset refers to the
    /// original text. At one position a deletion goes before the insertions,
    /// and insertions keep their batch order.
    pub fn apply_to_str(&self, content: &str) -> Result<String, EditError> {
        self.validate(content)?;

        let mut order: Vec<(usize, &TextEdit)> = self.edits.iter().enumerate().collect();
        order.sort_by(|(i, a), (j, b)| {
            b.position()
                .cmp(&a.position())
                .then(a.is_insert().cmp(&b.is_insert()))
                .then(j.cmp(i))
        });

        let mut result = content.to_string();
        for (_, edit) in order {
            result.replace_range(edit.byte_range(), edit.replacement());
        }
        Ok(result)
    }

    /// Apply the batch to the file system atomically.
    ///
    /// Uses tempfile + fsync + rename for crash safety.
    pub fn apply(&self) -> Result<EditResult, EditError> {
        if self.edits.is_empty() {
            return Ok(EditResult::Unchanged {
                file: self.file.clone(),
            });
        }

        let original = fs::read_to_string(&self.file)?;
        if !self.expected_before.matches(&original) {
            return Err(EditError::BeforeTextMismatch {
                file: self.file.clone(),
            });
        }

        let updated = self.apply_to_str(&original)?;
        atomic_write(&self.file, updated.as_bytes())?;

        // Build tools watch mtimes
        let now = filetime::FileTime::now();
        filetime::set_file_mtime(&self.file, now)?;

        Ok(EditResult::Applied {
            file: self.file.clone(),
            edits: self.edits.len(),
        })
    }
}

/// Atomic file write: tempfile + fsync + rename.
///
/// Either the full write succeeds or nothing changes.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<(), EditError> {
    // Same directory keeps the rename on one filesystem
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        Some(_) => Path::new("."),
        None => {
            return Err(EditError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Path has no parent directory",
            )))
        }
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize) -> Span {
        Span::new(start, end).unwrap()
    }

    fn batch(edits: Vec<TextEdit>) -> EditBatch {
        EditBatch::new("test.cpp", "", edits)
    }

    #[test]
    fn test_edit_verification_exact_match() {
        let text = "hello world";
        let verify = EditVerification::ExactMatch(text.to_string());
        assert!(verify.matches(text));
        assert!(!verify.matches("hello"));
    }

    #[test]
    fn test_edit_verification_hash() {
        let text = "hello world";
        let verify = EditVerification::Hash(xxh3_64(text.as_bytes()));
        assert!(verify.matches(text));
        assert!(!verify.matches("goodbye world"));
    }

    #[test]
    fn test_edit_verification_from_text_size() {
        assert!(matches!(
            EditVerification::from_text("small"),
            EditVerification::ExactMatch(_)
        ));
        assert!(matches!(
            EditVerification::from_text(&"x".repeat(2000)),
            EditVerification::Hash(_)
        ));
    }

    #[test]
    fn test_text_edit_ranges() {
        let insert = TextEdit::insert(4, "abc", "Added to file a.cpp");
        assert_eq!(insert.byte_range(), 4..4);
        assert_eq!(insert.replacement(), "abc");
        let delete = TextEdit::delete(span(2, 5), "Removed from file a.cpp");
        assert_eq!(delete.byte_range(), 2..6);
        assert_eq!(delete.replacement(), "");
        assert_eq!(delete.position(), 2);
    }

    #[test]
    fn test_apply_to_str_uses_original_offsets() {
        let content = "line1\nline2\nline3\n";
        let result = batch(vec![
            TextEdit::delete(span(6, 11), "remove"),
            TextEdit::insert(18, "line4\n", "add"),
            TextEdit::insert(0, "// top\n", "add"),
        ])
        .apply_to_str(content)
        .unwrap();
        assert_eq!(result, "// top\nline1\nline3\nline4\n");
    }

    #[test]
    fn test_insertions_at_one_position_keep_their_order() {
        let result = batch(vec![
            TextEdit::insert(1, "a", "add"),
            TextEdit::insert(1, "b", "add"),
            TextEdit::delete(span(1, 1), "remove"),
        ])
        .apply_to_str("xyz")
        .unwrap();
        assert_eq!(result, "xabz");
    }

    #[test]
    fn test_insertion_inside_deletion_is_rejected() {
        let result = batch(vec![
            TextEdit::delete(span(0, 4), "remove"),
            TextEdit::insert(2, "a", "add"),
        ])
        .apply_to_str("hello world");
        assert!(matches!(result, Err(EditError::Overlap { .. })));
    }

    #[test]
    fn test_overlapping_deletions_are_rejected() {
        let result = batch(vec![
            TextEdit::delete(span(0, 4), "remove"),
            TextEdit::delete(span(3, 6), "remove"),
        ])
        .apply_to_str("hello world");
        assert!(matches!(result, Err(EditError::Overlap { .. })));
    }

    #[test]
    fn test_invalid_range_and_char_boundary() {
        let result = batch(vec![TextEdit::delete(span(5, 20), "remove")]).apply_to_str("hello");
        assert!(matches!(result, Err(EditError::InvalidByteRange { .. })));

        let result = batch(vec![TextEdit::insert(1, "x", "add")]).apply_to_str("é");
        assert!(matches!(result, Err(EditError::NotCharBoundary { offset: 1 })));
    }

    #[test]
    fn test_atomic_apply() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("shape.cpp");
        let original = "void f() {\n}\n";
        fs::write(&file_path, original).unwrap();

        let edits = vec![TextEdit::insert(original.len(), "\nvoid g() {\n}\n", "add")];
        let result = EditBatch::new(&file_path, original, edits).apply().unwrap();

        assert_eq!(
            result,
            EditResult::Applied {
                file: file_path.clone(),
                edits: 1
            }
        );
        let content = fs::read_to_string(&file_path).unwrap();
        assert_eq!(content, "void f() {\n}\n\nvoid g() {\n}\n");
    }

    #[test]
    fn test_apply_refuses_modified_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("shape.cpp");
        fs::write(&file_path, "changed").unwrap();

        let edits = vec![TextEdit::insert(0, "x", "add")];
        let result = EditBatch::new(&file_path, "original", edits).apply();
        assert!(matches!(result, Err(EditError::BeforeTextMismatch { .. })));
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "changed");
    }

    #[test]
    fn test_empty_batch_leaves_file_alone() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("missing.cpp");
        let result = EditBatch::new(&file_path, "", Vec::new()).apply().unwrap();
        assert!(matches!(result, EditResult::Unchanged { .. }));
        assert!(!file_path.exists());
    }
}
