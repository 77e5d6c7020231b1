use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TextError {
    #[error("invalid span: start {start} is past end {end}")]
    InvertedSpan { start: usize, end: usize },

    #[error("cannot create an empty block at offset {start}")]
    EmptyBlock { start: usize },

    #[error("invalid range '{input}': expected <start>..<end> with start < end")]
    BadRange { input: String },
}
