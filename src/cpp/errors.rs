use crate::matcher::MatcherError;
use crate::text::TextError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("class '{class}' declares {count} destructors, expected at most one")]
    MultipleDestructors { class: String, count: usize },

    #[error(transparent)]
    Text(#[from] TextError),

    #[error(transparent)]
    Matcher(#[from] MatcherError),
}
