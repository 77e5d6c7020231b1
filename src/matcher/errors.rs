use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatcherError {
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl MatcherError {
    pub(crate) fn invalid(pattern: &str, source: regex::Error) -> Self {
        MatcherError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        }
    }
}
