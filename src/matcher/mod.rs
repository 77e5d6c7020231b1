//! Regex driven extraction over [`Fragment`](crate::text::Fragment)s.
//!
//! Matchers search the merged scratch text of a fragment and translate every
//! hit back to absolute offsets. The removing variants cut what they return
//! out of the fragment, so later passes never see the same text twice.

pub mod body;
pub mod errors;
pub mod pattern;
pub mod text_match;

pub use body::{BalancedScanner, RemovingBodyMatcher};
pub use errors::MatcherError;
pub use pattern::{RegexMatcher, RemovingRegexMatcher};
pub use text_match::{GroupMatch, TextMatch};
