//! Thread-local cache of compiled regular expressions.
//!
//! Matchers are rebuilt for every class body and bucket they scan, and class
//! specific patterns (constructor and destructor shapes) repeat across
//! buckets. The cache is capped at 256 entries; it is cleared when full.

use regex::Regex;
use std::cell::RefCell;
use std::collections::HashMap;

const MAX_CACHE_ENTRIES: usize = 256;

thread_local! {
    static REGEX_CACHE: RefCell<HashMap<String, Regex>> = RefCell::new(HashMap::new());
}

/// Get a compiled regex from cache, or compile and cache it.
///
/// `Regex` clones share the compiled program, so handing out clones is cheap.
pub fn get_or_compile(pattern: &str) -> Result<Regex, regex::Error> {
    REGEX_CACHE.with(|cache| {
        let mut cache = cache.borrow_mut();

        if let Some(regex) = cache.get(pattern) {
            return Ok(regex.clone());
        }

        if cache.len() >= MAX_CACHE_ENTRIES {
            cache.clear();
        }

        let compiled = Regex::new(pattern)?;
        cache.insert(pattern.to_string(), compiled.clone());
        Ok(compiled)
    })
}

/// Clear the regex cache (mainly for testing).
pub fn clear_cache() {
    REGEX_CACHE.with(|cache| {
        cache.borrow_mut().clear();
    });
}

/// Number of cached patterns.
pub fn cache_size() -> usize {
    REGEX_CACHE.with(|cache| cache.borrow().len())
}
