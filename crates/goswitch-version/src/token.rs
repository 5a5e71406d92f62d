//! Version tokens as they appear in version files, aliases and the
//! environment.
//!
//! A token names a directory under `versions/`, so it must never be able to
//! escape it.

use crate::error::{Error, Result};

const MAX_TOKEN_LEN: usize = 255;

/// `go1.22.1` -> `1.22.1`. Anything else is returned unchanged.
pub fn strip_go_prefix(s: &str) -> &str {
    match s.strip_prefix("go") {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest,
        _ => s,
    }
}

pub fn validate_token(token: &str) -> Result<()> {
    let reject = |reason| {
        Err(Error::InvalidToken {
            token: token.to_string(),
            reason,
        })
    };

    if token.is_empty() {
        return reject("empty");
    }
    if token.len() > MAX_TOKEN_LEN {
        return reject("too long");
    }
    if token.contains("..") {
        return reject("path traversal");
    }
    if token.contains(['/', '\\']) {
        return reject("path separator");
    }
    if token.starts_with('.') {
        return reject("leading dot");
    }
    if token.len() >= 2 && token.as_bytes()[1] == b':' && token.as_bytes()[0].is_ascii_alphabetic() {
        return reject("drive prefix");
    }
    if token.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return reject("whitespace or control character");
    }
    Ok(())
}
