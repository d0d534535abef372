//! Inventory path expressions.
//!
//! A path expression is a slash-delimited pattern over the live inventory
//! tree. Components are glob patterns (`*` any run, `?` one char; a plain
//! name is a degenerate glob). A leading `.` pivots resolution onto a
//! caller-supplied relative root instead of the global root. `..` is not
//! supported anywhere in an expression.

use super::error::{Result, VimError};

/// One component of a parsed path expression.
///
/// Literal names are not distinguished from globs at parse time; the matcher
/// treats an exact name as a degenerate glob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Leading `.`: resolve against a caller-supplied relative root.
    Pivot,
    /// Glob pattern matched against child names.
    Glob(String),
}

/// Split a raw expression into segments.
///
/// Empty components collapse (so `//a///b` equals `a/b`), interior `.`
/// components are dropped, and any `..` component is a hard error regardless
/// of position. A `.` in first position becomes [`PathSegment::Pivot`].
pub fn parse(raw: &str) -> Result<Vec<PathSegment>> {
    let mut segments = Vec::new();

    for part in raw.split('/').filter(|p| !p.is_empty()) {
        match part {
            ".." => {
                return Err(VimError::UnsupportedTraversal { expr: raw.into() });
            }
            "." => {
                if segments.is_empty() {
                    segments.push(PathSegment::Pivot);
                }
                // Interior `.` is a no-op, same as path cleaning would yield.
            }
            _ => segments.push(PathSegment::Glob(part.to_string())),
        }
    }

    Ok(segments)
}

/// Glob match over child names: `*` matches any run of characters (including
/// empty), `?` exactly one. Comparison is byte-wise and case-sensitive, which
/// matches how the inventory service compares names.
pub fn glob_match(pattern: &str, name: &str) -> bool {
    fn inner(p: &[u8], n: &[u8]) -> bool {
        match p.split_first() {
            None => n.is_empty(),
            Some((b'*', rest)) => {
                // Try every split point, shortest first.
                (0..=n.len()).any(|i| inner(rest, &n[i..]))
            }
            Some((b'?', rest)) => !n.is_empty() && inner(rest, &n[1..]),
            Some((c, rest)) => n.first() == Some(c) && inner(rest, &n[1..]),
        }
    }
    inner(pattern.as_bytes(), name.as_bytes())
}

/// Join a parent path and a child name with a single slash.
pub fn join(base: &str, name: &str) -> String {
    if base.ends_with('/') {
        format!("{base}{name}")
    } else {
        format!("{base}/{name}")
    }
}
