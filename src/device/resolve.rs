//! Device path resolution
//!
//! Expands a shell-style glob against the filesystem and picks the board's
//! serial node. Supports `*`, `?`, `[abc]`, `[a-z]` and `[!abc]` in any path
//! component. Matches come back sorted so "first" is stable for a given
//! filesystem state.

use crate::error::{ResetError, Result};
use log::{debug, trace};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Default glob for the Picade USB Audio control channel
pub const PICADE_AUDIO_PATTERN: &str = "/dev/serial/by-id/usb-Pimoroni_Picade_USB_Audio_*";

/// Resolve a glob pattern to the first matching path
pub fn resolve_first(pattern: &str) -> Result<PathBuf> {
    let first = resolve_all(pattern)?.into_iter().next();

    first.ok_or_else(|| ResetError::DeviceNotFound {
        pattern: pattern.to_string(),
    })
}

/// Resolve a glob pattern to every matching path, in sorted order
///
/// Directories that are missing or unreadable contribute no matches.
pub fn resolve_all(pattern: &str) -> Result<Vec<PathBuf>> {
    validate_pattern(pattern)?;

    let mut candidates = vec![PathBuf::new()];

    for component in Path::new(pattern).components() {
        candidates = match component {
            Component::Normal(os_part) => {
                let part = os_part.to_string_lossy();
                if has_wildcard(&part) {
                    expand_component(&candidates, &part)
                } else {
                    candidates.into_iter().map(|c| c.join(os_part)).collect()
                }
            }
            other => candidates
                .into_iter()
                .map(|c| c.join(other.as_os_str()))
                .collect(),
        };

        if candidates.is_empty() {
            break;
        }
    }

    // Literal components were joined blindly; keep only what is really there.
    // Dangling symlinks still count, since /dev/serial/by-id is all symlinks.
    let mut matches: Vec<PathBuf> = candidates
        .into_iter()
        .filter(|p| fs::symlink_metadata(p).is_ok())
        .collect();
    matches.sort();
    matches.dedup();

    debug!("Pattern {} matched {} path(s)", pattern, matches.len());
    Ok(matches)
}

/// Whether a single path component contains glob metacharacters
pub fn has_wildcard(component: &str) -> bool {
    component.contains(['*', '?', '['])
}

/// Match one file name against one glob component
pub fn matches_pattern(name: &str, pattern: &str) -> bool {
    let name: Vec<char> = name.chars().collect();
    let pat: Vec<char> = pattern.chars().collect();

    let (mut n, mut p) = (0, 0);
    // Pattern index just past the last `*`, and the name index it is
    // currently assumed to have consumed up to.
    let mut star: Option<(usize, usize)> = None;

    while n < name.len() {
        if p < pat.len() && pat[p] == '*' {
            star = Some((p + 1, n));
            p += 1;
            continue;
        }

        if let Some(next) = match_single(&pat, p, name[n]) {
            p = next;
            n += 1;
            continue;
        }

        match star {
            Some((star_p, star_n)) => {
                p = star_p;
                n = star_n + 1;
                star = Some((star_p, star_n + 1));
            }
            None => return false,
        }
    }

    while p < pat.len() && pat[p] == '*' {
        p += 1;
    }
    p == pat.len()
}

fn validate_pattern(pattern: &str) -> Result<()> {
    if pattern.trim().is_empty() {
        return Err(ResetError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: "pattern is empty".to_string(),
        });
    }

    // Classes never span a separator, so check each component on its own
    for component in Path::new(pattern).components() {
        let Component::Normal(os_part) = component else {
            continue;
        };
        let part = os_part.to_string_lossy();
        let pat: Vec<char> = part.chars().collect();

        let mut i = 0;
        while i < pat.len() {
            if pat[i] == '[' {
                match class_end(&pat, i) {
                    Some(end) => i = end + 1,
                    None => {
                        return Err(ResetError::InvalidPattern {
                            pattern: pattern.to_string(),
                            reason: format!("unterminated character class in '{}'", part),
                        })
                    }
                }
            } else {
                i += 1;
            }
        }
    }

    Ok(())
}

/// List each candidate directory and keep entries matching `part`
fn expand_component(candidates: &[PathBuf], part: &str) -> Vec<PathBuf> {
    let mut expanded = Vec::new();

    for dir in candidates {
        let listing = if dir.as_os_str().is_empty() {
            Path::new(".")
        } else {
            dir.as_path()
        };

        let entries = match fs::read_dir(listing) {
            Ok(entries) => entries,
            Err(e) => {
                trace!("Skipping {}: {}", listing.display(), e);
                continue;
            }
        };

        for entry in entries.flatten() {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };

            // Hidden entries need an explicit leading dot in the pattern
            if name.starts_with('.') && !part.starts_with('.') {
                continue;
            }

            if matches_pattern(name, part) {
                expanded.push(dir.join(name));
            }
        }
    }

    expanded
}

/// Try to consume one character at `p`; returns the next pattern index
fn match_single(pat: &[char], p: usize, ch: char) -> Option<usize> {
    match pat.get(p)? {
        '*' => None,
        '?' => Some(p + 1),
        '[' => match class_end(pat, p) {
            Some(end) if class_matches(&pat[p + 1..end], ch) => Some(end + 1),
            _ => None,
        },
        c if *c == ch => Some(p + 1),
        _ => None,
    }
}

/// Index of the `]` closing the class opened at `open`
fn class_end(pat: &[char], open: usize) -> Option<usize> {
    let mut i = open + 1;
    if matches!(pat.get(i), Some('!') | Some('^')) {
        i += 1;
    }
    // A `]` right after the opening bracket is a literal member
    if pat.get(i) == Some(&']') {
        i += 1;
    }
    while i < pat.len() {
        if pat[i] == ']' {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// `body` is everything between the brackets
fn class_matches(body: &[char], ch: char) -> bool {
    let (negated, members) = match body.first() {
        Some('!') | Some('^') => (true, &body[1..]),
        _ => (false, body),
    };

    let mut found = false;
    let mut i = 0;
    while i < members.len() {
        if i + 2 < members.len() && members[i + 1] == '-' {
            if members[i] <= ch && ch <= members[i + 2] {
                found = true;
            }
            i += 3;
        } else {
            if members[i] == ch {
                found = true;
            }
            i += 1;
        }
    }

    found != negated
}
