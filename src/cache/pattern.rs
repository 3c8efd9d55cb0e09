//! Key pattern matching for `keys_matching_pattern`.
//!
//! Supports `*` (any run of characters, including none) and `?` (exactly one
//! character). Everything else matches literally.

/// Returns the literal text before the first wildcard.
///
/// The store uses it to turn a pattern into an ordered range scan.
pub fn literal_prefix(pattern: &str) -> &str {
    match pattern.find(['*', '?']) {
        Some(idx) => &pattern[..idx],
        None => pattern,
    }
}

/// Glob-style match of `key` against `pattern`.
pub fn matches(pattern: &str, key: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let key: Vec<char> = key.chars().collect();

    let (mut p, mut k) = (0, 0);
    // Position of the last `*` seen and the key index it was tried at
    let mut backtrack: Option<(usize, usize)> = None;

    while k < key.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, k));
                p += 1;
            }
            Some('?') => {
                p += 1;
                k += 1;
            }
            Some(c) if *c == key[k] => {
                p += 1;
                k += 1;
            }
            _ => match backtrack {
                Some((star, tried)) => {
                    p = star + 1;
                    k = tried + 1;
                    backtrack = Some((star, tried + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|c| *c == '*')
}
