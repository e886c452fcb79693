//! OSC 1.0 address-pattern matching: `?`, `*`, `[...]`, `{...}` against a
//! literal address, plus the part-counting helpers.
//!
//! Grounded entirely on `OscAddress.c` -- no example repo in the pack
//! implements pattern matching, so the backtracking/longest-match algorithm
//! itself is carried verbatim from the original; only the Rust expression of
//! it (index cursors instead of raw pointers, explicit save/restore instead
//! of pointer caching) is this crate's own.

use crate::error::OscError;
use tracing::debug;

/// Byte at `i`, or `0` if `i` is past the end -- mirrors reading a
/// null-terminated C string one byte past a shorter buffer.
fn byte_at(s: &[u8], i: usize) -> u8 {
    *s.get(i).unwrap_or(&0)
}

fn is_special(c: u8) -> bool {
    matches!(c, b'?' | b'*' | b'[' | b'{')
}

/// Full match: pattern and address must both exhaust together.
pub fn match_full(pattern: &str, address: &str) -> bool {
    match_literal(pattern.as_bytes(), address.as_bytes(), false)
}

/// Partial match: succeeds if the address is a valid truncation of a
/// matching full address (e.g. matching `/inputs` against `/inputs/digital`'s
/// leading part).
pub fn match_partial(pattern: &str, address: &str) -> bool {
    match_literal(pattern.as_bytes(), address.as_bytes(), true)
}

fn match_literal(pattern: &[u8], address: &[u8], is_partial: bool) -> bool {
    let mut pi = 0usize;
    let mut ai = 0usize;
    while byte_at(pattern, pi) != 0 {
        if byte_at(address, ai) == 0 {
            if is_partial {
                return true;
            }
            return match_expression(pattern, &mut pi, address, &mut ai, is_partial);
        }
        if is_special(pattern[pi]) {
            return match_expression(pattern, &mut pi, address, &mut ai, is_partial);
        }
        if pattern[pi] != address[ai] {
            return false;
        }
        pi += 1;
        ai += 1;
    }
    byte_at(address, ai) == 0
}

fn match_expression(
    pattern: &[u8],
    pi: &mut usize,
    address: &[u8],
    ai: &mut usize,
    is_partial: bool,
) -> bool {
    while byte_at(pattern, *pi) != 0 {
        if byte_at(address, *ai) == 0 && is_partial {
            return true;
        }
        if byte_at(pattern, *pi) == b'*' {
            if !match_star(pattern, pi, address, ai, is_partial) {
                return false;
            }
        } else if !match_character(pattern, pi, address, ai, is_partial) {
            return false;
        }
    }
    byte_at(address, *ai) == 0
}

fn match_star(
    pattern: &[u8],
    pi: &mut usize,
    address: &[u8],
    ai: &mut usize,
    is_partial: bool,
) -> bool {
    while byte_at(pattern, *pi) == b'*' {
        *pi += 1;
    }

    if byte_at(pattern, *pi) == b'/' || byte_at(pattern, *pi) == 0 {
        while byte_at(address, *ai) != b'/' && byte_at(address, *ai) != 0 {
            *ai += 1;
        }
        return true;
    }

    loop {
        let pattern_cache = *pi;
        while !match_character(pattern, pi, address, ai, is_partial) {
            *ai += 1;
            if byte_at(address, *ai) == b'/' || byte_at(address, *ai) == 0 {
                if is_partial && byte_at(address, *ai) == 0 {
                    return true;
                }
                return false;
            }
        }
        let address_cache = *ai;
        if match_expression(pattern, pi, address, ai, is_partial) {
            return true;
        }
        *pi = pattern_cache;
        *ai = address_cache;
    }
}

fn match_character(
    pattern: &[u8],
    pi: &mut usize,
    address: &[u8],
    ai: &mut usize,
    is_partial: bool,
) -> bool {
    let pi0 = *pi;
    let ai0 = *ai;
    let matched = match byte_at(pattern, *pi) {
        b'[' => match_brackets(pattern, pi, address, ai),
        b']' => false,
        b'{' => match_curly_braces(pattern, pi, address, ai, is_partial),
        b'}' => false,
        c => {
            if c == byte_at(address, *ai) || c == b'?' {
                *pi += 1;
                *ai += 1;
                true
            } else {
                false
            }
        }
    };
    if !matched {
        *pi = pi0;
        *ai = ai0;
    }
    matched
}

fn match_brackets(pattern: &[u8], pi: &mut usize, address: &[u8], ai: &mut usize) -> bool {
    *pi += 1; // past '['

    let negated = byte_at(pattern, *pi) == b'!';
    if negated {
        *pi += 1;
    }

    let mut matched = negated;
    while byte_at(pattern, *pi) != b']' {
        if byte_at(pattern, *pi) == b'/' || byte_at(pattern, *pi) == 0 {
            return false; // unbalanced brackets
        }
        if byte_at(pattern, *pi + 1) == b'-' && byte_at(pattern, *pi + 2) != b']' {
            if byte_at(pattern, *pi + 2) == b'/' || byte_at(pattern, *pi + 2) == 0 {
                return false; // unbalanced brackets
            }
            let mut lower = pattern[*pi];
            let mut upper = byte_at(pattern, *pi + 2);
            if lower > upper {
                std::mem::swap(&mut lower, &mut upper);
            }
            let addr_char = byte_at(address, *ai);
            if addr_char >= lower && addr_char <= upper {
                matched = !negated;
            }
            *pi += 3;
        } else {
            if pattern[*pi] == byte_at(address, *ai) {
                matched = !negated;
            }
            *pi += 1;
        }
    }
    *pi += 1; // past ']'
    *ai += 1; // past matched address character
    matched
}

fn match_curly_braces(
    pattern: &[u8],
    pi: &mut usize,
    address: &[u8],
    ai: &mut usize,
    is_partial: bool,
) -> bool {
    let mut end_of_substring = *pi;
    let mut matched_substring_length: usize = 0;
    let mut matched = false;

    while byte_at(pattern, *pi) != b'}' {
        if byte_at(pattern, *pi) == b'/' || byte_at(pattern, *pi) == 0 {
            return false; // unbalanced curly braces
        }
        while byte_at(pattern, end_of_substring) != b',' && byte_at(pattern, end_of_substring) != b'}' {
            if byte_at(pattern, end_of_substring) == b'/' || byte_at(pattern, end_of_substring) == 0 {
                return false; // unbalanced curly braces
            }
            end_of_substring += 1;
        }

        *pi += 1; // past '{' or ','
        let mut sub_len = end_of_substring.saturating_sub(*pi);
        if is_partial {
            let remaining_address = address.len().saturating_sub(*ai);
            if sub_len > remaining_address {
                sub_len = remaining_address;
            }
        }

        if bytes_eq_padded(pattern, *pi, address, *ai, sub_len) {
            matched = true;
            if sub_len > matched_substring_length {
                matched_substring_length = sub_len;
            }
        }
        *pi = end_of_substring; // next ',' or '}'
        end_of_substring += 1;
    }
    *pi += 1; // past final '}'
    *ai += matched_substring_length;
    matched
}

/// Compares `len` bytes starting at the two offsets, treating out-of-range
/// reads as `0` (mirrors `strncmp` against null-terminated strings).
fn bytes_eq_padded(a: &[u8], a_off: usize, b: &[u8], b_off: usize, len: usize) -> bool {
    (0..len).all(|k| byte_at(a, a_off + k) == byte_at(b, b_off + k))
}

/// True iff `pattern` contains none of `?`, `*`, `[`, `{`.
pub fn is_literal(pattern: &str) -> bool {
    !pattern.bytes().any(is_special)
}

/// Number of `/`-delimited parts in an address or address pattern.
pub fn number_of_parts(s: &str) -> u32 {
    s.bytes().filter(|&b| b == b'/').count() as u32
}

/// Returns the part at `index` (0-based) of an address or address pattern --
/// the substring between the `index`-th and `(index+1)`-th `/`, or after the
/// last `/` if `index` is the final part. Borrows from `s`, so (unlike the
/// source's `OscAddressGetPartAtIndex`) there is no destination buffer and
/// no `DestinationTooSmall` outcome -- see DESIGN.md.
pub fn part_at_index(s: &str, index: u32) -> Result<&str, OscError> {
    let bytes = s.as_bytes();
    let mut part_count = 0u32;
    let mut i = 0usize;
    while part_count < index + 1 {
        let mut found = false;
        while i < bytes.len() {
            if bytes[i] == b'/' {
                part_count += 1;
                i += 1;
                found = true;
                break;
            }
            i += 1;
        }
        if !found {
            debug!(error = %OscError::NotEnoughPartsInAddressPattern, index, "not enough '/'-delimited parts in address pattern");
            return Err(OscError::NotEnoughPartsInAddressPattern);
        }
    }
    let start = i;
    while i < bytes.len() && bytes[i] != b'/' {
        i += 1;
    }
    Ok(&s[start..i])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_match() {
        assert!(match_full("/foo/bar", "/foo/bar"));
        assert!(!match_full("/foo/bar", "/foo/baz"));
        assert!(!match_full("/foo/bar", "/foo/bar/baz"));
    }

    #[test]
    fn question_mark() {
        assert!(match_full("/foo/?ar", "/foo/bar"));
        assert!(match_full("/foo/?ar", "/foo/car"));
        assert!(!match_full("/foo/?ar", "/foo/ar"));
    }

    // Scenario E.
    #[test]
    fn star_scoped_to_part() {
        assert!(match_full("/colour/b*", "/colour/blue"));
        assert!(match_full("/colour/b*", "/colour/black"));
        assert!(match_full("/colour/b*", "/colour/brown"));
        assert!(!match_full("/colour/b*", "/colour/green"));
        assert!(!match_full("/colour/b*", "/colour/b/x"));
    }

    // Scenario F.
    #[test]
    fn bracket_range_with_negation() {
        assert!(match_full("/abc[!d-hijkp-l]qrst", "/abcAqrst"));
        assert!(!match_full("/abc[!d-hijkp-l]qrst", "/abcequrst"));
    }

    // Scenario G.
    #[test]
    fn curly_braces_longest_match() {
        assert!(match_full("/{in,out,}puts", "/inputs"));
        assert!(match_full("/{in,out,}puts", "/outputs"));
        assert!(match_full("/{in,out,}puts", "/puts"));
    }

    #[test]
    fn partial_match() {
        assert!(match_partial("/inputs/digital", "/inputs"));
        assert!(!match_partial("/inputs/digital", "/outputs"));
    }

    #[test]
    fn is_literal_predicate() {
        assert!(is_literal("/foo/bar"));
        assert!(!is_literal("/foo/*"));
        assert!(!is_literal("/foo/[ab]"));
    }

    #[test]
    fn parts() {
        assert_eq!(number_of_parts("/example/address/pattern"), 3);
        assert_eq!(part_at_index("/example/address/pattern", 0).unwrap(), "example");
        assert_eq!(part_at_index("/example/address/pattern", 2).unwrap(), "pattern");
        assert!(part_at_index("/example/address/pattern", 3).is_err());
    }
}
