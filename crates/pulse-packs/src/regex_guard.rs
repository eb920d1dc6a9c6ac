//! Safety checks for pack-supplied patterns.
//!
//! Packs are operator-authored but still untrusted input to the match loop:
//! a single pathological pattern must not be able to stall derivation.
//! Rejection happens here, at validation time, so unsafe patterns never
//! reach a match attempt. The deriver's per-match timeout is the second
//! layer.

use pulse_core::constants;

/// Why a pattern was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
    /// Pattern exceeds the hard length limit.
    TooLong { length: usize, max: usize },
    /// A quantified group itself contains a quantifier (e.g. `(a+)+`),
    /// the classic catastrophic-backtracking shape.
    NestedQuantifier { at: usize },
    /// The pattern does not compile.
    Compile { message: String },
}

impl GuardError {
    pub fn reason(&self) -> String {
        match self {
            Self::TooLong { length, max } => format!("{length} chars exceeds the {max} char limit"),
            Self::NestedQuantifier { at } => {
                format!("nested quantifier at byte offset {at}")
            }
            Self::Compile { message } => message.clone(),
        }
    }
}

/// Validate one pattern: length limit, nested-quantifier shape, compiles.
pub fn check(pattern: &str) -> Result<(), GuardError> {
    if pattern.len() > constants::MAX_PATTERN_LEN {
        return Err(GuardError::TooLong {
            length: pattern.len(),
            max: constants::MAX_PATTERN_LEN,
        });
    }

    if let Some(at) = nested_quantifier(pattern) {
        return Err(GuardError::NestedQuantifier { at });
    }

    regex::Regex::new(pattern)
        .map(|_| ())
        .map_err(|e| GuardError::Compile {
            message: e.to_string(),
        })
}

/// Scan for a quantifier applied to a group that itself contains a
/// quantifier. Returns the byte offset of the outer quantifier.
///
/// The scan is conservative: escapes are skipped, character classes are
/// opaque, and any of `* + ? {` counts as a quantifier. False positives on
/// exotic-but-safe patterns are acceptable; false negatives are not.
fn nested_quantifier(pattern: &str) -> Option<usize> {
    // One bool per open group: has a quantifier been seen inside it?
    let mut group_stack: Vec<bool> = Vec::new();
    // Set when the previous token was `)` closing a group that contained a
    // quantifier; a quantifier right after it is the dangerous shape.
    let mut closed_quantified_group = false;

    let bytes = pattern.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 1; // skip the escaped byte
                closed_quantified_group = false;
            }
            b'[' => {
                // Skip the character class; ']' as the first member is literal.
                i += 1;
                if i < bytes.len() && bytes[i] == b'^' {
                    i += 1;
                }
                if i < bytes.len() && bytes[i] == b']' {
                    i += 1;
                }
                while i < bytes.len() && bytes[i] != b']' {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
                closed_quantified_group = false;
            }
            b'(' => {
                group_stack.push(false);
                closed_quantified_group = false;
                // `(?` starts a group modifier (flags, non-capturing, named);
                // that `?` is not a quantifier.
                if i + 1 < bytes.len() && bytes[i + 1] == b'?' {
                    i += 1;
                }
            }
            b')' => {
                let inner = group_stack.pop().unwrap_or(false);
                // A quantified inner group taints the enclosing group too:
                // ((a+))+ is as dangerous as (a+)+.
                if inner {
                    if let Some(outer) = group_stack.last_mut() {
                        *outer = true;
                    }
                }
                closed_quantified_group = inner;
                i += 1;
                continue;
            }
            b'*' | b'+' | b'?' | b'{' => {
                if closed_quantified_group {
                    return Some(i);
                }
                if let Some(top) = group_stack.last_mut() {
                    *top = true;
                }
                closed_quantified_group = false;
            }
            _ => {
                closed_quantified_group = false;
            }
        }
        i += 1;
    }
    None
}
