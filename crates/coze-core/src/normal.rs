//! # Normal Matcher — Field-Shape Grammar
//!
//! Checks whether the ordered top-level field names of a payload conform
//! to a chain of normalization rules. A permissive bug here lets
//! unexpected extra signed fields through validation, so the matcher is
//! an explicit state machine — a record pointer and a permissive flag,
//! consumed left to right with no backtracking — rather than anything
//! cleverer.
//!
//! ## Transition table
//!
//! Per chain element, at the current record position:
//!
//! - `Extra`: sets the permissive flag. Its field list is informational
//!   and ignored.
//! - `Need`: every listed field must occur somewhere in the remaining
//!   sequence (any order, not necessarily contiguous). The record pointer
//!   does not advance; the permissive flag is set, as if an `Extra`
//!   followed. Empty `Need` is a no-op.
//! - `Canon`: the next n fields must equal the list exactly, in order.
//!   With the flag set, matching first skips ahead to the first
//!   occurrence of the list's first field. Advances by n, clears the
//!   flag. Empty `Canon` consumes nothing and clears the flag.
//! - `Only`: as `Canon`, but the n fields may appear in any order
//!   (multiset comparison); skip-ahead targets the first field belonging
//!   to the list.
//! - `Option`: consumes the consecutive run of fields belonging to the
//!   list; absent optional fields are never a failure. With the flag set,
//!   matching first skips ahead to the first field in the list — and when
//!   no such field exists the element is a no-op that preserves the flag.
//!   Clears the flag otherwise. Empty `Option` is a no-op.
//!
//! The chain matches when, after its last element, either every field was
//! consumed or the permissive flag is still set. A failed `Canon`/`Only`
//! never retries at another offset.

/// One normalization rule: a field-name list tagged with its matching
/// kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Norm {
    /// Ordered, exact, exclusive.
    Canon(Vec<String>),
    /// Unordered, exact, exclusive.
    Only(Vec<String>),
    /// Unordered, optional, exclusive unless chained after `Need`/`Extra`.
    Option(Vec<String>),
    /// Unordered, required, permissive.
    Need(Vec<String>),
    /// Explicit permissive gap marker.
    Extra(Vec<String>),
}

impl Norm {
    /// Ordered, exact, exclusive rule.
    pub fn canon<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Norm::Canon(collect(names))
    }

    /// Unordered, exact, exclusive rule.
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Norm::Only(collect(names))
    }

    /// Unordered, optional rule.
    pub fn option<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Norm::Option(collect(names))
    }

    /// Unordered, required, permissive rule.
    pub fn need<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Norm::Need(collect(names))
    }

    /// Permissive gap marker. The list is informational only.
    pub fn extra<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Norm::Extra(collect(names))
    }
}

fn collect<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names.into_iter().map(Into::into).collect()
}

/// Evaluate a normal chain against an ordered field-name sequence.
///
/// Deterministic and total: left-to-right, bounded by input length, no
/// backtracking.
pub fn is_normal<S: AsRef<str>>(fields: &[S], chain: &[Norm]) -> bool {
    let mut rec = 0usize;
    let mut extra = false;

    for norm in chain {
        match norm {
            Norm::Extra(_) => extra = true,
            Norm::Need(required) => {
                if required.is_empty() {
                    continue;
                }
                let remaining = &fields[rec..];
                let all_present = required
                    .iter()
                    .all(|need| remaining.iter().any(|f| f.as_ref() == need));
                if !all_present {
                    return false;
                }
                extra = true;
            }
            Norm::Canon(required) => {
                if extra && !required.is_empty() {
                    match position_of(&fields[rec..], &required[0]) {
                        Some(offset) => rec += offset,
                        None => return false,
                    }
                }
                if fields.len() - rec < required.len() {
                    return false;
                }
                let window = &fields[rec..rec + required.len()];
                if !window.iter().zip(required).all(|(f, r)| f.as_ref() == r) {
                    return false;
                }
                rec += required.len();
                extra = false;
            }
            Norm::Only(required) => {
                if extra && !required.is_empty() {
                    match position_in_set(&fields[rec..], required) {
                        Some(offset) => rec += offset,
                        None => return false,
                    }
                }
                if fields.len() - rec < required.len() {
                    return false;
                }
                let mut window: Vec<&str> =
                    fields[rec..rec + required.len()].iter().map(AsRef::as_ref).collect();
                window.sort_unstable();
                let mut expected: Vec<&str> = required.iter().map(String::as_str).collect();
                expected.sort_unstable();
                if window != expected {
                    return false;
                }
                rec += required.len();
                extra = false;
            }
            Norm::Option(optional) => {
                if optional.is_empty() {
                    continue;
                }
                if extra {
                    match position_in_set(&fields[rec..], optional) {
                        Some(offset) => rec += offset,
                        // No optional field present: a no-op that keeps
                        // the permissive flag.
                        None => continue,
                    }
                }
                while rec < fields.len()
                    && optional.iter().any(|o| o == fields[rec].as_ref())
                {
                    rec += 1;
                }
                extra = false;
            }
        }
    }

    rec == fields.len() || extra
}

fn position_of<S: AsRef<str>>(fields: &[S], name: &str) -> Option<usize> {
    fields.iter().position(|f| f.as_ref() == name)
}

fn position_in_set<S: AsRef<str>>(fields: &[S], set: &[String]) -> Option<usize> {
    fields
        .iter()
        .position(|f| set.iter().any(|s| s == f.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(fields: &[&str], chain: &[Norm]) -> bool {
        is_normal(fields, chain)
    }

    #[test]
    fn test_canon_exact_order() {
        assert!(check(&["a", "z"], &[Norm::canon(["a", "z"])]));
        assert!(!check(&["a", "z"], &[Norm::canon(["z", "a"])]));
    }

    #[test]
    fn test_canon_exclusive() {
        assert!(!check(&["a", "z", "q"], &[Norm::canon(["a", "z"])]));
        assert!(!check(&["a"], &[Norm::canon(["a", "z"])]));
    }

    #[test]
    fn test_only_order_independent() {
        assert!(check(&["a", "z"], &[Norm::only(["z", "a"])]));
        assert!(check(&["a", "z"], &[Norm::only(["a", "z"])]));
        assert!(!check(&["a", "q"], &[Norm::only(["a", "z"])]));
    }

    #[test]
    fn test_only_exclusive() {
        assert!(!check(&["a", "z", "q"], &[Norm::only(["z", "a"])]));
    }

    #[test]
    fn test_need_permits_extras() {
        assert!(check(&["a", "y", "z"], &[Norm::need(["a"]), Norm::option(["z"])]));
        assert!(check(&["x", "a"], &[Norm::need(["a"])]));
        assert!(!check(&["x", "y"], &[Norm::need(["a"])]));
    }

    #[test]
    fn test_need_any_order_non_contiguous() {
        assert!(check(&["q", "b", "r", "a"], &[Norm::need(["a", "b"])]));
    }

    #[test]
    fn test_option_missing_is_fine() {
        assert!(check(&["a", "z"], &[Norm::canon(["a", "z"]), Norm::option(["b"])]));
    }

    #[test]
    fn test_option_consumes_present() {
        assert!(check(&["a", "b"], &[Norm::canon(["a"]), Norm::option(["b", "c"])]));
        assert!(check(&["a", "c", "b"], &[Norm::canon(["a"]), Norm::option(["b", "c"])]));
    }

    #[test]
    fn test_option_last_is_exclusive() {
        assert!(!check(&["a", "z"], &[Norm::option(["z"])]));
        assert!(!check(&["z", "a"], &[Norm::option(["z"])]));
        assert!(check(&["z"], &[Norm::option(["z"])]));
    }

    #[test]
    fn test_option_keeps_permissiveness_when_absent() {
        // Need set the flag; no optional field exists, so the trailing
        // extras stay permitted.
        assert!(check(&["a", "y"], &[Norm::need(["a"]), Norm::option(["z"])]));
    }

    #[test]
    fn test_empty_canon_only() {
        assert!(check(&[], &[Norm::canon(Vec::<String>::new())]));
        assert!(check(&[], &[Norm::only(Vec::<String>::new())]));
        assert!(!check(&["a"], &[Norm::canon(Vec::<String>::new())]));
        assert!(!check(&["a"], &[Norm::only(Vec::<String>::new())]));
    }

    #[test]
    fn test_empty_need_option_are_noops() {
        assert!(check(&["a"], &[Norm::need(Vec::<String>::new()), Norm::canon(["a"])]));
        assert!(check(&["a"], &[Norm::option(Vec::<String>::new()), Norm::canon(["a"])]));
        // An empty Need does not grant permissiveness.
        assert!(!check(&["a"], &[Norm::need(Vec::<String>::new())]));
    }

    #[test]
    fn test_extra_skips_ahead_for_canon() {
        assert!(check(&["x", "y", "a", "z"], &[Norm::extra(Vec::<String>::new()), Norm::canon(["a", "z"])]));
        assert!(!check(&["x", "z", "a"], &[Norm::extra(Vec::<String>::new()), Norm::canon(["a", "z"])]));
    }

    #[test]
    fn test_extra_skips_ahead_for_only() {
        assert!(check(&["x", "z", "a"], &[Norm::extra(Vec::<String>::new()), Norm::only(["a", "z"])]));
    }

    #[test]
    fn test_trailing_extra_permits_leftovers() {
        assert!(check(&["a", "q", "r"], &[Norm::canon(["a"]), Norm::extra(Vec::<String>::new())]));
    }

    #[test]
    fn test_extra_field_list_ignored() {
        // The list inside Extra does not constrain anything.
        assert!(check(&["a", "q"], &[Norm::canon(["a"]), Norm::extra(["nope"])]));
    }

    #[test]
    fn test_canon_clears_permissiveness() {
        // After a Canon, leftovers are exclusive again.
        assert!(!check(
            &["x", "a", "q"],
            &[Norm::extra(Vec::<String>::new()), Norm::canon(["a"])]
        ));
    }

    #[test]
    fn test_chain_sequencing() {
        assert!(check(
            &["alg", "iat", "tmb", "typ", "msg"],
            &[Norm::canon(["alg", "iat", "tmb", "typ"]), Norm::option(["msg"])]
        ));
        assert!(check(
            &["alg", "iat", "tmb", "typ", "msg"],
            &[Norm::need(["alg", "tmb"]), Norm::extra(Vec::<String>::new())]
        ));
    }

    #[test]
    fn test_empty_fields_empty_chain() {
        assert!(check(&[], &[]));
        // A non-empty sequence with no rules leaves everything unmatched.
        assert!(!check(&["a"], &[]));
    }

    #[test]
    fn test_need_then_canon_no_backtracking() {
        // Need does not consume; the later Canon may still match the same
        // field after a permissive skip.
        assert!(check(&["a"], &[Norm::need(["a"]), Norm::canon(["a"])]));
        // Ordering violations stay violations: the Canon target precedes
        // the skip position only in reverse, and there is no backtracking.
        assert!(!check(&["z", "a"], &[Norm::canon(["a"])]));
    }
}
