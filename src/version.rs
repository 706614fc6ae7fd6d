//! Tolerant, SemVer-like ordering of version directory names.
//!
//! Every string is a valid version here: it is cut into segments at the
//! separators of the current phase and compared segment by segment. A `-`
//! moves into the pre-release phase, a `+` into the build-metadata phase.
//!
//! Separator precedence per phase (lowest first):
//!
//! | phase          | order                 |
//! |----------------|-----------------------|
//! | release        | `-` `+` (end) `.`     |
//! | pre-release    | `+` (end) `.`         |
//! | build metadata | (end) `.`             |
//!
//! Note that a bare release sorts *after* its pre-releases and build
//! variants, but before any further `.` segment: `1-a < 1+b < 1 < 1.0`.
//! This differs from SemVer precedence and is kept as-is, since listings
//! sorted by name depend on it.

use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Release,
    PreRelease,
    Build,
}

impl Phase {
    fn separators(self) -> &'static [u8] {
        match self {
            Phase::Release => b".-+",
            Phase::PreRelease => b".+",
            Phase::Build => b".",
        }
    }

    /// Rank of the separator following a segment. `None` means the string ended.
    fn rank(self, separator: Option<u8>) -> usize {
        let order: &[Option<u8>] = match self {
            Phase::Release => &[Some(b'-'), Some(b'+'), None, Some(b'.')],
            Phase::PreRelease => &[Some(b'+'), None, Some(b'.')],
            Phase::Build => &[None, Some(b'.')],
        };
        order
            .iter()
            .position(|s| *s == separator)
            .unwrap_or(order.len())
    }

    fn after(self, separator: u8) -> Phase {
        match separator {
            b'-' if self == Phase::Release => Phase::PreRelease,
            b'+' => Phase::Build,
            _ => self,
        }
    }

    /// Split off the next segment: `(segment, separator, rest)`.
    fn split(self, s: &[u8]) -> (&[u8], Option<u8>, &[u8]) {
        let seps = self.separators();
        match s.iter().position(|b| seps.contains(b)) {
            Some(i) => (&s[..i], Some(s[i]), &s[i + 1..]),
            None => (s, None, &s[s.len()..]),
        }
    }
}

/// Compare two version-like strings.
///
/// Total over all inputs; there is no parse failure.
///
/// ```rust
/// use std::cmp::Ordering;
/// use repoview::version::compare;
///
/// assert_eq!(compare("1.2", "1.10"), Ordering::Less);
/// assert_eq!(compare("1-alpha", "1"), Ordering::Less);
/// assert_eq!(compare("1", "1+build"), Ordering::Greater);
/// ```
pub fn compare(a: &str, b: &str) -> Ordering {
    let (mut a, mut b) = (a.as_bytes(), b.as_bytes());
    let mut phase = Phase::Release;

    loop {
        let (a_seg, a_sep, a_rest) = phase.split(a);
        let (b_seg, b_sep, b_rest) = phase.split(b);

        match compare_segments(a_seg, b_seg) {
            Ordering::Equal => {}
            ord => return ord,
        }

        let (a_sep, b_sep) = match (a_sep, b_sep) {
            (None, None) => return Ordering::Equal,
            (a_sep, b_sep) => match phase.rank(a_sep).cmp(&phase.rank(b_sep)) {
                Ordering::Equal => (a_sep, b_sep),
                ord => return ord,
            },
        };

        // Equal rank means equal separators, and both exist.
        debug_assert_eq!(a_sep, b_sep);
        if let Some(sep) = a_sep {
            phase = phase.after(sep);
        }
        a = a_rest;
        b = b_rest;
    }
}

/// All-digit segments compare numerically and sort before anything else;
/// the rest compare bytewise. An empty segment is not numeric.
fn compare_segments(a: &[u8], b: &[u8]) -> Ordering {
    match (is_numeric(a), is_numeric(b)) {
        (true, true) => compare_numeric(a, b),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.cmp(b),
    }
}

fn is_numeric(s: &[u8]) -> bool {
    !s.is_empty() && s.iter().all(u8::is_ascii_digit)
}

// Digit strings of any length, without overflowing an integer type.
fn compare_numeric(a: &[u8], b: &[u8]) -> Ordering {
    let trim = |s: &[u8]| -> usize { s.iter().take_while(|&&d| d == b'0').count() };
    let a = &a[trim(a)..];
    let b = &b[trim(b)..];
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// A version string ordered by [`compare`].
///
/// Useful as a sort key over `&str` slices: `names.sort_by_key(|n| SemverLike(*n))`.
#[derive(Debug, Clone, Copy)]
pub struct SemverLike<'a>(pub &'a str);

impl PartialEq for SemverLike<'_> {
    fn eq(&self, other: &Self) -> bool {
        compare(self.0, other.0) == Ordering::Equal
    }
}

impl Eq for SemverLike<'_> {}

impl PartialOrd for SemverLike<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SemverLike<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        compare(self.0, other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering::{Equal, Greater, Less};

    #[test]
    fn sorts_mixed_release_and_pre_release_list() {
        let mut versions = vec![
            "1.1", "1.3.0", "1", "1-test.12", "1.1.0", "1.12", "1-test.1", "1-test", "1-test+2",
        ];
        versions.sort_by(|a, b| compare(a, b));
        assert_eq!(
            versions,
            vec!["1-test+2", "1-test", "1-test.1", "1-test.12", "1", "1.1", "1.1.0", "1.3.0", "1.12"]
        );
    }

    #[test]
    fn numeric_segments_compare_as_numbers() {
        assert_eq!(compare("1.2", "1.10"), Less);
        assert_eq!(compare("1.10", "1.2"), Greater);
        assert_eq!(compare("2.0", "10.0"), Less);
    }

    #[test]
    fn separator_precedence_in_release_phase() {
        assert_eq!(compare("1-alpha", "1"), Less);
        assert_eq!(compare("1+build", "1"), Less);
        assert_eq!(compare("1-alpha", "1+build"), Less);
        assert_eq!(compare("1", "1.0"), Less);
    }

    #[test]
    fn build_metadata_is_ordered_after_pre_release() {
        assert_eq!(compare("1-a+1", "1-a+2"), Less);
        assert_eq!(compare("1-a+2", "1-a+2"), Equal);
        assert_eq!(compare("1-a+1", "1-a"), Less);
    }

    #[test]
    fn build_phase_end_sorts_before_dot() {
        assert_eq!(compare("1+a", "1+a.b"), Less);
        // `-` is an ordinary character once in build metadata.
        assert_eq!(compare("1+a-b", "1+a-c"), Less);
    }

    #[test]
    fn pre_release_treats_dash_as_segment_text() {
        assert_eq!(compare("1-rc-1", "1-rc-2"), Less);
        assert_eq!(compare("1-rc-1", "1-rc.1"), Greater);
    }

    #[test]
    fn numeric_sorts_before_non_numeric() {
        assert_eq!(compare("1.0", "1.a"), Less);
        assert_eq!(compare("1.beta", "1.5"), Greater);
        assert_eq!(compare("alpha", "beta"), Less);
    }

    #[test]
    fn empty_and_separator_free_strings() {
        assert_eq!(compare("", ""), Equal);
        assert_eq!(compare("", "a"), Less);
        // The empty segment is not numeric, so numbers sort first.
        assert_eq!(compare("", "1"), Greater);
        assert_eq!(compare("abc", "abd"), Less);
        assert_eq!(compare("20240101", "20231231"), Greater);
    }

    #[test]
    fn leading_zeros_and_huge_numbers() {
        assert_eq!(compare("01", "1"), Equal);
        assert_eq!(compare("01.2", "1.3"), Less);
        assert_eq!(
            compare("1.99999999999999999999999", "1.100000000000000000000000"),
            Less
        );
    }

    #[test]
    fn is_a_total_order_on_sample() {
        let samples = [
            "", "1", "1.0", "1.0.0", "1-a", "1-a.1", "1-a+1", "1+b", "1+b.c", "a", "01", "1..2",
            "1-", "1+", "1.", "-", "+", ".", "1.x-2", "2",
        ];
        for a in samples {
            assert_eq!(compare(a, a), Equal, "reflexive on {a:?}");
            for b in samples {
                assert_eq!(compare(a, b), compare(b, a).reverse(), "antisymmetric on {a:?} {b:?}");
                for c in samples {
                    if compare(a, b) != Greater && compare(b, c) != Greater {
                        assert_ne!(compare(a, c), Greater, "transitive on {a:?} {b:?} {c:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn semver_like_sorts_as_key() {
        let mut names = vec!["1.10", "1.2", "1.2-rc1"];
        names.sort_by_key(|n| SemverLike(*n));
        assert_eq!(names, vec!["1.2-rc1", "1.2", "1.10"]);
    }
}
