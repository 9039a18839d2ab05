//! Pattern matching implementation.

use std::fmt;
use std::time::Duration;

/// Distinct characters per position in a case-sensitive base58 address.
const CASE_SENSITIVE_CHARS: u64 = 58;

/// Effective characters per position when case is ignored.
const CASE_INSENSITIVE_CHARS: u64 = 34;

/// Rough single-thread generation rate used for time estimates.
const ESTIMATED_KEYS_PER_WORKER_SEC: u64 = 1_000;

/// A prefix/suffix pattern with a case policy.
///
/// The affixes are normalized once at construction; a pattern is immutable
/// for the lifetime of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPattern {
    prefix: String,
    suffix: String,
    case_sensitive: bool,
}

impl SearchPattern {
    /// Creates a new pattern. Either affix may be empty.
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>, case_sensitive: bool) -> Self {
        let normalize = |s: String| if case_sensitive { s } else { s.to_lowercase() };

        Self {
            prefix: normalize(prefix.into()),
            suffix: normalize(suffix.into()),
            case_sensitive,
        }
    }

    /// Pattern constraining only the start of the address.
    pub fn prefix(prefix: impl Into<String>, case_sensitive: bool) -> Self {
        Self::new(prefix, String::new(), case_sensitive)
    }

    /// Pattern constraining only the end of the address.
    pub fn suffix(suffix: impl Into<String>, case_sensitive: bool) -> Self {
        Self::new(String::new(), suffix, case_sensitive)
    }

    pub fn prefix_str(&self) -> &str {
        &self.prefix
    }

    pub fn suffix_str(&self) -> &str {
        &self.suffix
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// True when neither affix constrains the address.
    pub fn is_empty(&self) -> bool {
        self.prefix.is_empty() && self.suffix.is_empty()
    }

    /// Combined number of constrained characters.
    pub fn len(&self) -> usize {
        self.prefix.chars().count() + self.suffix.chars().count()
    }

    /// Tests an address against this pattern.
    #[inline]
    pub fn matches(&self, address: &str) -> bool {
        if self.case_sensitive {
            return address.starts_with(&self.prefix) && address.ends_with(&self.suffix);
        }

        if address.is_ascii() && self.prefix.is_ascii() && self.suffix.is_ascii() {
            return starts_with_ignore_ascii_case(address, &self.prefix)
                && ends_with_ignore_ascii_case(address, &self.suffix);
        }

        let address = address.to_lowercase();
        address.starts_with(&self.prefix) && address.ends_with(&self.suffix)
    }

    /// Expected number of candidates before a match.
    pub fn estimated_attempts(&self) -> u64 {
        let chars = if self.case_sensitive {
            CASE_SENSITIVE_CHARS
        } else {
            CASE_INSENSITIVE_CHARS
        };
        chars.saturating_pow(self.len() as u32)
    }

    /// Expected wall time with `workers` threads at a nominal per-thread rate.
    pub fn estimated_duration(&self, workers: usize) -> Duration {
        let rate = (workers.max(1) as u64).saturating_mul(ESTIMATED_KEYS_PER_WORKER_SEC);
        let secs = self.estimated_attempts() as f64 / rate as f64;
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }

    /// Returns a human-readable difficulty estimate.
    pub fn difficulty_description(&self) -> String {
        let diff = self.estimated_attempts();
        match diff {
            0..=1_000 => "Very Easy (< 1 second)".into(),
            1_001..=100_000 => "Easy (seconds)".into(),
            100_001..=10_000_000 => "Medium (minutes)".into(),
            10_000_001..=1_000_000_000 => "Hard (hours)".into(),
            _ => "Very Hard (days or more)".into(),
        }
    }
}

impl fmt::Display for SearchPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let case = if self.case_sensitive {
            "case-sensitive"
        } else {
            "case-insensitive"
        };
        match (self.prefix.is_empty(), self.suffix.is_empty()) {
            (false, true) => write!(f, "{}… ({})", self.prefix, case),
            (true, false) => write!(f, "…{} ({})", self.suffix, case),
            _ => write!(f, "{}…{} ({})", self.prefix, self.suffix, case),
        }
    }
}

/// Tests `address` against `pattern`. Free-function form of [`SearchPattern::matches`].
#[inline]
pub fn is_match(address: &str, pattern: &SearchPattern) -> bool {
    pattern.matches(address)
}

#[inline]
fn starts_with_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    haystack.len() >= needle.len()
        && haystack.as_bytes()[..needle.len()].eq_ignore_ascii_case(needle.as_bytes())
}

#[inline]
fn ends_with_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    haystack.len() >= needle.len()
        && haystack.as_bytes()[haystack.len() - needle.len()..].eq_ignore_ascii_case(needle.as_bytes())
}
