//! Logger and class name abbreviation.
//!
//! # Policies
//! - `full`: name is rendered unchanged
//! - `short`: only the segment after the final `.`
//! - `N` (integer): interior segments are cut to their first character, left
//!   to right, until the name fits in `N` characters
//!
//! Every policy is wrapped in [`CachingAbbreviator`]. Results are kept for the
//! lifetime of the process, which is only acceptable because logger and class
//! names form a small, stable set. Do not feed untrusted keys through it.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

/// Shortens a dotted name for display.
pub trait Abbreviator: Send + Sync + fmt::Debug {
    fn abbreviate(&self, name: &str) -> String;
}

/// Abbreviation policy as read from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AbbreviationPolicy {
    #[default]
    Full,
    Short,
    Length(usize),
}

impl AbbreviationPolicy {
    /// Parse `full`, `short` or an integer target length.
    ///
    /// Negative lengths mean `full` and zero means `short`. Returns `None`
    /// for anything that is neither keyword nor integer.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("full") {
            return Some(AbbreviationPolicy::Full);
        }
        if value.eq_ignore_ascii_case("short") {
            return Some(AbbreviationPolicy::Short);
        }
        let length: i64 = value.parse().ok()?;
        Some(match length {
            n if n < 0 => AbbreviationPolicy::Full,
            0 => AbbreviationPolicy::Short,
            n => AbbreviationPolicy::Length(usize::try_from(n).unwrap_or(usize::MAX)),
        })
    }

    /// Build the memoized abbreviator for this policy.
    pub fn build(self) -> Arc<dyn Abbreviator> {
        match self {
            AbbreviationPolicy::Full => Arc::new(CachingAbbreviator::new(FullName)),
            AbbreviationPolicy::Short => Arc::new(CachingAbbreviator::new(LastSegment)),
            AbbreviationPolicy::Length(target) => {
                Arc::new(CachingAbbreviator::new(FixedLength::new(target)))
            }
        }
    }
}

/// Passthrough.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullName;

impl Abbreviator for FullName {
    fn abbreviate(&self, name: &str) -> String {
        name.to_owned()
    }
}

/// Keeps the text after the final `.`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LastSegment;

impl Abbreviator for LastSegment {
    fn abbreviate(&self, name: &str) -> String {
        match name.rfind('.') {
            Some(idx) => name[idx + 1..].to_owned(),
            None => name.to_owned(),
        }
    }
}

/// Compresses interior segments to one character until the name fits.
///
/// The final segment and every dot are always kept, so the result can still
/// be longer than the target.
#[derive(Debug, Clone, Copy)]
pub struct FixedLength {
    target: usize,
}

impl FixedLength {
    pub fn new(target: usize) -> Self {
        Self { target }
    }
}

impl Abbreviator for FixedLength {
    fn abbreviate(&self, name: &str) -> String {
        let len = name.len();
        if len <= self.target {
            return name.to_owned();
        }
        let Some(last_dot) = name.rfind('.') else {
            return name.to_owned();
        };

        // characters that must go before the name fits
        let mut excess = len - self.target;
        let mut out = String::with_capacity(len);
        let mut rest_start = last_dot;

        for segment_start in segment_starts(&name[..last_dot]) {
            if excess == 0 {
                rest_start = segment_start;
                break;
            }
            let segment_end = name[segment_start..last_dot]
                .find('.')
                .map_or(last_dot, |i| segment_start + i);
            let segment = &name[segment_start..segment_end];
            let keep = segment.chars().next().map_or(0, char::len_utf8);
            out.push_str(&segment[..keep]);
            out.push('.');
            excess = excess.saturating_sub(segment.len() - keep);
            rest_start = segment_end;
        }

        if rest_start == last_dot {
            // every interior segment was compressed; `out` already ends in '.'
            out.push_str(&name[last_dot + 1..]);
        } else {
            out.push_str(&name[rest_start..]);
        }
        out
    }
}

/// Byte offsets at which each dot-separated segment of `prefix` begins.
fn segment_starts(prefix: &str) -> impl Iterator<Item = usize> + '_ {
    std::iter::once(0).chain(prefix.match_indices('.').map(|(i, _)| i + 1))
}

/// Memoizes a delegate abbreviator keyed by the exact input string.
#[derive(Debug)]
pub struct CachingAbbreviator<A> {
    delegate: A,
    cache: DashMap<String, String>,
}

impl<A: Abbreviator> CachingAbbreviator<A> {
    pub fn new(delegate: A) -> Self {
        Self {
            delegate,
            cache: DashMap::new(),
        }
    }

    /// Number of memoized names.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

impl<A: Abbreviator> Abbreviator for CachingAbbreviator<A> {
    fn abbreviate(&self, name: &str) -> String {
        if let Some(hit) = self.cache.get(name) {
            return hit.value().clone();
        }
        self.cache
            .entry(name.to_owned())
            .or_insert_with(|| self.delegate.abbreviate(name))
            .value()
            .clone()
    }
}
