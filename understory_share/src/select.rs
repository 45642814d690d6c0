// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The candidate selection algorithm.
//!
//! A sharer node can expose several competing value offers for the same share
//! (direct registrations, re-registrations, alias-derived registrations).
//! [`select_value`] deterministically picks one winner.
//!
//! ## Precedence
//!
//! Candidates are evaluated **right-to-left**: later registrations shadow
//! earlier ones at equal standing.
//!
//! 1. The first [`Candidate::Bare`] encountered scanning from the end wins
//!    outright, regardless of any detailed candidate's priority. A bare
//!    candidate is a directly-declared value, and a direct declaration beats
//!    anything carrying priority metadata (typically an alias-derived or
//!    explicitly down-ranked offer).
//! 2. Otherwise, among [`Candidate::Detailed`] entries, the smallest priority
//!    number wins; ties go to the candidate encountered first in the
//!    right-to-left scan, i.e. the later-declared among equals.
//! 3. No candidates: no value.
//!
//! The bare/detailed asymmetry is deliberate and load-bearing: alias
//! precedence and multi-registration shadowing both derive from it. Do not
//! regularize it.

use core::fmt;

/// A prioritized value offer.
///
/// Lower `priority` numbers take precedence. Priority `0` is reserved for
/// bare candidates and never appears here when candidates are built through
/// a registrar.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Detailed<T> {
    /// Precedence rank; smaller wins.
    pub priority: u32,
    /// The offered value.
    pub value: T,
}

/// One competing value offer for a `(share, sharer)` pair.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Candidate<T> {
    /// A directly-declared value. Beats every detailed candidate.
    Bare(T),
    /// A value carrying explicit priority metadata.
    Detailed(Detailed<T>),
}

impl<T> Candidate<T> {
    /// Creates a bare candidate.
    #[must_use]
    #[inline]
    pub const fn bare(value: T) -> Self {
        Self::Bare(value)
    }

    /// Creates a detailed candidate with the given priority.
    #[must_use]
    #[inline]
    pub const fn detailed(priority: u32, value: T) -> Self {
        Self::Detailed(Detailed { priority, value })
    }

    /// Returns the offered value, regardless of kind.
    #[must_use]
    #[inline]
    pub const fn value(&self) -> &T {
        match self {
            Self::Bare(value) => value,
            Self::Detailed(detailed) => &detailed.value,
        }
    }

    /// Returns the priority, or `None` for a bare candidate.
    #[must_use]
    #[inline]
    pub const fn priority(&self) -> Option<u32> {
        match self {
            Self::Bare(_) => None,
            Self::Detailed(detailed) => Some(detailed.priority),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Candidate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bare(value) => f.debug_tuple("Bare").field(value).finish(),
            Self::Detailed(detailed) => f
                .debug_tuple("Detailed")
                .field(&detailed.priority)
                .field(&detailed.value)
                .finish(),
        }
    }
}

/// Picks the winning candidate's index, or `None` when `candidates` is empty.
///
/// This is the selection algorithm of [`select_value`], exposed at the index
/// level so callers holding side tables (provider slots, lazily materialized
/// values) can select without materializing every payload.
#[must_use]
pub fn select_index<T>(candidates: &[Candidate<T>]) -> Option<usize> {
    let mut best: Option<(u32, usize)> = None;
    for (index, candidate) in candidates.iter().enumerate().rev() {
        match candidate {
            Candidate::Bare(_) => return Some(index),
            Candidate::Detailed(detailed) => {
                // Strict comparison keeps the later-declared winner on ties:
                // the scan runs right-to-left, so equals never displace.
                if best.is_none_or(|(priority, _)| detailed.priority < priority) {
                    best = Some((detailed.priority, index));
                }
            }
        }
    }
    best.map(|(_, index)| index)
}

/// Picks the winning value among the supplied candidates.
///
/// Pure and deterministic: the same input order always yields the same
/// winner. See the module docs for the precedence rules.
///
/// # Example
///
/// ```rust
/// use understory_share::{Candidate, select_value};
///
/// // A bare value beats a detailed one, wherever it sits.
/// let candidates = [Candidate::detailed(0, "ranked"), Candidate::bare("direct")];
/// assert_eq!(select_value(&candidates), Some(&"direct"));
///
/// // Among detailed candidates, the smallest priority wins.
/// let candidates = [Candidate::detailed(2, "low"), Candidate::detailed(1, "high")];
/// assert_eq!(select_value(&candidates), Some(&"high"));
/// ```
#[must_use]
pub fn select_value<T>(candidates: &[Candidate<T>]) -> Option<&T> {
    select_index(candidates).map(|index| candidates[index].value())
}
