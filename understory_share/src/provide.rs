// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Value providers and the registrar handle.
//!
//! A sharer registers a *provider*: a closure invoked lazily, on the first
//! read of the sharer's resolved value, producing either a fixed value or a
//! [`Feed`] that keeps updating. The returned [`Registrar`] re-exposes the
//! same provider under other shares ([`Registrar::share_as`]), which is how
//! aliasing is built.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use understory_supply::Supply;

use crate::board::ShareBoard;
use crate::feed::{Feed, FeedId};
use crate::identity::{Share, ShareId};
use crate::select::Candidate;
use crate::tree::NodeId;
use crate::value::ErasedValue;

/// What a provider returns.
pub enum Provided<T> {
    /// A fixed value.
    Value(T),
    /// An updating value; pushes into the feed propagate to subscribers.
    Feed(Feed<T>),
}

impl<T: fmt::Debug> fmt::Debug for Provided<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Feed(feed) => f.debug_tuple("Feed").field(feed).finish(),
        }
    }
}

/// Type-erased provider result.
pub(crate) enum ProvidedErased {
    Value(ErasedValue),
    Feed(FeedId),
}

/// Type-erased provider closure, shared between the registrations it feeds.
pub(crate) type ProviderFn = dyn Fn(NodeId) -> ProvidedErased;

/// One registered value offer for a `(share, sharer)` pair.
pub(crate) struct CandidateSlot {
    /// The registration's lifetime; cutting it removes the slot.
    pub(crate) supply: Supply,
    /// 0 registers a bare candidate; anything else a detailed one.
    pub(crate) priority: u32,
    pub(crate) provider: Rc<ProviderFn>,
    /// Cached provider result after the first read.
    pub(crate) provided: Option<ProvidedErased>,
}

/// Handle returned by [`ShareBoard::share_value`].
///
/// Carries the registered provider so the same value can be re-exposed under
/// other shares, and the [`Supply`] that revokes everything this handle
/// registered.
///
/// Priority `0` (the default) registers a *bare* candidate — a
/// directly-declared value that outranks every prioritized one. Any other
/// priority registers a *detailed* candidate ranked by its number (smaller
/// wins). See [`select_value`](crate::select_value) for the exact rules.
pub struct Registrar<T> {
    pub(crate) share: Share<T>,
    pub(crate) node: NodeId,
    pub(crate) provider: Rc<ProviderFn>,
    pub(crate) default_priority: u32,
    pub(crate) supply: Supply,
}

impl<T: Clone + PartialEq + 'static> Registrar<T> {
    /// The share this registrar was created for.
    #[must_use]
    #[inline]
    pub fn share(&self) -> Share<T> {
        self.share
    }

    /// The sharer node the provider is registered on.
    #[must_use]
    #[inline]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The priority used when none is given explicitly.
    #[must_use]
    #[inline]
    pub fn default_priority(&self) -> u32 {
        self.default_priority
    }

    /// The lifetime of every registration made through this handle.
    #[must_use]
    #[inline]
    pub fn supply(&self) -> Supply {
        self.supply
    }

    /// Derives a handle with a different default priority.
    ///
    /// Registrations already made are unaffected; the derived handle shares
    /// the same provider and supply.
    #[must_use]
    pub fn with_priority(&self, priority: u32) -> Self {
        Self {
            default_priority: priority,
            ..self.clone()
        }
    }

    /// Re-exposes the same provider under `alias` at the default priority.
    ///
    /// No-op when this registrar's supply is already off.
    pub fn share_as(&self, board: &mut ShareBoard, alias: Share<T>) {
        self.share_as_at(board, alias, self.default_priority);
    }

    /// Re-exposes the same provider under `alias` at the given priority.
    ///
    /// Priority `0` registers a bare candidate. No-op when this registrar's
    /// supply is already off.
    pub fn share_as_at(&self, board: &mut ShareBoard, alias: Share<T>, priority: u32) {
        board.share_candidate(alias.id(), self.node, self.provider.clone(), priority, self.supply);
    }
}

impl<T> Clone for Registrar<T> {
    fn clone(&self) -> Self {
        Self {
            share: self.share,
            node: self.node,
            provider: self.provider.clone(),
            default_priority: self.default_priority,
            supply: self.supply,
        }
    }
}

impl<T> fmt::Debug for Registrar<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registrar")
            .field("share", &self.share.id())
            .field("node", &self.node)
            .field("default_priority", &self.default_priority)
            .field("supply", &self.supply)
            .finish_non_exhaustive()
    }
}

/// Builds the selection input for a candidate list: registration order is
/// preserved, priorities map `0` to bare and anything else to detailed.
pub(crate) fn selection_input(slots: &[CandidateSlot]) -> Vec<Candidate<usize>> {
    slots
        .iter()
        .enumerate()
        .map(|(index, slot)| {
            if slot.priority == 0 {
                Candidate::bare(index)
            } else {
                Candidate::detailed(slot.priority, index)
            }
        })
        .collect()
}
