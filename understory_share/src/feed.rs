// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Updatable value cells.
//!
//! A provider that wants its shared value to change over time returns a
//! [`Feed<T>`] instead of a snapshot. Pushing into the feed propagates
//! through selection to every downstream subscriber.

use alloc::vec::Vec;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;
use smallvec::SmallVec;

use crate::identity::ShareId;
use crate::tree::NodeId;
use crate::value::ErasedValue;

/// A runtime feed identifier.
///
/// Feeds live for the owning board's lifetime, so the handle is a plain
/// index with no generation.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeedId(u32);

impl FeedId {
    pub(crate) const fn new(index: u32) -> Self {
        Self(index)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for FeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FeedId").field(&self.0).finish()
    }
}

/// A type-safe feed key with phantom type for compile-time checking.
///
/// Same layout as [`FeedId`]; the phantom parameter ties pushes and reads to
/// the value type the feed was created with.
pub struct Feed<T> {
    id: FeedId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Feed<T> {
    pub(crate) const fn from_id(id: FeedId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    /// Returns the underlying feed ID.
    #[must_use]
    #[inline]
    pub const fn id(self) -> FeedId {
        self.id
    }
}

// Manual trait implementations to avoid requiring T: Clone, etc.

impl<T> Copy for Feed<T> {}

impl<T> Clone for Feed<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for Feed<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Feed<T> {}

impl<T> Hash for Feed<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for Feed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Feed")
            .field("id", &self.id)
            .field("type", &core::any::type_name::<T>())
            .finish()
    }
}

struct FeedSlot {
    value: ErasedValue,
    /// `(share, sharer)` slots this feed has materialized into. Pushes
    /// re-resolve exactly these.
    dependents: SmallVec<[(ShareId, NodeId); 1]>,
}

/// Storage for all feeds of a board.
#[derive(Default)]
pub(crate) struct Feeds {
    slots: Vec<FeedSlot>,
}

impl Feeds {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn create(&mut self, initial: ErasedValue) -> FeedId {
        let index = u32::try_from(self.slots.len()).expect("feed index overflow");
        self.slots.push(FeedSlot {
            value: initial,
            dependents: SmallVec::new(),
        });
        FeedId::new(index)
    }

    pub(crate) fn value(&self, feed: FeedId) -> &ErasedValue {
        &self.slots[feed.idx()].value
    }

    /// Replaces the feed's value. Returns `false` when the new value equals
    /// the current one, so equal pushes propagate nothing.
    pub(crate) fn push(&mut self, feed: FeedId, value: ErasedValue) -> bool {
        let slot = &mut self.slots[feed.idx()];
        if slot.value == value {
            return false;
        }
        slot.value = value;
        true
    }

    pub(crate) fn add_dependent(&mut self, feed: FeedId, key: (ShareId, NodeId)) {
        let dependents = &mut self.slots[feed.idx()].dependents;
        if !dependents.contains(&key) {
            dependents.push(key);
        }
    }

    pub(crate) fn remove_dependent(&mut self, feed: FeedId, key: (ShareId, NodeId)) {
        self.slots[feed.idx()].dependents.retain(|entry| *entry != key);
    }

    pub(crate) fn dependents(&self, feed: FeedId) -> &[(ShareId, NodeId)] {
        &self.slots[feed.idx()].dependents
    }
}

impl fmt::Debug for Feeds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Feeds").field("count", &self.slots.len()).finish()
    }
}
