// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Watcher bookkeeping.
//!
//! Every push subscription is a record in a slab, indexed by the share it
//! observes (and, for locator watchers, by its consumer node). Mutators mark
//! affected records pending; the board drains the queue at the end of the
//! mutating call, re-running each record against current state and delivering
//! at most one deduplicated emission. Records are taken out of the slab while
//! they run, so a record never observes itself mid-update.

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::fmt;
use hashbrown::HashMap;
use smallvec::SmallVec;

use understory_supply::Supply;

use crate::identity::ShareId;
use crate::locate::LocateOptions;
use crate::registry::Sharers;
use crate::tree::NodeId;
use crate::value::ErasedValue;

pub(crate) type WatchId = u32;

/// What a watcher observes and how it reports.
pub(crate) enum WatchKind {
    /// Registry snapshot changes for one share.
    Sharers {
        share: ShareId,
        last_version: u64,
        cb: Box<dyn FnMut(&Sharers)>,
    },
    /// The resolved value of one `(share, sharer)` pair.
    Value {
        share: ShareId,
        node: NodeId,
        last: Option<ErasedValue>,
        cb: Box<dyn FnMut(Option<&ErasedValue>)>,
    },
    /// The locator resolution for one consumer.
    Locate {
        share: ShareId,
        consumer: NodeId,
        opts: LocateOptions,
        last: Option<(ErasedValue, NodeId)>,
        cb: Box<dyn FnMut(Option<(&ErasedValue, NodeId)>)>,
    },
}

pub(crate) struct WatchRecord {
    pub(crate) supply: Supply,
    pub(crate) queued: bool,
    pub(crate) kind: WatchKind,
}

impl WatchRecord {
    fn share(&self) -> ShareId {
        match &self.kind {
            WatchKind::Sharers { share, .. }
            | WatchKind::Value { share, .. }
            | WatchKind::Locate { share, .. } => *share,
        }
    }

    fn consumer(&self) -> Option<NodeId> {
        match &self.kind {
            WatchKind::Locate { consumer, .. } => Some(*consumer),
            _ => None,
        }
    }
}

/// Slab of watch records plus the pending queue.
#[derive(Default)]
pub(crate) struct Watchers {
    records: Vec<Option<WatchRecord>>,
    free: Vec<WatchId>,
    by_share: HashMap<ShareId, SmallVec<[WatchId; 2]>>,
    by_consumer: HashMap<NodeId, SmallVec<[WatchId; 2]>>,
    pending: VecDeque<WatchId>,
}

impl Watchers {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, record: WatchRecord) -> WatchId {
        let share = record.share();
        let consumer = record.consumer();
        let id = if let Some(id) = self.free.pop() {
            self.records[id as usize] = Some(record);
            id
        } else {
            let id = u32::try_from(self.records.len()).expect("watcher slab overflow");
            self.records.push(Some(record));
            id
        };
        self.by_share.entry(share).or_default().push(id);
        if let Some(consumer) = consumer {
            self.by_consumer.entry(consumer).or_default().push(id);
        }
        id
    }

    /// Takes a record out for a run; [`Self::restore`] puts it back.
    pub(crate) fn take(&mut self, id: WatchId) -> Option<WatchRecord> {
        self.records.get_mut(id as usize).and_then(Option::take)
    }

    pub(crate) fn restore(&mut self, id: WatchId, record: WatchRecord) {
        debug_assert!(self.records[id as usize].is_none(), "restore over a live record");
        self.records[id as usize] = Some(record);
    }

    /// Removes a record permanently, cleaning its index entries.
    pub(crate) fn remove(&mut self, id: WatchId) -> Option<WatchRecord> {
        let record = self.records.get_mut(id as usize).and_then(Option::take)?;
        self.free.push(id);
        if let Some(ids) = self.by_share.get_mut(&record.share()) {
            ids.retain(|entry| *entry != id);
        }
        if let Some(consumer) = record.consumer()
            && let Some(ids) = self.by_consumer.get_mut(&consumer)
        {
            ids.retain(|entry| *entry != id);
        }
        Some(record)
    }

    /// Marks every watcher of `share` pending.
    pub(crate) fn queue_share(&mut self, share: ShareId) {
        let ids: SmallVec<[WatchId; 2]> = self.by_share.get(&share).cloned().unwrap_or_default();
        for id in ids {
            self.enqueue(id);
        }
    }

    /// Marks every locator watcher consuming at `node` pending.
    pub(crate) fn queue_consumer(&mut self, node: NodeId) {
        let ids: SmallVec<[WatchId; 2]> =
            self.by_consumer.get(&node).cloned().unwrap_or_default();
        for id in ids {
            self.enqueue(id);
        }
    }

    fn enqueue(&mut self, id: WatchId) {
        if let Some(Some(record)) = self.records.get_mut(id as usize)
            && !record.queued
        {
            record.queued = true;
            self.pending.push_back(id);
        }
    }

    pub(crate) fn pop_pending(&mut self) -> Option<WatchId> {
        self.pending.pop_front()
    }
}

impl fmt::Debug for Watchers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let live = self.records.iter().filter(|slot| slot.is_some()).count();
        f.debug_struct("Watchers")
            .field("live", &live)
            .field("pending", &self.pending.len())
            .finish()
    }
}
