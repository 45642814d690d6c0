// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The share board: the single-writer world scoped sharing lives in.
//!
//! [`ShareBoard`] owns the share table, the node arena, the sharer registry,
//! every candidate slot, every feed, every watcher, and the supply arena
//! their lifetimes hang on. All mutation is `&mut self` on the one thread
//! driving the UI; change notifications are delivered synchronously, before
//! the mutating call returns.
//!
//! Callbacks receive values only — never the board — so notification-time
//! re-entrancy is structurally impossible.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use core::any::TypeId;
use core::fmt;
use hashbrown::HashMap;
use smallvec::SmallVec;

use understory_supply::{CutSet, Supplies, Supply};

use crate::feed::{Feed, Feeds};
use crate::identity::{Share, ShareId, ShareTable};
use crate::locate::{LocateOptions, find_sharer};
use crate::provide::{CandidateSlot, Provided, ProvidedErased, ProviderFn, Registrar, selection_input};
use crate::registry::{SharerRegistry, Sharers};
use crate::select::select_value;
use crate::tree::{NodeId, NodeStatus, Nodes};
use crate::value::ErasedValue;
use crate::watch::{WatchId, WatchKind, WatchRecord, Watchers};

/// What a supply detaches when cut.
enum Attachment {
    Sharer {
        share: ShareId,
        type_id: TypeId,
        name: Option<Box<str>>,
    },
    Candidate {
        share: ShareId,
        node: NodeId,
    },
    Watch(WatchId),
}

type Namer = Box<dyn Fn(&str) -> String>;

/// The scoped sharing world.
///
/// # Example
///
/// ```rust
/// use understory_share::{LocateOptions, Provided, ShareBoard};
///
/// struct Menu;
/// struct Item;
///
/// let mut board = ShareBoard::new();
/// let accent = board.declare::<u32>("accent");
///
/// let menu = board.insert::<Menu>(None, Some("menu"));
/// let item = board.insert::<Item>(Some(menu), Some("item"));
///
/// let _sharer = board.add_sharer(accent, menu);
/// let _value = board.share_value(accent, menu, |_| Provided::Value(0xFF00FF_u32));
///
/// let resolved = board.locate(accent, item, &LocateOptions::new());
/// assert_eq!(resolved, Some((0xFF00FF, menu)));
/// ```
pub struct ShareBoard {
    table: ShareTable,
    nodes: Nodes,
    registry: SharerRegistry,
    feeds: Feeds,
    candidates: HashMap<(ShareId, NodeId), SmallVec<[CandidateSlot; 2]>>,
    watchers: Watchers,
    supplies: Supplies,
    attachments: HashMap<Supply, SmallVec<[Attachment; 1]>>,
    node_supplies: HashMap<NodeId, SmallVec<[Supply; 2]>>,
    namer: Namer,
}

impl Default for ShareBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl ShareBoard {
    /// Creates a board whose naming function ASCII-lowercases tags.
    #[must_use]
    pub fn new() -> Self {
        Self::with_namer(|tag| tag.to_ascii_lowercase())
    }

    /// Creates a board with a custom naming function.
    ///
    /// The function derives the stable lookup key from a declared tag; it is
    /// applied both when nodes are inserted and when sharer names are
    /// registered, so registry keys and walk keys always agree.
    #[must_use]
    pub fn with_namer(namer: impl Fn(&str) -> String + 'static) -> Self {
        Self {
            table: ShareTable::new(),
            nodes: Nodes::new(),
            registry: SharerRegistry::new(),
            feeds: Feeds::new(),
            candidates: HashMap::new(),
            watchers: Watchers::new(),
            supplies: Supplies::new(),
            attachments: HashMap::new(),
            node_supplies: HashMap::new(),
            namer: Box::new(namer),
        }
    }

    // =========================================================================
    // Share declarations
    // =========================================================================

    /// Declares a share with no aliases.
    ///
    /// # Panics
    ///
    /// Panics if `name` is already declared.
    pub fn declare<T: 'static>(&mut self, name: &'static str) -> Share<T> {
        self.table.register::<T>(name, &[])
    }

    /// Declares a share that also feeds `aliases`, in the given order.
    ///
    /// Registering a value for the new share re-exposes it under each alias
    /// at strictly increasing priorities, so a value arriving only via alias
    /// always loses to the alias target's own direct registration.
    ///
    /// # Panics
    ///
    /// Panics if `name` is already declared.
    pub fn declare_aliasing<T: 'static>(
        &mut self,
        name: &'static str,
        aliases: &[Share<T>],
    ) -> Share<T> {
        let ids: SmallVec<[ShareId; 2]> = aliases.iter().map(|share| share.id()).collect();
        self.table.register::<T>(name, &ids)
    }

    /// Read access to the share table.
    #[must_use]
    pub fn shares(&self) -> &ShareTable {
        &self.table
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    /// Inserts a node of component type `C`.
    ///
    /// The tag is normalized through the naming function. New nodes start
    /// `Connected`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is stale.
    pub fn insert<C: 'static>(&mut self, parent: Option<NodeId>, tag: Option<&str>) -> NodeId {
        let tag = tag.map(|tag| (self.namer)(tag).into_boxed_str());
        self.nodes.insert(parent, tag, TypeId::of::<C>(), false)
    }

    /// Inserts a node rooting a shadow tree under `host`.
    ///
    /// Deep host stepping crosses it like any other parent link; shallow
    /// stepping stops at it.
    ///
    /// # Panics
    ///
    /// Panics if `host` is stale.
    pub fn insert_shadow<C: 'static>(&mut self, host: NodeId, tag: Option<&str>) -> NodeId {
        let tag = tag.map(|tag| (self.namer)(tag).into_boxed_str());
        self.nodes.insert(Some(host), tag, TypeId::of::<C>(), true)
    }

    /// Returns `true` if `node` refers to a live node.
    #[must_use]
    pub fn is_alive(&self, node: NodeId) -> bool {
        self.nodes.is_alive(node)
    }

    /// The node's normalized tag, if any.
    #[must_use]
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.nodes.tag(node)
    }

    /// The node's status; stale handles read as `Disconnected`.
    #[must_use]
    pub fn status(&self, node: NodeId) -> NodeStatus {
        self.nodes.status(node)
    }

    /// Updates a node's structural status.
    ///
    /// A no-op unless the tri-state actually differs; on a real change, the
    /// node's locator subscriptions re-resolve before this returns.
    ///
    /// # Panics
    ///
    /// Panics if `node` is stale.
    pub fn set_status(&mut self, node: NodeId, status: NodeStatus) {
        if self.nodes.set_status(node, status) {
            self.watchers.queue_consumer(node);
            self.flush();
        }
    }

    /// Removes a node: cuts every supply attached to it (registrations and
    /// subscriptions alike), detaches its children, and disconnects the
    /// subtree beneath it.
    ///
    /// # Panics
    ///
    /// Panics if `node` is stale.
    pub fn remove(&mut self, node: NodeId) {
        let affected = self.nodes.remove(node);
        let supplies = self.node_supplies.remove(&node).unwrap_or_default();
        let mut cut = CutSet::new();
        for supply in supplies {
            cut.extend(self.supplies.cut(supply));
        }
        self.sweep(cut);
        for descendant in affected {
            self.watchers.queue_consumer(descendant);
        }
        self.flush();
    }

    // =========================================================================
    // Supplies
    // =========================================================================

    /// Allocates a fresh supply for callers to hang their own lifetimes on.
    #[must_use]
    pub fn supply(&mut self) -> Supply {
        self.supplies.supply()
    }

    /// Returns `true` if `supply` is live.
    #[must_use]
    pub fn is_on(&self, supply: Supply) -> bool {
        self.supplies.is_on(supply)
    }

    /// Returns `true` if `supply` is cut or stale.
    #[must_use]
    pub fn is_off(&self, supply: Supply) -> bool {
        self.supplies.is_off(supply)
    }

    /// Records that `dependent` lives at most as long as `required`.
    ///
    /// If `required` is already off, `dependent` is cut (and swept) now.
    pub fn needs(&mut self, dependent: Supply, required: Supply) {
        let cut = self.supplies.needs(dependent, required);
        self.sweep(cut);
        self.flush();
    }

    /// Cuts a supply, detaching everything registered under it and everything
    /// that declared it required.
    ///
    /// Detachment is synchronous: registry counts drop, candidate slots
    /// disappear, and affected subscribers re-resolve (watchers being cut
    /// receive a final "nothing" if they had exposed a value) before this
    /// returns.
    pub fn cut(&mut self, supply: Supply) {
        let cut = self.supplies.cut(supply);
        self.sweep(cut);
        self.flush();
    }

    // =========================================================================
    // Sharers
    // =========================================================================

    /// Registers `node` as a sharer for `share`, by its type and — when the
    /// node has a tag — by name.
    ///
    /// Returns the registration's lifetime; cutting it decrements the
    /// registry counts (the key disappears at zero).
    ///
    /// # Panics
    ///
    /// Panics if `node` is stale or `share` was forged undeclared.
    pub fn add_sharer<T>(&mut self, share: Share<T>, node: NodeId) -> Supply {
        let name = self.nodes.tag(node).map(Box::from);
        self.add_sharer_record(share.id(), node, name)
    }

    /// Registers `node` as a sharer under an explicit name (normalized
    /// through the naming function), or by type only when `name` is `None`.
    ///
    /// # Panics
    ///
    /// Panics if `node` is stale or `share` was forged undeclared.
    pub fn add_sharer_named<T>(
        &mut self,
        share: Share<T>,
        node: NodeId,
        name: Option<&str>,
    ) -> Supply {
        let name = name.map(|name| (self.namer)(name).into_boxed_str());
        self.add_sharer_record(share.id(), node, name)
    }

    fn add_sharer_record(&mut self, share: ShareId, node: NodeId, name: Option<Box<str>>) -> Supply {
        assert!(
            self.table.get(share).is_some(),
            "share {share:?} is not declared"
        );
        let Some(type_id) = self.nodes.type_id(node) else {
            panic!("node {node:?} is not alive");
        };
        self.registry.add(share, type_id, name.as_deref());
        let supply = self.supplies.supply();
        self.attach(supply, Attachment::Sharer { share, type_id, name });
        self.note_node_supply(node, supply);
        self.watchers.queue_share(share);
        self.flush();
        supply
    }

    /// The current sharer snapshot for `share`.
    ///
    /// Cheap: snapshots are copy-on-write and shared.
    #[must_use]
    pub fn sharers<T>(&self, share: Share<T>) -> Rc<Sharers> {
        self.registry.snapshot(share.id())
    }

    /// Subscribes to sharer snapshots for `share`: the current snapshot is
    /// replayed immediately, then one call per registry mutation.
    pub fn watch_sharers<T, F>(&mut self, share: Share<T>, mut cb: F) -> Supply
    where
        F: FnMut(&Sharers) + 'static,
    {
        let supply = self.supplies.supply();
        let snapshot = self.registry.snapshot(share.id());
        cb(&snapshot);
        let record = WatchRecord {
            supply,
            queued: false,
            kind: WatchKind::Sharers {
                share: share.id(),
                last_version: snapshot.version(),
                cb: Box::new(cb),
            },
        };
        let id = self.watchers.insert(record);
        self.attach(supply, Attachment::Watch(id));
        supply
    }

    // =========================================================================
    // Values
    // =========================================================================

    /// Creates an updatable value cell.
    pub fn feed<T: Clone + PartialEq + 'static>(&mut self, initial: T) -> Feed<T> {
        Feed::from_id(self.feeds.create(ErasedValue::new(initial)))
    }

    /// Pushes a new value into a feed.
    ///
    /// A push carrying a value equal to the current one is a no-op; otherwise
    /// every subscriber downstream of the feed re-resolves before this
    /// returns.
    ///
    /// # Panics
    ///
    /// Panics if `feed` was forged against another board.
    pub fn push<T: Clone + PartialEq + 'static>(&mut self, feed: Feed<T>, value: T) {
        if self.feeds.push(feed.id(), ErasedValue::new(value)) {
            let dependents: SmallVec<[(ShareId, NodeId); 4]> =
                SmallVec::from_slice(self.feeds.dependents(feed.id()));
            for (share, _) in dependents {
                self.watchers.queue_share(share);
            }
            self.flush();
        }
    }

    /// Reads a feed's current value.
    ///
    /// # Panics
    ///
    /// Panics if `feed` was forged against another board or with a different
    /// value type.
    #[must_use]
    pub fn feed_value<T: Clone + PartialEq + 'static>(&self, feed: Feed<T>) -> T {
        let Some(value) = self.feeds.value(feed.id()).downcast_ref::<T>() else {
            panic!("feed {:?} holds a different value type", feed.id());
        };
        value.clone()
    }

    /// Registers a value provider for `(share, node)` as a *bare* candidate
    /// (priority 0): a directly-declared value that outranks every
    /// prioritized one.
    ///
    /// The provider runs lazily, on the first read of the sharer's resolved
    /// value. If `share` declares aliases, the same provider is re-exposed
    /// under each of them at strictly increasing priorities.
    ///
    /// # Panics
    ///
    /// Panics if `node` is stale, or if `share` was forged with a different
    /// value type.
    pub fn share_value<T, F>(&mut self, share: Share<T>, node: NodeId, provider: F) -> Registrar<T>
    where
        T: Clone + PartialEq + 'static,
        F: Fn(NodeId) -> Provided<T> + 'static,
    {
        self.share_value_at(share, node, provider, 0)
    }

    /// Registers a value provider at an explicit priority.
    ///
    /// Priority 0 registers a bare candidate; any other number a detailed one
    /// (smaller wins). Aliases derive `priority + 1`, `priority + 2`, … in
    /// declaration order.
    ///
    /// # Panics
    ///
    /// Panics if `node` is stale, or if `share` was forged with a different
    /// value type.
    pub fn share_value_at<T, F>(
        &mut self,
        share: Share<T>,
        node: NodeId,
        provider: F,
        priority: u32,
    ) -> Registrar<T>
    where
        T: Clone + PartialEq + 'static,
        F: Fn(NodeId) -> Provided<T> + 'static,
    {
        let Some(info) = self.table.get(share.id()) else {
            panic!("share {:?} is not declared", share.id());
        };
        assert_eq!(
            info.type_id(),
            TypeId::of::<T>(),
            "share '{}' was declared with a different value type",
            info.name()
        );
        let aliases: SmallVec<[ShareId; 2]> = SmallVec::from_slice(info.aliases());
        assert!(self.nodes.is_alive(node), "node {node:?} is not alive");

        let provider: Rc<ProviderFn> = Rc::new(move |target| match provider(target) {
            Provided::Value(value) => ProvidedErased::Value(ErasedValue::new(value)),
            Provided::Feed(feed) => ProvidedErased::Feed(feed.id()),
        });
        let supply = self.supplies.supply();
        self.push_candidate(share.id(), node, provider.clone(), priority, supply);
        for (offset, alias) in aliases.into_iter().enumerate() {
            #[expect(clippy::cast_possible_truncation, reason = "alias lists are tiny")]
            let alias_priority = priority + 1 + offset as u32;
            self.push_candidate(alias, node, provider.clone(), alias_priority, supply);
        }
        self.note_node_supply(node, supply);
        self.flush();
        Registrar {
            share,
            node,
            provider,
            default_priority: priority,
            supply,
        }
    }

    /// Registers an already-erased provider under `share`; used by
    /// [`Registrar::share_as`]. A no-op when `supply` is already off.
    pub(crate) fn share_candidate(
        &mut self,
        share: ShareId,
        node: NodeId,
        provider: Rc<ProviderFn>,
        priority: u32,
        supply: Supply,
    ) {
        if self.supplies.is_off(supply) {
            return;
        }
        assert!(
            self.table.get(share).is_some(),
            "share {share:?} is not declared"
        );
        self.push_candidate(share, node, provider, priority, supply);
        self.flush();
    }

    fn push_candidate(
        &mut self,
        share: ShareId,
        node: NodeId,
        provider: Rc<ProviderFn>,
        priority: u32,
        supply: Supply,
    ) {
        self.candidates
            .entry((share, node))
            .or_default()
            .push(CandidateSlot {
                supply,
                priority,
                provider,
                provided: None,
            });
        self.attach(supply, Attachment::Candidate { share, node });
        self.watchers.queue_share(share);
    }

    /// Pulls the resolved value for a `(share, sharer)` pair: every live
    /// candidate through [`select_value`], the winner materialized lazily.
    ///
    /// `&mut self` because the first read may invoke providers.
    pub fn shared<T: Clone + PartialEq + 'static>(
        &mut self,
        share: Share<T>,
        node: NodeId,
    ) -> Option<T> {
        self.resolve_shared_erased(share.id(), node)
            .and_then(|value| value.downcast_ref::<T>().cloned())
    }

    /// Subscribes to the resolved value of a `(share, sharer)` pair: the
    /// current value (possibly `None`) is replayed immediately, then one call
    /// per change, deduplicated by value equality. Cutting the returned
    /// supply delivers a final `None` if a value was exposed.
    pub fn watch_shared<T, F>(&mut self, share: Share<T>, node: NodeId, mut cb: F) -> Supply
    where
        T: Clone + PartialEq + 'static,
        F: FnMut(Option<&T>) + 'static,
    {
        let supply = self.supplies.supply();
        let current = self.resolve_shared_erased(share.id(), node);
        let mut erased: Box<dyn FnMut(Option<&ErasedValue>)> =
            Box::new(move |value| cb(value.and_then(|value| value.downcast_ref::<T>())));
        erased(current.as_ref());
        let record = WatchRecord {
            supply,
            queued: false,
            kind: WatchKind::Value {
                share: share.id(),
                node,
                last: current,
                cb: erased,
            },
        };
        let id = self.watchers.insert(record);
        self.attach(supply, Attachment::Watch(id));
        self.note_node_supply(node, supply);
        supply
    }

    // =========================================================================
    // The locator
    // =========================================================================

    /// Pulls the value `consumer` resolves for `share`: the consumer's own
    /// node under a local mode, otherwise the nearest ancestor registered by
    /// name. Returns the value and the node it came from.
    ///
    /// `&mut self` because the first read may invoke providers.
    pub fn locate<T: Clone + PartialEq + 'static>(
        &mut self,
        share: Share<T>,
        consumer: NodeId,
        opts: &LocateOptions,
    ) -> Option<(T, NodeId)> {
        self.resolve_locate_erased(share.id(), consumer, opts)
            .and_then(|(value, node)| value.downcast_ref::<T>().cloned().map(|value| (value, node)))
    }

    /// Subscribes to the resolution of `share` from `consumer`.
    ///
    /// The current resolution (possibly `None`) is replayed immediately; the
    /// walk re-runs on every registry change for the share, consumer status
    /// change, candidate change, or contributing feed push. Emissions are
    /// deduplicated by value and sharer-node equality, and cutting the
    /// returned supply delivers a final `None` if a value was exposed.
    pub fn value_for<T, F>(
        &mut self,
        share: Share<T>,
        consumer: NodeId,
        opts: LocateOptions,
        mut cb: F,
    ) -> Supply
    where
        T: Clone + PartialEq + 'static,
        F: FnMut(Option<(&T, NodeId)>) + 'static,
    {
        let supply = self.supplies.supply();
        let current = self.resolve_locate_erased(share.id(), consumer, &opts);
        let mut erased: Box<dyn FnMut(Option<(&ErasedValue, NodeId)>)> =
            Box::new(move |resolved| {
                cb(resolved.and_then(|(value, node)| {
                    value.downcast_ref::<T>().map(|value| (value, node))
                }));
            });
        erased(current.as_ref().map(|(value, node)| (value, *node)));
        let record = WatchRecord {
            supply,
            queued: false,
            kind: WatchKind::Locate {
                share: share.id(),
                consumer,
                opts,
                last: current,
                cb: erased,
            },
        };
        let id = self.watchers.insert(record);
        self.attach(supply, Attachment::Watch(id));
        self.note_node_supply(consumer, supply);
        supply
    }

    // =========================================================================
    // Resolution internals
    // =========================================================================

    fn resolve_shared_erased(&mut self, share: ShareId, node: NodeId) -> Option<ErasedValue> {
        let slots = self.candidates.get(&(share, node))?;
        let input = selection_input(slots);
        let winner = *select_value(&input)?;

        if slots[winner].provided.is_none() {
            // Lazy materialization: the provider is shared via `Rc`, so the
            // borrow of the slot list ends before it runs.
            let provider = slots[winner].provider.clone();
            let provided = provider(node);
            if let ProvidedErased::Feed(feed) = &provided {
                self.feeds.add_dependent(*feed, (share, node));
            }
            let slots = self
                .candidates
                .get_mut(&(share, node))
                .expect("candidate list vanished during materialization");
            slots[winner].provided = Some(provided);
        }

        let slots = self.candidates.get(&(share, node))?;
        match slots[winner].provided.as_ref()? {
            ProvidedErased::Value(value) => Some(value.clone()),
            ProvidedErased::Feed(feed) => Some(self.feeds.value(*feed).clone()),
        }
    }

    fn resolve_locate_erased(
        &mut self,
        share: ShareId,
        consumer: NodeId,
        opts: &LocateOptions,
    ) -> Option<(ErasedValue, NodeId)> {
        // A consumer outside the tree (or already torn down) resolves to
        // nothing; this is absence, not an error.
        if self.nodes.status(consumer) == NodeStatus::Disconnected {
            return None;
        }
        let snapshot = self.registry.snapshot(share);
        let sharer = find_sharer(&self.nodes, &snapshot, consumer, opts)?;
        let value = self.resolve_shared_erased(share, sharer)?;
        Some((value, sharer))
    }

    // =========================================================================
    // Change delivery
    // =========================================================================

    fn attach(&mut self, supply: Supply, attachment: Attachment) {
        self.attachments.entry(supply).or_default().push(attachment);
    }

    fn note_node_supply(&mut self, node: NodeId, supply: Supply) {
        self.node_supplies.entry(node).or_default().push(supply);
    }

    /// Applies the detachments for a set of freshly cut supplies.
    fn sweep(&mut self, cut: CutSet) {
        for supply in cut {
            let Some(attachments) = self.attachments.remove(&supply) else {
                continue;
            };
            for attachment in attachments {
                match attachment {
                    Attachment::Sharer { share, type_id, name } => {
                        self.registry.remove(share, type_id, name.as_deref());
                        self.watchers.queue_share(share);
                    }
                    Attachment::Candidate { share, node } => {
                        let mut now_empty = false;
                        if let Some(slots) = self.candidates.get_mut(&(share, node)) {
                            let feeds = &mut self.feeds;
                            slots.retain(|slot| {
                                if slot.supply == supply {
                                    if let Some(ProvidedErased::Feed(feed)) = &slot.provided {
                                        feeds.remove_dependent(*feed, (share, node));
                                    }
                                    false
                                } else {
                                    true
                                }
                            });
                            now_empty = slots.is_empty();
                        }
                        if now_empty {
                            self.candidates.remove(&(share, node));
                        }
                        self.watchers.queue_share(share);
                    }
                    Attachment::Watch(id) => {
                        if let Some(record) = self.watchers.remove(id) {
                            finish_watch(record);
                        }
                    }
                }
            }
        }
    }

    /// Drains the pending queue, re-running each watcher against current
    /// state. Records are taken out while they run, and callbacks never see
    /// the board, so a run cannot schedule further work: the queue only
    /// shrinks.
    fn flush(&mut self) {
        while let Some(id) = self.watchers.pop_pending() {
            let Some(mut record) = self.watchers.take(id) else {
                continue;
            };
            record.queued = false;
            self.run_watch(&mut record);
            self.watchers.restore(id, record);
        }
    }

    fn run_watch(&mut self, record: &mut WatchRecord) {
        match &mut record.kind {
            WatchKind::Sharers { share, last_version, cb } => {
                let snapshot = self.registry.snapshot(*share);
                if snapshot.version() != *last_version {
                    *last_version = snapshot.version();
                    cb(&snapshot);
                }
            }
            WatchKind::Value { share, node, last, cb } => {
                let current = self.resolve_shared_erased(*share, *node);
                if current != *last {
                    *last = current;
                    cb(last.as_ref());
                }
            }
            WatchKind::Locate { share, consumer, opts, last, cb } => {
                let current = self.resolve_locate_erased(*share, *consumer, opts);
                if current != *last {
                    *last = current;
                    cb(last.as_ref().map(|(value, node)| (value, *node)));
                }
            }
        }
    }
}

/// Delivers the final "nothing" to a watcher being detached.
fn finish_watch(mut record: WatchRecord) {
    match &mut record.kind {
        WatchKind::Sharers { .. } => {}
        WatchKind::Value { last, cb, .. } => {
            if last.is_some() {
                cb(None);
            }
        }
        WatchKind::Locate { last, cb, .. } => {
            if last.is_some() {
                cb(None);
            }
        }
    }
}

impl fmt::Debug for ShareBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShareBoard")
            .field("shares", &self.table.len())
            .field("nodes", &self.nodes.len())
            .field("supplies", &self.supplies.live())
            .field("watchers", &self.watchers)
            .finish()
    }
}
