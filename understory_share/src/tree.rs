// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The node arena the resolution algorithm runs against.
//!
//! Nodes carry exactly what scoped resolution needs: a parent link, a
//! normalized tag, a component type, a structural status, and a shadow-root
//! marker. Geometry, rendering, and widget state belong to other layers.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::TypeId;
use core::fmt;
use smallvec::SmallVec;

/// Identifier for a node in the tree.
///
/// This is a small, copyable handle that stays stable across updates but
/// becomes invalid when the underlying slot is reused.
/// It consists of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On remove, the slot is freed; any existing `NodeId` that pointed to that
///   slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a
///   new, distinct `NodeId`.
///
/// Stale `NodeId`s never alias a different live node because the generation
/// must match. Read accessors treat stale handles as absence; mutators panic.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Structural readiness of a node.
///
/// Consumers only resolve shared values while their position in the tree is
/// stable: a `Disconnected` consumer resolves to nothing, while `Settled` and
/// `Connected` both resolve. Toggling between the latter two re-runs the
/// ancestor walk, but emission dedup keeps the result quiet when nothing else
/// changed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeStatus {
    /// The node is outside the tree (or its handle is stale).
    Disconnected = 0,
    /// The node's position is stable but it is not fully connected yet.
    Settled = 1,
    /// The node is connected to the tree.
    Connected = 2,
}

struct NodeSlot {
    generation: u32,
    live: bool,
    parent: Option<NodeId>,
    children: SmallVec<[NodeId; 4]>,
    tag: Option<Box<str>>,
    type_id: TypeId,
    status: NodeStatus,
    shadow_root: bool,
}

/// Arena of node slots.
///
/// Structure is fixed at insert time: a node's parent never changes, and
/// removal detaches the node's children rather than re-parenting them.
#[derive(Default)]
pub(crate) struct Nodes {
    slots: Vec<NodeSlot>,
    free: Vec<u32>,
    live: usize,
}

impl Nodes {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.live
    }

    /// Inserts a node. The tag must already be normalized by the caller.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is stale.
    pub(crate) fn insert(
        &mut self,
        parent: Option<NodeId>,
        tag: Option<Box<str>>,
        type_id: TypeId,
        shadow_root: bool,
    ) -> NodeId {
        if let Some(parent) = parent {
            assert!(self.is_alive(parent), "parent {parent:?} is not alive");
        }
        self.live += 1;
        let id = if let Some(idx) = self.free.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.generation += 1;
            slot.live = true;
            slot.parent = parent;
            slot.tag = tag;
            slot.type_id = type_id;
            slot.status = NodeStatus::Connected;
            slot.shadow_root = shadow_root;
            debug_assert!(slot.children.is_empty(), "freed slot kept children");
            NodeId::new(idx, slot.generation)
        } else {
            let idx = u32::try_from(self.slots.len()).expect("node slot index overflow");
            self.slots.push(NodeSlot {
                generation: 1,
                live: true,
                parent,
                children: SmallVec::new(),
                tag,
                type_id,
                status: NodeStatus::Connected,
                shadow_root,
            });
            NodeId::new(idx, 1)
        };
        if let Some(parent) = parent {
            self.slots[parent.idx()].children.push(id);
        }
        id
    }

    /// Removes a node, detaching its children and disconnecting the subtree
    /// beneath it.
    ///
    /// Returns the still-live nodes whose status changed (the detached
    /// descendants), so the caller can re-resolve their watchers.
    ///
    /// # Panics
    ///
    /// Panics if `node` is stale.
    pub(crate) fn remove(&mut self, node: NodeId) -> SmallVec<[NodeId; 8]> {
        assert!(self.is_alive(node), "node {node:?} is not alive");

        if let Some(parent) = self.slots[node.idx()].parent {
            self.slots[parent.idx()].children.retain(|child| *child != node);
        }

        let mut affected = SmallVec::new();
        let children = core::mem::take(&mut self.slots[node.idx()].children);
        let mut stack: SmallVec<[NodeId; 8]> = SmallVec::new();
        for child in children {
            self.slots[child.idx()].parent = None;
            stack.push(child);
        }
        while let Some(next) = stack.pop() {
            let slot = &mut self.slots[next.idx()];
            if slot.status != NodeStatus::Disconnected {
                slot.status = NodeStatus::Disconnected;
                affected.push(next);
            }
            stack.extend(slot.children.iter().copied());
        }

        let slot = &mut self.slots[node.idx()];
        slot.live = false;
        slot.parent = None;
        slot.tag = None;
        self.free.push(node.0);
        self.live -= 1;
        affected
    }

    pub(crate) fn is_alive(&self, node: NodeId) -> bool {
        self.slots
            .get(node.idx())
            .is_some_and(|slot| slot.live && slot.generation == node.1)
    }

    fn slot(&self, node: NodeId) -> Option<&NodeSlot> {
        self.slots
            .get(node.idx())
            .filter(|slot| slot.live && slot.generation == node.1)
    }

    /// The node's status; stale handles read as `Disconnected`.
    pub(crate) fn status(&self, node: NodeId) -> NodeStatus {
        self.slot(node)
            .map_or(NodeStatus::Disconnected, |slot| slot.status)
    }

    /// Updates the node's status. Returns `true` if the tri-state actually
    /// changed.
    ///
    /// # Panics
    ///
    /// Panics if `node` is stale.
    pub(crate) fn set_status(&mut self, node: NodeId, status: NodeStatus) -> bool {
        assert!(self.is_alive(node), "node {node:?} is not alive");
        let slot = &mut self.slots[node.idx()];
        if slot.status == status {
            return false;
        }
        slot.status = status;
        true
    }

    pub(crate) fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.slot(node).and_then(|slot| slot.parent)
    }

    pub(crate) fn tag(&self, node: NodeId) -> Option<&str> {
        self.slot(node).and_then(|slot| slot.tag.as_deref())
    }

    /// The node's component type; stale handles have no type.
    pub(crate) fn type_id(&self, node: NodeId) -> Option<TypeId> {
        self.slot(node).map(|slot| slot.type_id)
    }

    pub(crate) fn is_shadow_root(&self, node: NodeId) -> bool {
        self.slot(node).is_some_and(|slot| slot.shadow_root)
    }

    /// Structural parent, crossing shadow-tree boundaries.
    pub(crate) fn step_deep(&self, node: NodeId) -> Option<NodeId> {
        self.parent(node)
    }

    /// Structural parent, stopping at shadow roots.
    pub(crate) fn step_shallow(&self, node: NodeId) -> Option<NodeId> {
        if self.is_shadow_root(node) {
            None
        } else {
            self.parent(node)
        }
    }
}

impl fmt::Debug for Nodes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Nodes")
            .field("live", &self.live)
            .field("slots", &self.slots.len())
            .finish()
    }
}
