// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Supply handles and the arena that owns them.

use alloc::vec::Vec;
use core::fmt;
use smallvec::SmallVec;

/// Identifier for a lifetime registered with [`Supplies`].
///
/// This is a small, copyable handle that stays stable while the supply is on
/// and becomes invalid when the underlying slot is reused.
/// It consists of a slot index and a generation counter.
///
/// ## Semantics
///
/// - Allocating a supply takes a fresh (or freed) slot; reuse of a freed slot
///   increments its generation, producing a new, distinct `Supply`.
/// - A cut supply's handle is permanently off: the generation must match for
///   a handle to be considered live, so stale handles never alias a newer
///   supply occupying the same slot.
///
/// Use [`Supplies::is_on`] / [`Supplies::is_off`] to probe liveness.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Supply(pub(crate) u32, pub(crate) u32);

impl Supply {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Supply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Supply").field(&self.0).field(&self.1).finish()
    }
}

/// The supplies that turned off during one [`Supplies::cut`] call, in cut
/// order: the cut supply first, then its transitive dependents depth-first in
/// edge insertion order.
pub type CutSet = SmallVec<[Supply; 4]>;

struct Slot {
    generation: u32,
    on: bool,
    /// Supplies to cut when this one is cut, in [`Supplies::needs`] call
    /// order. Entries may be stale; they are skipped during the cut.
    dependents: SmallVec<[Supply; 2]>,
}

/// Arena owning every supply slot.
///
/// All mutation is `&mut self` from the single control thread; there is no
/// interior mutability and no locking.
///
/// # Example
///
/// ```rust
/// use understory_supply::Supplies;
///
/// let mut supplies = Supplies::new();
/// let a = supplies.supply();
/// assert!(supplies.is_on(a));
///
/// let cut = supplies.cut(a);
/// assert_eq!(cut.as_slice(), &[a]);
/// assert!(supplies.is_off(a));
///
/// // Cutting again is an empty no-op.
/// assert!(supplies.cut(a).is_empty());
/// ```
#[derive(Default)]
pub struct Supplies {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl Supplies {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a new live supply.
    #[must_use]
    pub fn supply(&mut self) -> Supply {
        self.live += 1;
        if let Some(idx) = self.free.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.generation += 1;
            slot.on = true;
            debug_assert!(slot.dependents.is_empty(), "freed slot kept dependents");
            return Supply::new(idx, slot.generation);
        }
        let idx = u32::try_from(self.slots.len()).expect("supply slot index overflow");
        self.slots.push(Slot {
            generation: 1,
            on: true,
            dependents: SmallVec::new(),
        });
        Supply::new(idx, 1)
    }

    /// Allocates a new supply that is cut whenever `parent` is cut.
    ///
    /// If `parent` is already off, the returned supply is off as well.
    #[must_use]
    pub fn derive(&mut self, parent: Supply) -> Supply {
        let child = self.supply();
        let _ = self.needs(child, parent);
        child
    }

    /// Returns `true` if `supply` refers to a live, uncut supply.
    ///
    /// Stale handles (from a reused slot) are off.
    #[must_use]
    pub fn is_on(&self, supply: Supply) -> bool {
        self.slots
            .get(supply.idx())
            .is_some_and(|slot| slot.on && slot.generation == supply.1)
    }

    /// Returns `true` if `supply` is cut or stale.
    #[must_use]
    pub fn is_off(&self, supply: Supply) -> bool {
        !self.is_on(supply)
    }

    /// Returns the number of live supplies.
    #[must_use]
    pub fn live(&self) -> usize {
        self.live
    }

    /// Records that `dependent` lives at most as long as `required`:
    /// cutting `required` later cuts `dependent`. Cutting `dependent` leaves
    /// `required` on.
    ///
    /// If `required` is already off, `dependent` is cut immediately and the
    /// resulting [`CutSet`] is returned. If `dependent` is already off, this
    /// is a no-op.
    pub fn needs(&mut self, dependent: Supply, required: Supply) -> CutSet {
        if self.is_off(dependent) {
            return CutSet::new();
        }
        if self.is_off(required) {
            return self.cut(dependent);
        }
        self.slots[required.idx()].dependents.push(dependent);
        CutSet::new()
    }

    /// Turns `supply` and all its transitive dependents off.
    ///
    /// Returns the supplies that actually turned off, in cut order. Cutting
    /// an off or stale supply returns an empty set; cut is idempotent.
    pub fn cut(&mut self, supply: Supply) -> CutSet {
        let mut cut = CutSet::new();
        if self.is_off(supply) {
            return cut;
        }
        // Depth-first over dependent edges; `stack` holds supplies whose
        // liveness is re-checked on pop so stale entries fall out naturally.
        let mut stack: SmallVec<[Supply; 8]> = SmallVec::new();
        stack.push(supply);
        while let Some(next) = stack.pop() {
            if self.is_off(next) {
                continue;
            }
            let slot = &mut self.slots[next.idx()];
            slot.on = false;
            let dependents = core::mem::take(&mut slot.dependents);
            self.live -= 1;
            self.free.push(next.0);
            cut.push(next);
            // Reverse so the first-inserted edge is processed first.
            stack.extend(dependents.into_iter().rev());
        }
        cut
    }
}

impl fmt::Debug for Supplies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Supplies")
            .field("live", &self.live)
            .field("slots", &self.slots.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn supply_on_until_cut() {
        let mut supplies = Supplies::new();
        let a = supplies.supply();

        assert!(supplies.is_on(a));
        assert_eq!(supplies.live(), 1);

        let cut = supplies.cut(a);
        assert_eq!(cut.as_slice(), &[a]);
        assert!(supplies.is_off(a));
        assert_eq!(supplies.live(), 0);
    }

    #[test]
    fn cut_is_idempotent() {
        let mut supplies = Supplies::new();
        let a = supplies.supply();

        assert_eq!(supplies.cut(a).len(), 1);
        assert!(supplies.cut(a).is_empty());
        assert!(supplies.cut(a).is_empty());
        assert_eq!(supplies.live(), 0);
    }

    #[test]
    fn slot_reuse_bumps_generation() {
        let mut supplies = Supplies::new();
        let a = supplies.supply();
        supplies.cut(a);

        let b = supplies.supply();
        // Same slot, new generation: the stale handle stays off.
        assert_eq!(a.0, b.0);
        assert_ne!(a, b);
        assert!(supplies.is_off(a));
        assert!(supplies.is_on(b));

        // Cutting the stale handle does not touch the new occupant.
        assert!(supplies.cut(a).is_empty());
        assert!(supplies.is_on(b));
    }

    #[test]
    fn cutting_required_cuts_dependent() {
        let mut supplies = Supplies::new();
        let required = supplies.supply();
        let dependent = supplies.supply();

        assert!(supplies.needs(dependent, required).is_empty());

        let cut = supplies.cut(required);
        assert_eq!(cut.as_slice(), &[required, dependent]);
        assert!(supplies.is_off(dependent));
    }

    #[test]
    fn cutting_dependent_leaves_required_on() {
        let mut supplies = Supplies::new();
        let required = supplies.supply();
        let dependent = supplies.supply();
        let _ = supplies.needs(dependent, required);

        let cut = supplies.cut(dependent);
        assert_eq!(cut.as_slice(), &[dependent]);
        assert!(supplies.is_on(required));

        // The stale edge on `required` is skipped later.
        let cut = supplies.cut(required);
        assert_eq!(cut.as_slice(), &[required]);
    }

    #[test]
    fn needs_on_off_supply_cuts_immediately() {
        let mut supplies = Supplies::new();
        let required = supplies.supply();
        supplies.cut(required);

        let dependent = supplies.supply();
        let cut = supplies.needs(dependent, required);
        assert_eq!(cut.as_slice(), &[dependent]);
        assert!(supplies.is_off(dependent));
    }

    #[test]
    fn cascade_is_transitive_and_ordered() {
        let mut supplies = Supplies::new();
        let root = supplies.supply();
        let mid = supplies.supply();
        let leaf_a = supplies.supply();
        let leaf_b = supplies.supply();

        let _ = supplies.needs(mid, root);
        let _ = supplies.needs(leaf_a, mid);
        let _ = supplies.needs(leaf_b, mid);

        let cut = supplies.cut(root);
        assert_eq!(cut.as_slice(), &[root, mid, leaf_a, leaf_b]);
        assert_eq!(supplies.live(), 0);
    }

    #[test]
    fn diamond_dependents_cut_once() {
        let mut supplies = Supplies::new();
        let left = supplies.supply();
        let right = supplies.supply();
        let shared = supplies.supply();

        let _ = supplies.needs(shared, left);
        let _ = supplies.needs(shared, right);

        let cut = supplies.cut(left);
        assert_eq!(cut.as_slice(), &[left, shared]);

        // `shared` is already off when `right` goes down.
        let cut = supplies.cut(right);
        assert_eq!(cut.as_slice(), &[right]);
    }

    #[test]
    fn derive_follows_parent() {
        let mut supplies = Supplies::new();
        let parent = supplies.supply();
        let child = supplies.derive(parent);

        assert!(supplies.is_on(child));
        let cut = supplies.cut(parent);
        assert_eq!(cut.as_slice(), &[parent, child]);

        // Deriving from an off parent yields an off supply.
        let orphan = supplies.derive(parent);
        assert!(supplies.is_off(orphan));
    }

    #[test]
    fn debug_formatting() {
        let mut supplies = Supplies::new();
        let a = supplies.supply();
        assert_eq!(format!("{a:?}"), "Supply(0, 1)");
        let debug = format!("{supplies:?}");
        assert!(debug.contains("Supplies"));
        assert!(debug.contains("live"));
    }
}
