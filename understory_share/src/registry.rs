// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The sharer registry.
//!
//! For each share this tracks which node names and node types currently act
//! as sharers. Entries are reference-counted: registering the same
//! `(share, name)` pair twice and revoking one registration leaves the name
//! present. Every mutation publishes a fresh copy-on-write [`Sharers`]
//! snapshot, so readers hold an immutable view and never observe a partial
//! update.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::any::TypeId;
use core::fmt;
use hashbrown::HashMap;

use crate::identity::ShareId;

/// An immutable snapshot of the sharers registered for one share.
///
/// Obtained from the board; a fresh snapshot is published on every
/// registration or revocation, with a version counter that only moves
/// forward.
#[derive(Clone, Default)]
pub struct Sharers {
    version: u64,
    names: HashMap<Box<str>, u32>,
    types: HashMap<TypeId, u32>,
}

impl Sharers {
    /// The snapshot version; bumps on every mutation of the entry.
    #[must_use]
    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Returns `true` if no sharer is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.types.is_empty()
    }

    /// Returns `true` if `name` is registered as a sharer name.
    #[must_use]
    pub fn has_name(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// The registration count for `name` (0 when absent).
    #[must_use]
    pub fn name_count(&self, name: &str) -> u32 {
        self.names.get(name).copied().unwrap_or(0)
    }

    /// Iterates over registered names and their counts.
    pub fn names(&self) -> impl Iterator<Item = (&str, u32)> {
        self.names.iter().map(|(name, count)| (&**name, *count))
    }

    /// Returns `true` if `type_id` is registered as a sharer type.
    #[must_use]
    pub fn has_type(&self, type_id: TypeId) -> bool {
        self.types.contains_key(&type_id)
    }

    /// The registration count for `type_id` (0 when absent).
    #[must_use]
    pub fn type_count(&self, type_id: TypeId) -> u32 {
        self.types.get(&type_id).copied().unwrap_or(0)
    }

    /// Iterates over registered types and their counts.
    pub fn types(&self) -> impl Iterator<Item = (TypeId, u32)> {
        self.types.iter().map(|(type_id, count)| (*type_id, *count))
    }
}

impl fmt::Debug for Sharers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sharers")
            .field("version", &self.version)
            .field("names", &self.names)
            .field("types", &self.types.len())
            .finish()
    }
}

/// Per-share sharer bookkeeping.
///
/// Entries are created on first touch and persist for the registry's
/// lifetime: identities are long-lived singletons while nodes churn.
pub(crate) struct SharerRegistry {
    entries: HashMap<ShareId, Rc<Sharers>>,
    empty: Rc<Sharers>,
}

impl Default for SharerRegistry {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            empty: Rc::new(Sharers::default()),
        }
    }
}

impl SharerRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// The current snapshot for `share`; untouched shares read as the shared
    /// empty snapshot (version 0).
    pub(crate) fn snapshot(&self, share: ShareId) -> Rc<Sharers> {
        self.entries.get(&share).unwrap_or(&self.empty).clone()
    }

    /// Records one sharer registration for `share`.
    ///
    /// The type count always increments; the name count only when a name is
    /// given.
    pub(crate) fn add(&mut self, share: ShareId, type_id: TypeId, name: Option<&str>) {
        self.mutate(share, |sharers| {
            *sharers.types.entry(type_id).or_insert(0) += 1;
            if let Some(name) = name {
                match sharers.names.get_mut(name) {
                    Some(count) => *count += 1,
                    None => {
                        sharers.names.insert(Box::from(name), 1);
                    }
                }
            }
        });
    }

    /// Revokes one sharer registration for `share`.
    ///
    /// Counts never go negative; a key's entry is removed when its count
    /// reaches zero.
    pub(crate) fn remove(&mut self, share: ShareId, type_id: TypeId, name: Option<&str>) {
        self.mutate(share, |sharers| {
            if let Some(count) = sharers.types.get_mut(&type_id) {
                *count -= 1;
                if *count == 0 {
                    sharers.types.remove(&type_id);
                }
            } else {
                debug_assert!(false, "unbalanced sharer type revocation");
            }
            if let Some(name) = name {
                if let Some(count) = sharers.names.get_mut(name) {
                    *count -= 1;
                    if *count == 0 {
                        sharers.names.remove(name);
                    }
                } else {
                    debug_assert!(false, "unbalanced sharer name revocation");
                }
            }
        });
    }

    /// Copy-on-write update: clone the current snapshot, apply `edit`, bump
    /// the version, republish.
    fn mutate(&mut self, share: ShareId, edit: impl FnOnce(&mut Sharers)) {
        let current = self.entries.get(&share).unwrap_or(&self.empty);
        let mut next = (**current).clone();
        edit(&mut next);
        next.version += 1;
        self.entries.insert(share, Rc::new(next));
    }
}

impl fmt::Debug for SharerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharerRegistry")
            .field("entries", &self.entries.len())
            .finish()
    }
}
