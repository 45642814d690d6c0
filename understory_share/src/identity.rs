// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Share identification types.
//!
//! This module provides [`ShareId`] for runtime share identification,
//! [`Share<T>`] for type-safe share keys, and [`ShareTable`] where identities
//! are declared.

use alloc::vec::Vec;
use core::any::TypeId;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;
use hashbrown::HashMap;
use smallvec::SmallVec;

/// A runtime share identifier.
///
/// This is a lightweight handle (u32) that uniquely identifies a share within
/// a [`ShareTable`]. Registry state, candidate slots, and watchers are all
/// keyed by it, so the identity of a share is the identity of this handle.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShareId(u32);

impl ShareId {
    /// Creates a new share ID from the given index.
    ///
    /// This is typically called by [`ShareTable::register`] rather than
    /// directly.
    #[must_use]
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the underlying index of this share ID.
    #[must_use]
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ShareId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ShareId").field(&self.0).finish()
    }
}

impl fmt::Display for ShareId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShareId({})", self.0)
    }
}

/// A type-safe share key with phantom type for compile-time checking.
///
/// This wraps a [`ShareId`] with a phantom type parameter `T` representing the
/// shared value type, so providers and consumers of a share agree on the value
/// type at compile time.
///
/// # Memory Layout
///
/// `Share<T>` is the same size as `ShareId` (4 bytes) since `PhantomData` has
/// zero size.
pub struct Share<T> {
    id: ShareId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Share<T> {
    /// Creates a new typed share from a share ID.
    ///
    /// This is typically called by [`ShareTable::register`] rather than
    /// directly.
    ///
    /// # Safety Note
    ///
    /// The caller must ensure that the `ShareId` was declared with the same
    /// type `T`. Using mismatched types will cause panics at runtime.
    #[must_use]
    #[inline]
    pub const fn from_id(id: ShareId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    /// Returns the underlying share ID.
    #[must_use]
    #[inline]
    pub const fn id(self) -> ShareId {
        self.id
    }
}

impl<T> From<Share<T>> for ShareId {
    #[inline]
    fn from(share: Share<T>) -> Self {
        share.id
    }
}

// Manual trait implementations to avoid requiring T: Clone, etc.

impl<T> Copy for Share<T> {}

impl<T> Clone for Share<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for Share<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Share<T> {}

impl<T> Hash for Share<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for Share<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Share")
            .field("id", &self.id)
            .field("type", &core::any::type_name::<T>())
            .finish()
    }
}

/// A declaration record for a share.
///
/// This stores the share's name, value type, and alias targets.
pub struct ShareInfo {
    name: &'static str,
    type_id: TypeId,
    aliases: SmallVec<[ShareId; 2]>,
}

impl ShareInfo {
    /// Returns the share name.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the [`TypeId`] of the share's value type.
    #[must_use]
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the alias targets this share also feeds, in declaration order.
    #[must_use]
    #[inline]
    pub fn aliases(&self) -> &[ShareId] {
        &self.aliases
    }
}

impl fmt::Debug for ShareInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShareInfo")
            .field("name", &self.name)
            .field("type_id", &self.type_id)
            .field("aliases", &self.aliases)
            .finish()
    }
}

/// The table where share identities are declared.
///
/// Shares are declared once, up front, and the table provides lookup by name
/// or ID. Identities are immutable after declaration and live for the table's
/// lifetime: everything else in the system (sharer registrations, candidate
/// slots, subscriptions) comes and goes while the identity persists.
///
/// # Example
///
/// ```rust
/// use understory_share::ShareTable;
///
/// let mut table = ShareTable::new();
///
/// let theme: understory_share::Share<u32> = table.register("theme", &[]);
/// assert_eq!(table.name(theme.id()), Some("theme"));
/// assert_eq!(table.by_name("theme"), Some(theme.id()));
/// ```
#[derive(Default)]
pub struct ShareTable {
    shares: Vec<ShareInfo>,
    by_name: HashMap<&'static str, ShareId>,
}

impl ShareTable {
    /// Creates a new empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a new share with the given name and alias targets.
    ///
    /// Returns a type-safe [`Share<T>`] key. The aliases are the other shares
    /// this one also feeds, in fixed order; they must already be declared.
    ///
    /// # Panics
    ///
    /// Panics if a share with the same name is already declared, or if an
    /// alias refers to an undeclared share.
    pub fn register<T: 'static>(&mut self, name: &'static str, aliases: &[ShareId]) -> Share<T> {
        assert!(
            !self.by_name.contains_key(name),
            "share '{name}' is already declared"
        );
        for alias in aliases {
            assert!(
                (alias.index() as usize) < self.shares.len(),
                "share '{name}' aliases undeclared share {alias:?}"
            );
        }
        let index = u32::try_from(self.shares.len()).expect("too many shares declared");
        let id = ShareId::new(index);

        self.shares.push(ShareInfo {
            name,
            type_id: TypeId::of::<T>(),
            aliases: SmallVec::from_slice(aliases),
        });
        self.by_name.insert(name, id);

        Share::from_id(id)
    }

    /// Returns the number of declared shares.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.shares.len()
    }

    /// Returns `true` if no shares are declared.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    /// Looks up a share by name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<ShareId> {
        self.by_name.get(name).copied()
    }

    /// Returns the name of a share.
    #[must_use]
    pub fn name(&self, id: ShareId) -> Option<&'static str> {
        self.shares.get(id.index() as usize).map(|info| info.name)
    }

    /// Returns the declaration record for a share.
    #[must_use]
    pub fn get(&self, id: ShareId) -> Option<&ShareInfo> {
        self.shares.get(id.index() as usize)
    }

    /// Returns an iterator over all declared shares.
    pub fn iter(&self) -> impl Iterator<Item = (ShareId, &ShareInfo)> {
        self.shares.iter().enumerate().map(|(i, info)| {
            #[expect(clippy::cast_possible_truncation, reason = "index < len <= u32::MAX")]
            (ShareId::new(i as u32), info)
        })
    }
}

impl fmt::Debug for ShareTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShareTable")
            .field("count", &self.shares.len())
            .field("shares", &self.by_name.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::string::String;

    #[test]
    fn share_id_basics() {
        let id = ShareId::new(42);
        assert_eq!(id.index(), 42);
        assert_eq!(id, ShareId::new(42));
        assert_ne!(id, ShareId::new(43));
        assert_eq!(format!("{id:?}"), "ShareId(42)");
        assert_eq!(format!("{id}"), "ShareId(42)");
    }

    #[test]
    fn share_type_safety() {
        let id = ShareId::new(1);
        let share_f64: Share<f64> = Share::from_id(id);
        let share_i32: Share<i32> = Share::from_id(id);

        // Same ID, different phantom types.
        assert_eq!(share_f64.id(), share_i32.id());
    }

    #[test]
    fn share_size() {
        use core::mem::size_of;
        assert_eq!(size_of::<ShareId>(), 4);
        assert_eq!(size_of::<Share<f64>>(), 4);
        assert_eq!(size_of::<Share<String>>(), 4);
    }

    #[test]
    fn table_register_and_lookup() {
        let mut table = ShareTable::new();
        assert!(table.is_empty());

        let theme: Share<u32> = table.register("theme", &[]);
        assert_eq!(table.len(), 1);
        assert_eq!(theme.id().index(), 0);
        assert_eq!(table.by_name("theme"), Some(theme.id()));
        assert_eq!(table.by_name("missing"), None);
        assert_eq!(table.name(theme.id()), Some("theme"));
        assert_eq!(table.name(ShareId::new(999)), None);
    }

    #[test]
    fn table_records_aliases_in_order() {
        let mut table = ShareTable::new();
        let base: Share<u32> = table.register("base", &[]);
        let extra: Share<u32> = table.register("extra", &[]);
        let combined: Share<u32> = table.register("combined", &[base.id(), extra.id()]);

        let info = table.get(combined.id()).unwrap();
        assert_eq!(info.aliases(), &[base.id(), extra.id()]);
        assert_eq!(info.name(), "combined");
        assert_eq!(info.type_id(), TypeId::of::<u32>());
    }

    #[test]
    fn table_iter() {
        let mut table = ShareTable::new();
        let _: Share<u32> = table.register("a", &[]);
        let _: Share<u32> = table.register("b", &[]);

        let names: Vec<_> = table.iter().map(|(_, info)| info.name()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    #[should_panic(expected = "already declared")]
    fn table_duplicate_name() {
        let mut table = ShareTable::new();
        let _: Share<u32> = table.register("theme", &[]);
        let _: Share<u32> = table.register("theme", &[]);
    }

    #[test]
    #[should_panic(expected = "undeclared share")]
    fn table_unknown_alias() {
        let mut table = ShareTable::new();
        let _: Share<u32> = table.register("theme", &[ShareId::new(7)]);
    }

    #[test]
    fn table_debug() {
        let mut table = ShareTable::new();
        let _: Share<u32> = table.register("theme", &[]);

        let debug = format!("{table:?}");
        assert!(debug.contains("ShareTable"));
        assert!(debug.contains("theme"));
    }
}
