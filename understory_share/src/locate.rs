// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Locating the sharer a consumer resolves against.
//!
//! Resolution walks the tree upward from the consumer, looking for the
//! nearest ancestor whose tag is registered as a sharer name, optionally
//! checking the consumer's own node type first. The walk is driven by a host
//! step that callers can replace, so the algorithm runs against any
//! externally-owned structure.

use alloc::boxed::Box;
use core::fmt;

use crate::registry::Sharers;
use crate::tree::{NodeId, Nodes};

/// Whether the consumer's own node participates in resolution.
///
/// Local resolution checks the consumer's node *type* against the registry;
/// the ancestor search matches node *tags* against registered names.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LocalMode {
    /// Search ancestors only (the default).
    #[default]
    None,
    /// Resolve from the consumer itself when it is a sharer; otherwise
    /// nothing. Ancestors are never searched.
    Require,
    /// Resolve from the consumer itself when it is a sharer; otherwise fall
    /// through to the ancestor search.
    Prefer,
}

/// How the walk climbs from a node to its host.
pub enum HostMode {
    /// Structural parent, crossing shadow-tree boundaries (the default).
    Deep,
    /// Structural parent, stopping at shadow roots.
    Shallow,
    /// A caller-supplied host function over an externally-owned structure.
    ///
    /// Returning a stale or unknown node ends the walk at the next step.
    Custom(Box<dyn Fn(NodeId) -> Option<NodeId>>),
}

impl Default for HostMode {
    fn default() -> Self {
        Self::Deep
    }
}

impl fmt::Debug for HostMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deep => f.write_str("Deep"),
            Self::Shallow => f.write_str("Shallow"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Options for [`locate`](crate::ShareBoard::locate) and
/// [`value_for`](crate::ShareBoard::value_for).
///
/// # Example
///
/// ```rust
/// use understory_share::{HostMode, LocalMode, LocateOptions};
///
/// let opts = LocateOptions::new()
///     .with_local(LocalMode::Prefer)
///     .with_host(HostMode::Shallow);
/// assert_eq!(opts.local, LocalMode::Prefer);
/// ```
#[derive(Debug, Default)]
pub struct LocateOptions {
    /// Whether the consumer's own node participates.
    pub local: LocalMode,
    /// How the walk climbs.
    pub host: HostMode,
}

impl LocateOptions {
    /// Creates the default options: ancestor search with deep host stepping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the local mode.
    #[must_use]
    pub fn with_local(mut self, local: LocalMode) -> Self {
        self.local = local;
        self
    }

    /// Sets the host mode.
    #[must_use]
    pub fn with_host(mut self, host: HostMode) -> Self {
        self.host = host;
        self
    }
}

fn step(nodes: &Nodes, host: &HostMode, node: NodeId) -> Option<NodeId> {
    match host {
        HostMode::Deep => nodes.step_deep(node),
        HostMode::Shallow => nodes.step_shallow(node),
        HostMode::Custom(host_of) => host_of(node),
    }
}

/// Finds the node a consumer resolves the share against, or `None`.
///
/// The caller is responsible for status gating; this is the pure walk over
/// the given registry snapshot.
pub(crate) fn find_sharer(
    nodes: &Nodes,
    sharers: &Sharers,
    consumer: NodeId,
    opts: &LocateOptions,
) -> Option<NodeId> {
    if !nodes.is_alive(consumer) {
        return None;
    }

    match opts.local {
        LocalMode::None => {}
        LocalMode::Require | LocalMode::Prefer => {
            if let Some(type_id) = nodes.type_id(consumer)
                && sharers.has_type(type_id)
            {
                return Some(consumer);
            }
            if opts.local == LocalMode::Require {
                return None;
            }
        }
    }

    let mut current = step(nodes, &opts.host, consumer);
    while let Some(node) = current {
        if let Some(tag) = nodes.tag(node)
            && sharers.has_name(tag)
        {
            return Some(node);
        }
        current = step(nodes, &opts.host, node);
    }
    None
}
