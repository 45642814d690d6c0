// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Share: scoped value sharing across a UI node tree.
//!
//! A *sharer* node exposes a value to the consumers positioned anywhere
//! beneath it; a *consumer* locates the nearest sharing ancestor and follows
//! its value reactively. This crate is that mechanism — the registry of who
//! shares what, the deterministic choice among competing value offers, and
//! the tree walk that connects a consumer to its sharer. Form fields, style
//! systems, and rendering are callers of this crate, not part of it.
//!
//! ## Core Concepts
//!
//! ### Shares
//!
//! A [`Share<T>`] is an opaque typed identity declared once on a
//! [`ShareBoard`]. Declaring it with aliases makes values registered for it
//! also feed the aliased shares, at derived priorities.
//!
//! ### Sharers and values
//!
//! [`ShareBoard::add_sharer`] marks a node as a source for a share, by node
//! type and tag name; the tag half is what the ancestor walk matches.
//! [`ShareBoard::share_value`] registers a lazy value provider and returns a
//! [`Registrar`] for re-exposing the same provider under other shares.
//! Competing offers for one `(share, sharer)` pair are decided by
//! [`select_value`].
//!
//! ### Consumers
//!
//! [`ShareBoard::locate`] pulls the value a consumer resolves — the nearest
//! ancestor whose tag is registered, or the consumer itself under a local
//! mode. [`ShareBoard::value_for`] is the push form: the current resolution
//! is replayed immediately, then re-delivered (deduplicated) as the registry,
//! the consumer's status, or any contributing value changes.
//!
//! ### Lifetimes
//!
//! Every registering call returns an [`understory_supply::Supply`]; cutting
//! it synchronously detaches the registration. See `understory_supply` for
//! the dependency-aware cancellation model.
//!
//! ## Quick Start
//!
//! ```rust
//! use understory_share::{LocateOptions, Provided, ShareBoard};
//!
//! struct Menu;
//! struct Item;
//!
//! let mut board = ShareBoard::new();
//! let accent = board.declare::<u32>("accent");
//!
//! let menu = board.insert::<Menu>(None, Some("menu"));
//! let item = board.insert::<Item>(Some(menu), None);
//!
//! let _sharer = board.add_sharer(accent, menu);
//! let _value = board.share_value(accent, menu, |_| Provided::Value(0xFF00FF_u32));
//!
//! // Pull…
//! assert_eq!(board.locate(accent, item, &LocateOptions::new()), Some((0xFF00FF, menu)));
//!
//! // …or push: replay now, updates later, nothing on teardown.
//! let watch = board.value_for(accent, item, LocateOptions::new(), move |resolved| {
//!     if let Some((value, sharer)) = resolved {
//!         assert_eq!((*value, sharer), (0xFF00FF, menu));
//!     }
//! });
//! board.cut(watch);
//! ```
//!
//! ## Concurrency model
//!
//! Single-threaded and event-driven: all mutation is `&mut self` on the one
//! control thread, reads are synchronous snapshots, and subscriptions are
//! push callbacks delivered synchronously before the mutating call returns.
//! Callbacks receive values only — never the board — so they cannot mutate
//! state mid-delivery.
//!
//! ## Error handling
//!
//! Absence — no sharer found, no value registered — is represented as `None`
//! or an empty emission, never an error. Only programmer misuse panics:
//! forged or type-mismatched handles, mutating through a stale [`NodeId`],
//! and reading a [`Shareable`] before binding it.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

mod board;
mod feed;
mod identity;
mod locate;
mod provide;
mod registry;
mod select;
mod shareable;
mod tree;
mod value;
mod watch;

pub use board::ShareBoard;
pub use feed::{Feed, FeedId};
pub use identity::{Share, ShareId, ShareInfo, ShareTable};
pub use locate::{HostMode, LocalMode, LocateOptions};
pub use provide::{Provided, Registrar};
pub use registry::Sharers;
pub use select::{Candidate, Detailed, select_index, select_value};
pub use shareable::Shareable;
pub use tree::{NodeId, NodeStatus};
pub use value::ErasedValue;

// Re-exported so callers can hold lifetimes without naming the supply crate.
pub use understory_supply::Supply;
