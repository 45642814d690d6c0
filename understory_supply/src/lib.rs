// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Supply: lifetime tokens with dependency-aware cancellation.
//!
//! Registering something — a sharer, a value provider, a subscription —
//! produces a [`Supply`]: a small copyable token standing for the lifetime of
//! that registration. Cutting the supply synchronously undoes the
//! registration. Supplies can depend on one another, so that cutting an outer
//! lifetime (a component being torn down) cascades to everything registered
//! under it.
//!
//! ## Quick Start
//!
//! ```rust
//! use understory_supply::Supplies;
//!
//! let mut supplies = Supplies::new();
//!
//! let component = supplies.supply();
//! let subscription = supplies.supply();
//!
//! // The subscription lives at most as long as the component.
//! supplies.needs(subscription, component);
//!
//! let cut = supplies.cut(component);
//! assert_eq!(cut.as_slice(), &[component, subscription]);
//! assert!(supplies.is_off(subscription));
//! ```
//!
//! ## Ownership model
//!
//! [`Supplies`] is an arena with a single-writer `&mut self` API: all
//! mutation happens on the one thread driving the system. [`Supply`] handles
//! are generational, so a handle to a cut-and-reused slot never aliases the
//! slot's new occupant.
//!
//! Cutting returns the [`CutSet`] of supplies that actually turned off, in
//! cut order, so the owner of the attached state can sweep exactly what died.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

mod supply;

pub use supply::{CutSet, Supplies, Supply};
