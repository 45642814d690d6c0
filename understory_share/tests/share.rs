// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for the `understory_share` crate.
//!
//! These exercise the full resolution pipeline end-to-end: sharer
//! registration, value selection, the ancestor walk, push subscriptions with
//! replay and dedup, and lifetime-driven teardown.

use std::cell::RefCell;
use std::rc::Rc;

use understory_share::{
    HostMode, LocalMode, LocateOptions, NodeId, NodeStatus, Provided, ShareBoard,
};

struct Pane;
struct Field;

type Emissions<T> = Rc<RefCell<Vec<Option<(T, NodeId)>>>>;

fn record<T: Copy + 'static>(emissions: &Emissions<T>) -> impl FnMut(Option<(&T, NodeId)>) + 'static {
    let sink = emissions.clone();
    move |resolved| {
        sink.borrow_mut()
            .push(resolved.map(|(value, node)| (*value, node)));
    }
}

#[test]
fn nearest_sharer_wins_per_consumer() {
    let mut board = ShareBoard::new();
    let share = board.declare::<i32>("depth");

    let a = board.insert::<Pane>(None, Some("pane"));
    let b = board.insert::<Pane>(Some(a), Some("pane"));
    let in_b = board.insert::<Field>(Some(b), None);
    let in_a = board.insert::<Field>(Some(a), None);
    let outside = board.insert::<Field>(None, None);

    let _ = board.add_sharer(share, a);
    let _ = board.add_sharer(share, b);
    let _ = board.share_value(share, a, |_| Provided::Value(1));
    let _ = board.share_value(share, b, |_| Provided::Value(2));

    let opts = LocateOptions::new();
    assert_eq!(board.locate(share, in_b, &opts), Some((2, b)));
    assert_eq!(board.locate(share, in_a, &opts), Some((1, a)));
    assert_eq!(board.locate(share, outside, &opts), None);
}

#[test]
fn value_for_replays_then_follows_registrations() {
    let mut board = ShareBoard::new();
    let share = board.declare::<i32>("depth");

    let pane = board.insert::<Pane>(None, Some("pane"));
    let field = board.insert::<Field>(Some(pane), None);

    let emissions: Emissions<i32> = Rc::new(RefCell::new(Vec::new()));
    let _watch = board.value_for(share, field, LocateOptions::new(), record(&emissions));

    // Nothing shared yet: the replay is empty.
    assert_eq!(emissions.borrow().as_slice(), &[None]);

    let sharer = board.add_sharer(share, pane);
    // A sharer with no value still resolves to nothing; dedup keeps quiet.
    assert_eq!(emissions.borrow().as_slice(), &[None]);

    let _ = board.share_value(share, pane, |_| Provided::Value(7));
    assert_eq!(emissions.borrow().as_slice(), &[None, Some((7, pane))]);

    // Unregistering the sharer flips the consumer back to nothing.
    board.cut(sharer);
    assert_eq!(
        emissions.borrow().as_slice(),
        &[None, Some((7, pane)), None]
    );
}

#[test]
fn consumer_falls_back_to_outer_sharer() {
    let mut board = ShareBoard::new();
    let share = board.declare::<i32>("depth");

    let outer = board.insert::<Pane>(None, Some("pane"));
    let inner = board.insert::<Pane>(Some(outer), Some("pane"));
    let field = board.insert::<Field>(Some(inner), None);

    let _ = board.add_sharer(share, outer);
    let inner_sharer = board.add_sharer(share, inner);
    let _ = board.share_value(share, outer, |_| Provided::Value(1));
    let _ = board.share_value(share, inner, |_| Provided::Value(2));

    let emissions: Emissions<i32> = Rc::new(RefCell::new(Vec::new()));
    let _watch = board.value_for(share, field, LocateOptions::new(), record(&emissions));
    assert_eq!(emissions.borrow().as_slice(), &[Some((2, inner))]);

    board.cut(inner_sharer);
    assert_eq!(
        emissions.borrow().as_slice(),
        &[Some((2, inner)), Some((1, outer))]
    );
}

#[test]
fn status_toggling_does_not_duplicate_emissions() {
    let mut board = ShareBoard::new();
    let share = board.declare::<i32>("depth");

    let pane = board.insert::<Pane>(None, Some("pane"));
    let field = board.insert::<Field>(Some(pane), None);
    let _ = board.add_sharer(share, pane);
    let _ = board.share_value(share, pane, |_| Provided::Value(7));

    let emissions: Emissions<i32> = Rc::new(RefCell::new(Vec::new()));
    let _watch = board.value_for(share, field, LocateOptions::new(), record(&emissions));
    assert_eq!(emissions.borrow().len(), 1);

    // Settled and Connected both resolve; the re-walk yields the same tuple.
    board.set_status(field, NodeStatus::Settled);
    board.set_status(field, NodeStatus::Connected);
    board.set_status(field, NodeStatus::Settled);
    assert_eq!(emissions.borrow().len(), 1);

    // Disconnecting is a real change.
    board.set_status(field, NodeStatus::Disconnected);
    assert_eq!(emissions.borrow().as_slice(), &[Some((7, pane)), None]);

    board.set_status(field, NodeStatus::Connected);
    assert_eq!(
        emissions.borrow().as_slice(),
        &[Some((7, pane)), None, Some((7, pane))]
    );
}

#[test]
fn local_modes() {
    let mut board = ShareBoard::new();
    let share = board.declare::<i32>("depth");

    let pane = board.insert::<Pane>(None, Some("pane"));
    let field = board.insert::<Field>(Some(pane), None);
    let _ = board.add_sharer(share, pane);
    let _ = board.share_value(share, pane, |_| Provided::Value(1));

    // `Require` on a non-sharer consumer: nothing, despite the ancestor.
    let require = LocateOptions::new().with_local(LocalMode::Require);
    assert_eq!(board.locate(share, field, &require), None);

    // `Prefer` falls back to the ancestor search.
    let prefer = LocateOptions::new().with_local(LocalMode::Prefer);
    assert_eq!(board.locate(share, field, &prefer), Some((1, pane)));

    // `Require` on a self-sharer resolves locally and ignores ancestors.
    let nested = board.insert::<Pane>(Some(pane), Some("pane"));
    let _ = board.add_sharer(share, nested);
    let _ = board.share_value(share, nested, |_| Provided::Value(99));
    let require = LocateOptions::new().with_local(LocalMode::Require);
    assert_eq!(board.locate(share, nested, &require), Some((99, nested)));
}

#[test]
fn type_only_sharers_resolve_locally_but_not_by_walk() {
    let mut board = ShareBoard::new();
    let share = board.declare::<i32>("depth");

    let pane = board.insert::<Pane>(None, Some("pane"));
    let field = board.insert::<Field>(Some(pane), None);

    // Registered with no name: reachable by type-based (local) lookup only.
    let _ = board.add_sharer_named(share, pane, None);
    let _ = board.share_value(share, pane, |_| Provided::Value(5));

    assert_eq!(board.locate(share, field, &LocateOptions::new()), None);
    let require = LocateOptions::new().with_local(LocalMode::Require);
    assert_eq!(board.locate(share, pane, &require), Some((5, pane)));
}

#[test]
fn sharer_names_are_reference_counted() {
    let mut board = ShareBoard::new();
    let share = board.declare::<i32>("depth");

    let pane = board.insert::<Pane>(None, Some("pane"));
    let field = board.insert::<Field>(Some(pane), None);
    let _ = board.share_value(share, pane, |_| Provided::Value(7));

    let first = board.add_sharer(share, pane);
    let second = board.add_sharer(share, pane);
    assert_eq!(board.sharers(share).name_count("pane"), 2);

    board.cut(first);
    assert_eq!(board.sharers(share).name_count("pane"), 1);
    assert_eq!(
        board.locate(share, field, &LocateOptions::new()),
        Some((7, pane))
    );

    board.cut(second);
    assert!(board.sharers(share).is_empty());
    assert_eq!(board.locate(share, field, &LocateOptions::new()), None);
}

#[test]
fn watch_sharers_sees_every_mutation() {
    let mut board = ShareBoard::new();
    let share = board.declare::<i32>("depth");
    let pane = board.insert::<Pane>(None, Some("pane"));

    let counts: Rc<RefCell<Vec<u32>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = counts.clone();
    let _watch = board.watch_sharers(share, move |sharers| {
        sink.borrow_mut().push(sharers.name_count("pane"));
    });
    assert_eq!(counts.borrow().as_slice(), &[0]);

    let first = board.add_sharer(share, pane);
    let second = board.add_sharer(share, pane);
    board.cut(first);
    board.cut(second);
    assert_eq!(counts.borrow().as_slice(), &[0, 1, 2, 1, 0]);
}

#[test]
fn alias_feeds_target_until_directly_shared() {
    let mut board = ShareBoard::new();
    let base = board.declare::<i32>("base");
    let combined = board.declare_aliasing::<i32>("combined", &[base]);

    let pane = board.insert::<Pane>(None, Some("pane"));
    let field = board.insert::<Field>(Some(pane), None);
    let _ = board.add_sharer(base, pane);

    // Sharing `combined` also feeds `base`, at a derived priority.
    let _ = board.share_value(combined, pane, |_| Provided::Value(10));
    assert_eq!(
        board.locate(base, field, &LocateOptions::new()),
        Some((10, pane))
    );

    // A direct (bare) registration on the alias target wins outright,
    // independent of registration order.
    let direct = board.share_value(base, pane, |_| Provided::Value(20));
    assert_eq!(
        board.locate(base, field, &LocateOptions::new()),
        Some((20, pane))
    );

    // Revoking the direct value falls back to the alias-derived one.
    board.cut(direct.supply());
    assert_eq!(
        board.locate(base, field, &LocateOptions::new()),
        Some((10, pane))
    );
}

#[test]
fn registrar_reexposes_the_same_provider() {
    let mut board = ShareBoard::new();
    let primary = board.declare::<i32>("primary");
    let secondary = board.declare::<i32>("secondary");

    let pane = board.insert::<Pane>(None, Some("pane"));
    let runs = Rc::new(RefCell::new(0));
    let seen = runs.clone();
    let registrar = board.share_value(primary, pane, move |_| {
        *seen.borrow_mut() += 1;
        Provided::Value(5)
    });

    registrar.share_as(&mut board, secondary);
    assert_eq!(board.shared(primary, pane), Some(5));
    assert_eq!(board.shared(secondary, pane), Some(5));
    // One provider behind both shares, each registration materialized once.
    assert_eq!(*runs.borrow(), 2);

    // Cutting the registrar detaches every registration it made.
    board.cut(registrar.supply());
    assert_eq!(board.shared(primary, pane), None);
    assert_eq!(board.shared(secondary, pane), None);
}

#[test]
fn explicit_priorities_rank_detailed_candidates() {
    let mut board = ShareBoard::new();
    let share = board.declare::<i32>("depth");
    let pane = board.insert::<Pane>(None, Some("pane"));

    let _ = board.share_value_at(share, pane, |_| Provided::Value(30), 3);
    let _ = board.share_value_at(share, pane, |_| Provided::Value(10), 1);
    let _ = board.share_value_at(share, pane, |_| Provided::Value(20), 2);
    assert_eq!(board.shared(share, pane), Some(10));

    // Equal priority: the later-declared registration wins.
    let _ = board.share_value_at(share, pane, |_| Provided::Value(11), 1);
    assert_eq!(board.shared(share, pane), Some(11));

    // A bare registration beats all of them.
    let _ = board.share_value(share, pane, |_| Provided::Value(0));
    assert_eq!(board.shared(share, pane), Some(0));
}

#[test]
fn feeds_drive_locator_subscriptions() {
    let mut board = ShareBoard::new();
    let share = board.declare::<i32>("depth");

    let pane = board.insert::<Pane>(None, Some("pane"));
    let field = board.insert::<Field>(Some(pane), None);
    let _ = board.add_sharer(share, pane);

    let feed = board.feed(1);
    let _ = board.share_value(share, pane, move |_| Provided::Feed(feed));

    let emissions: Emissions<i32> = Rc::new(RefCell::new(Vec::new()));
    let _watch = board.value_for(share, field, LocateOptions::new(), record(&emissions));
    assert_eq!(emissions.borrow().as_slice(), &[Some((1, pane))]);

    board.push(feed, 2);
    board.push(feed, 2); // equal push: suppressed
    board.push(feed, 3);
    assert_eq!(
        emissions.borrow().as_slice(),
        &[Some((1, pane)), Some((2, pane)), Some((3, pane))]
    );
}

#[test]
fn cutting_a_subscription_delivers_a_final_nothing() {
    let mut board = ShareBoard::new();
    let share = board.declare::<i32>("depth");

    let pane = board.insert::<Pane>(None, Some("pane"));
    let field = board.insert::<Field>(Some(pane), None);
    let _ = board.add_sharer(share, pane);
    let _ = board.share_value(share, pane, |_| Provided::Value(7));

    let emissions: Emissions<i32> = Rc::new(RefCell::new(Vec::new()));
    let watch = board.value_for(share, field, LocateOptions::new(), record(&emissions));
    assert_eq!(emissions.borrow().as_slice(), &[Some((7, pane))]);

    board.cut(watch);
    assert_eq!(emissions.borrow().as_slice(), &[Some((7, pane)), None]);

    // The subscription is gone: further changes are not delivered.
    let _ = board.share_value(share, pane, |_| Provided::Value(8));
    assert_eq!(emissions.borrow().len(), 2);
}

#[test]
fn empty_subscription_cut_stays_silent() {
    let mut board = ShareBoard::new();
    let share = board.declare::<i32>("depth");
    let field = board.insert::<Field>(None, None);

    let emissions: Emissions<i32> = Rc::new(RefCell::new(Vec::new()));
    let watch = board.value_for(share, field, LocateOptions::new(), record(&emissions));
    board.cut(watch);

    // Replay was empty, so no final "nothing" is repeated.
    assert_eq!(emissions.borrow().as_slice(), &[None]);
}

#[test]
fn shadow_boundaries_respect_the_host_mode() {
    let mut board = ShareBoard::new();
    let share = board.declare::<i32>("depth");

    let host = board.insert::<Pane>(None, Some("pane"));
    let shadow = board.insert_shadow::<Pane>(host, None);
    let field = board.insert::<Field>(Some(shadow), None);

    let _ = board.add_sharer(share, host);
    let _ = board.share_value(share, host, |_| Provided::Value(7));

    // Deep stepping crosses the shadow boundary to the host's tree.
    assert_eq!(
        board.locate(share, field, &LocateOptions::new()),
        Some((7, host))
    );

    // Shallow stepping stays inside the shadow tree.
    let shallow = LocateOptions::new().with_host(HostMode::Shallow);
    assert_eq!(board.locate(share, field, &shallow), None);
}

#[test]
fn custom_host_functions_walk_foreign_structure() {
    let mut board = ShareBoard::new();
    let share = board.declare::<i32>("depth");

    let detached_sharer = board.insert::<Pane>(None, Some("pane"));
    let field = board.insert::<Field>(None, None);
    let _ = board.add_sharer(share, detached_sharer);
    let _ = board.share_value(share, detached_sharer, |_| Provided::Value(7));

    // The structural tree knows no link, but the caller's host function does.
    let opts = LocateOptions::new().with_host(HostMode::Custom(Box::new(move |node| {
        (node == field).then_some(detached_sharer)
    })));
    assert_eq!(board.locate(share, field, &opts), Some((7, detached_sharer)));
}

#[test]
fn removing_a_sharer_node_tears_everything_down() {
    let mut board = ShareBoard::new();
    let share = board.declare::<i32>("depth");

    let outer = board.insert::<Pane>(None, Some("pane"));
    let inner = board.insert::<Pane>(Some(outer), Some("pane"));
    let field = board.insert::<Field>(Some(inner), None);

    let _ = board.add_sharer(share, outer);
    let _ = board.add_sharer(share, inner);
    let _ = board.share_value(share, outer, |_| Provided::Value(1));
    let _ = board.share_value(share, inner, |_| Provided::Value(2));

    let emissions: Emissions<i32> = Rc::new(RefCell::new(Vec::new()));
    let _watch = board.value_for(share, field, LocateOptions::new(), record(&emissions));
    assert_eq!(emissions.borrow().as_slice(), &[Some((2, inner))]);

    // Removing the inner sharer detaches the consumer subtree: the field is
    // disconnected, so it resolves to nothing rather than to the outer pane.
    board.remove(inner);
    assert_eq!(
        emissions.borrow().as_slice(),
        &[Some((2, inner)), None]
    );
    assert_eq!(board.status(field), NodeStatus::Disconnected);
    assert!(board.sharers(share).has_name("pane")); // outer is still registered
}

#[test]
fn lifetimes_cascade_through_needs() {
    let mut board = ShareBoard::new();
    let share = board.declare::<i32>("depth");

    let pane = board.insert::<Pane>(None, Some("pane"));
    let field = board.insert::<Field>(Some(pane), None);

    let component = board.supply();
    let sharer = board.add_sharer(share, pane);
    let value = board.share_value(share, pane, |_| Provided::Value(7));
    board.needs(sharer, component);
    board.needs(value.supply(), component);

    assert_eq!(
        board.locate(share, field, &LocateOptions::new()),
        Some((7, pane))
    );

    // Tearing down the component detaches both registrations at once.
    board.cut(component);
    assert!(board.is_off(sharer));
    assert!(board.is_off(value.supply()));
    assert_eq!(board.locate(share, field, &LocateOptions::new()), None);
    assert!(board.sharers(share).is_empty());
}
