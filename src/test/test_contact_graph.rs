// CgrSim: Contact Graph Routing for Delay-Tolerant Satellite Networks
// Copyright (C) 2023-2024 Tibor Schneider <sctibor@ethz.ch>
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

use maplit::btreemap;
use pretty_assertions::assert_eq;

use crate::contact_graph::{Contact, ContactGraph, EnumerationLimits};
use crate::types::INFINITE_RATE;

fn contact(from: &str, to: &str, start: i64, end: i64, distance: i64, rate: u64) -> Contact {
    Contact {
        from: from.to_string(),
        to: to.to_string(),
        start,
        end,
        distance,
        rate,
    }
}

fn sentinel(node: &str, start: i64, end: i64) -> Contact {
    contact(node, node, start, end, 0, INFINITE_RATE)
}

/// A-B then B-C, anchored by the synthetic contacts.
fn chain_graph() -> ContactGraph {
    ContactGraph::new(vec![
        sentinel("A", 0, 20),
        contact("A", "B", 0, 10, 1, 100),
        contact("B", "C", 2, 12, 1, 100),
        sentinel("C", 0, 20),
    ])
}

#[test]
fn chain_has_one_route() {
    let routes = chain_graph().all_routes(&Default::default());
    assert_eq!(routes.len(), 1);

    let route = &routes[0];
    assert_eq!(route.path, vec!["A", "B", "C"]);
    assert_eq!(route.start_time, btreemap! {"B".to_string() => 0, "C".to_string() => 2});
    assert_eq!(route.end_time, btreemap! {"B".to_string() => 10, "C".to_string() => 12});
    assert_eq!(route.distance, btreemap! {"B".to_string() => 1, "C".to_string() => 1});
    assert_eq!(route.rate, 1000);
    assert_eq!(route.total_time, 3);
}

#[test]
fn zero_volume_routes_are_discarded() {
    let graph = ContactGraph::new(vec![
        sentinel("A", 0, 20),
        contact("A", "B", 0, 10, 1, 0),
        contact("B", "C", 2, 12, 1, 100),
        sentinel("C", 0, 20),
    ]);
    assert!(graph.all_routes(&Default::default()).is_empty());
}

/// Direct window plus a relayed alternative: shortest routes come first.
fn diamond_graph() -> ContactGraph {
    ContactGraph::new(vec![
        sentinel("A", 0, 60),
        contact("A", "B", 0, 30, 1, 100),
        contact("B", "C", 10, 40, 1, 100),
        contact("A", "C", 20, 50, 2, 100),
        sentinel("C", 0, 60),
    ])
}

#[test]
fn routes_are_sorted_by_hop_count() {
    let routes = diamond_graph().all_routes(&Default::default());
    assert_eq!(routes.len(), 2);
    assert_eq!(routes[0].path, vec!["A", "C"]);
    assert_eq!(routes[0].hops(), 1);
    assert_eq!(routes[1].path, vec!["A", "B", "C"]);
    assert_eq!(routes[1].hops(), 2);
}

#[test]
fn first_k_routes() {
    let graph = diamond_graph();
    assert_eq!(graph.routes(1, &Default::default()).len(), 1);
    assert_eq!(graph.routes(0, &Default::default()).len(), 2);
}

#[test]
fn enumeration_respects_path_cap() {
    let limits = EnumerationLimits {
        max_hops: None,
        max_paths: 1,
    };
    assert_eq!(diamond_graph().all_routes(&limits).len(), 1);
}

#[test]
fn enumeration_respects_hop_bound() {
    let limits = EnumerationLimits {
        max_hops: Some(1),
        max_paths: 10_000,
    };
    let routes = diamond_graph().all_routes(&limits);
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].path, vec!["A", "C"]);
}

#[test]
fn synthetic_contacts_never_bottleneck() {
    // both sentinels span the horizon with infinite rate; the tightest real contact wins
    let routes = chain_graph().all_routes(&Default::default());
    assert_eq!(routes[0].rate, 100 * 10);
}

#[test]
fn parallel_windows_are_distinct_routes() {
    let graph = ContactGraph::new(vec![
        sentinel("D", 0, 60),
        contact("D", "E", 0, 10, 1, 100),
        contact("D", "E", 30, 40, 1, 200),
        sentinel("E", 0, 60),
    ]);
    let routes = graph.all_routes(&Default::default());
    assert_eq!(routes.len(), 2);
    assert_eq!(routes[0].path, routes[1].path);
    assert_ne!(routes[0].start_time, routes[1].start_time);
}
