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

use pretty_assertions::assert_eq;

use super::chain_teg;
use crate::time_graph::{ContactWindow, Snapshot, SnapshotLink, TimeEvolvingGraph};
use crate::types::RoutingError;

/// Three nodes with parallel windows between A and B, plus a backward window C to A.
fn small_teg() -> TimeEvolvingGraph {
    let mut teg = TimeEvolvingGraph::new(0, 3);
    teg.add_contact_window("A", "B", ContactWindow::new(0, 1, 1, 2));
    teg.add_contact_window("A", "B", ContactWindow::new(2, 3, 2, 3));
    teg.add_contact_window("B", "C", ContactWindow::new(1, 3, 1, 1));
    teg.add_contact_window("A", "C", ContactWindow::new(2, 3, 1, 1));
    teg.add_contact_window("C", "A", ContactWindow::new(0, 3, 1, 2));
    teg
}

#[test]
fn self_routing_is_rejected() {
    assert_eq!(
        small_teg().to_contact_graph("A", "A").unwrap_err(),
        RoutingError::SelfRouting("A".to_string())
    );
}

#[test]
fn unknown_nodes_are_rejected() {
    assert_eq!(
        small_teg().to_contact_graph("A", "Z").unwrap_err(),
        RoutingError::NodeNotFound("Z".to_string())
    );
    assert_eq!(
        small_teg().to_contact_graph("Z", "A").unwrap_err(),
        RoutingError::NodeNotFound("Z".to_string())
    );
}

#[test]
fn unreachable_destination_yields_no_graph() {
    let mut teg = TimeEvolvingGraph::new(0, 10);
    teg.add_contact_window("A", "B", ContactWindow::new(0, 10, 1, 1));
    teg.add_node("C");
    assert!(teg.to_contact_graph("A", "C").unwrap().is_none());
}

#[test]
fn conversion_keeps_only_windows_on_a_path() {
    // the backward window C->A lies on no simple path from A to C
    let graph = small_teg().to_contact_graph("A", "C").unwrap().unwrap();
    // two A->B windows, one B->C, one A->C, plus the two synthetic contacts
    assert_eq!(graph.contact_count(), 6);
    assert!(graph.contacts().all(|c| c.label() != "C-A"));
}

#[test]
fn conversion_routes_match_the_plan() {
    let graph = small_teg().to_contact_graph("A", "C").unwrap().unwrap();
    let routes = graph.all_routes(&Default::default());
    assert_eq!(routes.len(), 3);

    // the direct window is the shortest route
    assert_eq!(routes[0].path, vec!["A", "C"]);
    assert_eq!(routes[0].total_time, 3);
    assert_eq!(routes[0].rate, 1);

    // both relayed routes go over B, one per A->B window
    assert_eq!(routes[1].path, vec!["A", "B", "C"]);
    assert_eq!(routes[2].path, vec!["A", "B", "C"]);
    let mut totals: Vec<i64> = routes[1..].iter().map(|r| r.total_time).collect();
    totals.sort_unstable();
    assert_eq!(totals, vec![2, 5]);
}

#[test]
fn shared_windows_become_one_contact() {
    // C->D lies on both simple paths towards D and must appear exactly once
    let mut teg = TimeEvolvingGraph::new(0, 10);
    teg.add_contact_window("A", "B", ContactWindow::new(0, 10, 1, 1));
    teg.add_contact_window("B", "C", ContactWindow::new(0, 10, 1, 1));
    teg.add_contact_window("A", "C", ContactWindow::new(0, 10, 1, 1));
    teg.add_contact_window("C", "D", ContactWindow::new(0, 10, 1, 1));
    let graph = teg.to_contact_graph("A", "D").unwrap().unwrap();
    assert_eq!(
        graph.contacts().filter(|c| c.label() == "C-D").count(),
        1
    );
}

#[test]
fn chain_conversion() {
    let graph = chain_teg().to_contact_graph("A", "C").unwrap().unwrap();
    let routes = graph.all_routes(&Default::default());
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].path, vec!["A", "B", "C"]);
    assert_eq!(routes[0].total_time, 3);
}

#[test]
fn snapshots_union_into_windows() {
    let link = |from: &str, to: &str| SnapshotLink {
        from: from.to_string(),
        to: to.to_string(),
        distance: 1,
        rate: 10,
    };
    let teg = TimeEvolvingGraph::from_snapshots(&[
        Snapshot {
            start: 0,
            end: 10,
            links: vec![link("A", "B")],
        },
        Snapshot {
            start: 10,
            end: 20,
            links: vec![link("A", "B"), link("B", "C")],
        },
    ]);
    assert_eq!(teg.start_time(), 0);
    assert_eq!(teg.end_time(), 20);
    assert_eq!(teg.node_count(), 3);
    assert_eq!(teg.window_count(), 3);

    let routes = teg
        .to_contact_graph("A", "C")
        .unwrap()
        .unwrap()
        .all_routes(&Default::default());
    // either A->B window chains into the late B->C window
    assert_eq!(routes.len(), 2);
    assert!(routes.iter().all(|r| r.path == vec!["A", "B", "C"]));
}
