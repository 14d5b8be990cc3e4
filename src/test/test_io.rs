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

use std::collections::HashMap;
use std::path::Path;

use pretty_assertions::assert_eq;

use super::{route, test_node};
use crate::io::TimeGraphFile;
use crate::types::NodeError;

fn demo_file() -> TimeGraphFile {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("time_graphs")
        .join("graph1.json");
    TimeGraphFile::load(&path).unwrap()
}

#[test]
fn demo_plan_parses() {
    let file = demo_file();
    assert_eq!(file.addresses.len(), 5);
    assert_eq!(file.addresses["A"], ("127.0.0.1".to_string(), 8881));
    assert_eq!(file.start_time, 0);
    assert_eq!(file.end_time, 60);
    assert_eq!(file.contacts.len(), 8);
}

#[test]
fn demo_plan_builds_the_topology() {
    let teg = demo_file().time_graph();
    assert_eq!(teg.node_count(), 5);
    assert_eq!(teg.window_count(), 8);

    let routes = teg
        .to_contact_graph("A", "E")
        .unwrap()
        .unwrap()
        .all_routes(&Default::default());
    assert!(!routes.is_empty());
    // best-ordered: hop counts never decrease
    assert!(routes.windows(2).all(|w| w[0].hops() <= w[1].hops()));
    // the direct A->E window is the shortest route
    assert_eq!(routes[0].path, vec!["A", "E"]);
}

#[test]
fn non_json_files_are_rejected() {
    let err = TimeGraphFile::load(Path::new("time_graphs/plan.txt")).unwrap_err();
    assert!(matches!(err, NodeError::InvalidTimeGraph(_)));
}

#[test]
fn precomputed_routes_are_used_verbatim() {
    let (mut node, _space) = test_node("A", 1);
    let file = TimeGraphFile {
        addresses: HashMap::from([
            ("A".to_string(), ("127.0.0.1".to_string(), 9991)),
            ("E".to_string(), ("127.0.0.1".to_string(), 9995)),
        ]),
        start_time: 0,
        end_time: 60,
        contacts: Vec::new(),
        routes: HashMap::from([(
            "E".to_string(),
            vec![route(&["A", "E"], &[5], &[60], &[0], 10_000, 1)],
        )]),
    };
    node.assign_time_graph(file).unwrap();
    assert_eq!(node.route_table().towards("E").len(), 1);
    assert_eq!(node.address_of("E"), Some(("127.0.0.1", 9995)));
}
