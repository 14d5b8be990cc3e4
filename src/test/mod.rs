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

use std::collections::BTreeMap;
use std::net::UdpSocket;
use std::time::Duration;

use crate::node::DtnNode;
use crate::route::Route;
use crate::time_graph::{ContactWindow, TimeEvolvingGraph};
use crate::transport::{SpaceConfig, SECTION_DELIMITER};
use crate::types::TimeSeconds;

mod test_contact_graph;
mod test_io;
mod test_time_graph;

/// The 3-node chain: A reaches C over B, with overlapping windows.
fn chain_teg() -> TimeEvolvingGraph {
    let mut teg = TimeEvolvingGraph::new(0, 20);
    teg.add_contact_window("A", "B", ContactWindow::new(0, 10, 1, 100));
    teg.add_contact_window("B", "C", ContactWindow::new(2, 12, 1, 100));
    teg
}

/// The routes of the chain, as node A computes them.
fn chain_routes() -> Vec<Route> {
    chain_teg()
        .to_contact_graph("A", "C")
        .unwrap()
        .unwrap()
        .routes(0, &Default::default())
}

/// Build a route by hand. Receivers are `path[1..]`; all per-hop maps share the given
/// values index-aligned with the receivers.
fn route(
    path: &[&str],
    starts: &[TimeSeconds],
    ends: &[TimeSeconds],
    distances: &[TimeSeconds],
    rate: u64,
    total_time: TimeSeconds,
) -> Route {
    let receivers = || path.iter().skip(1).map(|n| n.to_string());
    let map = |values: &[TimeSeconds]| -> BTreeMap<String, TimeSeconds> {
        receivers().zip(values.iter().copied()).collect()
    };
    Route {
        path: path.iter().map(|n| n.to_string()).collect(),
        start_time: map(starts),
        end_time: map(ends),
        distance: map(distances),
        rate,
        total_time,
    }
}

/// A node named `name` with a private space endpoint, plus the listener socket standing in
/// for the space segment. Every other node of the demo alphabet gets a dummy address.
fn test_node(name: &str, priority_count: usize) -> (DtnNode, UdpSocket) {
    let space = UdpSocket::bind(("127.0.0.1", 0)).unwrap();
    space
        .set_read_timeout(Some(Duration::from_millis(500)))
        .unwrap();
    let config = SpaceConfig {
        host: "127.0.0.1".to_string(),
        port: space.local_addr().unwrap().port(),
    };
    let mut node = DtnNode::new(name, priority_count, config).unwrap();
    for (i, other) in ["A", "B", "C", "D", "E"].into_iter().enumerate() {
        node.set_address(other, "127.0.0.1", 9991 + i as u16);
    }
    (node, space)
}

/// Read one datagram off the fake space socket, `None` on timeout.
fn recv_datagram(space: &UdpSocket) -> Option<String> {
    let mut buf = [0u8; 65536];
    match space.recv_from(&mut buf) {
        Ok((len, _)) => Some(String::from_utf8_lossy(&buf[..len]).into_owned()),
        Err(_) => None,
    }
}

/// The encoded bundle of a node-to-space datagram.
fn datagram_bundle(datagram: &str) -> crate::bundle::Bundle {
    let encoded = datagram.split(SECTION_DELIMITER).next().unwrap();
    crate::bundle::Bundle::decode(encoded).unwrap()
}
