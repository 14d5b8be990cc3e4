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

//! Module defining the time-evolving topology and its conversion into a contact graph.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use log::*;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use crate::contact_graph::{Contact, ContactGraph};
use crate::types::{IndexType, RoutingError, TimeSeconds, INFINITE_RATE};

/// Node Identification (and index into the graph)
pub type NodeId = NodeIndex<IndexType>;

/// One link availability window between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactWindow {
    /// Time the link comes up.
    pub start: TimeSeconds,
    /// Time the link goes down.
    pub end: TimeSeconds,
    /// One-way propagation delay in seconds.
    pub distance: TimeSeconds,
    /// Transmission rate in bytes per second.
    pub rate: u64,
}

impl ContactWindow {
    /// Create a new contact window.
    pub fn new(start: TimeSeconds, end: TimeSeconds, distance: TimeSeconds, rate: u64) -> Self {
        Self {
            start,
            end,
            distance,
            rate,
        }
    }
}

/// The topology during one epoch: the links that are up, all sharing the epoch's window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Epoch start.
    pub start: TimeSeconds,
    /// Epoch end.
    pub end: TimeSeconds,
    /// Directed links up during this epoch.
    pub links: Vec<SnapshotLink>,
}

/// A directed link inside a [`Snapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotLink {
    /// Transmitting node.
    pub from: String,
    /// Receiving node.
    pub to: String,
    /// One-way propagation delay in seconds.
    pub distance: TimeSeconds,
    /// Transmission rate in bytes per second.
    pub rate: u64,
}

/// A time-evolving graph: named nodes connected by contact windows.
///
/// The graph is a directed multigraph; two nodes are connected by one edge per predicted
/// contact window. The union over all windows is what routes are searched on, so a window
/// is never consulted for path existence, only for route timing.
#[derive(Debug, Clone)]
pub struct TimeEvolvingGraph {
    graph: DiGraph<String, ContactWindow, IndexType>,
    names: HashMap<String, NodeId>,
    start_time: TimeSeconds,
    end_time: TimeSeconds,
}

impl TimeEvolvingGraph {
    /// Create an empty graph spanning the given plan horizon.
    pub fn new(start_time: TimeSeconds, end_time: TimeSeconds) -> Self {
        Self {
            graph: DiGraph::default(),
            names: HashMap::new(),
            start_time,
            end_time,
        }
    }

    /// Build the graph from per-epoch snapshots. The horizon spans from the earliest epoch
    /// start to the latest epoch end; every link becomes one window over its epoch.
    pub fn from_snapshots(snapshots: &[Snapshot]) -> Self {
        let start = snapshots.iter().map(|s| s.start).min().unwrap_or(0);
        let end = snapshots.iter().map(|s| s.end).max().unwrap_or(0);
        let mut teg = Self::new(start, end);
        for snapshot in snapshots {
            for link in &snapshot.links {
                teg.add_contact_window(
                    &link.from,
                    &link.to,
                    ContactWindow::new(snapshot.start, snapshot.end, link.distance, link.rate),
                );
            }
        }
        teg
    }

    /// Start of the plan horizon.
    pub fn start_time(&self) -> TimeSeconds {
        self.start_time
    }

    /// End of the plan horizon.
    pub fn end_time(&self) -> TimeSeconds {
        self.end_time
    }

    /// Add a node to the graph, or return the existing one with that name.
    pub fn add_node(&mut self, name: impl Into<String>) -> NodeId {
        let name = name.into();
        match self.names.get(&name) {
            Some(id) => *id,
            None => {
                let id = self.graph.add_node(name.clone());
                self.names.insert(name, id);
                id
            }
        }
    }

    /// Add one contact window between two nodes, creating the nodes if necessary.
    pub fn add_contact_window(
        &mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        window: ContactWindow,
    ) {
        let from = self.add_node(from);
        let to = self.add_node(to);
        self.graph.add_edge(from, to, window);
    }

    /// Look up a node by name.
    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    /// Iterate over all node names.
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.graph.node_weights().map(String::as_str)
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of contact windows.
    pub fn window_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Convert the graph into the contact graph for one origin/destination pair.
    ///
    /// Only contact windows lying on some simple path from origin to destination become
    /// contacts; every parallel window is a contact of its own, but each window is included
    /// at most once no matter how many paths traverse it. Returns `Ok(None)` when the
    /// destination is unreachable.
    pub fn to_contact_graph(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<Option<ContactGraph>, RoutingError> {
        if origin == destination {
            return Err(RoutingError::SelfRouting(origin.to_string()));
        }
        let origin_id = self
            .node_id(origin)
            .ok_or_else(|| RoutingError::NodeNotFound(origin.to_string()))?;
        let destination_id = self
            .node_id(destination)
            .ok_or_else(|| RoutingError::NodeNotFound(destination.to_string()))?;

        let paths = self.simple_node_paths(origin_id, destination_id);
        if paths.is_empty() {
            debug!("no path from {origin} to {destination}");
            return Ok(None);
        }

        // Collect every window on a consecutive pair of some path, in discovery order.
        let mut seen: HashSet<EdgeIndex<IndexType>> = HashSet::new();
        let mut windows: Vec<EdgeIndex<IndexType>> = Vec::new();
        for path in &paths {
            for pair in path.windows(2) {
                for edge in self.graph.edges_connecting(pair[0], pair[1]) {
                    if seen.insert(edge.id()) {
                        windows.push(edge.id());
                    }
                }
            }
        }

        let mut contacts = Vec::with_capacity(windows.len() + 2);
        contacts.push(self.synthetic_contact(origin));
        for edge in windows {
            let (a, b) = self
                .graph
                .edge_endpoints(edge)
                .expect("edge taken from this graph");
            let window = self.graph[edge];
            contacts.push(Contact {
                from: self.graph[a].clone(),
                to: self.graph[b].clone(),
                start: window.start,
                end: window.end,
                distance: window.distance,
                rate: window.rate,
            });
        }
        contacts.push(self.synthetic_contact(destination));

        Ok(Some(ContactGraph::new(contacts)))
    }

    /// The loopback contact anchoring a route at the origin or destination: it spans the
    /// whole horizon and can never be the volume bottleneck.
    fn synthetic_contact(&self, node: &str) -> Contact {
        Contact {
            from: node.to_string(),
            to: node.to_string(),
            start: self.start_time,
            end: self.end_time,
            distance: 0,
            rate: INFINITE_RATE,
        }
    }

    /// All simple node paths from `from` to `to` over the union of all windows. Parallel
    /// windows collapse to a single step for the purpose of path existence.
    fn simple_node_paths(&self, from: NodeId, to: NodeId) -> Vec<Vec<NodeId>> {
        let mut paths = Vec::new();
        let mut visited = vec![from];
        self.paths_dfs(from, to, &mut visited, &mut paths);
        paths
    }

    fn paths_dfs(
        &self,
        current: NodeId,
        to: NodeId,
        visited: &mut Vec<NodeId>,
        paths: &mut Vec<Vec<NodeId>>,
    ) {
        if current == to {
            paths.push(visited.clone());
            return;
        }
        let successors: Vec<NodeId> = self
            .graph
            .neighbors_directed(current, Direction::Outgoing)
            .unique()
            .collect();
        for next in successors {
            if visited.contains(&next) {
                continue;
            }
            visited.push(next);
            self.paths_dfs(next, to, visited, paths);
            visited.pop();
        }
    }
}
