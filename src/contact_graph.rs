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

//! Module defining the contact graph and the route enumeration over it.

use std::collections::BTreeMap;

use log::*;
use petgraph::algo::all_simple_paths;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::route::Route;
use crate::types::{IndexType, TimeSeconds};

/// A contact: a directed transmission opportunity between two nodes during a time window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    /// Transmitting node.
    pub from: String,
    /// Receiving node.
    pub to: String,
    /// Time the window opens.
    pub start: TimeSeconds,
    /// Time the window closes. Always after `start`.
    pub end: TimeSeconds,
    /// One-way propagation delay in seconds.
    pub distance: TimeSeconds,
    /// Transmission rate in bytes per second.
    pub rate: u64,
}

impl Contact {
    /// Total number of bytes this contact can carry over its whole window.
    pub fn volume(&self) -> u64 {
        self.rate.saturating_mul((self.end - self.start).max(0) as u64)
    }

    /// The `from-to` label of the contact.
    pub fn label(&self) -> String {
        format!("{}-{}", self.from, self.to)
    }
}

/// Bounds on the route enumeration.
///
/// All-simple-path enumeration is exponential in the worst case; pathological contact plans
/// must not stall a node. Both bounds come from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumerationLimits {
    /// Maximum number of contacts per route, `None` for unbounded.
    pub max_hops: Option<usize>,
    /// Hard cap on the number of enumerated paths.
    pub max_paths: usize,
}

impl Default for EnumerationLimits {
    fn default() -> Self {
        Self {
            max_hops: None,
            max_paths: 10_000,
        }
    }
}

/// The contact graph for one origin/destination pair.
///
/// Vertices are contacts; the first vertex is the synthetic origin contact (`origin-origin`)
/// and the last the synthetic terminal contact (`destination-destination`), both spanning the
/// full plan horizon. An edge `u -> v` means a bundle arriving over `u` can next be
/// transmitted over `v`, i.e. `u.to == v.from`. Self-loops and edges out of the terminal
/// contact are never created.
#[derive(Debug, Clone)]
pub struct ContactGraph {
    graph: DiGraph<Contact, (), IndexType>,
}

impl ContactGraph {
    /// Build the graph from its contacts, in order: the synthetic origin contact first, the
    /// synthetic terminal contact last. Adjacency is derived from the contact endpoints.
    pub fn new(contacts: Vec<Contact>) -> Self {
        let mut graph = DiGraph::default();
        let ids: Vec<NodeIndex<IndexType>> =
            contacts.into_iter().map(|c| graph.add_node(c)).collect();
        let Some(&terminal) = ids.last() else {
            return Self { graph };
        };
        for &u in &ids {
            if u == terminal {
                continue;
            }
            for &v in &ids {
                if u != v && graph[u].to == graph[v].from {
                    graph.add_edge(u, v, ());
                }
            }
        }
        Self { graph }
    }

    /// Number of contacts, synthetic ones included.
    pub fn contact_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Iterate over all contacts in vertex order.
    pub fn contacts(&self) -> impl Iterator<Item = &Contact> {
        self.graph.node_weights()
    }

    /// Enumerate every simple path from the origin contact to the terminal contact and
    /// summarise each into a [`Route`], shortest paths first. Routes without any usable
    /// volume are discarded.
    pub fn all_routes(&self, limits: &EnumerationLimits) -> Vec<Route> {
        if self.graph.node_count() < 2 {
            return Vec::new();
        }
        let source = NodeIndex::new(0);
        let terminal = NodeIndex::new(self.graph.node_count() - 1);

        let mut paths: Vec<Vec<NodeIndex<IndexType>>> =
            all_simple_paths(&self.graph, source, terminal, 0, limits.max_hops)
                .take(limits.max_paths)
                .collect();
        if paths.len() == limits.max_paths {
            warn!(
                "route enumeration hit the cap of {} paths, routes may be incomplete",
                limits.max_paths
            );
        }
        paths.sort_by_key(Vec::len);

        paths
            .into_iter()
            .filter_map(|p| self.summarise(&p))
            .collect()
    }

    /// The first `k` routes in best order, or all of them for `k == 0`.
    pub fn routes(&self, k: usize, limits: &EnumerationLimits) -> Vec<Route> {
        let mut routes = self.all_routes(limits);
        if k > 0 {
            routes.truncate(k);
        }
        routes
    }

    /// Summarise one vertex path into a route. The synthetic contacts at either end carry no
    /// hop of their own and only anchor the path.
    fn summarise(&self, path: &[NodeIndex<IndexType>]) -> Option<Route> {
        let hops = &path[1..path.len() - 1];

        let mut nodes = Vec::with_capacity(hops.len() + 1);
        let mut start_time = BTreeMap::new();
        let mut end_time = BTreeMap::new();
        let mut distance = BTreeMap::new();
        let mut rate = u64::MAX;
        let mut total_time: TimeSeconds = 0;

        for &idx in hops {
            let contact = &self.graph[idx];
            nodes.push(contact.from.clone());
            start_time.insert(contact.to.clone(), contact.start);
            end_time.insert(contact.to.clone(), contact.end);
            distance.insert(contact.to.clone(), contact.distance);
            rate = rate.min(contact.volume());
            total_time = total_time.max(contact.start) + contact.distance;
        }
        let last = hops.last()?;
        nodes.push(self.graph[*last].to.clone());

        if rate == 0 {
            debug!("dropping zero-volume route {}", nodes.join(" "));
            return None;
        }

        Some(Route {
            path: nodes,
            start_time,
            end_time,
            distance,
            rate,
            total_time,
        })
    }
}
