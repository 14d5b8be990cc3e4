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

//! Module defining route summaries and the per-destination route table.

use std::collections::{BTreeMap, HashMap};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::types::TimeSeconds;

/// A summarised simple path through the contact graph.
///
/// Per-hop attributes are keyed by the *receiving* node of the hop, so `start_time[n]` is the
/// opening of the contact over which `n` receives the bundle. The maps are ordered so that the
/// serialized form (embedded in the bundle wire encoding) is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Node names along the route, origin first, destination last.
    pub path: Vec<String>,
    /// Opening time of the contact towards each receiver.
    pub start_time: BTreeMap<String, TimeSeconds>,
    /// Closing time of the contact towards each receiver.
    pub end_time: BTreeMap<String, TimeSeconds>,
    /// One-way propagation delay towards each receiver, in seconds.
    pub distance: BTreeMap<String, TimeSeconds>,
    /// Volume of the tightest contact along the route, in bytes.
    pub rate: u64,
    /// End-to-end latency assuming the bundle leaves at plan time zero and waits for every
    /// contact to open.
    pub total_time: TimeSeconds,
}

impl Route {
    /// Number of hops (transmissions) along the route.
    pub fn hops(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    /// The first node after the origin, i.e. the next hop for a bundle sent by the origin.
    pub fn first_hop(&self) -> Option<&str> {
        self.path.get(1).map(String::as_str)
    }

    /// Position of `node` along the path.
    pub fn position_of(&self, node: &str) -> Option<usize> {
        self.path.iter().position(|n| n == node)
    }

    /// Opening time of the contact over which `receiver` gets the bundle.
    pub fn start_at(&self, receiver: &str) -> Option<TimeSeconds> {
        self.start_time.get(receiver).copied()
    }

    /// Closing time of the contact over which `receiver` gets the bundle.
    pub fn end_at(&self, receiver: &str) -> Option<TimeSeconds> {
        self.end_time.get(receiver).copied()
    }

    /// Propagation delay of the hop towards `receiver`.
    pub fn distance_at(&self, receiver: &str) -> Option<TimeSeconds> {
        self.distance.get(receiver).copied()
    }

    /// Closing time of the final contact, the one that reaches the destination.
    pub fn final_contact_end(&self) -> TimeSeconds {
        self.path
            .last()
            .and_then(|n| self.end_time.get(n))
            .copied()
            .unwrap_or(0)
    }

    /// Short human-readable form, mostly for log lines.
    pub fn fmt_path(&self) -> String {
        self.path.iter().join(" ")
    }
}

/// Routes towards every known destination, ordered by hop count ascending.
///
/// The table is a plain container: the order of the route lists is established by the
/// contact-graph enumeration and preserved here, since the admissibility tie-break uses the
/// original index as its last resort.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteTable {
    routes: HashMap<String, Vec<Route>>,
}

impl RouteTable {
    /// Create an empty route table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all routes towards `destination`.
    pub fn set_routes(&mut self, destination: impl Into<String>, routes: Vec<Route>) {
        self.routes.insert(destination.into(), routes);
    }

    /// All routes towards `destination`, best-ordered. Empty if the destination is unknown.
    pub fn towards(&self, destination: &str) -> &[Route] {
        self.routes
            .get(destination)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Iterate over all destinations with at least one stored route list.
    pub fn destinations(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    /// `true` if no destination is known.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Number of destinations with a stored route list.
    pub fn len(&self) -> usize {
        self.routes.len()
    }
}
