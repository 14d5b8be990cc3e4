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

#![deny(missing_docs, missing_debug_implementations)]

//! # CgrSim
//!
//! This is a library for simulating store-and-forward nodes in a Delay-Tolerant Network (DTN)
//! whose links only exist during scheduled contact windows, as is the case for satellite
//! constellations. Routing follows the Contact Graph Routing (CGR) approach: the predicted
//! contact plan is turned into a graph whose vertices are contacts, and a route is a simple
//! path through that graph.
//!
//! ## Main Concepts
//!
//! The topology over time is described by a [`time_graph::TimeEvolvingGraph`]: a directed
//! multigraph over named nodes where every edge is one [`time_graph::ContactWindow`]. For a
//! given origin and destination, the time-evolving graph is converted into a
//! [`contact_graph::ContactGraph`] (see [Petgraph](https://docs.rs/petgraph)), whose vertices
//! are [`contact_graph::Contact`]s and whose edges mean "arrive via this contact, then
//! transmit via that one". Enumerating all simple paths of the contact graph yields
//! [`route::Route`]s, collected per destination in a [`route::RouteTable`].
//!
//! A [`node::DtnNode`] owns the route table together with priority send queues and a limbo
//! for bundles that cannot be routed right now. Incoming [`bundle::Bundle`]s are checked
//! against the table (deadline, contact windows, queue backlog, volume), get a route and a
//! next hop assigned, and wait in their queue until the next hop's contact opens. The actual
//! transmission goes through a [`transport::SpaceLink`], a UDP datagram link to the shared
//! space-segment simulator which models propagation delay and loss.
//!
//! ## Example usage
//!
//! ```
//! use cgrsim::prelude::*;
//!
//! fn main() -> Result<(), RoutingError> {
//!     let mut teg = TimeEvolvingGraph::new(0, 60);
//!     teg.add_contact_window("A", "B", ContactWindow::new(0, 10, 1, 100));
//!     teg.add_contact_window("B", "C", ContactWindow::new(2, 12, 1, 100));
//!
//!     let cg = teg.to_contact_graph("A", "C")?.expect("A can reach C");
//!     let routes = cg.routes(0, &EnumerationLimits::default());
//!
//!     assert_eq!(routes[0].path, vec!["A", "B", "C"]);
//!     assert_eq!(routes[0].total_time, 3);
//!     Ok(())
//! }
//! ```

pub mod bundle;
pub mod contact_graph;
pub mod interrupt;
pub mod io;
pub mod node;
pub mod prelude;
pub mod route;
pub mod time_graph;
pub mod transport;
pub mod types;

#[cfg(test)]
mod test;
