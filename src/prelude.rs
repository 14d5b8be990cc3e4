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

//! Re-export of the types needed for everyday use of the library.

pub use crate::bundle::Bundle;
pub use crate::contact_graph::{Contact, ContactGraph, EnumerationLimits};
pub use crate::io::{resolve_time_graph, TimeGraphFile};
pub use crate::node::{DtnNode, RouteOutcome};
pub use crate::route::{Route, RouteTable};
pub use crate::time_graph::{ContactWindow, Snapshot, SnapshotLink, TimeEvolvingGraph};
pub use crate::transport::{SpaceConfig, SpaceLink};
pub use crate::types::{DropReason, NodeError, RoutingError, TimeSeconds};
