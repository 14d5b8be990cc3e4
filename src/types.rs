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

//! Module containing all type definitions

use thiserror::Error;

pub(crate) type IndexType = u32;

/// Time in whole seconds. The engine keeps a single signed integer clock: contact plans use
/// absolute plan seconds, while a running node anchors it at its own start.
pub type TimeSeconds = i64;

/// Transmission rate sentinel for the synthetic source and terminal contacts, which must
/// never be the volume bottleneck of a route.
pub const INFINITE_RATE: u64 = u64::MAX;

/// Errors raised while constructing contact graphs and route tables.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RoutingError {
    /// Routes from a node to itself are meaningless; the caller mixed up its arguments.
    #[error("origin and destination are the same node: {0}")]
    SelfRouting(String),
    /// A node name does not exist in the time-evolving graph.
    #[error("node {0} is not part of the topology")]
    NodeNotFound(String),
}

/// Node Errors
#[derive(Error, Debug)]
pub enum NodeError {
    /// A datagram could not be parsed back into a bundle.
    #[error("malformed bundle encoding: {0}")]
    InvalidEncoding(String),
    /// Routing error which cannot be handled
    #[error("routing error: {0}")]
    Routing(#[from] RoutingError),
    /// The address table has no entry for the requested node.
    #[error("no address known for node {0}")]
    AddressUnknown(String),
    /// The time-graph file is missing or malformed.
    #[error("invalid time graph file: {0}")]
    InvalidTimeGraph(String),
    /// Json error
    #[error("{0}")]
    JsonError(Box<serde_json::Error>),
    /// Socket or file failure at the node boundary.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<serde_json::Error> for NodeError {
    fn from(value: serde_json::Error) -> Self {
        Self::JsonError(Box::new(value))
    }
}

/// Why a bundle was discarded instead of being queued or forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The bundle's deadline has already passed.
    DeadlineExpired,
    /// The bundle carries a route that does not lead through this node.
    RouteMismatch,
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DeadlineExpired => write!(f, "deadline expired"),
            Self::RouteMismatch => write!(f, "route does not contain this node"),
        }
    }
}
