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

//! Module for loading time-graph files.
//!
//! A time-graph file is the JSON description of one deployment: the address of every node,
//! the plan horizon, the predicted contact windows, and optionally precomputed route lists
//! that the nodes use verbatim instead of deriving their own.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::route::Route;
use crate::time_graph::{ContactWindow, TimeEvolvingGraph};
use crate::types::{NodeError, TimeSeconds};

/// One predicted contact window in a time-graph file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    /// Transmitting node.
    pub from: String,
    /// Receiving node.
    pub to: String,
    /// Time the window opens.
    pub start: TimeSeconds,
    /// Time the window closes.
    pub end: TimeSeconds,
    /// One-way propagation delay in seconds.
    pub distance: TimeSeconds,
    /// Transmission rate in bytes per second.
    pub rate: u64,
}

/// The parsed time-graph file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeGraphFile {
    /// Address of every node, as `[host, port]`.
    pub addresses: HashMap<String, (String, u16)>,
    /// Start of the plan horizon.
    #[serde(default)]
    pub start_time: TimeSeconds,
    /// End of the plan horizon.
    #[serde(default)]
    pub end_time: TimeSeconds,
    /// The predicted contact windows.
    #[serde(default)]
    pub contacts: Vec<ContactRecord>,
    /// Precomputed routes per destination, used verbatim when present.
    #[serde(default)]
    pub routes: HashMap<String, Vec<Route>>,
}

impl TimeGraphFile {
    /// Read and parse a time-graph file. Only `.json` files are accepted.
    pub fn load(path: &Path) -> Result<Self, NodeError> {
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            return Err(NodeError::InvalidTimeGraph(format!(
                "{} is not a .json file",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Build the time-evolving graph described by the file. All addressed nodes exist in
    /// the graph even when they have no contact window.
    pub fn time_graph(&self) -> TimeEvolvingGraph {
        let mut teg = TimeEvolvingGraph::new(self.start_time, self.end_time);
        for name in self.addresses.keys() {
            teg.add_node(name.clone());
        }
        for record in &self.contacts {
            teg.add_contact_window(
                record.from.clone(),
                record.to.clone(),
                ContactWindow::new(record.start, record.end, record.distance, record.rate),
            );
        }
        teg
    }
}

/// Resolve a time-graph argument the way the binaries expect it: first under the
/// `time_graphs/` directory next to the executable, then under `time_graphs/` in the working
/// directory, finally as the literal path.
pub fn resolve_time_graph(arg: &Path) -> PathBuf {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let candidate = dir.join("time_graphs").join(arg);
            if candidate.exists() {
                return candidate;
            }
        }
    }
    let candidate = Path::new("time_graphs").join(arg);
    if candidate.exists() {
        return candidate;
    }
    arg.to_path_buf()
}
