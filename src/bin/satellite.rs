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

//! One DTN node. Binds the address the time-graph file assigns to it, computes its routes,
//! and forwards bundles until interrupted.

use std::path::PathBuf;
use std::process::exit;

use clap::Parser;
use log::error;

use cgrsim::interrupt;
use cgrsim::io::{resolve_time_graph, TimeGraphFile};
use cgrsim::node::DtnNode;
use cgrsim::transport::SpaceConfig;

/// Run one DTN node of the constellation.
///
/// For example: satellite A 3 graph1.json
#[derive(Debug, Parser)]
struct Cli {
    /// Name of this node in the time graph.
    node_id: String,
    /// Number of priority classes.
    priority_count: usize,
    /// Time-graph file, looked up under the time_graphs/ directory.
    time_graph: PathBuf,
}

fn main() {
    pretty_env_logger::init_timed();
    interrupt::install_handler();
    let args = Cli::parse();

    if let Err(e) = run(args) {
        error!("{e}");
        exit(2);
    }
}

fn run(args: Cli) -> Result<(), cgrsim::types::NodeError> {
    let path = resolve_time_graph(&args.time_graph);
    let file = TimeGraphFile::load(&path)?;

    let mut node = DtnNode::new(args.node_id, args.priority_count, SpaceConfig::default())?;
    node.assign_time_graph(file)?;
    node.bind()?;
    node.compute_all_routes(0)?;

    node.run()
}
