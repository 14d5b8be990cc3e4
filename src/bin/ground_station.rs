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

//! The ground station: reads messages from the terminal and injects them as bundles at
//! their origin node.

use std::io::{BufRead, Write};
use std::net::UdpSocket;
use std::path::PathBuf;
use std::process::exit;

use clap::Parser;
use log::error;

use cgrsim::bundle::Bundle;
use cgrsim::interrupt;
use cgrsim::io::{resolve_time_graph, TimeGraphFile};
use cgrsim::types::NodeError;

/// Inject bundles into the constellation from the ground.
#[derive(Debug, Parser)]
struct Cli {
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

fn run(args: Cli) -> Result<(), NodeError> {
    let path = resolve_time_graph(&args.time_graph);
    let file = TimeGraphFile::load(&path)?;
    let socket = UdpSocket::bind(("0.0.0.0", 0))?;

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        if interrupt::interrupted() {
            println!("\nProgram finished");
            return Ok(());
        }

        let Some(message) = prompt(&mut lines, "Message to send: ")? else {
            return Ok(());
        };
        let Some(origin) = prompt(&mut lines, "First node that starts the transmission: ")? else {
            return Ok(());
        };
        let Some(destination) = prompt(&mut lines, "Destination node of the message: ")? else {
            return Ok(());
        };

        let Some((host, port)) = file.addresses.get(&origin) else {
            println!("Unknown origin node {origin}");
            continue;
        };

        let bundle = Bundle::new(origin.clone(), destination.clone(), message.clone());
        socket.send_to(bundle.encode().as_bytes(), (host.as_str(), *port))?;
        println!("Message: {message} sent to {origin} with destination {destination}");
    }
}

/// Ask one question on stdout and read the answer. `None` on end of input.
fn prompt(
    lines: &mut impl Iterator<Item = std::io::Result<String>>,
    question: &str,
) -> Result<Option<String>, NodeError> {
    print!("{question}");
    std::io::stdout().flush()?;
    match lines.next() {
        Some(Err(e)) if e.kind() == std::io::ErrorKind::Interrupted => Ok(None),
        Some(line) => Ok(Some(line?.trim().to_string())),
        None => Ok(None),
    }
}
