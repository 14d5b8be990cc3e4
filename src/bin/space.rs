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

//! The space segment: every transmission crosses it. Bundles are held for their propagation
//! delay, possibly lost, and then delivered to the next hop's address.

use std::net::UdpSocket;
use std::process::exit;
use std::time::Duration;

use clap::Parser;
use log::{error, info, warn};
use rand::Rng;

use cgrsim::bundle::Bundle;
use cgrsim::interrupt;
use cgrsim::transport::SECTION_DELIMITER;
use cgrsim::types::NodeError;

/// Simulate the space between the nodes: propagation delay and loss.
#[derive(Debug, Parser)]
struct Cli {
    /// Probability that a travelling bundle is lost, checked once per second.
    #[clap(default_value_t = 0.0)]
    loss_probability: f64,
    /// Host to bind to.
    #[clap(long, default_value = "127.0.0.1")]
    host: String,
    /// Port to bind to.
    #[clap(long, default_value_t = 8080)]
    port: u16,
}

/// One bundle in flight, counting down its propagation delay.
#[derive(Debug)]
struct TravellingBundle {
    bundle: Bundle,
    timer: i64,
    destination: (String, u16),
    next_hop: String,
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
    let socket = UdpSocket::bind((args.host.as_str(), args.port))?;
    socket.set_read_timeout(Some(Duration::from_secs(1)))?;
    info!("space running on {}:{}", args.host, args.port);

    let mut rng = rand::thread_rng();
    let mut in_flight: Vec<TravellingBundle> = Vec::new();
    let mut buf = vec![0u8; 65536];

    while !interrupt::interrupted() {
        match socket.recv_from(&mut buf) {
            Ok((len, _)) => {
                let datagram = String::from_utf8_lossy(&buf[..len]).into_owned();
                match parse_datagram(&datagram) {
                    Ok(travelling) => {
                        info!(
                            "bundle travelling through space to the next hop, node {}",
                            travelling.next_hop
                        );
                        in_flight.push(travelling);
                    }
                    Err(e) => warn!("dropping malformed datagram: {e}"),
                }
            }
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) =>
            {
                // one tick: deliver everything that has arrived, then age the rest
                let mut kept = Vec::with_capacity(in_flight.len());
                for mut travelling in in_flight {
                    if travelling.timer <= 0 {
                        let address = (
                            travelling.destination.0.as_str(),
                            travelling.destination.1,
                        );
                        socket.send_to(travelling.bundle.encode().as_bytes(), address)?;
                        info!("bundle arriving to node {}", travelling.next_hop);
                    } else {
                        travelling.timer -= 1;
                        if rng.gen::<f64>() < args.loss_probability {
                            info!("bundle lost in space");
                        } else {
                            kept.push(travelling);
                        }
                    }
                }
                in_flight = kept;
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    info!("space shutting down");
    Ok(())
}

/// Split a node-to-space datagram into the travelling bundle it describes. The delay is the
/// propagation distance of the hop the bundle is crossing.
fn parse_datagram(datagram: &str) -> Result<TravellingBundle, NodeError> {
    let sections: Vec<&str> = datagram.split(SECTION_DELIMITER).collect();
    let &[encoded, address, next_hop] = sections.as_slice() else {
        return Err(NodeError::InvalidEncoding(format!(
            "expected 3 sections, got {}",
            sections.len()
        )));
    };

    let bundle = Bundle::decode(encoded)?;
    let destination = parse_address(address)?;
    let timer = bundle
        .assigned_route
        .as_ref()
        .and_then(|route| route.distance_at(next_hop))
        .unwrap_or(0);

    Ok(TravellingBundle {
        bundle,
        timer,
        destination,
        next_hop: next_hop.to_string(),
    })
}

/// Parse an address rendered as `('host', port)`.
fn parse_address(section: &str) -> Result<(String, u16), NodeError> {
    let bad = || NodeError::InvalidEncoding(format!("bad address section: {section:?}"));
    let inner = section
        .trim()
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(bad)?;
    let (host, port) = inner.split_once(',').ok_or_else(bad)?;
    let host = host.trim().trim_matches('\'').to_string();
    let port = port.trim().parse().map_err(|_| bad())?;
    Ok((host, port))
}
