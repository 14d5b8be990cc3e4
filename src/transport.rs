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

//! Module defining the datagram link towards the space segment.

use std::net::UdpSocket;
use std::time::Duration;

use log::*;

use crate::bundle::Bundle;
use crate::types::NodeError;

/// Delimiter between the sections of a node-to-space datagram.
pub const SECTION_DELIMITER: &str = "###";

/// Where the space-segment simulator listens. Injected into every node at construction; the
/// default matches the space binary's default bind address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceConfig {
    /// Host of the space endpoint.
    pub host: String,
    /// Port of the space endpoint.
    pub port: u16,
}

impl Default for SpaceConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl SpaceConfig {
    /// The `(host, port)` form accepted by the socket API.
    pub fn endpoint(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

/// The node's datagram link: an unbound sending socket plus, once the node knows its own
/// address, a bound receiving socket.
///
/// Every transmission goes to the space endpoint, which models propagation delay and loss
/// before delivering the bundle to the next hop. Receptions are bare encoded bundles.
#[derive(Debug)]
pub struct SpaceLink {
    space: SpaceConfig,
    sender: UdpSocket,
    receiver: Option<UdpSocket>,
}

impl SpaceLink {
    /// Create the link towards the given space endpoint.
    pub fn new(space: SpaceConfig) -> Result<Self, NodeError> {
        let sender = UdpSocket::bind(("0.0.0.0", 0))?;
        Ok(Self {
            space,
            sender,
            receiver: None,
        })
    }

    /// Bind the receiving socket to the node's own address.
    pub fn bind(&mut self, host: &str, port: u16) -> Result<(), NodeError> {
        let socket = UdpSocket::bind((host, port))?;
        debug!("listening on {host}:{port}");
        self.receiver = Some(socket);
        Ok(())
    }

    /// Set the receive timeout, the tick length of the node's scheduler.
    pub fn set_timeout(&self, timeout: Duration) -> Result<(), NodeError> {
        if let Some(receiver) = &self.receiver {
            receiver.set_read_timeout(Some(timeout))?;
        }
        Ok(())
    }

    /// Hand a bundle to the space segment for delivery at `address`.
    ///
    /// The datagram is `ENCODED###('host', port)###next_hop`: the space segment needs the
    /// final address and the next hop's name to announce and route the bundle, and parses
    /// the address in the rendered-tuple form.
    pub fn send_bundle(
        &self,
        bundle: &Bundle,
        address: (&str, u16),
        next_hop: &str,
    ) -> Result<(), NodeError> {
        let datagram = format!(
            "{}{delim}('{}', {}){delim}{}",
            bundle.encode(),
            address.0,
            address.1,
            next_hop,
            delim = SECTION_DELIMITER,
        );
        self.sender
            .send_to(datagram.as_bytes(), self.space.endpoint())?;
        Ok(())
    }

    /// Receive one datagram, an encoded bundle. Timeouts surface as [`std::io::Error`] with
    /// kind `WouldBlock` or `TimedOut`, which the receive loop treats as its tick.
    pub fn recv(&self, buf: &mut [u8]) -> Result<String, std::io::Error> {
        let receiver = self.receiver.as_ref().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotConnected, "receive socket not bound")
        })?;
        let (len, _) = receiver.recv_from(buf)?;
        Ok(String::from_utf8_lossy(&buf[..len]).into_owned())
    }

    /// `true` once the receiving socket is bound.
    pub fn is_bound(&self) -> bool {
        self.receiver.is_some()
    }
}
