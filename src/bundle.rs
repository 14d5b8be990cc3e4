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

//! Module defining the bundle, the atomic message of the DTN, and its wire codec.

use crate::route::Route;
use crate::types::{NodeError, TimeSeconds};

/// Delimiter between the fields of an encoded bundle. Multi-character so that short payloads
/// containing a single `|` survive the round trip.
pub const FIELD_DELIMITER: &str = "|||";

/// Width of the decimal size field. The stamp never changes the length of the encoding, which
/// keeps the stamped size accurate.
const SIZE_WIDTH: usize = 8;

/// A bundle: the unit of store-and-forward transfer.
///
/// Bundles are created by the ground segment or decoded off the wire, get a route and a next
/// hop assigned by the forwarding engine, and are consumed by transmission. `size_bytes`
/// always reflects the current wire encoding; it is refreshed whenever a field that is part
/// of the encoding changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    /// Node that created the bundle.
    pub source: String,
    /// Node the bundle must reach.
    pub destination: String,
    /// Length of the wire encoding in bytes.
    pub size_bytes: u64,
    /// Urgency class, `1..=P` with higher numbers served first.
    pub priority: usize,
    /// Critical bundles are replicated over every admissible route.
    pub critical: bool,
    /// The previous node asked to take custody. Accepted on the wire, otherwise unused.
    pub custody_requested: bool,
    /// Whether the bundle may be fragmented. Accepted on the wire, otherwise unused.
    pub fragmentable: bool,
    /// Absolute deadline in seconds; 0 means the bundle never expires.
    pub deadline: TimeSeconds,
    /// Message carried by the bundle.
    pub payload: String,
    /// Route chosen by the origin, travelling with the bundle.
    pub assigned_route: Option<Route>,
    /// Node the bundle is queued towards. Set together with the route.
    pub next_hop: Option<String>,
}

impl Bundle {
    /// Create a new bundle with default flags: priority 1, not critical, no custody, may be
    /// fragmented, no deadline.
    pub fn new(
        source: impl Into<String>,
        destination: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        let mut bundle = Self {
            source: source.into(),
            destination: destination.into(),
            size_bytes: 0,
            priority: 1,
            critical: false,
            custody_requested: false,
            fragmentable: true,
            deadline: 0,
            payload: payload.into(),
            assigned_route: None,
            next_hop: None,
        };
        bundle.refresh_size();
        bundle
    }

    /// Set the priority class.
    pub fn with_priority(mut self, priority: usize) -> Self {
        self.priority = priority;
        self.refresh_size();
        self
    }

    /// Set the absolute deadline.
    pub fn with_deadline(mut self, deadline: TimeSeconds) -> Self {
        self.deadline = deadline;
        self.refresh_size();
        self
    }

    /// Mark the bundle as critical.
    pub fn with_critical(mut self) -> Self {
        self.critical = true;
        self.refresh_size();
        self
    }

    /// Attach a route and the next hop to send towards. The two always change together.
    pub fn assign_route(&mut self, route: Route, next_hop: impl Into<String>) {
        self.assigned_route = Some(route);
        self.next_hop = Some(next_hop.into());
        self.refresh_size();
    }

    /// Replace the next hop of an already routed bundle.
    pub fn set_next_hop(&mut self, next_hop: impl Into<String>) {
        self.next_hop = Some(next_hop.into());
        self.refresh_size();
    }

    /// `true` once a route and next hop are assigned.
    pub fn is_routed(&self) -> bool {
        self.assigned_route.is_some()
    }

    /// Whether the deadline has passed at `now`. A deadline of 0 never expires.
    pub fn expired(&self, now: TimeSeconds) -> bool {
        self.deadline > 0 && self.deadline <= now
    }

    /// Encode the bundle for the wire.
    ///
    /// Routed bundles encode to 11 `|||`-separated fields (the route serialized as JSON),
    /// unrouted ones to 9. The size field is the zero-padded decimal length of the full
    /// encoding, size field included.
    pub fn encode(&self) -> String {
        self.encode_with_size(&format!("{:0width$}", self.size_bytes, width = SIZE_WIDTH))
    }

    fn encode_with_size(&self, size_field: &str) -> String {
        let mut fields = vec![
            self.source.clone(),
            self.destination.clone(),
            size_field.to_string(),
            self.priority.to_string(),
            flag(self.critical).to_string(),
            flag(self.custody_requested).to_string(),
            flag(self.fragmentable).to_string(),
            self.deadline.to_string(),
            self.payload.clone(),
        ];
        if let (Some(route), Some(next_hop)) = (&self.assigned_route, &self.next_hop) {
            // Route serialization only involves strings and integers and cannot fail.
            fields.push(serde_json::to_string(route).unwrap());
            fields.push(next_hop.clone());
        }
        fields.join(FIELD_DELIMITER)
    }

    /// Recompute `size_bytes` by measuring the encoding with a placeholder size field. The
    /// placeholder has the same width as the final stamp, so the measured length is exact.
    fn refresh_size(&mut self) {
        let probe = self.encode_with_size(&"0".repeat(SIZE_WIDTH));
        self.size_bytes = probe.len() as u64;
    }

    /// Decode a bundle off the wire.
    ///
    /// Accepts the 9-field form (no route yet) and the 11-field form (route and next hop).
    /// Everything else is an [`NodeError::InvalidEncoding`].
    pub fn decode(wire: &str) -> Result<Self, NodeError> {
        let fields: Vec<&str> = wire.split(FIELD_DELIMITER).collect();
        let routed = match fields.len() {
            9 => false,
            11 => true,
            n => {
                return Err(NodeError::InvalidEncoding(format!(
                    "expected 9 or 11 fields, got {n}"
                )))
            }
        };

        let size_bytes = parse_number::<u64>(fields[2], "size")?;
        let priority = parse_number::<usize>(fields[3], "priority")?;
        let deadline = parse_number::<TimeSeconds>(fields[7], "deadline")?;

        let mut bundle = Self {
            source: fields[0].to_string(),
            destination: fields[1].to_string(),
            size_bytes,
            priority,
            critical: parse_flag(fields[4], "critical")?,
            custody_requested: parse_flag(fields[5], "custody")?,
            fragmentable: parse_flag(fields[6], "fragment")?,
            deadline,
            payload: fields[8].to_string(),
            assigned_route: None,
            next_hop: None,
        };

        if routed {
            let route: Route = serde_json::from_str(fields[9])
                .map_err(|e| NodeError::InvalidEncoding(format!("bad route field: {e}")))?;
            bundle.assigned_route = Some(route);
            bundle.next_hop = Some(fields[10].to_string());
        }
        Ok(bundle)
    }
}

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

fn parse_flag(field: &str, name: &str) -> Result<bool, NodeError> {
    match field {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(NodeError::InvalidEncoding(format!(
            "bad {name} flag: {other:?}"
        ))),
    }
}

fn parse_number<T: std::str::FromStr>(field: &str, name: &str) -> Result<T, NodeError> {
    field
        .parse()
        .map_err(|_| NodeError::InvalidEncoding(format!("non-numeric {name} field: {field:?}")))
}
