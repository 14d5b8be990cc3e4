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

//! Module defining the store-and-forward node: route admissibility and selection, the
//! priority send queues, the limbo, and the receive loop that paces transmissions to the
//! contact plan.

use std::cmp::Reverse;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use log::*;

use crate::bundle::Bundle;
use crate::contact_graph::EnumerationLimits;
use crate::interrupt;
use crate::io::TimeGraphFile;
use crate::route::{Route, RouteTable};
use crate::time_graph::TimeEvolvingGraph;
use crate::transport::{SpaceConfig, SpaceLink};
use crate::types::{DropReason, NodeError, TimeSeconds};

/// What the routing check decided for one submitted bundle.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    /// The bundle got a route (or already carried one) and a next hop.
    Single(Bundle),
    /// A critical bundle, cloned once per admissible route.
    Fanout(Vec<Bundle>),
    /// No admissible route right now; hold the bundle until the routing state changes.
    Limbo(Bundle),
    /// The bundle cannot be handled at all and is discarded.
    Drop(DropReason),
}

/// A DTN node: receives bundles, routes them over the contact plan, and transmits each one
/// when its next hop's contact window opens.
///
/// All engine state is owned exclusively by the node; the only external handle is the
/// datagram link towards the space segment. The node is driven by a single receive loop
/// ([`DtnNode::run`]) with a one-second tick, so none of the engine operations need to be
/// re-entrant.
#[derive(Debug)]
pub struct DtnNode {
    name: String,
    priority_count: usize,
    /// One FIFO per priority class, index `priority - 1`.
    send_queues: Vec<VecDeque<Bundle>>,
    /// Bundles without an admissible route, retried on every route-table change.
    limbo: VecDeque<Bundle>,
    route_table: RouteTable,
    addresses: HashMap<String, (String, u16)>,
    time_graph: Option<TimeEvolvingGraph>,
    limits: EnumerationLimits,
    link: SpaceLink,
    delivered: Vec<Bundle>,
}

impl DtnNode {
    /// Create a node with `priority_count` priority classes, talking to the given space
    /// endpoint. No address is bound yet; that happens once the time graph tells the node
    /// who it is.
    pub fn new(
        name: impl Into<String>,
        priority_count: usize,
        space: SpaceConfig,
    ) -> Result<Self, NodeError> {
        let priority_count = priority_count.max(1);
        Ok(Self {
            name: name.into(),
            priority_count,
            send_queues: vec![VecDeque::new(); priority_count],
            limbo: VecDeque::new(),
            route_table: RouteTable::new(),
            addresses: HashMap::new(),
            time_graph: None,
            limits: EnumerationLimits::default(),
            link: SpaceLink::new(space)?,
            delivered: Vec::new(),
        })
    }

    /// Name of the node.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of priority classes.
    pub fn priority_count(&self) -> usize {
        self.priority_count
    }

    /// Replace the route enumeration bounds.
    pub fn set_limits(&mut self, limits: EnumerationLimits) {
        self.limits = limits;
    }

    /// Take addresses, topology, and any precomputed routes from a time-graph file.
    pub fn assign_time_graph(&mut self, file: TimeGraphFile) -> Result<(), NodeError> {
        self.addresses = file.addresses.clone();
        self.time_graph = Some(file.time_graph());
        for (destination, routes) in file.routes {
            self.update_routes(destination, routes, 0)?;
        }
        Ok(())
    }

    /// Register the address of another node (or of this one before binding).
    pub fn set_address(&mut self, name: impl Into<String>, host: impl Into<String>, port: u16) {
        self.addresses.insert(name.into(), (host.into(), port));
    }

    /// The known address of `name`.
    pub fn address_of(&self, name: &str) -> Option<(&str, u16)> {
        self.addresses.get(name).map(|(h, p)| (h.as_str(), *p))
    }

    /// Bind the receiving socket to this node's own address from the address table.
    pub fn bind(&mut self) -> Result<(), NodeError> {
        let (host, port) = self
            .addresses
            .get(&self.name)
            .cloned()
            .ok_or_else(|| NodeError::AddressUnknown(self.name.clone()))?;
        self.link.bind(&host, port)
    }

    /// Derive the routes towards `destination` from the assigned time graph and store them.
    pub fn compute_routes(
        &mut self,
        destination: &str,
        now: TimeSeconds,
    ) -> Result<TimeSeconds, NodeError> {
        let teg = self
            .time_graph
            .as_ref()
            .ok_or_else(|| NodeError::InvalidTimeGraph("no time graph assigned".to_string()))?;
        let routes = match teg.to_contact_graph(&self.name, destination)? {
            Some(graph) => graph.routes(0, &self.limits),
            None => Vec::new(),
        };
        debug!(
            "{}: {} routes towards {destination}",
            self.name,
            routes.len()
        );
        self.update_routes(destination, routes, now)
    }

    /// Derive the routes towards every other node of the address table.
    pub fn compute_all_routes(&mut self, now: TimeSeconds) -> Result<(), NodeError> {
        let destinations: Vec<String> = self
            .addresses
            .keys()
            .filter(|n| **n != self.name)
            .cloned()
            .collect();
        for destination in destinations {
            self.compute_routes(&destination, now)?;
        }
        Ok(())
    }

    /// Replace the routes towards one destination. Every table change re-evaluates the
    /// limbo, since a bundle stuck there may now be routable.
    pub fn update_routes(
        &mut self,
        destination: impl Into<String>,
        routes: Vec<Route>,
        now: TimeSeconds,
    ) -> Result<TimeSeconds, NodeError> {
        self.route_table.set_routes(destination, routes);
        self.limbo_to_queue(now)
    }

    /// The current route table.
    pub fn route_table(&self) -> &RouteTable {
        &self.route_table
    }

    /// Submit a bundle, locally generated or just received, and drain the queues.
    ///
    /// Returns the drain hint: a positive number of seconds to wait for the next contact,
    /// or -1 when all queues are empty.
    pub fn submit(&mut self, bundle: Bundle, now: TimeSeconds) -> Result<TimeSeconds, NodeError> {
        self.place(bundle, now);
        self.drain(now)
    }

    /// Route a bundle and put it where it belongs, without draining.
    fn place(&mut self, bundle: Bundle, now: TimeSeconds) {
        if bundle.expired(now) {
            debug!(
                "{}: discarding bundle from {}: deadline passed",
                self.name, bundle.source
            );
            return;
        }
        match self.check_routes(bundle, now) {
            RouteOutcome::Single(bundle) => self.enqueue(bundle),
            RouteOutcome::Fanout(clones) => {
                for clone in clones {
                    self.enqueue(clone);
                }
            }
            RouteOutcome::Limbo(bundle) => {
                debug!(
                    "{}: no admissible route towards {}, bundle goes to limbo",
                    self.name, bundle.destination
                );
                self.limbo.push_back(bundle);
            }
            RouteOutcome::Drop(reason) => {
                warn!("{}: discarding bundle: {reason}", self.name);
            }
        }
    }

    /// Decide how to route one bundle.
    ///
    /// A bundle that already carries a route is on its way: this node looks itself up in the
    /// route's path and forwards to the following node. A fresh bundle is matched against
    /// the route table; critical bundles fan out over every admissible route, ordered by
    /// first-hop start time.
    pub fn check_routes(&self, mut bundle: Bundle, now: TimeSeconds) -> RouteOutcome {
        if let Some(route) = bundle.assigned_route.clone() {
            let Some(position) = route.position_of(&self.name) else {
                return RouteOutcome::Drop(DropReason::RouteMismatch);
            };
            return match route.path.get(position + 1) {
                Some(next_hop) => {
                    bundle.set_next_hop(next_hop.clone());
                    RouteOutcome::Single(bundle)
                }
                None => RouteOutcome::Drop(DropReason::RouteMismatch),
            };
        }

        let routes = self.route_table.towards(&bundle.destination);
        let candidates: Vec<(usize, TimeSeconds)> = routes
            .iter()
            .enumerate()
            .filter_map(|(i, r)| self.route_admissible(&bundle, r, now).map(|pat| (i, pat)))
            .collect();

        if bundle.critical {
            let mut order: Vec<usize> = candidates.iter().map(|(i, _)| *i).collect();
            order.sort_by_key(|&i| {
                routes[i]
                    .first_hop()
                    .and_then(|hop| routes[i].start_at(hop))
                    .unwrap_or(0)
            });
            let clones: Vec<Bundle> = order
                .into_iter()
                .filter_map(|i| {
                    let next_hop = routes[i].first_hop()?.to_string();
                    let mut clone = bundle.clone();
                    clone.assign_route(routes[i].clone(), next_hop);
                    Some(clone)
                })
                .collect();
            if clones.is_empty() {
                return RouteOutcome::Limbo(bundle);
            }
            return RouteOutcome::Fanout(clones);
        }

        match Self::select_best(routes, &candidates) {
            Some(best) => match routes[best].first_hop() {
                Some(next_hop) => {
                    let next_hop = next_hop.to_string();
                    debug!(
                        "{}: selected route {} towards {}",
                        self.name,
                        routes[best].fmt_path(),
                        bundle.destination
                    );
                    bundle.assign_route(routes[best].clone(), next_hop);
                    RouteOutcome::Single(bundle)
                }
                None => RouteOutcome::Limbo(bundle),
            },
            None => RouteOutcome::Limbo(bundle),
        }
    }

    /// Check one route against a bundle and the current queue state, yielding the projected
    /// arrival time at the destination, or `None` if the route cannot work.
    ///
    /// The transmission opportunity of every hop is pushed back by all same-priority
    /// traffic already waiting in front of the bundle; a route whose contact closes before
    /// that moment, or that can no longer beat the deadline, or whose tightest contact
    /// cannot carry the bundle at all, is rejected.
    pub fn route_admissible(
        &self,
        bundle: &Bundle,
        route: &Route,
        now: TimeSeconds,
    ) -> Option<TimeSeconds> {
        if bundle.expired(now) {
            return None;
        }
        // best delivery time: no route can make up for a deadline closer than its latency
        if bundle.deadline > 0 && bundle.deadline <= now + route.total_time {
            return None;
        }

        let queue = &self.send_queues[self.queue_index(bundle.priority)];
        let mut available = now;
        for hop in route.path.iter().skip(1) {
            available = available.max(route.start_at(hop).unwrap_or(available));
            for queued in queue {
                if let (Some(queued_route), Some(queued_hop)) =
                    (&queued.assigned_route, &queued.next_hop)
                {
                    if let Some(start) = queued_route.start_at(queued_hop) {
                        available = available.max(start);
                    }
                }
            }
            if route.end_at(hop).unwrap_or(TimeSeconds::MAX) <= available {
                return None;
            }
        }

        if bundle.deadline > 0 && bundle.deadline <= available + route.total_time {
            return None;
        }
        if bundle.size_bytes > route.rate {
            return None;
        }
        Some(available + route.total_time)
    }

    /// Pick the best admissible route: earliest projected arrival, then fewest hops, then
    /// the route whose final contact stays open longest, then the lowest table index. The
    /// cascade leaves no ties, so the choice is deterministic.
    fn select_best(routes: &[Route], candidates: &[(usize, TimeSeconds)]) -> Option<usize> {
        candidates
            .iter()
            .min_by_key(|(i, pat)| {
                (
                    *pat,
                    routes[*i].hops(),
                    Reverse(routes[*i].final_contact_end()),
                    *i,
                )
            })
            .map(|(i, _)| *i)
    }

    /// Append a routed bundle to its priority queue.
    fn enqueue(&mut self, bundle: Bundle) {
        let index = self.queue_index(bundle.priority);
        self.send_queues[index].push_back(bundle);
    }

    /// Map a priority to its queue index, clamping stray values into `1..=P`.
    fn queue_index(&self, priority: usize) -> usize {
        let clamped = priority.clamp(1, self.priority_count);
        if clamped != priority {
            warn!(
                "{}: priority {priority} outside 1..={}, clamping",
                self.name, self.priority_count
            );
        }
        clamped - 1
    }

    /// Send every bundle whose contact is open, highest priority first.
    ///
    /// A queue head waiting for a future contact blocks all lower priorities and yields the
    /// number of seconds until that contact opens; the caller sleeps and retries. Returns -1
    /// once every queue is empty.
    pub fn drain(&mut self, now: TimeSeconds) -> Result<TimeSeconds, NodeError> {
        for index in (0..self.priority_count).rev() {
            loop {
                let Some(head) = self.send_queues[index].front() else {
                    break;
                };
                if head.expired(now) {
                    debug!(
                        "{}: discarding queued bundle towards {}: deadline passed",
                        self.name, head.destination
                    );
                    self.send_queues[index].pop_front();
                    continue;
                }
                let start = head
                    .next_hop
                    .as_deref()
                    .zip(head.assigned_route.as_ref())
                    .and_then(|(hop, route)| route.start_at(hop))
                    .unwrap_or(now);
                if start > now {
                    debug!(
                        "{}: next contact opens in {}s, waiting",
                        self.name,
                        start - now
                    );
                    return Ok(start - now);
                }
                if let Some(bundle) = self.send_queues[index].pop_front() {
                    self.transmit(bundle)?;
                }
            }
        }
        Ok(-1)
    }

    /// Hand one bundle to the space segment.
    fn transmit(&mut self, bundle: Bundle) -> Result<(), NodeError> {
        let Some(next_hop) = bundle.next_hop.clone() else {
            warn!("{}: queued bundle without next hop, discarding", self.name);
            return Ok(());
        };
        let Some((host, port)) = self.addresses.get(&next_hop).cloned() else {
            warn!(
                "{}: no address for next hop {next_hop}, discarding bundle",
                self.name
            );
            return Ok(());
        };
        self.link.send_bundle(&bundle, (host.as_str(), port), &next_hop)?;
        info!("{}: bundle forwarded to node {next_hop}", self.name);
        Ok(())
    }

    /// Re-evaluate every bundle in limbo against the current routing state, then drain.
    pub fn limbo_to_queue(&mut self, now: TimeSeconds) -> Result<TimeSeconds, NodeError> {
        let pending: Vec<Bundle> = self.limbo.drain(..).collect();
        for bundle in pending {
            self.place(bundle, now);
        }
        self.drain(now)
    }

    /// Service one received datagram: deliver it if it is for this node, forward otherwise.
    /// Malformed datagrams are dropped; the wire is lossy anyway.
    pub fn handle_datagram(
        &mut self,
        wire: &str,
        now: TimeSeconds,
    ) -> Result<TimeSeconds, NodeError> {
        let bundle = match Bundle::decode(wire) {
            Ok(bundle) => bundle,
            Err(e) => {
                warn!("{}: dropping malformed datagram: {e}", self.name);
                return Ok(-1);
            }
        };
        if bundle.destination == self.name {
            info!("{}: message received: {}", self.name, bundle.payload);
            self.delivered.push(bundle);
            return Ok(-1);
        }
        self.submit(bundle, now)
    }

    /// Run the receive loop until interrupted.
    ///
    /// The loop blocks on the socket with a one-second timeout; each timeout is one tick of
    /// the wait timer. While the timer is armed, arriving datagrams are still serviced but
    /// do not cancel the pending wait. When the timer expires the queues are drained, and a
    /// new wait may be armed right away.
    pub fn run(&mut self) -> Result<(), NodeError> {
        self.link.set_timeout(Duration::from_secs(1))?;
        let started = Instant::now();
        let mut alarm_on = false;
        let mut timer: TimeSeconds = 0;
        let mut buf = vec![0u8; 65536];

        info!("node {} waiting for messages", self.name);
        while !interrupt::interrupted() {
            let now = started.elapsed().as_secs() as TimeSeconds;
            match self.link.recv(&mut buf) {
                Ok(wire) => {
                    let hint = self.handle_datagram(&wire, now)?;
                    if hint > 0 && !alarm_on {
                        alarm_on = true;
                        timer = hint;
                    }
                }
                Err(e)
                    if matches!(
                        e.kind(),
                        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                    ) =>
                {
                    if alarm_on {
                        timer -= 1;
                        if timer <= 0 {
                            alarm_on = false;
                            debug!("{}: wait timer expired, draining queues", self.name);
                            let hint = self.drain(now)?;
                            if hint > 0 {
                                alarm_on = true;
                                timer = hint;
                            }
                        }
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        info!("node {} shutting down", self.name);
        Ok(())
    }

    /// Bundles queued at `priority`, in send order.
    pub fn queued(&self, priority: usize) -> impl Iterator<Item = &Bundle> {
        self.send_queues[self.queue_index(priority)].iter()
    }

    /// Number of bundles queued at `priority`.
    pub fn queue_len(&self, priority: usize) -> usize {
        self.send_queues[self.queue_index(priority)].len()
    }

    /// Bundles currently in limbo, oldest first.
    pub fn limbo(&self) -> impl Iterator<Item = &Bundle> {
        self.limbo.iter()
    }

    /// Number of bundles in limbo.
    pub fn limbo_len(&self) -> usize {
        self.limbo.len()
    }

    /// Bundles that reached this node as their destination.
    pub fn delivered(&self) -> &[Bundle] {
        &self.delivered
    }
}
