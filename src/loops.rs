use super::errors::ErrorKind;
use log::{debug, trace};
use math::predicates::signed_area;
use math::prelude::*;
use math::{Pnt2d, Vec2d};
use std::cmp::Ordering;
use std::collections::HashMap;

/// A boundary edge, directed so the sector it belongs to lies on its right hand side.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DirectedEdge {
    pub start: Pnt2d,
    pub end: Pnt2d,
}

impl DirectedEdge {
    pub fn new(start: Pnt2d, end: Pnt2d) -> Self {
        DirectedEdge { start, end }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Winding {
    Clockwise,
    CounterClockwise,
}

impl Winding {
    pub fn of_area(signed_area: f64) -> Self {
        if signed_area < 0.0 {
            Winding::Clockwise
        } else {
            Winding::CounterClockwise
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Winding::Clockwise => Winding::CounterClockwise,
            Winding::CounterClockwise => Winding::Clockwise,
        }
    }
}

/// A closed ring of points; the edge from the last point back to the first is implied.
#[derive(Clone, Debug, PartialEq)]
pub struct Loop {
    points: Vec<Pnt2d>,
    area: f64,
}

impl Loop {
    pub fn new(points: Vec<Pnt2d>) -> Self {
        let area = signed_area(&points);
        Loop { points, area }
    }

    pub fn points(&self) -> &[Pnt2d] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Pnt2d> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn signed_area(&self) -> f64 {
        self.area
    }

    pub fn winding(&self) -> Winding {
        Winding::of_area(self.area)
    }

    pub fn edges<'a>(&'a self) -> impl Iterator<Item = (Pnt2d, Pnt2d)> + 'a {
        let len = self.points.len();
        (0..len).map(move |i| (self.points[i], self.points[(i + 1) % len]))
    }

    /// Reverses the point order in place if needed so the loop has the given winding.
    pub fn set_winding(&mut self, winding: Winding) {
        if self.winding() != winding {
            self.points.reverse();
            self.area = -self.area;
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Extraction {
    pub loops: Vec<Loop>,
    /// Chains of edges which never closed, as point sequences.
    pub open_chains: Vec<Vec<Pnt2d>>,
}

impl Extraction {
    pub fn open_edges(&self) -> usize {
        self.open_chains.iter().map(|chain| chain.len() - 1).sum()
    }

    pub fn error(&self) -> Option<ErrorKind> {
        match self.open_edges() {
            0 => None,
            edges => Some(ErrorKind::OpenBoundary { edges }),
        }
    }
}

type PointKey = (u64, u64);

fn point_key(point: Pnt2d) -> PointKey {
    // Adding zero folds -0.0 into 0.0.
    ((point.x + 0.0).to_bits(), (point.y + 0.0).to_bits())
}

/// Chains `edges` into loops by repeatedly following the edge which starts where the current
/// chain ends. Where several do, the one turning furthest right is taken, so a sector which only
/// touches itself at a vertex comes apart there into separate loops. Whenever the chain revisits
/// one of its own points the ring this closes is split off as a loop, so the result never contains
/// a pinched ring. Chains which end without closing are returned in `open_chains`. Every step
/// consumes an edge, so this always terminates.
///
/// Loops with fewer than three points or zero area are dropped.
pub fn extract_loops(edges: &[DirectedEdge]) -> Extraction {
    let mut outgoing = HashMap::<PointKey, Vec<usize>>::with_capacity(edges.len());
    for (i_edge, edge) in edges.iter().enumerate() {
        if is_zero_length(edge) {
            trace!("Skipping zero-length edge at {:?}.", edge.start);
            continue;
        }
        outgoing
            .entry(point_key(edge.start))
            .or_insert_with(Vec::new)
            .push(i_edge);
    }

    let mut used = vec![false; edges.len()];
    let mut take_edge_from =
        |previous: Pnt2d, point: Pnt2d, used: &mut Vec<bool>| -> Option<usize> {
            let bucket = outgoing.get_mut(&point_key(point))?;
            bucket.retain(|&i_edge| !used[i_edge]);
            let incoming = point - previous;
            let i_edge = bucket.iter().cloned().min_by(|&left, &right| {
                let (left, right) = (&edges[left], &edges[right]);
                turn_angle(incoming, left.end - left.start)
                    .partial_cmp(&turn_angle(incoming, right.end - right.start))
                    .unwrap_or(Ordering::Equal)
            })?;
            used[i_edge] = true;
            Some(i_edge)
        };

    let mut extraction = Extraction::default();
    let mut chain = Vec::new();
    let mut seeds = (0..edges.len()).collect::<Vec<_>>();
    loop {
        if chain.is_empty() {
            let seed = seeds
                .iter()
                .rposition(|&i_edge| !used[i_edge] && !is_zero_length(&edges[i_edge]));
            let seed = match seed {
                Some(position) => {
                    let i_edge = seeds[position];
                    seeds.truncate(position);
                    i_edge
                }
                None => break,
            };
            used[seed] = true;
            chain.push(edges[seed].start);
            chain.push(edges[seed].end);
        }

        let current = chain[chain.len() - 1];
        if let Some(revisit) = chain[..chain.len() - 1]
            .iter()
            .position(|&point| point_key(point) == point_key(current))
        {
            chain.pop();
            let ring = chain.split_off(revisit);
            push_loop(&mut extraction.loops, ring);
            if !chain.is_empty() {
                chain.push(current);
            }
            continue;
        }

        let previous = chain[chain.len() - 2];
        match take_edge_from(previous, current, &mut used) {
            Some(i_edge) => chain.push(edges[i_edge].end),
            None => {
                debug!(
                    "Boundary chain of {} edges starting at {:?} does not close.",
                    chain.len() - 1,
                    chain[0]
                );
                extraction.open_chains.push(chain);
                chain = Vec::new();
            }
        }
    }
    extraction
}

/// Signed angle from `incoming` to `outgoing`, negative for right turns. Turning back is `PI`.
fn turn_angle(incoming: Vec2d, outgoing: Vec2d) -> f64 {
    (incoming.perp_dot(outgoing) + 0.0).atan2(incoming.dot(outgoing))
}

fn is_zero_length(edge: &DirectedEdge) -> bool {
    point_key(edge.start) == point_key(edge.end)
}

fn push_loop(loops: &mut Vec<Loop>, points: Vec<Pnt2d>) {
    let new_loop = Loop::new(points);
    if new_loop.len() < 3 || new_loop.signed_area() == 0.0 {
        trace!("Dropping degenerate loop {:?}.", new_loop.points());
    } else {
        trace!("Closed loop {:?}.", new_loop.points());
        loops.push(new_loop);
    }
}
