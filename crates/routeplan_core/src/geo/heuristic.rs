//! Nearest-neighbor tour construction.
//!
//! The tour starts at the first input stop and greedily walks to the closest
//! unvisited stop. Ties go to the stop that appears first in the input, since
//! only a strictly shorter leg replaces the current best. O(n^2).

use crate::geo::distance::haversine_km;
use crate::model::stop::{Coordinates, StopId};

/// Minimal input to the heuristic: one identifier and its position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequencePoint {
    pub id: StopId,
    pub coordinates: Coordinates,
}

/// Returns a visiting order over `points` as a permutation of their ids.
///
/// Empty input yields an empty order.
pub fn nearest_neighbor_order(points: &[SequencePoint]) -> Vec<StopId> {
    let Some((first, rest)) = points.split_first() else {
        return Vec::new();
    };

    let mut order = Vec::with_capacity(points.len());
    order.push(first.id);
    let mut current = first.coordinates;
    let mut unvisited: Vec<&SequencePoint> = rest.iter().collect();

    while !unvisited.is_empty() {
        let mut nearest_index = 0;
        let mut nearest_distance = f64::INFINITY;
        for (index, candidate) in unvisited.iter().enumerate() {
            let distance = haversine_km(current, candidate.coordinates);
            if distance < nearest_distance {
                nearest_distance = distance;
                nearest_index = index;
            }
        }

        // `remove` keeps the remaining candidates in input order for tie-breaks.
        let next = unvisited.remove(nearest_index);
        order.push(next.id);
        current = next.coordinates;
    }

    order
}
