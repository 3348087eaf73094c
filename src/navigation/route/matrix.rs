//! All-pairs path-cost matrix over route locations
//!
//! Each entry is the summed Euclidean length of the planner path between
//! two locations, or infinity when no path exists. The matrix is computed
//! fresh per planning request; stop sets vary between requests so entries
//! are never cached across calls.

use crate::error::CoreError;
use crate::navigation::grid::{PixelPoint, WalkableGrid};
use crate::navigation::planner::PathPlanner;
use crate::navigation::route::Location;
use std::collections::HashMap;

/// Symmetric pairwise path-cost matrix, keyed by location id
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    ids: Vec<String>,
    index: HashMap<String, usize>,
    costs: Vec<f64>,
}

impl DistanceMatrix {
    /// Compute all pairwise path costs among the given locations.
    ///
    /// O(n²) planner invocations; n is small (a shopping list) in this
    /// domain. Locations must already be snappable; a snap failure here
    /// propagates as [`CoreError::Unreachable`].
    pub fn build(
        locations: &[Location],
        grid: &WalkableGrid,
        planner: &dyn PathPlanner,
    ) -> Result<DistanceMatrix, CoreError> {
        let n = locations.len();
        let mut costs = vec![0.0; n * n];

        for i in 0..n {
            for j in (i + 1)..n {
                let path = planner.plan(grid, locations[i].position, locations[j].position)?;
                let cost = if path.is_empty() {
                    f64::INFINITY
                } else {
                    path_length(&path)
                };
                costs[i * n + j] = cost;
                costs[j * n + i] = cost;
            }
        }

        let ids: Vec<String> = locations.iter().map(|loc| loc.id.clone()).collect();
        let index = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();

        Ok(DistanceMatrix { ids, index, costs })
    }

    /// Number of locations in the matrix
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Path cost between two locations by matrix index
    #[inline]
    pub fn cost_by_index(&self, i: usize, j: usize) -> f64 {
        self.costs[i * self.ids.len() + j]
    }

    /// Path cost between two locations by id
    pub fn cost(&self, a: &str, b: &str) -> Option<f64> {
        let i = *self.index.get(a)?;
        let j = *self.index.get(b)?;
        Some(self.cost_by_index(i, j))
    }

    /// Location id at a matrix index
    pub fn id(&self, i: usize) -> &str {
        &self.ids[i]
    }
}

/// Summed Euclidean length of a planner path
pub fn path_length(path: &[PixelPoint]) -> f64 {
    path.windows(2)
        .map(|pair| pair[0].distance_to(&pair[1]))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::grid::{PassableArea, Rect};
    use crate::navigation::path_planning::AStarPlanner;

    fn open_grid() -> WalkableGrid {
        WalkableGrid::build(
            10,
            10,
            10.0,
            &[PassableArea::new(Rect::new(0.0, 0.0, 100.0, 100.0))],
            &[],
        )
        .unwrap()
    }

    fn locations() -> Vec<Location> {
        vec![
            Location::new("entry", "Entry", PixelPoint::new(5.0, 5.0)),
            Location::new("milk", "Milk", PixelPoint::new(95.0, 5.0)),
            Location::new("checkout", "Checkout", PixelPoint::new(95.0, 95.0)),
        ]
    }

    #[test]
    fn matrix_is_symmetric_with_zero_diagonal() {
        let grid = open_grid();
        let planner = AStarPlanner::with_defaults();
        let matrix = DistanceMatrix::build(&locations(), &grid, &planner).unwrap();

        assert_eq!(matrix.len(), 3);
        for i in 0..3 {
            assert_eq!(matrix.cost_by_index(i, i), 0.0);
            for j in 0..3 {
                assert_eq!(matrix.cost_by_index(i, j), matrix.cost_by_index(j, i));
            }
        }
        assert!(matrix.cost("entry", "milk").unwrap() > 0.0);
    }

    #[test]
    fn disconnected_pair_costs_infinity() {
        let grid = WalkableGrid::build(
            10,
            10,
            10.0,
            &[
                PassableArea::new(Rect::new(0.0, 0.0, 30.0, 100.0)),
                PassableArea::new(Rect::new(70.0, 0.0, 100.0, 100.0)),
            ],
            &[],
        )
        .unwrap();
        let planner = AStarPlanner::with_defaults();
        let locations = vec![
            Location::new("west", "West aisle", PixelPoint::new(15.0, 50.0)),
            Location::new("east", "East aisle", PixelPoint::new(85.0, 50.0)),
        ];

        let matrix = DistanceMatrix::build(&locations, &grid, &planner).unwrap();
        assert!(matrix.cost("west", "east").unwrap().is_infinite());
    }

    #[test]
    fn cost_for_unknown_id_is_none() {
        let grid = open_grid();
        let planner = AStarPlanner::with_defaults();
        let matrix = DistanceMatrix::build(&locations(), &grid, &planner).unwrap();
        assert!(matrix.cost("entry", "caviar").is_none());
    }
}
