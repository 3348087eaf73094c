//! Visiting-order optimization for open routes with fixed endpoints
//!
//! Nearest-neighbor construction over the middle stops followed by
//! constrained 2-opt passes that keep the start and end pinned. Each
//! accepted reversal strictly reduces total cost, so the loop terminates;
//! a pass cap bounds pathological matrices anyway.

use crate::navigation::route::matrix::DistanceMatrix;

/// Improvement threshold for accepting a 2-opt reversal
const IMPROVEMENT_EPS: f64 = 1e-9;

/// Configuration for the route-order optimizer
#[derive(Clone, Debug)]
pub struct OptimizerConfig {
    /// Maximum number of full 2-opt passes
    pub max_passes: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self { max_passes: 64 }
    }
}

/// Order the stops of an open route with fixed endpoints.
///
/// Matrix index 0 is the fixed start and index `n - 1` the fixed end; the
/// indices in between are the stops to order. Returns the full visiting
/// order including both endpoints. Deterministic for a deterministic
/// matrix, and never worse than the identity order.
pub fn optimize_order(matrix: &DistanceMatrix, config: &OptimizerConfig) -> Vec<usize> {
    let n = matrix.len();
    if n <= 2 {
        return (0..n).collect();
    }

    // Greedy nearest-neighbor walk through the middle stops
    let mut unvisited: Vec<usize> = (1..n - 1).collect();
    let mut order: Vec<usize> = Vec::with_capacity(n);
    order.push(0);
    let mut current = 0usize;

    while let Some(&first) = unvisited.first() {
        let mut next = first;
        let mut best_cost = matrix.cost_by_index(current, first);
        for &candidate in &unvisited[1..] {
            let cost = matrix.cost_by_index(current, candidate);
            if cost < best_cost {
                next = candidate;
                best_cost = cost;
            }
        }
        order.push(next);
        current = next;
        unvisited.retain(|&s| s != next);
    }
    order.push(n - 1);

    two_opt(matrix, &mut order, config.max_passes);

    // The greedy seed can occasionally lose to the caller's own order;
    // never return something worse than the identity order
    let identity: Vec<usize> = (0..n).collect();
    if route_cost(matrix, &identity) < route_cost(matrix, &order) {
        let mut fallback = identity;
        two_opt(matrix, &mut fallback, config.max_passes);
        if route_cost(matrix, &fallback) < route_cost(matrix, &order) {
            return fallback;
        }
    }
    order
}

/// Constrained 2-opt: reverse interior sub-sequences while an improving
/// reversal exists, keeping the first and last positions fixed
fn two_opt(matrix: &DistanceMatrix, order: &mut [usize], max_passes: usize) {
    let m = order.len();
    if m < 4 {
        return;
    }

    for _ in 0..max_passes {
        let mut improved = false;
        for i in 1..(m - 2) {
            for j in (i + 1)..(m - 1) {
                let a = order[i - 1];
                let b = order[i];
                let c = order[j];
                let d = order[j + 1];
                let delta = matrix.cost_by_index(a, c) + matrix.cost_by_index(b, d)
                    - matrix.cost_by_index(a, b)
                    - matrix.cost_by_index(c, d);
                if delta < -IMPROVEMENT_EPS {
                    order[i..=j].reverse();
                    improved = true;
                }
            }
        }
        if !improved {
            return;
        }
    }
    tracing::warn!(max_passes, "2-opt stopped at the pass cap before converging");
}

/// Total cost of a visiting order under the matrix
pub fn route_cost(matrix: &DistanceMatrix, order: &[usize]) -> f64 {
    order
        .windows(2)
        .map(|pair| matrix.cost_by_index(pair[0], pair[1]))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::grid::{PassableArea, PixelPoint, Rect, WalkableGrid};
    use crate::navigation::path_planning::AStarPlanner;
    use crate::navigation::route::Location;

    fn matrix_for(positions: &[(f64, f64)]) -> DistanceMatrix {
        let grid = WalkableGrid::build(
            20,
            20,
            10.0,
            &[PassableArea::new(Rect::new(0.0, 0.0, 200.0, 200.0))],
            &[],
        )
        .unwrap();
        let planner = AStarPlanner::with_defaults();
        let locations: Vec<Location> = positions
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| Location::new(format!("L{i}"), format!("L{i}"), PixelPoint::new(x, y)))
            .collect();
        DistanceMatrix::build(&locations, &grid, &planner).unwrap()
    }

    #[test]
    fn trivial_routes_pass_through() {
        let matrix = matrix_for(&[(5.0, 5.0), (195.0, 195.0)]);
        assert_eq!(optimize_order(&matrix, &OptimizerConfig::default()), vec![0, 1]);

        let matrix = matrix_for(&[(5.0, 5.0), (95.0, 95.0), (195.0, 195.0)]);
        assert_eq!(
            optimize_order(&matrix, &OptimizerConfig::default()),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn endpoints_stay_fixed() {
        let matrix = matrix_for(&[
            (5.0, 5.0),
            (195.0, 15.0),
            (15.0, 195.0),
            (105.0, 105.0),
            (5.0, 95.0),
        ]);
        let order = optimize_order(&matrix, &OptimizerConfig::default());

        assert_eq!(order.first(), Some(&0));
        assert_eq!(order.last(), Some(&4));
        let mut sorted = order.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn never_worse_than_identity_order() {
        // Stops deliberately listed in a zig-zag order
        let matrix = matrix_for(&[
            (5.0, 5.0),
            (15.0, 195.0),
            (195.0, 15.0),
            (25.0, 185.0),
            (185.0, 25.0),
            (195.0, 195.0),
        ]);
        let identity: Vec<usize> = (0..matrix.len()).collect();
        let order = optimize_order(&matrix, &OptimizerConfig::default());

        assert!(route_cost(&matrix, &order) <= route_cost(&matrix, &identity));
    }

    #[test]
    fn result_is_a_two_opt_local_optimum() {
        let matrix = matrix_for(&[
            (5.0, 5.0),
            (55.0, 195.0),
            (195.0, 55.0),
            (105.0, 105.0),
            (45.0, 45.0),
            (195.0, 195.0),
        ]);
        let order = optimize_order(&matrix, &OptimizerConfig::default());
        let base = route_cost(&matrix, &order);

        let m = order.len();
        for i in 1..(m - 2) {
            for j in (i + 1)..(m - 1) {
                let mut trial = order.clone();
                trial[i..=j].reverse();
                assert!(route_cost(&matrix, &trial) + IMPROVEMENT_EPS >= base);
            }
        }
    }

    #[test]
    fn untangles_a_crossing_route() {
        // Identity order visits the far corner first, then doubles back
        let matrix = matrix_for(&[
            (5.0, 95.0),
            (195.0, 95.0),
            (55.0, 95.0),
            (105.0, 95.0),
            (155.0, 95.0),
        ]);
        let order = optimize_order(&matrix, &OptimizerConfig::default());

        // Along a single corridor the optimal order is monotone
        assert_eq!(order, vec![0, 2, 3, 1, 4]);
    }
}
