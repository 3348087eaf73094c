//! Navigation module for the Wayfinder robot
pub mod grid;
pub mod path_planning;
pub mod planner;
pub mod route;

use self::grid::{PixelPoint, WalkableGrid};
use self::path_planning::AStarPlanner;
use self::planner::PathPlanner;
use self::route::matrix::DistanceMatrix;
use self::route::optimizer::{optimize_order, OptimizerConfig};
use self::route::{Location, PlannedRoute};
use crate::error::CoreError;
use std::collections::HashMap;
use std::sync::Arc;

/// Internal location ids for the fixed route endpoints
const START_ID: &str = "start";
const END_ID: &str = "end";

/// Navigation facade for the robot.
///
/// Owns the shared read-only walkable grid, a path planner, and the route
/// optimizer configuration. The grid is built once at startup and shared
/// across concurrent planning calls; all per-request state (distance
/// matrix, visiting order) lives on the stack of each call.
pub struct Navigator {
    grid: Arc<WalkableGrid>,
    planner: Box<dyn PathPlanner>,
    optimizer: OptimizerConfig,
}

impl Navigator {
    /// Create a navigator over a walkable grid with the default A* planner
    pub fn new(grid: Arc<WalkableGrid>) -> Self {
        Navigator {
            grid,
            planner: Box::new(AStarPlanner::with_defaults()),
            optimizer: OptimizerConfig::default(),
        }
    }

    /// Replace the path planner
    pub fn set_planner(&mut self, planner: Box<dyn PathPlanner>) {
        self.planner = planner;
    }

    /// Get a shared reference to the walkable grid
    pub fn grid(&self) -> Arc<WalkableGrid> {
        Arc::clone(&self.grid)
    }

    /// Get the name of the current planner
    pub fn planner_name(&self) -> &str {
        self.planner.name()
    }

    /// Configure the navigator and its planner
    pub fn configure(&mut self, params: &HashMap<String, f64>) -> Result<(), CoreError> {
        if let Some(&max_passes) = params.get("two_opt_max_passes") {
            if max_passes < 1.0 || !max_passes.is_finite() {
                return Err(CoreError::Config(
                    "two_opt_max_passes must be at least 1".to_string(),
                ));
            }
            self.optimizer.max_passes = max_passes as usize;
        }

        self.planner.configure(params)
    }

    /// Plan a point-to-point path across the store
    pub fn plan_path(
        &self,
        start: PixelPoint,
        goal: PixelPoint,
    ) -> Result<Vec<PixelPoint>, CoreError> {
        self.planner.plan(&self.grid, start, goal)
    }

    /// Plan a full shopping route: order the stops for a short total path,
    /// then stitch the legs into one continuous polyline.
    ///
    /// Stops with no walkable cell in snap range are left out of the route
    /// and reported in [`PlannedRoute::unreachable`]. An unreachable start
    /// or end point fails the whole call.
    pub fn plan_route(
        &self,
        start: PixelPoint,
        stops: &[Location],
        end: PixelPoint,
    ) -> Result<PlannedRoute, CoreError> {
        self.grid
            .nearest_walkable(start)
            .ok_or(CoreError::Unreachable {
                x: start.x,
                y: start.y,
            })?;
        self.grid
            .nearest_walkable(end)
            .ok_or(CoreError::Unreachable { x: end.x, y: end.y })?;

        let mut reachable: Vec<Location> = Vec::with_capacity(stops.len());
        let mut unreachable: Vec<String> = Vec::new();
        for stop in stops {
            if self.grid.nearest_walkable(stop.position).is_some() {
                reachable.push(stop.clone());
            } else {
                tracing::warn!(stop = %stop.id, "stop has no walkable cell in snap range, excluding");
                unreachable.push(stop.id.clone());
            }
        }

        let ordered = if reachable.len() > 1 {
            let mut locations: Vec<Location> = Vec::with_capacity(reachable.len() + 2);
            locations.push(Location::new(START_ID, "Route start", start));
            locations.extend(reachable.iter().cloned());
            locations.push(Location::new(END_ID, "Route end", end));

            let matrix = DistanceMatrix::build(&locations, &self.grid, self.planner.as_ref())?;
            let order = optimize_order(&matrix, &self.optimizer);

            // Map interior matrix indices back onto the stop list
            order[1..order.len() - 1]
                .iter()
                .map(|&idx| locations[idx].clone())
                .collect()
        } else {
            reachable
        };

        let mut planned = route::stitch(&self.grid, self.planner.as_ref(), start, &ordered, end)?;
        planned.unreachable = unreachable;

        tracing::info!(
            stops = planned.stops.len(),
            length = planned.total_length,
            degraded = planned.degraded.len(),
            unreachable = planned.unreachable.len(),
            "route planned"
        );

        Ok(planned)
    }
}
