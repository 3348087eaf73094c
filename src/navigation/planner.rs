//! Path planner trait

use crate::error::CoreError;
use crate::navigation::grid::{PixelPoint, WalkableGrid};
use std::collections::HashMap;
use std::fmt::Debug;

/// Trait for grid path planning algorithms
pub trait PathPlanner: Debug + Send + Sync {
    /// Plan a walkable path between two pixel points.
    ///
    /// Both endpoints are snapped to their nearest walkable cell before the
    /// search; an endpoint with no walkable cell in snap range fails the
    /// call with [`CoreError::Unreachable`]. A reachable pair with no
    /// connecting path yields an empty path, never an error.
    fn plan(
        &self,
        grid: &WalkableGrid,
        start: PixelPoint,
        goal: PixelPoint,
    ) -> Result<Vec<PixelPoint>, CoreError>;

    /// Get the name of this planner
    fn name(&self) -> &str;

    /// Configure the planner with parameters
    fn configure(&mut self, params: &HashMap<String, f64>) -> Result<(), CoreError>;
}
