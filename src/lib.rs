//! Wayfinder core: navigation and planning for a retail shopping robot
//!
//! The store floor plan is discretized into a walkable-area grid, built
//! once at startup and shared read-only across planning calls. On top of
//! it sit an A* point-to-point planner, a distance-matrix route-order
//! optimizer, and a route stitcher that assembles multi-stop shopping
//! trips. The calibration module reconciles the robot's native coordinate
//! frame with the planning frame through a fitted similarity transform.

pub mod calibration;
pub mod common;
pub mod error;
pub mod navigation;

pub use crate::calibration::{RobotPoint, TransformManager, TransformParameters};
pub use crate::error::CoreError;
pub use crate::navigation::grid::{PassableArea, PixelPoint, Rect, WalkableGrid};
pub use crate::navigation::route::{Location, PathPoint, PlannedRoute, RouteStop};
pub use crate::navigation::Navigator;
