//! Route assembly for multi-stop shopping trips
//!
//! Stitches point-to-point planner paths into one continuous polyline
//! visiting an ordered list of stops between a fixed start and end.

pub mod matrix;
pub mod optimizer;

use crate::error::CoreError;
use crate::navigation::grid::{PixelPoint, WalkableGrid};
use crate::navigation::planner::PathPlanner;

/// A named stop location in the planning frame
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub position: PixelPoint,
}

impl Location {
    pub fn new(id: impl Into<String>, name: impl Into<String>, position: PixelPoint) -> Self {
        Location {
            id: id.into(),
            name: name.into(),
            position,
        }
    }
}

/// One point of a computed path, tagged with a stop id when it is the
/// arrival point of a route stop
#[derive(Debug, Clone, PartialEq)]
pub struct PathPoint {
    pub position: PixelPoint,
    pub stop_id: Option<String>,
}

impl PathPoint {
    fn waypoint(position: PixelPoint) -> Self {
        PathPoint {
            position,
            stop_id: None,
        }
    }
}

/// A visited stop together with the path leg that reaches it
#[derive(Debug, Clone)]
pub struct RouteStop {
    pub location: Location,
    /// Path points from the previous stop (or the start) to this one
    pub leg: Vec<PathPoint>,
    /// True when no walkable path was found and the leg degraded to a
    /// direct edge onto the raw stop position
    pub teleported: bool,
}

/// A fully planned multi-stop route
#[derive(Debug, Clone)]
pub struct PlannedRoute {
    /// Stops in visiting order
    pub stops: Vec<RouteStop>,
    /// The continuous stitched polyline from start to end
    pub points: Vec<PathPoint>,
    /// Summed Euclidean length of `points`, including degraded edges
    pub total_length: f64,
    /// Destination ids of segments that fell back to a direct edge
    pub degraded: Vec<String>,
    /// Ids of requested stops with no walkable cell in snap range;
    /// these were left out of the route entirely
    pub unreachable: Vec<String>,
}

impl PlannedRoute {
    /// Whether any segment fell back to a direct edge
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

/// Id used for the final leg to the route end point in the degraded list
pub const END_SEGMENT_ID: &str = "end";

/// Stitch planner paths through `ordered` stops from `start` to `end`.
///
/// Each consecutive pair is planned independently; the first point of every
/// leg after the first is dropped because it duplicates the previous leg's
/// arrival point. A leg with no walkable path does not abort the route: the
/// raw target point is inserted directly and the destination is recorded in
/// the degraded list.
pub(crate) fn stitch(
    grid: &WalkableGrid,
    planner: &dyn PathPlanner,
    start: PixelPoint,
    ordered: &[Location],
    end: PixelPoint,
) -> Result<PlannedRoute, CoreError> {
    let start_cell = grid.nearest_walkable(start).ok_or(CoreError::Unreachable {
        x: start.x,
        y: start.y,
    })?;

    let mut points: Vec<PathPoint> = Vec::new();
    let mut stops: Vec<RouteStop> = Vec::new();
    let mut degraded: Vec<String> = Vec::new();

    // The polyline starts at the snapped start cell center, never at the
    // raw input coordinate
    let mut cursor = grid.grid_to_pixel(start_cell);
    points.push(PathPoint::waypoint(cursor));

    let mut targets: Vec<(PixelPoint, Option<&Location>)> =
        ordered.iter().map(|loc| (loc.position, Some(loc))).collect();
    targets.push((end, None));

    for (target, location) in targets {
        let leg_path = planner.plan(grid, cursor, target)?;
        let segment_id = location
            .map(|loc| loc.id.clone())
            .unwrap_or_else(|| END_SEGMENT_ID.to_string());

        let mut leg: Vec<PathPoint> = Vec::new();
        let teleported = leg_path.is_empty();
        if teleported {
            tracing::warn!(
                segment = %segment_id,
                "no walkable path for route segment, degrading to a direct edge"
            );
            degraded.push(segment_id.clone());
            leg.push(PathPoint::waypoint(target));
        } else {
            for p in &leg_path {
                leg.push(PathPoint::waypoint(*p));
            }
        }

        if let Some(last) = leg.last_mut() {
            last.stop_id = location.map(|loc| loc.id.clone());
        }

        // The leg normally starts where the previous one ended; drop that
        // duplicate join point. After a degraded leg the join point can
        // differ, so only drop an exact duplicate.
        let skip = match (points.last(), leg.first()) {
            (Some(prev), Some(first)) if prev.position == first.position => 1,
            _ => 0,
        };
        if leg.len() > skip {
            points.extend(leg.iter().skip(skip).cloned());
        } else if let (Some(prev), Some(only)) = (points.last_mut(), leg.last()) {
            // Single-point leg that duplicates the join point: keep the
            // stop tag on the already-emitted point
            if prev.stop_id.is_none() {
                prev.stop_id = only.stop_id.clone();
            }
        }

        cursor = leg.last().map(|p| p.position).unwrap_or(target);

        if let Some(loc) = location {
            stops.push(RouteStop {
                location: loc.clone(),
                leg,
                teleported,
            });
        }
    }

    let total_length = polyline_length(&points);

    Ok(PlannedRoute {
        stops,
        points,
        total_length,
        degraded,
        unreachable: Vec::new(),
    })
}

/// Summed Euclidean length of a path polyline
pub fn polyline_length(points: &[PathPoint]) -> f64 {
    points
        .windows(2)
        .map(|pair| pair[0].position.distance_to(&pair[1].position))
        .sum()
}
