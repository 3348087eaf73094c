//! Walkable-area grid for store navigation
//!
//! This module discretizes the store floor plan into a uniform grid of
//! traversal-cost cells. The grid is built once per map configuration from
//! lists of passable and blocked rectangles, then treated as read-only for
//! the lifetime of all planning calls.

use crate::error::CoreError;

/// Traversal cost values for walkable cells
pub mod cell_cost {
    /// Normal aisle passage
    pub const NORMAL: f64 = 1.0;
    /// Constrained or narrow passage
    pub const NARROW: f64 = 2.0;
    /// Sentinel for impassable cells; never used as an edge weight
    pub const IMPASSABLE: f64 = 1.0e9;
}

/// Maximum Chebyshev radius (in cells) for the nearest-walkable search
pub const SNAP_RADIUS: i32 = 30;

/// Coordinate of a cell in the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
}

impl GridCoord {
    pub fn new(x: i32, y: i32) -> Self {
        GridCoord { x, y }
    }
}

/// A point in the planning frame (map pixels)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        PixelPoint { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &PixelPoint) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A single grid cell
#[derive(Debug, Clone, Copy)]
pub struct GridCell {
    pub walkable: bool,
    pub cost: f64,
}

/// Axis-aligned rectangle in pixel space
#[derive(Debug, Clone, Copy)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Rect { x0, y0, x1, y1 }
    }

    fn is_finite(&self) -> bool {
        self.x0.is_finite() && self.y0.is_finite() && self.x1.is_finite() && self.y1.is_finite()
    }

    /// Swap inverted extents so that x0 <= x1 and y0 <= y1
    fn normalized(&self) -> Rect {
        Rect {
            x0: self.x0.min(self.x1),
            y0: self.y0.min(self.y1),
            x1: self.x0.max(self.x1),
            y1: self.y0.max(self.y1),
        }
    }
}

/// A passable rectangular region with its traversal cost
#[derive(Debug, Clone, Copy)]
pub struct PassableArea {
    pub rect: Rect,
    pub cost: f64,
}

impl PassableArea {
    /// Normal-cost passage
    pub fn new(rect: Rect) -> Self {
        PassableArea {
            rect,
            cost: cell_cost::NORMAL,
        }
    }

    /// Narrow-passage cost
    pub fn narrow(rect: Rect) -> Self {
        PassableArea {
            rect,
            cost: cell_cost::NARROW,
        }
    }

    pub fn with_cost(rect: Rect, cost: f64) -> Self {
        PassableArea { rect, cost }
    }
}

/// A walkable-area grid for the store floor plan
#[derive(Debug, Clone)]
pub struct WalkableGrid {
    pub width: usize,
    pub height: usize,
    pub cell_size: f64,
    cells: Vec<GridCell>,
}

impl WalkableGrid {
    /// Build a grid from passable and blocked rectangle lists.
    ///
    /// All passable rectangles are painted first as a batch, then all
    /// blocked rectangles, so an obstacle is never re-opened by a later
    /// passable region. Rectangles reaching outside the grid are clipped
    /// silently; non-finite geometry and costs below 1 are rejected.
    pub fn build(
        width: usize,
        height: usize,
        cell_size: f64,
        passable: &[PassableArea],
        blocked: &[Rect],
    ) -> Result<WalkableGrid, CoreError> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidGeometry(
                "grid dimensions must be positive".to_string(),
            ));
        }
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(CoreError::InvalidGeometry(
                "cell size must be positive and finite".to_string(),
            ));
        }
        for area in passable {
            if !area.rect.is_finite() {
                return Err(CoreError::InvalidGeometry(
                    "passable rectangle has non-finite coordinates".to_string(),
                ));
            }
            if !area.cost.is_finite() || area.cost < cell_cost::NORMAL {
                return Err(CoreError::InvalidGeometry(format!(
                    "passable cost must be finite and >= {}, got {}",
                    cell_cost::NORMAL,
                    area.cost
                )));
            }
        }
        for rect in blocked {
            if !rect.is_finite() {
                return Err(CoreError::InvalidGeometry(
                    "blocked rectangle has non-finite coordinates".to_string(),
                ));
            }
        }

        let mut grid = WalkableGrid {
            width,
            height,
            cell_size,
            cells: vec![
                GridCell {
                    walkable: false,
                    cost: cell_cost::IMPASSABLE,
                };
                width * height
            ],
        };

        for area in passable {
            grid.paint(&area.rect, true, area.cost);
        }
        for rect in blocked {
            grid.paint(rect, false, cell_cost::IMPASSABLE);
        }

        Ok(grid)
    }

    /// Paint every cell covered by the rectangle, clipped to the grid bounds
    fn paint(&mut self, rect: &Rect, walkable: bool, cost: f64) {
        let r = rect.normalized();
        let x_start = (r.x0 / self.cell_size).floor() as i64;
        let x_end = (r.x1 / self.cell_size).ceil() as i64 - 1;
        let y_start = (r.y0 / self.cell_size).floor() as i64;
        let y_end = (r.y1 / self.cell_size).ceil() as i64 - 1;

        let x_start = x_start.max(0) as usize;
        let y_start = y_start.max(0) as usize;
        if x_end < 0 || y_end < 0 || x_start >= self.width || y_start >= self.height {
            return;
        }
        let x_end = (x_end as usize).min(self.width - 1);
        let y_end = (y_end as usize).min(self.height - 1);

        for y in y_start..=y_end {
            for x in x_start..=x_end {
                self.cells[y * self.width + x] = GridCell { walkable, cost };
            }
        }
    }

    pub fn in_bounds(&self, coord: GridCoord) -> bool {
        coord.x >= 0 && coord.x < self.width as i32 && coord.y >= 0 && coord.y < self.height as i32
    }

    /// Get the cell at a coordinate, if within bounds
    pub fn cell(&self, coord: GridCoord) -> Option<&GridCell> {
        if self.in_bounds(coord) {
            Some(&self.cells[coord.y as usize * self.width + coord.x as usize])
        } else {
            None
        }
    }

    /// Whether the cell is walkable; out-of-bounds cells are not
    pub fn is_walkable(&self, coord: GridCoord) -> bool {
        self.cell(coord).map_or(false, |c| c.walkable)
    }

    /// Traversal cost of the cell; impassable sentinel when out of bounds
    pub fn cost(&self, coord: GridCoord) -> f64 {
        self.cell(coord).map_or(cell_cost::IMPASSABLE, |c| c.cost)
    }

    /// Convert a pixel point to the coordinate of its containing cell
    pub fn pixel_to_grid(&self, point: PixelPoint) -> GridCoord {
        GridCoord {
            x: (point.x / self.cell_size).floor() as i32,
            y: (point.y / self.cell_size).floor() as i32,
        }
    }

    /// Convert a grid coordinate to the pixel center of its cell
    pub fn grid_to_pixel(&self, coord: GridCoord) -> PixelPoint {
        PixelPoint {
            x: (coord.x as f64 + 0.5) * self.cell_size,
            y: (coord.y as f64 + 0.5) * self.cell_size,
        }
    }

    /// Find the walkable cell closest to a pixel point.
    ///
    /// Returns the containing cell unchanged when it is already walkable,
    /// otherwise searches concentric Chebyshev rings of growing radius up
    /// to [`SNAP_RADIUS`]. Ring traversal order is fixed, so ties within a
    /// ring resolve deterministically. `None` means the location is
    /// unreachable and must not be used as a search endpoint.
    pub fn nearest_walkable(&self, point: PixelPoint) -> Option<GridCoord> {
        if !point.is_finite() {
            return None;
        }
        let center = self.pixel_to_grid(point);
        if self.is_walkable(center) {
            return Some(center);
        }

        for r in 1..=SNAP_RADIUS {
            for dy in -r..=r {
                for dx in -r..=r {
                    // Only cells on the ring boundary
                    if dx.abs() != r && dy.abs() != r {
                        continue;
                    }
                    let coord = GridCoord::new(center.x + dx, center.y + dy);
                    if self.is_walkable(coord) {
                        return Some(coord);
                    }
                }
            }
        }

        None
    }

    /// Check that the straight segment between two pixel points stays on
    /// walkable cells, sampling at half-cell steps
    pub fn line_walkable(&self, a: PixelPoint, b: PixelPoint) -> bool {
        let distance = a.distance_to(&b);
        let steps = (distance / (self.cell_size * 0.5)).ceil() as i64;

        for i in 0..=steps {
            let t = if steps > 0 { i as f64 / steps as f64 } else { 0.0 };
            let p = PixelPoint::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y));
            if !self.is_walkable(self.pixel_to_grid(p)) {
                return false;
            }
        }

        true
    }
}
