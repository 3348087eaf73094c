//! A* path planner over the walkable grid
//!
//! Searches the 8-connected grid graph restricted to walkable cells.
//! Straight moves cost the destination cell's traversal cost, diagonal
//! moves cost sqrt(2) times it, and diagonal moves may not cut through
//! blocked corners. Search nodes live in an arena allocated per call and
//! reference their predecessors by index.

use crate::error::CoreError;
use crate::navigation::grid::{GridCoord, PixelPoint, WalkableGrid};
use crate::navigation::planner::PathPlanner;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::collections::HashMap;

/// Configuration for the A* planner
#[derive(Clone, Debug)]
pub struct AStarConfig {
    /// Maximum node expansions before the search gives up
    pub max_iterations: usize,
    /// Remove line-of-sight-redundant points from the returned path
    pub simplify: bool,
}

impl Default for AStarConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
            simplify: false,
        }
    }
}

/// Node in the search arena; predecessors are referenced by arena index
#[derive(Clone, Debug)]
struct SearchNode {
    coord: GridCoord,
    g: f64,
    parent: Option<usize>,
}

/// Heap entry ordered by lowest f, ties broken by lowest h
#[derive(Clone, Copy, Debug)]
struct OpenEntry {
    f: f64,
    h: f64,
    node: usize,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.f == other.f && self.h == other.h
    }
}

impl Eq for OpenEntry {}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for a min-heap on (f, h)
        other
            .f
            .partial_cmp(&self.f)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.h.partial_cmp(&self.h).unwrap_or(Ordering::Equal))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A* path planner
#[derive(Debug)]
pub struct AStarPlanner {
    config: AStarConfig,
}

const SQRT_2: f64 = std::f64::consts::SQRT_2;

impl AStarPlanner {
    pub fn new(config: AStarConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(AStarConfig::default())
    }

    /// Manhattan distance between grid coordinates
    #[inline]
    fn heuristic(from: GridCoord, to: GridCoord) -> f64 {
        ((to.x - from.x).abs() + (to.y - from.y).abs()) as f64
    }

    fn search(&self, grid: &WalkableGrid, start: GridCoord, goal: GridCoord) -> Vec<GridCoord> {
        let width = grid.width;
        let index_of = |c: GridCoord| c.y as usize * width + c.x as usize;

        let mut arena: Vec<SearchNode> = Vec::with_capacity(256);
        let mut open: BinaryHeap<OpenEntry> = BinaryHeap::new();
        let mut best_g = vec![f64::INFINITY; width * grid.height];
        let mut closed = vec![false; width * grid.height];

        arena.push(SearchNode {
            coord: start,
            g: 0.0,
            parent: None,
        });
        best_g[index_of(start)] = 0.0;
        let h0 = Self::heuristic(start, goal);
        open.push(OpenEntry {
            f: h0,
            h: h0,
            node: 0,
        });

        let neighbors = [
            (-1, 0),
            (1, 0),
            (0, -1),
            (0, 1),
            (-1, -1),
            (1, -1),
            (-1, 1),
            (1, 1),
        ];

        let mut expansions = 0usize;

        while let Some(entry) = open.pop() {
            let current = arena[entry.node].coord;
            let cell_idx = index_of(current);
            if closed[cell_idx] {
                continue;
            }
            closed[cell_idx] = true;

            if current == goal {
                return Self::reconstruct(&arena, entry.node);
            }

            expansions += 1;
            if expansions >= self.config.max_iterations {
                tracing::warn!(
                    max_iterations = self.config.max_iterations,
                    "A* hit the iteration cap, treating as no path"
                );
                return Vec::new();
            }

            let current_g = arena[entry.node].g;

            for &(dx, dy) in &neighbors {
                let next = GridCoord::new(current.x + dx, current.y + dy);
                if !grid.is_walkable(next) {
                    continue;
                }
                let diagonal = dx != 0 && dy != 0;
                if diagonal {
                    // Corner cutting: both orthogonal neighbors must be open
                    let side_a = GridCoord::new(current.x + dx, current.y);
                    let side_b = GridCoord::new(current.x, current.y + dy);
                    if !grid.is_walkable(side_a) || !grid.is_walkable(side_b) {
                        continue;
                    }
                }

                let next_idx = index_of(next);
                if closed[next_idx] {
                    continue;
                }

                let step = if diagonal { SQRT_2 } else { 1.0 };
                let tentative = current_g + step * grid.cost(next);
                if tentative < best_g[next_idx] {
                    best_g[next_idx] = tentative;
                    arena.push(SearchNode {
                        coord: next,
                        g: tentative,
                        parent: Some(entry.node),
                    });
                    let h = Self::heuristic(next, goal);
                    open.push(OpenEntry {
                        f: tentative + h,
                        h,
                        node: arena.len() - 1,
                    });
                }
            }
        }

        // Open set exhausted: the regions are disconnected
        Vec::new()
    }

    fn reconstruct(arena: &[SearchNode], goal_node: usize) -> Vec<GridCoord> {
        let mut path = Vec::new();
        let mut current = Some(goal_node);
        while let Some(idx) = current {
            path.push(arena[idx].coord);
            current = arena[idx].parent;
        }
        path.reverse();
        path
    }

    /// Drop points that are line-of-sight redundant: every surviving point
    /// still sees its successor across walkable cells only
    fn simplify(grid: &WalkableGrid, path: &[PixelPoint]) -> Vec<PixelPoint> {
        if path.len() <= 2 {
            return path.to_vec();
        }

        let mut simplified = vec![path[0]];
        let mut anchor = 0;
        while anchor < path.len() - 1 {
            let mut reach = anchor + 1;
            for candidate in (anchor + 1)..path.len() {
                if grid.line_walkable(path[anchor], path[candidate]) {
                    reach = candidate;
                }
            }
            simplified.push(path[reach]);
            anchor = reach;
        }
        simplified
    }
}

impl PathPlanner for AStarPlanner {
    fn plan(
        &self,
        grid: &WalkableGrid,
        start: PixelPoint,
        goal: PixelPoint,
    ) -> Result<Vec<PixelPoint>, CoreError> {
        let start_cell = grid
            .nearest_walkable(start)
            .ok_or(CoreError::Unreachable {
                x: start.x,
                y: start.y,
            })?;
        let goal_cell = grid.nearest_walkable(goal).ok_or(CoreError::Unreachable {
            x: goal.x,
            y: goal.y,
        })?;

        if start_cell == goal_cell {
            return Ok(vec![grid.grid_to_pixel(start_cell)]);
        }

        let cells = self.search(grid, start_cell, goal_cell);
        let mut path: Vec<PixelPoint> = cells.iter().map(|&c| grid.grid_to_pixel(c)).collect();

        if self.config.simplify && !path.is_empty() {
            path = Self::simplify(grid, &path);
        }

        Ok(path)
    }

    fn name(&self) -> &str {
        "AStarPlanner"
    }

    fn configure(&mut self, params: &HashMap<String, f64>) -> Result<(), CoreError> {
        if let Some(&max_iterations) = params.get("max_iterations") {
            if max_iterations < 1.0 || !max_iterations.is_finite() {
                return Err(CoreError::Config(
                    "max_iterations must be at least 1".to_string(),
                ));
            }
            self.config.max_iterations = max_iterations as usize;
        }

        if let Some(&simplify) = params.get("simplify") {
            self.config.simplify = simplify != 0.0;
        }

        Ok(())
    }
}
