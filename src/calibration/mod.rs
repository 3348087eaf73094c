//! Coordinate calibration between the robot frame and the planning frame
//!
//! The robot reports positions in its own metric frame while planning runs
//! in map pixels. This module fits a 2-D similarity transform (uniform
//! scale, rotation, translation) from operator-captured calibration point
//! pairs and applies it in both directions. With fewer than three pairs
//! the transform is underdetermined and stays disabled, passing points
//! through unchanged.
//!
//! Mutations (add/remove point) are serialized behind a mutex; readers get
//! an atomically swapped immutable parameter snapshot, so `forward` and
//! `inverse` never observe a partially updated fit.

pub mod fit;

use crate::common::types::Pose2D;
use crate::error::CoreError;
use crate::navigation::grid::PixelPoint;
use nalgebra::{Rotation2, Vector2};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::SystemTime;

use self::fit::fit_similarity;

/// Minimum calibration pairs for a determined similarity fit
pub const MIN_CALIBRATION_POINTS: usize = 3;

/// Mean residual above which a fit is flagged as poor, in pixels
pub const RESIDUAL_WARN_PX: f64 = 15.0;

/// A point in the robot's native coordinate frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobotPoint {
    pub x: f64,
    pub y: f64,
}

impl RobotPoint {
    pub fn new(x: f64, y: f64) -> Self {
        RobotPoint { x, y }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A captured correspondence between the two frames
#[derive(Debug, Clone)]
pub struct CalibrationPoint {
    pub id: String,
    pub description: String,
    pub web: PixelPoint,
    pub robot: RobotPoint,
    pub captured_at: SystemTime,
}

/// An immutable fitted-transform snapshot
#[derive(Debug, Clone)]
pub struct TransformParameters {
    pub translation: Vector2<f64>,
    pub rotation: f64,
    pub scale: f64,
    pub enabled: bool,
    /// Ids of the calibration points the fit was derived from
    pub point_ids: Vec<String>,
    pub fitted_at: SystemTime,
    /// Mean residual Euclidean error over the calibration points, in pixels
    pub mean_residual_px: f64,
}

impl TransformParameters {
    /// Disabled identity transform
    pub fn identity() -> Self {
        TransformParameters {
            translation: Vector2::zeros(),
            rotation: 0.0,
            scale: 1.0,
            enabled: false,
            point_ids: Vec::new(),
            fitted_at: SystemTime::now(),
            mean_residual_px: 0.0,
        }
    }

    /// Map a robot-frame point into the planning frame
    pub fn forward(&self, point: RobotPoint) -> PixelPoint {
        if !self.enabled {
            return PixelPoint::new(point.x, point.y);
        }
        let v = self.scale * (Rotation2::new(self.rotation) * Vector2::new(point.x, point.y))
            + self.translation;
        PixelPoint::new(v.x, v.y)
    }

    /// Map a planning-frame point into the robot frame
    pub fn inverse(&self, point: PixelPoint) -> RobotPoint {
        if !self.enabled {
            return RobotPoint::new(point.x, point.y);
        }
        let v = (Rotation2::new(-self.rotation)
            * (Vector2::new(point.x, point.y) - self.translation))
            / self.scale;
        RobotPoint::new(v.x, v.y)
    }
}

/// Long-lived manager for calibration state and the fitted transform
#[derive(Debug)]
pub struct TransformManager {
    points: Mutex<BTreeMap<String, CalibrationPoint>>,
    params: RwLock<Arc<TransformParameters>>,
}

impl TransformManager {
    pub fn new() -> Self {
        TransformManager {
            points: Mutex::new(BTreeMap::new()),
            params: RwLock::new(Arc::new(TransformParameters::identity())),
        }
    }

    /// Add or replace a calibration point, then refit.
    ///
    /// Points are unique by id; adding one with an existing id replaces it.
    pub fn add_point(
        &self,
        id: impl Into<String>,
        description: impl Into<String>,
        web: PixelPoint,
        robot: RobotPoint,
    ) -> Result<(), CoreError> {
        if !web.is_finite() || !robot.is_finite() {
            return Err(CoreError::Calibration(
                "calibration coordinates must be finite".to_string(),
            ));
        }

        let id = id.into();
        let mut points = self
            .points
            .lock()
            .map_err(|_| CoreError::Calibration("calibration state lock poisoned".to_string()))?;
        points.insert(
            id.clone(),
            CalibrationPoint {
                id,
                description: description.into(),
                web,
                robot,
                captured_at: SystemTime::now(),
            },
        );
        self.refit(&points);
        Ok(())
    }

    /// Remove a calibration point by id, then refit; dropping below the
    /// minimum point count force-disables the transform
    pub fn remove_point(&self, id: &str) -> Result<bool, CoreError> {
        let mut points = self
            .points
            .lock()
            .map_err(|_| CoreError::Calibration("calibration state lock poisoned".to_string()))?;
        let removed = points.remove(id).is_some();
        if removed {
            self.refit(&points);
        }
        Ok(removed)
    }

    /// Refit from the current point set and atomically publish the result
    fn refit(&self, points: &BTreeMap<String, CalibrationPoint>) {
        let next = if points.len() < MIN_CALIBRATION_POINTS {
            tracing::info!(
                count = points.len(),
                min = MIN_CALIBRATION_POINTS,
                "too few calibration points, transform disabled"
            );
            TransformParameters::identity()
        } else {
            let robot: Vec<Vector2<f64>> = points
                .values()
                .map(|p| Vector2::new(p.robot.x, p.robot.y))
                .collect();
            let web: Vec<Vector2<f64>> = points
                .values()
                .map(|p| Vector2::new(p.web.x, p.web.y))
                .collect();

            match fit_similarity(&robot, &web) {
                Some(fit) => {
                    if fit.mean_residual > RESIDUAL_WARN_PX {
                        tracing::warn!(
                            residual_px = fit.mean_residual,
                            "calibration fit residual is large, check point quality"
                        );
                    }
                    TransformParameters {
                        translation: fit.translation,
                        rotation: fit.rotation,
                        scale: fit.scale,
                        enabled: true,
                        point_ids: points.keys().cloned().collect(),
                        fitted_at: SystemTime::now(),
                        mean_residual_px: fit.mean_residual,
                    }
                }
                None => {
                    tracing::warn!("degenerate calibration point set, transform disabled");
                    TransformParameters::identity()
                }
            }
        };

        match self.params.write() {
            Ok(mut guard) => *guard = Arc::new(next),
            Err(poisoned) => *poisoned.into_inner() = Arc::new(next),
        }
    }

    /// Get the current immutable parameter snapshot
    pub fn parameters(&self) -> Arc<TransformParameters> {
        match self.params.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Map a robot-frame point into the planning frame; identity when the
    /// transform is disabled
    pub fn forward(&self, point: RobotPoint) -> PixelPoint {
        self.parameters().forward(point)
    }

    /// Map robot telemetry (x, y, heading) into the planning frame; the
    /// heading is offset by the fitted rotation
    pub fn forward_pose(&self, pose: Pose2D) -> (PixelPoint, f64) {
        let params = self.parameters();
        let position = params.forward(RobotPoint::new(pose.0, pose.1));
        let heading = if params.enabled {
            pose.2 + params.rotation
        } else {
            pose.2
        };
        (position, heading)
    }

    /// Map a planning-frame goal into the robot frame; identity when the
    /// transform is disabled
    pub fn inverse(&self, point: PixelPoint) -> RobotPoint {
        self.parameters().inverse(point)
    }

    /// Number of stored calibration points
    pub fn point_count(&self) -> usize {
        match self.points.lock() {
            Ok(points) => points.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// Snapshot of the stored calibration points
    pub fn points(&self) -> Vec<CalibrationPoint> {
        match self.points.lock() {
            Ok(points) => points.values().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().values().cloned().collect(),
        }
    }
}

impl Default for TransformManager {
    fn default() -> Self {
        Self::new()
    }
}
