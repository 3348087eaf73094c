//! Least-squares 2-D similarity fit between corresponding point sets
//!
//! Procrustes-style closed form: both sets are centered on their own
//! centroids, scale comes from the centered norm ratio, rotation from the
//! atan2 of summed cross and dot products, and translation from mapping
//! the robot centroid onto the web centroid.

use nalgebra::{Rotation2, Vector2};

/// A fitted similarity transform mapping robot-frame points onto
/// planning-frame (web) pixels: `web = scale * R(rotation) * robot + translation`
#[derive(Debug, Clone, Copy)]
pub struct SimilarityFit {
    pub scale: f64,
    pub rotation: f64,
    pub translation: Vector2<f64>,
    /// Mean Euclidean residual over the calibration pairs, in pixels
    pub mean_residual: f64,
}

impl SimilarityFit {
    /// Map a robot-frame point into the planning frame
    pub fn apply(&self, robot: Vector2<f64>) -> Vector2<f64> {
        self.scale * (Rotation2::new(self.rotation) * robot) + self.translation
    }

    /// Exact algebraic inverse of [`apply`](Self::apply)
    pub fn apply_inverse(&self, web: Vector2<f64>) -> Vector2<f64> {
        (Rotation2::new(-self.rotation) * (web - self.translation)) / self.scale
    }
}

/// Fit a similarity transform over corresponding robot/web point pairs.
///
/// Returns `None` for degenerate input: fewer than two distinct points in
/// either set leaves rotation and scale underdetermined.
pub(crate) fn fit_similarity(
    robot: &[Vector2<f64>],
    web: &[Vector2<f64>],
) -> Option<SimilarityFit> {
    debug_assert_eq!(robot.len(), web.len());
    let n = robot.len();
    if n == 0 {
        return None;
    }

    let robot_centroid = robot.iter().sum::<Vector2<f64>>() / n as f64;
    let web_centroid = web.iter().sum::<Vector2<f64>>() / n as f64;

    let mut robot_norm_sq = 0.0;
    let mut web_norm_sq = 0.0;
    let mut dot_sum = 0.0;
    let mut cross_sum = 0.0;
    for (r, w) in robot.iter().zip(web.iter()) {
        let rc = r - robot_centroid;
        let wc = w - web_centroid;
        robot_norm_sq += rc.norm_squared();
        web_norm_sq += wc.norm_squared();
        dot_sum += rc.dot(&wc);
        cross_sum += rc.x * wc.y - rc.y * wc.x;
    }

    // All robot points coincident: scale and rotation are undefined
    if robot_norm_sq <= f64::EPSILON || web_norm_sq <= f64::EPSILON {
        return None;
    }

    let scale = (web_norm_sq / robot_norm_sq).sqrt();
    let rotation = cross_sum.atan2(dot_sum);
    let translation = web_centroid - scale * (Rotation2::new(rotation) * robot_centroid);

    let fit = SimilarityFit {
        scale,
        rotation,
        translation,
        mean_residual: 0.0,
    };
    let mean_residual = robot
        .iter()
        .zip(web.iter())
        .map(|(r, w)| (fit.apply(*r) - w).norm())
        .sum::<f64>()
        / n as f64;

    Some(SimilarityFit {
        mean_residual,
        ..fit
    })
}
