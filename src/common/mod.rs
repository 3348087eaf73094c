//! Common utilities and types for the Wayfinder robot

/// Common types used across the codebase
pub mod types {
    /// A 2D pose in the robot's native frame (x, y, heading in radians)
    pub type Pose2D = (f64, f64, f64);
}
