use serde_derive::Deserialize;

/// All tunables of the pipeline in one immutable structure. Components take
/// a reference at construction; nothing reads ambient globals.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum centroid distance (px) for a detection to match a track.
    pub gate_distance: f32,
    /// Apply the moving-average filter to trajectory signals.
    pub smoothing: bool,
    /// Width of the centered moving-average window.
    pub smoothing_window: usize,
    /// Tracks whose centroid-norm variance stays below this are treated as
    /// stationary and dropped before accident analysis.
    pub stationary_variance: f32,
    /// Two tracks overlap when their centroid distance is below
    /// `overlap_ratio * (diagonal_a + diagonal_b)`.
    pub overlap_ratio: f32,
    /// Number of frames inspected before and after the overlap frame.
    pub anomaly_window: usize,
    /// Acceleration-anomaly threshold (post-window max minus pre-window mean).
    pub accel_threshold: f32,
    /// Heading-angle change (rad) counted as a trajectory anomaly.
    pub trajectory_threshold: f32,
    /// Composite evidence sum (1.5..=3.0) at which an accident is declared.
    pub decision_threshold: f32,
    /// Minimum samples a track needs for cubic interpolation.
    pub min_interp_samples: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gate_distance: 50.0,
            smoothing: true,
            smoothing_window: 5,
            stationary_variance: 200.0,
            overlap_ratio: 0.3,
            anomaly_window: 10,
            accel_threshold: 1.0,
            trajectory_threshold: 0.1,
            decision_threshold: 2.0,
            min_interp_samples: 4,
        }
    }
}
