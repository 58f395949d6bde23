use serde_derive::Serialize;

use crate::config::Config;
use crate::error::Error;
use crate::math::{self, CubicSpline};
use crate::track::Track;

/// Per-track kinematic series covering every frame of the batch. All
/// channels share the same length; the leading entries of the derived
/// channels repeat the first computed value.
#[derive(Debug, Clone, Serialize)]
pub struct DenseSeries {
    pub xs: Vec<f32>,
    pub ys: Vec<f32>,
    /// Heading angle in radians, `[0, pi]`.
    pub angles: Vec<f32>,
    /// Centroid displacement per frame.
    pub velocities: Vec<f32>,
    pub accelerations: Vec<f32>,
    /// Bounding-box diagonal, the reference length for overlap checks.
    pub diagonal: f32,
}

impl DenseSeries {
    #[inline]
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    #[inline]
    pub fn position(&self, frame: usize) -> nalgebra::Point2<f32> {
        nalgebra::Point2::new(self.xs[frame], self.ys[frame])
    }
}

/// Smooths and densifies one track's raw series at a time.
pub struct SignalProcessor {
    config: Config,
}

impl SignalProcessor {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Moving-average pass, identity when smoothing is disabled.
    pub fn smooth(&self, series: &[f32]) -> Vec<f32> {
        if self.config.smoothing {
            math::moving_average(series, self.config.smoothing_window)
        } else {
            series.to_vec()
        }
    }

    /// Fills the gaps of a sparse track with cubic splines over its known
    /// (frame, position) samples and returns a dense series over
    /// `[0, n_frames)`. Angle, velocity and acceleration are recomputed from
    /// the interpolated positions so the channels stay kinematically
    /// consistent with each other.
    pub fn interpolate(&self, track: &Track, n_frames: usize) -> Result<DenseSeries, Error> {
        let got = track.len();
        let need = self.config.min_interp_samples.max(3);

        if got < need {
            return Err(Error::InsufficientSamples {
                id: track.id,
                got,
                need,
            });
        }

        let ts: Vec<f32> = track.frames.iter().map(|&f| f as f32).collect();
        let xs: Vec<f32> = track.positions.iter().map(|p| p.x).collect();
        let ys: Vec<f32> = track.positions.iter().map(|p| p.y).collect();

        let xs = self.smooth(&xs);
        let ys = self.smooth(&ys);

        // frames are strictly increasing, so a fit only fails on sample count
        let fail = || Error::InsufficientSamples {
            id: track.id,
            got,
            need,
        };
        let sx = CubicSpline::fit(&ts, &xs).ok_or_else(fail)?;
        let sy = CubicSpline::fit(&ts, &ys).ok_or_else(fail)?;

        let xs: Vec<f32> = (0..n_frames).map(|f| sx.eval(f as f32)).collect();
        let ys: Vec<f32> = (0..n_frames).map(|f| sy.eval(f as f32)).collect();

        let (angles, velocities, accelerations) = derive_channels(&xs, &ys);

        Ok(DenseSeries {
            xs,
            ys,
            angles: self.smooth(&angles),
            velocities: self.smooth(&velocities),
            accelerations: self.smooth(&accelerations),
            diagonal: track.diagonal(),
        })
    }
}

/// Finite-difference heading/velocity/acceleration over dense positions.
fn derive_channels(xs: &[f32], ys: &[f32]) -> (Vec<f32>, Vec<f32>, Vec<f32>) {
    let n = xs.len();

    let mut angles = vec![0.0; n];
    let mut velocities = vec![0.0; n];
    let mut accelerations = vec![0.0; n];

    if n < 2 {
        return (angles, velocities, accelerations);
    }

    let mut prev_angle = 0.0;
    for i in 1..n {
        let dx = xs[i] - xs[i - 1];
        let dy = ys[i] - ys[i - 1];
        let dist = (dx * dx + dy * dy).sqrt();

        let angle = if dist > f32::EPSILON {
            (dx / dist).clamp(-1.0, 1.0).acos()
        } else {
            prev_angle
        };
        prev_angle = angle;

        angles[i] = angle;
        velocities[i] = dist;
    }
    angles[0] = angles[1];
    velocities[0] = velocities[1];

    if n > 2 {
        for i in 2..n {
            accelerations[i] = velocities[i] - velocities[i - 1];
        }
        accelerations[0] = accelerations[2];
        accelerations[1] = accelerations[2];
    }

    (angles, velocities, accelerations)
}
