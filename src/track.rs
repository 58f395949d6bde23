use std::fmt;

use nalgebra as na;
use serde_derive::Serialize;

use crate::detection::Detection;
use crate::math;

/// Stable identity of one physical object. Assigned once, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TrackId(pub u32);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kinematic history of one tracked object. Samples are sparse: a frame
/// without a matched detection leaves a gap that interpolation fills later.
///
/// Invariant after every accepted sample:
/// `positions.len() == directions.len() + 1 == velocities.len() + 1
///  == accelerations.len() + 2`.
#[derive(Debug, Clone)]
pub struct Track {
    pub id: TrackId,
    /// Frame index of every accepted sample, strictly increasing.
    pub frames: Vec<usize>,
    pub positions: Vec<na::Point2<f32>>,
    /// Unit heading per consecutive position pair.
    pub directions: Vec<na::Vector2<f32>>,
    /// Centroid displacement per frame, one entry per position pair.
    pub velocities: Vec<f32>,
    pub accelerations: Vec<f32>,
    /// Last known (width, height) of the bounding box.
    pub size: (f32, f32),
    pub last_seen_frame: usize,
}

impl Track {
    pub fn new(id: TrackId, frame: usize, det: &Detection) -> Self {
        Self {
            id,
            frames: vec![frame],
            positions: vec![det.centroid()],
            directions: Vec::new(),
            velocities: Vec::new(),
            accelerations: Vec::new(),
            size: (det.w, det.h),
            last_seen_frame: frame,
        }
    }

    /// Appends a sample and its finite-difference kinematics. The first
    /// sample of a track carries no derived values.
    pub fn push_sample(&mut self, frame: usize, det: &Detection) {
        debug_assert!(frame > self.last_seen_frame);

        let pos = det.centroid();
        let prev = self.positions[self.positions.len() - 1];
        let df = (frame - self.last_seen_frame) as f32;

        let delta = pos - prev;
        let dist = delta.norm();

        // zero displacement keeps the previous heading
        let dir = if dist > f32::EPSILON {
            delta / dist
        } else {
            self.directions
                .last()
                .copied()
                .unwrap_or_else(na::Vector2::x)
        };

        let vel = dist / df;

        if let Some(&prev_vel) = self.velocities.last() {
            self.accelerations.push((vel - prev_vel) / df);
        }

        self.directions.push(dir);
        self.velocities.push(vel);
        self.positions.push(pos);
        self.frames.push(frame);
        self.size = (det.w, det.h);
        self.last_seen_frame = frame;
    }

    #[inline]
    pub fn last_position(&self) -> na::Point2<f32> {
        self.positions[self.positions.len() - 1]
    }

    #[inline]
    pub fn diagonal(&self) -> f32 {
        let (w, h) = self.size;
        (w * w + h * h).sqrt()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Heading angle of a direction vector, `acos(dir.x)` in `[0, pi]`.
    pub fn heading_angles(&self) -> Vec<f32> {
        self.directions
            .iter()
            .map(|d| d.x.clamp(-1.0, 1.0).acos())
            .collect()
    }

    /// Variance of the centroid norm over the whole history. Near zero for
    /// stationary objects.
    pub fn positional_variance(&self) -> f32 {
        let norms: Vec<f32> = self.positions.iter().map(|p| p.coords.norm()).collect();
        math::variance(&norms)
    }
}
