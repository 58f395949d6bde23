use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use nalgebra as na;
use serde_derive::Serialize;

use crate::config::Config;
use crate::signal::DenseSeries;
use crate::track::TrackId;

/// Strength of one collision signal. Absence of a signal is inconclusive
/// evidence, not proof of no accident, so it still contributes weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Evidence {
    Weak,
    Strong,
}

impl Evidence {
    #[inline]
    pub fn score(self) -> f32 {
        match self {
            Evidence::Weak => 0.5,
            Evidence::Strong => 1.0,
        }
    }
}

/// The three independent collision signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Scores {
    pub overlap: Evidence,
    pub acceleration: Evidence,
    pub angle: Evidence,
}

impl Scores {
    pub fn neutral() -> Self {
        Self {
            overlap: Evidence::Weak,
            acceleration: Evidence::Weak,
            angle: Evidence::Weak,
        }
    }

    /// Composite score, `1.5..=3.0`.
    #[inline]
    pub fn total(&self) -> f32 {
        self.overlap.score() + self.acceleration.score() + self.angle.score()
    }
}

/// A declared accident: the first overlapping frame, the tracks involved
/// and the evidence that tipped the verdict.
#[derive(Debug, Clone, Serialize)]
pub struct AccidentCandidate {
    pub frame_overlapped: usize,
    pub track_ids: Vec<TrackId>,
    pub scores: Scores,
}

/// Scores candidate collisions over the dense series of one batch.
pub struct AccidentDetector {
    config: Config,
}

impl AccidentDetector {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Runs the three scans and the composite decision. Returns the
    /// component scores and, when the composite reaches the decision
    /// threshold, the accident record.
    pub fn assess(
        &self,
        series: &BTreeMap<TrackId, DenseSeries>,
        n_frames: usize,
    ) -> (Scores, Option<AccidentCandidate>) {
        let (frame, overlapped) = match self.scan_overlaps(series, n_frames) {
            Some(found) => found,
            None => {
                debug!("no overlapping tracks in this batch");
                return (Scores::neutral(), None);
            }
        };

        debug!(
            "overlap between {:?} first seen at frame {}",
            overlapped, frame
        );

        let accel_signal = self.acceleration_anomaly(series, &overlapped, frame, n_frames);
        let acceleration = if accel_signal >= self.config.accel_threshold {
            Evidence::Strong
        } else {
            Evidence::Weak
        };

        let angle = match self.angle_anomaly(series, &overlapped, frame, n_frames) {
            Some(change) if change >= self.config.trajectory_threshold => Evidence::Strong,
            Some(_) => Evidence::Weak,
            None => Evidence::Weak,
        };

        let scores = Scores {
            overlap: Evidence::Strong,
            acceleration,
            angle,
        };

        let candidate = if scores.total() >= self.config.decision_threshold {
            Some(AccidentCandidate {
                frame_overlapped: frame,
                track_ids: overlapped.into_iter().collect(),
                scores,
            })
        } else {
            None
        };

        (scores, candidate)
    }

    /// Every frame, every unordered track pair: overlap when the centroid
    /// distance drops below `overlap_ratio * (diag_a + diag_b)`. Returns the
    /// first overlapping frame and every track that ever overlapped.
    fn scan_overlaps(
        &self,
        series: &BTreeMap<TrackId, DenseSeries>,
        n_frames: usize,
    ) -> Option<(usize, BTreeSet<TrackId>)> {
        let ids: Vec<TrackId> = series.keys().copied().collect();

        let mut overlapped = BTreeSet::new();
        let mut first_frame = None;

        for frame in 0..n_frames {
            for i in 0..ids.len() {
                for j in i + 1..ids.len() {
                    let a = &series[&ids[i]];
                    let b = &series[&ids[j]];

                    if frame >= a.len() || frame >= b.len() {
                        continue;
                    }

                    let dist = na::distance(&a.position(frame), &b.position(frame));
                    let threshold = self.config.overlap_ratio * (a.diagonal + b.diagonal);

                    if dist <= threshold {
                        overlapped.insert(ids[i]);
                        overlapped.insert(ids[j]);
                        first_frame.get_or_insert(frame);
                    }
                }
            }
        }

        first_frame.map(|frame| (frame, overlapped))
    }

    /// Mean over the overlapped tracks of (max acceleration shortly after
    /// the overlap frame minus mean acceleration shortly before it).
    fn acceleration_anomaly(
        &self,
        series: &BTreeMap<TrackId, DenseSeries>,
        overlapped: &BTreeSet<TrackId>,
        frame: usize,
        n_frames: usize,
    ) -> f32 {
        if overlapped.is_empty() {
            return 0.0;
        }

        let w = self.config.anomaly_window;
        let pre = frame.saturating_sub(w)..frame.saturating_sub(1);
        let post = frame..(frame + w).saturating_sub(1).min(n_frames);

        let mut sum = 0.0;
        for id in overlapped {
            let acc = &series[id].accelerations;

            let pre_len = pre.len();
            let pre_mean = if pre_len > 0 {
                pre.clone().map(|f| acc[f]).sum::<f32>() / pre_len as f32
            } else {
                0.0
            };

            let post_max = post.clone().map(|f| acc[f]).fold(0.0f32, f32::max);

            sum += post_max - pre_mean;
        }

        sum / overlapped.len() as f32
    }

    /// Largest heading-angle swing of any overlapped track inside the
    /// window straddling the overlap frame.
    fn angle_anomaly(
        &self,
        series: &BTreeMap<TrackId, DenseSeries>,
        overlapped: &BTreeSet<TrackId>,
        frame: usize,
        n_frames: usize,
    ) -> Option<f32> {
        if overlapped.is_empty() || n_frames == 0 {
            return None;
        }

        let w = self.config.anomaly_window;
        let lo = frame.saturating_sub(w);
        let hi = (frame + w).min(n_frames - 1);

        let mut max_change: Option<f32> = None;

        for id in overlapped {
            let window = &series[id].angles[lo..=hi];

            let min = window.iter().copied().fold(f32::INFINITY, f32::min);
            let max = window.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            let change = max - min;

            max_change = Some(match max_change {
                Some(best) => best.max(change),
                None => change,
            });
        }

        max_change
    }
}
