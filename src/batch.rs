use std::collections::BTreeMap;

use log::{info, warn};

use crate::accident::{AccidentCandidate, AccidentDetector, Scores};
use crate::config::Config;
use crate::error::Error;
use crate::frame::Frame;
use crate::signal::{DenseSeries, SignalProcessor};
use crate::store::TrackStore;
use crate::track::TrackId;
use crate::tracker::Associator;

/// A track left out of the accident analysis and why.
#[derive(Debug)]
pub struct Exclusion {
    pub id: TrackId,
    pub reason: Error,
}

/// Completed analysis of one batch.
#[derive(Debug)]
pub struct BatchAnalysis {
    /// Dense series per retained track.
    pub series: BTreeMap<TrackId, DenseSeries>,
    pub scores: Scores,
    pub accident: Option<AccidentCandidate>,
    pub excluded: Vec<Exclusion>,
}

/// Terminal state of one batch. A batch that loses every track to pruning
/// or interpolation failure ends `Inconclusive`; other batches are not
/// affected either way.
#[derive(Debug)]
pub enum BatchOutcome {
    Analyzed(BatchAnalysis),
    Inconclusive { excluded: Vec<Exclusion> },
}

/// One video/folder worth of state: frames are ingested in increasing
/// order, then the whole batch is analyzed at once. Stationary pruning and
/// interpolation both need the full history, so nothing is scored
/// mid-ingestion.
pub struct Batch {
    config: Config,
    store: TrackStore,
    associator: Associator,
    n_frames: usize,
    next_frame: usize,
}

impl Batch {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            store: TrackStore::new(),
            associator: Associator::new(config),
            n_frames: 0,
            next_frame: 0,
        }
    }

    /// Associates one frame of detections. Frame indices must increase;
    /// finite-difference kinematics cannot absorb reordered input.
    pub fn push_frame(&mut self, frame: &Frame) -> Result<Vec<TrackId>, Error> {
        if frame.index < self.next_frame {
            return Err(Error::OutOfOrderFrame {
                got: frame.index,
                expected: self.next_frame,
            });
        }

        let touched = self.associator.associate(&mut self.store, frame)?;

        self.next_frame = frame.index + 1;
        self.n_frames = self.n_frames.max(frame.index + 1);

        Ok(touched)
    }

    #[inline]
    pub fn store(&self) -> &TrackStore {
        &self.store
    }

    #[inline]
    pub fn n_frames(&self) -> usize {
        self.n_frames
    }

    /// Prunes stationary tracks, densifies the survivors and runs the
    /// accident scans. Consumes the batch; partial state is never reused.
    pub fn analyze(mut self) -> BatchOutcome {
        self.store.prune_stationary(self.config.stationary_variance);

        let processor = SignalProcessor::new(&self.config);

        let mut series = BTreeMap::new();
        let mut excluded = Vec::new();

        for (&id, track) in self.store.iter() {
            match processor.interpolate(track, self.n_frames) {
                Ok(dense) => {
                    series.insert(id, dense);
                }
                Err(reason) => {
                    warn!("excluding track {} from analysis: {}", id, reason);
                    excluded.push(Exclusion { id, reason });
                }
            }
        }

        if series.is_empty() {
            return BatchOutcome::Inconclusive { excluded };
        }

        let detector = AccidentDetector::new(&self.config);
        let (scores, accident) = detector.assess(&series, self.n_frames);

        if let Some(candidate) = &accident {
            info!(
                "accident at frame {} between tracks {:?} (score {:.1})",
                candidate.frame_overlapped,
                candidate.track_ids,
                candidate.scores.total()
            );
        }

        BatchOutcome::Analyzed(BatchAnalysis {
            series,
            scores,
            accident,
            excluded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::Detection;

    fn det(x: f32, y: f32) -> Detection {
        Detection::new(x, y, 32.0, 24.0, 0.9, 2)
    }

    #[test]
    fn rejects_out_of_order_frames() {
        let mut batch = Batch::new(&Config::default());

        batch.push_frame(&Frame::new(3, vec![])).unwrap();
        let err = batch.push_frame(&Frame::new(3, vec![]));

        assert!(matches!(
            err,
            Err(Error::OutOfOrderFrame { got: 3, expected: 4 })
        ));
    }

    #[test]
    fn frame_gaps_are_allowed() {
        let mut batch = Batch::new(&Config::default());

        batch.push_frame(&Frame::new(0, vec![det(0.0, 0.0)])).unwrap();
        batch.push_frame(&Frame::new(7, vec![det(20.0, 0.0)])).unwrap();

        assert_eq!(batch.n_frames(), 8);
        assert_eq!(batch.store().len(), 1);
    }

    #[test]
    fn all_tracks_excluded_is_inconclusive() {
        let mut batch = Batch::new(&Config::default());

        // three samples with plenty of motion: survives pruning, fails
        // the four-sample interpolation minimum
        batch.push_frame(&Frame::new(0, vec![det(0.0, 0.0)])).unwrap();
        batch.push_frame(&Frame::new(1, vec![det(40.0, 0.0)])).unwrap();
        batch.push_frame(&Frame::new(2, vec![det(80.0, 0.0)])).unwrap();

        match batch.analyze() {
            BatchOutcome::Inconclusive { excluded } => {
                assert_eq!(excluded.len(), 1);
                assert!(matches!(
                    excluded[0].reason,
                    Error::InsufficientSamples { got: 3, need: 4, .. }
                ));
            }
            other => panic!("expected inconclusive outcome, got {:?}", other),
        }
    }

    #[test]
    fn empty_batch_is_inconclusive() {
        let batch = Batch::new(&Config::default());
        assert!(matches!(
            batch.analyze(),
            BatchOutcome::Inconclusive { .. }
        ));
    }
}
