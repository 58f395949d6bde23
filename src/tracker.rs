use std::cmp::Ordering;

use log::warn;
use nalgebra as na;

use crate::config::Config;
use crate::detection::Detection;
use crate::error::Error;
use crate::frame::Frame;
use crate::store::TrackStore;
use crate::track::TrackId;

/// Matches one frame of detections against the store. Candidate pairs are
/// gated by centroid distance and resolved best-score-first, so a track
/// receives at most one detection per frame and a detection updates at most
/// one track. Leftover detections spawn new tracks.
pub struct Associator {
    gate_distance: f32,
}

impl Associator {
    pub fn new(config: &Config) -> Self {
        Self {
            gate_distance: config.gate_distance,
        }
    }

    /// Updates the store in place and returns the ids touched by this frame
    /// (matched and newly created).
    pub fn associate(&self, store: &mut TrackStore, frame: &Frame) -> Result<Vec<TrackId>, Error> {
        let mut dets: Vec<Detection> = Vec::with_capacity(frame.len());

        for det in frame.iter() {
            if det.is_valid() {
                dets.push(*det);
            } else {
                warn!("frame {}: dropping malformed detection {:?}", frame.index, det);
            }
        }

        // all gated (distance, track, detection) candidates
        let mut pairs: Vec<(f32, TrackId, usize)> = Vec::new();

        for (&id, track) in store.iter() {
            let last = track.last_position();

            for (j, det) in dets.iter().enumerate() {
                let dist = na::distance(&last, &det.centroid());

                if dist <= self.gate_distance {
                    pairs.push((dist, id, j));
                }
            }
        }

        // closest pair wins; equal distances fall to the earliest-created track
        pairs.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.1.cmp(&b.1))
        });

        let mut det_claimed = vec![false; dets.len()];
        let mut touched = Vec::new();

        for (_, id, j) in pairs {
            if det_claimed[j] || touched.contains(&id) {
                continue;
            }

            store.update(id, frame.index, &dets[j])?;
            det_claimed[j] = true;
            touched.push(id);
        }

        for (j, det) in dets.iter().enumerate() {
            if !det_claimed[j] {
                touched.push(store.create(frame.index, det));
            }
        }

        Ok(touched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(x: f32, y: f32) -> Detection {
        Detection::new(x, y, 32.0, 24.0, 0.9, 2)
    }

    fn setup() -> (Associator, TrackStore) {
        (Associator::new(&Config::default()), TrackStore::new())
    }

    #[test]
    fn repeated_detection_keeps_its_id() {
        let (assoc, mut store) = setup();

        let ids = assoc
            .associate(&mut store, &Frame::new(0, vec![det(100.0, 100.0)]))
            .unwrap();
        let id = ids[0];

        for frame in 1..20 {
            let ids = assoc
                .associate(&mut store, &Frame::new(frame, vec![det(100.0, 100.0)]))
                .unwrap();
            assert_eq!(ids, vec![id]);
        }

        assert_eq!(store.len(), 1);
    }

    #[test]
    fn jump_beyond_gate_spawns_new_track() {
        let (assoc, mut store) = setup();

        let first = assoc
            .associate(&mut store, &Frame::new(0, vec![det(0.0, 0.0)]))
            .unwrap()[0];

        // default gate is 50 px
        let second = assoc
            .associate(&mut store, &Frame::new(1, vec![det(200.0, 0.0)]))
            .unwrap()[0];

        assert_ne!(first, second);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn closest_detection_wins_the_claim() {
        let (assoc, mut store) = setup();

        let id = assoc
            .associate(&mut store, &Frame::new(0, vec![det(0.0, 0.0)]))
            .unwrap()[0];

        // both detections gate onto the same track; the closer one matches,
        // the other becomes a new track
        assoc
            .associate(
                &mut store,
                &Frame::new(1, vec![det(30.0, 0.0), det(5.0, 0.0)]),
            )
            .unwrap();

        assert_eq!(store.len(), 2);
        let track = store.get(id).unwrap();
        assert_eq!(track.last_position(), nalgebra::Point2::new(5.0, 0.0));
    }

    #[test]
    fn malformed_detections_are_dropped() {
        let (assoc, mut store) = setup();

        let ids = assoc
            .associate(
                &mut store,
                &Frame::new(
                    0,
                    vec![det(10.0, 10.0), Detection::new(f32::NAN, 0.0, 1.0, 1.0, 0.5, 2)],
                ),
            )
            .unwrap();

        assert_eq!(ids.len(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn empty_frame_is_fine() {
        let (assoc, mut store) = setup();
        let ids = assoc.associate(&mut store, &Frame::new(0, vec![])).unwrap();
        assert!(ids.is_empty());
    }
}
