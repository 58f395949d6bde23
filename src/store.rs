use std::collections::BTreeMap;

use log::debug;

use crate::detection::Detection;
use crate::error::Error;
use crate::track::{Track, TrackId};

/// Owns every track of one batch. Ids are handed out in creation order and
/// iteration follows id order, which gives earliest-created precedence
/// wherever ties must be broken deterministically.
#[derive(Debug)]
pub struct TrackStore {
    tracks: BTreeMap<TrackId, Track>,
    next_id: u32,
}

impl TrackStore {
    pub fn new() -> Self {
        Self {
            tracks: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Spawns a fresh track seeded with `det`.
    pub fn create(&mut self, frame: usize, det: &Detection) -> TrackId {
        let id = TrackId(self.next_id);
        self.next_id += 1;

        self.tracks.insert(id, Track::new(id, frame, det));
        id
    }

    /// Appends a sample to an existing track.
    pub fn update(&mut self, id: TrackId, frame: usize, det: &Detection) -> Result<(), Error> {
        let track = self.tracks.get_mut(&id).ok_or(Error::UnknownTrack(id))?;
        track.push_sample(frame, det);
        Ok(())
    }

    #[inline]
    pub fn get(&self, id: TrackId) -> Option<&Track> {
        self.tracks.get(&id)
    }

    /// Ids of tracks that received a detection at `frame`.
    pub fn get_active(&self, frame: usize) -> Vec<TrackId> {
        self.tracks
            .values()
            .filter(|t| t.last_seen_frame == frame)
            .map(|t| t.id)
            .collect()
    }

    /// Drops tracks whose full-history positional variance falls below
    /// `threshold`. Only meaningful once the batch is fully ingested;
    /// variance over a partial trajectory is unreliable.
    pub fn prune_stationary(&mut self, threshold: f32) -> Vec<TrackId> {
        let doomed: Vec<TrackId> = self
            .tracks
            .values()
            .filter(|t| t.positional_variance() < threshold)
            .map(|t| t.id)
            .collect();

        for id in &doomed {
            debug!("pruning stationary track {}", id);
            self.tracks.remove(id);
        }

        doomed
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&TrackId, &Track)> {
        self.tracks.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

impl Default for TrackStore {
    fn default() -> Self {
        Self::new()
    }
}
