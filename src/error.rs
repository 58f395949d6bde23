use thiserror::Error;

use crate::track::TrackId;

#[derive(Debug, Error)]
pub enum Error {
    #[error("track {id}: {got} samples, cubic interpolation needs at least {need}")]
    InsufficientSamples {
        id: TrackId,
        got: usize,
        need: usize,
    },

    #[error("out-of-order frame {got}, expected index >= {expected}")]
    OutOfOrderFrame { got: usize, expected: usize },

    #[error("unknown track {0}")]
    UnknownTrack(TrackId),
}
