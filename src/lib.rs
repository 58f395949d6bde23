pub mod accident;
pub mod batch;
pub mod config;
pub mod detection;
pub mod error;
pub mod frame;
pub mod math;
pub mod signal;
pub mod store;
pub mod track;
pub mod tracker;

pub use accident::{AccidentCandidate, AccidentDetector, Evidence, Scores};
pub use batch::{Batch, BatchAnalysis, BatchOutcome, Exclusion};
pub use config::Config;
pub use detection::Detection;
pub use error::Error;
pub use frame::Frame;
pub use signal::{DenseSeries, SignalProcessor};
pub use store::TrackStore;
pub use track::{Track, TrackId};
pub use tracker::Associator;

use std::collections::HashMap;

/// Front door of the pipeline: one batch per source label (video, folder,
/// camera). Batches are fully independent; a batch that ends inconclusive
/// leaves every other source untouched.
pub struct AccidentMonitor {
    config: Config,
    batches: HashMap<String, Batch>,
}

impl AccidentMonitor {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            batches: HashMap::new(),
        }
    }

    /// Ingests frames for `src`, creating its batch on first sight.
    pub fn update(&mut self, frames: &[Frame], src: &str) -> Result<(), Error> {
        let batch = self
            .batches
            .entry(src.to_string())
            .or_insert_with(|| Batch::new(&self.config));

        for frame in frames {
            batch.push_frame(frame)?;
        }

        Ok(())
    }

    /// Finalizes and consumes the batch for `src`. `None` when no frames
    /// were ever ingested for that source.
    pub fn analyze(&mut self, src: &str) -> Option<BatchOutcome> {
        self.batches.remove(src).map(Batch::analyze)
    }

    #[inline]
    pub fn batch(&self, src: &str) -> Option<&Batch> {
        self.batches.get(src)
    }
}

impl Default for AccidentMonitor {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
