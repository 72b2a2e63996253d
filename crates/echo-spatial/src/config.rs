// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use serde::{Deserialize, Serialize};

use crate::error::SpatialError;
use crate::exec::NUM_SHARDS;

/// Tuning knobs for [`crate::SpatialEventSystem`].
///
/// Missing JSON fields fall back to [`SpatialConfig::default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialConfig {
    /// Worker threads per scan phase. Capped at [`NUM_SHARDS`].
    pub workers: usize,
    /// Scans with fewer moved objects than this run on the caller thread.
    pub min_parallel_items: usize,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        let workers = std::thread::available_parallelism()
            .map_or(1, std::num::NonZeroUsize::get)
            .min(NUM_SHARDS);
        Self {
            workers,
            min_parallel_items: 64,
        }
    }
}

impl SpatialConfig {
    /// Single-threaded preset.
    #[must_use]
    pub fn serial() -> Self {
        Self {
            workers: 1,
            min_parallel_items: usize::MAX,
        }
    }

    /// Parses and validates a JSON config blob.
    pub fn from_json(bytes: &[u8]) -> Result<Self, SpatialError> {
        let config: Self = serde_json::from_slice(bytes)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks invariants (`workers >= 1`).
    pub fn validate(&self) -> Result<(), SpatialError> {
        if self.workers == 0 {
            return Err(SpatialError::InvalidConfig(
                "workers must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Whether a scan over `items` moved objects should fan out.
    #[must_use]
    pub fn parallel_for(&self, items: usize) -> bool {
        self.workers > 1 && items >= self.min_parallel_items
    }
}
