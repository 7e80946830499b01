//! Narrow-phase configuration.

use plinth_core::ConfigError;

/// Controls how [`NarrowPhase::step`](crate::NarrowPhase::step) splits a
/// batch across worker threads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NarrowPhaseConfig {
    /// Worker threads for parallel batches. `None` = auto-detect
    /// (`available_parallelism`, clamped to `[1, 16]`).
    pub worker_count: Option<usize>,
    /// Batches smaller than `2 * min_pairs_per_worker` run sequentially,
    /// and no worker is given fewer pairs than this.
    pub min_pairs_per_worker: usize,
}

impl NarrowPhaseConfig {
    /// Default minimum pairs per worker.
    pub const DEFAULT_MIN_PAIRS_PER_WORKER: usize = 64;
    /// Upper bound applied to explicit worker counts.
    pub const MAX_WORKERS: usize = 64;

    /// Check that every field is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_pairs_per_worker == 0 {
            return Err(ConfigError::ZeroCapacity {
                parameter: "min_pairs_per_worker",
            });
        }
        Ok(())
    }

    /// Resolve the worker count, applying auto-detection if `None`.
    ///
    /// Explicit values are clamped to `[1, MAX_WORKERS]`.
    pub fn resolved_worker_count(&self) -> usize {
        match self.worker_count {
            Some(n) => n.clamp(1, Self::MAX_WORKERS),
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
                .clamp(1, 16),
        }
    }

    /// Workers to use for a batch of `pairs`: at most the resolved count,
    /// and few enough that each gets `min_pairs_per_worker` pairs.
    pub fn workers_for(&self, pairs: usize) -> usize {
        let by_size = pairs / self.min_pairs_per_worker.max(1);
        self.resolved_worker_count().min(by_size).max(1)
    }
}

impl Default for NarrowPhaseConfig {
    fn default() -> Self {
        Self {
            worker_count: None,
            min_pairs_per_worker: Self::DEFAULT_MIN_PAIRS_PER_WORKER,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_worker_count_clamps_zero() {
        let cfg = NarrowPhaseConfig {
            worker_count: Some(0),
            ..NarrowPhaseConfig::default()
        };
        assert_eq!(cfg.resolved_worker_count(), 1);
    }

    #[test]
    fn resolved_worker_count_clamps_large() {
        let cfg = NarrowPhaseConfig {
            worker_count: Some(500),
            ..NarrowPhaseConfig::default()
        };
        assert_eq!(cfg.resolved_worker_count(), NarrowPhaseConfig::MAX_WORKERS);
    }

    #[test]
    fn resolved_worker_count_auto() {
        let count = NarrowPhaseConfig::default().resolved_worker_count();
        assert!((1..=16).contains(&count), "auto count {count} out of [1,16]");
    }

    #[test]
    fn small_batches_use_one_worker() {
        let cfg = NarrowPhaseConfig {
            worker_count: Some(8),
            min_pairs_per_worker: 10,
        };
        assert_eq!(cfg.workers_for(5), 1);
        assert_eq!(cfg.workers_for(35), 3);
        assert_eq!(cfg.workers_for(10_000), 8);
    }

    #[test]
    fn rejects_zero_min_pairs() {
        let cfg = NarrowPhaseConfig {
            min_pairs_per_worker: 0,
            ..NarrowPhaseConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::ZeroCapacity {
                parameter: "min_pairs_per_worker"
            })
        );
    }
}
