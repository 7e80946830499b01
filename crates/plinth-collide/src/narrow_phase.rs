//! Batch driver over a [`Dispatcher`].
//!
//! [`NarrowPhase::execute_all`] is the sequential reference path.
//! [`NarrowPhase::execute_parallel`] splits the batch into contiguous
//! chunks, runs each chunk on a scoped worker thread, and concatenates the
//! results, so the output order (and every manifold) matches the
//! sequential path exactly.

use std::panic;
use std::thread;

use plinth_core::ConfigError;

use crate::config::NarrowPhaseConfig;
use crate::dispatch::Dispatcher;
use crate::manifold::LocalManifold;
use crate::pair::PairEntry;

/// Runs the narrow phase over batches of candidate pairs.
#[derive(Debug, Default)]
pub struct NarrowPhase {
    dispatcher: Dispatcher,
    config: NarrowPhaseConfig,
}

impl NarrowPhase {
    /// Standard dispatcher, default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard dispatcher with a validated `config`.
    pub fn with_config(config: NarrowPhaseConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            dispatcher: Dispatcher::new(),
            config,
        })
    }

    /// Custom dispatcher with a validated `config`.
    pub fn with_dispatcher(
        dispatcher: Dispatcher,
        config: NarrowPhaseConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { dispatcher, config })
    }

    /// The dispatcher.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// The active configuration.
    pub fn config(&self) -> &NarrowPhaseConfig {
        &self.config
    }

    /// Process one pair.
    ///
    /// # Panics
    ///
    /// Panics if the pair is already flagged as colliding.
    pub fn execute(&self, pair: &mut PairEntry<'_>) -> LocalManifold {
        self.dispatcher.execute(pair)
    }

    /// Process `pairs` in order on the calling thread.
    pub fn execute_all(&self, pairs: &mut [PairEntry<'_>]) -> Vec<LocalManifold> {
        let manifolds: Vec<_> = pairs.iter_mut().map(|pair| self.execute(pair)).collect();
        log_batch(pairs.len(), 1, &manifolds);
        manifolds
    }

    /// Process `pairs` on up to `workers` scoped threads.
    ///
    /// Each worker owns a contiguous chunk. The returned manifolds are in
    /// input order. A panic on any worker (e.g. a re-entered pair) is
    /// propagated to the caller after every worker has stopped.
    pub fn execute_parallel(
        &self,
        pairs: &mut [PairEntry<'_>],
        workers: usize,
    ) -> Vec<LocalManifold> {
        let workers = workers.clamp(1, NarrowPhaseConfig::MAX_WORKERS);
        if workers == 1 || pairs.len() < 2 {
            return self.execute_all(pairs);
        }

        let total = pairs.len();
        let chunk_size = total.div_ceil(workers);
        let results: Vec<thread::Result<Vec<LocalManifold>>> = thread::scope(|scope| {
            let handles: Vec<_> = pairs
                .chunks_mut(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .iter_mut()
                            .map(|pair| self.execute(pair))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join()).collect()
        });

        let mut manifolds = Vec::with_capacity(total);
        for result in results {
            match result {
                Ok(chunk) => manifolds.extend(chunk),
                Err(payload) => panic::resume_unwind(payload),
            }
        }
        log_batch(total, total.div_ceil(chunk_size), &manifolds);
        manifolds
    }

    /// Process a batch, choosing the worker count from the config.
    pub fn step(&self, pairs: &mut [PairEntry<'_>]) -> Vec<LocalManifold> {
        let workers = self.config.workers_for(pairs.len());
        self.execute_parallel(pairs, workers)
    }
}

fn log_batch(pairs: usize, workers: usize, manifolds: &[LocalManifold]) {
    if log::log_enabled!(log::Level::Trace) {
        let colliding = manifolds.iter().filter(|m| !m.is_empty()).count();
        let points: usize = manifolds.iter().map(LocalManifold::point_count).sum();
        log::trace!(
            "narrow phase: {pairs} pair(s) on {workers} worker(s), {colliding} colliding, {points} contact point(s)"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plinth_core::{Transform, Vec2};
    use plinth_geom::ShapeFactory;

    #[test]
    fn with_config_validates() {
        let bad = NarrowPhaseConfig {
            min_pairs_per_worker: 0,
            ..NarrowPhaseConfig::default()
        };
        assert!(NarrowPhase::with_config(bad).is_err());
        assert!(NarrowPhase::with_config(NarrowPhaseConfig::default()).is_ok());
    }

    #[test]
    fn parallel_matches_sequential_on_a_small_batch() {
        let factory = ShapeFactory::default();
        let ball = factory.circle(Vec2::ZERO, 0.5).unwrap();
        let square = factory.box_shape(0.5, 0.5).unwrap();
        let make = || {
            (0..9)
                .map(|i| {
                    let x = i as f32 * 0.25;
                    let xf_b = Transform::from_position(Vec2::new(x, 0.2));
                    if i % 2 == 0 {
                        PairEntry::new(&square, Transform::IDENTITY, &ball, xf_b)
                    } else {
                        PairEntry::new(&square, Transform::IDENTITY, &square, xf_b)
                    }
                })
                .collect::<Vec<_>>()
        };

        let phase = NarrowPhase::new();
        let mut seq = make();
        let mut par = make();
        let expected = phase.execute_all(&mut seq);
        let actual = phase.execute_parallel(&mut par, 4);
        assert_eq!(expected, actual);
        for (s, p) in seq.iter().zip(&par) {
            assert_eq!(s.is_colliding(), p.is_colliding());
        }
        assert!(expected.iter().any(|m| !m.is_empty()));
        assert!(expected.iter().any(|m| m.is_empty()));
    }

    #[test]
    fn empty_batch() {
        let phase = NarrowPhase::new();
        assert!(phase.step(&mut []).is_empty());
        assert!(phase.execute_parallel(&mut [], 8).is_empty());
    }
}
