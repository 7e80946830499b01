//! Allocator configuration parameters.

use plinth_core::ConfigError;

/// Configuration for [`ArenaAllocator`](crate::ArenaAllocator).
///
/// Controls the reserved extent and the grow/shrink policy evaluated at
/// every [`reset`](crate::ArenaAllocator::reset). Validated at
/// construction; immutable afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct ArenaConfig {
    /// Bytes reserved from the primary allocator at construction.
    ///
    /// Default: 5 MiB.
    pub initial_capacity: usize,

    /// Lower bound for shrinking. Default: 64 KiB.
    pub min_capacity: usize,

    /// Upper bound for growing. Default: 256 MiB.
    pub max_capacity: usize,

    /// Multiplier applied to the capacity when growing. Must be > 1.
    ///
    /// Default: 2.0. The new capacity is also at least the peak demand of
    /// the cycle that triggered the grow (in-arena bytes plus overflow).
    pub growth_factor: f64,

    /// Peak utilization below which a reset cycle counts as "low use".
    /// Must lie in `(0, 1)`. Default: 0.25.
    pub shrink_threshold: f64,

    /// Consecutive low-use cycles before the extent is halved.
    ///
    /// Default: 120 (two seconds of steps at 60 Hz).
    pub shrink_after_cycles: u32,

    /// Consecutive cycles with at least one overflow redirection before
    /// the extent grows. Default: 2.
    pub grow_after_overflows: u32,
}

impl ArenaConfig {
    /// Default initial reservation: 5 MiB.
    pub const DEFAULT_INITIAL_CAPACITY: usize = 5 * 1024 * 1024;

    /// Default shrink floor: 64 KiB.
    pub const DEFAULT_MIN_CAPACITY: usize = 64 * 1024;

    /// Default grow ceiling: 256 MiB.
    pub const DEFAULT_MAX_CAPACITY: usize = 256 * 1024 * 1024;

    /// Default growth multiplier.
    pub const DEFAULT_GROWTH_FACTOR: f64 = 2.0;

    /// Default low-use threshold.
    pub const DEFAULT_SHRINK_THRESHOLD: f64 = 0.25;

    /// Default low-use streak length.
    pub const DEFAULT_SHRINK_AFTER_CYCLES: u32 = 120;

    /// Default overflow streak length.
    pub const DEFAULT_GROW_AFTER_OVERFLOWS: u32 = 2;

    /// Defaults with a custom initial reservation.
    ///
    /// The shrink floor is lowered to `initial_capacity` when the
    /// reservation is smaller than the default floor, so small arenas stay
    /// valid.
    pub fn with_capacity(initial_capacity: usize) -> Self {
        Self {
            initial_capacity,
            min_capacity: Self::DEFAULT_MIN_CAPACITY.min(initial_capacity),
            max_capacity: Self::DEFAULT_MAX_CAPACITY.max(initial_capacity),
            ..Self::default()
        }
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_capacity == 0 {
            return Err(ConfigError::ZeroCapacity {
                parameter: "initial_capacity",
            });
        }
        if self.min_capacity == 0 {
            return Err(ConfigError::ZeroCapacity {
                parameter: "min_capacity",
            });
        }
        if !(self.min_capacity <= self.initial_capacity
            && self.initial_capacity <= self.max_capacity)
        {
            return Err(ConfigError::CapacityOrdering {
                min: self.min_capacity,
                initial: self.initial_capacity,
                max: self.max_capacity,
            });
        }
        if !self.growth_factor.is_finite() || self.growth_factor <= 1.0 {
            return Err(ConfigError::OutOfRange {
                parameter: "growth_factor",
                value: self.growth_factor,
                expected: "finite and > 1",
            });
        }
        if !(self.shrink_threshold > 0.0 && self.shrink_threshold < 1.0) {
            return Err(ConfigError::OutOfRange {
                parameter: "shrink_threshold",
                value: self.shrink_threshold,
                expected: "in (0, 1)",
            });
        }
        if self.shrink_after_cycles == 0 {
            return Err(ConfigError::ZeroCycles {
                parameter: "shrink_after_cycles",
            });
        }
        if self.grow_after_overflows == 0 {
            return Err(ConfigError::ZeroCycles {
                parameter: "grow_after_overflows",
            });
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            initial_capacity: Self::DEFAULT_INITIAL_CAPACITY,
            min_capacity: Self::DEFAULT_MIN_CAPACITY,
            max_capacity: Self::DEFAULT_MAX_CAPACITY,
            growth_factor: Self::DEFAULT_GROWTH_FACTOR,
            shrink_threshold: Self::DEFAULT_SHRINK_THRESHOLD,
            shrink_after_cycles: Self::DEFAULT_SHRINK_AFTER_CYCLES,
            grow_after_overflows: Self::DEFAULT_GROW_AFTER_OVERFLOWS,
        }
    }
}

/// Configuration for [`FreeListAllocator`](crate::FreeListAllocator).
#[derive(Clone, Debug, PartialEq)]
pub struct FreeListConfig {
    /// Bytes requested from the primary per extent (header included).
    /// Requests that do not fit get a dedicated, larger extent.
    ///
    /// Default: 64 KiB.
    pub extent_size: usize,
}

impl FreeListConfig {
    /// Default extent size: 64 KiB.
    pub const DEFAULT_EXTENT_SIZE: usize = 64 * 1024;

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.extent_size == 0 {
            return Err(ConfigError::ZeroCapacity {
                parameter: "extent_size",
            });
        }
        Ok(())
    }
}

impl Default for FreeListConfig {
    fn default() -> Self {
        Self {
            extent_size: Self::DEFAULT_EXTENT_SIZE,
        }
    }
}
