//! Configuration errors shared across the workspace.
//!
//! Each configurable subsystem (arena, free list, narrow phase) validates
//! its config struct at construction and reports violations through
//! [`ConfigError`].

use std::error::Error;
use std::fmt;

/// A configuration value failed validation.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// A capacity or size parameter was zero.
    ZeroCapacity {
        /// Name of the offending parameter.
        parameter: &'static str,
    },
    /// Capacity bounds are not ordered `min <= initial <= max`.
    CapacityOrdering {
        /// Configured minimum.
        min: usize,
        /// Configured initial value.
        initial: usize,
        /// Configured maximum.
        max: usize,
    },
    /// A ratio or factor lies outside its allowed range.
    OutOfRange {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// The rejected value.
        value: f64,
        /// Human-readable description of the valid range.
        expected: &'static str,
    },
    /// A cycle count (streak length) was zero.
    ZeroCycles {
        /// Name of the offending parameter.
        parameter: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroCapacity { parameter } => write!(f, "{parameter} must be greater than zero"),
            Self::CapacityOrdering { min, initial, max } => write!(
                f,
                "capacity bounds must satisfy min <= initial <= max, got {min} / {initial} / {max}"
            ),
            Self::OutOfRange {
                parameter,
                value,
                expected,
            } => write!(f, "{parameter} = {value} is out of range, expected {expected}"),
            Self::ZeroCycles { parameter } => write!(f, "{parameter} must be at least one cycle"),
        }
    }
}

impl Error for ConfigError {}
