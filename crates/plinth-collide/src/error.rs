//! Error types for dispatch construction.

use std::error::Error;
use std::fmt;

use plinth_core::ShapeType;

use crate::algorithm::AlgorithmId;

/// A dispatch table could not be turned into a dispatcher.
#[derive(Clone, Debug, PartialEq)]
pub enum DispatchError {
    /// No algorithm is registered for this shape-type pair.
    Unregistered {
        /// Row type.
        a: ShapeType,
        /// Column type.
        b: ShapeType,
    },
    /// The registered algorithm cannot handle this shape-type pair.
    Incompatible {
        /// Row type.
        a: ShapeType,
        /// Column type.
        b: ShapeType,
        /// The algorithm registered for the pair.
        id: AlgorithmId,
    },
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unregistered { a, b } => {
                write!(f, "no collision algorithm registered for {a} vs {b}")
            }
            Self::Incompatible { a, b, id } => {
                write!(f, "{id} cannot collide {a} vs {b}")
            }
        }
    }
}

impl Error for DispatchError {}
