//! Scalar backend implementation
//!
//! Generic implementations for every element type, no SIMD instructions.

use crate::numeric::Element;
use crate::primitives::ComputePrimitives;

/// Scalar backend - works for all element types
#[derive(Clone, Copy, Debug, Default)]
pub struct ScalarBackend;

impl ScalarBackend {
    pub fn new() -> Self {
        Self
    }
}

impl<E: Element> ComputePrimitives<E> for ScalarBackend {
    fn backend_name(&self) -> &'static str {
        "scalar"
    }

    // All operations use the default implementations from the trait
}
