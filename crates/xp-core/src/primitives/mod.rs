//! Host computational primitives with compile-time dispatch
//!
//! - Single `ComputePrimitives<E>` trait for all host operations
//! - Concrete backend types: `ScalarBackend`, `Avx2Backend`
//! - Compile-time backend selection with runtime validation

pub mod backends;
pub mod traits;

pub use backends::{Avx2Backend, ScalarBackend};
pub use traits::{BinaryOp, ComputePrimitives};
