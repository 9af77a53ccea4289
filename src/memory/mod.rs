//! Heap buffers aligned on a 128-byte boundary.
//!
//! Alignment only affects load/store speed of the kernels in
//! [`crate::numerics`], never their results. A buffer is released by dropping
//! it like any other owned value.

mod aligned_buffer;

pub use aligned_buffer::*;
