//! Vectorized elementwise and reduction kernels over contiguous float slices.
//!
//! Every kernel sweeps its input with the widest register available for the
//! precision (256 bits), continues with the next narrower one (128 bits) and
//! finishes the tail one element at a time. Loads and stores are unaligned,
//! so any slice works; [`crate::memory::AlignedBuffer`] only helps speed.

mod elementwise;
mod lanes;
mod reduction;
mod slice_ops;

pub use elementwise::{Add, BinaryOp, Mul, add, add_assign, apply, apply_in_place, mul, mul_assign};
pub use lanes::{Element, Register, tier_widths};
pub use reduction::sum;
pub use slice_ops::VectorLike;
