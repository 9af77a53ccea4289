//! Loading kernel inputs from disk.
//!
//! Arrays are read from NumPy `.npy` files straight into aligned buffers.

mod npy_load;

pub use npy_load::*;
