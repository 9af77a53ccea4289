//! Run statistics for kernel benchmark and verification jobs.
//!
//! This module provides a small accumulator for the number of kernel calls,
//! elements processed, time spent and the worst deviation from the scalar
//! reference observed over a job.

mod stats;
pub use stats::*;
