#![feature(portable_simd)]
#![feature(coverage_attribute)]

pub mod fs;
pub mod memory;
pub mod numerics;
pub mod statistics;
pub mod verify;
