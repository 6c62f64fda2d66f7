//! Benchmark modules

pub mod flush;
pub mod mark;
pub mod selector;
