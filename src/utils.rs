//! Generic helpers the evolutionary process is built on.

pub mod permute;
pub mod random;
pub mod sort;
