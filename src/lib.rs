//! Rust library for evolving arbitrary specimens through mating, mutation and natural selection.

pub mod activation;
pub mod evolution;
pub mod simple_network;
pub mod utils;
