//! # SNP-Forge - SNP/Bubble Detection Engine
//!
//! A parallel SNP and small-variant bubble detector built in Rust. Builds a
//! de Bruijn graph from sequencing reads and enumerates isolated bubbles -
//! pairs of equal-length alternative paths that diverge at one locus and
//! reconverge - emitting each as a "higher"/"lower" allele sequence pair.

pub mod core;
pub mod detect;
pub mod utils;

// Re-export commonly used types at crate level
pub use crate::core::graph::{KmerGraph, KmerGraphBuilder};
pub use crate::core::kmer::Kmer;
pub use crate::detect::driver::{DetectionSummary, Detector};
pub use crate::detect::DetectionOptions;
pub use crate::utils::configuration::ToolConfiguration;

/// Result type used throughout the crate
pub type Result<T> = anyhow::Result<T>;

/// Error type used throughout the crate
pub type Error = anyhow::Error;
