pub mod graph;
pub mod kmer;

// Re-export the types the rest of the crate keeps reaching for
pub use graph::{KmerGraph, KmerGraphBuilder};
pub use kmer::Kmer;
