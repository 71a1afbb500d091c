//! De Bruijn graph over canonical k-mers.
//!
//! The graph is a membership index: a k-mer set (with abundances) where
//! adjacency is answered arithmetically by probing the four possible
//! single-base extensions of an oriented word. Nodes are stored once, in
//! canonical orientation; every adapter operation accepts and returns
//! oriented k-mers.

use ahash::AHashMap;
use anyhow::{anyhow, Result};
use rayon::prelude::*;
use tracing::debug;

use crate::core::kmer::{Kmer, MAX_K};

/// Accumulates canonical k-mer counts from reads, then freezes them into an
/// immutable [`KmerGraph`] after abundance filtering.
pub struct KmerGraphBuilder {
    k: usize,
    min_coverage: u32,
    counts: AHashMap<u64, u32>,
}

impl KmerGraphBuilder {
    pub fn new(k: usize, min_coverage: u32) -> Result<Self> {
        if k < 3 || k > MAX_K {
            return Err(anyhow!("k-mer size must be in 3..={}, got {}", MAX_K, k));
        }
        Ok(Self {
            k,
            min_coverage: min_coverage.max(1),
            counts: AHashMap::new(),
        })
    }

    /// Count every canonical k-mer of one sequence. Windows containing
    /// non-ACGT characters are skipped.
    pub fn add_sequence(&mut self, seq: &[u8]) {
        if seq.len() < self.k {
            return;
        }
        for window in seq.windows(self.k) {
            if let Ok(kmer) = Kmer::from_bytes(window) {
                *self.counts.entry(kmer.canonical().word()).or_insert(0) += 1;
            }
        }
    }

    /// Count k-mers of a batch of reads in parallel, merging per-chunk maps.
    pub fn add_reads(&mut self, reads: &[Vec<u8>]) {
        let k = self.k;
        let partials: Vec<AHashMap<u64, u32>> = reads
            .par_chunks(1_000)
            .map(|chunk| {
                let mut local: AHashMap<u64, u32> = AHashMap::new();
                for seq in chunk {
                    if seq.len() < k {
                        continue;
                    }
                    for window in seq.windows(k) {
                        if let Ok(kmer) = Kmer::from_bytes(window) {
                            *local.entry(kmer.canonical().word()).or_insert(0) += 1;
                        }
                    }
                }
                local
            })
            .collect();

        for local in partials {
            for (word, count) in local {
                *self.counts.entry(word).or_insert(0) += count;
            }
        }
    }

    /// Apply the abundance filter and freeze the index.
    pub fn build(self) -> KmerGraph {
        let total = self.counts.len();
        let min_coverage = self.min_coverage;
        let nodes: AHashMap<u64, u32> = self
            .counts
            .into_iter()
            .filter(|&(_, count)| count >= min_coverage)
            .collect();
        debug!(
            "k-mer index: {} distinct, {} kept at min coverage {}",
            total,
            nodes.len(),
            min_coverage
        );
        KmerGraph { k: self.k, nodes }
    }
}

/// Immutable canonical k-mer index exposing the adapter operations the
/// bubble finder consumes. Shared read-only across workers.
pub struct KmerGraph {
    k: usize,
    nodes: AHashMap<u64, u32>,
}

impl KmerGraph {
    /// Build a graph in one shot from owned read sequences.
    pub fn from_reads(reads: &[Vec<u8>], k: usize, min_coverage: u32) -> Result<Self> {
        let mut builder = KmerGraphBuilder::new(k, min_coverage)?;
        builder.add_reads(reads);
        Ok(builder.build())
    }

    #[inline]
    pub fn k(&self) -> usize {
        self.k
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Membership, orientation-insensitive.
    #[inline]
    pub fn contains(&self, kmer: Kmer) -> bool {
        self.nodes.contains_key(&kmer.canonical().word())
    }

    /// Abundance of a node, if present.
    pub fn coverage(&self, kmer: Kmer) -> Option<u32> {
        self.nodes.get(&kmer.canonical().word()).copied()
    }

    /// Every node once, in canonical orientation.
    pub fn nodes(&self) -> impl Iterator<Item = Kmer> + '_ {
        let k = self.k;
        self.nodes.keys().map(move |&word| Kmer::from_word(word, k))
    }

    /// Oriented successors of `node`, in A,C,G,T order of the extending
    /// base. The order is part of the contract: the finder and the tests
    /// rely on it being stable.
    pub fn successors(&self, node: Kmer) -> Vec<Kmer> {
        let mut out = Vec::with_capacity(4);
        for base in 0..4u8 {
            let next = node.extend_right(base);
            if self.contains(next) {
                out.push(next);
            }
        }
        out
    }

    /// Oriented predecessors of `node`, in A,C,G,T order of the prepended
    /// base.
    pub fn predecessors(&self, node: Kmer) -> Vec<Kmer> {
        let mut out = Vec::with_capacity(4);
        for base in 0..4u8 {
            let prev = node.extend_left(base);
            if self.contains(prev) {
                out.push(prev);
            }
        }
        out
    }

    pub fn outdegree(&self, node: Kmer) -> usize {
        (0..4u8)
            .filter(|&base| self.contains(node.extend_right(base)))
            .count()
    }

    pub fn indegree(&self, node: Kmer) -> usize {
        (0..4u8)
            .filter(|&base| self.contains(node.extend_left(base)))
            .count()
    }

    /// All present variants of `node` at position `pos` whose replacement
    /// base code is at least `nt_at(pos) + min_offset`. Called with
    /// `pos = k-1, min_offset = 1` this enumerates each unordered allele
    /// pair exactly once.
    pub fn mutate(&self, node: Kmer, pos: usize, min_offset: u8) -> Vec<Kmer> {
        let current = node.nt_at(pos);
        let mut out = Vec::new();
        for base in current.saturating_add(min_offset)..4 {
            let candidate = node.with_nt(pos, base);
            if self.contains(candidate) {
                out.push(candidate);
            }
        }
        out
    }

    /// Successor pairs of `(n1, n2)` sharing the extending base, in A,C,G,T
    /// order.
    pub fn paired_successors(&self, n1: Kmer, n2: Kmer) -> Vec<(Kmer, Kmer)> {
        let mut out = Vec::with_capacity(4);
        for base in 0..4u8 {
            let s1 = n1.extend_right(base);
            let s2 = n2.extend_right(base);
            if self.contains(s1) && self.contains(s2) {
                out.push((s1, s2));
            }
        }
        out
    }

    /// Number of shared-base successor pairs, without materializing them.
    pub fn paired_extension_count(&self, n1: Kmer, n2: Kmer) -> usize {
        (0..4u8)
            .filter(|&base| {
                self.contains(n1.extend_right(base)) && self.contains(n2.extend_right(base))
            })
            .count()
    }
}
