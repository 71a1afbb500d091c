//! Candidate bubble record.

use crate::core::kmer::Kmer;

/// Two parallel k-node paths plus the flank information filled in by the
/// extender. One record lives inside each worker's finder and is reused
/// across seeds; it becomes observable only when `finish` hands its two
/// formatted sequences to the output bank.
#[derive(Debug, Clone)]
pub struct Bubble {
    /// First node of each path. `begin[1]` always carries the strictly
    /// greater base at position k-1, per the mutation rule.
    pub begin: [Kmer; 2],
    /// Last node of each path, k-1 single-base extensions from `begin`.
    pub end: [Kmer; 2],
    /// Left flank bases as walked by the traversal, i.e. in
    /// reverse-complement orientation; formatting flips them back.
    pub extension_left: Vec<u8>,
    /// Right flank bases, forward orientation.
    pub extension_right: Vec<u8>,
    /// Base closing the bubble on the left when the begin node has exactly
    /// one predecessor.
    pub closure_left: Option<u8>,
    /// Base closing the bubble on the right when the end node has exactly
    /// one successor.
    pub closure_right: Option<u8>,
    /// Offset in the left extension where the traversal first crossed an
    /// internal micro-bubble; equals the extension length when it never
    /// did. Only meaningful for contig extension.
    pub divergence_left: usize,
    pub divergence_right: usize,
    /// Bit 0: left closure present; bit 1: right closure present.
    pub where_to_extend: u8,
    /// Low-complexity score of the path pair; higher = more repetitive.
    pub score: f64,
    /// Unique 1-based index, assigned at finish time.
    pub index: u64,
}

impl Bubble {
    pub fn new(k: usize) -> Self {
        let blank = Kmer::from_word(0, k);
        Self {
            begin: [blank; 2],
            end: [blank; 2],
            extension_left: Vec::new(),
            extension_right: Vec::new(),
            closure_left: None,
            closure_right: None,
            divergence_left: 0,
            divergence_right: 0,
            where_to_extend: 0,
            score: 0.0,
            index: 0,
        }
    }

    /// Clear flank state before the extender repopulates it for a new
    /// accepted path pair.
    pub fn reset_flanks(&mut self) {
        self.extension_left.clear();
        self.extension_right.clear();
        self.closure_left = None;
        self.closure_right = None;
        self.divergence_left = 0;
        self.divergence_right = 0;
        self.where_to_extend = 0;
    }
}
