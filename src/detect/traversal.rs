//! Linear path traversal used to extend bubble flanks.

use ahash::AHashSet;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::core::graph::KmerGraph;
use crate::core::kmer::Kmer;

/// Hard cap on a single extension, as a last-resort guard against
/// degenerate graphs.
const MAX_EXTENSION: usize = 10_000;

/// Flavor of flank extension applied to accepted bubbles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TraversalKind {
    /// No extension at all.
    #[default]
    None,
    /// Extend along maximal non-branching paths.
    Unitig,
    /// Extend through simple internal micro-bubbles, recording where the
    /// first divergence occurred.
    Contig,
}

/// Resettable set of branching nodes a traversal has stopped at. Successive
/// flank extensions of the same bubble share it, so neither walks back into
/// territory the other already claimed.
#[derive(Debug, Default)]
pub struct Terminator {
    marked: AHashSet<u64>,
}

impl Terminator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.marked.clear();
    }

    pub fn mark(&mut self, node: Kmer) {
        self.marked.insert(node.canonical().word());
    }

    pub fn is_marked(&self, node: Kmer) -> bool {
        self.marked.contains(&node.canonical().word())
    }
}

/// Walks a linear extension from a seed node, appending one base per node
/// visited. Each finder owns a private traversal; nothing here is shared
/// across workers.
#[derive(Debug)]
pub struct PathTraversal {
    kind: TraversalKind,
    terminator: Terminator,
    /// (offset in the extension, arm length) of each micro-bubble crossed.
    bubbles: Vec<(usize, usize)>,
}

impl PathTraversal {
    pub fn new(kind: TraversalKind) -> Self {
        Self {
            kind,
            terminator: Terminator::new(),
            bubbles: Vec::new(),
        }
    }

    /// Clear the terminator bitmap. Called once per bubble, before its two
    /// flank extensions.
    pub fn reset(&mut self) {
        self.terminator.reset();
    }

    /// Offset of the first micro-bubble crossed by the last traversal.
    pub fn first_divergence(&self) -> Option<usize> {
        self.bubbles.first().map(|&(offset, _)| offset)
    }

    /// Walk outgoing from `seed`, appending the trailing base of every node
    /// entered. The seed's own bases are not emitted.
    pub fn traverse(&mut self, graph: &KmerGraph, seed: Kmer, out: &mut Vec<u8>) {
        out.clear();
        self.bubbles.clear();
        if self.kind == TraversalKind::None {
            return;
        }
        let k = graph.k();
        let mut visited: AHashSet<u64> = AHashSet::new();
        visited.insert(seed.canonical().word());
        let mut current = seed;

        while out.len() < MAX_EXTENSION {
            let successors = graph.successors(current);
            match successors.len() {
                0 => break,
                1 => {
                    let next = successors[0];
                    // a convergence ends the simple path
                    if graph.indegree(next) != 1 {
                        break;
                    }
                    if self.terminator.is_marked(next) {
                        break;
                    }
                    if !visited.insert(next.canonical().word()) {
                        break;
                    }
                    out.push(next.nt_at(k - 1));
                    current = next;
                }
                _ => {
                    self.terminator.mark(current);
                    if self.kind != TraversalKind::Contig {
                        break;
                    }
                    match self.jump_micro_bubble(graph, &successors, &mut visited, out) {
                        Some(landing) => current = landing,
                        None => break,
                    }
                }
            }
        }
    }

    /// Try to cross a simple two-arm bubble at a fork: both arms must walk
    /// unique successors in lockstep and meet again within k+2 nodes. The
    /// arm starting with the smaller base is spliced into the extension.
    fn jump_micro_bubble(
        &mut self,
        graph: &KmerGraph,
        successors: &[Kmer],
        visited: &mut AHashSet<u64>,
        out: &mut Vec<u8>,
    ) -> Option<Kmer> {
        if successors.len() != 2 {
            return None;
        }
        let limit = graph.k() + 2;
        let mut arm_a = vec![successors[0]];
        let mut arm_b = vec![successors[1]];
        while arm_a.last() != arm_b.last() {
            if arm_a.len() > limit {
                return None;
            }
            let next_a = single_successor(graph, *arm_a.last()?)?;
            let next_b = single_successor(graph, *arm_b.last()?)?;
            arm_a.push(next_a);
            arm_b.push(next_b);
        }
        if arm_a
            .iter()
            .any(|node| visited.contains(&node.canonical().word()))
        {
            return None;
        }
        self.bubbles.push((out.len(), arm_a.len()));
        let k = graph.k();
        for node in &arm_a {
            visited.insert(node.canonical().word());
            out.push(node.nt_at(k - 1));
        }
        arm_a.last().copied()
    }
}

fn single_successor(graph: &KmerGraph, node: Kmer) -> Option<Kmer> {
    let successors = graph.successors(node);
    if successors.len() == 1 {
        Some(successors[0])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::graph::KmerGraphBuilder;

    fn graph_of(seqs: &[&str], k: usize) -> KmerGraph {
        let mut builder = KmerGraphBuilder::new(k, 1).unwrap();
        for seq in seqs {
            builder.add_sequence(seq.as_bytes());
        }
        builder.build()
    }

    fn kmer(s: &str) -> Kmer {
        Kmer::from_bytes(s.as_bytes()).unwrap()
    }

    fn rendered(extension: &[u8]) -> String {
        extension
            .iter()
            .map(|&b| crate::core::kmer::base_char(b))
            .collect()
    }

    #[test]
    fn none_kind_never_extends() {
        let graph = graph_of(&["AAACCGTTGCA"], 5);
        let mut traversal = PathTraversal::new(TraversalKind::None);
        let mut out = vec![1, 2, 3];
        traversal.traverse(&graph, kmer("AAACC"), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn unitig_walks_to_the_end_of_a_linear_path() {
        let graph = graph_of(&["AAACCGTTGCA"], 5);
        let mut traversal = PathTraversal::new(TraversalKind::Unitig);
        let mut out = Vec::new();
        traversal.traverse(&graph, kmer("AAACC"), &mut out);
        // one trailing base per node entered after the seed
        assert_eq!(rendered(&out), "GTTGCA");
        assert_eq!(traversal.first_divergence(), None);
    }

    #[test]
    fn unitig_stops_at_a_fork() {
        // AACCG forks to CCGTA / CCGGA
        let graph = graph_of(&["AAACCGTAC", "AAACCGGAC"], 5);
        let mut traversal = PathTraversal::new(TraversalKind::Unitig);
        let mut out = Vec::new();
        traversal.traverse(&graph, kmer("AAACC"), &mut out);
        assert_eq!(rendered(&out), "G");
    }

    #[test]
    fn terminator_blocks_a_marked_node() {
        let graph = graph_of(&["AAACCGTTGCA"], 5);
        let mut traversal = PathTraversal::new(TraversalKind::Unitig);
        traversal.terminator.mark(kmer("CGTTG"));
        let mut out = Vec::new();
        traversal.traverse(&graph, kmer("AAACC"), &mut out);
        assert_eq!(rendered(&out), "GTT");
        traversal.reset();
        traversal.traverse(&graph, kmer("AAACC"), &mut out);
        assert_eq!(rendered(&out), "GTTGCA");
    }
}
