//! Branching tolerance policy for the paired walk.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::core::graph::KmerGraph;
use crate::core::kmer::Kmer;

/// How much graph branching the expansion tolerates along a path pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BranchingMode {
    /// Reject as soon as either path sits on a branching node.
    #[default]
    Strict,
    /// Reject only when both paths expose two or more paired extensions at
    /// once, in either direction.
    Paired,
    /// Never reject.
    Any,
}

impl BranchingMode {
    /// May the walk continue through `(n1, n2)`? Evaluated at every
    /// recursion step and once more on the terminal pair.
    pub fn allows(self, graph: &KmerGraph, n1: Kmer, n2: Kmer) -> bool {
        match self {
            BranchingMode::Strict => {
                !(is_branching(graph, n1) || is_branching(graph, n2))
            }
            BranchingMode::Paired => !both_paths_branch(graph, n1, n2),
            BranchingMode::Any => true,
        }
    }

    /// In strict and paired modes only the first successor pair is explored
    /// at internal positions: any alternative continuation would itself
    /// form a branching the gate rejects.
    pub fn first_successor_only(self) -> bool {
        !matches!(self, BranchingMode::Any)
    }
}

fn is_branching(graph: &KmerGraph, node: Kmer) -> bool {
    graph.indegree(node) >= 2 || graph.outdegree(node) >= 2
}

fn both_paths_branch(graph: &KmerGraph, n1: Kmer, n2: Kmer) -> bool {
    graph.paired_extension_count(n1, n2) >= 2
        || graph.paired_extension_count(n1.rev_comp(), n2.rev_comp()) >= 2
}
