//! Flank extension of accepted bubbles.

use crate::core::graph::KmerGraph;
use crate::detect::bubble::Bubble;
use crate::detect::traversal::{PathTraversal, TraversalKind};

/// Populates a bubble's closures, extensions and `where_to_extend` code.
/// Path 0 is the extension reference; path 1 shares the same flanks by
/// construction. Owned privately by each finder.
#[derive(Debug)]
pub struct FlankExtender {
    kind: TraversalKind,
    traversal: PathTraversal,
}

impl FlankExtender {
    pub fn new(kind: TraversalKind) -> Self {
        Self {
            kind,
            traversal: PathTraversal::new(kind),
        }
    }

    /// Always succeeds; a side without neighbors simply gets no closure and
    /// an empty extension.
    pub fn extend(&mut self, graph: &KmerGraph, bubble: &mut Bubble) -> bool {
        bubble.reset_flanks();
        if self.kind == TraversalKind::None {
            return true;
        }
        let k = graph.k();
        let predecessors = graph.predecessors(bubble.begin[0]);
        let successors = graph.successors(bubble.end[0]);

        // a unique neighbor closes the bubble with one more confirmed base
        if predecessors.len() == 1 {
            bubble.closure_left = Some(predecessors[0].nt_at(0));
        }
        if successors.len() == 1 {
            bubble.closure_right = Some(successors[0].nt_at(k - 1));
        }

        // successive flank extensions may overlap on shared branching
        // nodes, so the bitmap starts fresh for each bubble
        self.traversal.reset();

        if let Some(&start) = successors.first() {
            self.traversal
                .traverse(graph, start, &mut bubble.extension_right);
            bubble.divergence_right = self
                .traversal
                .first_divergence()
                .unwrap_or(bubble.extension_right.len());
        }
        if let Some(&start) = predecessors.first() {
            self.traversal
                .traverse(graph, start.rev_comp(), &mut bubble.extension_left);
            bubble.divergence_left = self
                .traversal
                .first_divergence()
                .unwrap_or(bubble.extension_left.len());
        }

        bubble.where_to_extend =
            bubble.closure_left.is_some() as u8 | ((bubble.closure_right.is_some() as u8) << 1);
        true
    }
}
