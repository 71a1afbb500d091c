//! Recursive paired-path expansion from seed nodes.

use anyhow::Result;

use crate::core::graph::KmerGraph;
use crate::core::kmer::Kmer;
use crate::detect::bubble::Bubble;
use crate::detect::complexity::score_path_pair;
use crate::detect::driver::SharedState;
use crate::detect::extender::FlankExtender;
use crate::detect::output::build_sequence;
use crate::detect::DetectionOptions;

/// Per-worker search state. Each rayon worker builds its own finder, so the
/// scratch bubble, the extender and its terminator are never shared.
pub struct BubbleFinder<'a> {
    graph: &'a KmerGraph,
    options: &'a DetectionOptions,
    shared: &'a SharedState,
    k: usize,
    bubble: Bubble,
    extender: FlankExtender,
}

impl<'a> BubbleFinder<'a> {
    pub fn new(graph: &'a KmerGraph, options: &'a DetectionOptions, shared: &'a SharedState) -> Self {
        let k = graph.k();
        Self {
            graph,
            options,
            shared,
            k,
            bubble: Bubble::new(k),
            extender: FlankExtender::new(options.traversal),
        }
    }

    /// Seed searches from both orientations of one graph node.
    pub fn process_node(&mut self, node: Kmer) -> Result<()> {
        self.start(node)?;
        self.start(node.rev_comp())
    }

    /// Pair the seed with every present variant at its last position. The
    /// variant base is strictly greater than the seed's, so each unordered
    /// allele pair is tried exactly once.
    fn start(&mut self, node: Kmer) -> Result<()> {
        let mutations = self.graph.mutate(node, self.k - 1, 1);
        self.bubble.begin[0] = node;
        for alternative in mutations {
            self.bubble.begin[1] = alternative;
            self.expand(1, node, alternative, None, None)?;
        }
        Ok(())
    }

    /// Advance both paths one matching base at a time. `pos` counts the
    /// extensions already applied to the seed pair.
    fn expand(
        &mut self,
        pos: usize,
        n1: Kmer,
        n2: Kmer,
        prev1: Option<Kmer>,
        prev2: Option<Kmer>,
    ) -> Result<()> {
        debug_assert!(pos >= 1 && pos <= self.k - 1);

        if !self.options.branching.allows(self.graph, n1, n2) {
            return Ok(());
        }

        for (next1, next2) in self.graph.paired_successors(n1, n2) {
            if !moves_forward(prev1, n1, next1) || !moves_forward(prev2, n2, next2) {
                continue;
            }

            if pos < self.k - 1 {
                self.expand(pos + 1, next1, next2, Some(n1), Some(n2))?;
                // past the first step, strict and paired modes admit only
                // one continuation anyway
                if self.options.branching.first_successor_only() {
                    break;
                }
            } else {
                // a branching terminus invalidates the whole seed
                if !self.options.branching.allows(self.graph, next1, next2) {
                    return Ok(());
                }
                self.bubble.end[0] = next1;
                self.bubble.end[1] = next2;
                if self.check_path()
                    && self.check_low_complexity()
                    && self.extender.extend(self.graph, &mut self.bubble)
                {
                    self.finish()?;
                }
            }
        }
        Ok(())
    }

    /// Mirror rejection: a bubble and its reverse complement are found from
    /// the two seed orientations; keep the one whose rendered first node is
    /// lexicographically smaller than the reverse complement of its last.
    fn check_path(&self) -> bool {
        self.bubble.begin[0].lex_less(&self.bubble.end[0].rev_comp())
    }

    fn check_low_complexity(&mut self) -> bool {
        let path1 = self.render_path(0);
        let path2 = self.render_path(1);
        self.bubble.score = score_path_pair(&path1, &path2);
        self.bubble.score < self.options.complexity_threshold || self.options.keep_low_complexity
    }

    /// The 2k-1 bases of one path: k-1 from the begin node, k from the end
    /// node.
    fn render_path(&self, path_idx: usize) -> String {
        let mut path = String::with_capacity(2 * self.k - 1);
        let begin = self.bubble.begin[path_idx].to_string();
        path.push_str(&begin[..self.k - 1]);
        self.bubble.end[path_idx].write_to(&mut path);
        path
    }

    fn finish(&mut self) -> Result<()> {
        self.bubble.index = self.shared.next_index();
        let seq1 = build_sequence(self.k, self.options, &self.bubble, 0, "higher");
        let seq2 = build_sequence(self.k, self.options, &self.bubble, 1, "lower");
        let high = self.bubble.score < self.options.complexity_threshold;
        self.shared.publish(&self.bubble, high, &seq1, &seq2)
    }
}

/// No-backtrack gate: the next node must differ from both the current and
/// the previous one, compared by canonical key.
fn moves_forward(previous: Option<Kmer>, current: Kmer, next: Kmer) -> bool {
    let key = next.canonical().word();
    key != current.canonical().word() && previous.map_or(true, |p| key != p.canonical().word())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_backtrack_rejects_current_and_previous() {
        let a = Kmer::from_bytes(b"AAACC").unwrap();
        let b = Kmer::from_bytes(b"AACCG").unwrap();
        let c = Kmer::from_bytes(b"ACCGT").unwrap();
        assert!(moves_forward(Some(a), b, c));
        assert!(!moves_forward(Some(a), b, b));
        assert!(!moves_forward(Some(a), b, a));
        // the previous node in the other orientation is still the same key
        assert!(!moves_forward(Some(a), b, a.rev_comp()));
        assert!(moves_forward(None, b, c));
    }
}
