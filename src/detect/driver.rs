//! Parallel sweep of the graph and shared run state.

use anyhow::Result;
use parking_lot::Mutex;
use rayon::prelude::*;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

use crate::core::graph::KmerGraph;
use crate::core::kmer::Kmer;
use crate::detect::bubble::Bubble;
use crate::detect::finder::BubbleFinder;
use crate::detect::DetectionOptions;
use crate::utils::sequence_io::{SequenceRecord, SequenceSink};

/// Final counters of a detection run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DetectionSummary {
    /// Total accepted bubbles; indices cover `1..=nb_bubbles`.
    pub nb_bubbles: u64,
    pub nb_bubbles_high: u64,
    pub nb_bubbles_low: u64,
    /// Counts per extension category: none, left only, right only, both.
    pub nb_where_to_extend: [u64; 4],
    /// Graph nodes visited by the sweep.
    pub nodes_visited: usize,
    pub elapsed_seconds: f64,
}

/// State shared by every finder clone: the monotone bubble counter and the
/// mutex-guarded output side. Counters other than the index are updated
/// under the writer mutex, alongside the insertions they describe.
pub struct SharedState {
    counter: AtomicU64,
    output: Mutex<OutputState>,
}

struct OutputState {
    sink: Box<dyn SequenceSink + Send>,
    nb_high: u64,
    nb_low: u64,
    nb_where_to_extend: [u64; 4],
}

impl SharedState {
    fn new(sink: Box<dyn SequenceSink + Send>) -> Self {
        Self {
            counter: AtomicU64::new(0),
            output: Mutex::new(OutputState {
                sink,
                nb_high: 0,
                nb_low: 0,
                nb_where_to_extend: [0; 4],
            }),
        }
    }

    /// Claim the next 1-based bubble index.
    pub(crate) fn next_index(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Insert both records of one bubble and update the category counters.
    /// The mutex is held across both insertions so the pair is never
    /// interleaved with another bubble's records.
    pub(crate) fn publish(
        &self,
        bubble: &Bubble,
        high: bool,
        seq1: &SequenceRecord,
        seq2: &SequenceRecord,
    ) -> Result<()> {
        let mut output = self.output.lock();
        output.sink.insert(seq1)?;
        output.sink.insert(seq2)?;
        output.nb_where_to_extend[(bubble.where_to_extend & 3) as usize] += 1;
        if high {
            output.nb_high += 1;
        } else {
            output.nb_low += 1;
        }
        Ok(())
    }
}

/// Dispatches one finder per worker across all graph nodes.
pub struct Detector<'g> {
    graph: &'g KmerGraph,
    options: DetectionOptions,
    threads: usize,
}

impl<'g> Detector<'g> {
    pub fn new(graph: &'g KmerGraph, options: DetectionOptions, threads: usize) -> Self {
        Self {
            graph,
            options,
            threads: threads.max(1),
        }
    }

    /// Visit every graph node exactly once; both orientations are handled
    /// inside the finder. Returns the run counters; the sink receives two
    /// records per accepted bubble.
    pub fn run(&self, sink: Box<dyn SequenceSink + Send>) -> Result<DetectionSummary> {
        let started = Instant::now();
        let shared = SharedState::new(sink);
        let nodes: Vec<Kmer> = self.graph.nodes().collect();
        info!(
            "sweeping {} graph nodes with {} worker(s)",
            nodes.len(),
            self.threads
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .thread_name(|i| format!("bubble-{i}"))
            .build()?;
        pool.install(|| {
            nodes.par_iter().try_for_each_init(
                || BubbleFinder::new(self.graph, &self.options, &shared),
                |finder, &node| finder.process_node(node),
            )
        })?;

        let nb_bubbles = shared.counter.load(Ordering::Relaxed);
        let output = shared.output.into_inner();
        let OutputState {
            mut sink,
            nb_high,
            nb_low,
            nb_where_to_extend,
        } = output;
        sink.finish()?;

        let elapsed = started.elapsed();
        info!("found {} bubble(s) in {:.2?}", nb_bubbles, elapsed);
        Ok(DetectionSummary {
            nb_bubbles,
            nb_bubbles_high: nb_high,
            nb_bubbles_low: nb_low,
            nb_where_to_extend,
            nodes_visited: nodes.len(),
            elapsed_seconds: elapsed.as_secs_f64(),
        })
    }
}
