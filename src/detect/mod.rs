//! Bubble detection: the paired-path expansion core and its collaborators.

pub mod branching;
pub mod bubble;
pub mod complexity;
pub mod driver;
pub mod extender;
pub mod finder;
pub mod output;
pub mod traversal;

pub use branching::BranchingMode;
pub use bubble::Bubble;
pub use driver::{DetectionSummary, Detector};
pub use traversal::TraversalKind;

use complexity::DEFAULT_COMPLEXITY_THRESHOLD;

/// Knobs shared by every finder clone. The k-mer size itself lives in the
/// graph; everything else about a detection run is here.
#[derive(Debug, Clone)]
pub struct DetectionOptions {
    /// Branching tolerance during expansion.
    pub branching: BranchingMode,
    /// Flank extension flavor.
    pub traversal: TraversalKind,
    /// Low-complexity score cutoff; bubbles scoring at or above it are
    /// labelled "low".
    pub complexity_threshold: f64,
    /// Keep low-complexity bubbles instead of dropping them.
    pub keep_low_complexity: bool,
}

impl Default for DetectionOptions {
    fn default() -> Self {
        Self {
            branching: BranchingMode::Strict,
            traversal: TraversalKind::None,
            complexity_threshold: DEFAULT_COMPLEXITY_THRESHOLD,
            keep_low_complexity: false,
        }
    }
}
