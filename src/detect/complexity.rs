//! Low-complexity scoring of a bubble's path pair.

use crate::core::kmer::encode_base;

/// Default score cutoff: bubbles at or above it are labelled "low".
pub const DEFAULT_COMPLEXITY_THRESHOLD: f64 = 60.0;

/// Score a pair of paths by the Shannon entropy of their joint dinucleotide
/// composition, mapped so that higher means more repetitive.
///
/// The entropy is normalized by the 4-bit maximum of 16 equiprobable
/// dinucleotides, giving a score in `[0, 100]`: 0 for maximally mixed
/// content, 100 for a homopolymer.
pub fn score_path_pair(path1: &str, path2: &str) -> f64 {
    let mut counts = [0u32; 16];
    let mut total = 0u32;
    for path in [path1, path2] {
        for pair in path.as_bytes().windows(2) {
            if let (Some(a), Some(b)) = (encode_base(pair[0]), encode_base(pair[1])) {
                counts[(a * 4 + b) as usize] += 1;
                total += 1;
            }
        }
    }
    if total == 0 {
        return 100.0;
    }
    let total = total as f64;
    let entropy: f64 = counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / total;
            -p * p.log2()
        })
        .sum();
    (100.0 * (1.0 - entropy / 4.0)).clamp(0.0, 100.0)
}
