//! Formatting of accepted bubbles into output records.

use std::fmt::Write as _;

use crate::core::kmer::{base_char, complement};
use crate::detect::bubble::Bubble;
use crate::detect::traversal::TraversalKind;
use crate::detect::DetectionOptions;
use crate::utils::sequence_io::SequenceRecord;

/// Build one output record for path `path_idx` of a finished bubble.
///
/// The comment is `SNP_<label>_path_<index>|<quality>`, annotated with
/// unitig/contig lengths when extension is enabled. The body is the left
/// extension (reversed, complemented, lowercase), the left closure base
/// (lowercase), the 2k-1 uppercase core, the right closure base and the
/// right extension (lowercase).
pub fn build_sequence(
    k: usize,
    options: &DetectionOptions,
    bubble: &Bubble,
    path_idx: usize,
    label: &str,
) -> SequenceRecord {
    let quality = if bubble.score >= options.complexity_threshold {
        "low"
    } else {
        "high"
    };
    let mut comment = format!("SNP_{}_path_{}|{}", label, bubble.index, quality);

    let has_left = bubble.where_to_extend & 1 != 0;
    let has_right = bubble.where_to_extend & 2 != 0;
    match options.traversal {
        TraversalKind::None => {}
        TraversalKind::Unitig => {
            let left = if has_left {
                bubble.extension_left.len() + 1
            } else {
                0
            };
            let right = if has_right {
                bubble.extension_right.len() + 1
            } else {
                0
            };
            let _ = write!(
                comment,
                "|left_unitig_length_{left}|right_unitig_length_{right}"
            );
        }
        TraversalKind::Contig => {
            let left_unitig = if has_left { bubble.divergence_left + 1 } else { 0 };
            let right_unitig = if has_right {
                bubble.divergence_right + 1
            } else {
                0
            };
            let left_contig = if has_left {
                bubble.extension_left.len() + 1
            } else {
                0
            };
            let right_contig = if has_right {
                bubble.extension_right.len() + 1
            } else {
                0
            };
            let _ = write!(
                comment,
                "|left_unitig_length_{left_unitig}|right_unitig_length_{right_unitig}\
                 |left_contig_length_{left_contig}|right_contig_length_{right_contig}"
            );
        }
    }

    let len = 2 * k - 1
        + bubble.extension_left.len()
        + bubble.extension_right.len()
        + bubble.closure_left.is_some() as usize
        + bubble.closure_right.is_some() as usize;
    let mut body = String::with_capacity(len);

    // left extension was walked in reverse-complement orientation
    for &base in bubble.extension_left.iter().rev() {
        body.push(base_char(complement(base)).to_ascii_lowercase());
    }
    if let Some(base) = bubble.closure_left {
        body.push(base_char(base).to_ascii_lowercase());
    }
    let begin = bubble.begin[path_idx].to_string();
    let end = bubble.end[path_idx].to_string();
    body.push_str(&begin[..k - 1]);
    body.push_str(&end);
    if let Some(base) = bubble.closure_right {
        body.push(base_char(base).to_ascii_lowercase());
    }
    for &base in &bubble.extension_right {
        body.push(base_char(base).to_ascii_lowercase());
    }
    debug_assert_eq!(body.len(), len);

    SequenceRecord { comment, body }
}
