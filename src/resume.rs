/*!
 * Resume policy: decide whether a prior output file already satisfies an
 * input document, so re-runs skip work that is complete.
 *
 * The output documents themselves are the only durable state consulted;
 * there is no separate progress journal.
 */

use std::path::Path;

use anyhow::{Context, Result};
use log::debug;

use crate::tei_writer::is_translation_note;
use crate::xml_tree::XmlTree;

/// Outcome of the resume check for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeDecision {
    /// True when the file can be skipped entirely
    pub skip: bool,
    /// Human-readable reason, also used in the `[skip]` status line
    pub reason: String,
}

impl ResumeDecision {
    fn proceed(reason: &str) -> Self {
        ResumeDecision {
            skip: false,
            reason: reason.to_string(),
        }
    }
}

/// Count translation notes in an existing output document.
///
/// A parse failure here is a hard error: a corrupt prior output must be
/// surfaced to the operator, not silently overwritten.
fn count_translation_notes<P: AsRef<Path>>(path: P) -> Result<usize> {
    let path = path.as_ref();
    let tree = XmlTree::parse_file(path)
        .with_context(|| format!("Failed to parse existing output XML {:?}", path))?;

    let Some(root) = tree.root_element() else {
        return Ok(0);
    };

    let mut count = 0;
    if is_translation_note(&tree, root) {
        count += 1;
    }
    for node in tree.descendants(root) {
        if is_translation_note(&tree, node) {
            count += 1;
        }
    }
    Ok(count)
}

/// Decide whether `output_xml` already covers all `expected_segments` of
/// `input_xml`.
///
/// Never skips when resume is disabled, the output is missing, either mtime
/// is unreadable, or the output predates the input. Otherwise the output is
/// parsed and its translation note count compared against the expectation.
pub fn should_skip_file(
    input_xml: &Path,
    output_xml: &Path,
    expected_segments: usize,
    resume_enabled: bool,
) -> Result<ResumeDecision> {
    if !resume_enabled || !output_xml.exists() {
        return Ok(ResumeDecision::proceed("resume disabled or no prior output"));
    }

    let Ok(in_time) = std::fs::metadata(input_xml).and_then(|m| m.modified()) else {
        return Ok(ResumeDecision::proceed("cannot read input mtime"));
    };
    let Ok(out_time) = std::fs::metadata(output_xml).and_then(|m| m.modified()) else {
        return Ok(ResumeDecision::proceed("cannot read output mtime"));
    };

    if out_time < in_time {
        return Ok(ResumeDecision::proceed("output older than input"));
    }

    let note_count = count_translation_notes(output_xml)?;
    debug!(
        "Resume check {:?}: {} notes, {} expected",
        output_xml, note_count, expected_segments
    );

    if note_count == expected_segments {
        return Ok(ResumeDecision {
            skip: true,
            reason: "output complete".to_string(),
        });
    }

    Ok(ResumeDecision::proceed(&format!(
        "note_count={} expected={}",
        note_count, expected_segments
    )))
}
