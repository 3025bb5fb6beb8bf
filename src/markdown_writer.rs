/*!
 * Markdown sidecar writer: a flattened source/translation listing for human
 * review, with no structural coupling to the TEI tree.
 */

use std::fmt::Write as _;
use std::path::Path;

use crate::errors::WriterError;
use crate::tei_processor::TeiDocument;

/// Render all segment pairs to a Markdown file, one block per segment.
pub fn write_markdown_output(
    out_path: &Path,
    doc: &TeiDocument,
    translations: &[String],
    source_language: &str,
) -> Result<(), WriterError> {
    if translations.len() != doc.segments.len() {
        return Err(WriterError::CountMismatch {
            expected: doc.segments.len(),
            actual: translations.len(),
        });
    }

    let filename = doc
        .source_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut out = String::new();
    let _ = writeln!(out, "# {}\n", filename);

    for (segment, translated) in doc.segments.iter().zip(translations) {
        let _ = writeln!(out, "## Segment {} ({})", segment.index + 1, segment.id);
        let _ = writeln!(out, "**Original ({}):** {}\n", source_language, segment.source_text);
        let _ = writeln!(out, "**English:** {}\n", translated);
        let _ = writeln!(out, "---\n");
    }

    std::fs::write(out_path, out).map_err(|e| WriterError::Io {
        path: out_path.to_path_buf(),
        detail: e.to_string(),
    })
}
