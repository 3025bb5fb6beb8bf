/*!
 * TEI annotation writer.
 *
 * Merges translations back into the source tree as `<note type="translation"
 * xml:lang="en">` siblings of the elements they translate, then serializes
 * the whole document. Re-runs either replace prior notes (overwrite mode) or
 * leave already-annotated segments untouched, which makes the non-overwrite
 * path idempotent.
 */

use std::path::Path;

use crate::errors::WriterError;
use crate::tei_processor::TeiDocument;
use crate::xml_tree::{NodeId, XmlTree, local_name};

/// Marker attribute value identifying a translation note
pub const NOTE_TYPE_TRANSLATION: &str = "translation";

/// Marker language of the notes this tool writes
pub const NOTE_LANG: &str = "en";

/// True for elements matching the translation note convention
pub fn is_translation_note(tree: &XmlTree, node: NodeId) -> bool {
    let Some(name) = tree.name(node) else {
        return false;
    };
    if local_name(name) != "note" {
        return false;
    }
    tree.attribute(node, "type") == Some(NOTE_TYPE_TRANSLATION)
        && tree.attribute(node, "xml:lang") == Some(NOTE_LANG)
}

/// Note element name carrying the same namespace prefix as its anchor
fn prefixed_note_name(anchor_name: &str) -> String {
    match anchor_name.find(':') {
        Some(pos) => format!("{}:note", &anchor_name[..pos]),
        None => "note".to_string(),
    }
}

/// Remove the run of translation notes following `anchor`, skipping over
/// intervening text siblings, stopping at the first other structural node.
fn remove_following_translation_notes(tree: &mut XmlTree, anchor: NodeId) {
    let mut cursor = tree.next_sibling(anchor);
    while let Some(current) = cursor {
        let next = tree.next_sibling(current);
        if tree.is_text_like(current) {
            cursor = next;
            continue;
        }
        if is_translation_note(tree, current) {
            tree.remove(current);
            cursor = next;
            continue;
        }
        break;
    }
}

/// First structural (non-text) sibling after `anchor`
fn first_structural_sibling(tree: &XmlTree, anchor: NodeId) -> Option<NodeId> {
    let mut cursor = tree.next_sibling(anchor);
    while let Some(current) = cursor {
        if !tree.is_text_like(current) {
            return Some(current);
        }
        cursor = tree.next_sibling(current);
    }
    None
}

/// Insert translation notes for every segment and write the document.
///
/// In overwrite mode prior translation notes after each segment are removed
/// first; otherwise segments whose next structural sibling is already a
/// translation note are skipped unchanged.
pub fn write_tei_note_output(
    out_path: &Path,
    doc: &mut TeiDocument,
    translations: &[String],
    overwrite_existing_translations: bool,
) -> Result<(), WriterError> {
    if translations.len() != doc.segment_nodes.len() {
        return Err(WriterError::CountMismatch {
            expected: doc.segment_nodes.len(),
            actual: translations.len(),
        });
    }

    for (node, translated) in doc.segment_nodes.iter().zip(translations) {
        let node = *node;
        if doc.tree.parent(node).is_none() {
            continue;
        }

        if overwrite_existing_translations {
            remove_following_translation_notes(&mut doc.tree, node);
        } else if first_structural_sibling(&doc.tree, node)
            .is_some_and(|sibling| is_translation_note(&doc.tree, sibling))
        {
            continue;
        }

        let anchor_name = doc.tree.name(node).unwrap_or("").to_string();
        let note = doc.tree.new_element(&prefixed_note_name(&anchor_name));
        doc.tree.set_attribute(note, "type", NOTE_TYPE_TRANSLATION);
        doc.tree.set_attribute(note, "xml:lang", NOTE_LANG);
        doc.tree.set_text(note, translated);
        doc.tree.insert_after(node, note);
    }

    doc.tree.save_to_file(out_path).map_err(|e| WriterError::Io {
        path: out_path.to_path_buf(),
        detail: e.to_string(),
    })
}
