use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::debug;
use once_cell::sync::Lazy;

use crate::errors::DocumentError;
use crate::xml_tree::{NodeId, NodeKind, XmlTree, local_name};

// @module: TEI document reading and segmentation

// @const: Elements whose text forms a translation unit
static TRANSLATABLE_TAGS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| HashSet::from(["p", "l", "ab", "head", "seg"]));

// @const: Elements whose entire subtree is excluded from gathered text
static SKIP_TAGS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| HashSet::from(["note", "pb", "lb", "cb", "fw", "ref", "anchor", "milestone"]));

// @struct: Single translatable unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    // @field: 0-based position in the document, authoritative for ordering
    pub index: usize,

    // @field: xml:id/id attribute, or synthesized "seg-<index>"
    pub id: String,

    // @field: Whitespace-normalized source text
    pub source_text: String,
}

/// A parsed TEI document with its extracted segments.
///
/// `segments` and `segment_nodes` are parallel: `segment_nodes[i]` is the
/// arena handle of the element `segments[i]` was gathered from.
#[derive(Debug)]
pub struct TeiDocument {
    /// Source filename
    pub source_path: PathBuf,

    /// Owned document tree
    pub tree: XmlTree,

    /// Translatable units in document order
    pub segments: Vec<Segment>,

    /// Back-references into the tree, same length and order as `segments`
    pub segment_nodes: Vec<NodeId>,
}

impl TeiDocument {
    /// Read and segment a TEI file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| DocumentError::Malformed {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        Self::from_content(&content, path)
    }

    /// Segment TEI content that has already been read into memory
    pub fn from_content(content: &str, source_path: &Path) -> Result<Self, DocumentError> {
        let tree = XmlTree::parse(content).map_err(|e| DocumentError::Malformed {
            path: source_path.to_path_buf(),
            detail: e.to_string(),
        })?;

        let root = tree
            .root_element()
            .ok_or_else(|| DocumentError::MissingRoot(source_path.to_path_buf()))?;

        let mut segments = Vec::new();
        let mut segment_nodes = Vec::new();
        collect_segments(&tree, root, false, false, &mut segments, &mut segment_nodes);

        if segments.is_empty() {
            return Err(DocumentError::NoTranslatableContent(source_path.to_path_buf()));
        }

        debug!("Segmented {:?}: {} translation units", source_path, segments.len());

        Ok(TeiDocument {
            source_path: source_path.to_path_buf(),
            tree,
            segments,
            segment_nodes,
        })
    }
}

/// Collapse whitespace runs to single spaces and trim the ends
pub fn normalize_whitespace(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_space = false;

    for ch in input.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
        } else {
            out.push(ch);
            in_space = false;
        }
    }

    out.trim().to_string()
}

/// Gather text from a node and its descendants, skipping excluded subtrees
fn collect_text(tree: &XmlTree, node: NodeId, out: &mut String) {
    match tree.kind(node) {
        NodeKind::Text(text) | NodeKind::CData(text) => {
            out.push_str(text);
            out.push(' ');
        }
        NodeKind::Element { name, .. } => {
            if SKIP_TAGS.contains(local_name(name)) {
                return;
            }
            for child in tree.children(node) {
                collect_text(tree, *child, out);
            }
        }
        _ => {}
    }
}

fn node_id_or_fallback(tree: &XmlTree, node: NodeId, index: usize) -> String {
    if let Some(id) = tree.attribute(node, "xml:id") {
        return id.to_string();
    }
    if let Some(id) = tree.attribute(node, "id") {
        return id.to_string();
    }
    format!("seg-{}", index)
}

fn collect_segments(
    tree: &XmlTree,
    node: NodeId,
    in_header: bool,
    in_body: bool,
    segments: &mut Vec<Segment>,
    segment_nodes: &mut Vec<NodeId>,
) {
    let Some(name) = tree.name(node) else {
        return;
    };
    let name = local_name(name);

    // Zone flags are sticky: once set on an ancestor they hold for the
    // whole subtree.
    let now_in_header = in_header || name == "teiHeader";
    let now_in_body = in_body || name == "body";

    if now_in_header {
        for child in tree.children(node) {
            collect_segments(tree, *child, now_in_header, now_in_body, segments, segment_nodes);
        }
        return;
    }

    if now_in_body && TRANSLATABLE_TAGS.contains(name) {
        let mut raw_text = String::new();
        collect_text(tree, node, &mut raw_text);
        let normalized = normalize_whitespace(&raw_text);

        if !normalized.is_empty() {
            let index = segments.len();
            segments.push(Segment {
                index,
                id: node_id_or_fallback(tree, node, index),
                source_text: normalized,
            });
            segment_nodes.push(node);
        }

        // Paragraph-level segmentation: nested translatable elements are
        // absorbed into this unit, never segmented on their own.
        return;
    }

    for child in tree.children(node) {
        collect_segments(tree, *child, now_in_header, now_in_body, segments, segment_nodes);
    }
}
