/*!
 * Arena-backed XML document tree.
 *
 * Parses a whole document into a flat node arena addressed by `NodeId`
 * handles. Handles stay valid across mutation, which lets callers keep
 * long-lived references to nodes (e.g. the segment back-references used by
 * the TEI writer) without borrowing into the tree. Parsing and escaping are
 * delegated to quick-xml; the tree itself owns all node data.
 *
 * Serialization preserves the document's original whitespace verbatim, so a
 * parse/serialize round trip of an unmodified tree is byte-stable.
 */

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::Event;

/// Stable handle to a node in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Node payload
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Synthetic document node holding all top-level children
    Document,
    /// Element with its qualified name and attributes in document order
    Element {
        /// Qualified name as written in the source, prefix included
        name: String,
        /// Attribute key/value pairs, values unescaped
        attributes: Vec<(String, String)>,
    },
    /// Character data, unescaped
    Text(String),
    /// CDATA section content
    CData(String),
    /// Comment content without the `<!--` `-->` delimiters
    Comment(String),
    /// XML declaration content without the `<?` `?>` delimiters
    Declaration(String),
    /// DOCTYPE content without the `<!DOCTYPE` `>` delimiters
    DocType(String),
    /// Processing instruction content without the `<?` `?>` delimiters
    ProcessingInstruction(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Mutable XML document tree backed by a node arena
#[derive(Debug, Clone)]
pub struct XmlTree {
    nodes: Vec<Node>,
}

/// Strip a namespace prefix from a qualified name
pub fn local_name(qualified: &str) -> &str {
    match qualified.find(':') {
        Some(pos) => &qualified[pos + 1..],
        None => qualified,
    }
}

impl XmlTree {
    fn empty() -> Self {
        XmlTree {
            nodes: vec![Node {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Parse an XML document from a string
    pub fn parse(content: &str) -> Result<Self> {
        let mut tree = Self::empty();
        let mut reader = Reader::from_str(content);
        let mut stack = vec![tree.document()];

        loop {
            let event = reader
                .read_event()
                .map_err(|e| anyhow!("XML error at position {}: {}", reader.buffer_position(), e))?;

            let parent = *stack.last().expect("element stack never empties below the document");
            match event {
                Event::Start(start) => {
                    let id = tree.push_element_from_start(&start)?;
                    tree.attach(parent, id);
                    stack.push(id);
                }
                Event::Empty(start) => {
                    let id = tree.push_element_from_start(&start)?;
                    tree.attach(parent, id);
                }
                Event::End(_) => {
                    stack.pop();
                }
                Event::Text(text) => {
                    let value = text
                        .unescape()
                        .map_err(|e| anyhow!("Invalid character data: {}", e))?
                        .into_owned();
                    let id = tree.push_node(NodeKind::Text(value));
                    tree.attach(parent, id);
                }
                Event::CData(cdata) => {
                    let value = String::from_utf8_lossy(&cdata).into_owned();
                    let id = tree.push_node(NodeKind::CData(value));
                    tree.attach(parent, id);
                }
                Event::Comment(comment) => {
                    let value = String::from_utf8_lossy(&comment).into_owned();
                    let id = tree.push_node(NodeKind::Comment(value));
                    tree.attach(parent, id);
                }
                Event::Decl(decl) => {
                    let value = String::from_utf8_lossy(&decl).into_owned();
                    let id = tree.push_node(NodeKind::Declaration(value));
                    tree.attach(parent, id);
                }
                Event::DocType(doctype) => {
                    let value = String::from_utf8_lossy(&doctype).into_owned();
                    let id = tree.push_node(NodeKind::DocType(value));
                    tree.attach(parent, id);
                }
                Event::PI(pi) => {
                    let value = String::from_utf8_lossy(&pi).into_owned();
                    let id = tree.push_node(NodeKind::ProcessingInstruction(value));
                    tree.attach(parent, id);
                }
                Event::Eof => break,
            }
        }

        if stack.len() != 1 {
            return Err(anyhow!("Unclosed element at end of document"));
        }

        Ok(tree)
    }

    /// Parse an XML document from a file
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))?;
        Self::parse(&content)
    }

    fn push_element_from_start(&mut self, start: &quick_xml::events::BytesStart) -> Result<NodeId> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| anyhow!("Invalid attribute in <{}>: {}", name, e))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| anyhow!("Invalid attribute value in <{}>: {}", name, e))?
                .into_owned();
            attributes.push((key, value));
        }
        Ok(self.push_node(NodeKind::Element { name, attributes }))
    }

    fn push_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// The synthetic document node
    pub fn document(&self) -> NodeId {
        NodeId(0)
    }

    /// First element child of the document node, if any
    pub fn root_element(&self) -> Option<NodeId> {
        self.nodes[0]
            .children
            .iter()
            .copied()
            .find(|id| self.is_element(*id))
    }

    /// Node payload accessor
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    /// Qualified element name, or None for non-elements
    pub fn name(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Attribute value by exact qualified key
    pub fn attribute(&self, id: NodeId, key: &str) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0].kind, NodeKind::Element { .. })
    }

    /// Text or CDATA node
    pub fn is_text_like(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0].kind, NodeKind::Text(_) | NodeKind::CData(_))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Next sibling in the parent's child list
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.nodes[id.0].parent?;
        let siblings = &self.nodes[parent.0].children;
        let pos = siblings.iter().position(|s| *s == id)?;
        siblings.get(pos + 1).copied()
    }

    /// Depth-first descendants of a node, the node itself excluded
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack = self.nodes[id.0].children.to_vec();
        stack.reverse();
        Descendants { tree: self, stack }
    }

    /// Create a detached element
    pub fn new_element(&mut self, name: &str) -> NodeId {
        self.push_node(NodeKind::Element {
            name: name.to_string(),
            attributes: Vec::new(),
        })
    }

    /// Set or replace an attribute on an element
    pub fn set_attribute(&mut self, id: NodeId, key: &str, value: &str) {
        if let NodeKind::Element { attributes, .. } = &mut self.nodes[id.0].kind {
            match attributes.iter_mut().find(|(k, _)| k == key) {
                Some(entry) => entry.1 = value.to_string(),
                None => attributes.push((key.to_string(), value.to_string())),
            }
        }
    }

    /// Replace an element's children with a single text node
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        for child in std::mem::take(&mut self.nodes[id.0].children) {
            self.nodes[child.0].parent = None;
        }
        let text_id = self.push_node(NodeKind::Text(text.to_string()));
        self.attach(id, text_id);
    }

    /// Insert a detached node as the sibling immediately after `anchor`.
    /// Returns false when the anchor has no parent.
    pub fn insert_after(&mut self, anchor: NodeId, new_node: NodeId) -> bool {
        let Some(parent) = self.nodes[anchor.0].parent else {
            return false;
        };
        let pos = self.nodes[parent.0]
            .children
            .iter()
            .position(|c| *c == anchor)
            .expect("anchor is a child of its recorded parent");
        self.nodes[parent.0].children.insert(pos + 1, new_node);
        self.nodes[new_node.0].parent = Some(parent);
        true
    }

    /// Detach a node from its parent. The node stays in the arena but is no
    /// longer reachable from the document.
    pub fn remove(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != id);
        }
    }

    /// Serialize the tree back to XML text
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for child in &self.nodes[0].children {
            self.write_node(*child, &mut out);
        }
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].kind {
            NodeKind::Document => {}
            NodeKind::Element { name, attributes } => {
                let _ = write!(out, "<{}", name);
                for (key, value) in attributes {
                    let _ = write!(out, " {}=\"{}\"", key, escape(value.as_str()));
                }
                let children = &self.nodes[id.0].children;
                if children.is_empty() {
                    out.push_str("/>");
                } else {
                    out.push('>');
                    for child in children {
                        self.write_node(*child, out);
                    }
                    let _ = write!(out, "</{}>", name);
                }
            }
            NodeKind::Text(text) => out.push_str(&escape(text.as_str())),
            NodeKind::CData(content) => {
                let _ = write!(out, "<![CDATA[{}]]>", content);
            }
            NodeKind::Comment(content) => {
                let _ = write!(out, "<!--{}-->", content);
            }
            NodeKind::Declaration(content) => {
                let _ = write!(out, "<?{}?>", content);
            }
            NodeKind::DocType(content) => {
                let _ = write!(out, "<!DOCTYPE {}>", content);
            }
            NodeKind::ProcessingInstruction(content) => {
                let _ = write!(out, "<?{}?>", content);
            }
        }
    }

    /// Serialize and write to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path.as_ref(), self.serialize())
            .with_context(|| format!("Failed to write XML file: {:?}", path.as_ref()))
    }
}

/// Iterator over a node's descendants in document order
pub struct Descendants<'a> {
    tree: &'a XmlTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let next = self.stack.pop()?;
        for child in self.tree.nodes[next.0].children.iter().rev() {
            self.stack.push(*child);
        }
        Some(next)
    }
}
