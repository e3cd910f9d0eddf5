use std::collections::BTreeMap;

use super::node::{NodeId, NodeSnapshot, Rect};
use super::record::{MutationRecord, NodeRef};
use super::{Tree, TreeError};

/// Attribute that carries a node's stable id unless configured otherwise
pub const DEFAULT_STABLE_ID_ATTRIBUTE: &str = "data-node-id";

#[derive(Debug, Clone)]
enum NodeKind {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    attrs: BTreeMap<String, String>,
    sheet_display: String,
    bounds: Option<Rect>,
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// Arena-backed document that doubles as the mutation observer: every
/// mutating call queues a [`MutationRecord`], drained with
/// [`Tree::take_records`].
///
/// Stylesheet display values and geometry are layout inputs, not DOM
/// mutations, so changing them queues nothing.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    stable_id_attribute: String,
    pending: Vec<MutationRecord>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self::with_stable_id_attribute(DEFAULT_STABLE_ID_ATTRIBUTE)
    }

    pub fn with_stable_id_attribute(attribute: impl Into<String>) -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Document,
            }],
            root: NodeId(0),
            stable_id_attribute: attribute.into(),
            pending: Vec::new(),
        }
    }

    /// Append a new element under `parent`
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> Result<NodeId, TreeError> {
        self.node(parent)?;
        let id = self.create_node(NodeKind::Element(Element {
            tag: tag.to_string(),
            attrs: BTreeMap::new(),
            sheet_display: "block".to_string(),
            bounds: None,
        }));
        self.attach(parent, id);
        Ok(id)
    }

    /// Append a new text node under `parent`
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> Result<NodeId, TreeError> {
        self.node(parent)?;
        let id = self.create_node(NodeKind::Text(text.to_string()));
        self.attach(parent, id);
        Ok(id)
    }

    pub fn set_sheet_display(&mut self, node: NodeId, display: &str) -> Result<(), TreeError> {
        self.element_mut(node)?.sheet_display = display.to_string();
        Ok(())
    }

    pub fn set_bounds(&mut self, node: NodeId, bounds: Rect) -> Result<(), TreeError> {
        self.element_mut(node)?.bounds = Some(bounds);
        Ok(())
    }

    /// Space-separated class tokens of `node`
    pub fn classes(&self, node: NodeId) -> Vec<String> {
        self.attribute(node, "class")
            .map(|value| value.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) -> Result<(), TreeError> {
        let mut classes = self.classes(node);
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
        self.set_attribute(node, "class", &classes.join(" "))
    }

    /// Look up a node anywhere in the document by its stable id
    pub fn by_stable_id(&self, id: &str) -> Option<NodeId> {
        let attribute = self.stable_id_attribute.clone();
        self.find_descendant(self.root, &attribute, id)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `node` is still connected to the document root
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.contains(self.root, node)
    }

    /// Drop queued records without delivering them
    pub fn clear_records(&mut self) {
        self.pending.clear();
    }

    fn create_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            kind,
        });
        id
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        let added = vec![self.node_ref(child)];
        self.pending
            .push(MutationRecord::child_list(parent, added, Vec::new()));
    }

    fn node_ref(&self, node: NodeId) -> NodeRef {
        NodeRef {
            node,
            stable_id: self.attribute(node, &self.stable_id_attribute),
        }
    }

    fn node(&self, id: NodeId) -> Result<&Node, TreeError> {
        self.nodes.get(id.0).ok_or(TreeError::UnknownNode(id))
    }

    fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes.get(id.0)?.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut Element, TreeError> {
        match &mut self
            .nodes
            .get_mut(id.0)
            .ok_or(TreeError::UnknownNode(id))?
            .kind
        {
            NodeKind::Element(element) => Ok(element),
            _ => Err(TreeError::NotAnElement(id)),
        }
    }

    fn build_snapshot(&self, id: NodeId) -> Result<NodeSnapshot, TreeError> {
        let node = self.node(id)?;
        match &node.kind {
            NodeKind::Text(text) => Ok(NodeSnapshot::Text(text.clone())),
            NodeKind::Document => Err(TreeError::NotAnElement(id)),
            NodeKind::Element(element) => {
                let children = node
                    .children
                    .iter()
                    .map(|child| self.build_snapshot(*child))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(NodeSnapshot::Element {
                    tag: element.tag.clone(),
                    attrs: element.attrs.clone(),
                    sheet_display: element.sheet_display.clone(),
                    children,
                })
            }
        }
    }

    /// Create detached nodes for `snapshot`; returns the subtree root
    fn materialize(&mut self, snapshot: &NodeSnapshot) -> NodeId {
        match snapshot {
            NodeSnapshot::Text(text) => self.create_node(NodeKind::Text(text.clone())),
            NodeSnapshot::Element {
                tag,
                attrs,
                sheet_display,
                children,
            } => {
                let id = self.create_node(NodeKind::Element(Element {
                    tag: tag.clone(),
                    attrs: attrs.clone(),
                    sheet_display: sheet_display.clone(),
                    bounds: None,
                }));
                for child in children {
                    let child_id = self.materialize(child);
                    self.nodes[child_id.0].parent = Some(id);
                    self.nodes[id.0].children.push(child_id);
                }
                id
            }
        }
    }
}

impl Tree for Document {
    fn document_root(&self) -> NodeId {
        self.root
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0)?.parent
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|e| e.tag.as_str())
    }

    fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node)?.attrs.get(name).cloned()
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), TreeError> {
        self.element_mut(node)?
            .attrs
            .insert(name.to_string(), value.to_string());
        self.pending.push(MutationRecord::attribute(node, name));
        Ok(())
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), TreeError> {
        if self.element_mut(node)?.attrs.remove(name).is_some() {
            self.pending.push(MutationRecord::attribute(node, name));
        }
        Ok(())
    }

    fn text_content(&self, node: NodeId) -> String {
        let Some(n) = self.nodes.get(node.0) else {
            return String::new();
        };
        match &n.kind {
            NodeKind::Text(text) => text.clone(),
            NodeKind::Document | NodeKind::Element(_) => {
                let mut out = String::new();
                for child in &n.children {
                    out.push_str(&self.text_content(*child));
                }
                out
            }
        }
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<(), TreeError> {
        match &mut self
            .nodes
            .get_mut(node.0)
            .ok_or(TreeError::UnknownNode(node))?
            .kind
        {
            NodeKind::Text(data) => {
                *data = text.to_string();
                self.pending.push(MutationRecord::text(node));
                return Ok(());
            }
            NodeKind::Document => return Err(TreeError::NotAnElement(node)),
            NodeKind::Element(_) => {}
        }

        let old_children = std::mem::take(&mut self.nodes[node.0].children);
        let removed: Vec<NodeRef> = old_children.iter().map(|c| self.node_ref(*c)).collect();
        for child in old_children {
            self.nodes[child.0].parent = None;
        }
        let mut added = Vec::new();
        if !text.is_empty() {
            let child = self.create_node(NodeKind::Text(text.to_string()));
            self.nodes[child.0].parent = Some(node);
            self.nodes[node.0].children.push(child);
            added.push(self.node_ref(child));
        }
        if !added.is_empty() || !removed.is_empty() {
            self.pending
                .push(MutationRecord::child_list(node, added, removed));
        }
        Ok(())
    }

    fn computed_display(&self, node: NodeId) -> String {
        match self.element(node) {
            Some(element) => element
                .attrs
                .get("style")
                .and_then(|style| style_property(style, "display"))
                .unwrap_or_else(|| element.sheet_display.clone()),
            None => "inline".to_string(),
        }
    }

    fn set_display(&mut self, node: NodeId, display: Option<&str>) -> Result<(), TreeError> {
        let current = self.element_mut(node)?.attrs.get("style").cloned();
        let updated = with_style_property(current.as_deref().unwrap_or(""), "display", display);
        match (current, updated) {
            (None, None) => Ok(()),
            (Some(_), None) => self.remove_attribute(node, "style"),
            (_, Some(style)) => self.set_attribute(node, "style", &style),
        }
    }

    fn bounds(&self, node: NodeId) -> Option<Rect> {
        self.element(node)?.bounds
    }

    fn snapshot(&self, node: NodeId) -> Result<NodeSnapshot, TreeError> {
        self.build_snapshot(node)
    }

    fn append_snapshot(
        &mut self,
        parent: NodeId,
        snapshot: &NodeSnapshot,
    ) -> Result<NodeId, TreeError> {
        if self.element(parent).is_none() {
            self.node(parent)?;
            return Err(TreeError::NotAnElement(parent));
        }
        let id = self.materialize(snapshot);
        self.attach(parent, id);
        Ok(id)
    }

    fn detach(&mut self, node: NodeId) -> Result<(), TreeError> {
        let parent = self.node(node)?.parent.ok_or(TreeError::Detached(node))?;
        self.nodes[parent.0].children.retain(|c| *c != node);
        self.nodes[node.0].parent = None;
        let removed = vec![self.node_ref(node)];
        self.pending
            .push(MutationRecord::child_list(parent, Vec::new(), removed));
        Ok(())
    }

    fn take_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.pending)
    }
}

/// Value of `property` in an inline style declaration list
fn style_property(style: &str, property: &str) -> Option<String> {
    style.split(';').find_map(|decl| {
        let (name, value) = decl.split_once(':')?;
        (name.trim() == property).then(|| value.trim().to_string())
    })
}

/// Rewrite a declaration list with `property` set or removed. `None` means
/// the resulting list is empty.
fn with_style_property(style: &str, property: &str, value: Option<&str>) -> Option<String> {
    let mut decls: Vec<(String, String)> = style
        .split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim();
            (!name.is_empty() && name != property)
                .then(|| (name.to_string(), value.trim().to_string()))
        })
        .collect();
    if let Some(value) = value {
        decls.push((property.to_string(), value.to_string()));
    }
    if decls.is_empty() {
        return None;
    }
    Some(
        decls
            .iter()
            .map(|(name, value)| format!("{name}: {value};"))
            .collect::<Vec<_>>()
            .join(" "),
    )
}
