//! Owned HTML tree.
//!
//! html5ever parses into an `RcDom`; we copy the `<body>` content into a flat
//! arena so the annotation pass can rewrite it in place and the renderer can
//! walk parent chains without reference counting.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Data {
    Root,
    Element {
        name: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: Data,
}

#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
}

const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "meta", "link", "col", "wbr"];

fn html5_parse(input: &str) -> RcDom {
    parse_document(RcDom::default(), Default::default()).one(input)
}

fn wrap_document(input_html: &str) -> String {
    if input_html.to_ascii_lowercase().contains("<html") {
        input_html.to_string()
    } else {
        format!(
            "<!doctype html><html><head><meta charset=\"utf-8\"></head><body>{}</body></html>",
            input_html
        )
    }
}

fn body_children(dom: &RcDom) -> Vec<Handle> {
    fn find_elem(node: &Handle, name: &str) -> Option<Handle> {
        if let NodeData::Element { name: q, .. } = &node.data {
            if q.local.to_string().eq_ignore_ascii_case(name) {
                return Some(node.clone());
            }
        }
        for c in node.children.borrow().iter() {
            if let Some(x) = find_elem(c, name) {
                return Some(x);
            }
        }
        None
    }

    if let Some(body) = find_elem(&dom.document, "body") {
        return body.children.borrow().clone();
    }
    dom.document.children.borrow().clone()
}

fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                data: Data::Root,
            }],
        }
    }

    /// Parses an HTML fragment or document; the `<body>` content becomes the
    /// children of the tree root.
    pub fn parse(html: &str) -> Self {
        let mut tree = Self::new();
        let root = tree.root();
        tree.append_html(root, html);
        tree
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Parses `html` and appends the resulting nodes to `parent`.
    pub fn append_html(&mut self, parent: NodeId, html: &str) {
        let dom = html5_parse(&wrap_document(html));
        for c in body_children(&dom) {
            self.import(parent, &c);
        }
    }

    fn import(&mut self, parent: NodeId, handle: &Handle) {
        match &handle.data {
            NodeData::Text { contents } => {
                let id = self.create_text(&contents.borrow());
                self.append(parent, id);
            }
            NodeData::Element { name, attrs, .. } => {
                let attrs = attrs
                    .borrow()
                    .iter()
                    .map(|a| (a.name.local.to_string(), a.value.to_string()))
                    .collect();
                let id = self.push(Data::Element {
                    name: name.local.to_string().to_ascii_lowercase(),
                    attrs,
                });
                self.append(parent, id);
                for c in handle.children.borrow().iter() {
                    self.import(id, c);
                }
            }
            _ => {}
        }
    }

    fn push(&mut self, data: Data) -> NodeId {
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
        });
        NodeId(self.nodes.len() - 1)
    }

    pub fn data(&self, id: NodeId) -> &Data {
        &self.nodes[id.0].data
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].data {
            Data::Element { name, .. } => Some(name.as_str()),
            _ => None,
        }
    }

    pub fn is(&self, id: NodeId, name: &str) -> bool {
        self.name(id) == Some(name)
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].data {
            Data::Text(t) => Some(t.as_str()),
            _ => None,
        }
    }

    pub fn attr(&self, id: NodeId, key: &str) -> Option<&str> {
        match &self.nodes[id.0].data {
            Data::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    pub fn set_attr(&mut self, id: NodeId, key: &str, value: &str) {
        if let Data::Element { attrs, .. } = &mut self.nodes[id.0].data {
            match attrs.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(key)) {
                Some(slot) => slot.1 = value.to_string(),
                None => attrs.push((key.to_string(), value.to_string())),
            }
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, key: &str) -> Option<String> {
        if let Data::Element { attrs, .. } = &mut self.nodes[id.0].data {
            let pos = attrs.iter().position(|(k, _)| k.eq_ignore_ascii_case(key))?;
            return Some(attrs.remove(pos).1);
        }
        None
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, "class")
            .map(|c| c.split_whitespace().any(|t| t == class))
            .unwrap_or(false)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|c| self.name(*c).is_some())
            .collect()
    }

    pub fn first_child_named(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.children(id).iter().copied().find(|c| self.is(*c, name))
    }

    /// Ancestors of `id`, nearest first, ending with the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = self.parent(id);
        while let Some(p) = cur {
            out.push(p);
            cur = self.parent(p);
        }
        out
    }

    pub fn has_ancestor(&self, id: NodeId, name: &str) -> bool {
        self.ancestors(id).into_iter().any(|a| self.is(a, name))
    }

    /// Pre-order descendants of `id`, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        fn walk(tree: &Tree, id: NodeId, out: &mut Vec<NodeId>) {
            for c in tree.children(id) {
                out.push(*c);
                walk(tree, *c, out);
            }
        }
        let mut out = Vec::new();
        walk(self, id, &mut out);
        out
    }

    /// Every element attached to the tree, in document order.
    pub fn elements(&self) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|n| self.name(*n).is_some())
            .collect()
    }

    pub fn find_all(&self, name: &str) -> Vec<NodeId> {
        self.elements()
            .into_iter()
            .filter(|n| self.is(*n, name))
            .collect()
    }

    pub fn descendants_named(&self, id: NodeId, name: &str) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|n| self.is(*n, name))
            .collect()
    }

    /// The element immediately before `id` among its siblings, skipping text.
    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|s| *s == id)?;
        siblings[..pos]
            .iter()
            .rev()
            .copied()
            .find(|s| self.name(*s).is_some())
    }

    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(t) = self.text(id) {
            return t.to_string();
        }
        let mut out = String::new();
        for n in self.descendants(id) {
            if let Some(t) = self.text(n) {
                out.push_str(t);
            }
        }
        out
    }

    /// Last text leaf under `id` in document order.
    pub fn last_text_descendant(&self, id: NodeId) -> Option<NodeId> {
        self.descendants(id)
            .into_iter()
            .rev()
            .find(|n| self.text(*n).is_some())
    }

    pub fn create_element(&mut self, name: &str, attrs: &[(&str, &str)]) -> NodeId {
        self.push(Data::Element {
            name: name.to_string(),
            attrs: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        })
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(Data::Text(text.to_string()))
    }

    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Puts `new` where `old` was; `old` ends up detached.
    pub fn replace(&mut self, old: NodeId, new: NodeId) {
        self.detach(new);
        let Some(parent) = self.parent(old) else {
            return;
        };
        if let Some(pos) = self.nodes[parent.0].children.iter().position(|c| *c == old) {
            self.nodes[parent.0].children[pos] = new;
            self.nodes[new.0].parent = Some(parent);
            self.nodes[old.0].parent = None;
        }
    }

    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != id);
        }
    }

    pub fn clear_children(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for c in children {
            self.nodes[c.0].parent = None;
        }
    }

    pub fn element_text(&mut self, parent: NodeId, name: &str, text: &str) -> NodeId {
        let el = self.create_element(name, &[]);
        let t = self.create_text(text);
        self.append(el, t);
        self.append(parent, el);
        el
    }

    /// Human-readable position of `id`: the source file named by the last
    /// `data-source` tag at or before it, and the heading of the section it
    /// sits in, when known.
    pub fn describe_location(&self, id: NodeId) -> String {
        let mut source = None;
        let mut section = None;
        for n in self.descendants(self.root()) {
            if let Some(src) = self.attr(n, "data-source") {
                source = Some(src.to_string());
            }
            if n == id {
                break;
            }
            if matches!(self.name(n), Some("h1" | "h2" | "h3" | "h4" | "h5" | "h6")) {
                section = Some(self.text_content(n).trim().to_string());
            }
        }
        match (source, section) {
            (Some(src), Some(sec)) => format!("{src}, section {sec:?}"),
            (Some(src), None) => src,
            (None, Some(sec)) => format!("section {sec:?}"),
            (None, None) => "document start".to_string(),
        }
    }

    /// Serializes the attached tree back to HTML.
    pub fn to_html(&self) -> String {
        fn walk(tree: &Tree, id: NodeId, out: &mut String) {
            match tree.data(id) {
                Data::Root => {
                    for c in tree.children(id) {
                        walk(tree, *c, out);
                    }
                }
                Data::Text(t) => out.push_str(&escape_text(t)),
                Data::Element { name, attrs } => {
                    out.push('<');
                    out.push_str(name);
                    for (k, v) in attrs {
                        out.push_str(&format!(" {}=\"{}\"", k, escape_attr(v)));
                    }
                    out.push('>');
                    if VOID_ELEMENTS.contains(&name.as_str()) {
                        return;
                    }
                    for c in tree.children(id) {
                        walk(tree, *c, out);
                    }
                    out.push_str(&format!("</{name}>"));
                }
            }
        }
        let mut out = String::new();
        walk(self, self.root(), &mut out);
        out
    }
}
