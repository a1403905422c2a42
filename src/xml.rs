//! Owned, mutable markup tree.
//!
//! Parsing goes through roxmltree; the result is copied into plain owned
//! nodes so the tree can be rewritten in place. Serialization is lossless
//! where nothing changed: the prolog and epilog are kept as source text, and
//! every element remembers its original start tag, which is re-emitted
//! verbatim until one of its attributes is modified.

use crate::ns;

#[derive(Clone, Debug, PartialEq)]
pub struct QName {
    pub prefix: Option<String>,
    pub local: String,
    pub ns: Option<String>,
}

impl QName {
    /// Name in `ns` using the canonical prefix from [`ns::PREFIXES`].
    pub fn new(namespace: &str, local: &str) -> Self {
        QName {
            prefix: ns::prefix_for(namespace).map(str::to_string),
            local: local.to_string(),
            ns: Some(namespace.to_string()),
        }
    }

    fn write_to(&self, out: &mut String) {
        if let Some(p) = &self.prefix {
            out.push_str(p);
            out.push(':');
        }
        out.push_str(&self.local);
    }

    pub fn qualified(&self) -> String {
        let mut s = String::new();
        self.write_to(&mut s);
        s
    }

    fn matches(&self, namespace: &str, local: &str) -> bool {
        self.local == local && self.ns.as_deref() == Some(namespace)
    }
}

#[derive(Clone, Debug)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

#[derive(Clone, Debug)]
pub enum Node {
    Element(Element),
    Text(String),
    /// Text read from the source, written back with its original escaping.
    SourceText { text: String, raw: String },
    Comment(String),
    Pi { target: String, value: Option<String> },
}

#[derive(Clone, Debug)]
pub struct Element {
    pub name: QName,
    namespaces: Vec<(Option<String>, String)>,
    attributes: Vec<Attribute>,
    pub children: Vec<Node>,
    raw_start: Option<String>,
}

impl Element {
    pub fn new(namespace: &str, local: &str) -> Self {
        Element {
            name: QName::new(namespace, local),
            namespaces: Vec::new(),
            attributes: Vec::new(),
            children: Vec::new(),
            raw_start: None,
        }
    }

    pub fn wml(local: &str) -> Self {
        Self::new(ns::WML, local)
    }

    /// Declare `xmlns:prefix` on this element (for building parts from scratch).
    pub fn declare_namespace(&mut self, prefix: &str, uri: &str) {
        self.namespaces.push((Some(prefix.to_string()), uri.to_string()));
        self.raw_start = None;
    }

    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.name.matches(namespace, local)
    }

    pub fn is_wml(&self, local: &str) -> bool {
        self.is(ns::WML, local)
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attr(&self, namespace: &str, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.matches(namespace, local))
            .map(|a| a.value.as_str())
    }

    /// Set an attribute. Setting the value it already has is a no-op, so the
    /// original start tag survives.
    pub fn set_attr(&mut self, namespace: &str, local: &str, value: &str) {
        if let Some(existing) = self
            .attributes
            .iter_mut()
            .find(|a| a.name.matches(namespace, local))
        {
            if existing.value == value {
                return;
            }
            existing.value = value.to_string();
        } else {
            self.attributes.push(Attribute {
                name: QName::new(namespace, local),
                value: value.to_string(),
            });
        }
        self.raw_start = None;
    }

    pub fn remove_attr(&mut self, namespace: &str, local: &str) -> bool {
        let before = self.attributes.len();
        self.attributes.retain(|a| !a.name.matches(namespace, local));
        let removed = self.attributes.len() != before;
        if removed {
            self.raw_start = None;
        }
        removed
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn child(&self, namespace: &str, local: &str) -> Option<&Element> {
        self.child_elements().find(|e| e.is(namespace, local))
    }

    pub fn child_mut(&mut self, namespace: &str, local: &str) -> Option<&mut Element> {
        self.child_elements_mut().find(|e| e.is(namespace, local))
    }

    /// Index into `children` of the first element named `namespace:local`.
    pub fn position(&self, namespace: &str, local: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|n| matches!(n, Node::Element(e) if e.is(namespace, local)))
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    pub fn insert(&mut self, index: usize, child: Element) {
        let index = index.min(self.children.len());
        self.children.insert(index, Node::Element(child));
    }

    /// Remove every child element named `namespace:local`; returns how many went.
    pub fn remove_children(&mut self, namespace: &str, local: &str) -> usize {
        let before = self.children.len();
        self.children
            .retain(|n| !matches!(n, Node::Element(e) if e.is(namespace, local)));
        before - self.children.len()
    }

    /// Follow a path of child indices (into `children`) down the tree.
    pub fn at_path(&self, path: &[usize]) -> Option<&Element> {
        let mut cur = self;
        for &i in path {
            cur = match cur.children.get(i)? {
                Node::Element(e) => e,
                _ => return None,
            };
        }
        Some(cur)
    }

    pub fn at_path_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let mut cur = self;
        for &i in path {
            cur = match cur.children.get_mut(i)? {
                Node::Element(e) => e,
                _ => return None,
            };
        }
        Some(cur)
    }

    /// Concatenated text of the direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                Node::Text(t) | Node::SourceText { text: t, .. } => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn set_text(&mut self, text: &str) {
        self.children.clear();
        if !text.is_empty() {
            self.children.push(Node::Text(text.to_string()));
        }
    }

    /// True if any descendant element (not `self`) is `namespace:local`.
    pub fn contains(&self, namespace: &str, local: &str) -> bool {
        self.child_elements()
            .any(|e| e.is(namespace, local) || e.contains(namespace, local))
    }

    /// Remove matching elements at any depth below `self`.
    pub fn strip_descendants(&mut self, namespace: &str, local: &str) {
        self.remove_children(namespace, local);
        for child in self.child_elements_mut() {
            child.strip_descendants(namespace, local);
        }
    }

    /// Apply `f` to `self` and every descendant element.
    pub fn for_each_mut(&mut self, f: &mut impl FnMut(&mut Element)) {
        f(self);
        for child in self.child_elements_mut() {
            child.for_each_mut(f);
        }
    }

    fn write_to(&self, out: &mut String) {
        match &self.raw_start {
            Some(raw) => {
                let self_closing = raw.ends_with("/>");
                if self.children.is_empty() {
                    out.push_str(raw);
                    if !self_closing {
                        self.write_end(out);
                    }
                    return;
                }
                if self_closing {
                    out.push_str(raw[..raw.len() - 2].trim_end());
                    out.push('>');
                } else {
                    out.push_str(raw);
                }
            }
            None => {
                out.push('<');
                self.name.write_to(out);
                for (prefix, uri) in &self.namespaces {
                    out.push_str(" xmlns");
                    if let Some(p) = prefix {
                        out.push(':');
                        out.push_str(p);
                    }
                    out.push_str("=\"");
                    escape_attr(uri, out);
                    out.push('"');
                }
                for a in &self.attributes {
                    out.push(' ');
                    a.name.write_to(out);
                    out.push_str("=\"");
                    escape_attr(&a.value, out);
                    out.push('"');
                }
                if self.children.is_empty() {
                    out.push_str("/>");
                    return;
                }
                out.push('>');
            }
        }
        for child in &self.children {
            match child {
                Node::Element(e) => e.write_to(out),
                Node::Text(t) => escape_text(t, out),
                Node::SourceText { raw, .. } => out.push_str(raw),
                Node::Comment(c) => {
                    out.push_str("<!--");
                    out.push_str(c);
                    out.push_str("-->");
                }
                Node::Pi { target, value } => {
                    out.push_str("<?");
                    out.push_str(target);
                    if let Some(v) = value {
                        out.push(' ');
                        out.push_str(v);
                    }
                    out.push_str("?>");
                }
            }
        }
        self.write_end(out);
    }

    fn write_end(&self, out: &mut String) {
        out.push_str("</");
        self.name.write_to(out);
        out.push('>');
    }

    pub fn to_xml_string(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }
}

/// A parsed markup part: everything before the root element (declaration,
/// comments, whitespace) and after it is kept as the original text.
#[derive(Clone, Debug)]
pub struct XmlDocument {
    pub prolog: String,
    pub root: Element,
    pub epilog: String,
}

impl XmlDocument {
    pub fn parse(text: &str) -> Result<Self, roxmltree::Error> {
        let (bom, body) = match text.strip_prefix('\u{feff}') {
            Some(rest) => ("\u{feff}", rest),
            None => ("", text),
        };
        let doc = roxmltree::Document::parse(body)?;
        let root_node = doc.root_element();
        let range = root_node.range();
        Ok(XmlDocument {
            prolog: format!("{bom}{}", &body[..range.start]),
            root: convert_element(root_node, body),
            epilog: body[range.end..].to_string(),
        })
    }

    pub fn parse_bytes(bytes: &[u8]) -> Result<Self, crate::Error> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| crate::Error::Extraction(format!("part is not UTF-8: {e}")))?;
        Ok(Self::parse(text)?)
    }

    pub fn serialize(&self) -> String {
        let mut out = String::with_capacity(self.prolog.len() + 4096);
        out.push_str(&self.prolog);
        self.root.write_to(&mut out);
        out.push_str(&self.epilog);
        out
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.serialize().into_bytes()
    }
}

fn convert_element(node: roxmltree::Node, src: &str) -> Element {
    let start = node.range().start;
    let raw = start_tag(&src[start..]);
    let (qname, attr_names) = scan_start_tag(raw);

    let tag = node.tag_name();
    let (prefix, local) = split_qname(qname);
    let name = QName {
        prefix: prefix.map(str::to_string),
        local: local.to_string(),
        ns: tag.namespace().map(str::to_string),
    };

    let mut namespaces = Vec::new();
    let mut plain_names = Vec::new();
    for (n, value) in &attr_names {
        if *n == "xmlns" {
            namespaces.push((None, value.to_string()));
        } else if let Some(p) = n.strip_prefix("xmlns:") {
            namespaces.push((Some(p.to_string()), value.to_string()));
        } else {
            plain_names.push(*n);
        }
    }

    let attributes: Vec<Attribute> = node
        .attributes()
        .enumerate()
        .map(|(i, a)| {
            let prefix = match plain_names.get(i).map(|n| split_qname(n)) {
                Some((p, l)) if l == a.name() => p.map(str::to_string),
                _ => a.namespace().and_then(|uri| {
                    if uri == ns::XML {
                        Some("xml".to_string())
                    } else {
                        node.lookup_prefix(uri).map(str::to_string)
                    }
                }),
            };
            Attribute {
                name: QName {
                    prefix,
                    local: a.name().to_string(),
                    ns: a.namespace().map(str::to_string),
                },
                value: a.value().to_string(),
            }
        })
        .collect();

    let end = node.range().end;
    let mut cursor = start + raw.len();
    let mut children = Vec::new();
    for child in node.children() {
        if child.is_text() {
            // text runs up to the next sibling, or to the end tag
            let raw_end = match child.next_sibling() {
                Some(next) => next.range().start,
                None => src[cursor..end].rfind("</").map_or(end, |i| cursor + i),
            };
            children.push(Node::SourceText {
                text: child.text().unwrap_or_default().to_string(),
                raw: src[cursor..raw_end].to_string(),
            });
            cursor = raw_end;
            continue;
        }
        cursor = child.range().end;
        if child.is_element() {
            children.push(Node::Element(convert_element(child, src)));
        } else if child.is_comment() {
            children.push(Node::Comment(child.text().unwrap_or_default().to_string()));
        } else if let Some(pi) = child.pi() {
            children.push(Node::Pi {
                target: pi.target.to_string(),
                value: pi.value.map(str::to_string),
            });
        }
    }

    Element {
        name,
        namespaces,
        attributes,
        children,
        raw_start: Some(raw.to_string()),
    }
}

fn split_qname(qname: &str) -> (Option<&str>, &str) {
    match qname.split_once(':') {
        Some((p, l)) => (Some(p), l),
        None => (None, qname),
    }
}

/// The start tag at the beginning of `s`, up to and including the first `>`
/// outside a quoted attribute value.
fn start_tag(s: &str) -> &str {
    let mut quote: Option<u8> = None;
    for (i, b) in s.bytes().enumerate() {
        match (quote, b) {
            (None, b'"' | b'\'') => quote = Some(b),
            (Some(q), _) if q == b => quote = None,
            (None, b'>') => return &s[..=i],
            _ => {}
        }
    }
    s
}

/// Element name and `(attribute name, raw value)` pairs of a start tag, in
/// source order.
fn scan_start_tag(raw: &str) -> (&str, Vec<(&str, &str)>) {
    let inner = raw.trim_start_matches('<');
    let name_end = inner
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .unwrap_or(inner.len());
    let name = &inner[..name_end];
    let mut rest = &inner[name_end..];
    let mut attrs = Vec::new();
    loop {
        rest = rest.trim_start();
        if rest.is_empty() || rest.starts_with('/') || rest.starts_with('>') {
            break;
        }
        let Some(eq) = rest.find('=') else { break };
        let attr_name = rest[..eq].trim();
        rest = rest[eq + 1..].trim_start();
        let Some(q) = rest.chars().next().filter(|c| *c == '"' || *c == '\'') else {
            break;
        };
        let Some(end) = rest[1..].find(q) else { break };
        attrs.push((attr_name, &rest[1..1 + end]));
        rest = &rest[end + 2..];
    }
    (name, attrs)
}

fn escape_text(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}
