use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct MarkupError(String);

#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    fn from_start(start: &BytesStart<'_>) -> Self {
        let mut element = Self::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
        for attr in start.attributes().with_checks(false).flatten() {
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = match attr.unescape_value() {
                Ok(value) => value.into_owned(),
                Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
            };
            element.attributes.push((key, value));
        }
        element
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    /// First descendant named `name`, in document order.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.find_where(name, |_| true)
    }

    pub fn find_where<P>(&self, name: &str, predicate: P) -> Option<&Element>
    where
        P: Fn(&Element) -> bool,
    {
        let mut stack: Vec<&Element> = self.child_elements().collect();
        stack.reverse();
        while let Some(element) = stack.pop() {
            if element.name == name && predicate(element) {
                return Some(element);
            }
            let start = stack.len();
            stack.extend(element.child_elements());
            stack[start..].reverse();
        }
        None
    }

    pub fn find_all(&self, name: &str) -> Vec<&Element> {
        let mut out = Vec::new();
        collect_named(self, name, &mut out);
        out
    }

    pub fn text(&self) -> String {
        let mut out = String::new();
        push_text(self, None, &mut out);
        out
    }

    /// Concatenated character data up to (not including) the first descendant
    /// element named `stop`. Everything from that element onward is dropped.
    pub fn text_before(&self, stop: &str) -> String {
        let mut out = String::new();
        push_text(self, Some(stop), &mut out);
        out
    }

    pub fn comments(&self) -> Vec<&str> {
        let mut out = Vec::new();
        collect_comments(self, &mut out);
        out
    }
}

fn collect_named<'a>(element: &'a Element, name: &str, out: &mut Vec<&'a Element>) {
    for child in element.child_elements() {
        if child.name == name {
            out.push(child);
        }
        collect_named(child, name, out);
    }
}

// Returns false once `stop` has been reached.
fn push_text(element: &Element, stop: Option<&str>, out: &mut String) -> bool {
    for node in &element.children {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Comment(_) => {}
            Node::Element(child) => {
                if stop.is_some_and(|name| child.name == name) {
                    return false;
                }
                if !push_text(child, stop, out) {
                    return false;
                }
            }
        }
    }
    true
}

fn collect_comments<'a>(element: &'a Element, out: &mut Vec<&'a str>) {
    for node in &element.children {
        match node {
            Node::Comment(text) => out.push(text.as_str()),
            Node::Element(child) => collect_comments(child, out),
            Node::Text(_) => {}
        }
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    pub root: Element,
}

impl Document {
    pub fn parse(xml: &str) -> Result<Self, MarkupError> {
        let mut reader = Reader::from_str(xml);
        let mut stack = vec![Element::new("#document")];

        loop {
            match reader.read_event() {
                Ok(Event::Start(start)) => stack.push(Element::from_start(&start)),
                Ok(Event::Empty(start)) => attach(&mut stack, Node::Element(Element::from_start(&start))),
                Ok(Event::End(_)) => {
                    if stack.len() < 2 {
                        return Err(MarkupError(format!(
                            "unbalanced end tag at byte {}",
                            reader.buffer_position()
                        )));
                    }
                    if let Some(element) = stack.pop() {
                        attach(&mut stack, Node::Element(element));
                    }
                }
                Ok(Event::Text(text)) => {
                    let value = match text.unescape() {
                        Ok(value) => value.into_owned(),
                        // unknown named entities (e.g. HTML ones) are kept verbatim
                        Err(_) => String::from_utf8_lossy(&text).into_owned(),
                    };
                    attach(&mut stack, Node::Text(value));
                }
                Ok(Event::CData(data)) => {
                    attach(&mut stack, Node::Text(String::from_utf8_lossy(&data).into_owned()));
                }
                Ok(Event::Comment(comment)) => {
                    attach(&mut stack, Node::Comment(String::from_utf8_lossy(&comment).into_owned()));
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(err) => {
                    return Err(MarkupError(format!(
                        "XML error at byte {}: {err}",
                        reader.buffer_position()
                    )));
                }
            }
        }

        if stack.len() != 1 {
            return Err(MarkupError("document ended inside an open element".to_string()));
        }
        let root = stack.pop().unwrap_or_default();
        Ok(Self { root })
    }
}

fn attach(stack: &mut [Element], node: Node) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

// Streaming, so a comment placed before malformed content is still seen.
pub fn scan_comments(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    let mut comments = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Comment(comment)) => {
                comments.push(String::from_utf8_lossy(&comment).into_owned());
            }
            Ok(Event::Eof) | Err(_) => break,
            Ok(_) => {}
        }
    }
    comments
}
