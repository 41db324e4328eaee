// src/tree.rs
//
// The annotator's view of a parsed fragment.
//
// MarkupTree is the whole surface the annotator needs from a parser: parse, walk, read a
// tag name, read and extend a class list, serialize. HtmlFragment backs it with html5ever
// and an RcDom, and undoes the rewrites HTML5 tree construction makes to valid input:
// - a fragment that opens with table parts is parsed inside a matching table context
// - a <tbody> the parser inserted on its own is unwrapped again
// - <template> contents are moved under the element so they are walked and written back
// - the leading newline the parser strips from pre/textarea/listing is restored
//
// A <p> holding block content is still split by the parser. That input is not
// well-formed HTML, and the split output is stable on a second pass.

use std::io;
use std::rc::Rc;

use html5ever::serialize::{serialize as write_html, SerializeOpts};
use html5ever::tendril::TendrilSink;
use html5ever::{ns, parse_document, Attribute, LocalName, ParseOpts, QualName};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};
use memchr::memchr_iter;

pub trait MarkupTree {
    type Node: Clone;

    /// Parse `html` as a fragment. Never fails; malformed input yields a best-effort tree.
    fn parse(html: &str) -> Self
    where
        Self: Sized;

    /// The container whose children are the fragment's top-level nodes.
    fn root(&self) -> Self::Node;

    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// Tag name for element nodes, `None` for text, comments and the like.
    fn tag_name(&self, node: &Self::Node) -> Option<String>;

    /// Tokens of the `class` attribute, in order. Empty when absent.
    fn classes(&self, node: &Self::Node) -> Vec<String>;

    /// Append `token` to the element's class list, creating the attribute if needed.
    fn add_class(&mut self, node: &Self::Node, token: &str);

    /// The root's children, serialized back to markup.
    fn serialize(&self) -> io::Result<String>;
}

/// Fragments are parsed as the body of a no-quirks document so that `<style>`/`<script>`
/// stay where they were written instead of moving into `<head>`.
const BODY_PREFIX: &str = "<!DOCTYPE html><body>";

/// Elements whose first newline the parser drops.
const LEADING_NEWLINE_TAGS: [&str; 3] = ["pre", "textarea", "listing"];

pub struct HtmlFragment {
    // Owns the document: dropping it detaches every descendant, `root` included.
    _dom: RcDom,
    root: Handle,
}

impl MarkupTree for HtmlFragment {
    type Node = Handle;

    fn parse(html: &str) -> Self {
        let context = context_for(html);
        let mut input = String::with_capacity(BODY_PREFIX.len() + 24 + html.len());
        input.push_str(BODY_PREFIX);
        for tag in context {
            input.push('<');
            input.push_str(tag);
            input.push('>');
        }
        input.push_str(html);

        let dom = parse_document(RcDom::default(), ParseOpts::default()).one(input);
        let body = find_child(&dom.document, "html").and_then(|html| find_child(&html, "body"));
        let root = match body {
            Some(body) => {
                let explicit_tbody = start_tags(html).any(|t| t.eq_ignore_ascii_case(b"tbody"));
                normalize(&body, explicit_tbody);
                context
                    .iter()
                    .try_fold(body.clone(), |node, tag| find_child(&node, tag))
                    .unwrap_or(body)
            }
            None => {
                log::warn!("parsed fragment has no <body>; serializing the whole document");
                dom.document.clone()
            }
        };
        Self { _dom: dom, root }
    }

    fn root(&self) -> Handle {
        self.root.clone()
    }

    fn children(&self, node: &Handle) -> Vec<Handle> {
        node.children.borrow().clone()
    }

    fn tag_name(&self, node: &Handle) -> Option<String> {
        match &node.data {
            NodeData::Element { name, .. } => Some(name.local.to_string()),
            _ => None,
        }
    }

    fn classes(&self, node: &Handle) -> Vec<String> {
        let NodeData::Element { attrs, .. } = &node.data else {
            return Vec::new();
        };
        let attrs = attrs.borrow();
        attrs
            .iter()
            .find(|a| is_class_attr(a))
            .map(|a| a.value.split_whitespace().map(str::to_owned).collect())
            .unwrap_or_default()
    }

    fn add_class(&mut self, node: &Handle, token: &str) {
        let NodeData::Element { attrs, .. } = &node.data else {
            return;
        };
        let mut attrs = attrs.borrow_mut();
        match attrs.iter_mut().find(|a| is_class_attr(a)) {
            Some(attr) => {
                let mut value = attr.value.split_whitespace().collect::<Vec<_>>().join(" ");
                if !value.is_empty() {
                    value.push(' ');
                }
                value.push_str(token);
                attr.value = value.into();
            }
            None => attrs.push(Attribute {
                name: QualName::new(None, ns!(), LocalName::from("class")),
                value: token.to_string().into(),
            }),
        }
    }

    fn serialize(&self) -> io::Result<String> {
        let mut out = Vec::new();
        let handle = SerializableHandle::from(self.root.clone());
        write_html(&mut out, &handle, SerializeOpts::default())?;
        String::from_utf8(out).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

fn is_class_attr(attr: &Attribute) -> bool {
    attr.name.ns == ns!() && &*attr.name.local == "class"
}

fn is_element(node: &Handle, tag: &str) -> bool {
    matches!(&node.data, NodeData::Element { name, .. } if &*name.local == tag)
}

fn find_child(parent: &Handle, tag: &str) -> Option<Handle> {
    parent
        .children
        .borrow()
        .iter()
        .find(|child| is_element(child, tag))
        .cloned()
}

/// Names of the start tags in `html`, in source order, as written.
fn start_tags(html: &str) -> impl Iterator<Item = &[u8]> + '_ {
    let bytes = html.as_bytes();
    memchr_iter(b'<', bytes).filter_map(move |lt| {
        let rest = &bytes[lt + 1..];
        let len = rest.iter().take_while(|b| b.is_ascii_alphanumeric()).count();
        (len > 0 && rest[0].is_ascii_alphabetic()).then(|| &rest[..len])
    })
}

/// Wrapper elements a fragment is parsed inside so that its first element survives.
fn context_for(html: &str) -> &'static [&'static str] {
    let Some(first) = start_tags(html).next() else {
        return &[];
    };
    match first.to_ascii_lowercase().as_slice() {
        b"td" | b"th" => &["table", "tr"],
        b"tr" | b"tbody" | b"thead" | b"tfoot" | b"caption" | b"colgroup" => &["table"],
        b"col" => &["table", "colgroup"],
        _ => &[],
    }
}

fn normalize(root: &Handle, explicit_tbody: bool) {
    let mut stack = vec![root.clone()];
    while let Some(node) = stack.pop() {
        if let NodeData::Element {
            name,
            template_contents,
            ..
        } = &node.data
        {
            let contents = template_contents.borrow_mut().take();
            if let Some(contents) = contents {
                adopt(&node, contents.children.take());
            }
            if LEADING_NEWLINE_TAGS.contains(&&*name.local) {
                restore_leading_newline(&node);
            }
            if !explicit_tbody && &*name.local == "table" {
                unwrap_children(&node, "tbody");
            }
        }
        stack.extend(node.children.borrow().iter().cloned());
    }
}

fn adopt(parent: &Handle, children: Vec<Handle>) {
    for child in &children {
        child.parent.set(Some(Rc::downgrade(parent)));
    }
    parent.children.borrow_mut().extend(children);
}

/// Replace each `tag` child of `parent` with that child's own children.
fn unwrap_children(parent: &Handle, tag: &str) {
    if !parent.children.borrow().iter().any(|c| is_element(c, tag)) {
        return;
    }
    let old = parent.children.take();
    let mut kept = Vec::with_capacity(old.len());
    for child in old {
        if is_element(&child, tag) {
            let grandchildren = child.children.take();
            for grandchild in &grandchildren {
                grandchild.parent.set(Some(Rc::downgrade(parent)));
            }
            kept.extend(grandchildren);
        } else {
            kept.push(child);
        }
    }
    *parent.children.borrow_mut() = kept;
}

fn restore_leading_newline(node: &Handle) {
    let children = node.children.borrow();
    if let Some(NodeData::Text { contents }) = children.first().map(|c| &c.data) {
        let mut contents = contents.borrow_mut();
        if contents.starts_with('\n') {
            let text = format!("\n{}", &**contents);
            *contents = text.into();
        }
    }
}
