// src/annotate.rs
//
// HTML fragment → same fragment with default presentation classes merged in.
//
// - Every element is visited in document order, parent before children.
// - Mapped tags get each missing default token appended to their class list; existing
//   tokens keep their order and are never duplicated, so a second pass is a no-op.
// - script/style never receive classes. Descendants of OPAQUE tags (pre, noscript,
//   script, style) are copied as-is: the container is annotated, its contents are not.
// - Unmapped tags are left untouched, their children are still visited.

use std::marker::PhantomData;

use crate::classes::ClassMap;
use crate::coerce::coerce;
use crate::tree::{HtmlFragment, MarkupTree};

fn is_skipped(tag: &str) -> bool {
    tag.eq_ignore_ascii_case("script") || tag.eq_ignore_ascii_case("style")
}

fn is_opaque(tag: &str) -> bool {
    ["pre", "noscript", "script", "style"]
        .iter()
        .any(|t| tag.eq_ignore_ascii_case(t))
}

/// Injects a [`ClassMap`]'s classes into HTML fragments parsed with `T`.
pub struct Annotator<T = HtmlFragment> {
    classes: ClassMap,
    tree: PhantomData<fn() -> T>,
}

impl Annotator {
    pub fn new(classes: ClassMap) -> Self {
        Self::with_tree(classes)
    }
}

impl<T: MarkupTree> Default for Annotator<T> {
    fn default() -> Self {
        Self::with_tree(ClassMap::default())
    }
}

impl<T: MarkupTree> Annotator<T> {
    /// An annotator over a specific [`MarkupTree`] implementation.
    pub fn with_tree(classes: ClassMap) -> Self {
        Self {
            classes,
            tree: PhantomData,
        }
    }

    /// Merge default classes into every mapped element of `html`.
    ///
    /// Blank input yields `""`. If the tree cannot be serialized the input is returned
    /// unchanged.
    pub fn annotate(&self, html: &str) -> String {
        if html.trim().is_empty() {
            return String::new();
        }

        let mut tree = T::parse(html);
        let added = self.inject(&mut tree);

        match tree.serialize() {
            Ok(out) => {
                log::debug!("annotate: added {added} class tokens");
                out
            }
            Err(err) => {
                log::warn!("annotate: serialization failed ({err}); returning input as-is");
                html.to_string()
            }
        }
    }

    /// [`coerce`] `raw`, then [`Annotator::annotate`] the result.
    pub fn render(&self, raw: &str) -> String {
        self.annotate(&coerce(raw))
    }

    /// Returns the number of tokens added.
    fn inject(&self, tree: &mut T) -> usize {
        let mut added = 0usize;
        // (node, inside an opaque element)
        let mut stack = vec![(tree.root(), false)];

        while let Some((node, opaque)) = stack.pop() {
            let mut child_opaque = opaque;

            if let Some(tag) = tree.tag_name(&node) {
                if !opaque && !is_skipped(&tag) {
                    added += self.merge_classes(tree, &node, &tag);
                }
                child_opaque |= is_opaque(&tag);
            }

            let children = tree.children(&node);
            stack.extend(children.into_iter().rev().map(|c| (c, child_opaque)));
        }
        added
    }

    fn merge_classes(&self, tree: &mut T, node: &T::Node, tag: &str) -> usize {
        let Some(defaults) = self.classes.classes_for(tag) else {
            return 0;
        };
        let mut present = tree.classes(node);
        let mut added = 0usize;
        for token in defaults {
            if present.iter().any(|c| c == token) {
                continue;
            }
            tree.add_class(node, token);
            present.push(token.to_string());
            added += 1;
        }
        if added > 0 {
            log::trace!("annotate: <{tag}> +{added}");
        }
        added
    }
}

/// [`Annotator::annotate`] with the default class map.
pub fn annotate(html: &str) -> String {
    Annotator::new(ClassMap::default()).annotate(html)
}
