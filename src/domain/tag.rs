//! Tags: immutable element values positioned in an arena tree.
//!
//! A [`Tag`] does not extend the tree; it holds a [`TreeNode`] handle whose value is
//! the tag's immutable [`TagData`]. All structural growth goes through
//! [`Tag::add_child`], which is the one place the single-parent and acyclicity rules
//! are checked.

use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use tracing::{instrument, trace};

use crate::domain::arena::{ParentClaim, TreeArena, TreeNode};
use crate::domain::error::{DomainError, TreeResult};
use crate::domain::kind::{HtmlTagKind, TagKind};

/// Indentation used by the `Display` rendering.
pub const DEFAULT_INDENT: usize = 3;

/// Arena holding the nodes of tag trees.
pub type TagArena<K = HtmlTagKind> = TreeArena<TagData<K>>;

/// Immutable fields of a tag.
#[derive(Debug, Clone)]
pub struct TagData<K> {
    kind: K,
    id: u64,
    attributes: IndexMap<String, String>,
    text: Option<String>,
}

impl<K: TagKind> TagData<K> {
    pub(crate) fn new(
        kind: K,
        id: u64,
        attributes: IndexMap<String, String>,
        text: Option<String>,
    ) -> Self {
        Self {
            kind,
            id,
            attributes,
            text,
        }
    }

    pub fn kind(&self) -> K {
        self.kind
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn attributes(&self) -> &IndexMap<String, String> {
        &self.attributes
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

/// Text and position do not take part in equality.
impl<K: TagKind> PartialEq for TagData<K> {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.id == other.id && self.attributes == other.attributes
    }
}

impl<K: TagKind> Eq for TagData<K> {}

/// A markup element: kind, id, attributes and optional text, plus its place in a tree.
///
/// Created by [`crate::domain::TagBuilder`] only. Equality compares kind, id and
/// attributes; use [`Tag::same_node`] to compare identity.
pub struct Tag<K: TagKind = HtmlTagKind> {
    node: TreeNode<TagData<K>>,
}

impl<K: TagKind> Clone for Tag<K> {
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
        }
    }
}

impl<K: TagKind> Tag<K> {
    pub(crate) fn from_node(node: TreeNode<TagData<K>>) -> Self {
        Self { node }
    }

    pub fn arena(&self) -> &TagArena<K> {
        self.node.arena()
    }

    pub fn data(&self) -> &TagData<K> {
        self.node.value()
    }

    pub fn kind(&self) -> K {
        self.data().kind
    }

    pub fn id(&self) -> u64 {
        self.data().id
    }

    pub fn attributes(&self) -> &IndexMap<String, String> {
        &self.data().attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.data().attributes.get(name).map(String::as_str)
    }

    pub fn text(&self) -> Option<&str> {
        self.data().text()
    }

    pub fn same_node(&self, other: &Tag<K>) -> bool {
        self.node == other.node
    }

    pub fn parent(&self) -> Option<Tag<K>> {
        self.node.parent().map(Tag::from_node)
    }

    /// Snapshot of the direct children in insertion order.
    pub fn children(&self) -> Vec<Tag<K>> {
        self.node.children().into_iter().map(Tag::from_node).collect()
    }

    pub fn is_root(&self) -> bool {
        self.node.is_root()
    }

    /// Places this tag below `parent`, linking both directions.
    ///
    /// Goes through [`Tag::add_child`], so a tag that already belongs to another
    /// parent is refused. `None` clears the parent slot only.
    #[instrument(level = "trace", skip_all, fields(tag = self.id()))]
    pub fn set_parent(&self, parent: Option<&Tag<K>>) -> TreeResult<()> {
        match parent {
            Some(parent) => parent.add_child(self),
            None => {
                self.node.set_parent(None)?;
                Ok(())
            }
        }
    }

    /// Adds `child` below this tag, linking both directions.
    ///
    /// Re-adding a child of this tag is a no-op. A child that already belongs to a
    /// different parent is refused.
    #[instrument(level = "trace", skip_all, fields(parent = self.id(), child = child.id()))]
    pub fn add_child(&self, child: &Tag<K>) -> TreeResult<()> {
        if child.node.is_ancestor_of(&self.node) {
            return Err(DomainError::illegal_state(format!(
                "{} cannot become a child of itself or its descendant {}",
                child.label(),
                self.label()
            )));
        }
        match child.node.claim_parent(&self.node)? {
            ParentClaim::Claimed | ParentClaim::AlreadyOwned => {
                if self.node.add_child(&child.node)? {
                    trace!("linked {} below {}", child.label(), self.label());
                }
                Ok(())
            }
            ParentClaim::OwnedByOther(owner) => Err(DomainError::illegal_state(format!(
                "tree structure immutable once rooted: {} already belongs to {}",
                child.label(),
                Tag::from_node(owner).label()
            ))),
        }
    }

    /// Pre-order walk of the subtree rooted here.
    pub fn descendants(&self) -> impl Iterator<Item = Tag<K>> {
        self.node.descendants().map(Tag::from_node)
    }

    /// Post-order walk of the subtree rooted here, ending with this tag.
    pub fn post_order(&self) -> impl Iterator<Item = Tag<K>> {
        self.node.post_order().map(Tag::from_node)
    }

    pub fn depth(&self) -> usize {
        self.node.depth()
    }

    pub fn leaves(&self) -> Vec<Tag<K>> {
        self.node.leaves().into_iter().map(Tag::from_node).collect()
    }

    /// Markup-like rendering for diagnostics. Walks the whole subtree on every call.
    pub fn render(&self, indent: usize) -> String {
        let mut lines = Vec::new();
        self.markup_lines(indent, &mut lines);
        lines.join("\n")
    }

    /// `<kind#id>`, short enough for error messages.
    pub fn label(&self) -> String {
        format!("<{}#{}>", self.kind().name(), self.id())
    }

    fn open_tag(&self) -> String {
        let mut open = format!("<{}", self.kind().name());
        for (key, value) in self.attributes() {
            open.push(' ');
            open.push_str(key);
            open.push('=');
            open.push_str(value);
        }
        open.push('>');
        open
    }

    fn markup_lines(&self, indent: usize, lines: &mut Vec<String>) {
        let mut frames = vec![MarkupFrame::Open(self.clone(), 0)];
        while let Some(frame) = frames.pop() {
            match frame {
                MarkupFrame::Open(tag, depth) => {
                    let pad = " ".repeat(depth * indent);
                    lines.push(format!("{pad}{}", tag.open_tag()));
                    if let Some(text) = tag.text().filter(|t| !t.is_empty()) {
                        let text_pad = " ".repeat((depth + 1) * indent);
                        lines.extend(text.lines().map(|line| format!("{text_pad}{line}")));
                    }
                    frames.push(MarkupFrame::Close(tag.kind(), depth));
                    let children = tag.children();
                    frames.extend(
                        children
                            .into_iter()
                            .rev()
                            .map(|child| MarkupFrame::Open(child, depth + 1)),
                    );
                }
                MarkupFrame::Close(kind, depth) => {
                    lines.push(format!("{}</{}>", " ".repeat(depth * indent), kind.name()));
                }
            }
        }
    }
}

enum MarkupFrame<K: TagKind> {
    Open(Tag<K>, usize),
    Close(K, usize),
}

impl<K: TagKind> PartialEq for Tag<K> {
    fn eq(&self, other: &Self) -> bool {
        self.data() == other.data()
    }
}

impl<K: TagKind> Eq for Tag<K> {}

impl<K: TagKind> Hash for Tag<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        self.id().hash(state);
    }
}

impl<K: TagKind> fmt::Debug for Tag<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tag")
            .field("kind", &self.kind())
            .field("id", &self.id())
            .field("attributes", self.attributes())
            .field("text", &self.text())
            .finish()
    }
}

impl<K: TagKind> fmt::Display for Tag<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(DEFAULT_INDENT))
    }
}
