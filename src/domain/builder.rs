//! Builder that accumulates a tag's fields and finalizes it into an arena.

use indexmap::IndexMap;
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, TreeResult};
use crate::domain::kind::{HtmlTagKind, TagKind};
use crate::domain::tag::{Tag, TagArena, TagData};

/// Mutable accumulator for a [`Tag`].
///
/// Kind and id are required. Text defaults to the empty string; `None` is a legal
/// value meaning "no text at all". `build` consumes the builder, so a builder
/// finalizes at most once.
pub struct TagBuilder<K: TagKind = HtmlTagKind> {
    arena: TagArena<K>,
    kind: Option<K>,
    id: Option<u64>,
    text: Option<String>,
    attributes: IndexMap<String, String>,
    children: Vec<Tag<K>>,
}

impl<K: TagKind> TagBuilder<K> {
    pub fn new(arena: &TagArena<K>) -> Self {
        Self {
            arena: arena.clone(),
            kind: None,
            id: None,
            text: Some(String::new()),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    pub fn of_type(mut self, kind: K) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn without_text(mut self) -> Self {
        self.text = None;
        self
    }

    /// Replaces the attribute map. Later duplicates of a key win.
    pub fn with_attributes<I, N, V>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        self.attributes = attributes
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect();
        self
    }

    pub fn set_text(&mut self, text: Option<String>) {
        self.text = text;
    }

    pub fn append_text(&mut self, text: &str) {
        self.text.get_or_insert_with(String::new).push_str(text);
    }

    /// Registers a finished tag to be linked below this one once it is built.
    pub fn and_child(&mut self, tag: Tag<K>) -> TreeResult<()> {
        if !tag.arena().same_arena(&self.arena) {
            return Err(DomainError::invalid_argument(format!(
                "child {} belongs to a different arena",
                tag.label()
            )));
        }
        self.children.push(tag);
        Ok(())
    }

    pub fn kind(&self) -> Option<K> {
        self.kind
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn pending_children(&self) -> usize {
        self.children.len()
    }

    /// Validates, stores the tag in the arena and links the registered children in
    /// registration order.
    ///
    /// Every missing field is reported in one [`DomainError::IncompleteBuilder`].
    #[instrument(level = "trace", skip(self), fields(kind = ?self.kind, id = ?self.id))]
    pub fn build(self) -> TreeResult<Tag<K>> {
        let mut missing = Vec::new();
        if self.kind.is_none() {
            missing.push("tag kind".to_string());
        }
        if self.id.is_none() {
            missing.push("tag id".to_string());
        }
        let (Some(kind), Some(id)) = (self.kind, self.id) else {
            debug!(?missing, "refusing to build incomplete tag");
            return Err(DomainError::IncompleteBuilder { missing });
        };

        let data = TagData::new(kind, id, self.attributes, self.text);
        let tag = Tag::from_node(self.arena.create(data));
        for child in &self.children {
            tag.add_child(child)?;
        }
        Ok(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_reports_all_missing_fields_at_once() {
        let arena: TagArena = TagArena::new();
        let err = TagBuilder::new(&arena).build().unwrap_err();
        assert_eq!(
            err,
            DomainError::IncompleteBuilder {
                missing: vec!["tag kind".into(), "tag id".into()]
            }
        );
        assert!(arena.is_empty());
    }

    #[test]
    fn build_reports_single_missing_field() {
        let arena = TagArena::new();
        let err = TagBuilder::new(&arena)
            .of_type(HtmlTagKind::P)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::IncompleteBuilder {
                missing: vec!["tag id".into()]
            }
        );
    }

    #[test]
    fn text_defaults_to_empty_and_may_be_absent() {
        let arena = TagArena::new();
        let with_default = TagBuilder::new(&arena)
            .of_type(HtmlTagKind::P)
            .with_id(0)
            .build()
            .unwrap();
        assert_eq!(with_default.text(), Some(""));

        let without = TagBuilder::new(&arena)
            .of_type(HtmlTagKind::P)
            .with_id(1)
            .without_text()
            .build()
            .unwrap();
        assert_eq!(without.text(), None);
    }

    #[test]
    fn append_text_starts_from_absent_text() {
        let arena: TagArena = TagArena::new();
        let mut builder = TagBuilder::new(&arena).without_text();
        builder.append_text("a");
        builder.append_text("b");
        assert_eq!(builder.text(), Some("ab"));
    }

    #[test]
    fn duplicate_attribute_keys_keep_last_value() {
        let arena = TagArena::new();
        let tag = TagBuilder::new(&arena)
            .of_type(HtmlTagKind::A)
            .with_id(0)
            .with_attributes([("href", "first"), ("rel", "x"), ("href", "second")])
            .build()
            .unwrap();
        assert_eq!(tag.attribute("href"), Some("second"));
        assert_eq!(tag.attributes().len(), 2);
    }

    #[test]
    fn children_from_other_arena_are_rejected() {
        let ours = TagArena::new();
        let theirs = TagArena::new();
        let foreign = TagBuilder::new(&theirs)
            .of_type(HtmlTagKind::Li)
            .with_id(0)
            .build()
            .unwrap();
        let mut builder = TagBuilder::new(&ours).of_type(HtmlTagKind::Ul).with_id(1);
        assert!(matches!(
            builder.and_child(foreign),
            Err(DomainError::InvalidArgument(_))
        ));
        assert_eq!(builder.pending_children(), 0);
    }

    #[test]
    fn build_links_children_in_registration_order() {
        let arena = TagArena::new();
        let first = TagBuilder::new(&arena)
            .of_type(HtmlTagKind::Li)
            .with_id(1)
            .build()
            .unwrap();
        let second = TagBuilder::new(&arena)
            .of_type(HtmlTagKind::Li)
            .with_id(2)
            .build()
            .unwrap();

        let mut builder = TagBuilder::new(&arena).of_type(HtmlTagKind::Ul).with_id(0);
        builder.and_child(first.clone()).unwrap();
        builder.and_child(second.clone()).unwrap();
        let list = builder.build().unwrap();

        assert_eq!(list.children(), vec![first.clone(), second]);
        assert!(first.parent().unwrap().same_node(&list));
    }
}
