//! Stack machine that turns a flat stream of element events into one rooted tag tree.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace, warn};

use crate::domain::builder::TagBuilder;
use crate::domain::error::{DomainError, TreeResult};
use crate::domain::kind::{HtmlTagKind, TagKind};
use crate::domain::tag::{Tag, TagArena};

/// Receiver of tokenizer events, delivered in document order.
pub trait EventSink {
    fn start_element(&mut self, name: &str, attributes: IndexMap<String, String>) -> TreeResult<()>;

    fn characters(&mut self, text: &str) -> TreeResult<()>;

    fn end_element(&mut self, name: &str) -> TreeResult<()>;
}

/// How repeated `characters` events for one element combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextMode {
    /// The last chunk wins.
    #[default]
    Replace,
    /// Chunks are concatenated.
    Append,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblerOptions {
    /// Refuse close events whose name resolves to a different kind than the open element.
    pub strict_end_tags: bool,
    /// Log element names that fall back to the default kind.
    pub log_unknown_tags: bool,
    pub text_mode: TextMode,
}

impl Default for AssemblerOptions {
    fn default() -> Self {
        Self {
            strict_end_tags: false,
            log_unknown_tags: true,
            text_mode: TextMode::Replace,
        }
    }
}

/// Rebuilds a tag tree from start/characters/end events.
///
/// Single threaded: one caller drives it in document order. Ids are handed out in
/// the order elements are opened, starting at 0. The first malformed event aborts
/// the assembly for good.
pub struct StackAssembler<K: TagKind = HtmlTagKind> {
    arena: TagArena<K>,
    stack: Vec<TagBuilder<K>>,
    root: Option<Tag<K>>,
    next_id: u64,
    aborted: bool,
    options: AssemblerOptions,
}

impl<K: TagKind> Default for StackAssembler<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: TagKind> StackAssembler<K> {
    pub fn new() -> Self {
        Self::with_options(AssemblerOptions::default())
    }

    pub fn with_options(options: AssemblerOptions) -> Self {
        Self::in_arena(TagArena::new(), options)
    }

    /// Assembles into an existing arena, e.g. to keep several documents together.
    pub fn in_arena(arena: TagArena<K>, options: AssemblerOptions) -> Self {
        Self {
            arena,
            stack: Vec::new(),
            root: None,
            next_id: 0,
            aborted: false,
            options,
        }
    }

    pub fn arena(&self) -> &TagArena<K> {
        &self.arena
    }

    /// Number of elements opened but not yet closed.
    pub fn open_elements(&self) -> usize {
        self.stack.len()
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Ends the assembly and hands out the single root.
    #[instrument(level = "debug", skip(self))]
    pub fn finish(self) -> TreeResult<Tag<K>> {
        if self.aborted {
            return Err(DomainError::malformed("assembly was aborted by an earlier error"));
        }
        if !self.stack.is_empty() {
            let open: Vec<_> = self
                .stack
                .iter()
                .map(|b| b.kind().map_or("?", |k| k.name()))
                .collect();
            return Err(DomainError::malformed(format!(
                "event stream ended with {} unclosed element(s): {}",
                open.len(),
                open.join(" > ")
            )));
        }
        self.root
            .ok_or_else(|| DomainError::malformed("event stream contained no elements"))
    }

    fn check_live(&self) -> TreeResult<()> {
        if self.aborted {
            Err(DomainError::malformed("assembly was aborted by an earlier error"))
        } else {
            Ok(())
        }
    }

    fn abort<T>(&mut self, err: DomainError) -> TreeResult<T> {
        warn!(error = %err, "aborting assembly");
        self.aborted = true;
        self.stack.clear();
        self.root = None;
        Err(err)
    }

    fn resolve(&self, name: &str) -> K {
        match K::from_name(name) {
            Some(kind) => kind,
            None => {
                if self.options.log_unknown_tags {
                    debug!(name, "unknown tag name, using default kind");
                }
                K::DEFAULT
            }
        }
    }
}

impl<K: TagKind> EventSink for StackAssembler<K> {
    #[instrument(level = "trace", skip(self, attributes))]
    fn start_element(&mut self, name: &str, attributes: IndexMap<String, String>) -> TreeResult<()> {
        self.check_live()?;
        if let Some(root) = &self.root {
            let msg = format!("element <{name}> opened after the root {} was closed", root.label());
            return self.abort(DomainError::malformed(msg));
        }

        let kind = self.resolve(name);
        let id = self.next_id;
        self.next_id += 1;

        let mut builder = TagBuilder::new(&self.arena).of_type(kind).with_id(id);
        if !attributes.is_empty() {
            builder = builder.with_attributes(attributes);
        }
        self.stack.push(builder);
        Ok(())
    }

    #[instrument(level = "trace", skip(self, text), fields(len = text.len()))]
    fn characters(&mut self, text: &str) -> TreeResult<()> {
        self.check_live()?;
        let mode = self.options.text_mode;
        match self.stack.last_mut() {
            Some(top) => {
                match mode {
                    TextMode::Replace => top.set_text(Some(text.to_string())),
                    TextMode::Append => top.append_text(text),
                }
                Ok(())
            }
            None if text.trim().is_empty() => {
                trace!("ignoring whitespace outside of any element");
                Ok(())
            }
            None => self.abort(DomainError::malformed(format!(
                "text {text:?} outside of any element"
            ))),
        }
    }

    #[instrument(level = "trace", skip(self))]
    fn end_element(&mut self, name: &str) -> TreeResult<()> {
        self.check_live()?;
        let Some(builder) = self.stack.pop() else {
            return self.abort(DomainError::malformed(format!(
                "close of <{name}> without a matching open element"
            )));
        };

        if let Some(open) = builder.kind() {
            let closing = K::resolve(name);
            if closing != open {
                if self.options.strict_end_tags {
                    return self.abort(DomainError::malformed(format!(
                        "close of <{name}> does not match open <{}>",
                        open.name()
                    )));
                }
                warn!(name, open = open.name(), "close tag does not match open element");
            }
        }

        let tag = match builder.build() {
            Ok(tag) => tag,
            Err(err) => return self.abort(err),
        };

        match self.stack.last_mut() {
            Some(parent) => {
                if let Err(err) = parent.and_child(tag) {
                    return self.abort(err);
                }
            }
            None => {
                debug!(root = %tag.label(), "document root complete");
                self.root = Some(tag);
            }
        }
        Ok(())
    }
}
