//! Domain layer: arena trees, tags and the event assembler
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod assembler;
pub mod builder;
pub mod error;
pub mod kind;
pub mod tag;

pub use arena::{Children, ParentClaim, TreeArena, TreeNode};
pub use assembler::{AssemblerOptions, EventSink, StackAssembler, TextMode};
pub use builder::TagBuilder;
pub use error::{DomainError, TreeResult};
pub use kind::{HtmlTagKind, TagKind};
pub use tag::{Tag, TagArena, TagData, DEFAULT_INDENT};
