//! Application layer: event streams and renderings
//!
//! This layer feeds recorded tokenizer output into the domain assembler and turns
//! finished trees into something a terminal can show.

pub mod error;
pub mod error_ext;
pub mod events;
pub mod render;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use events::{assemble, parse_events, read_events, Event};
pub use render::{TreeDisplay, TreeStats};
