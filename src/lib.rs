//! Concurrent arena-backed tag trees, rebuilt from markup tokenizer event streams.
//!
//! ```
//! use tagtree::application::{assemble, Event};
//! use tagtree::domain::{AssemblerOptions, HtmlTagKind, Tag};
//!
//! # fn main() -> Result<(), tagtree::domain::DomainError> {
//! let events = vec![
//!     Event::start("p", Vec::<(String, String)>::new()),
//!     Event::text("Hello"),
//!     Event::end("p"),
//! ];
//! let root: Tag<HtmlTagKind> = assemble(events, &AssemblerOptions::default())?;
//! assert_eq!(root.text(), Some("Hello"));
//! assert_eq!(root.render(3), "<p>\n   Hello\n</p>");
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;
