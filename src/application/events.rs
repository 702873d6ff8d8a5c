//! Recorded tokenizer event streams.
//!
//! On disk an event stream is JSON lines, one event per line:
//!
//! ```text
//! {"event":"start","name":"div","attributes":{"id":"x"}}
//! {"event":"text","text":"hi"}
//! {"event":"end","name":"div"}
//! ```

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{AssemblerOptions, EventSink, StackAssembler, Tag, TagKind, TreeResult};

/// One tokenizer event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum Event {
    Start {
        name: String,
        #[serde(default)]
        attributes: IndexMap<String, String>,
    },
    Text {
        text: String,
    },
    End {
        name: String,
    },
}

impl Event {
    pub fn start<I, N, V>(name: impl Into<String>, attributes: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        Event::Start {
            name: name.into(),
            attributes: attributes
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Event::Text { text: text.into() }
    }

    pub fn end(name: impl Into<String>) -> Self {
        Event::End { name: name.into() }
    }

    /// Delivers this event to `sink`.
    pub fn apply<S: EventSink + ?Sized>(self, sink: &mut S) -> TreeResult<()> {
        match self {
            Event::Start { name, attributes } => sink.start_element(&name, attributes),
            Event::Text { text } => sink.characters(&text),
            Event::End { name } => sink.end_element(&name),
        }
    }
}

/// Decodes a JSON-lines event stream. Blank lines are skipped.
pub fn parse_events<R: BufRead>(reader: R) -> ApplicationResult<Vec<Event>> {
    let mut events = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| ApplicationError::io("read event stream", e))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let event = serde_json::from_str(line).map_err(|source| ApplicationError::EventDecode {
            line: number + 1,
            source,
        })?;
        events.push(event);
    }
    Ok(events)
}

/// Reads an event stream from `path`, or from stdin when `path` is `-`.
#[instrument(level = "debug")]
pub fn read_events(path: &Path) -> ApplicationResult<Vec<Event>> {
    let events = if path == Path::new("-") {
        parse_events(io::stdin().lock())?
    } else {
        let file = File::open(path).with_path_context("open event stream", path)?;
        parse_events(BufReader::new(file))?
    };
    debug!(count = events.len(), "read events");
    Ok(events)
}

/// Runs `events` through a fresh [`StackAssembler`] and returns the document root.
#[instrument(level = "debug", skip_all)]
pub fn assemble<K: TagKind>(
    events: impl IntoIterator<Item = Event>,
    options: &AssemblerOptions,
) -> TreeResult<Tag<K>> {
    let started = Instant::now();
    let mut assembler = StackAssembler::<K>::with_options(options.clone());
    let mut count = 0usize;
    for event in events {
        event.apply(&mut assembler)?;
        count += 1;
    }
    let root = assembler.finish()?;
    info!(
        events = count,
        nodes = root.arena().len(),
        elapsed_ms = started.elapsed().as_secs_f64() * 1e3,
        "assembled document"
    );
    Ok(root)
}
