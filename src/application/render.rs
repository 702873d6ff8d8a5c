//! Diagnostic views of assembled trees: outlines and statistics.

use std::fmt;

use termtree::Tree;
use tracing::instrument;

use crate::domain::{Tag, TagKind};

/// Longest text excerpt shown in an outline label.
const EXCERPT_CHARS: usize = 40;

/// Conversion into a `termtree` outline for terminal display.
pub trait TreeDisplay {
    fn to_tree_string(&self) -> Tree<String>;
}

impl<K: TagKind> TreeDisplay for Tag<K> {
    #[instrument(level = "trace", skip(self), fields(tag = self.id()))]
    fn to_tree_string(&self) -> Tree<String> {
        // finished subtrees; a tag's children are the last entries when it comes up
        let mut finished: Vec<Tree<String>> = Vec::new();
        for tag in self.post_order() {
            let count = tag.children().len().min(finished.len());
            let leaves = finished.split_off(finished.len() - count);
            finished.push(Tree::new(outline_label(&tag)).with_leaves(leaves));
        }
        finished
            .pop()
            .unwrap_or_else(|| Tree::new(outline_label(self)))
    }
}

/// `kind#id attr=value "text"`, with long text cut short.
pub fn outline_label<K: TagKind>(tag: &Tag<K>) -> String {
    let mut label = format!("{}#{}", tag.kind().name(), tag.id());
    for (key, value) in tag.attributes() {
        label.push_str(&format!(" {key}={value}"));
    }
    if let Some(text) = tag.text().map(str::trim).filter(|t| !t.is_empty()) {
        label.push_str(&format!(" {:?}", excerpt(text)));
    }
    label
}

fn excerpt(text: &str) -> String {
    if text.chars().count() <= EXCERPT_CHARS {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(EXCERPT_CHARS).collect();
    cut.push('…');
    cut
}

/// Shape summary of one tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeStats {
    pub nodes: usize,
    pub depth: usize,
    pub leaves: usize,
    pub max_children: usize,
    /// Elements whose name fell back to the default kind.
    pub unknown: usize,
}

impl TreeStats {
    #[instrument(level = "debug", skip(root))]
    pub fn collect<K: TagKind>(root: &Tag<K>) -> Self {
        let mut stats = TreeStats {
            nodes: 0,
            depth: root.depth(),
            leaves: 0,
            max_children: 0,
            unknown: 0,
        };
        for tag in root.descendants() {
            let children = tag.children().len();
            stats.nodes += 1;
            stats.max_children = stats.max_children.max(children);
            if children == 0 {
                stats.leaves += 1;
            }
            if tag.kind() == K::DEFAULT {
                stats.unknown += 1;
            }
        }
        stats
    }
}

impl fmt::Display for TreeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "nodes:        {}", self.nodes)?;
        writeln!(f, "depth:        {}", self.depth)?;
        writeln!(f, "leaves:       {}", self.leaves)?;
        writeln!(f, "max children: {}", self.max_children)?;
        write!(f, "unknown tags: {}", self.unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{assemble, Event};
    use crate::domain::{AssemblerOptions, HtmlTagKind};

    fn sample() -> Tag<HtmlTagKind> {
        let none = Vec::<(&str, &str)>::new;
        let events = vec![
            Event::start("div", [("id", "x")]),
            Event::start("span", none()),
            Event::text("hi"),
            Event::end("span"),
            Event::start("blink", none()),
            Event::end("blink"),
            Event::end("div"),
        ];
        assemble(events, &AssemblerOptions::default()).unwrap()
    }

    #[test]
    fn outline_lists_children_below_root() {
        let outline = sample().to_tree_string().to_string();
        let lines: Vec<_> = outline.lines().collect();
        assert_eq!(lines[0], "div#0 id=x");
        assert!(lines[1].ends_with("span#1 \"hi\""));
        assert!(lines[2].ends_with("default#2"));
    }

    #[test]
    fn stats_count_shape() {
        let stats = TreeStats::collect(&sample());
        assert_eq!(
            stats,
            TreeStats {
                nodes: 3,
                depth: 2,
                leaves: 2,
                max_children: 2,
                unknown: 1,
            }
        );
    }

    #[test]
    fn outline_of_a_deep_chain_keeps_every_level() {
        let levels = 2_000;
        let mut events: Vec<Event> = (0..levels)
            .map(|_| Event::start("div", Vec::<(&str, &str)>::new()))
            .collect();
        events.extend((0..levels).map(|_| Event::end("div")));
        let root: Tag<HtmlTagKind> = assemble(events, &AssemblerOptions::default()).unwrap();

        let outline = root.to_tree_string();
        let mut level = &outline;
        let mut count = 1;
        while let Some(child) = level.leaves.first() {
            assert_eq!(level.leaves.len(), 1);
            level = child;
            count += 1;
        }
        assert_eq!(count, levels);
        assert_eq!(outline.root, "div#0");
        assert_eq!(level.root, format!("div#{}", levels - 1));
    }

    #[test]
    fn long_text_is_cut() {
        let long = "x".repeat(100);
        let cut = excerpt(&long);
        assert_eq!(cut.chars().count(), EXCERPT_CHARS + 1);
        assert!(cut.ends_with('…'));
    }
}
