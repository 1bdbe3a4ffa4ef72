//! The etymology graph: relation records loaded into adjacency maps, and
//! recursive lookup of a word's ancestry.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::io::BufRead;
use tracing::warn;

use crate::error::Result;
use crate::reference::Word;

/// Relation channels the graph stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationLabel {
    Etymology,
    IsDerivedFrom,
}

impl RelationLabel {
    /// Unknown labels map to `None` and are ignored by the graph.
    pub fn from_str_value(s: &str) -> Option<Self> {
        match s {
            "rel:etymology" => Some(Self::Etymology),
            "rel:is_derived_from" => Some(Self::IsDerivedFrom),
            _ => None,
        }
    }
}

/// A single graph input relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphRecord {
    pub source: Word,
    pub label: RelationLabel,
    pub target: Word,
}

/// Why a graph input line was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineError {
    MissingFields,
    MalformedWord(String),
}

impl GraphRecord {
    /// Parse a `<lang>: <word>\t<label>\t<lang>: <word>` line.
    ///
    /// Lines with a label the graph doesn't store return `Ok(None)`.
    pub fn parse_line(line: &str) -> std::result::Result<Option<Self>, LineError> {
        let mut fields = line.split('\t');
        let (Some(from), Some(label), Some(to)) = (fields.next(), fields.next(), fields.next()) else {
            return Err(LineError::MissingFields);
        };

        let Some(label) = RelationLabel::from_str_value(label) else {
            return Ok(None);
        };

        Ok(Some(GraphRecord {
            source: parse_word(from)?,
            label,
            target: parse_word(to)?,
        }))
    }
}

fn parse_word(field: &str) -> std::result::Result<Word, LineError> {
    let mut parts = field.split(": ");
    match (parts.next(), parts.next()) {
        (Some(language), Some(word)) => Ok(Word::new(language, word)),
        _ => Err(LineError::MalformedWord(field.to_string())),
    }
}

/// A resolved ancestry tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub word: Word,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub derived_from: Vec<Node>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub etymology: Vec<Node>,
    /// The word already appears between the root and this node; not expanded.
    #[serde(skip_serializing_if = "is_false")]
    pub cyclic: bool,
    /// The depth cap was reached before this word's edges were followed.
    #[serde(skip_serializing_if = "is_false")]
    pub truncated: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Node {
    pub fn leaf(word: Word) -> Self {
        Node {
            word,
            derived_from: Vec::new(),
            etymology: Vec::new(),
            cyclic: false,
            truncated: false,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.derived_from.is_empty() && self.etymology.is_empty()
    }
}

// Trees from long chains are as deep as the chain; unlink them without recursing.
impl Drop for Node {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.derived_from);
        pending.append(&mut self.etymology);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.derived_from);
            pending.append(&mut node.etymology);
        }
    }
}

/// Directed relation maps keyed by source word. Built once, then read-only.
#[derive(Debug, Default)]
pub struct EtymologyGraph {
    derived_from_edges: HashMap<Word, Vec<Word>>,
    etymology_edges: HashMap<Word, Vec<Word>>,
    duplicate_derivations: usize,
}

impl EtymologyGraph {
    pub fn from_records(records: impl IntoIterator<Item = GraphRecord>) -> Self {
        let mut graph = EtymologyGraph::default();
        for record in records {
            graph.insert(record);
        }
        graph
    }

    /// Build the graph from a relations file. Malformed lines are logged and
    /// skipped; only read failures are errors.
    pub fn from_reader(reader: impl BufRead) -> Result<Self> {
        let mut graph = EtymologyGraph::default();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            match GraphRecord::parse_line(&line) {
                Ok(Some(record)) => graph.insert(record),
                Ok(None) => {}
                Err(e) => warn!(line = line_no + 1, error = ?e, "skipping malformed relation line"),
            }
        }

        Ok(graph)
    }

    fn insert(&mut self, record: GraphRecord) {
        let edges = match record.label {
            RelationLabel::Etymology => &mut self.etymology_edges,
            RelationLabel::IsDerivedFrom => {
                if self.derived_from_edges.contains_key(&record.source) {
                    warn!(source = %record.source, "duplicate is_derived_from source");
                    self.duplicate_derivations += 1;
                }
                &mut self.derived_from_edges
            }
        };
        edges.entry(record.source).or_default().push(record.target);
    }

    /// How many is-derived-from relations were added to a source that already had one.
    pub fn duplicate_derivations(&self) -> usize {
        self.duplicate_derivations
    }

    pub fn etymology_of(&self, word: &Word) -> &[Word] {
        self.etymology_edges.get(word).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn derived_from(&self, word: &Word) -> &[Word] {
        self.derived_from_edges.get(word).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of (source, target) edges across both channels.
    pub fn edge_count(&self) -> usize {
        self.etymology_edges.values().map(Vec::len).sum::<usize>()
            + self.derived_from_edges.values().map(Vec::len).sum::<usize>()
    }

    /// Resolve the full ancestry tree of `word`.
    ///
    /// A word met again on the path from the root becomes a `cyclic` leaf, so
    /// lookup terminates on any input. The walk keeps its own stack, so long
    /// chains don't grow the call stack.
    pub fn lookup(&self, word: &Word) -> Node {
        self.lookup_bounded(word, None)
    }

    /// Like [`lookup`](Self::lookup), but stops expanding below `max_depth`
    /// levels. Words cut off that still have edges are marked `truncated`.
    pub fn lookup_bounded(&self, word: &Word, max_depth: Option<usize>) -> Node {
        let mut path: HashSet<&Word> = HashSet::new();
        let mut stack = match self.visit(word, &path, max_depth) {
            Visit::Leaf(node) => return node,
            Visit::Expand(frame) => {
                path.insert(frame.word);
                vec![frame]
            }
        };

        while let Some(top) = stack.last_mut() {
            if let Some(child) = top.next_child() {
                match self.visit(child, &path, top.remaining) {
                    Visit::Leaf(node) => top.attach(node),
                    Visit::Expand(frame) => {
                        path.insert(frame.word);
                        stack.push(frame);
                    }
                }
                continue;
            }

            // every edge of the top word is resolved
            let Some(done) = stack.pop() else { break };
            path.remove(done.word);
            match stack.last_mut() {
                Some(parent) => parent.attach(done.node),
                None => return done.node,
            }
        }

        Node::leaf(word.clone())
    }

    fn visit<'a>(&'a self, word: &'a Word, path: &HashSet<&'a Word>, remaining: Option<usize>) -> Visit<'a> {
        let mut node = Node::leaf(word.clone());

        if path.contains(word) {
            node.cyclic = true;
            return Visit::Leaf(node);
        }

        let derived_from = self.derived_from(word);
        let etymology = self.etymology_of(word);

        if remaining == Some(0) {
            node.truncated = !(derived_from.is_empty() && etymology.is_empty());
            return Visit::Leaf(node);
        }

        Visit::Expand(Frame {
            node,
            word,
            derived_from,
            etymology,
            next: 0,
            remaining: remaining.map(|d| d - 1),
        })
    }
}

enum Visit<'a> {
    Leaf(Node),
    Expand(Frame<'a>),
}

/// A word on the current lookup path whose edges are being resolved.
struct Frame<'a> {
    node: Node,
    word: &'a Word,
    derived_from: &'a [Word],
    etymology: &'a [Word],
    /// Edges handed out so far; derived-from edges come before etymology edges.
    next: usize,
    /// Depth budget left for this word's children.
    remaining: Option<usize>,
}

impl<'a> Frame<'a> {
    fn next_child(&mut self) -> Option<&'a Word> {
        let (derived_from, etymology) = (self.derived_from, self.etymology);
        let child = match self.next.checked_sub(derived_from.len()) {
            None => derived_from.get(self.next),
            Some(i) => etymology.get(i),
        }?;
        self.next += 1;
        Some(child)
    }

    /// Attach the resolved node for the edge last handed out by `next_child`.
    fn attach(&mut self, child: Node) {
        if self.next <= self.derived_from.len() {
            self.node.derived_from.push(child);
        } else {
            self.node.etymology.push(child);
        }
    }
}
