//! Etymology relation extraction from Wiktionary dumps.
//!
//! Entry text is split into per-language etymology sections, each section is
//! trimmed to its useful clause, and the templates found there are parsed
//! into typed references. The resulting relation records can be loaded into an
//! [`EtymologyGraph`] and resolved into ancestry trees.

pub mod dump;
pub mod error;
pub mod extract;
pub mod graph;
pub mod languages;
pub mod locator;
pub mod output;
pub mod parallel;
pub mod reference;
pub mod sections;
pub mod template;

pub use error::{EtymologyError, Result};
pub use extract::{extract_relations, RelationRecord};
pub use graph::{EtymologyGraph, GraphRecord, Node, RelationLabel};
pub use languages::{LanguageCodes, LanguageTable};
pub use reference::{dedup_references, Reference, RelationKind, Word};
pub use template::parse_template;
