//! Per-entry extraction: entry text in, relation records out.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::languages::LanguageCodes;
use crate::locator::locate_references;
use crate::reference::{dedup_references, RelationKind, Word};
use crate::sections::split_etymology_sections;

/// One emitted relation: `source` is the entry's (language, title).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationRecord {
    pub source: Word,
    #[serde(rename = "rel")]
    pub kind: RelationKind,
    pub target: Word,
}

/// Renders the tab-separated emission line, without a trailing newline:
/// `<lang>:<title>\trel:<kind>\t<lang>:<word>`.
impl fmt::Display for RelationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\trel:{}\t{}", self.source, self.kind, self.target)
    }
}

/// Extract every relation one entry makes, language by language in code order.
pub fn extract_relations(title: &str, text: &str, languages: &dyn LanguageCodes) -> Vec<RelationRecord> {
    let mut records = Vec::new();

    for (language, section) in split_etymology_sections(text, languages) {
        let refs = dedup_references(locate_references(&section));
        records.extend(refs.into_iter().map(|r| RelationRecord {
            source: Word::new(language.as_str(), title),
            kind: r.kind,
            target: r.word,
        }));
    }

    records
}
