//! Words, relation kinds and the references parsed out of etymology templates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A lexical node: a language code plus a surface form.
///
/// Equality is exact and case-sensitive on both fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Word {
    pub language: String,
    pub word: String,
}

impl Word {
    pub fn new(language: impl Into<String>, word: impl Into<String>) -> Self {
        Word {
            language: language.into(),
            word: word.into(),
        }
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.language, self.word)
    }
}

/// How a referenced word relates to the entry it was found in.
///
/// `Component`, `Prefix` and `Suffix` describe composition; `Inherited`,
/// `Borrowed` and `Derived` describe descent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    Component,
    Prefix,
    Suffix,
    Inherited,
    Borrowed,
    Derived,
}

impl RelationKind {
    /// Lower-case name used in emitted relation lines (`rel:<name>`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Component => "component",
            Self::Prefix => "prefix",
            Self::Suffix => "suffix",
            Self::Inherited => "inherited",
            Self::Borrowed => "borrowed",
            Self::Derived => "derived",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outcome of parsing a template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    pub kind: RelationKind,
    pub word: Word,
}

impl Reference {
    pub fn new(kind: RelationKind, language: &str, word: &str) -> Self {
        Reference {
            kind,
            word: Word::new(language, word),
        }
    }
}

/// Remove references equal to an earlier one, keeping first-seen order.
pub fn dedup_references(mut refs: Vec<Reference>) -> Vec<Reference> {
    let mut i = 0;
    while i < refs.len() {
        let mut j = i + 1;
        while j < refs.len() {
            if refs[i] == refs[j] {
                // the next candidate slides into j
                refs.remove(j);
            } else {
                j += 1;
            }
        }
        i += 1;
    }
    refs
}
