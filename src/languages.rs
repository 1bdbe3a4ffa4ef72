//! Mapping of language section names ("English", "Old English") to codes.

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

use crate::error::{EtymologyError, Result};

/// Resolve a display language name to its normalised code.
pub trait LanguageCodes {
    fn code_from_name(&self, name: &str) -> Option<String>;
}

// Language table YAML structures

#[derive(Debug, Deserialize)]
struct LanguageSchema {
    languages: Vec<LanguageEntry>,
}

#[derive(Debug, Deserialize)]
struct LanguageEntry {
    code: String,
    names: Vec<String>,
}

/// Name to code table, keyed by NFC-normalised, trimmed names.
#[derive(Debug, Clone, Default)]
pub struct LanguageTable {
    codes: HashMap<String, String>,
}

static BUILTIN: Lazy<LanguageTable> = Lazy::new(|| {
    LanguageTable::from_pairs([
        ("en", "English"),
        ("enm", "Middle English"),
        ("ang", "Old English"),
        ("sco", "Scots"),
        ("fr", "French"),
        ("frm", "Middle French"),
        ("fro", "Old French"),
        ("de", "German"),
        ("gmh", "Middle High German"),
        ("goh", "Old High German"),
        ("nl", "Dutch"),
        ("dum", "Middle Dutch"),
        ("odt", "Old Dutch"),
        ("non", "Old Norse"),
        ("sv", "Swedish"),
        ("da", "Danish"),
        ("nb", "Norwegian Bokmål"),
        ("is", "Icelandic"),
        ("got", "Gothic"),
        ("la", "Latin"),
        ("la-lat", "Late Latin"),
        ("la-med", "Medieval Latin"),
        ("it", "Italian"),
        ("es", "Spanish"),
        ("pt", "Portuguese"),
        ("ro", "Romanian"),
        ("ca", "Catalan"),
        ("grc", "Ancient Greek"),
        ("el", "Greek"),
        ("ru", "Russian"),
        ("pl", "Polish"),
        ("cs", "Czech"),
        ("ga", "Irish"),
        ("cy", "Welsh"),
        ("fi", "Finnish"),
        ("hu", "Hungarian"),
        ("tr", "Turkish"),
        ("ar", "Arabic"),
        ("he", "Hebrew"),
        ("fa", "Persian"),
        ("sa", "Sanskrit"),
        ("hi", "Hindi"),
        ("zh", "Chinese"),
        ("ja", "Japanese"),
        ("ko", "Korean"),
        ("gem-pro", "Proto-Germanic"),
        ("ine-pro", "Proto-Indo-European"),
        ("itc-pro", "Proto-Italic"),
        ("sla-pro", "Proto-Slavic"),
        ("mul", "Translingual"),
    ])
});

fn normalize_name(name: &str) -> String {
    name.trim().nfc().collect()
}

impl LanguageTable {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let codes = pairs
            .into_iter()
            .map(|(code, name)| (normalize_name(name), code.to_string()))
            .collect();
        LanguageTable { codes }
    }

    /// Parse a table from YAML text.
    pub fn from_yaml(contents: &str) -> std::result::Result<Self, serde_yaml::Error> {
        let schema: LanguageSchema = serde_yaml::from_str(contents)?;

        let mut codes = HashMap::new();
        for entry in schema.languages {
            for name in entry.names {
                codes.insert(normalize_name(&name), entry.code.clone());
            }
        }

        Ok(LanguageTable { codes })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents).map_err(|source| EtymologyError::LanguageTable {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the table from `path`, or from `schema/languages.yaml` when no
    /// path is given. Falls back to the built-in table if neither exists.
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => match find_schema_file("languages.yaml") {
                Ok(p) => {
                    tracing::info!("Loading language table from: {}", p.display());
                    Self::load(&p)
                }
                Err(_) => {
                    tracing::info!("No language table found, using built-in table");
                    Ok(Self::builtin().clone())
                }
            },
        }
    }

    pub fn builtin() -> &'static LanguageTable {
        &BUILTIN
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl LanguageCodes for LanguageTable {
    fn code_from_name(&self, name: &str) -> Option<String> {
        self.codes.get(&normalize_name(name)).cloned()
    }
}

fn find_schema_file(filename: &str) -> Result<PathBuf> {
    let candidates = [
        PathBuf::from(format!("schema/{}", filename)),
        PathBuf::from(format!("../schema/{}", filename)),
    ];
    candidates
        .into_iter()
        .find(|p| p.exists())
        .ok_or_else(|| EtymologyError::LanguageTableNotFound(format!("schema/{}", filename)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_knows_common_languages() {
        let table = LanguageTable::builtin();
        assert_eq!(table.code_from_name("English"), Some("en".to_string()));
        assert_eq!(table.code_from_name("Old English"), Some("ang".to_string()));
        assert_eq!(table.code_from_name("Klingon"), None);
    }

    #[test]
    fn lookup_trims_whitespace() {
        let table = LanguageTable::builtin();
        assert_eq!(table.code_from_name(" Latin "), Some("la".to_string()));
    }

    #[test]
    fn lookup_normalizes_to_nfc() {
        let table = LanguageTable::from_pairs([("nb", "Norwegian Bokmål")]);
        // "a" followed by a combining ring above
        assert_eq!(table.code_from_name("Norwegian Bokma\u{030A}l"), Some("nb".to_string()));
    }

    #[test]
    fn yaml_table_maps_every_name() {
        let yaml = "languages:\n  - code: nds\n    names: [Low German, Low Saxon]\n  - code: fy\n    names: [West Frisian]\n";
        let table = LanguageTable::from_yaml(yaml).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.code_from_name("Low Saxon"), Some("nds".to_string()));
        assert_eq!(table.code_from_name("West Frisian"), Some("fy".to_string()));
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        assert!(LanguageTable::from_yaml("languages: 3").is_err());
    }

    #[test]
    fn load_reports_path_on_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("languages.yaml");
        std::fs::write(&path, "not: [valid").unwrap();
        match LanguageTable::load(&path) {
            Err(EtymologyError::LanguageTable { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected result: {:?}", other.map(|t| t.len())),
        }
    }
}
