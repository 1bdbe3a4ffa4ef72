//! Splitting raw entry wikitext into per-language etymology text.

use std::collections::BTreeMap;
use tracing::debug;

use crate::languages::LanguageCodes;

const ETYMOLOGY_HEADER: &str = "===Etymology===";

/// Collect the `===Etymology===` subsections of an entry, keyed by language code.
///
/// Lines shorter than four bytes are ignored, which also skips stray or empty
/// header lines. Text under a language whose name has no code is dropped.
pub fn split_etymology_sections(text: &str, languages: &dyn LanguageCodes) -> BTreeMap<String, String> {
    let mut sections: BTreeMap<String, String> = BTreeMap::new();
    let mut current_language = String::new();
    let mut in_etymology = false;

    for line in text.split('\n') {
        let bytes = line.as_bytes();
        if bytes.len() < 4 {
            continue;
        }

        if bytes[0] == b'=' && bytes[1] == b'=' && bytes[2] != b'=' {
            current_language = String::from_utf8_lossy(&bytes[2..bytes.len() - 2]).into_owned();
            // A new language always closes the etymology subsection; otherwise the next
            // language's prelude lines would be filed under its code until a `=` line.
            in_etymology = false;
            continue;
        }

        if line == ETYMOLOGY_HEADER {
            in_etymology = true;
            continue;
        }

        if bytes[0] == b'=' {
            in_etymology = false;
            continue;
        }

        if in_etymology {
            let Some(code) = languages.code_from_name(&current_language) else {
                debug!(language = %current_language, "couldn't find code for language");
                continue;
            };

            let section = sections.entry(code).or_default();
            section.push_str(line);
            section.push('\n');
        }
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::LanguageTable;
    use pretty_assertions::assert_eq;

    fn table() -> LanguageTable {
        LanguageTable::from_pairs([("en", "English"), ("de", "German")])
    }

    #[test]
    fn collects_etymology_lines_per_language() {
        let text = "==English==\n===Etymology===\nFrom {{inh|en|enm|dogge}}.\nMore text.\n===Noun===\n# a dog\n\
                    ==German==\n===Etymology===\nFrom {{inh|de|gmh|hunt}}.\n";
        let sections = split_etymology_sections(text, &table());

        assert_eq!(sections.len(), 2);
        assert_eq!(sections["en"], "From {{inh|en|enm|dogge}}.\nMore text.\n");
        assert_eq!(sections["de"], "From {{inh|de|gmh|hunt}}.\n");
    }

    #[test]
    fn output_is_ordered_by_code() {
        let text = "==German==\n===Etymology===\nGerman text\n==English==\n===Etymology===\nEnglish text\n";
        let codes: Vec<_> = split_etymology_sections(text, &table()).into_keys().collect();
        assert_eq!(codes, vec!["de", "en"]);
    }

    #[test]
    fn numbered_etymology_headers_do_not_open_a_section() {
        let text = "==English==\n===Etymology 1===\nFrom {{inh|en|enm|dogge}}.\n";
        assert!(split_etymology_sections(text, &table()).is_empty());
    }

    #[test]
    fn lower_level_header_closes_section() {
        let text = "==English==\n===Etymology===\nkept line\n====Usage notes====\ndropped line\n";
        let sections = split_etymology_sections(text, &table());
        assert_eq!(sections["en"], "kept line\n");
    }

    #[test]
    fn language_header_closes_section() {
        let text = "==English==\n===Etymology===\nkept line\n==German==\nnot etymology\n";
        let sections = split_etymology_sections(text, &table());
        assert_eq!(sections.len(), 1);
        assert_eq!(sections["en"], "kept line\n");
    }

    #[test]
    fn unknown_language_is_skipped() {
        let text = "==Klingon==\n===Etymology===\nFrom somewhere.\n==English==\n===Etymology===\nFrom here.\n";
        let sections = split_etymology_sections(text, &table());
        assert_eq!(sections.len(), 1);
        assert_eq!(sections["en"], "From here.\n");
    }

    #[test]
    fn short_lines_are_skipped() {
        let text = "==English==\n===Etymology===\nab\nabcd\n\n";
        let sections = split_etymology_sections(text, &table());
        assert_eq!(sections["en"], "abcd\n");
    }
}
