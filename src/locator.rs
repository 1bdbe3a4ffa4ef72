//! Isolating the useful part of an etymology section.
//!
//! Etymology prose usually opens with the templates that matter and trails off
//! into commentary, cognates and further reading. The locator keeps the first
//! clause that contains a template, skipping an introductory clause that has
//! none, and hands the templates in that clause to the template parser.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::reference::Reference;
use crate::template::parse_template;

lazy_static! {
    static ref ROOT_TEMPLATE: Regex = Regex::new(r"\{\{root[^}]*\}\}").unwrap();
    static ref MULTIPLE_IMAGES_TEMPLATE: Regex = Regex::new(r"(?s)\{\{multiple[^}]*\}\}").unwrap();
    static ref WITHIN_PARENS: Regex = Regex::new(r"\([^)]*\)").unwrap();
    static ref TEMPLATE: Regex = Regex::new(r"\{\{[^}]*\}\}").unwrap();
}

/// Brace-depth scanner that finds the clause boundaries.
///
/// `start` and `end` are byte offsets; `end` is exclusive.
#[derive(Debug)]
struct SpanScanner {
    depth: i32,
    start: usize,
    end: usize,
    seen_template: bool,
}

impl SpanScanner {
    fn new(len: usize) -> Self {
        SpanScanner {
            depth: 0,
            start: 0,
            end: len,
            seen_template: false,
        }
    }

    /// Feed one character. Returns false once the end boundary is fixed.
    fn step(&mut self, index: usize, c: char) -> bool {
        match c {
            '{' => {
                self.depth += 1;
                self.seen_template = true;
            }
            '}' => self.depth -= 1,
            ',' | '.' | '\n' if self.depth == 0 => {
                if self.seen_template {
                    self.end = index;
                    return false;
                }
                // still in a template-free prelude
                self.start = index + c.len_utf8();
            }
            _ => {}
        }
        true
    }
}

/// Return the slice of `section` most likely to hold the sourced templates, or
/// `None` when there is no template in it at all.
pub fn useful_span(section: &str) -> Option<&str> {
    let mut scanner = SpanScanner::new(section.len());
    for (i, c) in section.char_indices() {
        if !scanner.step(i, c) {
            break;
        }
    }

    if !scanner.seen_template {
        return None;
    }

    if scanner.end > section.len() {
        debug!(end = scanner.end, len = section.len(), "end boundary past section length");
        return None;
    }

    let span = section.get(scanner.start..scanner.end);
    if span.is_none() {
        debug!(start = scanner.start, end = scanner.end, "invalid section boundaries");
    }
    span
}

/// Find the references made by one language's etymology section.
pub fn locate_references(section: &str) -> Vec<Reference> {
    let section = ROOT_TEMPLATE.replace_all(section, "");
    let section = MULTIPLE_IMAGES_TEMPLATE.replace_all(&section, "");

    let Some(span) = useful_span(&section) else {
        return vec![];
    };
    let span = WITHIN_PARENS.replace_all(span, "");

    TEMPLATE
        .find_iter(&span)
        .flat_map(|m| parse_template(m.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::RelationKind;

    // ─────────────────────────────────────────────────────────────
    // Span boundaries
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn no_template_means_no_span() {
        assert_eq!(useful_span("Of uncertain origin. Compare dog, hound.\n"), None);
        assert_eq!(useful_span(""), None);
    }

    #[test]
    fn span_stops_at_first_comma_after_template() {
        let span = useful_span("From {{inh|en|enm|dogge}}, from {{inh|en|ang|docga}}.");
        assert_eq!(span, Some("From {{inh|en|enm|dogge}}"));
    }

    #[test]
    fn template_free_prelude_is_skipped() {
        let span = useful_span("Uncertain. From {{inh|en|enm|dogge}}.");
        assert_eq!(span, Some(" From {{inh|en|enm|dogge}}"));
    }

    #[test]
    fn punctuation_inside_template_does_not_end_span() {
        let span = useful_span("{{af|en|a.b|c,d}} rest");
        assert_eq!(span, Some("{{af|en|a.b|c,d}} rest"));
    }

    #[test]
    fn span_runs_to_end_without_terminator() {
        let span = useful_span("{{bor|en|fr|café}}");
        assert_eq!(span, Some("{{bor|en|fr|café}}"));
    }

    #[test]
    fn multibyte_prelude_is_sliced_on_char_boundaries() {
        let span = useful_span("Ünknown, {{m|de|Hund}}");
        assert_eq!(span, Some(" {{m|de|Hund}}"));
    }

    // ─────────────────────────────────────────────────────────────
    // Reference extraction
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn section_without_templates_yields_nothing() {
        assert!(locate_references("Onomatopoeic, imitating a bark.\n").is_empty());
    }

    #[test]
    fn only_first_clause_is_parsed() {
        let refs = locate_references("From {{inh|en|enm|dogge}}, from {{inh|en|ang|docga}}.\n");
        assert_eq!(refs, vec![Reference::new(RelationKind::Inherited, "enm", "dogge")]);
    }

    #[test]
    fn root_and_multiple_image_templates_are_removed() {
        let section = "{{root|en|ine-pro|*dʰeh₁-}}\n{{multiple images\n|image1=a.jpg}}\n{{suf|en|do|er}}.\n";
        let refs = locate_references(section);
        assert_eq!(
            refs,
            vec![
                Reference::new(RelationKind::Component, "en", "do"),
                Reference::new(RelationKind::Suffix, "en", "-er"),
            ]
        );
    }

    #[test]
    fn parenthesised_asides_are_ignored() {
        let refs = locate_references("{{af|en|sun|flower}} (compare {{m|de|Sonnenblume}}).");
        assert_eq!(
            refs,
            vec![
                Reference::new(RelationKind::Component, "en", "sun"),
                Reference::new(RelationKind::Component, "en", "flower"),
            ]
        );
    }

    #[test]
    fn several_templates_in_one_clause_are_concatenated() {
        let refs = locate_references("{{bor|en|fr|chien}} and {{m|la|canis}}\n");
        assert_eq!(
            refs,
            vec![
                Reference::new(RelationKind::Borrowed, "fr", "chien"),
                Reference::new(RelationKind::Derived, "la", "canis"),
            ]
        );
    }
}
