//! Parsing of single etymology templates such as `{{inh|en|enm|dogge}}`.

use crate::reference::{Reference, RelationKind};

/// Word value the markup uses for an omitted argument.
const PLACEHOLDER: &str = "-";

/// Template names this parser understands, grouped by how their arguments are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateFamily {
    /// `{{af|lang|part|part|...}}`, also `affix`, `com`, `compound`
    Affix,
    /// `{{pre|lang|prefix|base}}`
    Prefix,
    /// `{{suf|lang|base|suffix}}`
    Suffix,
    /// `{{con|lang|prefix|[base|]suffix}}`
    Confix,
    /// `{{inh|lang|source-lang|word}}`, also `bor` and `der`
    Descent(RelationKind),
    /// `{{m|lang|word}}`
    Mention,
}

impl TemplateFamily {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "af" | "affix" | "com" | "compound" => Some(Self::Affix),
            "pre" | "prefix" => Some(Self::Prefix),
            "suf" | "suffix" => Some(Self::Suffix),
            "con" | "confix" => Some(Self::Confix),
            "inh" | "inherited" => Some(Self::Descent(RelationKind::Inherited)),
            "bor" | "borrowed" => Some(Self::Descent(RelationKind::Borrowed)),
            "der" | "derived" => Some(Self::Descent(RelationKind::Derived)),
            "m" | "mention" => Some(Self::Mention),
            _ => None,
        }
    }

    /// Fewest positional components (name included) the family needs.
    fn min_components(&self) -> usize {
        match self {
            Self::Affix | Self::Mention => 3,
            Self::Prefix | Self::Suffix | Self::Confix | Self::Descent(_) => 4,
        }
    }
}

/// Split a template into its positional components.
///
/// Named parameters (anything containing `=`) are dropped.
pub fn template_components(template: &str) -> Vec<&str> {
    template
        .trim_matches(|c| c == '{' || c == '}')
        .split('|')
        .filter(|comp| !comp.contains('='))
        .map(str::trim)
        .collect()
}

/// Parse one template, braces included, into the references it makes.
pub fn parse_template(template: &str) -> Vec<Reference> {
    let components = template_components(template);

    let Some(&name) = components.first() else {
        return vec![];
    };
    let Some(family) = TemplateFamily::from_name(name) else {
        return vec![];
    };
    if components.len() < family.min_components() {
        return vec![];
    }

    let mut refs = references_for(family, &components).unwrap_or_default();
    refs.retain(|r| r.word.word != PLACEHOLDER);
    refs
}

/// `None` means the template was rejected outright.
fn references_for(family: TemplateFamily, c: &[&str]) -> Option<Vec<Reference>> {
    let lang = c[1];

    match family {
        TemplateFamily::Affix => Some(
            c[2..]
                .iter()
                .map(|part| Reference::new(RelationKind::Component, lang, part))
                .collect(),
        ),
        TemplateFamily::Prefix => {
            let prefix = hyphenate_prefix(c[2])?;
            Some(vec![
                Reference::new(RelationKind::Prefix, lang, &prefix),
                Reference::new(RelationKind::Component, lang, c[3]),
            ])
        }
        TemplateFamily::Suffix => {
            let suffix = hyphenate_suffix(c[3])?;
            Some(vec![
                Reference::new(RelationKind::Component, lang, c[2]),
                Reference::new(RelationKind::Suffix, lang, &suffix),
            ])
        }
        TemplateFamily::Confix => {
            let prefix = hyphenate_prefix(c[2])?;
            let mut refs = vec![Reference::new(RelationKind::Prefix, lang, &prefix)];
            if c.len() > 4 {
                refs.push(Reference::new(RelationKind::Component, lang, c[3]));
            }
            let suffix = hyphenate_suffix(c[c.len() - 1])?;
            refs.push(Reference::new(RelationKind::Suffix, lang, &suffix));
            Some(refs)
        }
        TemplateFamily::Descent(kind) => Some(vec![Reference::new(kind, c[2], c[3])]),
        TemplateFamily::Mention => {
            // Emptiness is judged on the alternative form too, but the emitted word is always c[2].
            let mut probe = c[2];
            if probe.is_empty() && c.len() >= 4 {
                probe = c[3];
            }
            if probe.is_empty() {
                return None;
            }
            Some(vec![Reference::new(RelationKind::Derived, lang, c[2])])
        }
    }
}

fn hyphenate_prefix(prefix: &str) -> Option<String> {
    if prefix.is_empty() {
        return None;
    }
    if prefix.ends_with('-') {
        Some(prefix.to_string())
    } else {
        Some(format!("{}-", prefix))
    }
}

fn hyphenate_suffix(suffix: &str) -> Option<String> {
    if suffix.is_empty() {
        return None;
    }
    if suffix.starts_with('-') {
        Some(suffix.to_string())
    } else {
        Some(format!("-{}", suffix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use RelationKind::*;

    fn r(kind: RelationKind, lang: &str, word: &str) -> Reference {
        Reference::new(kind, lang, word)
    }

    // ─────────────────────────────────────────────────────────────
    // Component splitting
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn components_drop_named_params_and_trim() {
        let result = template_components("{{ inh | en | enm | dogge | t=dog }}");
        assert_eq!(result, vec!["inh", "en", "enm", "dogge"]);
    }

    #[test]
    fn empty_template_yields_nothing() {
        assert!(parse_template("{{}}").is_empty());
        assert!(parse_template("").is_empty());
    }

    #[test]
    fn unknown_template_yields_nothing() {
        assert!(parse_template("{{lb|en|obsolete|rare}}").is_empty());
    }

    #[test]
    fn names_are_case_exact() {
        assert!(parse_template("{{Inh|en|enm|dogge}}").is_empty());
    }

    // ─────────────────────────────────────────────────────────────
    // Composition families
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn affix_emits_every_part() {
        let result = parse_template("{{af|en|un|do|able}}");
        assert_eq!(result, vec![r(Component, "en", "un"), r(Component, "en", "do"), r(Component, "en", "able")]);
    }

    #[test]
    fn compound_needs_three_components() {
        assert!(parse_template("{{compound|en}}").is_empty());
        assert_eq!(parse_template("{{com|en|sun}}"), vec![r(Component, "en", "sun")]);
    }

    #[test]
    fn prefix_appends_hyphen() {
        let result = parse_template("{{pre|en|re|do}}");
        assert_eq!(result, vec![r(Prefix, "en", "re-"), r(Component, "en", "do")]);
    }

    #[test]
    fn prefix_keeps_existing_hyphen() {
        let result = parse_template("{{prefix|en|un-|tie}}");
        assert_eq!(result, vec![r(Prefix, "en", "un-"), r(Component, "en", "tie")]);
    }

    #[test]
    fn prefix_with_empty_prefix_is_rejected() {
        assert!(parse_template("{{pre|en||do}}").is_empty());
    }

    #[test]
    fn suffix_prepends_hyphen() {
        let result = parse_template("{{suf|en|do|er}}");
        assert_eq!(result, vec![r(Component, "en", "do"), r(Suffix, "en", "-er")]);
    }

    #[test]
    fn suffix_with_empty_suffix_is_rejected() {
        assert!(parse_template("{{suffix|en|do|}}").is_empty());
    }

    #[test]
    fn confix_without_base() {
        let result = parse_template("{{con|en|do|er}}");
        assert_eq!(result, vec![r(Prefix, "en", "do-"), r(Suffix, "en", "-er")]);
    }

    #[test]
    fn confix_with_base() {
        let result = parse_template("{{confix|en|be|witch|ed}}");
        assert_eq!(
            result,
            vec![r(Prefix, "en", "be-"), r(Component, "en", "witch"), r(Suffix, "en", "-ed")]
        );
    }

    #[test]
    fn confix_with_empty_last_component_is_rejected_entirely() {
        assert!(parse_template("{{con|en|be|witch|}}").is_empty());
    }

    // ─────────────────────────────────────────────────────────────
    // Descent families
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn inherited_uses_source_language() {
        let result = parse_template("{{inh|en|enm|dogge}}");
        assert_eq!(result, vec![r(Inherited, "enm", "dogge")]);
    }

    #[test]
    fn borrowed_and_derived() {
        assert_eq!(parse_template("{{bor|en|fr|croissant}}"), vec![r(Borrowed, "fr", "croissant")]);
        assert_eq!(parse_template("{{derived|en|la|canis}}"), vec![r(Derived, "la", "canis")]);
    }

    #[test]
    fn descent_needs_four_components() {
        assert!(parse_template("{{inh|en|enm}}").is_empty());
    }

    #[test]
    fn mention_emits_derived() {
        let result = parse_template("{{m|ang|docga}}");
        assert_eq!(result, vec![r(Derived, "ang", "docga")]);
    }

    #[test]
    fn mention_with_both_forms_empty_is_rejected() {
        assert!(parse_template("{{m|ang|}}").is_empty());
        assert!(parse_template("{{m|ang||}}").is_empty());
    }

    #[test]
    fn mention_with_alternative_form_still_emits_first_form() {
        let result = parse_template("{{m|ang||docga}}");
        assert_eq!(result, vec![r(Derived, "ang", "")]);
    }

    // ─────────────────────────────────────────────────────────────
    // Placeholder filter
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn placeholder_words_are_dropped() {
        assert_eq!(parse_template("{{af|en|-|do}}"), vec![r(Component, "en", "do")]);
        assert_eq!(parse_template("{{pre|en|re|-}}"), vec![r(Prefix, "en", "re-")]);
        assert!(parse_template("{{inh|en|enm|-}}").is_empty());
        assert!(parse_template("{{m|en|-}}").is_empty());
    }

    #[test]
    fn placeholder_filter_covers_suffix_confix_and_descent() {
        assert_eq!(parse_template("{{suf|en|do|-}}"), vec![r(Component, "en", "do")]);
        assert_eq!(parse_template("{{con|en|be|-|ed}}"), vec![r(Prefix, "en", "be-"), r(Suffix, "en", "-ed")]);
        assert_eq!(parse_template("{{con|en|be|witch|-}}"), vec![r(Prefix, "en", "be-"), r(Component, "en", "witch")]);
        assert!(parse_template("{{bor|en|fr|-}}").is_empty());
        assert!(parse_template("{{der|en|la|-}}").is_empty());
    }

    #[test]
    fn placeholder_prefix_is_not_hyphenated_past_the_filter() {
        // "-" already ends with a hyphen, so it stays "-" and is filtered
        let result = parse_template("{{pre|en|-|do}}");
        assert_eq!(result, vec![r(Component, "en", "do")]);
    }

    #[test]
    fn parsing_is_deterministic() {
        let input = "{{af|en|un|do|able|pos=adj}}";
        assert_eq!(parse_template(input), parse_template(input));
    }
}
