//! Rewrites one wikitext paragraph into plain lowercase prose.
//!
//! Steps run in a fixed order and later steps rely on earlier ones: templates
//! are resolved before the generic template sweep deletes the rest, links are
//! resolved before the length check, and punctuation is stripped before the
//! abbreviation table and initials heuristics look for periods.

use crate::config::{ExtractConfig, PunctuationSet, MIN_PARAGRAPH_CHARS};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static LANG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{lang\|.*?\}\}").unwrap());

static CONVERT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{convert\|.*?\}\}").unwrap());

static TRANSL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{transl\|.*?\}\}").unwrap());

static REF_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"&lt;ref.*?/ref&gt;").unwrap());

static ESCAPED_TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"&lt.*?&gt;").unwrap());

static CITATION_GROUP_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\}\}[^{][^{]*?\}\}").unwrap());

static TEMPLATE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{.*?\}\}").unwrap());

static WIKILINK_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\[.*?\]\]").unwrap());

static EXTERNAL_LINK_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[.*?\]").unwrap());

static ENTITY_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"&amp;|nbsp;").unwrap());

static CONTRACTION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-zA-Z])'([a-zA-Z])").unwrap());

static THOUSANDS_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+(?:,[0-9]+)+").unwrap());

static INITIALS_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z]\.[A-Z]\.").unwrap());

// "I." is left alone: it usually ends a sentence.
static SINGLE_INITIAL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r" [A-HJ-Z]\.").unwrap());

static DECIMAL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]+)(?:\.[0-9]+)+").unwrap());

static ABBREVIATIONS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"e\.g\.", "for example"),
        (r"i\.e\.", "that is"),
        (r"etc\.", "etcetera"),
        (r"et al\.", "and others"),
        (r"mr\.", "mr"),
        (r"mrs\.", "mrs"),
        (r"ms\.", "ms"),
        (r"miss\.", "miss"),
    ]
    .into_iter()
    .map(|(pattern, expansion)| {
        let regex = Regex::new(&format!(r"(?i)\b{}", pattern)).unwrap();
        (regex, expansion)
    })
    .collect()
});

/// Third `{{convert}}` fields that join two values rather than name a unit.
const CONVERT_CONNECTORS: &[&str] = &[
    "-", "–", "and", "and(-)", "or", "to", "to(-)", "to about", "+/-", "±", "+", ",", ", and",
    ", or", "by", "x", "×", "xx", "*",
];

/// Runs every normalization step over `paragraph`.
///
/// Returns `None` when the paragraph falls under [`MIN_PARAGRAPH_CHARS`]
/// once templates and links are resolved.
pub fn normalize(paragraph: &str, config: &ExtractConfig) -> Option<String> {
    let text = resolve_lang_templates(paragraph);
    let text = resolve_convert_templates(&text, &config.garbage_marker);
    let text = resolve_transl_templates(&text);
    let text = strip_citations(&text);
    let text = strip_escaped_tags(&text);
    let text = strip_templates(&text);
    let text = text.replace("()", "");
    let text = resolve_wikilinks(&text);
    let text = resolve_external_links(&text);

    if text.chars().count() < MIN_PARAGRAPH_CHARS {
        return None;
    }

    let text = decode_entities(&text);
    let text = strip_emphasis(&text);
    let text = splice_contractions(&text);
    let text = strip_thousands_separators(&text);
    let text = remove_punctuation(&text, &config.excluded);
    let text = expand_abbreviations(&text);
    let text = text.replace("...", "");
    let text = strip_initials(&text);
    let text = truncate_decimals(&text);

    Some(text.to_lowercase())
}

/// Splits the inside of a `{{...}}` match on `|`.
fn template_fragments<'a>(caps: &'a Captures<'_>) -> Vec<&'a str> {
    let whole = caps.get(0).map_or("", |m| m.as_str());
    whole[2..whole.len() - 2].split('|').collect()
}

fn strip_brackets(s: &str) -> String {
    s.chars().filter(|c| *c != '[' && *c != ']').collect()
}

/// `{{lang|fr|Paris}}` becomes `Paris`; a trailing `key=value` field is skipped.
pub(crate) fn resolve_lang_templates(text: &str) -> String {
    LANG_REGEX
        .replace_all(text, |caps: &Captures| {
            let fragments = template_fragments(caps);
            let last = fragments[fragments.len() - 1];
            let chosen = if last.contains('=') {
                fragments[fragments.len() - 2]
            } else {
                last
            };
            chosen.replace('\'', "")
        })
        .into_owned()
}

/// `{{convert|60|mph|km/h}}` becomes `60 mph`.
pub(crate) fn resolve_convert_templates(text: &str, garbage_marker: &str) -> String {
    CONVERT_REGEX
        .replace_all(text, |caps: &Captures| {
            let fragments = template_fragments(caps);
            let unit = match fragments.get(2) {
                Some(unit) if !CONVERT_CONNECTORS.contains(unit) => Some(*unit),
                _ => fragments.get(4).copied(),
            };
            match unit {
                Some(unit) => strip_brackets(&format!("{} {}", fragments[1], unit)),
                None => strip_brackets(garbage_marker),
            }
        })
        .into_owned()
}

/// `{{transl|ar|DIN|al-Qāhira}}` becomes `al-Qāhira`.
pub(crate) fn resolve_transl_templates(text: &str) -> String {
    TRANSL_REGEX
        .replace_all(text, |caps: &Captures| {
            let fragments = template_fragments(caps);
            strip_brackets(fragments[fragments.len() - 1])
        })
        .into_owned()
}

pub(crate) fn strip_citations(text: &str) -> String {
    REF_REGEX.replace_all(text, "").into_owned()
}

pub(crate) fn strip_escaped_tags(text: &str) -> String {
    ESCAPED_TAG_REGEX.replace_all(text, "").into_owned()
}

/// Collapses trailing citation groups, then deletes whatever `{{...}}` remains.
pub(crate) fn strip_templates(text: &str) -> String {
    let collapsed = CITATION_GROUP_REGEX.replace_all(text, "}}");
    TEMPLATE_REGEX.replace_all(&collapsed, "").into_owned()
}

/// `[[target|display]]` becomes `display`.
pub(crate) fn resolve_wikilinks(text: &str) -> String {
    WIKILINK_REGEX
        .replace_all(text, |caps: &Captures| {
            let whole = &caps[0];
            let inner = &whole[2..whole.len() - 2];
            inner.rsplit('|').next().unwrap_or("").to_string()
        })
        .into_owned()
}

/// `[http://example.com Example site]` becomes `Example site`; a lone token is kept as is.
pub(crate) fn resolve_external_links(text: &str) -> String {
    EXTERNAL_LINK_REGEX
        .replace_all(text, |caps: &Captures| {
            let whole = &caps[0];
            let tokens: Vec<&str> = whole[1..whole.len() - 1].split_whitespace().collect();
            match tokens.as_slice() {
                [] => String::new(),
                [only] => only.to_string(),
                [_, label @ ..] => label.join(" "),
            }
        })
        .into_owned()
}

pub(crate) fn decode_entities(text: &str) -> String {
    ENTITY_REGEX.replace_all(text, "").replace("&quot;", "\"")
}

/// Drops `'''` and `''` markers; single apostrophes stay.
pub(crate) fn strip_emphasis(text: &str) -> String {
    text.replace("'''", "").replace("''", "")
}

/// `don't` becomes `dont`, `Ada's` becomes `Adas`.
pub(crate) fn splice_contractions(text: &str) -> String {
    CONTRACTION_REGEX.replace_all(text, "${1}${2}").into_owned()
}

/// Joins a whole comma-separated digit run, so `1,2,3` becomes `123`.
pub(crate) fn strip_thousands_separators(text: &str) -> String {
    THOUSANDS_REGEX
        .replace_all(text, |caps: &Captures| caps[0].replace(',', ""))
        .into_owned()
}

pub(crate) fn remove_punctuation(text: &str, excluded: &PunctuationSet) -> String {
    text.chars().filter(|c| !excluded.contains(*c)).collect()
}

pub(crate) fn expand_abbreviations(text: &str) -> String {
    ABBREVIATIONS
        .iter()
        .fold(text.to_string(), |acc, (regex, expansion)| {
            regex.replace_all(&acc, *expansion).into_owned()
        })
}

pub(crate) fn strip_initials(text: &str) -> String {
    let text = INITIALS_REGEX.replace_all(text, "");
    SINGLE_INITIAL_REGEX.replace_all(&text, " ").into_owned()
}

/// Keeps the leading integer of a dotted digit run: `1.2.3` becomes `1`.
pub(crate) fn truncate_decimals(text: &str) -> String {
    DECIMAL_REGEX.replace_all(text, "${1}").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EXCLUDED_PUNCTUATION, GARBAGE_MARKER};
    use crate::models::Granularity;

    const FILLER: &str = " The surrounding sentence is padded so that the paragraph clears the minimum length.";

    fn config() -> ExtractConfig {
        ExtractConfig::new(Granularity::Sentence)
    }

    #[test]
    fn lang_uses_last_fragment() {
        assert_eq!(
            resolve_lang_templates("the {{lang|fr|Tour Eiffel}} stands"),
            "the Tour Eiffel stands"
        );
    }

    #[test]
    fn lang_skips_trailing_named_parameter() {
        assert_eq!(
            resolve_lang_templates("{{lang|de|Straße|italic=no}}"),
            "Straße"
        );
    }

    #[test]
    fn lang_strips_apostrophes() {
        assert_eq!(resolve_lang_templates("{{lang|fr|l'Étoile}}"), "lÉtoile");
    }

    #[test]
    fn lang_handles_several_templates() {
        assert_eq!(
            resolve_lang_templates("{{lang|fr|oui}} and {{lang|de|ja}}"),
            "oui and ja"
        );
    }

    #[test]
    fn convert_uses_value_and_unit() {
        assert_eq!(
            resolve_convert_templates("is {{convert|60|mph|km/h}} on", GARBAGE_MARKER),
            "is 60 mph on"
        );
    }

    #[test]
    fn convert_skips_connector_for_fifth_fragment() {
        assert_eq!(
            resolve_convert_templates("{{convert|5|to|10|km|mi}}", GARBAGE_MARKER),
            "5 km"
        );
        assert_eq!(
            resolve_convert_templates("{{convert|2|x|4|m}}", GARBAGE_MARKER),
            "2 m"
        );
        assert_eq!(
            resolve_convert_templates("{{convert|2|x|4}}", GARBAGE_MARKER),
            GARBAGE_MARKER
        );
    }

    #[test]
    fn convert_without_unit_yields_garbage_marker() {
        assert_eq!(
            resolve_convert_templates("a {{convert|12}} b", "zzgarbage"),
            "a zzgarbage b"
        );
    }

    #[test]
    fn convert_removes_brackets() {
        assert_eq!(
            resolve_convert_templates("{{convert|3|[[foot (unit)|ft]]}}", GARBAGE_MARKER),
            "3 foot (unit)"
        );
    }

    #[test]
    fn transl_uses_last_fragment() {
        assert_eq!(
            resolve_transl_templates("Cairo ({{transl|ar|DIN|[[al-Qāhira]]}})"),
            "Cairo (al-Qāhira)"
        );
    }

    #[test]
    fn citations_are_removed() {
        assert_eq!(
            strip_citations("a claim.&lt;ref name=\"x\"&gt;Source&lt;/ref&gt; Next"),
            "a claim. Next"
        );
    }

    #[test]
    fn escaped_tags_are_removed_lazily() {
        assert_eq!(
            strip_escaped_tags("one&lt;br /&gt;two &lt;!-- note --&gt;three"),
            "onetwo three"
        );
    }

    #[test]
    fn templates_are_removed() {
        assert_eq!(strip_templates("text{{sfn|Smith|2004}} more"), "text more");
    }

    #[test]
    fn citation_groups_collapse_before_removal() {
        assert_eq!(strip_templates("x{{a}}b}} y"), "x y");
    }

    #[test]
    fn wikilinks_use_display_text() {
        assert_eq!(
            resolve_wikilinks("[[Paris|The City of Light]] and [[London]]"),
            "The City of Light and London"
        );
    }

    #[test]
    fn external_links_keep_label() {
        assert_eq!(
            resolve_external_links("see [https://example.com Example site] now"),
            "see Example site now"
        );
        assert_eq!(resolve_external_links("[sic]"), "sic");
        assert_eq!(resolve_external_links("a [] b"), "a  b");
    }

    #[test]
    fn entities_are_decoded() {
        assert_eq!(
            decode_entities("R&amp;D &quot;labs&quot;&amp;nbsp;here"),
            "RD \"labs\"here"
        );
    }

    #[test]
    fn emphasis_is_removed_but_apostrophes_stay() {
        assert_eq!(
            strip_emphasis("'''Bold''' and ''italic'' and Zeus'"),
            "Bold and italic and Zeus'"
        );
    }

    #[test]
    fn contractions_are_spliced() {
        assert_eq!(
            splice_contractions("don't stop Ada's work on the Zeus' temple"),
            "dont stop Adas work on the Zeus' temple"
        );
    }

    #[test]
    fn thousands_separators_are_removed() {
        assert_eq!(
            strip_thousands_separators("about 2,100 people, 3 cars"),
            "about 2100 people, 3 cars"
        );
    }

    #[test]
    fn comma_separated_digit_runs_join_in_one_pass() {
        assert_eq!(strip_thousands_separators("1,2,3"), "123");
        assert_eq!(strip_thousands_separators("7,799,401 francs"), "7799401 francs");
        let once = strip_thousands_separators("lists like 1,2,3 and 4,5");
        assert_eq!(once, "lists like 123 and 45");
        assert_eq!(strip_thousands_separators(&once), once);
    }

    #[test]
    fn excluded_punctuation_is_removed() {
        let excluded = PunctuationSet::new(EXCLUDED_PUNCTUATION);
        assert_eq!(
            remove_punctuation("a#b$c%d (e), f.", &excluded),
            "abcd (e), f."
        );
    }

    #[test]
    fn abbreviations_are_expanded() {
        assert_eq!(
            expand_abbreviations("fruit, e.g. apples, i.e. food etc. Smith et al. met Mr. Jones"),
            "fruit, for example apples, that is food etcetera Smith and others met mr Jones"
        );
    }

    #[test]
    fn abbreviations_respect_word_boundaries() {
        assert_eq!(expand_abbreviations("several items."), "several items.");
        assert_eq!(expand_abbreviations("we dismiss."), "we dismiss.");
    }

    #[test]
    fn initials_are_removed() {
        assert_eq!(strip_initials("the U.S. army"), "the  army");
        assert_eq!(strip_initials("John F. Kennedy"), "John  Kennedy");
        assert_eq!(strip_initials("so did I. Then"), "so did I. Then");
    }

    #[test]
    fn decimals_are_truncated() {
        assert_eq!(truncate_decimals("pi is 3.14159 and -2.5"), "pi is 3 and -2");
    }

    #[test]
    fn dotted_digit_runs_truncate_in_one_pass() {
        assert_eq!(truncate_decimals("version 1.2.3"), "version 1");
        assert_eq!(truncate_decimals("on 2024.01.15."), "on 2024.");
        let once = truncate_decimals("release 10.4.11 shipped");
        assert_eq!(once, "release 10 shipped");
        assert_eq!(truncate_decimals(&once), once);
    }

    #[test]
    fn short_paragraph_yields_nothing() {
        assert_eq!(normalize("Too short.", &config()), None);
        // 85 characters once the template is resolved
        let paragraph = "The speed limit is {{convert|60|mph|km/h}} on this road near the old mill which has stood for decades.";
        assert_eq!(normalize(paragraph, &config()), None);
    }

    #[test]
    fn length_is_checked_after_markup_removal() {
        let paragraph = format!(
            "Short prose.{{{{cite web|url=https://example.com/{}|title=padding}}}}",
            "x".repeat(120)
        );
        assert!(paragraph.chars().count() > MIN_PARAGRAPH_CHARS);
        assert_eq!(normalize(&paragraph, &config()), None);
    }

    #[test]
    fn convert_example_paragraph() {
        let paragraph = format!(
            "The speed limit is {{{{convert|60|mph|km/h}}}} on this road near the old mill which has stood for decades.{}",
            FILLER
        );
        let normalized = normalize(&paragraph, &config()).unwrap();
        assert!(normalized.starts_with(
            "the speed limit is 60 mph on this road near the old mill which has stood for decades. the surrounding"
        ));
    }

    #[test]
    fn link_example_paragraph() {
        let paragraph = format!(
            "[[Paris|The City of Light]] attracts millions of visitors every single year from every corner of the globe.{}",
            FILLER
        );
        let normalized = normalize(&paragraph, &config()).unwrap();
        assert!(normalized.starts_with("the city of light attracts millions"));
    }

    #[test]
    fn sentence_granularity_drops_quotes() {
        let paragraph = format!("He said &quot;Yes.&quot;{}", FILLER);
        let normalized = normalize(&paragraph, &config()).unwrap();
        assert!(normalized.starts_with("he said yes."));
    }

    #[test]
    fn paragraph_granularity_keeps_quotes() {
        let paragraph = format!("He said &quot;Yes.&quot;{}", FILLER);
        let normalized = normalize(&paragraph, &ExtractConfig::new(Granularity::Paragraph)).unwrap();
        assert!(normalized.starts_with("he said \"yes.\""));
    }

    #[test]
    fn output_is_lowercase() {
        let paragraph = format!("RUST Was Announced By MOZILLA Research{}", FILLER);
        let normalized = normalize(&paragraph, &config()).unwrap();
        assert_eq!(normalized, normalized.to_lowercase());
    }

    #[test]
    fn normalization_is_a_fixed_point() {
        let paragraph = "The '''Eiffel Tower''' ({{lang|fr|tour Eiffel}}) is a [[wrought iron|wrought-iron]] lattice tower, e.g. a landmark, in [[Paris]], built in 1889 at a cost of 7,799,401.31 francs by Mr. Eiffel's company.&lt;ref&gt;Harvie&lt;/ref&gt;";
        let once = normalize(paragraph, &config()).unwrap();
        let twice = normalize(&once, &config()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn dotted_versions_dates_and_digit_lists_are_a_fixed_point() {
        for granularity in [Granularity::Sentence, Granularity::Paragraph] {
            let config = ExtractConfig::new(granularity);
            let paragraph = format!(
                "The library reached version 1.2.3 on 2024.01.15 and counted 1,2,3 bugs across 10,000.5 lines.{}",
                FILLER
            );
            let once = normalize(&paragraph, &config).unwrap();
            assert!(once.contains("version 1 on 2024 and counted 123 bugs across 10000 lines."), "{}", once);
            let twice = normalize(&once, &config).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn full_pipeline_on_mixed_markup() {
        let paragraph = "The '''Eiffel Tower''' ({{lang|fr|tour Eiffel}}) is a [[wrought iron|wrought-iron]] lattice tower, e.g. a landmark, in [[Paris]], built in 1889 at a cost of 7,799,401.31 francs by Mr. Eiffel's company.&lt;ref&gt;Harvie&lt;/ref&gt;";
        assert_eq!(
            normalize(paragraph, &config()).unwrap(),
            "the eiffel tower (tour eiffel) is a wrought-iron lattice tower, for example a landmark, in paris, built in 1889 at a cost of 7799401 francs by mr eiffels company."
        );
    }
}
