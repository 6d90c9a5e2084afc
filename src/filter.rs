//! Line-level classification of raw page lines into prose and markup.
//!
//! Each [`DiscardRule`] is an independent predicate over one trimmed line.
//! Rules are checked in [`DiscardRule::ALL`] order, highest-yield first; the
//! first match discards the line. The order only affects throughput: the
//! rules are close to mutually exclusive on real dumps.

use crate::config::ESCAPED_TAG_MAX_CHARS;
use memchr::memmem;

/// Why a line was rejected as non-prose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscardRule {
    /// `|` row/cell lines and `{|` table openers
    TableMarkup,
    /// Empty or single-character lines
    Blank,
    /// A lone `}}` closing a multi-line template
    TemplateClose,
    /// Lines opening with `<` or closing with `>`
    XmlTag,
    /// `== Heading ==`
    SectionHeader,
    /// `*`, `#`, `;` and `:` list items
    ListItem,
    /// `{{...}}` with nothing nested inside
    SingleLineTemplate,
    /// `!` table header cells
    TableHeader,
    /// Category and file links standing alone on a line
    WikiLinkLine,
    /// Escaped `<math>` equations and named `<ref>` blocks
    MathOrReference,
    /// `{{` with no closing braces anywhere on the line
    TemplateOpening,
    /// Escaped `<!-- ... -->` editor comments
    HtmlComment,
    /// Short lines wrapped entirely in an escaped tag
    EscapedTag,
    /// `File:` image captions
    FileCaption,
}

impl DiscardRule {
    pub const ALL: [DiscardRule; 14] = [
        DiscardRule::TableMarkup,
        DiscardRule::Blank,
        DiscardRule::TemplateClose,
        DiscardRule::XmlTag,
        DiscardRule::SectionHeader,
        DiscardRule::ListItem,
        DiscardRule::SingleLineTemplate,
        DiscardRule::TableHeader,
        DiscardRule::WikiLinkLine,
        DiscardRule::MathOrReference,
        DiscardRule::TemplateOpening,
        DiscardRule::HtmlComment,
        DiscardRule::EscapedTag,
        DiscardRule::FileCaption,
    ];

    pub fn matches(self, line: &str) -> bool {
        match self {
            DiscardRule::TableMarkup => line.starts_with('|') || line.starts_with("{|"),
            DiscardRule::Blank => line.chars().nth(1).is_none(),
            DiscardRule::TemplateClose => line == "}}",
            DiscardRule::XmlTag => line.starts_with('<') || line.ends_with('>'),
            DiscardRule::SectionHeader => line.starts_with("==") && line.ends_with("=="),
            DiscardRule::ListItem => line.starts_with(['*', '#', ';', ':']),
            DiscardRule::SingleLineTemplate => is_single_line_template(line),
            DiscardRule::TableHeader => line.starts_with('!'),
            DiscardRule::WikiLinkLine => {
                (line.starts_with("[[") && (line.ends_with("]]") || line.ends_with("]]</text>")))
                    || line.starts_with("[[File:")
            }
            DiscardRule::MathOrReference => {
                (line.starts_with("&lt;math") && line.ends_with("/math&gt;"))
                    || (line.starts_with("&lt;ref name=") && line.ends_with("/ref&gt;"))
            }
            DiscardRule::TemplateOpening => {
                line.starts_with("{{") && memmem::find(line.as_bytes(), b"}}").is_none()
            }
            DiscardRule::HtmlComment => line.starts_with("&lt;!--") && line.ends_with("--&gt;"),
            DiscardRule::EscapedTag => {
                line.starts_with("&lt;")
                    && line.ends_with("&gt;")
                    && line.chars().count() < ESCAPED_TAG_MAX_CHARS
            }
            DiscardRule::FileCaption => line.starts_with("File:"),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DiscardRule::TableMarkup => "table markup",
            DiscardRule::Blank => "blank",
            DiscardRule::TemplateClose => "template close",
            DiscardRule::XmlTag => "xml tag",
            DiscardRule::SectionHeader => "section header",
            DiscardRule::ListItem => "list item",
            DiscardRule::SingleLineTemplate => "single-line template",
            DiscardRule::TableHeader => "table header",
            DiscardRule::WikiLinkLine => "link line",
            DiscardRule::MathOrReference => "math or reference",
            DiscardRule::TemplateOpening => "template opening",
            DiscardRule::HtmlComment => "html comment",
            DiscardRule::EscapedTag => "escaped tag",
            DiscardRule::FileCaption => "file caption",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Returns the first rule that rejects `line`, or `None` if it is a candidate paragraph.
pub fn discard_reason(line: &str) -> Option<DiscardRule> {
    DiscardRule::ALL.into_iter().find(|rule| rule.matches(line))
}

pub fn is_paragraph(line: &str) -> bool {
    discard_reason(line).is_none()
}

/// `{{name|...}}` alone on a line, with no nested braces between the outer pair.
fn is_single_line_template(line: &str) -> bool {
    if !(line.starts_with("{{") && line.ends_with("}}")) || line.len() < 4 {
        return false;
    }
    let inner = &line.as_bytes()[2..line.len() - 2];
    memmem::find(inner, b"{{").is_none() && memmem::find(inner, b"}}").is_none()
}
