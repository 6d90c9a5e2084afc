use crate::config::PunctuationSet;

const TERMINATORS: [char; 3] = ['.', '!', '?'];

/// Splits a normalized paragraph into sentences and spaces out included
/// punctuation so every sentence tokenizes on whitespace.
///
/// Terminators stay with their sentence. A terminator directly followed by
/// `"` keeps the quote as well. Trailing text with no terminator becomes a
/// final sentence.
pub fn split_sentences(paragraph: &str, included: &PunctuationSet) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = paragraph.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        let closes = if c == '"' {
            current
                .chars()
                .rev()
                .nth(1)
                .is_some_and(|prev| TERMINATORS.contains(&prev))
        } else {
            TERMINATORS.contains(&c) && chars.peek() != Some(&'"')
        };
        if closes {
            push_trimmed(&mut sentences, &current);
            current.clear();
        }
    }
    push_trimmed(&mut sentences, &current);

    sentences
        .iter()
        .map(|sentence| space_punctuation(sentence, included))
        .collect()
}

fn push_trimmed(sentences: &mut Vec<String>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}

/// Pads each included punctuation character with spaces, then collapses
/// whitespace runs to a single space.
fn space_punctuation(sentence: &str, included: &PunctuationSet) -> String {
    let mut padded = String::with_capacity(sentence.len() + 8);
    for c in sentence.chars() {
        if included.contains(c) {
            padded.push(' ');
            padded.push(c);
            padded.push(' ');
        } else {
            padded.push(c);
        }
    }
    padded.split_whitespace().collect::<Vec<_>>().join(" ")
}
