use std::sync::LazyLock;

use regex::Regex;

pub trait Tokenizer: Send + Sync {
    fn sentences<'a>(&self, text: &'a str) -> Vec<&'a str>;
    fn words(&self, sentence: &str) -> Vec<String>;

    fn lowercase_words(&self, sentence: &str) -> Vec<String> {
        self.words(sentence)
            .into_iter()
            .map(|word| word.to_lowercase())
            .collect()
    }

    fn tokenized_sentences(&self, text: &str) -> Vec<Vec<String>> {
        self.sentences(text)
            .into_iter()
            .map(|sentence| self.lowercase_words(sentence))
            .collect()
    }
}

// A sentence ends at `.`, `!` or `?` followed by whitespace and an upper-case
// letter, digit or opening bracket, unless an abbreviation precedes it.
#[derive(Debug, Clone, Copy, Default)]
pub struct PunctuationTokenizer;

const ABBREVIATIONS: [&str; 14] = [
    "e.g", "i.e", "al", "fig", "figs", "eq", "ref", "refs", "approx", "ca", "vs", "no", "cf",
    "resp",
];

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{L}\p{N}]+(?:[-'_.][\p{L}\p{N}]+)*|[^\s\p{L}\p{N}]").unwrap()
});

impl PunctuationTokenizer {
    pub fn new() -> Self {
        Self
    }

    fn ends_with_abbreviation(head: &str) -> bool {
        let last = head
            .rsplit(|ch: char| ch.is_whitespace() || ch == '(')
            .next()
            .unwrap_or("")
            .trim_end_matches('.')
            .to_lowercase();
        // single initials such as "J. Smith"
        if last.chars().count() == 1 && last.chars().all(|ch| ch.is_alphabetic()) {
            return true;
        }
        ABBREVIATIONS.contains(&last.as_str())
    }
}

impl Tokenizer for PunctuationTokenizer {
    fn sentences<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut out = Vec::new();
        let mut start = 0usize;
        let mut chars = text.char_indices().peekable();

        while let Some((idx, ch)) = chars.next() {
            if !matches!(ch, '.' | '!' | '?') {
                continue;
            }
            let end = idx + ch.len_utf8();
            let rest = &text[end..];
            let Some(next_idx) = rest.find(|c: char| !c.is_whitespace()) else {
                break;
            };
            if next_idx == 0 {
                continue;
            }
            let next = rest[next_idx..].chars().next().unwrap_or(' ');
            let opens_sentence =
                next.is_uppercase() || next.is_ascii_digit() || matches!(next, '(' | '[' | '"');
            if !opens_sentence || (ch == '.' && Self::ends_with_abbreviation(&text[start..idx])) {
                continue;
            }
            let sentence = text[start..end].trim();
            if !sentence.is_empty() {
                out.push(sentence);
            }
            start = end;
            while chars.peek().is_some_and(|(pos, _)| *pos < end + next_idx) {
                chars.next();
            }
        }

        let tail = text[start..].trim();
        if !tail.is_empty() {
            out.push(tail);
        }
        out
    }

    fn words(&self, sentence: &str) -> Vec<String> {
        WORD_RE
            .find_iter(sentence)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}
