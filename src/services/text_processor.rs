// Text Processing Service
// Sentence splitting, word tokenization and syllable counting shared by the analyzers

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

const ABBREVIATIONS: [&str; 14] = [
    "e.g.", "i.e.", "etc.", "vs.", "mr.", "mrs.", "ms.", "dr.", "prof.", "fig.", "eq.", "no.",
    "inc.", "ltd.",
];

fn space_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\u{3000}\u{00A0}]").expect("space regex"))
}

fn horizontal_ws_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t\x0C\x0B]+").expect("whitespace regex"))
}

fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\p{L}\p{N}]+(?:['’]\p{L}+)*|[^\s\p{L}\p{N}]").expect("token regex"))
}

fn word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\p{L}\p{N}]+(?:['’]\p{L}+)*").expect("word regex"))
}

/// Normalize quotes, dashes and whitespace in raw input
pub fn normalize_punctuation(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut s = text
        .replace(['\u{201c}', '\u{201d}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace('\u{2014}', "-");

    s = space_re().replace_all(&s, " ").to_string();
    s = s.replace("\r\n", "\n").replace('\r', "\n");
    s = horizontal_ws_re().replace_all(&s, " ").to_string();

    s.lines()
        .map(|ln| ln.trim())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SentenceOffset {
    pub text: String,
    /// UTF-8 byte offset of the first non-whitespace character.
    pub start: usize,
    /// UTF-8 byte offset, end-exclusive, after the last non-whitespace character.
    pub end: usize,
}

fn ends_with_abbreviation(buffer: &str) -> bool {
    let lower = buffer.trim_end().to_ascii_lowercase();
    let last_word = lower.rsplit(char::is_whitespace).next().unwrap_or("");
    ABBREVIATIONS.iter().any(|abbr| last_word == *abbr)
}

fn push_sentence(out: &mut Vec<SentenceOffset>, buffer: &str, buffer_start: usize) {
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return;
    }
    let lead = buffer.len() - buffer.trim_start().len();
    let start = buffer_start + lead;
    out.push(SentenceOffset {
        text: trimmed.to_string(),
        start,
        end: start + trimmed.len(),
    });
}

/// Rule-based sentence splitting with byte offset tracking
///
/// Splits after `.`, `!` or `?` unless inside double quotes, between digits
/// (decimals) or directly after a known abbreviation.
pub fn split_sentences_advanced(text: &str) -> Vec<SentenceOffset> {
    if text.trim().is_empty() {
        return vec![];
    }

    let mut sentences = Vec::new();
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut current_start: usize = 0;
    let mut in_quote = false;
    let mut i = 0;

    while i < chars.len() {
        let (byte_idx, ch) = chars[i];

        if matches!(ch, '"' | '\u{201c}' | '\u{201d}') {
            in_quote = !in_quote;
        }

        if matches!(ch, '.' | '!' | '?') && !in_quote {
            let prev = if i > 0 { Some(chars[i - 1].1) } else { None };
            let next = chars.get(i + 1).map(|c| c.1);

            let decimal = ch == '.'
                && prev.map(|c| c.is_ascii_digit()).unwrap_or(false)
                && next.map(|c| c.is_ascii_digit()).unwrap_or(false);
            let abbreviation = ch == '.' && ends_with_abbreviation(&text[current_start..byte_idx + 1]);

            // Consume runs like "?!" or "..." as one terminator.
            let mut j = i;
            while j + 1 < chars.len() && matches!(chars[j + 1].1, '.' | '!' | '?' | '"' | ')') {
                j += 1;
            }
            let boundary_ok = chars.get(j + 1).map(|c| c.1.is_whitespace()).unwrap_or(true);

            if !decimal && !abbreviation && boundary_ok {
                let end_byte = chars[j].0 + chars[j].1.len_utf8();
                push_sentence(&mut sentences, &text[current_start..end_byte], current_start);
                current_start = end_byte;
                i = j + 1;
                continue;
            }
        }

        i += 1;
    }

    if current_start < text.len() {
        push_sentence(&mut sentences, &text[current_start..], current_start);
    }

    sentences
}

/// Tokenize into (byte offset, token) pairs: words (with inner apostrophes) and single punctuation marks
pub fn tokenize(text: &str) -> Vec<(usize, &str)> {
    token_re().find_iter(text).map(|m| (m.start(), m.as_str())).collect()
}

/// Alphanumeric words only
pub fn words(text: &str) -> Vec<&str> {
    word_re().find_iter(text).map(|m| m.as_str()).collect()
}

/// Whitespace-delimited word count, the way the API computes ratios
pub fn whitespace_word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn is_punctuation(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| !c.is_alphanumeric())
}

/// Vowel-group syllable estimate with silent-e and -le adjustments
pub fn count_syllables(word: &str) -> usize {
    let w: Vec<char> = word
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .collect();
    if w.is_empty() {
        return 0;
    }
    if w.len() <= 3 {
        return 1;
    }

    let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
    let mut count = 0usize;
    let mut prev_vowel = false;
    for &c in &w {
        let v = is_vowel(c);
        if v && !prev_vowel {
            count += 1;
        }
        prev_vowel = v;
    }

    let n = w.len();
    if w[n - 1] == 'e' && !(w[n - 2] == 'l' && !is_vowel(w[n - 3])) && count > 1 {
        count -= 1;
    }
    if n > 2 && w[n - 2] == 'e' && matches!(w[n - 1], 's' | 'd') && !matches!(w[n - 3], 't' | 'd') && count > 1 {
        count -= 1;
    }

    count.max(1)
}
