use crate::config::{DETECT_CLUE_RATIO, DETECT_MIN_CLUES};

use super::{Detected, Lang};

const HINGLISH_CLUES: &[&str] = &[
    "aap", "tum", "kya", "kaise", "kahan", "kab", "kyu", "mera", "ghar", "khana", "bhai", "dost",
    "school", "office", "thik",
];

const TINGLISH_CLUES: &[&str] = &[
    "nuvvu", "meeru", "thinnava", "tinava", "anna", "chelli", "cheppa", "bagunnava", "emiti",
    "enduku", "evaru", "pani", "baga", "chala",
];

/// Classifies text by script first, then by romanized clue words.
///
/// Any Devanagari character wins outright, then any Telugu character.
/// Latin-only text is romanized Hindi/Telugu when enough of its tokens are
/// clue words; otherwise it is English.
pub fn detect(text: &str) -> Detected {
    let text = text.trim();
    if text.is_empty() {
        return Detected::Native(Lang::En);
    }
    if text.chars().any(is_devanagari) {
        return Detected::Native(Lang::Hi);
    }
    if text.chars().any(is_telugu) {
        return Detected::Native(Lang::Te);
    }

    let tokens = ascii_tokens(text);
    let needed = clue_threshold(tokens.len());
    let count = |clues: &[&str]| tokens.iter().filter(|t| clues.contains(&t.as_str())).count();

    if count(HINGLISH_CLUES) >= needed {
        Detected::RomanizedHindi
    } else if count(TINGLISH_CLUES) >= needed {
        Detected::RomanizedTelugu
    } else {
        Detected::Native(Lang::En)
    }
}

fn is_devanagari(c: char) -> bool {
    matches!(c, '\u{0900}'..='\u{097F}')
}

fn is_telugu(c: char) -> bool {
    matches!(c, '\u{0C00}'..='\u{0C7F}')
}

/// Lowercased runs of ASCII letters.
fn ascii_tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_ascii_alphabetic())
        .filter(|w| !w.is_empty())
        .map(str::to_ascii_lowercase)
        .collect()
}

/// `max(DETECT_MIN_CLUES, ceil(DETECT_CLUE_RATIO * n))`
fn clue_threshold(token_count: usize) -> usize {
    let proportional = (token_count as f64 * DETECT_CLUE_RATIO).ceil() as usize;
    DETECT_MIN_CLUES.max(proportional)
}
