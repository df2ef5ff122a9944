use regex::{NoExpand, Regex, RegexBuilder};

use super::Detected;

/// Hinglish rewrite rules, applied top to bottom. Order is significant:
/// `ha(i|ee)` must run before the bare `ha` rule and the trailing `ha(i)? na`
/// rule only sees whatever the earlier rules left behind.
const HINGLISH_RULES: &[(&str, &str)] = &[
    (r"\bnamaste\b", "नमस्ते"),
    (r"\bkya\b", "क्या"),
    (r"\bkaise\b", "कैसे"),
    (r"\bha(i|ee)\b", "भाई"),
    (r"\bmera\b", "मेरा"),
    (r"\bnaam\b", "नाम"),
    (r"\bghar\b", "घर"),
    (r"\bkhana\b", "खाना"),
    (r"\bthik\b", "ठीक"),
    (r"\bdost\b", "दोस्त"),
    (r"\bpadhai\b", "पढ़ाई"),
    (r"\bschool\b", "स्कूल"),
    (r"\boffice\b", "ऑफिस"),
    (r"\bkyu\b", "क्यों"),
    (r"\bkahan\b", "कहाँ"),
    (r"\bkab\b", "कब"),
    (r"\bha\b", "है"),
    (r"\bhoon\b", "हूँ"),
    (r"\braha\b", "रहा"),
    (r"\brahe\b", "रहे"),
    (r"\bha(i)?\s+na\b", "है ना"),
];

const TINGLISH_RULES: &[(&str, &str)] = &[
    (r"\bnuvvu\b", "నువ్వు"),
    (r"\bmeeru\b", "మీరు"),
    (r"\bthinnava\b", "తిన్నావా"),
    (r"\btinava\b", "తిన్నావా"),
    (r"\banna\b", "అన్నా"),
    (r"\bcheppa\b", "చెప్ప"),
    (r"\bchelli\b", "చెల్లి"),
    (r"\bbagunna(va|ra)\b", "బాగున్నావా"),
    (r"\bemiti\b", "ఏమిటీ"),
    (r"\benduku\b", "ఎందుకు"),
    (r"\bevaru\b", "ఎవరు"),
    (r"\bpani\b", "పని"),
    (r"\bbaga\b", "బాగా"),
    (r"\bchala\b", "చాలా"),
];

struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

/// Compiled romanized-to-native substitution tables.
pub struct Normalizer {
    hinglish: Vec<Rule>,
    tinglish: Vec<Rule>,
}

impl Normalizer {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            hinglish: compile(HINGLISH_RULES)?,
            tinglish: compile(TINGLISH_RULES)?,
        })
    }

    /// Rewrites romanized tokens into native script. Text detected as a
    /// native language is returned as-is.
    pub fn normalize(&self, text: &str, detected: Detected) -> String {
        let rules = match detected {
            Detected::RomanizedHindi => &self.hinglish,
            Detected::RomanizedTelugu => &self.tinglish,
            Detected::Native(_) => return text.to_string(),
        };

        rules.iter().fold(text.to_string(), |out, rule| {
            rule.pattern
                .replace_all(&out, NoExpand(rule.replacement))
                .into_owned()
        })
    }
}

fn compile(rules: &[(&str, &'static str)]) -> Result<Vec<Rule>, regex::Error> {
    rules
        .iter()
        .map(|&(pattern, replacement)| -> Result<Rule, regex::Error> {
            Ok(Rule {
                pattern: RegexBuilder::new(pattern).case_insensitive(true).build()?,
                replacement,
            })
        })
        .collect()
}
