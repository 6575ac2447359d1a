//! Offline language classifier
//!
//! Maps free text to a supported language with an ordered rule list.
//! Script rules run before any keyword rule, so a single Devanagari
//! character outweighs any number of romanized keywords.

use super::Language;
use tracing::debug;

/// One classification rule
enum Rule {
    /// Any character inside the inclusive Unicode block
    Script {
        language: Language,
        first: char,
        last: char,
    },
    /// Any whole word (lowercased) from the list
    Keywords {
        language: Language,
        words: &'static [&'static str],
    },
}

impl Rule {
    fn language(&self) -> Language {
        match self {
            Rule::Script { language, .. } | Rule::Keywords { language, .. } => *language,
        }
    }

    fn matches(&self, text: &str, words: &[String]) -> bool {
        match self {
            Rule::Script { first, last, .. } => text.chars().any(|c| (*first..=*last).contains(&c)),
            Rule::Keywords { words: keywords, .. } => {
                words.iter().any(|w| keywords.contains(&w.as_str()))
            }
        }
    }
}

/// Evaluation order is significant: first hit wins.
const RULES: &[Rule] = &[
    Rule::Script {
        language: Language::Hindi,
        first: '\u{0900}',
        last: '\u{097F}',
    },
    Rule::Script {
        language: Language::Tamil,
        first: '\u{0B80}',
        last: '\u{0BFF}',
    },
    Rule::Script {
        language: Language::Sinhala,
        first: '\u{0D80}',
        last: '\u{0DFF}',
    },
    Rule::Keywords {
        language: Language::Hindi,
        words: &[
            "namaste", "namaskar", "kaise", "kya", "hai", "aap", "mujhe", "batao", "ruko", "aage",
            "kahan",
        ],
    },
    Rule::Keywords {
        language: Language::Tamil,
        words: &[
            "vanakkam", "epdi", "eppadi", "irukinga", "irukeenga", "enna", "nandri", "sollu",
            "nillu",
        ],
    },
    // "obama" is how English-tuned recognizers tend to hear "ayubowan".
    Rule::Keywords {
        language: Language::Sinhala,
        words: &[
            "ayubowan", "kohomada", "mokakda", "obama", "stuti", "istuti", "nawathinna",
        ],
    },
];

/// Classify text into a supported language. Total: defaults to English.
pub fn classify(text: &str) -> Language {
    let language = match_rules(text).unwrap_or_default();
    debug!("🔤 Classified '{}' as {}", text, language);
    language
}

/// The language of the first matching rule, `None` when nothing matched
pub fn match_rules(text: &str) -> Option<Language> {
    let words: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect();

    RULES
        .iter()
        .find(|rule| rule.matches(text, &words))
        .map(Rule::language)
}
