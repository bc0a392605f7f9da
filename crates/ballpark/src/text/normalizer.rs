use super::rules::{RepairRule, FALLBACK_LETTER, REPAIR_RULES, SPECIAL_LETTERS};
use regex::{Regex, RegexBuilder};
use std::borrow::Cow;
use std::sync::OnceLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

const PLACEHOLDER: char = '?';

/// Result of a normalization pass.
///
/// `guessed` counts the placeholders that no repair rule explained and that
/// were filled with [`FALLBACK_LETTER`]. A non-zero count means the text may
/// not match the original spelling and deserves a human look.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub text: String,
    pub guessed: usize,
}

impl Normalized {
    pub fn has_guesses(&self) -> bool {
        self.guessed > 0
    }
}

#[derive(Debug)]
struct CompiledRule {
    regex: Regex,
    replacement: &'static str,
}

/// Reduces display names and positions to printable ASCII.
///
/// Runs four passes in a fixed order: canonical decomposition with combining
/// marks dropped, the special letter table, the placeholder repair rules, and
/// finally the fallback letter for any placeholder left over.
#[derive(Debug)]
pub struct TextNormalizer {
    rules: Vec<CompiledRule>,
}

impl TextNormalizer {
    /// Compiles a normalizer from an ordered repair table.
    pub fn new(rules: &[RepairRule]) -> Result<Self, regex::Error> {
        let rules = rules
            .iter()
            .map(|rule| {
                let regex = RegexBuilder::new(rule.pattern)
                    .case_insensitive(true)
                    .build()?;
                Ok(CompiledRule {
                    regex,
                    replacement: rule.replacement,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;

        Ok(Self { rules })
    }

    /// Shared normalizer built from [`REPAIR_RULES`].
    pub fn standard() -> &'static TextNormalizer {
        static STANDARD: OnceLock<TextNormalizer> = OnceLock::new();
        STANDARD.get_or_init(|| {
            TextNormalizer::new(REPAIR_RULES).expect("built-in repair rules compile")
        })
    }

    pub fn normalize(&self, text: &str) -> Normalized {
        if is_clean(text) {
            return Normalized {
                text: text.to_string(),
                guessed: 0,
            };
        }

        let stripped = strip_diacritics(text);
        let spelled = spell_special_letters(&stripped);
        let repaired = self.repair(spelled);
        let (text, guessed) = fill_placeholders(repaired);

        Normalized { text, guessed }
    }

    pub fn normalize_optional(&self, text: Option<&str>) -> Option<Normalized> {
        text.map(|value| self.normalize(value))
    }

    fn repair(&self, mut text: String) -> String {
        for rule in &self.rules {
            if !text.contains(PLACEHOLDER) {
                break;
            }

            let replaced = match rule.regex.replace_all(&text, rule.replacement) {
                Cow::Owned(value) => Some(value),
                Cow::Borrowed(_) => None,
            };
            if let Some(value) = replaced {
                text = value;
            }
        }

        text
    }
}

/// Normalizes `text` with the standard tables, discarding the guess count.
pub fn normalize(text: &str) -> String {
    TextNormalizer::standard().normalize(text).text
}

fn is_clean(text: &str) -> bool {
    text.chars()
        .all(|c| (c == ' ' || c.is_ascii_graphic()) && c != PLACEHOLDER)
}

fn strip_diacritics(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

fn spell_special_letters(text: &str) -> String {
    let mut spelled = String::with_capacity(text.len());

    for c in text.chars() {
        if c == ' ' || c.is_ascii_graphic() {
            spelled.push(c);
        } else if let Some((_, spelling)) = SPECIAL_LETTERS.iter().find(|(letter, _)| *letter == c)
        {
            spelled.push_str(spelling);
        } else if c.is_whitespace() {
            spelled.push(' ');
        }
        // Anything else has no ASCII spelling and is dropped.
    }

    spelled
}

fn fill_placeholders(text: String) -> (String, usize) {
    let guessed = text.matches(PLACEHOLDER).count();
    if guessed == 0 {
        return (text, 0);
    }

    let filled = text
        .chars()
        .map(|c| if c == PLACEHOLDER { FALLBACK_LETTER } else { c })
        .collect();
    (filled, guessed)
}
