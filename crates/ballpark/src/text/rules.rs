//! Lookup tables driving [`TextNormalizer`](super::TextNormalizer).
//!
//! Both tables are plain data so they can be reviewed and extended without
//! touching the normalization pass itself.

/// Letters that carry no combining mark under canonical decomposition and
/// therefore need an explicit ASCII spelling.
pub const SPECIAL_LETTERS: &[(char, &str)] = &[
    ('ß', "ss"),
    ('ẞ', "SS"),
    ('æ', "ae"),
    ('Æ', "Ae"),
    ('œ', "oe"),
    ('Œ', "Oe"),
    ('ð', "d"),
    ('Ð', "D"),
    ('þ', "th"),
    ('Þ', "Th"),
    ('ø', "o"),
    ('Ø', "O"),
    ('ł', "l"),
    ('Ł', "L"),
    ('đ', "d"),
    ('Đ', "D"),
    ('ı', "i"),
];

/// A surname fragment where the feed replaced one letter with `?`.
///
/// `pattern` is a regular expression matched case-insensitively against text
/// that has already been stripped of diacritics. The matched span is replaced
/// with `replacement` verbatim, so the output always carries the canonical
/// casing from this table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepairRule {
    pub pattern: &'static str,
    pub replacement: &'static str,
}

const fn rule(pattern: &'static str, replacement: &'static str) -> RepairRule {
    RepairRule {
        pattern,
        replacement,
    }
}

/// Repairs applied in order. Patterns that start with a letter are anchored
/// to a word boundary so they never fire in the middle of a longer name.
pub const REPAIR_RULES: &[RepairRule] = &[
    // The trailing `n` is optional: the feed emits both "Beltr?" and "Beltr?n".
    rule(r"\bbeltr\?n?", "Beltran"),
    rule(r"\bencarnaci\?n?", "Encarnacion"),
    rule(r"\bb\?ez", "Baez"),
    rule(r"\?lvarez", "Alvarez"),
    rule(r"\bs\?nchez", "Sanchez"),
    rule(r"\bsan\?($|[^a-z])", "Sano$1"),
    rule(r"\bgonz\?lez", "Gonzalez"),
    rule(r"\brodr\?guez", "Rodriguez"),
    rule(r"\bfern\?ndez", "Fernandez"),
    rule(r"\bmart\?nez", "Martinez"),
    rule(r"\bgarc\?a", "Garcia"),
    rule(r"\bl\?pez", "Lopez"),
    rule(r"\bp\?rez", "Perez"),
    rule(r"\bhern\?ndez", "Hernandez"),
    rule(r"\bram\?rez", "Ramirez"),
    rule(r"\bjim\?nez", "Jimenez"),
    rule(r"\bv\?squez", "Vasquez"),
    rule(r"\bv\?zquez", "Vazquez"),
    rule(r"\bcastr\?", "Castro"),
    rule(r"\bdelgad\?", "Delgado"),
    rule(r"\bvald\?z", "Valdez"),
    rule(r"\bmoral\?s", "Morales"),
];

/// Substituted for any `?` no repair rule accounted for. `a` is the most
/// frequent vowel across the surnames the repair table targets.
pub const FALLBACK_LETTER: char = 'a';
