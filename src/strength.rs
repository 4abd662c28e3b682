//! Password strength scoring.
//!
//! Two strategies live side by side:
//! - [`entropy_score`]: `length × log2(pool)`, bucketed into a [`StrengthLabel`].
//!   This is the canonical signal.
//! - [`legacy_score`]: the older 0-100 score built from length milestones and
//!   character variety, kept for reports that still carry it.
//!
//! Callers pick one through [`StrengthStrategy`].

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::sections::{SectionScore, character_variety_section, length_section};

const LOWERCASE_POOL: u32 = 26;
const UPPERCASE_POOL: u32 = 26;
const DIGIT_POOL: u32 = 10;
const SYMBOL_POOL: u32 = 32;

const LEGACY_MAX: SectionScore = 100;

/// Coarse strength bucket, ordered from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StrengthLabel {
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

impl StrengthLabel {
    /// Buckets an entropy estimate: < 40 weak, < 60 moderate, < 80 strong.
    pub fn from_entropy(bits: f64) -> Self {
        if bits < 40.0 {
            Self::Weak
        } else if bits < 60.0 {
            Self::Moderate
        } else if bits < 80.0 {
            Self::Strong
        } else {
            Self::VeryStrong
        }
    }

    /// Buckets a legacy 0-100 score: < 30 weak, < 70 moderate, < 90 strong.
    pub fn from_legacy(score: SectionScore) -> Self {
        if score < 30 {
            Self::Weak
        } else if score < 70 {
            Self::Moderate
        } else if score < 90 {
            Self::Strong
        } else {
            Self::VeryStrong
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weak => "Weak",
            Self::Moderate => "Moderate",
            Self::Strong => "Strong",
            Self::VeryStrong => "Very Strong",
        }
    }
}

impl fmt::Display for StrengthLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which character classes a password draws from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharacterClasses {
    pub lowercase: bool,
    pub uppercase: bool,
    pub digits: bool,
    /// Anything that is not an ASCII letter or digit.
    pub symbols: bool,
}

impl CharacterClasses {
    pub fn of(password: &str) -> Self {
        let mut classes = Self::default();
        for c in password.chars() {
            if c.is_ascii_lowercase() {
                classes.lowercase = true;
            } else if c.is_ascii_uppercase() {
                classes.uppercase = true;
            } else if c.is_ascii_digit() {
                classes.digits = true;
            } else {
                classes.symbols = true;
            }
        }
        classes
    }

    /// Size of the character pool spanned by the present classes.
    pub fn pool_size(&self) -> u32 {
        [
            (self.lowercase, LOWERCASE_POOL),
            (self.uppercase, UPPERCASE_POOL),
            (self.digits, DIGIT_POOL),
            (self.symbols, SYMBOL_POOL),
        ]
        .iter()
        .filter(|(present, _)| *present)
        .map(|(_, size)| size)
        .sum()
    }
}

/// Result of the entropy strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrengthScore {
    pub entropy_bits: f64,
    pub label: StrengthLabel,
}

/// Result of the legacy strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyScore {
    pub value: SectionScore,
    pub label: StrengthLabel,
}

/// Estimated entropy in bits. The empty password has zero entropy.
pub fn entropy_bits(password: &str) -> f64 {
    let len = password.chars().count();
    if len == 0 {
        return 0.0;
    }
    let pool = CharacterClasses::of(password).pool_size().max(1);
    len as f64 * f64::from(pool).log2()
}

/// Scores a password by entropy.
pub fn entropy_score(password: &SecretString) -> StrengthScore {
    let bits = entropy_bits(password.expose_secret());
    StrengthScore {
        entropy_bits: bits,
        label: StrengthLabel::from_entropy(bits),
    }
}

/// Canonical scoring entry point, same as [`entropy_score`].
pub fn score(password: &SecretString) -> StrengthScore {
    entropy_score(password)
}

/// Scores a password with the legacy length/variety sections, capped at 100.
pub fn legacy_score(password: &SecretString) -> LegacyScore {
    // Orchestrator: sum sections in sequence
    let sections: [(&str, fn(&SecretString) -> SectionScore); 2] = [
        ("length", length_section),
        ("variety", character_variety_section),
    ];

    let mut total: SectionScore = 0;
    for (_section_name, section_fn) in sections {
        let points = section_fn(password);
        #[cfg(feature = "tracing")]
        tracing::trace!("legacy section {} awarded {} points", _section_name, points);
        total += points;
    }

    let value = total.min(LEGACY_MAX);
    LegacyScore {
        value,
        label: StrengthLabel::from_legacy(value),
    }
}

/// Which strategy decides the label shown to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrengthStrategy {
    #[default]
    Entropy,
    Legacy,
    /// The lower of the entropy and legacy labels.
    Combined,
}

/// Everything derived from a single final password.
pub struct PasswordAnalysis {
    pub password: SecretString,
    pub length: usize,
    pub classes: CharacterClasses,
    pub entropy: StrengthScore,
    pub legacy: LegacyScore,
    pub generated_from_phrase: bool,
}

impl PasswordAnalysis {
    /// Analyzes the exact password that will be shown to the user.
    pub fn new(password: SecretString, generated_from_phrase: bool) -> Self {
        let exposed = password.expose_secret();
        let length = exposed.chars().count();
        let classes = CharacterClasses::of(exposed);
        let entropy = entropy_score(&password);
        let legacy = legacy_score(&password);
        Self {
            password,
            length,
            classes,
            entropy,
            legacy,
            generated_from_phrase,
        }
    }

    pub fn entropy_bits(&self) -> f64 {
        self.entropy.entropy_bits
    }

    pub fn has_uppercase(&self) -> bool {
        self.classes.uppercase
    }

    pub fn has_numbers(&self) -> bool {
        self.classes.digits
    }

    pub fn has_symbols(&self) -> bool {
        self.classes.symbols
    }

    /// Label under the given strategy.
    pub fn label(&self, strategy: StrengthStrategy) -> StrengthLabel {
        match strategy {
            StrengthStrategy::Entropy => self.entropy.label,
            StrengthStrategy::Legacy => self.legacy.label,
            StrengthStrategy::Combined => self.entropy.label.min(self.legacy.label),
        }
    }
}

impl fmt::Debug for PasswordAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordAnalysis")
            .field("length", &self.length)
            .field("classes", &self.classes)
            .field("entropy", &self.entropy)
            .field("legacy", &self.legacy)
            .field("generated_from_phrase", &self.generated_from_phrase)
            .finish_non_exhaustive()
    }
}
