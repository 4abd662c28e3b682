//! Character variety section - awards points for mixed case, numbers and symbols.

use secrecy::{ExposeSecret, SecretString};
use super::SectionScore;
use crate::strength::CharacterClasses;

const MIXED_CASE_POINTS: SectionScore = 15;
const NUMBER_POINTS: SectionScore = 10;
const SYMBOL_POINTS: SectionScore = 15;

/// Scores the password by the character classes it uses.
///
/// Mixed case only counts when both lowercase and uppercase are present.
pub fn character_variety_section(password: &SecretString) -> SectionScore {
    let classes = CharacterClasses::of(password.expose_secret());
    let mut points = 0;
    if classes.lowercase && classes.uppercase {
        points += MIXED_CASE_POINTS;
    }
    if classes.digits {
        points += NUMBER_POINTS;
    }
    if classes.symbols {
        points += SYMBOL_POINTS;
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variety_section_single_case_gets_nothing() {
        let pwd = SecretString::new("lowercase".to_string().into());
        assert_eq!(character_variety_section(&pwd), 0);

        let pwd = SecretString::new("UPPERCASE".to_string().into());
        assert_eq!(character_variety_section(&pwd), 0);
    }

    #[test]
    fn test_variety_section_numbers_only() {
        let pwd = SecretString::new("lower123".to_string().into());
        assert_eq!(character_variety_section(&pwd), 10);
    }

    #[test]
    fn test_variety_section_symbols_only() {
        let pwd = SecretString::new("no-numbers!".to_string().into());
        assert_eq!(character_variety_section(&pwd), 15);
    }

    #[test]
    fn test_variety_section_all_categories() {
        let pwd = SecretString::new("HasAll123!@#".to_string().into());
        assert_eq!(character_variety_section(&pwd), 40);
    }
}
