//! Length section - awards points for each length milestone reached.

use secrecy::{ExposeSecret, SecretString};
use super::SectionScore;

/// Length milestones, in characters. Each one reached is worth `POINTS_PER_MILESTONE`.
const MILESTONES: [usize; 3] = [8, 12, 16];
const POINTS_PER_MILESTONE: SectionScore = 20;

/// Scores the password by the number of length milestones it reaches.
///
/// # Returns
/// 0, 20, 40 or 60 points.
pub fn length_section(password: &SecretString) -> SectionScore {
    let len = password.expose_secret().chars().count();
    MILESTONES
        .iter()
        .filter(|&&milestone| len >= milestone)
        .count() as SectionScore
        * POINTS_PER_MILESTONE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_section_too_short() {
        let pwd = SecretString::new("Short1!".to_string().into());
        assert_eq!(length_section(&pwd), 0);
    }

    #[test]
    fn test_length_section_exactly_minimum() {
        let pwd = SecretString::new("12345678".to_string().into());
        assert_eq!(length_section(&pwd), 20);
    }

    #[test]
    fn test_length_section_all_milestones() {
        let pwd = SecretString::new("LongEnough123!LongEnough".to_string().into());
        assert_eq!(length_section(&pwd), 60);
    }

    #[test]
    fn test_length_section_counts_chars_not_bytes() {
        // 8 bytes, 4 characters
        let pwd = SecretString::new("ñöéü".to_string().into());
        assert_eq!(length_section(&pwd), 0);
    }
}
